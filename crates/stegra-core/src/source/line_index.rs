//! Line/byte offset table for a source buffer.

/// Maps 1-indexed line numbers to byte offsets and back.
///
/// `starts[0]` is always `0`; every following entry is the offset right
/// after a `\n`. A buffer ending in `\n` therefore has a final, empty line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Builds the index for `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut starts = Vec::with_capacity(text.len() / 16 + 2);
        starts.push(0);
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            starts,
            len: text.len(),
        }
    }

    /// Number of lines, counting the (possibly empty) segment after the last newline.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Length of the indexed buffer in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for an empty buffer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte offset where `line` starts.
    ///
    /// Lines past the end of the buffer map to the buffer length; line `0`
    /// is treated as line `1`.
    #[must_use]
    pub fn line_start(&self, line: usize) -> usize {
        let idx = line.saturating_sub(1);
        self.starts.get(idx).copied().unwrap_or(self.len)
    }

    /// Byte offset where the line after `line` starts, or the buffer length
    /// when `line` is the last one.
    #[must_use]
    pub fn next_line_start(&self, line: usize) -> usize {
        self.line_start(line.max(1) + 1)
    }

    /// Byte offset of the end of `line`'s content, excluding `\n` or `\r\n`.
    #[must_use]
    pub fn line_end(&self, text: &str, line: usize) -> usize {
        let start = self.line_start(line);
        let mut end = self.next_line_start(line);
        let bytes = text.as_bytes();
        if end > start && bytes.get(end - 1) == Some(&b'\n') {
            end -= 1;
            if end > start && bytes.get(end - 1) == Some(&b'\r') {
                end -= 1;
            }
        }
        end
    }

    /// Text of `line` without its terminator. Empty for lines past the end.
    #[must_use]
    pub fn line_text<'t>(&self, text: &'t str, line: usize) -> &'t str {
        let start = self.line_start(line);
        let end = self.line_end(text, line);
        text.get(start..end).unwrap_or("")
    }

    /// 1-indexed line containing `offset`. Offsets past the end resolve to
    /// the last line.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// 1-indexed `(line, column)` of `offset`; columns count bytes.
    #[must_use]
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = self.line_of(offset);
        (line, offset - self.line_start(line) + 1)
    }

    /// Returns `true` if `offset` is the first byte of a line.
    #[must_use]
    pub fn is_line_start(&self, offset: usize) -> bool {
        self.starts.binary_search(&offset).is_ok()
    }
}
