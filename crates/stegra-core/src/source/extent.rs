//! Canonical byte extents of attributes and blocks.
//!
//! `hcl-edit` records spans for structures, identifiers, and labels but not
//! for block braces, so the brace positions are recovered from the text.

use super::SourceFile;
use hcl_edit::structure::{Attribute, Block, BlockLabel};
use hcl_edit::Span;
use std::ops::Range;

/// Byte offsets of a block's `{` and `}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Braces {
    /// Offset of the opening `{`.
    pub open: usize,
    /// Offset of the closing `}`.
    pub close: usize,
}

impl Braces {
    /// Bytes strictly between the braces.
    #[must_use]
    pub fn interior(&self) -> Range<usize> {
        self.open + 1..self.close
    }
}

/// Attribute extent: key start to the end of the value expression.
#[must_use]
pub fn attribute_range(file: &SourceFile, attr: &Attribute) -> Option<Range<usize>> {
    let span = attr.span()?;
    let start = attr.key.span().map_or(span.start, |key| key.start);
    Some(start..trim_end(file.text(), start, span.end))
}

/// Whole block extent: type keyword start to just past the closing `}`.
#[must_use]
pub fn block_range(block: &Block) -> Option<Range<usize>> {
    let span = block.span()?;
    let start = block.ident.span().map_or(span.start, |ident| ident.start);
    Some(start..span.end)
}

/// Byte range of the block type keyword.
#[must_use]
pub fn block_type_range(block: &Block) -> Option<Range<usize>> {
    block.ident.span().or_else(|| block.span().map(|s| s.start..s.start))
}

/// Byte range of a label, including quotes for string labels.
#[must_use]
pub fn label_range(label: &BlockLabel) -> Option<Range<usize>> {
    label.span()
}

/// Locates the braces of `block`.
///
/// The closing brace is the last byte of the block span. The opening brace
/// is the first `{` after the last label (or the type keyword), skipping
/// whitespace and inline `/* */` comments. Returns `None` if either brace
/// is not where the grammar puts it.
#[must_use]
pub fn block_braces(file: &SourceFile, block: &Block) -> Option<Braces> {
    let text = file.text();
    let bytes = text.as_bytes();
    let span = block.span()?;

    let close = span.end.checked_sub(1)?;
    if bytes.get(close) != Some(&b'}') {
        return None;
    }

    let header_end = block
        .labels
        .last()
        .and_then(Span::span)
        .or_else(|| block.ident.span())
        .map_or(span.start, |r| r.end);

    let open = skip_inline_trivia(text, header_end)?;
    if bytes.get(open) != Some(&b'{') || open >= close {
        return None;
    }

    Some(Braces { open, close })
}

/// Extends `range` to the start of the line after its last line, or to
/// the end of the buffer on the last line.
#[must_use]
pub fn line_extended(file: &SourceFile, range: Range<usize>) -> Range<usize> {
    let lines = file.lines();
    let end = if range.end > range.start && lines.is_line_start(range.end) {
        range.end
    } else {
        lines.next_line_start(lines.line_of(range.end))
    };
    range.start..end
}

/// Line-extended range that also starts at the beginning of its first line
/// when only whitespace precedes it there.
#[must_use]
pub fn whole_line(file: &SourceFile, range: Range<usize>) -> Range<usize> {
    let extended = line_extended(file, range);
    line_start_if_indented(file, extended.start)..extended.end
}

/// Returns the start of `offset`'s line when everything before `offset`
/// on that line is whitespace, otherwise `offset` itself.
#[must_use]
pub fn line_start_if_indented(file: &SourceFile, offset: usize) -> usize {
    let lines = file.lines();
    let line_start = lines.line_start(lines.line_of(offset));
    let prefix = file.slice(line_start..offset);
    if prefix.chars().all(|c| c == ' ' || c == '\t') {
        line_start
    } else {
        offset
    }
}

fn trim_end(text: &str, start: usize, end: usize) -> usize {
    text.get(start..end)
        .map_or(end, |s| start + s.trim_end().len())
}

fn skip_inline_trivia(text: &str, mut pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    loop {
        match bytes.get(pos)? {
            b' ' | b'\t' => pos += 1,
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                let rest = text.get(pos + 2..)?;
                pos += 2 + rest.find("*/")? + 2;
            }
            _ => return Some(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_block(file: &SourceFile) -> &Block {
        file.body().blocks().next().unwrap()
    }

    #[test]
    fn attribute_range_covers_name_to_value() {
        let text = "resource \"a\" \"b\" {\n  depends_on = [x]   \n}\n";
        let file = SourceFile::parse("main.tf", text).unwrap();
        let attr = first_block(&file).body.attributes().next().unwrap();
        let range = attribute_range(&file, attr).unwrap();
        assert_eq!(file.slice(range), "depends_on = [x]");
    }

    #[test]
    fn block_braces_found_after_labels() {
        let text = "resource \"a\" \"b\" /* { */ {\n  x = 1\n}\n";
        let file = SourceFile::parse("main.tf", text).unwrap();
        let braces = block_braces(&file, first_block(&file)).unwrap();
        assert_eq!(&text[braces.open..=braces.open], "{");
        assert_eq!(&text[braces.close..=braces.close], "}");
        assert_eq!(file.slice(braces.interior()), "\n  x = 1\n");
    }

    #[test]
    fn block_range_spans_keyword_to_close() {
        let text = "terraform {\n}\n";
        let file = SourceFile::parse("main.tf", text).unwrap();
        let range = block_range(first_block(&file)).unwrap();
        assert_eq!(file.slice(range), "terraform {\n}");
    }

    #[test]
    fn label_range_includes_quotes() {
        let text = "resource \"aws_s3_bucket\" \"this\" {}\n";
        let file = SourceFile::parse("main.tf", text).unwrap();
        let label = &first_block(&file).labels[1];
        assert_eq!(file.slice(label_range(label).unwrap()), "\"this\"");
    }

    #[test]
    fn line_extended_reaches_next_line() {
        let text = "a = 1\nb = 2";
        let file = SourceFile::parse("main.tf", text).unwrap();
        assert_eq!(line_extended(&file, 0..5), 0..6);
        assert_eq!(line_extended(&file, 6..11), 6..11);
    }

    #[test]
    fn whole_line_includes_indentation() {
        let text = "x {\n  a = 1\n}\n";
        let file = SourceFile::parse("main.tf", text).unwrap();
        assert_eq!(file.slice(whole_line(&file, 6..11)), "  a = 1\n");
    }
}
