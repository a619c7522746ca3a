//! Blank/comment/content classification of source lines.

use super::line_index::LineIndex;
use std::ops::Range;

/// Classification of a single physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Only whitespace (including a stray `\r`).
    Blank,
    /// Only a comment: `#`, `//`, or (part of) a `/* */` block comment.
    Comment,
    /// Anything else.
    Content,
}

/// A maximal run of blank lines, inclusive on both ends (1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlankLineRun {
    /// First blank line of the run.
    pub start_line: usize,
    /// Last blank line of the run.
    pub end_line: usize,
}

impl BlankLineRun {
    /// Number of lines in the run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// Always `false`; runs hold at least one line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Line numbers of the run, top to bottom.
    pub fn lines(&self) -> impl DoubleEndedIterator<Item = usize> {
        self.start_line..=self.end_line
    }
}

/// Classifies every line of `text`.
///
/// Lines in `verbatim` (1-indexed, half-open) are string content and are
/// always [`LineKind::Content`].
pub(crate) fn classify_lines(
    text: &str,
    lines: &LineIndex,
    verbatim: &[Range<usize>],
) -> Vec<LineKind> {
    let mut kinds = Vec::with_capacity(lines.line_count());
    let mut in_block_comment = false;

    for line in 1..=lines.line_count() {
        if verbatim.iter().any(|r| r.contains(&line)) {
            kinds.push(LineKind::Content);
            continue;
        }
        let (kind, open) = classify(lines.line_text(text, line), in_block_comment);
        in_block_comment = open;
        kinds.push(kind);
    }

    kinds
}

/// Classifies one line given whether a block comment is still open.
///
/// Returns the kind and whether a block comment remains open afterwards.
fn classify(line: &str, in_block_comment: bool) -> (LineKind, bool) {
    let trimmed = line.trim();

    if in_block_comment {
        return match trimmed.find("*/") {
            None => (LineKind::Comment, true),
            Some(idx) => classify_rest(&trimmed[idx + 2..]),
        };
    }

    if trimmed.is_empty() {
        return (LineKind::Blank, false);
    }
    if trimmed.starts_with('#') || trimmed.starts_with("//") {
        return (LineKind::Comment, false);
    }
    if let Some(rest) = trimmed.strip_prefix("/*") {
        return match rest.find("*/") {
            None => (LineKind::Comment, true),
            Some(idx) => classify_rest(&rest[idx + 2..]),
        };
    }

    (LineKind::Content, false)
}

/// Classifies whatever follows a closed block comment on the same line.
fn classify_rest(rest: &str) -> (LineKind, bool) {
    match classify(rest, false) {
        (LineKind::Blank | LineKind::Comment, open) => (LineKind::Comment, open),
        (LineKind::Content, open) => (LineKind::Content, open),
    }
}

/// Read-only view over a file's line classification.
#[derive(Debug, Clone, Copy)]
pub struct Trivia<'a> {
    kinds: &'a [LineKind],
}

impl<'a> Trivia<'a> {
    pub(crate) fn new(kinds: &'a [LineKind]) -> Self {
        Self { kinds }
    }

    /// Kind of `line`. Lines outside the file are [`LineKind::Content`].
    #[must_use]
    pub fn kind(&self, line: usize) -> LineKind {
        line.checked_sub(1)
            .and_then(|idx| self.kinds.get(idx))
            .copied()
            .unwrap_or(LineKind::Content)
    }

    /// Returns `true` if `line` exists and is whitespace-only.
    #[must_use]
    pub fn is_blank(&self, line: usize) -> bool {
        self.kind(line) == LineKind::Blank
    }

    /// Returns `true` if `line` exists and holds only a comment.
    #[must_use]
    pub fn is_comment(&self, line: usize) -> bool {
        self.kind(line) == LineKind::Comment
    }

    /// Number of classified lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.kinds.len()
    }

    /// Maximal blank runs within `start_line..=end_line`.
    #[must_use]
    pub fn blank_runs(&self, start_line: usize, end_line: usize) -> Vec<BlankLineRun> {
        let mut runs = Vec::new();
        let mut current: Option<BlankLineRun> = None;

        for line in start_line.max(1)..=end_line {
            if self.is_blank(line) {
                match current.as_mut() {
                    Some(run) => run.end_line = line,
                    None => {
                        current = Some(BlankLineRun {
                            start_line: line,
                            end_line: line,
                        });
                    }
                }
            } else if let Some(run) = current.take() {
                runs.push(run);
            }
        }
        runs.extend(current);
        runs
    }

    /// Blank lines within `start_line..=end_line`, top to bottom.
    #[must_use]
    pub fn blank_lines(&self, start_line: usize, end_line: usize) -> Vec<usize> {
        (start_line.max(1)..=end_line)
            .filter(|&line| self.is_blank(line))
            .collect()
    }

    /// Topmost line of the comment group directly above `line`.
    ///
    /// Walks upward while the preceding line is comment-only. Returns
    /// `line` itself when the line above is blank, content, or missing.
    #[must_use]
    pub fn comment_group_above(&self, line: usize) -> usize {
        let mut top = line;
        while top > 1 && self.is_comment(top - 1) {
            top -= 1;
        }
        top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_of(text: &str) -> Vec<LineKind> {
        let lines = LineIndex::new(text);
        classify_lines(text, &lines, &[])
    }

    #[test]
    fn classifies_basic_lines() {
        let kinds = kinds_of("a = 1\n\n  # note\n// other\n   \n");
        assert_eq!(
            kinds,
            vec![
                LineKind::Content,
                LineKind::Blank,
                LineKind::Comment,
                LineKind::Comment,
                LineKind::Blank,
                LineKind::Blank,
            ]
        );
    }

    #[test]
    fn crlf_blank_line_is_blank() {
        let kinds = kinds_of("a = 1\r\n\r\nb = 2\r\n");
        assert_eq!(kinds[1], LineKind::Blank);
    }

    #[test]
    fn block_comments_span_lines() {
        let kinds = kinds_of("/* start\n\nstill */\n/* one */ a = 1\n/* x */ # y\n");
        assert_eq!(kinds[0], LineKind::Comment);
        assert_eq!(kinds[1], LineKind::Comment);
        assert_eq!(kinds[2], LineKind::Comment);
        assert_eq!(kinds[3], LineKind::Content);
        assert_eq!(kinds[4], LineKind::Comment);
    }

    #[test]
    fn verbatim_lines_are_content() {
        let text = "a = <<EOT\n\n# x\nEOT\n";
        let lines = LineIndex::new(text);
        let kinds = classify_lines(text, &lines, &[2..5]);
        assert_eq!(kinds[1], LineKind::Content);
        assert_eq!(kinds[2], LineKind::Content);
    }

    #[test]
    fn blank_runs_are_maximal() {
        let kinds = kinds_of("a\n\n\nb\n\nc\n");
        let trivia = Trivia::new(&kinds);
        let runs = trivia.blank_runs(1, 6);
        assert_eq!(
            runs,
            vec![
                BlankLineRun {
                    start_line: 2,
                    end_line: 3
                },
                BlankLineRun {
                    start_line: 5,
                    end_line: 5
                },
            ]
        );
        assert_eq!(runs[0].len(), 2);
    }

    #[test]
    fn comment_group_above_walks_comments() {
        let kinds = kinds_of("a {}\n\n# one\n# two\nb {}\n");
        let trivia = Trivia::new(&kinds);
        assert_eq!(trivia.comment_group_above(5), 3);
        assert_eq!(trivia.comment_group_above(3), 3);
    }

    #[test]
    fn comment_group_above_without_comment_is_self() {
        let kinds = kinds_of("a {}\nb {}\n");
        let trivia = Trivia::new(&kinds);
        assert_eq!(trivia.comment_group_above(2), 2);
    }

    #[test]
    fn out_of_range_lines_are_content() {
        let kinds = kinds_of("a\n");
        let trivia = Trivia::new(&kinds);
        assert!(!trivia.is_blank(0));
        assert!(!trivia.is_blank(10));
    }
}
