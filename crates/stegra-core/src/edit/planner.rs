//! Builds validated edit batches from insert/delete/replace/move intents.

use super::{check_overlaps, EditError};
use crate::source::extent::{line_extended, line_start_if_indented};
use crate::source::{Braces, SourceFile};
use crate::types::Replacement;
use std::ops::Range;

/// One transformation intent, in original-buffer offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditFragment {
    /// Insert `text` at `at`.
    Insert {
        /// Insertion offset.
        at: usize,
        /// Inserted text.
        text: String,
    },
    /// Remove `range`.
    Delete {
        /// Removed bytes.
        range: Range<usize>,
    },
    /// Replace `range` with `text`.
    Replace {
        /// Replaced bytes.
        range: Range<usize>,
        /// Replacement text.
        text: String,
    },
    /// Move the bytes of `range` to `before`.
    Move {
        /// Moved bytes.
        range: Range<usize>,
        /// Destination offset.
        before: usize,
    },
}

/// Collects fragments for one file and turns them into a [`Replacement`]
/// batch.
#[derive(Debug)]
pub struct EditPlanner<'f> {
    file: &'f SourceFile,
    fragments: Vec<EditFragment>,
}

impl<'f> EditPlanner<'f> {
    /// Creates an empty planner for `file`.
    #[must_use]
    pub fn new(file: &'f SourceFile) -> Self {
        Self {
            file,
            fragments: Vec::new(),
        }
    }

    /// Returns `true` if nothing has been planned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Inserts `text` at `at`.
    pub fn insert(&mut self, at: usize, text: impl Into<String>) -> &mut Self {
        self.fragments.push(EditFragment::Insert {
            at,
            text: text.into(),
        });
        self
    }

    /// Deletes `range`.
    pub fn delete(&mut self, range: Range<usize>) -> &mut Self {
        self.fragments.push(EditFragment::Delete { range });
        self
    }

    /// Replaces `range` with `text`.
    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) -> &mut Self {
        self.fragments.push(EditFragment::Replace {
            range,
            text: text.into(),
        });
        self
    }

    /// Moves the original bytes of `range` to `before`.
    pub fn move_before(&mut self, range: Range<usize>, before: usize) -> &mut Self {
        self.fragments.push(EditFragment::Move { range, before });
        self
    }

    /// Moves several ranges to one destination, keeping their order.
    ///
    /// The captured texts are concatenated into a single insertion, since
    /// two insertions at one offset would conflict.
    pub fn move_all_before(&mut self, ranges: &[Range<usize>], before: usize) -> &mut Self {
        let text: String = ranges
            .iter()
            .map(|r| self.file.slice(r.clone()))
            .collect();
        self.insert(before, text);
        for range in ranges {
            self.delete(range.clone());
        }
        self
    }

    /// Deletes whole lines, highest line first.
    pub fn delete_lines<I>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut lines: Vec<usize> = lines.into_iter().collect();
        lines.sort_unstable_by(|a, b| b.cmp(a));
        lines.dedup();
        for line in lines {
            let index = self.file.lines();
            self.delete(index.line_start(line)..index.next_line_start(line));
        }
        self
    }

    /// Insertion point in front of a construct starting at `start`.
    ///
    /// When only whitespace precedes the construct on its line, this is the
    /// start of the topmost comment line directly above it, so comments
    /// stay attached to what they describe.
    #[must_use]
    pub fn anchor_before(&self, start: usize) -> usize {
        let lines = self.file.lines();
        let line = lines.line_of(start);
        if line_start_if_indented(self.file, start) != lines.line_start(line) {
            return start;
        }
        lines.line_start(self.file.trivia().comment_group_above(line))
    }

    /// Insertion point just inside a block's closing brace.
    ///
    /// The start of the brace's line when the brace is alone on it,
    /// otherwise the brace itself.
    #[must_use]
    pub fn anchor_before_close(&self, braces: Braces) -> usize {
        line_start_if_indented(self.file, braces.close)
    }

    /// Extent moved when relocating a construct: its whole lines, together
    /// with the comment group above it.
    #[must_use]
    pub fn movable_range(&self, range: Range<usize>) -> Range<usize> {
        let end = line_extended(self.file, range.clone()).end;
        self.anchor_before(range.start)..end
    }

    /// Expands fragments into replacements and validates the batch.
    ///
    /// # Errors
    ///
    /// Returns [`EditError`] if a range is out of bounds, splits a
    /// character, or conflicts with another fragment.
    pub fn finish(self) -> Result<Vec<Replacement>, EditError> {
        let file = self.file;
        let mut edits: Vec<(Range<usize>, String)> = Vec::with_capacity(self.fragments.len());

        for fragment in self.fragments {
            match fragment {
                EditFragment::Insert { at, text } => edits.push((at..at, text)),
                EditFragment::Delete { range } => edits.push((range, String::new())),
                EditFragment::Replace { range, text } => edits.push((range, text)),
                EditFragment::Move { range, before } => {
                    check_range(file.text(), &range)?;
                    let captured = file.slice(range.clone()).to_string();
                    edits.push((before..before, captured));
                    edits.push((range, String::new()));
                }
            }
        }

        for (range, _) in &edits {
            check_range(file.text(), range)?;
        }

        let replacements: Vec<Replacement> = edits
            .into_iter()
            .map(|(range, text)| Replacement::new(file.location(range), text))
            .collect();
        check_overlaps(&replacements)?;
        Ok(replacements)
    }
}

fn check_range(text: &str, range: &Range<usize>) -> Result<(), EditError> {
    if range.start > range.end || range.end > text.len() {
        return Err(EditError::OutOfBounds {
            start: range.start,
            end: range.end,
            len: text.len(),
        });
    }
    for offset in [range.start, range.end] {
        if !text.is_char_boundary(offset) {
            return Err(EditError::NotCharBoundary { offset });
        }
    }
    Ok(())
}
