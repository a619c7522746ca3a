//! Byte-exact text edits.
//!
//! Rules describe fixes as batches of [`Replacement`]s against the
//! original, unmodified file text. [`planner::EditPlanner`] builds and
//! validates a batch; [`applier`] applies one or more batches in a single
//! pass over the text.
//!
//! A batch is valid when every range lies inside the text on character
//! boundaries, no two non-empty ranges overlap, no insertion point falls
//! strictly inside a replaced range, and no two insertions share an offset.

pub mod applier;
pub mod planner;

use crate::types::Replacement;
use std::ops::Range;

pub use applier::{apply_edits, apply_violation_fixes, plan_fixes, FixPlan};
pub use planner::{EditFragment, EditPlanner};

/// Reasons an edit batch is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// A range reaches past the end of the text or is reversed.
    #[error("edit range {start}..{end} is outside the text (length {len})")]
    OutOfBounds {
        /// Range start.
        start: usize,
        /// Range end.
        end: usize,
        /// Text length.
        len: usize,
    },

    /// A range boundary splits a multi-byte character.
    #[error("edit offset {offset} is not on a character boundary")]
    NotCharBoundary {
        /// Offending offset.
        offset: usize,
    },

    /// Two edits touch the same bytes.
    #[error("edit {first:?} overlaps edit {second:?}")]
    Overlap {
        /// Earlier range.
        first: Range<usize>,
        /// Later range.
        second: Range<usize>,
    },
}

/// Checks that every range of `edits` is inside `text` on char boundaries.
pub(crate) fn check_bounds(text: &str, edits: &[Replacement]) -> Result<(), EditError> {
    for edit in edits {
        let range = edit.range();
        if range.end > text.len() {
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
    }
    Ok(())
}

/// Checks that no two edits conflict.
///
/// Edits are compared in `(start, end)` order. A non-empty range conflicts
/// with anything starting before its end; an insertion conflicts with
/// another insertion at the same offset.
pub(crate) fn check_overlaps(edits: &[Replacement]) -> Result<(), EditError> {
    let mut ranges: Vec<Range<usize>> = edits.iter().map(Replacement::range).collect();
    ranges.sort_by_key(|r| (r.start, r.end));

    let mut reach: Option<Range<usize>> = None;
    let mut last_insert: Option<usize> = None;

    for range in ranges {
        if let Some(prev) = &reach {
            if range.start < prev.end {
                return Err(EditError::Overlap {
                    first: prev.clone(),
                    second: range,
                });
            }
        }
        if range.is_empty() {
            if last_insert == Some(range.start) {
                return Err(EditError::Overlap {
                    first: range.clone(),
                    second: range,
                });
            }
            last_insert = Some(range.start);
        } else if reach.as_ref().map_or(true, |prev| range.end > prev.end) {
            reach = Some(range);
        }
    }
    Ok(())
}

/// Returns `true` if the union of `a` and `b` is not a valid batch.
#[must_use]
pub fn conflicts(a: &[Replacement], b: &[Replacement]) -> bool {
    let combined: Vec<Replacement> = a.iter().chain(b).cloned().collect();
    check_overlaps(&combined).is_err()
}
