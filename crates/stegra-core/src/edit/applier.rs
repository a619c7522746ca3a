//! Applies replacement batches to the original text in one pass.

use super::{check_bounds, check_overlaps, conflicts, EditError};
use crate::types::{Replacement, Violation};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Applies `edits` to `text`.
///
/// Edits reference the original text and may be given in any order; they
/// are applied in `(start, end)` order, with insertions at an offset placed
/// before a replacement starting there.
///
/// # Errors
///
/// Returns [`EditError`] if the batch is out of bounds or conflicting.
pub fn apply_edits(text: &str, edits: &[Replacement]) -> Result<String, EditError> {
    check_bounds(text, edits)?;
    check_overlaps(edits)?;

    let mut ordered: Vec<&Replacement> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.location.offset, e.location.length));

    let growth: usize = edits.iter().map(|e| e.new_text.len()).sum();
    let mut out = String::with_capacity(text.len() + growth);
    let mut cursor = 0;
    for edit in ordered {
        let range = edit.range();
        out.push_str(&text[cursor..range.start]);
        out.push_str(&edit.new_text);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

/// Fix batches accepted for a set of files.
#[derive(Debug, Default)]
pub struct FixPlan {
    /// Accepted edits, grouped by file.
    pub edits: BTreeMap<PathBuf, Vec<Replacement>>,
    /// Number of violations whose batch was accepted.
    pub accepted: usize,
}

/// Selects the fix batches of `violations` that can be applied together.
///
/// Violations are taken in order of file and position. A batch may touch
/// several files; it is accepted only if it fits the current text of each
/// file (looked up through `text_of`) and conflicts with no batch accepted
/// before it. Batches that do not fit are dropped with a warning;
/// conflicting batches are left for a later pass.
pub fn plan_fixes<'t, F>(violations: &[Violation], text_of: F) -> FixPlan
where
    F: Fn(&Path) -> Option<&'t str>,
{
    let mut ordered: Vec<&Violation> = violations.iter().filter(|v| v.fix().is_some()).collect();
    ordered.sort_by(|a, b| {
        (&a.location.file, a.location.offset, a.location.length).cmp(&(
            &b.location.file,
            b.location.offset,
            b.location.length,
        ))
    });

    let mut plan = FixPlan::default();
    'batches: for violation in ordered {
        let Some(batch) = violation.fix() else {
            continue;
        };

        let mut by_file: BTreeMap<&Path, Vec<Replacement>> = BTreeMap::new();
        for edit in batch {
            by_file
                .entry(edit.location.file.as_path())
                .or_default()
                .push(edit.clone());
        }

        for (path, edits) in &by_file {
            let fits = match text_of(path) {
                Some(text) => check_bounds(text, edits).and_then(|()| check_overlaps(edits)),
                None => {
                    warn!("Dropping {} fix: {} is not loaded", violation.rule, path.display());
                    continue 'batches;
                }
            };
            if let Err(e) = fits {
                warn!(
                    "Dropping fix for {} at {}:{}: {e}",
                    violation.rule,
                    violation.location.file.display(),
                    violation.location.line
                );
                continue 'batches;
            }
            let accepted = plan.edits.get(*path).map_or(&[][..], Vec::as_slice);
            if conflicts(accepted, edits) {
                debug!(
                    "Deferring {} fix at {}:{}",
                    violation.rule,
                    violation.location.file.display(),
                    violation.location.line
                );
                continue 'batches;
            }
        }

        for (path, edits) in by_file {
            plan.edits.entry(path.to_path_buf()).or_default().extend(edits);
        }
        plan.accepted += 1;
    }

    plan
}

/// Applies the fixes carried by `violations` of a single file.
///
/// Every replacement is taken to target `text`. Returns the new text and
/// the number of applied fixes.
///
/// # Errors
///
/// Returns [`EditError`] only if the accepted batches cannot be applied
/// together, which indicates a bug in [`plan_fixes`].
pub fn apply_violation_fixes(
    text: &str,
    violations: &[Violation],
) -> Result<(String, usize), EditError> {
    let plan = plan_fixes(violations, |_| Some(text));
    if plan.accepted == 0 {
        return Ok((text.to_string(), 0));
    }
    let edits: Vec<Replacement> = plan.edits.into_values().flatten().collect();
    Ok((apply_edits(text, &edits)?, plan.accepted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, Severity};
    use std::ops::Range;

    fn edit(range: Range<usize>, text: &str) -> Replacement {
        let loc = Location::new(PathBuf::from("main.tf"), 1, 1)
            .with_span(range.start, range.end - range.start);
        Replacement::new(loc, text)
    }

    fn fixable(offset: usize, batch: Vec<Replacement>) -> Violation {
        let loc = Location::new(PathBuf::from("main.tf"), 1, 1).with_span(offset, 0);
        Violation::new("ST000", "test-rule", Severity::Error, loc, "msg").with_fix("fix", batch)
    }

    #[test]
    fn applies_in_position_order_regardless_of_input_order() {
        let text = "abcdef";
        let edits = vec![edit(4..5, "E"), edit(0..1, "A"), edit(2..2, "+")];
        assert_eq!(apply_edits(text, &edits).unwrap(), "Ab+cdEf");

        let mut reversed = edits.clone();
        reversed.reverse();
        assert_eq!(apply_edits(text, &reversed).unwrap(), "Ab+cdEf");
    }

    #[test]
    fn insertion_lands_before_replacement_at_same_offset() {
        let text = "a = 1\n";
        let edits = vec![edit(0..6, ""), edit(0..0, "b = 2\n")];
        assert_eq!(apply_edits(text, &edits).unwrap(), "b = 2\n");
    }

    #[test]
    fn rejects_conflicting_batch() {
        let edits = vec![edit(0..3, ""), edit(1..2, "x")];
        assert!(apply_edits("abcdef", &edits).is_err());
    }

    #[test]
    fn empty_batch_is_identity() {
        assert_eq!(apply_edits("abc", &[]).unwrap(), "abc");
    }

    #[test]
    fn violation_fixes_apply_whole_batches() {
        let text = "a\nb\nc\n";
        let violations = vec![
            fixable(2, vec![edit(2..4, ""), edit(0..0, "x\n")]),
            fixable(0, vec![edit(0..0, "y\n")]),
        ];
        // The batch at offset 0 is taken first; the other batch inserts at
        // the same offset and is deferred as a whole.
        let (fixed, applied) = apply_violation_fixes(text, &violations).unwrap();
        assert_eq!(applied, 1);
        assert_eq!(fixed, "y\na\nb\nc\n");
    }

    #[test]
    fn out_of_bounds_fix_is_dropped() {
        let text = "a\n";
        let violations = vec![fixable(0, vec![edit(0..10, "")])];
        let (fixed, applied) = apply_violation_fixes(text, &violations).unwrap();
        assert_eq!(applied, 0);
        assert_eq!(fixed, text);
    }
}
