//! Rule requiring a blank line between consecutive top-level blocks.
//!
//! # Rationale
//!
//! Resources, data sources, and module calls are the units readers scan
//! for. A blank line between them keeps each declaration visually distinct.
//!
//! # Detected Patterns
//!
//! - `resource`, `data`, or `module` block directly following another one
//!   with no blank line in between (comments in between do not count)
//!
//! # Fix
//!
//! Inserts one line break right after the previous block, so a comment
//! group above the next block stays attached to it.

use crate::support::{attach_fix, OBJECT_KINDS};
use stegra_core::source::extent::{block_range, block_type_range};
use stegra_core::{EditPlanner, ModuleContext, Rule, RuleError, Severity, SourceFile, Violation};

/// Rule code for blank-line-between-blocks.
pub const CODE: &str = "ST001";

/// Rule name for blank-line-between-blocks.
pub const NAME: &str = "blank-line-between-blocks";

/// Requires a blank line between top-level `resource`, `data`, and
/// `module` blocks.
#[derive(Debug, Clone)]
pub struct BlankLineBetweenBlocks {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for BlankLineBetweenBlocks {
    fn default() -> Self {
        Self::new()
    }
}

impl BlankLineBetweenBlocks {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn check_file(&self, file: &SourceFile, out: &mut Vec<Violation>) {
        let lines = file.lines();
        let trivia = file.trivia();

        let blocks: Vec<_> = file
            .body()
            .blocks()
            .filter(|b| OBJECT_KINDS.contains(&b.ident.as_str()))
            .filter_map(|b| Some((block_range(b)?, block_type_range(b)?)))
            .collect();

        for pair in blocks.windows(2) {
            let (prev, _) = &pair[0];
            let (_, next_type) = &pair[1];

            let close_line = lines.line_of(prev.end.saturating_sub(1));
            let type_line = lines.line_of(next_type.start);
            let gap = close_line + 1..type_line;
            if gap.clone().any(|line| trivia.is_blank(line)) {
                continue;
            }

            let violation = Violation::new(
                CODE,
                NAME,
                self.severity,
                file.location(next_type.clone()),
                "blocks must be separated by a blank line",
            );
            let mut planner = EditPlanner::new(file);
            planner.insert(lines.line_start(gap.start), file.line_ending());
            out.push(attach_fix(violation, "insert a blank line", planner));
        }
    }
}

impl Rule for BlankLineBetweenBlocks {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires a blank line between top-level resource, data, and module blocks"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn link(&self) -> Option<&'static str> {
        Some("docs/rules.md#st001-blank-line-between-blocks")
    }

    fn check(&self, ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        for file in ctx.files() {
            self.check_file(file, &mut violations);
        }
        Ok(violations)
    }
}
