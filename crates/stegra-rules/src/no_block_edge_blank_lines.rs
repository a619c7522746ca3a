//! Rule forbidding blank lines right inside a block's braces.
//!
//! Checks blocks at any depth. A blank run directly after the opening
//! brace line and a blank run directly before the closing brace line are
//! reported separately. When the whole interior is blank only the leading
//! run is reported.

use crate::support::{attach_fix, walk_blocks};
use stegra_core::source::extent::block_braces;
use stegra_core::{EditPlanner, ModuleContext, Rule, RuleError, Severity, SourceFile, Violation};

/// Rule code for no-block-edge-blank-lines.
pub const CODE: &str = "ST008";

/// Rule name for no-block-edge-blank-lines.
pub const NAME: &str = "no-block-edge-blank-lines";

/// Forbids blank lines at the start or end of a block body.
#[derive(Debug, Clone)]
pub struct NoBlockEdgeBlankLines {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoBlockEdgeBlankLines {
    fn default() -> Self {
        Self::new()
    }
}

impl NoBlockEdgeBlankLines {
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

        walk_blocks(file.body(), &mut |block| {
            let Some(braces) = block_braces(file, block) else {
                return;
            };
            let first = lines.line_of(braces.open) + 1;
            let close_line = lines.line_of(braces.close);
            if first >= close_line {
                return;
            }
            let last = close_line - 1;

            let leading = trivia.blank_runs(first, last).into_iter().next();
            if let Some(run) = leading.filter(|run| run.start_line == first) {
                let range = lines.line_start(run.start_line)..lines.next_line_start(run.end_line);
                out.push(self.edge_violation(file, range, "block must not start with a blank line"));
                if run.end_line == last {
                    return;
                }
            }

            let trailing = trivia.blank_runs(first, last).pop();
            if let Some(run) = trailing.filter(|run| run.end_line == last) {
                let range = lines.line_start(run.start_line)..lines.line_start(close_line);
                out.push(self.edge_violation(file, range, "block must not end with a blank line"));
            }
        });
    }

    fn edge_violation(
        &self,
        file: &SourceFile,
        range: std::ops::Range<usize>,
        message: &str,
    ) -> Violation {
        let violation = Violation::new(CODE, NAME, self.severity, file.location(range.clone()), message);
        let mut planner = EditPlanner::new(file);
        planner.delete(range);
        attach_fix(violation, "remove the blank lines", planner)
    }
}

impl Rule for NoBlockEdgeBlankLines {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids blank lines at the start or end of a block"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn link(&self) -> Option<&'static str> {
        Some("docs/rules.md#st008-no-block-edge-blank-lines")
    }

    fn check(&self, ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        for file in ctx.files() {
            self.check_file(file, &mut violations);
        }
        Ok(violations)
    }
}
