//! Rule forbidding runs of more than one blank line.
//!
//! Leading blank lines belong to
//! [`NoLeadingTrailingBlankLines`](crate::NoLeadingTrailingBlankLines) and
//! are skipped here. Every blank line after the first of a run is reported
//! and deleted on its own.
//!
//! Root module only.

use crate::support::{attach_fix, skip_unless_root};
use stegra_core::{EditPlanner, ModuleContext, Rule, RuleError, Severity, SourceFile, Violation};

/// Rule code for no-multiple-blank-lines.
pub const CODE: &str = "ST010";

/// Rule name for no-multiple-blank-lines.
pub const NAME: &str = "no-multiple-blank-lines";

/// Forbids consecutive blank lines.
#[derive(Debug, Clone)]
pub struct NoMultipleBlankLines {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoMultipleBlankLines {
    fn default() -> Self {
        Self::new()
    }
}

impl NoMultipleBlankLines {
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
        // The segment after the final terminator is excluded.
        let last = lines.line_count() - 1;
        let Some(first_content) = (1..=last).find(|&l| !trivia.is_blank(l)) else {
            return;
        };

        for run in trivia.blank_runs(first_content, last) {
            for line in run.lines().skip(1) {
                let range = lines.line_start(line)..lines.next_line_start(line);
                let violation = Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    file.location(range.clone()),
                    "multiple consecutive blank lines are not allowed",
                );
                let mut planner = EditPlanner::new(file);
                planner.delete(range);
                out.push(attach_fix(violation, "remove the blank line", planner));
            }
        }
    }
}

impl Rule for NoMultipleBlankLines {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids more than one consecutive blank line"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn link(&self) -> Option<&'static str> {
        Some("docs/rules.md#st010-no-multiple-blank-lines")
    }

    fn check(&self, ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        if skip_unless_root(ctx, NAME) {
            return Ok(Vec::new());
        }
        let mut violations = Vec::new();
        for file in ctx.files() {
            self.check_file(file, &mut violations);
        }
        Ok(violations)
    }
}
