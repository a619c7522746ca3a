//! Rule forbidding blank lines between `required_providers` entries.
//!
//! Each gap between two consecutive entries that holds blank lines is one
//! violation, reported at the start of the following entry. Comment lines
//! in a gap are kept; only the blank lines are removed.

use crate::support::{attach_fix, required_providers};
use stegra_core::source::extent::attribute_range;
use stegra_core::{EditPlanner, ModuleContext, Rule, RuleError, Severity, SourceFile, Violation};

/// Rule code for no-blank-line-between-required-providers.
pub const CODE: &str = "ST006";

/// Rule name for no-blank-line-between-required-providers.
pub const NAME: &str = "no-blank-line-between-required-providers";

/// Forbids blank lines between provider requirements.
#[derive(Debug, Clone)]
pub struct NoBlankLineBetweenRequiredProviders {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoBlankLineBetweenRequiredProviders {
    fn default() -> Self {
        Self::new()
    }
}

impl NoBlankLineBetweenRequiredProviders {
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
        for block in required_providers(file.body()) {
            let mut entries: Vec<_> = block
                .body
                .attributes()
                .filter_map(|attr| attribute_range(file, attr))
                .collect();
            if entries.len() < 2 {
                continue;
            }
            entries.sort_by_key(|r| r.start);

            for pair in entries.windows(2) {
                let prev_end_line = lines.line_of(pair[0].end);
                let next_line = lines.line_of(pair[1].start);
                let blanks = file
                    .trivia()
                    .blank_lines(prev_end_line + 1, next_line.saturating_sub(1));
                if blanks.is_empty() {
                    continue;
                }

                let at = pair[1].start;
                let violation = Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    file.location(at..at),
                    "no blank lines allowed between required_providers entries",
                );
                let mut planner = EditPlanner::new(file);
                planner.delete_lines(blanks);
                out.push(attach_fix(violation, "remove the blank lines", planner));
            }
        }
    }
}

impl Rule for NoBlankLineBetweenRequiredProviders {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids blank lines between terraform.required_providers entries"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn link(&self) -> Option<&'static str> {
        Some("docs/rules.md#st006-no-blank-line-between-required-providers")
    }

    fn check(&self, ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        for file in ctx.files() {
            self.check_file(file, &mut violations);
        }
        Ok(violations)
    }
}
