//! Rule forbidding blank lines at the start and end of a file.
//!
//! Every leading blank line is its own violation. Blank lines after the
//! last non-blank line are reported once and replaced by a single line
//! ending, so a fixed file ends with exactly one terminator.
//!
//! Root module only.

use crate::support::{attach_fix, skip_unless_root};
use stegra_core::{EditPlanner, ModuleContext, Rule, RuleError, Severity, SourceFile, Violation};

/// Rule code for no-leading-trailing-blank-lines.
pub const CODE: &str = "ST009";

/// Rule name for no-leading-trailing-blank-lines.
pub const NAME: &str = "no-leading-trailing-blank-lines";

/// Forbids blank lines before the first and after the last content line.
#[derive(Debug, Clone)]
pub struct NoLeadingTrailingBlankLines {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoLeadingTrailingBlankLines {
    fn default() -> Self {
        Self::new()
    }
}

impl NoLeadingTrailingBlankLines {
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
        let line_count = lines.line_count();

        for line in (1..line_count).take_while(|&l| trivia.is_blank(l)) {
            let range = lines.line_start(line)..lines.next_line_start(line);
            let violation = Violation::new(
                CODE,
                NAME,
                self.severity,
                file.location(range.clone()),
                "leading blank lines are not allowed",
            );
            let mut planner = EditPlanner::new(file);
            planner.delete(range);
            out.push(attach_fix(violation, "remove the blank line", planner));
        }

        let Some(last_content) = (1..=line_count).rev().find(|&l| !trivia.is_blank(l)) else {
            return;
        };
        // The segment after the final terminator is not a line of its own.
        if last_content + 1 >= line_count {
            return;
        }

        let reported = lines.line_start(last_content + 1)..file.text().len();
        let violation = Violation::new(
            CODE,
            NAME,
            self.severity,
            file.location(reported),
            "trailing blank lines are not allowed",
        );
        let mut planner = EditPlanner::new(file);
        planner.replace(
            lines.line_end(file.text(), last_content)..file.text().len(),
            file.line_ending(),
        );
        out.push(attach_fix(violation, "remove the trailing blank lines", planner));
    }
}

impl Rule for NoLeadingTrailingBlankLines {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids blank lines at the start and end of a file"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn link(&self) -> Option<&'static str> {
        Some("docs/rules.md#st009-no-leading-trailing-blank-lines")
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
