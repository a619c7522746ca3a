//! Rule requiring empty blocks to be written as `{}`.
//!
//! Applies to blocks at any depth whose body holds nothing but whitespace
//! spread over more than one line. A body holding only comments is left
//! alone. The fix removes the whitespace between the braces.

use crate::support::{attach_fix, walk_blocks};
use stegra_core::source::extent::{block_braces, block_type_range};
use stegra_core::{EditPlanner, ModuleContext, Rule, RuleError, Severity, SourceFile, Violation};

/// Rule code for empty-block-one-line.
pub const CODE: &str = "ST003";

/// Rule name for empty-block-one-line.
pub const NAME: &str = "empty-block-one-line";

/// Requires empty blocks to close on the line they open.
#[derive(Debug, Clone)]
pub struct EmptyBlockOneLine {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for EmptyBlockOneLine {
    fn default() -> Self {
        Self::new()
    }
}

impl EmptyBlockOneLine {
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
        walk_blocks(file.body(), &mut |block| {
            if !block.body.is_empty() {
                return;
            }
            let Some(braces) = block_braces(file, block) else {
                return;
            };
            let interior = file.slice(braces.interior());
            if !interior.trim().is_empty() || !interior.contains('\n') {
                return;
            }
            let Some(type_range) = block_type_range(block) else {
                return;
            };

            let violation = Violation::new(
                CODE,
                NAME,
                self.severity,
                file.location(type_range),
                "empty block must be on one line (use `{}`)",
            );
            let mut planner = EditPlanner::new(file);
            planner.delete(braces.interior());
            out.push(attach_fix(violation, "collapse to `{}`", planner));
        });
    }
}

impl Rule for EmptyBlockOneLine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires empty blocks to be written on one line as {}"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn link(&self) -> Option<&'static str> {
        Some("docs/rules.md#st003-empty-block-one-line")
    }

    fn check(&self, ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        for file in ctx.files() {
            self.check_file(file, &mut violations);
        }
        Ok(violations)
    }
}
