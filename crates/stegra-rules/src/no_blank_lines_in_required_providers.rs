//! Rule forbidding any blank line inside `required_providers`.
//!
//! Stricter than [`NoBlankLineBetweenRequiredProviders`]: it also catches
//! blank lines inside entry values and at the block edges. Both rules
//! report the same gaps, so this one is disabled unless enabled in the
//! configuration or by the `strict` preset.
//!
//! [`NoBlankLineBetweenRequiredProviders`]: crate::NoBlankLineBetweenRequiredProviders

use crate::support::{attach_fix, required_providers};
use stegra_core::source::extent::block_braces;
use stegra_core::{EditPlanner, ModuleContext, Rule, RuleError, Severity, SourceFile, Violation};

/// Rule code for no-blank-lines-in-required-providers.
pub const CODE: &str = "ST007";

/// Rule name for no-blank-lines-in-required-providers.
pub const NAME: &str = "no-blank-lines-in-required-providers";

/// Forbids blank lines anywhere inside `required_providers`.
#[derive(Debug, Clone)]
pub struct NoBlankLinesInRequiredProviders {
    /// Custom severity.
    pub severity: Severity,
    /// Whether the rule runs when the configuration does not mention it.
    pub enabled_by_default: bool,
}

impl Default for NoBlankLinesInRequiredProviders {
    fn default() -> Self {
        Self::new()
    }
}

impl NoBlankLinesInRequiredProviders {
    /// Creates a new rule, disabled unless configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
            enabled_by_default: false,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Runs the rule even when the configuration does not mention it.
    #[must_use]
    pub fn enable_by_default(mut self, enabled: bool) -> Self {
        self.enabled_by_default = enabled;
        self
    }

    fn check_file(&self, file: &SourceFile, out: &mut Vec<Violation>) {
        let lines = file.lines();
        for block in required_providers(file.body()) {
            let Some(braces) = block_braces(file, block) else {
                continue;
            };
            let open_line = lines.line_of(braces.open);
            let close_line = lines.line_of(braces.close);
            let blanks = file
                .trivia()
                .blank_lines(open_line + 1, close_line.saturating_sub(1));
            let Some(&first) = blanks.first() else {
                continue;
            };

            let at = lines.line_start(first);
            let violation = Violation::new(
                CODE,
                NAME,
                self.severity,
                file.location(at..at),
                "no blank lines allowed in terraform.required_providers",
            );
            let mut planner = EditPlanner::new(file);
            planner.delete_lines(blanks);
            out.push(attach_fix(violation, "remove the blank lines", planner));
        }
    }
}

impl Rule for NoBlankLinesInRequiredProviders {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids blank lines anywhere inside terraform.required_providers"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn link(&self) -> Option<&'static str> {
        Some("docs/rules.md#st007-no-blank-lines-in-required-providers")
    }

    fn enabled_by_default(&self) -> bool {
        self.enabled_by_default
    }

    fn check(&self, ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        for file in ctx.files() {
            self.check_file(file, &mut violations);
        }
        Ok(violations)
    }
}
