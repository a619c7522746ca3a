//! Rule forbidding resource and data names that repeat their type.
//!
//! `resource "aws_vpc" "prod_vpc"` is referenced as `aws_vpc.prod_vpc`,
//! which says "vpc" twice. The provider prefix (`aws`) is not counted, and
//! `main` is always allowed.
//!
//! Root module only. Detection only: a rename needs a human choice.

use crate::support::{object_name, object_type, skip_unless_root};
use stegra_core::source::extent::label_range;
use stegra_core::{ModuleContext, Rule, RuleError, Severity, SourceFile, Suggestion, Violation};

/// Rule code for no-type-in-name.
pub const CODE: &str = "ST012";

/// Rule name for no-type-in-name.
pub const NAME: &str = "no-type-in-name";

/// Forbids names that repeat tokens of the block type.
#[derive(Debug, Clone)]
pub struct NoTypeInName {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoTypeInName {
    fn default() -> Self {
        Self::new()
    }
}

impl NoTypeInName {
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
        for kind in ["resource", "data"] {
            for block in file.body().get_blocks(kind) {
                let (Some(block_type), Some(name)) = (object_type(block), object_name(block))
                else {
                    continue;
                };
                let repeated = repeated_type_tokens(block_type, name);
                if repeated.is_empty() {
                    continue;
                }
                let Some(range) = block.labels.get(1).and_then(label_range) else {
                    continue;
                };
                out.push(
                    Violation::new(
                        CODE,
                        NAME,
                        self.severity,
                        file.location(range),
                        format!(
                            "{kind} name `{name}` must not repeat type tokens ({})",
                            repeated.join(", ")
                        ),
                    )
                    .with_suggestion(Suggestion::new(format!(
                        "Name the {kind} after its role, not its type `{block_type}`"
                    ))),
                );
            }
        }
    }
}

/// Type tokens (provider prefix dropped) that also occur in `name`, in
/// type order. Case-insensitive.
fn repeated_type_tokens(block_type: &str, name: &str) -> Vec<String> {
    let block_type = block_type.to_lowercase();
    let name = name.to_lowercase();

    let mut type_tokens: Vec<&str> = block_type.split('_').collect();
    if type_tokens.len() > 1 {
        type_tokens.remove(0);
    }
    let name_tokens: Vec<&str> = name.split('_').filter(|t| !t.is_empty()).collect();

    type_tokens
        .into_iter()
        .filter(|t| !t.is_empty() && *t != "main")
        .filter(|t| name_tokens.contains(t))
        .map(str::to_string)
        .collect()
}

impl Rule for NoTypeInName {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids resource and data names that repeat tokens of their type"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn link(&self) -> Option<&'static str> {
        Some("docs/rules.md#st012-no-type-in-name")
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
