//! Rule requiring `depends_on` to be the last item of a block.
//!
//! # Rationale
//!
//! Explicit dependencies are meta-arguments about the block, not part of
//! its configuration. Keeping them at the bottom makes them easy to find.
//!
//! # Detected Patterns
//!
//! - Attributes or nested blocks after `depends_on` in `resource`, `data`,
//!   or `module` blocks
//!
//! # Fix
//!
//! Moves `depends_on` (with the comments directly above it) to just before
//! the closing brace.

use crate::support::{attach_fix, OBJECT_KINDS};
use stegra_core::source::construct::{constructs_after, enumerate, ConstructKind};
use stegra_core::source::extent::block_braces;
use stegra_core::{EditPlanner, ModuleContext, Rule, RuleError, Severity, SourceFile, Violation};

/// Rule code for depends-on-last.
pub const CODE: &str = "ST002";

/// Rule name for depends-on-last.
pub const NAME: &str = "depends-on-last";

/// Requires `depends_on` to come after every other attribute and block.
#[derive(Debug, Clone)]
pub struct DependsOnLast {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for DependsOnLast {
    fn default() -> Self {
        Self::new()
    }
}

impl DependsOnLast {
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
        for block in file.body().blocks() {
            if !OBJECT_KINDS.contains(&block.ident.as_str()) {
                continue;
            }
            let constructs = enumerate(file, &block.body);
            let Some(target) = constructs
                .iter()
                .position(|c| c.is_attribute_named("depends_on"))
            else {
                continue;
            };

            let mut after = constructs_after(&constructs, target).peekable();
            if after.peek().is_none() {
                continue;
            }
            let message = if after.any(|c| c.kind == ConstructKind::Block) {
                "depends_on must be the last item in this block"
            } else {
                "depends_on must be the last attribute in this block"
            };

            let range = constructs[target].range.clone();
            let violation = Violation::new(CODE, NAME, self.severity, file.location(range.clone()), message);

            let mut planner = EditPlanner::new(file);
            if let Some(braces) = block_braces(file, block) {
                let moved = planner.movable_range(range);
                let anchor = planner.anchor_before_close(braces);
                planner.move_before(moved, anchor);
            }
            out.push(attach_fix(violation, "move depends_on to the end of the block", planner));
        }
    }
}

impl Rule for DependsOnLast {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires depends_on to be the last item in resource, data, and module blocks"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn link(&self) -> Option<&'static str> {
        Some("docs/rules.md#st002-depends-on-last")
    }

    fn check(&self, ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let mut violations = Vec::new();
        for file in ctx.files() {
            self.check_file(file, &mut violations);
        }
        Ok(violations)
    }
}
