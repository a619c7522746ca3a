//! Rule requiring a blank line after configured meta-arguments.
//!
//! Pairs with [`KeywordsFirst`](crate::KeywordsFirst): once `for_each` or
//! `count` lead a block, a blank line separates them from the block's own
//! settings. An attribute that is the last construct of its body needs no
//! separator, even when comments follow it.
//!
//! # Configuration
//!
//! - `keywords`: attribute names to check (required)
//!
//! Root module only.

use crate::support::{attach_fix, resolve_keywords, skip_unless_root};
use stegra_core::source::construct::{enumerate, has_construct_after, ConstructKind};
use stegra_core::source::extent::line_extended;
use stegra_core::{EditPlanner, ModuleContext, Rule, RuleError, Severity, SourceFile, Violation};

/// Rule code for newline-after-keywords.
pub const CODE: &str = "ST005";

/// Rule name for newline-after-keywords.
pub const NAME: &str = "newline-after-keywords";

/// Requires an empty line after each configured attribute.
#[derive(Debug, Clone)]
pub struct NewlineAfterKeywords {
    /// Attribute names to check. Overridden by `keywords` in the
    /// configuration.
    pub keywords: Vec<String>,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NewlineAfterKeywords {
    fn default() -> Self {
        Self::new()
    }
}

impl NewlineAfterKeywords {
    /// Creates a new rule without keywords; they must be configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keywords: Vec::new(),
            severity: Severity::Error,
        }
    }

    /// Sets the keywords.
    #[must_use]
    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn check_file(&self, file: &SourceFile, keywords: &[String], out: &mut Vec<Violation>) {
        let lines = file.lines();
        for block in file.body().blocks() {
            let constructs = enumerate(file, &block.body);
            for (idx, construct) in constructs.iter().enumerate() {
                if construct.kind != ConstructKind::Attribute
                    || !keywords.iter().any(|k| k == construct.identifier)
                {
                    continue;
                }
                if !has_construct_after(&constructs, idx) {
                    continue;
                }
                let end_line = lines.line_of(construct.range.end);
                if file.trivia().is_blank(end_line + 1) {
                    continue;
                }

                let violation = Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    file.location(construct.range.clone()),
                    format!("{} must be followed by an empty newline", construct.identifier),
                );
                let mut planner = EditPlanner::new(file);
                let at = line_extended(file, construct.range.clone()).end;
                planner.insert(at, file.line_ending());
                out.push(attach_fix(violation, "insert an empty line", planner));
            }
        }
    }
}

impl Rule for NewlineAfterKeywords {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires an empty line after configured attributes"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn link(&self) -> Option<&'static str> {
        Some("docs/rules.md#st005-newline-after-keywords")
    }

    fn check(&self, ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let keywords = resolve_keywords(ctx, NAME, &self.keywords)?;
        if skip_unless_root(ctx, NAME) {
            return Ok(Vec::new());
        }

        let mut violations = Vec::new();
        for file in ctx.files() {
            self.check_file(file, &keywords, &mut violations);
        }
        Ok(violations)
    }
}
