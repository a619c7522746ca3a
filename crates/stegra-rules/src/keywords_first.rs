//! Rule requiring configured meta-arguments to lead `resource` and `data`
//! blocks.
//!
//! # Rationale
//!
//! Arguments such as `for_each`, `count`, or `provider` change how a block
//! is instantiated. Reading them first tells the reader how many objects
//! the block creates before any of their settings.
//!
//! # Detected Patterns
//!
//! - Any attribute or nested block placed before one of the configured
//!   attributes
//!
//! # Configuration
//!
//! - `keywords`: attribute names that must come first (required)
//!
//! ```toml
//! [rules.keywords-first]
//! keywords = ["for_each", "count"]
//! ```
//!
//! Root module only.

use crate::support::{attach_fix, resolve_keywords, skip_unless_root};
use stegra_core::source::construct::{enumerate, first_misplaced, Construct, ConstructKind};
use stegra_core::source::extent::block_braces;
use stegra_core::{EditPlanner, ModuleContext, Rule, RuleError, Severity, SourceFile, Violation};

/// Rule code for keywords-first.
pub const CODE: &str = "ST004";

/// Rule name for keywords-first.
pub const NAME: &str = "keywords-first";

/// Requires the configured attributes to appear before anything else.
#[derive(Debug, Clone)]
pub struct KeywordsFirst {
    /// Attribute names that must come first. Overridden by `keywords` in
    /// the configuration.
    pub keywords: Vec<String>,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for KeywordsFirst {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordsFirst {
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
        let is_member = |c: &Construct<'_>| {
            c.kind == ConstructKind::Attribute && keywords.iter().any(|k| k == c.identifier)
        };

        for block in file.body().blocks() {
            if !matches!(block.ident.as_str(), "resource" | "data") {
                continue;
            }
            let constructs = enumerate(file, &block.body);
            let Some(misplaced) = first_misplaced(&constructs, is_member) else {
                continue;
            };

            let offender = &constructs[misplaced.offender];
            let range = match offender.kind {
                ConstructKind::Attribute => offender.range.clone(),
                ConstructKind::Block => offender.ident_range.clone(),
            };
            let violation = Violation::new(
                CODE,
                NAME,
                self.severity,
                file.location(range),
                format!(
                    "These attributes must appear first in this block: {}",
                    keywords.join(", ")
                ),
            );

            let mut planner = EditPlanner::new(file);
            let anchor = match constructs.get(misplaced.anchor_member + 1) {
                Some(next) => Some(planner.anchor_before(next.range.start)),
                None => block_braces(file, block).map(|b| planner.anchor_before_close(b)),
            };
            if let Some(anchor) = anchor {
                let moved: Vec<_> = misplaced
                    .offenders
                    .iter()
                    .map(|&i| planner.movable_range(constructs[i].range.clone()))
                    .collect();
                planner.move_all_before(&moved, anchor);
            }
            out.push(attach_fix(violation, "move the keyword attributes first", planner));
        }
    }
}

impl Rule for KeywordsFirst {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires configured attributes to appear first in resource and data blocks"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn link(&self) -> Option<&'static str> {
        Some("docs/rules.md#st004-keywords-first")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::testing::{check_code, config, fix_code, module, run};

    fn rule() -> KeywordsFirst {
        KeywordsFirst::new().keywords(&["for_each", "count"])
    }

    #[test]
    fn test_allows_keyword_first() {
        let violations = check_code(
            &rule(),
            "resource \"aws_vpc\" \"a\" {\nfor_each = []\nname = \"a\"\n}\n",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_detects_attribute_before_keyword() {
        let violations = check_code(
            &rule(),
            "resource \"aws_vpc\" \"a\" {\nname = \"a\"\nfor_each = []\n}\n",
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "These attributes must appear first in this block: for_each, count"
        );
        let loc = &violations[0].location;
        assert_eq!((loc.line, loc.column, loc.end_line, loc.end_column), (2, 1, 2, 11));
    }

    #[test]
    fn test_keywords_in_any_order() {
        let violations = check_code(
            &rule(),
            "resource \"aws_vpc\" \"a\" {\ncount = 1\nfor_each = []\nname = \"a\"\n}\n",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_no_keywords_present() {
        let violations = check_code(&rule(), "data \"aws_vpc\" \"a\" {\nname = \"a\"\n}\n");
        assert!(violations.is_empty());
    }

    #[test]
    fn test_nested_block_before_keyword_reports_type_keyword() {
        let violations = check_code(
            &rule(),
            "resource \"aws_vpc\" \"a\" {\n  lifecycle {}\n  count = 1\n}\n",
        );
        assert_eq!(violations.len(), 1);
        let loc = &violations[0].location;
        assert_eq!((loc.line, loc.column, loc.end_column), (2, 3, 12));
    }

    #[test]
    fn test_reports_once_per_block() {
        let violations = check_code(
            &rule(),
            "resource \"aws_vpc\" \"a\" {\nname = \"a\"\ntags = {}\ncount = 1\n}\n",
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 2);
    }

    #[test]
    fn test_skips_child_modules() {
        let module = module(
            "modules/vpc",
            false,
            &[("modules/vpc/main.tf", "resource \"a\" \"b\" {\nname = 1\ncount = 1\n}\n")],
        );
        let violations = run(&rule(), &module, &Default::default()).unwrap();
        assert!(violations.is_empty());
    }

    // --- configuration ---

    #[test]
    fn test_missing_keywords_is_an_error() {
        let module = module("", true, &[("main.tf", "")]);
        let err = run(&KeywordsFirst::new(), &module, &Default::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "keywords-first: keywords option is required; set it in stegra.toml [rules.keywords-first]"
        );
    }

    #[test]
    fn test_configured_keywords_override_builtin() {
        let module = module(
            "",
            true,
            &[("main.tf", "resource \"a\" \"b\" {\nname = 1\nprovider = aws.east\n}\n")],
        );
        let config = config("[rules.keywords-first]\nkeywords = [\"provider\"]\n");
        let violations = run(&rule(), &module, &config).unwrap();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.ends_with(": provider"));
    }

    #[test]
    fn test_invalid_keywords_type() {
        let module = module("", true, &[("main.tf", "")]);
        let config = config("[rules.keywords-first]\nkeywords = \"count\"\n");
        let err = run(&KeywordsFirst::new(), &module, &config).unwrap_err();
        assert!(matches!(err, RuleError::InvalidConfig { rule: NAME, .. }));
    }

    // --- fixes ---

    #[test]
    fn test_fix_moves_offender_after_keyword() {
        let fixed = fix_code(
            &rule(),
            "resource \"aws_vpc\" \"a\" {\nname = \"a\"\nfor_each = []\n}\n",
        );
        assert_eq!(fixed, "resource \"aws_vpc\" \"a\" {\nfor_each = []\nname = \"a\"\n}\n");
    }

    #[test]
    fn test_fix_moves_all_offenders_in_one_pass() {
        let code = r#"resource "aws_instance" "web" {
  # image
  ami = "ami-123"

  tags = {}
  count = 2
  # sizing
  instance_type = "t3.micro"
}
"#;
        let fixed = fix_code(&rule(), code);
        insta::assert_snapshot!(fixed, @r###"
        resource "aws_instance" "web" {

          count = 2
          # image
          ami = "ami-123"
          tags = {}
          # sizing
          instance_type = "t3.micro"
        }
        "###);
    }
}
