//! Rule forbidding `this` as a resource name.
//!
//! # Rationale
//!
//! `this` says nothing about the object and reads badly in references
//! (`aws_s3_bucket.this.id`). The module convention is `main` for the
//! primary resource of a type.
//!
//! # Fix
//!
//! Renames the label to `"main"` and rewrites every `<type>.this`
//! reference in the module, across all of its files. References inside
//! string and heredoc interpolations are included.

use hcl_edit::expr::{Expression, Traversal, TraversalOperator};
use hcl_edit::structure::Body;
use hcl_edit::visit::{visit_traversal, Visit};
use hcl_edit::Span;
use std::ops::Range;
use stegra_core::source::extent::label_range;
use stegra_core::{
    EditPlanner, ModuleContext, Replacement, Rule, RuleError, Severity, SourceFile, Violation,
};
use tracing::warn;

use crate::support::{object_name, object_type};

/// Rule code for no-this-resource-name.
pub const CODE: &str = "ST011";

/// Rule name for no-this-resource-name.
pub const NAME: &str = "no-this-resource-name";

const REPLACEMENT_NAME: &str = "main";

/// Forbids naming a resource `this`.
#[derive(Debug, Clone)]
pub struct NoThisResourceName {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoThisResourceName {
    fn default() -> Self {
        Self::new()
    }
}

impl NoThisResourceName {
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
}

impl Rule for NoThisResourceName {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids naming resources 'this'"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn link(&self) -> Option<&'static str> {
        Some("docs/rules.md#st011-no-this-resource-name")
    }

    fn check(&self, ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let files: Vec<&SourceFile> = ctx.files().collect();
        let mut violations = Vec::new();

        for file in &files {
            for block in file.body().get_blocks("resource") {
                let (Some(resource_type), Some(name)) = (object_type(block), object_name(block))
                else {
                    continue;
                };
                if !name.eq_ignore_ascii_case("this") {
                    continue;
                }
                let Some(label) = block.labels.get(1).and_then(label_range) else {
                    continue;
                };

                let references: Vec<(&SourceFile, Vec<Range<usize>>)> = files
                    .iter()
                    .map(|f| (*f, find_references(f.body(), resource_type, name)))
                    .filter(|(_, hits)| !hits.is_empty())
                    .collect();

                let message = if references.is_empty() {
                    "resource name must not be 'this' (renamed to 'main')"
                } else {
                    "resource name must not be 'this' (renamed to 'main' and updated references)"
                };
                let violation = Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    file.location(label.clone()),
                    message,
                );

                match rename_batch(file, label, &references) {
                    Ok(batch) => violations.push(violation.with_fix(
                        format!("rename {resource_type}.{name} to {resource_type}.{REPLACEMENT_NAME}"),
                        batch,
                    )),
                    Err(e) => {
                        warn!("{NAME}: dropping rename of {resource_type}.{name}: {e}");
                        violations.push(violation);
                    }
                }
            }
        }
        Ok(violations)
    }
}

/// Builds one batch that renames the label and every reference, grouped
/// per file.
fn rename_batch(
    file: &SourceFile,
    label: Range<usize>,
    references: &[(&SourceFile, Vec<Range<usize>>)],
) -> Result<Vec<Replacement>, stegra_core::EditError> {
    let mut batch = Vec::new();

    let mut planner = EditPlanner::new(file);
    planner.replace(label, format!("\"{REPLACEMENT_NAME}\""));
    for (_, hits) in references.iter().filter(|(f, _)| f.path() == file.path()) {
        for hit in hits {
            planner.replace(hit.clone(), REPLACEMENT_NAME);
        }
    }
    batch.extend(planner.finish()?);

    for (other, hits) in references.iter().filter(|(f, _)| f.path() != file.path()) {
        let mut planner = EditPlanner::new(other);
        for hit in hits {
            planner.replace(hit.clone(), REPLACEMENT_NAME);
        }
        batch.extend(planner.finish()?);
    }
    Ok(batch)
}

/// Byte ranges of the name step of every `<resource_type>.<name>`
/// traversal in `body`.
fn find_references(body: &Body, resource_type: &str, name: &str) -> Vec<Range<usize>> {
    let mut finder = ReferenceFinder {
        resource_type,
        name,
        hits: Vec::new(),
    };
    finder.visit_body(body);
    finder.hits
}

struct ReferenceFinder<'a> {
    resource_type: &'a str,
    name: &'a str,
    hits: Vec<Range<usize>>,
}

impl Visit for ReferenceFinder<'_> {
    fn visit_traversal(&mut self, node: &Traversal) {
        if let Expression::Variable(root) = &node.expr {
            if root.as_str() == self.resource_type {
                if let Some(TraversalOperator::GetAttr(step)) = node.operators.first().map(|op| op.value()) {
                    if step.as_str() == self.name {
                        if let Some(span) = step.span() {
                            self.hits.push(span);
                        }
                    }
                }
            }
        }
        visit_traversal(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::testing::{check_code, fix_code, fix_pass, module};
    use std::path::PathBuf;

    #[test]
    fn test_detects_this_and_reports_references() {
        let violations = check_code(
            &NoThisResourceName::new(),
            "resource \"aws_s3_bucket\" \"this\" {}\nresource \"aws_iam_role\" \"r\" {\n  name = aws_s3_bucket.this.id\n}\n",
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "resource name must not be 'this' (renamed to 'main' and updated references)"
        );
        let loc = &violations[0].location;
        assert_eq!((loc.line, loc.column, loc.end_line, loc.end_column), (1, 26, 1, 32));
    }

    #[test]
    fn test_unreferenced_message() {
        let violations = check_code(&NoThisResourceName::new(), "resource \"aws_s3_bucket\" \"this\" {}\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "resource name must not be 'this' (renamed to 'main')");
    }

    #[test]
    fn test_ignores_data_sources_and_other_names() {
        let violations = check_code(
            &NoThisResourceName::new(),
            "data \"aws_s3_bucket\" \"this\" {}\nresource \"aws_s3_bucket\" \"thistle\" {}\n",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_find_references_matches_type_and_name_only() {
        let file = SourceFile::parse(
            "main.tf",
            r#"locals {
  a = aws_s3_bucket.this.id
  b = aws_s3_bucket.other.id
  c = aws_iam_role.this.arn
  d = "${aws_s3_bucket.this.arn}/*"
  e = [for b in aws_s3_bucket.this[*] : b.id]
  f = data.aws_s3_bucket.this.id
}
"#,
        )
        .unwrap();
        let hits = find_references(file.body(), "aws_s3_bucket", "this");
        let lines: Vec<usize> = hits.iter().map(|r| file.lines().line_of(r.start)).collect();
        assert_eq!(lines, vec![2, 5, 6]);
        assert!(hits.iter().all(|r| file.slice(r.clone()) == "this"));
    }

    // --- fixes ---

    #[test]
    fn test_fix_renames_label_and_references() {
        let fixed = fix_code(
            &NoThisResourceName::new(),
            "resource \"aws_s3_bucket\" \"this\" {}\nresource \"aws_iam_role\" \"r\" {\n  name = aws_s3_bucket.this.id\n}\n",
        );
        assert_eq!(
            fixed,
            "resource \"aws_s3_bucket\" \"main\" {}\nresource \"aws_iam_role\" \"r\" {\n  name = aws_s3_bucket.main.id\n}\n"
        );
    }

    #[test]
    fn test_fix_updates_references_in_other_files() {
        let module = module(
            "",
            true,
            &[
                ("main.tf", "resource \"aws_s3_bucket\" \"this\" {\n  bucket = \"b\"\n}\n"),
                (
                    "outputs.tf",
                    "output \"arn\" {\n  value = \"${aws_s3_bucket.this.arn}/*\"\n}\n",
                ),
                ("vars.tf", "variable \"x\" {}\n"),
            ],
        );
        let fixed = fix_pass(&NoThisResourceName::new(), &module, &Default::default());
        assert_eq!(
            fixed[&PathBuf::from("main.tf")],
            "resource \"aws_s3_bucket\" \"main\" {\n  bucket = \"b\"\n}\n"
        );
        assert_eq!(
            fixed[&PathBuf::from("outputs.tf")],
            "output \"arn\" {\n  value = \"${aws_s3_bucket.main.arn}/*\"\n}\n"
        );
        assert_eq!(fixed[&PathBuf::from("vars.tf")], "variable \"x\" {}\n");
    }
}
