//! Core types for lint violations and results.

use crate::source::LineIndex;
use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;

/// Severity level for lint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity `{other}`")),
        }
    }
}

/// Source code location.
///
/// Lines and columns are 1-indexed; columns count bytes. `offset` and
/// `length` describe the same range in bytes and are what fixes edit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to the analysis root.
    pub file: PathBuf,
    /// Start line.
    pub line: usize,
    /// Start column.
    pub column: usize,
    /// End line.
    pub end_line: usize,
    /// End column (exclusive).
    pub end_column: usize,
    /// Byte offset of the start.
    pub offset: usize,
    /// Length of the range in bytes.
    pub length: usize,
}

impl Location {
    /// Builds a location for a byte range, resolving positions through `lines`.
    ///
    /// A reversed range is treated as empty at its start.
    #[must_use]
    pub fn from_range(file: PathBuf, lines: &LineIndex, range: Range<usize>) -> Self {
        let start = range.start.min(lines.len());
        let end = range.end.clamp(start, lines.len());
        let (line, column) = lines.position(start);
        let (end_line, end_column) = lines.position(end);
        Self {
            file,
            line,
            column,
            end_line,
            end_column,
            offset: start,
            length: end - start,
        }
    }

    /// Creates a zero-width location at a line and column.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            end_line: line,
            end_column: column,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }

    /// Byte range covered by this location.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// A suggested fix for a violation.
///
/// `replacements` is applied as a unit: either every replacement lands or
/// none does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
    /// Byte-range edits against the original file text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replacements: Vec<Replacement>,
}

impl Suggestion {
    /// Creates a new suggestion without automatic fix.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            replacements: Vec::new(),
        }
    }

    /// Creates a new suggestion with an automatic fix.
    #[must_use]
    pub fn with_fix(message: impl Into<String>, replacements: Vec<Replacement>) -> Self {
        Self {
            message: message.into(),
            replacements,
        }
    }

    /// Returns `true` if this suggestion carries edits.
    #[must_use]
    pub fn is_fixable(&self) -> bool {
        !self.replacements.is_empty()
    }
}

/// An automatic code replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Location to replace.
    pub location: Location,
    /// New text to insert.
    pub new_text: String,
}

impl Replacement {
    /// Creates a new replacement.
    #[must_use]
    pub fn new(location: Location, new_text: impl Into<String>) -> Self {
        Self {
            location,
            new_text: new_text.into(),
        }
    }

    /// Byte range replaced in the original text.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.location.range()
    }

    /// Returns `true` for a zero-width insertion.
    #[must_use]
    pub fn is_insertion(&self) -> bool {
        self.location.length == 0
    }
}

/// A lint violation found during analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "ST001").
    pub code: String,
    /// Rule name (e.g., "blank-line-between-blocks").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Primary location of the violation.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Optional suggestion for fixing.
    pub suggestion: Option<Suggestion>,
    /// Documentation link for the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_ref: Option<String>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            message: message.into(),
            suggestion: None,
            doc_ref: None,
        }
    }

    /// Adds a documentation reference to this violation.
    ///
    /// The analyzer fills this from [`Rule::link`](crate::Rule::link).
    #[must_use]
    pub fn with_doc_ref(mut self, doc_ref: impl Into<String>) -> Self {
        self.doc_ref = Some(doc_ref.into());
        self
    }

    /// Adds a suggestion to this violation.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Attaches an automatic fix. An empty batch leaves the violation unfixable.
    #[must_use]
    pub fn with_fix(self, message: impl Into<String>, replacements: Vec<Replacement>) -> Self {
        self.with_suggestion(Suggestion::with_fix(message, replacements))
    }

    /// The fix batch, if any.
    #[must_use]
    pub fn fix(&self) -> Option<&[Replacement]> {
        self.suggestion
            .as_ref()
            .filter(|s| s.is_fixable())
            .map(|s| s.replacements.as_slice())
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )
    }
}

/// Converts a Violation to a miette Diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
    #[source_code]
    source_code: Option<miette::NamedSource<String>>,
}

impl ViolationDiagnostic {
    /// Attaches the file text so the span renders with context.
    #[must_use]
    pub fn with_source(mut self, name: impl AsRef<str>, text: impl Into<String>) -> Self {
        self.source_code = Some(miette::NamedSource::new(name, text.into()));
        self
    }
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            message: format!("[{}] {}", v.code, v.message),
            help: v.suggestion.as_ref().map(|s| s.message.clone()),
            span: SourceSpan::from((v.location.offset, v.location.length)),
            label_message: v.rule.clone(),
            source_code: None,
        }
    }
}

/// A rule that could not run for a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFailure {
    /// Rule name.
    pub rule: String,
    /// Module directory, relative to the analysis root.
    pub module: String,
    /// Error message.
    pub message: String,
}

impl std::fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (module {}): {}", self.rule, self.module, self.message)
    }
}

/// Result of running lint analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations found.
    pub violations: Vec<Violation>,
    /// Number of files checked.
    pub files_checked: usize,
    /// Rules that failed with a configuration error.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rule_failures: Vec<RuleFailure>,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Returns true if any rule failed to run.
    #[must_use]
    pub fn has_rule_failures(&self) -> bool {
        !self.rule_failures.is_empty()
    }

    /// Returns violations filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .collect()
    }

    /// Counts violations by severity.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |severity| {
            self.violations
                .iter()
                .filter(|v| v.severity == severity)
                .count()
        };
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Number of violations that carry an automatic fix.
    #[must_use]
    pub fn fixable_count(&self) -> usize {
        self.violations.iter().filter(|v| v.fix().is_some()).count()
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Adds violations from another result.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.files_checked += other.files_checked;
        self.rule_failures.extend(other.rule_failures);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation(severity: Severity) -> Violation {
        Violation::new(
            "ST001",
            "blank-line-between-blocks",
            severity,
            Location::new(PathBuf::from("main.tf"), 4, 1),
            "blocks must be separated by a blank line",
        )
    }

    // --- Location tests ---

    #[test]
    fn from_range_resolves_both_ends() {
        let text = "a {}\nresource \"x\" \"this\" {}\n";
        let lines = LineIndex::new(text);
        let loc = Location::from_range(PathBuf::from("main.tf"), &lines, 18..24);
        assert_eq!((loc.line, loc.column), (2, 14));
        assert_eq!((loc.end_line, loc.end_column), (2, 20));
        assert_eq!(loc.range(), 18..24);
    }

    #[test]
    fn from_range_clamps_past_eof() {
        let lines = LineIndex::new("a\n");
        let loc = Location::from_range(PathBuf::from("main.tf"), &lines, 1..99);
        assert_eq!(loc.range(), 1..2);
        assert_eq!((loc.end_line, loc.end_column), (2, 1));
    }

    // --- Violation tests ---

    #[test]
    fn with_fix_exposes_batch() {
        let loc = Location::new(PathBuf::from("main.tf"), 1, 1);
        let v = make_violation(Severity::Error)
            .with_fix("insert newline", vec![Replacement::new(loc, "\n")]);
        assert_eq!(v.fix().map(<[Replacement]>::len), Some(1));
    }

    #[test]
    fn empty_fix_is_not_fixable() {
        let v = make_violation(Severity::Error).with_fix("nothing", Vec::new());
        assert!(v.fix().is_none());
    }

    #[test]
    fn violation_display_is_single_line() {
        let v = make_violation(Severity::Error);
        insta::assert_snapshot!(
            v.to_string(),
            @"main.tf:4:1: error [ST001] blocks must be separated by a blank line"
        );
    }

    #[test]
    fn doc_ref_is_serialized_only_when_set() {
        let plain = serde_json::to_value(make_violation(Severity::Error)).unwrap();
        assert!(plain.get("doc_ref").is_none());

        let linked = make_violation(Severity::Error).with_doc_ref("docs/rules.md#st001");
        let json = serde_json::to_value(linked).unwrap();
        assert_eq!(json["doc_ref"], "docs/rules.md#st001");
    }

    // --- LintResult tests ---

    #[test]
    fn has_violations_at_error_only() {
        let mut result = LintResult::new();
        result.violations.push(make_violation(Severity::Warning));
        assert!(!result.has_violations_at(Severity::Error));
        assert!(result.has_violations_at(Severity::Warning));
    }

    #[test]
    fn count_by_severity_splits_levels() {
        let mut result = LintResult::new();
        result.violations.push(make_violation(Severity::Warning));
        result.violations.push(make_violation(Severity::Error));
        result.violations.push(make_violation(Severity::Error));
        assert_eq!(result.count_by_severity(), (2, 1, 0));
    }

    #[test]
    fn severity_parses_aliases() {
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
        assert!("fatal".parse::<Severity>().is_err());
    }
}
