//! Parsed source files and the derived views rules work with.
//!
//! A [`SourceFile`] owns the raw text of one `.tf` file together with its
//! [`LineIndex`], per-line trivia classification, and the `hcl-edit` body.
//! All of it is computed once when the file is loaded and shared by
//! reference with every rule during a pass.

pub mod construct;
pub mod extent;
pub mod line_index;
pub mod trivia;

use crate::types::Location;
use hcl_edit::structure::{Attribute, Body};
use hcl_edit::template::HeredocTemplate;
use hcl_edit::visit::{visit_attr, visit_heredoc_template, Visit};
use hcl_edit::Span;
use std::ops::Range;
use std::path::{Path, PathBuf};

pub use construct::{Construct, ConstructKind, Misplaced};
pub use extent::Braces;
pub use line_index::LineIndex;
pub use trivia::{BlankLineRun, LineKind, Trivia};

/// Error returned when a file is not valid HCL.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    /// Path of the file that failed to parse.
    pub path: PathBuf,
    /// Parser message.
    pub message: String,
}

/// One analyzed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    lines: LineIndex,
    kinds: Vec<LineKind>,
    body: Body,
}

impl SourceFile {
    /// Parses `text` and builds the derived views.
    ///
    /// `path` is kept as given; the analyzer passes paths relative to the
    /// analysis root so that violations print short names.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `text` is not a valid HCL body.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, ParseError> {
        let path = path.into();
        let text = text.into();
        let body = hcl_edit::parser::parse_body(&text).map_err(|e| ParseError {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let lines = LineIndex::new(&text);
        let verbatim = verbatim_lines(&body, &lines);
        let kinds = trivia::classify_lines(&text, &lines, &verbatim);

        Ok(Self {
            path,
            text,
            lines,
            kinds,
            body,
        })
    }

    /// Path of the file, relative to the analysis root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file contents.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Line/byte offset table.
    #[must_use]
    pub fn lines(&self) -> &LineIndex {
        &self.lines
    }

    /// Parsed top-level body.
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Blank/comment/content view over the file's lines.
    #[must_use]
    pub fn trivia(&self) -> Trivia<'_> {
        Trivia::new(&self.kinds)
    }

    /// Returns `true` for native-syntax files (`*.tf`).
    ///
    /// JSON-serialized configuration (`*.tf.json`) is never analyzed.
    #[must_use]
    pub fn is_native_syntax(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext == "tf")
    }

    /// Line terminator used by this file: `"\r\n"` if any line uses it,
    /// `"\n"` otherwise.
    #[must_use]
    pub fn line_ending(&self) -> &'static str {
        if self.text.contains("\r\n") {
            "\r\n"
        } else {
            "\n"
        }
    }

    /// Slice of the text, or `""` for an invalid range.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> &str {
        self.text.get(range).unwrap_or("")
    }

    /// Builds a [`Location`] for a byte range of this file.
    #[must_use]
    pub fn location(&self, range: Range<usize>) -> Location {
        Location::from_range(self.path.clone(), &self.lines, range)
    }
}

/// Collects line spans of attributes whose value contains a heredoc.
///
/// Lines inside a heredoc are string content, so they must never be
/// classified as blank or comment lines.
fn verbatim_lines(body: &Body, lines: &LineIndex) -> Vec<Range<usize>> {
    struct HeredocFinder<'a> {
        lines: &'a LineIndex,
        in_heredoc: bool,
        found: Vec<Range<usize>>,
    }

    impl Visit for HeredocFinder<'_> {
        fn visit_attr(&mut self, node: &Attribute) {
            self.in_heredoc = false;
            visit_attr(self, node);
            if self.in_heredoc {
                if let Some(span) = node.span() {
                    let first = self.lines.line_of(span.start) + 1;
                    let last = self.lines.line_of(span.end);
                    if first <= last {
                        self.found.push(first..last + 1);
                    }
                }
            }
            self.in_heredoc = false;
        }

        fn visit_heredoc_template(&mut self, node: &HeredocTemplate) {
            self.in_heredoc = true;
            visit_heredoc_template(self, node);
        }
    }

    let mut finder = HeredocFinder {
        lines,
        in_heredoc: false,
        found: Vec::new(),
    };
    finder.visit_body(body);
    finder.found
}
