//! # stegra-core
//!
//! Core framework for style-linting Terraform / HCL sources.
//!
//! This crate provides the byte-exact source-edit engine and the
//! foundational traits and types for building rules on top of it:
//!
//! - [`source`]: line index, construct extents, blank/comment
//!   classification, and position-ordered construct enumeration
//! - [`edit`]: conflict-free edit batches and their application
//! - [`Rule`] trait for per-module rules
//! - [`Analyzer`] for discovering modules, running rules, and fixing
//! - [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use stegra_core::{Analyzer, Rule, Severity};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./infra")
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! for violation in &result.violations {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod fixer;
mod rule;
mod types;

/// Text edits: planning and application.
pub mod edit;
/// Parsed source files and derived views.
pub mod source;
/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{slash_path, Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::{Module, ModuleContext, ModulePath};
pub use edit::{EditError, EditPlanner};
pub use fixer::{FixReport, MAX_FIX_PASSES};
pub use rule::{Rule, RuleBox, RuleError};
pub use source::SourceFile;
pub use types::{
    LintResult, Location, Replacement, RuleFailure, Severity, Suggestion, Violation,
    ViolationDiagnostic,
};
pub use utils::allowance::AllowCheck;
