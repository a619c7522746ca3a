//! # stegra-rules
//!
//! Built-in style rules for stegra.
//!
//! Every rule works on a whole Terraform module and, where the change is
//! mechanical, carries a byte-exact fix that leaves comments, indentation,
//! and line endings alone.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | ST001 | `blank-line-between-blocks` | Requires a blank line between consecutive resource, data, and module blocks |
//! | ST002 | `depends-on-last` | Requires `depends_on` to be the last construct of its block |
//! | ST003 | `empty-block-one-line` | Requires empty blocks to be written as `{}` |
//! | ST004 | `keywords-first` | Requires meta-argument keywords before other constructs |
//! | ST005 | `newline-after-keywords` | Requires a blank line after each meta-argument keyword |
//! | ST006 | `no-blank-line-between-required-providers` | Forbids blank lines between `required_providers` entries |
//! | ST007 | `no-blank-lines-in-required-providers` | Forbids any blank line inside `required_providers` (off by default) |
//! | ST008 | `no-block-edge-blank-lines` | Forbids blank lines right after `{` and right before `}` |
//! | ST009 | `no-leading-trailing-blank-lines` | Forbids blank lines at the start and end of a file |
//! | ST010 | `no-multiple-blank-lines` | Forbids consecutive blank lines |
//! | ST011 | `no-this-resource-name` | Forbids naming resources `this` |
//! | ST012 | `no-type-in-name` | Forbids names that repeat their type |
//! | ST013 | `provider-configuration-locations` | Allows `provider` blocks only in configured directories |
//!
//! ## Usage
//!
//! ```ignore
//! use stegra_core::Analyzer;
//! use stegra_rules::{BlankLineBetweenBlocks, NoMultipleBlankLines};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./infra")
//!     .rule(BlankLineBetweenBlocks::new())
//!     .rule(NoMultipleBlankLines::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod blank_line_between_blocks;
mod depends_on_last;
mod empty_block_one_line;
mod keywords_first;
mod newline_after_keywords;
mod no_blank_line_between_required_providers;
mod no_blank_lines_in_required_providers;
mod no_block_edge_blank_lines;
mod no_leading_trailing_blank_lines;
mod no_multiple_blank_lines;
mod no_this_resource_name;
mod no_type_in_name;
mod presets;
mod provider_configuration_locations;
mod support;

pub use blank_line_between_blocks::BlankLineBetweenBlocks;
pub use depends_on_last::DependsOnLast;
pub use empty_block_one_line::EmptyBlockOneLine;
pub use keywords_first::KeywordsFirst;
pub use newline_after_keywords::NewlineAfterKeywords;
pub use no_blank_line_between_required_providers::NoBlankLineBetweenRequiredProviders;
pub use no_blank_lines_in_required_providers::NoBlankLinesInRequiredProviders;
pub use no_block_edge_blank_lines::NoBlockEdgeBlankLines;
pub use no_leading_trailing_blank_lines::NoLeadingTrailingBlankLines;
pub use no_multiple_blank_lines::NoMultipleBlankLines;
pub use no_this_resource_name::NoThisResourceName;
pub use no_type_in_name::NoTypeInName;
pub use presets::{all_rules, minimal_rules, recommended_rules, strict_rules, Preset};
pub use provider_configuration_locations::ProviderConfigurationLocations;

/// Re-export core types for convenience.
pub use stegra_core::{Rule, Severity, Violation};
