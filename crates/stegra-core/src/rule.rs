//! Rule trait for defining lint rules.

use crate::context::ModuleContext;
use crate::types::{Severity, Violation};

/// Errors a rule reports instead of violations.
///
/// Returned when the rule cannot run at all, typically because its options
/// are missing or malformed. The analyzer records the failure and skips
/// the rule for the rest of the pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// A required option is not set.
    #[error("{rule}: {option} option is required; set it in stegra.toml [rules.{rule}]")]
    MissingOption {
        /// Rule name.
        rule: &'static str,
        /// Option key.
        option: &'static str,
    },

    /// Options are present but cannot be decoded.
    #[error("{rule}: invalid configuration: {message}")]
    InvalidConfig {
        /// Rule name.
        rule: &'static str,
        /// Decoder message.
        message: String,
    },
}

/// A lint rule over one Terraform module.
///
/// Rules receive every parsed file of a module at once, so a fix may touch
/// several files (for example renaming a resource and its references).
/// Violations are reported by return value.
///
/// # Example
///
/// ```ignore
/// use stegra_core::{ModuleContext, Rule, RuleError, Violation};
///
/// pub struct NoEmptyFiles;
///
/// impl Rule for NoEmptyFiles {
///     fn name(&self) -> &'static str { "no-empty-files" }
///     fn code(&self) -> &'static str { "ST100" }
///
///     fn check(&self, ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
///         Ok(ctx
///             .files()
///             .filter(|f| f.body().is_empty())
///             .map(|f| Violation::new(
///                 self.code(),
///                 self.name(),
///                 self.default_severity(),
///                 f.location(0..0),
///                 "file declares nothing",
///             ))
///             .collect())
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "depends-on-last").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "ST002").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Documentation link for this rule.
    fn link(&self) -> Option<&'static str> {
        None
    }

    /// Whether this rule runs when the configuration does not mention it.
    fn enabled_by_default(&self) -> bool {
        true
    }

    /// Whether this rule requires a reason when using allow directives.
    ///
    /// By default, rules with `Severity::Error` require a reason. This
    /// follows the rule's own default, not a configured override.
    fn requires_allow_reason(&self) -> bool {
        self.default_severity() == Severity::Error
    }

    /// Checks one module and returns any violations found.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the rule's configuration is unusable.
    fn check(&self, ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
