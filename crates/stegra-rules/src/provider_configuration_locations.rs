//! Rule restricting where `provider` blocks may be declared.
//!
//! # Rationale
//!
//! Provider configuration belongs to the root configurations that are
//! applied, never to reusable modules. Listing the directories that hold
//! root configurations keeps providers out of everything else.
//!
//! # Configuration
//!
//! - `allowed_directories`: directories, relative to the analysis root,
//!   whose files may declare providers (required). `.` allows files
//!   directly in the analysis root.
//!
//! ```toml
//! [rules.provider-configuration-locations]
//! allowed_directories = [".", "env"]
//! ```
//!
//! Root module only. Detection only.

use crate::support::skip_unless_root;
use serde::Deserialize;
use stegra_core::source::extent::block_type_range;
use stegra_core::{slash_path, ModuleContext, Rule, RuleError, Severity, SourceFile, Violation};

/// Rule code for provider-configuration-locations.
pub const CODE: &str = "ST013";

/// Rule name for provider-configuration-locations.
pub const NAME: &str = "provider-configuration-locations";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProviderLocationOptions {
    #[serde(default)]
    allowed_directories: Option<Vec<String>>,
}

/// Allows `provider` blocks only in configured directories.
#[derive(Debug, Clone)]
pub struct ProviderConfigurationLocations {
    /// Directories that may declare providers. Overridden by
    /// `allowed_directories` in the configuration.
    pub allowed_directories: Vec<String>,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for ProviderConfigurationLocations {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderConfigurationLocations {
    /// Creates a new rule without directories; they must be configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allowed_directories: Vec::new(),
            severity: Severity::Error,
        }
    }

    /// Sets the allowed directories.
    #[must_use]
    pub fn allowed_directories(mut self, dirs: &[&str]) -> Self {
        self.allowed_directories = dirs.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn resolve_allowed(&self, ctx: &ModuleContext<'_>) -> Result<Vec<String>, RuleError> {
        let options: ProviderLocationOptions = ctx.decode_rule_config(NAME)?;
        let allowed: Vec<String> = options
            .allowed_directories
            .unwrap_or_else(|| self.allowed_directories.clone())
            .iter()
            .filter(|d| !d.is_empty())
            .map(|d| clean_path(d))
            .collect();
        if allowed.is_empty() {
            return Err(RuleError::MissingOption {
                rule: NAME,
                option: "allowed_directories",
            });
        }
        Ok(allowed)
    }

    fn check_file(&self, file: &SourceFile, allowed: &[String], out: &mut Vec<Violation>) {
        let path = clean_path(&slash_path(file.path()));
        if allowed.iter().any(|dir| is_under_dir(&path, dir)) {
            return;
        }
        for block in file.body().get_blocks("provider") {
            let Some(range) = block_type_range(block) else {
                continue;
            };
            out.push(Violation::new(
                CODE,
                NAME,
                self.severity,
                file.location(range),
                format!("provider block is only allowed under: {}", allowed.join(", ")),
            ));
        }
    }
}

impl Rule for ProviderConfigurationLocations {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Allows provider blocks only in configured directories"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn link(&self) -> Option<&'static str> {
        Some("docs/rules.md#st013-provider-configuration-locations")
    }

    fn check(&self, ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let allowed = self.resolve_allowed(ctx)?;
        if skip_unless_root(ctx, NAME) {
            return Ok(Vec::new());
        }
        let mut violations = Vec::new();
        for file in ctx.files() {
            self.check_file(file, &allowed, &mut violations);
        }
        Ok(violations)
    }
}

/// Lexically cleans a slash-separated path: drops empty and `.` segments
/// and resolves `..` against preceding segments. An empty result is `.`.
fn clean_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Whether `path` lies under `dir`; `.` matches files without a directory.
fn is_under_dir(path: &str, dir: &str) -> bool {
    if dir == "." {
        return !path.contains('/');
    }
    path == dir || path.strip_prefix(dir).is_some_and(|rest| rest.starts_with('/'))
}
