//! Context types for rule execution.

use crate::config::Config;
use crate::rule::RuleError;
use crate::source::SourceFile;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Identifies a Terraform module: one directory of `.tf` files.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModulePath {
    dir: PathBuf,
    root: bool,
}

impl ModulePath {
    /// The module at the analysis root.
    #[must_use]
    pub fn root() -> Self {
        Self {
            dir: PathBuf::new(),
            root: true,
        }
    }

    /// A module in `dir`, relative to the analysis root.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, root: bool) -> Self {
        Self {
            dir: dir.into(),
            root,
        }
    }

    /// Directory relative to the analysis root; empty for the root itself.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the module is analyzed as a root module.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.root
    }
}

impl std::fmt::Display for ModulePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.dir.as_os_str().is_empty() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.dir.display())
        }
    }
}

/// A loaded module: its path and parsed files.
#[derive(Debug, Clone)]
pub struct Module {
    /// Where the module lives.
    pub path: ModulePath,
    /// Parsed files, sorted by path.
    pub files: Vec<SourceFile>,
}

impl Module {
    /// Looks up a file by its root-relative path.
    #[must_use]
    pub fn file(&self, path: &Path) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.path() == path)
    }

    /// Rule context over this module.
    #[must_use]
    pub fn context<'a>(&'a self, config: &'a Config) -> ModuleContext<'a> {
        ModuleContext::new(&self.path, &self.files, config)
    }
}

/// Context provided to rules for one module.
#[derive(Debug, Clone, Copy)]
pub struct ModuleContext<'a> {
    module: &'a ModulePath,
    files: &'a [SourceFile],
    config: &'a Config,
}

impl<'a> ModuleContext<'a> {
    /// Creates a new module context.
    #[must_use]
    pub fn new(module: &'a ModulePath, files: &'a [SourceFile], config: &'a Config) -> Self {
        Self {
            module,
            files,
            config,
        }
    }

    /// The module being checked.
    #[must_use]
    pub fn module(&self) -> &'a ModulePath {
        self.module
    }

    /// Shorthand for `self.module().is_root()`.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.module.is_root()
    }

    /// Native-syntax (`.tf`) files of the module, in path order.
    pub fn files(&self) -> impl Iterator<Item = &'a SourceFile> + 'a {
        self.files.iter().filter(|f| f.is_native_syntax())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Decodes the options of `[rules.<rule>]` into `T`.
    ///
    /// `enabled` and `severity` are consumed by the analyzer and never
    /// reach `T`. A rule without a table decodes to `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidConfig`] if the options do not match `T`.
    pub fn decode_rule_config<T>(&self, rule: &'static str) -> Result<T, RuleError>
    where
        T: DeserializeOwned + Default,
    {
        let Some(rule_config) = self.config.rules.get(rule) else {
            return Ok(T::default());
        };

        let table: toml::Table = rule_config
            .options
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| RuleError::InvalidConfig {
                rule,
                message: e.message().to_string(),
            })
    }
}
