//! Core analyzer for orchestrating lint execution.

use crate::config::{Config, ConfigError};
use crate::context::{Module, ModulePath};
use crate::edit::EditError;
use crate::rule::{Rule, RuleBox};
use crate::source::SourceFile;
use crate::types::{LintResult, RuleFailure, Severity, Suggestion, Violation};
use crate::utils::allowance::check_allow_with_reason;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading or writing files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing a Terraform source file.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Directory traversal error.
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Accepted fixes could not be applied.
    #[error("Failed to apply fixes: {0}")]
    Edit(#[from] EditError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: Option<bool>,
    recursive: Option<bool>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern, matched against root-relative paths.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on parse errors (default: from configuration).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = Some(fail);
        self
    }

    /// Sets whether every directory is a root module (default: from
    /// configuration).
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = Some(recursive);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be read or an
    /// exclude pattern is invalid.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let exclude = self
            .exclude_patterns
            .iter()
            .chain(&config.analyzer.exclude)
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude,
            fail_on_parse_error: self
                .fail_on_parse_error
                .unwrap_or(config.analyzer.fail_on_parse_error),
            recursive: self.recursive.unwrap_or(config.analyzer.recursive),
            respect_gitignore: config.analyzer.respect_gitignore,
            config,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude: Vec<glob::Pattern>,
    config: Config,
    fail_on_parse_error: bool,
    recursive: bool,
    respect_gitignore: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyzes all modules under the root and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery or reading fails, or if a file
    /// fails to parse while `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);
        let modules = self.load_modules()?;
        let result = self.check_modules(&modules);
        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );
        Ok(result)
    }

    /// Discovers, reads, and parses every module under the root.
    ///
    /// # Errors
    ///
    /// See [`Analyzer::analyze`].
    pub fn load_modules(&self) -> Result<Vec<Module>, AnalyzerError> {
        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let mut by_dir: BTreeMap<PathBuf, Vec<SourceFile>> = BTreeMap::new();
        for relative in files {
            let content = std::fs::read_to_string(self.root.join(&relative))?;
            match SourceFile::parse(&relative, content) {
                Ok(file) => {
                    let dir = relative.parent().map(Path::to_path_buf).unwrap_or_default();
                    by_dir.entry(dir).or_default().push(file);
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}", e.path.display(), e.message);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Parse {
                            path: e.path,
                            message: e.message,
                        });
                    }
                }
            }
        }

        Ok(by_dir
            .into_iter()
            .map(|(dir, files)| {
                let root = self.recursive || dir.as_os_str().is_empty();
                Module {
                    path: ModulePath::new(dir, root),
                    files,
                }
            })
            .collect())
    }

    /// Runs every enabled rule over already loaded modules.
    #[must_use]
    pub fn check_modules(&self, modules: &[Module]) -> LintResult {
        let mut result = LintResult::new();
        let mut failed: HashSet<&'static str> = HashSet::new();

        for module in modules {
            debug!("Checking module {}", module.path);
            result.files_checked += module.files.iter().filter(|f| f.is_native_syntax()).count();
            let ctx = module.context(&self.config);

            for rule in &self.rules {
                if !self.config.is_rule_enabled(rule.name(), rule.enabled_by_default()) {
                    debug!("Skipping disabled rule: {}", rule.name());
                    continue;
                }
                if failed.contains(rule.name()) {
                    continue;
                }

                match rule.check(&ctx) {
                    Ok(violations) => {
                        let violations = Self::apply_allowances(rule.as_ref(), module, violations);
                        let violations = self.apply_severity_override(rule.name(), violations);
                        result.violations.extend(Self::attach_link(rule.as_ref(), violations));
                    }
                    Err(e) => {
                        error!("Rule {} failed in module {}: {e}", rule.name(), module.path);
                        failed.insert(rule.name());
                        result.rule_failures.push(RuleFailure {
                            rule: rule.name().to_string(),
                            module: module.path.to_string(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        // Sort violations by file, then position
        result.violations.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
                .then(a.code.cmp(&b.code))
        });

        result
    }

    /// Drops violations covered by an allow directive.
    ///
    /// A directive without a reason on a rule that requires one is replaced
    /// by a warning about the missing reason.
    fn apply_allowances(
        rule: &dyn Rule,
        module: &Module,
        violations: Vec<Violation>,
    ) -> Vec<Violation> {
        let mut kept = Vec::with_capacity(violations.len());

        for violation in violations {
            let Some(file) = module.file(&violation.location.file) else {
                kept.push(violation);
                continue;
            };

            let allow_check =
                check_allow_with_reason(file, violation.location.line, rule.name(), rule.code());
            if !allow_check.is_allowed() {
                kept.push(violation);
                continue;
            }

            debug!(
                "Allowed {} at {}:{}",
                rule.name(),
                violation.location.file.display(),
                violation.location.line
            );
            if rule.requires_allow_reason() && allow_check.reason().is_none() {
                kept.push(
                    Violation::new(
                        rule.code(),
                        rule.name(),
                        Severity::Warning,
                        violation.location,
                        format!("Allow directive for '{}' is missing required reason", rule.name()),
                    )
                    .with_suggestion(Suggestion::new(
                        "Add reason=\"...\" to explain why this exception is necessary",
                    )),
                );
            }
        }

        kept
    }

    /// Points violations without a documentation reference at the rule's
    /// link.
    fn attach_link(rule: &dyn Rule, mut violations: Vec<Violation>) -> Vec<Violation> {
        if let Some(link) = rule.link() {
            for v in violations.iter_mut().filter(|v| v.doc_ref.is_none()) {
                v.doc_ref = Some(link.to_string());
            }
        }
        violations
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }

    /// Discovers all `.tf` files to analyze, as root-relative paths.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder.hidden(false).git_ignore(self.respect_gitignore);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || path.extension().map_or(true, |ext| ext != "tf") {
                continue;
            }

            let relative = path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();
            if self.should_exclude(&relative) {
                debug!("Excluding: {}", relative.display());
                continue;
            }

            files.push(relative);
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a root-relative path matches an exclude pattern.
    fn should_exclude(&self, relative: &Path) -> bool {
        let path_str = slash_path(relative);
        self.exclude.iter().any(|pattern| pattern.matches(&path_str))
    }
}

/// Renders a relative path with `/` separators.
#[must_use]
pub fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ModuleContext;
    use crate::rule::RuleError;
    use std::fs;
    use tempfile::TempDir;

    /// Flags every `resource` block and offers to delete it.
    struct NoResources;

    impl Rule for NoResources {
        fn name(&self) -> &'static str {
            "no-resources"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn link(&self) -> Option<&'static str> {
            Some("docs/rules.md#test001")
        }
        fn check(&self, ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
            let mut out = Vec::new();
            for file in ctx.files() {
                for block in file.body().get_blocks("resource") {
                    let Some(range) = crate::source::extent::block_range(block) else {
                        continue;
                    };
                    out.push(Violation::new(
                        self.code(),
                        self.name(),
                        self.default_severity(),
                        file.location(range),
                        "resource found",
                    ));
                }
            }
            Ok(out)
        }
    }

    /// Only runs in root modules and always fails on configuration.
    struct Misconfigured;

    impl Rule for Misconfigured {
        fn name(&self) -> &'static str {
            "misconfigured"
        }
        fn code(&self) -> &'static str {
            "TEST002"
        }
        fn check(&self, _ctx: &ModuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
            Err(RuleError::MissingOption {
                rule: "misconfigured",
                option: "keywords",
            })
        }
    }

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_builder() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/fixtures/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.root().exists());
        assert_eq!(analyzer.rule_count(), 0);
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let result = Analyzer::builder().root(".").exclude("[").build();
        assert!(matches!(result, Err(AnalyzerError::Glob(_))));
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/vendor/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.should_exclude(Path::new(".terraform/modules/vpc/main.tf")));
        assert!(analyzer.should_exclude(Path::new("env/.terraform/x.tf")));
        assert!(analyzer.should_exclude(Path::new("vendor/a/main.tf")));
        assert!(!analyzer.should_exclude(Path::new("modules/vpc/main.tf")));
    }

    #[test]
    fn test_groups_files_into_modules() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.tf", "resource \"a\" \"b\" {}\n");
        write(&dir, "variables.tf", "variable \"x\" {}\n");
        write(&dir, "modules/vpc/main.tf", "resource \"c\" \"d\" {}\n");
        write(&dir, ".terraform/modules/m/main.tf", "resource \"e\" \"f\" {}\n");
        write(&dir, "README.md", "not terraform\n");

        let analyzer = Analyzer::builder()
            .root(dir.path())
            .recursive(false)
            .build()
            .unwrap();
        let modules = analyzer.load_modules().unwrap();

        assert_eq!(modules.len(), 2);
        assert!(modules[0].path.is_root());
        assert_eq!(modules[0].files.len(), 2);
        assert_eq!(modules[1].path.dir(), Path::new("modules/vpc"));
        assert!(!modules[1].path.is_root());
    }

    #[test]
    fn test_recursive_makes_every_module_root() {
        let dir = TempDir::new().unwrap();
        write(&dir, "envs/prod/main.tf", "locals {}\n");

        let analyzer = Analyzer::builder().root(dir.path()).build().unwrap();
        let modules = analyzer.load_modules().unwrap();
        assert!(modules.iter().all(|m| m.path.is_root()));
    }

    #[test]
    fn test_parse_errors_are_skipped_or_fatal() {
        let dir = TempDir::new().unwrap();
        write(&dir, "broken.tf", "resource {\n");
        write(&dir, "main.tf", "resource \"a\" \"b\" {}\n");

        let lenient = Analyzer::builder()
            .root(dir.path())
            .rule(NoResources)
            .build()
            .unwrap();
        let result = lenient.analyze().unwrap();
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].location.file, PathBuf::from("main.tf"));

        let strict = Analyzer::builder()
            .root(dir.path())
            .fail_on_parse_error(true)
            .build()
            .unwrap();
        assert!(matches!(
            strict.analyze(),
            Err(AnalyzerError::Parse { .. })
        ));
    }

    #[test]
    fn test_allow_directive_with_reason_suppresses() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "main.tf",
            "# stegra: allow(no-resources) reason=\"legacy\"\nresource \"a\" \"b\" {}\n\nresource \"c\" \"d\" {}\n",
        );

        let analyzer = Analyzer::builder()
            .root(dir.path())
            .rule(NoResources)
            .build()
            .unwrap();
        let result = analyzer.analyze().unwrap();
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].location.line, 4);
    }

    #[test]
    fn test_allow_directive_without_reason_warns() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "main.tf",
            "# stegra: allow(TEST001)\nresource \"a\" \"b\" {}\n",
        );

        let analyzer = Analyzer::builder()
            .root(dir.path())
            .rule(NoResources)
            .build()
            .unwrap();
        let result = analyzer.analyze().unwrap();
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].severity, Severity::Warning);
        assert!(result.violations[0].message.contains("missing required reason"));
    }

    #[test]
    fn test_severity_override_and_disable() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.tf", "resource \"a\" \"b\" {}\n");

        let config = Config::parse("[rules.no-resources]\nseverity = \"info\"\n").unwrap();
        let analyzer = Analyzer::builder()
            .root(dir.path())
            .config(config)
            .rule(NoResources)
            .build()
            .unwrap();
        let result = analyzer.analyze().unwrap();
        assert_eq!(result.violations[0].severity, Severity::Info);

        let config = Config::parse("[rules.no-resources]\nenabled = false\n").unwrap();
        let analyzer = Analyzer::builder()
            .root(dir.path())
            .config(config)
            .rule(NoResources)
            .build()
            .unwrap();
        assert!(analyzer.analyze().unwrap().violations.is_empty());
    }

    #[test]
    fn test_rule_failure_is_recorded_once() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a/main.tf", "locals {}\n");
        write(&dir, "b/main.tf", "locals {}\n");

        let analyzer = Analyzer::builder()
            .root(dir.path())
            .rule(Misconfigured)
            .rule(NoResources)
            .build()
            .unwrap();
        let result = analyzer.analyze().unwrap();
        assert_eq!(result.rule_failures.len(), 1);
        assert_eq!(result.rule_failures[0].rule, "misconfigured");
        assert_eq!(result.rule_failures[0].module, "a");
        assert!(result.has_rule_failures());
    }

    #[test]
    fn test_violations_carry_rule_link() {
        let dir = TempDir::new().unwrap();
        write(&dir, "main.tf", "resource \"a\" \"b\" {}\n");

        let analyzer = Analyzer::builder()
            .root(dir.path())
            .rule(NoResources)
            .build()
            .unwrap();
        let result = analyzer.analyze().unwrap();
        assert_eq!(result.violations.len(), 1);
        assert_eq!(
            result.violations[0].doc_ref.as_deref(),
            Some("docs/rules.md#test001")
        );
    }

    #[test]
    fn test_slash_path() {
        assert_eq!(slash_path(Path::new("a/b/c.tf")), "a/b/c.tf");
        assert_eq!(slash_path(Path::new("main.tf")), "main.tf");
    }
}
