//! Helpers shared by the rule implementations.

use hcl_edit::structure::{Block, Body};
use serde::Deserialize;
use stegra_core::{EditPlanner, ModuleContext, RuleError, Violation};
use tracing::{debug, warn};

/// Top-level block kinds that declare infrastructure objects.
pub(crate) const OBJECT_KINDS: [&str; 3] = ["resource", "data", "module"];

/// `[rules.<name>]` options of the rules driven by a keyword list.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct KeywordsOptions {
    #[serde(default)]
    pub(crate) keywords: Option<Vec<String>>,
}

/// Resolves the keyword list of `rule`: configured keywords win over the
/// ones set on the rule value.
pub(crate) fn resolve_keywords(
    ctx: &ModuleContext<'_>,
    rule: &'static str,
    builtin: &[String],
) -> Result<Vec<String>, RuleError> {
    let options: KeywordsOptions = ctx.decode_rule_config(rule)?;
    let keywords = options.keywords.unwrap_or_else(|| builtin.to_vec());
    if keywords.is_empty() {
        return Err(RuleError::MissingOption {
            rule,
            option: "keywords",
        });
    }
    Ok(keywords)
}

/// Logs and reports whether a root-only rule should skip `ctx`.
pub(crate) fn skip_unless_root(ctx: &ModuleContext<'_>, rule: &'static str) -> bool {
    if ctx.is_root() {
        return false;
    }
    debug!("{rule}: skipping child module {}", ctx.module());
    true
}

/// Every `terraform { required_providers { ... } }` block of a body.
pub(crate) fn required_providers(body: &Body) -> impl Iterator<Item = &Block> {
    body.get_blocks("terraform")
        .flat_map(|tf| tf.body.get_blocks("required_providers"))
}

/// Calls `f` for every block in `body`, parents before children.
pub(crate) fn walk_blocks<'b, F>(body: &'b Body, f: &mut F)
where
    F: FnMut(&'b Block),
{
    for block in body.blocks() {
        f(block);
        walk_blocks(&block.body, f);
    }
}

/// Name label of a `resource` or `data` block (the second label).
pub(crate) fn object_name(block: &Block) -> Option<&str> {
    block.labels.get(1).map(|label| label.as_str())
}

/// Type label of a `resource` or `data` block (the first label).
pub(crate) fn object_type(block: &Block) -> Option<&str> {
    block.labels.first().map(|label| label.as_str())
}

/// Attaches the planned edits to `violation`.
///
/// An invalid plan is dropped with a warning and the violation is kept
/// without a fix.
pub(crate) fn attach_fix(
    violation: Violation,
    message: &str,
    planner: EditPlanner<'_>,
) -> Violation {
    if planner.is_empty() {
        return violation;
    }
    match planner.finish() {
        Ok(batch) => violation.with_fix(message, batch),
        Err(e) => {
            warn!(
                "{}: dropping fix at {}:{}: {e}",
                violation.rule,
                violation.location.file.display(),
                violation.location.line
            );
            violation
        }
    }
}

/// Test helpers: build modules from literal files and run rules on them.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use stegra_core::edit::{apply_edits, plan_fixes};
    use stegra_core::{Config, Module, ModulePath, Rule, RuleError, SourceFile, Violation};

    /// Builds a module from `(path, text)` pairs.
    pub(crate) fn module(dir: &str, root: bool, files: &[(&str, &str)]) -> Module {
        Module {
            path: ModulePath::new(dir, root),
            files: files
                .iter()
                .map(|(path, text)| SourceFile::parse(*path, *text).expect("valid HCL"))
                .collect(),
        }
    }

    /// Runs `rule` over `module` with `config`.
    pub(crate) fn run(
        rule: &dyn Rule,
        module: &Module,
        config: &Config,
    ) -> Result<Vec<Violation>, RuleError> {
        rule.check(&module.context(config))
    }

    /// Runs `rule` over a root module holding a single `main.tf`.
    pub(crate) fn check_code(rule: &dyn Rule, code: &str) -> Vec<Violation> {
        let module = module("", true, &[("main.tf", code)]);
        run(rule, &module, &Config::default()).expect("rule runs")
    }

    /// Applies one pass of fixes to every file of `module`.
    pub(crate) fn fix_pass(
        rule: &dyn Rule,
        module: &Module,
        config: &Config,
    ) -> BTreeMap<PathBuf, String> {
        let violations = run(rule, module, config).expect("rule runs");
        let plan = plan_fixes(&violations, |path| module.file(path).map(SourceFile::text));
        module
            .files
            .iter()
            .map(|file| {
                let text = match plan.edits.get(file.path()) {
                    Some(edits) => apply_edits(file.text(), edits).expect("valid batch"),
                    None => file.text().to_string(),
                };
                (file.path().to_path_buf(), text)
            })
            .collect()
    }

    /// Fixes `code` as a single root-module `main.tf` until nothing changes.
    pub(crate) fn fix_code(rule: &dyn Rule, code: &str) -> String {
        fix_code_with(rule, code, &Config::default())
    }

    /// Like [`fix_code`], with an explicit configuration.
    pub(crate) fn fix_code_with(rule: &dyn Rule, code: &str, config: &Config) -> String {
        let mut text = code.to_string();
        for _ in 0..stegra_core::MAX_FIX_PASSES {
            let module = module("", true, &[("main.tf", &text)]);
            let fixed = fix_pass(rule, &module, config)
                .remove(&PathBuf::from("main.tf"))
                .unwrap_or_default();
            if fixed == text {
                break;
            }
            text = fixed;
        }
        text
    }

    /// Parses a configuration literal.
    pub(crate) fn config(toml: &str) -> Config {
        Config::parse(toml).expect("valid config")
    }
}
