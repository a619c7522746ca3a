//! Check command implementation.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use stegra_core::{Analyzer, RuleBox};
use stegra_rules::{all_rules, Preset};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Flags of `stegra check`.
#[derive(Debug, Default)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule names or codes.
    pub rules: Option<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
    /// Apply fixes before reporting.
    pub fix: bool,
}

/// Runs the check command and returns the process exit code.
pub fn run(path: &Path, options: &CheckOptions, source: &ConfigSource) -> Result<i32> {
    let config = source.load()?;
    let fail_on = config
        .fail_on_severity()
        .context("Invalid fail_on in configuration")?;

    let rules = if let Some(filter) = &options.rules {
        let names: Vec<&str> = filter.split(',').map(str::trim).collect();
        filter_rules(&names)
    } else {
        let preset: Preset = config
            .preset
            .as_deref()
            .unwrap_or("recommended")
            .parse()
            .map_err(|e: String| anyhow!(e))?;
        preset.rules()
    };

    let mut builder = Analyzer::builder()
        .root(path)
        .config(config)
        .excludes(options.exclude.iter().cloned());
    for rule in rules {
        builder = builder.rule_box(rule);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!("Analyzing {:?} with {} rules", path, analyzer.rule_count());

    let result = if options.fix {
        let report = analyzer.fix().context("Fixing failed")?;
        if report.fixes_applied > 0 {
            eprintln!(
                "Fixed {} issue(s) in {} file(s)",
                report.fixes_applied,
                report.files_changed.len()
            );
        }
        report.result
    } else {
        analyzer.analyze().context("Analysis failed")?
    };

    super::output::print(&result, options.format, analyzer.root())?;

    if result.has_rule_failures() || result.has_violations_at(fail_on) {
        return Ok(1);
    }
    Ok(0)
}

/// Selects rules by name or code. Unknown entries are logged and skipped.
fn filter_rules(names: &[&str]) -> Vec<RuleBox> {
    for name in names {
        let known = all_rules()
            .iter()
            .any(|r| r.name() == *name || r.code().eq_ignore_ascii_case(name));
        if !known {
            tracing::warn!("Unknown rule: {}", name);
        }
    }

    all_rules()
        .into_iter()
        .filter(|rule| {
            names
                .iter()
                .any(|n| rule.name() == *n || rule.code().eq_ignore_ascii_case(n))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options() -> CheckOptions {
        CheckOptions {
            format: OutputFormat::Compact,
            ..CheckOptions::default()
        }
    }

    #[test]
    fn filter_by_name_and_code() {
        let rules = filter_rules(&["no-multiple-blank-lines", "st001", "nope"]);
        let codes: Vec<&str> = rules.iter().map(|r| r.code()).collect();
        assert_eq!(codes, vec!["ST001", "ST010"]);
    }

    #[test]
    fn explicitly_selected_overlapping_rule_runs() {
        let rules = filter_rules(&["ST007"]);
        assert_eq!(rules.len(), 1);
        assert!(rules[0].enabled_by_default());
    }

    #[test]
    fn clean_module_exits_zero() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("main.tf"), "locals {\n  a = 1\n}\n").unwrap();
        let opts = CheckOptions {
            rules: Some("ST008,ST010".to_string()),
            ..options()
        };

        assert_eq!(run(tmp.path(), &opts, &ConfigSource::Default).unwrap(), 0);
    }

    #[test]
    fn violations_exit_one_and_fix_clears_them() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("main.tf");
        fs::write(&file, "locals {}\n\n\n\nlocals {}\n").unwrap();
        let opts = CheckOptions {
            rules: Some("no-multiple-blank-lines".to_string()),
            ..options()
        };
        assert_eq!(run(tmp.path(), &opts, &ConfigSource::Default).unwrap(), 1);

        let fix = CheckOptions { fix: true, ..opts };
        assert_eq!(run(tmp.path(), &fix, &ConfigSource::Default).unwrap(), 0);
        assert_eq!(fs::read_to_string(file).unwrap(), "locals {}\n\nlocals {}\n");
    }

    #[test]
    fn missing_required_option_exits_one() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("main.tf"), "locals {}\n").unwrap();
        let opts = CheckOptions {
            rules: Some("keywords-first".to_string()),
            ..options()
        };

        assert_eq!(run(tmp.path(), &opts, &ConfigSource::Default).unwrap(), 1);
    }

    #[test]
    fn fail_on_threshold_from_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("main.tf"), "locals {}\n\n\n\nlocals {}\n").unwrap();
        let config = tmp.path().join("stegra.toml");
        fs::write(
            &config,
            "[rules.no-multiple-blank-lines]\nseverity = \"warning\"\n",
        )
        .unwrap();
        let opts = CheckOptions {
            rules: Some("ST010".to_string()),
            ..options()
        };

        assert_eq!(run(tmp.path(), &opts, &ConfigSource::Project(config.clone())).unwrap(), 0);

        fs::write(
            &config,
            "fail_on = \"warning\"\n[rules.no-multiple-blank-lines]\nseverity = \"warning\"\n",
        )
        .unwrap();
        assert_eq!(run(tmp.path(), &opts, &ConfigSource::Project(config)).unwrap(), 1);
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("stegra.toml");
        fs::write(&config, "preset = \"everything\"\n").unwrap();

        let err = run(tmp.path(), &options(), &ConfigSource::Project(config)).unwrap_err();
        assert!(err.to_string().contains("Unknown preset"));
    }
}
