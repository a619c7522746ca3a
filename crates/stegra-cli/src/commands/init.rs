//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# stegra configuration

# Rule preset: recommended | strict | minimal | all
preset = "recommended"

# Lowest severity that fails the run: info | warning | error
fail_on = "error"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "."

# Glob patterns to exclude from analysis
exclude = [
    "**/.terraform/**",
]

# Respect .gitignore files
respect_gitignore = true

# Treat every directory as a root module
recursive = true

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden
#
# Allow directives for built-in rules need a reason:
#   # stegra: allow(no-type-in-name) reason="imported resource"

[rules.keywords-first]
keywords = ["count", "for_each"]

[rules.newline-after-keywords]
keywords = ["count", "for_each"]

[rules.provider-configuration-locations]
allowed_directories = ["."]

# [rules.no-blank-lines-in-required-providers]
# enabled = true

# [rules.no-type-in-name]
# severity = "warning"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("stegra.toml"), force)?;

    println!("Created stegra.toml");
    println!("\nNext steps:");
    println!("  1. Edit stegra.toml to configure rules");
    println!("  2. Run: stegra check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stegra_core::Config;
    use tempfile::TempDir;

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.preset.as_deref(), Some("recommended"));
        assert!(config.analyzer.recursive);
        let keywords: Vec<String> = config.rules["keywords-first"].get_option("keywords").unwrap();
        assert_eq!(keywords, vec!["count", "for_each"]);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stegra.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        write_config(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
