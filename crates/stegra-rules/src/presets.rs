//! Rule presets for common configurations.

use crate::{
    BlankLineBetweenBlocks, DependsOnLast, EmptyBlockOneLine, KeywordsFirst, NewlineAfterKeywords,
    NoBlankLineBetweenRequiredProviders, NoBlankLinesInRequiredProviders, NoBlockEdgeBlankLines,
    NoLeadingTrailingBlankLines, NoMultipleBlankLines, NoThisResourceName, NoTypeInName,
    ProviderConfigurationLocations,
};
use std::str::FromStr;
use stegra_core::RuleBox;

/// Preset configurations for stegra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Every rule except the ones that overlap others.
    Recommended,
    /// Every rule.
    Strict,
    /// Blank-line layout rules only, for gradual adoption.
    Minimal,
}

impl Preset {
    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Strict => strict_rules(),
            Self::Minimal => minimal_rules(),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recommended" => Ok(Self::Recommended),
            "strict" | "all" => Ok(Self::Strict),
            "minimal" => Ok(Self::Minimal),
            _ => Err(format!(
                "Unknown preset: {s}. Use 'recommended', 'strict', 'minimal', or 'all'"
            )),
        }
    }
}

/// Returns the recommended set of rules.
///
/// Includes every rule. `no-blank-lines-in-required-providers` (ST007)
/// reports the same gaps as ST006, so it only runs when enabled in the
/// configuration.
#[must_use]
pub fn recommended_rules() -> Vec<RuleBox> {
    vec![
        Box::new(BlankLineBetweenBlocks::new()),
        Box::new(DependsOnLast::new()),
        Box::new(EmptyBlockOneLine::new()),
        Box::new(KeywordsFirst::new()),
        Box::new(NewlineAfterKeywords::new()),
        Box::new(NoBlankLineBetweenRequiredProviders::new()),
        Box::new(NoBlankLinesInRequiredProviders::new()),
        Box::new(NoBlockEdgeBlankLines::new()),
        Box::new(NoLeadingTrailingBlankLines::new()),
        Box::new(NoMultipleBlankLines::new()),
        Box::new(NoThisResourceName::new()),
        Box::new(NoTypeInName::new()),
        Box::new(ProviderConfigurationLocations::new()),
    ]
}

/// Returns the strict set of rules.
///
/// The recommended rules with ST007 enabled.
#[must_use]
pub fn strict_rules() -> Vec<RuleBox> {
    all_rules()
}

/// Returns the minimal set of rules.
///
/// For gradual adoption, only the blank-line rules that need no options:
/// - `blank-line-between-blocks` (ST001)
/// - `empty-block-one-line` (ST003)
/// - `no-block-edge-blank-lines` (ST008)
/// - `no-leading-trailing-blank-lines` (ST009)
/// - `no-multiple-blank-lines` (ST010)
#[must_use]
pub fn minimal_rules() -> Vec<RuleBox> {
    vec![
        Box::new(BlankLineBetweenBlocks::new()),
        Box::new(EmptyBlockOneLine::new()),
        Box::new(NoBlockEdgeBlankLines::new()),
        Box::new(NoLeadingTrailingBlankLines::new()),
        Box::new(NoMultipleBlankLines::new()),
    ]
}

/// Returns all available rules, each enabled.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    recommended_rules()
        .into_iter()
        .map(|rule| -> RuleBox {
            if rule.code() == crate::no_blank_lines_in_required_providers::CODE {
                Box::new(NoBlankLinesInRequiredProviders::new().enable_by_default(true))
            } else {
                rule
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_rules() {
        assert_eq!(Preset::Recommended.rules().len(), 13);
        assert_eq!(Preset::Strict.rules().len(), 13);
        assert_eq!(Preset::Minimal.rules().len(), 5);
    }

    #[test]
    fn test_codes_are_unique_and_ordered() {
        let codes: Vec<&str> = all_rules().iter().map(|r| r.code()).collect();
        let expected: Vec<String> = (1..=13).map(|n| format!("ST{n:03}")).collect();
        assert_eq!(codes, expected);
    }

    #[test]
    fn test_overlapping_rule_only_on_in_strict() {
        let enabled = |rules: Vec<RuleBox>| {
            rules
                .iter()
                .filter(|r| r.enabled_by_default())
                .map(|r| r.code())
                .collect::<Vec<_>>()
        };
        assert!(!enabled(recommended_rules()).contains(&"ST007"));
        assert!(enabled(strict_rules()).contains(&"ST007"));
    }

    #[test]
    fn test_every_rule_links_to_its_docs_section() {
        let docs = include_str!("../../../docs/rules.md");
        for rule in all_rules() {
            let expected = format!(
                "docs/rules.md#{}-{}",
                rule.code().to_lowercase(),
                rule.name()
            );
            assert_eq!(rule.link(), Some(expected.as_str()));
            assert!(
                docs.contains(&format!("\n## {} {}\n", rule.code(), rule.name())),
                "missing docs section for {}",
                rule.code()
            );
        }
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("recommended".parse::<Preset>(), Ok(Preset::Recommended));
        assert_eq!("ALL".parse::<Preset>(), Ok(Preset::Strict));
        assert!("everything".parse::<Preset>().is_err());
    }
}
