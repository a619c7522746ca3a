//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! # stegra: allow(depends-on-last) reason="ordering matters for this module"
//! // stegra: allow(ST011, no-type-in-name)
//! ```
//!
//! A directive applies to violations on its own line and on the line
//! directly below it.

use crate::source::SourceFile;
use std::collections::HashSet;

/// Result of checking for allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone)]
struct AllowDirective {
    /// Rule names or codes that are allowed.
    rules: HashSet<String>,
    /// Optional reason for the allowance.
    reason: Option<String>,
}

impl AllowDirective {
    fn covers(&self, rule_name: &str, code: &str) -> bool {
        self.rules.contains(rule_name) || self.rules.contains(code) || self.rules.contains("all")
    }
}

/// Checks `file` for an allowance covering a violation on `line`.
///
/// `rule_name` and `code` both match, as does `all`.
#[must_use]
pub fn check_allow_with_reason(
    file: &SourceFile,
    line: usize,
    rule_name: &str,
    code: &str,
) -> AllowCheck {
    let lines = file.lines();

    for check_line in [line.saturating_sub(1), line] {
        if check_line == 0 || check_line > lines.line_count() {
            continue;
        }

        let text = lines.line_text(file.text(), check_line);
        let directive = text
            .match_indices(|c| c == '#' || c == '/')
            .find_map(|(idx, _)| parse_allow_directive(&text[idx..]));

        if let Some(directive) = directive {
            if directive.covers(rule_name, code) {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    AllowCheck::Denied
}

/// Parses an allowance directive from text starting at a comment opener.
fn parse_allow_directive(text: &str) -> Option<AllowDirective> {
    let comment = text.lines().next()?;
    let comment_content = if let Some(rest) = comment.strip_prefix('#') {
        rest.trim()
    } else if let Some(rest) = comment.strip_prefix("//") {
        rest.trim()
    } else {
        return None;
    };

    let directive = comment_content.strip_prefix("stegra:")?.trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules_str = &allow_content[..paren_end];

    let rules: HashSet<String> = rules_str
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()))
        .filter(|r| !r.trim().is_empty());

    Some(AllowDirective { rules, reason })
}
