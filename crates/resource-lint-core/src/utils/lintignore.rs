//! Comment-based suppression directives.
//!
//! Supports directives like:
//! ```text
//! //lintignore:AZBP001,AZRE001 generated by the SDK
//! ```
//!
//! A directive applies to the line it is on. A directive that is alone on
//! its line also applies to the line below it.

use std::collections::HashSet;

use resource_lint_go::{Comment, GoFile};

/// Result of checking for a suppression directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreCheck {
    /// The diagnostic stands.
    Active,
    /// The diagnostic is suppressed.
    Ignored {
        /// Free text after the codes, if any.
        reason: Option<String>,
    },
}

impl IgnoreCheck {
    /// Returns true if suppressed.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }

    /// Returns the reason if suppressed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ignored { reason } => reason.as_deref(),
            Self::Active => None,
        }
    }
}

/// Parsed suppression directive.
#[derive(Debug, Clone)]
pub struct IgnoreDirective {
    /// Analyzer names that are suppressed (`all` for every analyzer).
    pub codes: HashSet<String>,
    /// Optional free-text reason.
    pub reason: Option<String>,
}

/// Checks whether a diagnostic of `code` at `line` of `file` is suppressed.
#[must_use]
pub fn check_ignore(file: &GoFile, line: usize, code: &str) -> IgnoreCheck {
    for check_line in [line.saturating_sub(1), line] {
        if check_line == 0 {
            continue;
        }
        for comment in file.comments_on_line(check_line) {
            if check_line < line && !stands_alone(file, comment) {
                continue;
            }
            if let Some(directive) = parse_ignore_directive(&comment.text) {
                if directive.codes.contains(code) || directive.codes.contains("all") {
                    return IgnoreCheck::Ignored {
                        reason: directive.reason,
                    };
                }
            }
        }
    }
    IgnoreCheck::Active
}

/// Whether only whitespace precedes `comment` on its line.
fn stands_alone(file: &GoFile, comment: &Comment) -> bool {
    let before = &file.source()[..comment.start];
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    before[line_start..].trim().is_empty()
}

/// Parses a suppression directive from comment text.
#[must_use]
pub fn parse_ignore_directive(comment: &str) -> Option<IgnoreDirective> {
    let content = comment.trim().strip_prefix("//")?.trim_start();
    let rest = content.strip_prefix("lintignore:")?;

    let (codes_str, reason) = match rest.split_once(char::is_whitespace) {
        Some((codes, reason)) => (codes, Some(reason.trim()).filter(|r| !r.is_empty())),
        None => (rest, None),
    };

    let codes: HashSet<String> = codes_str
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if codes.is_empty() {
        return None;
    }

    Some(IgnoreDirective {
        codes,
        reason: reason.map(str::to_string),
    })
}
