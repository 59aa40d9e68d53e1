//! Non-fatal diagnostics raised while merging translations.
//!
//! Invariant violations abort the run through `anyhow`; everything here is
//! stylistic, reported to the user and never fatal. Each issue is
//! self-contained with all information the reporter needs: locale, key
//! path, offending value and a human-readable explanation.

use std::fmt;

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    VariableSpacing,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::VariableSpacing => write!(f, "variable-spacing"),
        }
    }
}

/// One reported issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub rule: Rule,
    /// Locale the offending translation belongs to.
    pub locale: String,
    /// Dotted key path of the offending message.
    pub key: String,
    /// The offending variant text.
    pub value: String,
    pub message: String,
}

impl Issue {
    /// A variable token touches adjacent text without a separator
    /// character, e.g. `"{count}items"`.
    pub fn variable_spacing(
        locale: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            rule: Rule::VariableSpacing,
            locale: locale.into(),
            key: key.into(),
            value: value.into(),
            message: "variable token is glued to the surrounding text; add a separator".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
    }

    #[test]
    fn rule_display() {
        assert_eq!(Rule::VariableSpacing.to_string(), "variable-spacing");
    }

    #[test]
    fn variable_spacing_issue() {
        let issue = Issue::variable_spacing("fr", "cart.count", "{count}articles");
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(issue.locale, "fr");
        assert_eq!(issue.key, "cart.count");
    }
}
