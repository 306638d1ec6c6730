//! Validation issues and the aggregated report

use serde::{Deserialize, Serialize};
use std::fmt;

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The file is invalid
    Error,
    /// The file is valid but suspicious
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// One finding produced by one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Id of the rule that produced the issue
    pub rule_id: String,
    /// Human-readable message
    pub message: String,
    /// Severity
    pub severity: Severity,
    /// Section the issue refers to; `None` for global/file-level issues
    pub section: Option<String>,
    /// Property or key the issue refers to, when narrower than the section
    pub target: Option<String>,
    /// Whether a deterministic repair exists
    pub auto_fixable: bool,
    /// Suggested fix text
    pub suggested_fix: Option<String>,
}

impl ValidationIssue {
    /// Create issue
    #[must_use]
    pub fn new(rule_id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            message: message.into(),
            severity,
            section: None,
            target: None,
            auto_fixable: false,
            suggested_fix: None,
        }
    }

    /// Attach section
    #[inline]
    #[must_use]
    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Attach narrower target (property suffix or full key)
    #[inline]
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Mark as auto-fixable
    #[inline]
    #[must_use]
    pub fn fixable(mut self, auto_fixable: bool) -> Self {
        self.auto_fixable = auto_fixable;
        self
    }

    /// Attach suggested fix text
    #[inline]
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggested_fix = Some(suggestion.into());
        self
    }

    /// Whether this is an error
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.rule_id)?;
        if let Some(section) = &self.section {
            write!(f, " ({section})")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// A rule that faulted during evaluation and contributed no issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFault {
    /// Rule id
    pub rule_id: String,
    /// Fault description
    pub message: String,
}

/// Issues of one validation pass, in rule evaluation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Issues in rule evaluation order
    pub issues: Vec<ValidationIssue>,
    /// Rules that faulted and were skipped
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<RuleFault>,
}

impl ValidationReport {
    /// Create empty report
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no issue was raised
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Whether at least one error was raised
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    /// Number of errors
    #[inline]
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    /// Number of warnings
    #[inline]
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.issues.len() - self.error_count()
    }

    /// Issues raised by one rule
    pub fn by_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |i| i.rule_id == rule_id)
    }

    /// Issues attached to one section (case-insensitive)
    pub fn for_section<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |i| {
            i.section
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(section))
        })
    }

    /// Auto-fixable errors, the input of the fix-everything pass
    #[must_use]
    pub fn fixable_errors(&self) -> Vec<ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.is_error() && i.auto_fixable)
            .cloned()
            .collect()
    }
}
