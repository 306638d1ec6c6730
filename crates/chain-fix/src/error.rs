//! Error types for repairs
//!
//! Repairs return these instead of failing loudly; the engine logs them and
//! counts the issue as not fixed.

/// Failure of one repair
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixError {
    /// Issue names a section the model does not have
    #[error("section not found: {0}")]
    SectionNotFound(String),

    /// Issue lacks the section a section-level repair needs
    #[error("issue from rule '{rule_id}' has no section")]
    MissingSection { rule_id: String },

    /// Issue lacks the target (property, key or suite) the repair needs
    #[error("issue from rule '{rule_id}' has no target")]
    MissingIssueTarget { rule_id: String },

    /// Repair cannot handle the issue's target
    #[error("cannot repair target '{target}'")]
    Unsupported { target: String },
}

impl FixError {
    /// Create missing-section error
    pub fn missing_section(rule_id: impl Into<String>) -> Self {
        Self::MissingSection {
            rule_id: rule_id.into(),
        }
    }

    /// Create missing-target error
    pub fn missing_target(rule_id: impl Into<String>) -> Self {
        Self::MissingIssueTarget {
            rule_id: rule_id.into(),
        }
    }

    /// Create unsupported-target error
    pub fn unsupported(target: impl Into<String>) -> Self {
        Self::Unsupported {
            target: target.into(),
        }
    }
}
