//! Error types for the rule engine
//!
//! - Configuration errors are raised once, when rule descriptors are loaded
//! - Rule errors are faults inside one rule evaluation; the validator catches
//!   them per rule and never lets them escape

use std::path::PathBuf;

/// Errors while loading or decoding rule configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("io error reading rule configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid JSON or has the wrong shape
    #[error("invalid rule configuration: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// One descriptor is well-formed JSON but semantically invalid
    #[error("invalid rule '{rule_id}': {reason}")]
    InvalidRule { rule_id: String, reason: String },

    /// Two descriptors share one rule id
    #[error("duplicate rule id: {0}")]
    DuplicateRuleId(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create invalid rule error
    pub fn invalid_rule(rule_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule_id: rule_id.into(),
            reason: reason.into(),
        }
    }
}

/// Fault raised while one rule evaluates a model
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuleError {
    /// Rule could not complete its evaluation
    #[error("rule '{rule_id}' failed: {message}")]
    Internal { rule_id: String, message: String },
}

impl RuleError {
    /// Create internal fault for rule
    pub fn internal(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }
}
