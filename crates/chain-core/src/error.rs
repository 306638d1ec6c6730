//! Error types for the chain service
//!
//! Aggregates the per-crate errors behind one enum for callers of
//! [`ChainService`](crate::ChainService).

use chain_file::{ParseError, WriteError};
use chain_rules::ConfigError;

/// Main service error type
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// Chain file could not be read or parsed
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    /// Chain file could not be written
    #[error("write failed: {0}")]
    Write(#[from] WriteError),

    /// Rule configuration could not be loaded
    #[error("rule configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A named section does not exist
    #[error("section not found: {0}")]
    SectionNotFound(String),

    /// Value is not an accepted build mode
    #[error("invalid {property} '{value}' (expected source, binary or ignore)")]
    InvalidMode {
        /// Property being set (`mode` or `mode.devs`)
        property: String,
        /// Rejected value
        value: String,
    },

    /// Generation request is unusable
    #[error("invalid generation request: {0}")]
    InvalidRequest(String),
}

impl ChainError {
    /// Create invalid-mode error
    pub fn invalid_mode(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidMode {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Check if the error comes from the filesystem
    #[inline]
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Parse(ParseError::Io { .. } | ParseError::NotFound { .. }) | Self::Write(_)
        )
    }
}

/// Result alias for service operations
pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn conversions_and_display() {
        let err: ChainError = ParseError::not_found(PathBuf::from("/tmp/none")).into();
        assert!(err.is_io());
        assert!(err.to_string().starts_with("parse failed: "));

        let err = ChainError::invalid_mode("mode", "compiled");
        assert!(!err.is_io());
        assert_eq!(
            err.to_string(),
            "invalid mode 'compiled' (expected source, binary or ignore)"
        );
    }
}
