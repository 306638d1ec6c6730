//! Error types for the chain file layer
//!
//! - Parse errors are fatal to the parse call and carry no partial model
//! - Write errors propagate unchanged; the target may be partially written

use std::path::PathBuf;

/// Errors while reading a chain file
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Source file does not exist
    #[error("chain file not found: {path}")]
    NotFound { path: PathBuf },

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit
    #[error("chain file {path} too large: {size} bytes (max: {max})")]
    TooLarge { path: PathBuf, size: u64, max: u64 },
}

impl ParseError {
    /// Create not-found error for path
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors while writing a chain file
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// IO error during file write
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WriteError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = ParseError::not_found("/tmp/chain.properties");
        assert_eq!(err.to_string(), "chain file not found: /tmp/chain.properties");
    }

    #[test]
    fn write_error_keeps_source() {
        let err = WriteError::io_error(
            "/ro/chain.properties",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("/ro/chain.properties"));
    }
}
