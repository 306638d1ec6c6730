//! Chain file layer - the filesystem boundary
//!
//! Provides:
//! - File → model parsing (ingress)
//! - Model → file writing (egress)
//!
//! Nothing else in the workspace touches chain files directly.

use crate::error::{ParseError, WriteError};
use crate::parser::ChainParser;
use crate::writer::ChainWriter;
use chain_model::{CanonicalOrder, ChainModel};
use std::path::Path;

/// Default maximum chain file size (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Parser and writer behind one facade
#[derive(Debug, Clone)]
pub struct ChainFileLayer {
    parser: ChainParser,
    writer: ChainWriter,
    max_file_size: u64,
}

impl ChainFileLayer {
    /// Layer with the default canonical order
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: ChainParser::new(),
            writer: ChainWriter::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Use a custom canonical order when writing
    #[must_use]
    pub fn with_order(mut self, order: CanonicalOrder) -> Self {
        self.writer = self.writer.with_order(order);
        self
    }

    /// Use a custom writer
    #[must_use]
    pub fn with_writer(mut self, writer: ChainWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Set maximum file size accepted by `parse`
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Writer used by this layer
    #[inline]
    #[must_use]
    pub fn writer(&self) -> &ChainWriter {
        &self.writer
    }

    /// Parse file into a model (Ingress)
    ///
    /// # Errors
    /// - `ParseError::NotFound` if the path does not exist
    /// - `ParseError::TooLarge` if the file exceeds the size limit
    /// - `ParseError::Io` if the file cannot be read
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<ChainModel, ParseError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ParseError::not_found(path));
        }
        let size = std::fs::metadata(path)
            .map_err(|e| ParseError::io_error(path, e))?
            .len();
        if size > self.max_file_size {
            return Err(ParseError::TooLarge {
                path: path.to_path_buf(),
                size,
                max: self.max_file_size,
            });
        }

        let model = self.parser.parse_file(path)?;
        tracing::info!(
            path = %path.display(),
            sections = model.sections.len(),
            "chain file parsed"
        );
        Ok(model)
    }

    /// Parse text without touching the filesystem
    #[must_use]
    pub fn parse_str(&self, text: &str) -> ChainModel {
        self.parser.parse_str(text)
    }

    /// Render model to text (structure-preserving when it has raw content)
    #[must_use]
    pub fn render(&self, model: &ChainModel) -> String {
        self.writer.render(model)
    }

    /// Write model to file (Egress)
    ///
    /// # Errors
    /// Returns `WriteError::Io` if the file cannot be written
    pub fn write(&self, path: impl AsRef<Path>, model: &ChainModel) -> Result<(), WriteError> {
        self.writer.write(path, model)
    }
}

impl Default for ChainFileLayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_test_utils::{ChainFixture, SAMPLE_CHAIN};

    #[test]
    fn rejects_oversized_files() {
        let fixture = ChainFixture::new(SAMPLE_CHAIN);
        let layer = ChainFileLayer::new().with_max_file_size(16);
        assert!(matches!(
            layer.parse(fixture.path()),
            Err(ParseError::TooLarge { max: 16, .. })
        ));
    }

    #[test]
    fn parse_then_write_leaves_file_unchanged() {
        let fixture = ChainFixture::new(SAMPLE_CHAIN);
        let layer = ChainFileLayer::new();
        let model = layer.parse(fixture.path()).unwrap();
        layer.write(fixture.path(), &model).unwrap();
        assert_eq!(fixture.read(), SAMPLE_CHAIN);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let fixture = ChainFixture::new("");
        let target = fixture.missing_path().join("nested.properties");
        let err = ChainFileLayer::new()
            .write(&target, &ChainModel::new())
            .unwrap_err();
        assert!(matches!(err, WriteError::Io { .. }));
    }
}
