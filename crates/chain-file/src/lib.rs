//! Chain File
//!
//! Reading and writing build chain files.
//!
//! # Overview
//!
//! - [`ChainParser`]: text → [`ChainModel`](chain_model::ChainModel), keeping the text
//! - [`ChainWriter`]: model → text, structure-preserving or regenerated
//! - [`ChainFileLayer`]: filesystem facade over both
//!
//! # Example
//!
//! ```rust
//! use chain_file::ChainFileLayer;
//!
//! let layer = ChainFileLayer::new();
//! let mut model = layer.parse_str("# build\nolap.mode=source\nolap.branch=main\n");
//! model.section_mut("olap").unwrap().set_branch("integration");
//!
//! assert_eq!(
//!     layer.render(&model),
//!     "# build\nolap.mode=source\nolap.branch=integration\n"
//! );
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod layer;
mod line;
pub mod parser;
pub mod writer;

// Re-exports
pub use error::{ParseError, WriteError};
pub use layer::{ChainFileLayer, DEFAULT_MAX_FILE_SIZE};
pub use parser::ChainParser;
pub use writer::{ChainWriter, HEADER};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
