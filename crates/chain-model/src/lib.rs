//! Chain Model
//!
//! Passive data structures describing a build chain file: global settings,
//! ordered per-project sections and integration test flags.
//!
//! # Overview
//!
//! - [`ChainModel`]: root aggregate, optionally carrying the original text
//! - [`Section`]: per-project property bag with typed accessors
//! - [`CanonicalOrder`]: fixed template sequence of project names
//! - [`ReorderService`]: re-sequences sections into canonical order
//!
//! # Example
//!
//! ```rust
//! use chain_model::{ChainModel, ReorderService, Section};
//!
//! let mut model = ChainModel::new();
//! model.push_section(Section::new("tests").with("mode", "source"));
//! model.push_section(Section::new("framework").with("mode", "binary"));
//!
//! let changed = ReorderService::default().reorder(&mut model);
//! assert!(changed);
//! assert_eq!(model.section_names(), vec!["framework", "tests"]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod model;
pub mod order;
pub mod section;

// Re-exports
pub use model::{
    ChainModel, GlobalSection, GLOBAL_DEV_VERSION_KEY, GLOBAL_RECIPIENTS_KEY, GLOBAL_VERSION_KEY,
};
pub use order::{CanonicalOrder, ReorderService, DEFAULT_PROJECT_ORDER};
pub use section::{property_rank, Section, PROPERTY_ORDER};

/// Build mode values
pub mod modes {
    /// Build from sources
    pub const SOURCE: &str = "source";
    /// Consume prebuilt binaries
    pub const BINARY: &str = "binary";
    /// Skip the project
    pub const IGNORE: &str = "ignore";
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with chain models
    pub use crate::section::{BRANCH, DEV_MODE, FORK, MODE, TAG, TESTS_UNIT};
    pub use crate::{CanonicalOrder, ChainModel, GlobalSection, ReorderService, Section};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
