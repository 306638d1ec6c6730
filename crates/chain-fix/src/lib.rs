//! Chain Fix
//!
//! Deterministic repairs for validation issues.
//!
//! # Overview
//!
//! - [`Repair`]: one repair function, keyed by rule id in a [`FixRegistry`]
//! - [`AutoFixEngine`]: applies repairs, creates missing sections, reorders
//!
//! # Example
//!
//! ```rust
//! use chain_fix::AutoFixEngine;
//! use chain_model::{ChainModel, Section};
//! use chain_rules::Validator;
//!
//! let mut model = ChainModel::new();
//! model.push_section(Section::new("olap").with("mode", "bogus"));
//!
//! let validator = Validator::builtin();
//! let engine = AutoFixEngine::default();
//! let summary = engine.fix_all(&mut model, &validator);
//!
//! assert!(summary.fixed > 0);
//! assert!(!validator.validate(&model).has_errors());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod engine;
pub mod error;
pub mod repair;

// Re-exports
pub use engine::{default_section, AutoFixEngine, FixSummary, MAX_FIX_PASSES};
pub use error::FixError;
pub use repair::{FixRegistry, Repair};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for repairing chain models
    pub use crate::{AutoFixEngine, FixError, FixRegistry, FixSummary, Repair};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
