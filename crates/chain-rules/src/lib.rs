//! Chain Rules
//!
//! Configurable rule engine for chain files.
//!
//! # Overview
//!
//! - [`RuleSet`]: decoded rule configuration (typed [`RuleKind`] per rule)
//!   plus the [`ChainCatalog`] lookup tables
//! - [`RuleConfigLoader`]: lazily loading, cached configuration source
//! - [`ValidationRule`]: one evaluation strategy; [`RuleFactory`] builds them
//! - [`Validator`]: runs the active rules and returns a [`ValidationReport`]
//!
//! # Example
//!
//! ```rust
//! use chain_model::{ChainModel, Section};
//! use chain_rules::Validator;
//!
//! let mut model = ChainModel::new();
//! model.push_section(Section::new("framework").with("mode", "source").with("branch", "main"));
//! model.push_section(Section::new("app").with("mode", "binary").with("tag", "Build_1.0.0.1"));
//!
//! let report = Validator::builtin().validate(&model);
//! assert!(report.by_rule("GlobalVersionWhenBinary").next().is_some());
//! assert!(report.by_rule("BranchOrTagRequired").next().is_none());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod issue;
pub mod loader;
pub mod message;
pub mod rules;
pub mod validator;

// Re-exports
pub use config::{ids, ChainCatalog, NumericBand, RuleDescriptor, RuleKind, RuleSet};
pub use error::{ConfigError, RuleError};
pub use issue::{RuleFault, Severity, ValidationIssue, ValidationReport};
pub use loader::{RuleConfigLoader, RuleSource};
pub use rules::{RuleFactory, RuleMeta, ValidationRule};
pub use validator::Validator;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for validating chain models
    pub use crate::{
        ChainCatalog, RuleConfigLoader, RuleSet, RuleSource, Severity, ValidationIssue,
        ValidationReport, ValidationRule, Validator,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
