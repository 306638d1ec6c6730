//! Chain Core
//!
//! One service facade over the chain toolkit: parse, validate, auto-fix,
//! reorder and write chain files, plus the per-domain helpers front ends
//! need (branch, mode and test updates, version rebasing, generation).
//!
//! # Example
//!
//! ```rust,no_run
//! use chain_core::{ChainResult, ChainService};
//!
//! fn release(path: &str) -> ChainResult<()> {
//!     let service = ChainService::builtin();
//!     let mut model = service.parse(path)?;
//!
//!     service.update_branch(&mut model, &["olap", "modeling"], "integration")?;
//!     service.fix_all_issues(&mut model);
//!     if !service.validate(&model).has_errors() {
//!         service.write(path, &model)?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod service;
pub mod types;
pub mod versions;

// Re-exports
pub use error::{ChainError, ChainResult};
pub use service::ChainService;
pub use types::{ChainGenerationRequest, ProjectConfig};
pub use versions::{build_number, rebase_tag, SectionVersion, VersionSummary};

pub use chain_file::{ChainFileLayer, ChainWriter};
pub use chain_fix::FixSummary;
pub use chain_model::{ChainModel, Section};
pub use chain_rules::{
    RuleConfigLoader, RuleSet, RuleSource, Severity, ValidationIssue, ValidationReport,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for front ends
    pub use crate::{
        ChainError, ChainGenerationRequest, ChainModel, ChainResult, ChainService,
        ProjectConfig, RuleConfigLoader, RuleSource, ValidationReport,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
