//! Rule implementations
//!
//! Provides the [`ValidationRule`] trait and one implementation per
//! [`RuleKind`]. [`RuleFactory`] instantiates the enabled descriptors of a
//! [`RuleSet`] in registration order.

mod exclusive;
mod policy;
mod property;
mod sections;
mod suites;
mod version;

pub use exclusive::{MutuallyExclusiveRule, RequiredOneOfRule};
pub use policy::{
    ContentStageBranchRule, DevModeWithoutModeRule, FeatureBranchNamingRule, ForkFormatRule,
    ProjectNamingRule, TestsPreferBranchRule,
};
pub use property::{PropertyRequiredRule, PropertyValueRule};
pub use sections::RequiredSectionsRule;
pub use suites::IntegrationTestsRule;
pub use version::{BuildNumberRangeRule, GlobalDevVersionRule, GlobalVersionWhenBinaryRule};

use crate::config::{RuleDescriptor, RuleKind, RuleSet};
use crate::error::RuleError;
use crate::issue::{Severity, ValidationIssue};
use chain_model::ChainModel;

/// One validation strategy evaluated against a whole model
///
/// Implementations are pure: they read the model and return issues. A rule
/// that cannot complete returns `RuleError`; the validator records the fault
/// and carries on with the next rule.
pub trait ValidationRule: Send + Sync + std::fmt::Debug {
    /// Rule id reported on every issue
    fn rule_id(&self) -> &str;

    /// Evaluate the model
    ///
    /// # Errors
    /// Returns `RuleError` if the rule cannot complete its evaluation
    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError>;
}

/// Identity shared by every rule instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMeta {
    /// Rule id
    pub rule_id: String,
    /// Display name
    pub name: String,
    /// Configured severity
    pub severity: Severity,
}

impl RuleMeta {
    /// Create meta
    #[must_use]
    pub fn new(rule_id: impl Into<String>, name: impl Into<String>, severity: Severity) -> Self {
        Self {
            rule_id: rule_id.into(),
            name: name.into(),
            severity,
        }
    }

    /// Issue with the configured severity
    #[inline]
    #[must_use]
    pub fn issue(&self, message: impl Into<String>) -> ValidationIssue {
        ValidationIssue::new(&self.rule_id, self.severity, message)
    }

    /// Issue with an explicit severity
    #[inline]
    #[must_use]
    pub fn issue_with(&self, severity: Severity, message: impl Into<String>) -> ValidationIssue {
        ValidationIssue::new(&self.rule_id, severity, message)
    }
}

impl From<&RuleDescriptor> for RuleMeta {
    fn from(descriptor: &RuleDescriptor) -> Self {
        Self::new(&descriptor.rule_id, &descriptor.name, descriptor.severity)
    }
}

/// Builds rule instances from configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleFactory;

impl RuleFactory {
    /// Instantiate every enabled rule of the set, in registration order
    #[must_use]
    pub fn build(set: &RuleSet) -> Vec<Box<dyn ValidationRule>> {
        let rules: Vec<Box<dyn ValidationRule>> = set
            .enabled()
            .map(|descriptor| Self::build_one(descriptor, set))
            .collect();
        tracing::debug!(
            rules = rules.len(),
            disabled = set.rules.len() - rules.len(),
            "validation rules built"
        );
        rules
    }

    /// Instantiate one descriptor regardless of its enabled flag
    #[must_use]
    pub fn build_one(descriptor: &RuleDescriptor, set: &RuleSet) -> Box<dyn ValidationRule> {
        let meta = RuleMeta::from(descriptor);
        let catalog = &set.catalog;
        match &descriptor.kind {
            RuleKind::PropertyRequired(cfg) => Box::new(PropertyRequiredRule::new(meta, cfg.clone())),
            RuleKind::PropertyValueValidation(cfg) => {
                Box::new(PropertyValueRule::new(meta, cfg.clone()))
            }
            RuleKind::MutuallyExclusive(cfg) => Box::new(MutuallyExclusiveRule::new(meta, cfg.clone())),
            RuleKind::RequiredOneOf(cfg) => Box::new(RequiredOneOfRule::new(meta, cfg.clone())),
            RuleKind::RequiredSections(cfg) => {
                Box::new(RequiredSectionsRule::new(meta, cfg.clone(), catalog))
            }
            RuleKind::BuildNumberRange(cfg) => {
                Box::new(BuildNumberRangeRule::new(meta, cfg.clone(), catalog))
            }
            RuleKind::IntegrationTests(cfg) => {
                Box::new(IntegrationTestsRule::new(meta, cfg.clone(), catalog))
            }
            RuleKind::GlobalDevVersionRequired(cfg) => {
                Box::new(GlobalDevVersionRule::new(meta, cfg.clone()))
            }
            RuleKind::GlobalVersionWhenBinary(cfg) => {
                Box::new(GlobalVersionWhenBinaryRule::new(meta, cfg.clone(), catalog))
            }
            RuleKind::ForkFormat(cfg) => Box::new(ForkFormatRule::new(meta, cfg.clone())),
            RuleKind::FeatureBranchNaming(cfg) => {
                Box::new(FeatureBranchNamingRule::new(meta, cfg.clone()))
            }
            RuleKind::ProjectNaming(cfg) => Box::new(ProjectNamingRule::new(meta, cfg.clone())),
            RuleKind::ContentStageBranch(cfg) => {
                Box::new(ContentStageBranchRule::new(meta, cfg.clone()))
            }
            RuleKind::TestsPreferBranch(cfg) => Box::new(TestsPreferBranchRule::new(meta, cfg.clone())),
            RuleKind::DevModeWithoutMode(cfg) => {
                Box::new(DevModeWithoutModeRule::new(meta, cfg.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ids;

    #[test]
    fn factory_builds_enabled_rules_in_order() {
        let mut set = RuleSet::builtin();
        set.set_enabled(ids::VALID_MODE, false);

        let rules = RuleFactory::build(&set);
        assert_eq!(rules.len(), set.rules.len() - 1);
        assert_eq!(rules[0].rule_id(), ids::REQUIRED_PROJECTS);
        assert!(rules.iter().all(|r| r.rule_id() != ids::VALID_MODE));
    }

    #[test]
    fn meta_issue_uses_configured_severity() {
        let meta = RuleMeta::new("X", "x", Severity::Warning);
        assert_eq!(meta.issue("m").severity, Severity::Warning);
        assert_eq!(meta.issue_with(Severity::Error, "m").severity, Severity::Error);
    }
}
