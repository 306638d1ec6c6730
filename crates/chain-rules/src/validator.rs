//! Validator: runs every active rule against a model

use crate::config::RuleSet;
use crate::error::ConfigError;
use crate::issue::{RuleFault, ValidationReport};
use crate::loader::RuleConfigLoader;
use crate::rules::{RuleFactory, ValidationRule};
use crate::RuleError;
use chain_model::ChainModel;

/// Ordered set of active rules
///
/// `validate` is pure and never fails: a rule that returns `RuleError` is
/// logged, recorded as a [`RuleFault`] and contributes no issues.
#[derive(Debug)]
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Validator over the enabled rules of a set
    #[must_use]
    pub fn new(set: &RuleSet) -> Self {
        Self {
            rules: RuleFactory::build(set),
        }
    }

    /// Validator over the built-in rule set
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(&RuleSet::builtin())
    }

    /// Validator over the loader's (cached) rule set
    ///
    /// # Errors
    /// Returns `ConfigError` if the loader cannot produce a rule set
    pub fn from_loader(loader: &RuleConfigLoader) -> Result<Self, ConfigError> {
        Ok(Self::new(&*loader.load()?))
    }

    /// Validator with no rules
    #[must_use]
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule after the configured ones
    #[must_use]
    pub fn with_rule(mut self, rule: Box<dyn ValidationRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Ids of active rules in evaluation order
    #[must_use]
    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.rule_id()).collect()
    }

    /// Number of active rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule is active
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule in registration order
    #[must_use]
    pub fn validate(&self, model: &ChainModel) -> ValidationReport {
        let mut report = ValidationReport::new();
        for rule in &self.rules {
            match rule.evaluate(model) {
                Ok(issues) => report.issues.extend(issues),
                Err(err) => {
                    tracing::warn!(rule_id = rule.rule_id(), error = %err, "rule faulted, skipped");
                    let message = match err {
                        RuleError::Internal { message, .. } => message,
                    };
                    report.faults.push(RuleFault {
                        rule_id: rule.rule_id().to_string(),
                        message,
                    });
                }
            }
        }
        tracing::debug!(
            errors = report.error_count(),
            warnings = report.warning_count(),
            faults = report.faults.len(),
            "validation finished"
        );
        report
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::builtin()
    }
}
