//! Integration test flags

use super::{RuleMeta, ValidationRule};
use crate::config::{ChainCatalog, IntegrationTestsConfig};
use crate::error::RuleError;
use crate::issue::{Severity, ValidationIssue};
use crate::message::{render, MessageArgs};
use chain_model::ChainModel;

const UNKNOWN_SUITE: &str = "Integration test suite '{PropertyName}' is not known (known: {AllowedValues})";
const NOT_BOOLEAN: &str =
    "Integration test suite '{PropertyName}' has non-boolean value '{PropertyValue}'";

/// `tests.<suite>.run` must name a known suite and hold `true`/`false`
#[derive(Debug, Clone)]
pub struct IntegrationTestsRule {
    meta: RuleMeta,
    known: Vec<String>,
    known_text: String,
    config: IntegrationTestsConfig,
}

impl IntegrationTestsRule {
    /// Create rule; falls back to the catalog's suites
    #[must_use]
    pub fn new(meta: RuleMeta, config: IntegrationTestsConfig, catalog: &ChainCatalog) -> Self {
        let known = config
            .known_suites
            .clone()
            .unwrap_or_else(|| catalog.known_suites.clone());
        let known_text = known.join(", ");
        Self {
            meta,
            known,
            known_text,
            config,
        }
    }

    fn is_known(&self, suite: &str) -> bool {
        self.known.iter().any(|k| k.eq_ignore_ascii_case(suite))
    }

    fn unknown(&self, suite: &str) -> ValidationIssue {
        let args = MessageArgs::default().property(suite).allowed(&self.known_text);
        self.meta
            .issue_with(
                Severity::Warning,
                render(self.config.unknown_suite_message.as_deref(), UNKNOWN_SUITE, args),
            )
            .with_target(suite)
    }
}

impl ValidationRule for IntegrationTestsRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        let mut issues: Vec<ValidationIssue> = model
            .integration_tests
            .keys()
            .filter(|suite| !self.is_known(suite))
            .map(|suite| self.unknown(suite))
            .collect();

        for (suite, raw) in &model.unparsed_test_flags {
            if !self.is_known(suite) {
                issues.push(self.unknown(suite));
            }
            let args = MessageArgs::default().property(suite).value(raw);
            issues.push(
                self.meta
                    .issue_with(
                        Severity::Error,
                        render(self.config.invalid_value_message.as_deref(), NOT_BOOLEAN, args),
                    )
                    .with_target(suite)
                    .fixable(true)
                    .with_suggestion(format!("Set tests.{suite}.run=true or false")),
            );
        }
        Ok(issues)
    }
}
