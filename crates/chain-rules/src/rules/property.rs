//! Per-section property rules

use super::{RuleMeta, ValidationRule};
use crate::config::{AllowedValuesConfig, PropertyRequiredConfig};
use crate::error::RuleError;
use crate::issue::ValidationIssue;
use crate::message::{render, MessageArgs};
use chain_model::ChainModel;

const MISSING_PROPERTY: &str = "Section '{SectionName}' is missing required property '{PropertyName}'";
const INVALID_VALUE: &str =
    "Section '{SectionName}' has invalid {PropertyName} '{PropertyValue}' (allowed: {AllowedValues})";

/// Property must be present and non-blank on every section
#[derive(Debug, Clone)]
pub struct PropertyRequiredRule {
    meta: RuleMeta,
    config: PropertyRequiredConfig,
}

impl PropertyRequiredRule {
    /// Create rule
    #[must_use]
    pub fn new(meta: RuleMeta, config: PropertyRequiredConfig) -> Self {
        Self { meta, config }
    }
}

impl ValidationRule for PropertyRequiredRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        let property = self.config.property_name.as_str();
        Ok(model
            .sections
            .iter()
            .filter(|s| !s.has(property))
            .map(|s| {
                let args = MessageArgs::section(&s.name).property(property);
                self.meta
                    .issue(render(self.config.error_message.as_deref(), MISSING_PROPERTY, args))
                    .in_section(&s.name)
                    .with_target(property)
                    .fixable(true)
                    .with_suggestion(format!("Add {}.{property}=<value>", s.name))
            })
            .collect())
    }
}

/// Property value must belong to an allowed set
///
/// Sections where the property is absent or blank are skipped; presence is
/// the concern of [`PropertyRequiredRule`].
#[derive(Debug, Clone)]
pub struct PropertyValueRule {
    meta: RuleMeta,
    config: AllowedValuesConfig,
    allowed_text: String,
}

impl PropertyValueRule {
    /// Create rule
    #[must_use]
    pub fn new(meta: RuleMeta, config: AllowedValuesConfig) -> Self {
        let allowed_text = config.allowed_values.join(", ");
        Self {
            meta,
            config,
            allowed_text,
        }
    }
}

impl ValidationRule for PropertyValueRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        let property = self.config.property_name.as_str();
        let mut issues = Vec::new();
        for section in &model.sections {
            let Some(value) = section.get_non_blank(property) else {
                continue;
            };
            if self.config.allows(value) {
                continue;
            }
            let args = MessageArgs::section(&section.name)
                .property(property)
                .value(value)
                .allowed(&self.allowed_text);
            issues.push(
                self.meta
                    .issue(render(self.config.error_message.as_deref(), INVALID_VALUE, args))
                    .in_section(&section.name)
                    .with_target(property)
                    .fixable(true)
                    .with_suggestion(format!("Use one of: {}", self.allowed_text)),
            );
        }
        Ok(issues)
    }
}
