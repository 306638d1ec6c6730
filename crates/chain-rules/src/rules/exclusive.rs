//! Rules over sets of properties: at most one, at least one

use super::{RuleMeta, ValidationRule};
use crate::config::PropertySetConfig;
use crate::error::RuleError;
use crate::issue::ValidationIssue;
use crate::message::{render, MessageArgs};
use chain_model::{ChainModel, Section};

const EXCLUSIVE: &str = "Section '{SectionName}' sets mutually exclusive properties: {PropertyName}";
const ONE_OF: &str = "Section '{SectionName}' must set one of: {PropertyName}";

fn present<'a>(section: &Section, properties: &'a [String]) -> Vec<&'a str> {
    properties
        .iter()
        .map(String::as_str)
        .filter(|p| section.has(p))
        .collect()
}

/// At most one of the properties may be non-blank
#[derive(Debug, Clone)]
pub struct MutuallyExclusiveRule {
    meta: RuleMeta,
    config: PropertySetConfig,
}

impl MutuallyExclusiveRule {
    /// Create rule
    #[must_use]
    pub fn new(meta: RuleMeta, config: PropertySetConfig) -> Self {
        Self { meta, config }
    }
}

impl ValidationRule for MutuallyExclusiveRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        let mut issues = Vec::new();
        for section in &model.sections {
            let set = present(section, &self.config.properties);
            if set.len() < 2 {
                continue;
            }
            let names = set.join(", ");
            let args = MessageArgs::section(&section.name).property(&names);
            issues.push(
                self.meta
                    .issue(render(self.config.error_message.as_deref(), EXCLUSIVE, args))
                    .in_section(&section.name)
                    .with_target(set.join(","))
                    .fixable(true)
                    .with_suggestion(format!("Keep only {}.{}", section.name, set[0])),
            );
        }
        Ok(issues)
    }
}

/// At least one of the properties must be non-blank
#[derive(Debug, Clone)]
pub struct RequiredOneOfRule {
    meta: RuleMeta,
    config: PropertySetConfig,
}

impl RequiredOneOfRule {
    /// Create rule
    #[must_use]
    pub fn new(meta: RuleMeta, config: PropertySetConfig) -> Self {
        Self { meta, config }
    }
}

impl ValidationRule for RequiredOneOfRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        let first = self
            .config
            .properties
            .first()
            .ok_or_else(|| RuleError::internal(&self.meta.rule_id, "no properties configured"))?;
        let names = self.config.properties.join(", ");

        Ok(model
            .sections
            .iter()
            .filter(|s| present(s, &self.config.properties).is_empty())
            .map(|s| {
                let args = MessageArgs::section(&s.name).property(&names);
                self.meta
                    .issue(render(self.config.error_message.as_deref(), ONE_OF, args))
                    .in_section(&s.name)
                    .with_target(first.as_str())
                    .fixable(true)
                    .with_suggestion(format!("Add {}.{first}=<value>", s.name))
            })
            .collect())
    }
}
