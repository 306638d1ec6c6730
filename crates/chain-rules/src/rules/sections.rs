//! Section completeness

use super::{RuleMeta, ValidationRule};
use crate::config::{ChainCatalog, RequiredSectionsConfig};
use crate::error::RuleError;
use crate::issue::ValidationIssue;
use crate::message::{render, MessageArgs};
use chain_model::ChainModel;

const MISSING_SECTION: &str = "Required project '{SectionName}' is missing";

/// Every required name must exist as a section
///
/// Emits one issue per missing name, carrying the name as its section.
#[derive(Debug, Clone)]
pub struct RequiredSectionsRule {
    meta: RuleMeta,
    required: Vec<String>,
    message: Option<String>,
}

impl RequiredSectionsRule {
    /// Create rule; falls back to the catalog's canonical order
    #[must_use]
    pub fn new(meta: RuleMeta, config: RequiredSectionsConfig, catalog: &ChainCatalog) -> Self {
        let required = config
            .required_sections
            .unwrap_or_else(|| catalog.canonical_order.iter().map(String::from).collect());
        Self {
            meta,
            required,
            message: config.error_message,
        }
    }
}

impl ValidationRule for RequiredSectionsRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        Ok(self
            .required
            .iter()
            .filter(|name| !model.has_section(name))
            .map(|name| {
                self.meta
                    .issue(render(
                        self.message.as_deref(),
                        MISSING_SECTION,
                        MessageArgs::section(name),
                    ))
                    .in_section(name)
                    .fixable(true)
                    .with_suggestion(format!("Add a '{name}' section"))
            })
            .collect())
    }
}
