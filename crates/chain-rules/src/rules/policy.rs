//! Fixed domain policy rules
//!
//! These encode chain conventions directly. Their patterns, project names and
//! messages can be tuned through configuration, but the check itself is fixed.

use super::{RuleMeta, ValidationRule};
use crate::config::{
    BranchPolicyConfig, FeatureBranchConfig, MessageConfig, PatternConfig, ProjectPolicyConfig,
};
use crate::error::RuleError;
use crate::issue::ValidationIssue;
use crate::message::{render, MessageArgs};
use chain_model::section::{BRANCH, DEV_MODE, FORK, MODE, TAG};
use chain_model::{ChainModel, Section};

const BAD_FORK: &str = "Section '{SectionName}' fork '{PropertyValue}' is not in owner/repo form";
const DEV_WITHOUT_MODE: &str = "Section '{SectionName}' sets mode.devs '{PropertyValue}' without a mode";
const FORBIDDEN_BRANCH: &str = "Section '{SectionName}' may not build from branch '{PropertyValue}'";
const PREFER_BRANCH: &str = "Section '{SectionName}' uses tag '{PropertyValue}'; a branch is preferred";
const BAD_FEATURE_BRANCH: &str =
    "Section '{SectionName}' branch '{PropertyValue}' does not follow feature/<name>";
const BAD_PROJECT_NAME: &str =
    "Project name '{SectionName}' should be lowercase letters, digits and underscores";

fn per_section<F>(model: &ChainModel, check: F) -> Vec<ValidationIssue>
where
    F: Fn(&Section) -> Option<ValidationIssue>,
{
    model.sections.iter().filter_map(check).collect()
}

/// `fork` must have the form `owner/repo`
#[derive(Debug, Clone)]
pub struct ForkFormatRule {
    meta: RuleMeta,
    config: PatternConfig,
}

impl ForkFormatRule {
    /// Create rule
    #[must_use]
    pub fn new(meta: RuleMeta, config: PatternConfig) -> Self {
        Self { meta, config }
    }
}

impl ValidationRule for ForkFormatRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        Ok(per_section(model, |s| {
            let fork = s.get_non_blank(FORK)?.trim();
            if self.config.pattern.is_match(fork) {
                return None;
            }
            let args = MessageArgs::section(&s.name).property(FORK).value(fork);
            Some(
                self.meta
                    .issue(render(self.config.message.as_deref(), BAD_FORK, args))
                    .in_section(&s.name)
                    .with_target(FORK)
                    .fixable(true)
                    .with_suggestion(format!("Use {}.fork=<owner>/<repo> or remove it", s.name)),
            )
        }))
    }
}

/// `mode.devs` set while `mode` is missing
#[derive(Debug, Clone)]
pub struct DevModeWithoutModeRule {
    meta: RuleMeta,
    config: MessageConfig,
}

impl DevModeWithoutModeRule {
    /// Create rule
    #[must_use]
    pub fn new(meta: RuleMeta, config: MessageConfig) -> Self {
        Self { meta, config }
    }
}

impl ValidationRule for DevModeWithoutModeRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        Ok(per_section(model, |s| {
            let dev_mode = s.get_non_blank(DEV_MODE)?;
            if s.has(MODE) {
                return None;
            }
            let args = MessageArgs::section(&s.name).property(DEV_MODE).value(dev_mode);
            Some(
                self.meta
                    .issue(render(self.config.message.as_deref(), DEV_WITHOUT_MODE, args))
                    .in_section(&s.name)
                    .with_target(MODE),
            )
        }))
    }
}

/// A project may not build from a forbidden branch
#[derive(Debug, Clone)]
pub struct ContentStageBranchRule {
    meta: RuleMeta,
    config: BranchPolicyConfig,
}

impl ContentStageBranchRule {
    /// Create rule
    #[must_use]
    pub fn new(meta: RuleMeta, config: BranchPolicyConfig) -> Self {
        Self { meta, config }
    }
}

impl ValidationRule for ContentStageBranchRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        Ok(per_section(model, |s| {
            if !s.is_named(&self.config.project) {
                return None;
            }
            let branch = s.get_non_blank(BRANCH)?.trim();
            if !self
                .config
                .forbidden_branches
                .iter()
                .any(|f| f.eq_ignore_ascii_case(branch))
            {
                return None;
            }
            let args = MessageArgs::section(&s.name).property(BRANCH).value(branch);
            Some(
                self.meta
                    .issue(render(self.config.message.as_deref(), FORBIDDEN_BRANCH, args))
                    .in_section(&s.name)
                    .with_target(BRANCH),
            )
        }))
    }
}

/// A project should use a branch rather than a tag
#[derive(Debug, Clone)]
pub struct TestsPreferBranchRule {
    meta: RuleMeta,
    config: ProjectPolicyConfig,
}

impl TestsPreferBranchRule {
    /// Create rule
    #[must_use]
    pub fn new(meta: RuleMeta, config: ProjectPolicyConfig) -> Self {
        Self { meta, config }
    }
}

impl ValidationRule for TestsPreferBranchRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        Ok(per_section(model, |s| {
            if !s.is_named(&self.config.project) || s.has(BRANCH) {
                return None;
            }
            let tag = s.get_non_blank(TAG)?;
            let args = MessageArgs::section(&s.name).property(TAG).value(tag);
            Some(
                self.meta
                    .issue(render(self.config.message.as_deref(), PREFER_BRANCH, args))
                    .in_section(&s.name)
                    .with_target(TAG)
                    .with_suggestion(format!("Replace {}.tag with {}.branch", s.name, s.name)),
            )
        }))
    }
}

/// Branches with the feature prefix must follow the naming pattern
#[derive(Debug, Clone)]
pub struct FeatureBranchNamingRule {
    meta: RuleMeta,
    config: FeatureBranchConfig,
}

impl FeatureBranchNamingRule {
    /// Create rule
    #[must_use]
    pub fn new(meta: RuleMeta, config: FeatureBranchConfig) -> Self {
        Self { meta, config }
    }

    fn has_prefix(&self, branch: &str) -> bool {
        branch
            .get(..self.config.prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(&self.config.prefix))
    }
}

impl ValidationRule for FeatureBranchNamingRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        Ok(per_section(model, |s| {
            let branch = s.get_non_blank(BRANCH)?.trim();
            if !self.has_prefix(branch) || self.config.pattern.is_match(branch) {
                return None;
            }
            let args = MessageArgs::section(&s.name).property(BRANCH).value(branch);
            Some(
                self.meta
                    .issue(render(self.config.message.as_deref(), BAD_FEATURE_BRANCH, args))
                    .in_section(&s.name)
                    .with_target(BRANCH),
            )
        }))
    }
}

/// Section names follow the project naming convention
#[derive(Debug, Clone)]
pub struct ProjectNamingRule {
    meta: RuleMeta,
    config: PatternConfig,
}

impl ProjectNamingRule {
    /// Create rule
    #[must_use]
    pub fn new(meta: RuleMeta, config: PatternConfig) -> Self {
        Self { meta, config }
    }
}

impl ValidationRule for ProjectNamingRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        Ok(per_section(model, |s| {
            if self.config.pattern.is_match(&s.name) {
                return None;
            }
            Some(
                self.meta
                    .issue(render(
                        self.config.message.as_deref(),
                        BAD_PROJECT_NAME,
                        MessageArgs::section(&s.name),
                    ))
                    .in_section(&s.name),
            )
        }))
    }
}
