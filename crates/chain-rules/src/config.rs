//! Rule configuration
//!
//! Rule descriptors arrive as JSON with a free-form `configuration` object
//! whose shape depends on `ruleType`. They are decoded once, at load time,
//! into [`RuleKind`], a closed union with one strongly-typed variant per rule
//! kind. Malformed descriptors fail here with [`ConfigError`] instead of
//! surprising the validator later.
//!
//! # Document shape
//!
//! ```json
//! {
//!   "catalog": { "defaultBranch": "integration" },
//!   "rules": [
//!     {
//!       "ruleId": "ValidMode",
//!       "name": "Valid build mode",
//!       "isEnabled": true,
//!       "severity": "Error",
//!       "ruleType": "PropertyValueValidation",
//!       "configuration": {
//!         "propertyName": "mode",
//!         "allowedValues": ["source", "binary", "ignore"]
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! A bare array of descriptors is accepted as well.

use crate::error::ConfigError;
use crate::issue::Severity;
use chain_model::section::{BRANCH, DEV_MODE, FORK, MODE, TAG};
use chain_model::{modes, CanonicalOrder, GLOBAL_DEV_VERSION_KEY, GLOBAL_VERSION_KEY};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default fork pattern: `owner/repo`
pub const DEFAULT_FORK_PATTERN: &str = r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$";
/// Default feature branch pattern: `feature/<name>`
pub const DEFAULT_FEATURE_BRANCH_PATTERN: &str = r"^feature/[A-Za-z0-9][A-Za-z0-9._-]*$";
/// Default project name pattern: lowercase alphanumerics and underscore
pub const DEFAULT_PROJECT_NAME_PATTERN: &str = r"^[a-z0-9_]+$";

/// Named inclusive numeric band for build numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericBand {
    /// Band name (`master`, `stage`, ...)
    pub name: String,
    /// Inclusive lower bound
    pub min: u64,
    /// Inclusive upper bound
    pub max: u64,
}

impl NumericBand {
    /// Create band
    #[must_use]
    pub fn new(name: impl Into<String>, min: u64, max: u64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    /// Whether the value lies inside the band
    #[inline]
    #[must_use]
    pub fn contains(&self, value: u64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Default build number bands
#[must_use]
pub fn default_build_bands() -> Vec<NumericBand> {
    vec![
        NumericBand::new("master", 1, 9_999),
        NumericBand::new("integration", 10_000, 19_999),
        NumericBand::new("stage", 20_000, 29_999),
        NumericBand::new("development", 30_000, 39_999),
        NumericBand::new("local", 50_000, 99_999),
    ]
}

/// Static lookup tables shared by rules and repairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainCatalog {
    /// Canonical project order
    pub canonical_order: CanonicalOrder,
    /// Known integration test suites
    pub known_suites: Vec<String>,
    /// Accepted build number bands
    pub build_bands: Vec<NumericBand>,
    /// Branch assigned when a section has neither branch nor tag
    pub default_branch: String,
    /// Global binary version assigned when missing or unusable
    pub default_binary_version: String,
    /// Global dev binary version assigned when missing and no binary version exists
    pub default_dev_version: String,
}

impl ChainCatalog {
    /// Band containing the value, if any
    #[must_use]
    pub fn band_for(&self, value: u64) -> Option<&NumericBand> {
        self.build_bands.iter().find(|b| b.contains(value))
    }

    /// Whether the suite is in the known catalog (case-insensitive)
    #[must_use]
    pub fn is_known_suite(&self, suite: &str) -> bool {
        self.known_suites.iter().any(|s| s.eq_ignore_ascii_case(suite))
    }
}

impl Default for ChainCatalog {
    fn default() -> Self {
        Self {
            canonical_order: CanonicalOrder::default(),
            known_suites: ["smoke", "regression", "api", "ui", "performance", "upgrade"]
                .into_iter()
                .map(String::from)
                .collect(),
            build_bands: default_build_bands(),
            default_branch: "integration".to_string(),
            default_binary_version: "20000".to_string(),
            default_dev_version: "20000".to_string(),
        }
    }
}

/// `PropertyRequired` configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRequiredConfig {
    /// Property suffix that must be present and non-blank
    pub property_name: String,
    /// Message template
    #[serde(default)]
    pub error_message: Option<String>,
}

/// `PropertyValueValidation` configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedValuesConfig {
    /// Property suffix to check
    pub property_name: String,
    /// Accepted values
    pub allowed_values: Vec<String>,
    /// Compare case-sensitively
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
    /// Message template
    #[serde(default)]
    pub error_message: Option<String>,
}

impl AllowedValuesConfig {
    /// Whether the value is allowed
    #[must_use]
    pub fn allows(&self, value: &str) -> bool {
        if self.case_sensitive {
            self.allowed_values.iter().any(|v| v == value)
        } else {
            self.allowed_values.iter().any(|v| v.eq_ignore_ascii_case(value))
        }
    }
}

/// `MutuallyExclusive` / `RequiredOneOf` configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySetConfig {
    /// Property suffixes taking part in the check
    pub properties: Vec<String>,
    /// Message template
    #[serde(default)]
    pub error_message: Option<String>,
}

/// `RequiredSections` configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredSectionsConfig {
    /// Required names; the catalog's canonical order when absent
    #[serde(default)]
    pub required_sections: Option<Vec<String>>,
    /// Message template
    #[serde(default)]
    pub error_message: Option<String>,
}

/// `BuildNumberRange` configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildNumberRangeConfig {
    /// Global keys to check
    #[serde(default = "default_version_fields")]
    pub fields: Vec<String>,
    /// Accepted bands; the catalog's bands when absent
    #[serde(default)]
    pub bands: Option<Vec<NumericBand>>,
    /// Template for unparsable values
    #[serde(default)]
    pub error_message: Option<String>,
    /// Template for values outside every band
    #[serde(default)]
    pub warning_message: Option<String>,
}

impl Default for BuildNumberRangeConfig {
    fn default() -> Self {
        Self {
            fields: default_version_fields(),
            bands: None,
            error_message: None,
            warning_message: None,
        }
    }
}

/// `IntegrationTests` configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationTestsConfig {
    /// Known suites; the catalog's suites when absent
    #[serde(default)]
    pub known_suites: Option<Vec<String>>,
    /// Template for unknown suites
    #[serde(default)]
    pub unknown_suite_message: Option<String>,
    /// Template for non-boolean values
    #[serde(default)]
    pub invalid_value_message: Option<String>,
}

/// Configuration holding only a message template
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageConfig {
    /// Message template
    #[serde(default, alias = "errorMessage", alias = "warningMessage")]
    pub message: Option<String>,
}

/// Configuration for regex-based naming rules, compiled at load time
#[derive(Debug, Clone)]
pub struct PatternConfig {
    /// Compiled pattern
    pub pattern: Regex,
    /// Message template
    pub message: Option<String>,
}

impl PatternConfig {
    fn decode(rule_id: &str, raw: RawPatternConfig, default_pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: compile(rule_id, raw.pattern.as_deref().unwrap_or(default_pattern))?,
            message: raw.message,
        })
    }
}

/// `FeatureBranchNaming` configuration
#[derive(Debug, Clone)]
pub struct FeatureBranchConfig {
    /// Branches starting with this prefix (case-insensitive) are checked
    pub prefix: String,
    /// Pattern checked branches must match
    pub pattern: Regex,
    /// Message template
    pub message: Option<String>,
}

/// `ContentStageBranch` configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchPolicyConfig {
    /// Project the policy applies to
    #[serde(default = "default_content_project")]
    pub project: String,
    /// Branches the project may not use
    #[serde(default = "default_forbidden_branches")]
    pub forbidden_branches: Vec<String>,
    /// Message template
    #[serde(default, alias = "errorMessage")]
    pub message: Option<String>,
}

impl Default for BranchPolicyConfig {
    fn default() -> Self {
        Self {
            project: default_content_project(),
            forbidden_branches: default_forbidden_branches(),
            message: None,
        }
    }
}

/// `TestsPreferBranch` configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPolicyConfig {
    /// Project the policy applies to
    #[serde(default = "default_tests_project")]
    pub project: String,
    /// Message template
    #[serde(default, alias = "warningMessage")]
    pub message: Option<String>,
}

impl Default for ProjectPolicyConfig {
    fn default() -> Self {
        Self {
            project: default_tests_project(),
            message: None,
        }
    }
}

/// Decoded rule kind with its typed configuration
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Property present and non-blank on every section
    PropertyRequired(PropertyRequiredConfig),
    /// Property value drawn from an allowed set
    PropertyValueValidation(AllowedValuesConfig),
    /// At most one of the properties is non-blank
    MutuallyExclusive(PropertySetConfig),
    /// At least one of the properties is non-blank
    RequiredOneOf(PropertySetConfig),
    /// Every required name exists as a section
    RequiredSections(RequiredSectionsConfig),
    /// Global version fields fall inside a numeric band
    BuildNumberRange(BuildNumberRangeConfig),
    /// Integration test flags name known suites and hold booleans
    IntegrationTests(IntegrationTestsConfig),
    /// Binary dev mode requires a global dev version
    GlobalDevVersionRequired(MessageConfig),
    /// Binary mode requires a global version
    GlobalVersionWhenBinary(MessageConfig),
    /// Fork has the `owner/repo` form
    ForkFormat(PatternConfig),
    /// Feature branches follow the naming convention
    FeatureBranchNaming(FeatureBranchConfig),
    /// Section names follow the naming convention
    ProjectNaming(PatternConfig),
    /// A project may not build from certain branches
    ContentStageBranch(BranchPolicyConfig),
    /// A project should use a branch rather than a tag
    TestsPreferBranch(ProjectPolicyConfig),
    /// Dev mode set without a base mode
    DevModeWithoutMode(MessageConfig),
}

impl RuleKind {
    /// `ruleType` tag of this kind
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::PropertyRequired(_) => "PropertyRequired",
            Self::PropertyValueValidation(_) => "PropertyValueValidation",
            Self::MutuallyExclusive(_) => "MutuallyExclusive",
            Self::RequiredOneOf(_) => "RequiredOneOf",
            Self::RequiredSections(_) => "RequiredSections",
            Self::BuildNumberRange(_) => "BuildNumberRange",
            Self::IntegrationTests(_) => "IntegrationTests",
            Self::GlobalDevVersionRequired(_) => "GlobalDevVersionRequired",
            Self::GlobalVersionWhenBinary(_) => "GlobalVersionWhenBinary",
            Self::ForkFormat(_) => "ForkFormat",
            Self::FeatureBranchNaming(_) => "FeatureBranchNaming",
            Self::ProjectNaming(_) => "ProjectNaming",
            Self::ContentStageBranch(_) => "ContentStageBranch",
            Self::TestsPreferBranch(_) => "TestsPreferBranch",
            Self::DevModeWithoutMode(_) => "DevModeWithoutMode",
        }
    }

    fn decode(rule_id: &str, rule_type: &str, configuration: serde_json::Value) -> Result<Self, ConfigError> {
        let kind = match rule_type {
            "PropertyRequired" => Self::PropertyRequired(typed(rule_id, configuration)?),
            "PropertyValueValidation" => Self::PropertyValueValidation(typed(rule_id, configuration)?),
            "MutuallyExclusive" => Self::MutuallyExclusive(typed(rule_id, configuration)?),
            "RequiredOneOf" => Self::RequiredOneOf(typed(rule_id, configuration)?),
            "RequiredSections" => Self::RequiredSections(typed(rule_id, configuration)?),
            "BuildNumberRange" => Self::BuildNumberRange(typed(rule_id, configuration)?),
            "IntegrationTests" => Self::IntegrationTests(typed(rule_id, configuration)?),
            "GlobalDevVersionRequired" => Self::GlobalDevVersionRequired(typed(rule_id, configuration)?),
            "GlobalVersionWhenBinary" => Self::GlobalVersionWhenBinary(typed(rule_id, configuration)?),
            "ForkFormat" => Self::ForkFormat(PatternConfig::decode(
                rule_id,
                typed(rule_id, configuration)?,
                DEFAULT_FORK_PATTERN,
            )?),
            "FeatureBranchNaming" => {
                let raw: RawFeatureBranchConfig = typed(rule_id, configuration)?;
                Self::FeatureBranchNaming(FeatureBranchConfig {
                    prefix: raw.prefix.unwrap_or_else(|| "feature".to_string()),
                    pattern: compile(
                        rule_id,
                        raw.pattern.as_deref().unwrap_or(DEFAULT_FEATURE_BRANCH_PATTERN),
                    )?,
                    message: raw.message,
                })
            }
            "ProjectNaming" => Self::ProjectNaming(PatternConfig::decode(
                rule_id,
                typed(rule_id, configuration)?,
                DEFAULT_PROJECT_NAME_PATTERN,
            )?),
            "ContentStageBranch" => Self::ContentStageBranch(typed(rule_id, configuration)?),
            "TestsPreferBranch" => Self::TestsPreferBranch(typed(rule_id, configuration)?),
            "DevModeWithoutMode" => Self::DevModeWithoutMode(typed(rule_id, configuration)?),
            other => {
                return Err(ConfigError::invalid_rule(
                    rule_id,
                    format!("unknown ruleType '{other}'"),
                ))
            }
        };
        kind.check(rule_id)?;
        Ok(kind)
    }

    /// Semantic checks that serde cannot express
    fn check(&self, rule_id: &str) -> Result<(), ConfigError> {
        match self {
            Self::PropertyRequired(cfg) if cfg.property_name.trim().is_empty() => {
                Err(ConfigError::invalid_rule(rule_id, "propertyName is empty"))
            }
            Self::PropertyValueValidation(cfg) if cfg.property_name.trim().is_empty() => {
                Err(ConfigError::invalid_rule(rule_id, "propertyName is empty"))
            }
            Self::PropertyValueValidation(cfg) if cfg.allowed_values.is_empty() => {
                Err(ConfigError::invalid_rule(rule_id, "allowedValues is empty"))
            }
            Self::MutuallyExclusive(cfg) | Self::RequiredOneOf(cfg) if cfg.properties.len() < 2 => {
                Err(ConfigError::invalid_rule(rule_id, "properties needs at least two entries"))
            }
            Self::BuildNumberRange(cfg) => {
                if let Some(field) = cfg
                    .fields
                    .iter()
                    .find(|f| f.as_str() != GLOBAL_VERSION_KEY && f.as_str() != GLOBAL_DEV_VERSION_KEY)
                {
                    return Err(ConfigError::invalid_rule(
                        rule_id,
                        format!("'{field}' is not a global version field"),
                    ));
                }
                check_bands(rule_id, cfg.bands.as_deref().unwrap_or_default())
            }
            _ => Ok(()),
        }
    }
}

/// One configured rule
#[derive(Debug, Clone)]
pub struct RuleDescriptor {
    /// Unique rule id (also the auto-fix registry key)
    pub rule_id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Whether the rule runs
    pub enabled: bool,
    /// Severity of the issues the rule raises
    pub severity: Severity,
    /// Kind and typed configuration
    pub kind: RuleKind,
}

impl RuleDescriptor {
    /// Create enabled descriptor
    #[must_use]
    pub fn new(rule_id: impl Into<String>, name: impl Into<String>, severity: Severity, kind: RuleKind) -> Self {
        Self {
            rule_id: rule_id.into(),
            name: name.into(),
            description: String::new(),
            enabled: true,
            severity,
            kind,
        }
    }

    /// Set description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set enabled flag
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Decoded rule configuration: catalog plus ordered descriptors
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// Static lookup tables
    pub catalog: ChainCatalog,
    /// Descriptors in evaluation order
    pub rules: Vec<RuleDescriptor>,
}

impl RuleSet {
    /// Create rule set, rejecting duplicate ids and malformed bands
    ///
    /// # Errors
    /// - `ConfigError::DuplicateRuleId` if two descriptors share an id
    /// - `ConfigError::InvalidRule` if the catalog bands are malformed
    pub fn new(catalog: ChainCatalog, rules: Vec<RuleDescriptor>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.rule_id.as_str()) {
                return Err(ConfigError::DuplicateRuleId(rule.rule_id.clone()));
            }
        }
        check_bands("catalog", &catalog.build_bands)?;
        Ok(Self { catalog, rules })
    }

    /// Decode a JSON rule document
    ///
    /// # Errors
    /// Returns `ConfigError` for malformed JSON, unknown rule types,
    /// invalid configurations or duplicate ids
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let (catalog, raw_rules) = match serde_json::from_str::<RawDocument>(json)? {
            RawDocument::List(rules) => (ChainCatalog::default(), rules),
            RawDocument::Full { catalog, rules } => (catalog.unwrap_or_default(), rules),
        };
        let rules = raw_rules
            .into_iter()
            .map(RawDescriptor::decode)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(catalog, rules)
    }

    /// Built-in default rule set
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            catalog: ChainCatalog::default(),
            rules: builtin_rules(),
        }
    }

    /// Enabled descriptors in evaluation order
    pub fn enabled(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.rules.iter().filter(|r| r.enabled)
    }

    /// Descriptor by rule id
    #[must_use]
    pub fn get(&self, rule_id: &str) -> Option<&RuleDescriptor> {
        self.rules.iter().find(|r| r.rule_id == rule_id)
    }

    /// Enable or disable a rule; returns false if the id is unknown
    pub fn set_enabled(&mut self, rule_id: &str, enabled: bool) -> bool {
        match self.rules.iter_mut().find(|r| r.rule_id == rule_id) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Rule ids of the built-in rule set
pub mod ids {
    #![allow(missing_docs)]
    pub const REQUIRED_PROJECTS: &str = "RequiredProjects";
    pub const REQUIRED_MODE: &str = "RequiredMode";
    pub const VALID_MODE: &str = "ValidMode";
    pub const VALID_DEV_MODE: &str = "ValidDevMode";
    pub const BRANCH_TAG_EXCLUSIVE: &str = "BranchTagExclusive";
    pub const BRANCH_OR_TAG_REQUIRED: &str = "BranchOrTagRequired";
    pub const FORK_FORMAT: &str = "ForkFormat";
    pub const DEV_MODE_WITHOUT_MODE: &str = "DevModeWithoutMode";
    pub const CONTENT_STAGE_BRANCH: &str = "ContentStageBranch";
    pub const TESTS_PREFER_BRANCH: &str = "TestsPreferBranch";
    pub const FEATURE_BRANCH_NAMING: &str = "FeatureBranchNaming";
    pub const PROJECT_NAMING: &str = "ProjectNaming";
    pub const GLOBAL_VERSION_WHEN_BINARY: &str = "GlobalVersionWhenBinary";
    pub const BUILD_NUMBER_RANGE: &str = "BuildNumberRange";
    pub const INTEGRATION_TESTS: &str = "IntegrationTests";
    pub const GLOBAL_DEV_VERSION_REQUIRED: &str = "GlobalDevVersionRequired";
}

fn builtin_rules() -> Vec<RuleDescriptor> {
    use Severity::{Error, Warning};

    let mode_values = vec![
        modes::SOURCE.to_string(),
        modes::BINARY.to_string(),
        modes::IGNORE.to_string(),
    ];
    let dev_mode_values = vec![
        modes::BINARY.to_string(),
        modes::IGNORE.to_string(),
        modes::SOURCE.to_string(),
    ];
    let branch_tag = vec![BRANCH.to_string(), TAG.to_string()];

    vec![
        RuleDescriptor::new(
            ids::REQUIRED_PROJECTS,
            "Required projects",
            Error,
            RuleKind::RequiredSections(RequiredSectionsConfig::default()),
        )
        .with_description("Every canonical project has a section"),
        RuleDescriptor::new(
            ids::REQUIRED_MODE,
            "Build mode required",
            Error,
            RuleKind::PropertyRequired(PropertyRequiredConfig {
                property_name: MODE.to_string(),
                error_message: None,
            }),
        ),
        RuleDescriptor::new(
            ids::VALID_MODE,
            "Valid build mode",
            Error,
            RuleKind::PropertyValueValidation(AllowedValuesConfig {
                property_name: MODE.to_string(),
                allowed_values: mode_values,
                case_sensitive: true,
                error_message: None,
            }),
        ),
        RuleDescriptor::new(
            ids::VALID_DEV_MODE,
            "Valid developer build mode",
            Error,
            RuleKind::PropertyValueValidation(AllowedValuesConfig {
                property_name: DEV_MODE.to_string(),
                allowed_values: dev_mode_values,
                case_sensitive: true,
                error_message: None,
            }),
        ),
        RuleDescriptor::new(
            ids::BRANCH_TAG_EXCLUSIVE,
            "Branch and tag are exclusive",
            Error,
            RuleKind::MutuallyExclusive(PropertySetConfig {
                properties: branch_tag.clone(),
                error_message: None,
            }),
        ),
        RuleDescriptor::new(
            ids::BRANCH_OR_TAG_REQUIRED,
            "Branch or tag required",
            Error,
            RuleKind::RequiredOneOf(PropertySetConfig {
                properties: branch_tag,
                error_message: None,
            }),
        ),
        RuleDescriptor::new(
            ids::FORK_FORMAT,
            "Fork format",
            Error,
            RuleKind::ForkFormat(PatternConfig {
                pattern: patterns::FORK.clone(),
                message: None,
            }),
        )
        .with_description(format!("'{FORK}' must have the form owner/repo")),
        RuleDescriptor::new(
            ids::DEV_MODE_WITHOUT_MODE,
            "Dev mode without base mode",
            Warning,
            RuleKind::DevModeWithoutMode(MessageConfig::default()),
        ),
        RuleDescriptor::new(
            ids::CONTENT_STAGE_BRANCH,
            "Content may not build from stage",
            Error,
            RuleKind::ContentStageBranch(BranchPolicyConfig::default()),
        ),
        RuleDescriptor::new(
            ids::TESTS_PREFER_BRANCH,
            "Tests should use a branch",
            Warning,
            RuleKind::TestsPreferBranch(ProjectPolicyConfig::default()),
        ),
        RuleDescriptor::new(
            ids::FEATURE_BRANCH_NAMING,
            "Feature branch naming",
            Warning,
            RuleKind::FeatureBranchNaming(FeatureBranchConfig {
                prefix: "feature".to_string(),
                pattern: patterns::FEATURE_BRANCH.clone(),
                message: None,
            }),
        ),
        RuleDescriptor::new(
            ids::PROJECT_NAMING,
            "Project naming",
            Warning,
            RuleKind::ProjectNaming(PatternConfig {
                pattern: patterns::PROJECT_NAME.clone(),
                message: None,
            }),
        ),
        RuleDescriptor::new(
            ids::GLOBAL_VERSION_WHEN_BINARY,
            "Global version required for binary mode",
            Error,
            RuleKind::GlobalVersionWhenBinary(MessageConfig::default()),
        ),
        RuleDescriptor::new(
            ids::BUILD_NUMBER_RANGE,
            "Build number range",
            Error,
            RuleKind::BuildNumberRange(BuildNumberRangeConfig::default()),
        ),
        RuleDescriptor::new(
            ids::INTEGRATION_TESTS,
            "Integration test suites",
            Warning,
            RuleKind::IntegrationTests(IntegrationTestsConfig::default()),
        ),
        RuleDescriptor::new(
            ids::GLOBAL_DEV_VERSION_REQUIRED,
            "Global dev version required for binary dev mode",
            Warning,
            RuleKind::GlobalDevVersionRequired(MessageConfig::default()),
        ),
    ]
}

/// Compiled default patterns
///
/// The sources are the `DEFAULT_*_PATTERN` constants; `default_patterns_compile`
/// checks each of them, so construction cannot fail at runtime.
#[allow(clippy::expect_used)]
mod patterns {
    use once_cell::sync::Lazy;
    use regex::Regex;

    pub(super) static FORK: Lazy<Regex> =
        Lazy::new(|| Regex::new(super::DEFAULT_FORK_PATTERN).expect("valid fork pattern"));
    pub(super) static FEATURE_BRANCH: Lazy<Regex> = Lazy::new(|| {
        Regex::new(super::DEFAULT_FEATURE_BRANCH_PATTERN).expect("valid feature branch pattern")
    });
    pub(super) static PROJECT_NAME: Lazy<Regex> = Lazy::new(|| {
        Regex::new(super::DEFAULT_PROJECT_NAME_PATTERN).expect("valid project name pattern")
    });
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    List(Vec<RawDescriptor>),
    Full {
        #[serde(default)]
        catalog: Option<ChainCatalog>,
        rules: Vec<RawDescriptor>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDescriptor {
    rule_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default = "default_true")]
    is_enabled: bool,
    severity: Severity,
    rule_type: String,
    #[serde(default)]
    configuration: serde_json::Value,
}

impl RawDescriptor {
    fn decode(self) -> Result<RuleDescriptor, ConfigError> {
        if self.rule_id.trim().is_empty() {
            return Err(ConfigError::invalid_rule("<empty>", "ruleId is empty"));
        }
        let kind = RuleKind::decode(&self.rule_id, &self.rule_type, self.configuration)?;
        Ok(RuleDescriptor {
            name: self.name.unwrap_or_else(|| self.rule_id.clone()),
            rule_id: self.rule_id,
            description: self.description,
            enabled: self.is_enabled,
            severity: self.severity,
            kind,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPatternConfig {
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default, alias = "errorMessage", alias = "warningMessage")]
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFeatureBranchConfig {
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default, alias = "warningMessage")]
    message: Option<String>,
}

fn typed<T: DeserializeOwned>(rule_id: &str, configuration: serde_json::Value) -> Result<T, ConfigError> {
    // a missing configuration object decodes like an empty one
    let configuration = match configuration {
        serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(configuration)
        .map_err(|e| ConfigError::invalid_rule(rule_id, format!("bad configuration: {e}")))
}

fn compile(rule_id: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern)
        .map_err(|e| ConfigError::invalid_rule(rule_id, format!("invalid pattern '{pattern}': {e}")))
}

fn check_bands(rule_id: &str, bands: &[NumericBand]) -> Result<(), ConfigError> {
    match bands.iter().find(|b| b.min > b.max) {
        Some(band) => Err(ConfigError::invalid_rule(
            rule_id,
            format!("band '{}' has min {} above max {}", band.name, band.min, band.max),
        )),
        None => Ok(()),
    }
}

fn default_true() -> bool {
    true
}

fn default_version_fields() -> Vec<String> {
    vec![GLOBAL_VERSION_KEY.to_string(), GLOBAL_DEV_VERSION_KEY.to_string()]
}

fn default_content_project() -> String {
    "content".to_string()
}

fn default_forbidden_branches() -> Vec<String> {
    vec!["stage".to_string()]
}

fn default_tests_project() -> String {
    "tests".to_string()
}
