//! Global version rules

use super::{RuleMeta, ValidationRule};
use crate::config::{BuildNumberRangeConfig, ChainCatalog, MessageConfig, NumericBand};
use crate::error::RuleError;
use crate::issue::{Severity, ValidationIssue};
use crate::message::{render, MessageArgs};
use chain_model::{modes, ChainModel, GLOBAL_DEV_VERSION_KEY, GLOBAL_VERSION_KEY};

const UNPARSABLE: &str = "Global '{PropertyName}' value '{PropertyValue}' is not a build number";
const OUT_OF_RANGE: &str =
    "Global '{PropertyName}' value '{PropertyValue}' is outside every build band ({AllowedValues})";
const VERSION_WHEN_BINARY: &str =
    "Global binary version must be set when a project uses binary mode";
const VERSION_OUT_OF_BAND: &str =
    "Global binary version '{PropertyValue}' is not a usable build for binary projects";
const DEV_VERSION_REQUIRED: &str =
    "Global dev binary version must be set when a project uses binary dev mode";

/// Global version fields must be integers inside a named band
///
/// Unparsable values are errors and auto-fixable. Parsable values outside
/// every band are warnings. Absent or blank fields are skipped.
#[derive(Debug, Clone)]
pub struct BuildNumberRangeRule {
    meta: RuleMeta,
    fields: Vec<String>,
    bands: Vec<NumericBand>,
    bands_text: String,
    error_message: Option<String>,
    warning_message: Option<String>,
}

impl BuildNumberRangeRule {
    /// Create rule; falls back to the catalog's bands
    #[must_use]
    pub fn new(meta: RuleMeta, config: BuildNumberRangeConfig, catalog: &ChainCatalog) -> Self {
        let bands = config.bands.unwrap_or_else(|| catalog.build_bands.clone());
        let bands_text = bands
            .iter()
            .map(|b| format!("{} {}-{}", b.name, b.min, b.max))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            meta,
            fields: config.fields,
            bands,
            bands_text,
            error_message: config.error_message,
            warning_message: config.warning_message,
        }
    }

    fn field_value<'a>(model: &'a ChainModel, field: &str) -> Option<&'a str> {
        match field {
            GLOBAL_VERSION_KEY => model.global.version_non_blank(),
            GLOBAL_DEV_VERSION_KEY => model.global.dev_version_non_blank(),
            _ => None,
        }
    }
}

impl ValidationRule for BuildNumberRangeRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        let mut issues = Vec::new();
        for field in &self.fields {
            let Some(raw) = Self::field_value(model, field) else {
                continue;
            };
            let value = raw.trim();
            let args = MessageArgs::default()
                .property(field)
                .value(value)
                .allowed(&self.bands_text);

            match value.parse::<u64>() {
                Err(_) => issues.push(
                    self.meta
                        .issue_with(
                            Severity::Error,
                            render(self.error_message.as_deref(), UNPARSABLE, args),
                        )
                        .with_target(field)
                        .fixable(true)
                        .with_suggestion(format!("Set {field} to a numeric build number")),
                ),
                Ok(number) if !self.bands.iter().any(|b| b.contains(number)) => issues.push(
                    self.meta
                        .issue_with(
                            Severity::Warning,
                            render(self.warning_message.as_deref(), OUT_OF_RANGE, args),
                        )
                        .with_target(field),
                ),
                Ok(_) => {}
            }
        }
        Ok(issues)
    }
}

/// A binary-mode project requires a usable global binary version
///
/// Missing versions and numeric versions outside every catalog band are
/// auto-fixable errors. Unparsable values are left to the build number rule.
#[derive(Debug, Clone)]
pub struct GlobalVersionWhenBinaryRule {
    meta: RuleMeta,
    config: MessageConfig,
    bands: Vec<NumericBand>,
}

impl GlobalVersionWhenBinaryRule {
    /// Create rule
    #[must_use]
    pub fn new(meta: RuleMeta, config: MessageConfig, catalog: &ChainCatalog) -> Self {
        Self {
            meta,
            config,
            bands: catalog.build_bands.clone(),
        }
    }

    fn out_of_band(&self, version: &str) -> bool {
        version
            .trim()
            .parse::<u64>()
            .is_ok_and(|number| !self.bands.iter().any(|b| b.contains(number)))
    }
}

impl ValidationRule for GlobalVersionWhenBinaryRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        if !model.any_mode(modes::BINARY) {
            return Ok(Vec::new());
        }
        let message = match model.global.version_non_blank() {
            None => render(
                self.config.message.as_deref(),
                VERSION_WHEN_BINARY,
                MessageArgs::default().property(GLOBAL_VERSION_KEY),
            ),
            Some(version) if self.out_of_band(version) => render(
                None,
                VERSION_OUT_OF_BAND,
                MessageArgs::default()
                    .property(GLOBAL_VERSION_KEY)
                    .value(version.trim()),
            ),
            Some(_) => return Ok(Vec::new()),
        };
        let binary: Vec<&str> = model
            .sections
            .iter()
            .filter(|s| s.mode() == Some(modes::BINARY))
            .map(|s| s.name.as_str())
            .collect();
        Ok(vec![self
            .meta
            .issue(message)
            .with_target(GLOBAL_VERSION_KEY)
            .fixable(true)
            .with_suggestion(format!(
                "Set {GLOBAL_VERSION_KEY} (binary projects: {})",
                binary.join(", ")
            ))])
    }
}

/// A binary dev-mode project requires a global dev binary version
#[derive(Debug, Clone)]
pub struct GlobalDevVersionRule {
    meta: RuleMeta,
    config: MessageConfig,
}

impl GlobalDevVersionRule {
    /// Create rule
    #[must_use]
    pub fn new(meta: RuleMeta, config: MessageConfig) -> Self {
        Self { meta, config }
    }
}

impl ValidationRule for GlobalDevVersionRule {
    fn rule_id(&self) -> &str {
        &self.meta.rule_id
    }

    fn evaluate(&self, model: &ChainModel) -> Result<Vec<ValidationIssue>, RuleError> {
        if !model.any_dev_mode(modes::BINARY) || model.global.dev_version_non_blank().is_some() {
            return Ok(Vec::new());
        }
        let message = render(
            self.config.message.as_deref(),
            DEV_VERSION_REQUIRED,
            MessageArgs::default().property(GLOBAL_DEV_VERSION_KEY),
        );
        Ok(vec![self
            .meta
            .issue(message)
            .with_target(GLOBAL_DEV_VERSION_KEY)
            .fixable(true)
            .with_suggestion(format!("Set {GLOBAL_DEV_VERSION_KEY}"))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_model::Section;

    fn range_rule() -> BuildNumberRangeRule {
        BuildNumberRangeRule::new(
            RuleMeta::new("BuildNumberRange", "range", Severity::Error),
            BuildNumberRangeConfig::default(),
            &ChainCatalog::default(),
        )
    }

    fn binary_rule() -> GlobalVersionWhenBinaryRule {
        GlobalVersionWhenBinaryRule::new(
            RuleMeta::new("GlobalVersionWhenBinary", "v", Severity::Error),
            MessageConfig::default(),
            &ChainCatalog::default(),
        )
    }

    fn with_version(version: &str) -> ChainModel {
        let mut model = ChainModel::new();
        model.global.version = Some(version.to_string());
        model
    }

    #[test]
    fn in_band_versions_pass() {
        for version in ["15000", "1", "20000", "99999", " 30000 "] {
            assert!(
                range_rule().evaluate(&with_version(version)).unwrap().is_empty(),
                "{version} should be accepted"
            );
        }
    }

    #[test]
    fn out_of_band_is_one_warning() {
        let issues = range_rule().evaluate(&with_version("45000")).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(!issues[0].auto_fixable);
        assert!(issues[0].message.contains("master 1-9999"));
    }

    #[test]
    fn unparsable_is_one_fixable_error() {
        let issues = range_rule().evaluate(&with_version("abc")).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].auto_fixable);
        assert_eq!(issues[0].target.as_deref(), Some(GLOBAL_VERSION_KEY));
        assert_eq!(issues[0].section, None);
    }

    #[test]
    fn dev_version_is_checked_too() {
        let mut model = with_version("15000");
        model.global.dev_version = Some("0".to_string());
        let issues = range_rule().evaluate(&model).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].target.as_deref(), Some(GLOBAL_DEV_VERSION_KEY));
    }

    #[test]
    fn binary_mode_needs_global_version() {
        let rule = binary_rule();
        let mut model = ChainModel::new();
        model.push_section(Section::new("app").with("mode", "binary"));
        let issues = rule.evaluate(&model).unwrap();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].suggested_fix.as_deref().unwrap().contains("app"));

        model.global.version = Some("20000".to_string());
        assert!(rule.evaluate(&model).unwrap().is_empty());
    }

    #[test]
    fn binary_mode_rejects_out_of_band_version() {
        let rule = binary_rule();
        let mut model = with_version("45000");
        model.push_section(Section::new("app").with("mode", "binary"));
        let issues = rule.evaluate(&model).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].auto_fixable);
        assert_eq!(issues[0].target.as_deref(), Some(GLOBAL_VERSION_KEY));
        assert!(issues[0].message.contains("45000"));

        // left to the build number rule
        model.global.version = Some("abc".to_string());
        assert!(rule.evaluate(&model).unwrap().is_empty());
    }

    #[test]
    fn out_of_band_version_is_fine_without_binary_projects() {
        let mut model = with_version("45000");
        model.push_section(Section::new("app").with("mode", "source"));
        assert!(binary_rule().evaluate(&model).unwrap().is_empty());
    }

    #[test]
    fn binary_dev_mode_needs_dev_version() {
        let rule = GlobalDevVersionRule::new(
            RuleMeta::new("GlobalDevVersionRequired", "v", Severity::Warning),
            MessageConfig::default(),
        );
        let mut model = ChainModel::new();
        model.push_section(Section::new("app").with("mode.devs", "ignore"));
        assert!(rule.evaluate(&model).unwrap().is_empty());

        model.push_section(Section::new("olap").with("mode.devs", "binary"));
        let issues = rule.evaluate(&model).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }
}
