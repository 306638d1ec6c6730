//! Repair functions and their registry
//!
//! Each rule id maps to exactly one [`Repair`]. Repairs are plain closures
//! over `(model, issue)`; the constructors in this module build the ones the
//! built-in rule set needs.

use crate::error::FixError;
use chain_model::section::{BRANCH, DEV_MODE, FORK, MODE, TAG};
use chain_model::{modes, ChainModel, Section, GLOBAL_DEV_VERSION_KEY, GLOBAL_VERSION_KEY};
use chain_rules::{ids, ChainCatalog, ValidationIssue};
use indexmap::IndexMap;
use std::fmt;

/// Deterministic repair for one kind of issue
///
/// Returns `Ok(true)` when the model changed, `Ok(false)` when there was
/// nothing left to do.
pub trait Repair: Send + Sync {
    /// Repair the issue in place
    ///
    /// # Errors
    /// Returns `FixError` when the issue cannot be repaired
    fn repair(&self, model: &mut ChainModel, issue: &ValidationIssue) -> Result<bool, FixError>;
}

impl<F> Repair for F
where
    F: Fn(&mut ChainModel, &ValidationIssue) -> Result<bool, FixError> + Send + Sync,
{
    fn repair(&self, model: &mut ChainModel, issue: &ValidationIssue) -> Result<bool, FixError> {
        self(model, issue)
    }
}

/// Section the issue points at
fn issue_section<'m>(
    model: &'m mut ChainModel,
    issue: &ValidationIssue,
) -> Result<&'m mut Section, FixError> {
    let name = issue
        .section
        .as_deref()
        .ok_or_else(|| FixError::missing_section(&issue.rule_id))?;
    model
        .section_mut(name)
        .ok_or_else(|| FixError::SectionNotFound(name.to_string()))
}

fn issue_target<'i>(issue: &'i ValidationIssue) -> Result<&'i str, FixError> {
    issue
        .target
        .as_deref()
        .ok_or_else(|| FixError::missing_target(&issue.rule_id))
}

fn upsert(slot: &mut Option<String>, value: &str) -> bool {
    if slot.as_deref() == Some(value) {
        return false;
    }
    *slot = Some(value.to_string());
    true
}

/// Set a section property to a fixed value
pub fn set_property(suffix: &'static str, value: impl Into<String>) -> impl Repair {
    let value = value.into();
    move |model: &mut ChainModel, issue: &ValidationIssue| -> Result<bool, FixError> {
        let section = issue_section(model, issue)?;
        if section.get(suffix) == Some(value.as_str()) {
            return Ok(false);
        }
        section.set(suffix, value.as_str());
        Ok(true)
    }
}

/// Remove a section property
pub fn remove_property(suffix: &'static str) -> impl Repair {
    move |model: &mut ChainModel, issue: &ValidationIssue| -> Result<bool, FixError> {
        Ok(issue_section(model, issue)?.remove(suffix).is_some())
    }
}

/// Set a global key to a fixed value
pub fn set_global(key: &'static str, value: impl Into<String>) -> impl Repair {
    let value = value.into();
    move |model: &mut ChainModel, _issue: &ValidationIssue| -> Result<bool, FixError> {
        let slot = match key {
            GLOBAL_VERSION_KEY => &mut model.global.version,
            GLOBAL_DEV_VERSION_KEY => &mut model.global.dev_version,
            other => return Err(FixError::unsupported(other)),
        };
        Ok(upsert(slot, &value))
    }
}

/// Reset the global version field named by the issue target to its default
pub fn reset_version_field(catalog: &ChainCatalog) -> impl Repair {
    let binary = catalog.default_binary_version.clone();
    let dev = catalog.default_dev_version.clone();
    move |model: &mut ChainModel, issue: &ValidationIssue| -> Result<bool, FixError> {
        match issue_target(issue)? {
            GLOBAL_VERSION_KEY => Ok(upsert(&mut model.global.version, &binary)),
            GLOBAL_DEV_VERSION_KEY => Ok(upsert(&mut model.global.dev_version, &dev)),
            other => Err(FixError::unsupported(other)),
        }
    }
}

/// Set the global dev version to the global version, or the default
pub fn fill_dev_version(catalog: &ChainCatalog) -> impl Repair {
    let fallback = catalog.default_dev_version.clone();
    move |model: &mut ChainModel, _issue: &ValidationIssue| -> Result<bool, FixError> {
        if model.global.dev_version_non_blank().is_some() {
            return Ok(false);
        }
        let value = model
            .global
            .version_non_blank()
            .map_or_else(|| fallback.clone(), |v| v.trim().to_string());
        model.global.dev_version = Some(value);
        Ok(true)
    }
}

/// Set the integration test flag named by the issue target to a boolean
pub fn set_test_flag(enabled: bool) -> impl Repair {
    move |model: &mut ChainModel, issue: &ValidationIssue| -> Result<bool, FixError> {
        let suite = issue_target(issue)?;
        let had_raw = model.unparsed_test_flags.contains_key(suite);
        let previous = model.integration_tests.get(suite).copied();
        model.set_integration_test(suite, enabled);
        Ok(had_raw || previous != Some(enabled))
    }
}

/// Rule id → repair
pub struct FixRegistry {
    repairs: IndexMap<String, Box<dyn Repair>>,
}

impl FixRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            repairs: IndexMap::new(),
        }
    }

    /// Registry with a repair for every fixable built-in rule
    ///
    /// `RequiredProjects` has no entry: the engine creates missing sections
    /// in one pass instead of per issue.
    #[must_use]
    pub fn with_defaults(catalog: &ChainCatalog) -> Self {
        let mut registry = Self::new();
        registry.register(ids::REQUIRED_MODE, set_property(MODE, modes::SOURCE));
        registry.register(ids::VALID_MODE, set_property(MODE, modes::SOURCE));
        registry.register(ids::VALID_DEV_MODE, set_property(DEV_MODE, modes::BINARY));
        registry.register(ids::BRANCH_TAG_EXCLUSIVE, remove_property(TAG));
        registry.register(
            ids::BRANCH_OR_TAG_REQUIRED,
            set_property(BRANCH, catalog.default_branch.clone()),
        );
        registry.register(ids::FORK_FORMAT, remove_property(FORK));
        registry.register(
            ids::GLOBAL_VERSION_WHEN_BINARY,
            set_global(GLOBAL_VERSION_KEY, catalog.default_binary_version.clone()),
        );
        registry.register(ids::BUILD_NUMBER_RANGE, reset_version_field(catalog));
        registry.register(ids::INTEGRATION_TESTS, set_test_flag(false));
        registry.register(ids::GLOBAL_DEV_VERSION_REQUIRED, fill_dev_version(catalog));
        registry
    }

    /// Register (or replace) the repair for a rule id
    pub fn register(&mut self, rule_id: &str, repair: impl Repair + 'static) {
        self.repairs.insert(rule_id.to_string(), Box::new(repair));
    }

    /// Remove the repair for a rule id
    pub fn remove(&mut self, rule_id: &str) -> bool {
        self.repairs.shift_remove(rule_id).is_some()
    }

    /// Repair for a rule id
    #[must_use]
    pub fn get(&self, rule_id: &str) -> Option<&dyn Repair> {
        self.repairs.get(rule_id).map(|repair| &**repair)
    }

    /// Check if a repair exists
    #[inline]
    #[must_use]
    pub fn contains(&self, rule_id: &str) -> bool {
        self.repairs.contains_key(rule_id)
    }

    /// Registered rule ids in registration order
    #[must_use]
    pub fn rule_ids(&self) -> Vec<&str> {
        self.repairs.keys().map(String::as_str).collect()
    }

    /// Number of registered repairs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.repairs.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repairs.is_empty()
    }
}

impl Default for FixRegistry {
    fn default() -> Self {
        Self::with_defaults(&ChainCatalog::default())
    }
}

impl fmt::Debug for FixRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixRegistry")
            .field("rule_ids", &self.rule_ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_rules::Severity;

    fn issue(rule_id: &str, section: Option<&str>, target: Option<&str>) -> ValidationIssue {
        let mut issue = ValidationIssue::new(rule_id, Severity::Error, "x").fixable(true);
        issue.section = section.map(String::from);
        issue.target = target.map(String::from);
        issue
    }

    fn model() -> ChainModel {
        let mut model = ChainModel::new();
        model.push_section(
            Section::new("olap")
                .with(MODE, "bogus")
                .with(BRANCH, "main")
                .with(TAG, "Olap_1.0.2.3")
                .with(FORK, "nope"),
        );
        model
    }

    #[test]
    fn set_property_reports_change_once() {
        let repair = set_property(MODE, modes::SOURCE);
        let mut model = model();
        let issue = issue(ids::VALID_MODE, Some("OLAP"), Some(MODE));
        assert_eq!(repair.repair(&mut model, &issue), Ok(true));
        assert_eq!(repair.repair(&mut model, &issue), Ok(false));
        assert_eq!(model.section("olap").and_then(Section::mode), Some("source"));
    }

    #[test]
    fn remove_property_drops_tag() {
        let mut model = model();
        let issue = issue(ids::BRANCH_TAG_EXCLUSIVE, Some("olap"), None);
        assert_eq!(remove_property(TAG).repair(&mut model, &issue), Ok(true));
        assert_eq!(model.section("olap").and_then(Section::tag), None);
        assert_eq!(model.section("olap").and_then(Section::branch), Some("main"));
    }

    #[test]
    fn section_repairs_need_a_section() {
        let mut model = model();
        assert_eq!(
            remove_property(FORK).repair(&mut model, &issue("ForkFormat", None, None)),
            Err(FixError::missing_section("ForkFormat"))
        );
        assert_eq!(
            remove_property(FORK).repair(&mut model, &issue("ForkFormat", Some("ghost"), None)),
            Err(FixError::SectionNotFound("ghost".into()))
        );
    }

    #[test]
    fn version_field_reset_follows_target() {
        let catalog = ChainCatalog::default();
        let repair = reset_version_field(&catalog);
        let mut model = ChainModel::new();
        model.global.dev_version = Some("abc".into());

        let dev = issue(ids::BUILD_NUMBER_RANGE, None, Some(GLOBAL_DEV_VERSION_KEY));
        assert_eq!(repair.repair(&mut model, &dev), Ok(true));
        assert_eq!(model.global.dev_version.as_deref(), Some("20000"));

        let bad = issue(ids::BUILD_NUMBER_RANGE, None, Some("global.recipients"));
        assert_eq!(
            repair.repair(&mut model, &bad),
            Err(FixError::unsupported("global.recipients"))
        );
        assert_eq!(
            repair.repair(&mut model, &issue(ids::BUILD_NUMBER_RANGE, None, None)),
            Err(FixError::missing_target(ids::BUILD_NUMBER_RANGE))
        );
    }

    #[test]
    fn dev_version_copies_global_version() {
        let repair = fill_dev_version(&ChainCatalog::default());
        let mut model = ChainModel::new();
        model.global.version = Some("21000".into());
        assert_eq!(repair.repair(&mut model, &issue("x", None, None)), Ok(true));
        assert_eq!(model.global.dev_version.as_deref(), Some("21000"));
        assert_eq!(repair.repair(&mut model, &issue("x", None, None)), Ok(false));
    }

    #[test]
    fn test_flag_normalizes_raw_value() {
        let mut model = ChainModel::new();
        model
            .unparsed_test_flags
            .insert("smoke".into(), "maybe".into());
        let issue = issue(ids::INTEGRATION_TESTS, None, Some("smoke"));
        assert_eq!(set_test_flag(false).repair(&mut model, &issue), Ok(true));
        assert_eq!(model.integration_tests.get("smoke"), Some(&false));
        assert!(model.unparsed_test_flags.is_empty());
        assert_eq!(set_test_flag(false).repair(&mut model, &issue), Ok(false));
    }

    #[test]
    fn defaults_cover_fixable_builtin_rules() {
        let registry = FixRegistry::default();
        assert_eq!(registry.len(), 10);
        assert!(!registry.contains(ids::REQUIRED_PROJECTS));
        assert!(registry.contains(ids::FORK_FORMAT));
        assert!(format!("{registry:?}").contains("ForkFormat"));
    }

    #[test]
    fn closures_register_directly() {
        let mut registry = FixRegistry::new();
        registry.register(
            "Custom",
            |model: &mut ChainModel, _: &ValidationIssue| -> Result<bool, FixError> {
                model.global.recipients = Some("ops@example.com".into());
                Ok(true)
            },
        );
        let mut model = ChainModel::new();
        let repaired = registry
            .get("Custom")
            .unwrap()
            .repair(&mut model, &issue("Custom", None, None));
        assert_eq!(repaired, Ok(true));
        assert!(registry.remove("Custom"));
        assert!(registry.is_empty());
    }
}
