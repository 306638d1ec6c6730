//! Per-project section of a chain file
//!
//! A [`Section`] is the block of properties sharing one key prefix
//! (`framework.mode`, `framework.branch`, ...). The typed accessors are thin
//! projections over the ordered property map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Property suffix for the build mode
pub const MODE: &str = "mode";
/// Property suffix for the developer build mode
pub const DEV_MODE: &str = "mode.devs";
/// Property suffix for the fork (`owner/repo`)
pub const FORK: &str = "fork";
/// Property suffix for the source branch
pub const BRANCH: &str = "branch";
/// Property suffix for the source tag
pub const TAG: &str = "tag";
/// Property suffix for the unit test toggle
pub const TESTS_UNIT: &str = "tests.unit";

/// Fixed order of known properties inside one section
///
/// Used by the writer to decide where a new line belongs and by
/// regeneration to emit properties. Unknown properties sort after these.
pub const PROPERTY_ORDER: [&str; 6] = [MODE, DEV_MODE, FORK, BRANCH, TAG, TESTS_UNIT];

/// Rank of a property suffix within [`PROPERTY_ORDER`]
///
/// Unknown suffixes rank after every known one.
#[inline]
#[must_use]
pub fn property_rank(suffix: &str) -> usize {
    PROPERTY_ORDER
        .iter()
        .position(|p| *p == suffix)
        .unwrap_or(PROPERTY_ORDER.len())
}

/// One project section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Section {
    /// Project name (key prefix before the first `.`)
    pub name: String,
    /// Property suffix → raw value, in first-seen order
    pub properties: IndexMap<String, String>,
}

impl Section {
    /// Create empty section
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    /// Builder-style property setter
    #[inline]
    #[must_use]
    pub fn with(mut self, suffix: &str, value: impl Into<String>) -> Self {
        self.set(suffix, value);
        self
    }

    /// Raw property value, if present
    #[inline]
    #[must_use]
    pub fn get(&self, suffix: &str) -> Option<&str> {
        self.properties.get(suffix).map(String::as_str)
    }

    /// Property value if present and not blank
    #[inline]
    #[must_use]
    pub fn get_non_blank(&self, suffix: &str) -> Option<&str> {
        self.get(suffix).filter(|v| !v.trim().is_empty())
    }

    /// Whether the property is present with a non-blank value
    #[inline]
    #[must_use]
    pub fn has(&self, suffix: &str) -> bool {
        self.get_non_blank(suffix).is_some()
    }

    /// Upsert a property
    #[inline]
    pub fn set(&mut self, suffix: &str, value: impl Into<String>) {
        self.properties.insert(suffix.to_string(), value.into());
    }

    /// Remove a property, keeping the order of the others
    #[inline]
    pub fn remove(&mut self, suffix: &str) -> Option<String> {
        self.properties.shift_remove(suffix)
    }

    /// Case-insensitive name comparison
    #[inline]
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Build mode (`source`, `binary`, `ignore`)
    #[inline]
    #[must_use]
    pub fn mode(&self) -> Option<&str> {
        self.get(MODE)
    }

    /// Set build mode
    #[inline]
    pub fn set_mode(&mut self, mode: impl Into<String>) {
        self.set(MODE, mode);
    }

    /// Developer build mode (`mode.devs`)
    #[inline]
    #[must_use]
    pub fn dev_mode(&self) -> Option<&str> {
        self.get(DEV_MODE)
    }

    /// Set developer build mode
    #[inline]
    pub fn set_dev_mode(&mut self, mode: impl Into<String>) {
        self.set(DEV_MODE, mode);
    }

    /// Source branch
    #[inline]
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.get(BRANCH)
    }

    /// Set source branch
    #[inline]
    pub fn set_branch(&mut self, branch: impl Into<String>) {
        self.set(BRANCH, branch);
    }

    /// Source tag
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.get(TAG)
    }

    /// Set source tag
    #[inline]
    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.set(TAG, tag);
    }

    /// Fork (`owner/repo`)
    #[inline]
    #[must_use]
    pub fn fork(&self) -> Option<&str> {
        self.get(FORK)
    }

    /// Set fork
    #[inline]
    pub fn set_fork(&mut self, fork: impl Into<String>) {
        self.set(FORK, fork);
    }

    /// Unit test toggle
    ///
    /// Only the literal lowercase `"true"` reads as enabled; missing or
    /// anything else reads as `false`.
    #[inline]
    #[must_use]
    pub fn tests_unit(&self) -> bool {
        self.get(TESTS_UNIT).is_some_and(|v| v.trim() == "true")
    }

    /// Set unit test toggle (serialized as `"true"`/`"false"`)
    #[inline]
    pub fn set_tests_unit(&mut self, enabled: bool) {
        self.set(TESTS_UNIT, if enabled { "true" } else { "false" });
    }

    /// Properties in writer order: known ones first, then the rest in map order
    #[must_use]
    pub fn ordered_properties(&self) -> Vec<(&str, &str)> {
        let mut props: Vec<(&str, &str)> = self
            .properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        // stable: unknown properties keep their relative order
        props.sort_by_key(|(k, _)| property_rank(k));
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_read_absent_as_none() {
        let section = Section::new("framework");
        assert_eq!(section.mode(), None);
        assert_eq!(section.branch(), None);
        assert_eq!(section.tag(), None);
        assert!(!section.tests_unit());
    }

    #[test]
    fn setters_upsert() {
        let mut section = Section::new("framework");
        section.set_branch("main");
        section.set_branch("integration");
        assert_eq!(section.branch(), Some("integration"));
        assert_eq!(section.properties.len(), 1);
    }

    #[test]
    fn tests_unit_only_accepts_lowercase_true() {
        let mut section = Section::new("olap");
        section.set(TESTS_UNIT, "TRUE");
        assert!(!section.tests_unit());
        section.set(TESTS_UNIT, "yes");
        assert!(!section.tests_unit());
        section.set_tests_unit(true);
        assert_eq!(section.get(TESTS_UNIT), Some("true"));
        assert!(section.tests_unit());
        section.set_tests_unit(false);
        assert_eq!(section.get(TESTS_UNIT), Some("false"));
    }

    #[test]
    fn blank_values_do_not_count_as_present() {
        let section = Section::new("olap").with(BRANCH, "  ");
        assert_eq!(section.branch(), Some("  "));
        assert!(!section.has(BRANCH));
    }

    #[test]
    fn ordered_properties_follow_property_order() {
        let section = Section::new("olap")
            .with("custom", "x")
            .with(TESTS_UNIT, "true")
            .with(BRANCH, "main")
            .with(MODE, "source");
        let keys: Vec<&str> = section.ordered_properties().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![MODE, BRANCH, TESTS_UNIT, "custom"]);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut section = Section::new("olap")
            .with(MODE, "source")
            .with(BRANCH, "main")
            .with(TAG, "Build_1.0.0.1");
        section.remove(BRANCH);
        let keys: Vec<&String> = section.properties.keys().collect();
        assert_eq!(keys, vec![MODE, TAG]);
    }

    #[test]
    fn name_matching_ignores_case() {
        let section = Section::new("Framework");
        assert!(section.is_named("framework"));
        assert!(!section.is_named("frame"));
    }
}
