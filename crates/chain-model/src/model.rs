//! Chain model root aggregate

use crate::section::Section;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Global key for the binary build version
pub const GLOBAL_VERSION_KEY: &str = "global.version.binary";
/// Global key for the developer binary build version
pub const GLOBAL_DEV_VERSION_KEY: &str = "global.devs.version.binary";
/// Global key for notification recipients
pub const GLOBAL_RECIPIENTS_KEY: &str = "global.recipients";

/// File-level settings (`global.*` keys)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalSection {
    /// `global.version.binary`
    pub version: Option<String>,
    /// `global.devs.version.binary`
    pub dev_version: Option<String>,
    /// `global.recipients`
    pub recipients: Option<String>,
}

impl GlobalSection {
    /// Set a field from its full key; returns false for unrecognized keys
    pub fn set_by_key(&mut self, key: &str, value: impl Into<String>) -> bool {
        let slot = match key {
            GLOBAL_VERSION_KEY => &mut self.version,
            GLOBAL_DEV_VERSION_KEY => &mut self.dev_version,
            GLOBAL_RECIPIENTS_KEY => &mut self.recipients,
            _ => return false,
        };
        *slot = Some(value.into());
        true
    }

    /// The three global properties as `(key, value)` pairs, in file order
    #[must_use]
    pub fn entries(&self) -> [(&'static str, Option<&str>); 3] {
        [
            (GLOBAL_VERSION_KEY, self.version.as_deref()),
            (GLOBAL_DEV_VERSION_KEY, self.dev_version.as_deref()),
            (GLOBAL_RECIPIENTS_KEY, self.recipients.as_deref()),
        ]
    }

    /// Binary version if present and not blank
    #[inline]
    #[must_use]
    pub fn version_non_blank(&self) -> Option<&str> {
        non_blank(self.version.as_deref())
    }

    /// Developer binary version if present and not blank
    #[inline]
    #[must_use]
    pub fn dev_version_non_blank(&self) -> Option<&str> {
        non_blank(self.dev_version.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Whole chain file
///
/// Produced by the parser (with `raw_content`) or built directly by callers
/// (without it, which makes the writer regenerate the file from scratch).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChainModel {
    /// Global settings
    pub global: GlobalSection,
    /// Project sections in file (or canonical) order
    pub sections: Vec<Section>,
    /// Integration test suite → enabled
    pub integration_tests: IndexMap<String, bool>,
    /// Integration test flags whose value was not a boolean literal, kept verbatim
    pub unparsed_test_flags: IndexMap<String, String>,
    /// Original file text, when parsed from disk
    #[serde(skip)]
    pub raw_content: Option<String>,
}

impl ChainModel {
    /// Create empty model with no raw content
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First section with the given name (case-insensitive)
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.is_named(name))
    }

    /// Mutable first section with the given name (case-insensitive)
    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.is_named(name))
    }

    /// Whether a section with this name exists
    #[inline]
    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Get existing section or append an empty one
    pub fn section_or_insert(&mut self, name: &str) -> &mut Section {
        let idx = match self.sections.iter().position(|s| s.is_named(name)) {
            Some(idx) => idx,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx]
    }

    /// Append a section
    #[inline]
    pub fn push_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Section names in current order
    #[must_use]
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    /// Whether any section uses the given build mode
    #[must_use]
    pub fn any_mode(&self, mode: &str) -> bool {
        self.sections.iter().any(|s| s.mode() == Some(mode))
    }

    /// Whether any section uses the given developer build mode
    #[must_use]
    pub fn any_dev_mode(&self, mode: &str) -> bool {
        self.sections.iter().any(|s| s.dev_mode() == Some(mode))
    }

    /// Set an integration test flag, clearing any unparsed value for the suite
    pub fn set_integration_test(&mut self, suite: &str, enabled: bool) {
        self.unparsed_test_flags.shift_remove(suite);
        self.integration_tests.insert(suite.to_string(), enabled);
    }

    /// Whether the model was parsed from existing text
    #[inline]
    #[must_use]
    pub fn has_raw_content(&self) -> bool {
        self.raw_content.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_set_by_key_only_accepts_known_keys() {
        let mut global = GlobalSection::default();
        assert!(global.set_by_key(GLOBAL_VERSION_KEY, "20512"));
        assert!(global.set_by_key(GLOBAL_RECIPIENTS_KEY, "team@example.com"));
        assert!(!global.set_by_key("global.unknown", "x"));
        assert_eq!(global.version.as_deref(), Some("20512"));
        assert_eq!(global.dev_version, None);
    }

    #[test]
    fn blank_global_version_is_absent() {
        let global = GlobalSection {
            version: Some("   ".to_string()),
            ..GlobalSection::default()
        };
        assert_eq!(global.version_non_blank(), None);
    }

    #[test]
    fn section_lookup_is_case_insensitive_first_match() {
        let mut model = ChainModel::new();
        model.push_section(Section::new("Framework").with("mode", "source"));
        model.push_section(Section::new("framework").with("mode", "binary"));
        assert_eq!(model.section("FRAMEWORK").and_then(Section::mode), Some("source"));
    }

    #[test]
    fn section_or_insert_reuses_existing() {
        let mut model = ChainModel::new();
        model.section_or_insert("olap").set_mode("source");
        model.section_or_insert("OLAP").set_branch("main");
        assert_eq!(model.sections.len(), 1);
        assert_eq!(model.section("olap").and_then(Section::branch), Some("main"));
    }

    #[test]
    fn setting_integration_test_clears_unparsed_value() {
        let mut model = ChainModel::new();
        model
            .unparsed_test_flags
            .insert("smoke".to_string(), "maybe".to_string());
        model.set_integration_test("smoke", true);
        assert!(model.unparsed_test_flags.is_empty());
        assert_eq!(model.integration_tests.get("smoke"), Some(&true));
    }

    #[test]
    fn raw_content_is_not_serialized() {
        let model = ChainModel {
            raw_content: Some("a.mode=source".to_string()),
            ..ChainModel::default()
        };
        let json = serde_json::to_string(&model).unwrap();
        assert!(!json.contains("raw_content"));
    }
}
