//! Chain file parser
//!
//! Turns text into a [`ChainModel`], keeping the text itself as
//! `raw_content` for the structure-preserving writer. Parsing never
//! validates: odd values are kept as written and reported later by rules.

use crate::error::ParseError;
use crate::line::{assignment, parse_bool, route, KeyRoute};
use chain_model::{ChainModel, Section};
use indexmap::IndexMap;
use std::path::Path;

/// Parser for `key=value` chain files
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainParser;

impl ChainParser {
    /// Create parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse file at path
    ///
    /// # Errors
    /// - `ParseError::NotFound` if the path does not exist
    /// - `ParseError::Io` if the file cannot be read
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ChainModel, ParseError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ParseError::not_found(path));
        }
        let text = std::fs::read_to_string(path).map_err(|e| ParseError::io_error(path, e))?;
        Ok(self.parse_str(&text))
    }

    /// Parse text
    ///
    /// - Blank lines and `#` comments are skipped
    /// - Each line splits on its first `=`; key and value are trimmed
    /// - A repeated key keeps its first position and its last value
    /// - Sections appear in first-appearance order; prefixes differing only
    ///   in case merge into the first-seen spelling
    #[must_use]
    pub fn parse_str(&self, text: &str) -> ChainModel {
        let mut flat: IndexMap<&str, &str> = IndexMap::new();
        for line in text.lines() {
            match assignment(line) {
                Some(a) if a.active => {
                    if let Some(previous) = flat.insert(a.key, a.value) {
                        tracing::warn!(key = a.key, previous, "duplicate key, last value wins");
                    }
                }
                Some(_) => {}
                None => {
                    if !line.trim().is_empty() && !line.trim_start().starts_with('#') {
                        tracing::debug!(line, "skipping line without '='");
                    }
                }
            }
        }

        let mut model = ChainModel::new();
        let mut sections: IndexMap<String, Section> = IndexMap::new();
        for (key, value) in flat {
            match route(key) {
                KeyRoute::Global(key) => {
                    if !model.global.set_by_key(key, value) {
                        tracing::debug!(key, "ignoring unknown global key");
                    }
                }
                KeyRoute::TestFlag(suite) => match parse_bool(value) {
                    Some(enabled) => {
                        model.integration_tests.insert(suite.to_string(), enabled);
                    }
                    None => {
                        model
                            .unparsed_test_flags
                            .insert(suite.to_string(), value.to_string());
                    }
                },
                KeyRoute::Property { section, suffix } => {
                    sections
                        .entry(section.to_ascii_lowercase())
                        .or_insert_with(|| Section::new(section))
                        .set(suffix, value);
                }
                KeyRoute::Unrouted => tracing::debug!(key, "ignoring key without section"),
            }
        }

        model.sections = sections.into_values().collect();
        model.raw_content = Some(text.to_string());
        tracing::debug!(
            sections = model.sections.len(),
            integration_tests = model.integration_tests.len(),
            "chain text parsed"
        );
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_test_utils::{ChainFixture, EXAMPLE_SCENARIO, SAMPLE_CHAIN};
    use proptest::prelude::*;

    fn parse(text: &str) -> ChainModel {
        ChainParser::new().parse_str(text)
    }

    #[test]
    fn example_scenario() {
        let model = parse(EXAMPLE_SCENARIO);
        assert_eq!(model.section_names(), vec!["framework", "app"]);
        assert_eq!(model.section("framework").and_then(Section::branch), Some("main"));
        assert_eq!(model.section("app").and_then(Section::tag), Some("Build_1.0.0.1"));
        assert_eq!(model.raw_content.as_deref(), Some(EXAMPLE_SCENARIO));
    }

    #[test]
    fn sample_chain_layout() {
        let model = parse(SAMPLE_CHAIN);
        assert_eq!(model.sections.len(), 15);
        assert_eq!(model.global.version.as_deref(), Some("20512"));
        assert_eq!(model.global.recipients.as_deref(), Some("build-team@example.com"));
        assert_eq!(model.integration_tests.get("smoke"), Some(&true));
        assert_eq!(model.integration_tests.get("regression"), Some(&false));
        // commented placeholder is not a value
        assert_eq!(model.section("repository").and_then(Section::dev_mode), None);
        // the tests section keeps its own properties apart from suite flags
        assert_eq!(model.section("tests").and_then(Section::mode), Some("source"));
    }

    #[test]
    fn last_duplicate_wins() {
        let model = parse("olap.mode=source\nolap.mode=binary\n");
        assert_eq!(model.section("olap").and_then(Section::mode), Some("binary"));
    }

    #[test]
    fn case_variants_merge_into_first_spelling() {
        let model = parse("Olap.mode=source\nframework.mode=source\nolap.branch=main\n");
        assert_eq!(model.section_names(), vec!["Olap", "framework"]);
        assert_eq!(model.section("olap").and_then(Section::branch), Some("main"));
    }

    #[test]
    fn splits_on_first_equals_and_trims() {
        let model = parse("  global.recipients =  a@x.com=b@x.com  \n");
        assert_eq!(model.global.recipients.as_deref(), Some("a@x.com=b@x.com"));
    }

    #[test]
    fn key_with_inner_space_is_kept() {
        let model = parse("olap.mode=source\nolap.build args=x\n");
        let olap = model.section("olap").unwrap();
        assert_eq!(olap.get("build args"), Some("x"));
        assert_eq!(olap.mode(), Some("source"));
    }

    #[test]
    fn non_boolean_test_flags_are_kept_aside() {
        let model = parse("tests.smoke.run=maybe\ntests.api.run=TRUE\n");
        assert_eq!(model.integration_tests.get("api"), Some(&true));
        assert!(!model.integration_tests.contains_key("smoke"));
        assert_eq!(model.unparsed_test_flags.get("smoke").map(String::as_str), Some("maybe"));
    }

    #[test]
    fn skips_comments_blanks_and_garbage() {
        let model = parse("# header\n\n   \nnot an assignment\norphan=1\n#olap.mode=source\n");
        assert!(model.sections.is_empty());
    }

    #[test]
    fn unknown_properties_pass_through() {
        let model = parse("olap.build.args=-j4\n");
        assert_eq!(model.section("olap").and_then(|s| s.get("build.args")), Some("-j4"));
    }

    #[test]
    fn crlf_input() {
        let model = parse("olap.mode=source\r\nolap.branch=main\r\n");
        assert_eq!(model.section("olap").and_then(Section::branch), Some("main"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let fixture = ChainFixture::new("");
        let err = ChainParser::new().parse_file(fixture.missing_path()).unwrap_err();
        assert!(matches!(err, ParseError::NotFound { .. }));
    }

    #[test]
    fn parses_file_from_disk() {
        let fixture = ChainFixture::new(EXAMPLE_SCENARIO);
        let model = ChainParser::new().parse_file(fixture.path()).unwrap();
        assert_eq!(model.sections.len(), 2);
        assert!(model.has_raw_content());
    }

    proptest! {
        #[test]
        fn sections_follow_first_appearance(names in proptest::collection::vec("p[a-z]{0,6}", 1..8)) {
            let text: String = names.iter().map(|n| format!("{n}.mode=source\n")).collect();
            let model = parse(&text);

            let mut expected: Vec<&str> = Vec::new();
            for name in &names {
                if !expected.contains(&name.as_str()) {
                    expected.push(name);
                }
            }
            prop_assert_eq!(model.section_names(), expected);
        }
    }
}
