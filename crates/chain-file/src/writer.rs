//! Chain file writer
//!
//! Two modes, picked by whether the model carries `raw_content`:
//!
//! - **Structure-preserving**: the original lines are kept and edited in
//!   place. Existing `key=value` or `#key=value` lines are overwritten,
//!   missing properties are inserted at their rank within the section, new
//!   sections are slotted by canonical order and properties that left the
//!   model are commented out. Lines whose value did not change stay
//!   byte-identical, and the original newline style is kept.
//! - **Regeneration**: header, globals, canonical sections, other sections
//!   and integration test flags, each block separated by a blank line.

use crate::error::WriteError;
use crate::line::{
    assignment, indent, is_blank, is_plain_comment, route, test_flag_key, KeyRoute,
};
use chain_model::section::{property_rank, DEV_MODE, MODE};
use chain_model::{modes, CanonicalOrder, ChainModel, Section};
use std::path::Path;

/// First line of a regenerated file
pub const HEADER: &str = "# Build chain configuration";

/// Serializes models back to text
#[derive(Debug, Clone)]
pub struct ChainWriter {
    order: CanonicalOrder,
    timestamp: bool,
}

impl ChainWriter {
    /// Writer with the default canonical order
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: CanonicalOrder::default(),
            timestamp: true,
        }
    }

    /// Use a custom canonical order for slotting and regeneration
    #[must_use]
    pub fn with_order(mut self, order: CanonicalOrder) -> Self {
        self.order = order;
        self
    }

    /// Leave the generation timestamp out of regenerated headers
    #[must_use]
    pub fn without_timestamp(mut self) -> Self {
        self.timestamp = false;
        self
    }

    /// Render model to text using the mode it calls for
    #[must_use]
    pub fn render(&self, model: &ChainModel) -> String {
        match model.raw_content.as_deref() {
            Some(raw) => self.render_preserving(raw, model),
            None => self.render_fresh(model),
        }
    }

    /// Write model to path, overwriting the file
    ///
    /// # Errors
    /// Returns `WriteError::Io` if the file cannot be written
    pub fn write(&self, path: impl AsRef<Path>, model: &ChainModel) -> Result<(), WriteError> {
        let path = path.as_ref();
        let text = self.render(model);
        std::fs::write(path, text).map_err(|e| WriteError::io_error(path, e))?;
        tracing::info!(
            path = %path.display(),
            mode = if model.has_raw_content() { "preserving" } else { "regenerated" },
            "chain file written"
        );
        Ok(())
    }

    /// Apply the model onto the original text
    #[must_use]
    pub fn render_preserving(&self, raw: &str, model: &ChainModel) -> String {
        let newline = if raw.contains("\r\n") { "\r\n" } else { "\n" };
        let trailing = raw.is_empty() || raw.ends_with('\n');
        let mut doc = Document::new(raw, &self.order);

        for (key, value) in model.global.entries() {
            if let Some(value) = non_blank(value) {
                doc.upsert_global(key, value);
            }
        }

        for section in &model.sections {
            if doc.has_section(&section.name) {
                for (suffix, value) in section.ordered_properties() {
                    if let Some(value) = non_blank(Some(value)) {
                        doc.upsert_property(&section.name, suffix, value);
                    }
                }
            } else {
                doc.insert_section(section);
            }
        }

        for (suite, enabled) in &model.integration_tests {
            doc.upsert_test_flag(suite, if *enabled { "true" } else { "false" });
        }
        for (suite, raw_value) in &model.unparsed_test_flags {
            if let Some(value) = non_blank(Some(raw_value)) {
                doc.upsert_test_flag(suite, value);
            }
        }

        doc.comment_out_removed(model);
        doc.finish(newline, trailing)
    }

    /// Generate a complete file from the model alone
    #[must_use]
    pub fn render_fresh(&self, model: &ChainModel) -> String {
        let mut blocks: Vec<Vec<String>> = Vec::new();

        let mut header = vec![HEADER.to_string()];
        if self.timestamp {
            header.push(format!(
                "# Generated {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        blocks.push(header);

        let globals: Vec<String> = model
            .global
            .entries()
            .into_iter()
            .filter_map(|(key, value)| non_blank(value).map(|v| format!("{key}={v}")))
            .collect();
        blocks.push(globals);

        for name in self.order.iter() {
            for section in model.sections.iter().filter(|s| s.is_named(name)) {
                blocks.push(section_block(section, true));
            }
        }
        for section in model.sections.iter().filter(|s| !self.order.contains(&s.name)) {
            blocks.push(section_block(section, false));
        }

        let mut flags: Vec<String> = model
            .integration_tests
            .iter()
            .map(|(suite, enabled)| format!("{}={enabled}", test_flag_key(suite)))
            .collect();
        flags.extend(
            model
                .unparsed_test_flags
                .iter()
                .filter_map(|(suite, v)| non_blank(Some(v)).map(|v| format!("{}={v}", test_flag_key(suite)))),
        );
        blocks.push(flags);

        let mut out = blocks
            .into_iter()
            .filter(|b| !b.is_empty())
            .map(|b| b.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n");
        out.push('\n');
        out
    }
}

impl Default for ChainWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Properties of one section in writer order
///
/// Canonical sections get a commented `mode.devs` placeholder when the
/// property is absent.
fn section_block(section: &Section, placeholder: bool) -> Vec<String> {
    let mut lines: Vec<String> = section
        .ordered_properties()
        .into_iter()
        .filter_map(|(suffix, value)| {
            non_blank(Some(value)).map(|v| format!("{}.{suffix}={v}", section.name))
        })
        .collect();
    if placeholder && !section.has(DEV_MODE) {
        let at = usize::from(section.has(MODE));
        lines.insert(at, format!("#{}.{DEV_MODE}={}", section.name, modes::BINARY));
    }
    lines
}

/// Original text as editable lines
struct Document<'o> {
    lines: Vec<String>,
    order: &'o CanonicalOrder,
}

impl<'o> Document<'o> {
    fn new(raw: &str, order: &'o CanonicalOrder) -> Self {
        Self {
            lines: raw.lines().map(String::from).collect(),
            order,
        }
    }

    fn finish(self, newline: &str, trailing: bool) -> String {
        let mut out = self.lines.join(newline);
        if trailing && !self.lines.is_empty() {
            out.push_str(newline);
        }
        out
    }

    /// Line holding the key: last active one, else last commented one
    fn find(&self, key: &str) -> Option<usize> {
        let mut active = None;
        let mut commented = None;
        for (idx, line) in self.lines.iter().enumerate() {
            if let Some(a) = assignment(line).filter(|a| a.key.eq_ignore_ascii_case(key)) {
                if a.active {
                    active = Some(idx);
                } else {
                    commented = Some(idx);
                }
            }
        }
        active.or(commented)
    }

    /// Overwrite the value on an existing line, re-enabling it if commented
    fn assign(&mut self, idx: usize, value: &str) {
        let replacement = match assignment(&self.lines[idx]) {
            Some(a) if a.active && a.value == value => return,
            Some(a) => format!("{}{}={value}", indent(&self.lines[idx]), a.key),
            None => return,
        };
        self.lines[idx] = replacement;
    }

    /// Lines (active or commented) of one section with their property rank
    fn section_lines(&self, name: &str) -> Vec<(usize, usize)> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| match route(assignment(line)?.key) {
                KeyRoute::Property { section, suffix } if section.eq_ignore_ascii_case(name) => {
                    Some((idx, property_rank(suffix)))
                }
                _ => None,
            })
            .collect()
    }

    fn has_section(&self, name: &str) -> bool {
        !self.section_lines(name).is_empty()
    }

    fn last_line_where(&self, pred: impl Fn(KeyRoute<'_>) -> bool) -> Option<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| assignment(line).is_some_and(|a| pred(route(a.key))))
            .map(|(idx, _)| idx)
            .last()
    }

    fn first_line_where(&self, pred: impl Fn(KeyRoute<'_>) -> bool) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| assignment(line).is_some_and(|a| pred(route(a.key))))
    }

    /// Start of the comment block directly above a line
    fn comment_head(&self, mut idx: usize) -> usize {
        while idx > 0 && is_plain_comment(&self.lines[idx - 1]) {
            idx -= 1;
        }
        idx
    }

    /// Insert lines at a position, keeping a blank line on either side
    fn insert_block(&mut self, at: usize, block: Vec<String>) {
        let mut insert = Vec::with_capacity(block.len() + 2);
        if at > 0 && !is_blank(&self.lines[at - 1]) {
            insert.push(String::new());
        }
        insert.extend(block);
        if at < self.lines.len() && !is_blank(&self.lines[at]) {
            insert.push(String::new());
        }
        self.lines.splice(at..at, insert);
    }

    fn upsert_global(&mut self, key: &str, value: &str) {
        if let Some(idx) = self.find(key) {
            self.assign(idx, value);
            return;
        }
        let line = format!("{key}={value}");
        match self.last_line_where(|r| matches!(r, KeyRoute::Global(_))) {
            Some(idx) => self.lines.insert(idx + 1, line),
            None => {
                // after the leading comment block
                let at = self
                    .lines
                    .iter()
                    .position(|l| !is_plain_comment(l))
                    .unwrap_or(self.lines.len());
                self.insert_block(at, vec![line]);
            }
        }
    }

    fn upsert_property(&mut self, section: &str, suffix: &str, value: &str) {
        let key = format!("{section}.{suffix}");
        if let Some(idx) = self.find(&key) {
            self.assign(idx, value);
            return;
        }
        let rank = property_rank(suffix);
        let lines = self.section_lines(section);
        let at = lines
            .iter()
            .find(|(_, r)| *r > rank)
            .map(|(idx, _)| *idx)
            .or_else(|| lines.last().map(|(idx, _)| idx + 1))
            .unwrap_or(self.lines.len());
        self.lines.insert(at, format!("{key}={value}"));
    }

    fn insert_section(&mut self, section: &Section) {
        let block = section_block(section, false);
        if block.is_empty() {
            return;
        }
        let at = self.section_slot(&section.name);
        tracing::debug!(section = %section.name, line = at, "inserting new section");
        self.insert_block(at, block);
    }

    /// Where a section with no lines yet belongs
    ///
    /// Canonical sections go before the next canonical section present
    /// (above its comment block), else after the previous one. Other
    /// sections go after the last section line, else before the test flags.
    fn section_slot(&self, name: &str) -> usize {
        if let Some(pos) = self.order.position(name) {
            let projects: Vec<&str> = self.order.iter().collect();
            for next in &projects[pos + 1..] {
                if let Some((first, _)) = self.section_lines(next).first() {
                    return self.comment_head(*first);
                }
            }
            for prev in projects[..pos].iter().rev() {
                if let Some((last, _)) = self.section_lines(prev).last() {
                    return last + 1;
                }
            }
        }
        self.last_line_where(|r| matches!(r, KeyRoute::Property { .. }))
            .map(|idx| idx + 1)
            .or_else(|| {
                self.first_line_where(|r| matches!(r, KeyRoute::TestFlag(_)))
                    .map(|idx| self.comment_head(idx))
            })
            .unwrap_or(self.lines.len())
    }

    fn upsert_test_flag(&mut self, suite: &str, value: &str) {
        let key = test_flag_key(suite);
        if let Some(idx) = self.find(&key) {
            self.assign(idx, value);
            return;
        }
        let line = format!("{key}={value}");
        match self.last_line_where(|r| matches!(r, KeyRoute::TestFlag(_))) {
            Some(idx) => self.lines.insert(idx + 1, line),
            None => {
                let at = self.lines.len();
                self.insert_block(at, vec![line]);
            }
        }
    }

    /// Comment out active lines whose key is no longer in the model
    ///
    /// Blank values still count as present. Keys the model cannot represent
    /// (unknown globals, keys without a section) are left alone.
    fn comment_out_removed(&mut self, model: &ChainModel) {
        for idx in 0..self.lines.len() {
            let keep = match assignment(&self.lines[idx]) {
                Some(a) if a.active => match route(a.key) {
                    KeyRoute::Global(key) => model
                        .global
                        .entries()
                        .iter()
                        .find(|(k, _)| *k == key)
                        .map_or(true, |(_, v)| v.is_some()),
                    KeyRoute::TestFlag(suite) => model
                        .integration_tests
                        .keys()
                        .chain(model.unparsed_test_flags.keys())
                        .any(|s| s.eq_ignore_ascii_case(suite)),
                    KeyRoute::Property { section, suffix } => model
                        .section(section)
                        .is_some_and(|s| s.get(suffix).is_some()),
                    KeyRoute::Unrouted => true,
                },
                _ => true,
            };
            if !keep {
                let line = &self.lines[idx];
                let commented = format!("{}#{}", indent(line), line.trim_start());
                tracing::debug!(line = %line, "commenting out removed property");
                self.lines[idx] = commented;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ChainParser;
    use chain_model::section::{BRANCH, TAG};
    use chain_test_utils::{assignment_lines, EXAMPLE_SCENARIO, SAMPLE_CHAIN};
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> ChainModel {
        ChainParser::new().parse_str(text)
    }

    fn render(model: &ChainModel) -> String {
        ChainWriter::new().without_timestamp().render(model)
    }

    #[test]
    fn unchanged_model_round_trips_byte_identical() {
        for text in [SAMPLE_CHAIN, EXAMPLE_SCENARIO, "a.mode = source \r\n# c\r\n", ""] {
            assert_eq!(render(&parse(text)), text);
        }
    }

    #[test]
    fn overwrites_value_in_place() {
        let mut model = parse("# top\nolap.mode=source\nolap.branch=main\n# tail\n");
        model.section_mut("olap").unwrap().set_branch("integration");
        assert_eq!(
            render(&model),
            "# top\nolap.mode=source\nolap.branch=integration\n# tail\n"
        );
    }

    #[test]
    fn re_enables_commented_property() {
        let mut model = parse("olap.mode=binary\n#olap.mode.devs=binary\nolap.tag=T_1.0.2.3\n");
        model.section_mut("olap").unwrap().set_dev_mode("ignore");
        assert_eq!(
            render(&model),
            "olap.mode=binary\nolap.mode.devs=ignore\nolap.tag=T_1.0.2.3\n"
        );
    }

    #[test]
    fn inserts_property_at_its_rank() {
        let mut model = parse("olap.mode=source\nolap.tests.unit=true\nframework.mode=source\n");
        model.section_mut("olap").unwrap().set_branch("main");
        model.section_mut("framework").unwrap().set_branch("dev");
        assert_eq!(
            render(&model),
            "olap.mode=source\nolap.branch=main\nolap.tests.unit=true\nframework.mode=source\nframework.branch=dev\n"
        );
    }

    #[test]
    fn removed_property_is_commented_out() {
        let mut model = parse("app.mode=binary\napp.branch=main\napp.tag=Build_1.0.0.1\n");
        model.section_mut("app").unwrap().remove(TAG);
        assert_eq!(
            render(&model),
            "app.mode=binary\napp.branch=main\n#app.tag=Build_1.0.0.1\n"
        );
    }

    #[test]
    fn swapping_tag_for_branch() {
        let mut model = parse("app.mode=binary\napp.tag=Build_1.0.0.1\n");
        let app = model.section_mut("app").unwrap();
        app.remove(TAG);
        app.set(BRANCH, "integration");
        assert_eq!(
            render(&model),
            "app.mode=binary\napp.branch=integration\n#app.tag=Build_1.0.0.1\n"
        );
    }

    #[test]
    fn new_section_slots_before_next_canonical_section() {
        let text = "global.version.binary=20000\n\n# framework\nframework.mode=source\n\n# content\ncontent.mode=source\n";
        let mut model = parse(text);
        model.push_section(Section::new("olap").with("branch", "main").with("mode", "source"));
        assert_eq!(
            render(&model),
            "global.version.binary=20000\n\n# framework\nframework.mode=source\n\nolap.mode=source\nolap.branch=main\n\n# content\ncontent.mode=source\n"
        );
    }

    #[test]
    fn new_section_after_previous_canonical_when_last() {
        let text = "framework.mode=source\n\ntests.smoke.run=true\n";
        let mut model = parse(text);
        model.push_section(Section::new("tests").with("mode", "source"));
        assert_eq!(
            render(&model),
            "framework.mode=source\n\ntests.mode=source\n\ntests.smoke.run=true\n"
        );
    }

    #[test]
    fn new_extra_section_goes_after_last_section_line() {
        let mut model = parse("framework.mode=source\ntests.api.run=false\n");
        model.push_section(Section::new("custom").with("mode", "ignore"));
        assert_eq!(
            render(&model),
            "framework.mode=source\n\ncustom.mode=ignore\n\ntests.api.run=false\n"
        );
    }

    #[test]
    fn globals_are_inserted_after_header_comments() {
        let mut model = parse("# header\nframework.mode=binary\n");
        model.global.version = Some("20000".to_string());
        model.global.dev_version = Some("20000".to_string());
        assert_eq!(
            render(&model),
            "# header\n\nglobal.version.binary=20000\nglobal.devs.version.binary=20000\n\nframework.mode=binary\n"
        );
    }

    #[test]
    fn test_flags_update_and_append() {
        let mut model = parse("olap.mode=source\n\ntests.smoke.run=maybe\n");
        model.set_integration_test("smoke", false);
        model.set_integration_test("api", true);
        assert_eq!(
            render(&model),
            "olap.mode=source\n\ntests.smoke.run=false\ntests.api.run=true\n"
        );

        let mut model = parse("olap.mode=source\n");
        model.set_integration_test("ui", true);
        assert_eq!(render(&model), "olap.mode=source\n\ntests.ui.run=true\n");
    }

    #[test]
    fn blank_values_are_never_written() {
        let mut model = parse("olap.mode=source\n");
        model.section_mut("olap").unwrap().set_branch("  ");
        assert_eq!(render(&model), "olap.mode=source\n");
    }

    #[test]
    fn keeps_crlf_and_missing_trailing_newline() {
        let mut model = parse("olap.mode=source\r\nolap.branch=main");
        model.section_mut("olap").unwrap().set_branch("dev");
        assert_eq!(render(&model), "olap.mode=source\r\nolap.branch=dev");
    }

    #[test]
    fn regeneration_layout() {
        let mut model = ChainModel::new();
        model.global.version = Some("20000".to_string());
        model.push_section(Section::new("custom").with("mode", "ignore"));
        model.push_section(Section::new("olap").with("branch", "main").with("mode", "source"));
        model.push_section(
            Section::new("framework")
                .with("mode", "binary")
                .with("mode.devs", "binary"),
        );
        model.set_integration_test("smoke", true);

        assert_eq!(
            render(&model),
            "# Build chain configuration\n\nglobal.version.binary=20000\n\nframework.mode=binary\nframework.mode.devs=binary\n\nolap.mode=source\n#olap.mode.devs=binary\nolap.branch=main\n\ncustom.mode=ignore\n\ntests.smoke.run=true\n"
        );
    }

    #[test]
    fn regeneration_header_has_timestamp_by_default() {
        let text = ChainWriter::new().render(&ChainModel::new());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("# Generated "));
    }

    #[test]
    fn regenerated_text_parses_back() {
        let mut model = parse(SAMPLE_CHAIN);
        model.raw_content = None;
        let text = render(&model);
        let reparsed = parse(&text);
        assert_eq!(reparsed.sections, model.sections);
        assert_eq!(reparsed.global, model.global);
        assert_eq!(reparsed.integration_tests, model.integration_tests);
        assert_eq!(assignment_lines(&text), assignment_lines(SAMPLE_CHAIN));
    }
}
