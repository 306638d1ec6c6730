//! Line-level syntax shared by the parser and the writer

/// Global key prefix
pub(crate) const GLOBAL_PREFIX: &str = "global.";
/// Integration test flag prefix (`tests.<suite>.run`)
pub(crate) const TEST_FLAG_PREFIX: &str = "tests.";
/// Integration test flag suffix
pub(crate) const TEST_FLAG_SUFFIX: &str = ".run";

/// `key=value` line, active or commented out (`#key=value`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Assignment<'a> {
    pub(crate) key: &'a str,
    pub(crate) value: &'a str,
    pub(crate) active: bool,
}

/// Classify a line as an assignment
///
/// Active lines split on the first `=`; key and value are trimmed. A
/// commented line only counts when the text after the `#` marks still
/// forms a whitespace-free key followed by `=`.
pub(crate) fn assignment(line: &str) -> Option<Assignment<'_>> {
    let trimmed = line.trim();
    let (body, active) = match trimmed.strip_prefix('#') {
        Some(rest) => (rest.trim_start_matches('#').trim_start(), false),
        None => (trimmed, true),
    };
    let (key, value) = body.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || (!active && key.contains(char::is_whitespace)) {
        return None;
    }
    Some(Assignment {
        key,
        value: value.trim(),
        active,
    })
}

/// Comment line that is not a commented-out assignment
pub(crate) fn is_plain_comment(line: &str) -> bool {
    line.trim_start().starts_with('#') && assignment(line).is_none()
}

/// Whether the line is empty or whitespace
#[inline]
pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Leading whitespace of a line
pub(crate) fn indent(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// What a key addresses in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyRoute<'a> {
    /// `global.*`
    Global(&'a str),
    /// `tests.<suite>.run`
    TestFlag(&'a str),
    /// `<section>.<suffix>`
    Property { section: &'a str, suffix: &'a str },
    /// No dot, or an empty segment
    Unrouted,
}

pub(crate) fn route(key: &str) -> KeyRoute<'_> {
    if key.starts_with(GLOBAL_PREFIX) {
        return KeyRoute::Global(key);
    }
    if let Some(suite) = key
        .strip_prefix(TEST_FLAG_PREFIX)
        .and_then(|rest| rest.strip_suffix(TEST_FLAG_SUFFIX))
        .filter(|suite| !suite.is_empty())
    {
        return KeyRoute::TestFlag(suite);
    }
    match key.split_once('.') {
        Some((section, suffix)) if !section.is_empty() && !suffix.is_empty() => {
            KeyRoute::Property { section, suffix }
        }
        _ => KeyRoute::Unrouted,
    }
}

/// Integration test flag key for a suite
pub(crate) fn test_flag_key(suite: &str) -> String {
    format!("{TEST_FLAG_PREFIX}{suite}{TEST_FLAG_SUFFIX}")
}

/// Case-insensitive `true`/`false` literal
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
