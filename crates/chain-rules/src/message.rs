//! Message templates with `{Token}` substitution
//!
//! Supported tokens: `{SectionName}`, `{PropertyName}`, `{PropertyValue}`,
//! `{AllowedValues}`. Unknown tokens are left as written.

/// Values substituted into a message template
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageArgs<'a> {
    /// `{SectionName}`
    pub section: Option<&'a str>,
    /// `{PropertyName}`
    pub property: Option<&'a str>,
    /// `{PropertyValue}`
    pub value: Option<&'a str>,
    /// `{AllowedValues}`
    pub allowed: Option<&'a str>,
}

impl<'a> MessageArgs<'a> {
    /// Arguments for a section-level message
    #[inline]
    #[must_use]
    pub fn section(section: &'a str) -> Self {
        Self {
            section: Some(section),
            ..Self::default()
        }
    }

    /// Set property name
    #[inline]
    #[must_use]
    pub fn property(mut self, property: &'a str) -> Self {
        self.property = Some(property);
        self
    }

    /// Set property value
    #[inline]
    #[must_use]
    pub fn value(mut self, value: &'a str) -> Self {
        self.value = Some(value);
        self
    }

    /// Set allowed values text
    #[inline]
    #[must_use]
    pub fn allowed(mut self, allowed: &'a str) -> Self {
        self.allowed = Some(allowed);
        self
    }
}

/// Render a template, falling back to `default` when no template is configured
#[must_use]
pub fn render(template: Option<&str>, default: &str, args: MessageArgs<'_>) -> String {
    let mut out = template.unwrap_or(default).to_string();
    let pairs = [
        ("{SectionName}", args.section),
        ("{PropertyName}", args.property),
        ("{PropertyValue}", args.value),
        ("{AllowedValues}", args.allowed),
    ];
    for (token, value) in pairs {
        if let Some(value) = value {
            if out.contains(token) {
                out = out.replace(token, value);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_all_tokens() {
        let msg = render(
            Some("{SectionName}.{PropertyName}={PropertyValue} not in [{AllowedValues}]"),
            "",
            MessageArgs::section("olap")
                .property("mode")
                .value("bin")
                .allowed("source, binary"),
        );
        assert_eq!(msg, "olap.mode=bin not in [source, binary]");
    }

    #[test]
    fn falls_back_to_default() {
        let msg = render(None, "Section '{SectionName}' is broken", MessageArgs::section("olap"));
        assert_eq!(msg, "Section 'olap' is broken");
    }

    #[test]
    fn leaves_unbound_tokens() {
        let msg = render(Some("{SectionName}: {PropertyValue}"), "", MessageArgs::section("olap"));
        assert_eq!(msg, "olap: {PropertyValue}");
    }
}
