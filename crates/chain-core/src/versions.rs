//! Build numbers embedded in global versions and section tags
//!
//! Release tags look like `<prefix>_<major>.<minor>.<build>.<patch>`; the
//! third component is the build number shared with `global.version.binary`.

use chain_model::ChainModel;
use serde::Serialize;

/// Version information of one tagged section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionVersion {
    /// Section name
    pub section: String,
    /// Tag as written
    pub tag: String,
    /// Build number parsed from the tag, if it follows the release format
    pub build: Option<u64>,
}

/// Versions found across a model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct VersionSummary {
    /// `global.version.binary`
    pub global_version: Option<String>,
    /// `global.devs.version.binary`
    pub dev_version: Option<String>,
    /// Every section with a non-blank tag, in section order
    pub sections: Vec<SectionVersion>,
}

impl VersionSummary {
    /// Distinct build numbers across the tagged sections
    #[must_use]
    pub fn builds(&self) -> Vec<u64> {
        let mut builds: Vec<u64> = self.sections.iter().filter_map(|s| s.build).collect();
        builds.sort_unstable();
        builds.dedup();
        builds
    }
}

/// Split a release tag into `(prefix, [major, minor, build, patch])`
fn split_tag(tag: &str) -> Option<(&str, [&str; 4])> {
    let (prefix, version) = tag.trim().rsplit_once('_')?;
    let mut parts = version.split('.');
    let fields = [parts.next()?, parts.next()?, parts.next()?, parts.next()?];
    if parts.next().is_some()
        || fields
            .iter()
            .any(|f| f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    Some((prefix, fields))
}

/// Build number of a release tag
#[must_use]
pub fn build_number(tag: &str) -> Option<u64> {
    split_tag(tag).and_then(|(_, fields)| fields[2].parse().ok())
}

/// Tag with its build component replaced; `None` if the tag is not a
/// release tag
#[must_use]
pub fn rebase_tag(tag: &str, build: u64) -> Option<String> {
    let (prefix, [major, minor, _, patch]) = split_tag(tag)?;
    Some(format!("{prefix}_{major}.{minor}.{build}.{patch}"))
}

/// Collect the global versions and the tag of every tagged section
#[must_use]
pub fn extract_versions(model: &ChainModel) -> VersionSummary {
    VersionSummary {
        global_version: model.global.version.clone(),
        dev_version: model.global.dev_version.clone(),
        sections: model
            .sections
            .iter()
            .filter_map(|s| {
                let tag = s.tag().map(str::trim).filter(|t| !t.is_empty())?;
                Some(SectionVersion {
                    section: s.name.clone(),
                    tag: tag.to_string(),
                    build: build_number(tag),
                })
            })
            .collect(),
    }
}

/// Set the global version to `build` and rewrite the build component of
/// every release tag
///
/// Returns the number of tags rewritten. Tags outside the release format
/// are left alone.
pub fn rebase_versions(model: &mut ChainModel, build: u64) -> usize {
    model.global.version = Some(build.to_string());
    let mut rewritten = 0;
    for section in &mut model.sections {
        let Some(tag) = section.tag().and_then(|t| rebase_tag(t, build)) else {
            continue;
        };
        if section.tag() != Some(tag.as_str()) {
            section.set_tag(tag);
            rewritten += 1;
        }
    }
    tracing::debug!(build, rewritten, "versions rebased");
    rewritten
}
