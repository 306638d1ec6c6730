//! Request types for chain generation

use chain_model::section::{BRANCH, DEV_MODE, FORK, MODE, TAG};
use chain_model::{modes, Section};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Settings of one project in a generated chain
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    /// Project (section) name
    pub name: String,
    /// Build mode
    pub mode: Option<String>,
    /// Developer build mode
    pub dev_mode: Option<String>,
    /// Source branch
    pub branch: Option<String>,
    /// Release tag
    pub tag: Option<String>,
    /// Fork (`owner/repo`)
    pub fork: Option<String>,
    /// Unit test flag
    pub tests_unit: Option<bool>,
}

impl ProjectConfig {
    /// Create project with a build mode
    #[must_use]
    pub fn new(name: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: Some(mode.into()),
            ..Self::default()
        }
    }

    /// With branch
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// With tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// With developer build mode
    #[must_use]
    pub fn with_dev_mode(mut self, mode: impl Into<String>) -> Self {
        self.dev_mode = Some(mode.into());
        self
    }

    /// With unit test flag
    #[must_use]
    pub fn with_tests_unit(mut self, enabled: bool) -> Self {
        self.tests_unit = Some(enabled);
        self
    }

    /// Whether neither branch nor tag is set
    #[must_use]
    pub fn lacks_ref(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.branch) && blank(&self.tag)
    }

    /// Whether the project builds from source
    #[must_use]
    pub fn is_source(&self) -> bool {
        self.mode.as_deref() == Some(modes::SOURCE)
    }

    pub(crate) fn to_section(&self) -> Section {
        let mut section = Section::new(self.name.trim());
        let props = [
            (MODE, &self.mode),
            (DEV_MODE, &self.dev_mode),
            (FORK, &self.fork),
            (BRANCH, &self.branch),
            (TAG, &self.tag),
        ];
        for (suffix, value) in props {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                section.set(suffix, value);
            }
        }
        if let Some(enabled) = self.tests_unit {
            section.set_tests_unit(enabled);
        }
        section
    }
}

/// Everything needed to generate a new chain file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainGenerationRequest {
    /// `global.version.binary`
    pub global_version: Option<String>,
    /// `global.devs.version.binary`
    pub dev_version: Option<String>,
    /// `global.recipients`
    pub recipients: Option<String>,
    /// Projects, in any order
    pub projects: Vec<ProjectConfig>,
    /// Integration test flags by suite
    pub integration_tests: IndexMap<String, bool>,
    /// Branch assigned to source projects that have neither branch nor tag
    pub feature_branch: Option<String>,
}

impl ChainGenerationRequest {
    /// Create empty request
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With global binary version
    #[must_use]
    pub fn with_global_version(mut self, version: impl Into<String>) -> Self {
        self.global_version = Some(version.into());
        self
    }

    /// With a project
    #[must_use]
    pub fn with_project(mut self, project: ProjectConfig) -> Self {
        self.projects.push(project);
        self
    }

    /// With an integration test flag
    #[must_use]
    pub fn with_integration_test(mut self, suite: impl Into<String>, enabled: bool) -> Self {
        self.integration_tests.insert(suite.into(), enabled);
        self
    }

    /// With feature branch
    #[must_use]
    pub fn with_feature_branch(mut self, branch: impl Into<String>) -> Self {
        self.feature_branch = Some(branch.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_skips_blank_values() {
        let project = ProjectConfig {
            fork: Some("  ".into()),
            ..ProjectConfig::new("olap", "binary").with_tag(" Olap_1.0.2.3 ")
        };
        let section = project.to_section();
        assert_eq!(
            section.ordered_properties(),
            vec![("mode", "binary"), ("tag", "Olap_1.0.2.3")]
        );
        assert!(!project.lacks_ref());
    }

    #[test]
    fn request_decodes_from_camel_case() {
        let json = r#"{
            "globalVersion": "20512",
            "featureBranch": "feature/login",
            "projects": [{"name": "framework", "mode": "source", "testsUnit": true}],
            "integrationTests": {"smoke": true}
        }"#;
        let request: ChainGenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.projects[0].tests_unit, Some(true));
        assert!(request.projects[0].lacks_ref());
        assert!(request.projects[0].is_source());
        assert_eq!(request.integration_tests.get("smoke"), Some(&true));
    }
}
