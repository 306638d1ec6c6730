//! Testing utilities for the chain workspace
//!
//! Shared chain texts, model builders and on-disk fixtures.

#![allow(missing_docs)]

use chain_model::{ChainModel, Section, DEFAULT_PROJECT_ORDER};
use std::path::PathBuf;
use tempfile::TempDir;

/// Two-section file used throughout the docs
pub const EXAMPLE_SCENARIO: &str =
    "framework.mode=source\nframework.branch=main\napp.mode=binary\napp.tag=Build_1.0.0.1";

/// Complete chain file that passes every built-in rule
pub const SAMPLE_CHAIN: &str = "\
# Release chain 2.5
# maintained by the build team

global.version.binary=20512
global.devs.version.binary=20512
global.recipients=build-team@example.com

framework.mode=source
framework.mode.devs=binary
framework.branch=integration
framework.tests.unit=true

repository.mode=binary
#repository.mode.devs=binary
repository.tag=Repository_2.5.20512.1

olap.mode=source
olap.mode.devs=binary
olap.fork=alice/olap
olap.branch=feature/cube-cache
olap.tests.unit=true

modeling.mode=binary
modeling.tag=Modeling_2.5.20512.3

depmservice.mode=ignore
depmservice.branch=integration

consolidation.mode=binary
consolidation.tag=Consolidation_2.5.20512.1

appengine.mode=source
appengine.branch=integration
appengine.tests.unit=false

designer.mode=source
designer.mode.devs=ignore
designer.branch=integration

dashboards.mode=binary
dashboards.tag=Dashboards_2.5.20512.2

appstudio.mode=source
appstudio.branch=integration

officeinteg.mode=binary
officeinteg.tag=OfficeInteg_2.5.20512.1

administration.mode=source
administration.branch=integration

content.mode=source
content.branch=integration
content.tests.unit=false

deployment.mode=ignore
deployment.mode.devs=ignore
deployment.branch=integration

tests.mode=source
tests.mode.devs=ignore
tests.branch=integration

tests.smoke.run=true
tests.regression.run=false
";

/// Section with mode and branch
pub fn source_section(name: &str, branch: &str) -> Section {
    Section::new(name).with("mode", "source").with("branch", branch)
}

/// Section with binary mode and a tag
pub fn binary_section(name: &str, tag: &str) -> Section {
    Section::new(name).with("mode", "binary").with("tag", tag)
}

/// Model with empty sections, in the given order
pub fn model_with_sections(names: &[&str]) -> ChainModel {
    let mut model = ChainModel::new();
    for name in names {
        model.push_section(Section::new(*name));
    }
    model
}

/// Model with every canonical project on `integration`, in canonical order
pub fn complete_model() -> ChainModel {
    let mut model = ChainModel::new();
    model.global.version = Some("20512".to_string());
    model.global.dev_version = Some("20512".to_string());
    for name in DEFAULT_PROJECT_ORDER {
        model.push_section(source_section(name, "integration"));
    }
    model
}

/// Model with the canonical projects except the named ones
pub fn complete_model_without(missing: &[&str]) -> ChainModel {
    let mut model = complete_model();
    model
        .sections
        .retain(|s| !missing.iter().any(|m| s.is_named(m)));
    model
}

/// Chain file written into a temporary directory
///
/// The directory lives as long as the fixture.
pub struct ChainFixture {
    dir: TempDir,
    path: PathBuf,
}

impl ChainFixture {
    /// Write `content` to `chain.properties` in a fresh directory
    pub fn new(content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chain.properties");
        std::fs::write(&path, content).unwrap();
        Self { dir, path }
    }

    /// Fixture path
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Path of a file that does not exist in the fixture directory
    pub fn missing_path(&self) -> PathBuf {
        self.dir.path().join("missing.properties")
    }

    /// Current file content
    pub fn read(&self) -> String {
        std::fs::read_to_string(&self.path).unwrap()
    }
}

/// Lines of `text` that are `key=value` assignments (comments and blanks dropped)
pub fn assignment_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && l.contains('='))
        .collect()
}
