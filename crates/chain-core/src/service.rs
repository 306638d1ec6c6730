//! Chain service - the entry points used by front ends
//!
//! Wires the file layer, validator, auto-fix engine and reorder service
//! around one rule set. Every front end (CLI, GUI) goes through here.

use crate::error::{ChainError, ChainResult};
use crate::types::ChainGenerationRequest;
use crate::versions::{self, VersionSummary};
use chain_file::ChainFileLayer;
use chain_fix::{AutoFixEngine, FixSummary};
use chain_model::section::{DEV_MODE, MODE, TAG, TESTS_UNIT};
use chain_model::{modes, ChainModel, ReorderService, Section};
use chain_rules::{
    ChainCatalog, RuleConfigLoader, RuleSet, ValidationIssue, ValidationReport, Validator,
};
use std::path::Path;

const MODES: [&str; 3] = [modes::SOURCE, modes::BINARY, modes::IGNORE];

/// Facade over parsing, validation, auto-fix, reordering and writing
#[derive(Debug)]
pub struct ChainService {
    catalog: ChainCatalog,
    layer: ChainFileLayer,
    validator: Validator,
    engine: AutoFixEngine,
    reorder: ReorderService,
}

impl ChainService {
    /// Service for a rule set
    #[must_use]
    pub fn new(set: &RuleSet) -> Self {
        let order = set.catalog.canonical_order.clone();
        Self {
            catalog: set.catalog.clone(),
            layer: ChainFileLayer::new().with_order(order.clone()),
            validator: Validator::new(set),
            engine: AutoFixEngine::from_rule_set(set),
            reorder: ReorderService::new(order),
        }
    }

    /// Service for the built-in rule set
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(&RuleSet::builtin())
    }

    /// Service for the loader's rule set
    ///
    /// # Errors
    /// Returns `ChainError::Config` if the rule configuration cannot be loaded
    pub fn from_loader(loader: &RuleConfigLoader) -> ChainResult<Self> {
        Ok(Self::new(&*loader.load()?))
    }

    /// Replace the file layer
    #[must_use]
    pub fn with_layer(mut self, layer: ChainFileLayer) -> Self {
        self.layer = layer;
        self
    }

    /// Static lookup tables of the rule set
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &ChainCatalog {
        &self.catalog
    }

    /// File layer
    #[inline]
    #[must_use]
    pub fn layer(&self) -> &ChainFileLayer {
        &self.layer
    }

    /// Parse a chain file
    ///
    /// # Errors
    /// Returns `ChainError::Parse` if the file is missing or unreadable
    pub fn parse(&self, path: impl AsRef<Path>) -> ChainResult<ChainModel> {
        Ok(self.layer.parse(path)?)
    }

    /// Validate a model; never fails
    #[must_use]
    pub fn validate(&self, model: &ChainModel) -> ValidationReport {
        self.validator.validate(model)
    }

    /// Apply repairs for the given issues; returns the number fixed
    pub fn apply_auto_fixes(&self, model: &mut ChainModel, issues: &[ValidationIssue]) -> usize {
        self.engine.apply_fixes(model, issues)
    }

    /// Validate and fix every auto-fixable error, then reorder
    pub fn fix_all_issues(&self, model: &mut ChainModel) -> FixSummary {
        self.engine.fix_all(model, &self.validator)
    }

    /// Reorder sections into canonical order; returns whether anything moved
    pub fn reorder(&self, model: &mut ChainModel) -> bool {
        self.reorder.reorder(model)
    }

    /// Write a model to a chain file
    ///
    /// # Errors
    /// Returns `ChainError::Write` if the file cannot be written
    pub fn write(&self, path: impl AsRef<Path>, model: &ChainModel) -> ChainResult<()> {
        Ok(self.layer.write(path, model)?)
    }

    /// Render a model without writing it
    #[must_use]
    pub fn render(&self, model: &ChainModel) -> String {
        self.layer.render(model)
    }

    /// Put the named sections on a branch, dropping their tags
    ///
    /// Returns the number of sections that changed. Nothing changes if any
    /// name is unknown.
    ///
    /// # Errors
    /// - `ChainError::InvalidRequest` if `branch` is blank
    /// - `ChainError::SectionNotFound` for the first unknown name
    pub fn update_branch(
        &self,
        model: &mut ChainModel,
        sections: &[&str],
        branch: &str,
    ) -> ChainResult<usize> {
        let branch = branch.trim();
        if branch.is_empty() {
            return Err(ChainError::InvalidRequest("branch is blank".into()));
        }
        self.update_sections(model, sections, |section| {
            let dropped_tag = section.remove(TAG).is_some();
            if section.branch() == Some(branch) {
                return dropped_tag;
            }
            section.set_branch(branch);
            true
        })
    }

    /// Set the build mode of the named sections
    ///
    /// # Errors
    /// - `ChainError::InvalidMode` if `mode` is not source, binary or ignore
    /// - `ChainError::SectionNotFound` for the first unknown name
    pub fn update_mode(
        &self,
        model: &mut ChainModel,
        sections: &[&str],
        mode: &str,
    ) -> ChainResult<usize> {
        let mode = checked_mode(MODE, mode)?;
        self.update_sections(model, sections, |section| set_if_changed(section, MODE, mode))
    }

    /// Set the developer build mode of the named sections
    ///
    /// # Errors
    /// - `ChainError::InvalidMode` if `mode` is not source, binary or ignore
    /// - `ChainError::SectionNotFound` for the first unknown name
    pub fn update_dev_mode(
        &self,
        model: &mut ChainModel,
        sections: &[&str],
        mode: &str,
    ) -> ChainResult<usize> {
        let mode = checked_mode(DEV_MODE, mode)?;
        self.update_sections(model, sections, |section| {
            set_if_changed(section, DEV_MODE, mode)
        })
    }

    /// Toggle unit tests of the named sections
    ///
    /// # Errors
    /// Returns `ChainError::SectionNotFound` for the first unknown name
    pub fn set_unit_tests(
        &self,
        model: &mut ChainModel,
        sections: &[&str],
        enabled: bool,
    ) -> ChainResult<usize> {
        self.update_sections(model, sections, |section| {
            if section.has(TESTS_UNIT) && section.tests_unit() == enabled {
                return false;
            }
            section.set_tests_unit(enabled);
            true
        })
    }

    /// Set one integration test flag
    pub fn set_integration_test(&self, model: &mut ChainModel, suite: &str, enabled: bool) {
        if !self.catalog.is_known_suite(suite) {
            tracing::warn!(suite, "setting unknown integration test suite");
        }
        model.set_integration_test(suite.trim(), enabled);
    }

    /// Global versions and section tags
    #[must_use]
    pub fn extract_versions(&self, model: &ChainModel) -> VersionSummary {
        versions::extract_versions(model)
    }

    /// Move the global version and every release tag to a new build
    ///
    /// Returns the number of tags rewritten.
    pub fn rebase_versions(&self, model: &mut ChainModel, build: u64) -> usize {
        versions::rebase_versions(model, build)
    }

    /// Build a fresh model from a generation request
    ///
    /// # Errors
    /// Returns `ChainError::InvalidRequest` for blank or duplicate project
    /// names and blank feature branches
    pub fn generate(&self, request: &ChainGenerationRequest) -> ChainResult<ChainModel> {
        let feature_branch = match request.feature_branch.as_deref().map(str::trim) {
            Some("") => {
                return Err(ChainError::InvalidRequest("feature branch is blank".into()));
            }
            other => other,
        };

        let mut model = ChainModel::new();
        model.global.version = request.global_version.clone();
        model.global.dev_version = request.dev_version.clone();
        model.global.recipients = request.recipients.clone();

        for project in &request.projects {
            let name = project.name.trim();
            if name.is_empty() {
                return Err(ChainError::InvalidRequest("project name is blank".into()));
            }
            if model.has_section(name) {
                return Err(ChainError::InvalidRequest(format!(
                    "duplicate project '{name}'"
                )));
            }
            let mut section = project.to_section();
            if let Some(branch) = feature_branch {
                if project.is_source() && project.lacks_ref() {
                    section.set_branch(branch);
                }
            }
            model.push_section(section);
        }
        for (suite, enabled) in &request.integration_tests {
            model.set_integration_test(suite, *enabled);
        }
        self.reorder.reorder(&mut model);

        tracing::info!(sections = model.sections.len(), "chain generated");
        Ok(model)
    }

    /// Generate a model and write it as a new chain file
    ///
    /// # Errors
    /// Returns `ChainError::InvalidRequest` or `ChainError::Write`
    pub fn generate_file(
        &self,
        path: impl AsRef<Path>,
        request: &ChainGenerationRequest,
    ) -> ChainResult<ChainModel> {
        let model = self.generate(request)?;
        self.write(path, &model)?;
        Ok(model)
    }

    fn update_sections(
        &self,
        model: &mut ChainModel,
        names: &[&str],
        mut update: impl FnMut(&mut Section) -> bool,
    ) -> ChainResult<usize> {
        if let Some(missing) = names.iter().find(|n| !model.has_section(n)) {
            return Err(ChainError::SectionNotFound((*missing).to_string()));
        }
        let mut changed = 0;
        for section in model
            .sections
            .iter_mut()
            .filter(|s| names.iter().any(|n| s.is_named(n)))
        {
            if update(section) {
                changed += 1;
            }
        }
        tracing::debug!(requested = names.len(), changed, "sections updated");
        Ok(changed)
    }
}

impl Default for ChainService {
    fn default() -> Self {
        Self::builtin()
    }
}

fn checked_mode<'a>(property: &str, mode: &'a str) -> ChainResult<&'a str> {
    let mode = mode.trim();
    if MODES.contains(&mode) {
        Ok(mode)
    } else {
        Err(ChainError::invalid_mode(property, mode))
    }
}

fn set_if_changed(section: &mut Section, suffix: &str, value: &str) -> bool {
    if section.get(suffix) == Some(value) {
        return false;
    }
    section.set(suffix, value);
    true
}
