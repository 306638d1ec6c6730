//! Auto-fix engine
//!
//! Dispatches fixable issues to the [`FixRegistry`] and creates missing
//! sections in one pass.

use crate::repair::FixRegistry;
use chain_model::{modes, ChainModel, ReorderService, Section};
use chain_rules::{ids, ChainCatalog, RuleKind, RuleSet, ValidationIssue, Validator};
use serde::Serialize;

/// Upper bound on validate-and-repair passes in [`AutoFixEngine::fix_all`]
pub const MAX_FIX_PASSES: usize = 4;

/// Projects built without developer binaries
const DEV_IGNORED_PROJECTS: [&str; 3] = ["tests", "designer", "deployment"];

/// Projects that do not run unit tests
const UNIT_TESTLESS_PROJECTS: [&str; 3] = ["tests", "content", "deployment"];

/// Outcome of a fix-everything pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FixSummary {
    /// Number of issues fixed (created sections count one each)
    pub fixed: usize,
    /// Whether the final reorder moved any section
    pub reordered: bool,
}

/// Default section for a project created by the missing-sections fix
#[must_use]
pub fn default_section(name: &str, catalog: &ChainCatalog) -> Section {
    let is = |list: &[&str]| list.iter().any(|p| p.eq_ignore_ascii_case(name));
    let dev_mode = if is(&DEV_IGNORED_PROJECTS) {
        modes::IGNORE
    } else {
        modes::BINARY
    };

    let mut section = Section::new(name);
    section.set_mode(modes::SOURCE);
    section.set_dev_mode(dev_mode);
    section.set_branch(catalog.default_branch.as_str());
    section.set_tests_unit(!is(&UNIT_TESTLESS_PROJECTS));
    section
}

/// Applies deterministic repairs to a model
#[derive(Debug)]
pub struct AutoFixEngine {
    registry: FixRegistry,
    catalog: ChainCatalog,
    reorder: ReorderService,
    section_rules: Vec<String>,
}

impl AutoFixEngine {
    /// Engine with the default repairs for the given catalog
    #[must_use]
    pub fn new(catalog: ChainCatalog) -> Self {
        Self {
            registry: FixRegistry::with_defaults(&catalog),
            reorder: ReorderService::new(catalog.canonical_order.clone()),
            catalog,
            section_rules: vec![ids::REQUIRED_PROJECTS.to_string()],
        }
    }

    /// Engine for a rule set: every `RequiredSections` rule is handled by
    /// the missing-sections pass
    #[must_use]
    pub fn from_rule_set(set: &RuleSet) -> Self {
        let mut engine = Self::new(set.catalog.clone());
        for rule in &set.rules {
            if matches!(rule.kind, RuleKind::RequiredSections(_))
                && !engine.section_rules.contains(&rule.rule_id)
            {
                engine.section_rules.push(rule.rule_id.clone());
            }
        }
        engine
    }

    /// Replace the repair registry
    #[must_use]
    pub fn with_registry(mut self, registry: FixRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Repair registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &FixRegistry {
        &self.registry
    }

    /// Mutable repair registry, for registering extra repairs
    #[inline]
    pub fn registry_mut(&mut self) -> &mut FixRegistry {
        &mut self.registry
    }

    /// Catalog used for default values
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &ChainCatalog {
        &self.catalog
    }

    /// Apply repairs for the auto-fixable issues and return how many were fixed
    ///
    /// Never fails: a repair that returns an error is logged and not counted.
    pub fn apply_fixes(&self, model: &mut ChainModel, issues: &[ValidationIssue]) -> usize {
        let mut fixed = 0;
        let mut missing_sections: Vec<&str> = Vec::new();

        for issue in issues.iter().filter(|i| i.auto_fixable) {
            if self.section_rules.contains(&issue.rule_id) {
                if let Some(name) = issue.section.as_deref() {
                    missing_sections.push(name);
                }
                continue;
            }

            let Some(repair) = self.registry.get(&issue.rule_id) else {
                tracing::debug!(rule_id = %issue.rule_id, "no repair registered");
                continue;
            };
            match repair.repair(model, issue) {
                Ok(true) => {
                    tracing::debug!(
                        rule_id = %issue.rule_id,
                        section = issue.section.as_deref().unwrap_or("<global>"),
                        "fix applied"
                    );
                    fixed += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(rule_id = %issue.rule_id, error = %e, "fix failed");
                }
            }
        }

        if !missing_sections.is_empty() {
            fixed += self.create_missing_sections(model, &missing_sections);
        }
        fixed
    }

    /// Create every missing canonical section plus the named extras, then
    /// reorder
    fn create_missing_sections(&self, model: &mut ChainModel, named: &[&str]) -> usize {
        let mut wanted: Vec<String> = self
            .catalog
            .canonical_order
            .missing_from(model)
            .into_iter()
            .map(String::from)
            .collect();
        for name in named {
            if !wanted.iter().any(|w| w.eq_ignore_ascii_case(name)) {
                wanted.push((*name).to_string());
            }
        }

        let mut created = 0;
        for name in &wanted {
            if model.has_section(name) {
                continue;
            }
            model.push_section(default_section(name, &self.catalog));
            tracing::debug!(section = %name, "section created");
            created += 1;
        }
        self.reorder.reorder(model);
        created
    }

    /// Validate, fix every auto-fixable error, then reorder
    ///
    /// A repair can expose a new error (created sections use binary dev mode,
    /// which a rule set may require a global dev version for), so validation
    /// and repair repeat until a pass fixes nothing, at most
    /// [`MAX_FIX_PASSES`] times.
    pub fn fix_all(&self, model: &mut ChainModel, validator: &Validator) -> FixSummary {
        let mut fixed = 0;
        for pass in 1..=MAX_FIX_PASSES {
            let issues = validator.validate(model).fixable_errors();
            let applied = self.apply_fixes(model, &issues);
            tracing::debug!(pass, applied, "fix pass");
            if applied == 0 {
                break;
            }
            fixed += applied;
        }
        let reordered = self.reorder.reorder(model);
        tracing::info!(fixed, reordered, "fixes applied");
        FixSummary { fixed, reordered }
    }
}

impl Default for AutoFixEngine {
    fn default() -> Self {
        Self::new(ChainCatalog::default())
    }
}
