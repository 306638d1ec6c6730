//! Canonical project order and the reorder service
//!
//! The canonical order is the fixed template sequence of project names. It
//! drives section reordering and decides where the writer slots a wholly new
//! section relative to the ones already present in a file.

use crate::model::ChainModel;
use crate::section::Section;
use serde::{Deserialize, Serialize};

/// Default canonical project sequence
pub const DEFAULT_PROJECT_ORDER: [&str; 15] = [
    "framework",
    "repository",
    "olap",
    "modeling",
    "depmservice",
    "consolidation",
    "appengine",
    "designer",
    "dashboards",
    "appstudio",
    "officeinteg",
    "administration",
    "content",
    "deployment",
    "tests",
];

/// Ordered list of canonical project names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalOrder {
    projects: Vec<String>,
}

impl CanonicalOrder {
    /// Create from explicit project names
    #[must_use]
    pub fn new<I, S>(projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            projects: projects.into_iter().map(Into::into).collect(),
        }
    }

    /// Position of a project in canonical order (case-insensitive)
    #[inline]
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.eq_ignore_ascii_case(name))
    }

    /// Whether the name is a canonical project
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Canonical names in order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.projects.iter().map(String::as_str)
    }

    /// Number of canonical projects
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether the order is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Canonical projects with no matching section in the model
    #[must_use]
    pub fn missing_from(&self, model: &ChainModel) -> Vec<&str> {
        self.iter().filter(|p| !model.has_section(p)).collect()
    }
}

impl Default for CanonicalOrder {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_ORDER)
    }
}

/// Re-sequences sections into canonical order
#[derive(Debug, Clone, Default)]
pub struct ReorderService {
    order: CanonicalOrder,
}

impl ReorderService {
    /// Create service for the given order
    #[inline]
    #[must_use]
    pub fn new(order: CanonicalOrder) -> Self {
        Self { order }
    }

    /// Canonical order used by this service
    #[inline]
    #[must_use]
    pub fn order(&self) -> &CanonicalOrder {
        &self.order
    }

    /// Reorder sections: canonical ones first in canonical order, then the rest
    /// in their original relative order
    ///
    /// Returns whether the name sequence changed. The model is left untouched
    /// when nothing moves.
    pub fn reorder(&self, model: &mut ChainModel) -> bool {
        let target = self.target_indices(&model.sections);
        let changed = target.iter().enumerate().any(|(pos, idx)| pos != *idx);
        if !changed {
            return false;
        }

        let mut slots: Vec<Option<Section>> = model.sections.drain(..).map(Some).collect();
        model.sections = target
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect();

        tracing::debug!(sections = ?model.section_names(), "sections reordered");
        true
    }

    /// Whether the sections are already in canonical-then-extras order
    #[must_use]
    pub fn is_ordered(&self, model: &ChainModel) -> bool {
        self.target_indices(&model.sections)
            .iter()
            .enumerate()
            .all(|(pos, idx)| pos == *idx)
    }

    fn target_indices(&self, sections: &[Section]) -> Vec<usize> {
        let mut canonical: Vec<(usize, usize)> = Vec::new();
        let mut extras: Vec<usize> = Vec::new();
        for (idx, section) in sections.iter().enumerate() {
            match self.order.position(&section.name) {
                Some(rank) => canonical.push((rank, idx)),
                None => extras.push(idx),
            }
        }
        // stable sort keeps duplicates of one canonical name in file order
        canonical.sort_by_key(|(rank, _)| *rank);
        canonical
            .into_iter()
            .map(|(_, idx)| idx)
            .chain(extras)
            .collect()
    }
}
