//! Rule configuration loader
//!
//! The loader is an explicit value handed to whoever builds validators or
//! fix registries. It reads its source lazily on first use and keeps the
//! decoded [`RuleSet`] until [`RuleConfigLoader::reload`] or
//! [`RuleConfigLoader::clear`] is called.

use crate::config::RuleSet;
use crate::error::ConfigError;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;

/// Where rule configuration comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// Built-in default rule set
    BuiltIn,
    /// Inline JSON document
    Json(String),
    /// JSON file on disk; a missing file yields the built-in set
    File(PathBuf),
}

/// Lazily loading, cached rule configuration
#[derive(Debug)]
pub struct RuleConfigLoader {
    source: RuleSource,
    cache: RwLock<Option<Arc<RuleSet>>>,
}

impl RuleConfigLoader {
    /// Create loader for a source
    #[must_use]
    pub fn new(source: RuleSource) -> Self {
        Self {
            source,
            cache: RwLock::new(None),
        }
    }

    /// Loader for the built-in rule set
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(RuleSource::BuiltIn)
    }

    /// Configured source
    #[inline]
    #[must_use]
    pub fn source(&self) -> &RuleSource {
        &self.source
    }

    /// Cached rule set, loading it on first call
    ///
    /// # Errors
    /// Returns `ConfigError` if the source cannot be read or decoded
    pub fn load(&self) -> Result<Arc<RuleSet>, ConfigError> {
        if let Some(set) = self.cache.read().as_ref() {
            return Ok(Arc::clone(set));
        }

        let mut cache = self.cache.write();
        // another caller may have filled the cache while we waited
        if let Some(set) = cache.as_ref() {
            return Ok(Arc::clone(set));
        }
        let set = Arc::new(self.read_source()?);
        *cache = Some(Arc::clone(&set));
        Ok(set)
    }

    /// Re-read the source and replace the cache
    ///
    /// On failure the previous cache entry is kept.
    ///
    /// # Errors
    /// Returns `ConfigError` if the source cannot be read or decoded
    pub fn reload(&self) -> Result<Arc<RuleSet>, ConfigError> {
        let set = Arc::new(self.read_source()?);
        *self.cache.write() = Some(Arc::clone(&set));
        tracing::info!(rules = set.rules.len(), "rule configuration reloaded");
        Ok(set)
    }

    /// Drop the cached rule set
    pub fn clear(&self) {
        self.cache.write().take();
    }

    /// Whether a rule set is cached
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cache.read().is_some()
    }

    fn read_source(&self) -> Result<RuleSet, ConfigError> {
        match &self.source {
            RuleSource::BuiltIn => Ok(RuleSet::builtin()),
            RuleSource::Json(json) => RuleSet::from_json(json),
            RuleSource::File(path) if !path.exists() => {
                tracing::warn!(
                    path = %path.display(),
                    "rule configuration not found, using built-in rules"
                );
                Ok(RuleSet::builtin())
            }
            RuleSource::File(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::io_error(path, e))?;
                let set = RuleSet::from_json(&json)?;
                tracing::debug!(path = %path.display(), rules = set.rules.len(), "rule configuration loaded");
                Ok(set)
            }
        }
    }
}

impl Default for RuleConfigLoader {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ONE_RULE: &str =
        r#"[{ "ruleId": "Only", "severity": "Warning", "ruleType": "DevModeWithoutMode" }]"#;

    #[test]
    fn load_caches_the_same_instance() {
        let loader = RuleConfigLoader::builtin();
        assert!(!loader.is_loaded());
        let first = loader.load().unwrap();
        let second = loader.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(loader.is_loaded());
    }

    #[test]
    fn clear_forces_a_fresh_load() {
        let loader = RuleConfigLoader::new(RuleSource::Json(ONE_RULE.to_string()));
        let first = loader.load().unwrap();
        loader.clear();
        assert!(!loader.is_loaded());
        let second = loader.load().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.rules.len(), 1);
    }

    #[test]
    fn reload_picks_up_file_changes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{ONE_RULE}").unwrap();
        let loader = RuleConfigLoader::new(RuleSource::File(file.path().to_path_buf()));
        assert_eq!(loader.load().unwrap().rules.len(), 1);

        std::fs::write(file.path(), "[]").unwrap();
        assert_eq!(loader.load().unwrap().rules.len(), 1);
        assert!(loader.reload().unwrap().rules.is_empty());
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let loader = RuleConfigLoader::new(RuleSource::File(dir.path().join("rules.json")));
        assert_eq!(loader.load().unwrap().rules.len(), RuleSet::builtin().rules.len());
    }

    #[test]
    fn failed_reload_keeps_previous_cache() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), ONE_RULE).unwrap();
        let loader = RuleConfigLoader::new(RuleSource::File(file.path().to_path_buf()));
        let first = loader.load().unwrap();

        std::fs::write(file.path(), "{ not json").unwrap();
        assert!(matches!(loader.reload(), Err(ConfigError::InvalidJson(_))));
        assert!(Arc::ptr_eq(&first, &loader.load().unwrap()));
    }
}
