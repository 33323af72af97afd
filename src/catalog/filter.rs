//! Noise-column filtering.
//!
//! Two rules drop a column from the catalog: membership in the noise set, or
//! a name ending in `_<digits>` / `.<digits>` (positional fields such as
//! `lane_0` or `obj.3`). Both rules are data, so deployments can tune them
//! from the `[catalog]` config section.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::types::OrderedMap;
use crate::config::{
    CatalogSettings, SettingsError, DEFAULT_INDEXED_SUFFIX_PATTERN, DEFAULT_NOISE_COLUMNS,
};

static DEFAULT_INDEXED_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_INDEXED_SUFFIX_PATTERN).unwrap());

/// Decides which columns are too noisy to offer as filters.
#[derive(Debug, Clone)]
pub struct ColumnFilter {
    noise: HashSet<String>,
    indexed_suffix: Regex,
}

impl Default for ColumnFilter {
    fn default() -> Self {
        Self {
            noise: DEFAULT_NOISE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            indexed_suffix: DEFAULT_INDEXED_SUFFIX.clone(),
        }
    }
}

impl ColumnFilter {
    /// Build a filter from an explicit noise set and suffix pattern.
    pub fn new<I, S>(noise: I, indexed_suffix_pattern: &str) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let indexed_suffix = Regex::new(indexed_suffix_pattern)
            .map_err(|e| SettingsError::InvalidConfig(format!("indexed suffix pattern: {e}")))?;
        Ok(Self {
            noise: noise
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
            indexed_suffix,
        })
    }

    pub fn from_settings(settings: &CatalogSettings) -> Result<Self, SettingsError> {
        Self::new(&settings.noise_columns, &settings.indexed_suffix_pattern)
    }

    /// Whether a column should be left out. Names compare lower-cased.
    pub fn is_noise(&self, column: &str) -> bool {
        let lowered = column.to_lowercase();
        self.noise.contains(&lowered) || self.indexed_suffix.is_match(&lowered)
    }

    /// Copy of `columns` without the noise entries, order kept.
    pub fn apply<V: Clone>(&self, columns: &OrderedMap<V>) -> OrderedMap<V> {
        let mut kept = columns.clone();
        kept.retain(|name, _| !self.is_noise(name));
        kept
    }
}
