//! Catalog data model.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// OrderedMap
// ============================================================================

/// A small map that keeps insertion order.
///
/// Column maps follow the schema probe's column order so filter options come
/// out in the same order the table declares them. Inserting an existing key
/// replaces the value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &V) -> bool) {
        self.entries.retain(|(k, v)| keep(k, v));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ============================================================================
// Groups and table references
// ============================================================================

/// The four fixed table groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    MetaData,
    LmMetaData,
    ReMetaData,
    PwMetaData,
}

impl GroupKind {
    /// Every group, in catalog order.
    pub const ALL: [GroupKind; 4] = [
        GroupKind::MetaData,
        GroupKind::LmMetaData,
        GroupKind::ReMetaData,
        GroupKind::PwMetaData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::MetaData => "meta_data",
            GroupKind::LmMetaData => "lm_meta_data",
            GroupKind::ReMetaData => "re_meta_data",
            GroupKind::PwMetaData => "pw_meta_data",
        }
    }

    /// Position in [`GroupKind::ALL`].
    pub fn index(&self) -> usize {
        match self {
            GroupKind::MetaData => 0,
            GroupKind::LmMetaData => 1,
            GroupKind::ReMetaData => 2,
            GroupKind::PwMetaData => 3,
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown table group: {s}"))
    }
}

/// A queryable table expression: a table name or a sub-query.
///
/// An empty reference means "no table for this group/dataset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableReference(String);

impl TableReference {
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Whitespace-only expressions count as empty.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TableReference {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TableReference {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ============================================================================
// Filter options and metadata
// ============================================================================

/// A label/value pair for a selectable filter control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

impl FilterOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// What one table's probes revealed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableProfile {
    /// Lower-cased column name -> declared type, noise columns removed.
    pub column_types: OrderedMap<String>,
    /// String column -> bounded candidate values.
    pub distinct_values: OrderedMap<Vec<FilterOption>>,
    /// One option per entry of `column_types`, same order.
    pub filter_options: Vec<FilterOption>,
}

impl TableProfile {
    pub fn is_empty(&self) -> bool {
        self.column_types.is_empty()
            && self.distinct_values.is_empty()
            && self.filter_options.is_empty()
    }
}

/// Derived knowledge about one table group across all datasets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableMetadata {
    pub group: GroupKind,
    /// Dataset name -> table reference, in dataset order.
    pub tables_by_dataset: OrderedMap<TableReference>,
    pub column_types: OrderedMap<String>,
    pub distinct_values: OrderedMap<Vec<FilterOption>>,
    pub filter_options: Vec<FilterOption>,
}

impl TableMetadata {
    /// Metadata with no derived columns.
    pub fn empty(group: GroupKind, tables_by_dataset: OrderedMap<TableReference>) -> Self {
        Self::from_profile(group, tables_by_dataset, TableProfile::default())
    }

    pub fn from_profile(
        group: GroupKind,
        tables_by_dataset: OrderedMap<TableReference>,
        profile: TableProfile,
    ) -> Self {
        Self {
            group,
            tables_by_dataset,
            column_types: profile.column_types,
            distinct_values: profile.distinct_values,
            filter_options: profile.filter_options,
        }
    }

    /// Whether any dataset has a table in this group.
    pub fn has_tables(&self) -> bool {
        self.tables_by_dataset.values().any(|t| !t.is_empty())
    }

    /// Table reference for one dataset, if that dataset has a table here.
    pub fn table_for(&self, dataset: &str) -> Option<&TableReference> {
        self.tables_by_dataset.get(dataset).filter(|t| !t.is_empty())
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// One [`TableMetadata`] per group, always all four, in [`GroupKind::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    groups: Vec<TableMetadata>,
}

impl Catalog {
    /// Callers must pass exactly one entry per group in [`GroupKind::ALL`] order.
    pub(crate) fn from_ordered(groups: Vec<TableMetadata>) -> Self {
        debug_assert!(groups
            .iter()
            .map(|m| m.group)
            .eq(GroupKind::ALL.into_iter()));
        Self { groups }
    }

    pub fn get(&self, group: GroupKind) -> &TableMetadata {
        &self.groups[group.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableMetadata> {
        self.groups.iter()
    }
}

impl Index<GroupKind> for Catalog {
    type Output = TableMetadata;

    fn index(&self, group: GroupKind) -> &TableMetadata {
        self.get(group)
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for meta in &self.groups {
            map.serialize_entry(meta.group.as_str(), meta)?;
        }
        map.end()
    }
}

// ============================================================================
// Loader input
// ============================================================================

/// Dataset names plus, per group, table expressions aligned by position.
///
/// Groups never given are treated as empty lists.
#[derive(Debug, Clone, Default)]
pub struct GroupInput {
    datasets: Vec<String>,
    tables: [Vec<String>; 4],
}

impl GroupInput {
    pub fn new<I, S>(datasets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            datasets: datasets.into_iter().map(Into::into).collect(),
            tables: Default::default(),
        }
    }

    pub fn with_group<I, S>(mut self, group: GroupKind, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables[group.index()] = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn datasets(&self) -> &[String] {
        &self.datasets
    }

    pub fn tables(&self, group: GroupKind) -> &[String] {
        &self.tables[group.index()]
    }

    /// Pair each dataset with the table at the same position.
    ///
    /// A short table list is padded with empty references; extra tables
    /// beyond the dataset count are dropped.
    pub fn tables_by_dataset(&self, group: GroupKind) -> OrderedMap<TableReference> {
        let tables = self.tables(group);
        self.datasets
            .iter()
            .enumerate()
            .map(|(i, dataset)| {
                let table = tables.get(i).map(String::as_str).unwrap_or_default();
                (dataset.clone(), TableReference::new(table))
            })
            .collect()
    }

    /// The table whose schema stands in for the whole group: the one paired
    /// with the first dataset.
    pub fn exemplar(&self, group: GroupKind) -> TableReference {
        if self.datasets.is_empty() {
            return TableReference::empty();
        }
        self.tables(group)
            .first()
            .map(|t| TableReference::new(t.as_str()))
            .unwrap_or_default()
    }
}
