//! Per-table metadata derivation.
//!
//! For one table reference the extractor issues at most two queries, in
//! order: a one-row schema probe, then (only if string columns survive the
//! noise filter) a single distinct-values probe over the whole table.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::error::{ExtractError, ExtractResult, Probe};
use super::filter::ColumnFilter;
use super::options::{build_filter_options, distinct_value_options, LiteralQuoting};
use super::types::{FilterOption, OrderedMap, TableProfile, TableReference};
use crate::config::{CatalogSettings, SettingsError, DEFAULT_MAX_DISTINCT_VALUES};
use crate::query::{is_string_type, QueryClient, ResultSet};
use crate::sql;

/// Tunables shared by the extractor and the loader.
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// Data source every probe runs against.
    pub data_source: String,
    pub filter: ColumnFilter,
    pub max_distinct_values: usize,
    pub quoting: LiteralQuoting,
    /// Upper bound on one group's load.
    pub group_timeout: Duration,
}

impl CatalogOptions {
    pub fn new(data_source: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            filter: ColumnFilter::default(),
            max_distinct_values: DEFAULT_MAX_DISTINCT_VALUES,
            quoting: LiteralQuoting::Raw,
            group_timeout: Duration::from_secs(120),
        }
    }

    pub fn from_settings(settings: &CatalogSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            data_source: settings.data_source.clone(),
            filter: ColumnFilter::from_settings(settings)?,
            max_distinct_values: settings.max_distinct_values,
            quoting: if settings.escape_literals {
                LiteralQuoting::Escaped
            } else {
                LiteralQuoting::Raw
            },
            group_timeout: settings.group_timeout(),
        })
    }

    pub fn with_filter(mut self, filter: ColumnFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_max_distinct_values(mut self, max: usize) -> Self {
        self.max_distinct_values = max;
        self
    }

    pub fn with_quoting(mut self, quoting: LiteralQuoting) -> Self {
        self.quoting = quoting;
        self
    }

    pub fn with_group_timeout(mut self, timeout: Duration) -> Self {
        self.group_timeout = timeout;
        self
    }
}

/// A surviving column: lower-cased key, name as the table spells it, declared type.
struct ProbedColumn {
    key: String,
    source_name: String,
    data_type: String,
}

/// Derives a [`TableProfile`] for a single table reference.
pub struct TableMetadataExtractor<'a, C: ?Sized> {
    client: &'a C,
    options: &'a CatalogOptions,
}

impl<'a, C: QueryClient + ?Sized> TableMetadataExtractor<'a, C> {
    pub fn new(client: &'a C, options: &'a CatalogOptions) -> Self {
        Self { client, options }
    }

    /// Probe `table` and build its profile.
    ///
    /// An empty reference yields an empty profile without any query.
    pub async fn extract(&self, table: &TableReference) -> ExtractResult<TableProfile> {
        if table.is_empty() {
            return Ok(TableProfile::default());
        }
        let expr = table.as_str().trim();

        let schema = self.run(Probe::Schema, sql::schema_probe(expr)).await?;
        let columns = self.surviving_columns(&schema)?;

        let column_types: OrderedMap<String> = columns
            .iter()
            .map(|c| (c.key.clone(), c.data_type.clone()))
            .collect();
        let filter_options = build_filter_options(&column_types);

        let string_columns: Vec<&ProbedColumn> = columns
            .iter()
            .filter(|c| is_string_type(&c.data_type))
            .collect();

        let distinct_values = if string_columns.is_empty() {
            OrderedMap::new()
        } else {
            let probe_sql = sql::distinct_probe(
                expr,
                string_columns
                    .iter()
                    .map(|c| (c.source_name.as_str(), c.key.as_str())),
            );
            let result = self.run(Probe::Distinct, probe_sql).await?;
            self.parse_distinct(&result, &string_columns)?
        };

        Ok(TableProfile {
            column_types,
            distinct_values,
            filter_options,
        })
    }

    async fn run(&self, probe: Probe, query: String) -> ExtractResult<ResultSet> {
        debug!(%probe, data_source = %self.options.data_source, sql = %query, "issuing probe");
        self.client
            .execute(&self.options.data_source, &query)
            .await
            .map_err(|source| ExtractError::RemoteQuery { probe, source })
    }

    /// Lower-case the schema's columns and drop noise, keeping probe order.
    fn surviving_columns(&self, schema: &ResultSet) -> ExtractResult<Vec<ProbedColumn>> {
        if schema.columns.is_empty() {
            return Err(ExtractError::malformed(Probe::Schema, "no columns returned"));
        }

        let mut columns: Vec<ProbedColumn> = Vec::with_capacity(schema.columns.len());
        for col in &schema.columns {
            if col.name.trim().is_empty() {
                return Err(ExtractError::malformed(Probe::Schema, "column with empty name"));
            }
            let key = col.name.to_lowercase();
            if self.options.filter.is_noise(&key) || columns.iter().any(|c| c.key == key) {
                continue;
            }
            columns.push(ProbedColumn {
                key,
                source_name: col.name.clone(),
                data_type: col.data_type.clone(),
            });
        }
        Ok(columns)
    }

    /// Read the single aggregate row of the distinct probe.
    fn parse_distinct(
        &self,
        result: &ResultSet,
        columns: &[&ProbedColumn],
    ) -> ExtractResult<OrderedMap<Vec<FilterOption>>> {
        let row = result
            .first_row()
            .ok_or_else(|| ExtractError::malformed(Probe::Distinct, "no rows returned"))?;

        let mut distinct = OrderedMap::new();
        for col in columns {
            let idx = result.column_index(&col.key).ok_or_else(|| {
                ExtractError::malformed(Probe::Distinct, format!("missing column {}", col.key))
            })?;
            let cell = row.get(idx).ok_or_else(|| {
                ExtractError::malformed(
                    Probe::Distinct,
                    format!("row has no cell for column {}", col.key),
                )
            })?;
            let raw = aggregate_values(cell).ok_or_else(|| {
                ExtractError::malformed(
                    Probe::Distinct,
                    format!("column {} is not an array aggregate", col.key),
                )
            })?;
            distinct.insert(
                col.key.clone(),
                distinct_value_options(
                    raw,
                    self.options.max_distinct_values,
                    self.options.quoting,
                ),
            );
        }
        Ok(distinct)
    }
}

/// Non-null elements of an `array_agg` cell as text.
///
/// A NULL cell (aggregate over zero rows) is an empty list; any other
/// non-array cell is unreadable.
fn aggregate_values(cell: &Value) -> Option<Vec<String>> {
    match cell {
        Value::Null => Some(Vec::new()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect(),
        ),
        _ => None,
    }
}
