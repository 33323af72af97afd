//! In-memory query client for tests.
//!
//! [`ScriptedQueryClient`] answers probes from a fixed script, optionally
//! after a delay or with a failure, and records every SQL string it receives.
//!
//! # Example
//!
//! ```ignore
//! use dumpcat::query::test_utils::{distinct_result, schema_result, ScriptedQueryClient};
//!
//! let client = ScriptedQueryClient::new()
//!     .on_schema("t1", schema_result(&[("country", "object")]))
//!     .on_distinct("t1", distinct_result(&[("country", &["US", "CA"])]));
//! ```

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{QueryClient, QueryError, QueryResult, ResultColumn, ResultSet};
use crate::sql;

#[derive(Debug, Clone)]
enum Matcher {
    Exact(String),
    DistinctFor(String),
}

impl Matcher {
    fn matches(&self, sql: &str) -> bool {
        match self {
            Matcher::Exact(expected) => sql == expected,
            Matcher::DistinctFor(table) => {
                sql.starts_with("SELECT array_agg(")
                    && sql.ends_with(&format!(" FROM ({table}) AS t"))
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Rows(ResultSet),
    Fail(String),
}

#[derive(Debug, Clone)]
struct Rule {
    matcher: Matcher,
    reply: Reply,
    latency: Duration,
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub data_source: String,
    pub sql: String,
}

/// Query client that replays scripted responses.
///
/// Rules are checked in the order they were added; the first match wins.
/// An unmatched query fails with [`QueryError::Backend`].
#[derive(Debug, Default)]
pub struct ScriptedQueryClient {
    rules: Vec<Rule>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedQueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, matcher: Matcher, reply: Reply, latency: Duration) -> Self {
        self.rules.push(Rule {
            matcher,
            reply,
            latency,
        });
        self
    }

    /// Answer the schema probe for `table`.
    pub fn on_schema(self, table: &str, result: ResultSet) -> Self {
        self.push(
            Matcher::Exact(sql::schema_probe(table)),
            Reply::Rows(result),
            Duration::ZERO,
        )
    }

    /// Answer the schema probe for `table` after `latency`.
    pub fn on_schema_delayed(self, table: &str, result: ResultSet, latency: Duration) -> Self {
        self.push(
            Matcher::Exact(sql::schema_probe(table)),
            Reply::Rows(result),
            latency,
        )
    }

    /// Answer the distinct-values probe for `table`.
    pub fn on_distinct(self, table: &str, result: ResultSet) -> Self {
        self.push(
            Matcher::DistinctFor(table.trim().to_string()),
            Reply::Rows(result),
            Duration::ZERO,
        )
    }

    /// Fail the schema probe for `table`.
    pub fn fail_schema(self, table: &str, message: &str) -> Self {
        self.push(
            Matcher::Exact(sql::schema_probe(table)),
            Reply::Fail(message.to_string()),
            Duration::ZERO,
        )
    }

    /// Fail the distinct-values probe for `table`.
    pub fn fail_distinct(self, table: &str, message: &str) -> Self {
        self.push(
            Matcher::DistinctFor(table.trim().to_string()),
            Reply::Fail(message.to_string()),
            Duration::ZERO,
        )
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    /// Number of calls whose SQL contains `needle`.
    pub fn calls_containing(&self, needle: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.sql.contains(needle))
            .count()
    }
}

#[async_trait]
impl QueryClient for ScriptedQueryClient {
    async fn execute(&self, data_source: &str, sql: &str) -> QueryResult<ResultSet> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                data_source: data_source.to_string(),
                sql: sql.to_string(),
            });
        }

        let rule = self
            .rules
            .iter()
            .find(|rule| rule.matcher.matches(sql))
            .cloned()
            .ok_or_else(|| QueryError::backend(format!("no scripted response for: {sql}")))?;

        if !rule.latency.is_zero() {
            tokio::time::sleep(rule.latency).await;
        }

        match rule.reply {
            Reply::Rows(result) => Ok(result),
            Reply::Fail(message) => Err(QueryError::Backend(message)),
        }
    }
}

/// One-row schema probe result with the given `(name, type)` columns.
pub fn schema_result(columns: &[(&str, &str)]) -> ResultSet {
    ResultSet::new(
        columns
            .iter()
            .map(|(name, data_type)| ResultColumn::new(*name, *data_type))
            .collect(),
        vec![columns.iter().map(|_| Value::Null).collect()],
    )
}

/// Single-row distinct probe result: one array-valued column per entry.
pub fn distinct_result(columns: &[(&str, &[&str])]) -> ResultSet {
    ResultSet::new(
        columns
            .iter()
            .map(|(name, _)| ResultColumn::new(*name, "array(varchar)"))
            .collect(),
        vec![columns
            .iter()
            .map(|(_, values)| Value::Array(values.iter().map(|v| Value::from(*v)).collect()))
            .collect()],
    )
}
