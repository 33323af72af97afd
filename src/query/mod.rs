//! Remote query boundary.
//!
//! The catalog builder never talks to a database directly. Every probe goes
//! through a [`QueryClient`], which executes a SQL string against a named data
//! source and hands back a [`ResultSet`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     TableMetadataExtractor                      │
//! │             (schema probe, then distinct-values probe)          │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      dyn QueryClient                            │
//! │  - WorkerQueryClient    (NDJSON worker process)                 │
//! │  - BlockingQueryClient  (wraps a synchronous backend)           │
//! │  - ScriptedQueryClient  (in-memory, for tests)                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations must be safe to call concurrently: the loader issues
//! probes for all four groups at once against the same client.

use std::sync::Arc;

use async_trait::async_trait;

mod blocking;
mod error;
mod result;
pub mod test_utils;

pub use blocking::{BlockingQueryClient, SyncQueryClient};
pub use error::{QueryError, QueryResult};
pub use result::{is_string_type, ResultColumn, ResultSet};

/// Executes SQL against a named data source.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Run `sql` against `data_source` and return the full result set.
    async fn execute(&self, data_source: &str, sql: &str) -> QueryResult<ResultSet>;
}

#[async_trait]
impl<T: QueryClient + ?Sized> QueryClient for Arc<T> {
    async fn execute(&self, data_source: &str, sql: &str) -> QueryResult<ResultSet> {
        (**self).execute(data_source, sql).await
    }
}

#[async_trait]
impl<T: QueryClient + ?Sized> QueryClient for &T {
    async fn execute(&self, data_source: &str, sql: &str) -> QueryResult<ResultSet> {
        (**self).execute(data_source, sql).await
    }
}
