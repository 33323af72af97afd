//! Adapter for synchronous query backends.
//!
//! Many tabular-query services only ship a blocking client. Wrapping one in
//! [`BlockingQueryClient`] moves each call onto Tokio's blocking pool so the
//! four group probes still run side by side.

use std::sync::Arc;

use async_trait::async_trait;

use super::{QueryClient, QueryResult, ResultSet};

/// A blocking, fallible query backend.
pub trait SyncQueryClient: Send + Sync + 'static {
    fn execute(&self, data_source: &str, sql: &str) -> QueryResult<ResultSet>;
}

impl<F> SyncQueryClient for F
where
    F: Fn(&str, &str) -> QueryResult<ResultSet> + Send + Sync + 'static,
{
    fn execute(&self, data_source: &str, sql: &str) -> QueryResult<ResultSet> {
        self(data_source, sql)
    }
}

/// Runs a [`SyncQueryClient`] on `tokio::task::spawn_blocking`.
pub struct BlockingQueryClient<C> {
    inner: Arc<C>,
}

impl<C: SyncQueryClient> BlockingQueryClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C> Clone for BlockingQueryClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl<C: SyncQueryClient> QueryClient for BlockingQueryClient<C> {
    async fn execute(&self, data_source: &str, sql: &str) -> QueryResult<ResultSet> {
        let inner = Arc::clone(&self.inner);
        let data_source = data_source.to_string();
        let sql = sql.to_string();

        tokio::task::spawn_blocking(move || SyncQueryClient::execute(&*inner, &data_source, &sql))
            .await?
    }
}
