//! WorkerQueryClient implementation.
//!
//! Resolves a data source name to configured connection parameters and runs
//! the SQL through the shared [`WorkerClient`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::protocol::ConnectionParams;
use super::WorkerClient;
use crate::config::{Settings, SettingsError};
use crate::query::{QueryClient, QueryError, QueryResult, ResultSet};

/// [`QueryClient`] backed by the query worker.
///
/// Data source names map to `[connections.<name>]` entries in the settings.
pub struct WorkerQueryClient {
    client: Arc<WorkerClient>,
    connections: HashMap<String, ConnectionParams>,
}

impl WorkerQueryClient {
    /// Create a client with an explicit data source table.
    pub fn new(client: Arc<WorkerClient>, connections: HashMap<String, ConnectionParams>) -> Self {
        Self {
            client,
            connections,
        }
    }

    /// Create a client from every configured connection.
    ///
    /// Connection strings have `${VAR}` references expanded up front, so a
    /// missing environment variable fails here rather than mid-load.
    pub fn from_settings(
        client: Arc<WorkerClient>,
        settings: &Settings,
    ) -> Result<Self, SettingsError> {
        let mut connections = HashMap::with_capacity(settings.connections.len());
        for (name, conn) in &settings.connections {
            connections.insert(
                name.clone(),
                ConnectionParams {
                    driver: conn.driver.clone(),
                    connection_string: conn.resolved_connection_string()?,
                },
            );
        }
        Ok(Self::new(client, connections))
    }

    fn connection(&self, data_source: &str) -> QueryResult<&ConnectionParams> {
        self.connections
            .get(data_source)
            .ok_or_else(|| QueryError::backend(format!("unknown data source: {data_source}")))
    }
}

#[async_trait]
impl QueryClient for WorkerQueryClient {
    async fn execute(&self, data_source: &str, sql: &str) -> QueryResult<ResultSet> {
        let conn = self.connection(data_source)?;
        debug!(data_source, driver = %conn.driver, "executing query via worker");

        match self
            .client
            .execute_query(&conn.driver, &conn.connection_string, sql)
            .await
        {
            Ok(response) => Ok(response.into()),
            Err(err) => {
                if err.is_worker_exited() {
                    warn!(data_source, "query worker exited; remaining probes will fail");
                }
                Err(err.into())
            }
        }
    }
}
