//! Worker communication module.
//!
//! This module provides async communication with the external query worker
//! process. The worker owns database drivers and connection pools; this crate
//! only sends it SQL text and receives tabular results.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   dumpcat (Rust + Tokio)                        │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │  WorkerQueryClient  ->  WorkerClient (Async)              │  │
//! │  │  - Spawns the worker as child process                     │  │
//! │  │  - NDJSON protocol over stdin/stdout                      │  │
//! │  │  - Request IDs for concurrent request correlation         │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                              │                                   │
//! │               stdin (NDJSON) │ stdout (NDJSON)                  │
//! │                              ▼                                   │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │               Query Worker (Long-Running Child Process)         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dumpcat::worker::WorkerClient;
//!
//! let client = WorkerClient::spawn("./dumpcat-worker").await?;
//! let response = client
//!     .execute_query("athena", "region=eu-west-1", "SELECT * FROM (t1) LIMIT 1")
//!     .await?;
//!
//! // Client is automatically shut down on drop
//! ```

mod client;
mod error;
pub mod protocol;
mod query_client;

pub use client::WorkerClient;
pub use error::{WorkerError, WorkerResult};
pub use query_client::WorkerQueryClient;
