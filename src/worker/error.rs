//! Failures of the worker transport.

use std::io;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Why a probe sent through the query worker did not produce rows.
///
/// The first group covers the local side of the pipe (process, framing,
/// timeouts); the rest mirror the error codes the worker reports.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("could not start query worker: {0}")]
    SpawnFailed(#[source] io::Error),

    #[error("could not send probe to query worker: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("could not encode worker request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    #[error("could not decode worker reply: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    /// No reply within the per-request bound, in seconds.
    #[error("query worker did not reply within {0}s")]
    Timeout(u64),

    /// The reply slot was dropped without an answer.
    #[error("query worker reply channel closed")]
    ChannelClosed,

    /// A worker error code with no dedicated variant.
    #[error("query worker error {code}: {message}")]
    Remote { code: String, message: String },

    /// `DRIVER_NOT_FOUND`
    #[error("no driver for data source: {0}")]
    DriverNotFound(String),

    /// `CONNECTION_FAILED`
    #[error("could not connect to data source: {0}")]
    ConnectionFailed(String),

    /// `QUERY_FAILED`
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// `INVALID_REQUEST`
    #[error("worker rejected request: {0}")]
    InvalidRequest(String),

    /// `METHOD_NOT_FOUND`
    #[error("worker does not support method: {0}")]
    MethodNotFound(String),
}

impl WorkerError {
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// True when the worker process is gone and later probes will fail too.
    pub fn is_worker_exited(&self) -> bool {
        match self {
            Self::ChannelClosed => true,
            Self::Remote { code, .. } => code == "WORKER_EXITED",
            _ => false,
        }
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for WorkerError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::ChannelClosed
    }
}
