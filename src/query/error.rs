//! Query client error types.

use thiserror::Error;

use crate::worker::WorkerError;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised by a [`QueryClient`](super::QueryClient).
#[derive(Error, Debug)]
pub enum QueryError {
    /// The query worker failed or rejected the request.
    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// The backing service reported a failure.
    #[error("query backend error: {0}")]
    Backend(String),

    /// A blocking call was cancelled or panicked before returning.
    #[error("blocking query task failed: {0}")]
    Join(String),
}

impl QueryError {
    /// Create a backend error from any displayable message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

impl From<tokio::task::JoinError> for QueryError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Join(err.to_string())
    }
}
