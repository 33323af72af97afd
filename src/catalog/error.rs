//! Catalog build errors.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use super::types::GroupKind;
use crate::query::QueryError;

/// Result type for single-table extraction.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Which of the two probe queries was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Schema,
    Distinct,
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::Schema => f.write_str("schema probe"),
            Probe::Distinct => f.write_str("distinct-values probe"),
        }
    }
}

/// Failure while deriving metadata for one table.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The query client failed.
    #[error("{probe} failed: {source}")]
    RemoteQuery {
        probe: Probe,
        #[source]
        source: QueryError,
    },

    /// The probe came back in a shape the extractor cannot read.
    #[error("{probe} returned a malformed result: {reason}")]
    MalformedResult { probe: Probe, reason: String },

    /// The group did not finish within the configured bound.
    #[error("group load timed out after {0:?}")]
    Timeout(Duration),
}

impl ExtractError {
    pub(crate) fn malformed(probe: Probe, reason: impl Into<String>) -> Self {
        Self::MalformedResult {
            probe,
            reason: reason.into(),
        }
    }

    /// The probe that failed, if the failure came from a probe.
    pub fn probe(&self) -> Option<Probe> {
        match self {
            Self::RemoteQuery { probe, .. } | Self::MalformedResult { probe, .. } => Some(*probe),
            Self::Timeout(_) => None,
        }
    }
}

/// One group's failure.
#[derive(Error, Debug)]
#[error("{group}: {error}")]
pub struct GroupFailure {
    pub group: GroupKind,
    #[source]
    pub error: ExtractError,
}

/// Failure of a whole catalog build.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// One or more groups failed; every failure is listed.
    #[error("catalog build failed for {}", describe(.0))]
    GroupsFailed(Vec<GroupFailure>),
}

impl CatalogError {
    pub fn failures(&self) -> &[GroupFailure] {
        match self {
            Self::GroupsFailed(failures) => failures,
        }
    }

    pub fn failed_groups(&self) -> Vec<GroupKind> {
        self.failures().iter().map(|f| f.group).collect()
    }
}

fn describe(failures: &[GroupFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.group, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}
