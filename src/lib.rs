//! # dumpcat
//!
//! Concurrent metadata catalog builder for perception-evaluation dump tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        GroupInput (datasets + four table groups)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [catalog::GroupCatalogLoader]
//! ┌─────────────────────────────────────────────────────────┐
//! │     four concurrent units, one exemplar table each       │
//! │     schema probe -> noise filter -> distinct probe       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [query::QueryClient]
//! ┌─────────────────────────────────────────────────────────┐
//! │        query worker / blocking backend / test double     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │   Catalog: column types, filter options, value lists     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod config;
pub mod query;
pub mod sql;
pub mod worker;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{
        Catalog, CatalogError, CatalogOptions, FilterOption, GroupCatalogLoader, GroupInput,
        GroupKind, TableMetadata, TableReference,
    };
    pub use crate::config::Settings;
    pub use crate::query::{QueryClient, QueryError, ResultColumn, ResultSet};
}

pub use catalog::{Catalog, GroupCatalogLoader, GroupInput, GroupKind};
pub use query::QueryClient;
