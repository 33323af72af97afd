//! Metadata catalog builder.
//!
//! Turns dataset names plus per-group table lists into a [`Catalog`]: for
//! each of the four table groups, the column types, filter options and
//! candidate values a UI needs to build filter widgets.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     GroupCatalogLoader                          │
//! │   meta_data   │  lm_meta_data  │  re_meta_data  │  pw_meta_data │
//! │      (four units polled concurrently, joined before return)     │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │ one exemplar table per group
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   TableMetadataExtractor                        │
//! │  1. schema probe       -> column types (lower-cased)            │
//! │  2. ColumnFilter       -> drop noise / indexed columns          │
//! │  3. options            -> filter options                        │
//! │  4. distinct probe     -> bounded candidate values              │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//!                    dyn QueryClient
//! ```

mod error;
mod extractor;
mod filter;
mod loader;
mod options;
mod types;

pub use error::{CatalogError, ExtractError, ExtractResult, GroupFailure, Probe};
pub use extractor::{CatalogOptions, TableMetadataExtractor};
pub use filter::ColumnFilter;
pub use loader::{GroupCatalogLoader, GroupOutcome, GroupOutcomes};
pub use options::{build_filter_options, column_label, distinct_value_options, LiteralQuoting};
pub use types::{
    Catalog, FilterOption, GroupInput, GroupKind, OrderedMap, TableMetadata, TableProfile,
    TableReference,
};
