//! Configuration module for dumpcat.
//!
//! Handles the TOML config file, environment variable expansion, and the
//! catalog builder's tunables.

mod settings;

pub use settings::{
    expand_env_vars, CatalogSettings, ConnectionSettings, Settings, SettingsError, WorkerSettings,
    DEFAULT_INDEXED_SUFFIX_PATTERN, DEFAULT_MAX_DISTINCT_VALUES, DEFAULT_NOISE_COLUMNS,
};
