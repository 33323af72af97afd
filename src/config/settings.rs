//! TOML-based configuration for dumpcat.
//!
//! Supports a config file (dumpcat.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connections.athena]
//! driver = "athena"
//! connection_string = "${ATHENA_CONNECTION_STRING}"
//!
//! [worker]
//! path = "/opt/dumpcat/dumpcat-worker"
//! timeout_secs = 60
//!
//! [catalog]
//! data_source = "athena"
//! max_distinct_values = 30
//! group_timeout_secs = 120
//! noise_columns = ["s3_path", "pred_name", "dump_name", "population", "grabindex"]
//! indexed_suffix_pattern = '[_.]\d+$'
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default cap on distinct values kept per column.
pub const DEFAULT_MAX_DISTINCT_VALUES: usize = 30;

/// Columns that never make useful filters.
pub const DEFAULT_NOISE_COLUMNS: &[&str] =
    &["s3_path", "pred_name", "dump_name", "population", "grabindex"];

/// Positional/indexed field names such as `lane_0` or `obj.3`.
pub const DEFAULT_INDEXED_SUFFIX_PATTERN: &str = r"[_.]\d+$";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named data sources.
    pub connections: HashMap<String, ConnectionSettings>,

    /// Worker configuration.
    pub worker: WorkerSettings,

    /// Catalog builder configuration.
    pub catalog: CatalogSettings,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Driver name understood by the worker.
    pub driver: String,

    /// Connection string (supports ${ENV_VAR} expansion).
    pub connection_string: String,
}

impl ConnectionSettings {
    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to worker binary.
    pub path: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Extra command-line arguments for the worker.
    pub args: Vec<String>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: 30,
            args: Vec::new(),
        }
    }
}

/// Catalog builder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Data source every probe runs against.
    pub data_source: String,

    /// Distinct values kept per string column.
    pub max_distinct_values: usize,

    /// Column names excluded from the catalog.
    pub noise_columns: Vec<String>,

    /// Regex for indexed column names excluded from the catalog.
    pub indexed_suffix_pattern: String,

    /// Upper bound on one group's load, in seconds.
    pub group_timeout_secs: u64,

    /// Double embedded single quotes in distinct-value literals.
    pub escape_literals: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            data_source: "default".to_string(),
            max_distinct_values: DEFAULT_MAX_DISTINCT_VALUES,
            noise_columns: DEFAULT_NOISE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            indexed_suffix_pattern: DEFAULT_INDEXED_SUFFIX_PATTERN.to_string(),
            group_timeout_secs: 120,
            escape_literals: false,
        }
    }
}

impl CatalogSettings {
    pub fn group_timeout(&self) -> Duration {
        Duration::from_secs(self.group_timeout_secs)
    }

    /// Check the values a bad config file could get wrong.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_distinct_values == 0 {
            return Err(SettingsError::InvalidConfig(
                "catalog.max_distinct_values must be at least 1".to_string(),
            ));
        }
        if self.group_timeout_secs == 0 {
            return Err(SettingsError::InvalidConfig(
                "catalog.group_timeout_secs must be at least 1".to_string(),
            ));
        }
        regex::Regex::new(&self.indexed_suffix_pattern).map_err(|e| {
            SettingsError::InvalidConfig(format!("catalog.indexed_suffix_pattern: {e}"))
        })?;
        Ok(())
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.catalog.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `DUMPCAT_CONFIG`
    /// 2. `./dumpcat.toml`
    /// 3. `~/.config/dumpcat/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("DUMPCAT_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("dumpcat.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("dumpcat").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Get the worker binary path.
    ///
    /// Returns the configured path, or searches common locations and PATH.
    pub fn worker_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.worker.path {
            let expanded = expand_env_vars(path).ok()?;
            return Some(PathBuf::from(expanded));
        }

        let candidates = ["./dumpcat-worker", "./worker/dumpcat-worker"];
        for candidate in candidates {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }

        env::var_os("PATH").and_then(|paths| {
            env::split_paths(&paths)
                .map(|dir| dir.join("dumpcat-worker"))
                .find(|path| path.is_file())
        })
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name: String = std::iter::from_fn(|| chars.next_if(|&ch| ch != '}')).collect();
            let _ = chars.next_if_eq(&'}');
            name
        } else {
            // $VAR ends at non-alphanumeric/underscore
            std::iter::from_fn(|| chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_')).collect()
        };

        if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
