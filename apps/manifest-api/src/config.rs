//! Configuration for the manifest service.
//!
//! Loaded from a YAML file with serde defaults for every field, so an empty
//! (or missing) file yields a runnable in-memory configuration. `${VAR}`
//! references in the database URL are interpolated from the environment at
//! load time, keeping credentials out of config files.
//!
//! # Usage
//!
//! ```rust,ignore
//! use manifest_api::config::load_config;
//!
//! // Load from default path (config.yaml), falling back to defaults
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::persistence::RetryPolicy;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("config validation failed: {0}")]
    ValidationError(String),

    /// Missing required environment variable.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Store selection and connection parameters.
    #[serde(default)]
    pub store: StoreConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Bound on a single store call, in seconds.
    #[serde(default = "default_operation_deadline_secs")]
    pub operation_deadline_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            operation_deadline_secs: default_operation_deadline_secs(),
        }
    }
}

/// Which store backend to wire at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process volatile store.
    Memory,
    /// CockroachDB-backed durable store.
    Cockroach,
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Selected backend.
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    /// Connection URL for the durable backend. Supports `${VAR}`
    /// interpolation from the environment.
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Connection pool size for the durable backend.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Serializable-transaction retry policy for the durable backend.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            retry: RetryPolicy::default(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

const fn default_operation_deadline_secs() -> u64 {
    10
}

const fn default_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_database_url() -> String {
    "postgresql://root@localhost:26257/manifest?sslmode=disable".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

/// Load configuration from `path` (default `config.yaml`).
///
/// A missing file at the default path is not an error; defaults apply. A
/// missing file at an explicitly requested path is.
///
/// # Errors
///
/// Returns a [`ConfigError`] on unreadable files, malformed YAML, missing
/// interpolation variables, or invalid values.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let explicit = path.is_some();
    let path = path.unwrap_or("config.yaml");

    let mut config = match std::fs::read_to_string(path) {
        Ok(raw) => serde_yaml_bw::from_str(&raw)?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !explicit => Config::default(),
        Err(source) => {
            return Err(ConfigError::ReadError {
                path: path.to_string(),
                source,
            });
        }
    };

    config.store.database_url = interpolate_env(&config.store.database_url)?;
    validate(&config)?;
    Ok(config)
}

/// Replace `${VAR}` references with environment values.
fn interpolate_env(raw: &str) -> Result<String, ConfigError> {
    interpolate_with(raw, |var| std::env::var(var).ok())
}

fn interpolate_with(
    raw: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            return Err(ConfigError::ValidationError(format!(
                "unterminated ${{...}} reference in '{raw}'"
            )));
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + end];
        let value = lookup(var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))?;
        out.push_str(&value);
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.listen_addr.parse::<std::net::SocketAddr>().is_err() {
        return Err(ConfigError::ValidationError(format!(
            "invalid listen address '{}'",
            config.server.listen_addr
        )));
    }
    if config.server.operation_deadline_secs == 0 {
        return Err(ConfigError::ValidationError(
            "operation_deadline_secs must be positive".to_string(),
        ));
    }
    if config.store.backend == StoreBackend::Cockroach {
        if config.store.database_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "database_url is required for the cockroach backend".to_string(),
            ));
        }
        if config.store.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "max_connections must be positive".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: Config = serde_yaml_bw::from_str("{}").unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.server.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.store.retry.max_attempts, 5);
    }

    #[test]
    fn backend_parses_lowercase() {
        let config: Config = serde_yaml_bw::from_str(
            "store:\n  backend: cockroach\n  database_url: postgresql://localhost/x\n",
        )
        .unwrap();
        assert_eq!(config.store.backend, StoreBackend::Cockroach);
    }

    #[test]
    fn retry_policy_overrides_nest_under_store() {
        let config: Config = serde_yaml_bw::from_str(
            "store:\n  retry:\n    max_attempts: 2\n    leading_statement: null\n",
        )
        .unwrap();
        assert_eq!(config.store.retry.max_attempts, 2);
        assert_eq!(config.store.retry.leading_statement, None);
    }

    #[test]
    fn interpolation_substitutes_references() {
        let out = interpolate_with(
            "postgresql://app:${DB_PASSWORD}@db:26257/manifest",
            |var| (var == "DB_PASSWORD").then(|| "hunter2".to_string()),
        )
        .unwrap();
        assert_eq!(out, "postgresql://app:hunter2@db:26257/manifest");
    }

    #[test]
    fn missing_interpolation_variable_is_an_error() {
        let result = interpolate_env("${MANIFEST_TEST_UNSET_VARIABLE}");
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
    }

    #[test]
    fn unterminated_reference_is_an_error() {
        let result = interpolate_with("postgresql://${DB_HOST/x", |_| None);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn invalid_listen_addr_fails_validation() {
        let config = Config {
            server: ServerConfig {
                listen_addr: "not-an-address".to_string(),
                ..ServerConfig::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn zero_deadline_fails_validation() {
        let config = Config {
            server: ServerConfig {
                operation_deadline_secs: 0,
                ..ServerConfig::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
