//! Gateway configuration

use serde::{Deserialize, Serialize};

/// Default configuration constants
///
/// Centralized so the CLI, the library defaults, and the tests agree
/// on a single set of values.
pub mod defaults {

    /// Copy buffer size for uploads and downloads: 4 KiB.
    /// One progress tick is emitted per buffer-sized chunk.
    pub const COPY_CHUNK_SIZE: usize = 4096;

    /// Default log level
    pub const fn default_log_level() -> &'static str {
        "info"
    }

    /// Environment variable holding the endpoint URI
    pub const ENDPOINT_ENV: &str = "GATEFS_ENDPOINT";

    /// Environment variable holding the user identity
    pub const USER_ENV: &str = "GATEFS_USER";
}

/// Behavior of `create_file` when the path already exists.
///
/// The remote service default is deliberately not inherited; the
/// policy is an explicit, tested configuration choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Fail with a conflict when the path exists
    #[default]
    Deny,

    /// Replace the existing file's content
    Overwrite,
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Transfer settings
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Connection settings
///
/// Endpoint and user may be left empty in the file and supplied via
/// flags or environment variables instead.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConnectionConfig {
    /// Endpoint URI (`scheme://host:port`)
    #[serde(default)]
    pub endpoint: String,

    /// User identity to dial as
    #[serde(default)]
    pub user: String,
}

/// Transfer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Copy buffer size in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overwrite policy for file creation
    #[serde(default)]
    pub overwrite: OverwritePolicy,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: defaults::COPY_CHUNK_SIZE,
            overwrite: OverwritePolicy::default(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            transfer: TransferConfig::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_chunk_size() -> usize {
    defaults::COPY_CHUNK_SIZE
}

fn default_log_level() -> String {
    defaults::default_log_level().to_string()
}

impl GatewayConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("failed to read config file: {}", e)))?;

        let config: GatewayConfig = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self).map_err(|e| {
            ConfigError::SerializeError(format!("failed to serialize config: {}", e))
        })?;

        std::fs::write(path, contents)
            .map_err(|e| ConfigError::WriteError(format!("failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.transfer.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "transfer chunk size must be nonzero".to_string(),
            ));
        }

        // Endpoint may be filled in later by flags; when present in
        // the file it must at least parse.
        if !self.connection.endpoint.is_empty() {
            crate::store::Endpoint::parse(&self.connection.endpoint).map_err(|e| {
                ConfigError::ValidationError(format!("invalid endpoint: {}", e))
            })?;
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "invalid log level: {}",
                    other
                )));
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadError(String),

    #[error("failed to parse config: {0}")]
    ParseError(String),

    #[error("failed to serialize config: {0}")]
    SerializeError(String),

    #[error("failed to write config: {0}")]
    WriteError(String),

    #[error("configuration validation error: {0}")]
    ValidationError(String),
}
