//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field has a default so a missing file still yields a
//! usable configuration.

pub mod database;
pub mod logging;
pub mod storage;
pub mod upload;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::StorageConfig;
pub use self::upload::UploadConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides (`VAULTSHARE__STORAGE__ROOT_PATH`).
pub const ENV_PREFIX: &str = "VAULTSHARE";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Metadata database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Upload policy settings.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Merges `config/default.toml` (if present), the given file (if
    /// present), and environment variables prefixed with `VAULTSHARE__`.
    pub fn load(config_path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the pipeline misbehave.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.storage.io_retries > 1 {
            return Err(AppError::configuration(
                "storage.io_retries must be 0 or 1",
            ));
        }
        if self.upload.chunk_size_bytes == 0 {
            return Err(AppError::configuration(
                "upload.chunk_size_bytes must be greater than zero",
            ));
        }
        if self.upload.max_chunks == 0 {
            return Err(AppError::configuration(
                "upload.max_chunks must be greater than zero",
            ));
        }
        if self.upload.allowed_mime_types.is_empty() {
            return Err(AppError::configuration(
                "upload.allowed_mime_types must not be empty",
            ));
        }
        Ok(())
    }
}
