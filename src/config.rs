// src/config.rs

//! Configuration loading utilities.
//!
//! The CLI reads a local TOML file; on Lambda the file may live in S3.
//! Environment overrides are applied last in both cases.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Local config path used when nothing else is configured.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Load configuration from a TOML file and apply environment overrides.
///
/// Falls back to defaults if the file cannot be read, so a deployment may
/// be configured from the environment alone.
pub fn load_config(path: &Path) -> Config {
    let mut config = Config::load_or_default(path);
    config.apply_env_overrides();
    config
}

/// Load configuration for a deployed run.
///
/// Reads `CONFIG_S3_BUCKET`/`CONFIG_S3_KEY` when both are set (feature
/// `s3`), otherwise the file at `CONFIG_PATH`.
pub async fn load_runtime_config() -> Result<Config> {
    #[cfg(feature = "s3")]
    if let Some(loader) = s3::S3ConfigLoader::from_env().await {
        let mut config = loader.load().await?;
        config.apply_env_overrides();
        return Ok(config);
    }

    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    Ok(load_config(Path::new(&path)))
}

#[cfg(feature = "s3")]
pub mod s3 {
    //! Config loader for the Lambda environment.

    use aws_sdk_s3::Client;

    use crate::error::{AppError, Result};
    use crate::models::Config;

    pub struct S3ConfigLoader {
        client: Client,
        bucket: String,
        key: String,
    }

    impl S3ConfigLoader {
        pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
            Self {
                client,
                bucket: bucket.into(),
                key: key.into(),
            }
        }

        /// `None` unless both `CONFIG_S3_BUCKET` and `CONFIG_S3_KEY` are set.
        pub async fn from_env() -> Option<Self> {
            let bucket = std::env::var("CONFIG_S3_BUCKET").ok()?;
            let key = std::env::var("CONFIG_S3_KEY").ok()?;

            let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            Some(Self::new(Client::new(&config), bucket, key))
        }

        pub async fn load(&self) -> Result<Config> {
            log::info!("Loading config from s3://{}/{}", self.bucket, self.key);

            let output = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(&self.key)
                .send()
                .await
                .map_err(|e| AppError::S3(format!("{}: {}", self.key, e)))?;
            let bytes = output
                .body
                .collect()
                .await
                .map_err(|e| AppError::S3(e.to_string()))?
                .into_bytes();

            let content = String::from_utf8(bytes.to_vec()).map_err(|e| {
                AppError::config(format!("Config file {} is not valid UTF-8: {}", self.key, e))
            })?;
            Config::parse(&content)
        }
    }
}
