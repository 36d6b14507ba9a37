//! Configuration module
//!
//! Runtime configuration is read from the process environment. The PhotoRoom
//! credential is the only required value; everything else about the pipeline
//! (prefixes, extensions, output format) is a fixed constant.

use std::env;

use crate::storage_types::StorageBackend;

const DEFAULT_LOCAL_STORAGE_PATH: &str = "./data";

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// API key for the PhotoRoom segmentation service. Injected into the
    /// client at construction rather than read at call time.
    pub photoroom_api_key: String,
    /// Storage backend selection. Defaults to S3.
    pub storage_backend: StorageBackend,
    /// Root directory for the local storage backend.
    pub local_storage_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let photoroom_api_key = env::var("PHOTOROOM_API_KEY")
            .map_err(|_| anyhow::anyhow!("PHOTOROOM_API_KEY must be set"))?;

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::S3,
        };

        let local_storage_path = env::var("LOCAL_STORAGE_PATH")
            .unwrap_or_else(|_| DEFAULT_LOCAL_STORAGE_PATH.to_string());

        let config = Config {
            photoroom_api_key,
            storage_backend,
            local_storage_path,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.photoroom_api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("PHOTOROOM_API_KEY must not be empty"));
        }

        if self.storage_backend == StorageBackend::Local && self.local_storage_path.is_empty() {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH must be set when using local storage backend"
            ));
        }

        Ok(())
    }
}
