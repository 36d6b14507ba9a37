use crate::{LocalStorage, S3Storage, Storage, StorageResult};
use clearcut_core::{Config, StorageBackend};
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        StorageBackend::S3 => Ok(Arc::new(S3Storage::new().await)),
        StorageBackend::Local => {
            let storage = LocalStorage::new(&config.local_storage_path).await?;
            Ok(Arc::new(storage))
        }
    }
}
