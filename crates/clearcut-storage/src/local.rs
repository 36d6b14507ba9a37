use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Buckets map to directories under the base path. Content type and metadata
/// are persisted in a JSON sidecar next to each object, since the filesystem
/// has nowhere else to put them.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

/// Sidecar record holding what S3 would store as object attributes.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ObjectMeta {
    pub content_type: String,
    pub metadata: HashMap<String, String>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "./data")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    /// Convert a bucket and key to a filesystem path with security validation
    ///
    /// This function validates that neither component contains path traversal
    /// sequences that could escape the base storage directory.
    fn object_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        if bucket.contains("..")
            || bucket.starts_with('/')
            || key.contains("..")
            || key.starts_with('/')
        {
            return Err(StorageError::InvalidKey(
                "Bucket or key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(bucket).join(key))
    }

    /// Sidecar path for an object: `<object path>.meta.json`
    fn meta_path(path: &Path) -> PathBuf {
        let mut os_string = path.as_os_str().to_os_string();
        os_string.push(".meta.json");
        PathBuf::from(os_string)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Read back the sidecar attributes of a stored object.
    pub async fn object_meta(&self, bucket: &str, key: &str) -> StorageResult<ObjectMeta> {
        let path = self.object_path(bucket, key)?;
        let meta_path = Self::meta_path(&path);

        if !fs::try_exists(&meta_path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(format!("{}/{}", bucket, key)));
        }

        let raw = fs::read(&meta_path).await.map_err(|e| {
            StorageError::DownloadFailed(format!(
                "Failed to read metadata {}: {}",
                meta_path.display(),
                e
            ))
        })?;

        serde_json::from_slice(&raw).map_err(|e| {
            StorageError::DownloadFailed(format!(
                "Failed to parse metadata {}: {}",
                meta_path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(format!("{}/{}", bucket, key)));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let size = data.len();

        tracing::info!(
            path = %path.display(),
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(data)
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let meta = ObjectMeta {
            content_type: content_type.to_string(),
            metadata,
        };
        let meta_path = Self::meta_path(&path);
        let raw = serde_json::to_vec(&meta).map_err(|e| {
            StorageError::UploadFailed(format!("Failed to serialize metadata: {}", e))
        })?;

        fs::write(&meta_path, raw).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write metadata {}: {}",
                meta_path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %path.display(),
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }
}
