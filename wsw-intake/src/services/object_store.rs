//! Photo object store
//!
//! Blobs are stored under caller-chosen names. Names are generated from a fresh UUID plus the
//! original file extension so collisions are negligible; the store still refuses to overwrite.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::ServiceError;

const DEFAULT_EXTENSION: &str = "jpg";
const MAX_EXTENSION_LEN: usize = 8;

/// Binary blob storage returning durable public addresses
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `name` and return its public retrieval URL
    async fn upload(
        &self,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, ServiceError>;
}

/// Unique object name: random UUID plus an extension
///
/// The extension comes from the original file name when it has a sane one, otherwise from
/// the sniffed file type, otherwise `jpg`.
pub fn generate_object_name(original_name: &str, bytes: &[u8]) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LEN
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .or_else(|| infer::get(bytes).map(|kind| kind.extension().to_string()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    format!("{}.{}", Uuid::new_v4().simple(), extension)
}

/// Filesystem-backed [`ObjectStore`]
///
/// Files land in `root`; URLs are `<public_prefix>/<name>`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(
        &self,
        name: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, ServiceError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(ServiceError::Upload(format!("invalid object name: {:?}", name)));
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ServiceError::Upload(format!("create {}: {}", self.root.display(), e)))?;

        let path = self.root.join(name);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| ServiceError::Upload(format!("open {}: {}", path.display(), e)))?;

        file.write_all(bytes)
            .await
            .map_err(|e| ServiceError::Upload(format!("write {}: {}", path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| ServiceError::Upload(format!("flush {}: {}", path.display(), e)))?;

        tracing::debug!(
            object = %name,
            size = bytes.len(),
            content_type = %content_type,
            "Photo stored"
        );

        Ok(format!("{}/{}", self.public_prefix, name))
    }
}
