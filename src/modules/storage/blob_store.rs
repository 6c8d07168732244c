use async_trait::async_trait;
use axum::body::Bytes;

use crate::core::error::Result;

/// Opaque byte storage keyed by object key.
///
/// `put` fails with `AppError::UploadFailed`, `get` with `AppError::DownloadFailed`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Check that the backend is reachable
    async fn ping(&self) -> Result<()>;
}
