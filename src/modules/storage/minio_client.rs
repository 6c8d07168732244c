//! MinIO/S3-compatible storage client
//!
//! Uses rust-s3 for lightweight S3 operations with path-style addressing.

use async_trait::async_trait;
use axum::body::Bytes;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::blob_store::BlobStore;
use crate::core::config::MinIOConfig;
use crate::core::error::{AppError, Result};

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
}

impl MinIOClient {
    /// Create a new MinIO client and make sure its bucket exists
    pub async fn new(config: MinIOConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // http://endpoint/bucket instead of http://bucket.endpoint
        bucket.set_path_style();

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
        };

        client.ensure_bucket_exists().await;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}",
            client.endpoint,
            client.bucket.name()
        );

        Ok(client)
    }

    /// Create the bucket unless it already exists.
    ///
    /// Creation errors other than "already exists" are logged, not fatal: the
    /// credentials may lack `CreateBucket` while the bucket is already there.
    async fn ensure_bucket_exists(&self) {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => info!("Bucket '{}' created successfully", self.bucket.name()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
            }
        }
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

fn is_success(status_code: u16) -> bool {
    (200..300).contains(&status_code)
}

#[async_trait]
impl BlobStore for MinIOClient {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::UploadFailed(format!("'{}': {}", key, e)))?;

        if !is_success(response.status_code()) {
            return Err(AppError::UploadFailed(format!(
                "'{}': HTTP {}",
                key,
                response.status_code()
            )));
        }

        debug!(
            "Uploaded object '{}' ({} bytes) to bucket '{}'",
            key,
            data.len(),
            self.bucket.name()
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| AppError::DownloadFailed(format!("'{}': {}", key, e)))?;

        if !is_success(response.status_code()) {
            return Err(AppError::DownloadFailed(format!(
                "'{}': HTTP {}",
                key,
                response.status_code()
            )));
        }

        debug!(
            "Downloaded object '{}' from bucket '{}'",
            key,
            self.bucket.name()
        );
        Ok(response.bytes().clone())
    }

    async fn ping(&self) -> Result<()> {
        match self.bucket.exists().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::Internal(format!(
                "Bucket '{}' does not exist",
                self.bucket.name()
            ))),
            Err(e) => Err(AppError::Internal(format!(
                "MinIO health check failed: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success() {
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(!is_success(304));
        assert!(!is_success(404));
        assert!(!is_success(500));
    }
}
