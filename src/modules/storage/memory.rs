use async_trait::async_trait;
use axum::body::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::blob_store::BlobStore;
use crate::core::error::{AppError, Result};

/// Blob store kept in a map, with switchable failures
#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    failing_keys: Mutex<HashSet<String>>,
    fail_puts: Mutex<bool>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(data, _)| data.clone())
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn fail_puts(&self, fail: bool) {
        *self.fail_puts.lock().unwrap() = fail;
    }

    pub fn fail_get(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        if *self.fail_puts.lock().unwrap() {
            return Err(AppError::UploadFailed(format!("'{}': simulated outage", key)));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(AppError::DownloadFailed(format!("'{}': simulated outage", key)));
        }
        self.object(key)
            .ok_or_else(|| AppError::DownloadFailed(format!("'{}': HTTP 404", key)))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
