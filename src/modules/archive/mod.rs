//! Packaging of several stored files into one downloadable container

mod zip_archiver;

pub use zip_archiver::ZipArchiver;

use async_trait::async_trait;
use axum::body::Bytes;

use crate::core::error::Result;

/// One file inside an archive
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Name (may contain `/`) of the entry inside the archive
    pub name: String,
    pub content: Bytes,
}

#[async_trait]
pub trait Archiver: Send + Sync {
    /// Pack `entries` into a single container, in order
    async fn archive(&self, entries: Vec<ArchiveEntry>) -> Result<Bytes>;
}
