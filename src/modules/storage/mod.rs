//! Object storage for file content
//!
//! `BlobStore` is the seam the file feature talks to; `MinIOClient` is the
//! MinIO/S3-compatible implementation used in production.

mod blob_store;
mod minio_client;

#[cfg(test)]
mod memory;

pub use blob_store::BlobStore;
pub use minio_client::MinIOClient;

#[cfg(test)]
pub use memory::InMemoryBlobStore;
