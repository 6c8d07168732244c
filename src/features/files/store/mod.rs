//! Persistence of file metadata records

mod postgres;

#[cfg(test)]
mod memory;

pub use postgres::PgFileStore;

#[cfg(test)]
pub use memory::InMemoryFileStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::files::dtos::FileSortBy;
use crate::features::files::models::{FileRecord, NewFileRecord};
use crate::features::files::services::SearchClause;

/// Structural filters and free-text clause of a search
#[derive(Debug, Clone)]
pub struct SearchFilter {
    /// Keep records whose path starts with this literal prefix
    pub path_prefix: Option<String>,
    /// Keep records whose extension contains this literal substring
    pub extension: Option<String>,
    pub clause: SearchClause,
    pub order_by: FileSortBy,
    pub limit: i64,
}

/// The file-record table. Every read is scoped to one account.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert, or overwrite every mutable field (including `created_at`) of the
    /// record already at `(account_id, path)`. The existing `id` is kept.
    async fn upsert_by_path(&self, record: NewFileRecord) -> Result<FileRecord>;

    async fn get_by_id(&self, id: Uuid, account_id: &str) -> Result<Option<FileRecord>>;

    async fn get_by_path(&self, path: &str, account_id: &str) -> Result<Option<FileRecord>>;

    async fn list_by_path_prefix(&self, prefix: &str, account_id: &str)
        -> Result<Vec<FileRecord>>;

    /// Page through an account's records in primary-key order
    async fn list_by_account(
        &self,
        account_id: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<FileRecord>>;

    async fn search(&self, account_id: &str, filter: &SearchFilter) -> Result<Vec<FileRecord>>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<()>;
}
