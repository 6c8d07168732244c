use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use super::{MetadataStore, SearchFilter};
use crate::core::error::{AppError, Result};
use crate::features::files::dtos::FileSortBy;
use crate::features::files::models::{FileRecord, NewFileRecord};

/// Metadata store over a `Vec`, mirroring the PostgreSQL semantics.
///
/// Text orderings (`name`, `path`) compare bytes, whereas PostgreSQL sorts by
/// the database collation. Tests should only rely on orderings both agree on.
#[derive(Default)]
pub struct InMemoryFileStore {
    records: Mutex<Vec<FileRecord>>,
    fail_writes: AtomicBool,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn all(&self) -> Vec<FileRecord> {
        self.records.lock().unwrap().clone()
    }
}

/// Byte-wise text comparison; see the note on [`InMemoryFileStore`]
fn sort_records(records: &mut [FileRecord], order_by: FileSortBy) {
    records.sort_by(|a, b| {
        let primary = match order_by {
            FileSortBy::Id => std::cmp::Ordering::Equal,
            FileSortBy::Name => a.name.cmp(&b.name),
            FileSortBy::CreatedAt => a.created_at.cmp(&b.created_at),
            FileSortBy::Path => a.path.cmp(&b.path),
            FileSortBy::Size => a.size.cmp(&b.size),
        };
        primary.then(a.id.cmp(&b.id))
    });
}

#[async_trait]
impl MetadataStore for InMemoryFileStore {
    async fn upsert_by_path(&self, record: NewFileRecord) -> Result<FileRecord> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.account_id == record.account_id && r.path == record.path)
        {
            let id = existing.id;
            *existing = FileRecord {
                id,
                ..FileRecord::from(record)
            };
            return Ok(existing.clone());
        }

        let stored = FileRecord::from(record);
        records.push(stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: Uuid, account_id: &str) -> Result<Option<FileRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && r.account_id == account_id)
            .cloned())
    }

    async fn get_by_path(&self, path: &str, account_id: &str) -> Result<Option<FileRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.path == path && r.account_id == account_id)
            .cloned())
    }

    async fn list_by_path_prefix(
        &self,
        prefix: &str,
        account_id: &str,
    ) -> Result<Vec<FileRecord>> {
        let mut files: Vec<FileRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.account_id == account_id && r.path.starts_with(prefix))
            .cloned()
            .collect();
        sort_records(&mut files, FileSortBy::Id);
        Ok(files)
    }

    async fn list_by_account(
        &self,
        account_id: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<FileRecord>> {
        let mut files: Vec<FileRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.account_id == account_id)
            .cloned()
            .collect();
        sort_records(&mut files, FileSortBy::Id);
        Ok(files
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn search(&self, account_id: &str, filter: &SearchFilter) -> Result<Vec<FileRecord>> {
        let mut files: Vec<FileRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.account_id == account_id)
            .filter(|r| {
                filter
                    .path_prefix
                    .as_deref()
                    .map_or(true, |prefix| r.path.starts_with(prefix))
            })
            .filter(|r| {
                filter
                    .extension
                    .as_deref()
                    .map_or(true, |ext| r.extension.contains(ext))
            })
            .filter(|r| filter.clause.matches(r))
            .cloned()
            .collect();
        sort_records(&mut files, filter.order_by);
        files.truncate(filter.limit.max(0) as usize);
        Ok(files)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::services::SearchClause;
    use fake::{Fake, Faker};
    use std::sync::Arc;

    fn filter(path_prefix: Option<&str>, clause: SearchClause) -> SearchFilter {
        SearchFilter {
            path_prefix: path_prefix.map(str::to_string),
            extension: None,
            clause,
            order_by: FileSortBy::Id,
            limit: 100,
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let store = InMemoryFileStore::new();

        let first = store
            .upsert_by_path(NewFileRecord::for_upload("acct", "a/b.txt", 100, "text/plain"))
            .await
            .unwrap();
        let second = store
            .upsert_by_path(NewFileRecord::for_upload("acct", "a/b.txt", 200, "text/csv"))
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.size, 200);
        assert_eq!(second.content_type, "text/csv");
        assert!(second.created_at >= first.created_at);
        assert_eq!(store.all().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_leave_one_row() {
        let store = Arc::new(InMemoryFileStore::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .upsert_by_path(NewFileRecord::for_upload("acct", "same.bin", i, "x/y"))
                        .await
                })
            })
            .collect();
        for handle in handles {
            tokio_test::assert_ok!(handle.await.unwrap());
        }

        assert_eq!(store.all().len(), 1);
    }

    #[tokio::test]
    async fn test_same_path_in_two_accounts_is_two_rows() {
        let store = InMemoryFileStore::new();
        let other: String = Faker.fake();

        store
            .upsert_by_path(NewFileRecord::for_upload("acct", "a.txt", 1, "text/plain"))
            .await
            .unwrap();
        store
            .upsert_by_path(NewFileRecord::for_upload(&other, "a.txt", 2, "text/plain"))
            .await
            .unwrap();

        assert_eq!(store.all().len(), 2);
        let mine = store.get_by_path("a.txt", "acct").await.unwrap().unwrap();
        assert_eq!(mine.size, 1);
    }

    #[tokio::test]
    async fn test_prefix_listing_is_account_scoped() {
        let store = InMemoryFileStore::new();
        for (account, path) in [
            ("acct", "docs/a.txt"),
            ("acct", "docs/sub/b.txt"),
            ("acct", "docsx/c.txt"),
            ("acct", "other/d.txt"),
            ("intruder", "docs/e.txt"),
        ] {
            store
                .upsert_by_path(NewFileRecord::for_upload(account, path, 1, "text/plain"))
                .await
                .unwrap();
        }

        let mut paths: Vec<String> = store
            .list_by_path_prefix("docs/", "acct")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.path)
            .collect();
        paths.sort();

        assert_eq!(paths, vec!["docs/a.txt", "docs/sub/b.txt"]);
    }

    #[tokio::test]
    async fn test_empty_query_equals_structural_filtering() {
        let store = InMemoryFileStore::new();
        for path in ["docs/a.txt", "docs/b.pdf", "img/c.png"] {
            store
                .upsert_by_path(NewFileRecord::for_upload("acct", path, 1, "x/y"))
                .await
                .unwrap();
        }

        let with_empty_query = store
            .search("acct", &filter(Some("docs/"), SearchClause::build("", false).unwrap()))
            .await
            .unwrap();
        let structural_only = store
            .search("acct", &filter(Some("docs/"), SearchClause::MatchAll))
            .await
            .unwrap();

        assert_eq!(with_empty_query, structural_only);
        assert_eq!(with_empty_query.len(), 2);
    }

    #[tokio::test]
    async fn test_search_orders_and_limits() {
        let store = InMemoryFileStore::new();
        for (path, size) in [("b.txt", 30), ("a.txt", 10), ("c.txt", 20)] {
            store
                .upsert_by_path(NewFileRecord::for_upload("acct", path, size, "text/plain"))
                .await
                .unwrap();
        }

        let mut by_size = filter(None, SearchClause::MatchAll);
        by_size.order_by = FileSortBy::Size;
        by_size.limit = 2;

        let sizes: Vec<i64> = store
            .search("acct", &by_size)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.size)
            .collect();
        assert_eq!(sizes, vec![10, 20]);
    }

    #[tokio::test]
    async fn test_name_ordering_is_bytewise() {
        let store = InMemoryFileStore::new();
        for path in ["b.txt", "B.txt", "a.txt"] {
            store
                .upsert_by_path(NewFileRecord::for_upload("acct", path, 1, "text/plain"))
                .await
                .unwrap();
        }

        let mut by_name = filter(None, SearchClause::MatchAll);
        by_name.order_by = FileSortBy::Name;

        let names: Vec<String> = store
            .search("acct", &by_name)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["B.txt", "a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_list_by_account_pages() {
        let store = InMemoryFileStore::new();
        for i in 0..5 {
            store
                .upsert_by_path(NewFileRecord::for_upload("acct", &format!("f{}.txt", i), i, "t/p"))
                .await
                .unwrap();
        }

        let page = store.list_by_account("acct", 1, 2).await.unwrap();
        let all = store.list_by_account("acct", 0, 100).await.unwrap();

        assert_eq!(all.len(), 5);
        assert_eq!(page, all[1..3].to_vec());
        assert!(store.list_by_account("acct", 0, 0).await.unwrap().is_empty());
    }
}
