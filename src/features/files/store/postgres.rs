use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::{MetadataStore, SearchFilter};
use crate::core::error::{AppError, Result};
use crate::features::files::models::{FileRecord, NewFileRecord};
use crate::features::files::services::search_clause::escape_like;

/// PostgreSQL-backed metadata store
pub struct PgFileStore {
    pool: PgPool,
}

impl PgFileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Close every pooled connection; later calls fail
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Render the search statement for `account_id`
pub(crate) fn build_search_query<'a>(
    account_id: &'a str,
    filter: &'a SearchFilter,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(FileRecord::select_columns());
    qb.push(" FROM files WHERE account_id = ");
    qb.push_bind(account_id);

    if let Some(prefix) = filter.path_prefix.as_deref().filter(|p| !p.is_empty()) {
        qb.push(r" AND path LIKE ");
        qb.push_bind(format!("{}%", escape_like(prefix)));
        qb.push(r" ESCAPE '\'");
    }
    if let Some(extension) = filter.extension.as_deref().filter(|e| !e.is_empty()) {
        qb.push(r" AND extension LIKE ");
        qb.push_bind(format!("%{}%", escape_like(extension)));
        qb.push(r" ESCAPE '\'");
    }

    filter.clause.push_sql(&mut qb);

    qb.push(" ORDER BY ");
    qb.push(filter.order_by.as_column());
    if filter.order_by.as_column() != "id" {
        qb.push(" ASC, id");
    }
    qb.push(" ASC LIMIT ");
    qb.push_bind(filter.limit);

    qb
}

#[async_trait]
impl MetadataStore for PgFileStore {
    async fn upsert_by_path(&self, record: NewFileRecord) -> Result<FileRecord> {
        // One statement: concurrent writers on the same path serialize on the
        // unique index and the last one wins.
        let sql = format!(
            r#"
            INSERT INTO files (id, account_id, path, name, extension, size, content_type, is_downloadable, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (account_id, path) DO UPDATE SET
                name = EXCLUDED.name,
                extension = EXCLUDED.extension,
                size = EXCLUDED.size,
                content_type = EXCLUDED.content_type,
                is_downloadable = EXCLUDED.is_downloadable,
                created_at = EXCLUDED.created_at
            RETURNING {}
            "#,
            FileRecord::select_columns()
        );

        let file = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(record.id)
            .bind(&record.account_id)
            .bind(&record.path)
            .bind(&record.name)
            .bind(&record.extension)
            .bind(record.size)
            .bind(&record.content_type)
            .bind(record.is_downloadable)
            .bind(record.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert file record {}: {:?}", record.path, e);
                AppError::Database(e)
            })?;

        Ok(file)
    }

    async fn get_by_id(&self, id: Uuid, account_id: &str) -> Result<Option<FileRecord>> {
        let sql = format!(
            "SELECT {} FROM files WHERE id = $1 AND account_id = $2",
            FileRecord::select_columns()
        );

        let file = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch file by id {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        debug!("Lookup by id {}: found={}", id, file.is_some());
        Ok(file)
    }

    async fn get_by_path(&self, path: &str, account_id: &str) -> Result<Option<FileRecord>> {
        let sql = format!(
            "SELECT {} FROM files WHERE path = $1 AND account_id = $2",
            FileRecord::select_columns()
        );

        let file = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(path)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch file by path {}: {:?}", path, e);
                AppError::Database(e)
            })?;

        debug!("Lookup by path {}: found={}", path, file.is_some());
        Ok(file)
    }

    async fn list_by_path_prefix(
        &self,
        prefix: &str,
        account_id: &str,
    ) -> Result<Vec<FileRecord>> {
        let sql = format!(
            r"SELECT {} FROM files WHERE path LIKE $1 ESCAPE '\' AND account_id = $2 ORDER BY id",
            FileRecord::select_columns()
        );

        let files = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(format!("{}%", escape_like(prefix)))
            .bind(account_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list files under {}: {:?}", prefix, e);
                AppError::Database(e)
            })?;

        Ok(files)
    }

    async fn list_by_account(
        &self,
        account_id: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<FileRecord>> {
        let sql = format!(
            "SELECT {} FROM files WHERE account_id = $1 ORDER BY id OFFSET $2 LIMIT $3",
            FileRecord::select_columns()
        );

        let files = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(account_id)
            .bind(skip.max(0))
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list files: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(files)
    }

    async fn search(&self, account_id: &str, filter: &SearchFilter) -> Result<Vec<FileRecord>> {
        let mut qb = build_search_query(account_id, filter);
        debug!("Search SQL: {}", qb.sql());

        let files = qb
            .build_query_as::<FileRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from_search_error)?;

        Ok(files)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::dtos::FileSortBy;
    use crate::features::files::services::SearchClause;

    fn filter(clause: SearchClause) -> SearchFilter {
        SearchFilter {
            path_prefix: None,
            extension: None,
            clause,
            order_by: FileSortBy::Id,
            limit: 100,
        }
    }

    #[test]
    fn test_search_without_filters_is_account_scoped() {
        let filter = filter(SearchClause::MatchAll);
        let qb = build_search_query("acct", &filter);

        assert_eq!(
            qb.sql(),
            format!(
                "SELECT {} FROM files WHERE account_id = $1 ORDER BY id ASC LIMIT $2",
                FileRecord::select_columns()
            )
        );
    }

    #[test]
    fn test_search_with_structural_filters_and_order() {
        let mut filter = filter(SearchClause::MatchAll);
        filter.path_prefix = Some("docs/".to_string());
        filter.extension = Some("pd".to_string());
        filter.order_by = FileSortBy::Size;

        let qb = build_search_query("acct", &filter);
        let sql = qb.sql();

        assert!(sql.contains(r"AND path LIKE $2 ESCAPE '\'"));
        assert!(sql.contains(r"AND extension LIKE $3 ESCAPE '\'"));
        assert!(sql.ends_with("ORDER BY size ASC, id ASC LIMIT $4"));
    }

    #[test]
    fn test_empty_structural_filters_are_ignored() {
        let mut filter = filter(SearchClause::MatchAll);
        filter.path_prefix = Some(String::new());
        filter.extension = Some(String::new());

        let qb = build_search_query("acct", &filter);
        assert!(!qb.sql().contains("LIKE"));
    }

    #[test]
    fn test_free_text_clause_follows_structural_filters() {
        let mut filter = filter(SearchClause::build("report", false).unwrap());
        filter.path_prefix = Some("docs/".to_string());

        let qb = build_search_query("acct", &filter);
        let sql = qb.sql();

        assert!(sql.contains("AND (id::text ILIKE $3"));
        assert!(sql.contains("OR created_at::text ILIKE $11"));
        assert!(sql.ends_with("ORDER BY id ASC LIMIT $12"));
    }
}
