use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::constants::PATH_SEPARATOR;

/// Database model for a stored file's metadata (table `files`)
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct FileRecord {
    pub id: Uuid,
    pub account_id: String,
    pub path: String,
    pub name: String,
    pub extension: String,
    pub size: i64,
    pub content_type: String,
    pub is_downloadable: bool,
    pub created_at: DateTime<Utc>,
}

/// A column of `files`, with its value rendered as text.
///
/// `as_text` mirrors PostgreSQL's `column::text` closely enough for in-process
/// matching; exact timestamp formatting differs.
pub struct FileColumn {
    pub name: &'static str,
    pub as_text: fn(&FileRecord) -> String,
}

/// Every column of `files`, in table order.
///
/// Drives both the `SELECT` list and free-text search, so a column added here
/// is fetched and searchable at once.
pub static FILE_COLUMNS: &[FileColumn] = &[
    FileColumn {
        name: "id",
        as_text: |r| r.id.to_string(),
    },
    FileColumn {
        name: "account_id",
        as_text: |r| r.account_id.clone(),
    },
    FileColumn {
        name: "path",
        as_text: |r| r.path.clone(),
    },
    FileColumn {
        name: "name",
        as_text: |r| r.name.clone(),
    },
    FileColumn {
        name: "extension",
        as_text: |r| r.extension.clone(),
    },
    FileColumn {
        name: "size",
        as_text: |r| r.size.to_string(),
    },
    FileColumn {
        name: "content_type",
        as_text: |r| r.content_type.clone(),
    },
    FileColumn {
        name: "is_downloadable",
        as_text: |r| r.is_downloadable.to_string(),
    },
    FileColumn {
        name: "created_at",
        as_text: |r| r.created_at.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string(),
    },
];

impl FileRecord {
    /// Comma-separated column list for `SELECT` / `RETURNING`
    pub fn select_columns() -> String {
        FILE_COLUMNS
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Validated input for an upsert-by-path.
///
/// Built only through [`NewFileRecord::for_upload`], which derives `name` and
/// `extension` from the final path.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFileRecord {
    pub id: Uuid,
    pub account_id: String,
    pub path: String,
    pub name: String,
    pub extension: String,
    pub size: i64,
    pub content_type: String,
    pub is_downloadable: bool,
    pub created_at: DateTime<Utc>,
}

impl NewFileRecord {
    pub fn for_upload(account_id: &str, path: &str, size: i64, content_type: &str) -> Self {
        let name = basename(path).to_string();
        let extension = extension_of(&name).to_string();

        Self {
            id: Uuid::now_v7(),
            account_id: account_id.to_string(),
            path: path.to_string(),
            name,
            extension,
            size,
            content_type: content_type.to_string(),
            is_downloadable: true,
            created_at: Utc::now(),
        }
    }
}

/// The row this input produces on first insert
impl From<NewFileRecord> for FileRecord {
    fn from(record: NewFileRecord) -> Self {
        FileRecord {
            id: record.id,
            account_id: record.account_id,
            path: record.path,
            name: record.name,
            extension: record.extension,
            size: record.size,
            content_type: record.content_type,
            is_downloadable: record.is_downloadable,
            created_at: record.created_at,
        }
    }
}

/// Last path segment
pub fn basename(path: &str) -> &str {
    path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)
}

/// Suffix after the last dot, without the dot. Dotfiles have no extension.
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx + 1..],
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        assert_eq!(basename("docs/report.pdf"), "report.pdf");
        assert_eq!(basename("report.pdf"), "report.pdf");
        assert_eq!(basename("a/b/c"), "c");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("report.pdf"), "pdf");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("Makefile"), "");
        assert_eq!(extension_of(".env"), "");
        assert_eq!(extension_of("trailing."), "");
    }

    #[test]
    fn test_for_upload_derives_name_and_extension() {
        let record = NewFileRecord::for_upload("acct", "docs/report.pdf", 1024, "application/pdf");

        assert_eq!(record.path, "docs/report.pdf");
        assert_eq!(record.name, "report.pdf");
        assert_eq!(record.extension, "pdf");
        assert_eq!(record.size, 1024);
        assert!(record.is_downloadable);
    }

    #[test]
    fn test_select_columns_cover_every_field() {
        assert_eq!(
            FileRecord::select_columns(),
            "id, account_id, path, name, extension, size, content_type, is_downloadable, created_at"
        );
    }
}
