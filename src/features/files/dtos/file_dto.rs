use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::files::models::FileRecord;
use crate::shared::constants::DEFAULT_LIST_LIMIT;
use crate::shared::validation::validate_file_path;

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

/// Column search results are ordered by (ascending)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileSortBy {
    #[default]
    Id,
    Name,
    CreatedAt,
    Path,
    Size,
}

impl FileSortBy {
    pub fn as_column(&self) -> &'static str {
        match self {
            FileSortBy::Id => "id",
            FileSortBy::Name => "name",
            FileSortBy::CreatedAt => "created_at",
            FileSortBy::Path => "path",
            FileSortBy::Size => "size",
        }
    }
}

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// Target path. A trailing `/` stores the file under that directory using its own file name.
    #[schema(example = "docs/")]
    pub path: String,
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Stored file metadata
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileInfoDto {
    pub id: Uuid,
    /// Full logical path, e.g. `docs/report.pdf`
    pub path: String,
    pub name: String,
    /// Extension without the leading dot (empty if none)
    pub extension: String,
    /// Size in bytes
    pub size: i64,
    pub content_type: String,
    pub is_downloadable: bool,
    /// Upload time of the current content
    pub created_at: DateTime<Utc>,
}

impl From<FileRecord> for FileInfoDto {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
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

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileListResponseDto {
    pub account_id: String,
    pub files: Vec<FileInfoDto>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchFilesResponseDto {
    pub matches: Vec<FileInfoDto>,
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
pub struct ListFilesQuery {
    /// Records to skip
    #[serde(default)]
    #[validate(range(min = 0, message = "skip must be >= 0"))]
    #[param(minimum = 0)]
    pub skip: i64,

    /// Maximum records to return (default: 100)
    #[serde(default = "default_limit")]
    #[validate(range(min = 0, message = "limit must be >= 0"))]
    #[param(minimum = 0)]
    pub limit: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
pub struct DownloadQuery {
    /// File path, directory prefix ending in `/`, or file UUID
    #[validate(custom(function = "validate_file_path"))]
    pub path: String,

    /// Wrap the result in a zip archive even for a single file
    #[serde(default)]
    pub zipped: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
pub struct SearchFilesQuery {
    /// Only files whose path starts with this prefix
    pub path: Option<String>,

    /// Only files whose extension contains this text
    pub extension: Option<String>,

    /// Free text matched against every metadata field
    #[serde(default)]
    pub query: String,

    /// Treat `query` as a regular expression
    #[serde(default)]
    pub is_regex: bool,

    /// Sort column (ascending)
    #[serde(default)]
    #[param(inline)]
    pub order_by: FileSortBy,

    /// Maximum records to return (default: 100)
    #[serde(default = "default_limit")]
    #[validate(range(min = 0, message = "limit must be >= 0"))]
    #[param(minimum = 0)]
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_parses_snake_case() {
        let sort: FileSortBy = serde_json::from_str("\"created_at\"").unwrap();
        assert_eq!(sort, FileSortBy::CreatedAt);
        assert_eq!(sort.as_column(), "created_at");
        assert!(serde_json::from_str::<FileSortBy>("\"account_id\"").is_err());
    }

    #[test]
    fn test_list_query_rejects_negative_values() {
        let query = ListFilesQuery { skip: -1, limit: 10 };
        assert!(query.validate().is_err());

        let query = ListFilesQuery { skip: 0, limit: 0 };
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_download_query_validates_path() {
        let ok = DownloadQuery {
            path: "docs/".to_string(),
            zipped: false,
        };
        assert!(ok.validate().is_ok());

        let bad = DownloadQuery {
            path: "/etc/passwd".to_string(),
            zipped: false,
        };
        assert!(bad.validate().is_err());
    }
}
