use axum::body::Bytes;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::SearchFilesQuery;
use crate::features::files::models::{basename, FileRecord, NewFileRecord};
use crate::features::files::services::{resolve, Resolved, SearchClause};
use crate::features::files::store::{MetadataStore, SearchFilter};
use crate::modules::archive::{ArchiveEntry, Archiver};
use crate::modules::storage::BlobStore;
use crate::shared::constants::{
    FALLBACK_CONTENT_TYPE, PATH_SEPARATOR, ZIP_CONTENT_TYPE, ZIP_FILE_NAME,
};
use crate::shared::validation::validate_file_path;

/// An upload as received from the client
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Target path; a trailing `/` means "inside this directory"
    pub path: String,
    /// File name sent with the multipart part
    pub file_name: String,
    pub data: Bytes,
    /// Client-declared `Content-Length`, informational only
    pub declared_size: Option<u64>,
    pub content_type: Option<String>,
}

/// Response body and headers of a download
#[derive(Debug, Clone)]
pub struct FileDownload {
    pub body: Bytes,
    pub content_type: String,
    pub file_name: String,
}

/// Service for file operations
pub struct FileService {
    store: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    archiver: Arc<dyn Archiver>,
}

impl FileService {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        archiver: Arc<dyn Archiver>,
    ) -> Self {
        Self {
            store,
            blobs,
            archiver,
        }
    }

    /// Object key of a file's content.
    ///
    /// The account id is percent-encoded so it stays a single key segment;
    /// tenants never share keys even when an id contains `/`.
    pub fn object_key(account_id: &str, path: &str) -> String {
        format!(
            "{}{}{}",
            urlencoding::encode(account_id),
            PATH_SEPARATOR,
            path
        )
    }

    /// Final storage path of an upload.
    ///
    /// A directory-like `path` (trailing `/`) gets the basename of `file_name`
    /// appended; any other path is used verbatim.
    pub fn target_path(path: &str, file_name: &str) -> Result<String> {
        let target = if path.ends_with(PATH_SEPARATOR) {
            // Clients may send "C:\dir\file.txt" or "dir/file.txt" as the part file name
            let hint = basename(file_name).rsplit('\\').next().unwrap_or_default();
            if hint.is_empty() {
                return Err(AppError::BadRequest(
                    "A file name is required when path ends with '/'".to_string(),
                ));
            }
            format!("{}{}", path, hint)
        } else {
            path.to_string()
        };

        validate_file_path(&target).map_err(|e| AppError::Validation(e.to_string()))?;
        if target.ends_with(PATH_SEPARATOR) {
            return Err(AppError::Validation(format!(
                "'{}' is a directory path, not a file path",
                target
            )));
        }

        Ok(target)
    }

    /// Store the content, then record its metadata.
    ///
    /// A failed content write leaves no record. A failed metadata write after
    /// the content was stored is reported as `AppError::OrphanedBlob`;
    /// uploading to the same path again repairs it.
    pub async fn upload_file(&self, request: UploadRequest, account_id: &str) -> Result<FileRecord> {
        let path = Self::target_path(&request.path, &request.file_name)?;

        let content_type = request
            .content_type
            .filter(|ct| !ct.trim().is_empty() && ct != FALLBACK_CONTENT_TYPE)
            .unwrap_or_else(|| {
                mime_guess::from_path(&path)
                    .first_raw()
                    .unwrap_or(FALLBACK_CONTENT_TYPE)
                    .to_string()
            });

        let size = request.data.len() as i64;
        if let Some(declared) = request.declared_size {
            if declared != size as u64 {
                debug!(
                    "Declared size {} differs from received {} bytes for {}",
                    declared, size, path
                );
            }
        }

        let key = Self::object_key(account_id, &path);
        self.blobs.put(&key, request.data, &content_type).await?;
        debug!("File content stored: {}", key);

        let record = NewFileRecord::for_upload(account_id, &path, size, &content_type);
        let file = self
            .store
            .upsert_by_path(record)
            .await
            .map_err(|e| AppError::OrphanedBlob {
                key: key.clone(),
                source: Box::new(e),
            })?;

        info!(
            "File metadata saved: id={}, path={}, size={}, content_type={}",
            file.id, file.path, file.size, file.content_type
        );

        Ok(file)
    }

    pub async fn list_files(
        &self,
        account_id: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<FileRecord>> {
        self.store.list_by_account(account_id, skip, limit).await
    }

    pub async fn search_files(
        &self,
        account_id: &str,
        params: SearchFilesQuery,
    ) -> Result<Vec<FileRecord>> {
        let clause = SearchClause::build(&params.query, params.is_regex)?;
        let filter = SearchFilter {
            path_prefix: params.path,
            extension: params.extension,
            clause,
            order_by: params.order_by,
            limit: params.limit,
        };

        let files = self.store.search(account_id, &filter).await?;
        debug!("Search returned {} files", files.len());
        Ok(files)
    }

    /// Fetch a file, or a zip of every file under a prefix.
    ///
    /// `identifier` is a UUID, an exact path, or a prefix ending in `/`.
    /// `zipped` wraps a single file in an archive too.
    pub async fn download(
        &self,
        identifier: &str,
        zipped: bool,
        account_id: &str,
    ) -> Result<FileDownload> {
        match resolve(self.store.as_ref(), identifier, account_id).await? {
            Resolved::Single(file) if !zipped => {
                let body = self
                    .blobs
                    .get(&Self::object_key(account_id, &file.path))
                    .await?;
                Ok(FileDownload {
                    body,
                    content_type: file.content_type,
                    file_name: file.name,
                })
            }
            Resolved::Single(file) => {
                let name = file.name.clone();
                self.download_archive(vec![(name, file)], account_id).await
            }
            Resolved::Many(files) if files.is_empty() => Err(AppError::NotFound(format!(
                "No files found under '{}'",
                identifier
            ))),
            Resolved::Many(files) => {
                let named = files
                    .into_iter()
                    .map(|file| {
                        let name = file
                            .path
                            .strip_prefix(identifier)
                            .filter(|rest| !rest.is_empty())
                            .unwrap_or(&file.name)
                            .to_string();
                        (name, file)
                    })
                    .collect();
                self.download_archive(named, account_id).await
            }
        }
    }

    async fn download_archive(
        &self,
        files: Vec<(String, FileRecord)>,
        account_id: &str,
    ) -> Result<FileDownload> {
        let entries = try_join_all(files.into_iter().map(|(name, file)| async move {
            let content = self
                .blobs
                .get(&Self::object_key(account_id, &file.path))
                .await?;
            Ok::<_, AppError>(ArchiveEntry { name, content })
        }))
        .await?;

        let body = self.archiver.archive(entries).await?;

        Ok(FileDownload {
            body,
            content_type: ZIP_CONTENT_TYPE.to_string(),
            file_name: ZIP_FILE_NAME.to_string(),
        })
    }

    /// Check that both the metadata store and the blob store answer
    pub async fn health(&self) -> Result<()> {
        self.store.ping().await?;
        self.blobs.ping().await
    }
}
