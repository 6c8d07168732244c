use axum::{
    extract::{Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    DownloadQuery, FileInfoDto, FileListResponseDto, ListFilesQuery, SearchFilesQuery,
    SearchFilesResponseDto, UploadFileDto,
};
use crate::features::files::services::{FileService, UploadRequest};
use crate::shared::constants::FALLBACK_CONTENT_TYPE;
use crate::shared::types::{ApiResponse, Meta};

/// List the caller's files
#[utoipa::path(
    get,
    path = "/api/files/list",
    tag = "files",
    params(ListFilesQuery),
    responses(
        (status = 200, description = "Page of files in id order", body = ApiResponse<FileListResponseDto>),
        (status = 400, description = "Invalid paging parameters"),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    AppQuery(params): AppQuery<ListFilesQuery>,
) -> Result<Json<ApiResponse<FileListResponseDto>>> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let files = service
        .list_files(&user.account_id, params.skip, params.limit)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(FileListResponseDto {
            account_id: user.account_id,
            files: files.into_iter().map(FileInfoDto::from).collect(),
        }),
        None,
        None,
    )))
}

/// Upload a file
///
/// Accepts multipart/form-data with:
/// - `path`: target path; a trailing `/` keeps the uploaded file's own name
/// - `file`: the file content
///
/// Uploading to an existing path replaces the file and keeps its id.
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "Target path and file content",
    ),
    responses(
        (status = 201, description = "File stored", body = ApiResponse<FileInfoDto>),
        (status = 400, description = "Missing field or invalid path"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "File too large"),
        (status = 502, description = "Object storage rejected the content")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileInfoDto>>)> {
    let mut path: Option<String> = None;
    let mut file: Option<UploadRequest> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "path" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read path field: {}", e))
                })?;
                path = Some(text);
            }
            "file" => {
                let content_type = field.content_type().map(|s| s.to_string());
                let file_name = field.file_name().unwrap_or("").to_string();
                let declared_size = field
                    .headers()
                    .get(header::CONTENT_LENGTH)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file = Some(UploadRequest {
                    path: String::new(),
                    file_name,
                    data,
                    declared_size,
                    content_type,
                });
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let path = path.ok_or_else(|| AppError::BadRequest("Path is required".to_string()))?;
    let mut request = file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    request.path = path;

    let stored = service.upload_file(request, &user.account_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(FileInfoDto::from(stored)),
            Some("File uploaded successfully".to_string()),
            None,
        )),
    ))
}

/// Download a file or a directory
///
/// `path` may be a file path, a file id, or a directory prefix ending in `/`.
/// Directories, and any request with `zipped=true`, are returned as a zip archive.
#[utoipa::path(
    get,
    path = "/api/files/download",
    tag = "files",
    params(DownloadQuery),
    responses(
        (status = 200, description = "File content or zip archive", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid path"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "No file matches the path"),
        (status = 502, description = "Object storage could not return the content")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    AppQuery(params): AppQuery<DownloadQuery>,
) -> Result<Response> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let download = service
        .download(&params.path, params.zipped, &user.account_id)
        .await?;

    let content_type = HeaderValue::from_str(&download.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));
    let disposition = HeaderValue::from_str(&content_disposition(&download.file_name))
        .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.body,
    )
        .into_response())
}

/// Search the caller's files
///
/// Structural filters (`path` prefix, `extension`) narrow the set first; `query`
/// then has to match at least one metadata field.
#[utoipa::path(
    get,
    path = "/api/files/search",
    tag = "files",
    params(SearchFilesQuery),
    responses(
        (status = 200, description = "Matching files", body = ApiResponse<SearchFilesResponseDto>),
        (status = 400, description = "Invalid parameters or regular expression"),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    AppQuery(params): AppQuery<SearchFilesQuery>,
) -> Result<Json<ApiResponse<SearchFilesResponseDto>>> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let files = service.search_files(&user.account_id, params).await?;
    let total = files.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(SearchFilesResponseDto {
            matches: files.into_iter().map(FileInfoDto::from).collect(),
        }),
        None,
        Some(Meta { total }),
    )))
}

/// `attachment` disposition with an ASCII `filename` and a UTF-8 `filename*` (RFC 5987)
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}
