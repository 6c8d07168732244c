use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};
use std::sync::Arc;

use crate::features::files::handlers;
use crate::features::files::services::FileService;

/// Create routes for the files feature
///
/// Note: This feature requires authentication
pub fn routes(file_service: Arc<FileService>, max_upload_size: usize) -> Router {
    Router::new()
        .route("/api/files/list", get(handlers::list_files))
        .route(
            "/api/files/upload",
            post(handlers::upload_file).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/api/files/download", get(handlers::download_file))
        .route("/api/files/search", get(handlers::search_files))
        .with_state(file_service)
}
