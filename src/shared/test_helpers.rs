use axum::{extract::Request, middleware::Next, response::Response, Router};
use std::sync::Arc;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::store::InMemoryFileStore;
use crate::features::files::FileService;
use crate::modules::archive::ZipArchiver;
use crate::modules::storage::InMemoryBlobStore;

pub const TEST_ACCOUNT_ID: &str = "test-account-id";

pub fn create_test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        account_id: TEST_ACCOUNT_ID.to_string(),
        sub: "test-sub".to_string(),
    }
}

async fn inject_test_user_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_test_user());
    next.run(request).await
}

/// Authenticate every request as [`create_test_user`]
pub fn with_test_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_test_user_middleware))
}

/// File service over in-memory stores, returned with handles to both stores
pub fn in_memory_file_service() -> (
    Arc<FileService>,
    Arc<InMemoryFileStore>,
    Arc<InMemoryBlobStore>,
) {
    let store = Arc::new(InMemoryFileStore::new());
    let blobs = Arc::new(InMemoryBlobStore::new());
    let service = Arc::new(FileService::new(
        store.clone(),
        blobs.clone(),
        Arc::new(ZipArchiver::new()),
    ));
    (service, store, blobs)
}
