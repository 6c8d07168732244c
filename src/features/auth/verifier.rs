use async_trait::async_trait;

use super::model::AuthenticatedUser;
use crate::core::error::Result;

/// Turns a bearer token into the identity of its owner.
///
/// Implementations fail with `AppError::Unauthorized` when the token is
/// rejected. The returned `account_id` is trusted as-is by the file feature.
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser>;
}
