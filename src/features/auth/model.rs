use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Caller identity attached to a request once its bearer token is verified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Tenant every file operation is scoped to
    pub account_id: String,
    pub sub: String,
}
