use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Identity attached to a request after bearer-token validation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub is_superuser: bool,
}

/// JWT claims carried by access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub username: String,
    /// "access" or "refresh"
    #[serde(rename = "type")]
    pub token_type: String,
    #[serde(default)]
    pub is_superuser: bool,
    pub iat: u64,
    pub exp: u64,
}
