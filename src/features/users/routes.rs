use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::users::handlers::get_usage;
use crate::features::users::services::UserService;

/// Create routes for the users feature
pub fn routes(user_service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users/me/usage", get(get_usage))
        .with_state(user_service)
}
