#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
use uuid::Uuid;

#[cfg(test)]
#[allow(dead_code)]
pub fn create_test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::nil(),
        username: "test-user".to_string(),
        is_superuser: false,
    }
}

#[cfg(test)]
#[allow(dead_code)]
async fn inject_test_user_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_test_user());
    next.run(request).await
}

#[cfg(test)]
#[allow(dead_code)]
pub fn with_test_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_test_user_middleware))
}
