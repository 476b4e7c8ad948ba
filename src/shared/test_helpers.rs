use crate::features::auth::model::AuthenticatedUser;

use axum::{extract::Request, middleware::Next, response::Response, Router};

pub fn user_with_roles(roles: &[&str]) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "test-sub".to_string(),
        name: Some("Test User".to_string()),
        phone: Some("0900000000".to_string()),
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

pub fn create_admin_user() -> AuthenticatedUser {
    user_with_roles(&["admin"])
}

/// Inject a fixed identity the way the JWT middleware would
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                let response: Response = next.run(request).await;
                response
            }
        },
    ))
}

pub fn with_admin_auth(router: Router) -> Router {
    with_user(router, create_admin_user())
}
