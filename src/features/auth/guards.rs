//! Role-based authorization guards for the back-office.
//!
//! Role hierarchy (from highest to lowest):
//! - super_admin: everything
//! - admin: catalog management (categories, brands, products)
//! - staff: comment moderation and replies
//!
//! Each higher role includes all permissions of lower roles.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn authenticated(parts: &Parts) -> Result<&AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for catalog management.
///
/// Allows users with "super_admin" or "admin" roles.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.has_admin_access() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

/// Guard for any back-office role.
///
/// Allows users with "super_admin", "admin" or "staff" roles.
pub struct RequireStaff(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.has_staff_access() {
            return Err(AppError::Forbidden("Staff access required".to_string()));
        }

        Ok(RequireStaff(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{with_user, user_with_roles};
    use axum::{routing::get, Router};
    use axum_test::TestServer;

    async fn admin_only(RequireAdmin(user): RequireAdmin) -> String {
        user.sub
    }

    async fn staff_only(RequireStaff(user): RequireStaff) -> String {
        user.reply_display_name()
    }

    fn app() -> Router {
        Router::new()
            .route("/admin", get(admin_only))
            .route("/staff", get(staff_only))
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let server = TestServer::new(app()).unwrap();
        let response = server.get("/admin").await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_staff_cannot_reach_admin_routes() {
        let server = TestServer::new(with_user(app(), user_with_roles(&["staff"]))).unwrap();

        server.get("/admin").await.assert_status_forbidden();

        let response = server.get("/staff").await;
        response.assert_status_ok();
        response.assert_text("Staff");
    }

    #[tokio::test]
    async fn test_admin_passes_both_guards() {
        let server = TestServer::new(with_user(app(), user_with_roles(&["admin"]))).unwrap();

        server.get("/admin").await.assert_status_ok();
        server.get("/staff").await.assert_text("Admin");
    }
}
