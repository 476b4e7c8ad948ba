use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Public category routes (no authentication required)
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/categories", get(handlers::list_categories))
        .with_state(service)
}

/// Category management routes (admin only)
pub fn admin_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/admin/categories",
            get(handlers::list_admin_categories).post(handlers::create_category),
        )
        .route(
            "/api/admin/categories/options",
            get(handlers::category_options),
        )
        .route(
            "/api/admin/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route(
            "/api/admin/categories/{id}/activate",
            post(handlers::activate_category),
        )
        .route(
            "/api/admin/categories/{id}/deactivate",
            post(handlers::deactivate_category),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::lazy_test_pool;
    use crate::shared::test_helpers::{user_with_roles, with_admin_auth, with_user};
    use axum_test::TestServer;
    use serde_json::json;

    fn admin_app() -> Router {
        admin_routes(Arc::new(CategoryService::new(lazy_test_pool())))
    }

    #[tokio::test]
    async fn test_admin_routes_require_identity() {
        let server = TestServer::new(admin_app()).unwrap();

        server
            .post("/api/admin/categories")
            .json(&json!({ "name": "Consoles" }))
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_staff_cannot_manage_categories() {
        let server = TestServer::new(with_user(admin_app(), user_with_roles(&["staff"]))).unwrap();

        server
            .delete(&format!("/api/admin/categories/{}", uuid::Uuid::new_v4()))
            .await
            .assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload_before_database() {
        let server = TestServer::new(with_admin_auth(admin_app())).unwrap();

        let response = server
            .post("/api/admin/categories")
            .json(&json!({ "name": "", "slug": "Bad Slug" }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].as_str().unwrap().starts_with("name:"));
        assert!(errors[1].as_str().unwrap().starts_with("slug:"));
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected() {
        let server = TestServer::new(with_admin_auth(admin_app())).unwrap();

        server
            .get("/api/admin/categories/not-a-uuid")
            .await
            .assert_status_bad_request();
    }
}
