use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::comments::handlers;
use crate::features::comments::services::CommentService;

/// Public review routes (no authentication required)
pub fn routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route(
            "/api/products/{slug}/comments",
            get(handlers::list_product_comments).post(handlers::create_comment),
        )
        .with_state(service)
}

/// Review moderation routes (staff)
pub fn admin_routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route("/api/admin/comments", get(handlers::list_admin_comments))
        .route(
            "/api/admin/comments/{id}/reply",
            post(handlers::reply_comment),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::lazy_test_pool;
    use crate::shared::test_helpers::{user_with_roles, with_user};
    use axum_test::TestServer;
    use serde_json::json;

    fn service() -> Arc<CommentService> {
        Arc::new(CommentService::new(lazy_test_pool()))
    }

    #[tokio::test]
    async fn test_review_validation_runs_before_lookup() {
        let server = TestServer::new(routes(service())).unwrap();

        let response = server
            .post("/api/products/wacom-one/comments")
            .json(&json!({
                "author_name": "Minh",
                "author_phone": "0912345678",
                "content": "Too good",
                "rating": 7
            }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].as_str().unwrap().starts_with("rating:"));
    }

    #[tokio::test]
    async fn test_reply_requires_authentication() {
        let server = TestServer::new(admin_routes(service())).unwrap();

        let response = server
            .post(&format!("/api/admin/comments/{}/reply", uuid::Uuid::new_v4()))
            .json(&json!({ "content": "Thanks!" }))
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_customer_cannot_list_admin_comments() {
        let app = with_user(admin_routes(service()), user_with_roles(&["customer"]));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/admin/comments").await;

        response.assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_empty_reply_is_rejected() {
        let app = with_user(admin_routes(service()), user_with_roles(&["staff"]));
        let server = TestServer::new(app).unwrap();

        let response = server
            .post(&format!("/api/admin/comments/{}/reply", uuid::Uuid::new_v4()))
            .json(&json!({ "content": "" }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(body["errors"][0].as_str().unwrap().starts_with("content:"));
    }

    #[tokio::test]
    async fn test_whitespace_only_reply_is_rejected() {
        let app = with_user(admin_routes(service()), user_with_roles(&["staff"]));
        let server = TestServer::new(app).unwrap();

        let response = server
            .post(&format!("/api/admin/comments/{}/reply", uuid::Uuid::new_v4()))
            .json(&json!({ "content": "   \n  " }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(body["errors"][0].as_str().unwrap().starts_with("content:"));
    }

    #[tokio::test]
    async fn test_blank_review_is_rejected_before_lookup() {
        let server = TestServer::new(routes(service())).unwrap();

        let response = server
            .post("/api/products/wacom-one/comments")
            .json(&json!({
                "author_name": "   ",
                "author_phone": "0912345678",
                "content": "  ",
                "rating": 4
            }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        let errors: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e.as_str())
            .collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("author_name:"));
        assert!(errors[1].starts_with("content:"));
    }
}
