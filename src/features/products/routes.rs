use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::products::handlers;
use crate::features::products::services::ProductService;

/// Public product routes (no authentication required)
pub fn routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route("/api/products/{slug}", get(handlers::get_product))
        .with_state(service)
}

/// Product management routes (admin only)
pub fn admin_routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route(
            "/api/admin/products",
            get(handlers::list_admin_products).post(handlers::create_product),
        )
        .route(
            "/api/admin/products/form",
            get(handlers::product_form_options),
        )
        .route(
            "/api/admin/products/{id}",
            get(handlers::get_admin_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route(
            "/api/admin/products/{id}/activate",
            post(handlers::activate_product),
        )
        .route(
            "/api/admin/products/{id}/deactivate",
            post(handlers::deactivate_product),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::lazy_test_pool;
    use crate::core::error::{AppError, Result};
    use crate::features::brands::BrandService;
    use crate::features::categories::CategoryService;
    use crate::modules::storage::{ImageStorage, ImageUpload, StoredImage};
    use crate::shared::test_helpers::with_admin_auth;
    use async_trait::async_trait;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;

    struct UnreachableStorage;

    #[async_trait]
    impl ImageStorage for UnreachableStorage {
        async fn store(&self, upload: Option<ImageUpload>, _folder: &str) -> Result<Option<StoredImage>> {
            match upload {
                Some(_) => Err(AppError::Storage("connection refused".to_string())),
                None => Ok(None),
            }
        }

        async fn delete(&self, _file_path: &str) -> Result<()> {
            Ok(())
        }

        fn public_url(&self, file_path: &str) -> String {
            file_path.to_string()
        }
    }

    fn admin_app() -> Router {
        let pool = lazy_test_pool();
        let service = ProductService::new(
            pool.clone(),
            Arc::new(UnreachableStorage),
            Arc::new(CategoryService::new(pool.clone())),
            Arc::new(BrandService::new(pool)),
        );
        with_admin_auth(admin_routes(Arc::new(service)))
    }

    fn form() -> MultipartForm {
        MultipartForm::new()
            .add_text("name", "Xbox Wireless Controller")
            .add_text("price", "1290000")
            .add_text("quantity", "4")
            .add_text("category_id", uuid::Uuid::new_v4().to_string())
            .add_text("brand_id", uuid::Uuid::new_v4().to_string())
            .add_text("tags", "xbox,pad")
    }

    #[tokio::test]
    async fn test_create_surfaces_storage_failure() {
        let server = TestServer::new(admin_app()).unwrap();
        let image = Part::bytes(vec![0xff, 0xd8, 0xff])
            .file_name("pad.jpg")
            .mime_type("image/jpeg");

        let response = server
            .post("/api/admin/products")
            .multipart(form().add_part("image", image))
            .await;

        response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Image storage is unavailable");
    }

    #[tokio::test]
    async fn test_create_validates_form_before_upload() {
        let server = TestServer::new(admin_app()).unwrap();

        let response = server
            .post("/api/admin/products")
            .multipart(
                MultipartForm::new()
                    .add_text("name", "Pad")
                    .add_text("price", "-5")
                    .add_text("category_id", uuid::Uuid::new_v4().to_string())
                    .add_text("brand_id", uuid::Uuid::new_v4().to_string()),
            )
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["errors"][0], "price: price must not be negative");
    }
}
