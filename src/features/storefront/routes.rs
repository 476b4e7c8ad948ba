use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::storefront::handlers;
use crate::features::storefront::services::StorefrontService;

/// Storefront listing routes (no authentication required)
pub fn routes(service: Arc<StorefrontService>) -> Router {
    Router::new()
        .route("/api/home", get(handlers::home))
        .route("/api/shop", get(handlers::shop))
        .route(
            "/api/categories/{slug}/products",
            get(handlers::category_products),
        )
        .route("/api/brands/{slug}/products", get(handlers::brand_products))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::lazy_test_pool;
    use crate::core::error::Result;
    use crate::features::brands::BrandService;
    use crate::features::categories::CategoryService;
    use crate::features::products::ProductService;
    use crate::modules::storage::{ImageStorage, ImageUpload, StoredImage};
    use async_trait::async_trait;
    use axum_test::TestServer;

    struct NoStorage;

    #[async_trait]
    impl ImageStorage for NoStorage {
        async fn store(&self, _upload: Option<ImageUpload>, _folder: &str) -> Result<Option<StoredImage>> {
            Ok(None)
        }

        async fn delete(&self, _file_path: &str) -> Result<()> {
            Ok(())
        }

        fn public_url(&self, file_path: &str) -> String {
            file_path.to_string()
        }
    }

    fn app() -> Router {
        let pool = lazy_test_pool();
        let categories = Arc::new(CategoryService::new(pool.clone()));
        let brands = Arc::new(BrandService::new(pool.clone()));
        let products = Arc::new(ProductService::new(
            pool,
            Arc::new(NoStorage),
            categories.clone(),
            brands.clone(),
        ));
        routes(Arc::new(StorefrontService::new(categories, brands, products)))
    }

    #[tokio::test]
    async fn test_non_numeric_page_is_rejected() {
        let server = TestServer::new(app()).unwrap();

        let response = server
            .get("/api/shop")
            .add_query_param("page", "two")
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid query parameters"));
    }

    #[tokio::test]
    async fn test_unreachable_database_is_server_error() {
        let server = TestServer::new(app()).unwrap();

        let response = server.get("/api/brands/sony/products").await;

        response.assert_status_internal_server_error();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
    }
}
