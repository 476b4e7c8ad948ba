use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::search::handlers;
use crate::features::search::services::SearchService;

/// Create routes for the search feature
///
/// Note: This feature is public (no authentication required)
pub fn routes(service: Arc<SearchService>) -> Router {
    Router::new()
        .route("/api/search", get(handlers::search_products))
        .route("/api/search/find", get(handlers::find_suggestions))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::lazy_test_pool;
    use crate::core::error::Result;
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
        routes(Arc::new(SearchService::new(lazy_test_pool(), Arc::new(NoStorage))))
    }

    #[tokio::test]
    async fn test_inverted_price_range_is_rejected() {
        let server = TestServer::new(app()).unwrap();

        let response = server
            .get("/api/search")
            .add_query_param("keywords", "pad")
            .add_query_param("price_min", "900")
            .add_query_param("price_max", "100")
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(body["errors"][0].as_str().unwrap().starts_with("price_min:"));
    }

    #[tokio::test]
    async fn test_unknown_sort_is_rejected() {
        let server = TestServer::new(app()).unwrap();

        let response = server
            .get("/api/search")
            .add_query_param("sort_by", "cheapest")
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid query parameters"));
    }
}
