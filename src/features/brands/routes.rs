use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::brands::handlers;
use crate::features::brands::services::BrandService;

/// Public brand routes (no authentication required)
pub fn routes(service: Arc<BrandService>) -> Router {
    Router::new()
        .route("/api/brands", get(handlers::list_brands))
        .with_state(service)
}

/// Brand management routes (admin only)
pub fn admin_routes(service: Arc<BrandService>) -> Router {
    Router::new()
        .route(
            "/api/admin/brands",
            get(handlers::list_admin_brands).post(handlers::create_brand),
        )
        .route(
            "/api/admin/brands/{id}",
            get(handlers::get_brand)
                .put(handlers::update_brand)
                .delete(handlers::delete_brand),
        )
        .route(
            "/api/admin/brands/{id}/activate",
            post(handlers::activate_brand),
        )
        .route(
            "/api/admin/brands/{id}/deactivate",
            post(handlers::deactivate_brand),
        )
        .with_state(service)
}
