use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::storefront::dtos::{BrandPageDto, CategoryPageDto, HomeDto, ShopDto};
use crate::features::storefront::services::StorefrontService;
use crate::shared::types::{ApiResponse, PageQuery};

/// Landing page content
#[utoipa::path(
    get,
    path = "/api/home",
    responses(
        (status = 200, description = "Root categories, brands, latest and best-selling products", body = ApiResponse<HomeDto>),
    ),
    tag = "storefront"
)]
pub async fn home(State(service): State<Arc<StorefrontService>>) -> Result<Json<ApiResponse<HomeDto>>> {
    let home = service.home().await?;
    Ok(Json(ApiResponse::success(Some(home), None, None)))
}

/// All active products, 12 per page
#[utoipa::path(
    get,
    path = "/api/shop",
    params(PageQuery),
    responses(
        (status = 200, description = "Shop page", body = ApiResponse<ShopDto>),
    ),
    tag = "storefront"
)]
pub async fn shop(
    State(service): State<Arc<StorefrontService>>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<ApiResponse<ShopDto>>> {
    let (shop, meta) = service.shop(&query).await?;
    Ok(Json(ApiResponse::success(Some(shop), None, Some(meta))))
}

/// Products of a category and its direct children, 12 per page
#[utoipa::path(
    get,
    path = "/api/categories/{slug}/products",
    params(
        ("slug" = String, Path, description = "Category slug"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Category page", body = ApiResponse<CategoryPageDto>),
        (status = 404, description = "Category not found or inactive")
    ),
    tag = "storefront"
)]
pub async fn category_products(
    State(service): State<Arc<StorefrontService>>,
    Path(slug): Path<String>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<ApiResponse<CategoryPageDto>>> {
    let (page, meta) = service.category_page(&slug, &query).await?;
    Ok(Json(ApiResponse::success(Some(page), None, Some(meta))))
}

/// Products of a brand, 12 per page
#[utoipa::path(
    get,
    path = "/api/brands/{slug}/products",
    params(
        ("slug" = String, Path, description = "Brand slug"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Brand page", body = ApiResponse<BrandPageDto>),
        (status = 404, description = "Brand not found or inactive")
    ),
    tag = "storefront"
)]
pub async fn brand_products(
    State(service): State<Arc<StorefrontService>>,
    Path(slug): Path<String>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<ApiResponse<BrandPageDto>>> {
    let (page, meta) = service.brand_page(&slug, &query).await?;
    Ok(Json(ApiResponse::success(Some(page), None, Some(meta))))
}
