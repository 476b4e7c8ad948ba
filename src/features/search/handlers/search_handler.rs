use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::products::dtos::ProductCardDto;
use crate::features::search::dtos::{FindQuery, FindResultDto, SearchQuery};
use crate::features::search::services::{SearchOutcome, SearchService};
use crate::shared::types::{ApiResponse, Meta};

/// Search active products
///
/// Keywords match product, brand or category names. No match is not an
/// error: the response carries an empty list and a notice in `message`.
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching products, 9 per page", body = ApiResponse<Vec<ProductCardDto>>),
        (status = 400, description = "Invalid price range or sort")
    ),
    tag = "search"
)]
pub async fn search_products(
    State(service): State<Arc<SearchService>>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<ProductCardDto>>>> {
    match service.search(&query).await? {
        SearchOutcome::Found(page) => Ok(Json(ApiResponse::page(page))),
        SearchOutcome::Empty { notice, window } => Ok(Json(ApiResponse::success(
            Some(Vec::new()),
            Some(notice),
            Some(Meta {
                total: 0,
                page: Some(window.page),
                page_size: Some(window.page_size),
                total_pages: Some(0),
            }),
        ))),
    }
}

/// Quick-find suggestions for a search box
#[utoipa::path(
    get,
    path = "/api/search/find",
    params(FindQuery),
    responses(
        (status = 200, description = "Up to 5 products and 5 categories", body = ApiResponse<FindResultDto>),
    ),
    tag = "search"
)]
pub async fn find_suggestions(
    State(service): State<Arc<SearchService>>,
    AppQuery(query): AppQuery<FindQuery>,
) -> Result<Json<ApiResponse<FindResultDto>>> {
    let result = service.find(&query).await?;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}
