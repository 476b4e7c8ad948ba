use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::auth::guards::RequireAdmin;
use crate::features::products::dtos::{
    read_product_form, ProductDetailDto, ProductEditDto, ProductFormDoc, ProductFormOptionsDto,
    ProductResponseDto,
};
use crate::features::products::services::ProductService;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// Product page by slug
///
/// Counts the visit and returns gallery, related products and the review summary.
#[utoipa::path(
    get,
    path = "/api/products/{slug}",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Product found", body = ApiResponse<ProductDetailDto>),
        (status = 404, description = "Product not found or inactive")
    ),
    tag = "products"
)]
pub async fn get_product(
    State(service): State<Arc<ProductService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ProductDetailDto>>> {
    let product = service.get_detail(&slug).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}

/// Create a product (admin only)
///
/// Accepts multipart/form-data. The feature image and tags are stored
/// together with the product or not at all.
#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body(
        content = ProductFormDoc,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Product created successfully", body = ApiResponse<ProductResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Slug already in use or unknown category/brand"),
        (status = 502, description = "Image storage unavailable"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ProductResponseDto>>> {
    let (dto, image) = read_product_form(multipart).await?;

    let product = service.create(dto, image).await?;
    Ok(Json(ApiResponse::success(
        Some(product),
        Some("Product created".to_string()),
        None,
    )))
}

/// List all products with pagination, newest first (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Products retrieved successfully", body = ApiResponse<Vec<ProductResponseDto>>),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_admin_products(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    AppQuery(query): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ProductResponseDto>>>> {
    let page = service.list_admin(&query).await?;
    Ok(Json(ApiResponse::page(page)))
}

/// Category and brand pickers for a new product (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/products/form",
    responses(
        (status = 200, description = "Form pickers", body = ApiResponse<ProductFormOptionsDto>),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn product_form_options(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
) -> Result<Json<ApiResponse<ProductFormOptionsDto>>> {
    let options = service.form_options(None).await?;
    Ok(Json(ApiResponse::success(Some(options), None, None)))
}

/// Get a product for editing, with its category preselected (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product retrieved successfully", body = ApiResponse<ProductEditDto>),
        (status = 404, description = "Product not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_admin_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductEditDto>>> {
    let product = service.get_for_edit(id).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}

/// Update a product (admin only)
///
/// Accepts multipart/form-data. Omitting `image` keeps the current one;
/// the tag set is replaced by the submitted tags.
#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body(
        content = ProductFormDoc,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Product updated successfully", body = ApiResponse<ProductResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Slug already in use or unknown category/brand"),
        (status = 502, description = "Image storage unavailable"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ProductResponseDto>>> {
    let (dto, image) = read_product_form(multipart).await?;

    let product = service.update(id, dto, image).await?;
    Ok(Json(ApiResponse::success(
        Some(product),
        Some("Product updated".to_string()),
        None,
    )))
}

/// Delete a product and its images (admin only)
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted successfully"),
        (status = 404, description = "Product not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Product deleted".to_string()),
        None,
    )))
}

/// Put a product on sale (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/products/{id}/activate",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product activated", body = ApiResponse<ProductResponseDto>),
        (status = 404, description = "Product not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn activate_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductResponseDto>>> {
    let product = service.set_active(id, true).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}

/// Take a product off sale (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/products/{id}/deactivate",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deactivated", body = ApiResponse<ProductResponseDto>),
        (status = 404, description = "Product not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn deactivate_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductResponseDto>>> {
    let product = service.set_active(id, false).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}
