use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireAdmin;
use crate::features::brands::dtos::{BrandResponseDto, SaveBrandDto};
use crate::features::brands::services::BrandService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List active brands ordered by name
#[utoipa::path(
    get,
    path = "/api/brands",
    responses(
        (status = 200, description = "List of brands", body = ApiResponse<Vec<BrandResponseDto>>),
    ),
    tag = "brands"
)]
pub async fn list_brands(
    State(service): State<Arc<BrandService>>,
) -> Result<Json<ApiResponse<Vec<BrandResponseDto>>>> {
    let brands = service.list().await?;
    let total = brands.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(brands),
        None,
        Some(Meta::total(total)),
    )))
}

/// Create a brand (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/brands",
    request_body = SaveBrandDto,
    responses(
        (status = 200, description = "Brand created successfully", body = ApiResponse<BrandResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Slug already in use"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-brands",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_brand(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<BrandService>>,
    AppJson(dto): AppJson<SaveBrandDto>,
) -> Result<Json<ApiResponse<BrandResponseDto>>> {
    dto.validate().map_err(AppError::from_validation)?;

    let brand = service.create(dto).await?;
    Ok(Json(ApiResponse::success(
        Some(brand),
        Some("Brand created".to_string()),
        None,
    )))
}

/// List all brands with pagination, newest first (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/brands",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Brands retrieved successfully", body = ApiResponse<Vec<BrandResponseDto>>),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-brands",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_admin_brands(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<BrandService>>,
    AppQuery(query): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<BrandResponseDto>>>> {
    let page = service.list_admin(&query).await?;
    Ok(Json(ApiResponse::page(page)))
}

/// Get a brand by ID (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Brand retrieved successfully", body = ApiResponse<BrandResponseDto>),
        (status = 404, description = "Brand not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-brands",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_brand(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<BrandService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BrandResponseDto>>> {
    let brand = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(brand), None, None)))
}

/// Replace a brand (admin only)
#[utoipa::path(
    put,
    path = "/api/admin/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    request_body = SaveBrandDto,
    responses(
        (status = 200, description = "Brand updated successfully", body = ApiResponse<BrandResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Brand not found"),
        (status = 409, description = "Slug already in use"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-brands",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_brand(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<BrandService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SaveBrandDto>,
) -> Result<Json<ApiResponse<BrandResponseDto>>> {
    dto.validate().map_err(AppError::from_validation)?;

    let brand = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(brand),
        Some("Brand updated".to_string()),
        None,
    )))
}

/// Delete a brand (admin only)
#[utoipa::path(
    delete,
    path = "/api/admin/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Brand deleted successfully"),
        (status = 404, description = "Brand not found"),
        (status = 409, description = "Brand still has products"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-brands",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_brand(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<BrandService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Brand deleted".to_string()),
        None,
    )))
}

/// Show a brand on the storefront (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/brands/{id}/activate",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Brand activated", body = ApiResponse<BrandResponseDto>),
        (status = 404, description = "Brand not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-brands",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn activate_brand(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<BrandService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BrandResponseDto>>> {
    let brand = service.set_active(id, true).await?;
    Ok(Json(ApiResponse::success(Some(brand), None, None)))
}

/// Hide a brand from the storefront (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/brands/{id}/deactivate",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Brand deactivated", body = ApiResponse<BrandResponseDto>),
        (status = 404, description = "Brand not found"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "admin-brands",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn deactivate_brand(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<BrandService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BrandResponseDto>>> {
    let brand = service.set_active(id, false).await?;
    Ok(Json(ApiResponse::success(Some(brand), None, None)))
}
