use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireStaff;
use crate::features::comments::dtos::{
    AdminCommentDto, CommentResponseDto, CommentThreadDto, CreateCommentDto, ReplyCommentDto,
};
use crate::features::comments::services::CommentService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Post a review on a product
#[utoipa::path(
    post,
    path = "/api/products/{slug}/comments",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 200, description = "Review posted", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Product not found or inactive")
    ),
    tag = "comments"
)]
pub async fn create_comment(
    State(service): State<Arc<CommentService>>,
    Path(slug): Path<String>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    let comment = service.create(&slug, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(comment),
        Some("Thank you for your review".to_string()),
        None,
    )))
}

/// List a product's reviews with their replies
#[utoipa::path(
    get,
    path = "/api/products/{slug}/comments",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Reviews, newest first", body = ApiResponse<Vec<CommentThreadDto>>),
        (status = 404, description = "Product not found or inactive")
    ),
    tag = "comments"
)]
pub async fn list_product_comments(
    State(service): State<Arc<CommentService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Vec<CommentThreadDto>>>> {
    let threads = service.list_for_product(&slug).await?;
    let total = threads.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(threads),
        None,
        Some(Meta::total(total)),
    )))
}

/// List top-level reviews for moderation (staff)
#[utoipa::path(
    get,
    path = "/api/admin/comments",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Reviews grouped by product", body = ApiResponse<Vec<AdminCommentDto>>),
        (status = 403, description = "Forbidden - staff only")
    ),
    tag = "admin-comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_admin_comments(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<CommentService>>,
    AppQuery(query): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AdminCommentDto>>>> {
    let page = service.list_admin(&query).await?;
    Ok(Json(ApiResponse::page(page)))
}

/// Reply to a review (staff)
///
/// The reply is signed with the user's highest back-office role.
#[utoipa::path(
    post,
    path = "/api/admin/comments/{id}/reply",
    params(
        ("id" = Uuid, Path, description = "Top-level comment ID")
    ),
    request_body = ReplyCommentDto,
    responses(
        (status = 200, description = "Reply posted", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Validation error or parent is itself a reply"),
        (status = 404, description = "Comment not found"),
        (status = 403, description = "Forbidden - staff only")
    ),
    tag = "admin-comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reply_comment(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ReplyCommentDto>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    let dto = dto.trimmed();
    dto.validate().map_err(AppError::from_validation)?;

    let reply = service.reply(id, dto, &user).await?;
    Ok(Json(ApiResponse::success(
        Some(reply),
        Some("Reply posted".to_string()),
        None,
    )))
}
