use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::comments::models::Comment;
use crate::shared::validation::PHONE_REGEX;

/// Highest rating a review can carry
pub const MAX_RATING: u32 = 5;

/// Review submitted from a product page
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCommentDto {
    #[validate(length(min = 1, max = 255, message = "author_name must be 1-255 characters"))]
    pub author_name: String,

    #[validate(regex(path = *PHONE_REGEX, message = "author_phone must be 8-15 digits"))]
    pub author_phone: String,

    #[validate(length(min = 1, max = 2000, message = "content must be 1-2000 characters"))]
    pub content: String,

    /// 0 to 5, whole or half stars
    #[schema(value_type = f64, example = 4.5)]
    pub rating: Decimal,
}

impl CreateCommentDto {
    /// Strip surrounding whitespace so validation sees what gets stored
    pub fn trimmed(self) -> Self {
        Self {
            author_name: self.author_name.trim().to_string(),
            author_phone: self.author_phone.trim().to_string(),
            content: self.content.trim().to_string(),
            rating: self.rating,
        }
    }

    /// Field validation plus the rating range and step
    pub fn check(&self) -> Result<()> {
        let mut messages: Vec<String> = Vec::new();

        if let Err(errors) = self.validate() {
            if let AppError::Validation(msg) = AppError::from_validation(errors) {
                messages.extend(msg.split("; ").map(str::to_string));
            }
        }
        if self.rating < Decimal::ZERO || self.rating > Decimal::from(MAX_RATING) {
            messages.push(format!("rating: rating must be between 0 and {}", MAX_RATING));
        } else if (self.rating * Decimal::TWO).fract() != Decimal::ZERO {
            messages.push("rating: rating must be a whole or half star".to_string());
        }

        if messages.is_empty() {
            return Ok(());
        }
        messages.sort();
        Err(AppError::Validation(messages.join("; ")))
    }
}

/// Staff reply to a top-level review
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReplyCommentDto {
    #[validate(length(min = 1, max = 2000, message = "content must be 1-2000 characters"))]
    pub content: String,
}

impl ReplyCommentDto {
    pub fn trimmed(self) -> Self {
        Self {
            content: self.content.trim().to_string(),
        }
    }
}

/// Star breakdown for rendering a rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StarSummary {
    pub full_stars: u32,
    pub half_star: bool,
}

impl StarSummary {
    pub fn from_rating(rating: Decimal) -> Self {
        let clamped = rating.clamp(Decimal::ZERO, Decimal::from(MAX_RATING));
        Self {
            full_stars: clamped.trunc().to_u32().unwrap_or(0),
            half_star: clamped.fract() > Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReplyDto {
    pub id: Uuid,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for ReplyDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            author_name: c.author_name,
            content: c.content,
            created_at: c.created_at,
        }
    }
}

/// Top-level review with its replies (oldest first)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentThreadDto {
    pub id: Uuid,
    pub product_id: Uuid,
    pub author_name: String,
    pub content: String,
    #[schema(value_type = Option<f64>)]
    pub rating: Option<Decimal>,
    pub stars: Option<StarSummary>,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<ReplyDto>,
}

impl CommentThreadDto {
    pub fn new(comment: Comment, replies: Vec<ReplyDto>) -> Self {
        Self {
            stars: comment.rating.map(StarSummary::from_rating),
            id: comment.id,
            product_id: comment.product_id,
            author_name: comment.author_name,
            content: comment.content,
            rating: comment.rating,
            created_at: comment.created_at,
            replies,
        }
    }
}

/// Review as listed in the back-office
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminCommentDto {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub author_name: String,
    pub author_phone: String,
    pub content: String,
    #[schema(value_type = Option<f64>)]
    pub rating: Option<Decimal>,
    pub reply_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Comment as stored, returned after create/reply
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: Uuid,
    pub product_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_name: String,
    pub content: String,
    #[schema(value_type = Option<f64>)]
    pub rating: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponseDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            product_id: c.product_id,
            parent_id: c.parent_id,
            author_name: c.author_name,
            content: c.content,
            rating: c.rating,
            created_at: c.created_at,
        }
    }
}
