use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::brands::models::Brand;
use crate::shared::validation::SLUG_REGEX;

/// Response DTO for brand
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BrandResponseDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Brand> for BrandResponseDto {
    fn from(b: Brand) -> Self {
        Self {
            id: b.id,
            name: b.name,
            slug: b.slug,
            description: b.description,
            is_active: b.is_active,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Request DTO for creating or replacing a brand
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SaveBrandDto {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,

    /// Generated from the name when omitted
    #[validate(
        length(min = 1, max = 255, message = "slug must be 1-255 characters"),
        regex(path = *SLUG_REGEX, message = "slug must be lowercase words separated by single hyphens")
    )]
    pub slug: Option<String>,

    pub description: Option<String>,

    pub is_active: Option<bool>,
}
