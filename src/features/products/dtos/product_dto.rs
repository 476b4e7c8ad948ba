use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::brands::dtos::BrandResponseDto;
use crate::features::categories::dtos::CategoryOptionsDto;
use crate::features::products::models::{Product, ProductCard, ProductImage};
use crate::modules::storage::ImageStorage;
use crate::shared::validation::SLUG_REGEX;

/// Product fields submitted by the admin form
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct SaveProductDto {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,

    /// Generated from the name when omitted
    #[validate(
        length(min = 1, max = 255, message = "slug must be 1-255 characters"),
        regex(path = *SLUG_REGEX, message = "slug must be lowercase words separated by single hyphens")
    )]
    pub slug: Option<String>,

    #[schema(value_type = String, example = "499000")]
    pub price: Decimal,

    #[schema(value_type = Option<String>)]
    pub cost: Option<Decimal>,

    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,

    pub category_id: Uuid,

    pub brand_id: Uuid,

    pub description: Option<String>,

    pub content: Option<String>,

    pub is_active: Option<bool>,

    /// Tag names; unknown tags are created
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SaveProductDto {
    /// Field validation plus the monetary checks `validator` cannot express
    pub fn check(&self) -> Result<()> {
        let mut messages: Vec<String> = Vec::new();

        if let Err(errors) = self.validate() {
            if let AppError::Validation(msg) = AppError::from_validation(errors) {
                messages.extend(msg.split("; ").map(str::to_string));
            }
        }
        if self.price.is_sign_negative() {
            messages.push("price: price must not be negative".to_string());
        }
        if self.cost.is_some_and(|c| c.is_sign_negative()) {
            messages.push("cost: cost must not be negative".to_string());
        }
        if self.tags.iter().any(|t| t.trim().chars().count() > 100) {
            messages.push("tags: tags must be at most 100 characters".to_string());
        }

        if messages.is_empty() {
            return Ok(());
        }
        messages.sort();
        Err(AppError::Validation(messages.join("; ")))
    }

    /// Trimmed, non-empty, de-duplicated tag names in submission order
    pub fn normalized_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for tag in &self.tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        tags
    }
}

/// Full product as seen by the back-office
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductResponseDto {
    pub id: Uuid,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    pub name: String,
    pub slug: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub cost: Decimal,
    pub quantity: i32,
    pub sold: i32,
    pub views: i64,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_name: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponseDto {
    pub fn from_product(p: Product, tags: Vec<String>, storage: &dyn ImageStorage) -> Self {
        Self {
            image_url: p.image_path.as_deref().map(|path| storage.public_url(path)),
            id: p.id,
            category_id: p.category_id,
            brand_id: p.brand_id,
            name: p.name,
            slug: p.slug,
            price: p.price,
            cost: p.cost,
            quantity: p.quantity,
            sold: p.sold,
            views: p.views,
            description: p.description,
            content: p.content,
            image_name: p.image_name,
            is_active: p.is_active,
            tags,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Compact product entry for storefront listings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductCardDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub in_stock: bool,
    pub sold: i32,
    pub views: i64,
    pub brand_name: String,
    pub brand_slug: String,
    pub category_name: String,
    pub category_slug: String,
    pub created_at: DateTime<Utc>,
}

impl ProductCardDto {
    pub fn from_card(card: ProductCard, storage: &dyn ImageStorage) -> Self {
        Self {
            image_url: card.image_path.as_deref().map(|path| storage.public_url(path)),
            in_stock: card.quantity > 0,
            id: card.id,
            name: card.name,
            slug: card.slug,
            price: card.price,
            sold: card.sold,
            views: card.views,
            brand_name: card.brand_name,
            brand_slug: card.brand_slug,
            category_name: card.category_name,
            category_slug: card.category_slug,
            created_at: card.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GalleryImageDto {
    pub id: Uuid,
    pub image_name: String,
    pub image_url: String,
}

impl GalleryImageDto {
    pub fn from_image(image: ProductImage, storage: &dyn ImageStorage) -> Self {
        Self {
            id: image.id,
            image_url: storage.public_url(&image.image_path),
            image_name: image.image_name,
        }
    }
}

/// Storefront product page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductDetailDto {
    pub product: ProductCardDto,
    pub description: Option<String>,
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub gallery: Vec<GalleryImageDto>,
    /// Active products of the same category, excluding this one
    pub related: Vec<ProductCardDto>,
    /// Number of top-level reviews
    pub review_count: i64,
    /// Mean rating over rated reviews, `None` when nothing is rated yet
    pub average_rating: Option<f64>,
}

/// Pickers for the product create/edit forms
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductFormOptionsDto {
    pub category_options: CategoryOptionsDto,
    pub brands: Vec<BrandResponseDto>,
}

/// Product plus form pickers with its category preselected
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductEditDto {
    pub product: ProductResponseDto,
    pub form: ProductFormOptionsDto,
}
