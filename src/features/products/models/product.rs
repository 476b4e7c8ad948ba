use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for product
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    pub cost: Decimal,
    pub quantity: i32,
    pub sold: i32,
    pub views: i64,
    pub description: Option<String>,
    pub content: Option<String>,
    pub image_name: Option<String>,
    pub image_path: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const PRODUCT_COLUMNS: &str = "id, category_id, brand_id, name, slug, price, cost, quantity, \
     sold, views, description, content, image_name, image_path, is_active, created_at, updated_at";

/// Product row joined with its brand and category names, for listings
#[derive(Debug, Clone, FromRow)]
pub struct ProductCard {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    pub image_path: Option<String>,
    pub quantity: i32,
    pub sold: i32,
    pub views: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub brand_name: String,
    pub brand_slug: String,
    pub category_name: String,
    pub category_slug: String,
}

/// SELECT/FROM prefix for [`ProductCard`] queries; aliases `p`, `b`, `c`
pub const PRODUCT_CARD_SELECT: &str = "SELECT p.id, p.name, p.slug, p.price, p.image_path, \
     p.quantity, p.sold, p.views, p.is_active, p.created_at, \
     b.name AS brand_name, b.slug AS brand_slug, c.name AS category_name, c.slug AS category_slug \
     FROM products p \
     JOIN brands b ON b.id = p.brand_id \
     JOIN categories c ON c.id = p.category_id";

/// FROM clause matching [`PRODUCT_CARD_SELECT`], for COUNT queries
pub const PRODUCT_CARD_FROM: &str = "FROM products p \
     JOIN brands b ON b.id = p.brand_id \
     JOIN categories c ON c.id = p.category_id";

#[derive(Debug, Clone, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

/// Gallery image attached to a product
#[derive(Debug, Clone, FromRow)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub image_name: String,
    pub image_path: String,
    pub created_at: DateTime<Utc>,
}
