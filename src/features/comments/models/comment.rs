use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a review or a staff reply
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub product_id: Uuid,
    /// `None` for top-level reviews
    pub parent_id: Option<Uuid>,
    pub author_name: String,
    pub author_phone: String,
    pub content: String,
    /// 0-5 in half steps; replies carry no rating
    pub rating: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

pub const COMMENT_COLUMNS: &str =
    "id, product_id, parent_id, author_name, author_phone, content, rating, created_at";
