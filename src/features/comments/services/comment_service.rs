use std::collections::HashMap;

use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::core::error::{handle_db_error, AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::{
    AdminCommentDto, CommentResponseDto, CommentThreadDto, CreateCommentDto, ReplyCommentDto,
    ReplyDto,
};
use crate::features::comments::models::{Comment, COMMENT_COLUMNS};
use crate::shared::types::{PaginationQuery, Paginated};

#[derive(Debug, FromRow)]
struct AdminCommentRow {
    #[sqlx(flatten)]
    comment: Comment,
    product_name: String,
    reply_count: i64,
}

/// Group replies under their top-level comments, keeping both input orders
pub(crate) fn thread_comments(top_level: Vec<Comment>, replies: Vec<Comment>) -> Vec<CommentThreadDto> {
    let mut by_parent: HashMap<Uuid, Vec<ReplyDto>> = HashMap::new();
    for reply in replies {
        if let Some(parent_id) = reply.parent_id {
            by_parent.entry(parent_id).or_default().push(ReplyDto::from(reply));
        }
    }

    top_level
        .into_iter()
        .map(|comment| {
            let replies = by_parent.remove(&comment.id).unwrap_or_default();
            CommentThreadDto::new(comment, replies)
        })
        .collect()
}

/// Service for product reviews and staff replies
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn active_product_id(&self, slug: &str) -> Result<Uuid> {
        sqlx::query_scalar("SELECT id FROM products WHERE slug = $1 AND is_active = TRUE")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "product"))?
            .ok_or_else(|| AppError::NotFound(format!("Product '{}' not found", slug)))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Comment> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "comment"))?
        .ok_or_else(|| AppError::NotFound(format!("Comment with id '{}' not found", id)))
    }

    /// Add a top-level review to an active product
    pub async fn create(&self, product_slug: &str, dto: CreateCommentDto) -> Result<CommentResponseDto> {
        let dto = dto.trimmed();
        dto.check()?;
        let product_id = self.active_product_id(product_slug).await?;

        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (product_id, parent_id, author_name, author_phone, content, rating)
            VALUES ($1, NULL, $2, $3, $4, $5)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(product_id)
        .bind(&dto.author_name)
        .bind(&dto.author_phone)
        .bind(&dto.content)
        .bind(dto.rating)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "comment"))?;

        info!("Review {} added to product {}", comment.id, product_id);
        Ok(CommentResponseDto::from(comment))
    }

    /// Reviews of an active product, newest first, each with its replies oldest first
    pub async fn list_for_product(&self, product_slug: &str) -> Result<Vec<CommentThreadDto>> {
        let product_id = self.active_product_id(product_slug).await?;

        let top_level = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {} FROM comments
            WHERE product_id = $1 AND parent_id IS NULL
            ORDER BY created_at DESC, id
            "#,
            COMMENT_COLUMNS
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "comment"))?;

        let replies = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {} FROM comments
            WHERE product_id = $1 AND parent_id IS NOT NULL
            ORDER BY created_at ASC, id
            "#,
            COMMENT_COLUMNS
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "comment"))?;

        Ok(thread_comments(top_level, replies))
    }

    /// Top-level reviews for moderation, grouped by product then newest first
    pub async fn list_admin(&self, query: &PaginationQuery) -> Result<Paginated<AdminCommentDto>> {
        let window = query.window();

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE parent_id IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| handle_db_error(e, "comment"))?;

        let rows = sqlx::query_as::<_, AdminCommentRow>(
            r#"
            SELECT c.id, c.product_id, c.parent_id, c.author_name, c.author_phone,
                   c.content, c.rating, c.created_at,
                   p.name AS product_name,
                   (SELECT COUNT(*) FROM comments r WHERE r.parent_id = c.id) AS reply_count
            FROM comments c
            JOIN products p ON p.id = c.product_id
            WHERE c.parent_id IS NULL
            ORDER BY c.product_id, c.created_at DESC, c.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(window.limit())
        .bind(window.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "comment"))?;

        Ok(Paginated::new(rows, total, window).map(|row| AdminCommentDto {
            id: row.comment.id,
            product_id: row.comment.product_id,
            product_name: row.product_name,
            author_name: row.comment.author_name,
            author_phone: row.comment.author_phone,
            content: row.comment.content,
            rating: row.comment.rating,
            reply_count: row.reply_count,
            created_at: row.comment.created_at,
        }))
    }

    /// Staff reply to a top-level review; the reply joins the review's product.
    /// `dto` is expected trimmed and validated.
    pub async fn reply(
        &self,
        parent_id: Uuid,
        dto: ReplyCommentDto,
        user: &AuthenticatedUser,
    ) -> Result<CommentResponseDto> {
        let parent = self.get_by_id(parent_id).await?;
        if !parent.is_top_level() {
            return Err(AppError::Validation(
                "parent_id: replies can only be added to top-level comments".to_string(),
            ));
        }

        let author_name = user.reply_display_name();
        let author_phone = user.phone.clone().unwrap_or_default();

        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (product_id, parent_id, author_name, author_phone, content, rating)
            VALUES ($1, $2, $3, $4, $5, NULL)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(parent.product_id)
        .bind(parent.id)
        .bind(&author_name)
        .bind(&author_phone)
        .bind(&dto.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "comment"))?;

        info!(
            "{} replied to comment {} on product {}",
            user.sub, parent.id, parent.product_id
        );
        Ok(CommentResponseDto::from(comment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    fn comment(product_id: Uuid, parent_id: Option<Uuid>, minutes_ago: i64) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            product_id,
            parent_id,
            author_name: "Linh".to_string(),
            author_phone: String::new(),
            content: format!("posted {} minutes ago", minutes_ago),
            rating: parent_id.is_none().then(|| Decimal::new(35, 1)),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_replies_are_grouped_under_their_parent() {
        let product = Uuid::new_v4();
        let newer = comment(product, None, 5);
        let older = comment(product, None, 60);
        let first_reply = comment(product, Some(older.id), 50);
        let second_reply = comment(product, Some(older.id), 10);

        let threads = thread_comments(
            vec![newer.clone(), older.clone()],
            vec![first_reply.clone(), second_reply.clone()],
        );

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].id, newer.id);
        assert!(threads[0].replies.is_empty());
        assert_eq!(threads[1].id, older.id);
        let reply_ids: Vec<Uuid> = threads[1].replies.iter().map(|r| r.id).collect();
        assert_eq!(reply_ids, vec![first_reply.id, second_reply.id]);

        let stars = threads[1].stars.unwrap();
        assert_eq!(stars.full_stars, 3);
        assert!(stars.half_star);
    }

    #[test]
    fn test_orphan_replies_are_dropped() {
        let product = Uuid::new_v4();
        let review = comment(product, None, 5);
        let stray = comment(product, Some(Uuid::new_v4()), 1);

        let threads = thread_comments(vec![review], vec![stray]);

        assert_eq!(threads.len(), 1);
        assert!(threads[0].replies.is_empty());
    }
}
