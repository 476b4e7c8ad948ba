use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{handle_db_error, AppError, Result};
use crate::features::categories::dtos::{
    CategoryOptionsDto, CategoryResponseDto, CategoryTreeDto, SaveCategoryDto,
};
use crate::features::categories::models::{Category, CATEGORY_COLUMNS};
use crate::features::categories::tree::{build_category_options, CategoryOptionTree};
use crate::shared::types::{Paginated, PaginationQuery};
use crate::shared::validation::slug_or_generate;

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_active(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE is_active = TRUE ORDER BY display_order, name",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find(&self, id: Uuid) -> Result<Category> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "category"))?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    /// List all active categories (flat list)
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.fetch_active().await?;
        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// List all active categories as tree structure
    pub async fn list_tree(&self) -> Result<Vec<CategoryTreeDto>> {
        let categories = self.fetch_active().await?;
        Ok(CategoryTreeDto::build_tree(&categories))
    }

    /// Root categories for storefront navigation
    pub async fn list_roots(&self, order_by_name: bool, limit: Option<i64>) -> Result<Vec<Category>> {
        let order = if order_by_name {
            "name, id"
        } else {
            "display_order, name, id"
        };
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE is_active = TRUE AND parent_id IS NULL ORDER BY {} LIMIT $1",
            CATEGORY_COLUMNS, order
        ))
        .bind(limit.unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list root categories: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Active category by slug
    pub async fn get_active_by_slug(&self, slug: &str) -> Result<Category> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE slug = $1 AND is_active = TRUE",
            CATEGORY_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by slug: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))
    }

    /// Active direct children of a category
    pub async fn list_children(&self, parent_id: Uuid) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE parent_id = $1 AND is_active = TRUE ORDER BY display_order, name",
            CATEGORY_COLUMNS
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list child categories: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Admin listing, newest first
    pub async fn list_admin(&self, query: &PaginationQuery) -> Result<Paginated<CategoryResponseDto>> {
        let window = query.window();

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "category"))?;

        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
            CATEGORY_COLUMNS
        ))
        .bind(window.limit())
        .bind(window.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "category"))?;

        Ok(Paginated::new(categories, total, window).map(CategoryResponseDto::from))
    }

    /// Ordered picker entries over the active categories, with `selected` marked
    pub async fn option_tree(&self, selected: Option<Uuid>) -> Result<CategoryOptionTree> {
        let categories = self.fetch_active().await?;
        Ok(build_category_options(&categories, selected))
    }

    pub async fn options(&self, selected: Option<Uuid>) -> Result<CategoryOptionsDto> {
        let tree = self.option_tree(selected).await?;
        let html = tree.render_html()?;
        Ok(CategoryOptionsDto {
            options: tree.entries,
            cycles: tree.cycles,
            html,
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<CategoryResponseDto> {
        Ok(self.find(id).await?.into())
    }

    async fn ensure_parent_exists(&self, parent_id: Uuid) -> Result<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(parent_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "category"))?;

        if !exists {
            return Err(AppError::Validation(format!(
                "parent_id: category {} does not exist",
                parent_id
            )));
        }
        Ok(())
    }

    /// Reject a parent that is the category itself or one of its descendants
    async fn ensure_no_cycle(&self, id: Uuid, parent_id: Uuid) -> Result<()> {
        if id == parent_id {
            return Err(AppError::Validation(
                "parent_id: a category cannot be its own parent".to_string(),
            ));
        }

        // UNION (not UNION ALL) stops on already-corrupt cyclic data
        let creates_cycle: bool = sqlx::query_scalar(
            r#"
            WITH RECURSIVE ancestors(id, parent_id) AS (
                SELECT id, parent_id FROM categories WHERE id = $1
                UNION
                SELECT c.id, c.parent_id
                FROM categories c
                JOIN ancestors a ON c.id = a.parent_id
            )
            SELECT EXISTS(SELECT 1 FROM ancestors WHERE id = $2)
            "#,
        )
        .bind(parent_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "category"))?;

        if creates_cycle {
            return Err(AppError::Validation(
                "parent_id: a category cannot be moved below one of its descendants".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn create(&self, dto: SaveCategoryDto) -> Result<CategoryResponseDto> {
        let slug = slug_or_generate(dto.slug.as_deref(), &dto.name)
            .ok_or_else(|| AppError::Validation("slug: cannot derive a slug from the name".to_string()))?;

        if let Some(parent_id) = dto.parent_id {
            self.ensure_parent_exists(parent_id).await?;
        }

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (parent_id, name, slug, description, display_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(dto.parent_id)
        .bind(dto.name.trim())
        .bind(&slug)
        .bind(&dto.description)
        .bind(dto.display_order.unwrap_or(0))
        .bind(dto.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "category"))?;

        info!("Category created: {} ({})", category.name, category.id);
        Ok(category.into())
    }

    pub async fn update(&self, id: Uuid, dto: SaveCategoryDto) -> Result<CategoryResponseDto> {
        let existing = self.find(id).await?;

        let slug = slug_or_generate(dto.slug.as_deref(), &dto.name)
            .ok_or_else(|| AppError::Validation("slug: cannot derive a slug from the name".to_string()))?;

        if let Some(parent_id) = dto.parent_id {
            self.ensure_parent_exists(parent_id).await?;
            self.ensure_no_cycle(id, parent_id).await?;
        }

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET parent_id = $2, name = $3, slug = $4, description = $5,
                display_order = $6, is_active = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .bind(dto.parent_id)
        .bind(dto.name.trim())
        .bind(&slug)
        .bind(&dto.description)
        .bind(dto.display_order.unwrap_or(existing.display_order))
        .bind(dto.is_active.unwrap_or(existing.is_active))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "category"))?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        info!("Category updated: {} ({})", category.name, category.id);
        Ok(category.into())
    }

    /// Activate or deactivate a category
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<CategoryResponseDto> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "category"))?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        info!(
            "Category {} {}",
            category.id,
            if is_active { "activated" } else { "deactivated" }
        );
        Ok(category.into())
    }

    /// Delete a category; fails with Conflict while products or children reference it
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "category"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        info!("Category deleted: {}", id);
        Ok(())
    }
}
