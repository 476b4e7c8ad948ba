use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{handle_db_error, AppError, Result};
use crate::features::brands::dtos::{BrandResponseDto, SaveBrandDto};
use crate::features::brands::models::{Brand, BRAND_COLUMNS};
use crate::shared::types::{Paginated, PaginationQuery};
use crate::shared::validation::slug_or_generate;

/// Service for brand operations
pub struct BrandService {
    pool: PgPool,
}

impl BrandService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active brands ordered by name
    pub async fn list_active(&self) -> Result<Vec<Brand>> {
        sqlx::query_as::<_, Brand>(&format!(
            "SELECT {} FROM brands WHERE is_active = TRUE ORDER BY name, id",
            BRAND_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list brands: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn list(&self) -> Result<Vec<BrandResponseDto>> {
        let brands = self.list_active().await?;
        Ok(brands.into_iter().map(|b| b.into()).collect())
    }

    /// Every brand regardless of status, for admin pickers
    pub async fn list_all(&self) -> Result<Vec<BrandResponseDto>> {
        let brands = sqlx::query_as::<_, Brand>(&format!(
            "SELECT {} FROM brands ORDER BY name, id",
            BRAND_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "brand"))?;

        Ok(brands.into_iter().map(|b| b.into()).collect())
    }

    pub async fn get_active_by_slug(&self, slug: &str) -> Result<Brand> {
        sqlx::query_as::<_, Brand>(&format!(
            "SELECT {} FROM brands WHERE slug = $1 AND is_active = TRUE",
            BRAND_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get brand by slug: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Brand '{}' not found", slug)))
    }

    /// Admin listing, newest first
    pub async fn list_admin(&self, query: &PaginationQuery) -> Result<Paginated<BrandResponseDto>> {
        let window = query.window();

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM brands")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "brand"))?;

        let brands = sqlx::query_as::<_, Brand>(&format!(
            "SELECT {} FROM brands ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
            BRAND_COLUMNS
        ))
        .bind(window.limit())
        .bind(window.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "brand"))?;

        Ok(Paginated::new(brands, total, window).map(BrandResponseDto::from))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<BrandResponseDto> {
        sqlx::query_as::<_, Brand>(&format!("SELECT {} FROM brands WHERE id = $1", BRAND_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "brand"))?
            .map(BrandResponseDto::from)
            .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", id)))
    }

    pub async fn create(&self, dto: SaveBrandDto) -> Result<BrandResponseDto> {
        let slug = slug_or_generate(dto.slug.as_deref(), &dto.name)
            .ok_or_else(|| AppError::Validation("slug: cannot derive a slug from the name".to_string()))?;

        let brand = sqlx::query_as::<_, Brand>(&format!(
            r#"
            INSERT INTO brands (name, slug, description, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            BRAND_COLUMNS
        ))
        .bind(dto.name.trim())
        .bind(&slug)
        .bind(&dto.description)
        .bind(dto.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "brand"))?;

        info!("Brand created: {} ({})", brand.name, brand.id);
        Ok(brand.into())
    }

    pub async fn update(&self, id: Uuid, dto: SaveBrandDto) -> Result<BrandResponseDto> {
        let slug = slug_or_generate(dto.slug.as_deref(), &dto.name)
            .ok_or_else(|| AppError::Validation("slug: cannot derive a slug from the name".to_string()))?;

        let brand = sqlx::query_as::<_, Brand>(&format!(
            r#"
            UPDATE brands
            SET name = $2, slug = $3, description = $4,
                is_active = COALESCE($5, is_active), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BRAND_COLUMNS
        ))
        .bind(id)
        .bind(dto.name.trim())
        .bind(&slug)
        .bind(&dto.description)
        .bind(dto.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "brand"))?
        .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", id)))?;

        info!("Brand updated: {} ({})", brand.name, brand.id);
        Ok(brand.into())
    }

    /// Activate or deactivate a brand
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<BrandResponseDto> {
        let brand = sqlx::query_as::<_, Brand>(&format!(
            "UPDATE brands SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            BRAND_COLUMNS
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "brand"))?
        .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", id)))?;

        info!(
            "Brand {} {}",
            brand.id,
            if is_active { "activated" } else { "deactivated" }
        );
        Ok(brand.into())
    }

    /// Delete a brand; fails with Conflict while products reference it
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "brand"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Brand {} not found", id)));
        }

        info!("Brand deleted: {}", id);
        Ok(())
    }
}
