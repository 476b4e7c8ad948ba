use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::core::error::{handle_db_error, AppError, Result};
use crate::features::brands::BrandService;
use crate::features::categories::CategoryService;
use crate::features::products::dtos::{
    GalleryImageDto, ProductCardDto, ProductDetailDto, ProductEditDto, ProductFormOptionsDto,
    ProductResponseDto, SaveProductDto,
};
use crate::features::products::models::{
    Product, ProductCard, ProductImage, Tag, PRODUCT_CARD_FROM, PRODUCT_CARD_SELECT,
    PRODUCT_COLUMNS,
};
use crate::modules::storage::{ImageStorage, ImageUpload, StoredImage};
use crate::shared::constants::{PRODUCT_IMAGE_FOLDER, RELATED_PRODUCTS_LIMIT};
use crate::shared::types::{PageWindow, Paginated, PaginationQuery};
use crate::shared::validation::slug_or_generate;

/// Which active products a storefront listing shows
#[derive(Debug, Clone)]
pub enum ProductScope {
    All,
    /// Products in any of these categories
    Categories(Vec<Uuid>),
    Brand(Uuid),
}

fn push_scope(builder: &mut QueryBuilder<'_, Postgres>, scope: &ProductScope) {
    builder.push(" WHERE p.is_active = TRUE");
    match scope {
        ProductScope::All => {}
        ProductScope::Categories(ids) => {
            builder.push(" AND p.category_id = ANY(");
            builder.push_bind(ids.clone());
            builder.push(")");
        }
        ProductScope::Brand(id) => {
            builder.push(" AND p.brand_id = ");
            builder.push_bind(*id);
        }
    }
}

/// Service for product operations
pub struct ProductService {
    pool: PgPool,
    storage: Arc<dyn ImageStorage>,
    categories: Arc<CategoryService>,
    brands: Arc<BrandService>,
}

impl ProductService {
    pub fn new(
        pool: PgPool,
        storage: Arc<dyn ImageStorage>,
        categories: Arc<CategoryService>,
        brands: Arc<BrandService>,
    ) -> Self {
        Self {
            pool,
            storage,
            categories,
            brands,
        }
    }

    async fn find(&self, id: Uuid) -> Result<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "product"))?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
    }

    async fn load_tags(&self, product_id: Uuid) -> Result<Vec<String>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name
            FROM tags t
            JOIN product_tags pt ON pt.tag_id = t.id
            WHERE pt.product_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "tag"))?;

        Ok(tags.into_iter().map(|t| t.name).collect())
    }

    /// Resolve-or-create every tag name and return their ids
    async fn resolve_tags(tx: &mut Transaction<'_, Postgres>, names: &[String]) -> Result<Vec<Uuid>> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let id: Uuid = sqlx::query_scalar(
                r#"
                INSERT INTO tags (name) VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                "#,
            )
            .bind(name)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| handle_db_error(e, "tag"))?;
            ids.push(id);
        }
        Ok(ids)
    }

    async fn attach_tags(tx: &mut Transaction<'_, Postgres>, product_id: Uuid, tag_ids: &[Uuid]) -> Result<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            r#"
            INSERT INTO product_tags (product_id, tag_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(product_id)
        .bind(tag_ids)
        .execute(&mut **tx)
        .await
        .map_err(|e| handle_db_error(e, "product tag"))?;
        Ok(())
    }

    /// Make the product's tag set exactly `tag_ids`
    async fn sync_tags(tx: &mut Transaction<'_, Postgres>, product_id: Uuid, tag_ids: &[Uuid]) -> Result<()> {
        sqlx::query("DELETE FROM product_tags WHERE product_id = $1 AND tag_id <> ALL($2::uuid[])")
            .bind(product_id)
            .bind(tag_ids)
            .execute(&mut **tx)
            .await
            .map_err(|e| handle_db_error(e, "product tag"))?;

        Self::attach_tags(tx, product_id, tag_ids).await
    }

    /// Best-effort removal of an image the database no longer points at
    async fn discard_image(&self, file_path: &str) {
        if let Err(e) = self.storage.delete(file_path).await {
            warn!("Failed to remove image '{}': {}", file_path, e);
        }
    }

    fn slug_for(dto: &SaveProductDto) -> Result<String> {
        slug_or_generate(dto.slug.as_deref(), &dto.name)
            .ok_or_else(|| AppError::Validation("slug: cannot derive a slug from the name".to_string()))
    }

    async fn insert_with_tags(
        &self,
        dto: &SaveProductDto,
        slug: &str,
        image: Option<&StoredImage>,
        tags: &[String],
    ) -> Result<Product> {
        let mut tx = self.pool.begin().await.map_err(|e| handle_db_error(e, "product"))?;

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (
                category_id, brand_id, name, slug, price, cost, quantity,
                description, content, image_name, image_path, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(dto.category_id)
        .bind(dto.brand_id)
        .bind(&dto.name)
        .bind(slug)
        .bind(dto.price)
        .bind(dto.cost.unwrap_or_default())
        .bind(dto.quantity)
        .bind(&dto.description)
        .bind(&dto.content)
        .bind(image.map(|i| i.file_name.as_str()))
        .bind(image.map(|i| i.file_path.as_str()))
        .bind(dto.is_active.unwrap_or(true))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| handle_db_error(e, "product"))?;

        let tag_ids = Self::resolve_tags(&mut tx, tags).await?;
        Self::attach_tags(&mut tx, product.id, &tag_ids).await?;

        tx.commit().await.map_err(|e| handle_db_error(e, "product"))?;
        Ok(product)
    }

    /// Create a product with its feature image and tags as one unit.
    ///
    /// The image is uploaded first; if anything in the database transaction
    /// fails the row, tags and links are rolled back and the upload is removed.
    pub async fn create(&self, dto: SaveProductDto, image: Option<ImageUpload>) -> Result<ProductResponseDto> {
        let slug = Self::slug_for(&dto)?;
        let tags = dto.normalized_tags();

        let stored = self.storage.store(image, PRODUCT_IMAGE_FOLDER).await?;

        match self.insert_with_tags(&dto, &slug, stored.as_ref(), &tags).await {
            Ok(product) => {
                info!("Product created: {} ({})", product.name, product.id);
                Ok(ProductResponseDto::from_product(product, tags, self.storage.as_ref()))
            }
            Err(e) => {
                error!("Failed to create product '{}': {}", dto.name, e);
                if let Some(image) = &stored {
                    self.discard_image(&image.file_path).await;
                }
                Err(e)
            }
        }
    }

    async fn update_with_tags(
        &self,
        id: Uuid,
        dto: &SaveProductDto,
        slug: &str,
        image: Option<&StoredImage>,
        tags: &[String],
    ) -> Result<Product> {
        let mut tx = self.pool.begin().await.map_err(|e| handle_db_error(e, "product"))?;

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET category_id = $2, brand_id = $3, name = $4, slug = $5, price = $6,
                cost = COALESCE($7, cost), quantity = $8, description = $9, content = $10,
                image_name = COALESCE($11, image_name), image_path = COALESCE($12, image_path),
                is_active = COALESCE($13, is_active), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(dto.category_id)
        .bind(dto.brand_id)
        .bind(&dto.name)
        .bind(slug)
        .bind(dto.price)
        .bind(dto.cost)
        .bind(dto.quantity)
        .bind(&dto.description)
        .bind(&dto.content)
        .bind(image.map(|i| i.file_name.as_str()))
        .bind(image.map(|i| i.file_path.as_str()))
        .bind(dto.is_active)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| handle_db_error(e, "product"))?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

        let tag_ids = Self::resolve_tags(&mut tx, tags).await?;
        Self::sync_tags(&mut tx, product.id, &tag_ids).await?;

        tx.commit().await.map_err(|e| handle_db_error(e, "product"))?;
        Ok(product)
    }

    /// Update a product, optionally replacing its feature image, and sync its tags.
    ///
    /// The previous image is only removed once the new state is committed.
    pub async fn update(
        &self,
        id: Uuid,
        dto: SaveProductDto,
        image: Option<ImageUpload>,
    ) -> Result<ProductResponseDto> {
        let slug = Self::slug_for(&dto)?;
        let tags = dto.normalized_tags();
        let existing = self.find(id).await?;

        let stored = self.storage.store(image, PRODUCT_IMAGE_FOLDER).await?;

        match self.update_with_tags(id, &dto, &slug, stored.as_ref(), &tags).await {
            Ok(product) => {
                if stored.is_some() {
                    if let Some(old_path) = existing.image_path.as_deref() {
                        self.discard_image(old_path).await;
                    }
                }
                info!("Product updated: {} ({})", product.name, product.id);
                Ok(ProductResponseDto::from_product(product, tags, self.storage.as_ref()))
            }
            Err(e) => {
                error!("Failed to update product {}: {}", id, e);
                if let Some(image) = &stored {
                    self.discard_image(&image.file_path).await;
                }
                Err(e)
            }
        }
    }

    /// Activate or deactivate a product
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<ProductResponseDto> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "product"))?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

        info!(
            "Product {} {}",
            product.id,
            if is_active { "activated" } else { "deactivated" }
        );
        let tags = self.load_tags(product.id).await?;
        Ok(ProductResponseDto::from_product(product, tags, self.storage.as_ref()))
    }

    /// Delete a product, then its feature and gallery images
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let product = self.find(id).await?;

        let gallery: Vec<String> =
            sqlx::query_scalar("SELECT image_path FROM product_images WHERE product_id = $1")
                .bind(id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| handle_db_error(e, "product image"))?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "product"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }

        join_all(
            product
                .image_path
                .iter()
                .chain(gallery.iter())
                .map(|path| self.discard_image(path)),
        )
        .await;

        info!("Product deleted: {} ({})", product.name, id);
        Ok(())
    }

    /// Admin listing, newest first
    pub async fn list_admin(&self, query: &PaginationQuery) -> Result<Paginated<ProductResponseDto>> {
        let window = query.window();

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "product"))?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
            PRODUCT_COLUMNS
        ))
        .bind(window.limit())
        .bind(window.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "product"))?;

        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let rows: Vec<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT pt.product_id, t.name
            FROM product_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.product_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "tag"))?;

        let mut tags_by_product: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (product_id, name) in rows {
            tags_by_product.entry(product_id).or_default().push(name);
        }

        let storage = self.storage.as_ref();
        Ok(Paginated::new(products, total, window).map(|p| {
            let tags = tags_by_product.remove(&p.id).unwrap_or_default();
            ProductResponseDto::from_product(p, tags, storage)
        }))
    }

    /// Category and brand pickers for the product forms
    pub async fn form_options(&self, selected_category: Option<Uuid>) -> Result<ProductFormOptionsDto> {
        Ok(ProductFormOptionsDto {
            category_options: self.categories.options(selected_category).await?,
            brands: self.brands.list_all().await?,
        })
    }

    /// Product with the edit form pickers, its category preselected
    pub async fn get_for_edit(&self, id: Uuid) -> Result<ProductEditDto> {
        let product = self.find(id).await?;
        let tags = self.load_tags(id).await?;
        let form = self.form_options(Some(product.category_id)).await?;

        Ok(ProductEditDto {
            product: ProductResponseDto::from_product(product, tags, self.storage.as_ref()),
            form,
        })
    }

    async fn card(&self, id: Uuid) -> Result<ProductCard> {
        sqlx::query_as::<_, ProductCard>(&format!("{} WHERE p.id = $1", PRODUCT_CARD_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "product"))?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
    }

    /// Storefront product page; counts the visit
    pub async fn get_detail(&self, slug: &str) -> Result<ProductDetailDto> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET views = views + 1 WHERE slug = $1 AND is_active = TRUE RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "product"))?
        .ok_or_else(|| AppError::NotFound(format!("Product '{}' not found", slug)))?;

        let card = self.card(product.id).await?;
        let tags = self.load_tags(product.id).await?;

        let gallery = sqlx::query_as::<_, ProductImage>(
            r#"
            SELECT id, product_id, image_name, image_path, created_at
            FROM product_images
            WHERE product_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(product.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "product image"))?;

        let related = sqlx::query_as::<_, ProductCard>(&format!(
            "{} WHERE p.category_id = $1 AND p.id <> $2 AND p.is_active = TRUE \
             ORDER BY p.created_at DESC, p.id LIMIT $3",
            PRODUCT_CARD_SELECT
        ))
        .bind(product.category_id)
        .bind(product.id)
        .bind(RELATED_PRODUCTS_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "product"))?;

        let (review_count, average_rating): (i64, Option<f64>) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE parent_id IS NULL), AVG(rating)::float8
            FROM comments
            WHERE product_id = $1
            "#,
        )
        .bind(product.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "comment"))?;

        let storage = self.storage.as_ref();
        Ok(ProductDetailDto {
            product: ProductCardDto::from_card(card, storage),
            description: product.description,
            content: product.content,
            tags,
            gallery: gallery
                .into_iter()
                .map(|g| GalleryImageDto::from_image(g, storage))
                .collect(),
            related: related
                .into_iter()
                .map(|c| ProductCardDto::from_card(c, storage))
                .collect(),
            review_count,
            average_rating,
        })
    }

    /// Active products in `scope`, newest first
    pub async fn list_cards(&self, scope: &ProductScope, window: PageWindow) -> Result<Paginated<ProductCardDto>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) ");
        count.push(PRODUCT_CARD_FROM);
        push_scope(&mut count, scope);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "product"))?;

        let mut select = QueryBuilder::<Postgres>::new(PRODUCT_CARD_SELECT);
        push_scope(&mut select, scope);
        select.push(" ORDER BY p.created_at DESC, p.id LIMIT ");
        select.push_bind(window.limit());
        select.push(" OFFSET ");
        select.push_bind(window.offset());

        let cards = select
            .build_query_as::<ProductCard>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "product"))?;

        let storage = self.storage.as_ref();
        Ok(Paginated::new(cards, total, window).map(|c| ProductCardDto::from_card(c, storage)))
    }

    /// Newest active products
    pub async fn latest(&self, limit: i64) -> Result<Vec<ProductCardDto>> {
        self.top_cards("p.created_at DESC, p.id", limit).await
    }

    /// Best-selling active products, newest first among equals
    pub async fn best_sellers(&self, limit: i64) -> Result<Vec<ProductCardDto>> {
        self.top_cards("p.sold DESC, p.created_at DESC, p.id", limit).await
    }

    async fn top_cards(&self, order: &str, limit: i64) -> Result<Vec<ProductCardDto>> {
        let cards = sqlx::query_as::<_, ProductCard>(&format!(
            "{} WHERE p.is_active = TRUE ORDER BY {} LIMIT $1",
            PRODUCT_CARD_SELECT, order
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "product"))?;

        let storage = self.storage.as_ref();
        Ok(cards
            .into_iter()
            .map(|c| ProductCardDto::from_card(c, storage))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::lazy_test_pool;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    /// Storage double that records deletes and can be told to fail uploads
    #[derive(Default)]
    struct RecordingStorage {
        fail_uploads: bool,
        stored: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageStorage for RecordingStorage {
        async fn store(&self, upload: Option<ImageUpload>, folder: &str) -> Result<Option<StoredImage>> {
            let Some(upload) = upload else {
                return Ok(None);
            };
            if self.fail_uploads {
                return Err(AppError::Storage("bucket unreachable".to_string()));
            }
            let path = upload.object_key("public", folder);
            self.stored.lock().unwrap().push(path.clone());
            Ok(Some(StoredImage {
                file_name: upload.file_name,
                file_path: path,
            }))
        }

        async fn delete(&self, file_path: &str) -> Result<()> {
            self.deleted.lock().unwrap().push(file_path.to_string());
            Ok(())
        }

        fn public_url(&self, file_path: &str) -> String {
            format!("http://images.test/{}", file_path)
        }
    }

    fn service(storage: Arc<RecordingStorage>) -> ProductService {
        let pool = lazy_test_pool();
        ProductService::new(
            pool.clone(),
            storage,
            Arc::new(CategoryService::new(pool.clone())),
            Arc::new(BrandService::new(pool)),
        )
    }

    fn dto() -> SaveProductDto {
        SaveProductDto {
            name: "Sony WH-1000XM5".to_string(),
            price: Decimal::new(799_000_000, 2),
            quantity: 3,
            category_id: Uuid::new_v4(),
            brand_id: Uuid::new_v4(),
            tags: vec!["headphones".to_string()],
            ..Default::default()
        }
    }

    fn image() -> ImageUpload {
        ImageUpload {
            file_name: "xm5.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[tokio::test]
    async fn test_failed_upload_aborts_before_database() {
        let storage = Arc::new(RecordingStorage {
            fail_uploads: true,
            ..Default::default()
        });
        let service = service(storage.clone());

        let result = service.create(dto(), Some(image())).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(storage.stored.lock().unwrap().is_empty());
        assert!(storage.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_database_failure_removes_fresh_upload() {
        let storage = Arc::new(RecordingStorage::default());
        let service = service(storage.clone());

        // The lazy pool points at a closed port, so the transaction cannot start
        let result = service.create(dto(), Some(image())).await;

        assert!(result.is_err());
        let stored = storage.stored.lock().unwrap().clone();
        assert_eq!(stored.len(), 1);
        assert_eq!(*storage.deleted.lock().unwrap(), stored);
    }

    #[tokio::test]
    async fn test_unsluggable_name_rejected_before_upload() {
        let storage = Arc::new(RecordingStorage::default());
        let service = service(storage.clone());
        let mut invalid = dto();
        invalid.name = "???".to_string();

        let result = service.create(invalid, Some(image())).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(storage.stored.lock().unwrap().is_empty());
    }

    #[test]
    fn test_scope_filters_stay_behind_active_check() {
        let id = Uuid::new_v4();
        let mut builder = QueryBuilder::<Postgres>::new(PRODUCT_CARD_SELECT);
        push_scope(&mut builder, &ProductScope::Categories(vec![id]));
        assert!(builder
            .sql()
            .ends_with(" WHERE p.is_active = TRUE AND p.category_id = ANY($1)"));

        let mut builder = QueryBuilder::<Postgres>::new(PRODUCT_CARD_SELECT);
        push_scope(&mut builder, &ProductScope::All);
        assert!(builder.sql().ends_with(" WHERE p.is_active = TRUE"));
    }
}
