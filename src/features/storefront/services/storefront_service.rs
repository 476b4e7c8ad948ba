use std::sync::Arc;

use crate::core::error::Result;
use crate::features::brands::BrandService;
use crate::features::categories::models::Category;
use crate::features::categories::CategoryService;
use crate::features::products::services::{ProductScope, ProductService};
use crate::features::storefront::dtos::{BrandPageDto, CategoryPageDto, HomeDto, ShopDto};
use crate::shared::constants::{
    HOME_CATEGORY_LIMIT, HOME_LATEST_LIMIT, HOME_TOP_SELLING_LIMIT, SHOP_PAGE_SIZE,
};
use crate::shared::types::{Meta, PageQuery};

/// A category page lists the category's own products and its direct children's
pub(crate) fn category_scope(category: &Category, children: &[Category]) -> ProductScope {
    let ids = std::iter::once(category.id)
        .chain(children.iter().map(|c| c.id))
        .collect();
    ProductScope::Categories(ids)
}

/// Composes catalog reads into storefront pages
pub struct StorefrontService {
    categories: Arc<CategoryService>,
    brands: Arc<BrandService>,
    products: Arc<ProductService>,
}

impl StorefrontService {
    pub fn new(
        categories: Arc<CategoryService>,
        brands: Arc<BrandService>,
        products: Arc<ProductService>,
    ) -> Self {
        Self {
            categories,
            brands,
            products,
        }
    }

    pub async fn home(&self) -> Result<HomeDto> {
        let (categories, brands, latest, best_sellers) = tokio::try_join!(
            self.categories.list_roots(true, Some(HOME_CATEGORY_LIMIT)),
            self.brands.list(),
            self.products.latest(HOME_LATEST_LIMIT),
            self.products.best_sellers(HOME_TOP_SELLING_LIMIT),
        )?;

        Ok(HomeDto {
            categories: categories.into_iter().map(|c| c.into()).collect(),
            brands,
            latest,
            best_sellers,
        })
    }

    pub async fn shop(&self, query: &PageQuery) -> Result<(ShopDto, Meta)> {
        let (categories, brands, page) = tokio::try_join!(
            self.categories.list_roots(false, None),
            self.brands.list(),
            self.products
                .list_cards(&ProductScope::All, query.window(SHOP_PAGE_SIZE)),
        )?;

        let meta = page.meta();
        Ok((
            ShopDto {
                categories: categories.into_iter().map(|c| c.into()).collect(),
                brands,
                products: page.items,
            },
            meta,
        ))
    }

    pub async fn category_page(&self, slug: &str, query: &PageQuery) -> Result<(CategoryPageDto, Meta)> {
        let category = self.categories.get_active_by_slug(slug).await?;
        let children = self.categories.list_children(category.id).await?;

        let page = self
            .products
            .list_cards(
                &category_scope(&category, &children),
                query.window(SHOP_PAGE_SIZE),
            )
            .await?;

        let meta = page.meta();
        Ok((
            CategoryPageDto {
                category: category.into(),
                children: children.into_iter().map(|c| c.into()).collect(),
                products: page.items,
            },
            meta,
        ))
    }

    pub async fn brand_page(&self, slug: &str, query: &PageQuery) -> Result<(BrandPageDto, Meta)> {
        let brand = self.brands.get_active_by_slug(slug).await?;

        let page = self
            .products
            .list_cards(&ProductScope::Brand(brand.id), query.window(SHOP_PAGE_SIZE))
            .await?;

        let meta = page.meta();
        Ok((
            BrandPageDto {
                brand: brand.into(),
                products: page.items,
            },
            meta,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn category(name: &str, parent_id: Option<Uuid>) -> Category {
        Category {
            id: Uuid::new_v4(),
            parent_id,
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: None,
            display_order: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_category_scope_includes_direct_children() {
        let audio = category("Audio", None);
        let headphones = category("Headphones", Some(audio.id));
        let speakers = category("Speakers", Some(audio.id));

        match category_scope(&audio, &[headphones.clone(), speakers.clone()]) {
            ProductScope::Categories(ids) => {
                assert_eq!(ids, vec![audio.id, headphones.id, speakers.id]);
            }
            other => panic!("expected category scope, got {:?}", other),
        }
    }

    #[test]
    fn test_leaf_category_scope_is_itself() {
        let cables = category("Cables", None);

        match category_scope(&cables, &[]) {
            ProductScope::Categories(ids) => assert_eq!(ids, vec![cables.id]),
            other => panic!("expected category scope, got {:?}", other),
        }
    }
}
