use std::sync::Arc;

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::core::error::{handle_db_error, Result};
use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::categories::models::{Category, CATEGORY_COLUMNS};
use crate::features::products::dtos::ProductCardDto;
use crate::features::products::models::{ProductCard, PRODUCT_CARD_FROM, PRODUCT_CARD_SELECT};
use crate::features::search::dtos::{FindQuery, FindResultDto, SearchQuery};
use crate::features::search::filter::{ProductFilter, ProductSort};
use crate::modules::storage::ImageStorage;
use crate::shared::constants::{FIND_SUGGESTION_LIMIT, SEARCH_EMPTY_NOTICE, SEARCH_PAGE_SIZE};
use crate::shared::types::{PageWindow, Paginated};

/// What a search produced
#[derive(Debug)]
pub enum SearchOutcome {
    Found(Paginated<ProductCardDto>),
    /// Nothing matched; `notice` is shown to the shopper
    Empty { notice: String, window: PageWindow },
}

/// Page of matching product cards
pub(crate) fn build_search_query(
    filter: &ProductFilter,
    sort: ProductSort,
    window: PageWindow,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(PRODUCT_CARD_SELECT);
    filter.push_where(&mut builder);
    builder.push(" ORDER BY ");
    builder.push(sort.as_sql());
    builder.push(" LIMIT ");
    builder.push_bind(window.limit());
    builder.push(" OFFSET ");
    builder.push_bind(window.offset());
    builder
}

/// Total number of matches for the same filter
pub(crate) fn build_count_query(filter: &ProductFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) ");
    builder.push(PRODUCT_CARD_FROM);
    filter.push_where(&mut builder);
    builder
}

/// Service for catalog search
pub struct SearchService {
    pool: PgPool,
    storage: Arc<dyn ImageStorage>,
}

impl SearchService {
    pub fn new(pool: PgPool, storage: Arc<dyn ImageStorage>) -> Self {
        Self { pool, storage }
    }

    /// Keyword, price and sort search over active products, 9 per page
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome> {
        let filter = ProductFilter::new(query.keywords.as_deref(), query.price_min, query.price_max)?;
        let sort = query.sort_by.unwrap_or_default();
        let window = PageWindow::new(query.page, SEARCH_PAGE_SIZE);

        let total: i64 = build_count_query(&filter)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "product"))?;

        if total == 0 {
            debug!(
                "Search found nothing for keywords={:?} price={:?}",
                filter.keywords(),
                filter.price_range()
            );
            return Ok(SearchOutcome::Empty {
                notice: SEARCH_EMPTY_NOTICE.to_string(),
                window,
            });
        }

        let cards = build_search_query(&filter, sort, window)
            .build_query_as::<ProductCard>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "product"))?;

        let storage = self.storage.as_ref();
        Ok(SearchOutcome::Found(
            Paginated::new(cards, total, window).map(|c| ProductCardDto::from_card(c, storage)),
        ))
    }

    /// Up to 5 matching products and 5 matching active categories
    pub async fn find(&self, query: &FindQuery) -> Result<FindResultDto> {
        let filter = ProductFilter::new(query.keywords.as_deref(), None, None)?;

        let cards = build_search_query(
            &filter,
            ProductSort::Newest,
            PageWindow::new(1, FIND_SUGGESTION_LIMIT),
        )
        .build_query_as::<ProductCard>()
        .fetch_all(&self.pool)
        .await
        .map_err(|e| handle_db_error(e, "product"))?;

        let mut categories = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM categories WHERE is_active = TRUE",
            CATEGORY_COLUMNS
        ));
        if let Some(pattern) = filter.keyword_pattern() {
            categories.push(" AND name ILIKE ");
            categories.push_bind(pattern);
        }
        categories.push(" ORDER BY display_order, name, id LIMIT ");
        categories.push_bind(FIND_SUGGESTION_LIMIT);

        let categories = categories
            .build_query_as::<Category>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| handle_db_error(e, "category"))?;

        let storage = self.storage.as_ref();
        Ok(FindResultDto {
            products: cards
                .into_iter()
                .map(|c| ProductCardDto::from_card(c, storage))
                .collect(),
            categories: categories.into_iter().map(CategoryResponseDto::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_search_query_shape() {
        let filter =
            ProductFilter::new(Some("Sony"), Some(Decimal::from(100)), Some(Decimal::from(900)))
                .unwrap();

        let builder = build_search_query(&filter, ProductSort::PriceAsc, PageWindow::new(2, SEARCH_PAGE_SIZE));
        let sql = builder.sql();

        assert!(sql.starts_with(PRODUCT_CARD_SELECT));
        assert!(sql.contains(
            " WHERE p.is_active = TRUE AND (p.name ILIKE $1 OR b.name ILIKE $2 OR c.name ILIKE $3) \
             AND p.price BETWEEN $4 AND $5"
        ));
        assert!(sql.ends_with(" ORDER BY p.price ASC, p.id ASC LIMIT $6 OFFSET $7"));
    }

    #[test]
    fn test_inactive_products_excluded_for_brand_match() {
        // A keyword matching only a brand name still goes through the status check
        let filter = ProductFilter::new(Some("Sony"), None, None).unwrap();
        let sql = build_count_query(&filter).sql().to_string();

        let status = sql.find("p.is_active = TRUE").unwrap();
        let group = sql.find("(p.name ILIKE").unwrap();
        assert!(status < group);
        assert!(sql.contains("OR b.name ILIKE $2"));
        assert!(sql.ends_with(")"));
        assert!(!sql.contains("OR p.is_active"));
    }

    #[test]
    fn test_repeated_search_builds_identical_sql() {
        let filter = ProductFilter::new(Some("pad"), None, None).unwrap();
        let window = PageWindow::new(1, SEARCH_PAGE_SIZE);

        let first = build_search_query(&filter, ProductSort::BestSelling, window).sql().to_string();
        let second = build_search_query(&filter, ProductSort::BestSelling, window).sql().to_string();

        assert_eq!(first, second);
        assert!(first.contains("ORDER BY p.sold DESC, p.created_at DESC, p.id ASC"));
    }

    #[test]
    fn test_default_sort_is_newest() {
        let query = SearchQuery {
            page: 1,
            ..Default::default()
        };
        assert_eq!(query.sort_by.unwrap_or_default(), ProductSort::Newest);
    }
}
