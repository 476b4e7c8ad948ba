//! SQL filter for storefront product searches.
//!
//! Every predicate produced here has the shape
//! `p.is_active = TRUE [AND (keyword OR group)] [AND p.price BETWEEN min AND max]`,
//! so the status check always applies to the whole keyword group.
//! Queries expect the `p`/`b`/`c` aliases of the product card SELECT.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};

/// Result ordering for catalog searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    #[default]
    Newest,
    BestSelling,
    NameAsc,
    NameDesc,
}

impl ProductSort {
    /// ORDER BY body; always ends on `p.id` so equal keys page deterministically
    pub fn as_sql(&self) -> &'static str {
        match self {
            ProductSort::PriceAsc => "p.price ASC, p.id ASC",
            ProductSort::PriceDesc => "p.price DESC, p.id ASC",
            ProductSort::Newest => "p.created_at DESC, p.id ASC",
            ProductSort::BestSelling => "p.sold DESC, p.created_at DESC, p.id ASC",
            ProductSort::NameAsc => "p.name ASC, p.id ASC",
            ProductSort::NameDesc => "p.name DESC, p.id ASC",
        }
    }
}

impl FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "price_asc" => Ok(ProductSort::PriceAsc),
            "price_desc" => Ok(ProductSort::PriceDesc),
            "newest" => Ok(ProductSort::Newest),
            "best_selling" => Ok(ProductSort::BestSelling),
            "name_asc" => Ok(ProductSort::NameAsc),
            "name_desc" => Ok(ProductSort::NameDesc),
            other => Err(format!(
                "unknown sort '{}', expected one of: price_asc, price_desc, newest, best_selling, name_asc, name_desc",
                other
            )),
        }
    }
}

impl fmt::Display for ProductSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProductSort::PriceAsc => "price_asc",
            ProductSort::PriceDesc => "price_desc",
            ProductSort::Newest => "newest",
            ProductSort::BestSelling => "best_selling",
            ProductSort::NameAsc => "name_asc",
            ProductSort::NameDesc => "name_desc",
        };
        f.write_str(name)
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside LIKE
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Normalised search criteria
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    keywords: Option<String>,
    price_range: Option<(Decimal, Decimal)>,
}

impl ProductFilter {
    /// Blank keywords match every active product. The price range only
    /// applies when both bounds are given, and `min > max` is rejected.
    pub fn new(keywords: Option<&str>, price_min: Option<Decimal>, price_max: Option<Decimal>) -> Result<Self> {
        let keywords = keywords
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        let price_range = match (price_min, price_max) {
            (Some(min), Some(max)) if min > max => {
                return Err(AppError::Validation(format!(
                    "price_min: price_min ({}) must not exceed price_max ({})",
                    min, max
                )));
            }
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        };

        Ok(Self {
            keywords,
            price_range,
        })
    }

    pub fn keywords(&self) -> Option<&str> {
        self.keywords.as_deref()
    }

    pub fn price_range(&self) -> Option<(Decimal, Decimal)> {
        self.price_range
    }

    /// `%keyword%` with LIKE metacharacters escaped
    pub fn keyword_pattern(&self) -> Option<String> {
        self.keywords
            .as_deref()
            .map(|k| format!("%{}%", escape_like(k)))
    }

    /// Append the WHERE clause
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE p.is_active = TRUE");

        if let Some(pattern) = self.keyword_pattern() {
            builder.push(" AND (p.name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR b.name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR c.name ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        if let Some((min, max)) = self.price_range {
            builder.push(" AND p.price BETWEEN ");
            builder.push_bind(min);
            builder.push(" AND ");
            builder.push_bind(max);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn where_sql(filter: &ProductFilter) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT p.id FROM products p");
        filter.push_where(&mut builder);
        builder.sql().to_string()
    }

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_status_check_wraps_keyword_group() {
        let filter = ProductFilter::new(Some("Sony"), None, None).unwrap();

        assert_eq!(
            where_sql(&filter),
            "SELECT p.id FROM products p WHERE p.is_active = TRUE \
             AND (p.name ILIKE $1 OR b.name ILIKE $2 OR c.name ILIKE $3)"
        );
        assert_eq!(filter.keyword_pattern().as_deref(), Some("%Sony%"));
    }

    #[test]
    fn test_blank_keywords_only_filter_status() {
        for keywords in [None, Some(""), Some("   ")] {
            let filter = ProductFilter::new(keywords, None, None).unwrap();
            assert_eq!(
                where_sql(&filter),
                "SELECT p.id FROM products p WHERE p.is_active = TRUE"
            );
        }
    }

    #[test]
    fn test_price_range_is_inclusive_between() {
        let filter = ProductFilter::new(Some("pad"), Some(dec(100)), Some(dec(500))).unwrap();
        let sql = where_sql(&filter);

        assert!(sql.ends_with(") AND p.price BETWEEN $4 AND $5"));
        assert!(sql.contains("WHERE p.is_active = TRUE AND ("));
    }

    #[test]
    fn test_price_range_needs_both_bounds() {
        let filter = ProductFilter::new(None, Some(dec(100)), None).unwrap();
        assert!(filter.price_range().is_none());
        assert!(!where_sql(&filter).contains("BETWEEN"));

        let filter = ProductFilter::new(None, None, Some(dec(100))).unwrap();
        assert!(filter.price_range().is_none());
    }

    #[test]
    fn test_equal_bounds_allowed_and_inverted_rejected() {
        assert!(ProductFilter::new(None, Some(dec(5)), Some(dec(5))).is_ok());
        assert!(matches!(
            ProductFilter::new(None, Some(dec(6)), Some(dec(5))),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_same_input_builds_same_query() {
        let a = ProductFilter::new(Some(" Sony "), Some(dec(1)), Some(dec(9))).unwrap();
        let b = ProductFilter::new(Some("Sony"), Some(dec(1)), Some(dec(9))).unwrap();

        assert_eq!(a, b);
        assert_eq!(where_sql(&a), where_sql(&b));
    }

    #[test]
    fn test_like_metacharacters_escaped() {
        assert_eq!(escape_like(r"50%_off\"), r"50\%\_off\\");
        let filter = ProductFilter::new(Some("100%"), None, None).unwrap();
        assert_eq!(filter.keyword_pattern().as_deref(), Some(r"%100\%%"));
    }

    #[test]
    fn test_every_sort_ends_with_id_tie_breaker() {
        for sort in [
            ProductSort::PriceAsc,
            ProductSort::PriceDesc,
            ProductSort::Newest,
            ProductSort::BestSelling,
            ProductSort::NameAsc,
            ProductSort::NameDesc,
        ] {
            assert!(sort.as_sql().ends_with("p.id ASC"));
            assert_eq!(sort.to_string().parse::<ProductSort>().unwrap(), sort);
        }
        assert_eq!(ProductSort::default(), ProductSort::Newest);
        assert!("cheapest".parse::<ProductSort>().is_err());
    }
}
