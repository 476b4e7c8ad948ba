use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::products::dtos::ProductCardDto;
use crate::features::search::filter::ProductSort;

/// Treat missing and blank query values alike
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

fn default_page() -> i64 {
    1
}

/// Query parameters for catalog search
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Matched against product, brand and category names
    pub keywords: Option<String>,

    /// Lower price bound; used only together with `price_max`
    #[serde(default, deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>)]
    pub price_min: Option<Decimal>,

    /// Upper price bound; used only together with `price_min`
    #[serde(default, deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>)]
    pub price_max: Option<Decimal>,

    /// price_asc, price_desc, newest (default), best_selling, name_asc, name_desc
    #[serde(default, deserialize_with = "blank_as_none")]
    #[param(value_type = Option<String>)]
    pub sort_by: Option<ProductSort>,

    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
}

/// Query parameters for quick-find
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct FindQuery {
    pub keywords: Option<String>,
}

/// Quick-find suggestions
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FindResultDto {
    pub products: Vec<ProductCardDto>,
    pub categories: Vec<CategoryResponseDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::Query;
    use axum::http::Uri;

    fn parse(query: &str) -> Result<SearchQuery, String> {
        let uri: Uri = format!("/api/search?{}", query).parse().unwrap();
        Query::<SearchQuery>::try_from_uri(&uri)
            .map(|q| q.0)
            .map_err(|e| e.body_text())
    }

    #[test]
    fn test_blank_values_are_absent() {
        let query = parse("keywords=&price_min=&price_max=&sort_by=").unwrap();

        assert!(query.price_min.is_none());
        assert!(query.price_max.is_none());
        assert!(query.sort_by.is_none());
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_values_are_parsed() {
        let query = parse("keywords=sony&price_min=100.5&price_max=900&sort_by=price_desc&page=3").unwrap();

        assert_eq!(query.keywords.as_deref(), Some("sony"));
        assert_eq!(query.price_min, Some(Decimal::new(1005, 1)));
        assert_eq!(query.price_max, Some(Decimal::from(900)));
        assert_eq!(query.sort_by, Some(ProductSort::PriceDesc));
        assert_eq!(query.page, 3);
    }

    #[test]
    fn test_unknown_sort_rejected() {
        assert!(parse("sort_by=cheapest").is_err());
        assert!(parse("price_min=abc").is_err());
    }
}
