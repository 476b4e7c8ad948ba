use serde::Serialize;
use utoipa::ToSchema;

use crate::features::brands::dtos::BrandResponseDto;
use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::products::dtos::ProductCardDto;

/// Landing page content
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HomeDto {
    /// First root categories by name
    pub categories: Vec<CategoryResponseDto>,
    pub brands: Vec<BrandResponseDto>,
    pub latest: Vec<ProductCardDto>,
    pub best_sellers: Vec<ProductCardDto>,
}

/// Shop page; `meta` on the envelope paginates `products`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShopDto {
    /// Root categories by display order
    pub categories: Vec<CategoryResponseDto>,
    pub brands: Vec<BrandResponseDto>,
    pub products: Vec<ProductCardDto>,
}

/// Category page; `meta` on the envelope paginates `products`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryPageDto {
    pub category: CategoryResponseDto,
    pub children: Vec<CategoryResponseDto>,
    pub products: Vec<ProductCardDto>,
}

/// Brand page; `meta` on the envelope paginates `products`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BrandPageDto {
    pub brand: BrandResponseDto,
    pub products: Vec<ProductCardDto>,
}
