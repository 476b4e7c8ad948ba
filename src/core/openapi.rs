use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{self, model as auth_model};
use crate::features::brands::{dtos as brands_dtos, handlers as brands_handlers};
use crate::features::categories::{
    dtos as categories_dtos, handlers as categories_handlers, tree as categories_tree,
};
use crate::features::comments::{dtos as comments_dtos, handlers as comments_handlers};
use crate::features::products::{dtos as products_dtos, handlers as products_handlers};
use crate::features::search::{
    dtos as search_dtos, filter as search_filter, handlers as search_handlers,
};
use crate::features::storefront::{dtos as storefront_dtos, handlers as storefront_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::get_me,
        // Storefront (public)
        storefront_handlers::home,
        storefront_handlers::shop,
        storefront_handlers::category_products,
        storefront_handlers::brand_products,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::create_category,
        categories_handlers::list_admin_categories,
        categories_handlers::category_options,
        categories_handlers::get_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        categories_handlers::activate_category,
        categories_handlers::deactivate_category,
        // Brands
        brands_handlers::list_brands,
        brands_handlers::create_brand,
        brands_handlers::list_admin_brands,
        brands_handlers::get_brand,
        brands_handlers::update_brand,
        brands_handlers::delete_brand,
        brands_handlers::activate_brand,
        brands_handlers::deactivate_brand,
        // Products
        products_handlers::get_product,
        products_handlers::create_product,
        products_handlers::list_admin_products,
        products_handlers::product_form_options,
        products_handlers::get_admin_product,
        products_handlers::update_product,
        products_handlers::delete_product,
        products_handlers::activate_product,
        products_handlers::deactivate_product,
        // Search (public)
        search_handlers::search_products,
        search_handlers::find_suggestions,
        // Comments
        comments_handlers::list_product_comments,
        comments_handlers::create_comment,
        comments_handlers::list_admin_comments,
        comments_handlers::reply_comment,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth_model::AdminRole,
            auth::dto::MeResponseDto,
            ApiResponse<auth::dto::MeResponseDto>,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::SaveCategoryDto,
            categories_dtos::CategoryOptionsDto,
            categories_tree::CategoryOption,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<Vec<categories_dtos::CategoryTreeDto>>,
            ApiResponse<categories_dtos::CategoryOptionsDto>,
            // Brands
            brands_dtos::BrandResponseDto,
            brands_dtos::SaveBrandDto,
            ApiResponse<brands_dtos::BrandResponseDto>,
            ApiResponse<Vec<brands_dtos::BrandResponseDto>>,
            // Products
            products_dtos::ProductFormDoc,
            products_dtos::ProductResponseDto,
            products_dtos::ProductCardDto,
            products_dtos::GalleryImageDto,
            products_dtos::ProductDetailDto,
            products_dtos::ProductFormOptionsDto,
            products_dtos::ProductEditDto,
            ApiResponse<products_dtos::ProductResponseDto>,
            ApiResponse<Vec<products_dtos::ProductResponseDto>>,
            ApiResponse<products_dtos::ProductDetailDto>,
            ApiResponse<products_dtos::ProductFormOptionsDto>,
            ApiResponse<products_dtos::ProductEditDto>,
            // Search
            search_filter::ProductSort,
            search_dtos::FindResultDto,
            ApiResponse<Vec<products_dtos::ProductCardDto>>,
            ApiResponse<search_dtos::FindResultDto>,
            // Storefront
            storefront_dtos::HomeDto,
            storefront_dtos::ShopDto,
            storefront_dtos::CategoryPageDto,
            storefront_dtos::BrandPageDto,
            ApiResponse<storefront_dtos::HomeDto>,
            ApiResponse<storefront_dtos::ShopDto>,
            ApiResponse<storefront_dtos::CategoryPageDto>,
            ApiResponse<storefront_dtos::BrandPageDto>,
            // Comments
            comments_dtos::CreateCommentDto,
            comments_dtos::ReplyCommentDto,
            comments_dtos::StarSummary,
            comments_dtos::ReplyDto,
            comments_dtos::CommentThreadDto,
            comments_dtos::AdminCommentDto,
            comments_dtos::CommentResponseDto,
            ApiResponse<comments_dtos::CommentResponseDto>,
            ApiResponse<Vec<comments_dtos::CommentThreadDto>>,
            ApiResponse<Vec<comments_dtos::AdminCommentDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Current back-office identity"),
        (name = "storefront", description = "Home, shop, category and brand pages (public)"),
        (name = "categories", description = "Category navigation (public)"),
        (name = "brands", description = "Brand listing (public)"),
        (name = "products", description = "Product detail pages (public)"),
        (name = "search", description = "Catalog search and quick-find (public)"),
        (name = "comments", description = "Product reviews (public)"),
        (name = "admin-categories", description = "Category management (admin)"),
        (name = "admin-brands", description = "Brand management (admin)"),
        (name = "admin-products", description = "Product management (admin)"),
        (name = "admin-comments", description = "Review moderation and replies (staff)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = "Catalog, search and review API for the storefront and its back-office",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_admin_path_requires_bearer() {
        let doc = ApiDoc::openapi();

        for (path, item) in doc.paths.paths.iter() {
            if !path.starts_with("/api/admin") {
                continue;
            }
            let operations = [&item.get, &item.post, &item.put, &item.delete];
            for operation in operations.into_iter().flatten() {
                assert!(
                    operation.security.is_some(),
                    "{} is missing bearer security",
                    path
                );
            }
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
