/// Default page size for admin list endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Highest page number honoured; larger requests land on this page
pub const MAX_PAGE: i64 = 1_000_000;

// =============================================================================
// STOREFRONT LISTING SIZES
// =============================================================================

/// Catalog search results per page
pub const SEARCH_PAGE_SIZE: i64 = 9;

/// Shop, category and brand listings per page
pub const SHOP_PAGE_SIZE: i64 = 12;

/// Root categories shown on the home page
pub const HOME_CATEGORY_LIMIT: i64 = 5;

/// Newest products shown on the home page
pub const HOME_LATEST_LIMIT: i64 = 8;

/// Best sellers shown on the home page
pub const HOME_TOP_SELLING_LIMIT: i64 = 4;

/// Suggestions returned by quick-find (per entity kind)
pub const FIND_SUGGESTION_LIMIT: i64 = 5;

/// Related products shown on a product page
pub const RELATED_PRODUCTS_LIMIT: i64 = 8;

/// Storage folder for product feature images
pub const PRODUCT_IMAGE_FOLDER: &str = "product";

/// Notice returned when a search has no match
pub const SEARCH_EMPTY_NOTICE: &str =
    "Sorry, the product you are looking for is not on sale or is out of stock. Please try another search.";

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Super admin role - everything
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

/// Admin role - catalog management
pub const ROLE_ADMIN: &str = "admin";

/// Staff role - comment moderation and replies
pub const ROLE_STAFF: &str = "staff";

/// Reply author name when the replying user has no recognised role
pub const FALLBACK_STAFF_DISPLAY_NAME: &str = "Admin";
