//! Customer-facing listing pages.
//!
//! | Endpoint | Content |
//! |----------|---------|
//! | `GET /api/home` | root categories, brands, latest and best-selling products |
//! | `GET /api/shop` | root categories, brands, every active product |
//! | `GET /api/categories/{slug}/products` | category, its children, products of both |
//! | `GET /api/brands/{slug}/products` | brand and its products |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::StorefrontService;
