//! Catalog search and quick-find suggestions.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/search` | Keyword + price search over active products, 9 per page |
//! | GET | `/api/search/find` | Up to 5 products and 5 categories for a search box |

pub mod dtos;
pub mod filter;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::SearchService;
