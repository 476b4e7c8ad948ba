pub mod auth;
pub mod brands;
pub mod categories;
pub mod comments;
pub mod products;
pub mod search;
pub mod storefront;
