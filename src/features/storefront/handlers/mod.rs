pub mod storefront_handler;

pub use storefront_handler::*;
