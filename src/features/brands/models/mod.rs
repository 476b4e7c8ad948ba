pub mod brand;

pub use brand::{Brand, BRAND_COLUMNS};
