pub mod product_dto;
pub mod product_form;

pub use product_dto::*;
pub use product_form::{read_product_form, ProductFormDoc};
