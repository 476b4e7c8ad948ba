pub mod comment;

pub use comment::{Comment, COMMENT_COLUMNS};
