pub mod image_storage;
pub mod minio_client;

pub use image_storage::{ImageStorage, ImageUpload, StoredImage};
pub use minio_client::MinIOClient;
