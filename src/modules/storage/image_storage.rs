//! Image storage abstraction used by the catalog.
//!
//! Uploads return the stored name/path pair persisted on catalog rows, or
//! `None` when the form carried no file. Deletes are idempotent.

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Allowed MIME types for catalog images
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Image received from a multipart form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Where an uploaded image ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Original client-side file name
    pub file_name: String,
    /// Object key inside the bucket
    pub file_path: String,
}

#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Store the upload under `folder`; `Ok(None)` when nothing was submitted
    async fn store(&self, upload: Option<ImageUpload>, folder: &str) -> Result<Option<StoredImage>>;

    /// Remove a stored image; a missing object is not an error
    async fn delete(&self, file_path: &str) -> Result<()>;

    /// Public URL for a stored image path
    fn public_url(&self, file_path: &str) -> String;
}

/// Map an image MIME type to its file extension
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

impl ImageUpload {
    /// Reject empty, oversized or non-image uploads before they reach storage
    pub fn validate(&self, max_size: usize) -> Result<()> {
        if self.data.is_empty() {
            return Err(AppError::Validation("image: file is empty".to_string()));
        }

        if self.data.len() > max_size {
            return Err(AppError::Validation(format!(
                "image: file too large, maximum size is {} MB",
                max_size / 1024 / 1024
            )));
        }

        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(AppError::Validation(format!(
                "image: type '{}' is not allowed, allowed types: {}",
                self.content_type,
                ALLOWED_IMAGE_TYPES.join(", ")
            )));
        }

        Ok(())
    }

    /// Bucket key: `{prefix}/{folder}/{uuid}.{ext}`
    pub fn object_key(&self, prefix: &str, folder: &str) -> String {
        let extension = image_extension(&self.content_type)
            .or_else(|| self.file_name.rsplit_once('.').map(|(_, ext)| ext))
            .unwrap_or("bin");
        format!("{}/{}/{}.{}", prefix, folder, Uuid::new_v4(), extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, size: usize) -> ImageUpload {
        ImageUpload {
            file_name: "pad.png".to_string(),
            content_type: content_type.to_string(),
            data: vec![1; size],
        }
    }

    #[test]
    fn test_validate_accepts_images_within_limit() {
        assert!(upload("image/png", 10).validate(1024).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_uploads() {
        assert!(matches!(
            upload("image/png", 0).validate(1024),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            upload("image/png", 2048).validate(1024),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            upload("application/pdf", 10).validate(1024),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_object_key_layout() {
        let key = upload("image/jpeg", 1).object_key("public", "product");
        assert!(key.starts_with("public/product/"));
        assert!(key.ends_with(".jpg"));
    }
}
