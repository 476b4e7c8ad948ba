//! Multipart decoding for the product create/update forms.

use std::str::FromStr;

use axum::extract::Multipart;
use rust_decimal::Decimal;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::products::dtos::SaveProductDto;
use crate::modules::storage::ImageUpload;

/// Product form for OpenAPI documentation.
/// The handlers read `multipart/form-data` directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ProductFormDoc {
    pub name: String,
    pub slug: Option<String>,
    #[schema(example = "499000")]
    pub price: String,
    pub cost: Option<String>,
    pub quantity: i32,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    pub description: Option<String>,
    pub content: Option<String>,
    /// "true"/"1"/"on" to publish
    pub is_active: Option<String>,
    /// Repeat the field or send one comma-separated value
    pub tags: Option<Vec<String>>,
    /// Feature image; keeps the current image on update when omitted
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: Option<String>,
}

/// Accumulates form fields before they are checked as a whole
#[derive(Debug, Default)]
pub(crate) struct ProductFormFields {
    name: Option<String>,
    slug: Option<String>,
    price: Option<String>,
    cost: Option<String>,
    quantity: Option<String>,
    category_id: Option<String>,
    brand_id: Option<String>,
    description: Option<String>,
    content: Option<String>,
    is_active: Option<String>,
    tags: Vec<String>,
    image: Option<ImageUpload>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ProductFormFields {
    pub(crate) fn set_text(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = Some(value),
            "slug" => self.slug = Some(value),
            "price" => self.price = Some(value),
            "cost" => self.cost = Some(value),
            "quantity" => self.quantity = Some(value),
            "category_id" => self.category_id = Some(value),
            "brand_id" => self.brand_id = Some(value),
            "description" => self.description = Some(value),
            "content" => self.content = Some(value),
            "is_active" => self.is_active = Some(value),
            "tags" | "tags[]" => self
                .tags
                .extend(value.split(',').map(|t| t.trim().to_string())),
            other => debug!("Ignoring unknown product form field: {}", other),
        }
    }

    pub(crate) fn set_image(&mut self, upload: ImageUpload) {
        // Browsers send an empty part when no file was picked
        if !upload.data.is_empty() || !upload.file_name.is_empty() {
            self.image = Some(upload);
        }
    }

    /// Parse every field, reporting all problems at once
    pub(crate) fn finish(self) -> Result<(SaveProductDto, Option<ImageUpload>)> {
        let mut errors: Vec<String> = Vec::new();

        let price = match non_empty(self.price) {
            Some(raw) => Decimal::from_str(raw.trim()).unwrap_or_else(|_| {
                errors.push("price: price must be a number".to_string());
                Decimal::ZERO
            }),
            None => {
                errors.push("price: price is required".to_string());
                Decimal::ZERO
            }
        };

        let cost = non_empty(self.cost).and_then(|raw| {
            Decimal::from_str(raw.trim())
                .map_err(|_| errors.push("cost: cost must be a number".to_string()))
                .ok()
        });

        let quantity = match non_empty(self.quantity) {
            Some(raw) => raw.trim().parse::<i32>().unwrap_or_else(|_| {
                errors.push("quantity: quantity must be a whole number".to_string());
                0
            }),
            None => 0,
        };

        let mut parse_id = |field: &str, value: Option<String>| -> Uuid {
            match non_empty(value) {
                Some(raw) => Uuid::parse_str(raw.trim()).unwrap_or_else(|_| {
                    errors.push(format!("{}: {} is not a valid id", field, field));
                    Uuid::nil()
                }),
                None => {
                    errors.push(format!("{}: {} is required", field, field));
                    Uuid::nil()
                }
            }
        };
        let category_id = parse_id("category_id", self.category_id);
        let brand_id = parse_id("brand_id", self.brand_id);

        let is_active = non_empty(self.is_active).map(|raw| {
            matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            )
        });

        if !errors.is_empty() {
            errors.sort();
            return Err(AppError::Validation(errors.join("; ")));
        }

        let dto = SaveProductDto {
            name: self.name.unwrap_or_default().trim().to_string(),
            slug: non_empty(self.slug),
            price,
            cost,
            quantity,
            category_id,
            brand_id,
            description: non_empty(self.description),
            content: non_empty(self.content),
            is_active,
            tags: self.tags,
        };
        dto.check()?;

        Ok((dto, self.image))
    }
}

/// Read a product form: text fields plus an optional `image` file part
pub async fn read_product_form(mut multipart: Multipart) -> Result<(SaveProductDto, Option<ImageUpload>)> {
    let mut fields = ProductFormFields::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "image" {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let file_name = field.file_name().map(|s| s.to_string()).unwrap_or_default();
            let data = field.bytes().await.map_err(|e| {
                debug!("Failed to read image bytes: {}", e);
                AppError::BadRequest(format!("Failed to read image data: {}", e))
            })?;

            fields.set_image(ImageUpload {
                file_name,
                content_type,
                data: data.to_vec(),
            });
        } else {
            let text = field.text().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read field '{}': {}", field_name, e))
            })?;
            fields.set_text(&field_name, text);
        }
    }

    fields.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ProductFormFields {
        let mut fields = ProductFormFields::default();
        fields.set_text("name", "Tay cầm DualSense".to_string());
        fields.set_text("price", "1490000.50".to_string());
        fields.set_text("quantity", "7".to_string());
        fields.set_text("category_id", Uuid::new_v4().to_string());
        fields.set_text("brand_id", Uuid::new_v4().to_string());
        fields.set_text("tags", "ps5, pad".to_string());
        fields.set_text("tags[]", "sony".to_string());
        fields.set_text("is_active", "on".to_string());
        fields
    }

    #[test]
    fn test_finish_parses_complete_form() {
        let (dto, image) = filled().finish().unwrap();

        assert_eq!(dto.name, "Tay cầm DualSense");
        assert_eq!(dto.price, Decimal::from_str("1490000.50").unwrap());
        assert_eq!(dto.quantity, 7);
        assert_eq!(dto.tags, vec!["ps5", "pad", "sony"]);
        assert_eq!(dto.is_active, Some(true));
        assert!(dto.slug.is_none());
        assert!(image.is_none());
    }

    #[test]
    fn test_finish_reports_every_unparseable_field() {
        let mut fields = ProductFormFields::default();
        fields.set_text("name", "Pad".to_string());
        fields.set_text("price", "cheap".to_string());
        fields.set_text("category_id", "12".to_string());

        match fields.finish() {
            Err(AppError::Validation(msg)) => {
                assert_eq!(
                    msg,
                    "brand_id: brand_id is required; category_id: category_id is not a valid id; price: price must be a number"
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_file_part_means_no_image() {
        let mut fields = filled();
        fields.set_image(ImageUpload {
            file_name: String::new(),
            content_type: "application/octet-stream".to_string(),
            data: Vec::new(),
        });
        let (_, image) = fields.finish().unwrap();
        assert!(image.is_none());

        let mut fields = filled();
        fields.set_image(ImageUpload {
            file_name: "pad.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![1, 2, 3],
        });
        let (_, image) = fields.finish().unwrap();
        assert_eq!(image.unwrap().file_name, "pad.png");
    }
}
