use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::features::categories::tree::{self, CategoryOption};
use crate::shared::validation::SLUG_REGEX;

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            display_order: c.display_order,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    fn leaf(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            display_order: category.display_order,
            children: Vec::new(),
        }
    }

    /// Build the nested tree from a flat list of categories.
    ///
    /// Reuses the pre-order walk, so orphans and cycle members surface as
    /// roots instead of disappearing.
    pub fn build_tree(categories: &[Category]) -> Vec<CategoryTreeDto> {
        let walk = tree::walk(categories);

        let mut roots: Vec<CategoryTreeDto> = Vec::new();
        let mut open: Vec<CategoryTreeDto> = Vec::new();

        for (index, depth) in walk.order {
            while open.len() > depth {
                if let Some(done) = open.pop() {
                    Self::attach(done, &mut open, &mut roots);
                }
            }
            open.push(Self::leaf(&categories[index]));
        }
        while let Some(done) = open.pop() {
            Self::attach(done, &mut open, &mut roots);
        }

        roots
    }

    fn attach(node: CategoryTreeDto, open: &mut [CategoryTreeDto], roots: &mut Vec<CategoryTreeDto>) {
        match open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

/// Request DTO for creating or replacing a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SaveCategoryDto {
    /// Parent category; omit for a root category
    pub parent_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,

    /// Generated from the name when omitted
    #[validate(
        length(min = 1, max = 255, message = "slug must be 1-255 characters"),
        regex(path = *SLUG_REGEX, message = "slug must be lowercase words separated by single hyphens")
    )]
    pub slug: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "display_order must not be negative"))]
    pub display_order: Option<i32>,

    pub is_active: Option<bool>,
}

/// Query params for listing public categories
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCategoriesQuery {
    /// If true, return tree structure. Default: false (flat list)
    #[serde(default)]
    pub tree: bool,
}

/// Query params for the admin category picker
#[derive(Debug, Deserialize, IntoParams)]
pub struct CategoryOptionsQuery {
    /// Category to mark as selected
    pub selected: Option<Uuid>,
}

/// Category picker payload for admin forms
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryOptionsDto {
    pub options: Vec<CategoryOption>,
    /// Categories sitting on a parent cycle; non-empty means the data needs fixing
    pub cycles: Vec<Uuid>,
    /// Pre-rendered `<option>` elements
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, parent: Option<Uuid>, order: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            parent_id: parent,
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: None,
            display_order: order,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_tree_nests_children() {
        let consoles = category("Consoles", None, 0);
        let ps5 = category("PS5", Some(consoles.id), 0);
        let pads = category("Pads", Some(ps5.id), 0);
        let audio = category("Audio", None, 1);

        let tree = CategoryTreeDto::build_tree(&[pads, audio, ps5, consoles]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].name, "Consoles");
        assert_eq!(tree[0].children[0].name, "PS5");
        assert_eq!(tree[0].children[0].children[0].name, "Pads");
        assert_eq!(tree[1].name, "Audio");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_build_tree_keeps_cycle_members() {
        let mut a = category("A", None, 0);
        let b = category("B", Some(a.id), 0);
        a.parent_id = Some(b.id);

        let tree = CategoryTreeDto::build_tree(&[a, b]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].name, "A");
        assert_eq!(tree[0].children[0].name, "B");
        assert!(tree[0].children[0].children.is_empty());
    }

    #[test]
    fn test_save_dto_validation() {
        let dto = SaveCategoryDto {
            parent_id: None,
            name: "Tay cầm".to_string(),
            slug: Some("Tay Cam".to_string()),
            description: None,
            display_order: Some(-1),
            is_active: None,
        };

        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("slug"));
        assert!(fields.contains_key("display_order"));
        assert!(!fields.contains_key("name"));
    }
}
