use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};

crate::uuid_id!(
    /// Category identifier
    CategoryId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Product category, e.g. "Fruits & Vegetables"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(flatten)]
    pub base: BaseAggregate<CategoryId>,

    pub name: String,
    /// URL-friendly unique key
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
}

impl Category {
    pub fn new_for_insert(dto: &CategoryDto) -> Self {
        let mut category = Self {
            base: BaseAggregate::new(CategoryId::new_v4()),
            name: String::new(),
            slug: String::new(),
            description: None,
            image_url: None,
            is_active: true,
        };
        category.update(dto);
        category
    }

    pub fn update(&mut self, dto: &CategoryDto) {
        self.name = dto.name.trim().to_string();
        self.slug = match dto.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slugify(slug),
            _ => slugify(&self.name),
        };
        self.description = dto.description.clone();
        self.image_url = dto.image_url.clone();
        self.is_active = dto.is_active.unwrap_or(self.is_active);
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Category name is required".into());
        }
        if self.slug.is_empty() {
            return Err("Category slug must contain letters or digits".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.before_write();
    }
}

/// Lowercases, keeps ASCII alphanumerics and collapses everything else into single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

impl AggregateRoot for Category {
    type Id = CategoryId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "category"
    }

    fn element_name() -> &'static str {
        "Category"
    }
}

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Fruits & Vegetables"), "fruits-vegetables");
        assert_eq!(slugify("  Dairy,  Bread  "), "dairy-bread");
        assert_eq!(slugify("Snacks-2024"), "snacks-2024");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_slug_derived_from_name_when_missing() {
        let category = Category::new_for_insert(&CategoryDto {
            name: "Cold Drinks".into(),
            ..Default::default()
        });
        assert_eq!(category.slug, "cold-drinks");
        assert!(category.is_active);
        assert!(category.validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let category = Category::new_for_insert(&CategoryDto {
            name: "   ".into(),
            ..Default::default()
        });
        assert!(category.validate().is_err());
    }
}
