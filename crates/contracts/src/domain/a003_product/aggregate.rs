use serde::{Deserialize, Serialize};

use crate::domain::a001_category::aggregate::CategoryId;
use crate::domain::a002_store::aggregate::StoreId;
use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::money::Money;

crate::uuid_id!(
    /// Product identifier
    ProductId
);

/// Purchasable variation of a product (size, flavour, pack).
/// Stock is tracked on the product, not per variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: String,
    pub name: String,
    /// Overrides the product price when set
    pub price: Option<Money>,
}

// ============================================================================
// Aggregate Root
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(flatten)]
    pub base: BaseAggregate<ProductId>,

    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    /// Current selling price, minor units
    pub price: Money,
    /// Strike-through "MRP" price, minor units
    pub compare_at_price: Option<Money>,
    pub stock: i32,
    /// Pack size label, e.g. "500 g"
    pub unit: String,
    pub images: Vec<String>,
    pub variants: Vec<ProductVariant>,
    pub is_active: bool,
    /// Average review rating, 0 when there are no reviews
    pub rating: f64,
    pub review_count: i32,
}

impl Product {
    pub fn new_for_insert(dto: &ProductDto) -> Self {
        let mut product = Self {
            base: BaseAggregate::new(ProductId::new_v4()),
            store_id: dto.store_id,
            category_id: dto.category_id,
            name: String::new(),
            description: None,
            price: 0,
            compare_at_price: None,
            stock: 0,
            unit: String::new(),
            images: Vec::new(),
            variants: Vec::new(),
            is_active: true,
            rating: 0.0,
            review_count: 0,
        };
        product.update(dto);
        product
    }

    /// Applies editable fields. Rating and review count are derived and never taken from a DTO.
    pub fn update(&mut self, dto: &ProductDto) {
        self.store_id = dto.store_id;
        self.category_id = dto.category_id;
        self.name = dto.name.trim().to_string();
        self.description = dto.description.clone();
        self.price = dto.price;
        self.compare_at_price = dto.compare_at_price;
        self.stock = dto.stock;
        self.unit = dto.unit.clone().unwrap_or_default();
        self.images = dto.images.clone();
        self.variants = dto.variants.clone();
        self.is_active = dto.is_active.unwrap_or(self.is_active);
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Product name is required".into());
        }
        if self.price < 0 {
            return Err("Price cannot be negative".into());
        }
        if let Some(compare_at) = self.compare_at_price {
            if compare_at < 0 {
                return Err("Compare-at price cannot be negative".into());
            }
        }
        if self.stock < 0 {
            return Err("Stock cannot be negative".into());
        }
        let mut seen = std::collections::HashSet::new();
        for variant in &self.variants {
            if variant.id.trim().is_empty() || variant.name.trim().is_empty() {
                return Err("Variant id and name are required".into());
            }
            if !seen.insert(variant.id.as_str()) {
                return Err(format!("Duplicate variant id: {}", variant.id));
            }
            if matches!(variant.price, Some(p) if p < 0) {
                return Err(format!("Variant {} has a negative price", variant.id));
            }
        }
        Ok(())
    }

    /// Active and not soft-deleted
    pub fn is_available(&self) -> bool {
        self.is_active && !self.base.metadata.is_deleted
    }

    pub fn variant(&self, variant_id: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// Price of the product or of one of its variants. `None` when the variant does not exist.
    pub fn price_for(&self, variant_id: Option<&str>) -> Option<Money> {
        match variant_id {
            None => Some(self.price),
            Some(id) => self.variant(id).map(|v| v.price.unwrap_or(self.price)),
        }
    }

    /// Recomputes rating fields from the full list of review ratings
    pub fn apply_ratings(&mut self, ratings: &[i32]) {
        self.review_count = ratings.len() as i32;
        self.rating = if ratings.is_empty() {
            0.0
        } else {
            let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
            let avg = sum as f64 / ratings.len() as f64;
            (avg * 10.0).round() / 10.0
        };
    }

    pub fn before_write(&mut self) {
        self.base.before_write();
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

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
        "a003"
    }

    fn collection_name() -> &'static str {
        "product"
    }

    fn element_name() -> &'static str {
        "Product"
    }
}

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub compare_at_price: Option<Money>,
    pub stock: i32,
    pub unit: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    pub is_active: Option<bool>,
}

/// Filters for the public product listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category: Option<String>,
    pub store: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub in_stock: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_product(price: Money, stock: i32) -> Product {
        Product::new_for_insert(&ProductDto {
            store_id: StoreId::new_v4(),
            category_id: CategoryId::new_v4(),
            name: "Milk".into(),
            description: None,
            price,
            compare_at_price: None,
            stock,
            unit: Some("1 l".into()),
            images: vec![],
            variants: vec![
                ProductVariant {
                    id: "half".into(),
                    name: "500 ml".into(),
                    price: Some(price / 2 + 5),
                },
                ProductVariant {
                    id: "same".into(),
                    name: "Tetra pack".into(),
                    price: None,
                },
            ],
            is_active: None,
        })
    }

    #[test]
    fn test_price_for_variants() {
        let product = sample_product(6000, 10);
        assert_eq!(product.price_for(None), Some(6000));
        assert_eq!(product.price_for(Some("half")), Some(3005));
        assert_eq!(product.price_for(Some("same")), Some(6000));
        assert_eq!(product.price_for(Some("missing")), None);
    }

    #[test]
    fn test_validation_rejects_negative_values() {
        let mut product = sample_product(6000, 10);
        assert!(product.validate().is_ok());
        product.stock = -1;
        assert!(product.validate().is_err());
        product.stock = 0;
        product.price = -5;
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_duplicate_variants() {
        let mut product = sample_product(6000, 10);
        product.variants.push(ProductVariant {
            id: "half".into(),
            name: "dup".into(),
            price: None,
        });
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_apply_ratings() {
        let mut product = sample_product(100, 1);
        product.apply_ratings(&[5, 4, 4]);
        assert_eq!(product.review_count, 3);
        assert!((product.rating - 4.3).abs() < f64::EPSILON);

        product.apply_ratings(&[]);
        assert_eq!(product.review_count, 0);
        assert_eq!(product.rating, 0.0);
    }

    #[test]
    fn test_availability() {
        let mut product = sample_product(100, 1);
        assert!(product.is_available());
        product.base.metadata.mark_deleted();
        assert!(!product.is_available());
    }
}
