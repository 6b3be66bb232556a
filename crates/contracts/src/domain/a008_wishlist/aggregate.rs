use serde::{Deserialize, Serialize};

use crate::domain::a003_product::aggregate::{Product, ProductId};
use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};

crate::uuid_id!(
    /// Wishlist identifier
    WishlistId
);

/// Saved products of one user, without duplicates, in insertion order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    #[serde(flatten)]
    pub base: BaseAggregate<WishlistId>,

    pub user_id: String,
    pub product_ids: Vec<ProductId>,
}

impl Wishlist {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            base: BaseAggregate::new(WishlistId::new_v4()),
            user_id: user_id.into(),
            product_ids: Vec::new(),
        }
    }

    /// Returns false when the product was already present
    pub fn add(&mut self, product_id: ProductId) -> bool {
        if self.contains(product_id) {
            return false;
        }
        self.product_ids.push(product_id);
        true
    }

    /// Returns false when the product was not present
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.product_ids.len();
        self.product_ids.retain(|id| *id != product_id);
        self.product_ids.len() != before
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.product_ids.contains(&product_id)
    }

    pub fn before_write(&mut self) {
        self.base.before_write();
    }
}

impl AggregateRoot for Wishlist {
    type Id = WishlistId;

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
        "a008"
    }

    fn collection_name() -> &'static str {
        "wishlist"
    }

    fn element_name() -> &'static str {
        "Wishlist"
    }
}

/// Wishlist as returned to the client, with the products that are still on sale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistView {
    pub product_ids: Vec<ProductId>,
    pub products: Vec<Product>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut wishlist = Wishlist::new("u1");
        let id = ProductId::new_v4();
        assert!(wishlist.add(id));
        assert!(!wishlist.add(id));
        assert_eq!(wishlist.product_ids.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut wishlist = Wishlist::new("u1");
        let a = ProductId::new_v4();
        let b = ProductId::new_v4();
        wishlist.add(a);
        wishlist.add(b);
        assert!(wishlist.remove(a));
        assert!(!wishlist.remove(a));
        assert_eq!(wishlist.product_ids, vec![b]);
    }
}
