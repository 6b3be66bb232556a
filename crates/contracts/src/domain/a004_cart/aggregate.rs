use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::a003_product::aggregate::{Product, ProductId};
use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::money::Money;

crate::uuid_id!(
    /// Cart identifier
    CartId
);

/// Errors raised by cart mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Quantity must be greater than zero (got {0})")]
    InvalidQuantity(i32),

    #[error("Product {0} is not available")]
    ProductUnavailable(String),

    #[error("Variant {variant} not found for product {product}")]
    VariantNotFound { product: String, variant: String },

    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: i32,
        available: i32,
    },

    #[error("Item is not in the cart")]
    LineNotFound,
}

/// One product (plus optional variant) and its quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub variant_id: Option<String>,
    pub name: String,
    pub image: Option<String>,
    /// Price snapshot taken when the line was last added or updated
    pub unit_price: Money,
    pub quantity: i32,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.saturating_mul(i64::from(self.quantity))
    }

    fn matches(&self, product_id: ProductId, variant_id: Option<&str>) -> bool {
        self.product_id == product_id && self.variant_id.as_deref() == variant_id
    }
}

/// What the catalog currently offers for a (product, variant) pair
#[derive(Debug, Clone, PartialEq)]
pub struct CartOffer {
    pub product_id: ProductId,
    pub variant_id: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub unit_price: Money,
    /// Current stock of the product, shared by all its variants
    pub stock: i32,
}

impl CartOffer {
    /// Resolves the offer for a product. Fails for inactive products and unknown variants.
    pub fn from_product(product: &Product, variant_id: Option<&str>) -> Result<Self, CartError> {
        if !product.is_available() {
            return Err(CartError::ProductUnavailable(product.name.clone()));
        }
        let unit_price =
            product
                .price_for(variant_id)
                .ok_or_else(|| CartError::VariantNotFound {
                    product: product.name.clone(),
                    variant: variant_id.unwrap_or_default().to_string(),
                })?;
        let name = match variant_id.and_then(|id| product.variant(id)) {
            Some(variant) => format!("{} ({})", product.name, variant.name),
            None => product.name.clone(),
        };

        Ok(Self {
            product_id: product.base.id,
            variant_id: variant_id.map(str::to_string),
            name,
            image: product.images.first().cloned(),
            unit_price,
            stock: product.stock,
        })
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Shopping cart, one per user.
///
/// `total` and `item_count` are derived from `items` and recomputed by every
/// mutation, so they always hold `total == Σ unit_price × quantity` and
/// `item_count == Σ quantity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CartRecord")]
pub struct Cart {
    #[serde(flatten)]
    pub base: BaseAggregate<CartId>,

    pub user_id: String,
    items: Vec<CartLine>,
    total: Money,
    item_count: i32,
}

/// Wire shape accepted when deserializing; derived fields are ignored
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartRecord {
    #[serde(flatten)]
    base: BaseAggregate<CartId>,
    user_id: String,
    #[serde(default)]
    items: Vec<CartLine>,
}

impl From<CartRecord> for Cart {
    fn from(record: CartRecord) -> Self {
        Cart::from_parts(record.base, record.user_id, record.items)
    }
}

impl Cart {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            base: BaseAggregate::new(CartId::new_v4()),
            user_id: user_id.into(),
            items: Vec::new(),
            total: 0,
            item_count: 0,
        }
    }

    /// Rebuilds a cart from stored lines; derived fields are recomputed, never trusted.
    pub fn from_parts(base: BaseAggregate<CartId>, user_id: String, items: Vec<CartLine>) -> Self {
        let mut cart = Self {
            base,
            user_id,
            items,
            total: 0,
            item_count: 0,
        };
        cart.items.retain(|line| line.quantity > 0);
        cart.recalculate();
        cart
    }

    /// Cart holding `items` as given, bypassing every mutation check
    #[cfg(test)]
    pub(crate) fn with_raw_items(user_id: &str, items: Vec<CartLine>) -> Self {
        let mut cart = Self::new(user_id);
        cart.items = items;
        cart.recalculate();
        cart
    }

    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn item_count(&self) -> i32 {
        self.item_count
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity of a product across all of its variants, saturating at `i32::MAX`
    pub fn quantity_of_product(&self, product_id: ProductId) -> i32 {
        self.items
            .iter()
            .filter(|line| line.product_id == product_id)
            .fold(0i32, |acc, line| acc.saturating_add(line.quantity))
    }

    fn position(&self, product_id: ProductId, variant_id: Option<&str>) -> Option<usize> {
        self.items
            .iter()
            .position(|line| line.matches(product_id, variant_id))
    }

    /// Stock check for a line that would end up with `new_quantity`
    fn ensure_stock(&self, offer: &CartOffer, new_quantity: i32) -> Result<(), CartError> {
        let current_line = self
            .position(offer.product_id, offer.variant_id.as_deref())
            .map(|idx| self.items[idx].quantity)
            .unwrap_or(0);
        let requested = self
            .quantity_of_product(offer.product_id)
            .checked_sub(current_line)
            .and_then(|others| others.checked_add(new_quantity));
        match requested {
            Some(requested) if requested <= offer.stock => Ok(()),
            requested => Err(CartError::InsufficientStock {
                product: offer.name.clone(),
                requested: requested.unwrap_or(i32::MAX),
                available: offer.stock.max(0),
            }),
        }
    }

    /// Adds `quantity` units. An existing line for the same (product, variant) is
    /// incremented and gets a fresh price snapshot; otherwise a new line is appended.
    pub fn add_item(&mut self, offer: &CartOffer, quantity: i32) -> Result<(), CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        match self.position(offer.product_id, offer.variant_id.as_deref()) {
            Some(idx) => {
                let new_quantity = self.items[idx]
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| CartError::InsufficientStock {
                        product: offer.name.clone(),
                        requested: i32::MAX,
                        available: offer.stock.max(0),
                    })?;
                self.ensure_stock(offer, new_quantity)?;
                let line = &mut self.items[idx];
                line.quantity = new_quantity;
                line.unit_price = offer.unit_price;
                line.name = offer.name.clone();
                line.image = offer.image.clone();
            }
            None => {
                self.ensure_stock(offer, quantity)?;
                self.items.push(CartLine {
                    product_id: offer.product_id,
                    variant_id: offer.variant_id.clone(),
                    name: offer.name.clone(),
                    image: offer.image.clone(),
                    unit_price: offer.unit_price,
                    quantity,
                });
            }
        }

        self.recalculate();
        Ok(())
    }

    /// Sets the quantity of an existing line. `quantity <= 0` removes the line.
    pub fn update_quantity(&mut self, offer: &CartOffer, quantity: i32) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove_item(offer.product_id, offer.variant_id.as_deref());
        }

        let idx = self
            .position(offer.product_id, offer.variant_id.as_deref())
            .ok_or(CartError::LineNotFound)?;
        self.ensure_stock(offer, quantity)?;

        let line = &mut self.items[idx];
        line.quantity = quantity;
        line.unit_price = offer.unit_price;
        line.name = offer.name.clone();

        self.recalculate();
        Ok(())
    }

    pub fn remove_item(
        &mut self,
        product_id: ProductId,
        variant_id: Option<&str>,
    ) -> Result<(), CartError> {
        let idx = self
            .position(product_id, variant_id)
            .ok_or(CartError::LineNotFound)?;
        self.items.remove(idx);
        self.recalculate();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recalculate();
    }

    fn recalculate(&mut self) {
        self.total = self
            .items
            .iter()
            .fold(0, |acc: Money, line| acc.saturating_add(line.line_total()));
        self.item_count = self
            .items
            .iter()
            .fold(0i32, |acc, line| acc.saturating_add(line.quantity));
    }

    pub fn before_write(&mut self) {
        self.base.before_write();
    }
}

impl AggregateRoot for Cart {
    type Id = CartId;

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
        "a004"
    }

    fn collection_name() -> &'static str {
        "cart"
    }

    fn element_name() -> &'static str {
        "Cart"
    }
}

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDto {
    pub product_id: ProductId,
    pub variant_id: Option<String>,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineQuery {
    pub variant_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a003_product::aggregate::tests::sample_product;

    fn assert_consistent(cart: &Cart) {
        let expected_total: Money = cart
            .items()
            .iter()
            .map(|l| l.unit_price * i64::from(l.quantity))
            .sum();
        let expected_count: i32 = cart.items().iter().map(|l| l.quantity).sum();
        assert_eq!(cart.total(), expected_total);
        assert_eq!(cart.item_count(), expected_count);
    }

    #[test]
    fn test_add_new_line_and_merge_existing() {
        let product = sample_product(4500, 10);
        let offer = CartOffer::from_product(&product, None).unwrap();
        let mut cart = Cart::new("u1");

        cart.add_item(&offer, 2).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total(), 9000);
        assert_eq!(cart.item_count(), 2);

        cart.add_item(&offer, 3).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_consistent(&cart);
    }

    #[test]
    fn test_add_refreshes_price_snapshot() {
        let mut product = sample_product(4500, 10);
        let mut cart = Cart::new("u1");
        cart.add_item(&CartOffer::from_product(&product, None).unwrap(), 1)
            .unwrap();

        product.price = 5000;
        cart.add_item(&CartOffer::from_product(&product, None).unwrap(), 1)
            .unwrap();
        assert_eq!(cart.items()[0].unit_price, 5000);
        assert_eq!(cart.total(), 10_000);
    }

    #[test]
    fn test_variants_are_separate_lines() {
        let product = sample_product(6000, 10);
        let mut cart = Cart::new("u1");
        cart.add_item(&CartOffer::from_product(&product, None).unwrap(), 1)
            .unwrap();
        cart.add_item(&CartOffer::from_product(&product, Some("half")).unwrap(), 2)
            .unwrap();
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.quantity_of_product(product.base.id), 3);
        assert_eq!(cart.total(), 6000 + 2 * 3005);
        assert_consistent(&cart);
    }

    #[test]
    fn test_stock_is_checked_across_variants() {
        let product = sample_product(6000, 3);
        let mut cart = Cart::new("u1");
        cart.add_item(&CartOffer::from_product(&product, None).unwrap(), 2)
            .unwrap();
        let err = cart
            .add_item(&CartOffer::from_product(&product, Some("half")).unwrap(), 2)
            .unwrap_err();
        assert_eq!(
            err,
            CartError::InsufficientStock {
                product: "Milk (500 ml)".into(),
                requested: 4,
                available: 3,
            }
        );
        // rejected mutation leaves the cart untouched
        assert_eq!(cart.item_count(), 2);
        assert_consistent(&cart);
    }

    #[test]
    fn test_invalid_quantity_and_unknown_variant() {
        let product = sample_product(6000, 3);
        let offer = CartOffer::from_product(&product, None).unwrap();
        let mut cart = Cart::new("u1");
        assert_eq!(cart.add_item(&offer, 0), Err(CartError::InvalidQuantity(0)));
        assert!(matches!(
            CartOffer::from_product(&product, Some("nope")),
            Err(CartError::VariantNotFound { .. })
        ));
    }

    #[test]
    fn test_inactive_product_cannot_be_added() {
        let mut product = sample_product(6000, 3);
        product.is_active = false;
        assert!(matches!(
            CartOffer::from_product(&product, None),
            Err(CartError::ProductUnavailable(_))
        ));
    }

    #[test]
    fn test_update_sets_quantity_and_non_positive_removes() {
        let product = sample_product(1000, 10);
        let offer = CartOffer::from_product(&product, None).unwrap();
        let mut cart = Cart::new("u1");
        cart.add_item(&offer, 4).unwrap();

        cart.update_quantity(&offer, 7).unwrap();
        assert_eq!(cart.items()[0].quantity, 7);
        assert_eq!(cart.total(), 7000);

        assert!(matches!(
            cart.update_quantity(&offer, 11),
            Err(CartError::InsufficientStock { .. })
        ));

        cart.update_quantity(&offer, 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_update_missing_line_is_an_error() {
        let product = sample_product(1000, 10);
        let offer = CartOffer::from_product(&product, None).unwrap();
        let mut cart = Cart::new("u1");
        assert_eq!(cart.update_quantity(&offer, 2), Err(CartError::LineNotFound));
    }

    #[test]
    fn test_removing_last_quantity_removes_line() {
        let product = sample_product(1000, 10);
        let offer = CartOffer::from_product(&product, None).unwrap();
        let mut cart = Cart::new("u1");
        cart.add_item(&offer, 1).unwrap();

        cart.update_quantity(&offer, -1).unwrap();
        assert!(cart.items().is_empty());
        assert_eq!(
            cart.remove_item(product.base.id, None),
            Err(CartError::LineNotFound)
        );
    }

    #[test]
    fn test_totals_hold_for_mutation_sequence() {
        let a = sample_product(1999, 50);
        let b = sample_product(250, 50);
        let a_plain = CartOffer::from_product(&a, None).unwrap();
        let a_half = CartOffer::from_product(&a, Some("half")).unwrap();
        let b_plain = CartOffer::from_product(&b, None).unwrap();
        let mut cart = Cart::new("u1");

        enum Step<'a> {
            Add(&'a CartOffer, i32),
            Update(&'a CartOffer, i32),
            Remove(ProductId, Option<&'a str>),
            Clear,
        }

        let steps = [
            Step::Add(&a_plain, 3),
            Step::Add(&b_plain, 1),
            Step::Add(&a_half, 2),
            Step::Update(&b_plain, 9),
            Step::Add(&a_plain, 1),
            Step::Remove(a.base.id, Some("half")),
            Step::Update(&a_plain, 0),
            Step::Add(&a_half, 5),
            Step::Clear,
            Step::Add(&b_plain, 2),
        ];

        for step in steps {
            match step {
                Step::Add(offer, qty) => cart.add_item(offer, qty).unwrap(),
                Step::Update(offer, qty) => cart.update_quantity(offer, qty).unwrap(),
                Step::Remove(id, variant) => cart.remove_item(id, variant).unwrap(),
                Step::Clear => cart.clear(),
            }
            assert_consistent(&cart);
        }
        assert_eq!(cart.total(), 500);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_quantity_overflow_is_rejected() {
        let product = sample_product(1000, 10);
        let offer = CartOffer::from_product(&product, None).unwrap();
        let mut cart = Cart::new("u1");
        cart.add_item(&offer, 1).unwrap();

        assert!(matches!(
            cart.add_item(&offer, i32::MAX),
            Err(CartError::InsufficientStock { requested: i32::MAX, available: 10, .. })
        ));
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.total(), 1000);
        assert_consistent(&cart);
    }

    #[test]
    fn test_overflow_across_variants_is_rejected() {
        let product = sample_product(1000, i32::MAX);
        let plain = CartOffer::from_product(&product, None).unwrap();
        let half = CartOffer::from_product(&product, Some("half")).unwrap();
        let mut cart = Cart::new("u1");
        cart.add_item(&plain, i32::MAX - 1).unwrap();

        assert!(matches!(
            cart.add_item(&half, 5),
            Err(CartError::InsufficientStock { .. })
        ));
        cart.update_quantity(&plain, i32::MAX).unwrap();
        assert_eq!(cart.item_count(), i32::MAX);
        assert!(cart.items().iter().all(|line| line.quantity > 0));
        assert_consistent(&cart);
    }

    #[test]
    fn test_deserialize_recomputes_derived_fields() {
        let product = sample_product(300, 10);
        let json = serde_json::json!({
            "id": CartId::new_v4().value(),
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
            "isDeleted": false,
            "version": 0,
            "userId": "u1",
            "items": [
                {
                    "productId": product.base.id.value(),
                    "variantId": null,
                    "name": "Milk",
                    "image": null,
                    "unitPrice": 300,
                    "quantity": 2
                },
                {
                    "productId": product.base.id.value(),
                    "variantId": "half",
                    "name": "Milk (500 ml)",
                    "image": null,
                    "unitPrice": 150,
                    "quantity": -4
                }
            ],
            "total": -1,
            "itemCount": 99
        });
        let cart: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total(), 600);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_from_parts_recomputes_derived_fields() {
        let product = sample_product(300, 10);
        let line = CartLine {
            product_id: product.base.id,
            variant_id: None,
            name: "Milk".into(),
            image: None,
            unit_price: 300,
            quantity: 3,
        };
        let ghost = CartLine {
            quantity: 0,
            ..line.clone()
        };
        let cart = Cart::from_parts(
            BaseAggregate::new(CartId::new_v4()),
            "u1".into(),
            vec![line, ghost],
        );
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total(), 900);
        assert_eq!(cart.item_count(), 3);
    }
}
