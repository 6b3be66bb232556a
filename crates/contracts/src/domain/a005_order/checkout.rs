//! Checkout planning: turns a cart plus the current catalog state into the
//! order lines, totals and stock decrements of a new order.
//!
//! Planning performs every validation up front and has no side effects, so
//! a rejected checkout never writes anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use super::aggregate::OrderLine;
use crate::domain::a003_product::aggregate::{Product, ProductId};
use crate::domain::a004_cart::aggregate::Cart;
use crate::shared::money::{apply_rate, BasisPoints, Money};

/// Pricing rules applied at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPolicy {
    /// Tax rate in basis points (500 = 5%)
    pub tax_rate_bps: BasisPoints,
    /// Fee charged when the subtotal is below the threshold
    pub delivery_fee: Money,
    /// Subtotal from which delivery is free
    pub free_delivery_threshold: Money,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            tax_rate_bps: 500,
            delivery_fee: 2500,
            free_delivery_threshold: 49_900,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

impl OrderTotals {
    pub fn compute(subtotal: Money, policy: &CheckoutPolicy) -> Self {
        let tax = apply_rate(subtotal, policy.tax_rate_bps);
        let delivery_fee = if subtotal >= policy.free_delivery_threshold {
            0
        } else {
            policy.delivery_fee
        };
        Self {
            subtotal,
            tax,
            delivery_fee,
            total: subtotal + tax + delivery_fee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Product {0} is no longer available")]
    ProductUnavailable(String),

    #[error("Variant {variant} of {product} is no longer available")]
    VariantNotFound { product: String, variant: String },

    #[error("Invalid quantity {quantity} for {product}")]
    InvalidQuantity { product: String, quantity: i32 },

    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: i32,
        available: i32,
    },
}

/// Quantity to take out of (or put back into) a product's stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDecrement {
    pub product_id: ProductId,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPlan {
    pub lines: Vec<OrderLine>,
    pub totals: OrderTotals,
    /// One entry per product, quantities summed over variants
    pub stock_decrements: Vec<StockDecrement>,
}

/// Validates every cart line against the current catalog and prices the order.
///
/// Lines are checked in cart order and the first violation is returned.
/// Prices come from `products`, not from the cart snapshot, so the order is
/// locked to the price at the moment of placement.
pub fn plan_checkout(
    cart: &Cart,
    products: &HashMap<ProductId, Product>,
    policy: &CheckoutPolicy,
) -> Result<CheckoutPlan, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let mut lines = Vec::with_capacity(cart.items().len());
    let mut stock_decrements: Vec<StockDecrement> = Vec::new();

    for item in cart.items() {
        if item.quantity <= 0 {
            return Err(CheckoutError::InvalidQuantity {
                product: item.name.clone(),
                quantity: item.quantity,
            });
        }

        let product = products
            .get(&item.product_id)
            .filter(|p| p.is_available())
            .ok_or_else(|| CheckoutError::ProductUnavailable(item.name.clone()))?;

        let unit_price = product.price_for(item.variant_id.as_deref()).ok_or_else(|| {
            CheckoutError::VariantNotFound {
                product: product.name.clone(),
                variant: item.variant_id.clone().unwrap_or_default(),
            }
        })?;

        let insufficient = |requested: i32| CheckoutError::InsufficientStock {
            product: product.name.clone(),
            requested,
            available: product.stock.max(0),
        };
        let requested = match stock_decrements
            .iter_mut()
            .find(|d| d.product_id == item.product_id)
        {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or_else(|| insufficient(i32::MAX))?;
                existing.quantity
            }
            None => {
                stock_decrements.push(StockDecrement {
                    product_id: item.product_id,
                    quantity: item.quantity,
                });
                item.quantity
            }
        };
        if requested > product.stock {
            return Err(insufficient(requested));
        }

        lines.push(OrderLine {
            product_id: item.product_id,
            variant_id: item.variant_id.clone(),
            store_id: product.store_id,
            name: item.name.clone(),
            unit_price,
            quantity: item.quantity,
            line_total: unit_price.saturating_mul(i64::from(item.quantity)),
        });
    }

    let subtotal = lines
        .iter()
        .fold(0, |acc: Money, l| acc.saturating_add(l.line_total));

    Ok(CheckoutPlan {
        lines,
        totals: OrderTotals::compute(subtotal, policy),
        stock_decrements,
    })
}

/// Formats an order number: `ORD-YYYYMMDD-SUFFIX`
pub fn format_order_number(placed_at: DateTime<Utc>, suffix: &str) -> String {
    format!("ORD-{}-{}", placed_at.format("%Y%m%d"), suffix)
}

/// Checks the `ORD-YYYYMMDD-XXXXXX` shape (uppercase alphanumeric suffix)
pub fn is_valid_order_number(value: &str) -> bool {
    let mut parts = value.split('-');
    let (Some("ORD"), Some(date), Some(suffix), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    date.len() == 8
        && date.chars().all(|c| c.is_ascii_digit())
        && suffix.len() == 6
        && suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a003_product::aggregate::tests::sample_product;
    use crate::domain::a004_cart::aggregate::{CartLine, CartOffer};
    use chrono::TimeZone;

    fn catalog(products: &[&Product]) -> HashMap<ProductId, Product> {
        products
            .iter()
            .map(|p| (p.base.id, (*p).clone()))
            .collect()
    }

    fn cart_with(items: &[(&Product, Option<&str>, i32)]) -> Cart {
        let mut cart = Cart::new("u1");
        for (product, variant, qty) in items {
            let offer = CartOffer::from_product(product, *variant).unwrap();
            cart.add_item(&offer, *qty).unwrap();
        }
        cart
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let cart = Cart::new("u1");
        let result = plan_checkout(&cart, &HashMap::new(), &CheckoutPolicy::default());
        assert_eq!(result, Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_totals_with_delivery_fee_below_threshold() {
        let milk = sample_product(6000, 10);
        let cart = cart_with(&[(&milk, None, 2)]);
        let plan = plan_checkout(&cart, &catalog(&[&milk]), &CheckoutPolicy::default()).unwrap();

        assert_eq!(plan.totals.subtotal, 12_000);
        assert_eq!(plan.totals.tax, 600);
        assert_eq!(plan.totals.delivery_fee, 2500);
        assert_eq!(plan.totals.total, 15_100);
    }

    #[test]
    fn test_free_delivery_at_threshold() {
        let policy = CheckoutPolicy::default();
        let totals = OrderTotals::compute(policy.free_delivery_threshold, &policy);
        assert_eq!(totals.delivery_fee, 0);
        let totals = OrderTotals::compute(policy.free_delivery_threshold - 1, &policy);
        assert_eq!(totals.delivery_fee, policy.delivery_fee);
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        let policy = CheckoutPolicy {
            tax_rate_bps: 1234,
            delivery_fee: 999,
            free_delivery_threshold: 100_000,
        };
        for subtotal in [0, 1, 99, 12_345, 99_999, 100_000, 7_654_321] {
            let t = OrderTotals::compute(subtotal, &policy);
            assert_eq!(t.total, t.subtotal + t.tax + t.delivery_fee);
        }
    }

    #[test]
    fn test_price_is_locked_from_current_catalog() {
        let mut milk = sample_product(6000, 10);
        let cart = cart_with(&[(&milk, None, 1)]);
        milk.price = 6500;
        let plan = plan_checkout(&cart, &catalog(&[&milk]), &CheckoutPolicy::default()).unwrap();
        assert_eq!(plan.lines[0].unit_price, 6500);
        assert_eq!(plan.totals.subtotal, 6500);
    }

    #[test]
    fn test_stock_decrements_match_ordered_quantities() {
        let milk = sample_product(6000, 10);
        let bread = sample_product(3500, 4);
        let cart = cart_with(&[
            (&milk, None, 2),
            (&bread, None, 4),
            (&milk, Some("half"), 3),
        ]);
        let mut products = catalog(&[&milk, &bread]);
        let plan = plan_checkout(&cart, &products, &CheckoutPolicy::default()).unwrap();

        assert_eq!(plan.stock_decrements.len(), 2);
        for decrement in &plan.stock_decrements {
            let product = products.get_mut(&decrement.product_id).unwrap();
            product.stock -= decrement.quantity;
        }
        assert_eq!(products[&milk.base.id].stock, 10 - 5);
        assert_eq!(products[&bread.base.id].stock, 0);
    }

    #[test]
    fn test_overflowing_add_leaves_checkout_positive() {
        let milk = sample_product(1000, 10);
        let offer = CartOffer::from_product(&milk, None).unwrap();
        let mut cart = Cart::new("u1");
        cart.add_item(&offer, 1).unwrap();
        assert!(cart.add_item(&offer, i32::MAX).is_err());

        let plan = plan_checkout(&cart, &catalog(&[&milk]), &CheckoutPolicy::default()).unwrap();
        assert_eq!(plan.totals.subtotal, 1000);
        assert!(plan.totals.total > 0);
        assert_eq!(
            plan.stock_decrements,
            vec![StockDecrement {
                product_id: milk.base.id,
                quantity: 1
            }]
        );
    }

    #[test]
    fn test_non_positive_line_is_rejected() {
        let milk = sample_product(1000, 10);
        let line = CartLine {
            product_id: milk.base.id,
            variant_id: None,
            name: "Milk".into(),
            image: None,
            unit_price: 1000,
            quantity: -3,
        };
        let cart = Cart::with_raw_items("u1", vec![line]);
        assert_eq!(
            plan_checkout(&cart, &catalog(&[&milk]), &CheckoutPolicy::default()),
            Err(CheckoutError::InvalidQuantity {
                product: "Milk".into(),
                quantity: -3
            })
        );
    }

    #[test]
    fn test_summed_variant_quantities_do_not_wrap() {
        let milk = sample_product(1000, i32::MAX);
        let line = |variant: Option<&str>, quantity| CartLine {
            product_id: milk.base.id,
            variant_id: variant.map(str::to_string),
            name: "Milk".into(),
            image: None,
            unit_price: 1000,
            quantity,
        };
        let cart = Cart::with_raw_items(
            "u1",
            vec![line(None, i32::MAX), line(Some("half"), i32::MAX)],
        );
        assert!(matches!(
            plan_checkout(&cart, &catalog(&[&milk]), &CheckoutPolicy::default()),
            Err(CheckoutError::InsufficientStock { requested: i32::MAX, .. })
        ));
    }

    #[test]
    fn test_insufficient_stock_reports_first_violation() {
        let milk = sample_product(6000, 10);
        let mut bread = sample_product(3500, 4);
        bread.name = "Bread".into();
        let eggs = sample_product(9000, 1);
        let cart = cart_with(&[(&milk, None, 2), (&bread, None, 4), (&eggs, None, 1)]);

        let mut bread_now = bread.clone();
        bread_now.stock = 3;
        let mut eggs_now = eggs.clone();
        eggs_now.stock = 0;
        let result = plan_checkout(
            &cart,
            &catalog(&[&milk, &bread_now, &eggs_now]),
            &CheckoutPolicy::default(),
        );
        assert_eq!(
            result,
            Err(CheckoutError::InsufficientStock {
                product: "Bread".into(),
                requested: 4,
                available: 3,
            })
        );
    }

    #[test]
    fn test_stock_accumulates_across_variants() {
        let milk = sample_product(6000, 5);
        let cart = cart_with(&[(&milk, None, 3), (&milk, Some("half"), 2)]);
        let mut milk_now = milk.clone();
        milk_now.stock = 4;
        let result = plan_checkout(&cart, &catalog(&[&milk_now]), &CheckoutPolicy::default());
        assert!(matches!(
            result,
            Err(CheckoutError::InsufficientStock { requested: 5, available: 4, .. })
        ));
    }

    #[test]
    fn test_inactive_or_missing_product_rejected() {
        let milk = sample_product(6000, 5);
        let cart = cart_with(&[(&milk, None, 1)]);

        let mut inactive = milk.clone();
        inactive.is_active = false;
        assert!(matches!(
            plan_checkout(&cart, &catalog(&[&inactive]), &CheckoutPolicy::default()),
            Err(CheckoutError::ProductUnavailable(_))
        ));
        assert!(matches!(
            plan_checkout(&cart, &HashMap::new(), &CheckoutPolicy::default()),
            Err(CheckoutError::ProductUnavailable(_))
        ));
    }

    #[test]
    fn test_removed_variant_rejected() {
        let milk = sample_product(6000, 5);
        let cart = cart_with(&[(&milk, Some("half"), 1)]);
        let mut changed = milk.clone();
        changed.variants.retain(|v| v.id != "half");
        assert!(matches!(
            plan_checkout(&cart, &catalog(&[&changed]), &CheckoutPolicy::default()),
            Err(CheckoutError::VariantNotFound { .. })
        ));
    }

    #[test]
    fn test_order_number_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 10, 0, 0).unwrap();
        let number = format_order_number(at, "A1B2C3");
        assert_eq!(number, "ORD-20260307-A1B2C3");
        assert!(is_valid_order_number(&number));
        assert!(!is_valid_order_number("ORD-2026037-A1B2C3"));
        assert!(!is_valid_order_number("ORD-20260307-a1b2c3"));
        assert!(!is_valid_order_number("ORD-20260307-A1B2C3-X"));
        assert!(!is_valid_order_number("INV-20260307-A1B2C3"));
    }
}
