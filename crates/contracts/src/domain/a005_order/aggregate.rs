use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::checkout::{CheckoutPlan, StockDecrement};
use crate::domain::a002_store::aggregate::StoreId;
use crate::domain::a003_product::aggregate::ProductId;
use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::money::Money;

crate::uuid_id!(
    /// Order identifier (database key, not the human readable order number)
    OrderId
);

// ============================================================================
// Status enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Packed => "packed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Forward moves plus cancellation before shipping
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Packed)
                | (Confirmed, Cancelled)
                | (Packed, Shipped)
                | (Packed, Cancelled)
                | (Shipped, Delivered)
        )
    }

    /// Customers may cancel their own order only before it is packed
    pub fn customer_can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "packed" => Ok(OrderStatus::Packed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!((self, next), (Pending, Paid) | (Pending, Failed) | (Failed, Paid))
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(format!("Unknown payment status: {}", other)),
        }
    }
}

/// How the customer intends to pay. Recorded only; no gateway integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CashOnDelivery,
    Card,
    Upi,
    Wallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Wallet => "wallet",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash_on_delivery" => Ok(PaymentMethod::CashOnDelivery),
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            "wallet" => Ok(PaymentMethod::Wallet),
            other => Err(format!("Unknown payment method: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderTransitionError {
    #[error("Cannot change order status from {from} to {to}")]
    InvalidStatus { from: OrderStatus, to: OrderStatus },

    #[error("Cannot change payment status from {from} to {to}")]
    InvalidPayment { from: PaymentStatus, to: PaymentStatus },
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Order line with the price frozen at placement time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub variant_id: Option<String>,
    pub store_id: StoreId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i32,
    pub line_total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(flatten)]
    pub base: BaseAggregate<OrderId>,

    /// Human readable unique number, e.g. ORD-20260101-AB12CD
    pub order_number: String,
    pub user_id: String,
    pub items: Vec<OrderLine>,
    pub subtotal: Money,
    pub tax: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub delivery_address_id: String,
    pub notes: Option<String>,
}

impl Order {
    /// Builds a new pending order from a validated checkout plan
    pub fn place(
        user_id: impl Into<String>,
        order_number: impl Into<String>,
        plan: &CheckoutPlan,
        delivery_address_id: impl Into<String>,
        payment_method: PaymentMethod,
        notes: Option<String>,
    ) -> Self {
        Self {
            base: BaseAggregate::new(OrderId::new_v4()),
            order_number: order_number.into(),
            user_id: user_id.into(),
            items: plan.lines.clone(),
            subtotal: plan.totals.subtotal,
            tax: plan.totals.tax,
            delivery_fee: plan.totals.delivery_fee,
            total: plan.totals.total,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method,
            delivery_address_id: delivery_address_id.into(),
            notes,
        }
    }

    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), OrderTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderTransitionError::InvalidStatus {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn set_payment_status(&mut self, next: PaymentStatus) -> Result<(), OrderTransitionError> {
        if !self.payment_status.can_transition_to(next) {
            return Err(OrderTransitionError::InvalidPayment {
                from: self.payment_status,
                to: next,
            });
        }
        self.payment_status = next;
        Ok(())
    }

    /// True when at least one line comes from one of the given stores
    pub fn involves_any_store(&self, store_ids: &[StoreId]) -> bool {
        self.items.iter().any(|line| store_ids.contains(&line.store_id))
    }

    /// Ordered quantity per product, used to restore stock on cancellation
    pub fn quantities_by_product(&self) -> Vec<StockDecrement> {
        let mut result: Vec<StockDecrement> = Vec::new();
        for line in &self.items {
            match result.iter_mut().find(|d| d.product_id == line.product_id) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
                None => result.push(StockDecrement {
                    product_id: line.product_id,
                    quantity: line.quantity,
                }),
            }
        }
        result
    }

    pub fn placed_at(&self) -> DateTime<Utc> {
        self.base.metadata.created_at
    }

    pub fn before_write(&mut self) {
        self.base.before_write();
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

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
        "a005"
    }

    fn collection_name() -> &'static str {
        "order"
    }

    fn element_name() -> &'static str {
        "Order"
    }
}

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderDto {
    pub delivery_address_id: String,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Defaults to true
    pub clear_cart: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusDto {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentStatusDto {
    pub payment_status: PaymentStatus,
}

/// Filters for order listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a005_order::checkout::OrderTotals;

    fn line(product_id: ProductId, store_id: StoreId, qty: i32) -> OrderLine {
        OrderLine {
            product_id,
            variant_id: None,
            store_id,
            name: "Bread".into(),
            unit_price: 4000,
            quantity: qty,
            line_total: 4000 * i64::from(qty),
        }
    }

    fn order() -> Order {
        let store = StoreId::new_v4();
        let product = ProductId::new_v4();
        let plan = CheckoutPlan {
            lines: vec![line(product, store, 2), line(product, store, 1)],
            totals: OrderTotals {
                subtotal: 12_000,
                tax: 600,
                delivery_fee: 2500,
                total: 15_100,
            },
            stock_decrements: vec![],
        };
        Order::place("u1", "ORD-20260101-ABC123", &plan, "addr", PaymentMethod::Upi, None)
    }

    #[test]
    fn test_new_order_is_pending() {
        let order = order();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.total, 15_100);
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut order = order();
        for next in [
            OrderStatus::Confirmed,
            OrderStatus::Packed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            order.transition_to(next).unwrap();
        }
        assert!(order.status.is_terminal());
        assert!(order.transition_to(OrderStatus::Cancelled).is_err());
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mut order = order();
        assert_eq!(
            order.transition_to(OrderStatus::Shipped),
            Err(OrderTransitionError::InvalidStatus {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped,
            })
        );
        order.transition_to(OrderStatus::Cancelled).unwrap();
        assert!(order.transition_to(OrderStatus::Confirmed).is_err());
        assert!(order.transition_to(OrderStatus::Pending).is_err());
    }

    #[test]
    fn test_shipped_order_cannot_be_cancelled() {
        let mut order = order();
        order.transition_to(OrderStatus::Confirmed).unwrap();
        order.transition_to(OrderStatus::Packed).unwrap();
        assert!(!order.status.customer_can_cancel());
        order.transition_to(OrderStatus::Shipped).unwrap();
        assert!(order.transition_to(OrderStatus::Cancelled).is_err());
    }

    #[test]
    fn test_payment_transitions() {
        let mut order = order();
        order.set_payment_status(PaymentStatus::Failed).unwrap();
        order.set_payment_status(PaymentStatus::Paid).unwrap();
        assert!(order.set_payment_status(PaymentStatus::Failed).is_err());
        assert!(order.set_payment_status(PaymentStatus::Pending).is_err());
    }

    #[test]
    fn test_quantities_by_product_are_merged() {
        let order = order();
        let quantities = order.quantities_by_product();
        assert_eq!(quantities.len(), 1);
        assert_eq!(quantities[0].quantity, 3);
    }

    #[test]
    fn test_store_involvement() {
        let order = order();
        let store = order.items[0].store_id;
        assert!(order.involves_any_store(&[StoreId::new_v4(), store]));
        assert!(!order.involves_any_store(&[StoreId::new_v4()]));
    }

    #[test]
    fn test_status_strings() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Packed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"cash_on_delivery\""
        );
    }
}
