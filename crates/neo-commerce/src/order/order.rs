//! Order and order item types.

use crate::cart::CartLine;
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId, Reference, UserId};
use crate::money::Money;
use crate::order::OrderStatus;
use serde::{Deserialize, Serialize};

/// A durable purchase record.
///
/// Immutable once created except for `status`. The total is fixed at
/// creation and never recomputed; `total_matches_items` lets the store
/// verify the invariant before making the order visible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Customer who placed the order.
    pub user_id: UserId,
    /// Grand total charged.
    pub total: Money,
    /// Order status.
    pub status: OrderStatus,
    /// Payment reference (idempotency key, unique per order).
    pub reference: Reference,
    /// Items in the order.
    pub items: Vec<OrderItem>,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl Order {
    /// Sum of item subtotals.
    ///
    /// Returns `None` on overflow or currency mix.
    pub fn items_total(&self) -> Option<Money> {
        let mut total = Money::zero(self.total.currency);
        for item in &self.items {
            let subtotal = item.subtotal()?;
            total = total.try_add(&subtotal)?;
        }
        Some(total)
    }

    /// Check the standing invariant: total equals the sum of item
    /// subtotals.
    pub fn total_matches_items(&self) -> bool {
        self.items_total() == Some(self.total)
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Move the order to a new status.
    ///
    /// Fails with `IllegalTransition` unless the edge is in the legal
    /// transition table. Never touches totals or items.
    pub fn transition(&mut self, next: OrderStatus) -> Result<(), CommerceError> {
        if !self.status.can_transition_to(next) {
            return Err(CommerceError::IllegalTransition {
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// A line item on an order.
///
/// Prices are snapshotted from the cart at checkout time, so the order
/// total stays stable when catalog prices change. The product reference is
/// non-owning; the product may later be deleted or deactivated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Owning order.
    pub order_id: OrderId,
    /// Product purchased.
    pub product_id: ProductId,
    /// Quantity ordered.
    pub quantity: i64,
    /// Unit price at purchase time.
    pub unit_price: Money,
}

impl OrderItem {
    /// Build an item from a cart line snapshot.
    pub fn from_line(order_id: OrderId, line: &CartLine) -> Self {
        Self {
            order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }

    /// Item subtotal (unit price times quantity).
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.try_multiply(self.quantity)
    }
}

/// Filter for order listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    /// Restrict to a single customer.
    pub user_id: Option<UserId>,
    /// Restrict to a single status.
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    /// Match everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a customer.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            status: None,
        }
    }

    /// Restrict to a status.
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Check whether an order passes the filter.
    pub fn matches(&self, order: &Order) -> bool {
        self.user_id.map_or(true, |u| order.user_id == u)
            && self.status.map_or(true, |s| order.status == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn order_with_items() -> Order {
        let id = OrderId::new(1);
        Order {
            id,
            user_id: UserId::new(10),
            total: Money::new(568_000, Currency::NGN),
            status: OrderStatus::Paid,
            reference: Reference::new("ref-1"),
            items: vec![
                OrderItem {
                    order_id: id,
                    product_id: ProductId::new(1),
                    quantity: 2,
                    unit_price: Money::new(250_000, Currency::NGN),
                },
                OrderItem {
                    order_id: id,
                    product_id: ProductId::new(4),
                    quantity: 1,
                    unit_price: Money::new(68_000, Currency::NGN),
                },
            ],
            created_at: 0,
        }
    }

    #[test]
    fn test_total_matches_items() {
        let order = order_with_items();
        assert!(order.total_matches_items());
    }

    #[test]
    fn test_total_mismatch_detected() {
        let mut order = order_with_items();
        order.total = Money::new(568_001, Currency::NGN);
        assert!(!order.total_matches_items());
    }

    #[test]
    fn test_transition_rejects_illegal_edge() {
        let mut order = order_with_items();
        order.transition(OrderStatus::Shipped).unwrap();
        let err = order.transition(OrderStatus::Pending).unwrap_err();
        assert!(matches!(err, CommerceError::IllegalTransition { .. }));
        assert_eq!(order.status, OrderStatus::Shipped);
    }

    #[test]
    fn test_item_from_line() {
        let line = CartLine {
            product_id: ProductId::new(3),
            name: "UltraBook 14".to_string(),
            unit_price: Money::new(890_000, Currency::NGN),
            image: "/img/laptop.png".to_string(),
            quantity: 1,
        };
        let item = OrderItem::from_line(OrderId::new(5), &line);
        assert_eq!(item.order_id, OrderId::new(5));
        assert_eq!(item.subtotal().unwrap().amount_minor, 890_000);
    }

    #[test]
    fn test_filter_matches() {
        let order = order_with_items();
        assert!(OrderFilter::all().matches(&order));
        assert!(OrderFilter::for_user(UserId::new(10)).matches(&order));
        assert!(!OrderFilter::for_user(UserId::new(11)).matches(&order));
        assert!(OrderFilter::all()
            .with_status(OrderStatus::Paid)
            .matches(&order));
        assert!(!OrderFilter::all()
            .with_status(OrderStatus::Shipped)
            .matches(&order));
    }
}
