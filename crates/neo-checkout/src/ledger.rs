//! In-memory order ledger.

use crate::ports::OrderLedger;
use async_trait::async_trait;
use neo_commerce::cart::CartLine;
use neo_commerce::error::CommerceError;
use neo_commerce::ids::{OrderId, Reference, UserId};
use neo_commerce::money::Money;
use neo_commerce::order::{Order, OrderFilter, OrderItem, OrderStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct LedgerInner {
    orders: HashMap<OrderId, Order>,
    by_reference: HashMap<Reference, OrderId>,
    next_order_id: i64,
}

/// A thread-safe in-memory order store.
///
/// One write lock guards the whole store, so an order and its items become
/// visible together or not at all, and the reference uniqueness check runs
/// in the same critical section as the insert.
#[derive(Clone)]
pub struct MemoryLedger {
    inner: Arc<RwLock<LedgerInner>>,
}

impl MemoryLedger {
    /// Creates a new, empty ledger.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(LedgerInner {
                orders: HashMap::new(),
                by_reference: HashMap::new(),
                next_order_id: 1,
            })),
        }
    }

    /// Number of orders stored.
    pub async fn len(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Check if the ledger holds no orders.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.orders.is_empty()
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderLedger for MemoryLedger {
    async fn create_order(
        &self,
        user_id: UserId,
        lines: &[CartLine],
        total: Money,
        reference: &Reference,
        status: OrderStatus,
    ) -> Result<Order, CommerceError> {
        if lines.is_empty() {
            return Err(CommerceError::EmptyCart);
        }

        let mut inner = self.inner.write().await;

        if inner.by_reference.contains_key(reference) {
            return Err(CommerceError::DuplicateReference(reference.clone()));
        }

        let id = OrderId::new(inner.next_order_id);
        let items: Vec<OrderItem> = lines
            .iter()
            .map(|line| OrderItem::from_line(id, line))
            .collect();
        let order = Order {
            id,
            user_id,
            total,
            status,
            reference: reference.clone(),
            items,
            created_at: current_timestamp(),
        };

        // The standing invariant is checked at write time, never
        // recomputed afterwards.
        if !order.total_matches_items() {
            return Err(CommerceError::StorageFailure(
                "order total does not match item subtotals".to_string(),
            ));
        }

        inner.next_order_id += 1;
        inner.by_reference.insert(reference.clone(), id);
        inner.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, CommerceError> {
        Ok(self.inner.read().await.orders.get(&id).cloned())
    }

    async fn find_by_reference(
        &self,
        reference: &Reference,
    ) -> Result<Option<Order>, CommerceError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_reference
            .get(reference)
            .and_then(|id| inner.orders.get(id))
            .cloned())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, CommerceError> {
        let inner = self.inner.read().await;
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(orders)
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, CommerceError> {
        let mut inner = self.inner.write().await;
        let order = inner
            .orders
            .get_mut(&id)
            .ok_or(CommerceError::OrderNotFound(id))?;
        order.transition(status)?;
        Ok(order.clone())
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
