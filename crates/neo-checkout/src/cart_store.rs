//! Session-scoped cart storage.

use crate::ports::ProductLookup;
use neo_commerce::cart::{Cart, CartView};
use neo_commerce::checkout::CheckoutIntent;
use neo_commerce::error::CommerceError;
use neo_commerce::ids::{ProductId, SessionId};
use neo_commerce::money::Currency;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Per-session cart storage.
///
/// Each session owns one cart behind its own mutex: mutations for a
/// session run their read-modify-write serialized, so concurrent tabs
/// cannot lose a quantity increment, while carts of different sessions
/// never contend.
pub struct CartStore {
    lookup: Arc<dyn ProductLookup>,
    currency: Currency,
    carts: RwLock<HashMap<SessionId, Arc<Mutex<Cart>>>>,
}

impl CartStore {
    /// Create a store backed by the given product lookup.
    pub fn new(lookup: Arc<dyn ProductLookup>, currency: Currency) -> Self {
        Self {
            lookup,
            currency,
            carts: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the cart slot for a session.
    async fn slot(&self, session: &SessionId) -> Arc<Mutex<Cart>> {
        if let Some(slot) = self.carts.read().await.get(session) {
            return slot.clone();
        }
        let mut carts = self.carts.write().await;
        carts
            .entry(session.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Cart::new(session.clone(), self.currency))))
            .clone()
    }

    /// Get the cart slot for a session without creating one.
    async fn existing_slot(&self, session: &SessionId) -> Option<Arc<Mutex<Cart>>> {
        self.carts.read().await.get(session).cloned()
    }

    /// Add a product to a session's cart.
    ///
    /// The catalog lookup runs before the cart lock is taken; only the
    /// read-modify-write holds it.
    pub async fn add_item(
        &self,
        session: &SessionId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartView, CommerceError> {
        let product = self
            .lookup
            .get(product_id)
            .await?
            .ok_or(CommerceError::ProductNotFound(product_id))?;

        let slot = self.slot(session).await;
        let mut cart = slot.lock().await;
        cart.add_line(&product, quantity)?;
        cart.view()
    }

    /// Set the quantity of an existing line.
    pub async fn update_quantity(
        &self,
        session: &SessionId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartView, CommerceError> {
        let slot = self
            .existing_slot(session)
            .await
            .ok_or(CommerceError::LineNotFound(product_id))?;
        let mut cart = slot.lock().await;
        cart.update_quantity(product_id, quantity)?;
        cart.view()
    }

    /// Remove a line; removing an absent line is a no-op.
    pub async fn remove_item(
        &self,
        session: &SessionId,
        product_id: ProductId,
    ) -> Result<CartView, CommerceError> {
        match self.existing_slot(session).await {
            None => Ok(CartView::empty(self.currency)),
            Some(slot) => {
                let mut cart = slot.lock().await;
                cart.remove_line(product_id);
                cart.view()
            }
        }
    }

    /// Empty a session's cart unconditionally.
    pub async fn clear(&self, session: &SessionId) -> Result<(), CommerceError> {
        if let Some(slot) = self.existing_slot(session).await {
            slot.lock().await.clear();
        }
        Ok(())
    }

    /// Read a session's cart. Pure; a session without a cart reads as
    /// empty.
    pub async fn read(&self, session: &SessionId) -> Result<CartView, CommerceError> {
        match self.existing_slot(session).await {
            None => Ok(CartView::empty(self.currency)),
            Some(slot) => slot.lock().await.view(),
        }
    }

    /// Snapshot a session's cart for checkout.
    pub async fn snapshot(&self, session: &SessionId) -> Result<CheckoutIntent, CommerceError> {
        let slot = self
            .existing_slot(session)
            .await
            .ok_or(CommerceError::EmptyCart)?;
        let cart = slot.lock().await;
        cart.snapshot()
    }

    /// Drop a session's cart entirely (session expiry).
    pub async fn discard(&self, session: &SessionId) {
        self.carts.write().await.remove(session);
    }
}
