//! Ports the orchestrator is wired with.
//!
//! The catalog and the payment gateway are external collaborators; the
//! order ledger is the durable half of this system. All three are
//! injected as trait objects so storage and gateway choices stay out of
//! the checkout logic.

use async_trait::async_trait;
use neo_commerce::cart::CartLine;
use neo_commerce::catalog::Product;
use neo_commerce::error::CommerceError;
use neo_commerce::ids::{OrderId, ProductId, Reference, UserId};
use neo_commerce::money::Money;
use neo_commerce::order::{Order, OrderFilter, OrderStatus};

/// Read-only product lookup.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Fetch a product by ID.
    ///
    /// Inactive products are reported as absent.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, CommerceError>;
}

/// Outcome of a payment verification call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verification {
    /// Whether the gateway captured the funds.
    pub settled: bool,
    /// Settled amount, with its currency.
    pub amount: Money,
}

/// The payment gateway's verification endpoint.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    /// Ask the gateway whether a payment reference settled, and for how
    /// much.
    ///
    /// An unreachable gateway surfaces as `VerifierUnavailable`; the
    /// caller treats that as retryable, never as a declined payment.
    async fn verify(&self, reference: &Reference) -> Result<Verification, CommerceError>;
}

/// Durable, append-mostly order storage.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Persist an order and its items as one atomic write.
    ///
    /// The items are the cart snapshot taken at checkout initiation.
    /// Fails with `DuplicateReference` when an order already exists for
    /// the reference; the reference uniqueness constraint lives in the
    /// store itself, not in caller logic.
    async fn create_order(
        &self,
        user_id: UserId,
        lines: &[CartLine],
        total: Money,
        reference: &Reference,
        status: OrderStatus,
    ) -> Result<Order, CommerceError>;

    /// Fetch an order by ID.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, CommerceError>;

    /// Fetch the order created for a payment reference, if any.
    async fn find_by_reference(
        &self,
        reference: &Reference,
    ) -> Result<Option<Order>, CommerceError>;

    /// List orders matching a filter, newest first.
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, CommerceError>;

    /// Validate and apply a status transition.
    ///
    /// The read-validate-write must run under the store's write lock so
    /// two concurrent administrators cannot lose an update.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, CommerceError>;
}
