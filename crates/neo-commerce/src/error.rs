//! Storefront error types.

use crate::ids::{OrderId, ProductId, Reference};
use thiserror::Error;

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product absent from the catalog, or inactive.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Cart line absent for the given product.
    #[error("No cart line for product: {0}")]
    LineNotFound(ProductId),

    /// Quantity must be positive.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds the per-line maximum.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Checkout attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Confirm called without a preceding initiate.
    #[error("Checkout not initiated for this session")]
    CheckoutNotInitiated,

    /// The gateway reported the payment as not settled.
    #[error("Payment declined for reference {0}")]
    PaymentDeclined(Reference),

    /// Settled amount does not equal the checkout total.
    #[error("Settled amount {settled} does not match checkout total {expected}")]
    AmountMismatch {
        /// Total computed from the cart snapshot, in minor units.
        expected: i64,
        /// Amount the verifier reported as settled, in minor units.
        settled: i64,
    },

    /// An order already exists for this payment reference.
    #[error("An order already exists for reference {0}")]
    DuplicateReference(Reference),

    /// The payment verifier could not be reached. Retryable.
    #[error("Payment verifier unavailable: {0}")]
    VerifierUnavailable(String),

    /// The payment verifier did not answer in time. Retryable.
    #[error("Payment verification timed out after {0}s")]
    VerificationTimeout(u64),

    /// The order store rejected or failed the write.
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// Order absent from the ledger.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Order status change outside the legal transition table.
    #[error("Illegal status transition from {from} to {to}")]
    IllegalTransition {
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// Operation requires the administrator capability.
    #[error("Operation requires administrator access")]
    Forbidden,

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch {
        expected: String,
        got: String,
    },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,
}

impl CommerceError {
    /// Whether the caller may safely retry the same call.
    ///
    /// Only transient verifier failures are retryable; the idempotency
    /// check on the payment reference makes the retry safe.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CommerceError::VerifierUnavailable(_) | CommerceError::VerificationTimeout(_)
        )
    }
}
