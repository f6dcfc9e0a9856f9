//! Checkout intent: the cart snapshot handed to payment verification.

use crate::cart::CartLine;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A frozen snapshot of a cart at checkout initiation.
///
/// The order written on confirmation is built from this snapshot, never
/// from a fresh read of the cart, so a cart mutated between initiate and
/// confirm cannot change what was paid for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutIntent {
    /// Lines copied out of the cart.
    pub lines: Vec<CartLine>,
    /// Total computed from the lines at snapshot time.
    pub total: Money,
    /// Currency the payment must settle in.
    pub currency: Currency,
    /// Unix timestamp of the snapshot.
    pub created_at: i64,
}

impl CheckoutIntent {
    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}
