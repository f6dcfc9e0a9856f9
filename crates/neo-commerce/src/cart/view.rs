//! Cart read model.

use crate::cart::CartLine;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// The cart as returned to clients: lines plus computed total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartView {
    /// Lines in insertion order.
    pub lines: Vec<CartLine>,
    /// Sum of line subtotals.
    pub total: Money,
    /// Cart currency.
    pub currency: Currency,
}

impl CartView {
    /// An empty view in the given currency.
    pub fn empty(currency: Currency) -> Self {
        Self {
            lines: Vec::new(),
            total: Money::zero(currency),
            currency,
        }
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Check if the view holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
