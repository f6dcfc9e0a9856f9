//! Cart and line item types.

use crate::cart::CartView;
use crate::catalog::Product;
use crate::checkout::CheckoutIntent;
use crate::error::CommerceError;
use crate::ids::{ProductId, SessionId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per cart line.
pub const MAX_QUANTITY_PER_LINE: i64 = 9999;

/// A shopping cart.
///
/// Owned by exactly one session. Lines are kept in insertion order and are
/// unique by product ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Owning session.
    pub session_id: SessionId,
    /// Cart currency.
    pub currency: Currency,
    /// Lines in the cart, insertion-ordered.
    pub lines: Vec<CartLine>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Cart {
    /// Create a new empty cart for a session.
    pub fn new(session_id: SessionId, currency: Currency) -> Self {
        let now = current_timestamp();
        Self {
            session_id,
            currency,
            lines: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a product to the cart.
    ///
    /// If a line for the product already exists, its quantity is increased;
    /// otherwise a new line is appended with name, price and image
    /// snapshotted from the product at add time. The snapshot is not
    /// refreshed by later catalog changes.
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if product.price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: product.price.currency.code().to_string(),
            });
        }

        if let Some(existing) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let new_quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
            if new_quantity > MAX_QUANTITY_PER_LINE {
                return Err(CommerceError::QuantityExceedsLimit(
                    new_quantity,
                    MAX_QUANTITY_PER_LINE,
                ));
            }
            existing.quantity = new_quantity;
            self.updated_at = current_timestamp();
            return Ok(());
        }

        if quantity > MAX_QUANTITY_PER_LINE {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_LINE,
            ));
        }

        self.lines.push(CartLine::from_product(product, quantity));
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Set the quantity of an existing line.
    ///
    /// Quantities below 1 are floored to 1; removing a line is an explicit
    /// operation, never a side effect of an update.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity > MAX_QUANTITY_PER_LINE {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_LINE,
            ));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CommerceError::LineNotFound(product_id))?;
        line.quantity = quantity.max(1);
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Remove a line from the cart.
    ///
    /// Removing an absent line is a no-op, not an error.
    pub fn remove_line(&mut self, product_id: ProductId) -> bool {
        let len_before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        let removed = self.lines.len() < len_before;
        if removed {
            self.updated_at = current_timestamp();
        }
        removed
    }

    /// Clear all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.updated_at = current_timestamp();
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Get a line by product ID.
    pub fn get_line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Compute the cart total.
    pub fn total(&self) -> Result<Money, CommerceError> {
        let mut total = Money::zero(self.currency);
        for line in &self.lines {
            let subtotal = line.subtotal().ok_or(CommerceError::Overflow)?;
            total = total.try_add(&subtotal).ok_or(CommerceError::Overflow)?;
        }
        Ok(total)
    }

    /// Build the read model: current lines plus computed total.
    ///
    /// Pure; no side effects.
    pub fn view(&self) -> Result<CartView, CommerceError> {
        Ok(CartView {
            lines: self.lines.clone(),
            total: self.total()?,
            currency: self.currency,
        })
    }

    /// Snapshot the cart into a checkout intent.
    ///
    /// The intent carries copies of the lines and the computed total;
    /// later cart mutations do not affect it.
    pub fn snapshot(&self) -> Result<CheckoutIntent, CommerceError> {
        if self.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        Ok(CheckoutIntent {
            lines: self.lines.clone(),
            total: self.total()?,
            currency: self.currency,
            created_at: current_timestamp(),
        })
    }
}

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Product name at add time.
    pub name: String,
    /// Unit price at add time.
    pub unit_price: Money,
    /// Image path at add time.
    pub image: String,
    /// Quantity, always >= 1.
    pub quantity: i64,
}

impl CartLine {
    /// Create a line by snapshotting a product.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            image: product.image.clone(),
            quantity,
        }
    }

    /// Line subtotal (unit price times quantity).
    ///
    /// Returns `None` on overflow.
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.try_multiply(self.quantity)
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
