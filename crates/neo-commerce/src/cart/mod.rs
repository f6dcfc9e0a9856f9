//! Shopping cart module.
//!
//! Contains the per-session cart, its line items, and the read model
//! returned to clients.

mod cart;
mod view;

pub use cart::{Cart, CartLine, MAX_QUANTITY_PER_LINE};
pub use view::CartView;
