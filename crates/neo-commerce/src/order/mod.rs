//! Order module.
//!
//! Contains the durable order record, its line items, the status machine,
//! and the listing filter.

mod order;
mod status;

pub use order::{Order, OrderFilter, OrderItem};
pub use status::OrderStatus;
