//! Cart storage and checkout orchestration for the NeoTech storefront.
//!
//! This crate turns the domain types from `neo-commerce` into a running
//! transaction engine:
//!
//! - **Ports**: traits for the product lookup, the payment verifier, and
//!   the order ledger
//! - **Cart store**: session-keyed carts with per-session locking
//! - **Checkout**: the orchestrator converting a cart snapshot into an
//!   order behind payment verification
//! - **Adapters**: in-memory catalog and ledger implementations
//!
//! # Example
//!
//! ```rust,ignore
//! use neo_checkout::prelude::*;
//!
//! let catalog = Arc::new(MemoryCatalog::seeded());
//! let carts = Arc::new(CartStore::new(catalog, Currency::NGN));
//! let checkout = Checkout::new(carts.clone(), verifier, ledger, CheckoutConfig::default());
//!
//! carts.add_item(&session, ProductId::new(1), 2).await?;
//! let intent = checkout.initiate(&session).await?;
//! let order = checkout.confirm(&session, user_id, &reference).await?;
//! ```

pub mod cart_store;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod ledger;
pub mod ports;
pub mod session;

pub use cart_store::CartStore;
pub use catalog::MemoryCatalog;
pub use checkout::Checkout;
pub use config::{CheckoutConfig, VerificationMode};
pub use ledger::MemoryLedger;
pub use ports::{OrderLedger, PaymentVerifier, ProductLookup, Verification};
pub use session::{Actor, Role};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart_store::CartStore;
    pub use crate::catalog::MemoryCatalog;
    pub use crate::checkout::Checkout;
    pub use crate::config::{CheckoutConfig, VerificationMode};
    pub use crate::ledger::MemoryLedger;
    pub use crate::ports::{OrderLedger, PaymentVerifier, ProductLookup, Verification};
    pub use crate::session::{Actor, Role};
}
