//! Checkout orchestration.
//!
//! Converts a cart snapshot into a durable order behind payment
//! verification, and owns administrative order-status transitions.

use crate::cart_store::CartStore;
use crate::config::{CheckoutConfig, VerificationMode};
use crate::ports::{OrderLedger, PaymentVerifier};
use crate::session::Actor;
use neo_commerce::checkout::CheckoutIntent;
use neo_commerce::error::CommerceError;
use neo_commerce::ids::{OrderId, Reference, SessionId, UserId};
use neo_commerce::order::{Order, OrderFilter, OrderStatus};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// The checkout orchestrator.
///
/// Coordinates the cart store, the payment verifier and the order ledger
/// as one logical transition: snapshot, verify, commit, clean up.
pub struct Checkout {
    carts: Arc<CartStore>,
    verifier: Arc<dyn PaymentVerifier>,
    ledger: Arc<dyn OrderLedger>,
    config: CheckoutConfig,
    intents: Mutex<HashMap<SessionId, CheckoutIntent>>,
    reference_locks: Mutex<HashMap<Reference, Arc<Mutex<()>>>>,
}

impl Checkout {
    /// Create an orchestrator over the given collaborators.
    pub fn new(
        carts: Arc<CartStore>,
        verifier: Arc<dyn PaymentVerifier>,
        ledger: Arc<dyn OrderLedger>,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            carts,
            verifier,
            ledger,
            config,
            intents: Mutex::new(HashMap::new()),
            reference_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The cart store this orchestrator fronts.
    pub fn carts(&self) -> &Arc<CartStore> {
        &self.carts
    }

    /// Begin a checkout: snapshot the session's cart.
    ///
    /// Fails with `EmptyCart` when there is nothing to buy. The snapshot
    /// is kept per session and consumed by `confirm`; later cart
    /// mutations do not affect it.
    pub async fn initiate(&self, session: &SessionId) -> Result<CheckoutIntent, CommerceError> {
        let intent = self.carts.snapshot(session).await?;
        tracing::info!(
            session = %session,
            total = intent.total.amount_minor,
            items = intent.item_count(),
            "checkout initiated"
        );
        self.intents
            .lock()
            .await
            .insert(session.clone(), intent.clone());
        Ok(intent)
    }

    /// Confirm a checkout against a payment reference.
    ///
    /// The whole transition runs under a single-writer lock scoped to the
    /// reference, so two concurrent confirms with the same reference
    /// cannot both pass the existence check. A replay of an
    /// already-confirmed reference returns the existing order. On any
    /// verification failure no order is written and the cart is left
    /// untouched, so the caller may retry.
    pub async fn confirm(
        &self,
        session: &SessionId,
        user_id: UserId,
        reference: &Reference,
    ) -> Result<Order, CommerceError> {
        let lock = self.reference_lock(reference).await;
        let _guard = lock.lock().await;

        if let Some(existing) = self.ledger.find_by_reference(reference).await? {
            tracing::info!(
                reference = %reference,
                order = %existing.id,
                "reference already confirmed, returning existing order"
            );
            return Ok(existing);
        }

        let intent = self
            .intents
            .lock()
            .await
            .get(session)
            .cloned()
            .ok_or(CommerceError::CheckoutNotInitiated)?;

        match self.config.verification {
            VerificationMode::Mandatory => {
                self.verify_settlement(&intent, reference).await?;
            }
            VerificationMode::Demo => {
                tracing::warn!(
                    reference = %reference,
                    "demo mode: skipping payment verification"
                );
            }
        }

        let order = match self
            .ledger
            .create_order(
                user_id,
                &intent.lines,
                intent.total,
                reference,
                OrderStatus::Paid,
            )
            .await
        {
            Ok(order) => order,
            // The storage constraint answered first; treat as confirmed.
            Err(CommerceError::DuplicateReference(_)) => self
                .ledger
                .find_by_reference(reference)
                .await?
                .ok_or_else(|| {
                    CommerceError::StorageFailure(
                        "duplicate reference without stored order".to_string(),
                    )
                })?,
            Err(e) => return Err(e),
        };

        tracing::info!(
            order = %order.id,
            reference = %reference,
            total = order.total.amount_minor,
            "order committed"
        );

        // Cart clearing is cleanup, not part of the commit's atomicity
        // boundary: a failure here leaves the order in place.
        self.intents.lock().await.remove(session);
        if let Err(e) = self.carts.clear(session).await {
            tracing::warn!(session = %session, error = %e, "cart clear failed after commit");
        }

        drop(_guard);
        self.prune_reference_lock(reference).await;
        Ok(order)
    }

    /// Administrative status transition.
    ///
    /// Never touches totals or items; the transition table is enforced by
    /// the ledger under its write lock.
    pub async fn set_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        actor: &Actor,
    ) -> Result<Order, CommerceError> {
        actor.require_admin()?;
        let order = self.ledger.update_status(order_id, status).await?;
        tracing::info!(
            order = %order.id,
            status = %order.status,
            admin = %actor.user_id,
            "order status updated"
        );
        Ok(order)
    }

    /// Administrative order listing, newest first.
    pub async fn list_orders(
        &self,
        filter: &OrderFilter,
        actor: &Actor,
    ) -> Result<Vec<Order>, CommerceError> {
        actor.require_admin()?;
        self.ledger.list_orders(filter).await
    }

    /// Fetch a single order.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, CommerceError> {
        self.ledger
            .get_order(order_id)
            .await?
            .ok_or(CommerceError::OrderNotFound(order_id))
    }

    /// Run the verifier against the intent, bounded by the configured
    /// timeout. The intent's cart snapshot was taken earlier, so no cart
    /// lock is held across this call.
    async fn verify_settlement(
        &self,
        intent: &CheckoutIntent,
        reference: &Reference,
    ) -> Result<(), CommerceError> {
        let timeout = Duration::from_secs(self.config.verify_timeout_secs);
        let verification = match tokio::time::timeout(timeout, self.verifier.verify(reference))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(reference = %reference, "payment verification timed out");
                return Err(CommerceError::VerificationTimeout(
                    self.config.verify_timeout_secs,
                ));
            }
        };

        if !verification.settled {
            tracing::warn!(reference = %reference, "payment not settled");
            return Err(CommerceError::PaymentDeclined(reference.clone()));
        }
        if verification.amount.currency != intent.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: intent.currency.code().to_string(),
                got: verification.amount.currency.code().to_string(),
            });
        }
        // Zero tolerance: a partial settlement is a mismatch.
        if verification.amount != intent.total {
            tracing::warn!(
                reference = %reference,
                expected = intent.total.amount_minor,
                settled = verification.amount.amount_minor,
                "settled amount mismatch"
            );
            return Err(CommerceError::AmountMismatch {
                expected: intent.total.amount_minor,
                settled: verification.amount.amount_minor,
            });
        }
        Ok(())
    }

    /// Get or create the single-writer lock for a reference.
    async fn reference_lock(&self, reference: &Reference) -> Arc<Mutex<()>> {
        self.reference_locks
            .lock()
            .await
            .entry(reference.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop a reference's lock entry once its order is visible.
    ///
    /// Late arrivals hit the replay check before they need exclusion, and
    /// the storage uniqueness constraint backstops them regardless.
    async fn prune_reference_lock(&self, reference: &Reference) {
        self.reference_locks.lock().await.remove(reference);
    }
}
