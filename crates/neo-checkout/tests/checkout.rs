//! End-to-end checkout behavior.

use async_trait::async_trait;
use neo_checkout::prelude::*;
use neo_commerce::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Verifier answering every reference with a fixed outcome.
struct StaticVerifier(Verification);

#[async_trait]
impl PaymentVerifier for StaticVerifier {
    async fn verify(&self, _reference: &Reference) -> Result<Verification, CommerceError> {
        Ok(self.0)
    }
}

fn settles(amount: i64) -> Arc<StaticVerifier> {
    Arc::new(StaticVerifier(Verification {
        settled: true,
        amount: Money::new(amount, Currency::NGN),
    }))
}

fn declines(amount: i64) -> Arc<StaticVerifier> {
    Arc::new(StaticVerifier(Verification {
        settled: false,
        amount: Money::new(amount, Currency::NGN),
    }))
}

/// Verifier that fails transiently a number of times before settling.
struct FlakyVerifier {
    failures_left: AtomicUsize,
    amount: i64,
}

#[async_trait]
impl PaymentVerifier for FlakyVerifier {
    async fn verify(&self, _reference: &Reference) -> Result<Verification, CommerceError> {
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(CommerceError::VerifierUnavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(Verification {
            settled: true,
            amount: Money::new(self.amount, Currency::NGN),
        })
    }
}

/// Verifier that never answers.
struct StuckVerifier;

#[async_trait]
impl PaymentVerifier for StuckVerifier {
    async fn verify(&self, _reference: &Reference) -> Result<Verification, CommerceError> {
        std::future::pending().await
    }
}

struct Harness {
    catalog: MemoryCatalog,
    ledger: MemoryLedger,
    checkout: Arc<Checkout>,
}

fn harness_with(verifier: Arc<dyn PaymentVerifier>, config: CheckoutConfig) -> Harness {
    let catalog = MemoryCatalog::new();
    let ledger = MemoryLedger::new();
    let carts = Arc::new(CartStore::new(Arc::new(catalog.clone()), config.currency));
    let checkout = Arc::new(Checkout::new(
        carts,
        verifier,
        Arc::new(ledger.clone()),
        config,
    ));
    Harness {
        catalog,
        ledger,
        checkout,
    }
}

fn harness(verifier: Arc<dyn PaymentVerifier>) -> Harness {
    harness_with(
        verifier,
        CheckoutConfig {
            verification: VerificationMode::Mandatory,
            verify_timeout_secs: 1,
            currency: Currency::NGN,
        },
    )
}

/// A single product priced at 5000 kobo, as in the worked scenarios.
async fn stock_sample_product(h: &Harness) {
    h.catalog
        .insert(Product::new(
            ProductId::new(1),
            "Sample",
            Money::new(5000, Currency::NGN),
        ))
        .await;
}

const USER: UserId = UserId::new(10);

#[tokio::test]
async fn confirm_writes_paid_order_and_clears_cart() {
    let h = harness(settles(10_000));
    stock_sample_product(&h).await;
    let session = SessionId::new("sess-1");

    h.checkout
        .carts()
        .add_item(&session, ProductId::new(1), 2)
        .await
        .unwrap();
    let intent = h.checkout.initiate(&session).await.unwrap();
    assert_eq!(intent.total.amount_minor, 10_000);

    let order = h
        .checkout
        .confirm(&session, USER, &Reference::new("ref-A"))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.total.amount_minor, 10_000);
    assert_eq!(order.user_id, USER);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.items[0].unit_price.amount_minor, 5000);
    assert!(order.total_matches_items());

    let cart = h.checkout.carts().read(&session).await.unwrap();
    assert!(cart.is_empty());
    assert_eq!(h.ledger.len().await, 1);
}

#[tokio::test]
async fn amount_mismatch_leaves_no_order_and_cart_intact() {
    let h = harness(settles(9999));
    stock_sample_product(&h).await;
    let session = SessionId::new("sess-1");

    h.checkout
        .carts()
        .add_item(&session, ProductId::new(1), 2)
        .await
        .unwrap();
    h.checkout.initiate(&session).await.unwrap();

    let err = h
        .checkout
        .confirm(&session, USER, &Reference::new("ref-A"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CommerceError::AmountMismatch {
            expected: 10_000,
            settled: 9999
        }
    ));
    assert!(h.ledger.is_empty().await);

    let cart = h.checkout.carts().read(&session).await.unwrap();
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].quantity, 2);
}

#[tokio::test]
async fn declined_payment_aborts_checkout() {
    let h = harness(declines(10_000));
    stock_sample_product(&h).await;
    let session = SessionId::new("sess-1");

    h.checkout
        .carts()
        .add_item(&session, ProductId::new(1), 2)
        .await
        .unwrap();
    h.checkout.initiate(&session).await.unwrap();

    let err = h
        .checkout
        .confirm(&session, USER, &Reference::new("ref-A"))
        .await
        .unwrap_err();

    assert!(matches!(err, CommerceError::PaymentDeclined(_)));
    assert!(!err.is_retryable());
    assert!(h.ledger.is_empty().await);
}

#[tokio::test]
async fn confirm_replay_returns_existing_order() {
    let h = harness(settles(10_000));
    stock_sample_product(&h).await;
    let session = SessionId::new("sess-1");
    let reference = Reference::new("ref-A");

    h.checkout
        .carts()
        .add_item(&session, ProductId::new(1), 2)
        .await
        .unwrap();
    h.checkout.initiate(&session).await.unwrap();

    let first = h.checkout.confirm(&session, USER, &reference).await.unwrap();
    let second = h.checkout.confirm(&session, USER, &reference).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(h.ledger.len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_confirms_create_exactly_one_order() {
    let h = harness(settles(10_000));
    stock_sample_product(&h).await;
    let session = SessionId::new("sess-1");
    let reference = Reference::new("ref-A");

    h.checkout
        .carts()
        .add_item(&session, ProductId::new(1), 2)
        .await
        .unwrap();
    h.checkout.initiate(&session).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let checkout = h.checkout.clone();
        let session = session.clone();
        let reference = reference.clone();
        handles.push(tokio::spawn(async move {
            checkout.confirm(&session, USER, &reference).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }

    assert!(ids.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(h.ledger.len().await, 1);
    let order = h.ledger.find_by_reference(&reference).await.unwrap().unwrap();
    assert_eq!(order.reference, reference);
}

#[tokio::test]
async fn transient_verifier_failure_is_retryable_with_same_reference() {
    let h = harness(Arc::new(FlakyVerifier {
        failures_left: AtomicUsize::new(1),
        amount: 10_000,
    }));
    stock_sample_product(&h).await;
    let session = SessionId::new("sess-1");
    let reference = Reference::new("ref-A");

    h.checkout
        .carts()
        .add_item(&session, ProductId::new(1), 2)
        .await
        .unwrap();
    h.checkout.initiate(&session).await.unwrap();

    let err = h
        .checkout
        .confirm(&session, USER, &reference)
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::VerifierUnavailable(_)));
    assert!(err.is_retryable());
    assert!(h.ledger.is_empty().await);

    let order = h.checkout.confirm(&session, USER, &reference).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(h.ledger.len().await, 1);
}

#[tokio::test]
async fn verification_timeout_preserves_cart() {
    let h = harness(Arc::new(StuckVerifier));
    stock_sample_product(&h).await;
    let session = SessionId::new("sess-1");

    h.checkout
        .carts()
        .add_item(&session, ProductId::new(1), 2)
        .await
        .unwrap();
    h.checkout.initiate(&session).await.unwrap();

    let err = h
        .checkout
        .confirm(&session, USER, &Reference::new("ref-A"))
        .await
        .unwrap_err();

    assert!(matches!(err, CommerceError::VerificationTimeout(1)));
    assert!(err.is_retryable());
    assert!(h.ledger.is_empty().await);
    assert_eq!(
        h.checkout.carts().read(&session).await.unwrap().item_count(),
        2
    );
}

#[tokio::test]
async fn initiate_rejects_empty_cart() {
    let h = harness(settles(10_000));
    let err = h
        .checkout
        .initiate(&SessionId::new("sess-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::EmptyCart));
}

#[tokio::test]
async fn confirm_requires_initiate() {
    let h = harness(settles(10_000));
    stock_sample_product(&h).await;
    let session = SessionId::new("sess-1");

    h.checkout
        .carts()
        .add_item(&session, ProductId::new(1), 2)
        .await
        .unwrap();

    let err = h
        .checkout
        .confirm(&session, USER, &Reference::new("ref-A"))
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::CheckoutNotInitiated));
}

#[tokio::test]
async fn order_is_built_from_the_initiate_snapshot() {
    let h = harness(settles(10_000));
    stock_sample_product(&h).await;
    h.catalog
        .insert(Product::new(
            ProductId::new(2),
            "Extra",
            Money::new(7000, Currency::NGN),
        ))
        .await;
    let session = SessionId::new("sess-1");

    h.checkout
        .carts()
        .add_item(&session, ProductId::new(1), 2)
        .await
        .unwrap();
    h.checkout.initiate(&session).await.unwrap();

    // Mutating the cart between initiate and confirm must not change
    // what is ordered.
    h.checkout
        .carts()
        .add_item(&session, ProductId::new(2), 1)
        .await
        .unwrap();

    let order = h
        .checkout
        .confirm(&session, USER, &Reference::new("ref-A"))
        .await
        .unwrap();

    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].product_id, ProductId::new(1));
    assert_eq!(order.total.amount_minor, 10_000);
}

#[tokio::test]
async fn set_status_enforces_capability_and_transitions() {
    let h = harness(settles(10_000));
    stock_sample_product(&h).await;
    let session = SessionId::new("sess-1");

    h.checkout
        .carts()
        .add_item(&session, ProductId::new(1), 2)
        .await
        .unwrap();
    h.checkout.initiate(&session).await.unwrap();
    let order = h
        .checkout
        .confirm(&session, USER, &Reference::new("ref-A"))
        .await
        .unwrap();

    let customer = Actor::customer(UserId::new(20));
    let admin = Actor::admin(UserId::new(1));

    let err = h
        .checkout
        .set_status(order.id, OrderStatus::Shipped, &customer)
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::Forbidden));

    let shipped = h
        .checkout
        .set_status(order.id, OrderStatus::Shipped, &admin)
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    let err = h
        .checkout
        .set_status(order.id, OrderStatus::Pending, &admin)
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::IllegalTransition { .. }));

    // Totals and items survive status changes untouched.
    let fetched = h.checkout.get_order(order.id).await.unwrap();
    assert_eq!(fetched.total, order.total);
    assert_eq!(fetched.items, order.items);
}

#[tokio::test]
async fn list_orders_is_admin_only() {
    let h = harness(settles(10_000));
    stock_sample_product(&h).await;
    let session = SessionId::new("sess-1");

    h.checkout
        .carts()
        .add_item(&session, ProductId::new(1), 2)
        .await
        .unwrap();
    h.checkout.initiate(&session).await.unwrap();
    h.checkout
        .confirm(&session, USER, &Reference::new("ref-A"))
        .await
        .unwrap();

    let customer = Actor::customer(UserId::new(20));
    let admin = Actor::admin(UserId::new(1));

    let err = h
        .checkout
        .list_orders(&OrderFilter::all(), &customer)
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::Forbidden));

    let all = h
        .checkout
        .list_orders(&OrderFilter::all(), &admin)
        .await
        .unwrap();
    assert_eq!(all.len(), 1);

    let shipped = h
        .checkout
        .list_orders(&OrderFilter::all().with_status(OrderStatus::Shipped), &admin)
        .await
        .unwrap();
    assert!(shipped.is_empty());
}

#[tokio::test]
async fn demo_mode_skips_the_verifier() {
    let h = harness_with(
        Arc::new(StuckVerifier),
        CheckoutConfig {
            verification: VerificationMode::Demo,
            verify_timeout_secs: 1,
            currency: Currency::NGN,
        },
    );
    stock_sample_product(&h).await;
    let session = SessionId::new("sess-1");

    h.checkout
        .carts()
        .add_item(&session, ProductId::new(1), 2)
        .await
        .unwrap();
    h.checkout.initiate(&session).await.unwrap();

    let order = h
        .checkout
        .confirm(&session, USER, &Reference::new("ref-A"))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.total.amount_minor, 10_000);
}
