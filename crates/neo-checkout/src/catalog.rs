//! In-memory product catalog.
//!
//! A small `ProductLookup` adapter for demos and tests. The production
//! catalog lives outside this system; the orchestrator only ever sees the
//! trait.

use crate::ports::ProductLookup;
use async_trait::async_trait;
use neo_commerce::catalog::Product;
use neo_commerce::error::CommerceError;
use neo_commerce::ids::ProductId;
use neo_commerce::money::{Currency, Money};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory catalog.
#[derive(Default, Clone)]
pub struct MemoryCatalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl MemoryCatalog {
    /// Creates a new, empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-loaded with the sample storefront products.
    pub fn seeded() -> Self {
        let ngn = |amount| Money::new(amount, Currency::NGN);
        let sample = [
            Product::new(ProductId::new(1), "NeoPhone X1", ngn(250_000))
                .with_category("Phones")
                .with_description("6.7\u{201d} AMOLED, 5G, 128GB")
                .with_image("/img/phone.png"),
            Product::new(ProductId::new(2), "Tab Pro 11", ngn(310_000))
                .with_category("Tablets")
                .with_description("11\u{201d} IPS, 8GB/256GB")
                .with_image("/img/tablet.png"),
            Product::new(ProductId::new(3), "UltraBook 14", ngn(890_000))
                .with_category("Computers")
                .with_description("Core i7, 16GB/512GB SSD")
                .with_image("/img/laptop.png"),
            Product::new(ProductId::new(4), "BassPods Wireless", ngn(68_000))
                .with_category("Audio")
                .with_description("ANC earbuds, 24h battery")
                .with_image("/img/earbuds.png"),
            Product::new(ProductId::new(5), "GameBox One S", ngn(420_000))
                .with_category("Gaming")
                .with_description("4K HDR console")
                .with_image("/img/console.png"),
            Product::new(ProductId::new(6), "NeoWatch S", ngn(95_000))
                .with_category("Wearables")
                .with_description("AMOLED, GPS, SpO2")
                .with_image("/img/watch.png"),
        ];

        let products = sample.into_iter().map(|p| (p.id, p)).collect();
        Self {
            products: Arc::new(RwLock::new(products)),
        }
    }

    /// Insert or replace a product.
    pub async fn insert(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    /// List active products, ordered by ID.
    pub async fn list_active(&self) -> Vec<Product> {
        let products = self.products.read().await;
        let mut active: Vec<Product> = products.values().filter(|p| p.active).cloned().collect();
        active.sort_by_key(|p| p.id);
        active
    }
}

#[async_trait]
impl ProductLookup for MemoryCatalog {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, CommerceError> {
        let products = self.products.read().await;
        Ok(products.get(&id).filter(|p| p.active).cloned())
    }
}
