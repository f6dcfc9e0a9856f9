//! Product records as the cart sees them.
//!
//! The catalog itself is an external collaborator; this module only
//! defines the shape a lookup returns.

use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Current list price.
    pub price: Money,
    /// Category label.
    pub category: String,
    /// Short description for listings.
    pub description: String,
    /// Image path.
    pub image: String,
    /// Whether the product may be added to carts.
    pub active: bool,
}

impl Product {
    /// Create a new active product.
    pub fn new(id: ProductId, name: impl Into<String>, price: Money) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            category: String::new(),
            description: String::new(),
            image: "/img/placeholder.png".to_string(),
            active: true,
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the image path.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Mark the product inactive.
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}
