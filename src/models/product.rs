use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned product identity.
pub type ProductId = i64;

// ---------------------------------------------------------------------------
// Product: A tracked product as confirmed by the server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub url: String,
    /// `None` until the backend has resolved a price.
    pub current_price: Option<f64>,
    #[serde(with = "super::timestamp")]
    pub last_updated: DateTime<Utc>,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether the backend has confirmed a price for this product.
    pub fn has_price(&self) -> bool {
        self.current_price.is_some()
    }
}

// ---------------------------------------------------------------------------
// ProductCreate: Request body for adding a product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreate {
    pub url: String,
}

impl ProductCreate {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}
