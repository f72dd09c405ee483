use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::{Product, ProductId};

// ---------------------------------------------------------------------------
// PriceHistoryEntry: One recorded price observation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    #[serde(default)]
    pub id: i64,
    pub product_id: ProductId,
    pub price: f64,
    #[serde(with = "super::timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl PriceHistoryEntry {
    pub fn new(product_id: ProductId, price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            product_id,
            price,
            timestamp,
        }
    }

    /// Prices must be finite and non-negative to be plotted.
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price >= 0.0
    }
}

// ---------------------------------------------------------------------------
// ProductWithHistory: Product plus its history, in fetch order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWithHistory {
    pub product: Product,
    #[serde(default)]
    pub price_history: Vec<PriceHistoryEntry>,
}
