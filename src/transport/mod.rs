//! Backend collaborator used by [`SyncController`](crate::sync::SyncController).
//!
//! [`Transport`] is one request/response call per operation with a structured
//! success or failure; no streaming and no partial results. [`HttpTransport`]
//! talks to the real API; tests plug in scripted implementations.

pub mod http;

pub use http::HttpTransport;

use crate::error::Result;
use crate::models::{PriceHistoryEntry, Product, ProductCreate, ProductId, ProductWithHistory};

/// The backend operations the sync layer depends on.
///
/// Futures are not required to be `Send`: the sync layer runs on a single
/// logical thread.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// All tracked products.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// A product together with its recorded prices.
    async fn get_product_with_history(&self, id: ProductId) -> Result<ProductWithHistory>;

    /// Start tracking a URL. The server resolves name and price.
    async fn create_product(&self, request: &ProductCreate) -> Result<Product>;

    /// Ask the server to fetch a fresh price.
    async fn refresh_price(&self, id: ProductId) -> Result<Product>;

    async fn delete_product(&self, id: ProductId) -> Result<()>;

    /// Recorded prices only, without the product.
    async fn price_history(&self, id: ProductId) -> Result<Vec<PriceHistoryEntry>>;
}

impl<T: Transport> Transport for &T {
    async fn list_products(&self) -> Result<Vec<Product>> {
        (**self).list_products().await
    }

    async fn get_product_with_history(&self, id: ProductId) -> Result<ProductWithHistory> {
        (**self).get_product_with_history(id).await
    }

    async fn create_product(&self, request: &ProductCreate) -> Result<Product> {
        (**self).create_product(request).await
    }

    async fn refresh_price(&self, id: ProductId) -> Result<Product> {
        (**self).refresh_price(id).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        (**self).delete_product(id).await
    }

    async fn price_history(&self, id: ProductId) -> Result<Vec<PriceHistoryEntry>> {
        (**self).price_history(id).await
    }
}
