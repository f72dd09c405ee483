//! [`Transport`] over the Price Tracker REST API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::Transport;
use crate::config;
use crate::error::{Result, TrackerError};
use crate::models::{PriceHistoryEntry, Product, ProductCreate, ProductId, ProductWithHistory};

/// HTTP client for the backend API.
///
/// Each call is a single request; non-success statuses are mapped into
/// [`TrackerError`] via [`TrackerError::from_status`]. Nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    /// Create a transport for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Use a preconfigured [`reqwest::Client`].
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            base_url: config::normalize_base_url(base_url),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Hit the API root; returns its status message.
    pub async fn health(&self) -> Result<String> {
        let body: serde_json::Value = self.fetch(self.client.get(self.url("/"))).await?;
        Ok(body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let resp = check_status(request.send().await?).await?;
        Ok(resp.json::<T>().await?)
    }
}

impl Transport for HttpTransport {
    async fn list_products(&self) -> Result<Vec<Product>> {
        self.fetch(self.client.get(self.url(config::PRODUCTS_PATH)))
            .await
    }

    async fn get_product_with_history(&self, id: ProductId) -> Result<ProductWithHistory> {
        self.fetch(self.client.get(self.url(&config::product_path(id))))
            .await
    }

    async fn create_product(&self, request: &ProductCreate) -> Result<Product> {
        self.fetch(self.client.post(self.url(config::PRODUCTS_PATH)).json(request))
            .await
    }

    async fn refresh_price(&self, id: ProductId) -> Result<Product> {
        self.fetch(self.client.post(self.url(&config::update_path(id))))
            .await
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let request = self.client.delete(self.url(&config::product_path(id)));
        check_status(request.send().await?).await?;
        Ok(())
    }

    async fn price_history(&self, id: ProductId) -> Result<Vec<PriceHistoryEntry>> {
        self.fetch(self.client.get(self.url(&config::price_history_path(id))))
            .await
    }
}

/// Pass successful responses through; turn anything else into an error
/// carrying the server's `detail` message when there is one.
async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let detail = error_detail(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    Err(TrackerError::from_status(status.as_u16(), detail))
}

/// `{"detail": "..."}` → the string; structured details (validation error
/// lists) are rendered as JSON; non-JSON bodies are used verbatim.
fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => Some(value.to_string()),
        },
        Err(_) => Some(body.to_string()),
    }
}
