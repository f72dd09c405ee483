//! Shared test fixtures for the Price Tracker SDK integration tests.
//!
//! Provides `ScriptedTransport`, an in-memory stand-in for the backend that
//! records every call, can be told to fail specific operations, and yields to
//! the executor before answering so concurrent flows interleave the way real
//! network calls would.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use price_tracker_sdk::{
    PriceHistoryEntry, Product, ProductCreate, ProductId, ProductWithHistory, Result, TrackerError,
    Transport,
};

/// Fixed point in time: 2024-01-05 `hour`:`minute` UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 5, hour, minute, 0).unwrap()
}

/// 2024-01-`day` 12:00 UTC.
pub fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
}

pub fn product(id: ProductId, name: &str, price: Option<f64>) -> Product {
    Product {
        id,
        name: name.to_string(),
        url: format!("https://www.amazon.com/dp/{}", id),
        current_price: price,
        last_updated: at(9, 0),
        created_at: at(9, 0),
    }
}

pub fn sample_products() -> Vec<Product> {
    vec![
        product(1, "Mechanical Keyboard", Some(89.99)),
        product(2, "USB-C Hub", None),
        product(3, "Noise Cancelling Headphones", Some(249.0)),
    ]
}

pub fn entry(product_id: ProductId, price: f64, timestamp: DateTime<Utc>) -> PriceHistoryEntry {
    PriceHistoryEntry::new(product_id, price, timestamp)
}

// ---------------------------------------------------------------------------
// ScriptedTransport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    List,
    Get,
    Create,
    Refresh,
    Delete,
    History,
}

/// How a scripted call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Transport,
    NotFound,
    Validation,
}

impl Failure {
    fn to_error(self) -> TrackerError {
        match self {
            Failure::Transport => TrackerError::Status {
                status: 503,
                detail: "Service Unavailable".to_string(),
            },
            Failure::NotFound => TrackerError::NotFound("Product not found".to_string()),
            Failure::Validation => {
                TrackerError::Validation("Failed to scrape product: no price found".to_string())
            }
        }
    }
}

/// In-memory backend. Responses are computed when the request arrives and
/// delivered after `delay` executor yields.
pub struct ScriptedTransport {
    server: RefCell<Vec<Product>>,
    history: RefCell<HashMap<ProductId, Vec<PriceHistoryEntry>>>,
    next_id: Cell<ProductId>,
    next_refresh: RefCell<HashMap<ProductId, (f64, DateTime<Utc>)>>,
    failures: RefCell<HashMap<Call, Failure>>,
    delays: RefCell<HashMap<Call, usize>>,
    calls: RefCell<Vec<(Call, Option<ProductId>)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::with_products(Vec::new())
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let next_id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        Self {
            server: RefCell::new(products),
            history: RefCell::new(HashMap::new()),
            next_id: Cell::new(next_id),
            next_refresh: RefCell::new(HashMap::new()),
            failures: RefCell::new(HashMap::new()),
            delays: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Make every `call` fail with `failure` until cleared.
    pub fn fail(&self, call: Call, failure: Failure) {
        self.failures.borrow_mut().insert(call, failure);
    }

    pub fn clear_failures(&self) {
        self.failures.borrow_mut().clear();
    }

    /// Yield `yields` times before answering `call` (default 1).
    pub fn delay(&self, call: Call, yields: usize) {
        self.delays.borrow_mut().insert(call, yields);
    }

    /// Price and timestamp the next refresh of `id` will report.
    pub fn script_refresh(&self, id: ProductId, price: f64, at: DateTime<Utc>) {
        self.next_refresh.borrow_mut().insert(id, (price, at));
    }

    pub fn set_history(&self, id: ProductId, entries: Vec<PriceHistoryEntry>) {
        self.history.borrow_mut().insert(id, entries);
    }

    pub fn calls(&self) -> Vec<(Call, Option<ProductId>)> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, call: Call) -> usize {
        self.calls.borrow().iter().filter(|(c, _)| *c == call).count()
    }

    pub fn server_products(&self) -> Vec<Product> {
        self.server.borrow().clone()
    }

    /// Overwrite the server's product table, e.g. to mimic another client.
    pub fn set_server_products(&self, products: Vec<Product>) {
        *self.server.borrow_mut() = products;
    }

    fn record(&self, call: Call, id: Option<ProductId>) -> Option<TrackerError> {
        self.calls.borrow_mut().push((call, id));
        self.failures.borrow().get(&call).map(|f| f.to_error())
    }

    async fn settle(&self, call: Call) {
        let yields = self.delays.borrow().get(&call).copied().unwrap_or(1);
        for _ in 0..yields {
            tokio::task::yield_now().await;
        }
    }

    async fn respond<T>(&self, call: Call, result: Result<T>) -> Result<T> {
        self.settle(call).await;
        result
    }

    fn find(&self, id: ProductId) -> Result<Product> {
        self.server
            .borrow()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound("Product not found".to_string()))
    }
}

impl Transport for ScriptedTransport {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let result = match self.record(Call::List, None) {
            Some(err) => Err(err),
            None => Ok(self.server_products()),
        };
        self.respond(Call::List, result).await
    }

    async fn get_product_with_history(&self, id: ProductId) -> Result<ProductWithHistory> {
        let result = match self.record(Call::Get, Some(id)) {
            Some(err) => Err(err),
            None => self.find(id).map(|product| ProductWithHistory {
                product,
                price_history: self.history.borrow().get(&id).cloned().unwrap_or_default(),
            }),
        };
        self.respond(Call::Get, result).await
    }

    async fn create_product(&self, request: &ProductCreate) -> Result<Product> {
        let result = match self.record(Call::Create, None) {
            Some(err) => Err(err),
            None => {
                let id = self.next_id.get();
                self.next_id.set(id + 1);
                let created = Product {
                    id,
                    name: format!("Product {}", id),
                    url: request.url.clone(),
                    current_price: None,
                    last_updated: at(10, 0),
                    created_at: at(10, 0),
                };
                self.server.borrow_mut().push(created.clone());
                Ok(created)
            }
        };
        self.respond(Call::Create, result).await
    }

    async fn refresh_price(&self, id: ProductId) -> Result<Product> {
        let result = match self.record(Call::Refresh, Some(id)) {
            Some(err) => Err(err),
            None => self.find(id).map(|mut product| {
                if let Some((price, ts)) = self.next_refresh.borrow_mut().remove(&id) {
                    product.current_price = Some(price);
                    product.last_updated = ts;
                    self.history
                        .borrow_mut()
                        .entry(id)
                        .or_default()
                        .push(PriceHistoryEntry::new(id, price, ts));
                }
                let mut server = self.server.borrow_mut();
                if let Some(slot) = server.iter_mut().find(|p| p.id == id) {
                    *slot = product.clone();
                }
                product
            }),
        };
        self.respond(Call::Refresh, result).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let result = match self.record(Call::Delete, Some(id)) {
            Some(err) => Err(err),
            None => self.find(id).map(|_| {
                self.server.borrow_mut().retain(|p| p.id != id);
                self.history.borrow_mut().remove(&id);
            }),
        };
        self.respond(Call::Delete, result).await
    }

    async fn price_history(&self, id: ProductId) -> Result<Vec<PriceHistoryEntry>> {
        let result = match self.record(Call::History, Some(id)) {
            Some(err) => Err(err),
            None => self
                .find(id)
                .map(|_| self.history.borrow().get(&id).cloned().unwrap_or_default()),
        };
        self.respond(Call::History, result).await
    }
}
