//! Blocking wrapper around [`SyncController`] for callers without an async
//! runtime (CLIs, immediate-mode UIs).
//!
//! Owns a current-thread Tokio runtime and drives every flow to completion
//! with [`Runtime::block_on`](tokio::runtime::Runtime::block_on). Because each
//! call blocks until its remote operation settles, a caller on one thread
//! never observes a product as pending; the tracker still guards against
//! duplicate submissions when the controller is shared with async code.
//!
//! # Example
//!
//! ```no_run
//! use price_tracker_sdk::BlockingTracker;
//!
//! let tracker = BlockingTracker::builder().build().unwrap();
//! let _ = tracker.load_products();
//! for product in tracker.products() {
//!     println!("{} {}", product.name, price_tracker_sdk::format::price(product.current_price));
//! }
//! ```

use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

use crate::chart::{ChartSeriesBuilder, PriceChart};
use crate::error::Result;
use crate::models::{PriceHistoryEntry, Product, ProductId, ProductWithHistory};
use crate::sync::{SyncController, SyncOutcome};
use crate::transport::{HttpTransport, Transport};
use crate::PriceTrackerBuilder;

// ---------------------------------------------------------------------------
// BlockingTrackerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`BlockingTracker`].
#[derive(Debug, Clone, Default)]
pub struct BlockingTrackerBuilder {
    inner: PriceTrackerBuilder,
}

impl BlockingTrackerBuilder {
    /// Set the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.inner = self.inner.base_url(url);
        self
    }

    /// Set the per-request HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    /// Customize how price history charts are labelled.
    pub fn chart_builder(mut self, chart_builder: ChartSeriesBuilder) -> Self {
        self.inner = self.inner.chart_builder(chart_builder);
        self
    }

    /// Build the runtime and the HTTP-backed controller.
    pub fn build(self) -> Result<BlockingTracker<HttpTransport>> {
        Ok(BlockingTracker {
            runtime: new_runtime()?,
            controller: self.inner.build()?,
        })
    }
}

// ---------------------------------------------------------------------------
// BlockingTracker
// ---------------------------------------------------------------------------

/// Blocking facade over a [`SyncController`].
pub struct BlockingTracker<T = HttpTransport> {
    runtime: Runtime,
    controller: SyncController<T>,
}

impl BlockingTracker<HttpTransport> {
    /// Create a new builder for an HTTP-backed blocking tracker.
    pub fn builder() -> BlockingTrackerBuilder {
        BlockingTrackerBuilder::default()
    }
}

impl<T: Transport> BlockingTracker<T> {
    /// Wrap an existing controller (e.g. one with a custom transport).
    pub fn from_controller(controller: SyncController<T>) -> Result<Self> {
        Ok(Self {
            runtime: new_runtime()?,
            controller,
        })
    }

    pub fn load_products(&self) -> SyncOutcome<Vec<Product>> {
        self.runtime.block_on(self.controller.load_products())
    }

    pub fn create_product(&self, url: &str) -> SyncOutcome<Product> {
        self.runtime.block_on(self.controller.create_product(url))
    }

    pub fn refresh_price(&self, id: ProductId) -> SyncOutcome<Product> {
        self.runtime.block_on(self.controller.refresh_price(id))
    }

    pub fn delete_product<F>(&self, id: ProductId, confirm: F) -> SyncOutcome<()>
    where
        F: FnOnce() -> bool,
    {
        self.runtime
            .block_on(self.controller.delete_product(id, confirm))
    }

    pub fn fetch_history(&self, id: ProductId) -> SyncOutcome<ProductWithHistory> {
        self.runtime.block_on(self.controller.fetch_history(id))
    }

    pub fn price_history(&self, id: ProductId) -> SyncOutcome<Vec<PriceHistoryEntry>> {
        self.runtime.block_on(self.controller.price_history(id))
    }

    pub fn open_chart(&self, id: ProductId) -> SyncOutcome<PriceChart> {
        self.runtime.block_on(self.controller.open_chart(id))
    }

    /// Snapshot of the product list.
    pub fn products(&self) -> Vec<Product> {
        self.controller.products()
    }

    /// Access the wrapped controller for read-only queries (pending flags,
    /// notices, the open chart).
    pub fn controller(&self) -> &SyncController<T> {
        &self.controller
    }

    /// Consume the tracker and return the controller.
    pub fn into_controller(self) -> SyncController<T> {
        self.controller
    }
}

fn new_runtime() -> Result<Runtime> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}
