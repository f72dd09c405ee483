//! Price Tracker SDK for Rust.
//!
//! Client-side state layer for the Price Tracker API. Keeps an in-memory
//! collection of tracked products in step with the backend, refuses duplicate
//! in-flight refreshes and deletes, and turns a product's price history into
//! chart-ready series.
//!
//! # Quick start
//!
//! ```no_run
//! use price_tracker_sdk::{PriceTracker, SyncOutcome};
//!
//! # async fn example() -> price_tracker_sdk::Result<()> {
//! let tracker = PriceTracker::builder()
//!     .base_url("http://localhost:8000")
//!     .build()?;
//!
//! let _ = tracker.load_products().await;
//!
//! if let SyncOutcome::Completed(product) =
//!     tracker.create_product("https://www.amazon.com/dp/B000000000").await
//! {
//!     let _ = tracker.refresh_price(product.id).await;
//!     let chart = tracker.open_chart(product.id).await;
//! }
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod chart;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod pending;
pub mod store;
pub mod sync;
pub mod transport;

#[cfg(feature = "blocking")]
pub use blocking::BlockingTracker;
pub use chart::{ChartSeries, ChartSeriesBuilder, PriceChart, PriceSummary};
pub use error::{ErrorKind, Result, TrackerError};
pub use models::{PriceHistoryEntry, Product, ProductCreate, ProductId, ProductWithHistory};
pub use pending::{PendingGuard, PendingKind, PendingTracker};
pub use store::{ProductStore, StoreChange};
pub use sync::{LoadState, Notice, Operation, SkipReason, SyncController, SyncOutcome};
pub use transport::{HttpTransport, Transport};

use std::time::Duration;

/// A [`SyncController`] talking to the real backend over HTTP.
pub type PriceTracker = SyncController<HttpTransport>;

// ---------------------------------------------------------------------------
// PriceTrackerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`PriceTracker`].
///
/// Use [`PriceTracker::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](PriceTrackerBuilder::build).
#[derive(Debug, Clone)]
pub struct PriceTrackerBuilder {
    base_url: Option<String>,
    timeout: Duration,
    chart_builder: ChartSeriesBuilder,
}

impl Default for PriceTrackerBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: config::DEFAULT_TIMEOUT,
            chart_builder: ChartSeriesBuilder::default(),
        }
    }
}

impl PriceTrackerBuilder {
    /// Set the API base URL.
    ///
    /// If not set, `PRICE_TRACKER_API_URL` is used when present, otherwise
    /// `http://localhost:8000`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the per-request HTTP timeout.
    ///
    /// Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Customize how price history charts are labelled.
    pub fn chart_builder(mut self, chart_builder: ChartSeriesBuilder) -> Self {
        self.chart_builder = chart_builder;
        self
    }

    /// The base URL `build()` will use.
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => config::normalize_base_url(url),
            None => config::default_api_url(),
        }
    }

    /// Build the tracker. No request is made until the first flow runs.
    pub fn build(self) -> Result<PriceTracker> {
        let transport = HttpTransport::new(&self.resolved_base_url(), self.timeout)?;
        tracing::debug!(base_url = transport.base_url(), "built price tracker");
        Ok(SyncController::with_chart_builder(transport, self.chart_builder))
    }
}

impl SyncController<HttpTransport> {
    /// Create a new builder for an HTTP-backed tracker.
    pub fn builder() -> PriceTrackerBuilder {
        PriceTrackerBuilder::default()
    }
}
