//! Orchestration of remote operations against the local product collection.
//!
//! [`SyncController`] owns the [`ProductStore`], the [`PendingTracker`] and the
//! view-scoped notice slot. Every mutating flow follows the same shape:
//!
//! 1. acquire a [`PendingGuard`] (or skip if the operation is already running),
//! 2. issue the remote call through the [`Transport`],
//! 3. on success apply the server-confirmed result to the store and clear the
//!    notice; on failure record a [`Notice`] and leave the store alone,
//! 4. release the guard.
//!
//! Nothing is applied optimistically: the store only ever reflects what the
//! server confirmed. Mutations that commit while a reload is in flight are
//! journaled and replayed over the fresh listing, so a listing computed
//! before a create or delete cannot undo it. Errors never escape a flow as `Err`; they come back as
//! [`SyncOutcome::Failed`] and are also kept in the notice slot for the UI.
//!
//! The controller is single-threaded. State lives in `RefCell`s and no borrow
//! is held across an `.await`, so flows on different products (or different
//! kinds on one product) can be polled concurrently on one task.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

use crate::chart::{ChartSeriesBuilder, PriceChart};
use crate::error::{ErrorKind, TrackerError};
use crate::models::{PriceHistoryEntry, Product, ProductCreate, ProductId, ProductWithHistory};
use crate::pending::{PendingGuard, PendingKind, PendingTracker};
use crate::store::{ProductStore, StoreChange};
use crate::transport::Transport;

// ---------------------------------------------------------------------------
// Outcomes and notices
// ---------------------------------------------------------------------------

/// Result of one controller flow.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum SyncOutcome<T> {
    /// The remote call succeeded and its result was applied.
    Completed(T),
    /// Nothing was applied: either no remote call was made, or its result
    /// arrived for a product that had been deleted in the meantime.
    Skipped(SkipReason),
    /// The remote call (or client-side validation) failed; nothing was applied.
    Failed(Notice),
}

impl<T> SyncOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, SyncOutcome::Completed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, SyncOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SyncOutcome::Failed(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            SyncOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            SyncOutcome::Failed(notice) => Some(notice),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The same operation is already in flight for this product (or the
    /// product list is already loading).
    AlreadyPending,
    /// The user declined the delete confirmation.
    Cancelled,
    /// The call settled after its product was deleted; the result was dropped.
    Discarded,
}

/// Which flow produced a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Create,
    Refresh,
    Delete,
    History,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Refresh => "refresh",
            Operation::Delete => "delete",
            Operation::History => "history",
        };
        f.write_str(s)
    }
}

/// A user-visible, retryable error report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub operation: Operation,
    pub product_id: Option<ProductId>,
    pub kind: ErrorKind,
    pub message: String,
}

impl Notice {
    fn from_error(operation: Operation, product_id: Option<ProductId>, err: &TrackerError) -> Self {
        let message = match operation {
            Operation::Load => {
                "Failed to load products. Please check if the backend is running.".to_string()
            }
            Operation::History => "Failed to load price history for this product.".to_string(),
            Operation::Create => format!("Failed to add product: {}", err),
            Operation::Refresh => format!("Failed to update product price: {}", err),
            Operation::Delete => format!("Failed to delete product: {}", err),
        };
        Self {
            operation,
            product_id,
            kind: err.kind(),
            message,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Lifecycle of the product list view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading,
    Ready,
    /// The initial load failed; the UI should offer a retry instead of an
    /// empty list.
    Unavailable(Notice),
}

// ---------------------------------------------------------------------------
// SyncController
// ---------------------------------------------------------------------------

/// Client-side owner of the product collection and its in-flight operations.
pub struct SyncController<T> {
    transport: T,
    store: RefCell<ProductStore>,
    pending: RefCell<PendingTracker>,
    load_state: RefCell<LoadState>,
    notice: RefCell<Option<Notice>>,
    chart: RefCell<Option<ProductWithHistory>>,
    chart_builder: ChartSeriesBuilder,
    /// Changes committed while a load is in flight; `None` when idle.
    journal: RefCell<Option<Vec<StoreChange>>>,
    /// Ids deleted through this controller. The server never reuses ids.
    deleted: RefCell<HashSet<ProductId>>,
}

impl<T: Transport> SyncController<T> {
    pub fn new(transport: T) -> Self {
        Self::with_chart_builder(transport, ChartSeriesBuilder::default())
    }

    pub fn with_chart_builder(transport: T, chart_builder: ChartSeriesBuilder) -> Self {
        Self {
            transport,
            store: RefCell::new(ProductStore::new()),
            pending: RefCell::new(PendingTracker::new()),
            load_state: RefCell::new(LoadState::NotLoaded),
            notice: RefCell::new(None),
            chart: RefCell::new(None),
            chart_builder,
            journal: RefCell::new(None),
            deleted: RefCell::new(HashSet::new()),
        }
    }

    // -- Flows -------------------------------------------------------------

    /// Load (or reload) the full product list from the server.
    ///
    /// On failure the view becomes [`LoadState::Unavailable`] and whatever was
    /// loaded before stays in place. Calling this again is the retry.
    pub async fn load_products(&self) -> SyncOutcome<Vec<Product>> {
        let previous = {
            let mut state = self.load_state.borrow_mut();
            if *state == LoadState::Loading {
                tracing::debug!("product list already loading; skipping");
                return SyncOutcome::Skipped(SkipReason::AlreadyPending);
            }
            std::mem::replace(&mut *state, LoadState::Loading)
        };
        *self.journal.borrow_mut() = Some(Vec::new());
        let _loading = LoadingGuard {
            state: &self.load_state,
            journal: &self.journal,
            previous: Some(previous),
        };

        match self.transport.list_products().await {
            Ok(products) => {
                let changes = self.journal.borrow_mut().take().unwrap_or_default();
                {
                    let mut store = self.store.borrow_mut();
                    store.reset(products);
                    for change in &changes {
                        store.apply(change);
                    }
                }
                if !changes.is_empty() {
                    tracing::debug!(count = changes.len(), "replayed changes made during load");
                }
                *self.load_state.borrow_mut() = LoadState::Ready;
                self.clear_notice();
                let snapshot = self.products();
                tracing::info!(count = snapshot.len(), "loaded products");
                SyncOutcome::Completed(snapshot)
            }
            Err(err) => {
                let notice = self.record(Operation::Load, None, &err);
                *self.load_state.borrow_mut() = LoadState::Unavailable(notice.clone());
                SyncOutcome::Failed(notice)
            }
        }
    }

    /// Start tracking `url`.
    ///
    /// The product is appended only after the server confirms it; there is
    /// no provisional entry. Malformed URLs fail locally without a remote call.
    pub async fn create_product(&self, url: &str) -> SyncOutcome<Product> {
        let url = match validate_url(url) {
            Ok(url) => url,
            Err(err) => return SyncOutcome::Failed(self.record(Operation::Create, None, &err)),
        };

        match self.transport.create_product(&ProductCreate::new(url)).await {
            Ok(product) => {
                self.commit(StoreChange::Added(product.clone()));
                self.clear_notice();
                tracing::info!(product_id = product.id, name = %product.name, "added product");
                SyncOutcome::Completed(product)
            }
            Err(err) => SyncOutcome::Failed(self.record(Operation::Create, None, &err)),
        }
    }

    /// Ask the server for a fresh price for `id`.
    ///
    /// A second refresh of the same product while one is in flight is skipped
    /// without a remote call. On failure the stale product is left as is.
    pub async fn refresh_price(&self, id: ProductId) -> SyncOutcome<Product> {
        let Some(_guard) = PendingGuard::acquire(&self.pending, PendingKind::Updating, id) else {
            tracing::debug!(product_id = id, "refresh already in flight; skipping");
            return SyncOutcome::Skipped(SkipReason::AlreadyPending);
        };

        match self.transport.refresh_price(id).await {
            Ok(product) => {
                if !self.commit(StoreChange::Replaced(product.clone())) {
                    tracing::debug!(
                        product_id = id,
                        "product no longer in store; dropping refresh result"
                    );
                    return SyncOutcome::Skipped(SkipReason::Discarded);
                }
                tracing::info!(
                    product_id = id,
                    price = ?product.current_price,
                    "refreshed price"
                );
                self.clear_notice();
                SyncOutcome::Completed(product)
            }
            Err(err) => SyncOutcome::Failed(self.record(Operation::Refresh, Some(id), &err)),
        }
    }

    /// Delete `id` after the user confirms.
    ///
    /// `confirm` runs before the product is marked pending, so declining never
    /// leaves a trace. It is not called at all when a delete is already in
    /// flight. On failure the product stays in the list.
    pub async fn delete_product<F>(&self, id: ProductId, confirm: F) -> SyncOutcome<()>
    where
        F: FnOnce() -> bool,
    {
        if self.is_deleting(id) {
            tracing::debug!(product_id = id, "delete already in flight; skipping");
            return SyncOutcome::Skipped(SkipReason::AlreadyPending);
        }
        if !confirm() {
            return SyncOutcome::Skipped(SkipReason::Cancelled);
        }
        let Some(_guard) = PendingGuard::acquire(&self.pending, PendingKind::Deleting, id) else {
            return SyncOutcome::Skipped(SkipReason::AlreadyPending);
        };

        match self.transport.delete_product(id).await {
            Ok(()) => {
                self.deleted.borrow_mut().insert(id);
                self.commit(StoreChange::Removed(id));
                let charted = self
                    .chart
                    .borrow()
                    .as_ref()
                    .is_some_and(|c| c.product.id == id);
                if charted {
                    self.close_chart();
                }
                self.clear_notice();
                tracing::info!(product_id = id, "deleted product");
                SyncOutcome::Completed(())
            }
            Err(err) => SyncOutcome::Failed(self.record(Operation::Delete, Some(id), &err)),
        }
    }

    /// Fetch a product with its price history. Read-only and repeatable.
    pub async fn fetch_history(&self, id: ProductId) -> SyncOutcome<ProductWithHistory> {
        match self.transport.get_product_with_history(id).await {
            Ok(data) => SyncOutcome::Completed(data),
            Err(err) => SyncOutcome::Failed(self.record(Operation::History, Some(id), &err)),
        }
    }

    /// Fetch only the recorded prices for `id`.
    pub async fn price_history(&self, id: ProductId) -> SyncOutcome<Vec<PriceHistoryEntry>> {
        match self.transport.price_history(id).await {
            Ok(entries) => SyncOutcome::Completed(entries),
            Err(err) => SyncOutcome::Failed(self.record(Operation::History, Some(id), &err)),
        }
    }

    /// Fetch history for `id`, keep it as the open chart, and build it.
    ///
    /// If the product is deleted while the fetch is in flight the result is
    /// dropped and no chart is opened.
    pub async fn open_chart(&self, id: ProductId) -> SyncOutcome<PriceChart> {
        match self.fetch_history(id).await {
            SyncOutcome::Completed(_) if self.deleted.borrow().contains(&id) => {
                tracing::debug!(
                    product_id = id,
                    "product deleted during history fetch; not charting"
                );
                SyncOutcome::Skipped(SkipReason::Discarded)
            }
            SyncOutcome::Completed(data) => {
                let chart = self.chart_builder.build_for(&data);
                *self.chart.borrow_mut() = Some(data);
                SyncOutcome::Completed(chart)
            }
            SyncOutcome::Failed(notice) => SyncOutcome::Failed(notice),
            SyncOutcome::Skipped(reason) => SyncOutcome::Skipped(reason),
        }
    }

    pub fn close_chart(&self) {
        self.chart.borrow_mut().take();
    }

    /// The open chart, if any.
    pub fn chart(&self) -> Option<PriceChart> {
        self.chart
            .borrow()
            .as_ref()
            .map(|data| self.chart_builder.build_for(data))
    }

    /// The product and history behind the open chart, if any.
    pub fn chart_data(&self) -> Option<ProductWithHistory> {
        self.chart.borrow().clone()
    }

    // -- Read-only views ---------------------------------------------------

    /// Snapshot of the product list in insertion order.
    pub fn products(&self) -> Vec<Product> {
        self.store.borrow().list()
    }

    pub fn product(&self, id: ProductId) -> Option<Product> {
        self.store.borrow().get(id)
    }

    pub fn is_pending(&self, kind: PendingKind, id: ProductId) -> bool {
        self.pending.borrow().is_pending(kind, id)
    }

    pub fn is_updating(&self, id: ProductId) -> bool {
        self.is_pending(PendingKind::Updating, id)
    }

    pub fn is_deleting(&self, id: ProductId) -> bool {
        self.is_pending(PendingKind::Deleting, id)
    }

    pub fn pending_ids(&self, kind: PendingKind) -> Vec<ProductId> {
        self.pending.borrow().pending_ids(kind)
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state.borrow().clone()
    }

    /// The latest unresolved error report.
    pub fn notice(&self) -> Option<Notice> {
        self.notice.borrow().clone()
    }

    /// Dismiss the current notice.
    pub fn clear_notice(&self) {
        self.notice.borrow_mut().take();
    }

    pub fn chart_builder(&self) -> &ChartSeriesBuilder {
        &self.chart_builder
    }

    /// Return a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Apply `change` to the store, journaling it if a load is in flight.
    ///
    /// Returns whether the change took effect now or will on replay.
    fn commit(&self, change: StoreChange) -> bool {
        let applied = self.store.borrow_mut().apply(&change);
        match self.journal.borrow_mut().as_mut() {
            Some(journal) => {
                journal.push(change);
                true
            }
            None => applied,
        }
    }

    fn record(
        &self,
        operation: Operation,
        product_id: Option<ProductId>,
        err: &TrackerError,
    ) -> Notice {
        tracing::warn!(
            %operation,
            ?product_id,
            kind = %err.kind(),
            error = %err,
            "sync operation failed"
        );
        let notice = Notice::from_error(operation, product_id, err);
        *self.notice.borrow_mut() = Some(notice.clone());
        notice
    }
}

impl<T> fmt::Display for SyncController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self.pending.borrow();
        write!(
            f,
            "SyncController(products={}, updating={:?}, deleting={:?}, state={:?})",
            self.store.borrow().len(),
            pending.pending_ids(PendingKind::Updating),
            pending.pending_ids(PendingKind::Deleting),
            self.load_state.borrow()
        )
    }
}

/// Ends the load journal, and restores the previous [`LoadState`] if a load
/// future is dropped before it settles.
struct LoadingGuard<'a> {
    state: &'a RefCell<LoadState>,
    journal: &'a RefCell<Option<Vec<StoreChange>>>,
    previous: Option<LoadState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.journal.borrow_mut().take();
        let mut state = self.state.borrow_mut();
        if *state == LoadState::Loading {
            if let Some(previous) = self.previous.take() {
                *state = previous;
            }
        }
    }
}

/// Accept absolute `http`/`https` URLs with a host; returns the trimmed URL.
pub fn validate_url(url: &str) -> Result<String, TrackerError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::Validation("URL is required".to_string()));
    }
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| TrackerError::Validation(format!("'{}' is not a valid URL: {}", trimmed, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(TrackerError::Validation(format!(
            "unsupported URL scheme '{}'",
            parsed.scheme()
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(TrackerError::Validation(format!("'{}' has no host", trimmed)));
    }
    Ok(trimmed.to_string())
}
