//! Per-product registry of in-flight mutations.
//!
//! A product id is pending for a [`PendingKind`] from the moment its remote
//! call is issued until the call settles. [`PendingTracker::begin`] refuses a
//! second operation of the same kind on the same id, which is what keeps the
//! UI from double-submitting a refresh or delete. Different kinds and
//! different ids never contend.
//!
//! [`PendingGuard`] ties the release to scope: dropping the guard ends the
//! operation, whether the call succeeded, failed, panicked, or its future was
//! dropped mid-flight.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::models::ProductId;

/// The kind of mutation a product can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingKind {
    /// A price refresh.
    Updating,
    /// A deletion.
    Deleting,
}

impl PendingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PendingKind::Updating => "updating",
            PendingKind::Deleting => "deleting",
        }
    }
}

impl fmt::Display for PendingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PendingTracker
// ---------------------------------------------------------------------------

/// Sets of pending product ids, partitioned by [`PendingKind`].
#[derive(Debug, Default)]
pub struct PendingTracker {
    pending: HashMap<PendingKind, HashSet<ProductId>>,
}

impl PendingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` pending for `kind`.
    ///
    /// Returns `false` without changing anything if it already is; the
    /// caller must then not issue the remote call.
    pub fn begin(&mut self, kind: PendingKind, id: ProductId) -> bool {
        self.pending.entry(kind).or_default().insert(id)
    }

    /// Clear `id` from `kind`. A no-op if it was never marked.
    pub fn end(&mut self, kind: PendingKind, id: ProductId) {
        if let Some(ids) = self.pending.get_mut(&kind) {
            ids.remove(&id);
            if ids.is_empty() {
                self.pending.remove(&kind);
            }
        }
    }

    pub fn is_pending(&self, kind: PendingKind, id: ProductId) -> bool {
        self.pending
            .get(&kind)
            .map(|ids| ids.contains(&id))
            .unwrap_or(false)
    }

    /// Pending ids for `kind`, sorted ascending.
    pub fn pending_ids(&self, kind: PendingKind) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self
            .pending
            .get(&kind)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Whether any operation of any kind is in flight.
    pub fn is_idle(&self) -> bool {
        self.pending.values().all(HashSet::is_empty)
    }
}

// ---------------------------------------------------------------------------
// PendingGuard
// ---------------------------------------------------------------------------

/// Scoped pending status for one `(kind, id)` pair.
///
/// Obtained from [`PendingGuard::acquire`]; ends the operation on drop.
#[must_use = "dropping the guard immediately ends the pending operation"]
pub struct PendingGuard<'a> {
    tracker: &'a RefCell<PendingTracker>,
    kind: PendingKind,
    id: ProductId,
}

impl<'a> PendingGuard<'a> {
    /// Begin `kind` on `id`, or return `None` if it is already in flight.
    pub fn acquire(
        tracker: &'a RefCell<PendingTracker>,
        kind: PendingKind,
        id: ProductId,
    ) -> Option<Self> {
        if tracker.borrow_mut().begin(kind, id) {
            Some(Self { tracker, kind, id })
        } else {
            None
        }
    }

    pub fn kind(&self) -> PendingKind {
        self.kind
    }

    pub fn id(&self) -> ProductId {
        self.id
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.tracker.borrow_mut().end(self.kind, self.id);
    }
}

impl fmt::Debug for PendingGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingGuard")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}
