//! PendingTracker and PendingGuard tests.

use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};

use price_tracker_sdk::{PendingGuard, PendingKind, PendingTracker};

// ---------------------------------------------------------------------------
// begin / end / is_pending
// ---------------------------------------------------------------------------

#[test]
fn begin_twice_returns_true_then_false() {
    let mut tracker = PendingTracker::new();
    assert!(tracker.begin(PendingKind::Updating, 7));
    assert!(!tracker.begin(PendingKind::Updating, 7));
    assert!(tracker.is_pending(PendingKind::Updating, 7));
}

#[test]
fn begin_succeeds_again_after_end() {
    let mut tracker = PendingTracker::new();
    assert!(tracker.begin(PendingKind::Deleting, 7));
    tracker.end(PendingKind::Deleting, 7);
    assert!(!tracker.is_pending(PendingKind::Deleting, 7));
    assert!(tracker.begin(PendingKind::Deleting, 7));
}

#[test]
fn end_on_idle_id_is_noop() {
    let mut tracker = PendingTracker::new();
    tracker.begin(PendingKind::Updating, 1);

    tracker.end(PendingKind::Updating, 2);
    tracker.end(PendingKind::Deleting, 1);

    assert!(tracker.is_pending(PendingKind::Updating, 1));
    assert!(!tracker.is_pending(PendingKind::Updating, 2));
}

#[test]
fn kinds_and_ids_are_independent() {
    let mut tracker = PendingTracker::new();
    assert!(tracker.begin(PendingKind::Updating, 1));
    assert!(tracker.begin(PendingKind::Deleting, 1));
    assert!(tracker.begin(PendingKind::Updating, 2));

    tracker.end(PendingKind::Updating, 1);

    assert!(!tracker.is_pending(PendingKind::Updating, 1));
    assert!(tracker.is_pending(PendingKind::Deleting, 1));
    assert!(tracker.is_pending(PendingKind::Updating, 2));
}

#[test]
fn pending_ids_are_sorted_and_idle_tracks_all_kinds() {
    let mut tracker = PendingTracker::new();
    assert!(tracker.is_idle());

    tracker.begin(PendingKind::Updating, 9);
    tracker.begin(PendingKind::Updating, 3);
    tracker.begin(PendingKind::Deleting, 5);

    assert_eq!(tracker.pending_ids(PendingKind::Updating), vec![3, 9]);
    assert_eq!(tracker.pending_ids(PendingKind::Deleting), vec![5]);
    assert!(!tracker.is_idle());

    tracker.end(PendingKind::Updating, 9);
    tracker.end(PendingKind::Updating, 3);
    tracker.end(PendingKind::Deleting, 5);
    assert!(tracker.is_idle());
}

#[test]
fn kind_display() {
    assert_eq!(PendingKind::Updating.to_string(), "updating");
    assert_eq!(PendingKind::Deleting.to_string(), "deleting");
}

// ---------------------------------------------------------------------------
// PendingGuard
// ---------------------------------------------------------------------------

#[test]
fn guard_releases_on_drop() {
    let tracker = RefCell::new(PendingTracker::new());
    {
        let guard = PendingGuard::acquire(&tracker, PendingKind::Updating, 4).unwrap();
        assert_eq!(guard.kind(), PendingKind::Updating);
        assert_eq!(guard.id(), 4);
        assert!(tracker.borrow().is_pending(PendingKind::Updating, 4));
    }
    assert!(!tracker.borrow().is_pending(PendingKind::Updating, 4));
}

#[test]
fn second_guard_for_same_pair_is_refused() {
    let tracker = RefCell::new(PendingTracker::new());
    let first = PendingGuard::acquire(&tracker, PendingKind::Deleting, 4);
    assert!(first.is_some());
    assert!(PendingGuard::acquire(&tracker, PendingKind::Deleting, 4).is_none());
    assert!(PendingGuard::acquire(&tracker, PendingKind::Updating, 4).is_some());

    drop(first);
    assert!(PendingGuard::acquire(&tracker, PendingKind::Deleting, 4).is_some());
}

#[test]
fn guard_releases_when_operation_panics() {
    let tracker = RefCell::new(PendingTracker::new());

    let result = catch_unwind(AssertUnwindSafe(|| {
        let _guard = PendingGuard::acquire(&tracker, PendingKind::Updating, 8).unwrap();
        panic!("remote call blew up");
    }));

    assert!(result.is_err());
    assert!(!tracker.borrow().is_pending(PendingKind::Updating, 8));
}
