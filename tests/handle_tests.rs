//! Owned Handle Tests
//!
//! Tests for:
//! - Destroy-exactly-once on drop
//! - Ownership transfer via take / assign
//! - Empty handles

use std::cell::Cell;
use std::rc::Rc;

use umbra::resources::{GpuResource, Owned};

/// Counts destroy calls in a shared cell.
struct Probe {
    destroyed: Rc<Cell<u32>>,
}

impl GpuResource for Probe {
    fn destroy(&mut self) {
        self.destroyed.set(self.destroyed.get() + 1);
    }
}

fn probe() -> (Owned<Probe>, Rc<Cell<u32>>) {
    let counter = Rc::new(Cell::new(0));
    let handle = Owned::new(Probe {
        destroyed: Rc::clone(&counter),
    });
    (handle, counter)
}

// ============================================================================
// Lifetime
// ============================================================================

#[test]
fn drop_destroys_once() {
    let (handle, counter) = probe();
    assert!(!handle.is_empty());
    drop(handle);
    assert_eq!(counter.get(), 1);
}

#[test]
fn release_then_drop_destroys_once() {
    let (mut handle, counter) = probe();
    handle.release();
    assert!(handle.is_empty());
    handle.release();
    drop(handle);
    assert_eq!(counter.get(), 1, "released handle destroyed again");
}

#[test]
fn empty_handle_drop_is_noop() {
    let handle: Owned<Probe> = Owned::empty();
    assert!(handle.is_empty());
    assert!(handle.get().is_none());
    drop(handle);
    let defaulted: Owned<Probe> = Owned::default();
    assert!(defaulted.is_empty());
}

// ============================================================================
// Transfer
// ============================================================================

#[test]
fn take_moves_ownership() {
    let (mut source, counter) = probe();
    let target = source.take();
    assert!(source.is_empty());
    assert!(!target.is_empty());

    drop(source);
    assert_eq!(counter.get(), 0, "emptied source must not destroy");
    drop(target);
    assert_eq!(counter.get(), 1);
}

#[test]
fn assign_destroys_previous_object() {
    let (mut target, old_counter) = probe();
    let (mut source, new_counter) = probe();

    target.assign(&mut source);
    assert_eq!(old_counter.get(), 1, "overwritten object destroyed on assign");
    assert_eq!(new_counter.get(), 0);
    assert!(source.is_empty());

    drop(source);
    assert_eq!(new_counter.get(), 0);
    drop(target);
    assert_eq!(new_counter.get(), 1);
    assert_eq!(old_counter.get(), 1);
}

#[test]
fn assign_from_empty_leaves_target_empty() {
    let (mut target, counter) = probe();
    let mut source = Owned::empty();
    target.assign(&mut source);
    assert_eq!(counter.get(), 1);
    assert!(target.is_empty());
}
