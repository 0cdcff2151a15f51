//! Single-slot selector channel.
//!
//! # Responsibility
//! - Hand observers the most recently published `QuerySelector`.
//! - Let slow observers skip intermediate selectors instead of queueing them.
//!
//! # Invariants
//! - Every publish overwrites the slot and bumps a monotonic version.
//! - A subscriber never receives the same version twice.
//! - Once the publisher is dropped, blocked subscribers wake and see `None`
//!   after draining the final value.

use super::state::QuerySelector;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

struct Slot {
    version: u64,
    selector: QuerySelector,
    closed: bool,
}

struct Shared {
    slot: Mutex<Slot>,
    changed: Condvar,
}

impl Shared {
    // A panicking observer must not wedge the UI-side publisher.
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Write side of the selector channel. Owned by the filter engine.
pub struct SelectorPublisher {
    shared: Arc<Shared>,
}

/// Read side of the selector channel.
///
/// Cloning a subscriber copies its read position.
#[derive(Clone)]
pub struct SelectorSubscriber {
    shared: Arc<Shared>,
    seen: u64,
}

impl SelectorPublisher {
    /// Creates a channel whose slot already holds `initial` as version 1.
    pub fn new(initial: QuerySelector) -> Self {
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    version: 1,
                    selector: initial,
                    closed: false,
                }),
                changed: Condvar::new(),
            }),
        }
    }

    /// Overwrites the slot and wakes every waiting subscriber.
    ///
    /// Returns the version assigned to `selector`.
    pub fn publish(&self, selector: QuerySelector) -> u64 {
        let version = {
            let mut slot = self.shared.lock();
            slot.version += 1;
            slot.selector = selector;
            slot.version
        };
        self.shared.changed.notify_all();
        version
    }

    /// Publishes only when `selector` differs from the slot's value.
    ///
    /// Returns the new version, or `None` when the slot already held an
    /// equal selector and no subscriber was woken.
    pub fn publish_if_changed(&self, selector: QuerySelector) -> Option<u64> {
        let version = {
            let mut slot = self.shared.lock();
            if slot.selector == selector {
                return None;
            }
            slot.version += 1;
            slot.selector = selector;
            slot.version
        };
        self.shared.changed.notify_all();
        Some(version)
    }

    /// Version of the value currently in the slot.
    pub fn version(&self) -> u64 {
        self.shared.lock().version
    }

    /// Creates a subscriber that has not seen any version yet, so its first
    /// receive returns the current value immediately.
    pub fn subscribe(&self) -> SelectorSubscriber {
        SelectorSubscriber {
            shared: Arc::clone(&self.shared),
            seen: 0,
        }
    }
}

impl Drop for SelectorPublisher {
    fn drop(&mut self) {
        self.shared.lock().closed = true;
        self.shared.changed.notify_all();
    }
}

impl SelectorSubscriber {
    /// Last version this subscriber received.
    pub fn seen_version(&self) -> u64 {
        self.seen
    }

    /// Returns the current value and marks it seen, whether or not it is new.
    pub fn latest(&mut self) -> QuerySelector {
        let slot = self.shared.lock();
        self.seen = slot.version;
        slot.selector.clone()
    }

    /// Returns the current value only when it is newer than the last one seen.
    pub fn try_recv(&mut self) -> Option<QuerySelector> {
        let slot = self.shared.lock();
        take_if_newer(&mut self.seen, &slot)
    }

    /// Blocks until a newer value is published.
    ///
    /// Returns `None` when the publisher has gone away and nothing newer is
    /// left to read.
    pub fn recv(&mut self) -> Option<QuerySelector> {
        let mut slot = self.shared.lock();
        loop {
            if let Some(selector) = take_if_newer(&mut self.seen, &slot) {
                return Some(selector);
            }
            if slot.closed {
                return None;
            }
            slot = self
                .shared
                .changed
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`recv`](Self::recv) but gives up after `timeout`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<QuerySelector> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.shared.lock();
        loop {
            if let Some(selector) = take_if_newer(&mut self.seen, &slot) {
                return Some(selector);
            }
            if slot.closed {
                return None;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            slot = self
                .shared
                .changed
                .wait_timeout(slot, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

fn take_if_newer(seen: &mut u64, slot: &Slot) -> Option<QuerySelector> {
    if slot.version > *seen {
        *seen = slot.version;
        Some(slot.selector.clone())
    } else {
        None
    }
}
