// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_timing --heading-base-level=0

//! Understory Timing: host-agnostic timer queue primitives for UI runtimes.
//!
//! UI state machines often need "call me back in N milliseconds, unless I
//! change my mind first": long-press detection, hover intent, tooltip delays.
//! This crate keeps the bookkeeping for such timers without owning a clock or
//! an event loop. The host feeds it monotonic timestamps and decides how to
//! wake up (a frame tick, a platform timer, an async sleep).
//!
//! The core type is [`TimerQueue`], a deadline-ordered set of single-shot
//! timers, each carrying a caller-defined key:
//!
//! - [`TimerQueue::schedule`] returns a [`TimerId`] for the new entry.
//! - [`TimerQueue::cancel`] removes an entry; canceling twice is harmless.
//! - [`TimerQueue::pop_due`] and [`TimerQueue::drain_due`] yield expired entries
//!   in deadline order, ties broken by scheduling order.
//! - [`TimerQueue::next_deadline`] tells the host when to wake up next.
//!
//! A canceled timer never expires. Identifiers are never reused within a
//! queue, so a stale [`TimerId`] held by a caller cannot alias a newer timer.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_timing::TimerQueue;
//!
//! let mut timers = TimerQueue::new();
//!
//! // Timestamps are host-defined monotonic milliseconds.
//! let tooltip = timers.schedule_after(1_000, 500, "tooltip");
//! let long_press = timers.schedule_after(1_000, 400, "long-press");
//! assert_eq!(timers.next_deadline(), Some(1_400));
//!
//! // The pointer moved: the long-press no longer applies.
//! assert_eq!(timers.cancel(long_press), Some("long-press"));
//!
//! // Nothing is due yet at 1_450; the tooltip fires at 1_500.
//! assert!(timers.pop_due(1_450).is_none());
//! let expired = timers.pop_due(1_500).unwrap();
//! assert_eq!(expired.id, tooltip);
//! assert_eq!(expired.key, "tooltip");
//! assert!(timers.is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::collections::BinaryHeap;
use core::cmp::Reverse;

use hashbrown::HashMap;

/// Identifier of a timer scheduled on a [`TimerQueue`].
///
/// Identifiers are allocated monotonically and never reused by the queue that
/// issued them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A timer that reached its deadline, as returned by [`TimerQueue::pop_due`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expired<K> {
    /// The identifier returned when the timer was scheduled.
    pub id: TimerId,
    /// The deadline the timer was scheduled for.
    pub deadline: u64,
    /// The caller's key.
    pub key: K,
}

#[derive(Clone, Debug)]
struct Pending<K> {
    deadline: u64,
    key: K,
}

/// A deadline-ordered queue of cancellable single-shot timers.
///
/// Cancellation is lazy: the heap keeps the stale entry until it reaches the
/// front, where it is discarded because its id is no longer pending.
#[derive(Clone, Debug)]
pub struct TimerQueue<K> {
    pending: HashMap<TimerId, Pending<K>>,
    heap: BinaryHeap<Reverse<(u64, TimerId)>>,
    next_id: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TimerQueue<K> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            heap: BinaryHeap::new(),
            next_id: 0,
        }
    }

    /// Schedules a timer that expires at `deadline`.
    pub fn schedule(&mut self, deadline: u64, key: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, Pending { deadline, key });
        self.heap.push(Reverse((deadline, id)));
        tracing::trace!(target: "understory_timing", id = id.get(), deadline, "timer scheduled");
        id
    }

    /// Schedules a timer that expires `delay` after `now`.
    ///
    /// The deadline saturates at `u64::MAX` rather than wrapping.
    pub fn schedule_after(&mut self, now: u64, delay: u64, key: K) -> TimerId {
        self.schedule(now.saturating_add(delay), key)
    }

    /// Cancels a pending timer, returning its key.
    ///
    /// Returns `None` if the timer already expired or was canceled before.
    pub fn cancel(&mut self, id: TimerId) -> Option<K> {
        let pending = self.pending.remove(&id)?;
        tracing::trace!(target: "understory_timing", id = id.get(), "timer canceled");
        if self.pending.is_empty() {
            self.heap.clear();
        }
        Some(pending.key)
    }

    /// Returns `true` if `id` is scheduled and has not expired or been canceled.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Returns the deadline of a pending timer.
    #[must_use]
    pub fn deadline(&self, id: TimerId) -> Option<u64> {
        self.pending.get(&id).map(|p| p.deadline)
    }

    /// Returns the key of a pending timer.
    #[must_use]
    pub fn key(&self, id: TimerId) -> Option<&K> {
        self.pending.get(&id).map(|p| &p.key)
    }

    /// Returns the earliest deadline among pending timers.
    ///
    /// Takes `&mut self` to discard canceled entries sitting at the front of
    /// the heap.
    pub fn next_deadline(&mut self) -> Option<u64> {
        self.prune_front();
        self.heap.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Removes and returns the earliest timer whose deadline is `<= now`.
    pub fn pop_due(&mut self, now: u64) -> Option<Expired<K>> {
        loop {
            let &Reverse((deadline, id)) = self.heap.peek()?;
            if deadline > now {
                return None;
            }
            self.heap.pop();
            if let Some(pending) = self.pending.remove(&id) {
                tracing::trace!(
                    target: "understory_timing",
                    id = id.get(),
                    deadline,
                    now,
                    "timer expired"
                );
                return Some(Expired {
                    id,
                    deadline,
                    key: pending.key,
                });
            }
        }
    }

    /// Returns an iterator that removes every timer due at `now`, in deadline order.
    pub fn drain_due(&mut self, now: u64) -> DrainDue<'_, K> {
        DrainDue { queue: self, now }
    }

    /// Returns the number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Cancels every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.heap.clear();
    }

    fn prune_front(&mut self) {
        while let Some(&Reverse((_, id))) = self.heap.peek() {
            if self.pending.contains_key(&id) {
                break;
            }
            self.heap.pop();
        }
    }
}

/// Iterator returned by [`TimerQueue::drain_due`].
#[derive(Debug)]
pub struct DrainDue<'a, K> {
    queue: &'a mut TimerQueue<K>,
    now: u64,
}

impl<K> Iterator for DrainDue<'_, K> {
    type Item = Expired<K>;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop_due(self.now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn empty_queue_has_no_deadline() {
        let mut q = TimerQueue::<u32>::new();
        assert!(q.is_empty());
        assert_eq!(q.next_deadline(), None);
        assert!(q.pop_due(u64::MAX).is_none());
    }

    #[test]
    fn expires_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(30, 'c');
        q.schedule(10, 'a');
        q.schedule(20, 'b');

        let keys: Vec<char> = q.drain_due(25).map(|e| e.key).collect();
        assert_eq!(keys, ['a', 'b']);
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_deadline(), Some(30));
    }

    #[test]
    fn equal_deadlines_expire_in_scheduling_order() {
        let mut q = TimerQueue::new();
        let first = q.schedule(5, 1);
        let second = q.schedule(5, 2);

        assert_eq!(q.pop_due(5).map(|e| e.id), Some(first));
        assert_eq!(q.pop_due(5).map(|e| e.id), Some(second));
    }

    #[test]
    fn deadline_is_inclusive() {
        let mut q = TimerQueue::new();
        q.schedule_after(100, 400, ());
        assert!(q.pop_due(499).is_none());
        assert!(q.pop_due(500).is_some());
    }

    #[test]
    fn canceled_timer_never_expires() {
        let mut q = TimerQueue::new();
        let id = q.schedule(10, "x");
        assert_eq!(q.cancel(id), Some("x"));
        assert!(!q.is_pending(id));
        assert!(q.pop_due(1_000).is_none());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut q = TimerQueue::new();
        let id = q.schedule(10, 7);
        assert_eq!(q.cancel(id), Some(7));
        assert_eq!(q.cancel(id), None);
    }

    #[test]
    fn cancel_after_expiry_is_a_no_op() {
        let mut q = TimerQueue::new();
        let id = q.schedule(10, 7);
        assert!(q.pop_due(10).is_some());
        assert_eq!(q.cancel(id), None);
    }

    #[test]
    fn next_deadline_skips_canceled_front() {
        let mut q = TimerQueue::new();
        let early = q.schedule(10, ());
        q.schedule(20, ());
        q.cancel(early);
        assert_eq!(q.next_deadline(), Some(20));
    }

    #[test]
    fn ids_are_not_reused() {
        let mut q = TimerQueue::new();
        let a = q.schedule(1, ());
        q.cancel(a);
        let b = q.schedule(1, ());
        assert_ne!(a, b);
        assert!(!q.is_pending(a));
        assert!(q.is_pending(b));
    }

    #[test]
    fn schedule_after_saturates() {
        let mut q = TimerQueue::new();
        let id = q.schedule_after(u64::MAX - 1, 10, ());
        assert_eq!(q.deadline(id), Some(u64::MAX));
    }

    #[test]
    fn key_lookup_and_clear() {
        let mut q = TimerQueue::new();
        let id = q.schedule(3, "k");
        assert_eq!(q.key(id), Some(&"k"));
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.key(id), None);
        assert_eq!(q.next_deadline(), None);
    }
}
