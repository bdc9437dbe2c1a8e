// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Long-press timers for gesture sessions.
//!
//! [`LongPressScheduler`] arms at most one timer per session on an
//! [`understory_timing::TimerQueue`]. Expiries are reported by
//! [`SessionId`] and carry the [`TimerId`] they were armed with, so the owner
//! can check that the session is still alive and still waiting on that exact
//! timer before acting.

use hashbrown::HashMap;
use understory_timing::{TimerId, TimerQueue};

/// Identifies one gesture session for its whole lifetime.
///
/// Ids are allocated monotonically and never reused by a recognizer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub(crate) u64);

impl SessionId {
    /// Returns the raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Handle to an armed long-press timer.
///
/// Returned when a press arms a timer. Hosts with their own timer facility
/// schedule a callback for [`LongPressToken::deadline`] and hand the token
/// back to [`FlickRecognizer::fire_long_press`](crate::FlickRecognizer::fire_long_press).
/// A token whose session has ended, or whose timer was canceled, is ignored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LongPressToken {
    /// Session the timer belongs to.
    pub session: SessionId,
    /// The underlying timer.
    pub timer: TimerId,
    /// Host timestamp, in milliseconds, at which the timer is due.
    pub deadline: u64,
}

/// Cancellable single-shot long-press timers, one per session.
#[derive(Clone, Debug)]
pub struct LongPressScheduler {
    timeout: u64,
    queue: TimerQueue<SessionId>,
    armed: HashMap<SessionId, TimerId>,
}

impl LongPressScheduler {
    /// Creates a scheduler whose timers fire `timeout` milliseconds after arming.
    #[must_use]
    pub fn new(timeout: u64) -> Self {
        Self {
            timeout,
            queue: TimerQueue::new(),
            armed: HashMap::new(),
        }
    }

    /// The configured timeout in milliseconds.
    #[must_use]
    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    /// Arms the timer for `session` at `now + timeout`.
    ///
    /// Any timer already armed for `session` is canceled first.
    pub fn arm(&mut self, session: SessionId, now: u64) -> LongPressToken {
        self.cancel(session);
        let timer = self.queue.schedule_after(now, self.timeout, session);
        self.armed.insert(session, timer);
        LongPressToken {
            session,
            timer,
            deadline: now.saturating_add(self.timeout),
        }
    }

    /// Cancels the timer for `session`. Returns `true` if one was armed.
    ///
    /// Safe to call any number of times.
    pub fn cancel(&mut self, session: SessionId) -> bool {
        match self.armed.remove(&session) {
            Some(timer) => {
                self.queue.cancel(timer);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `session` has an armed timer.
    #[must_use]
    pub fn is_armed(&self, session: SessionId) -> bool {
        self.armed.contains_key(&session)
    }

    /// Consumes `token` if it is still the armed timer of its session.
    ///
    /// Returns `false` for tokens that were canceled, already fired, or
    /// superseded by a newer timer.
    pub fn take(&mut self, token: LongPressToken) -> bool {
        if self.armed.get(&token.session) != Some(&token.timer) {
            return false;
        }
        self.armed.remove(&token.session);
        self.queue.cancel(token.timer);
        true
    }

    /// Removes and returns the next session whose timer is due at `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<SessionId> {
        let expired = self.queue.pop_due(now)?;
        self.armed.remove(&expired.key);
        Some(expired.key)
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&mut self) -> Option<u64> {
        self.queue.next_deadline()
    }

    /// Cancels every timer.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.armed.clear();
    }
}
