// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing pointers across many keys.
//!
//! A [`FlickBoard`] holds one [`FlickRecognizer`] per key. The caller does hit
//! testing and names the key on press; afterwards the board routes the
//! pointer's moves and release to that key, even if the pointer leaves it.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::Point;

use crate::config::{ConfigError, DEFAULT_MAX_POINTERS};
use crate::long_press::LongPressToken;
use crate::observer::{FlickCommit, FlickObserver};
use crate::pointer::PointerId;
use crate::recognizer::FlickRecognizer;

/// What happens to gestures on other keys when a new pointer lands.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RolloverPolicy {
    /// Other gestures continue undisturbed.
    #[default]
    Independent,
    /// Every other active pointer is released in place, committing, before
    /// the new gesture starts.
    ReleaseEarlier,
}

/// A set of keys sharing one pointer stream.
#[derive(Debug)]
pub struct FlickBoard<K, O> {
    keys: HashMap<K, FlickRecognizer<O>>,
    routes: HashMap<PointerId, K>,
    policy: RolloverPolicy,
    max_pointers: usize,
}

impl<K: Hash + Eq + Clone, O: Clone> Default for FlickBoard<K, O> {
    fn default() -> Self {
        Self::new(RolloverPolicy::default())
    }
}

impl<K: Hash + Eq + Clone, O: Clone> FlickBoard<K, O> {
    /// Creates an empty board.
    #[must_use]
    pub fn new(policy: RolloverPolicy) -> Self {
        Self {
            keys: HashMap::new(),
            routes: HashMap::new(),
            policy,
            max_pointers: DEFAULT_MAX_POINTERS,
        }
    }

    /// Limits the number of pointers tracked across all keys.
    ///
    /// Fails with [`ConfigError::ZeroMaxPointers`] for a limit of zero, as
    /// [`FlickConfig::validate`](crate::FlickConfig::validate) does.
    pub fn with_max_pointers(mut self, max_pointers: usize) -> Result<Self, ConfigError> {
        if max_pointers == 0 {
            return Err(ConfigError::ZeroMaxPointers);
        }
        self.max_pointers = max_pointers;
        Ok(self)
    }

    /// The pointer limit across all keys.
    #[must_use]
    pub fn max_pointers(&self) -> usize {
        self.max_pointers
    }

    /// The rollover policy.
    #[must_use]
    pub fn policy(&self) -> RolloverPolicy {
        self.policy
    }

    /// Adds a key, returning the recognizer it replaced.
    ///
    /// Gestures in progress on a replaced recognizer are interrupted first.
    pub fn insert_key(
        &mut self,
        key: K,
        recognizer: FlickRecognizer<O>,
        observer: &mut impl FlickObserver<O>,
    ) -> Option<FlickRecognizer<O>> {
        let mut old = self.keys.insert(key.clone(), recognizer)?;
        old.cancel(observer);
        self.routes.retain(|_, k| *k != key);
        Some(old)
    }

    /// Removes a key, interrupting its gestures.
    pub fn remove_key(
        &mut self,
        key: &K,
        observer: &mut impl FlickObserver<O>,
    ) -> Option<FlickRecognizer<O>> {
        let mut recognizer = self.keys.remove(key)?;
        recognizer.cancel(observer);
        self.routes.retain(|_, k| *k != *key);
        Some(recognizer)
    }

    /// The recognizer for `key`.
    #[must_use]
    pub fn key(&self, key: &K) -> Option<&FlickRecognizer<O>> {
        self.keys.get(key)
    }

    /// Mutable access to the recognizer for `key`, e.g. to rebind its trees.
    pub fn key_mut(&mut self, key: &K) -> Option<&mut FlickRecognizer<O>> {
        self.keys.get_mut(key)
    }

    /// The key `pointer` is routed to.
    #[must_use]
    pub fn route(&self, pointer: PointerId) -> Option<&K> {
        self.routes.get(&pointer)
    }

    /// Number of pointers with a gesture in progress.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.routes.len()
    }

    /// Starts a gesture for `pointer` on `key`.
    ///
    /// Returns `None` if the press was ignored: unknown key, pointer already
    /// routed, pointer limit reached, or the key's recognizer declined.
    pub fn on_press(
        &mut self,
        pointer: PointerId,
        key: &K,
        point: Point,
        now: u64,
        observer: &mut impl FlickObserver<O>,
    ) -> Option<LongPressToken> {
        self.prune_routes();
        if !self.keys.contains_key(key) || self.routes.contains_key(&pointer) {
            return None;
        }
        if self.policy == RolloverPolicy::ReleaseEarlier {
            let mut earlier: Vec<PointerId> = self.routes.keys().copied().collect();
            earlier.sort();
            for other in earlier {
                tracing::trace!(
                    target: "understory_flick::board",
                    pointer = other.0,
                    by = pointer.0,
                    "rollover release"
                );
                self.release_in_place(other, observer);
            }
        }
        if self.routes.len() >= self.max_pointers {
            tracing::trace!(
                target: "understory_flick::board",
                pointer = pointer.0,
                "press ignored: pointer limit reached"
            );
            return None;
        }
        let token = self
            .keys
            .get_mut(key)?
            .on_press(pointer, point, now, observer)?;
        self.routes.insert(pointer, key.clone());
        // An exclusive key may have interrupted other pointers routed to it.
        self.prune_routes();
        Some(token)
    }

    /// Routes a move to the key `pointer` pressed on.
    pub fn on_move(
        &mut self,
        pointer: PointerId,
        point: Point,
        observer: &mut impl FlickObserver<O>,
    ) {
        if let Some(recognizer) = self.routed(pointer) {
            recognizer.on_move(pointer, point, observer);
        }
    }

    /// Routes a release, returning what it committed.
    pub fn on_release(
        &mut self,
        pointer: PointerId,
        point: Point,
        observer: &mut impl FlickObserver<O>,
    ) -> Option<FlickCommit<O>> {
        let key = self.routes.remove(&pointer)?;
        self.keys.get_mut(&key)?.on_release(pointer, point, observer)
    }

    /// Routes a platform cancel, which resolves like a release.
    pub fn on_cancel(
        &mut self,
        pointer: PointerId,
        observer: &mut impl FlickObserver<O>,
    ) -> Option<FlickCommit<O>> {
        let key = self.routes.remove(&pointer)?;
        self.keys.get_mut(&key)?.on_cancel(pointer, observer)
    }

    /// Fires every long-press timer due at `now` on every key.
    pub fn advance(&mut self, now: u64, observer: &mut impl FlickObserver<O>) -> usize {
        self.keys
            .values_mut()
            .map(|r| r.advance(now, observer))
            .sum()
    }

    /// Fires a long-press token issued for a press on `key`.
    pub fn fire_long_press(
        &mut self,
        key: &K,
        token: LongPressToken,
        observer: &mut impl FlickObserver<O>,
    ) -> bool {
        self.keys
            .get_mut(key)
            .is_some_and(|r| r.fire_long_press(token, observer))
    }

    /// Earliest long-press deadline across all keys.
    pub fn next_deadline(&mut self) -> Option<u64> {
        self.keys.values_mut().filter_map(FlickRecognizer::next_deadline).min()
    }

    /// Discards every gesture on every key. Safe to call repeatedly.
    pub fn cancel(&mut self, observer: &mut impl FlickObserver<O>) {
        for recognizer in self.keys.values_mut() {
            recognizer.cancel(observer);
        }
        self.routes.clear();
    }

    fn routed(&mut self, pointer: PointerId) -> Option<&mut FlickRecognizer<O>> {
        let key = self.routes.get(&pointer)?;
        self.keys.get_mut(key)
    }

    fn release_in_place(&mut self, pointer: PointerId, observer: &mut impl FlickObserver<O>) {
        let Some(key) = self.routes.remove(&pointer) else {
            return;
        };
        let Some(recognizer) = self.keys.get_mut(&key) else {
            return;
        };
        let Some(point) = recognizer.session(pointer).map(|s| s.last_point()) else {
            return;
        };
        recognizer.on_release(pointer, point, observer);
    }

    /// Drops routes whose gesture no longer exists.
    fn prune_routes(&mut self) {
        let keys = &self.keys;
        self.routes.retain(|pointer, key| {
            keys.get(&*key)
                .is_some_and(|r| r.session(*pointer).is_some())
        });
    }
}
