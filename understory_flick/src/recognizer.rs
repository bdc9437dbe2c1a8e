// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-key gesture recognition.

use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Point;

use crate::classifier::DirectionClassifier;
use crate::config::{ConfigError, FlickConfig, KeyClaim};
use crate::long_press::{LongPressScheduler, LongPressToken, SessionId};
use crate::observer::{FlickCommit, FlickObserver};
use crate::pointer::{PointerEvent, PointerId, PointerPhase};
use crate::session::GestureSession;
use crate::tree::{FlickKey, KeyMode};

/// Recognizes flick gestures on one key.
///
/// The recognizer owns one [`GestureSession`] per active pointer and the
/// long-press timers for them. It never reads a clock: every entry point that
/// needs time takes a host timestamp in milliseconds.
#[derive(Debug)]
pub struct FlickRecognizer<O> {
    config: FlickConfig,
    classifier: DirectionClassifier,
    key: Option<Arc<FlickKey<O>>>,
    sessions: HashMap<PointerId, GestureSession<O>>,
    timers: LongPressScheduler,
    next_session: u64,
}

impl<O: Clone> Default for FlickRecognizer<O> {
    fn default() -> Self {
        Self::with_valid_config(FlickConfig::default())
    }
}

impl<O: Clone> FlickRecognizer<O> {
    /// Creates an unattached recognizer after validating `config`.
    pub fn new(config: FlickConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: FlickConfig) -> Self {
        Self {
            classifier: config.classifier(),
            timers: LongPressScheduler::new(config.long_press_timeout),
            config,
            key: None,
            sessions: HashMap::new(),
            next_session: 0,
        }
    }

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> &FlickConfig {
        &self.config
    }

    /// The classifier built from the configuration.
    #[must_use]
    pub fn classifier(&self) -> &DirectionClassifier {
        &self.classifier
    }

    /// Binds a key's gesture trees for subsequent gestures.
    ///
    /// Gestures already in progress keep the binding they started with.
    /// Returns `false` and leaves the recognizer unbound if the key's normal
    /// map is empty.
    pub fn attach(&mut self, key: impl Into<Arc<FlickKey<O>>>) -> bool {
        let key = key.into();
        if key.is_empty() {
            tracing::debug!(
                target: "understory_flick::recognizer",
                "attach ignored: empty root map"
            );
            self.key = None;
            return false;
        }
        tracing::debug!(
            target: "understory_flick::recognizer",
            directions = ?key.root(KeyMode::NORMAL).directions(),
            "attached"
        );
        self.key = Some(key);
        true
    }

    /// Unbinds the key, discarding every gesture in progress without committing.
    pub fn detach(&mut self, observer: &mut impl FlickObserver<O>) {
        self.key = None;
        self.cancel(observer);
    }

    /// Returns `true` while a key is bound.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.key.is_some()
    }

    /// The bound key.
    #[must_use]
    pub fn key(&self) -> Option<&FlickKey<O>> {
        self.key.as_deref()
    }

    /// Starts a gesture for `pointer` at `point`.
    ///
    /// Returns the long-press token for hosts that schedule their own
    /// callbacks, or `None` if the press was ignored: no key bound, the pointer
    /// already has a session, or the pointer limit is reached.
    pub fn on_press(
        &mut self,
        pointer: PointerId,
        point: Point,
        now: u64,
        observer: &mut impl FlickObserver<O>,
    ) -> Option<LongPressToken> {
        let key = Arc::clone(self.key.as_ref()?);
        if self.sessions.contains_key(&pointer) {
            tracing::trace!(
                target: "understory_flick::recognizer",
                pointer = pointer.0,
                "press ignored: pointer already active"
            );
            return None;
        }
        if self.config.claim == KeyClaim::Exclusive {
            for session in self.take_sessions() {
                session.interrupt(&mut self.timers, observer);
            }
        }
        if self.sessions.len() >= self.config.max_pointers {
            tracing::trace!(
                target: "understory_flick::recognizer",
                pointer = pointer.0,
                "press ignored: pointer limit reached"
            );
            return None;
        }
        let id = SessionId(self.next_session);
        self.next_session += 1;
        let (session, token) =
            GestureSession::begin(id, pointer, key, point, now, &mut self.timers, observer);
        self.sessions.insert(pointer, session);
        Some(token)
    }

    /// Feeds a move for `pointer`. Unknown pointers are ignored.
    pub fn on_move(
        &mut self,
        pointer: PointerId,
        point: Point,
        observer: &mut impl FlickObserver<O>,
    ) {
        if let Some(session) = self.sessions.get_mut(&pointer) {
            session.on_move(point, &self.classifier, &mut self.timers, observer);
        }
    }

    /// Ends the gesture for `pointer` at `point`, returning what it committed.
    ///
    /// Releasing an unknown or already released pointer does nothing.
    pub fn on_release(
        &mut self,
        pointer: PointerId,
        point: Point,
        observer: &mut impl FlickObserver<O>,
    ) -> Option<FlickCommit<O>> {
        let session = self.sessions.remove(&pointer)?;
        session.finish(Some(point), &self.classifier, &mut self.timers, observer)
    }

    /// Ends the gesture for `pointer` on a platform cancel.
    ///
    /// Resolves like a release at the last known position.
    pub fn on_cancel(
        &mut self,
        pointer: PointerId,
        observer: &mut impl FlickObserver<O>,
    ) -> Option<FlickCommit<O>> {
        let session = self.sessions.remove(&pointer)?;
        session.finish(None, &self.classifier, &mut self.timers, observer)
    }

    /// Dispatches one pointer event.
    ///
    /// Returns the commit produced by a release or cancel. Hosts that need the
    /// long-press token call [`FlickRecognizer::on_press`] directly.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        observer: &mut impl FlickObserver<O>,
    ) -> Option<FlickCommit<O>> {
        match event.phase {
            PointerPhase::Press => {
                self.on_press(event.pointer, event.position, event.time, observer);
                None
            }
            PointerPhase::Move => {
                self.on_move(event.pointer, event.position, observer);
                None
            }
            PointerPhase::Release => self.on_release(event.pointer, event.position, observer),
            PointerPhase::Cancel => self.on_cancel(event.pointer, observer),
        }
    }

    /// Fires every long-press timer due at `now`. Returns how many fired.
    pub fn advance(&mut self, now: u64, observer: &mut impl FlickObserver<O>) -> usize {
        let mut fired = 0;
        while let Some(id) = self.timers.pop_due(now) {
            if let Some(session) = self.session_by_id(id) {
                if session.on_long_press(observer) {
                    fired += 1;
                }
            } else {
                tracing::trace!(
                    target: "understory_flick::recognizer",
                    session = id.get(),
                    "stale long-press ignored"
                );
            }
        }
        fired
    }

    /// Fires the timer behind `token`, if it is still armed.
    ///
    /// Returns `false` for stale tokens: the session ended, moved out of the
    /// dead zone, or the token was already fired.
    pub fn fire_long_press(
        &mut self,
        token: LongPressToken,
        observer: &mut impl FlickObserver<O>,
    ) -> bool {
        if !self.timers.take(token) {
            tracing::trace!(
                target: "understory_flick::recognizer",
                session = token.session.get(),
                "stale long-press token ignored"
            );
            return false;
        }
        self.session_by_id(token.session)
            .is_some_and(|session| session.on_long_press(observer))
    }

    /// Earliest pending long-press deadline.
    pub fn next_deadline(&mut self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Discards the gesture for `pointer` without committing.
    ///
    /// Returns `false` if the pointer had no session.
    pub fn interrupt(
        &mut self,
        pointer: PointerId,
        observer: &mut impl FlickObserver<O>,
    ) -> bool {
        match self.sessions.remove(&pointer) {
            Some(session) => {
                session.interrupt(&mut self.timers, observer);
                true
            }
            None => false,
        }
    }

    /// Discards every gesture in progress and stops their timers.
    ///
    /// Safe to call repeatedly.
    pub fn cancel(&mut self, observer: &mut impl FlickObserver<O>) {
        for session in self.take_sessions() {
            session.interrupt(&mut self.timers, observer);
        }
        self.timers.clear();
    }

    /// The session driven by `pointer`.
    #[must_use]
    pub fn session(&self, pointer: PointerId) -> Option<&GestureSession<O>> {
        self.sessions.get(&pointer)
    }

    /// Every session in progress, oldest first.
    #[must_use]
    pub fn sessions(&self) -> Vec<&GestureSession<O>> {
        let mut sessions: Vec<_> = self.sessions.values().collect();
        sessions.sort_by_key(|s| s.id());
        sessions
    }

    /// Number of gestures in progress.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no gesture is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.sessions.is_empty()
    }

    fn session_by_id(&mut self, id: SessionId) -> Option<&mut GestureSession<O>> {
        self.sessions.values_mut().find(|s| s.id() == id)
    }

    /// Removes every session, oldest first.
    fn take_sessions(&mut self) -> Vec<GestureSession<O>> {
        let mut sessions: Vec<_> = self.sessions.drain().map(|(_, s)| s).collect();
        sessions.sort_by_key(GestureSession::id);
        sessions
    }
}
