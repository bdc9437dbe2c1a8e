// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notifications emitted while gestures run.
//!
//! Every recognizer entry point takes a `&mut impl FlickObserver<O>`. The
//! observer is passive: nothing it does is fed back into recognition.
//!
//! Two ready-made observers are provided:
//!
//! - `()` ignores everything, for callers that only look at return values.
//! - `Vec<FlickEvent<O>>` records an owned copy of every notification, which
//!   is handy for tests and for hosts that process notifications after the
//!   event has been dispatched.

use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::direction::{Direction, DirectionSet};
use crate::pointer::PointerId;
use crate::resolve::{Label, Level, OwnedLabel};
use crate::tree::KeyMode;

/// Directions taken by a gesture, root first.
pub type DirectionPath = SmallVec<[Direction; 4]>;

/// A committed gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlickCommit<O> {
    /// Pointer that performed the gesture.
    pub pointer: PointerId,
    /// The committed value.
    pub output: O,
    /// Sticky direction at release. `Tap` for a plain tap.
    pub direction: Direction,
    /// Every direction chosen on the way to the output, root first.
    pub path: DirectionPath,
    /// The gesture was in reveal mode when it ended.
    pub after_reveal: bool,
    /// At least one direction was chosen.
    pub is_flick: bool,
}

/// How a gesture ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GestureEnd {
    /// A value was committed.
    Committed,
    /// The gesture ended on a direction with nothing to commit.
    NoCandidate,
    /// The gesture was discarded by a cancel, a detach, or an exclusive claim.
    Interrupted,
}

/// Receives gesture notifications.
///
/// Only [`FlickObserver::on_flick`] is required. The other methods are
/// advisory and default to doing nothing.
pub trait FlickObserver<O> {
    /// A gesture committed a value. Called at most once per gesture.
    fn on_flick(&mut self, commit: FlickCommit<O>);

    /// A pointer pressed and a gesture started at `root`.
    fn on_gesture_started(&mut self, pointer: PointerId, root: Level<'_, O>) {
        let _ = (pointer, root);
    }

    /// The sticky highlight changed.
    fn on_direction_changed(&mut self, pointer: PointerId, direction: Direction) {
        let _ = (pointer, direction);
    }

    /// The gesture moved to a different hierarchy level, deeper or shallower.
    fn on_level_entered(&mut self, pointer: PointerId, level: Level<'_, O>) {
        let _ = (pointer, level);
    }

    /// The long-press timer fired; presentation should show every candidate of `level`.
    fn on_reveal_mode_entered(&mut self, pointer: PointerId, level: Level<'_, O>) {
        let _ = (pointer, level);
    }

    /// The key switched to another mode. `label` is what the key should show now.
    fn on_mode_changed(&mut self, pointer: PointerId, mode: KeyMode, label: Label<'_, O>) {
        let _ = (pointer, mode, label);
    }

    /// The gesture is over. Called exactly once per gesture, after any commit.
    fn on_gesture_ended(&mut self, pointer: PointerId, end: GestureEnd) {
        let _ = (pointer, end);
    }
}

impl<O> FlickObserver<O> for () {
    fn on_flick(&mut self, _: FlickCommit<O>) {}
}

/// An owned record of one [`FlickObserver`] notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlickEvent<O> {
    /// See [`FlickObserver::on_gesture_started`].
    GestureStarted {
        /// Pointer.
        pointer: PointerId,
        /// Directions available at the root.
        directions: DirectionSet,
    },
    /// See [`FlickObserver::on_direction_changed`].
    DirectionChanged {
        /// Pointer.
        pointer: PointerId,
        /// New sticky direction.
        direction: Direction,
    },
    /// See [`FlickObserver::on_level_entered`].
    LevelEntered {
        /// Pointer.
        pointer: PointerId,
        /// Depth of the level, `1` for the root.
        depth: usize,
        /// Directions available at the level.
        directions: DirectionSet,
    },
    /// See [`FlickObserver::on_reveal_mode_entered`].
    RevealModeEntered {
        /// Pointer.
        pointer: PointerId,
        /// Depth of the revealed level.
        depth: usize,
        /// Candidates with their labels.
        candidates: Vec<(Direction, OwnedLabel<O>)>,
    },
    /// See [`FlickObserver::on_mode_changed`].
    ModeChanged {
        /// Pointer.
        pointer: PointerId,
        /// The new mode.
        mode: KeyMode,
        /// The key's label in that mode.
        label: OwnedLabel<O>,
    },
    /// See [`FlickObserver::on_flick`].
    Flick(FlickCommit<O>),
    /// See [`FlickObserver::on_gesture_ended`].
    GestureEnded {
        /// Pointer.
        pointer: PointerId,
        /// Outcome.
        end: GestureEnd,
    },
}

impl<O> FlickEvent<O> {
    /// The commit, if this is a [`FlickEvent::Flick`].
    #[must_use]
    pub fn as_commit(&self) -> Option<&FlickCommit<O>> {
        match self {
            Self::Flick(commit) => Some(commit),
            _ => None,
        }
    }
}

impl<O: Clone> FlickObserver<O> for Vec<FlickEvent<O>> {
    fn on_flick(&mut self, commit: FlickCommit<O>) {
        self.push(FlickEvent::Flick(commit));
    }

    fn on_gesture_started(&mut self, pointer: PointerId, root: Level<'_, O>) {
        self.push(FlickEvent::GestureStarted {
            pointer,
            directions: root.directions(),
        });
    }

    fn on_direction_changed(&mut self, pointer: PointerId, direction: Direction) {
        self.push(FlickEvent::DirectionChanged { pointer, direction });
    }

    fn on_level_entered(&mut self, pointer: PointerId, level: Level<'_, O>) {
        self.push(FlickEvent::LevelEntered {
            pointer,
            depth: level.depth,
            directions: level.directions(),
        });
    }

    fn on_reveal_mode_entered(&mut self, pointer: PointerId, level: Level<'_, O>) {
        self.push(FlickEvent::RevealModeEntered {
            pointer,
            depth: level.depth,
            candidates: level.owned_candidates(),
        });
    }

    fn on_mode_changed(&mut self, pointer: PointerId, mode: KeyMode, label: Label<'_, O>) {
        self.push(FlickEvent::ModeChanged {
            pointer,
            mode,
            label: label.to_owned_label(),
        });
    }

    fn on_gesture_ended(&mut self, pointer: PointerId, end: GestureEnd) {
        self.push(FlickEvent::GestureEnded { pointer, end });
    }
}
