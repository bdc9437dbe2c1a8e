// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer input types.

use kurbo::Point;

/// Identifies a pointer (finger, pen, mouse) across its press/move/release stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u64);

/// What happened to a pointer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    /// The pointer went down.
    Press,
    /// The pointer moved while down.
    Move,
    /// The pointer went up.
    Release,
    /// The platform took the pointer away (e.g. a system gesture).
    Cancel,
}

/// One pointer event in key-local coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// Which pointer.
    pub pointer: PointerId,
    /// Event kind.
    pub phase: PointerPhase,
    /// Position in logical pixels.
    pub position: Point,
    /// Host monotonic timestamp in milliseconds.
    pub time: u64,
}

impl PointerEvent {
    /// Creates an event.
    #[must_use]
    pub const fn new(pointer: PointerId, phase: PointerPhase, position: Point, time: u64) -> Self {
        Self {
            pointer,
            phase,
            position,
            time,
        }
    }

    /// Shorthand for a [`PointerPhase::Press`] event.
    #[must_use]
    pub const fn press(pointer: PointerId, position: Point, time: u64) -> Self {
        Self::new(pointer, PointerPhase::Press, position, time)
    }

    /// Shorthand for a [`PointerPhase::Move`] event.
    #[must_use]
    pub const fn moved(pointer: PointerId, position: Point, time: u64) -> Self {
        Self::new(pointer, PointerPhase::Move, position, time)
    }

    /// Shorthand for a [`PointerPhase::Release`] event.
    #[must_use]
    pub const fn release(pointer: PointerId, position: Point, time: u64) -> Self {
        Self::new(pointer, PointerPhase::Release, position, time)
    }

    /// Shorthand for a [`PointerPhase::Cancel`] event.
    #[must_use]
    pub const fn cancel(pointer: PointerId, time: u64) -> Self {
        Self::new(pointer, PointerPhase::Cancel, Point::ORIGIN, time)
    }
}
