// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flick directions and sets of directions.
//!
//! [`Direction`] is a closed enumeration covering every topology the crate
//! supports. Which subset a key actually uses depends on its
//! [`Topology`](crate::Topology) and on which directions its gesture map
//! defines.
//!
//! The declaration order of [`Direction`] is the crate's stable enumeration
//! order. Whenever two candidate directions tie, the one that comes first in
//! [`Direction::ALL`] wins.

use core::fmt;

/// A flick direction, or [`Direction::Tap`] for "no direction".
///
/// Compass names follow screen coordinates: `Down` points toward growing `y`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// No direction: the pointer stayed within the dead zone.
    Tap,
    /// East.
    Right,
    /// South-east.
    DownRight,
    /// South.
    Down,
    /// South-west.
    DownLeft,
    /// West.
    Left,
    /// North-west.
    UpLeft,
    /// North.
    Up,
    /// North-east.
    UpRight,
    /// Extended throw to the right of `UpRight` (petal layouts).
    UpRightFar,
    /// Extended throw to the left of `UpLeft` (petal layouts).
    UpLeftFar,
}

impl Direction {
    /// Every direction, in the stable enumeration order.
    pub const ALL: [Self; 11] = [
        Self::Tap,
        Self::Right,
        Self::DownRight,
        Self::Down,
        Self::DownLeft,
        Self::Left,
        Self::UpLeft,
        Self::Up,
        Self::UpRight,
        Self::UpRightFar,
        Self::UpLeftFar,
    ];

    /// Returns `true` for [`Direction::Tap`].
    #[must_use]
    pub const fn is_tap(self) -> bool {
        matches!(self, Self::Tap)
    }

    /// Position of this direction in [`Direction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The singleton [`DirectionSet`] containing this direction.
    #[must_use]
    pub const fn as_set(self) -> DirectionSet {
        DirectionSet::from_bits_retain(1 << self as u16)
    }

    /// A short, stable name, e.g. `"down-right"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tap => "tap",
            Self::Right => "right",
            Self::DownRight => "down-right",
            Self::Down => "down",
            Self::DownLeft => "down-left",
            Self::Left => "left",
            Self::UpLeft => "up-left",
            Self::Up => "up",
            Self::UpRight => "up-right",
            Self::UpRightFar => "up-right-far",
            Self::UpLeftFar => "up-left-far",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// A set of [`Direction`]s, typically the directions enabled at one level
    /// of a gesture map.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DirectionSet: u16 {
        /// [`Direction::Tap`].
        const TAP = 1 << 0;
        /// [`Direction::Right`].
        const RIGHT = 1 << 1;
        /// [`Direction::DownRight`].
        const DOWN_RIGHT = 1 << 2;
        /// [`Direction::Down`].
        const DOWN = 1 << 3;
        /// [`Direction::DownLeft`].
        const DOWN_LEFT = 1 << 4;
        /// [`Direction::Left`].
        const LEFT = 1 << 5;
        /// [`Direction::UpLeft`].
        const UP_LEFT = 1 << 6;
        /// [`Direction::Up`].
        const UP = 1 << 7;
        /// [`Direction::UpRight`].
        const UP_RIGHT = 1 << 8;
        /// [`Direction::UpRightFar`].
        const UP_RIGHT_FAR = 1 << 9;
        /// [`Direction::UpLeftFar`].
        const UP_LEFT_FAR = 1 << 10;
    }
}

impl DirectionSet {
    /// Returns `true` if `direction` is in the set.
    #[must_use]
    pub const fn has(self, direction: Direction) -> bool {
        self.contains(direction.as_set())
    }

    /// Iterates the members of the set in the stable enumeration order.
    pub fn iter_directions(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.has(*d))
    }

    /// The same set without [`Direction::Tap`].
    #[must_use]
    pub const fn flicks(self) -> Self {
        self.difference(Self::TAP)
    }
}

impl From<Direction> for DirectionSet {
    fn from(direction: Direction) -> Self {
        direction.as_set()
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, d| set.union(d.as_set()))
    }
}
