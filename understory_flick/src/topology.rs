// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Direction topologies and dead-zone shapes.
//!
//! A [`Topology`] decides which compass angle each [`Direction`] stands for.
//! Angles are in degrees, measured in screen coordinates: `0` points right and
//! `90` points down.

use alloc::vec::Vec;

use crate::direction::{Direction, DirectionSet};

/// A caller-supplied angular arc mapped to a direction.
///
/// The arc starts at `start` degrees and extends clockwise (in screen
/// coordinates) by `sweep` degrees. Arcs may wrap past 360.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sector {
    /// Direction produced when the flick angle falls in this arc.
    pub direction: Direction,
    /// Start angle in degrees.
    pub start: f64,
    /// Arc length in degrees, in `(0, 360]`.
    pub sweep: f64,
}

impl Sector {
    /// Creates a sector.
    #[must_use]
    pub const fn new(direction: Direction, start: f64, sweep: f64) -> Self {
        Self {
            direction,
            start,
            sweep,
        }
    }

    /// Returns `true` if `angle` (already normalized to `[0, 360)`) lies in the arc.
    ///
    /// The start is inclusive and the end exclusive.
    #[must_use]
    pub fn contains(&self, angle: f64) -> bool {
        normalize_degrees(angle - self.start) < self.sweep
    }

    /// Angle halfway through the arc, normalized to `[0, 360)`.
    #[must_use]
    pub fn center(&self) -> f64 {
        normalize_degrees(self.start + self.sweep / 2.0)
    }
}

/// How angles map onto directions.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Topology {
    /// Right, down, left, up.
    FourWay,
    /// The eight compass points at 45 degree steps.
    #[default]
    EightWay,
    /// Eight directions with the diagonals pulled 10 degrees toward the
    /// horizontal axis, leaving wider vertical sectors.
    Cross,
    /// Six petals: the two horizontal throws are the "far" variants of the
    /// upper diagonals.
    Petal,
    /// Arbitrary arcs. The first enabled arc containing the angle wins and
    /// there is no angular cutoff.
    Sectors(Vec<Sector>),
}

impl Topology {
    /// Canonical center angle of `direction`, or `None` if the topology never
    /// produces it.
    ///
    /// For [`Topology::Sectors`] this is the center of the first arc for
    /// `direction`.
    #[must_use]
    pub fn center_angle(&self, direction: Direction) -> Option<f64> {
        let angle = match (self, direction) {
            (_, Direction::Tap) => return None,
            (Self::Sectors(sectors), d) => {
                return sectors.iter().find(|s| s.direction == d).map(Sector::center);
            }
            (Self::FourWay | Self::EightWay | Self::Cross, Direction::Right) => 0.0,
            (Self::FourWay | Self::EightWay | Self::Cross, Direction::Left) => 180.0,
            (_, Direction::Down) => 90.0,
            (_, Direction::Up) => 270.0,
            (Self::EightWay, Direction::DownRight) => 45.0,
            (Self::EightWay, Direction::DownLeft) => 135.0,
            (Self::EightWay | Self::Petal, Direction::UpLeft) => 225.0,
            (Self::EightWay | Self::Petal, Direction::UpRight) => 315.0,
            (Self::Cross, Direction::DownRight) => 35.0,
            (Self::Cross, Direction::DownLeft) => 125.0,
            (Self::Cross, Direction::UpLeft) => 235.0,
            (Self::Cross, Direction::UpRight) => 325.0,
            (Self::Petal, Direction::UpRightFar) => 0.0,
            (Self::Petal, Direction::UpLeftFar) => 180.0,
            _ => return None,
        };
        Some(angle)
    }

    /// The directions this topology can produce, excluding [`Direction::Tap`].
    #[must_use]
    pub fn directions(&self) -> DirectionSet {
        Direction::ALL
            .into_iter()
            .filter(|d| self.center_angle(*d).is_some())
            .collect()
    }
}

/// Shape of the region around a frame's center that still counts as a tap.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeadZone {
    /// Euclidean distance below the threshold.
    #[default]
    Circle,
    /// Both axis offsets below the threshold.
    Square,
}

/// Normalizes an angle in degrees to `[0, 360)`.
#[must_use]
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle % 360.0;
    let a = if a < 0.0 { a + 360.0 } else { a };
    // `-1e-20 % 360 + 360` rounds to exactly 360.
    if a >= 360.0 { 0.0 } else { a }
}

/// Shortest circular distance between two angles in degrees, in `[0, 180]`.
#[must_use]
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    if d > 180.0 { 360.0 - d } else { d }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_way_covers_orthogonals_only() {
        let dirs = Topology::FourWay.directions();
        assert_eq!(
            dirs,
            DirectionSet::RIGHT | DirectionSet::DOWN | DirectionSet::LEFT | DirectionSet::UP
        );
    }

    #[test]
    fn cross_diagonals_lean_horizontal() {
        let t = Topology::Cross;
        assert_eq!(t.center_angle(Direction::DownRight), Some(35.0));
        assert_eq!(t.center_angle(Direction::UpLeft), Some(235.0));
        assert_eq!(t.center_angle(Direction::UpRightFar), None);
    }

    #[test]
    fn petal_uses_far_variants_for_horizontals() {
        let t = Topology::Petal;
        assert_eq!(t.center_angle(Direction::UpRightFar), Some(0.0));
        assert_eq!(t.center_angle(Direction::UpLeftFar), Some(180.0));
        assert_eq!(t.center_angle(Direction::Right), None);
        assert_eq!(t.directions().iter_directions().count(), 6);
    }

    #[test]
    fn tap_has_no_angle() {
        assert_eq!(Topology::EightWay.center_angle(Direction::Tap), None);
    }

    #[test]
    fn sector_wraps_past_full_turn() {
        let s = Sector::new(Direction::Right, 330.0, 60.0);
        assert!(s.contains(340.0));
        assert!(s.contains(0.0));
        assert!(s.contains(29.0));
        assert!(!s.contains(30.0));
        assert!(!s.contains(180.0));
        assert_eq!(s.center(), 0.0);
    }

    #[test]
    fn angle_helpers() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(angular_distance(350.0, 10.0), 20.0);
        assert_eq!(angular_distance(0.0, 180.0), 180.0);
    }
}
