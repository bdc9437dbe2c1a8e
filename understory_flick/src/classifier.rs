// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Displacement to direction classification.

use kurbo::{Point, Vec2};

use crate::direction::{Direction, DirectionSet};
use crate::topology::{DeadZone, Topology, angular_distance, normalize_degrees};

/// Largest angular distance, in degrees, between a flick and the center of the
/// direction it is classified as.
///
/// Flicks further than this from every enabled direction classify as
/// [`Direction::Tap`]. Does not apply to [`Topology::Sectors`].
pub const MAX_ANGLE_DIFFERENCE: f64 = 70.0;

/// Pure geometry: turns a displacement from a frame's center into a [`Direction`].
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionClassifier {
    /// Minimum displacement, in logical pixels, for a flick to leave the dead zone.
    pub threshold: f64,
    /// Angle table.
    pub topology: Topology,
    /// Dead-zone shape.
    pub dead_zone: DeadZone,
}

impl DirectionClassifier {
    /// Creates a classifier with a circular dead zone.
    #[must_use]
    pub fn new(threshold: f64, topology: Topology) -> Self {
        Self {
            threshold,
            topology,
            dead_zone: DeadZone::Circle,
        }
    }

    /// Replaces the dead-zone shape.
    #[must_use]
    pub fn with_dead_zone(mut self, dead_zone: DeadZone) -> Self {
        self.dead_zone = dead_zone;
        self
    }

    /// Returns `true` if `delta` is still within the tap region.
    #[must_use]
    pub fn is_in_dead_zone(&self, delta: Vec2) -> bool {
        match self.dead_zone {
            DeadZone::Circle => delta.hypot() < self.threshold,
            DeadZone::Square => delta.x.abs() < self.threshold && delta.y.abs() < self.threshold,
        }
    }

    /// Classifies `delta` against the `enabled` directions.
    ///
    /// Never returns a direction outside `enabled` (other than `Tap`). Ties go
    /// to the direction listed first in [`Direction::ALL`].
    #[must_use]
    pub fn classify(&self, delta: Vec2, enabled: DirectionSet) -> Direction {
        if self.is_in_dead_zone(delta) {
            return Direction::Tap;
        }
        let angle = flick_angle(delta);
        if let Topology::Sectors(sectors) = &self.topology {
            return sectors
                .iter()
                .find(|s| !s.direction.is_tap() && enabled.has(s.direction) && s.contains(angle))
                .map_or(Direction::Tap, |s| s.direction);
        }

        let mut best: Option<(Direction, f64)> = None;
        for direction in enabled.flicks().iter_directions() {
            let Some(center) = self.topology.center_angle(direction) else {
                continue;
            };
            let distance = angular_distance(angle, center);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((direction, distance));
            }
        }
        match best {
            Some((direction, distance)) if distance <= MAX_ANGLE_DIFFERENCE => direction,
            _ => Direction::Tap,
        }
    }

    /// Classifies the displacement from `center` to `point`.
    #[must_use]
    pub fn classify_points(&self, center: Point, point: Point, enabled: DirectionSet) -> Direction {
        self.classify(point - center, enabled)
    }
}

/// Angle of `delta` in degrees, normalized to `[0, 360)`.
#[must_use]
pub fn flick_angle(delta: Vec2) -> f64 {
    normalize_degrees(delta.atan2().to_degrees())
}
