// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attach-time configuration.

use core::fmt;

use crate::classifier::DirectionClassifier;
use crate::direction::Direction;
use crate::topology::{DeadZone, Topology};

/// Default dead-zone radius in logical pixels.
pub const DEFAULT_SENSITIVITY: f64 = 80.0;

/// Default long-press timeout in milliseconds.
pub const DEFAULT_LONG_PRESS_TIMEOUT_MS: u64 = 400;

/// Default number of simultaneously tracked pointers.
pub const DEFAULT_MAX_POINTERS: usize = 5;

/// How a key treats a second pointer landing on it while a gesture is active.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum KeyClaim {
    /// Each pointer runs its own independent session.
    #[default]
    Shared,
    /// A new pointer interrupts every other session on the key without
    /// committing.
    Exclusive,
}

/// Recognizer configuration.
///
/// Build one with [`FlickConfig::default`] and the `with_*` setters, then
/// check it with [`FlickConfig::validate`] (or let
/// [`FlickRecognizer::new`](crate::FlickRecognizer::new) do so).
#[derive(Clone, Debug, PartialEq)]
pub struct FlickConfig {
    /// Dead-zone size in logical pixels.
    pub sensitivity: f64,
    /// Milliseconds without a qualifying move before reveal mode.
    pub long_press_timeout: u64,
    /// Direction angle table.
    pub topology: Topology,
    /// Dead-zone shape.
    pub dead_zone: DeadZone,
    /// Multi-pointer policy on one key.
    pub claim: KeyClaim,
    /// Pointers beyond this many concurrent sessions are ignored.
    pub max_pointers: usize,
}

impl Default for FlickConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            long_press_timeout: DEFAULT_LONG_PRESS_TIMEOUT_MS,
            topology: Topology::default(),
            dead_zone: DeadZone::default(),
            claim: KeyClaim::default(),
            max_pointers: DEFAULT_MAX_POINTERS,
        }
    }
}

impl FlickConfig {
    /// Sets the dead-zone size.
    #[must_use]
    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Sets the long-press timeout in milliseconds.
    #[must_use]
    pub fn with_long_press_timeout(mut self, timeout: u64) -> Self {
        self.long_press_timeout = timeout;
        self
    }

    /// Sets the topology.
    #[must_use]
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Sets the dead-zone shape.
    #[must_use]
    pub fn with_dead_zone(mut self, dead_zone: DeadZone) -> Self {
        self.dead_zone = dead_zone;
        self
    }

    /// Sets the key claim policy.
    #[must_use]
    pub fn with_claim(mut self, claim: KeyClaim) -> Self {
        self.claim = claim;
        self
    }

    /// Sets the pointer arity.
    #[must_use]
    pub fn with_max_pointers(mut self, max_pointers: usize) -> Self {
        self.max_pointers = max_pointers;
        self
    }

    /// Checks the configuration for values no recognizer can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return Err(ConfigError::InvalidSensitivity(self.sensitivity));
        }
        if self.max_pointers == 0 {
            return Err(ConfigError::ZeroMaxPointers);
        }
        if let Topology::Sectors(sectors) = &self.topology {
            for (index, sector) in sectors.iter().enumerate() {
                if sector.direction == Direction::Tap {
                    return Err(ConfigError::TapSector { index });
                }
                if !sector.start.is_finite()
                    || !sector.sweep.is_finite()
                    || sector.sweep <= 0.0
                    || sector.sweep > 360.0
                {
                    return Err(ConfigError::InvalidSector { index });
                }
            }
        }
        Ok(())
    }

    /// The classifier described by this configuration.
    #[must_use]
    pub fn classifier(&self) -> DirectionClassifier {
        DirectionClassifier::new(self.sensitivity, self.topology.clone())
            .with_dead_zone(self.dead_zone)
    }
}

/// Reasons a [`FlickConfig`] is rejected.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The sensitivity is negative, infinite or NaN.
    InvalidSensitivity(f64),
    /// `max_pointers` is zero, so no gesture could ever start.
    ZeroMaxPointers,
    /// A sector maps to [`Direction::Tap`].
    TapSector {
        /// Position of the sector in the table.
        index: usize,
    },
    /// A sector has a non-finite start or a sweep outside `(0, 360]`.
    InvalidSector {
        /// Position of the sector in the table.
        index: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSensitivity(value) => {
                write!(f, "sensitivity must be finite and non-negative, got {value}")
            }
            Self::ZeroMaxPointers => f.write_str("max_pointers must be at least 1"),
            Self::TapSector { index } => write!(f, "sector {index} maps to the tap direction"),
            Self::InvalidSector { index } => {
                write!(f, "sector {index} has a non-finite start or a sweep outside (0, 360]")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Sector;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn defaults_are_valid() {
        let config = FlickConfig::default();
        assert_eq!(config.sensitivity, DEFAULT_SENSITIVITY);
        assert_eq!(config.long_press_timeout, DEFAULT_LONG_PRESS_TIMEOUT_MS);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_sensitivity() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let config = FlickConfig::default().with_sensitivity(bad);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidSensitivity(_))
            ));
        }
        assert_eq!(FlickConfig::default().with_sensitivity(0.0).validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_pointers() {
        let config = FlickConfig::default().with_max_pointers(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxPointers));
    }

    #[test]
    fn rejects_malformed_sectors() {
        let tap = FlickConfig::default().with_topology(Topology::Sectors(vec![
            Sector::new(Direction::Up, 0.0, 90.0),
            Sector::new(Direction::Tap, 90.0, 90.0),
        ]));
        assert_eq!(tap.validate(), Err(ConfigError::TapSector { index: 1 }));

        let empty_arc = FlickConfig::default()
            .with_topology(Topology::Sectors(vec![Sector::new(Direction::Up, 0.0, 0.0)]));
        assert_eq!(empty_arc.validate(), Err(ConfigError::InvalidSector { index: 0 }));
    }

    #[test]
    fn error_messages_name_the_problem() {
        let msg = ConfigError::TapSector { index: 3 }.to_string();
        assert!(msg.contains("sector 3"), "{msg}");
    }
}
