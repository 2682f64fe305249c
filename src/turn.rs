// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::bearing::{bearing, bearing_delta};
use crate::{Coordinate, Measured};

/// Bearing changes smaller than this (in degrees, either way) are not turns.
const STRAIGHT_THRESHOLD: f64 = 20.0;

/// Bearing changes below this (in degrees, either way) are slight turns.
const SLIGHT_THRESHOLD: f64 = 45.0;

/// Bearing changes at or beyond this (in degrees, either way) are sharp turns.
const SHARP_THRESHOLD: f64 = 120.0;

/// Category of a maneuver at an intersection.
///
/// The [Display](std::fmt::Display) implementation renders the phrase
/// used in [directions](crate::DirectionStep).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    Straight,
    SlightLeft,
    Left,
    SharpLeft,
    SlightRight,
    Right,
    SharpRight,

    /// Neutral instruction used when the turn can't be determined.
    Continue,
}

impl Turn {
    /// Classifies a signed bearing change (in degrees, negative meaning left),
    /// as returned by `bearing_delta`.
    pub fn from_delta(delta: f64) -> Self {
        if delta.abs() < STRAIGHT_THRESHOLD {
            Self::Straight
        } else if delta < 0.0 {
            if delta > -SLIGHT_THRESHOLD {
                Self::SlightLeft
            } else if delta > -SHARP_THRESHOLD {
                Self::Left
            } else {
                Self::SharpLeft
            }
        } else if delta < SLIGHT_THRESHOLD {
            Self::SlightRight
        } else if delta < SHARP_THRESHOLD {
            Self::Right
        } else {
            Self::SharpRight
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Straight => "Continue straight",
            Self::SlightLeft => "Turn slight left",
            Self::Left => "Turn left",
            Self::SharpLeft => "Make a sharp left",
            Self::SlightRight => "Turn slight right",
            Self::Right => "Turn right",
            Self::SharpRight => "Make a sharp right",
            Self::Continue => "Continue",
        }
    }
}

impl std::fmt::Display for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Determines the turn made at `current` when arriving from `prev` and leaving towards `next`.
///
/// If any of the bearings can't be computed, returns a [Measured::Fallback]
/// of [Turn::Continue].
pub fn turn_direction(prev: Coordinate, current: Coordinate, next: Coordinate) -> Measured<Turn> {
    match (bearing(prev, current), bearing(current, next)) {
        (Measured::Exact(incoming), Measured::Exact(outgoing)) => {
            Measured::Exact(Turn::from_delta(bearing_delta(incoming, outgoing)))
        }
        _ => Measured::Fallback(Turn::Continue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        let cases: &[(f64, Turn)] = &[
            (0.0, Turn::Straight),
            (19.9, Turn::Straight),
            (-19.9, Turn::Straight),
            (20.0, Turn::SlightRight),
            (44.9, Turn::SlightRight),
            (45.0, Turn::Right),
            (119.9, Turn::Right),
            (120.0, Turn::SharpRight),
            (179.9, Turn::SharpRight),
            (-20.0, Turn::SlightLeft),
            (-44.9, Turn::SlightLeft),
            (-45.0, Turn::Left),
            (-119.9, Turn::Left),
            (-120.0, Turn::SharpLeft),
            (-180.0, Turn::SharpLeft),
        ];

        for &(delta, expected) in cases {
            assert_eq!(Turn::from_delta(delta), expected, "delta = {}", delta);
        }
    }

    #[test]
    fn labels() {
        assert_eq!(Turn::Straight.to_string(), "Continue straight");
        assert_eq!(Turn::SlightLeft.to_string(), "Turn slight left");
        assert_eq!(Turn::SharpRight.to_string(), "Make a sharp right");
        assert_eq!(Turn::Continue.to_string(), "Continue");
    }

    #[test]
    fn east_then_north_is_left() {
        let prev = Coordinate::new(0.0, 0.0);
        let current = Coordinate::new(0.0, 1.0);
        let next = Coordinate::new(1.0, 1.0);
        assert_eq!(turn_direction(prev, current, next), Measured::Exact(Turn::Left));
    }

    #[test]
    fn reversal_mirrors_turn() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 1.0);
        let c = Coordinate::new(1.0, 1.0);
        assert_eq!(turn_direction(a, b, c).value(), Turn::Left);
        assert_eq!(turn_direction(c, b, a).value(), Turn::Right);

        // Slight turn towards north-east, around Golden, CO
        let a = Coordinate::new(39.7450, -105.2250);
        let b = Coordinate::new(39.7450, -105.2200);
        let c = Coordinate::new(39.7460, -105.2170);
        assert_eq!(turn_direction(a, b, c).value(), Turn::SlightLeft);
        assert_eq!(turn_direction(c, b, a).value(), Turn::SlightRight);
    }

    #[test]
    fn straight_line() {
        let a = Coordinate::new(39.7400, -105.2200);
        let b = Coordinate::new(39.7410, -105.2200);
        let c = Coordinate::new(39.7420, -105.2200);
        assert_eq!(turn_direction(a, b, c), Measured::Exact(Turn::Straight));
    }

    #[test]
    fn fallback_on_malformed_coordinates() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(f64::NAN, 1.0);
        let c = Coordinate::new(1.0, 1.0);
        assert_eq!(turn_direction(a, b, c), Measured::Fallback(Turn::Continue));
    }
}
