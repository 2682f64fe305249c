// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Coordinate, Measured};

/// Calculates the initial compass bearing from `from` to `to`, using the
/// [forward azimuth formula](https://www.movable-type.co.uk/scripts/latlong.html#bearing)
/// on a spherical Earth.
///
/// The result is in degrees clockwise from true north, in the `[0, 360)` range.
/// Coincident points have a bearing of 0. Non-finite coordinates result
/// in a [Measured::Fallback] of 0.
pub fn bearing(from: Coordinate, to: Coordinate) -> Measured<f64> {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlon = (to.lon - from.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    let initial = y.atan2(x).to_degrees();
    let compass = (initial + 360.0) % 360.0;

    if compass.is_finite() {
        Measured::Exact(compass)
    } else {
        log::warn!("can't compute bearing from {:?} to {:?}", from, to);
        Measured::Fallback(0.0)
    }
}

/// Returns the signed, minimal angle (in degrees) by which one needs to rotate
/// clockwise from bearing `from` to face bearing `to`. The result is in the `[-180, 180)` range;
/// negative values indicate counter-clockwise (leftward) rotation.
pub(crate) fn bearing_delta(from: f64, to: f64) -> f64 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}
