// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! Coordinate and orientation conversions.
//!
//! DIS positions entities in an earth-centered, earth-fixed (ECEF) frame and
//! orients them with Euler angles relative to that frame. Humans and map
//! displays want geodetic coordinates and heading/pitch/roll relative to the
//! local tangent plane. This module does both conversions against the WGS-84
//! ellipsoid.

pub mod geodetic;
pub mod orientation;

pub use geodetic::{ecef_to_geodetic, geodetic_to_ecef};
pub use orientation::body_to_local;

/// WGS-84 semi-major axis (equatorial radius), meters.
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS-84 semi-minor axis (polar radius), meters.
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

/// First eccentricity squared.
pub(crate) fn e_sq() -> f64 {
    WGS84_F * (2.0 - WGS84_F)
}

/// Second eccentricity squared.
pub(crate) fn e_prime_sq() -> f64 {
    e_sq() / (1.0 - e_sq())
}

/// Geodetic position on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticPosition {
    /// Latitude in degrees, positive north, range [-90, 90].
    pub latitude_deg: f64,
    /// Longitude in degrees, positive east, range (-180, 180].
    pub longitude_deg: f64,
    /// Height above the ellipsoid, meters.
    pub altitude_m: f64,
}

/// Orientation relative to the local north-east-down tangent plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationAngles {
    /// True heading in degrees, clockwise from north, range [0, 360).
    pub heading_deg: f64,
    /// Pitch in degrees, positive nose-up, range [-90, 90].
    pub pitch_deg: f64,
    /// Roll in degrees, positive right-wing-down, range [-180, 180].
    pub roll_deg: f64,
}
