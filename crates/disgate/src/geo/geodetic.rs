// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! ECEF <-> geodetic conversion (Bowring's closed-form method).
//!
//! Bowring's single-iteration parametric-latitude formula is accurate to well
//! under a millimeter for any point between the surface and low earth orbit,
//! which is far tighter than the f32 velocity fields on the wire anyway.

use super::{e_prime_sq, e_sq, GeodeticPosition, WGS84_A, WGS84_B};

/// Convert an ECEF position (meters) to geodetic latitude/longitude/altitude.
///
/// Longitude follows the atan2 convention: (-180, 180], positive east. At the
/// poles (x = y = 0) longitude is reported as 0 and altitude is the height
/// above the polar radius.
#[must_use]
pub fn ecef_to_geodetic(x: f64, y: f64, z: f64) -> GeodeticPosition {
    let p = (x * x + y * y).sqrt();

    // Polar axis: the standard formula divides by cos(lat) = 0.
    if p < 1e-9 {
        return GeodeticPosition {
            latitude_deg: if z >= 0.0 { 90.0 } else { -90.0 },
            longitude_deg: 0.0,
            altitude_m: z.abs() - WGS84_B,
        };
    }

    let e2 = e_sq();
    let ep2 = e_prime_sq();

    let theta = (z * WGS84_A).atan2(p * WGS84_B);
    let (sin_t, cos_t) = theta.sin_cos();

    let lat = (z + ep2 * WGS84_B * sin_t.powi(3)).atan2(p - e2 * WGS84_A * cos_t.powi(3));
    let lon = y.atan2(x);

    let sin_lat = lat.sin();
    // Prime vertical radius of curvature.
    let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let alt = p / lat.cos() - n;

    GeodeticPosition {
        latitude_deg: lat.to_degrees(),
        longitude_deg: lon.to_degrees(),
        altitude_m: alt,
    }
}

/// Convert geodetic latitude/longitude/altitude back to ECEF meters.
#[must_use]
pub fn geodetic_to_ecef(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> (f64, f64, f64) {
    let lat = latitude_deg.to_radians();
    let lon = longitude_deg.to_radians();
    let e2 = e_sq();

    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();

    let x = (n + altitude_m) * cos_lat * cos_lon;
    let y = (n + altitude_m) * cos_lat * sin_lon;
    let z = (n * (1.0 - e2) + altitude_m) * sin_lat;
    (x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64, what: &str) {
        assert!(
            (actual - expected).abs() < tolerance,
            "{}: expected {}, got {}",
            what,
            expected,
            actual
        );
    }

    #[test]
    fn test_equator_prime_meridian() {
        let pos = ecef_to_geodetic(WGS84_A, 0.0, 0.0);
        assert_close(pos.latitude_deg, 0.0, 1e-9, "latitude");
        assert_close(pos.longitude_deg, 0.0, 1e-9, "longitude");
        assert_close(pos.altitude_m, 0.0, 1e-6, "altitude");
    }

    #[test]
    fn test_north_pole_on_surface() {
        let pos = ecef_to_geodetic(0.0, 0.0, WGS84_B);
        assert_close(pos.latitude_deg, 90.0, 1e-9, "latitude");
        assert_close(pos.altitude_m, 0.0, 1e-6, "altitude");
    }

    #[test]
    fn test_south_pole_with_altitude() {
        let pos = ecef_to_geodetic(0.0, 0.0, -(WGS84_B + 1000.0));
        assert_close(pos.latitude_deg, -90.0, 1e-9, "latitude");
        assert_close(pos.altitude_m, 1000.0, 1e-6, "altitude");
    }

    #[test]
    fn test_western_longitude_negative() {
        // 90 degrees west on the equator.
        let pos = ecef_to_geodetic(0.0, -WGS84_A, 0.0);
        assert_close(pos.longitude_deg, -90.0, 1e-9, "longitude");
    }

    #[test]
    fn test_antimeridian_is_positive_180() {
        let pos = ecef_to_geodetic(-WGS84_A, 0.0, 0.0);
        assert_close(pos.longitude_deg, 180.0, 1e-9, "longitude");
    }

    #[test]
    fn test_roundtrip_mid_latitudes() {
        let cases = [
            (44.7, 0.0, 250.0),
            (-33.86, 151.21, 58.0),
            (51.5, -0.12, 11.0),
            (89.9, 135.0, 10_000.0),
            (-0.001, 179.999, -50.0),
        ];
        for (lat, lon, alt) in cases {
            let (x, y, z) = geodetic_to_ecef(lat, lon, alt);
            let back = ecef_to_geodetic(x, y, z);
            assert_close(back.latitude_deg, lat, 1e-8, "latitude roundtrip");
            assert_close(back.longitude_deg, lon, 1e-8, "longitude roundtrip");
            assert_close(back.altitude_m, alt, 1e-4, "altitude roundtrip");
        }
    }

    #[test]
    fn test_surface_point_at_45_north() {
        // z/p equals 1 - e^2 here, so the geodetic latitude is 45 degrees
        // on the nose and the point sits on the ellipsoid surface.
        let pos = ecef_to_geodetic(4_517_590.87, 0.0, 4_487_348.41);
        assert_close(pos.latitude_deg, 45.0, 1e-3, "latitude");
        assert_close(pos.longitude_deg, 0.0, 1e-9, "longitude");
        assert!(pos.altitude_m.abs() < 10.0, "altitude near surface, got {}", pos.altitude_m);
    }
}
