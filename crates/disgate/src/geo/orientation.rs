// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! DIS Euler angles to local heading/pitch/roll.
//!
//! DIS orients the body with psi/theta/phi Euler angles taken against the
//! ECEF axes, which mean nothing to an operator. The useful frame is the
//! north-east-down (NED) tangent plane at the entity's own position, so the
//! conversion needs the geodetic latitude and longitude as well as the wire
//! angles:
//!
//!   A = Rx(phi) * Ry(theta) * Rz(psi)     ECEF -> body
//!   B = NED rows at (lat, lon)            ECEF -> NED
//!   C = A * B^T                            NED  -> body
//!
//! then heading = atan2(C01, C00), pitch = asin(-C02), roll = atan2(C12, C22).

use super::OrientationAngles;

/// Row-major 3x3 rotation matrix.
#[derive(Debug, Clone, Copy)]
struct Mat3([[f64; 3]; 3]);

impl Mat3 {
    /// Frame rotation about the x axis.
    fn rot_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Mat3([[1.0, 0.0, 0.0], [0.0, c, s], [0.0, -s, c]])
    }

    /// Frame rotation about the y axis.
    fn rot_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Mat3([[c, 0.0, -s], [0.0, 1.0, 0.0], [s, 0.0, c]])
    }

    /// Frame rotation about the z axis.
    fn rot_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Mat3([[c, s, 0.0], [-s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    fn mul(&self, rhs: &Mat3) -> Mat3 {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.0[i][k] * rhs.0[k][j]).sum();
            }
        }
        Mat3(out)
    }

    fn transpose(&self) -> Mat3 {
        let m = &self.0;
        Mat3([
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ])
    }
}

/// ECEF -> NED rotation at the given geodetic position.
fn ecef_to_ned(lat_rad: f64, lon_rad: f64) -> Mat3 {
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();
    Mat3([
        [-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat],
        [-sin_lon, cos_lon, 0.0],
        [-cos_lat * cos_lon, -cos_lat * sin_lon, -sin_lat],
    ])
}

/// ECEF -> body rotation from the wire Euler angles (radians).
fn ecef_to_body(psi: f64, theta: f64, phi: f64) -> Mat3 {
    Mat3::rot_x(phi).mul(&Mat3::rot_y(theta)).mul(&Mat3::rot_z(psi))
}

/// Convert DIS ECEF-referenced Euler angles (radians) to heading, pitch and
/// roll against the NED tangent plane at the given geodetic position.
///
/// Heading comes back in [0, 360) degrees clockwise from true north, pitch in
/// [-90, 90] positive nose-up, roll in [-180, 180] positive right-wing-down.
/// At pitch exactly +-90 heading and roll become a single degree of freedom;
/// the atan2 convention reports heading 0 there.
#[must_use]
pub fn body_to_local(
    psi: f64,
    theta: f64,
    phi: f64,
    latitude_deg: f64,
    longitude_deg: f64,
) -> OrientationAngles {
    let a = ecef_to_body(psi, theta, phi);
    let b = ecef_to_ned(latitude_deg.to_radians(), longitude_deg.to_radians());
    let c = a.mul(&b.transpose());
    let m = &c.0;

    let mut heading = m[0][1].atan2(m[0][0]).to_degrees();
    if heading < 0.0 {
        heading += 360.0;
    }
    // Clamp guards rounding noise pushing asin out of domain.
    let pitch = (-m[0][2]).clamp(-1.0, 1.0).asin().to_degrees();
    let roll = m[1][2].atan2(m[2][2]).to_degrees();

    OrientationAngles {
        heading_deg: heading,
        pitch_deg: pitch,
        roll_deg: roll,
    }
}
