//! WGS-84 frame bookkeeping.
//!
//! The core carries position as a Cartesian Earth-fixed (WGS) vector and
//! attitude as a WGS-to-body quaternion. Everything else (geodetic
//! coordinates, the local NED frame, gravity) is a pure function of that
//! state, recomputed each step.

use crate::utils::constants::{
    WGS84_A, WGS84_E2, WGS84_GAMMA_E, WGS84_GRAVITY_K, WGS84_OMEGA,
};
use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Geodetic position on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Geo {
    /// Geodetic latitude [rad]
    pub lat: f64,
    /// Geodetic longitude [rad]
    pub lon: f64,
    /// Altitude above the ellipsoid [m]
    pub alt: f64,
}

/// A WGS-84 position with its derived geodetic coordinates and the
/// WGS-to-NED rotation at that point.
#[derive(Debug, Clone, Copy)]
pub struct Wgs84 {
    pos: Vector3<f64>,
    geo: Geo,
    /// Rotation taking NED vectors to WGS vectors at this position.
    wgs_from_ned: UnitQuaternion<f64>,
}

impl Wgs84 {
    pub fn from_geo(geo: Geo) -> Self {
        let pos = geo_to_cartesian(&geo);
        Self {
            pos,
            geo,
            wgs_from_ned: ned_attitude(geo.lat, geo.lon),
        }
    }

    pub fn from_cartesian(pos: Vector3<f64>) -> Self {
        let geo = cartesian_to_geo(&pos);
        Self {
            pos,
            geo,
            wgs_from_ned: ned_attitude(geo.lat, geo.lon),
        }
    }

    pub fn pos(&self) -> Vector3<f64> {
        self.pos
    }

    pub fn geo(&self) -> Geo {
        self.geo
    }

    /// Rotation taking NED vectors into the WGS frame.
    pub fn wgs_from_ned(&self) -> UnitQuaternion<f64> {
        self.wgs_from_ned
    }

    /// Normal gravity magnitude at this position (Somigliana, with a
    /// free-air correction for altitude).
    pub fn gravity(&self) -> f64 {
        let sin2 = self.geo.lat.sin().powi(2);
        let g0 = WGS84_GAMMA_E * (1.0 + WGS84_GRAVITY_K * sin2) / (1.0 - WGS84_E2 * sin2).sqrt();
        // Free-air gradient approximation
        g0 * (1.0 - 2.0 * self.geo.alt / WGS84_A)
    }

    /// Earth angular velocity expressed in the WGS frame.
    pub fn earth_rate() -> Vector3<f64> {
        Vector3::new(0.0, 0.0, WGS84_OMEGA)
    }
}

/// Geodetic to Cartesian (Earth-fixed) coordinates.
pub fn geo_to_cartesian(geo: &Geo) -> Vector3<f64> {
    let (sin_lat, cos_lat) = geo.lat.sin_cos();
    let (sin_lon, cos_lon) = geo.lon.sin_cos();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    Vector3::new(
        (n + geo.alt) * cos_lat * cos_lon,
        (n + geo.alt) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + geo.alt) * sin_lat,
    )
}

/// Cartesian (Earth-fixed) to geodetic coordinates, iterative latitude
/// recovery (converges in a handful of iterations anywhere off-axis).
pub fn cartesian_to_geo(pos: &Vector3<f64>) -> Geo {
    let lon = pos.y.atan2(pos.x);
    let p = (pos.x * pos.x + pos.y * pos.y).sqrt();

    // Degenerate polar-axis case
    if p < 1.0e-9 {
        let b = WGS84_A * (1.0 - WGS84_E2).sqrt();
        return Geo {
            lat: if pos.z >= 0.0 {
                std::f64::consts::FRAC_PI_2
            } else {
                -std::f64::consts::FRAC_PI_2
            },
            lon,
            alt: pos.z.abs() - b,
        };
    }

    let mut lat = (pos.z / (p * (1.0 - WGS84_E2))).atan();
    let mut alt = 0.0;
    for _ in 0..6 {
        let sin_lat = lat.sin();
        let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        alt = p / lat.cos() - n;
        lat = (pos.z / (p * (1.0 - WGS84_E2 * n / (n + alt)))).atan();
    }

    Geo { lat, lon, alt }
}

/// Rotation taking NED vectors to WGS vectors at (lat, lon).
pub fn ned_attitude(lat: f64, lon: f64) -> UnitQuaternion<f64> {
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    // Rows of the WGS-to-NED direction cosine matrix
    #[rustfmt::skip]
    let wgs_to_ned = Matrix3::new(
        -sin_lat * cos_lon, -sin_lat * sin_lon,  cos_lat,
        -sin_lon,            cos_lon,            0.0,
        -cos_lat * cos_lon, -cos_lat * sin_lon, -sin_lat,
    );

    UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(
        wgs_to_ned.transpose(),
    ))
}
