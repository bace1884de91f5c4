//! Terrain and obstacle intersection service.
//!
//! Scenery is outside this core; the integrator only needs ground
//! elevation, the surface normal, and a segment-vs-ground test for
//! collision detection. The default implementation is flat ground at a
//! configured elevation.

use crate::frames::Geo;
use nalgebra::Vector3;

pub trait TerrainModel: Send {
    /// Ground elevation above mean sea level at a geodetic position [m].
    fn elevation(&self, lat: f64, lon: f64) -> f64;

    /// Unit ground normal in NED axes at a geodetic position.
    fn normal(&self, lat: f64, lon: f64) -> Vector3<f64>;

    /// True when the segment from `from` to `to` crosses the ground.
    /// The default samples the midpoint as well as the endpoint, which is
    /// exact for flat ground and a fair approximation elsewhere.
    fn intersect(&self, from: &Geo, to: &Geo) -> bool {
        let mid = Geo {
            lat: 0.5 * (from.lat + to.lat),
            lon: 0.5 * (from.lon + to.lon),
            alt: 0.5 * (from.alt + to.alt),
        };
        to.alt < self.elevation(to.lat, to.lon) || mid.alt < self.elevation(mid.lat, mid.lon)
    }
}

/// Flat ground at a fixed elevation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatTerrain {
    elevation: f64,
}

impl FlatTerrain {
    pub fn new(elevation: f64) -> Self {
        Self { elevation }
    }
}

impl TerrainModel for FlatTerrain {
    fn elevation(&self, _lat: f64, _lon: f64) -> f64 {
        self.elevation
    }

    fn normal(&self, _lat: f64, _lon: f64) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, -1.0)
    }
}
