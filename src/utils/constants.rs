// WGS-84 ellipsoid (NIMA TR-8350.2)
pub const WGS84_A: f64 = 6_378_137.0; // semi-major axis [m]
pub const WGS84_F: f64 = 1.0 / 298.257_223_563; // flattening
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F); // semi-minor axis [m]
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F); // first eccentricity squared
pub const WGS84_OMEGA: f64 = 7.292_115_146_7e-5; // Earth angular velocity [rad/s]

// Somigliana normal-gravity constants
pub const WGS84_GAMMA_E: f64 = 9.780_325_335_9; // gravity at the equator [m/s^2]
pub const WGS84_GRAVITY_K: f64 = 1.931_852_652_41e-3;

pub const GRAVITY: f64 = 9.80665; // standard gravity [m/s^2]

// ISA sea-level atmosphere
pub const AIR_GAS_CONSTANT: f64 = 287.05287; // J/(kg·K)
pub const AIR_HEAT_RATIO: f64 = 1.4;
pub const ISA_SEA_LEVEL_TEMP: f64 = 288.15; // K
pub const ISA_SEA_LEVEL_PRESSURE: f64 = 101325.0; // Pa
pub const ISA_SEA_LEVEL_DENSITY: f64 = 1.225; // kg/m^3
pub const ISA_LAPSE_RATE: f64 = -0.0065; // K/m
pub const ISA_TROPOPAUSE_ALT: f64 = 11_000.0; // m
pub const ISA_STRATOSPHERE_TEMP: f64 = 216.65; // K

// Initial conditions below this height above ground start on the ground
pub const MIN_INIT_ALTITUDE: f64 = 30.0; // m
