//! External input/output contract of the flight-dynamics core.
//!
//! `DataInp` and `DataOut` are allocated by the embedding application and
//! written/read every tick; the core never owns them. The embedding side
//! must not mutate `DataInp` or read `DataOut` while a step is in
//! progress (double-buffer or lock at the boundary, not inside the core).

use serde::{Deserialize, Serialize};

/// Requested simulation lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StateInp {
    #[default]
    Idle,
    Init,
    Work,
    Pause,
    Stop,
}

/// Achieved simulation lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StateOut {
    #[default]
    Idle,
    Initializing,
    Ready,
    Working,
    Paused,
    Stopped,
}

/// Terminal crash classification of a flight. Not an error; a normal
/// output of the model, reset only at Idle reinitialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Crash {
    #[default]
    NoCrash,
    Collision,
    Overspeed,
    Overstressed,
}

/// Supported airframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AircraftType {
    /// Light single-main-rotor trainer.
    #[default]
    Trainer,
    /// Medium utility helicopter.
    Utility,
}

/// Recording mode of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Recording {
    #[default]
    Live,
    Replay,
}

/// Initial-condition block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InitialConditions {
    /// Geodetic latitude [rad]
    pub latitude: f64,
    /// Geodetic longitude [rad]
    pub longitude: f64,
    /// True heading [rad]
    pub heading: f64,
    /// Height above ground [m]
    pub altitude_agl: f64,
    /// Initial true airspeed [m/s]
    pub airspeed: f64,
    /// Initial north offset from (latitude, longitude) [m]
    pub offset_x: f64,
    /// Initial east offset from (latitude, longitude) [m]
    pub offset_y: f64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            heading: 0.0,
            altitude_agl: 0.0,
            airspeed: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Pilot control inputs, all normalized to [-1, 1] except collective [0, 1].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ControlsInp {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub collective: f64,
}

/// Ground data at the initial position.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GroundInp {
    /// Terrain elevation above mean sea level [m]
    pub elevation: f64,
}

/// Input buffer, written every tick by the embedding application.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DataInp {
    pub state_inp: StateInp,
    pub aircraft_type: AircraftType,
    pub initial_conditions: InitialConditions,
    pub controls: ControlsInp,
    pub ground: GroundInp,
    pub recording: Recording,
}

/// Kinematic and air-data telemetry.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FlightDataOut {
    /// Geodetic latitude [rad]
    pub latitude: f64,
    /// Geodetic longitude [rad]
    pub longitude: f64,
    /// Altitude above mean sea level [m]
    pub altitude_asl: f64,
    /// Height above ground level [m]
    pub altitude_agl: f64,
    /// Roll angle, NED convention [rad]
    pub roll: f64,
    /// Pitch angle, NED convention [rad]
    pub pitch: f64,
    /// True heading [rad]
    pub heading: f64,
    /// Angle of attack [rad]
    pub angle_of_attack: f64,
    /// Sideslip angle [rad]
    pub sideslip_angle: f64,
    /// Ground track [rad]
    pub course: f64,
    /// Body-axes roll rate [rad/s]
    pub roll_rate: f64,
    /// Body-axes pitch rate [rad/s]
    pub pitch_rate: f64,
    /// Body-axes yaw rate [rad/s]
    pub yaw_rate: f64,
    /// True airspeed [m/s]
    pub airspeed: f64,
    /// Mach number [-]
    pub mach: f64,
    /// Climb rate, positive up [m/s]
    pub climb_rate: f64,
    /// Ground speed [m/s]
    pub ground_speed: f64,
    /// Body-axes accelerations [m/s^2]
    pub accel_x: f64,
    pub accel_y: f64,
    pub accel_z: f64,
    /// Load factors [-]
    pub g_force_x: f64,
    pub g_force_y: f64,
    pub g_force_z: f64,
    /// Weight-on-wheels flag
    pub on_ground: bool,
}

/// Per-engine telemetry.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EngineDataOut {
    /// Rotational speed as a fraction of governed speed [-]
    pub rpm_norm: f64,
    /// Shaft torque [N·m]
    pub torque: f64,
}

/// Per-blade telemetry.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BladeDataOut {
    /// Flapping angle [rad]
    pub flapping: f64,
    /// Feathering angle [rad]
    pub feathering: f64,
}

pub const MAX_ENGINES: usize = 2;
pub const MAX_BLADES: usize = 8;

/// Main-rotor telemetry.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RotorDataOut {
    /// Shaft azimuth of the reference blade [rad]
    pub azimuth: f64,
    /// Rotor speed [rad/s]
    pub omega: f64,
    /// Coning angle [rad]
    pub coning_angle: f64,
    /// Lateral disk tilt [rad]
    pub disk_roll: f64,
    /// Longitudinal disk tilt [rad]
    pub disk_pitch: f64,
    /// Collective pitch [rad]
    pub collective: f64,
    /// Lateral cyclic pitch [rad]
    pub cyclic_lat: f64,
    /// Longitudinal cyclic pitch [rad]
    pub cyclic_lon: f64,
    pub blade_count: usize,
    pub blades: [BladeDataOut; MAX_BLADES],
}

/// Output buffer, read every tick by the embedding application.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DataOut {
    pub state_out: StateOut,
    pub crash: Crash,
    pub flight: FlightDataOut,
    pub engine_count: usize,
    pub engines: [EngineDataOut; MAX_ENGINES],
    pub rotor: RotorDataOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_out_is_zeroed() {
        let out = DataOut::default();
        assert_eq!(out.state_out, StateOut::Idle);
        assert_eq!(out.crash, Crash::NoCrash);
        assert_eq!(out.flight.airspeed, 0.0);
        assert!(!out.flight.on_ground);
    }
}
