//! Component and flight-model contracts.
//!
//! The aircraft composes five force/moment sources (aerodynamics,
//! controls, landing gear, mass, propulsion) through the narrow
//! [`Component`] interface; the simulation manager drives a whole
//! airframe through the [`FlightModel`] capability handle produced by the
//! registry.

use crate::data::{Crash, DataInp, DataOut};
use crate::state::StateVector;
use crate::utils::{FdmError, ForceMoment};
use nalgebra::{Matrix3, UnitQuaternion, Vector3};

/// Control channel positions produced by the controls component,
/// consumed by the other components.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlPositions {
    /// Collective pitch [rad]
    pub collective: f64,
    /// Lateral cyclic pitch [rad]
    pub cyclic_lat: f64,
    /// Longitudinal cyclic pitch [rad]
    pub cyclic_lon: f64,
    /// Tail-rotor thrust demand, normalized [-1, 1]
    pub tail_thrust: f64,
}

/// Kinematic and atmospheric state handed to every component, rebuilt
/// from the state vector for each derivative evaluation.
#[derive(Debug, Clone, Copy)]
pub struct StepContext {
    /// Body-axes linear velocity [m/s]
    pub vel_bas: Vector3<f64>,
    /// Body-axes angular velocity [rad/s]
    pub omg_bas: Vector3<f64>,
    /// Air-relative body-axes velocity [m/s]
    pub vel_air_bas: Vector3<f64>,
    /// Air-relative body-axes angular velocity [rad/s]
    pub omg_air_bas: Vector3<f64>,
    /// Gravity acceleration in body axes [m/s^2]
    pub grav_bas: Vector3<f64>,
    /// Rotation taking body vectors to NED vectors
    pub att_ned_bas: UnitQuaternion<f64>,
    /// Height of the body origin above ground [m]
    pub altitude_agl: f64,
    /// Air density [kg/m^3]
    pub rho: f64,
    /// Speed of sound [m/s]
    pub speed_of_sound: f64,
    /// Control channel positions
    pub controls: ControlPositions,
}

/// Contract of every composed force/moment source.
pub trait Component {
    /// Parse this component's block of an aircraft definition document.
    fn read_data(&mut self, node: &serde_yaml::Value) -> Result<(), FdmError>;

    /// Recompute internal quantities from the current aircraft state.
    fn update(&mut self, ctx: &StepContext) -> Result<(), FdmError>;

    /// Body-axes force and moment for the given kinematic state.
    fn compute_force_and_moment(&mut self, ctx: &StepContext) -> Result<ForceMoment, FdmError>;
}

/// Extra surface exposed by the mass component toward the 6x6 solver.
pub trait MassProperties {
    /// Total mass [kg]
    fn mass(&self) -> f64;
    /// Inertia tensor about the body origin [kg·m^2]
    fn inertia_matrix(&self) -> Matrix3<f64>;
    /// First moment of mass about the body origin [kg·m]
    fn first_moment(&self) -> Vector3<f64>;
}

/// Capability handle over one airframe instance, as produced by the
/// registry and driven by the manager.
pub trait FlightModel: Send {
    /// One initialization pass; models may need several ticks to become
    /// ready. In replay mode a single dry update suffices.
    fn initialize(&mut self, replay: bool) -> Result<(), FdmError>;

    fn is_ready(&self) -> bool;

    /// Latch this tick's pilot input.
    fn set_input(&mut self, inp: &DataInp);

    /// Advance the model by one fixed timestep.
    fn step(&mut self, dt: f64) -> Result<(), FdmError>;

    /// Forced repositioning; recomputes derived variables without
    /// advancing time and clears any latched crash.
    fn set_state_vector(&mut self, state: StateVector) -> Result<(), FdmError>;

    fn state_vector(&self) -> StateVector;

    fn crash(&self) -> Crash;

    /// One-line state summary for logging.
    fn describe_state(&self) -> String;

    /// Publish telemetry into the output buffer.
    fn update_data_out(&self, out: &mut DataOut);
}

/// Read a named block out of an aircraft definition document.
pub fn def_node<'a>(doc: &'a serde_yaml::Value, key: &str) -> Result<&'a serde_yaml::Value, FdmError> {
    doc.get(key)
        .ok_or_else(|| FdmError::Config(format!("missing section: {}", key)))
}
