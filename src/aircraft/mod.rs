//! Aircraft composition: components, the six-degree-of-freedom model
//! and the airframe registry.

pub mod aero;
pub mod aircraft;
pub mod controls;
pub mod gear;
pub mod mass;
pub mod model;
pub mod propulsion;
pub mod registry;

pub use aircraft::{Aircraft, Kinematics};
pub use model::{Component, ControlPositions, FlightModel, MassProperties, StepContext};
pub use registry::{ModelSetup, Registry};
