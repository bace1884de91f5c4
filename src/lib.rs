//! Real-time helicopter flight dynamics.
//!
//! The crate is a pure computation core: the embedding application owns
//! the clock and the input/output buffers, and calls [`Manager::step`]
//! at a fixed rate. The manager drives a [`FlightModel`] built by the
//! airframe [`Registry`]; the built-in models compose a main-rotor disk
//! trim, fuselage aerodynamics, landing gear and a mass model around a
//! quaternion-based six-degree-of-freedom integrator over the WGS-84
//! ellipsoid.
//!
//! ```no_run
//! use helidyn::data::{DataInp, DataOut, StateInp};
//! use helidyn::manager::Manager;
//!
//! let mut manager = Manager::new();
//! let mut inp = DataInp::default();
//! let mut out = DataOut::default();
//!
//! inp.state_inp = StateInp::Work;
//! inp.initial_conditions.altitude_agl = 500.0;
//! loop {
//!     manager.step(0.01, &inp, &mut out);
//! }
//! ```

pub mod aircraft;
pub mod data;
pub mod environment;
pub mod frames;
pub mod manager;
pub mod rotor;
pub mod state;
pub mod utils;

pub use aircraft::{Aircraft, FlightModel, ModelSetup, Registry};
pub use data::{DataInp, DataOut, StateInp, StateOut};
pub use manager::Manager;
pub use state::{DerivVector, StateVector};
pub use utils::FdmError;
