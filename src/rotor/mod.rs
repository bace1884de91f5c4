//! Main-rotor aerodynamic models.
//!
//! Two fidelity levels share the same airfoil data and axis conventions:
//! [`MainRotor`] is the whole-disk analytical trim model used by the
//! aircraft propulsion chain, and [`RotorBlade`] is a per-blade
//! flapping-hinge model with spanwise integration, used by the detailed
//! rotor test rig and for blade visualization.

pub mod airfoil;
pub mod blade;
pub mod main_rotor;

pub use airfoil::Airfoil;
pub use blade::{BladeContext, RotorBlade};
pub use main_rotor::{Direction, MainRotor, RotorInputs};
