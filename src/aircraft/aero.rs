//! Fuselage aerodynamics: quadratic per-axis drag and rotational damping.
//!
//! Lift lives in the rotor models; what the airframe itself contributes
//! is parasite drag and damping of the body rates, which is all a
//! single-rotor helicopter fuselage needs at this fidelity.

use crate::aircraft::model::{Component, StepContext};
use crate::utils::{FdmError, ForceMoment};
use nalgebra::Vector3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct AeroDef {
    /// Effective drag area per body axis, cd * S [m^2]
    drag_area: [f64; 3],
    /// Rotational damping per body axis [N·m·s^2/rad... scaled by rho]
    damping: [f64; 3],
}

#[derive(Debug, Default)]
pub struct Aerodynamics {
    drag_area: Vector3<f64>,
    damping: Vector3<f64>,
    /// Body-axes force of the last evaluation, for load-factor checks.
    last_force: Vector3<f64>,
}

impl Aerodynamics {
    pub fn last_force(&self) -> Vector3<f64> {
        self.last_force
    }
}

impl Component for Aerodynamics {
    fn read_data(&mut self, node: &serde_yaml::Value) -> Result<(), FdmError> {
        let def: AeroDef = serde_yaml::from_value(node.clone())?;
        if def.drag_area.iter().any(|&v| v < 0.0) || def.damping.iter().any(|&v| v < 0.0) {
            return Err(FdmError::Config(
                "aerodynamics: drag_area and damping must be non-negative".into(),
            ));
        }
        self.drag_area = Vector3::from(def.drag_area);
        self.damping = Vector3::from(def.damping);
        Ok(())
    }

    fn update(&mut self, _ctx: &StepContext) -> Result<(), FdmError> {
        Ok(())
    }

    fn compute_force_and_moment(&mut self, ctx: &StepContext) -> Result<ForceMoment, FdmError> {
        let v = ctx.vel_air_bas;
        let q = 0.5 * ctx.rho * v.norm();

        let force = Vector3::new(
            -q * self.drag_area.x * v.x,
            -q * self.drag_area.y * v.y,
            -q * self.drag_area.z * v.z,
        );

        let w = ctx.omg_air_bas;
        let moment = Vector3::new(
            -ctx.rho * self.damping.x * w.x,
            -ctx.rho * self.damping.y * w.y,
            -ctx.rho * self.damping.z * w.z,
        );

        self.last_force = force;
        Ok(ForceMoment::new(force, moment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::UnitQuaternion;

    fn ctx_with_velocity(v: Vector3<f64>) -> StepContext {
        StepContext {
            vel_bas: v,
            omg_bas: Vector3::zeros(),
            vel_air_bas: v,
            omg_air_bas: Vector3::zeros(),
            grav_bas: Vector3::new(0.0, 0.0, 9.81),
            att_ned_bas: UnitQuaternion::identity(),
            altitude_agl: 100.0,
            rho: 1.225,
            speed_of_sound: 340.0,
            controls: Default::default(),
        }
    }

    #[test]
    fn test_drag_opposes_motion() {
        let mut aero = Aerodynamics::default();
        let node: serde_yaml::Value =
            serde_yaml::from_str("drag_area: [1.2, 4.0, 3.0]\ndamping: [800.0, 2500.0, 2000.0]")
                .unwrap();
        aero.read_data(&node).unwrap();

        let fm = aero
            .compute_force_and_moment(&ctx_with_velocity(Vector3::new(30.0, 0.0, 0.0)))
            .unwrap();
        assert!(fm.force.x < 0.0);
        assert_eq!(fm.force.y, 0.0);
        // Quadratic in speed
        let fm2 = aero
            .compute_force_and_moment(&ctx_with_velocity(Vector3::new(60.0, 0.0, 0.0)))
            .unwrap();
        assert!((fm2.force.x / fm.force.x - 4.0).abs() < 1e-9);
    }
}
