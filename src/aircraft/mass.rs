//! Mass, inertia and gravity.

use crate::aircraft::model::{Component, MassProperties, StepContext};
use crate::utils::{FdmError, ForceMoment};
use nalgebra::{Matrix3, Vector3};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct MassDef {
    /// Total mass [kg]
    mass: f64,
    /// Inertia tensor terms [ixx, iyy, izz, ixy, ixz, iyz] [kg·m^2]
    inertia: [f64; 6],
    /// Center of mass in body axes [m]
    cg_position: [f64; 3],
}

/// Mass model: total mass, inertia tensor and first moment of mass about
/// the body origin, plus the gravity force and moment.
#[derive(Debug, Default)]
pub struct Mass {
    mass: f64,
    inertia: Matrix3<f64>,
    first_moment: Vector3<f64>,
}

impl Component for Mass {
    fn read_data(&mut self, node: &serde_yaml::Value) -> Result<(), FdmError> {
        let def: MassDef = serde_yaml::from_value(node.clone())?;
        if def.mass <= 0.0 {
            return Err(FdmError::Config("mass.mass: must be positive".into()));
        }
        let [ixx, iyy, izz, ixy, ixz, iyz] = def.inertia;
        if ixx <= 0.0 || iyy <= 0.0 || izz <= 0.0 {
            return Err(FdmError::Config(
                "mass.inertia: diagonal terms must be positive".into(),
            ));
        }

        self.mass = def.mass;
        #[rustfmt::skip]
        let inertia = Matrix3::new(
             ixx, -ixy, -ixz,
            -ixy,  iyy, -iyz,
            -ixz, -iyz,  izz,
        );
        self.inertia = inertia;
        self.first_moment = def.mass * Vector3::from(def.cg_position);
        Ok(())
    }

    fn update(&mut self, _ctx: &StepContext) -> Result<(), FdmError> {
        Ok(())
    }

    fn compute_force_and_moment(&mut self, ctx: &StepContext) -> Result<ForceMoment, FdmError> {
        let force = self.mass * ctx.grav_bas;
        let moment = self.first_moment.cross(&ctx.grav_bas);
        Ok(ForceMoment::new(force, moment))
    }
}

impl MassProperties for Mass {
    fn mass(&self) -> f64 {
        self.mass
    }

    fn inertia_matrix(&self) -> Matrix3<f64> {
        self.inertia
    }

    fn first_moment(&self) -> Vector3<f64> {
        self.first_moment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;

    fn test_ctx() -> StepContext {
        StepContext {
            vel_bas: Vector3::zeros(),
            omg_bas: Vector3::zeros(),
            vel_air_bas: Vector3::zeros(),
            omg_air_bas: Vector3::zeros(),
            grav_bas: Vector3::new(0.0, 0.0, 9.81),
            att_ned_bas: UnitQuaternion::identity(),
            altitude_agl: 100.0,
            rho: 1.225,
            speed_of_sound: 340.0,
            controls: Default::default(),
        }
    }

    fn read(yaml: &str) -> Result<Mass, FdmError> {
        let mut mass = Mass::default();
        let node: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        mass.read_data(&node)?;
        Ok(mass)
    }

    #[test]
    fn test_gravity_force() {
        let mut mass = read(
            "mass: 1000.0\ninertia: [1500.0, 3000.0, 2500.0, 0.0, 100.0, 0.0]\ncg_position: [0.1, 0.0, 0.2]",
        )
        .unwrap();
        let fm = mass.compute_force_and_moment(&test_ctx()).unwrap();
        assert_relative_eq!(fm.force.z, 9810.0, epsilon = 1e-9);
        // CG ahead of the origin pitches the nose down under gravity.
        assert_relative_eq!(fm.moment.y, -1000.0 * 0.1 * 9.81, epsilon = 1e-9);
        assert_relative_eq!(mass.inertia_matrix()[(0, 2)], -100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_nonpositive_mass() {
        assert!(read("mass: -5.0\ninertia: [1.0, 1.0, 1.0, 0.0, 0.0, 0.0]\ncg_position: [0.0, 0.0, 0.0]").is_err());
    }
}
