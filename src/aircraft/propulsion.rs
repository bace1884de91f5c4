//! Propulsion chain: governed main-rotor drive with a first-order
//! spin-up lag, the disk-trim rotor model, and a simple tail rotor.

use crate::aircraft::model::{Component, StepContext};
use crate::rotor::main_rotor::{MainRotor, MainRotorDef, RotorInputs};
use crate::utils::{FdmError, ForceMoment};
use nalgebra::Vector3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct TailRotorDef {
    /// Tail-rotor hub position in body axes [m]
    position: [f64; 3],
    /// Maximum side thrust [N]
    thrust_max: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct PropulsionDef {
    /// Governed shaft speed [rad/s]
    governed_omega: f64,
    /// Spin-up time constant [s]
    spinup_time: f64,
    main_rotor: MainRotorDef,
    tail_rotor: TailRotorDef,
}

/// The propulsion component. Owns the only sub-model with an internal
/// time constant (shaft spin-up), advanced by `integrate` ahead of the
/// rigid-body RK4 step.
pub struct Propulsion {
    governed_omega: f64,
    spinup_time: f64,
    rotor: Option<MainRotor>,
    tail_position: Vector3<f64>,
    tail_thrust_max: f64,

    /// Shaft speed [rad/s]
    omega: f64,
    last_force: Vector3<f64>,
}

impl Default for Propulsion {
    fn default() -> Self {
        Self {
            governed_omega: 0.0,
            spinup_time: 1.0,
            rotor: None,
            tail_position: Vector3::zeros(),
            tail_thrust_max: 0.0,
            omega: 0.0,
            last_force: Vector3::zeros(),
        }
    }
}

impl Propulsion {
    /// Start with the rotor turning at governed speed.
    pub fn spool_up(&mut self) {
        self.omega = self.governed_omega;
        if let Some(rotor) = &mut self.rotor {
            rotor.update(0.0, self.governed_omega);
        }
    }

    /// Advance sub-models with their own time constants by `dt`.
    pub fn integrate(&mut self, dt: f64) {
        if self.spinup_time > 0.0 {
            self.omega += (self.governed_omega - self.omega) * dt / self.spinup_time;
        } else {
            self.omega = self.governed_omega;
        }
        if let Some(rotor) = &mut self.rotor {
            rotor.update(dt, self.omega);
        }
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    pub fn rpm_norm(&self) -> f64 {
        if self.governed_omega > 0.0 {
            self.omega / self.governed_omega
        } else {
            0.0
        }
    }

    pub fn rotor(&self) -> Option<&MainRotor> {
        self.rotor.as_ref()
    }

    /// Body-axes force of the last evaluation, for load-factor checks.
    pub fn last_force(&self) -> Vector3<f64> {
        self.last_force
    }
}

impl Component for Propulsion {
    fn read_data(&mut self, node: &serde_yaml::Value) -> Result<(), FdmError> {
        let def: PropulsionDef = serde_yaml::from_value(node.clone())?;
        if def.governed_omega <= 0.0 {
            return Err(FdmError::Config(
                "propulsion.governed_omega: must be positive".into(),
            ));
        }
        if def.spinup_time < 0.0 {
            return Err(FdmError::Config(
                "propulsion.spinup_time: must be non-negative".into(),
            ));
        }
        if def.tail_rotor.thrust_max < 0.0 {
            return Err(FdmError::Config(
                "propulsion.tail_rotor.thrust_max: must be non-negative".into(),
            ));
        }

        self.governed_omega = def.governed_omega;
        self.spinup_time = def.spinup_time;
        self.tail_position = Vector3::from(def.tail_rotor.position);
        self.tail_thrust_max = def.tail_rotor.thrust_max;
        self.rotor = Some(MainRotor::from_def(def.main_rotor)?);
        self.omega = 0.0;
        Ok(())
    }

    fn update(&mut self, _ctx: &StepContext) -> Result<(), FdmError> {
        Ok(())
    }

    fn compute_force_and_moment(&mut self, ctx: &StepContext) -> Result<ForceMoment, FdmError> {
        let rotor = self
            .rotor
            .as_mut()
            .ok_or_else(|| FdmError::Config("propulsion: no main rotor configured".into()))?;

        let inputs = RotorInputs {
            vel_air_bas: ctx.vel_air_bas,
            omg_air_bas: ctx.omg_air_bas,
            rho: ctx.rho,
            collective: ctx.controls.collective,
            cyclic_lat: ctx.controls.cyclic_lat,
            cyclic_lon: ctx.controls.cyclic_lon,
        };
        let mut fm = rotor.compute_force_and_moment(&inputs)?;

        // Tail rotor as a side-thrust actuator at the tail boom.
        let tail_thrust = ctx.controls.tail_thrust * self.tail_thrust_max * self.rpm_norm();
        let tail_force = Vector3::new(0.0, tail_thrust, 0.0);
        fm.force += tail_force;
        fm.moment += self.tail_position.cross(&tail_force);

        if !fm.is_finite() {
            return Err(FdmError::UnexpectedNaN("propulsion force/moment".into()));
        }
        self.last_force = fm.force;
        Ok(fm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::model::ControlPositions;
    use crate::utils::deg_to_rad;
    use nalgebra::UnitQuaternion;

    fn read() -> Propulsion {
        let mut prop = Propulsion::default();
        let yaml = r#"
governed_omega: 27.0
spinup_time: 2.0
main_rotor:
  hub_position: [0.0, 0.0, -1.8]
  inclination: 0.0524
  direction: Ccw
  blade_count: 4
  radius: 7.5
  chord: 0.45
  blade_mass: 90.0
  lift_slope: 5.73
  delta0: 0.010
  delta2: 8.0
  beta_max: 0.35
  ct_max: 0.02
  ch_max: 0.005
  cq_max: 0.004
tail_rotor:
  position: [-9.0, 0.0, -1.5]
  thrust_max: 5000.0
"#;
        let node: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        prop.read_data(&node).unwrap();
        prop
    }

    fn hover_ctx(collective_deg: f64, yaw: f64) -> StepContext {
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
            controls: ControlPositions {
                collective: deg_to_rad(collective_deg),
                cyclic_lat: 0.0,
                cyclic_lon: 0.0,
                tail_thrust: yaw,
            },
        }
    }

    #[test]
    fn test_spinup_lag() {
        let mut prop = read();
        assert_eq!(prop.omega(), 0.0);
        for _ in 0..100 {
            prop.integrate(0.1);
        }
        // Five time constants in: essentially governed.
        assert!((prop.rpm_norm() - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_hover_lift_and_tail_thrust() {
        let mut prop = read();
        prop.spool_up();
        let base = prop.compute_force_and_moment(&hover_ctx(8.0, 0.0)).unwrap();
        let fm = prop.compute_force_and_moment(&hover_ctx(8.0, 0.5)).unwrap();
        assert!(fm.force.z < -10_000.0);
        assert!(fm.force.y > base.force.y);
        // Side thrust on a boom behind the origin yaws the nose left.
        assert!(fm.moment.z < base.moment.z);
    }
}
