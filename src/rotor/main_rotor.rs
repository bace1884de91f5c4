//! Whole-disk analytical rotor trim model.
//!
//! Given shaft speed, swashplate inputs and the aircraft's kinematic and
//! atmospheric state, iteratively solves induced inflow, thrust
//! coefficient and first-harmonic flapping for the disk, then produces a
//! single equivalent hub force and moment in body axes. This is the model
//! the propulsion chain runs every derivative evaluation; the per-blade
//! model lives in [`crate::rotor::blade`].

use crate::utils::{FdmError, ForceMoment};
use nalgebra::{UnitQuaternion, Vector3};
use serde::Deserialize;
use std::f64::consts::PI;

/// Rotor rotation sense viewed from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Direction {
    /// Counter-clockwise viewed from above (US convention).
    Ccw,
    /// Clockwise viewed from above (French/Russian convention).
    Cw,
}

impl Direction {
    /// Mirror factor applied to lateral quantities so the trim math can
    /// always be written for a counter-clockwise rotor.
    pub fn mirror(&self) -> f64 {
        match self {
            Direction::Ccw => 1.0,
            Direction::Cw => -1.0,
        }
    }
}

fn default_one() -> f64 {
    1.0
}

/// Fixed-point trim-loop tuning. Exposed as configuration so convergence
/// behavior can be probed directly.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrimDef {
    #[serde(default = "TrimDef::default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "TrimDef::default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_one")]
    pub damping: f64,
}

impl TrimDef {
    fn default_max_iterations() -> usize {
        100
    }
    fn default_tolerance() -> f64 {
        1.0e-6
    }
}

impl Default for TrimDef {
    fn default() -> Self {
        Self {
            max_iterations: Self::default_max_iterations(),
            tolerance: Self::default_tolerance(),
            damping: 1.0,
        }
    }
}

/// Main-rotor block of an aircraft definition document.
#[derive(Debug, Clone, Deserialize)]
pub struct MainRotorDef {
    /// Hub position in body axes [m]
    pub hub_position: [f64; 3],
    /// Forward shaft tilt [rad]
    #[serde(default)]
    pub inclination: f64,
    pub direction: Direction,
    pub blade_count: usize,
    /// Rotor radius [m]
    pub radius: f64,
    /// Blade chord [m]
    pub chord: f64,
    /// Single blade mass [kg]
    pub blade_mass: f64,
    /// Section lift-curve slope [1/rad]
    pub lift_slope: f64,
    /// Profile drag polar, cd = delta0 + delta2 * ct^2
    pub delta0: f64,
    pub delta2: f64,
    /// Flapping saturation limit [rad]
    pub beta_max: f64,
    /// Coefficient saturation limits
    pub ct_max: f64,
    pub ch_max: f64,
    pub cq_max: f64,
    /// Calibration multipliers on the dimensional outputs
    #[serde(default = "default_one")]
    pub thrust_factor: f64,
    #[serde(default = "default_one")]
    pub hforce_factor: f64,
    #[serde(default = "default_one")]
    pub torque_factor: f64,
    #[serde(default)]
    pub trim: TrimDef,
}

/// Kinematic and atmospheric inputs for one force/moment evaluation,
/// all in body axes.
#[derive(Debug, Clone, Copy)]
pub struct RotorInputs {
    /// Air-relative linear velocity [m/s]
    pub vel_air_bas: Vector3<f64>,
    /// Air-relative angular velocity [rad/s]
    pub omg_air_bas: Vector3<f64>,
    /// Air density [kg/m^3]
    pub rho: f64,
    /// Collective pitch [rad]
    pub collective: f64,
    /// Lateral cyclic pitch [rad]
    pub cyclic_lat: f64,
    /// Longitudinal cyclic pitch [rad]
    pub cyclic_lon: f64,
}

/// Converged trim quantities, kept for telemetry and as the inflow seed
/// of the next evaluation.
#[derive(Debug, Clone, Copy, Default)]
struct TrimState {
    ct: f64,
    ch: f64,
    cq: f64,
    lambda_i: f64,
    beta_0: f64,
    beta_1c: f64,
    beta_1s: f64,
    wake_skew: f64,
    residual: f64,
    iterations: usize,
    thrust: f64,
    torque: f64,
}

pub struct MainRotor {
    def: MainRotorDef,

    hub_bas: Vector3<f64>,
    /// Rotation taking rotor-axes (RAS) vectors to body axes.
    bas_from_ras: UnitQuaternion<f64>,
    /// Disk area [m^2]
    area: f64,
    /// Rotor solidity [-]
    solidity: f64,
    /// Single-blade flapping inertia about the hub [kg·m^2]
    blade_inertia: f64,

    /// Shaft azimuth of the reference blade [rad]
    azimuth: f64,
    /// Shaft speed [rad/s]
    omega: f64,

    trim: TrimState,
}

impl MainRotor {
    pub fn from_def(def: MainRotorDef) -> Result<Self, FdmError> {
        if def.blade_count < 2 {
            return Err(FdmError::Config(
                "main_rotor.blade_count: at least two blades required".into(),
            ));
        }
        for (name, value) in [
            ("main_rotor.radius", def.radius),
            ("main_rotor.chord", def.chord),
            ("main_rotor.blade_mass", def.blade_mass),
            ("main_rotor.lift_slope", def.lift_slope),
            ("main_rotor.beta_max", def.beta_max),
            ("main_rotor.ct_max", def.ct_max),
            ("main_rotor.ch_max", def.ch_max),
            ("main_rotor.cq_max", def.cq_max),
        ] {
            if value <= 0.0 || !value.is_finite() {
                return Err(FdmError::Config(format!("{}: must be positive", name)));
            }
        }

        let hub_bas = Vector3::from(def.hub_position);
        let bas_from_ras =
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), def.inclination);
        let area = PI * def.radius * def.radius;
        let solidity = def.blade_count as f64 * def.chord / (PI * def.radius);
        let blade_inertia = def.blade_mass * def.radius * def.radius / 3.0;

        Ok(Self {
            def,
            hub_bas,
            bas_from_ras,
            area,
            solidity,
            blade_inertia,
            azimuth: 0.0,
            omega: 0.0,
            trim: TrimState {
                lambda_i: 0.05,
                ..TrimState::default()
            },
        })
    }

    /// Advance the shaft azimuth; the shaft speed itself is governed by
    /// the propulsion model.
    pub fn update(&mut self, dt: f64, omega: f64) {
        self.omega = omega;
        self.azimuth = (self.azimuth + self.def.direction.mirror() * omega * dt)
            .rem_euclid(2.0 * PI);
    }

    /// Run the disk trim for the current inputs and produce the
    /// equivalent hub force and moment in body axes.
    pub fn compute_force_and_moment(
        &mut self,
        inputs: &RotorInputs,
    ) -> Result<ForceMoment, FdmError> {
        let tip_speed = self.omega * self.def.radius;
        if tip_speed < 1.0 {
            // Rotor effectively stopped
            self.trim = TrimState {
                lambda_i: self.trim.lambda_i,
                ..TrimState::default()
            };
            return Ok(ForceMoment::default());
        }

        let cdir = self.def.direction.mirror();

        // Velocities at the hub, in rotor axes, mirrored so the math below
        // is written for a counter-clockwise rotor.
        let vel_hub_bas = inputs.vel_air_bas + inputs.omg_air_bas.cross(&self.hub_bas);
        let mut vel_air_ras = self.bas_from_ras.inverse_transform_vector(&vel_hub_bas);
        vel_air_ras.y *= cdir;

        // Sideslip-corrected control axes: x into the oncoming flow.
        let planar_speed = (vel_air_ras.x * vel_air_ras.x + vel_air_ras.y * vel_air_ras.y).sqrt();
        let sideslip = if planar_speed > 0.1 {
            vel_air_ras.y.atan2(vel_air_ras.x)
        } else {
            0.0
        };
        let (sin_ss, cos_ss) = sideslip.sin_cos();

        let mu = planar_speed / tip_speed;
        let mu2 = mu * mu;
        let mu_z = vel_air_ras.z / tip_speed;

        // Swashplate angles rotated into the control axes.
        let theta_0 = inputs.collective;
        let cyclic_lat = cdir * inputs.cyclic_lat;
        let theta_1c = cyclic_lat * cos_ss + inputs.cyclic_lon * sin_ss;
        let theta_1s = inputs.cyclic_lon * cos_ss - cyclic_lat * sin_ss;

        // Lock number at the current air density.
        let r4 = self.def.radius.powi(4);
        let gamma = inputs.rho * self.def.lift_slope * self.def.chord * r4 / self.blade_inertia;

        let a = self.def.lift_slope;
        let s = self.solidity;
        let beta_lim = self.def.beta_max;

        // Fixed-point trim loop: flapping from inflow, thrust from
        // flapping, Newton-corrected inflow from thrust (Padfield's zero
        // function). Saturations run every pass so the loop stays bounded
        // under extreme inputs. Coefficients are clamped after they have
        // fed the flapping equations of the same pass.
        let mut lambda_i = self.trim.lambda_i;
        let mut lambda = 0.0;
        let mut beta_0 = 0.0;
        let mut beta_1c = 0.0;
        let mut beta_1s = 0.0;
        let mut ct = 0.0;
        let mut residual = f64::MAX;
        let mut iterations = 0;

        let trim = &self.def.trim;
        for it in 0..trim.max_iterations {
            iterations = it + 1;
            lambda = lambda_i - mu_z;

            beta_0 = gamma * (theta_0 * (1.0 + mu2) / 8.0 - lambda / 6.0);
            beta_1c =
                -2.0 * mu * ((4.0 / 3.0) * theta_0 - lambda) / (1.0 - 0.5 * mu2) + theta_1s;
            beta_1s = -(4.0 / 3.0) * mu * beta_0 / (1.0 + 0.5 * mu2) - theta_1c;

            beta_0 = beta_0.clamp(-beta_lim, beta_lim);
            beta_1c = beta_1c.clamp(-beta_lim, beta_lim);
            beta_1s = beta_1s.clamp(-beta_lim, beta_lim);

            ct = 0.5 * a * s * (theta_0 * (1.0 + 1.5 * mu2) / 3.0 - 0.5 * lambda);
            ct = ct.clamp(-self.def.ct_max, self.def.ct_max);

            let denom = (mu2 + lambda * lambda).sqrt().max(1.0e-9);
            let g = lambda_i - ct / (2.0 * denom);
            residual = g.abs();
            if residual < trim.tolerance {
                break;
            }

            // Newton correction, damped near hover where the zero
            // function is stiff in lambda_i.
            let g_prime = (1.0 + a * s / (8.0 * denom)
                + ct * lambda / (2.0 * denom.powi(3)))
            .max(0.25);
            let relax = trim.damping * (0.4 + 0.6 * (mu / 0.1).min(1.0));
            lambda_i -= relax * g / g_prime;
        }

        self.trim.lambda_i = lambda_i;

        // H-force and torque from closed-form blade-element integrals.
        let cd_mean = self.def.delta0 + self.def.delta2 * ct * ct;
        let ch = (0.25 * s * cd_mean * mu).clamp(-self.def.ch_max, self.def.ch_max);
        let cq = (s * cd_mean * (1.0 + 3.0 * mu2) / 8.0 + lambda * ct)
            .clamp(-self.def.cq_max, self.def.cq_max);

        // Dimensional outputs with independent calibration factors.
        let scale = inputs.rho * self.area * tip_speed * tip_speed;
        let thrust = self.def.thrust_factor * ct * scale;
        let hforce = self.def.hforce_factor * ch * scale;
        let torque = self.def.torque_factor * cq * scale * self.def.radius;

        // Disk tilt from control axes back to rotor axes.
        let pitch_ras = beta_1c * cos_ss - beta_1s * sin_ss;
        let roll_ras = beta_1s * cos_ss + beta_1c * sin_ss;

        let disk = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), pitch_ras)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -roll_ras);
        let mut force_ras = disk * Vector3::new(0.0, 0.0, -thrust);

        // H-force opposes the in-plane flow (control-axes -x).
        force_ras += Vector3::new(-hforce * cos_ss, -hforce * sin_ss, 0.0);

        // Shaft reaction torque yaws the fuselage against rotor rotation.
        let mut moment_ras = Vector3::new(0.0, 0.0, torque);

        // Mirror lateral components back for a clockwise rotor.
        force_ras.y *= cdir;
        moment_ras.x *= cdir;
        moment_ras.z *= cdir;

        let force_bas = self.bas_from_ras * force_ras;
        let moment_bas = self.hub_bas.cross(&force_bas) + self.bas_from_ras * moment_ras;

        let fm = ForceMoment::new(force_bas, moment_bas);
        if !fm.is_finite() {
            return Err(FdmError::UnexpectedNaN("main rotor force/moment".into()));
        }

        self.trim = TrimState {
            ct,
            ch,
            cq,
            lambda_i,
            beta_0,
            beta_1c: cdir * pitch_ras,
            beta_1s: cdir * roll_ras,
            wake_skew: mu.atan2(lambda.abs().max(1.0e-9)),
            residual,
            iterations,
            thrust,
            torque,
        };

        Ok(fm)
    }

    pub fn radius(&self) -> f64 {
        self.def.radius
    }

    pub fn blade_count(&self) -> usize {
        self.def.blade_count
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Converged thrust coefficient [-]
    pub fn ct(&self) -> f64 {
        self.trim.ct
    }

    /// Converged H-force coefficient [-]
    pub fn ch(&self) -> f64 {
        self.trim.ch
    }

    /// Converged torque coefficient [-]
    pub fn cq(&self) -> f64 {
        self.trim.cq
    }

    /// Induced velocity through the disk [m/s]
    pub fn induced_velocity(&self) -> f64 {
        self.trim.lambda_i * self.omega * self.def.radius
    }

    /// Coning angle [rad]
    pub fn coning_angle(&self) -> f64 {
        self.trim.beta_0
    }

    /// Longitudinal disk tilt [rad]
    pub fn disk_pitch(&self) -> f64 {
        self.trim.beta_1c
    }

    /// Lateral disk tilt [rad]
    pub fn disk_roll(&self) -> f64 {
        self.trim.beta_1s
    }

    /// Wake skew angle [rad]
    pub fn wake_skew(&self) -> f64 {
        self.trim.wake_skew
    }

    /// Zero-function residual of the last trim solve.
    pub fn trim_residual(&self) -> f64 {
        self.trim.residual
    }

    /// Iterations spent in the last trim solve.
    pub fn trim_iterations(&self) -> usize {
        self.trim.iterations
    }

    /// Shaft torque of the last evaluation [N·m]
    pub fn torque(&self) -> f64 {
        self.trim.torque
    }

    /// Thrust of the last evaluation [N]
    pub fn thrust(&self) -> f64 {
        self.trim.thrust
    }

    pub fn beta_max(&self) -> f64 {
        self.def.beta_max
    }

    pub fn ct_max(&self) -> f64 {
        self.def.ct_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::deg_to_rad;

    pub(crate) fn test_def() -> MainRotorDef {
        MainRotorDef {
            hub_position: [0.0, 0.0, -1.8],
            inclination: deg_to_rad(3.0),
            direction: Direction::Ccw,
            blade_count: 4,
            radius: 7.5,
            chord: 0.45,
            blade_mass: 90.0,
            lift_slope: 5.73,
            delta0: 0.010,
            delta2: 8.0,
            beta_max: deg_to_rad(20.0),
            ct_max: 0.02,
            ch_max: 0.005,
            cq_max: 0.004,
            thrust_factor: 1.0,
            hforce_factor: 1.0,
            torque_factor: 1.0,
            trim: TrimDef::default(),
        }
    }

    fn hover_inputs(collective_deg: f64) -> RotorInputs {
        RotorInputs {
            vel_air_bas: Vector3::zeros(),
            omg_air_bas: Vector3::zeros(),
            rho: 1.225,
            collective: deg_to_rad(collective_deg),
            cyclic_lat: 0.0,
            cyclic_lon: 0.0,
        }
    }

    #[test]
    fn test_hover_thrust_points_up() {
        let mut rotor = MainRotor::from_def(test_def()).unwrap();
        rotor.update(0.0, 27.0);
        let fm = rotor.compute_force_and_moment(&hover_inputs(8.0)).unwrap();

        // Thrust is up (negative z in body axes), with a small forward
        // component from the shaft inclination.
        assert!(fm.force.z < 0.0);
        assert!(fm.force.z.abs() > 10.0 * fm.force.x.abs());
        assert!(rotor.ct() > 0.0);
        assert!(rotor.coning_angle() > 0.0);
        assert!(rotor.trim_residual() < 1.0e-6);
    }

    #[test]
    fn test_torque_reaction_sign() {
        let mut ccw = MainRotor::from_def(test_def()).unwrap();
        ccw.update(0.0, 27.0);
        let fm_ccw = ccw.compute_force_and_moment(&hover_inputs(8.0)).unwrap();

        let mut def = test_def();
        def.direction = Direction::Cw;
        let mut cw = MainRotor::from_def(def).unwrap();
        cw.update(0.0, 27.0);
        let fm_cw = cw.compute_force_and_moment(&hover_inputs(8.0)).unwrap();

        // Reaction torque flips with rotation sense.
        assert!(fm_ccw.moment.z > 0.0);
        assert!(fm_cw.moment.z < 0.0);
    }

    #[test]
    fn test_stopped_rotor_produces_nothing() {
        let mut rotor = MainRotor::from_def(test_def()).unwrap();
        rotor.update(0.0, 0.0);
        let fm = rotor.compute_force_and_moment(&hover_inputs(8.0)).unwrap();
        assert_eq!(fm, ForceMoment::default());
    }

    #[test]
    fn test_trim_convergence_sweep() {
        // Advance ratio x collective sweep: the trim loop must converge
        // inside the iteration cap, with every converged quantity finite
        // and inside its saturation bound.
        let mut rotor = MainRotor::from_def(test_def()).unwrap();
        rotor.update(0.0, 27.0);
        let tip_speed = 27.0 * rotor.radius();

        for i in 0..=8 {
            let mu = 0.05 * i as f64; // 0 .. 0.4
            for collective_deg in [2.0, 4.0, 6.0, 8.0, 10.0, 12.0] {
                let inputs = RotorInputs {
                    vel_air_bas: Vector3::new(mu * tip_speed, 0.0, 0.0),
                    omg_air_bas: Vector3::zeros(),
                    rho: 1.225,
                    collective: deg_to_rad(collective_deg),
                    cyclic_lat: 0.0,
                    cyclic_lon: 0.0,
                };
                let fm = rotor.compute_force_and_moment(&inputs).unwrap();

                assert!(
                    rotor.trim_residual() < 1.0e-6,
                    "no convergence at mu={} collective={}: residual={}",
                    mu,
                    collective_deg,
                    rotor.trim_residual()
                );
                assert!(rotor.trim_iterations() <= 100);
                assert!(fm.is_finite());
                assert!(rotor.ct().abs() <= rotor.ct_max() + 1.0e-12);
                assert!(rotor.coning_angle().abs() <= rotor.beta_max() + 1.0e-12);
                assert!(rotor.disk_pitch().abs() <= rotor.beta_max() + 1.0e-12);
                assert!(rotor.disk_roll().abs() <= rotor.beta_max() + 1.0e-12);
            }
        }
    }

    #[test]
    fn test_forward_flight_tilts_disk_back() {
        let mut rotor = MainRotor::from_def(test_def()).unwrap();
        rotor.update(0.0, 27.0);
        let tip_speed = 27.0 * rotor.radius();

        let inputs = RotorInputs {
            vel_air_bas: Vector3::new(0.2 * tip_speed, 0.0, 0.0),
            omg_air_bas: Vector3::zeros(),
            rho: 1.225,
            collective: deg_to_rad(8.0),
            cyclic_lat: 0.0,
            cyclic_lon: 0.0,
        };
        rotor.compute_force_and_moment(&inputs).unwrap();

        // Longitudinal flapback in forward flight.
        assert!(rotor.disk_pitch() < 0.0);
        assert!(rotor.wake_skew() > 0.0);
    }

    #[test]
    fn test_azimuth_wraps() {
        let mut rotor = MainRotor::from_def(test_def()).unwrap();
        for _ in 0..1000 {
            rotor.update(0.01, 27.0);
        }
        assert!(rotor.azimuth() >= 0.0 && rotor.azimuth() < 2.0 * PI);
    }
}
