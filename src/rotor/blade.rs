//! Single-blade flapping-hinge model with spanwise integration.
//!
//! Higher-fidelity alternative to the disk-averaged closed form: each
//! blade is a rigid lever about its flapping hinge, its two-state ODE
//! (flap angle, flap rate) integrated by RK4 with the hinge moment
//! obtained from a ten-element spanwise sum of aerodynamic, gravity and
//! inertial contributions.
//!
//! Axis chain per blade: rotor axes (RAS) -> spanwise-rotating axes
//! (SRA, x outward along the span, azimuth- and direction-dependent) ->
//! blade flap axes (BSA, rotated about the hinge by the flap angle).
//! All section aerodynamics happen in BSA; results rotate back to RAS
//! for summation across blades.

use crate::rotor::airfoil::Airfoil;
use crate::rotor::main_rotor::Direction;
use crate::utils::{FdmError, ForceMoment};
use nalgebra::{UnitQuaternion, Vector3};
use serde::Deserialize;

const SPAN_ELEMENTS: usize = 10;

/// Flap-limit first-order lag time constant [s]
const FLAP_LIMIT_TC: f64 = 0.01;

/// Blade block of a rotor definition document.
#[derive(Debug, Clone, Deserialize)]
pub struct RotorBladeDef {
    pub direction: Direction,
    /// Rotor radius [m]
    pub radius: f64,
    /// Blade chord [m]
    pub chord: f64,
    /// Flapping hinge offset from the shaft axis [m]
    pub hinge_offset: f64,
    /// Blade mass [kg]
    pub mass: f64,
    /// Flap angle limits [rad]
    pub beta_min: f64,
    pub beta_max: f64,
    pub airfoil: Airfoil,
}

/// Kinematic inputs for one blade integration step, all in rotor axes.
#[derive(Debug, Clone, Copy)]
pub struct BladeContext {
    /// Air-relative hub velocity [m/s]
    pub vel_air_ras: Vector3<f64>,
    /// Air-relative angular velocity [rad/s]
    pub omg_air_ras: Vector3<f64>,
    /// Shaft angular acceleration [rad/s^2]
    pub eps_ras: Vector3<f64>,
    /// Gravity acceleration [m/s^2]
    pub grav_ras: Vector3<f64>,
    /// Shaft speed [rad/s]
    pub omega: f64,
    /// This blade's azimuth [rad]
    pub azimuth: f64,
    /// Induced velocity through the disk, positive down [m/s]
    pub vel_induced: f64,
    /// Air density [kg/m^3]
    pub rho: f64,
    /// Feather angle at this azimuth [rad]
    pub theta: f64,
}

/// Result of one spanwise integration pass.
#[derive(Debug, Clone, Copy, Default)]
struct SpanwiseSums {
    /// Moment about the flapping hinge, positive flapping up [N·m]
    hinge_moment: f64,
    /// Net blade force in rotor axes [N]
    force_ras: Vector3<f64>,
    /// Torque about the shaft axis [N·m]
    shaft_torque: f64,
}

pub struct RotorBlade {
    def: RotorBladeDef,

    /// Blade span outboard of the hinge [m]
    span: f64,
    /// Flapping inertia about the hinge [kg·m^2]
    inertia: f64,
    /// Element mass [kg]
    elem_mass: f64,

    /// Flap angle [rad]
    beta: f64,
    /// Flap rate [rad/s]
    beta_dot: f64,

    last_sums: SpanwiseSums,
}

impl RotorBlade {
    pub fn from_def(def: RotorBladeDef) -> Result<Self, FdmError> {
        if def.radius <= def.hinge_offset || def.hinge_offset < 0.0 {
            return Err(FdmError::Config(
                "blade: hinge_offset must lie inside the radius".into(),
            ));
        }
        if def.mass <= 0.0 || def.chord <= 0.0 {
            return Err(FdmError::Config(
                "blade: mass and chord must be positive".into(),
            ));
        }
        if def.beta_min >= def.beta_max {
            return Err(FdmError::Config("blade: beta_min >= beta_max".into()));
        }
        def.airfoil.validate()?;

        let span = def.radius - def.hinge_offset;
        let inertia = def.mass * span * span / 3.0;
        let elem_mass = def.mass / SPAN_ELEMENTS as f64;

        Ok(Self {
            def,
            span,
            inertia,
            elem_mass,
            beta: 0.0,
            beta_dot: 0.0,
            last_sums: SpanwiseSums::default(),
        })
    }

    pub fn flap_angle(&self) -> f64 {
        self.beta
    }

    pub fn flap_rate(&self) -> f64 {
        self.beta_dot
    }

    pub fn set_flap_state(&mut self, beta: f64, beta_dot: f64) {
        self.beta = beta;
        self.beta_dot = beta_dot;
    }

    /// Net blade force (rotor axes) and shaft torque from the last
    /// integration step.
    pub fn force_and_torque(&self) -> (Vector3<f64>, f64) {
        (self.last_sums.force_ras, self.last_sums.shaft_torque)
    }

    /// Advance the flap state by one RK4 step, then apply the soft flap
    /// limit: an out-of-range flap angle is driven back toward the limit
    /// with a first-order lag instead of a hard clamp, and the flap rate
    /// is recovered from the finite difference across the step.
    pub fn integrate(&mut self, dt: f64, ctx: &BladeContext) -> Result<ForceMoment, FdmError> {
        let beta_prev = self.beta;

        let k1 = self.compute_state_deriv(self.beta, self.beta_dot, ctx);
        let k2 = self.compute_state_deriv(
            self.beta + 0.5 * dt * k1.0,
            self.beta_dot + 0.5 * dt * k1.1,
            ctx,
        );
        let k3 = self.compute_state_deriv(
            self.beta + 0.5 * dt * k2.0,
            self.beta_dot + 0.5 * dt * k2.1,
            ctx,
        );
        let k4 =
            self.compute_state_deriv(self.beta + dt * k3.0, self.beta_dot + dt * k3.1, ctx);

        self.beta += dt / 6.0 * (k1.0 + 2.0 * k2.0 + 2.0 * k3.0 + k4.0);
        self.beta_dot += dt / 6.0 * (k1.1 + 2.0 * k2.1 + 2.0 * k3.1 + k4.1);

        if self.beta > self.def.beta_max {
            self.beta = beta_prev + (self.def.beta_max - beta_prev) * dt / (FLAP_LIMIT_TC + dt);
            self.beta_dot = (self.beta - beta_prev) / dt;
        } else if self.beta < self.def.beta_min {
            self.beta = beta_prev + (self.def.beta_min - beta_prev) * dt / (FLAP_LIMIT_TC + dt);
            self.beta_dot = (self.beta - beta_prev) / dt;
        }

        if !self.beta.is_finite() || !self.beta_dot.is_finite() {
            return Err(FdmError::UnexpectedNaN("rotor blade flap state".into()));
        }

        // Final force/torque at the new state, for summation by the caller.
        self.last_sums = self.integrate_spanwise(self.beta, self.beta_dot, ctx);
        let fm = ForceMoment::new(
            self.last_sums.force_ras,
            Vector3::new(0.0, 0.0, self.last_sums.shaft_torque),
        );
        if !fm.is_finite() {
            return Err(FdmError::UnexpectedNaN("rotor blade force/moment".into()));
        }
        Ok(fm)
    }

    /// d(beta)/dt and d(beta_dot)/dt at a given flap state.
    fn compute_state_deriv(&self, beta: f64, beta_dot: f64, ctx: &BladeContext) -> (f64, f64) {
        let sums = self.integrate_spanwise(beta, beta_dot, ctx);
        (beta_dot, sums.hinge_moment / self.inertia)
    }

    /// Spanwise sum of elemental aerodynamic, gravity and inertial
    /// (centrifugal + Euler) moments about the flapping hinge, together
    /// with the net blade force and shaft torque.
    fn integrate_spanwise(&self, beta: f64, beta_dot: f64, ctx: &BladeContext) -> SpanwiseSums {
        let cdir = self.def.direction.mirror();
        let e = self.def.hinge_offset;
        let dx = self.span / SPAN_ELEMENTS as f64;

        // RAS -> SRA: azimuth rotation about the shaft, handling the
        // rotation sense; SRA -> BSA: flap rotation about the hinge.
        let sra_from_ras =
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), cdir * ctx.azimuth);
        let bsa_from_sra = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), beta);

        let (sin_beta, cos_beta) = beta.sin_cos();
        let grav_sra = sra_from_ras.inverse_transform_vector(&ctx.grav_ras);
        let mut sums = SpanwiseSums::default();
        let mut force_sra = Vector3::zeros();

        for i in 0..SPAN_ELEMENTS {
            let x = (i as f64 + 0.5) * dx; // span position from the hinge
            let d = e + x * cos_beta; // radial arm in the rotor plane

            // Element position in SRA / RAS.
            let r_sra = Vector3::new(d, 0.0, -x * sin_beta);
            let r_ras = sra_from_ras * r_sra;

            // Element velocity through the air: rigid-body motion, shaft
            // rotation (counter-clockwise in mirrored axes) and flapping.
            let v_body_sra = sra_from_ras
                .inverse_transform_vector(&(ctx.vel_air_ras + ctx.omg_air_ras.cross(&r_ras)));
            let v_rot_sra = Vector3::new(0.0, -ctx.omega * d, 0.0);
            let mut v_elem_bsa =
                bsa_from_sra.inverse_transform_vector(&(v_body_sra + v_rot_sra));
            v_elem_bsa.z -= beta_dot * x;

            // Section flow: tangential component along the blade's motion,
            // perpendicular component positive down through the disk.
            let u_t = -v_elem_bsa.y;
            let u_p = -v_elem_bsa.z + ctx.vel_induced;
            if u_t.abs() < 1.0e-9 && u_p.abs() < 1.0e-9 {
                continue;
            }

            let phi = u_p.atan2(u_t.abs());
            let aoa = ctx.theta - phi;
            let q_dyn = 0.5 * ctx.rho * (u_t * u_t + u_p * u_p);

            let lift = q_dyn * self.def.chord * dx * self.def.airfoil.cl(aoa);
            let drag = q_dyn * self.def.chord * dx * self.def.airfoil.cd(aoa);

            let (sin_phi, cos_phi) = phi.sin_cos();
            let f_aero_bsa = Vector3::new(
                0.0,
                lift * sin_phi + drag * cos_phi,
                -(lift * cos_phi - drag * sin_phi),
            );

            // Gravity on the element.
            let f_grav_bsa =
                bsa_from_sra.inverse_transform_vector(&grav_sra) * self.elem_mass;

            // Centrifugal force, outward in the rotor plane.
            let f_cf_bsa =
                self.elem_mass * ctx.omega * ctx.omega * d * Vector3::new(cos_beta, 0.0, sin_beta);

            // Euler force from shaft angular acceleration.
            let a_euler_ras = ctx.eps_ras.cross(&r_ras);
            let f_euler_bsa = bsa_from_sra
                .inverse_transform_vector(&sra_from_ras.inverse_transform_vector(&a_euler_ras))
                * (-self.elem_mass);

            let f_total_bsa = f_aero_bsa + f_grav_bsa + f_cf_bsa + f_euler_bsa;

            // Moment about the hinge axis (+y_bsa, positive flapping up).
            sums.hinge_moment += -x * f_total_bsa.z;

            // Only the aerodynamic share feeds the caller's force/torque
            // sums; blade weight and inertia belong to the mass model.
            let f_sra_aero = bsa_from_sra * f_aero_bsa;
            force_sra += f_sra_aero;
            sums.shaft_torque += cdir * d * f_sra_aero.y;
        }

        let mut f_ras = sra_from_ras * force_sra;
        f_ras.y *= cdir;
        sums.force_ras = f_ras;
        sums
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::deg_to_rad;

    fn test_def() -> RotorBladeDef {
        RotorBladeDef {
            direction: Direction::Ccw,
            radius: 7.5,
            chord: 0.45,
            hinge_offset: 0.3,
            mass: 90.0,
            beta_min: deg_to_rad(-5.0),
            beta_max: deg_to_rad(18.0),
            airfoil: Airfoil::generic_blade(),
        }
    }

    fn hover_ctx(theta_deg: f64) -> BladeContext {
        BladeContext {
            vel_air_ras: Vector3::zeros(),
            omg_air_ras: Vector3::zeros(),
            eps_ras: Vector3::zeros(),
            grav_ras: Vector3::new(0.0, 0.0, 9.81),
            omega: 27.0,
            azimuth: 0.0,
            vel_induced: 10.0,
            rho: 1.225,
            theta: deg_to_rad(theta_deg),
        }
    }

    #[test]
    fn test_hover_flap_settles_to_coning() {
        let mut blade = RotorBlade::from_def(test_def()).unwrap();
        let ctx = hover_ctx(8.0);

        for _ in 0..4000 {
            blade.integrate(0.001, &ctx).unwrap();
        }

        // Settled to a small positive coning angle with near-zero rate.
        assert!(blade.flap_angle() > 0.0);
        assert!(blade.flap_angle() < deg_to_rad(10.0));
        assert!(blade.flap_rate().abs() < 0.1);

        // Blade lifts (negative z in rotor axes) and drags the shaft.
        let (force, torque) = blade.force_and_torque();
        assert!(force.z < 0.0);
        assert!(torque > 0.0);
    }

    #[test]
    fn test_flap_limit_is_soft() {
        let mut def = test_def();
        def.beta_max = deg_to_rad(2.0);
        let beta_max = def.beta_max;
        let mut blade = RotorBlade::from_def(def).unwrap();

        // Excessive feather drives the analytic flap response well past
        // the limit; the soft stop must approach it asymptotically and
        // never instantaneously exceed it.
        let ctx = hover_ctx(16.0);
        let dt = 0.001;
        let mut prev = blade.flap_angle();
        for _ in 0..2000 {
            blade.integrate(dt, &ctx).unwrap();
            let lag_bound = (beta_max - prev).abs() * dt / (FLAP_LIMIT_TC + dt);
            assert!(
                blade.flap_angle() <= beta_max + lag_bound + 1.0e-9,
                "flap angle {} exceeded the soft limit {}",
                blade.flap_angle(),
                beta_max
            );
            prev = blade.flap_angle();
        }
        // Asymptotic approach from below.
        assert!(blade.flap_angle() <= beta_max);
        assert!(blade.flap_angle() > beta_max - deg_to_rad(0.5));
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let mut def = test_def();
        def.hinge_offset = 10.0;
        assert!(RotorBlade::from_def(def).is_err());
    }

    #[test]
    fn test_deterministic_integration() {
        let ctx = hover_ctx(8.0);
        let mut a = RotorBlade::from_def(test_def()).unwrap();
        let mut b = RotorBlade::from_def(test_def()).unwrap();
        for _ in 0..100 {
            a.integrate(0.001, &ctx).unwrap();
            b.integrate(0.001, &ctx).unwrap();
        }
        assert_eq!(a.flap_angle(), b.flap_angle());
        assert_eq!(a.flap_rate(), b.flap_rate());
    }
}
