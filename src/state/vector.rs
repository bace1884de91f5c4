//! Rigid-body state vector and its time derivative.
//!
//! Thirteen scalars: Earth-fixed (WGS) position, WGS-to-body attitude
//! quaternion, body-axes linear velocity and body-axes angular velocity.
//! The quaternion is kept unit-norm by renormalizing after every
//! integration step; during Runge-Kutta stages it is treated as four raw
//! scalars.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// The 13-element rigid-body state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    /// Position in the WGS frame [m]
    pub pos_wgs: Vector3<f64>,
    /// Attitude quaternion, rotation taking body vectors to WGS vectors
    pub att_wgs: Quaternion<f64>,
    /// Linear velocity in body axes (u, v, w) [m/s]
    pub vel_bas: Vector3<f64>,
    /// Angular velocity in body axes (p, q, r) [rad/s]
    pub omg_bas: Vector3<f64>,
}

impl Default for StateVector {
    fn default() -> Self {
        Self {
            pos_wgs: Vector3::zeros(),
            att_wgs: Quaternion::identity(),
            vel_bas: Vector3::zeros(),
            omg_bas: Vector3::zeros(),
        }
    }
}

impl StateVector {
    pub fn new(
        pos_wgs: Vector3<f64>,
        att_wgs: UnitQuaternion<f64>,
        vel_bas: Vector3<f64>,
        omg_bas: Vector3<f64>,
    ) -> Self {
        Self {
            pos_wgs,
            att_wgs: *att_wgs.quaternion(),
            vel_bas,
            omg_bas,
        }
    }

    /// Normalized attitude, rotation taking body vectors to WGS vectors.
    pub fn attitude(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_quaternion(self.att_wgs)
    }

    /// Renormalize the attitude quaternion in place.
    pub fn normalize_attitude(&mut self) {
        self.att_wgs = *UnitQuaternion::from_quaternion(self.att_wgs).quaternion();
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.pos_wgs.iter().all(|v| v.is_finite())
            && self.att_wgs.coords.iter().all(|v| v.is_finite())
            && self.vel_bas.iter().all(|v| v.is_finite())
            && self.omg_bas.iter().all(|v| v.is_finite())
    }

    /// Kinematic part of the state derivative: position rate in WGS and
    /// the attitude quaternion rate for the current body rates.
    pub fn kinematic_deriv(&self) -> (Vector3<f64>, Quaternion<f64>) {
        let att = self.attitude();
        let pos_dot = att * self.vel_bas;
        let omega = Quaternion::from_imag(self.omg_bas);
        let att_dot = (self.att_wgs * omega) * 0.5;
        (pos_dot, att_dot)
    }
}

impl Add<DerivVector> for StateVector {
    type Output = StateVector;

    fn add(self, rhs: DerivVector) -> StateVector {
        StateVector {
            pos_wgs: self.pos_wgs + rhs.vel_wgs,
            att_wgs: self.att_wgs + rhs.att_dot,
            vel_bas: self.vel_bas + rhs.acc_bas,
            omg_bas: self.omg_bas + rhs.eps_bas,
        }
    }
}

/// Time derivative of [`StateVector`]; also reported as a diagnostic
/// quantity (body-axes accelerations).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivVector {
    /// Position rate in the WGS frame [m/s]
    pub vel_wgs: Vector3<f64>,
    /// Attitude quaternion rate
    pub att_dot: Quaternion<f64>,
    /// Linear acceleration in body axes [m/s^2]
    pub acc_bas: Vector3<f64>,
    /// Angular acceleration in body axes [rad/s^2]
    pub eps_bas: Vector3<f64>,
}

impl DerivVector {
    pub fn is_finite(&self) -> bool {
        self.vel_wgs.iter().all(|v| v.is_finite())
            && self.att_dot.coords.iter().all(|v| v.is_finite())
            && self.acc_bas.iter().all(|v| v.is_finite())
            && self.eps_bas.iter().all(|v| v.is_finite())
    }
}

impl Add for DerivVector {
    type Output = DerivVector;

    fn add(self, rhs: DerivVector) -> DerivVector {
        DerivVector {
            vel_wgs: self.vel_wgs + rhs.vel_wgs,
            att_dot: self.att_dot + rhs.att_dot,
            acc_bas: self.acc_bas + rhs.acc_bas,
            eps_bas: self.eps_bas + rhs.eps_bas,
        }
    }
}

impl Mul<f64> for DerivVector {
    type Output = DerivVector;

    fn mul(self, rhs: f64) -> DerivVector {
        DerivVector {
            vel_wgs: self.vel_wgs * rhs,
            att_dot: self.att_dot * rhs,
            acc_bas: self.acc_bas * rhs,
            eps_bas: self.eps_bas * rhs,
        }
    }
}
