//! Landing gear: spring-damper contact at body-fixed points over locally
//! flat ground, with simple sliding friction.

use crate::aircraft::model::{Component, StepContext};
use crate::utils::{FdmError, ForceMoment};
use nalgebra::Vector3;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct GearDef {
    /// Contact points in body axes [m]
    points: Vec<[f64; 3]>,
    /// Strut stiffness [N/m]
    stiffness: f64,
    /// Strut damping [N·s/m]
    damping: f64,
    /// Sliding friction coefficient [-]
    #[serde(default = "GearDef::default_friction")]
    friction: f64,
}

impl GearDef {
    fn default_friction() -> f64 {
        0.8
    }
}

#[derive(Debug, Default)]
pub struct LandingGear {
    points: Vec<Vector3<f64>>,
    stiffness: f64,
    damping: f64,
    friction: f64,

    /// Largest single-strut normal force of the last evaluation [N]
    max_strut_force: f64,
    on_ground: bool,
}

impl LandingGear {
    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    /// Largest strut normal force of the last evaluation [N].
    pub fn max_strut_force(&self) -> f64 {
        self.max_strut_force
    }

    /// Settled height of the body origin above flat ground under the
    /// given weight, struts sharing the load equally.
    pub fn settled_height(&self, weight: f64) -> f64 {
        let lowest = self.points.iter().map(|p| p.z).fold(0.0, f64::max);
        let count = self.points.len().max(1) as f64;
        lowest - weight / (count * self.stiffness)
    }
}

impl Component for LandingGear {
    fn read_data(&mut self, node: &serde_yaml::Value) -> Result<(), FdmError> {
        let def: GearDef = serde_yaml::from_value(node.clone())?;
        if def.points.is_empty() {
            return Err(FdmError::Config(
                "landing_gear.points: at least one contact point required".into(),
            ));
        }
        if def.stiffness <= 0.0 || def.damping < 0.0 {
            return Err(FdmError::Config(
                "landing_gear: stiffness must be positive, damping non-negative".into(),
            ));
        }
        self.points = def.points.iter().map(|&p| Vector3::from(p)).collect();
        self.stiffness = def.stiffness;
        self.damping = def.damping;
        self.friction = def.friction;
        Ok(())
    }

    fn update(&mut self, _ctx: &StepContext) -> Result<(), FdmError> {
        Ok(())
    }

    fn compute_force_and_moment(&mut self, ctx: &StepContext) -> Result<ForceMoment, FdmError> {
        let mut total = ForceMoment::default();
        self.max_strut_force = 0.0;
        self.on_ground = false;

        for point in &self.points {
            // Point depth below ground, locally flat terrain.
            let p_ned = ctx.att_ned_bas * point;
            let depth = p_ned.z - ctx.altitude_agl;
            if depth <= 0.0 {
                continue;
            }

            let v_point_bas = ctx.vel_bas + ctx.omg_bas.cross(point);
            let v_point_ned = ctx.att_ned_bas * v_point_bas;

            let normal = (self.stiffness * depth + self.damping * v_point_ned.z).max(0.0);
            if normal <= 0.0 {
                continue;
            }
            self.on_ground = true;
            self.max_strut_force = self.max_strut_force.max(normal);

            // Up force plus sliding friction opposing horizontal motion.
            let mut f_ned = Vector3::new(0.0, 0.0, -normal);
            let horiz = Vector3::new(v_point_ned.x, v_point_ned.y, 0.0);
            let speed = horiz.norm();
            if speed > 0.05 {
                f_ned -= self.friction * normal * horiz / speed;
            }

            let f_bas = ctx.att_ned_bas.inverse_transform_vector(&f_ned);
            total.force += f_bas;
            total.moment += point.cross(&f_bas);
        }

        Ok(total)
    }
}
