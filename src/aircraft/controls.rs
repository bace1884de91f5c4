//! Pilot-input mapping to swashplate and tail-rotor channels.

use crate::aircraft::model::{Component, ControlPositions, StepContext};
use crate::data::ControlsInp;
use crate::utils::{FdmError, ForceMoment};
use serde::Deserialize;

fn default_collective_rate() -> f64 {
    0.05
}

fn default_cyclic_rate() -> f64 {
    0.25
}

fn default_tail_rate() -> f64 {
    2.0
}

#[derive(Debug, Clone, Deserialize)]
struct ControlsDef {
    /// Collective pitch range [min, max] [rad]
    collective_range: [f64; 2],
    /// Cyclic pitch authority, symmetric [rad]
    cyclic_range: f64,
    /// Collective actuator slew rate [rad/s]
    #[serde(default = "default_collective_rate")]
    collective_rate: f64,
    /// Cyclic actuator slew rate [rad/s]
    #[serde(default = "default_cyclic_rate")]
    cyclic_rate: f64,
    /// Tail-rotor channel slew rate [1/s]
    #[serde(default = "default_tail_rate")]
    tail_rate: f64,
}

/// Linear mapping from normalized pilot inputs to rate-limited control
/// channel positions. The swashplate actuators slew toward the
/// commanded position at a finite rate, so a stick yank never becomes
/// an instantaneous blade-pitch jump. Produces no force or moment of
/// its own.
#[derive(Debug, Default)]
pub struct Controls {
    collective_min: f64,
    collective_max: f64,
    cyclic_range: f64,
    collective_rate: f64,
    cyclic_rate: f64,
    tail_rate: f64,

    input: ControlsInp,
    target: ControlPositions,
    positions: ControlPositions,
}

fn slew(current: f64, target: f64, max_delta: f64) -> f64 {
    current + (target - current).clamp(-max_delta, max_delta)
}

impl Controls {
    pub fn set_input(&mut self, inp: &ControlsInp) {
        self.input = *inp;
    }

    pub fn positions(&self) -> ControlPositions {
        self.positions
    }

    /// Move the actuators straight to the commanded positions, used
    /// when placing the aircraft at its initial conditions.
    pub fn snap_to_target(&mut self) {
        self.positions = self.target;
    }

    /// Advance the actuators toward the commanded positions.
    pub fn integrate(&mut self, dt: f64) {
        self.positions = ControlPositions {
            collective: slew(
                self.positions.collective,
                self.target.collective,
                self.collective_rate * dt,
            ),
            cyclic_lat: slew(
                self.positions.cyclic_lat,
                self.target.cyclic_lat,
                self.cyclic_rate * dt,
            ),
            cyclic_lon: slew(
                self.positions.cyclic_lon,
                self.target.cyclic_lon,
                self.cyclic_rate * dt,
            ),
            tail_thrust: slew(
                self.positions.tail_thrust,
                self.target.tail_thrust,
                self.tail_rate * dt,
            ),
        };
    }
}

impl Component for Controls {
    fn read_data(&mut self, node: &serde_yaml::Value) -> Result<(), FdmError> {
        let def: ControlsDef = serde_yaml::from_value(node.clone())?;
        if def.collective_range[0] >= def.collective_range[1] {
            return Err(FdmError::Config(
                "controls.collective_range: min must be below max".into(),
            ));
        }
        if def.cyclic_range <= 0.0 {
            return Err(FdmError::Config(
                "controls.cyclic_range: must be positive".into(),
            ));
        }
        if def.collective_rate <= 0.0 || def.cyclic_rate <= 0.0 || def.tail_rate <= 0.0 {
            return Err(FdmError::Config(
                "controls: slew rates must be positive".into(),
            ));
        }
        self.collective_min = def.collective_range[0];
        self.collective_max = def.collective_range[1];
        self.cyclic_range = def.cyclic_range;
        self.collective_rate = def.collective_rate;
        self.cyclic_rate = def.cyclic_rate;
        self.tail_rate = def.tail_rate;

        // Actuators start at the bottom of their travel.
        self.positions = ControlPositions {
            collective: self.collective_min,
            ..Default::default()
        };
        self.target = self.positions;
        Ok(())
    }

    fn update(&mut self, _ctx: &StepContext) -> Result<(), FdmError> {
        let collective = self.input.collective.clamp(0.0, 1.0);
        self.target = ControlPositions {
            collective: self.collective_min
                + collective * (self.collective_max - self.collective_min),
            cyclic_lat: self.input.roll.clamp(-1.0, 1.0) * self.cyclic_range,
            cyclic_lon: self.input.pitch.clamp(-1.0, 1.0) * self.cyclic_range,
            tail_thrust: self.input.yaw.clamp(-1.0, 1.0),
        };
        Ok(())
    }

    fn compute_force_and_moment(&mut self, _ctx: &StepContext) -> Result<ForceMoment, FdmError> {
        Ok(ForceMoment::default())
    }
}
