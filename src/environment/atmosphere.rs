//! ISA standard atmosphere, troposphere and lower stratosphere.

use crate::utils::constants::{
    AIR_GAS_CONSTANT, AIR_HEAT_RATIO, GRAVITY, ISA_LAPSE_RATE, ISA_SEA_LEVEL_PRESSURE,
    ISA_SEA_LEVEL_TEMP, ISA_STRATOSPHERE_TEMP, ISA_TROPOPAUSE_ALT,
};

/// Air state as a function of altitude, recomputed every step.
#[derive(Debug, Clone, Copy)]
pub struct Atmosphere {
    temperature: f64,
    pressure: f64,
    density: f64,
    speed_of_sound: f64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        let mut atm = Self {
            temperature: 0.0,
            pressure: 0.0,
            density: 0.0,
            speed_of_sound: 0.0,
        };
        atm.update(0.0);
        atm
    }
}

impl Atmosphere {
    /// Recompute air data for an altitude above mean sea level [m].
    pub fn update(&mut self, altitude_asl: f64) {
        let h = altitude_asl.max(-500.0);

        if h <= ISA_TROPOPAUSE_ALT {
            self.temperature = ISA_SEA_LEVEL_TEMP + ISA_LAPSE_RATE * h;
            self.pressure = ISA_SEA_LEVEL_PRESSURE
                * (self.temperature / ISA_SEA_LEVEL_TEMP)
                    .powf(-GRAVITY / (ISA_LAPSE_RATE * AIR_GAS_CONSTANT));
        } else {
            let t11 = ISA_STRATOSPHERE_TEMP;
            let p11 = ISA_SEA_LEVEL_PRESSURE
                * (t11 / ISA_SEA_LEVEL_TEMP).powf(-GRAVITY / (ISA_LAPSE_RATE * AIR_GAS_CONSTANT));
            self.temperature = t11;
            self.pressure =
                p11 * (-GRAVITY * (h - ISA_TROPOPAUSE_ALT) / (AIR_GAS_CONSTANT * t11)).exp();
        }

        self.density = self.pressure / (AIR_GAS_CONSTANT * self.temperature);
        self.speed_of_sound = (AIR_HEAT_RATIO * AIR_GAS_CONSTANT * self.temperature).sqrt();
    }

    /// Static air temperature [K]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Static pressure [Pa]
    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    /// Air density [kg/m^3]
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Speed of sound [m/s]
    pub fn speed_of_sound(&self) -> f64 {
        self.speed_of_sound
    }
}
