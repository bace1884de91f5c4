//! Airframe registry: maps the requested aircraft type to a builder for
//! a concrete flight model. Definition documents are compiled into the
//! binary; the registry is the only place that knows them.

use crate::aircraft::aircraft::Aircraft;
use crate::aircraft::model::FlightModel;
use crate::data::AircraftType;
use crate::environment::FlatTerrain;
use crate::utils::FdmError;
use std::collections::HashMap;

/// Environment handed to a builder when a model is constructed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelSetup {
    /// Terrain elevation above mean sea level at the initial position [m]
    pub ground_elevation: f64,
}

type Builder = fn(&ModelSetup) -> Result<Box<dyn FlightModel>, FdmError>;

pub struct Registry {
    builders: HashMap<AircraftType, Builder>,
}

impl Registry {
    /// The registry with every built-in airframe.
    pub fn standard() -> Self {
        let mut builders: HashMap<AircraftType, Builder> = HashMap::new();
        builders.insert(AircraftType::Trainer, build_trainer);
        builders.insert(AircraftType::Utility, build_utility);
        Self { builders }
    }

    pub fn build(
        &self,
        aircraft_type: AircraftType,
        setup: &ModelSetup,
    ) -> Result<Box<dyn FlightModel>, FdmError> {
        let builder = self.builders.get(&aircraft_type).ok_or_else(|| {
            FdmError::Config(format!("no builder registered for {:?}", aircraft_type))
        })?;
        builder(setup)
    }
}

fn build_trainer(setup: &ModelSetup) -> Result<Box<dyn FlightModel>, FdmError> {
    let terrain = Box::new(FlatTerrain::new(setup.ground_elevation));
    Ok(Box::new(
        Aircraft::from_yaml(include_str!("defs/trainer.yaml"), terrain)
            .map_err(|e| e.context("building the trainer airframe failed"))?,
    ))
}

fn build_utility(setup: &ModelSetup) -> Result<Box<dyn FlightModel>, FdmError> {
    let terrain = Box::new(FlatTerrain::new(setup.ground_elevation));
    Ok(Box::new(
        Aircraft::from_yaml(include_str!("defs/utility.yaml"), terrain)
            .map_err(|e| e.context("building the utility airframe failed"))?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_registered_airframe_builds() {
        let registry = Registry::standard();
        let setup = ModelSetup::default();
        for aircraft_type in [AircraftType::Trainer, AircraftType::Utility] {
            registry.build(aircraft_type, &setup).unwrap();
        }
    }
}
