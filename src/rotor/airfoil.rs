//! Two-dimensional section aerodynamics from table lookup.

use crate::utils::math::LookupTable;
use crate::utils::FdmError;
use serde::Deserialize;

/// Lift and drag coefficient tables indexed by angle of attack [rad].
#[derive(Debug, Clone, Deserialize)]
pub struct Airfoil {
    cl: LookupTable,
    cd: LookupTable,
}

impl Airfoil {
    pub fn new(cl: LookupTable, cd: LookupTable) -> Self {
        Self { cl, cd }
    }

    pub fn validate(&self) -> Result<(), FdmError> {
        self.cl
            .validate()
            .map_err(|e| FdmError::Config(format!("airfoil cl: {}", e)))?;
        self.cd
            .validate()
            .map_err(|e| FdmError::Config(format!("airfoil cd: {}", e)))?;
        Ok(())
    }

    /// Lift coefficient at an angle of attack [rad].
    pub fn cl(&self, aoa: f64) -> f64 {
        self.cl.get(aoa)
    }

    /// Drag coefficient at an angle of attack [rad].
    pub fn cd(&self, aoa: f64) -> f64 {
        self.cd.get(aoa)
    }

    /// A generic rotor-blade section: linear lift up to stall at ~15 deg,
    /// parabolic drag bucket.
    pub fn generic_blade() -> Self {
        let cl = LookupTable::new(
            vec![
                -std::f64::consts::PI,
                -0.35,
                -0.26,
                0.26,
                0.35,
                std::f64::consts::PI,
            ],
            vec![0.0, -0.6, -1.5, 1.5, 0.6, 0.0],
        )
        .unwrap();
        let cd = LookupTable::new(
            vec![
                -std::f64::consts::PI,
                -1.57,
                -0.35,
                0.0,
                0.35,
                1.57,
                std::f64::consts::PI,
            ],
            vec![0.02, 1.2, 0.06, 0.011, 0.06, 1.2, 0.02],
        )
        .unwrap();
        Self { cl, cd }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_generic_blade_section() {
        let airfoil = Airfoil::generic_blade();
        assert_relative_eq!(airfoil.cl(0.0), 0.0, epsilon = 1e-12);
        // Linear region slope ~5.77 per rad
        assert_relative_eq!(airfoil.cl(0.1), 0.577, epsilon = 1e-2);
        // Past stall lift falls off
        assert!(airfoil.cl(0.5) < airfoil.cl(0.26));
        // Drag grows away from zero lift
        assert!(airfoil.cd(0.3) > airfoil.cd(0.0));
    }
}
