use nalgebra::Vector3;
use std::ops::Add;

/// A force and moment pair in a common frame, usually body axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceMoment {
    pub force: Vector3<f64>,
    pub moment: Vector3<f64>,
}

impl ForceMoment {
    pub fn new(force: Vector3<f64>, moment: Vector3<f64>) -> Self {
        Self { force, moment }
    }

    pub fn is_finite(&self) -> bool {
        self.force.iter().all(|v| v.is_finite()) && self.moment.iter().all(|v| v.is_finite())
    }
}

impl Add for ForceMoment {
    type Output = ForceMoment;

    fn add(self, rhs: ForceMoment) -> ForceMoment {
        ForceMoment {
            force: self.force + rhs.force,
            moment: self.moment + rhs.moment,
        }
    }
}
