use nalgebra::{Matrix6, Vector6};
use serde::Deserialize;
use std::f64::consts::PI;

/// Convert degrees to radians
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Convert radians to degrees
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Normalize an angle to the interval [-pi, pi)
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a < -PI {
        a += 2.0 * PI;
    } else if a >= PI {
        a -= 2.0 * PI;
    }
    a
}

/// Solve the 6x6 linear system `a * x = b` by Gauss-Jordan elimination
/// with partial pivoting.
///
/// Used for the body-axes mass/inertia system of the rigid-body
/// equations of motion. Returns `None` for a singular system.
pub fn solve_gauss_jordan(a: &Matrix6<f64>, b: &Vector6<f64>) -> Option<Vector6<f64>> {
    let mut m = *a;
    let mut x = *b;

    for col in 0..6 {
        // Pivot selection
        let mut pivot = col;
        for row in (col + 1)..6 {
            if m[(row, col)].abs() > m[(pivot, col)].abs() {
                pivot = row;
            }
        }
        if m[(pivot, col)].abs() < 1.0e-14 {
            return None;
        }
        if pivot != col {
            m.swap_rows(pivot, col);
            x.swap_rows(pivot, col);
        }

        let inv = 1.0 / m[(col, col)];
        for j in col..6 {
            m[(col, j)] *= inv;
        }
        x[col] *= inv;

        for row in 0..6 {
            if row != col {
                let factor = m[(row, col)];
                for j in col..6 {
                    m[(row, j)] -= factor * m[(col, j)];
                }
                x[row] -= factor * x[col];
            }
        }
    }

    Some(x)
}

/// One-dimensional lookup table with linear interpolation.
///
/// Keys must be strictly increasing. Queries outside the key range are
/// clamped to the boundary values.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupTable {
    keys: Vec<f64>,
    values: Vec<f64>,
}

impl LookupTable {
    pub fn new(keys: Vec<f64>, values: Vec<f64>) -> Result<Self, String> {
        if keys.len() != values.len() {
            return Err("lookup table: keys and values differ in length".into());
        }
        if keys.len() < 2 {
            return Err("lookup table: at least two points required".into());
        }
        // A NaN key would slip through the ordering check below and
        // later poison the binary search.
        if keys.iter().chain(values.iter()).any(|v| !v.is_finite()) {
            return Err("lookup table: keys and values must be finite".into());
        }
        if keys.windows(2).any(|w| w[0] >= w[1]) {
            return Err("lookup table: keys must be strictly increasing".into());
        }
        Ok(Self { keys, values })
    }

    pub fn get(&self, key: f64) -> f64 {
        if key <= self.keys[0] {
            return self.values[0];
        }
        if key >= *self.keys.last().unwrap() {
            return *self.values.last().unwrap();
        }

        let idx = match self
            .keys
            .binary_search_by(|k| k.partial_cmp(&key).unwrap())
        {
            Ok(i) => return self.values[i],
            Err(i) => i,
        };

        let (k0, k1) = (self.keys[idx - 1], self.keys[idx]);
        let (v0, v1) = (self.values[idx - 1], self.values[idx]);
        v0 + (v1 - v0) * (key - k0) / (k1 - k0)
    }

    pub fn validate(&self) -> Result<(), String> {
        Self::new(self.keys.clone(), self.values.clone()).map(|_| ())
    }
}
