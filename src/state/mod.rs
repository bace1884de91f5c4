mod vector;

pub use vector::{DerivVector, StateVector};
