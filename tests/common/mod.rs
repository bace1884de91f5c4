mod assertions;
mod helpers;

pub use assertions::*;
pub use helpers::*;
