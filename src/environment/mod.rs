pub mod atmosphere;
pub mod terrain;

pub use atmosphere::Atmosphere;
pub use terrain::{FlatTerrain, TerrainModel};
