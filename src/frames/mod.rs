pub mod wgs84;

pub use wgs84::{Geo, Wgs84};
