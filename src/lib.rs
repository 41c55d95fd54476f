//! Great-circle distances between coordinates and proximity queries over
//! transit stops.

pub mod error;
pub mod geo;
pub mod logging;
pub mod pairs;
pub mod proximity;
pub mod report;
pub mod stats;
pub mod stops;

pub use error::{Error, Result};
pub use geo::{haversine_km, Coordinate, EARTH_RADIUS_KM};
pub use proximity::{Neighbor, StopIndex};
pub use stats::Summary;
pub use stops::{Stop, StopFilter};
