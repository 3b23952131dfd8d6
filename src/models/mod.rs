//! Core data models for `GeoScan`

pub mod coordinate;
pub mod location;
pub mod scan;

pub use coordinate::Coordinate;
pub use location::{LocationRecord, NewLocation};
pub use scan::{GeoResult, ScanResponse, WeatherResult};
