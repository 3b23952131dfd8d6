//! `GeoScan` - location scan backend
//!
//! Merges current weather and reverse geocoding for a coordinate into one
//! response, and serves random drop points from a curated catalog.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod scan;
pub mod upstream;
pub mod web;

// Re-export core types for public API
pub use api::{AppState, SharedState};
pub use catalog::{LocationCatalog, SeedOutcome};
pub use config::ScanConfig;
pub use error::GeoScanError;
pub use models::{Coordinate, GeoResult, LocationRecord, NewLocation, ScanResponse};
pub use scan::ScanAggregator;
pub use upstream::{GeoSource, Upstream, UpstreamFailure, WeatherSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, GeoScanError>;
