//! Built-in curated locations and seed file loading

use std::path::Path;

use crate::GeoScanError;
use crate::models::{Coordinate, NewLocation};

/// Hand-picked drop points, (latitude, longitude)
const CURATED: &[(f64, f64)] = &[
    (24.313860169581474, 120.72260003897149),
    (35.656953, 139.701049),
    (15.37487642320615, 73.84141820396536),
    (16.444841780257196, 81.98312723041202),
    (60.66553215661249, -151.2442154258491),
    (25.893521108388082, -80.13201875671935),
    (-22.82562754593602, -43.28518857420447),
    (25.166021850737096, 55.23289077961821),
    (6.493642556821508, 3.382043892124227),
    (47.194825422589695, 8.732110241707225),
    (39.2967789, 174.0634346),
    (69.226387, -51.1038896),
    (45.8326345, 6.8651281),
    (78.2244785, 15.6099272),
    (-64.8396294, -62.5270017),
    (17.611136, -90.4269349),
    (-1.6959129, 29.2547082),
    (55.3398559, 124.7577026),
    (-13.8455335, 146.5593553),
    (-8.2713522, 124.409033),
    (45.0133047, 78.3693),
    (46.7495666, 19.4740217),
    (70.0169771, 29.3159249),
    (-17.8704595, 22.9141841),
    (14.4485164, -12.2097686),
    (-1.2157195, -90.4224469),
    (26.9470458, -101.4519393),
    (29.7163099, -91.8758019),];

/// The default seed data for an empty catalog
#[must_use]
pub fn curated_locations() -> Vec<NewLocation> {
    CURATED
        .iter()
        .map(|&(latitude, longitude)| NewLocation::new(latitude, longitude))
        .collect()
}

/// Read seed data from a JSON array of `{"lat", "lng", "description"?}`
/// objects. Every coordinate must be in range.
pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Vec<NewLocation>, GeoScanError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let locations: Vec<NewLocation> = serde_json::from_str(&raw).map_err(|e| {
        GeoScanError::config(format!("Invalid seed file {}: {e}", path.display()))
    })?;

    for location in &locations {
        Coordinate::new(location.latitude, location.longitude).map_err(|e| {
            GeoScanError::config(format!(
                "Invalid seed file {}: {}",
                path.display(),
                e.user_message()
            ))
        })?;
    }

    Ok(locations)
}
