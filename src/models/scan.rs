//! Scan response models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Weather provider payload, passed through verbatim
pub type WeatherResult = Value;

/// Geographic classification of a coordinate.
///
/// Every field stays `None` unless the matching feature type was found in
/// the geocoding response.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GeoResult {
    /// ISO 3166-1 short code, upper-cased
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub region_name: Option<String>,
}

impl GeoResult {
    /// True when no field could be filled
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.country_code.is_none() && self.country_name.is_none() && self.region_name.is_none()
    }
}

/// Unified answer for one scan.
///
/// Both keys are always serialized; a missing weather payload is `null`
/// and an unknown geography is an object of `null`s.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ScanResponse {
    pub weather: Option<WeatherResult>,
    pub geo: GeoResult,
}
