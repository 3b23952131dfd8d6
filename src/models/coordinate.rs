//! Coordinate model and inbound parameter validation

use serde::{Deserialize, Serialize};

use crate::GeoScanError;

/// A validated geographic position in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in [-90, 90]
    pub latitude: f64,
    /// Longitude in [-180, 180]
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate from already-numeric values, checking the ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoScanError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoScanError::validation(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            )));
        }

        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoScanError::validation(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse the raw `lat` / `lng` query values.
    ///
    /// A parameter that is absent or blank counts as missing. Both presence
    /// checks run before any numeric parsing so a request missing either
    /// value always gets the same "Missing coordinates" answer.
    pub fn parse(lat: Option<&str>, lng: Option<&str>) -> Result<Self, GeoScanError> {
        let (Some(lat), Some(lng)) = (non_blank(lat), non_blank(lng)) else {
            return Err(GeoScanError::validation("Missing coordinates"));
        };

        let latitude = lat
            .parse::<f64>()
            .map_err(|_| GeoScanError::validation(format!("Invalid latitude: {lat}")))?;
        let longitude = lng
            .parse::<f64>()
            .map_err(|_| GeoScanError::validation(format!("Invalid longitude: {lng}")))?;

        Self::new(latitude, longitude)
    }

    /// Format coordinate as "lat, lon" with 4 decimals, for logs
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("46.8182", "8.2275", 46.8182, 8.2275)]
    #[case(" -22.8256 ", "-43.2851", -22.8256, -43.2851)]
    #[case("90", "180", 90.0, 180.0)]
    #[case("-90", "-180", -90.0, -180.0)]
    #[case("0", "0", 0.0, 0.0)]
    fn test_parse_valid(
        #[case] lat: &str,
        #[case] lng: &str,
        #[case] expected_lat: f64,
        #[case] expected_lng: f64,
    ) {
        let coordinate = Coordinate::parse(Some(lat), Some(lng)).unwrap();
        assert_eq!(coordinate.latitude, expected_lat);
        assert_eq!(coordinate.longitude, expected_lng);
    }

    #[rstest]
    #[case(None, Some("8.2"))]
    #[case(Some("46.8"), None)]
    #[case(None, None)]
    #[case(Some(""), Some("8.2"))]
    #[case(Some("46.8"), Some("   "))]
    #[case(Some("abc"), None)]
    fn test_parse_missing(#[case] lat: Option<&str>, #[case] lng: Option<&str>) {
        let err = Coordinate::parse(lat, lng).unwrap_err();
        assert!(matches!(err, GeoScanError::Validation { .. }));
        assert_eq!(err.user_message(), "Missing coordinates");
    }

    #[rstest]
    #[case("abc", "8.2", "Invalid latitude")]
    #[case("46.8", "8.2east", "Invalid longitude")]
    #[case("NaN", "8.2", "Latitude must be between")]
    #[case("46.8", "inf", "Longitude must be between")]
    #[case("90.0001", "8.2", "Latitude must be between")]
    #[case("-91", "8.2", "Latitude must be between")]
    #[case("46.8", "180.5", "Longitude must be between")]
    #[case("46.8", "-181", "Longitude must be between")]
    fn test_parse_rejected(#[case] lat: &str, #[case] lng: &str, #[case] message: &str) {
        let err = Coordinate::parse(Some(lat), Some(lng)).unwrap_err();
        assert!(matches!(err, GeoScanError::Validation { .. }));
        assert!(
            err.user_message().contains(message),
            "expected '{message}' in '{}'",
            err.user_message()
        );
    }

    #[test]
    fn test_format_coordinates() {
        let coordinate = Coordinate::new(46.818_234, 8.227_456).unwrap();
        assert_eq!(coordinate.format_coordinates(), "46.8182, 8.2275");
    }
}
