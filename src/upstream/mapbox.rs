//! Mapbox reverse geocoding adapter
//!
//! Asks the `mapbox.places` endpoint for the `country` and `region`
//! features containing a coordinate and folds them into a [`GeoResult`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, trace};

use super::{GeoSource, Upstream, UpstreamFailure, endpoint, fetch_json};
use crate::GeoScanError;
use crate::config::{ProviderConfig, UpstreamConfig};
use crate::models::{Coordinate, GeoResult};

const COUNTRY_PREFIX: &str = "country";
const REGION_PREFIX: &str = "region";

/// Reverse geocoding response, only the parts we read.
///
/// Features are kept raw and decoded one by one, so a single odd entry
/// cannot hide the others.
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<serde_json::Value>,
}

impl FeatureCollection {
    /// Decode every feature that has the expected shape, skipping the rest
    #[must_use]
    pub fn decoded(self) -> Vec<Feature> {
        self.features
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<Feature>(raw) {
                Ok(feature) => Some(feature),
                Err(e) => {
                    trace!("Skipping undecodable feature: {e}");
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Feature {
    /// Type-tagged identifier such as `country.8738` or `region.9345`
    #[serde(default)]
    pub id: String,
    /// Display name
    pub text: Option<String>,
    pub properties: Option<FeatureProperties>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FeatureProperties {
    pub short_code: Option<String>,
}

/// Classify a feature list.
///
/// The first `country*` feature and the first `region*` feature are looked
/// up independently; either, both or neither may be present.
#[must_use]
pub fn classify_features(features: &[Feature]) -> GeoResult {
    let mut geo = GeoResult::default();

    if let Some(country) = features.iter().find(|f| f.id.starts_with(COUNTRY_PREFIX)) {
        geo.country_name = country.text.clone();
        geo.country_code = country
            .properties
            .as_ref()
            .and_then(|p| p.short_code.as_deref())
            .map(str::to_uppercase);
    }

    if let Some(region) = features.iter().find(|f| f.id.starts_with(REGION_PREFIX)) {
        geo.region_name = region.text.clone();
    }

    geo
}

/// Geocoding adapter for the Mapbox places API
#[derive(Debug, Clone)]
pub struct MapboxGeocoder {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl MapboxGeocoder {
    /// Create a geocoder with its own HTTP connection pool
    pub fn new(provider: &ProviderConfig, upstream: &UpstreamConfig) -> Result<Self, GeoScanError> {
        Ok(Self::with_client(
            super::build_client(upstream)?,
            provider.base_url.clone(),
            provider.api_key.clone(),
        ))
    }

    /// Create a geocoder on top of an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client, base_url: String, access_token: Option<String>) -> Self {
        Self {
            client,
            base_url,
            access_token,
        }
    }

    async fn fetch(&self, coordinate: Coordinate) -> Result<GeoResult, UpstreamFailure> {
        let access_token = self
            .access_token
            .as_deref()
            .ok_or(UpstreamFailure::MissingCredential)?;

        // Mapbox wants longitude first
        let url = endpoint(
            &self.base_url,
            &format!("{},{}.json", coordinate.longitude, coordinate.latitude),
            &[("types", "country,region"), ("access_token", access_token)],
        )?;

        let collection: FeatureCollection = fetch_json(&self.client, self.name(), url).await?;
        let features = collection.decoded();
        let geo = classify_features(&features);

        debug!(
            features = features.len(),
            country = ?geo.country_code,
            region = ?geo.region_name,
            "Reverse geocoding complete"
        );
        Ok(geo)
    }
}

#[async_trait]
impl GeoSource for MapboxGeocoder {
    fn name(&self) -> &'static str {
        "mapbox"
    }

    #[instrument(name = "reverse_geocode", skip(self, coordinate), fields(coordinate = %coordinate.format_coordinates()))]
    async fn classify(&self, coordinate: Coordinate) -> Upstream<GeoResult> {
        self.fetch(coordinate).await.into()
    }
}
