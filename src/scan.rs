//! Scan aggregation
//!
//! Runs the weather and geocoding adapters side by side and merges whatever
//! they deliver into one [`ScanResponse`]. A provider that fails only
//! leaves its own field absent.

use std::sync::Arc;

use tokio::task::JoinError;
use tracing::{Instrument, Span, error, instrument, warn};

use crate::GeoScanError;
use crate::config::ScanConfig;
use crate::models::{Coordinate, ScanResponse};
use crate::upstream::{
    GeoSource, MapboxGeocoder, OpenWeatherClient, Upstream, WeatherSource, build_client,
};

/// Orchestrates one weather source and one geo source
#[derive(Clone)]
pub struct ScanAggregator {
    weather: Arc<dyn WeatherSource>,
    geo: Arc<dyn GeoSource>,
}

impl ScanAggregator {
    pub fn new(weather: Arc<dyn WeatherSource>, geo: Arc<dyn GeoSource>) -> Self {
        Self { weather, geo }
    }

    /// Wire up the OpenWeatherMap and Mapbox adapters over one shared
    /// HTTP client.
    pub fn from_config(config: &ScanConfig) -> Result<Self, GeoScanError> {
        let client = build_client(&config.upstream)?;
        let weather = OpenWeatherClient::with_client(
            client.clone(),
            config.weather.base_url.clone(),
            config.weather.api_key.clone(),
        );
        let geo = MapboxGeocoder::with_client(
            client,
            config.geocoding.base_url.clone(),
            config.geocoding.api_key.clone(),
        );
        Ok(Self::new(Arc::new(weather), Arc::new(geo)))
    }

    /// Scan one coordinate. Never fails: upstream problems are logged and
    /// show up as absent fields.
    #[instrument(name = "scan", skip(self, coordinate), fields(coordinate = %coordinate.format_coordinates()))]
    pub async fn scan(&self, coordinate: Coordinate) -> ScanResponse {
        let weather_source = Arc::clone(&self.weather);
        let weather_task = tokio::spawn(
            async move { weather_source.current_weather(coordinate).await }
                .instrument(Span::current()),
        );

        let geo_source = Arc::clone(&self.geo);
        let geo_task = tokio::spawn(
            async move { geo_source.classify(coordinate).await }.instrument(Span::current()),
        );

        let (weather, geo) = tokio::join!(weather_task, geo_task);

        ScanResponse {
            weather: settle(self.weather.name(), weather),
            geo: settle(self.geo.name(), geo).unwrap_or_default(),
        }
    }
}

/// Reduce a joined adapter task to its value, logging why it is missing
fn settle<T>(provider: &'static str, joined: Result<Upstream<T>, JoinError>) -> Option<T> {
    match joined {
        Ok(Upstream::Available(value)) => Some(value),
        Ok(Upstream::Unavailable(reason)) => {
            warn!(provider, %reason, "Upstream unavailable, leaving its data absent");
            None
        }
        Err(e) => {
            error!(provider, "Upstream task did not complete: {e}");
            None
        }
    }
}
