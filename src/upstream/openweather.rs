//! OpenWeatherMap current-weather adapter

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::{Upstream, UpstreamFailure, WeatherSource, endpoint, fetch_json};
use crate::GeoScanError;
use crate::config::{ProviderConfig, UpstreamConfig};
use crate::models::{Coordinate, WeatherResult};

/// Weather adapter for the OpenWeatherMap `/weather` endpoint
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    /// Create a client with its own HTTP connection pool
    pub fn new(provider: &ProviderConfig, upstream: &UpstreamConfig) -> Result<Self, GeoScanError> {
        Ok(Self::with_client(
            super::build_client(upstream)?,
            provider.base_url.clone(),
            provider.api_key.clone(),
        ))
    }

    /// Create a client on top of an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    async fn fetch(&self, coordinate: Coordinate) -> Result<WeatherResult, UpstreamFailure> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamFailure::MissingCredential)?;

        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();
        let url = endpoint(
            &self.base_url,
            "weather",
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", "metric"),
                ("appid", api_key),
            ],
        )?;

        let payload: WeatherResult = fetch_json(&self.client, self.name(), url).await?;
        debug!("Weather payload received");
        Ok(payload)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    fn name(&self) -> &'static str {
        "openweathermap"
    }

    #[instrument(name = "weather_lookup", skip(self, coordinate), fields(coordinate = %coordinate.format_coordinates()))]
    async fn current_weather(&self, coordinate: Coordinate) -> Upstream<WeatherResult> {
        self.fetch(coordinate).await.into()
    }
}
