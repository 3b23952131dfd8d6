//! Upstream provider adapters
//!
//! Each adapter wraps exactly one third-party HTTP call and reports either
//! [`Upstream::Available`] with the normalized payload or
//! [`Upstream::Unavailable`] with the reason. Adapters never return `Err`;
//! the scan aggregator decides what an unavailable provider means for the
//! response.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::GeoScanError;
use crate::config::UpstreamConfig;
use crate::models::{Coordinate, GeoResult, WeatherResult};

pub mod mapbox;
pub mod openweather;

pub use mapbox::MapboxGeocoder;
pub use openweather::OpenWeatherClient;

/// Responses slower than this are logged at warn level
const SLOW_RESPONSE: Duration = Duration::from_secs(2);

/// Outcome of a single upstream call
#[derive(Debug)]
pub enum Upstream<T> {
    Available(T),
    Unavailable(UpstreamFailure),
}

impl<T> Upstream<T> {
    /// Convert into an `Option`, dropping the failure reason
    pub fn ok(self) -> Option<T> {
        match self {
            Upstream::Available(value) => Some(value),
            Upstream::Unavailable(_) => None,
        }
    }
}

impl<T> From<Result<T, UpstreamFailure>> for Upstream<T> {
    fn from(result: Result<T, UpstreamFailure>) -> Self {
        match result {
            Ok(value) => Upstream::Available(value),
            Err(reason) => Upstream::Unavailable(reason),
        }
    }
}

/// Why an upstream provider could not deliver data
#[derive(Error, Debug)]
pub enum UpstreamFailure {
    #[error("no API key configured")]
    MissingCredential,

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for UpstreamFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamFailure::Timeout
        } else if err.is_decode() {
            UpstreamFailure::Malformed(err.to_string())
        } else {
            UpstreamFailure::Network(err.to_string())
        }
    }
}

/// Source of current weather for a coordinate
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &'static str;

    async fn current_weather(&self, coordinate: Coordinate) -> Upstream<WeatherResult>;
}

/// Source of country / region classification for a coordinate
#[async_trait]
pub trait GeoSource: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &'static str;

    async fn classify(&self, coordinate: Coordinate) -> Upstream<GeoResult>;
}

/// Build the HTTP client shared by the adapters.
///
/// The timeout bounds every upstream call end to end, so an unresponsive
/// provider can hold a request for at most `timeout_seconds`.
pub fn build_client(config: &UpstreamConfig) -> Result<Client, GeoScanError> {
    Client::builder()
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| GeoScanError::config(format!("Failed to create HTTP client: {e}")))
}

/// Join `base` and `path` and attach the query parameters
pub(crate) fn endpoint(
    base: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<Url, UpstreamFailure> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    Url::parse_with_params(&raw, params).map_err(|e| UpstreamFailure::InvalidUrl(e.to_string()))
}

/// Issue one GET and decode the JSON body.
///
/// Any non-2xx status is a failure; the body is only read on success.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    provider: &str,
    url: Url,
) -> Result<T, UpstreamFailure> {
    let start_time = Instant::now();

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamFailure::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    let parsed =
        serde_json::from_slice(&body).map_err(|e| UpstreamFailure::Malformed(e.to_string()))?;

    let elapsed = start_time.elapsed();
    if elapsed > SLOW_RESPONSE {
        warn!(
            provider,
            "Slow upstream response: {:.3}s",
            elapsed.as_secs_f64()
        );
    } else {
        debug!(provider, "Upstream responded in {:.3}s", elapsed.as_secs_f64());
    }

    Ok(parsed)
}
