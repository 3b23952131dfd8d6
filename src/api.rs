//! HTTP API: `/scan` and `/random-drop`

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::Json,
    routing::get,
};
use tracing::debug;

use crate::GeoScanError;
use crate::catalog::LocationCatalog;
use crate::models::{Coordinate, LocationRecord, ScanResponse};
use crate::scan::ScanAggregator;

/// Everything a request handler needs, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub scanner: ScanAggregator,
    pub catalog: LocationCatalog,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(scanner: ScanAggregator, catalog: LocationCatalog) -> SharedState {
        Arc::new(Self { scanner, catalog })
    }
}

/// Raw scan query. Both values stay strings so that a missing or garbled
/// coordinate is reported by [`Coordinate::parse`] rather than by the
/// extractor.
#[derive(Debug, Default, PartialEq)]
pub struct ScanParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

impl ScanParams {
    /// Collect `lat` / `lng` from decoded query pairs. A repeated key keeps
    /// its first value; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "lat" if params.lat.is_none() => params.lat = Some(value),
                "lng" if params.lng.is_none() => params.lng = Some(value),
                _ => {}
            }
        }
        params
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/scan", get(scan))
        .route("/random-drop", get(random_drop))
        .with_state(state)
}

async fn scan(
    State(state): State<SharedState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<ScanResponse>, GeoScanError> {
    let Query(pairs) = query.map_err(|e| GeoScanError::validation(e.body_text()))?;
    let params = ScanParams::from_pairs(pairs);

    // reject before any upstream call is made
    let coordinate = Coordinate::parse(params.lat.as_deref(), params.lng.as_deref())?;
    Ok(Json(state.scanner.scan(coordinate).await))
}

async fn random_drop(
    State(state): State<SharedState>,
) -> Result<Json<LocationRecord>, GeoScanError> {
    let record = state
        .catalog
        .pick_random()
        .await?
        .ok_or_else(|| GeoScanError::not_found("No locations found"))?;
    debug!(id = record.id, "Random drop selected");
    Ok(Json(record))
}
