//! Router-level tests for the scan and random-drop endpoints

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geoscan::config::UpstreamConfig;
use geoscan::upstream::{MapboxGeocoder, OpenWeatherClient, build_client};
use geoscan::{
    AppState, Coordinate, GeoResult, GeoSource, LocationCatalog, NewLocation, ScanAggregator,
    Upstream, UpstreamFailure, WeatherSource, web,
};

/// Weather source that counts calls and answers with a fixed payload
#[derive(Default)]
struct CountingWeather {
    calls: AtomicUsize,
    seen: Mutex<Vec<Coordinate>>,
    payload: Option<Value>,
}

#[async_trait]
impl WeatherSource for CountingWeather {
    fn name(&self) -> &'static str {
        "counting-weather"
    }

    async fn current_weather(&self, coordinate: Coordinate) -> Upstream<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .expect("coordinate log poisoned")
            .push(coordinate);
        match &self.payload {
            Some(payload) => Upstream::Available(payload.clone()),
            None => Upstream::Unavailable(UpstreamFailure::Status(502)),
        }
    }
}

#[derive(Default)]
struct CountingGeo {
    calls: AtomicUsize,
    result: Option<GeoResult>,
}

#[async_trait]
impl GeoSource for CountingGeo {
    fn name(&self) -> &'static str {
        "counting-geo"
    }

    async fn classify(&self, _coordinate: Coordinate) -> Upstream<GeoResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.result {
            Some(result) => Upstream::Available(result.clone()),
            None => Upstream::Unavailable(UpstreamFailure::Timeout),
        }
    }
}

async fn test_app(
    weather: Arc<CountingWeather>,
    geo: Arc<CountingGeo>,
    seed: &[NewLocation],
) -> Router {
    let catalog = LocationCatalog::in_memory()
        .await
        .expect("failed to open in-memory catalog");
    catalog.seed(seed).await.expect("failed to seed catalog");
    web::app(AppState::new(ScanAggregator::new(weather, geo), catalog))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .expect("Failed to build request");
    let response = app.oneshot(request).await.expect("Failed to execute request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).expect("Body is not JSON");
    (status, body)
}

fn japan() -> GeoResult {
    GeoResult {
        country_code: Some("JP".to_string()),
        country_name: Some("Japan".to_string()),
        region_name: Some("Tokyo".to_string()),
    }
}

#[tokio::test]
async fn test_scan_merges_both_providers() {
    let weather = Arc::new(CountingWeather {
        payload: Some(json!({"main": {"temp": 24.1}, "name": "Shibuya"})),
        ..Default::default()
    });
    let geo = Arc::new(CountingGeo {
        result: Some(japan()),
        ..Default::default()
    });
    let app = test_app(weather.clone(), geo.clone(), &[]).await;

    let (status, body) = get(app, "/api/scan?lat=35.656953&lng=139.701049").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weather"]["name"], "Shibuya");
    assert_eq!(
        body["geo"],
        json!({"countryCode": "JP", "countryName": "Japan", "regionName": "Tokyo"})
    );
    assert_eq!(weather.calls.load(Ordering::SeqCst), 1);
    assert_eq!(geo.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_scan_with_both_providers_down_still_succeeds() {
    let weather = Arc::new(CountingWeather::default());
    let geo = Arc::new(CountingGeo::default());
    let app = test_app(weather, geo, &[]).await;

    let (status, body) = get(app, "/api/scan?lat=10&lng=20").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "weather": null,
            "geo": {"countryCode": null, "countryName": null, "regionName": null}
        })
    );
}

#[tokio::test]
async fn test_scan_rejects_missing_coordinates_without_calling_upstream() {
    for uri in [
        "/api/scan",
        "/api/scan?lat=35.6",
        "/api/scan?lng=139.7",
        "/api/scan?lat=&lng=139.7",
    ] {
        let weather = Arc::new(CountingWeather::default());
        let geo = Arc::new(CountingGeo::default());
        let app = test_app(weather.clone(), geo.clone(), &[]).await;

        let (status, body) = get(app, uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({"error": "Missing coordinates"}), "{uri}");
        assert_eq!(weather.calls.load(Ordering::SeqCst), 0, "{uri}");
        assert_eq!(geo.calls.load(Ordering::SeqCst), 0, "{uri}");
    }
}

#[tokio::test]
async fn test_scan_rejects_bad_numbers_without_calling_upstream() {
    for uri in [
        "/api/scan?lat=north&lng=139.7",
        "/api/scan?lat=35.6&lng=200",
        "/api/scan?lat=-95&lng=0",
    ] {
        let weather = Arc::new(CountingWeather::default());
        let geo = Arc::new(CountingGeo::default());
        let app = test_app(weather.clone(), geo.clone(), &[]).await;

        let (status, body) = get(app, uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
        assert_eq!(weather.calls.load(Ordering::SeqCst), 0, "{uri}");
        assert_eq!(geo.calls.load(Ordering::SeqCst), 0, "{uri}");
    }
}

#[tokio::test]
async fn test_scan_with_repeated_keys_uses_first_value() {
    let weather = Arc::new(CountingWeather {
        payload: Some(json!({"name": "Nowhere"})),
        ..Default::default()
    });
    let geo = Arc::new(CountingGeo::default());
    let app = test_app(weather.clone(), geo.clone(), &[]).await;

    let (status, body) = get(app, "/api/scan?lat=1&lat=2&lng=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weather"]["name"], "Nowhere");
    let seen = weather.seen.lock().expect("coordinate log poisoned").clone();
    assert_eq!(seen, vec![Coordinate::new(1.0, 3.0).unwrap()]);
    assert_eq!(geo.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_scan_errors_are_always_json() {
    for uri in [
        "/api/scan?lat=%ZZ&lng=3",
        "/api/scan?lng=3&lat",
        "/api/scan?&&=&lat",
    ] {
        let weather = Arc::new(CountingWeather::default());
        let geo = Arc::new(CountingGeo::default());
        let app = test_app(weather.clone(), geo.clone(), &[]).await;

        let (status, body) = get(app, uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
        assert_eq!(weather.calls.load(Ordering::SeqCst), 0, "{uri}");
        assert_eq!(geo.calls.load(Ordering::SeqCst), 0, "{uri}");
    }
}

#[tokio::test]
async fn test_random_drop_returns_a_seeded_record() {
    let seed = vec![NewLocation::new(69.226387, -51.1038896).with_description("Ilulissat")];
    let app = test_app(Default::default(), Default::default(), &seed).await;

    let (status, body) = get(app, "/api/random-drop").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lat"], 69.226387);
    assert_eq!(body["lng"], -51.1038896);
    assert_eq!(body["description"], "Ilulissat");
    assert!(body["id"].is_i64());
}

#[tokio::test]
async fn test_random_drop_on_empty_catalog_is_not_found() {
    let app = test_app(Default::default(), Default::default(), &[]).await;

    let (status, body) = get(app, "/api/random-drop").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "No locations found"}));
}

/// Real adapters against mock providers: the weather provider hangs past
/// the client timeout while the geocoder answers normally.
#[tokio::test]
async fn test_slow_weather_provider_does_not_suppress_geo() {
    let weather_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"main": {"temp": 1.0}}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&weather_server)
        .await;

    let geo_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/-?[0-9.]+,-?[0-9.]+\.json$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "FeatureCollection",
            "features": [
                {"id": "country.123", "text": "United States", "properties": {"short_code": "us"}}
            ]
        })))
        .expect(1)
        .mount(&geo_server)
        .await;

    let client = build_client(&UpstreamConfig {
        timeout_seconds: 1,
        connect_timeout_seconds: 1,
        ..UpstreamConfig::default()
    })
    .unwrap();
    let scanner = ScanAggregator::new(
        Arc::new(OpenWeatherClient::with_client(
            client.clone(),
            weather_server.uri(),
            Some("weather_key".to_string()),
        )),
        Arc::new(MapboxGeocoder::with_client(
            client,
            geo_server.uri(),
            Some("pk.test".to_string()),
        )),
    );
    let catalog = LocationCatalog::in_memory().await.unwrap();
    let app = web::app(AppState::new(scanner, catalog));

    let (status, body) = get(app, "/api/scan?lat=25.893521&lng=-80.132018").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weather"], Value::Null);
    assert_eq!(body["geo"]["countryCode"], "US");
    assert_eq!(body["geo"]["countryName"], "United States");
    assert_eq!(body["geo"]["regionName"], Value::Null);
}
