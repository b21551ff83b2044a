#![allow(clippy::unwrap_used)]
// Integration tests for `OpenMeteoClient` using wiremock.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use awning_api::{Error, OpenMeteoClient, RetryPolicy};

// ── Helpers ─────────────────────────────────────────────────────────

fn fast_retry() -> RetryPolicy {
    RetryPolicy::weather().with_delays(Duration::from_millis(1), Duration::from_millis(5))
}

async fn setup() -> (MockServer, OpenMeteoClient) {
    let server = MockServer::start().await;
    let client = OpenMeteoClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
    )
    .with_retry(fast_retry());
    (server, client)
}

/// Raw HTTP server that promises a 500-byte body, sends 11 bytes and hangs up.
///
/// Returns the base URL and a counter of requests served.
fn truncating_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap_or(0) > 0 && line != "\r\n" {
                line.clear();
            }
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 500\r\n\r\n{\"open\": 1,",
            );
        }
    });
    (base, hits)
}

fn forecast_body() -> serde_json::Value {
    json!({
        "latitude": 37.77,
        "longitude": -122.42,
        "utc_offset_seconds": -25200,
        "timezone": "America/Los_Angeles",
        "current": {
            "time": "2024-06-01T10:00",
            "interval": 900,
            "wind_speed_10m": 4.0,
            "precipitation": 0.0,
            "is_day": 1,
            "temperature_2m": 66.2,
            "cloud_cover": 10
        },
        "daily": {
            "time": ["2024-06-01"],
            "sunrise": ["2024-06-01T05:48"],
            "sunset": ["2024-06-01T20:29"]
        }
    })
}

// ── Fetch tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_current_sends_units_and_parses() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "37.77"))
        .and(query_param("longitude", "-122.42"))
        .and(query_param("wind_speed_unit", "mph"))
        .and(query_param("temperature_unit", "fahrenheit"))
        .and(query_param("timezone", "auto"))
        .and(query_param("daily", "sunrise,sunset"))
        .and(query_param("forecast_days", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let conditions = client.fetch_current(37.77, -122.42).await.unwrap();
    assert!((conditions.cloud_cover_pct - 10.0).abs() < f64::EPSILON);
    assert!((conditions.wind_speed_mph - 4.0).abs() < f64::EPSILON);
    assert_eq!(conditions.sunrise, "2024-06-01T05:48");
    assert_eq!(conditions.sunset, "2024-06-01T20:29");
    assert_eq!(conditions.utc_offset_seconds, -25200);
    assert!(conditions.is_day);
}

#[tokio::test]
async fn test_missing_field_is_not_retried() {
    let (server, client) = setup().await;

    let mut body = forecast_body();
    body["current"].as_object_mut().unwrap().remove("wind_speed_10m");

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.fetch_current(37.77, -122.42).await;
    assert!(
        matches!(&result, Err(Error::MissingField { field }) if field == "current.wind_speed_10m"),
        "expected MissingField, got: {result:?}"
    );
}

#[tokio::test]
async fn test_http_error_status_propagates() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": true, "reason": "Latitude must be in range" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client.fetch_current(137.0, 0.0).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("Latitude must be in range"));
}

#[tokio::test]
async fn test_timeout_retries_three_times() {
    let server = MockServer::start().await;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let client = OpenMeteoClient::with_client(http, Url::parse(&server.uri()).unwrap())
        .with_retry(fast_retry());

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body())
                .set_delay(Duration::from_millis(500)),
        )
        .expect(3)
        .mount(&server)
        .await;

    let err = client.fetch_current(37.77, -122.42).await.unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_truncated_body_retries_three_times() {
    let (base, hits) = truncating_server();
    let client = OpenMeteoClient::with_client(reqwest::Client::new(), Url::parse(&base).unwrap())
        .with_retry(fast_retry());

    let err = client.fetch_current(37.77, -122.42).await.unwrap_err();
    assert!(
        matches!(err, Error::Transport(_)) && err.is_transient(),
        "expected transient transport error, got: {err:?}"
    );
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}
