// Open-Meteo forecast client
//
// Fetches current conditions plus today's sunrise/sunset in imperial units,
// with timestamps in the location's own timezone (`timezone=auto`).

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::retry::RetryPolicy;
use crate::transport::{self, TransportConfig};

const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";
const FORECAST_PATH: &str = "v1/forecast";
const CURRENT_FIELDS: &str = "wind_speed_10m,precipitation,is_day,temperature_2m,cloud_cover";
const DAILY_FIELDS: &str = "sunrise,sunset";

// ── Wire types ──────────────────────────────────────────────────────

/// Raw forecast payload. Every field is optional so that presence checks
/// happen in [`ForecastResponse::into_conditions`] with precise errors.
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    utc_offset_seconds: Option<i32>,
    current: Option<RawCurrent>,
    daily: Option<RawDaily>,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    time: Option<String>,
    cloud_cover: Option<f64>,
    wind_speed_10m: Option<f64>,
    precipitation: Option<f64>,
    temperature_2m: Option<f64>,
    is_day: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawDaily {
    #[serde(default)]
    sunrise: Vec<String>,
    #[serde(default)]
    sunset: Vec<String>,
}

/// Validated current conditions for one location.
///
/// Timestamps are the source's civil-time strings (`YYYY-MM-DDTHH:MM`,
/// local to the location); `utc_offset_seconds` relates them to UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub cloud_cover_pct: f64,
    pub wind_speed_mph: f64,
    pub precipitation_mm: f64,
    pub temperature_f: f64,
    pub is_day: bool,
    pub time: String,
    pub sunrise: String,
    pub sunset: String,
    pub utc_offset_seconds: i32,
}

impl ForecastResponse {
    fn into_conditions(self) -> Result<CurrentConditions, Error> {
        let current = self.current.ok_or_else(|| Error::missing("current"))?;
        let daily = self.daily.ok_or_else(|| Error::missing("daily"))?;

        let cloud_cover_pct = current
            .cloud_cover
            .ok_or_else(|| Error::missing("current.cloud_cover"))?;
        let wind_speed_mph = current
            .wind_speed_10m
            .ok_or_else(|| Error::missing("current.wind_speed_10m"))?;
        let precipitation_mm = current
            .precipitation
            .ok_or_else(|| Error::missing("current.precipitation"))?;
        let temperature_f = current
            .temperature_2m
            .ok_or_else(|| Error::missing("current.temperature_2m"))?;

        let sunrise = daily
            .sunrise
            .into_iter()
            .next()
            .ok_or_else(|| Error::missing("daily.sunrise"))?;
        let sunset = daily
            .sunset
            .into_iter()
            .next()
            .ok_or_else(|| Error::missing("daily.sunset"))?;

        let utc_offset_seconds = self
            .utc_offset_seconds
            .ok_or_else(|| Error::missing("utc_offset_seconds"))?;

        Ok(CurrentConditions {
            cloud_cover_pct,
            wind_speed_mph,
            precipitation_mm,
            temperature_f,
            is_day: current.is_day.is_none_or(|flag| flag != 0),
            time: current.time.unwrap_or_else(|| "unknown".into()),
            sunrise,
            sunset,
            utc_offset_seconds,
        })
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// Client for the Open-Meteo forecast endpoint.
pub struct OpenMeteoClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl OpenMeteoClient {
    /// Client against the public Open-Meteo service.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(DEFAULT_BASE_URL)?;
        Ok(Self::with_client(transport.build_client()?, base_url))
    }

    /// Client with a pre-built `reqwest::Client` and a custom base URL.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            retry: RetryPolicy::weather(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn forecast_url(&self, latitude: f64, longitude: f64) -> Result<Url, Error> {
        let mut url = self.base_url.join(FORECAST_PATH)?;
        url.query_pairs_mut()
            .append_pair("latitude", &latitude.to_string())
            .append_pair("longitude", &longitude.to_string())
            .append_pair("current", CURRENT_FIELDS)
            .append_pair("daily", DAILY_FIELDS)
            .append_pair("wind_speed_unit", "mph")
            .append_pair("temperature_unit", "fahrenheit")
            .append_pair("timezone", "auto")
            .append_pair("forecast_days", "1");
        Ok(url)
    }

    /// Fetch current conditions for a coordinate.
    ///
    /// `GET /v1/forecast?latitude=..&longitude=..&current=..&daily=sunrise,sunset`
    ///
    /// Transport failures are retried; a response missing any required
    /// field fails with [`Error::MissingField`] without retrying.
    pub async fn fetch_current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, Error> {
        let url = self.forecast_url(latitude, longitude)?;
        debug!("GET {}", url);
        let raw: ForecastResponse = self
            .retry
            .run("weather GET", || {
                let request = self.http.get(url.clone());
                async move {
                    let resp = transport::check_status(request.send().await?).await?;
                    transport::read_json(resp).await
                }
            })
            .await?;
        raw.into_conditions()
    }
}
