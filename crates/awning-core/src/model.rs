// ── Domain model ──
//
// Everything here is built fresh for each run and never persisted.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Serialize;

use crate::error::{ConfigurationError, WeatherError};

fn require_finite(name: &'static str, value: f64) -> Result<f64, ConfigurationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigurationError::NotFinite { name, value })
    }
}

fn require_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, ConfigurationError> {
    let value = require_finite(name, value)?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigurationError::OutOfRange {
            name,
            min,
            max,
            value,
        })
    }
}

// ── Location ────────────────────────────────────────────────────────

/// A validated geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ConfigurationError> {
        Ok(Self {
            latitude: require_range("latitude", latitude, -90.0, 90.0)?,
            longitude: require_range("longitude", longitude, -180.0, 180.0)?,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

// ── Thresholds ──────────────────────────────────────────────────────

/// Limits the decision engine compares measurements against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    /// Highest cloud cover (%) still counted as clear, inclusive.
    pub max_cloud_cover_pct: f64,
    /// Wind speed (mph) at or above which it is too windy.
    pub max_wind_mph: f64,
    /// Lowest sun altitude (degrees) worth shading against.
    pub min_sun_altitude_deg: f64,
    /// Compass bearing range the awning faces, inclusive on both ends.
    pub azimuth_min_deg: f64,
    pub azimuth_max_deg: f64,
}

impl Thresholds {
    /// East through south, the orientation of a south-east facing awning.
    pub const DEFAULT_AZIMUTH_RANGE: (f64, f64) = (90.0, 180.0);

    /// Thresholds with the default azimuth range.
    pub fn new(
        max_cloud_cover_pct: f64,
        max_wind_mph: f64,
        min_sun_altitude_deg: f64,
    ) -> Result<Self, ConfigurationError> {
        let (azimuth_min_deg, azimuth_max_deg) = Self::DEFAULT_AZIMUTH_RANGE;
        Self {
            max_cloud_cover_pct,
            max_wind_mph,
            min_sun_altitude_deg,
            azimuth_min_deg,
            azimuth_max_deg,
        }
        .validated()
    }

    /// Replace the azimuth range, re-validating.
    pub fn with_azimuth_range(
        self,
        min_deg: f64,
        max_deg: f64,
    ) -> Result<Self, ConfigurationError> {
        Self {
            azimuth_min_deg: min_deg,
            azimuth_max_deg: max_deg,
            ..self
        }
        .validated()
    }

    fn validated(self) -> Result<Self, ConfigurationError> {
        require_range("max cloud cover", self.max_cloud_cover_pct, 0.0, 100.0)?;
        let wind = require_finite("wind speed threshold", self.max_wind_mph)?;
        if wind < 0.0 {
            return Err(ConfigurationError::Negative {
                name: "wind speed threshold",
                value: wind,
            });
        }
        require_range("minimum sun altitude", self.min_sun_altitude_deg, 0.0, 90.0)?;
        require_range("azimuth minimum", self.azimuth_min_deg, 0.0, 360.0)?;
        require_range("azimuth maximum", self.azimuth_max_deg, 0.0, 360.0)?;
        if self.azimuth_min_deg > self.azimuth_max_deg {
            return Err(ConfigurationError::InvertedAzimuthRange {
                min: self.azimuth_min_deg,
                max: self.azimuth_max_deg,
            });
        }
        Ok(self)
    }
}

// ── Weather ─────────────────────────────────────────────────────────

/// A timestamp as the weather source reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SourceTime {
    /// Civil time at the location, no offset attached.
    Local(NaiveDateTime),
    /// Explicit offset (or `Z`) supplied by the source.
    Offset(DateTime<FixedOffset>),
}

impl SourceTime {
    /// Parse `YYYY-MM-DDTHH:MM[:SS]` with an optional `Z` / `±HH:MM` suffix.
    pub fn parse(raw: &str) -> Option<Self> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self::Offset(dt));
        }
        ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(Self::Local)
    }

    /// Wall-clock reading in whatever zone the source used.
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            Self::Local(naive) => *naive,
            Self::Offset(dt) => dt.naive_local(),
        }
    }

    /// `HH:MM`, as shown in reasons and logs.
    pub fn clock_label(&self) -> String {
        self.naive_local().format("%H:%M").to_string()
    }
}

/// One validated observation from the weather source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub cloud_cover_pct: f64,
    pub wind_speed_mph: f64,
    pub precipitation_mm_per_hr: f64,
    /// `None` disables the above-freezing check. The Open-Meteo adapter
    /// treats `temperature_2m` as required, so it always fills this in;
    /// `None` only comes from other [`WeatherSource`](crate::WeatherSource)
    /// implementations.
    pub temperature_f: Option<f64>,
    pub is_day: bool,
    /// Source observation timestamp, informational only.
    pub observation_time: String,
    pub sunrise: SourceTime,
    pub sunset: SourceTime,
    #[serde(serialize_with = "offset_seconds")]
    pub utc_offset: FixedOffset,
}

fn offset_seconds<S: serde::Serializer>(offset: &FixedOffset, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i32(offset.local_minus_utc())
}

impl TryFrom<awning_api::CurrentConditions> for WeatherSnapshot {
    type Error = WeatherError;

    fn try_from(raw: awning_api::CurrentConditions) -> Result<Self, Self::Error> {
        let sunrise = SourceTime::parse(&raw.sunrise).ok_or_else(|| {
            WeatherError::InvalidTimestamp {
                field: "sunrise",
                value: raw.sunrise.clone(),
            }
        })?;
        let sunset =
            SourceTime::parse(&raw.sunset).ok_or_else(|| WeatherError::InvalidTimestamp {
                field: "sunset",
                value: raw.sunset.clone(),
            })?;
        let utc_offset = FixedOffset::east_opt(raw.utc_offset_seconds).ok_or(
            WeatherError::InvalidOffset {
                seconds: raw.utc_offset_seconds,
            },
        )?;

        Ok(Self {
            cloud_cover_pct: raw.cloud_cover_pct,
            wind_speed_mph: raw.wind_speed_mph,
            precipitation_mm_per_hr: raw.precipitation_mm,
            temperature_f: Some(raw.temperature_f),
            is_day: raw.is_day,
            observation_time: raw.time,
            sunrise,
            sunset,
            utc_offset,
        })
    }
}

// ── Sun ─────────────────────────────────────────────────────────────

/// Apparent sun position seen from the ground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunPosition {
    /// Compass bearing in `[0, 360)`, 0 = north, clockwise.
    pub azimuth_deg: f64,
    /// Refraction-corrected elevation; negative below the horizon.
    pub altitude_deg: f64,
}

// ── Device ──────────────────────────────────────────────────────────

/// Awning position as reported by the bridge's `open` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    Open,
    Closed,
    /// Missing or unrecognised code; never treated as open or closed.
    Unknown(Option<i64>),
}

impl DeviceState {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => Self::Open,
            Some(0) => Self::Closed,
            other => Self::Unknown(other),
        }
    }
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => f.write_str("OPEN"),
            Self::Closed => f.write_str("CLOSED"),
            Self::Unknown(Some(code)) => write!(f, "unknown (open={code})"),
            Self::Unknown(None) => f.write_str("unknown"),
        }
    }
}
