// ── Core error types ──
//
// Three failure classes drive three different recovery paths in the
// automation run: configuration problems abort before any device action,
// weather problems trigger the fail-safe first, device problems abort with
// an alert. Transport details stay inside the wrapped `awning_api::Error`.

use thiserror::Error;

/// Invalid location or threshold values.
///
/// Raised while building [`Location`](crate::Location) /
/// [`Thresholds`](crate::Thresholds); always fatal and never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("{name} must be a finite number, got: {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("{name} must be between {min} and {max}, got: {value}")]
    OutOfRange {
        name: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{name} must not be negative, got: {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("azimuth range is inverted: minimum {min}° is greater than maximum {max}°")]
    InvertedAzimuthRange { min: f64, max: f64 },
}

/// The weather source could not produce a complete snapshot.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Transport or HTTP failure after the client's retries were spent.
    #[error("Failed to fetch weather data: {0}")]
    Unavailable(#[source] awning_api::Error),

    /// The response lacked a required field.
    #[error("Weather API response missing '{field}'")]
    Malformed { field: String },

    /// A timestamp could not be parsed as civil time.
    #[error("Weather API returned an unparseable {field} timestamp: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },

    /// The reported UTC offset is outside what a timezone can be.
    #[error("Weather API returned an invalid UTC offset: {seconds}s")]
    InvalidOffset { seconds: i32 },
}

impl From<awning_api::Error> for WeatherError {
    fn from(err: awning_api::Error) -> Self {
        match err {
            awning_api::Error::MissingField { field } => Self::Malformed { field },
            other => Self::Unavailable(other),
        }
    }
}

/// A bridge call failed; `action` names the operation that was attempted.
#[derive(Debug, Error)]
#[error("{action} failed: {source}")]
pub struct DeviceError {
    pub action: &'static str,
    #[source]
    pub source: awning_api::Error,
}

impl DeviceError {
    pub fn new(action: &'static str, source: awning_api::Error) -> Self {
        Self { action, source }
    }
}

/// What the fail-safe did after a weather failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailSafeOutcome {
    /// The awning was open (or in an unknown state) and a close was sent.
    Closed,
    /// The awning already reported closed; nothing was sent.
    AlreadyClosed,
    /// Dry-run: the device was not touched.
    Skipped,
    /// Reading the state or sending the close failed.
    Failed(String),
}

impl std::fmt::Display for FailSafeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => f.write_str("awning closed as fail-safe"),
            Self::AlreadyClosed => f.write_str("awning already closed"),
            Self::Skipped => f.write_str("fail-safe skipped (dry run)"),
            Self::Failed(reason) => write!(f, "fail-safe close failed: {reason}"),
        }
    }
}

/// Unified error type for an automation run.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Weather API error: {source} ({fail_safe})")]
    Weather {
        #[source]
        source: WeatherError,
        fail_safe: FailSafeOutcome,
    },

    #[error("Bond API error: {0}")]
    Device(#[from] DeviceError),
}
