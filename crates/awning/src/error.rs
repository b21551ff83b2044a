//! CLI error types with miette diagnostics.
//!
//! Maps config, device and weather failures into user-facing errors with
//! actionable help text. Every variant ends the process with exit status 1.

use miette::Diagnostic;
use thiserror::Error;

use awning_config::ConfigError;
use awning_core::{CoreError, DeviceError, FailSafeOutcome, WeatherError};

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(awning::config),
        help(
            "Settings are read from the environment and from a .env file in the\n\
             working directory or next to the awning executable.\n\
             Use --env-file to load a specific file."
        )
    )]
    Config(#[from] ConfigError),

    // ── Bridge ───────────────────────────────────────────────────────

    #[error("Bond API error: {0}")]
    #[diagnostic(
        code(awning::device),
        help(
            "Check that the bridge is reachable at BOND_HOST and that\n\
             BOND_TOKEN and DEVICE_ID are correct."
        )
    )]
    Device(#[from] DeviceError),

    // ── Weather ──────────────────────────────────────────────────────

    #[error("Weather API error: {source}")]
    #[diagnostic(code(awning::weather), help("Fail-safe: {fail_safe}"))]
    Weather {
        #[source]
        source: WeatherError,
        fail_safe: FailSafeOutcome,
    },

    // ── Setup ────────────────────────────────────────────────────────

    #[error("Could not set up the HTTP client")]
    #[diagnostic(code(awning::client))]
    ClientSetup(#[source] awning_api::Error),

    #[error("Could not open log directory {dir}")]
    #[diagnostic(
        code(awning::logging),
        help("Pass a writable directory with --log-dir.")
    )]
    LogSetup {
        dir: String,
        #[source]
        source: tracing_appender::rolling::InitError,
    },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON output: {0}")]
    #[diagnostic(code(awning::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML output: {0}")]
    #[diagnostic(code(awning::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Weather { source, fail_safe } => Self::Weather { source, fail_safe },
            CoreError::Device(err) => Self::Device(err),
        }
    }
}
