//! Configuration for the awning tools.
//!
//! Settings come from environment variables, optionally seeded by a `.env`
//! file. Layering is `defaults < .env file < process environment`, merged
//! with figment, then validated into `awning_core` config types. Nothing
//! here mutates the process environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use figment::{Figment, providers::Serialized};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use awning_core::{
    AutomationConfig, BridgeConfig, ConfigurationError, Location, NotifierConfig, Thresholds,
};

const ENV_FILE_NAME: &str = ".env";

/// Every variable the tools read, in the order they are documented.
pub const VARIABLES: &[&str] = &[
    "BOND_HOST",
    "BOND_TOKEN",
    "DEVICE_ID",
    "LATITUDE",
    "LONGITUDE",
    "WIND_SPEED_THRESHOLD_MPH",
    "MIN_SUN_ALTITUDE_DEG",
    "MAX_CLOUD_COVER_PERCENT",
    "SUN_AZIMUTH_MIN_DEG",
    "SUN_AZIMUTH_MAX_DEG",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
    "LOG_RETENTION_DAYS",
];

/// Daily log files kept when `LOG_RETENTION_DAYS` is unset.
pub const DEFAULT_LOG_RETENTION_DAYS: usize = 30;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} environment variable is not set. Please add it to your .env file (e.g., {var}={example})")]
    Missing {
        var: &'static str,
        example: &'static str,
    },

    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error(".env file not found: {}", path.display())]
    EnvFileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error(transparent)]
    Domain(#[from] ConfigurationError),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Raw layered settings ────────────────────────────────────────────

/// Values as strings, exactly as they appeared in the environment.
///
/// Typed parsing happens in the accessors so that each failure can name
/// the variable it came from.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    bond_host: Option<String>,
    bond_token: Option<String>,
    device_id: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    wind_speed_threshold_mph: Option<String>,
    min_sun_altitude_deg: Option<String>,
    max_cloud_cover_percent: Option<String>,
    sun_azimuth_min_deg: Option<String>,
    sun_azimuth_max_deg: Option<String>,
    telegram_bot_token: Option<String>,
    telegram_chat_id: Option<String>,
    log_retention_days: Option<String>,
}

/// Values used when a variable is set nowhere.
fn default_vars() -> BTreeMap<String, String> {
    let (azimuth_min, azimuth_max) = Thresholds::DEFAULT_AZIMUTH_RANGE;
    BTreeMap::from([
        ("sun_azimuth_min_deg".to_owned(), azimuth_min.to_string()),
        ("sun_azimuth_max_deg".to_owned(), azimuth_max.to_string()),
        (
            "log_retention_days".to_owned(),
            DEFAULT_LOG_RETENTION_DAYS.to_string(),
        ),
    ])
}

/// Keep only known variables with non-blank values, keyed the way
/// `RawSettings` field names are spelled.
fn known_vars<I>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    pairs
        .into_iter()
        .filter(|(key, _)| VARIABLES.contains(&key.as_str()))
        .filter_map(|(key, value)| {
            let value = value.trim();
            (!value.is_empty()).then(|| (key.to_ascii_lowercase(), value.to_owned()))
        })
        .collect()
}

// ── .env discovery ──────────────────────────────────────────────────

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    BaseDirs::new().map_or_else(|| path.to_path_buf(), |dirs| dirs.home_dir().join(rest))
}

/// Pick the `.env` file to load.
///
/// An explicit path must exist. Without one, `./.env` is tried, then
/// `.env` next to the executable; finding neither is not an error.
pub fn discover_env_file(
    explicit: Option<&Path>,
    cwd: &Path,
    exe_dir: Option<&Path>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        let path = expand_home(path);
        return if path.is_file() {
            Ok(Some(path))
        } else {
            Err(ConfigError::EnvFileNotFound { path })
        };
    }
    Ok(std::iter::once(cwd)
        .chain(exe_dir)
        .map(|dir| dir.join(ENV_FILE_NAME))
        .find(|candidate| candidate.is_file()))
}

fn read_env_file(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    let wrap = |source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };
    dotenvy::from_path_iter(path)
        .map_err(wrap)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(wrap)
}

// ── Parsing helpers ─────────────────────────────────────────────────

fn required<'a>(
    value: Option<&'a str>,
    var: &'static str,
    example: &'static str,
) -> Result<&'a str, ConfigError> {
    value.ok_or(ConfigError::Missing { var, example })
}

fn parse_number(value: &str, var: &'static str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::Invalid {
        var,
        reason: format!("expected a decimal number, got '{value}'"),
    })
}

fn required_number(
    value: Option<&str>,
    var: &'static str,
    example: &'static str,
) -> Result<f64, ConfigError> {
    parse_number(required(value, var, example)?, var)
}

// ── Settings ────────────────────────────────────────────────────────

/// Layered settings, ready to be validated into runtime config.
#[derive(Debug)]
pub struct Settings {
    raw: RawSettings,
    env_file: Option<PathBuf>,
}

impl Settings {
    /// Load from the process environment plus the discovered `.env` file.
    pub fn load(explicit_env_file: Option<&Path>) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let env_file = discover_env_file(explicit_env_file, &cwd, exe_dir.as_deref())?;
        let environment = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        Self::from_sources(env_file, environment)
    }

    /// Build from an already-chosen `.env` file and an explicit environment.
    pub fn from_sources<I>(env_file: Option<PathBuf>, environment: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let dotfile = match &env_file {
            Some(path) => known_vars(read_env_file(path)?),
            None => BTreeMap::new(),
        };

        let raw: RawSettings = Figment::new()
            .merge(Serialized::defaults(default_vars()))
            .merge(Serialized::globals(dotfile))
            .merge(Serialized::globals(known_vars(environment)))
            .extract()?;

        Ok(Self { raw, env_file })
    }

    /// The `.env` file that was loaded, if any.
    pub fn env_file(&self) -> Option<&Path> {
        self.env_file.as_deref()
    }

    /// Bridge connection settings; all that manual commands need.
    pub fn bridge(&self) -> Result<BridgeConfig, ConfigError> {
        let host = required(self.raw.bond_host.as_deref(), "BOND_HOST", "192.168.1.100")?;
        let token = required(self.raw.bond_token.as_deref(), "BOND_TOKEN", "abc123")?;
        let device_id = required(self.raw.device_id.as_deref(), "DEVICE_ID", "12345678")?;
        Ok(BridgeConfig {
            host: host.to_owned(),
            token: SecretString::from(token.to_owned()),
            device_id: device_id.to_owned(),
        })
    }

    pub fn location(&self) -> Result<Location, ConfigError> {
        let latitude = required_number(self.raw.latitude.as_deref(), "LATITUDE", "37.7749")?;
        let longitude = required_number(self.raw.longitude.as_deref(), "LONGITUDE", "-122.4194")?;
        Ok(Location::new(latitude, longitude)?)
    }

    pub fn thresholds(&self) -> Result<Thresholds, ConfigError> {
        let wind = required_number(
            self.raw.wind_speed_threshold_mph.as_deref(),
            "WIND_SPEED_THRESHOLD_MPH",
            "10",
        )?;
        let altitude = required_number(
            self.raw.min_sun_altitude_deg.as_deref(),
            "MIN_SUN_ALTITUDE_DEG",
            "20",
        )?;
        let cloud = required_number(
            self.raw.max_cloud_cover_percent.as_deref(),
            "MAX_CLOUD_COVER_PERCENT",
            "5",
        )?;
        let azimuth_min =
            required_number(self.raw.sun_azimuth_min_deg.as_deref(), "SUN_AZIMUTH_MIN_DEG", "90")?;
        let azimuth_max =
            required_number(self.raw.sun_azimuth_max_deg.as_deref(), "SUN_AZIMUTH_MAX_DEG", "180")?;

        Ok(Thresholds::new(cloud, wind, altitude)?.with_azimuth_range(azimuth_min, azimuth_max)?)
    }

    /// Telegram settings when both the token and the chat id are set.
    pub fn notifier(&self) -> Option<NotifierConfig> {
        match (&self.raw.telegram_bot_token, &self.raw.telegram_chat_id) {
            (Some(token), Some(chat_id)) => Some(NotifierConfig {
                bot_token: SecretString::from(token.clone()),
                chat_id: chat_id.clone(),
            }),
            _ => None,
        }
    }

    /// Everything an automation run needs, fully validated.
    pub fn automation(&self) -> Result<AutomationConfig, ConfigError> {
        Ok(AutomationConfig {
            location: self.location()?,
            thresholds: self.thresholds()?,
            bridge: self.bridge()?,
            notifier: self.notifier(),
        })
    }

    /// How many daily log files to keep.
    pub fn log_retention_days(&self) -> Result<usize, ConfigError> {
        let value = required(self.raw.log_retention_days.as_deref(), "LOG_RETENTION_DAYS", "30")?;
        match value.parse::<usize>() {
            Ok(days) if days > 0 => Ok(days),
            _ => Err(ConfigError::Invalid {
                var: "LOG_RETENTION_DAYS",
                reason: format!("expected a positive whole number of days, got '{value}'"),
            }),
        }
    }
}
