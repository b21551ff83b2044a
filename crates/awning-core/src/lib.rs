// awning-core: Weather- and sun-driven awning control on top of awning-api.

pub mod adapter;
pub mod automation;
pub mod config;
pub mod decision;
pub mod error;
pub mod model;
pub mod notify;
pub mod port;
pub mod solar;

// ── Primary re-exports ──────────────────────────────────────────────
pub use automation::{Automation, RunReport};
pub use config::{AutomationConfig, BridgeConfig, NotifierConfig};
pub use decision::{Condition, Decision, decide};
pub use error::{ConfigurationError, CoreError, DeviceError, FailSafeOutcome, WeatherError};
pub use model::{DeviceState, Location, SourceTime, SunPosition, Thresholds, WeatherSnapshot};
pub use port::{DeviceControl, Notifier, WeatherSource};
