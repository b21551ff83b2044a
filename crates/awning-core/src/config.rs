// ── Runtime configuration ──
//
// Validated values the automation and the manual commands run with. They
// never touch disk; `awning-config` builds them from the environment.

use secrecy::SecretString;

use crate::model::{Location, Thresholds};

/// How to reach the awning through the Bond bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Hostname or IP of the bridge, optionally with `:port`.
    pub host: String,
    pub token: SecretString,
    pub device_id: String,
}

/// Telegram bot credentials. Present only when both values are set.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub bot_token: SecretString,
    pub chat_id: String,
}

/// Everything an automation run needs.
#[derive(Debug, Clone)]
pub struct AutomationConfig {
    pub bridge: BridgeConfig,
    pub location: Location,
    pub thresholds: Thresholds,
    pub notifier: Option<NotifierConfig>,
}
