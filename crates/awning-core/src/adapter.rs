// ── Adapters ──
//
// Port implementations over the `awning-api` HTTP clients, plus the client
// constructors with their per-service timeouts.

use std::time::Duration;

use awning_api::{BondClient, OpenMeteoClient, TelegramClient, TransportConfig};

use crate::config::{BridgeConfig, NotifierConfig};
use crate::error::{DeviceError, WeatherError};
use crate::model::{DeviceState, Location, WeatherSnapshot};
use crate::port::{DeviceControl, Notifier, WeatherSource};

const DEVICE_TIMEOUT: Duration = Duration::from_secs(10);
const WEATHER_TIMEOUT: Duration = Duration::from_secs(10);
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

impl BridgeConfig {
    /// Build the bridge client for this device.
    pub fn client(&self) -> Result<BondClient, awning_api::Error> {
        BondClient::new(
            &self.host,
            self.token.clone(),
            &self.device_id,
            &TransportConfig::with_timeout(DEVICE_TIMEOUT),
        )
    }
}

impl NotifierConfig {
    pub fn client(&self) -> Result<TelegramClient, awning_api::Error> {
        TelegramClient::new(
            self.bot_token.clone(),
            self.chat_id.clone(),
            &TransportConfig::with_timeout(NOTIFY_TIMEOUT),
        )
    }
}

/// Open-Meteo client with the weather timeout.
pub fn weather_client() -> Result<OpenMeteoClient, awning_api::Error> {
    OpenMeteoClient::new(&TransportConfig::with_timeout(WEATHER_TIMEOUT))
}

impl DeviceControl for BondClient {
    async fn open(&self) -> Result<(), DeviceError> {
        BondClient::open(self)
            .await
            .map_err(|e| DeviceError::new("open", e))
    }

    async fn close(&self) -> Result<(), DeviceError> {
        BondClient::close(self)
            .await
            .map_err(|e| DeviceError::new("close", e))
    }

    async fn state(&self) -> Result<DeviceState, DeviceError> {
        self.get_state()
            .await
            .map(DeviceState::from_code)
            .map_err(|e| DeviceError::new("get state", e))
    }
}

impl WeatherSource for OpenMeteoClient {
    async fn fetch(&self, location: &Location) -> Result<WeatherSnapshot, WeatherError> {
        let conditions = self
            .fetch_current(location.latitude(), location.longitude())
            .await?;
        WeatherSnapshot::try_from(conditions)
    }
}

impl Notifier for TelegramClient {
    async fn notify(&self, message: &str) -> Result<(), awning_api::Error> {
        self.send_message(message).await
    }
}
