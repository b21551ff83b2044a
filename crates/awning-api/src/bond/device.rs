// Bond device endpoints
//
// Actions (`PUT .../actions/{Action}`), state and device metadata.

use serde_json::Value;
use tracing::debug;

use crate::bond::client::BondClient;
use crate::error::Error;

/// Actions understood by a Bond shade / awning device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondAction {
    Open,
    Close,
    Stop,
    ToggleOpen,
}

impl BondAction {
    /// Action name as it appears in the URL path.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Close => "Close",
            Self::Stop => "Stop",
            Self::ToggleOpen => "ToggleOpen",
        }
    }
}

impl std::fmt::Display for BondAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BondClient {
    /// Send an action to the device.
    ///
    /// `PUT /v2/devices/{id}/actions/{action}` with body `{}`
    pub async fn send_action(&self, action: BondAction) -> Result<(), Error> {
        let url = self.url(&format!("actions/{}", action.as_str()))?;
        debug!(device = self.device_id(), %action, "sending action");
        self.put_empty(url).await
    }

    pub async fn open(&self) -> Result<(), Error> {
        self.send_action(BondAction::Open).await
    }

    pub async fn close(&self) -> Result<(), Error> {
        self.send_action(BondAction::Close).await
    }

    pub async fn stop(&self) -> Result<(), Error> {
        self.send_action(BondAction::Stop).await
    }

    pub async fn toggle(&self) -> Result<(), Error> {
        self.send_action(BondAction::ToggleOpen).await
    }

    /// Read the raw `open` state code.
    ///
    /// `GET /v2/devices/{id}/state`
    ///
    /// Returns `None` when the payload has no integer `open` field; the
    /// caller decides what an indeterminate state means.
    pub async fn get_state(&self) -> Result<Option<i64>, Error> {
        let url = self.url("state")?;
        let state = self.get(url).await?;
        Ok(state.get("open").and_then(Value::as_i64))
    }

    /// Fetch device metadata.
    ///
    /// `GET /v2/devices/{id}`
    ///
    /// Loosely typed: the field set varies by device template and bridge
    /// firmware.
    pub async fn get_info(&self) -> Result<Value, Error> {
        let url = self.url("")?;
        self.get(url).await
    }
}
