// ── Ports ──
//
// The seams the automation run depends on. Production implementations wrap
// the `awning-api` clients (see `adapter`); tests substitute in-memory fakes.

use std::future::Future;

use crate::error::{DeviceError, WeatherError};
use crate::model::{DeviceState, Location, WeatherSnapshot};

/// Commands and state reads for one awning.
pub trait DeviceControl {
    fn open(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn close(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn state(&self) -> impl Future<Output = Result<DeviceState, DeviceError>> + Send;
}

/// Current conditions at a location.
pub trait WeatherSource {
    fn fetch(
        &self,
        location: &Location,
    ) -> impl Future<Output = Result<WeatherSnapshot, WeatherError>> + Send;
}

/// Best-effort message delivery. Callers log and discard failures.
pub trait Notifier {
    fn notify(&self, message: &str) -> impl Future<Output = Result<(), awning_api::Error>> + Send;
}
