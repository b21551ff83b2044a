// ── Automation run ──
//
// One linear pass: fetch weather, locate the sun, decide, command the
// awning, report. Weather failures divert into the fail-safe close; device
// failures abort with a best-effort alert.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::decision::{self, Decision};
use crate::error::{CoreError, DeviceError, FailSafeOutcome, WeatherError};
use crate::model::{DeviceState, Location, SunPosition, Thresholds, WeatherSnapshot};
use crate::notify;
use crate::port::{DeviceControl, Notifier, WeatherSource};
use crate::solar;

/// What a completed run observed and did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub weather: WeatherSnapshot,
    pub sun: SunPosition,
    pub decision: Decision,
    pub state_before: DeviceState,
    /// `None` in dry-run mode.
    pub state_after: Option<DeviceState>,
    pub notified: bool,
}

impl RunReport {
    /// Whether the device reported a different state after the command.
    pub fn state_changed(&self) -> bool {
        self.state_after
            .is_some_and(|after| after != self.state_before)
    }
}

/// Single-pass automation over a device, a weather source and an optional
/// notifier.
pub struct Automation<D, W, N> {
    device: D,
    weather: W,
    notifier: Option<N>,
    location: Location,
    thresholds: Thresholds,
    dry_run: bool,
}

impl<D, W, N> Automation<D, W, N>
where
    D: DeviceControl,
    W: WeatherSource,
    N: Notifier,
{
    pub fn new(device: D, weather: W, location: Location, thresholds: Thresholds) -> Self {
        Self {
            device,
            weather,
            notifier: None,
            location,
            thresholds,
            dry_run: false,
        }
    }

    pub fn with_notifier(mut self, notifier: Option<N>) -> Self {
        self.notifier = notifier;
        self
    }

    /// In dry-run mode the device is only read, never commanded, and no
    /// notifications are sent.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Execute one pass at `now`.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunReport, CoreError> {
        if self.dry_run {
            info!("running in dry-run mode (no awning control)");
        }
        info!(
            latitude = self.location.latitude(),
            longitude = self.location.longitude(),
            "location"
        );
        info!(
            max_cloud_cover_pct = self.thresholds.max_cloud_cover_pct,
            max_wind_mph = self.thresholds.max_wind_mph,
            min_sun_altitude_deg = self.thresholds.min_sun_altitude_deg,
            azimuth_min_deg = self.thresholds.azimuth_min_deg,
            azimuth_max_deg = self.thresholds.azimuth_max_deg,
            "thresholds"
        );
        if self.notifier.is_some() {
            info!("telegram notifications enabled");
        }

        info!("fetching weather data");
        let weather = match self.weather.fetch(&self.location).await {
            Ok(weather) => weather,
            Err(source) => {
                error!(error = %source, "weather fetch failed");
                let fail_safe = self.fail_safe(&source).await;
                return Err(CoreError::Weather { source, fail_safe });
            }
        };
        info!(
            cloud_cover_pct = weather.cloud_cover_pct,
            wind_speed_mph = weather.wind_speed_mph,
            precipitation_mm_per_hr = weather.precipitation_mm_per_hr,
            temperature_f = ?weather.temperature_f,
            observed = %weather.observation_time,
            "weather"
        );
        info!(
            sunrise = %weather.sunrise.clock_label(),
            sunset = %weather.sunset.clock_label(),
            "daytime window"
        );

        let sun = solar::position(&self.location, now);
        info!(
            azimuth_deg = format_args!("{:.1}", sun.azimuth_deg),
            altitude_deg = format_args!("{:.1}", sun.altitude_deg),
            "sun position"
        );

        let decision = decision::decide(&weather, &sun, now, &self.thresholds);
        info!(conditions = %decision.checklist(), "conditions");
        info!(should_open = decision.should_open, reason = %decision.reason, "decision");

        match self.apply(&weather, &sun, &decision).await {
            Ok((state_before, state_after, notified)) => {
                info!("automation complete");
                Ok(RunReport {
                    dry_run: self.dry_run,
                    weather,
                    sun,
                    decision,
                    state_before,
                    state_after,
                    notified,
                })
            }
            Err(err) => {
                error!(error = %err, "bond API error");
                self.notify(&notify::device_error(&err)).await;
                Err(err.into())
            }
        }
    }

    /// Read state, command per the decision, read state again.
    ///
    /// The command is sent even when the device already reports the target
    /// state.
    async fn apply(
        &self,
        weather: &WeatherSnapshot,
        sun: &SunPosition,
        decision: &Decision,
    ) -> Result<(DeviceState, Option<DeviceState>, bool), DeviceError> {
        let before = self.device.state().await?;
        info!(state = %before, "current awning state");

        if self.dry_run {
            info!(
                desired = if decision.should_open { "OPEN" } else { "CLOSED" },
                "would set awning"
            );
            info!("dry-run complete (no action taken)");
            return Ok((before, None, false));
        }

        if decision.should_open {
            info!("opening awning");
            self.device.open().await?;
            info!("awning set to OPEN");
        } else {
            info!("closing awning");
            self.device.close().await?;
            info!("awning set to CLOSED");
        }

        let after = self.device.state().await?;
        let notified = if after == before {
            false
        } else {
            info!(from = %before, to = %after, "awning state changed");
            let message = if decision.should_open {
                notify::opened(weather, sun)
            } else {
                notify::closed(&decision.reason)
            };
            self.notify(&message).await
        };
        Ok((before, Some(after), notified))
    }

    /// Close the awning when weather data is unavailable.
    ///
    /// Open and unknown states are both closed; only a reported `Closed`
    /// is left alone.
    async fn fail_safe(&self, cause: &WeatherError) -> FailSafeOutcome {
        if self.dry_run {
            info!("dry run: skipping fail-safe close");
            return FailSafeOutcome::Skipped;
        }
        warn!("attempting to close awning as fail-safe");

        let attempt: Result<bool, DeviceError> = async {
            match self.device.state().await? {
                DeviceState::Closed => Ok(false),
                state => {
                    info!(%state, "closing awning");
                    self.device.close().await?;
                    Ok(true)
                }
            }
        }
        .await;

        match attempt {
            Ok(true) => {
                info!("awning closed as fail-safe");
                self.notify(&notify::fail_safe_closed(cause)).await;
                FailSafeOutcome::Closed
            }
            Ok(false) => {
                info!("awning already closed, already safe");
                FailSafeOutcome::AlreadyClosed
            }
            Err(err) => {
                error!(error = %err, "fail-safe close failed");
                self.notify(&notify::fail_safe_failed(&err)).await;
                FailSafeOutcome::Failed(err.to_string())
            }
        }
    }

    /// Send a notification if enabled; failures are logged and swallowed.
    async fn notify(&self, message: &str) -> bool {
        if self.dry_run {
            return false;
        }
        let Some(notifier) = &self.notifier else {
            return false;
        };
        match notifier.notify(message).await {
            Ok(()) => {
                info!("telegram notification sent");
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to send telegram notification");
                false
            }
        }
    }
}
