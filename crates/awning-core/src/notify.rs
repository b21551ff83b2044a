// Notification message texts.

use std::fmt::Display;

use crate::model::{SunPosition, WeatherSnapshot};

pub fn opened(weather: &WeatherSnapshot, sun: &SunPosition) -> String {
    format!(
        "☀️ Awning OPENED\nWeather: {}% clouds, {} mph wind\nSun: {:.0}° azimuth, {:.0}° altitude",
        weather.cloud_cover_pct, weather.wind_speed_mph, sun.azimuth_deg, sun.altitude_deg
    )
}

pub fn closed(reason: &str) -> String {
    format!("🌙 Awning CLOSED\nReason: {reason}")
}

pub fn fail_safe_closed(cause: &impl Display) -> String {
    format!("⚠️ Awning CLOSED (fail-safe)\nWeather API error: {cause}")
}

pub fn fail_safe_failed(cause: &impl Display) -> String {
    format!("🚨 ALERT: Weather API failed AND fail-safe close failed!\n{cause}")
}

pub fn device_error(cause: &impl Display) -> String {
    format!("🚨 Bond API error: {cause}")
}
