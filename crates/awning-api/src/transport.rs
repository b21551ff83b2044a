// Shared transport configuration and response helpers.
//
// The Bond, Open-Meteo and Telegram clients all build their `reqwest::Client`
// and check responses through this module, avoiding duplicated builder and
// status-handling logic.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::Error;

const USER_AGENT: &str = concat!("awning/", env!("CARGO_PKG_VERSION"));

/// Longest response-body excerpt carried in error messages.
const BODY_PREVIEW_CHARS: usize = 200;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Config with an explicit per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}

/// Turn a non-success response into `Error::Status`, keeping a short body preview.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Status {
        status: status.as_u16(),
        message: preview(&body),
    })
}

/// Read the full body and decode it as JSON.
///
/// The body is read as text first, so a payload that is not JSON becomes
/// `Error::Deserialization`. A transfer cut short before `Content-Length`
/// fails inside `text()` as a reqwest decode error, which
/// [`Error::is_transient`] treats as retryable.
pub(crate) async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_ten_seconds() {
        assert_eq!(TransportConfig::default().timeout, Duration::from_secs(10));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), BODY_PREVIEW_CHARS);
    }
}
