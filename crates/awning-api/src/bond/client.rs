// Bond Bridge HTTP client
//
// Wraps `reqwest::Client` with Bond-specific URL construction, the
// `BOND-Token` header and the bridge retry policy. Endpoint methods live in
// `device.rs` as inherent methods to keep this module focused on transport.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::retry::RetryPolicy;
use crate::transport::{self, TransportConfig};

const TOKEN_HEADER: &str = "BOND-Token";

/// Raw HTTP client for a single device behind a Bond Bridge.
///
/// All requests target `{bridge}/v2/devices/{device_id}` and carry the
/// bridge token. Transient transport failures are retried according to the
/// client's [`RetryPolicy`]; HTTP status failures are returned immediately.
pub struct BondClient {
    http: reqwest::Client,
    device_url: Url,
    device_id: String,
    token: SecretString,
    retry: RetryPolicy,
}

impl BondClient {
    /// Create a client for `device_id` on the bridge at `host`
    /// (hostname or IP, optionally with `:port`).
    pub fn new(
        host: &str,
        token: SecretString,
        device_id: &str,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let bridge_url = Url::parse(&format!("http://{host}"))?;
        let http = transport.build_client()?;
        Self::with_client(http, &bridge_url, token, device_id)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// `bridge_url` is the bridge root, e.g. `http://192.168.1.100`.
    pub fn with_client(
        http: reqwest::Client,
        bridge_url: &Url,
        token: SecretString,
        device_id: &str,
    ) -> Result<Self, Error> {
        let base = bridge_url.as_str().trim_end_matches('/');
        let device_url = Url::parse(&format!("{base}/v2/devices/{device_id}"))?;
        Ok(Self {
            http,
            device_url,
            device_id: device_id.to_owned(),
            token,
            retry: RetryPolicy::bridge(),
        })
    }

    /// Replace the retry policy (tests use millisecond delays).
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The device this client controls.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// The device root URL.
    pub fn device_url(&self) -> &Url {
        &self.device_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a device-scoped URL: `{bridge}/v2/devices/{id}/{path}`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        if path.is_empty() {
            return Ok(self.device_url.clone());
        }
        let base = self.device_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get(&self, url: Url) -> Result<Value, Error> {
        debug!("GET {}", url);
        self.retry
            .run("bond GET", || {
                let request = self
                    .http
                    .get(url.clone())
                    .header(TOKEN_HEADER, self.token.expose_secret());
                async move {
                    let resp = transport::check_status(request.send().await?).await?;
                    transport::read_json(resp).await
                }
            })
            .await
    }

    /// Send a PUT request with an empty JSON object body.
    pub(crate) async fn put_empty(&self, url: Url) -> Result<(), Error> {
        debug!("PUT {}", url);
        self.retry
            .run("bond PUT", || {
                let request = self
                    .http
                    .put(url.clone())
                    .header(TOKEN_HEADER, self.token.expose_secret())
                    .json(&serde_json::json!({}));
                async move {
                    transport::check_status(request.send().await?).await?;
                    Ok(())
                }
            })
            .await
    }
}
