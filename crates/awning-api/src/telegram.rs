// Telegram Bot API client (sendMessage only)

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::retry::RetryPolicy;
use crate::transport::{self, TransportConfig};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends plain-text messages to one chat through a bot.
///
/// The request URL embeds the bot token, so it is never logged and is
/// stripped from transport errors.
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: Url,
    bot_token: SecretString,
    chat_id: String,
    retry: RetryPolicy,
}

impl TelegramClient {
    /// Client against the public Bot API, using the given (short) transport timeout.
    pub fn new(
        bot_token: SecretString,
        chat_id: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(DEFAULT_BASE_URL)?;
        Ok(Self::with_client(
            transport.build_client()?,
            base_url,
            bot_token,
            chat_id,
        ))
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        bot_token: SecretString,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url,
            bot_token,
            chat_id: chat_id.into(),
            retry: RetryPolicy::notification(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Send `text` to the configured chat.
    ///
    /// `POST /bot{token}/sendMessage` with `{chat_id, text}`
    pub async fn send_message(&self, text: &str) -> Result<(), Error> {
        // Bot tokens contain ':', so the path cannot go through `Url::join`.
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = Url::parse(&format!(
            "{base}/bot{}/sendMessage",
            self.bot_token.expose_secret()
        ))?;
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
        };
        debug!(chat_id = %self.chat_id, "POST sendMessage");
        self.retry
            .run("telegram sendMessage", || {
                let request = self.http.post(url.clone()).json(&body);
                async move {
                    let resp = request
                        .send()
                        .await
                        .map_err(|e| Error::Transport(e.without_url()))?;
                    transport::check_status(resp).await?;
                    Ok(())
                }
            })
            .await
    }
}
