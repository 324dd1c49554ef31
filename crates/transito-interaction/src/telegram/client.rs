//! Telegram Bot API client over plain HTTPS long polling.

use super::types::{
    AnswerCallbackQueryRequest, ApiResponse, GetUpdatesRequest, Update, split_message,
};
use crate::transport::{ChatTransport, IncomingUpdate};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::debug;
use transito_core::session::OutboundMessage;
use transito_core::{Result, TransitoError};

const BASE_URL: &str = "https://api.telegram.org";
/// Extra time granted to a long poll beyond the server-side timeout.
const POLL_GRACE: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    token: String,
    base_url: String,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Points the client at another Bot API server (a local one, or a test double).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Duration) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        // reqwest errors embed the URL, which carries the token.
        let response = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                TransitoError::transport(format!("{method} request failed: {}", err.without_url()))
            })?;

        let status = response.status();
        let parsed: ApiResponse<T> = response.json().await.map_err(|err| {
            TransitoError::transport(format!(
                "{method} returned unreadable body (HTTP {status}): {}",
                err.without_url()
            ))
        })?;

        if !parsed.ok {
            let retry = parsed
                .parameters
                .and_then(|p| p.retry_after)
                .map(|secs| format!(", retry after {secs}s"))
                .unwrap_or_default();
            return Err(TransitoError::transport(format!(
                "{method} failed with {}: {}{retry}",
                parsed.error_code.unwrap_or(status.as_u16()),
                parsed.description.unwrap_or_else(|| "no description".into()),
            )));
        }

        parsed
            .result
            .ok_or_else(|| TransitoError::transport(format!("{method} returned no result")))
    }

    pub async fn get_updates(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: ["message", "callback_query"],
        };
        self.call("getUpdates", &request, timeout + POLL_GRACE).await
    }

    pub async fn send_message(&self, message: &OutboundMessage) -> Result<()> {
        for request in split_message(message) {
            let _: serde_json::Value = self
                .call("sendMessage", &request, REQUEST_TIMEOUT)
                .await?;
        }
        debug!(chat_id = message.chat_id, "Message sent");
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        let request = AnswerCallbackQueryRequest {
            callback_query_id: callback_id,
        };
        let _: bool = self
            .call("answerCallbackQuery", &request, REQUEST_TIMEOUT)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn poll(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<IncomingUpdate>> {
        let updates = self.get_updates(offset, timeout).await?;
        Ok(updates.into_iter().map(IncomingUpdate::from).collect())
    }

    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        self.send_message(message).await
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<()> {
        self.answer_callback_query(callback_id).await
    }
}
