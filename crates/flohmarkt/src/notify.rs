use reqwest::Client;
use serde::Serialize;

use crate::config::{Config, Credentials};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram rejected the message: {0}")]
    Rejected(String),
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Posts messages to a single Telegram chat through the Bot API.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    credentials: Credentials,
}

impl TelegramNotifier {
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self, SendError> {
        let client = Client::builder().timeout(config.send_timeout).build()?;

        Ok(Self::with_client(client, credentials))
    }

    pub fn with_client(client: Client, credentials: Credentials) -> Self {
        Self {
            client,
            api_base: TELEGRAM_API_BASE.to_string(),
            credentials,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.credentials.bot_token
        )
    }

    /// Sends `text` as Markdown. Exactly one request is made; failures are not retried.
    pub async fn send_message(&self, text: &str) -> Result<serde_json::Value, SendError> {
        let payload = SendMessage {
            chat_id: &self.credentials.chat_id,
            text,
            parse_mode: "Markdown",
        };

        log::info!("Sending digest to chat {}", self.credentials.chat_id);
        let response: serde_json::Value = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .json()
            .await?;

        if response.get("ok").and_then(|ok| ok.as_bool()) == Some(false) {
            let description = response
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or("no description")
                .to_string();
            return Err(SendError::Rejected(description));
        }

        Ok(response)
    }
}
