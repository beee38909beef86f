//! Notification delivery for alerts

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TelegramConfig;
use crate::error::{Error, Result};

/// Delivers a formatted alert message
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one message; no retry on failure
    async fn send(&self, text: &str) -> Result<()>;
}

/// Build the low-balance alert text (Telegram HTML subset)
pub fn format_alert_message(balance_usd: f64, admin_address: &str) -> String {
    format!(
        "‼ Oracle admin balance too low: <b>${balance_usd:.2}</b>\n\
         Top up address <code>{admin_address}</code>"
    )
}

/// Sends messages through the Telegram Bot API `sendMessage` method
pub struct TelegramNotifier {
    client: Client,
    api_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier
    pub fn new(client: Client, config: &TelegramConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let payload = SendMessagePayload {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        // The URL carries the bot token; keep it out of error messages
        let response = self
            .client
            .post(self.send_message_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::notification(e.without_url().to_string()))?;

        let status = response.status();
        let body: Option<TelegramResponse> = response.json().await.ok();

        match body {
            Some(TelegramResponse { ok: true, .. }) if status.is_success() => {
                info!(chat_id = %self.chat_id, "Telegram notification sent");
                Ok(())
            }
            Some(TelegramResponse { description, .. }) => Err(Error::notification(format!(
                "Telegram returned {}: {}",
                status,
                description.unwrap_or_default()
            ))),
            None => Err(Error::notification(format!(
                "Telegram returned {status} with an unreadable body"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}
