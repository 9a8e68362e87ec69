use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::NotificationConfig;
use crate::error::{MedtrackError, Result};

/// Push channel for a single pre-formatted message.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, chat_id: &str, message: &str) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct TelegramTransport {
    client: Client,
    bot_token: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramTransport {
    /// Returns `None` when push delivery is switched off or no token is set.
    pub fn from_config(config: &NotificationConfig) -> Result<Option<Self>> {
        if !config.push_enabled() {
            return Ok(None);
        }
        let bot_token = config
            .telegram_bot_token
            .clone()
            .ok_or_else(|| MedtrackError::Notification("Telegram bot token missing".to_string()))?;

        Self::new(&config.telegram_api_base, &bot_token, config.timeout_secs).map(Some)
    }

    pub fn new(base_url: &str, bot_token: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                MedtrackError::Notification(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            bot_token: bot_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn render(message: &str) -> String {
        format!(
            "<b>Medication update</b>\n\n{}\n\n<i>medtrack</i>",
            escape_html(message)
        )
    }
}

#[async_trait]
impl MessageTransport for TelegramTransport {
    async fn send(&self, chat_id: &str, message: &str) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text: Self::render(message),
            parse_mode: "HTML",
        };

        let resp = self
            .client
            .post(format!("{}/bot{}/sendMessage", self.base_url, self.bot_token))
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body: TelegramResponse = resp.json().await.map_err(|e| {
            MedtrackError::Notification(format!("Invalid Telegram response ({status}): {e}"))
        })?;

        if status.is_success() && body.ok {
            Ok(())
        } else {
            Err(MedtrackError::Notification(format!(
                "Telegram rejected message ({status}): {}",
                body.description.unwrap_or_default()
            )))
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
