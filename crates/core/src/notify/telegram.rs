use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use super::traits::Notifier;
use crate::errors::CoreError;

/// Per-delivery request timeout. A hung transport call must not stall the
/// monitoring cycle for longer than this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram Bot API notification transport.
///
/// Configured from `TELEGRAM_TOKEN` / `TELEGRAM_CHAT_ID`; when either is
/// missing the notifier is disabled and `deliver` becomes a no-op, so the
/// monitor can run without a configured transport.
pub struct TelegramNotifier {
    client: Option<Client>,
    token: Option<String>,
    chat_id: Option<String>,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: Some(build_client()),
            token: Some(token.into()),
            chat_id: Some(chat_id.into()),
        }
    }

    pub fn from_env() -> Self {
        let token = std::env::var("TELEGRAM_TOKEN").ok();
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok();

        let client = if token.is_some() && chat_id.is_some() {
            Some(build_client())
        } else {
            None
        };

        Self {
            client,
            token,
            chat_id,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.client.is_some() && self.token.is_some() && self.chat_id.is_some()
    }
}

fn build_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "Telegram"
    }

    async fn deliver(&self, text: &str) -> Result<(), CoreError> {
        let (client, token, chat_id) = match (&self.client, &self.token, &self.chat_id) {
            (Some(client), Some(token), Some(chat_id)) => (client, token, chat_id),
            _ => {
                debug!("Telegram notifier disabled — dropping message");
                return Ok(());
            }
        };

        let url = format!("https://api.telegram.org/bot{token}/sendMessage");
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });

        let response = client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CoreError::Delivery {
                transport: "Telegram".into(),
                // Error messages must not echo the request URL: it embeds
                // the bot token.
                message: if e.is_timeout() {
                    "request timed out".into()
                } else {
                    "request failed".into()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Delivery {
                transport: "Telegram".into(),
                message: format!("API returned status {status}"),
            });
        }

        debug!("Telegram notification delivered");
        Ok(())
    }
}
