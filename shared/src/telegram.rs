//! Fire-and-forget Telegram notifications from the API over the Bot HTTP API.
//! The interactive bot lives in the `bot` crate; this only sends messages.

use anyhow::Result;
use tracing::warn;

use crate::config::TelegramConfig;

#[derive(Clone)]
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.bot_token.is_empty()
    }

    pub async fn send_to(&self, chat_id: i64, text: &str) -> Result<()> {
        if !self.is_configured() {
            return Ok(());
        }
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.config.bot_token
        );
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await?;
        if !response.status().is_success() {
            warn!("Telegram sendMessage failed with status {}", response.status());
        }
        Ok(())
    }

    /// Notify the operator chat; silently a no-op when not configured.
    pub async fn notify_admin(&self, text: &str) {
        let Some(chat_id) = self.config.admin_chat_id else {
            return;
        };
        if let Err(e) = self.send_to(chat_id, text).await {
            warn!("Admin notification failed: {}", e);
        }
    }

    /// Notify a linked user; errors are logged, never propagated.
    pub async fn notify_user(&self, chat_id: Option<i64>, text: &str) {
        let Some(chat_id) = chat_id else {
            return;
        };
        if let Err(e) = self.send_to(chat_id, text).await {
            warn!("User notification failed: {}", e);
        }
    }
}
