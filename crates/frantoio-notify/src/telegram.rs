//! Telegram channel.
//!
//! Posts order pings to the owners' group chat via the Bot API
//! `sendMessage` method.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use frantoio_core::types::NotificationChannel;

use crate::channel::{ChannelSender, OutboundMessage};
use crate::config::TelegramConfig;
use crate::error::{NotifyError, NotifyResult};

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Telegram Bot API sender.
pub struct TelegramSender {
    client: Client,
    config: TelegramConfig,
}

impl TelegramSender {
    /// Creates a new Telegram sender.
    pub fn new(config: TelegramConfig) -> NotifyResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(TelegramSender { client, config })
    }

    fn send_url(&self) -> String {
        format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.config.bot_token
        )
    }

    async fn deliver(&self, message: &OutboundMessage) -> NotifyResult<()> {
        debug!(chat_id = %self.config.chat_id, "Sending Telegram message");

        let request = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text: &message.body,
        };

        let response = self
            .client
            .post(self.send_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                channel: "telegram",
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

impl ChannelSender for TelegramSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Telegram
    }

    fn send<'a>(
        &'a self,
        message: &'a OutboundMessage,
    ) -> Pin<Box<dyn Future<Output = NotifyResult<()>> + Send + 'a>> {
        Box::pin(self.deliver(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_url_embeds_token() {
        let sender = TelegramSender::new(TelegramConfig {
            bot_token: "123:abc".into(),
            chat_id: "-100456".into(),
        })
        .unwrap();

        assert_eq!(
            sender.send_url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }
}
