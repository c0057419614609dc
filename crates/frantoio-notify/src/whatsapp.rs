//! WhatsApp channel.
//!
//! Posts order pings to the shop's admin number via the Cloud API
//! messages endpoint (bearer-token auth, text message type).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use frantoio_core::types::NotificationChannel;

use crate::channel::{ChannelSender, OutboundMessage};
use crate::config::WhatsAppConfig;
use crate::error::{NotifyError, NotifyResult};

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    message_type: &'static str,
    text: TextBody<'a>,
}

/// WhatsApp Cloud API sender.
pub struct WhatsAppSender {
    client: Client,
    config: WhatsAppConfig,
}

impl WhatsAppSender {
    /// Creates a new WhatsApp sender.
    pub fn new(config: WhatsAppConfig) -> NotifyResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(WhatsAppSender { client, config })
    }

    async fn deliver(&self, message: &OutboundMessage) -> NotifyResult<()> {
        debug!(to = %self.config.to_number, "Sending WhatsApp message");

        let request = SendMessageRequest {
            messaging_product: "whatsapp",
            to: &self.config.to_number,
            message_type: "text",
            text: TextBody {
                body: &message.body,
            },
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                channel: "whatsapp",
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

impl ChannelSender for WhatsAppSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Whatsapp
    }

    fn send<'a>(
        &'a self,
        message: &'a OutboundMessage,
    ) -> Pin<Box<dyn Future<Output = NotifyResult<()>> + Send + 'a>> {
        Box::pin(self.deliver(message))
    }
}
