//! Transactional email channel.
//!
//! Thin wrapper over a Resend-style HTTP API: one POST per message,
//! bearer-token auth, JSON body with from/to/subject/html.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use frantoio_core::types::NotificationChannel;

use crate::channel::{ChannelSender, OutboundMessage};
use crate::config::EmailConfig;
use crate::error::{NotifyError, NotifyResult};

/// Request body of the provider's send endpoint.
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Transactional email sender.
pub struct EmailSender {
    client: Client,
    config: EmailConfig,
}

impl EmailSender {
    /// Creates a new email sender.
    pub fn new(config: EmailConfig) -> NotifyResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(EmailSender { client, config })
    }

    async fn deliver(&self, message: &OutboundMessage) -> NotifyResult<()> {
        let to = message
            .recipient
            .as_deref()
            .ok_or_else(|| NotifyError::InvalidPayload("email without recipient".into()))?;
        let subject = message.subject.as_deref().unwrap_or("Frantoio");

        debug!(to = %to, subject = %subject, "Sending email");

        let request = SendEmailRequest {
            from: &self.config.from,
            to,
            subject,
            html: &message.body,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                channel: "email",
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

impl ChannelSender for EmailSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    fn send<'a>(
        &'a self,
        message: &'a OutboundMessage,
    ) -> Pin<Box<dyn Future<Output = NotifyResult<()>> + Send + 'a>> {
        Box::pin(self.deliver(message))
    }
}
