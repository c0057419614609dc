//! The channel abstraction the worker dispatches through.

use std::future::Future;
use std::pin::Pin;

use frantoio_core::types::NotificationChannel;

use crate::error::NotifyResult;

/// A rendered message ready for one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Recipient override (email address). Chat channels deliver to the
    /// address configured on the sender and ignore this.
    pub recipient: Option<String>,
    /// Subject line (email only).
    pub subject: Option<String>,
    /// Message body: HTML for email, plain text for chat channels.
    pub body: String,
}

impl OutboundMessage {
    /// A plain-text message for the chat channels.
    pub fn text(body: impl Into<String>) -> Self {
        OutboundMessage {
            recipient: None,
            subject: None,
            body: body.into(),
        }
    }

    /// An email message.
    pub fn email(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body_html: impl Into<String>,
    ) -> Self {
        OutboundMessage {
            recipient: Some(recipient.into()),
            subject: Some(subject.into()),
            body: body_html.into(),
        }
    }
}

/// A delivery channel.
///
/// Object-safe so the worker can hold a heterogeneous set of channels;
/// implementations return a boxed future from `send`.
pub trait ChannelSender: Send + Sync {
    /// Which outbox channel this sender serves.
    fn channel(&self) -> NotificationChannel;

    /// Performs one delivery attempt.
    fn send<'a>(
        &'a self,
        message: &'a OutboundMessage,
    ) -> Pin<Box<dyn Future<Output = NotifyResult<()>> + Send + 'a>>;
}
