//! # frantoio-notify: Notification Engine for Frantoio
//!
//! Delivers order notifications over email, Telegram, and WhatsApp using
//! the outbox pattern:
//!
//! 1. [`enqueue_order_event`] writes one outbox row per configured
//!    channel when an order changes state.
//! 2. [`worker::NotificationWorker`] polls due rows, renders the
//!    message, and hands it to the matching [`channel::ChannelSender`].
//! 3. Failures are retried with exponential backoff; after the maximum
//!    number of attempts a row is dead-lettered and surfaces in the
//!    admin back-office.
//!
//! Channels are thin HTTP JSON integrations; whichever ones are not
//! configured are simply never enqueued.

pub mod channel;
pub mod config;
pub mod email;
pub mod error;
pub mod telegram;
pub mod whatsapp;
pub mod worker;

pub use channel::{ChannelSender, OutboundMessage};
pub use config::NotifyConfig;
pub use error::{NotifyError, NotifyResult};
pub use worker::{NotificationWorker, WorkerHandle};

use frantoio_core::types::{NotificationChannel, NotificationEvent, Order};
use frantoio_db::{Database, DbResult};
use serde::{Deserialize, Serialize};

/// Template variables carried in an outbox row's JSON payload.
///
/// Frozen at enqueue time so a later order edit never rewrites an
/// already-queued message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    /// Customer display name.
    pub name: String,
    /// Customer email (recipient for the email channel).
    pub email: String,
    pub order_number: String,
    /// Formatted grand total, e.g. "€62.40".
    pub total: String,
    /// One-line summary for the chat channels.
    pub summary: String,
}

impl EventPayload {
    /// Builds the payload for an order event.
    pub fn for_order(event: NotificationEvent, order: &Order) -> Self {
        let total = order.total().to_string();
        let summary = match event {
            NotificationEvent::OrderPlaced => format!(
                "Nuovo ordine {} da {} — {}",
                order.order_number, order.customer_name, total
            ),
            NotificationEvent::OrderPaid => {
                format!("Ordine {} pagato — {}", order.order_number, total)
            }
            NotificationEvent::OrderShipped => {
                format!("Ordine {} spedito", order.order_number)
            }
        };

        EventPayload {
            name: order.customer_name.clone(),
            email: order.customer_email.clone(),
            order_number: order.order_number.clone(),
            total,
            summary,
        }
    }

    /// The `{{placeholder}}` variables for email template rendering.
    pub fn template_vars(&self) -> Vec<(&str, &str)> {
        vec![
            ("name", self.name.as_str()),
            ("order_number", self.order_number.as_str()),
            ("total", self.total.as_str()),
        ]
    }
}

/// The channels an event fans out to.
///
/// The owners want a ping on every new order; customers only get email.
fn channels_for_event(event: NotificationEvent) -> &'static [NotificationChannel] {
    match event {
        NotificationEvent::OrderPlaced => &[
            NotificationChannel::Email,
            NotificationChannel::Telegram,
            NotificationChannel::Whatsapp,
        ],
        NotificationEvent::OrderPaid => {
            &[NotificationChannel::Email, NotificationChannel::Telegram]
        }
        NotificationEvent::OrderShipped => &[NotificationChannel::Email],
    }
}

/// Enqueues an order event on every channel that is both relevant for
/// the event and configured.
pub async fn enqueue_order_event(
    db: &Database,
    config: &NotifyConfig,
    event: NotificationEvent,
    order: &Order,
) -> DbResult<()> {
    let payload = EventPayload::for_order(event, order);
    let payload_json = serde_json::to_string(&payload)?;

    for channel in channels_for_event(event) {
        if !config.channel_enabled(*channel) {
            continue;
        }
        db.notifications()
            .enqueue(
                &uuid::Uuid::new_v4().to_string(),
                event,
                *channel,
                &order.id,
                &payload_json,
            )
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use frantoio_core::types::{Address, OrderKind, OrderStatus, PaymentStatus};

    fn order() -> Order {
        let now = Utc::now();
        Order {
            id: "o1".into(),
            order_number: "FR-2026-00042".into(),
            kind: OrderKind::OneTime,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            customer_email: "anna@example.com".into(),
            customer_name: "Anna".into(),
            customer_phone: None,
            shipping_address: Address {
                line1: "Via Roma 1".into(),
                line2: None,
                city: "Firenze".into(),
                province: None,
                postal_code: "50100".into(),
                country: "IT".into(),
            },
            seller_code: None,
            subtotal_cents: 5550,
            shipping_cents: 690,
            vat_cents: 213,
            total_cents: 6240,
            total_weight_grams: 2700,
            checkout_session_id: None,
            notes: None,
            created_at: now,
            updated_at: now,
            paid_at: None,
        }
    }

    #[test]
    fn test_payload_for_order() {
        let payload = EventPayload::for_order(NotificationEvent::OrderPlaced, &order());
        assert_eq!(payload.total, "€62.40");
        assert!(payload.summary.contains("FR-2026-00042"));
        assert!(payload.summary.contains("Anna"));

        let vars = payload.template_vars();
        assert!(vars.contains(&("order_number", "FR-2026-00042")));
    }

    #[test]
    fn test_channel_fanout() {
        assert_eq!(channels_for_event(NotificationEvent::OrderPlaced).len(), 3);
        assert_eq!(channels_for_event(NotificationEvent::OrderShipped).len(), 1);
    }
}
