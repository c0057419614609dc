//! # Notification Worker
//!
//! Polls the notification outbox and delivers due rows to the
//! configured channels.
//!
//! ## Delivery Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Worker Loop                                          │
//! │                                                                         │
//! │  every poll_interval:                                                   │
//! │    1. Poll: due_batch(batch_size)                                       │
//! │    2. Per row: parse payload, render message                            │
//! │       ├── email: template from DB, {{placeholder}} substitution        │
//! │       └── chat: payload summary line                                    │
//! │    3. Send via ChannelSender                                            │
//! │       (short in-process backoff smooths transient blips)                │
//! │    4. Ok   → mark_sent                                                  │
//! │       Err  → record_failure (attempts += 1, next_attempt_at pushed     │
//! │              out exponentially, dead-letter at the cap)                │
//! │                                                                         │
//! │  TIMING:                                                                │
//! │  • Poll interval: 5 seconds (configurable)                              │
//! │  • Batch size: 50 rows (configurable)                                   │
//! │  • Max attempts: 8 (then dead-lettered)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use frantoio_core::types::{NotificationChannel, NotificationOutboxEntry};
use frantoio_db::Database;

use crate::channel::{ChannelSender, OutboundMessage};
use crate::config::NotifyConfig;
use crate::email::EmailSender;
use crate::error::{NotifyError, NotifyResult};
use crate::telegram::TelegramSender;
use crate::whatsapp::WhatsAppSender;
use crate::EventPayload;

/// In-process retry window for a single delivery attempt. Longer
/// outages are handled by the outbox schedule, not by blocking the
/// worker loop.
const SEND_RETRY_WINDOW: Duration = Duration::from_secs(20);

/// Delay before the next outbox attempt, doubling per failure.
///
/// 1 min, 2 min, 4 min ... capped at 64 minutes.
fn retry_delay(attempts: i64) -> chrono::Duration {
    let exp = attempts.clamp(0, 6) as u32;
    chrono::Duration::minutes(1i64 << exp)
}

// =============================================================================
// Worker
// =============================================================================

/// Polls the outbox and delivers notifications.
pub struct NotificationWorker {
    db: Database,
    senders: Vec<Box<dyn ChannelSender>>,
    poll_interval: Duration,
    batch_size: u32,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for controlling the worker.
#[derive(Clone)]
pub struct WorkerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl WorkerHandle {
    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl NotificationWorker {
    /// Creates a worker with senders built from the configuration.
    pub fn new(db: Database, config: &NotifyConfig) -> NotifyResult<(Self, WorkerHandle)> {
        let mut senders: Vec<Box<dyn ChannelSender>> = Vec::new();

        if let Some(email) = &config.email {
            senders.push(Box::new(EmailSender::new(email.clone())?));
        }
        if let Some(telegram) = &config.telegram {
            senders.push(Box::new(TelegramSender::new(telegram.clone())?));
        }
        if let Some(whatsapp) = &config.whatsapp {
            senders.push(Box::new(WhatsAppSender::new(whatsapp.clone())?));
        }

        Ok(Self::with_senders(
            db,
            senders,
            config.poll_interval,
            config.batch_size,
        ))
    }

    /// Creates a worker with explicit senders (tests use recording fakes).
    pub fn with_senders(
        db: Database,
        senders: Vec<Box<dyn ChannelSender>>,
        poll_interval: Duration,
        batch_size: u32,
    ) -> (Self, WorkerHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = NotificationWorker {
            db,
            senders,
            poll_interval,
            batch_size,
            shutdown_rx,
        };

        (worker, WorkerHandle { shutdown_tx })
    }

    /// Runs the worker loop. Spawn this as a background task.
    pub async fn run(mut self) {
        info!(
            channels = self.senders.len(),
            poll_secs = self.poll_interval.as_secs(),
            "Notification worker started"
        );

        let mut tick = interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if let Err(e) = self.process_once().await {
                        error!(?e, "Outbox poll failed");
                    }
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Notification worker shutting down");
                    break;
                }
            }
        }
    }

    /// Processes one batch of due rows. Returns the number delivered.
    pub async fn process_once(&self) -> NotifyResult<usize> {
        let due = self.db.notifications().due_batch(self.batch_size).await?;
        if due.is_empty() {
            return Ok(0);
        }

        debug!(count = due.len(), "Processing due notifications");

        let mut delivered = 0;
        for entry in due {
            match self.deliver(&entry).await {
                Ok(()) => {
                    self.db.notifications().mark_sent(&entry.id).await?;
                    delivered += 1;
                }
                Err(e) => {
                    warn!(
                        id = %entry.id,
                        channel = entry.channel.as_str(),
                        attempts = entry.attempts,
                        error = %e,
                        "Notification delivery failed"
                    );
                    self.db
                        .notifications()
                        .record_failure(&entry.id, &e.to_string(), retry_delay(entry.attempts))
                        .await?;
                }
            }
        }

        Ok(delivered)
    }

    /// Delivers one entry: render, pick the sender, send with a short
    /// in-process backoff for transient failures.
    async fn deliver(&self, entry: &NotificationOutboxEntry) -> NotifyResult<()> {
        let sender = self
            .senders
            .iter()
            .find(|s| s.channel() == entry.channel)
            .ok_or_else(|| {
                NotifyError::ChannelNotConfigured(entry.channel.as_str().to_string())
            })?;

        let message = self.render(entry).await?;

        let policy = backoff::ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(500))
            .with_max_elapsed_time(Some(SEND_RETRY_WINDOW))
            .build();

        backoff::future::retry(policy, || async {
            sender.send(&message).await.map_err(|e| {
                if e.is_transient() {
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .await
    }

    /// Renders the outbound message for an entry.
    ///
    /// Email bodies come from the admin-editable templates; if the
    /// template is missing the message falls back to a minimal built-in
    /// text rather than blocking the queue.
    async fn render(&self, entry: &NotificationOutboxEntry) -> NotifyResult<OutboundMessage> {
        let payload: EventPayload = serde_json::from_str(&entry.payload)
            .map_err(|e| NotifyError::InvalidPayload(e.to_string()))?;

        match entry.channel {
            NotificationChannel::Email => {
                let template = self
                    .db
                    .content()
                    .get_template_by_key(entry.event.template_key())
                    .await?;

                let (subject, body) = match template {
                    Some(t) => (
                        t.render_subject(&payload.template_vars()),
                        t.render_body(&payload.template_vars()),
                    ),
                    None => {
                        warn!(
                            key = entry.event.template_key(),
                            "Email template missing, using fallback"
                        );
                        (
                            format!("Ordine {}", payload.order_number),
                            format!("<p>{}</p>", payload.summary),
                        )
                    }
                };

                Ok(OutboundMessage::email(payload.email, subject, body))
            }
            NotificationChannel::Telegram | NotificationChannel::Whatsapp => {
                Ok(OutboundMessage::text(payload.summary))
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};

    use frantoio_core::types::{
        Address, NotificationEvent, Order, OrderItem, OrderKind, OrderStatus, PaymentStatus,
    };
    use frantoio_db::DbConfig;

    /// Recording fake: collects messages, optionally fails every send.
    struct FakeSender {
        channel: NotificationChannel,
        sent: Arc<Mutex<Vec<OutboundMessage>>>,
        fail: bool,
    }

    impl ChannelSender for FakeSender {
        fn channel(&self) -> NotificationChannel {
            self.channel
        }

        fn send<'a>(
            &'a self,
            message: &'a OutboundMessage,
        ) -> Pin<Box<dyn Future<Output = NotifyResult<()>> + Send + 'a>> {
            Box::pin(async move {
                if self.fail {
                    return Err(NotifyError::Api {
                        channel: "fake",
                        status: 401,
                        body: "bad token".into(),
                    });
                }
                self.sent.lock().unwrap().push(message.clone());
                Ok(())
            })
        }
    }

    async fn seed_order(db: &Database) -> Order {
        let now = Utc::now();
        let order_id = uuid::Uuid::new_v4().to_string();
        let order = Order {
            id: order_id.clone(),
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
        };
        let items = vec![OrderItem {
            id: uuid::Uuid::new_v4().to_string(),
            order_id,
            product_id: "p1".into(),
            name: "Olio EVO 500ml".into(),
            unit_price_cents: 1850,
            quantity: 3,
            line_total_cents: 5550,
            weight_grams: 900,
        }];
        db.orders().insert(&order, &items).await.unwrap();
        order
    }

    fn worker_with(
        db: Database,
        senders: Vec<Box<dyn ChannelSender>>,
    ) -> NotificationWorker {
        let (worker, _handle) =
            NotificationWorker::with_senders(db, senders, Duration::from_secs(1), 50);
        worker
    }

    #[test]
    fn test_retry_delay_doubles_and_caps() {
        assert_eq!(retry_delay(0), chrono::Duration::minutes(1));
        assert_eq!(retry_delay(1), chrono::Duration::minutes(2));
        assert_eq!(retry_delay(3), chrono::Duration::minutes(8));
        assert_eq!(retry_delay(6), chrono::Duration::minutes(64));
        assert_eq!(retry_delay(100), chrono::Duration::minutes(64));
    }

    #[tokio::test]
    async fn test_delivers_email_with_template() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db).await;

        db.content()
            .upsert_template(
                "order_placed",
                "Ordine {{order_number}} ricevuto",
                "<p>Grazie {{name}}, totale {{total}}.</p>",
            )
            .await
            .unwrap();

        let mut config = NotifyConfig::disabled();
        config.email = Some(crate::config::EmailConfig {
            api_url: "http://unused".into(),
            api_key: "unused".into(),
            from: "Frantoio <ordini@example.com>".into(),
        });
        crate::enqueue_order_event(&db, &config, NotificationEvent::OrderPlaced, &order)
            .await
            .unwrap();

        let sent = Arc::new(Mutex::new(Vec::new()));
        let worker = worker_with(
            db.clone(),
            vec![Box::new(FakeSender {
                channel: NotificationChannel::Email,
                sent: sent.clone(),
                fail: false,
            })],
        );

        let delivered = worker.process_once().await.unwrap();
        assert_eq!(delivered, 1);

        let messages = sent.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipient.as_deref(), Some("anna@example.com"));
        assert_eq!(
            messages[0].subject.as_deref(),
            Some("Ordine FR-2026-00042 ricevuto")
        );
        assert!(messages[0].body.contains("totale €62.40"));

        assert_eq!(db.notifications().pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_chat_channels_get_summary_text() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db).await;

        let mut config = NotifyConfig::disabled();
        config.telegram = Some(crate::config::TelegramConfig {
            bot_token: "t".into(),
            chat_id: "-1".into(),
        });
        crate::enqueue_order_event(&db, &config, NotificationEvent::OrderPlaced, &order)
            .await
            .unwrap();

        let sent = Arc::new(Mutex::new(Vec::new()));
        let worker = worker_with(
            db.clone(),
            vec![Box::new(FakeSender {
                channel: NotificationChannel::Telegram,
                sent: sent.clone(),
                fail: false,
            })],
        );

        worker.process_once().await.unwrap();

        let messages = sent.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].recipient.is_none());
        assert!(messages[0].body.contains("Nuovo ordine FR-2026-00042"));
    }

    #[tokio::test]
    async fn test_permanent_failure_is_recorded_not_lost() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db).await;

        let mut config = NotifyConfig::disabled();
        config.telegram = Some(crate::config::TelegramConfig {
            bot_token: "t".into(),
            chat_id: "-1".into(),
        });
        crate::enqueue_order_event(&db, &config, NotificationEvent::OrderPaid, &order)
            .await
            .unwrap();

        let worker = worker_with(
            db.clone(),
            vec![Box::new(FakeSender {
                channel: NotificationChannel::Telegram,
                sent: Arc::new(Mutex::new(Vec::new())),
                fail: true,
            })],
        );

        let delivered = worker.process_once().await.unwrap();
        assert_eq!(delivered, 0);

        // Still pending, attempt recorded, scheduled for later
        assert_eq!(db.notifications().pending_count().await.unwrap(), 1);
        assert!(db.notifications().due_batch(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_channel_rows_fail_gracefully() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db).await;

        // Row enqueued for whatsapp, but the worker only has email
        db.notifications()
            .enqueue(
                &uuid::Uuid::new_v4().to_string(),
                NotificationEvent::OrderPlaced,
                NotificationChannel::Whatsapp,
                &order.id,
                &serde_json::to_string(&EventPayload::for_order(
                    NotificationEvent::OrderPlaced,
                    &order,
                ))
                .unwrap(),
            )
            .await
            .unwrap();

        let worker = worker_with(
            db.clone(),
            vec![Box::new(FakeSender {
                channel: NotificationChannel::Email,
                sent: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            })],
        );

        let delivered = worker.process_once().await.unwrap();
        assert_eq!(delivered, 0);

        let dead_or_pending = db.notifications().pending_count().await.unwrap();
        assert_eq!(dead_or_pending, 1);
    }

    #[tokio::test]
    async fn test_enqueue_skips_disabled_channels() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = seed_order(&db).await;

        // Only telegram configured: OrderPlaced fans out to 1 row, not 3
        let mut config = NotifyConfig::disabled();
        config.telegram = Some(crate::config::TelegramConfig {
            bot_token: "t".into(),
            chat_id: "-1".into(),
        });

        crate::enqueue_order_event(&db, &config, NotificationEvent::OrderPlaced, &order)
            .await
            .unwrap();

        assert_eq!(db.notifications().pending_count().await.unwrap(), 1);
    }
}
