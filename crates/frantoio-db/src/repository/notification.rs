//! # Notification Outbox Repository
//!
//! Queue operations for the notification outbox.
//!
//! ## Outbox Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    notification_outbox Table                            │
//! │                                                                         │
//! │  enqueue ──► status=pending, next_attempt_at=now                       │
//! │                     │                                                   │
//! │                     ▼   (worker polls due_batch)                        │
//! │              deliver attempt                                            │
//! │                ├── ok ──────► mark_sent (status=sent, sent_at=now)     │
//! │                └── error ───► record_failure                            │
//! │                                 ├── attempts < max: pending,            │
//! │                                 │   next_attempt_at += backoff          │
//! │                                 └── attempts ≥ max: status=dead         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use frantoio_core::types::{
    NotificationChannel, NotificationEvent, NotificationOutboxEntry, NotificationStatus,
};

/// Maximum delivery attempts before a row is dead-lettered.
pub const MAX_DELIVERY_ATTEMPTS: i64 = 8;

/// Row shape of the `notification_outbox` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct OutboxRecord {
    id: String,
    event: String,
    channel: String,
    order_id: String,
    payload: String,
    status: String,
    attempts: i64,
    next_attempt_at: DateTime<Utc>,
    last_error: Option<String>,
    created_at: DateTime<Utc>,
    sent_at: Option<DateTime<Utc>>,
}

impl OutboxRecord {
    fn into_entry(self) -> DbResult<NotificationOutboxEntry> {
        Ok(NotificationOutboxEntry {
            id: self.id,
            event: self
                .event
                .parse::<NotificationEvent>()
                .map_err(DbError::InvalidValue)?,
            channel: self
                .channel
                .parse::<NotificationChannel>()
                .map_err(DbError::InvalidValue)?,
            order_id: self.order_id,
            payload: self.payload,
            status: self
                .status
                .parse::<NotificationStatus>()
                .map_err(DbError::InvalidValue)?,
            attempts: self.attempts,
            next_attempt_at: self.next_attempt_at,
            last_error: self.last_error,
            created_at: self.created_at,
            sent_at: self.sent_at,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, event, channel, order_id, payload, status, attempts,
           next_attempt_at, last_error, created_at, sent_at
    FROM notification_outbox
"#;

/// Repository for the notification outbox.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    /// Enqueues a notification for delivery as soon as possible.
    pub async fn enqueue(
        &self,
        id: &str,
        event: NotificationEvent,
        channel: NotificationChannel,
        order_id: &str,
        payload: &str,
    ) -> DbResult<()> {
        debug!(
            event = event.as_str(),
            channel = channel.as_str(),
            order_id = %order_id,
            "Enqueueing notification"
        );

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO notification_outbox (
                id, event, channel, order_id, payload, status,
                attempts, next_attempt_at, last_error, created_at, sent_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 'pending', 0, ?6, NULL, ?6, NULL)
            "#,
        )
        .bind(id)
        .bind(event.as_str())
        .bind(channel.as_str())
        .bind(order_id)
        .bind(payload)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches pending rows that are due for delivery, oldest first.
    pub async fn due_batch(&self, limit: u32) -> DbResult<Vec<NotificationOutboxEntry>> {
        let now = Utc::now();

        let records = sqlx::query_as::<_, OutboxRecord>(&format!(
            r#"{SELECT_COLUMNS}
            WHERE status = 'pending' AND next_attempt_at <= ?1
            ORDER BY created_at
            LIMIT ?2"#
        ))
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(OutboxRecord::into_entry).collect()
    }

    /// Marks a row as delivered.
    pub async fn mark_sent(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE notification_outbox SET status = 'sent', sent_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Notification", id));
        }

        Ok(())
    }

    /// Records a failed delivery attempt.
    ///
    /// Bumps the attempt counter and pushes `next_attempt_at` out by
    /// `retry_after`. Once [`MAX_DELIVERY_ATTEMPTS`] is reached the row
    /// is dead-lettered and surfaces in the admin back-office.
    pub async fn record_failure(
        &self,
        id: &str,
        error: &str,
        retry_after: Duration,
    ) -> DbResult<()> {
        let now = Utc::now();
        let next_attempt = now + retry_after;

        let result = sqlx::query(
            r#"
            UPDATE notification_outbox
            SET attempts = attempts + 1,
                last_error = ?2,
                next_attempt_at = ?3,
                status = CASE WHEN attempts + 1 >= ?4 THEN 'dead' ELSE 'pending' END
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(next_attempt)
        .bind(MAX_DELIVERY_ATTEMPTS)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Notification", id));
        }

        // Surface dead-letters in the log as soon as they happen
        let status: String =
            sqlx::query_scalar("SELECT status FROM notification_outbox WHERE id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if status == "dead" {
            warn!(id = %id, error = %error, "Notification dead-lettered");
        }

        Ok(())
    }

    /// Lists dead-lettered rows (admin back-office).
    pub async fn list_dead(&self, limit: u32) -> DbResult<Vec<NotificationOutboxEntry>> {
        let records = sqlx::query_as::<_, OutboxRecord>(&format!(
            "{SELECT_COLUMNS} WHERE status = 'dead' ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(OutboxRecord::into_entry).collect()
    }

    /// Counts pending rows (diagnostics).
    pub async fn pending_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notification_outbox WHERE status = 'pending'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::generate_id;
    use frantoio_core::types::{
        Address, Order, OrderItem, OrderKind, OrderStatus, PaymentStatus,
    };

    async fn seed_order(db: &Database) -> String {
        let now = Utc::now();
        let order_id = generate_id();
        let order = Order {
            id: order_id.clone(),
            order_number: "FR-2026-00001".to_string(),
            kind: OrderKind::OneTime,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            customer_email: "anna@example.com".to_string(),
            customer_name: "Anna".to_string(),
            customer_phone: None,
            shipping_address: Address {
                line1: "Via Roma 1".to_string(),
                line2: None,
                city: "Firenze".to_string(),
                province: None,
                postal_code: "50100".to_string(),
                country: "IT".to_string(),
            },
            seller_code: None,
            subtotal_cents: 1850,
            shipping_cents: 690,
            vat_cents: 71,
            total_cents: 2540,
            total_weight_grams: 900,
            checkout_session_id: None,
            notes: None,
            created_at: now,
            updated_at: now,
            paid_at: None,
        };
        let items = vec![OrderItem {
            id: generate_id(),
            order_id: order_id.clone(),
            product_id: "p1".to_string(),
            name: "Olio EVO 500ml".to_string(),
            unit_price_cents: 1850,
            quantity: 1,
            line_total_cents: 1850,
            weight_grams: 900,
        }];
        db.orders().insert(&order, &items).await.unwrap();
        order_id
    }

    #[tokio::test]
    async fn test_enqueue_and_due_batch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.notifications();
        let order_id = seed_order(&db).await;

        repo.enqueue(
            &generate_id(),
            NotificationEvent::OrderPlaced,
            NotificationChannel::Email,
            &order_id,
            r#"{"name":"Anna"}"#,
        )
        .await
        .unwrap();

        let due = repo.due_batch(10).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].event, NotificationEvent::OrderPlaced);
        assert_eq!(due[0].channel, NotificationChannel::Email);
        assert_eq!(repo.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_sent_removes_from_due() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.notifications();
        let order_id = seed_order(&db).await;

        let id = generate_id();
        repo.enqueue(
            &id,
            NotificationEvent::OrderPaid,
            NotificationChannel::Telegram,
            &order_id,
            "{}",
        )
        .await
        .unwrap();

        repo.mark_sent(&id).await.unwrap();
        assert!(repo.due_batch(10).await.unwrap().is_empty());
        assert_eq!(repo.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failure_backoff_delays_retry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.notifications();
        let order_id = seed_order(&db).await;

        let id = generate_id();
        repo.enqueue(
            &id,
            NotificationEvent::OrderPlaced,
            NotificationChannel::Whatsapp,
            &order_id,
            "{}",
        )
        .await
        .unwrap();

        repo.record_failure(&id, "timeout", Duration::minutes(5)).await.unwrap();

        // Not due yet, but still pending
        assert!(repo.due_batch(10).await.unwrap().is_empty());
        assert_eq!(repo.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dead_letter_after_max_attempts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.notifications();
        let order_id = seed_order(&db).await;

        let id = generate_id();
        repo.enqueue(
            &id,
            NotificationEvent::OrderPlaced,
            NotificationChannel::Email,
            &order_id,
            "{}",
        )
        .await
        .unwrap();

        for _ in 0..MAX_DELIVERY_ATTEMPTS {
            repo.record_failure(&id, "connection refused", Duration::zero())
                .await
                .unwrap();
        }

        let dead = repo.list_dead(10).await.unwrap();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].attempts, MAX_DELIVERY_ATTEMPTS);
        assert_eq!(dead[0].status, NotificationStatus::Dead);
        assert!(repo.due_batch(10).await.unwrap().is_empty());
    }
}
