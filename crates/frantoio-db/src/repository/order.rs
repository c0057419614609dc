//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Order Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Insert Flow                                 │
//! │                                                                         │
//! │  BEGIN TRANSACTION                                                      │
//! │    ├── next order number ("FR-2026-00042")                             │
//! │    ├── INSERT INTO orders                                               │
//! │    ├── INSERT INTO order_items (one per line)                           │
//! │    └── optional stock decrement per tracked product                     │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Either the whole order exists, or none of it does.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Datelike, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use frantoio_core::types::{Address, Order, OrderItem, OrderKind, OrderStatus, PaymentStatus};

/// Row shape of the `orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderRecord {
    id: String,
    order_number: String,
    kind: String,
    status: String,
    payment_status: String,
    customer_email: String,
    customer_name: String,
    customer_phone: Option<String>,
    shipping_address: String,
    seller_code: Option<String>,
    subtotal_cents: i64,
    shipping_cents: i64,
    vat_cents: i64,
    total_cents: i64,
    total_weight_grams: i64,
    checkout_session_id: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl OrderRecord {
    fn into_order(self) -> DbResult<Order> {
        let shipping_address: Address = serde_json::from_str(&self.shipping_address)?;

        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            kind: self.kind.parse::<OrderKind>().map_err(DbError::InvalidValue)?,
            status: self
                .status
                .parse::<OrderStatus>()
                .map_err(DbError::InvalidValue)?,
            payment_status: self
                .payment_status
                .parse::<PaymentStatus>()
                .map_err(DbError::InvalidValue)?,
            customer_email: self.customer_email,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            shipping_address,
            seller_code: self.seller_code,
            subtotal_cents: self.subtotal_cents,
            shipping_cents: self.shipping_cents,
            vat_cents: self.vat_cents,
            total_cents: self.total_cents,
            total_weight_grams: self.total_weight_grams,
            checkout_session_id: self.checkout_session_id,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
            paid_at: self.paid_at,
        })
    }
}

/// Row shape of the `order_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderItemRecord {
    id: String,
    order_id: String,
    product_id: String,
    name: String,
    unit_price_cents: i64,
    quantity: i64,
    line_total_cents: i64,
    weight_grams: i64,
}

impl From<OrderItemRecord> for OrderItem {
    fn from(r: OrderItemRecord) -> Self {
        OrderItem {
            id: r.id,
            order_id: r.order_id,
            product_id: r.product_id,
            name: r.name,
            unit_price_cents: r.unit_price_cents,
            quantity: r.quantity,
            line_total_cents: r.line_total_cents,
            weight_grams: r.weight_grams,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, order_number, kind, status, payment_status,
           customer_email, customer_name, customer_phone, shipping_address,
           seller_code, subtotal_cents, shipping_cents, vat_cents, total_cents,
           total_weight_grams, checkout_session_id, notes,
           created_at, updated_at, paid_at
    FROM orders
"#;

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Allocates the next order number for the current year.
    ///
    /// Format: `FR-<year>-<sequence>`, e.g. `FR-2026-00042`. The UNIQUE
    /// constraint on `order_number` is the backstop against the narrow
    /// race between counting and inserting.
    pub async fn next_order_number(&self) -> DbResult<String> {
        let year = Utc::now().year();
        let prefix = format!("FR-{year}-%");

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_number LIKE ?1")
                .bind(&prefix)
                .fetch_one(&self.pool)
                .await?;

        Ok(format!("FR-{year}-{:05}", count + 1))
    }

    /// Inserts an order with its line items in a single transaction.
    pub async fn insert(&self, order: &Order, items: &[OrderItem]) -> DbResult<()> {
        debug!(order_number = %order.order_number, lines = items.len(), "Inserting order");

        let address_json = serde_json::to_string(&order.shipping_address)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, kind, status, payment_status,
                customer_email, customer_name, customer_phone, shipping_address,
                seller_code, subtotal_cents, shipping_cents, vat_cents, total_cents,
                total_weight_grams, checkout_session_id, notes,
                created_at, updated_at, paid_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                      ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(order.kind.as_str())
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(&order.customer_email)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&address_json)
        .bind(&order.seller_code)
        .bind(order.subtotal_cents)
        .bind(order.shipping_cents)
        .bind(order.vat_cents)
        .bind(order.total_cents)
        .bind(order.total_weight_grams)
        .bind(&order.checkout_session_id)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.paid_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, name,
                    unit_price_cents, quantity, line_total_cents, weight_grams
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.unit_price_cents)
            .bind(item.quantity)
            .bind(item.line_total_cents)
            .bind(item.weight_grams)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        record.map(OrderRecord::into_order).transpose()
    }

    /// Gets an order by its business number.
    pub async fn get_by_order_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "{SELECT_COLUMNS} WHERE order_number = ?1"
        ))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        record.map(OrderRecord::into_order).transpose()
    }

    /// Gets the order attached to a payment checkout session.
    pub async fn get_by_checkout_session(&self, session_id: &str) -> DbResult<Option<Order>> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "{SELECT_COLUMNS} WHERE checkout_session_id = ?1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(OrderRecord::into_order).transpose()
    }

    /// Lists orders newest-first, paged.
    pub async fn list(&self, limit: u32, offset: u32) -> DbResult<Vec<Order>> {
        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(OrderRecord::into_order).collect()
    }

    /// Lists orders in a given status, newest-first.
    pub async fn list_by_status(&self, status: OrderStatus, limit: u32) -> DbResult<Vec<Order>> {
        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            "{SELECT_COLUMNS} WHERE status = ?1 ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(status.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(OrderRecord::into_order).collect()
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Fetches the line items of an order.
    pub async fn items_for_order(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let records = sqlx::query_as::<_, OrderItemRecord>(
            r#"
            SELECT id, order_id, product_id, name,
                   unit_price_cents, quantity, line_total_cents, weight_grams
            FROM order_items
            WHERE order_id = ?1
            ORDER BY name
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(OrderItem::from).collect())
    }

    /// Updates an order's fulfilment status.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<()> {
        debug!(id = %id, status = %status.as_str(), "Updating order status");

        let now = Utc::now();

        let result =
            sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(status.as_str())
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    /// Stores the checkout session id on a freshly created order.
    pub async fn set_checkout_session(&self, id: &str, session_id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE orders SET checkout_session_id = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(session_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    /// Marks an order paid: payment status, fulfilment status, and
    /// `paid_at` move together.
    ///
    /// Idempotent: a webhook redelivery for an already-paid order is a
    /// no-op, not an error.
    pub async fn mark_paid(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Marking order paid");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = 'paid', status = 'paid', paid_at = ?2, updated_at = ?2
            WHERE id = ?1 AND payment_status = 'unpaid'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish "missing" from "already paid"
            let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
            if exists == 0 {
                return Err(DbError::not_found("Order", id));
            }
        }

        Ok(())
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

    fn sample_order(order_number: &str) -> (Order, Vec<OrderItem>) {
        let now = Utc::now();
        let order_id = generate_id();
        let order = Order {
            id: order_id.clone(),
            order_number: order_number.to_string(),
            kind: OrderKind::OneTime,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            customer_email: "anna@example.com".to_string(),
            customer_name: "Anna Bianchi".to_string(),
            customer_phone: None,
            shipping_address: Address {
                line1: "Via Roma 1".to_string(),
                line2: None,
                city: "Firenze".to_string(),
                province: Some("FI".to_string()),
                postal_code: "50100".to_string(),
                country: "IT".to_string(),
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
            id: generate_id(),
            order_id,
            product_id: "p1".to_string(),
            name: "Olio EVO 500ml".to_string(),
            unit_price_cents: 1850,
            quantity: 3,
            line_total_cents: 5550,
            weight_grams: 900,
        }];
        (order, items)
    }

    #[tokio::test]
    async fn test_insert_and_fetch_with_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let (order, items) = sample_order("FR-2026-00001");
        repo.insert(&order, &items).await.unwrap();

        let stored = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.order_number, "FR-2026-00001");
        assert_eq!(stored.shipping_address.city, "Firenze");
        assert_eq!(stored.status, OrderStatus::Pending);

        let stored_items = repo.items_for_order(&order.id).await.unwrap();
        assert_eq!(stored_items.len(), 1);
        assert_eq!(stored_items[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_next_order_number_sequence() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let first = repo.next_order_number().await.unwrap();
        assert!(first.ends_with("-00001"));

        let (order, items) = sample_order(&first);
        repo.insert(&order, &items).await.unwrap();

        let second = repo.next_order_number().await.unwrap();
        assert!(second.ends_with("-00002"));
    }

    #[tokio::test]
    async fn test_mark_paid_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let (order, items) = sample_order("FR-2026-00001");
        repo.insert(&order, &items).await.unwrap();

        repo.mark_paid(&order.id).await.unwrap();
        let paid = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.status, OrderStatus::Paid);
        let first_paid_at = paid.paid_at.unwrap();

        // Webhook redelivery: no error, no timestamp rewrite
        repo.mark_paid(&order.id).await.unwrap();
        let still_paid = repo.get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(still_paid.paid_at.unwrap(), first_paid_at);

        assert!(matches!(
            repo.mark_paid("missing").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let (order, items) = sample_order("FR-2026-00001");
        repo.insert(&order, &items).await.unwrap();
        let (order2, items2) = sample_order("FR-2026-00002");
        repo.insert(&order2, &items2).await.unwrap();
        repo.mark_paid(&order2.id).await.unwrap();

        let pending = repo.list_by_status(OrderStatus::Pending, 10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, order.id);

        let all = repo.list(10, 0).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_by_checkout_session() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let (order, items) = sample_order("FR-2026-00001");
        repo.insert(&order, &items).await.unwrap();
        repo.set_checkout_session(&order.id, "cs_test_123").await.unwrap();

        let found = repo.get_by_checkout_session("cs_test_123").await.unwrap().unwrap();
        assert_eq!(found.id, order.id);
        assert!(repo.get_by_checkout_session("cs_other").await.unwrap().is_none());
    }
}
