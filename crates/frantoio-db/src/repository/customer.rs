//! Customer repository.
//!
//! Customers are created implicitly at checkout (upsert by email) and
//! managed from the admin back-office.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use frantoio_core::types::{Address, Customer};

/// Row shape of the `customers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CustomerRecord {
    id: String,
    email: String,
    name: String,
    phone: Option<String>,
    default_address: Option<String>,
    marketing_consent: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CustomerRecord {
    fn into_customer(self) -> DbResult<Customer> {
        let default_address: Option<Address> = self
            .default_address
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Customer {
            id: self.id,
            email: self.email,
            name: self.name,
            phone: self.phone,
            default_address,
            marketing_consent: self.marketing_consent,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, email, name, phone, default_address, marketing_consent,
           created_at, updated_at
    FROM customers
"#;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts or refreshes a customer keyed by email.
    ///
    /// Checkout calls this on every order: a returning customer gets
    /// their name/phone/address refreshed, a new one gets a row. The
    /// stored id is returned either way.
    pub async fn upsert_by_email(
        &self,
        email: &str,
        name: &str,
        phone: Option<&str>,
        address: Option<&Address>,
        marketing_consent: bool,
    ) -> DbResult<Customer> {
        debug!(email = %email, "Upserting customer");

        let now = Utc::now();
        let id = generate_id();
        let address_json = address.map(serde_json::to_string).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, email, name, phone, default_address, marketing_consent,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ON CONFLICT(email) DO UPDATE SET
                name = excluded.name,
                phone = COALESCE(excluded.phone, customers.phone),
                default_address = COALESCE(excluded.default_address, customers.default_address),
                marketing_consent = excluded.marketing_consent,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(name)
        .bind(phone)
        .bind(&address_json)
        .bind(marketing_consent)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_email(email)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", email))
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let record =
            sqlx::query_as::<_, CustomerRecord>(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        record.map(CustomerRecord::into_customer).transpose()
    }

    /// Gets a customer by email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let record =
            sqlx::query_as::<_, CustomerRecord>(&format!("{SELECT_COLUMNS} WHERE email = ?1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        record.map(CustomerRecord::into_customer).transpose()
    }

    /// Lists customers, newest-first, paged.
    pub async fn list(&self, limit: u32, offset: u32) -> DbResult<Vec<Customer>> {
        let records = sqlx::query_as::<_, CustomerRecord>(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        records
            .into_iter()
            .map(CustomerRecord::into_customer)
            .collect()
    }

    /// Counts all customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Deletes a customer (GDPR erasure request).
    ///
    /// Orders are kept: they are fiscal records and carry only the
    /// snapshot data they were placed with.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
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

    fn address() -> Address {
        Address {
            line1: "Via Roma 1".to_string(),
            line2: None,
            city: "Firenze".to_string(),
            province: Some("FI".to_string()),
            postal_code: "50100".to_string(),
            country: "IT".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_then_refreshes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let first = repo
            .upsert_by_email("anna@example.com", "Anna", None, Some(&address()), true)
            .await
            .unwrap();

        let second = repo
            .upsert_by_email("anna@example.com", "Anna Bianchi", Some("+39055123456"), None, true)
            .await
            .unwrap();

        // Same row, refreshed fields, address kept from the first order
        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "Anna Bianchi");
        assert_eq!(second.phone.as_deref(), Some("+39055123456"));
        assert_eq!(second.default_address.unwrap().city, "Firenze");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let customer = repo
            .upsert_by_email("anna@example.com", "Anna", None, None, false)
            .await
            .unwrap();

        repo.delete(&customer.id).await.unwrap();
        assert!(repo.get_by_email("anna@example.com").await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&customer.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
