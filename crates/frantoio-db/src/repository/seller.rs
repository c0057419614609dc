//! Seller repository.
//!
//! Sellers are the shop's referral partners; orders carrying their code
//! are attributed to them for commission settlement.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use frantoio_core::types::Seller;

/// Row shape of the `sellers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SellerRecord {
    id: String,
    code: String,
    name: String,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    commission_bps: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SellerRecord> for Seller {
    fn from(r: SellerRecord) -> Self {
        Seller {
            id: r.id,
            code: r.code,
            name: r.name,
            contact_email: r.contact_email,
            contact_phone: r.contact_phone,
            commission_bps: r.commission_bps as u32,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, code, name, contact_email, contact_phone, commission_bps,
           is_active, created_at, updated_at
    FROM sellers
"#;

/// Repository for seller database operations.
#[derive(Debug, Clone)]
pub struct SellerRepository {
    pool: SqlitePool,
}

impl SellerRepository {
    /// Creates a new SellerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SellerRepository { pool }
    }

    /// Inserts a new seller.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - referral code already exists
    pub async fn insert(&self, seller: &Seller) -> DbResult<()> {
        debug!(code = %seller.code, "Inserting seller");

        sqlx::query(
            r#"
            INSERT INTO sellers (
                id, code, name, contact_email, contact_phone, commission_bps,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&seller.id)
        .bind(&seller.code)
        .bind(&seller.name)
        .bind(&seller.contact_email)
        .bind(&seller.contact_phone)
        .bind(seller.commission_bps as i64)
        .bind(seller.is_active)
        .bind(seller.created_at)
        .bind(seller.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an active seller by referral code (checkout attribution).
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Seller>> {
        let record = sqlx::query_as::<_, SellerRecord>(&format!(
            "{SELECT_COLUMNS} WHERE code = ?1 AND is_active = 1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Seller::from))
    }

    /// Gets a seller by ID (admin).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Seller>> {
        let record =
            sqlx::query_as::<_, SellerRecord>(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record.map(Seller::from))
    }

    /// Lists all sellers, active first.
    pub async fn list(&self) -> DbResult<Vec<Seller>> {
        let records = sqlx::query_as::<_, SellerRecord>(&format!(
            "{SELECT_COLUMNS} ORDER BY is_active DESC, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Seller::from).collect())
    }

    /// Updates a seller. Refreshes `updated_at`.
    pub async fn update(&self, seller: &Seller) -> DbResult<()> {
        debug!(id = %seller.id, "Updating seller");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sellers SET
                code = ?2, name = ?3, contact_email = ?4, contact_phone = ?5,
                commission_bps = ?6, is_active = ?7, updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&seller.id)
        .bind(&seller.code)
        .bind(&seller.name)
        .bind(&seller.contact_email)
        .bind(&seller.contact_phone)
        .bind(seller.commission_bps as i64)
        .bind(seller.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Seller", &seller.id));
        }

        Ok(())
    }

    /// Deactivates a seller; their code stops resolving at checkout.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating seller");

        let now = Utc::now();

        let result =
            sqlx::query("UPDATE sellers SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Seller", id));
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

    fn sample_seller(code: &str) -> Seller {
        let now = Utc::now();
        Seller {
            id: generate_id(),
            code: code.to_string(),
            name: "Ristorante da Mario".to_string(),
            contact_email: Some("mario@example.com".to_string()),
            contact_phone: None,
            commission_bps: 1000,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup_by_code() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sellers();

        let seller = sample_seller("RIST-MARIO");
        repo.insert(&seller).await.unwrap();

        let found = repo.get_by_code("RIST-MARIO").await.unwrap().unwrap();
        assert_eq!(found.commission_bps, 1000);

        let err = repo.insert(&sample_seller("RIST-MARIO")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_deactivated_code_stops_resolving() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sellers();

        let seller = sample_seller("RIST-MARIO");
        repo.insert(&seller).await.unwrap();
        repo.soft_delete(&seller.id).await.unwrap();

        assert!(repo.get_by_code("RIST-MARIO").await.unwrap().is_none());
        // Still visible in the admin list
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
