//! Shipping configuration repository.
//!
//! The whole tariff table is one JSON document in a single-row table,
//! mirroring how the back-office edits it: load, tweak, replace. The
//! document is validated in core before `save` is ever called.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use frantoio_core::shipping::ShippingConfig;

/// Repository for the shipping configuration document.
#[derive(Debug, Clone)]
pub struct ShippingConfigRepository {
    pool: SqlitePool,
}

impl ShippingConfigRepository {
    /// Creates a new ShippingConfigRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShippingConfigRepository { pool }
    }

    /// Loads the current configuration.
    ///
    /// Falls back to [`ShippingConfig::seed_default`] when the shop has
    /// never saved one, so quoting works out of the box.
    pub async fn load(&self) -> DbResult<ShippingConfig> {
        let document: Option<String> =
            sqlx::query_scalar("SELECT document FROM shipping_config WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        match document {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(ShippingConfig::seed_default()),
        }
    }

    /// Replaces the configuration document.
    pub async fn save(&self, config: &ShippingConfig) -> DbResult<()> {
        debug!(
            zones = config.zones.len(),
            domestic_tiers = config.domestic_tiers.len(),
            "Saving shipping configuration"
        );

        let json = serde_json::to_string(config)?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO shipping_config (id, document, updated_at)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                document = excluded.document,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&json)
        .bind(now)
        .execute(&self.pool)
        .await?;

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

    #[tokio::test]
    async fn test_load_falls_back_to_seed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.shipping_config();

        let config = repo.load().await.unwrap();
        assert_eq!(config, ShippingConfig::seed_default());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.shipping_config();

        let mut config = ShippingConfig::seed_default();
        config.free_shipping_threshold_cents = Some(12_000);
        repo.save(&config).await.unwrap();

        let reloaded = repo.load().await.unwrap();
        assert_eq!(reloaded.free_shipping_threshold_cents, Some(12_000));

        // Second save replaces, never duplicates
        config.free_shipping_threshold_cents = None;
        repo.save(&config).await.unwrap();
        let reloaded = repo.load().await.unwrap();
        assert_eq!(reloaded.free_shipping_threshold_cents, None);
    }
}
