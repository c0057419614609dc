//! # Product Repository
//!
//! Database operations for the storefront catalog.
//!
//! ## Key Operations
//! - Active-catalog listing for the storefront
//! - Lookup by id (admin) and slug (storefront URLs)
//! - Stock adjustment as a delta update

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use frantoio_core::types::{Product, SubscriptionInterval};

/// Row shape of the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductRecord {
    id: String,
    slug: String,
    name: String,
    description: Option<String>,
    price_cents: i64,
    compare_at_price_cents: Option<i64>,
    weight_grams: i64,
    vat_rate_bps: i64,
    stock_quantity: i64,
    track_inventory: bool,
    subscribable: bool,
    subscription_interval: Option<String>,
    image_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRecord {
    fn into_product(self) -> DbResult<Product> {
        let subscription_interval = self
            .subscription_interval
            .as_deref()
            .map(str::parse::<SubscriptionInterval>)
            .transpose()
            .map_err(DbError::InvalidValue)?;

        Ok(Product {
            id: self.id,
            slug: self.slug,
            name: self.name,
            description: self.description,
            price_cents: self.price_cents,
            compare_at_price_cents: self.compare_at_price_cents,
            weight_grams: self.weight_grams,
            vat_rate_bps: self.vat_rate_bps as u32,
            stock_quantity: self.stock_quantity,
            track_inventory: self.track_inventory,
            subscribable: self.subscribable,
            subscription_interval,
            image_url: self.image_url,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, slug, name, description, price_cents, compare_at_price_cents,
           weight_grams, vat_rate_bps, stock_quantity, track_inventory,
           subscribable, subscription_interval, image_url, is_active,
           created_at, updated_at
    FROM products
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let catalog = repo.list_active().await?;
/// let bottle = repo.get_by_slug("olio-evo-500ml").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists active products, sorted by name (the storefront catalog).
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let records = sqlx::query_as::<_, ProductRecord>(&format!(
            "{SELECT_COLUMNS} WHERE is_active = 1 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(ProductRecord::into_product).collect()
    }

    /// Lists every product, active or not (admin catalog).
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let records =
            sqlx::query_as::<_, ProductRecord>(&format!("{SELECT_COLUMNS} ORDER BY name"))
                .fetch_all(&self.pool)
                .await?;

        records.into_iter().map(ProductRecord::into_product).collect()
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let record =
            sqlx::query_as::<_, ProductRecord>(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        record.map(ProductRecord::into_product).transpose()
    }

    /// Gets an active product by its storefront slug.
    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Product>> {
        let record = sqlx::query_as::<_, ProductRecord>(&format!(
            "{SELECT_COLUMNS} WHERE slug = ?1 AND is_active = 1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        record.map(ProductRecord::into_product).transpose()
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - slug already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(slug = %product.slug, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, slug, name, description, price_cents, compare_at_price_cents,
                weight_grams, vat_rate_bps, stock_quantity, track_inventory,
                subscribable, subscription_interval, image_url, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )
        .bind(&product.id)
        .bind(&product.slug)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.compare_at_price_cents)
        .bind(product.weight_grams)
        .bind(product.vat_rate_bps as i64)
        .bind(product.stock_quantity)
        .bind(product.track_inventory)
        .bind(product.subscribable)
        .bind(product.subscription_interval.map(|i| i.as_str()))
        .bind(&product.image_url)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product. Refreshes `updated_at`.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                slug = ?2,
                name = ?3,
                description = ?4,
                price_cents = ?5,
                compare_at_price_cents = ?6,
                weight_grams = ?7,
                vat_rate_bps = ?8,
                stock_quantity = ?9,
                track_inventory = ?10,
                subscribable = ?11,
                subscription_interval = ?12,
                image_url = ?13,
                is_active = ?14,
                updated_at = ?15
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.slug)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.compare_at_price_cents)
        .bind(product.weight_grams)
        .bind(product.vat_rate_bps as i64)
        .bind(product.stock_quantity)
        .bind(product.track_inventory)
        .bind(product.subscribable)
        .bind(product.subscription_interval.map(|i| i.as_str()))
        .bind(&product.image_url)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Adjusts product stock by a delta.
    ///
    /// ## Delta Pattern
    /// `stock_quantity = stock_quantity + delta` instead of an absolute
    /// write, so a concurrent checkout and an admin restock never
    /// overwrite each other.
    ///
    /// ## Arguments
    /// * `delta` - Negative for sales, positive for restocking
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Historical orders still reference the product, so rows are never
    /// physically deleted.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
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

    fn sample_product(slug: &str) -> Product {
        let now = Utc::now();
        Product {
            id: generate_id(),
            slug: slug.to_string(),
            name: "Olio EVO 500ml".to_string(),
            description: Some("Raccolta 2026, molito a freddo.".to_string()),
            price_cents: 1850,
            compare_at_price_cents: None,
            weight_grams: 900,
            vat_rate_bps: 400,
            stock_quantity: 120,
            track_inventory: true,
            subscribable: true,
            subscription_interval: Some(SubscriptionInterval::Bimonthly),
            image_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = sample_product("olio-evo-500ml");
        repo.insert(&product).await.unwrap();

        let by_id = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(by_id.slug, "olio-evo-500ml");
        assert_eq!(by_id.price_cents, 1850);
        assert_eq!(by_id.subscription_interval, Some(SubscriptionInterval::Bimonthly));

        let by_slug = repo.get_by_slug("olio-evo-500ml").await.unwrap().unwrap();
        assert_eq!(by_slug.id, product.id);
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&sample_product("olio-evo-500ml")).await.unwrap();
        let err = repo.insert(&sample_product("olio-evo-500ml")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock_delta() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = sample_product("olio-evo-500ml");
        repo.insert(&product).await.unwrap();

        repo.adjust_stock(&product.id, -3).await.unwrap();
        repo.adjust_stock(&product.id, -2).await.unwrap();

        let stored = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock_quantity, 115);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_storefront() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = sample_product("olio-evo-500ml");
        repo.insert(&product).await.unwrap();
        repo.soft_delete(&product.id).await.unwrap();

        assert!(repo.get_by_slug("olio-evo-500ml").await.unwrap().is_none());
        assert!(repo.get_by_id(&product.id).await.unwrap().is_some());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let err = repo.update(&sample_product("ghost")).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
