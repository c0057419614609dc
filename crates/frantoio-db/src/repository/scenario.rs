//! Scenario and goal repository.
//!
//! Scenarios are the owners' what-if seasons; goals are the targets
//! tracked against actual sales. Both are flat numeric documents, so
//! they map to plain columns rather than JSON.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use frantoio_core::scenario::{Goal, Scenario};

/// Row shape of the `scenarios` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ScenarioRecord {
    id: String,
    name: String,
    notes: Option<String>,
    bottles_produced: i64,
    sell_through_bps: i64,
    retail_price_cents: i64,
    direct_share_bps: i64,
    reseller_price_cents: i64,
    production_cost_cents: i64,
    packaging_cost_cents: i64,
    shipping_cost_cents: i64,
    bottles_per_order: i64,
    fixed_costs_cents: i64,
    payment_fee_bps: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ScenarioRecord> for Scenario {
    fn from(r: ScenarioRecord) -> Self {
        Scenario {
            id: r.id,
            name: r.name,
            notes: r.notes,
            bottles_produced: r.bottles_produced,
            sell_through_bps: r.sell_through_bps as u32,
            retail_price_cents: r.retail_price_cents,
            direct_share_bps: r.direct_share_bps as u32,
            reseller_price_cents: r.reseller_price_cents,
            production_cost_cents: r.production_cost_cents,
            packaging_cost_cents: r.packaging_cost_cents,
            shipping_cost_cents: r.shipping_cost_cents,
            bottles_per_order: r.bottles_per_order,
            fixed_costs_cents: r.fixed_costs_cents,
            payment_fee_bps: r.payment_fee_bps as u32,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Row shape of the `goals` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct GoalRecord {
    id: String,
    label: String,
    period: String,
    target_revenue_cents: i64,
    target_units: i64,
    scenario_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GoalRecord> for Goal {
    fn from(r: GoalRecord) -> Self {
        Goal {
            id: r.id,
            label: r.label,
            period: r.period,
            target_revenue_cents: r.target_revenue_cents,
            target_units: r.target_units,
            scenario_id: r.scenario_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const SCENARIO_COLUMNS: &str = r#"
    SELECT id, name, notes, bottles_produced, sell_through_bps,
           retail_price_cents, direct_share_bps, reseller_price_cents,
           production_cost_cents, packaging_cost_cents, shipping_cost_cents,
           bottles_per_order, fixed_costs_cents, payment_fee_bps,
           created_at, updated_at
    FROM scenarios
"#;

const GOAL_COLUMNS: &str = r#"
    SELECT id, label, period, target_revenue_cents, target_units,
           scenario_id, created_at, updated_at
    FROM goals
"#;

/// Repository for scenarios and goals.
#[derive(Debug, Clone)]
pub struct ScenarioRepository {
    pool: SqlitePool,
}

impl ScenarioRepository {
    /// Creates a new ScenarioRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ScenarioRepository { pool }
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    /// Inserts a new scenario.
    pub async fn insert(&self, scenario: &Scenario) -> DbResult<()> {
        debug!(name = %scenario.name, "Inserting scenario");

        sqlx::query(
            r#"
            INSERT INTO scenarios (
                id, name, notes, bottles_produced, sell_through_bps,
                retail_price_cents, direct_share_bps, reseller_price_cents,
                production_cost_cents, packaging_cost_cents, shipping_cost_cents,
                bottles_per_order, fixed_costs_cents, payment_fee_bps,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )
        .bind(&scenario.id)
        .bind(&scenario.name)
        .bind(&scenario.notes)
        .bind(scenario.bottles_produced)
        .bind(scenario.sell_through_bps as i64)
        .bind(scenario.retail_price_cents)
        .bind(scenario.direct_share_bps as i64)
        .bind(scenario.reseller_price_cents)
        .bind(scenario.production_cost_cents)
        .bind(scenario.packaging_cost_cents)
        .bind(scenario.shipping_cost_cents)
        .bind(scenario.bottles_per_order)
        .bind(scenario.fixed_costs_cents)
        .bind(scenario.payment_fee_bps as i64)
        .bind(scenario.created_at)
        .bind(scenario.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a scenario by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Scenario>> {
        let record =
            sqlx::query_as::<_, ScenarioRecord>(&format!("{SCENARIO_COLUMNS} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record.map(Scenario::from))
    }

    /// Lists scenarios, newest-first.
    pub async fn list(&self) -> DbResult<Vec<Scenario>> {
        let records = sqlx::query_as::<_, ScenarioRecord>(&format!(
            "{SCENARIO_COLUMNS} ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Scenario::from).collect())
    }

    /// Updates a scenario. Refreshes `updated_at`.
    pub async fn update(&self, scenario: &Scenario) -> DbResult<()> {
        debug!(id = %scenario.id, "Updating scenario");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE scenarios SET
                name = ?2, notes = ?3, bottles_produced = ?4, sell_through_bps = ?5,
                retail_price_cents = ?6, direct_share_bps = ?7, reseller_price_cents = ?8,
                production_cost_cents = ?9, packaging_cost_cents = ?10,
                shipping_cost_cents = ?11, bottles_per_order = ?12,
                fixed_costs_cents = ?13, payment_fee_bps = ?14, updated_at = ?15
            WHERE id = ?1
            "#,
        )
        .bind(&scenario.id)
        .bind(&scenario.name)
        .bind(&scenario.notes)
        .bind(scenario.bottles_produced)
        .bind(scenario.sell_through_bps as i64)
        .bind(scenario.retail_price_cents)
        .bind(scenario.direct_share_bps as i64)
        .bind(scenario.reseller_price_cents)
        .bind(scenario.production_cost_cents)
        .bind(scenario.packaging_cost_cents)
        .bind(scenario.shipping_cost_cents)
        .bind(scenario.bottles_per_order)
        .bind(scenario.fixed_costs_cents)
        .bind(scenario.payment_fee_bps as i64)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Scenario", &scenario.id));
        }

        Ok(())
    }

    /// Deletes a scenario. Goals derived from it keep their snapshot
    /// targets (the FK nulls their `scenario_id`).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM scenarios WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Scenario", id));
        }

        Ok(())
    }

    // =========================================================================
    // Goals
    // =========================================================================

    /// Inserts a new goal.
    pub async fn insert_goal(&self, goal: &Goal) -> DbResult<()> {
        debug!(label = %goal.label, "Inserting goal");

        sqlx::query(
            r#"
            INSERT INTO goals (
                id, label, period, target_revenue_cents, target_units,
                scenario_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&goal.id)
        .bind(&goal.label)
        .bind(&goal.period)
        .bind(goal.target_revenue_cents)
        .bind(goal.target_units)
        .bind(&goal.scenario_id)
        .bind(goal.created_at)
        .bind(goal.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a goal by ID.
    pub async fn get_goal_by_id(&self, id: &str) -> DbResult<Option<Goal>> {
        let record = sqlx::query_as::<_, GoalRecord>(&format!("{GOAL_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record.map(Goal::from))
    }

    /// Lists goals, newest-first.
    pub async fn list_goals(&self) -> DbResult<Vec<Goal>> {
        let records =
            sqlx::query_as::<_, GoalRecord>(&format!("{GOAL_COLUMNS} ORDER BY created_at DESC"))
                .fetch_all(&self.pool)
                .await?;

        Ok(records.into_iter().map(Goal::from).collect())
    }

    /// Updates a goal. Refreshes `updated_at`.
    pub async fn update_goal(&self, goal: &Goal) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE goals SET
                label = ?2, period = ?3, target_revenue_cents = ?4,
                target_units = ?5, scenario_id = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&goal.id)
        .bind(&goal.label)
        .bind(&goal.period)
        .bind(goal.target_revenue_cents)
        .bind(goal.target_units)
        .bind(&goal.scenario_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Goal", &goal.id));
        }

        Ok(())
    }

    /// Deletes a goal.
    pub async fn delete_goal(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM goals WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Goal", id));
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

    fn sample_scenario() -> Scenario {
        let now = Utc::now();
        Scenario {
            id: generate_id(),
            name: "Stagione 2026/27".to_string(),
            notes: None,
            bottles_produced: 4_000,
            sell_through_bps: 9_000,
            retail_price_cents: 1_850,
            direct_share_bps: 4_000,
            reseller_price_cents: 1_200,
            production_cost_cents: 520,
            packaging_cost_cents: 180,
            shipping_cost_cents: 750,
            bottles_per_order: 3,
            fixed_costs_cents: 600_000,
            payment_fee_bps: 290,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_scenario_roundtrip_preserves_outcome() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.scenarios();

        let scenario = sample_scenario();
        let expected = scenario.calculate();
        repo.insert(&scenario).await.unwrap();

        let stored = repo.get_by_id(&scenario.id).await.unwrap().unwrap();
        assert_eq!(stored.calculate(), expected);
    }

    #[tokio::test]
    async fn test_goal_keeps_targets_when_scenario_deleted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.scenarios();

        let scenario = sample_scenario();
        repo.insert(&scenario).await.unwrap();

        let now = Utc::now();
        let goal = Goal {
            id: generate_id(),
            label: "Vendite online".to_string(),
            period: "2026/27".to_string(),
            target_revenue_cents: 2_000_000,
            target_units: 1_500,
            scenario_id: Some(scenario.id.clone()),
            created_at: now,
            updated_at: now,
        };
        repo.insert_goal(&goal).await.unwrap();

        repo.delete(&scenario.id).await.unwrap();

        let stored = repo.get_goal_by_id(&goal.id).await.unwrap().unwrap();
        assert_eq!(stored.scenario_id, None);
        assert_eq!(stored.target_revenue_cents, 2_000_000);
    }
}
