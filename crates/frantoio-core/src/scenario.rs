//! # Scenario Module
//!
//! The revenue-scenario profit model the owners use to plan a harvest
//! season: given production volume, pricing, and cost assumptions,
//! compute revenue, costs, profit, and margin per channel.
//!
//! ## Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Scenario Calculation                               │
//! │                                                                         │
//! │  bottles_produced × sell_through ──► units_sold                        │
//! │       │                                                                 │
//! │       ├── direct_share ────► direct units @ retail price               │
//! │       └── remainder ───────► reseller units @ reseller price           │
//! │                                                                         │
//! │  revenue  = direct + reseller revenue                                  │
//! │  costs    = production + packaging (per bottle produced)               │
//! │           + shipping (per direct order)                                │
//! │           + payment fees (bps of direct revenue)                       │
//! │           + fixed costs                                                │
//! │  profit   = revenue − costs        (may be negative)                   │
//! │  margin   = profit / revenue       (bps; 0 when revenue is 0)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All amounts are euro cents; share/fee inputs are basis points. The
//! arithmetic rounds half-up through i128 like the money module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Scenario
// =============================================================================

/// A saved what-if scenario for a season.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub notes: Option<String>,

    /// Bottles coming out of the frantoio this season.
    pub bottles_produced: i64,
    /// Share of production expected to sell, in basis points.
    pub sell_through_bps: u32,

    /// Gross storefront price per bottle, in cents.
    pub retail_price_cents: i64,
    /// Share of sold units going through the storefront, in basis points.
    /// The remainder is sold to resellers.
    pub direct_share_bps: u32,
    /// Price per bottle charged to resellers, in cents.
    pub reseller_price_cents: i64,

    /// Production cost per bottle produced (olives, pressing, bottling).
    pub production_cost_cents: i64,
    /// Packaging cost per bottle produced (bottle, label, box).
    pub packaging_cost_cents: i64,
    /// Average courier cost the shop pays per direct order.
    pub shipping_cost_cents: i64,
    /// Average bottles per direct order (drives the order count).
    pub bottles_per_order: i64,
    /// Season fixed costs (certifications, fairs, hosting...).
    pub fixed_costs_cents: i64,
    /// Payment processor fee on direct revenue, in basis points.
    pub payment_fee_bps: u32,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// The computed outcome of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScenarioOutcome {
    pub units_sold: i64,
    pub direct_units: i64,
    pub reseller_units: i64,
    pub direct_orders: i64,

    pub direct_revenue_cents: i64,
    pub reseller_revenue_cents: i64,
    pub revenue_cents: i64,

    pub production_costs_cents: i64,
    pub packaging_costs_cents: i64,
    pub shipping_costs_cents: i64,
    pub payment_fees_cents: i64,
    pub fixed_costs_cents: i64,
    pub total_costs_cents: i64,

    /// `revenue − total costs`; negative when the season loses money.
    pub profit_cents: i64,
    /// Profit over revenue in basis points; 0 when revenue is 0.
    pub margin_bps: i64,
}

/// Rounded half-up basis-point share, through i128.
fn bps_of(amount: i64, bps: u32) -> i64 {
    ((amount as i128 * bps as i128 + 5000) / 10000) as i64
}

impl Scenario {
    /// Computes the outcome of this scenario.
    ///
    /// ## Invariant
    /// `profit_cents == revenue_cents - total_costs_cents` for every
    /// input combination.
    pub fn calculate(&self) -> ScenarioOutcome {
        let units_sold = bps_of(self.bottles_produced, self.sell_through_bps);
        let direct_units = bps_of(units_sold, self.direct_share_bps);
        let reseller_units = units_sold - direct_units;

        // A direct order averages `bottles_per_order` bottles; partially
        // filled boxes still ship, hence the ceiling division.
        let per_order = self.bottles_per_order.max(1);
        let direct_orders = (direct_units + per_order - 1) / per_order;

        let direct_revenue_cents = self.retail_price_cents * direct_units;
        let reseller_revenue_cents = self.reseller_price_cents * reseller_units;
        let revenue_cents = direct_revenue_cents + reseller_revenue_cents;

        let production_costs_cents = self.production_cost_cents * self.bottles_produced;
        let packaging_costs_cents = self.packaging_cost_cents * self.bottles_produced;
        let shipping_costs_cents = self.shipping_cost_cents * direct_orders;
        let payment_fees_cents = bps_of(direct_revenue_cents, self.payment_fee_bps);

        let total_costs_cents = production_costs_cents
            + packaging_costs_cents
            + shipping_costs_cents
            + payment_fees_cents
            + self.fixed_costs_cents;

        let profit_cents = revenue_cents - total_costs_cents;
        let margin_bps = if revenue_cents == 0 {
            0
        } else {
            (profit_cents as i128 * 10000 / revenue_cents as i128) as i64
        };

        ScenarioOutcome {
            units_sold,
            direct_units,
            reseller_units,
            direct_orders,
            direct_revenue_cents,
            reseller_revenue_cents,
            revenue_cents,
            production_costs_cents,
            packaging_costs_cents,
            shipping_costs_cents,
            payment_fees_cents,
            fixed_costs_cents: self.fixed_costs_cents,
            total_costs_cents,
            profit_cents,
            margin_bps,
        }
    }
}

// =============================================================================
// Goal
// =============================================================================

/// A season target the owners track against actual sales.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Goal {
    pub id: String,
    pub label: String,
    /// Season/period this goal belongs to (e.g. "2026/27").
    pub period: String,
    pub target_revenue_cents: i64,
    pub target_units: i64,
    /// Scenario this goal was derived from, if any.
    pub scenario_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Progress towards the revenue target, in basis points.
    ///
    /// Can exceed 10000 when the target is beaten; a zero target always
    /// reads as fully achieved.
    pub fn achieved_bps(&self, actual_revenue_cents: i64) -> i64 {
        if self.target_revenue_cents <= 0 {
            return 10_000;
        }
        (actual_revenue_cents as i128 * 10000 / self.target_revenue_cents as i128) as i64
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn season() -> Scenario {
        Scenario {
            id: "s1".into(),
            name: "Stagione 2026/27".into(),
            notes: None,
            bottles_produced: 4_000,
            sell_through_bps: 9_000, // 90%
            retail_price_cents: 1_850,
            direct_share_bps: 4_000, // 40% direct
            reseller_price_cents: 1_200,
            production_cost_cents: 520,
            packaging_cost_cents: 180,
            shipping_cost_cents: 750,
            bottles_per_order: 3,
            fixed_costs_cents: 600_000, // €6,000
            payment_fee_bps: 290,       // 2.9%
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_unit_split() {
        let outcome = season().calculate();
        assert_eq!(outcome.units_sold, 3_600);
        assert_eq!(outcome.direct_units, 1_440);
        assert_eq!(outcome.reseller_units, 2_160);
        // 1440 bottles / 3 per order = 480 orders
        assert_eq!(outcome.direct_orders, 480);
    }

    #[test]
    fn test_revenue_breakdown() {
        let outcome = season().calculate();
        assert_eq!(outcome.direct_revenue_cents, 1_850 * 1_440);
        assert_eq!(outcome.reseller_revenue_cents, 1_200 * 2_160);
        assert_eq!(
            outcome.revenue_cents,
            outcome.direct_revenue_cents + outcome.reseller_revenue_cents
        );
    }

    /// The headline invariant: profit is exactly revenue minus costs.
    #[test]
    fn test_profit_equals_revenue_minus_costs() {
        let mut scenario = season();
        let combos: [(i64, u32, u32); 4] = [
            (4_000, 9_000, 4_000),
            (0, 9_000, 4_000),
            (12_000, 10_000, 10_000),
            (500, 2_500, 0),
        ];
        for (produced, sell_through, direct_share) in combos {
            scenario.bottles_produced = produced;
            scenario.sell_through_bps = sell_through;
            scenario.direct_share_bps = direct_share;

            let outcome = scenario.calculate();
            assert_eq!(
                outcome.profit_cents,
                outcome.revenue_cents - outcome.total_costs_cents
            );
            assert_eq!(
                outcome.total_costs_cents,
                outcome.production_costs_cents
                    + outcome.packaging_costs_cents
                    + outcome.shipping_costs_cents
                    + outcome.payment_fees_cents
                    + outcome.fixed_costs_cents
            );
        }
    }

    #[test]
    fn test_zero_production_season_loses_fixed_costs() {
        let mut scenario = season();
        scenario.bottles_produced = 0;

        let outcome = scenario.calculate();
        assert_eq!(outcome.revenue_cents, 0);
        assert_eq!(outcome.profit_cents, -scenario.fixed_costs_cents);
        assert_eq!(outcome.margin_bps, 0);
    }

    #[test]
    fn test_margin_bps() {
        let outcome = season().calculate();
        let expected =
            outcome.profit_cents as i128 * 10000 / outcome.revenue_cents as i128;
        assert_eq!(outcome.margin_bps, expected as i64);
    }

    #[test]
    fn test_bottles_per_order_floor_guard() {
        let mut scenario = season();
        scenario.bottles_per_order = 0; // bad input, treated as 1

        let outcome = scenario.calculate();
        assert_eq!(outcome.direct_orders, outcome.direct_units);
    }

    #[test]
    fn test_goal_progress() {
        let goal = Goal {
            id: "g1".into(),
            label: "Vendite online".into(),
            period: "2026/27".into(),
            target_revenue_cents: 2_000_000,
            target_units: 1_500,
            scenario_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(goal.achieved_bps(1_000_000), 5_000);
        assert_eq!(goal.achieved_bps(2_000_000), 10_000);
        assert_eq!(goal.achieved_bps(2_500_000), 12_500);

        let free_goal = Goal {
            target_revenue_cents: 0,
            ..goal
        };
        assert_eq!(free_goal.achieved_bps(0), 10_000);
    }
}
