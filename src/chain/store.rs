//! Store aggregate
//!
//! A store is one service outlet attached to a station. It owns its
//! service lines, project catalog, payroll roles, inventory, standing
//! mitigation posture, and the month-to-date trackers the payroll and
//! reporting paths read. Stores move through a lifecycle:
//! `Planning -> Constructing -> Open -> Closed`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chain::asset::Asset;
use crate::chain::service::{ServiceLine, ServiceProject};
use crate::chain::staffing::{PendingHire, RolePlan, WorkforcePlan};
use crate::core::types::{Day, Money, ProjectId, RoleId, ServiceId, Sku, StationId, StoreId};
use crate::engine::value_added::ValueAddedConfig;
use crate::events::mitigation::MitigationConfig;
use crate::inventory::{InventoryItem, PendingInbound, ReplenishmentRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    #[default]
    Planning,
    Constructing,
    Open,
    Closed,
}

impl StoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStatus::Planning => "planning",
            StoreStatus::Constructing => "constructing",
            StoreStatus::Open => "open",
            StoreStatus::Closed => "closed",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, StoreStatus::Open)
    }
}

/// Rent and utility cost parameters. Rent is amortized daily over the
/// accounting month; utilities scale with wash and maintenance volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpexConfig {
    pub monthly_rent: Money,
    pub water_cost_per_wash: Money,
    pub elec_daily_base: Money,
    pub elec_cost_per_wash: Money,
    pub elec_cost_per_maint: Money,
}

impl Default for OpexConfig {
    fn default() -> Self {
        Self {
            monthly_rent: 15_000.0,
            water_cost_per_wash: 1.5,
            elec_daily_base: 50.0,
            elec_cost_per_wash: 0.8,
            elec_cost_per_maint: 2.0,
        }
    }
}

impl OpexConfig {
    pub fn rent_per_day(&self, month_len_days: u32) -> Money {
        if self.monthly_rent <= 0.0 {
            return 0.0;
        }
        self.monthly_rent / month_len_days.max(1) as Money
    }

    /// (water, electricity) for a day's wash and maintenance order counts.
    pub fn utilities(&self, wash_orders: u32, maint_orders: u32) -> (Money, Money) {
        let water = wash_orders as Money * self.water_cost_per_wash.max(0.0);
        let elec = self.elec_daily_base.max(0.0)
            + wash_orders as Money * self.elec_cost_per_wash.max(0.0)
            + maint_orders as Money * self.elec_cost_per_maint.max(0.0);
        (water, elec)
    }
}

/// Month-to-date accumulators, reset after each accounting month end.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MtdTrackers {
    pub orders_by_service: BTreeMap<ServiceId, u32>,
    pub orders_by_project: BTreeMap<ProjectId, u32>,
    pub revenue: Money,
    pub variable_cost: Money,
    pub parts_cogs: Money,
    pub labor_cost: Money,
    pub depreciation: Money,
    pub fixed_overhead: Money,
    pub operating_profit: Money,
    pub cash_in: Money,
    pub cash_out: Money,
    /// Commission accrued per role this month, read by the month-end
    /// order-threshold check.
    pub commission_by_role: BTreeMap<RoleId, Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub station: StationId,

    pub status: StoreStatus,
    pub build_days_total: u32,
    pub construction_days_remaining: u32,
    /// First day the store trades once open.
    pub operation_start_day: Day,

    pub capex_total: Money,
    pub capex_spend_per_day: Money,
    pub capex_useful_life_days: u32,

    /// Store-wide scale on per-line conversion rates.
    pub traffic_conversion_rate: f64,
    /// 0..1, higher diverts more traffic to competitors.
    pub local_competition_intensity: f64,
    /// Clamped to 0.5..1.5 when applied.
    pub attractiveness_index: f64,

    /// Posted price per labor hour, used to split project revenue into
    /// labor and parts portions.
    pub labor_hour_price: Money,
    pub fixed_overhead_per_day: Money,
    /// When set, project orders require parts on hand; otherwise parts
    /// cost is approximated from the line's parts cost ratio.
    pub strict_parts: bool,

    pub cash_balance: Money,

    pub service_lines: BTreeMap<ServiceId, ServiceLine>,
    pub projects: BTreeMap<ProjectId, ServiceProject>,
    pub payroll: BTreeMap<RoleId, RolePlan>,
    pub assets: Vec<Asset>,

    pub inventory: BTreeMap<Sku, InventoryItem>,
    pub auto_replenishment_enabled: bool,
    pub replenishment_rules: BTreeMap<Sku, ReplenishmentRule>,
    pub pending_inbounds: Vec<PendingInbound>,

    pub workforce: Option<WorkforcePlan>,
    pub pending_hires: Vec<PendingHire>,

    pub mitigation: MitigationConfig,
    pub value_added: Option<ValueAddedConfig>,
    pub opex: OpexConfig,

    pub mtd: MtdTrackers,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            id: StoreId::new(""),
            name: String::new(),
            station: StationId::new(""),
            status: StoreStatus::Planning,
            build_days_total: 0,
            construction_days_remaining: 0,
            operation_start_day: 1,
            capex_total: 0.0,
            capex_spend_per_day: 0.0,
            capex_useful_life_days: 5 * 365,
            traffic_conversion_rate: 1.0,
            local_competition_intensity: 0.0,
            attractiveness_index: 1.0,
            labor_hour_price: 120.0,
            fixed_overhead_per_day: 0.0,
            strict_parts: true,
            cash_balance: 0.0,
            service_lines: BTreeMap::new(),
            projects: BTreeMap::new(),
            payroll: BTreeMap::new(),
            assets: Vec::new(),
            inventory: BTreeMap::new(),
            auto_replenishment_enabled: false,
            replenishment_rules: BTreeMap::new(),
            pending_inbounds: Vec::new(),
            workforce: None,
            pending_hires: Vec::new(),
            mitigation: MitigationConfig::default(),
            value_added: None,
            opex: OpexConfig::default(),
            mtd: MtdTrackers::default(),
        }
    }
}

impl Store {
    pub fn new(id: impl Into<String>, name: impl Into<String>, station: impl Into<String>) -> Self {
        Self {
            id: StoreId::new(id),
            name: name.into(),
            station: StationId::new(station),
            ..Default::default()
        }
    }

    /// Sum of all service orders this month. Project orders are a
    /// breakdown of their line's orders and are not double counted.
    pub fn total_mtd_orders(&self) -> u32 {
        self.mtd.orders_by_service.values().sum()
    }

    pub fn reset_month_trackers(&mut self) {
        self.mtd = MtdTrackers::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        assert_eq!(StoreStatus::Planning.as_str(), "planning");
        assert_eq!(StoreStatus::Open.as_str(), "open");
        assert!(StoreStatus::Open.is_open());
        assert!(!StoreStatus::Constructing.is_open());
    }

    #[test]
    fn test_rent_amortized_daily() {
        let opex = OpexConfig {
            monthly_rent: 15_000.0,
            ..Default::default()
        };
        assert!((opex.rent_per_day(30) - 500.0).abs() < 1e-9);
        assert_eq!(
            OpexConfig {
                monthly_rent: 0.0,
                ..Default::default()
            }
            .rent_per_day(30),
            0.0
        );
    }

    #[test]
    fn test_utilities_scale_with_orders() {
        let opex = OpexConfig::default();
        let (water, elec) = opex.utilities(100, 10);
        assert!((water - 150.0).abs() < 1e-9);
        assert!((elec - (50.0 + 80.0 + 20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_month_tracker_reset() {
        let mut store = Store::new("S1", "Demo", "ST01");
        store
            .mtd
            .orders_by_service
            .insert(ServiceId::new("AUTO_WASH"), 120);
        store.mtd.revenue = 3600.0;
        assert_eq!(store.total_mtd_orders(), 120);

        store.reset_month_trackers();
        assert_eq!(store.total_mtd_orders(), 0);
        assert_eq!(store.mtd.revenue, 0.0);
    }
}
