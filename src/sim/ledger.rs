//! Append-only run ledger
//!
//! Every simulated day appends one `DayResult` holding a full
//! `DayStoreResult` per store. The ledger lives outside the simulation
//! state: rolling back rewrites the ledger tail but a day's record is
//! never edited in place. Reports and scenario metrics read from here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chain::service::ServiceCategory;
use crate::chain::store::{Store, StoreStatus};
use crate::core::types::{Day, Money, ProjectId, ServiceId, StationId, StoreId};
use crate::engine::payroll::RolePayrollDay;
use crate::engine::workforce::WorkforceDay;
use crate::events::engine::EventSummary;
use crate::events::mitigation::MitigationAction;
use crate::inventory::{InboundArrival, ReplenishmentOrder};

/// One store's complete daily record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayStoreResult {
    pub day: Day,
    pub store_id: StoreId,
    pub store_name: String,
    pub station_id: StationId,
    pub status: StoreStatus,
    /// True when the store stayed closed behind an event for the day.
    pub store_closed: bool,

    pub traffic_multiplier: f64,
    pub conversion_multiplier: f64,
    pub capacity_multiplier: f64,
    pub variable_cost_multiplier: f64,

    pub fuel_traffic: u32,
    pub visitor_traffic: u32,

    pub orders_by_service: BTreeMap<ServiceId, u32>,
    pub orders_by_project: BTreeMap<ProjectId, u32>,

    pub revenue: Money,
    pub revenue_by_service: BTreeMap<ServiceId, Money>,
    pub revenue_by_category: BTreeMap<ServiceCategory, Money>,
    pub gross_profit_by_service: BTreeMap<ServiceId, Money>,
    pub gross_profit_by_project: BTreeMap<ProjectId, Money>,
    pub gross_profit_by_category: BTreeMap<ServiceCategory, Money>,

    pub labor_revenue: Money,
    pub parts_revenue: Money,
    pub parts_gross_profit: Money,
    pub parts_cogs_by_project: BTreeMap<ProjectId, Money>,

    pub online_revenue: Money,
    pub online_gross_profit: Money,
    pub insurance_revenue: Money,
    pub insurance_gross_profit: Money,
    pub used_car_revenue: Money,
    pub used_car_gross_profit: Money,
    pub used_car_deals: u32,

    pub variable_cost: Money,
    pub parts_cogs: Money,
    pub labor_cost: Money,
    pub depreciation_cost: Money,
    pub fixed_overhead: Money,
    pub cost_rent: Money,
    pub cost_water: Money,
    pub cost_elec: Money,
    pub mitigation_cost: Money,
    pub replenishment_cost: Money,
    pub recruiting_cost: Money,
    pub capex_spend: Money,

    pub operating_profit: Money,
    pub cash_in: Money,
    pub cash_out: Money,
    pub net_cashflow: Money,

    pub events: Vec<EventSummary>,
    pub mitigation_actions: Vec<MitigationAction>,
    pub inbound_arrivals: Vec<InboundArrival>,
    pub replenishment_orders: Vec<ReplenishmentOrder>,
    pub payroll: Vec<RolePayrollDay>,
    pub workforce: Option<WorkforceDay>,
}

impl Default for DayStoreResult {
    fn default() -> Self {
        Self {
            day: 0,
            store_id: StoreId::default(),
            store_name: String::new(),
            station_id: StationId::default(),
            status: StoreStatus::default(),
            store_closed: false,
            traffic_multiplier: 1.0,
            conversion_multiplier: 1.0,
            capacity_multiplier: 1.0,
            variable_cost_multiplier: 1.0,
            fuel_traffic: 0,
            visitor_traffic: 0,
            orders_by_service: BTreeMap::new(),
            orders_by_project: BTreeMap::new(),
            revenue: 0.0,
            revenue_by_service: BTreeMap::new(),
            revenue_by_category: BTreeMap::new(),
            gross_profit_by_service: BTreeMap::new(),
            gross_profit_by_project: BTreeMap::new(),
            gross_profit_by_category: BTreeMap::new(),
            labor_revenue: 0.0,
            parts_revenue: 0.0,
            parts_gross_profit: 0.0,
            parts_cogs_by_project: BTreeMap::new(),
            online_revenue: 0.0,
            online_gross_profit: 0.0,
            insurance_revenue: 0.0,
            insurance_gross_profit: 0.0,
            used_car_revenue: 0.0,
            used_car_gross_profit: 0.0,
            used_car_deals: 0,
            variable_cost: 0.0,
            parts_cogs: 0.0,
            labor_cost: 0.0,
            depreciation_cost: 0.0,
            fixed_overhead: 0.0,
            cost_rent: 0.0,
            cost_water: 0.0,
            cost_elec: 0.0,
            mitigation_cost: 0.0,
            replenishment_cost: 0.0,
            recruiting_cost: 0.0,
            capex_spend: 0.0,
            operating_profit: 0.0,
            cash_in: 0.0,
            cash_out: 0.0,
            net_cashflow: 0.0,
            events: Vec::new(),
            mitigation_actions: Vec::new(),
            inbound_arrivals: Vec::new(),
            replenishment_orders: Vec::new(),
            payroll: Vec::new(),
            workforce: None,
        }
    }
}

impl DayStoreResult {
    /// Empty record for the store on the given day, multipliers neutral.
    pub fn new(day: Day, store: &Store) -> Self {
        Self {
            day,
            store_id: store.id.clone(),
            store_name: store.name.clone(),
            station_id: store.station.clone(),
            status: store.status,
            ..Default::default()
        }
    }

    pub fn total_orders(&self) -> u32 {
        self.orders_by_service.values().sum()
    }
}

/// Chain totals for one simulated day.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DayResult {
    pub day: Day,
    pub store_results: Vec<DayStoreResult>,
    pub total_revenue: Money,
    pub total_operating_profit: Money,
    pub total_net_cashflow: Money,
    pub finance_interest_cost: Money,
    pub finance_credit_draw: Money,
    pub finance_credit_repay: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Ledger {
    records: Vec<DayResult>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, result: DayResult) {
        self.records.push(result);
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = DayResult>) {
        self.records.extend(results);
    }

    /// Drop every record for days after `day`. Used by rollback.
    pub fn truncate_after(&mut self, day: Day) {
        self.records.retain(|r| r.day <= day);
    }

    pub fn records(&self) -> &[DayResult] {
        &self.records
    }

    pub fn last(&self) -> Option<&DayResult> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
