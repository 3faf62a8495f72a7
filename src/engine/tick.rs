//! The daily tick
//!
//! `simulate_day` advances the whole chain by exactly one day and returns
//! the day's ledger record. The pass order is fixed, because every
//! stochastic step draws from one shared stream and determinism depends
//! on draw order: events trigger at day start, then each store in id
//! order runs workforce churn, traffic jitter, order allocation, project
//! picks and value-added demand. HQ finance settles last, after every
//! store's net cashflow has landed in HQ cash.
//!
//! Stores in construction spend their daily capex budget and flip to
//! open when the countdown hits zero and the operation start day has
//! been reached; the transition day itself does not trade.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::chain::asset::Asset;
use crate::chain::service::ServiceCategory;
use crate::chain::station::Station;
use crate::chain::store::{Store, StoreStatus};
use crate::core::config::SimConfig;
use crate::core::error::Result;
use crate::core::rng::RngStream;
use crate::core::types::{Day, Money, ProjectId, RoleId, ServiceId, StoreId};
use crate::engine::finance::apply_hq_finance;
use crate::engine::orders::{allocate_orders, generate_projects, OrderAllocation};
use crate::engine::payroll::{compute_payroll, PayrollInputs};
use crate::engine::traffic::sample_traffic;
use crate::engine::value_added::{simulate_value_added, ValueAddedDay};
use crate::engine::workforce::workforce_daily;
use crate::events::engine::{combine_for_store, expire_events, trigger_day_start};
use crate::inventory::{auto_replenish, process_pending_inbounds};
use crate::sim::ledger::{DayResult, DayStoreResult};
use crate::sim::state::SimState;

/// Advance the state by one day.
pub fn simulate_day(state: &mut SimState, config: &SimConfig) -> Result<DayResult> {
    let day = state.day;
    let mut rng = state.rng();

    expire_events(state);
    trigger_day_start(state, config, &mut rng);

    // Month end is judged on the day being simulated, before the day
    // counter advances.
    let month_end = state.is_month_end(config.month_len_days);

    let mut result = DayResult {
        day,
        ..Default::default()
    };

    let store_ids: Vec<StoreId> = state.stores.keys().cloned().collect();
    for store_id in store_ids {
        let Some(mut store) = state.stores.remove(&store_id) else {
            continue;
        };
        let Some(station) = state.stations.get(&store.station).cloned() else {
            warn!(store = %store.id, station = %store.station, "unknown station, store skipped");
            state.stores.insert(store_id, store);
            continue;
        };

        let mut record = DayStoreResult::new(day, &store);
        record.inbound_arrivals = process_pending_inbounds(&mut store, day);

        match store.status {
            StoreStatus::Constructing => {
                construction_day(state.cash, &mut store, &mut record, day);
            }
            StoreStatus::Open if day >= store.operation_start_day => {
                trade_day(
                    state,
                    config,
                    &station,
                    &mut store,
                    &mut record,
                    day,
                    month_end,
                    &mut rng,
                );
            }
            _ => {}
        }

        record.status = store.status;
        record.net_cashflow = record.cash_in - record.cash_out;
        store.cash_balance += record.net_cashflow;
        state.cash += record.net_cashflow;

        result.total_revenue += record.revenue;
        result.total_operating_profit += record.operating_profit;
        result.total_net_cashflow += record.net_cashflow;

        state.stores.insert(store_id, store);
        result.store_results.push(record);
    }

    let finance = apply_hq_finance(state);
    result.finance_interest_cost = finance.interest;
    result.finance_credit_draw = finance.credit_draw;
    result.finance_credit_repay = finance.credit_repay;
    result.total_net_cashflow -= finance.interest;

    state.persist_rng(&rng);
    state.day += 1;

    if month_end {
        for store in state.stores.values_mut() {
            store.reset_month_trackers();
        }
        debug!(day, "month trackers reset");
    }

    Ok(result)
}

/// Spend the day's capex budget and open the store when the build
/// countdown reaches zero on or after the operation start day.
fn construction_day(hq_cash: Money, store: &mut Store, record: &mut DayStoreResult, day: Day) {
    if store.construction_days_remaining > 0 {
        let spend = store.capex_spend_per_day.max(0.0).min(hq_cash.max(0.0));
        if spend > 0.0 {
            record.capex_spend = spend;
            record.cash_out += spend;
        }
        store.construction_days_remaining -= 1;
        debug!(store = %store.id, spend, remaining = store.construction_days_remaining, "construction day");
    }

    if store.construction_days_remaining == 0 && day >= store.operation_start_day {
        store.status = StoreStatus::Open;
        let useful_life = if store.capex_useful_life_days > 0 {
            store.capex_useful_life_days
        } else {
            5 * 365
        };
        store.assets.push(Asset {
            name: format!("{}-CAPEX", store.name),
            capex: store.capex_total,
            useful_life_days: useful_life,
            in_service_day: day,
        });
        info!(store = %store.id, day, capex = store.capex_total, "store opened");
    }
}

/// Every service line and catalog project carries a month-to-date order
/// entry, so month-end checks see explicit zeros rather than gaps.
fn seed_mtd_order_keys(store: &mut Store) {
    for sid in store.service_lines.keys() {
        store.mtd.orders_by_service.entry(sid.clone()).or_insert(0);
    }
    for pid in store.projects.keys() {
        store.mtd.orders_by_project.entry(pid.clone()).or_insert(0);
    }
}

#[allow(clippy::too_many_arguments)]
fn trade_day(
    state: &SimState,
    config: &SimConfig,
    station: &Station,
    store: &mut Store,
    record: &mut DayStoreResult,
    day: Day,
    month_end: bool,
    rng: &mut RngStream,
) {
    // ---- events and workforce ----
    let mut effects = combine_for_store(state, store);

    record.workforce = workforce_daily(store, day, rng);
    if let Some(wf) = &record.workforce {
        record.recruiting_cost = wf.recruiting_cost;
        effects.capacity *= wf.capacity_factor;
    }

    let (mitigation_cost, actions) = store.mitigation.apply(&mut effects);
    effects.clamp_final();
    record.mitigation_cost = mitigation_cost;
    record.mitigation_actions = actions;
    record.store_closed = effects.closed;
    record.traffic_multiplier = effects.traffic;
    record.conversion_multiplier = effects.conversion;
    record.capacity_multiplier = effects.capacity;
    record.variable_cost_multiplier = effects.variable_cost;
    record.events = std::mem::take(&mut effects.events);

    // ---- traffic and orders ----
    let traffic = sample_traffic(station, effects.traffic, rng);
    record.fuel_traffic = traffic.fuel;
    record.visitor_traffic = traffic.visitor;

    let allocation = if effects.closed {
        OrderAllocation::default()
    } else {
        allocate_orders(store, traffic, config, effects.conversion, effects.capacity)
    };

    // ---- revenue, costs, labor hours ----
    let mut wash_orders = 0u32;
    let mut maint_orders = 0u32;
    let mut revenue_core = 0.0;
    let mut variable_cost = 0.0;
    let mut parts_cogs = 0.0;

    let mut revenue_by_service: BTreeMap<ServiceId, Money> = BTreeMap::new();
    let mut orders_by_project: BTreeMap<ProjectId, u32> = BTreeMap::new();
    let mut revenue_by_project: BTreeMap<ProjectId, Money> = BTreeMap::new();
    let mut parts_cogs_by_project: BTreeMap<ProjectId, Money> = BTreeMap::new();
    let mut labor_hours_by_role: BTreeMap<RoleId, f64> = BTreeMap::new();

    let service_ids: Vec<ServiceId> = store.service_lines.keys().cloned().collect();
    for sid in &service_ids {
        let line = store.service_lines[sid].clone();
        let orders = allocation.orders_by_service.get(sid).copied().unwrap_or(0);
        record.orders_by_service.insert(sid.clone(), orders);

        if line.project_mix.is_empty() {
            let line_revenue = orders as Money * line.price;
            revenue_core += line_revenue;
            revenue_by_service.insert(sid.clone(), line_revenue);
            variable_cost += orders as Money * line.variable_cost_per_order;
            parts_cogs += line_revenue * line.parts_cost_ratio;

            if let Some(role) = &line.labor_role {
                if line.labor_hours_per_order > 0.0 {
                    *labor_hours_by_role.entry(role.clone()).or_insert(0.0) +=
                        orders as f64 * line.labor_hours_per_order;
                }
            }
            match line.category {
                ServiceCategory::Wash => wash_orders += orders,
                ServiceCategory::Maintenance => maint_orders += orders,
                _ => {}
            }
        } else {
            let outcome = generate_projects(store, sid, orders, rng);
            let fulfilled = outcome.fulfilled();
            revenue_core += outcome.revenue;
            revenue_by_service.insert(sid.clone(), outcome.revenue);
            variable_cost +=
                fulfilled as Money * line.variable_cost_per_order + outcome.variable_cost;
            parts_cogs += outcome.parts_cogs;

            for (pid, cnt) in &outcome.counts {
                *orders_by_project.entry(pid.clone()).or_insert(0) += cnt;
                match store.projects.get(pid) {
                    Some(project) => {
                        *revenue_by_project.entry(pid.clone()).or_insert(0.0) +=
                            *cnt as Money * project.price;
                        if let Some(role) = &line.labor_role {
                            *labor_hours_by_role.entry(role.clone()).or_insert(0.0) +=
                                *cnt as f64 * project.labor_hours;
                        }
                    }
                    None => {
                        *revenue_by_project.entry(pid.clone()).or_insert(0.0) +=
                            *cnt as Money * line.price;
                    }
                }
            }
            for (pid, cogs) in &outcome.parts_cogs_by_project {
                *parts_cogs_by_project.entry(pid.clone()).or_insert(0.0) += cogs;
            }
            match line.category {
                ServiceCategory::Wash => wash_orders += fulfilled,
                ServiceCategory::Maintenance => maint_orders += fulfilled,
                _ => {}
            }
        }
    }
    variable_cost += allocation.consumable_cogs_total();

    // ---- value-added streams ----
    let value_added = match (&store.value_added, effects.closed) {
        (Some(va), false) => simulate_value_added(va, config, rng),
        _ => ValueAddedDay::default(),
    };
    record.online_revenue = value_added.online_revenue;
    record.online_gross_profit = value_added.online_gross_profit;
    record.insurance_revenue = value_added.insurance_revenue;
    record.insurance_gross_profit = value_added.insurance_gross_profit;
    record.used_car_revenue = value_added.used_car_revenue;
    record.used_car_gross_profit = value_added.used_car_gross_profit;
    record.used_car_deals = value_added.used_car_deals;

    // Cost pressure from events applies to direct costs, not to the
    // per-project stock consumption detail.
    variable_cost *= effects.variable_cost;
    parts_cogs *= effects.variable_cost;

    // ---- overheads ----
    let rent = store.opex.rent_per_day(config.month_len_days);
    let (water, elec) = store.opex.utilities(wash_orders, maint_orders);
    let depreciation: Money = store.assets.iter().map(|a| a.depreciation_on(day)).sum();
    let fixed_overhead = store.fixed_overhead_per_day + mitigation_cost;

    // ---- profit decomposition ----
    let gp_core = revenue_core - variable_cost - parts_cogs;
    if revenue_core > 0.0 {
        for (sid, rev) in &revenue_by_service {
            record
                .gross_profit_by_service
                .insert(sid.clone(), gp_core * (rev / revenue_core));
        }
        for (pid, rev) in &revenue_by_project {
            record
                .gross_profit_by_project
                .insert(pid.clone(), gp_core * (rev / revenue_core));
        }
    }
    for (sid, rev) in &revenue_by_service {
        let category = store.service_lines[sid].category;
        *record.revenue_by_category.entry(category).or_insert(0.0) += rev;
        if let Some(gp) = record.gross_profit_by_service.get(sid) {
            let gp = *gp;
            *record
                .gross_profit_by_category
                .entry(category)
                .or_insert(0.0) += gp;
        }
    }

    // Project revenue splits into labor and parts portions at the posted
    // labor hour price.
    let mut labor_revenue = 0.0;
    let mut parts_revenue = 0.0;
    let mut parts_gross_profit = 0.0;
    for (pid, rev) in &revenue_by_project {
        let Some(project) = store.projects.get(pid) else {
            continue;
        };
        let ratio = project.labor_revenue_ratio(store.labor_hour_price);
        let parts_portion = rev * (1.0 - ratio);
        labor_revenue += rev * ratio;
        parts_revenue += parts_portion;
        let cogs = parts_cogs_by_project.get(pid).copied().unwrap_or(0.0);
        parts_gross_profit += (parts_portion - cogs).max(0.0);
    }

    let va_revenue = value_added.revenue();
    let va_gross_profit = value_added.gross_profit();
    let operating_before_labor =
        gp_core + va_gross_profit - depreciation - fixed_overhead - rent - water - elec;

    // ---- payroll ----
    let inputs = PayrollInputs {
        orders_by_service: record.orders_by_service.clone(),
        orders_by_project: orders_by_project.clone(),
        revenue_by_service: revenue_by_service.clone(),
        gross_profit_by_service: record.gross_profit_by_service.clone(),
        gross_profit_by_project: record.gross_profit_by_project.clone(),
        revenue_by_category: record.revenue_by_category.clone(),
        gross_profit_by_category: record.gross_profit_by_category.clone(),
        labor_revenue,
        parts_revenue,
        parts_gross_profit,
        labor_hours_by_role: labor_hours_by_role.clone(),
        is_month_end: month_end,
    };
    let payroll = compute_payroll(store, &inputs, config);
    let labor_cost = payroll.total;
    let operating_profit = operating_before_labor - labor_cost;

    // ---- replenishment, after today's consumption ----
    let (replenishment_cost, replenishment_orders) = auto_replenish(store, day, state.cash);

    // ---- cash ----
    record.revenue = revenue_core + va_revenue;
    record.revenue_by_service = revenue_by_service;
    record.orders_by_project = orders_by_project;
    record.parts_cogs_by_project = parts_cogs_by_project;
    record.labor_revenue = labor_revenue;
    record.parts_revenue = parts_revenue;
    record.parts_gross_profit = parts_gross_profit;
    record.variable_cost = variable_cost;
    record.parts_cogs = parts_cogs;
    record.labor_cost = labor_cost;
    record.depreciation_cost = depreciation;
    record.fixed_overhead = fixed_overhead;
    record.cost_rent = rent;
    record.cost_water = water;
    record.cost_elec = elec;
    record.replenishment_cost = replenishment_cost;
    record.replenishment_orders = replenishment_orders;
    record.operating_profit = operating_profit;

    record.cash_in = record.revenue;
    record.cash_out += labor_cost
        + fixed_overhead
        + rent
        + water
        + elec
        + replenishment_cost
        + record.recruiting_cost;

    // ---- month-to-date ----
    seed_mtd_order_keys(store);
    for (sid, orders) in &record.orders_by_service {
        *store.mtd.orders_by_service.entry(sid.clone()).or_insert(0) += orders;
    }
    for (pid, cnt) in &record.orders_by_project {
        *store.mtd.orders_by_project.entry(pid.clone()).or_insert(0) += cnt;
    }
    store.mtd.revenue += record.revenue;
    store.mtd.variable_cost += variable_cost;
    store.mtd.parts_cogs += parts_cogs;
    store.mtd.labor_cost += labor_cost;
    store.mtd.depreciation += depreciation;
    store.mtd.fixed_overhead += fixed_overhead;
    store.mtd.operating_profit += operating_profit;
    store.mtd.cash_in += record.cash_in;
    store.mtd.cash_out += record.cash_out;
    for row in &payroll.rows {
        *store
            .mtd
            .commission_by_role
            .entry(row.role.clone())
            .or_insert(0.0) += row.commission_total;
    }

    record.payroll = payroll.rows;
}
