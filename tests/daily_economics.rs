//! Daily economics end to end
//!
//! Exercises the documented numeric scenarios through `Simulation`:
//! - a steady store realizes exactly traffic x conversion orders
//! - an injected traffic event halves orders for its duration, then reverts
//! - a closure event zeroes revenue but not the fixed bill
//! - payroll fixed pay and burden are independent of revenue
//! - HQ cash movement equals summed net cashflow plus credit motion
//! - inventory stays non-negative under strict parts
//! - construction days spend HQ cash without trading

use forecourt::chain::service::{ServiceCategory, ServiceLine};
use forecourt::chain::staffing::RolePlan;
use forecourt::chain::station::Station;
use forecourt::chain::store::{Store, StoreStatus};
use forecourt::core::config::SimConfig;
use forecourt::core::types::{RoleId, ServiceId, Sku, StoreId};
use forecourt::events::template::{EventScope, EventTemplate};
use forecourt::inventory::InventoryItem;
use forecourt::presets::default_state;
use forecourt::sim::{SimState, Simulation};

const WASH: &str = "WASH";

fn wash_line(price: f64) -> ServiceLine {
    ServiceLine {
        id: ServiceId::new(WASH),
        name: "Wash".into(),
        category: ServiceCategory::Wash,
        price,
        conversion_from_fuel: 0.15,
        capacity_per_day: 200,
        ..Default::default()
    }
}

/// 1,000 fuel vehicles, zero volatility, no templates: fully deterministic.
fn steady_state() -> SimState {
    let mut state = SimState::new();
    let mut station = Station::new("ST01", "Station");
    station.fuel_vehicles_per_day = 1000;
    station.visitor_vehicles_per_day = 0;
    station.traffic_volatility = 0.0;
    state.stations.insert(station.id.clone(), station);

    let mut store = Store::new("M1", "Demo", "ST01");
    store.status = StoreStatus::Open;
    store
        .service_lines
        .insert(ServiceId::new(WASH), wash_line(30.0));
    state.stores.insert(store.id.clone(), store);
    state
}

fn sim(state: SimState) -> Simulation {
    Simulation::new(SimConfig::default(), state)
}

/// Template with pinned multipliers so injected events are exact.
fn fixed_template(id: &str, traffic: f64, closed: bool) -> EventTemplate {
    EventTemplate {
        template_id: id.into(),
        name: id.into(),
        traffic_multiplier_min: traffic,
        traffic_multiplier_max: traffic,
        conversion_multiplier_min: 1.0,
        conversion_multiplier_max: 1.0,
        capacity_multiplier_min: 1.0,
        capacity_multiplier_max: 1.0,
        variable_cost_multiplier_min: 1.0,
        variable_cost_multiplier_max: 1.0,
        store_closed: closed,
        ..Default::default()
    }
}

fn orders_on(sim: &Simulation, day_index: usize) -> u32 {
    sim.ledger().records()[day_index].store_results[0].orders_by_service[&ServiceId::new(WASH)]
}

// ============================================================================
// Steady-state allocation
// ============================================================================

#[test]
fn test_steady_store_realizes_exactly_150_orders() {
    let mut sim = sim(steady_state());
    sim.simulate(5).unwrap();

    for record in sim.ledger().records() {
        let sr = &record.store_results[0];
        assert_eq!(sr.fuel_traffic, 1000);
        assert_eq!(sr.orders_by_service[&ServiceId::new(WASH)], 150);
        assert!((sr.revenue - 4500.0).abs() < 1e-6);
    }
}

// ============================================================================
// Event interruption
// ============================================================================

#[test]
fn test_injected_traffic_event_halves_orders_then_reverts() {
    let mut state = steady_state();
    state
        .event_templates
        .insert("road_block".into(), fixed_template("road_block", 0.5, false));
    let mut sim = sim(state);

    sim.inject_event("road_block", EventScope::Store, "M1", Some(2), None)
        .unwrap();
    sim.simulate(3).unwrap();

    assert_eq!(orders_on(&sim, 0), 75);
    assert_eq!(orders_on(&sim, 1), 75);
    assert_eq!(orders_on(&sim, 2), 150);

    // The affected days carry the event on their records.
    let day1 = &sim.ledger().records()[0].store_results[0];
    assert_eq!(day1.events.len(), 1);
    assert!((day1.traffic_multiplier - 0.5).abs() < 1e-9);
    let day3 = &sim.ledger().records()[2].store_results[0];
    assert!(day3.events.is_empty());
}

#[test]
fn test_closure_event_zeroes_revenue_but_not_the_fixed_bill() {
    let mut state = steady_state();
    state
        .event_templates
        .insert("outage".into(), fixed_template("outage", 1.0, true));
    let mut sim = sim(state);

    sim.inject_event("outage", EventScope::Store, "M1", Some(1), None)
        .unwrap();
    sim.simulate(2).unwrap();

    let closed = &sim.ledger().records()[0].store_results[0];
    assert!(closed.store_closed);
    assert_eq!(closed.total_orders(), 0);
    assert_eq!(closed.revenue, 0.0);
    // Rent 500 and base electricity 50 are still due.
    assert!((closed.cash_out - 550.0).abs() < 1e-6);
    assert!((closed.net_cashflow + 550.0).abs() < 1e-6);

    let reopened = &sim.ledger().records()[1].store_results[0];
    assert!(!reopened.store_closed);
    assert_eq!(reopened.orders_by_service[&ServiceId::new(WASH)], 150);
}

// ============================================================================
// Payroll
// ============================================================================

#[test]
fn test_payroll_fixed_components_are_independent_of_revenue() {
    let clerk = RolePlan {
        position_allowance: 1500.0,
        social_security_rate: 0.30,
        housing_fund_rate: 0.12,
        ..RolePlan::new("clerk", 1, 6000.0)
    };

    let mut results = Vec::new();
    for price in [30.0, 300.0] {
        let mut state = steady_state();
        let store = state.stores.get_mut(&StoreId::new("M1")).unwrap();
        store
            .service_lines
            .insert(ServiceId::new(WASH), wash_line(price));
        store.payroll.insert(RoleId::new("clerk"), clerk.clone());

        let mut sim = sim(state);
        sim.simulate(1).unwrap();
        let record = &sim.ledger().records()[0].store_results[0];
        let row = record
            .payroll
            .iter()
            .find(|r| r.role == RoleId::new("clerk"))
            .unwrap()
            .clone();
        results.push(row);
    }

    for row in &results {
        // 6000 + 1500 over 26 workdays; burden at 42% of fixed pay.
        assert!((row.fixed_pay * 26.0 - 7500.0).abs() < 1e-6);
        assert!((row.employer_burden * 26.0 - 3150.0).abs() < 1e-6);
        assert_eq!(row.commission_total, 0.0);
    }
    assert_eq!(results[0].fixed_pay, results[1].fixed_pay);
    assert_eq!(results[0].employer_burden, results[1].employer_burden);
}

// ============================================================================
// Cash conservation
// ============================================================================

fn assert_cash_identity(sim: &Simulation, start_cash: f64) {
    let records = sim.ledger().records();
    let net: f64 = records.iter().map(|r| r.total_net_cashflow).sum();
    let draws: f64 = records.iter().map(|r| r.finance_credit_draw).sum();
    let repays: f64 = records.iter().map(|r| r.finance_credit_repay).sum();
    let expected = start_cash + net + draws - repays;
    assert!(
        (sim.state().cash - expected).abs() < 1e-6,
        "cash {} != expected {}",
        sim.state().cash,
        expected
    );
}

#[test]
fn test_cash_conservation_over_a_demo_month() {
    let mut state = default_state();
    state.set_seed(42);
    let start_cash = state.cash;
    let mut sim = Simulation::new(SimConfig::default(), state);

    sim.simulate(30).unwrap();

    assert_cash_identity(&sim, start_cash);

    // Per-store: summed net cashflow equals the balance movement.
    for (store_id, store) in &sim.state().stores {
        let net: f64 = sim
            .ledger()
            .records()
            .iter()
            .flat_map(|r| r.store_results.iter())
            .filter(|sr| sr.store_id == *store_id)
            .map(|sr| sr.net_cashflow)
            .sum();
        assert!((store.cash_balance - net).abs() < 1e-6);
    }
}

#[test]
fn test_credit_draws_cover_negative_cash() {
    let mut state = SimState::new();
    let station = Station::new("ST01", "Station");
    state.stations.insert(station.id.clone(), station);
    let mut store = Store::new("M1", "Sink", "ST01");
    store.status = StoreStatus::Open;
    store.fixed_overhead_per_day = 950.0;
    state.stores.insert(store.id.clone(), store);
    state.cash = 2000.0;
    state.hq_credit_limit = 100_000.0;
    state.hq_auto_finance = true;

    let mut sim = sim(state);
    sim.simulate(3).unwrap();

    // 1,500/day burn: day 1 runs cash down to 500, day 2 draws 1,000,
    // day 3 pays 0.50 interest and draws 1,500.50.
    let records = sim.ledger().records();
    assert_eq!(records[0].finance_credit_draw, 0.0);
    assert!((records[1].finance_credit_draw - 1000.0).abs() < 1e-9);
    assert!((records[2].finance_credit_draw - 1500.5).abs() < 1e-6);
    assert!((records[2].finance_interest_cost - 0.5).abs() < 1e-9);
    assert!((sim.state().hq_credit_used - 2500.5).abs() < 1e-6);
    assert!(sim.state().cash.abs() < 1e-6);
    assert_cash_identity(&sim, 2000.0);
}

#[test]
fn test_surplus_cash_repays_credit() {
    let mut state = steady_state();
    state.hq_credit_limit = 50_000.0;
    state.hq_credit_used = 10_000.0;
    state.hq_auto_finance = true;
    let mut sim = sim(state);

    sim.simulate(3).unwrap();

    let records = sim.ledger().records();
    let repays: f64 = records.iter().map(|r| r.finance_credit_repay).sum();
    assert!((repays - 10_000.0).abs() < 1e-6);
    assert!((records[0].finance_interest_cost - 5.0).abs() < 1e-9);
    assert_eq!(sim.state().hq_credit_used, 0.0);
    assert_cash_identity(&sim, 200_000.0);
}

// ============================================================================
// Inventory
// ============================================================================

#[test]
fn test_inventory_stays_non_negative_under_strict_parts() {
    let mut state = default_state();
    state.set_seed(42);
    let mut sim = Simulation::new(SimConfig::default(), state);

    for _ in 0..60 {
        sim.simulate(1).unwrap();
        for store in sim.state().stores.values() {
            for item in store.inventory.values() {
                assert!(
                    item.qty >= -1e-9,
                    "negative stock for {} on day {}",
                    item.sku,
                    sim.last_simulated_day()
                );
            }
        }
    }
}

#[test]
fn test_consumable_stock_caps_realized_orders() {
    let mut state = steady_state();
    let store = state.stores.get_mut(&StoreId::new("M1")).unwrap();
    let mut line = wash_line(30.0);
    line.consumable_sku = Some(Sku::new("CHEM"));
    line.consumable_units_per_order = 1.0;
    store.service_lines.insert(ServiceId::new(WASH), line);
    store.inventory.insert(
        Sku::new("CHEM"),
        InventoryItem {
            sku: Sku::new("CHEM"),
            name: "Chem".into(),
            unit_cost: 20.0,
            qty: 20.0,
        },
    );

    let mut sim = sim(state);
    sim.simulate(2).unwrap();

    // Demand is 150 but stock covers 20 orders; the rest is lost, not
    // back-ordered, and day 2 has nothing left to sell.
    assert_eq!(orders_on(&sim, 0), 20);
    assert!((sim.ledger().records()[0].store_results[0].revenue - 600.0).abs() < 1e-6);
    assert_eq!(orders_on(&sim, 1), 0);
    let store = &sim.state().stores[&StoreId::new("M1")];
    assert!(store.inventory[&Sku::new("CHEM")].qty.abs() < 1e-9);
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_construction_days_spend_without_trading() {
    let mut state = steady_state();
    let store = state.stores.get_mut(&StoreId::new("M1")).unwrap();
    store.status = StoreStatus::Constructing;
    store.build_days_total = 2;
    store.construction_days_remaining = 2;
    store.capex_total = 5000.0;
    store.capex_spend_per_day = 1000.0;
    store.operation_start_day = 1;
    let start_cash = state.cash;

    let mut sim = sim(state);
    sim.simulate(2).unwrap();

    let records = sim.ledger().records();
    let day1 = &records[0].store_results[0];
    assert_eq!(day1.status, StoreStatus::Constructing);
    assert!((day1.capex_spend - 1000.0).abs() < 1e-9);
    assert_eq!(day1.revenue, 0.0);
    assert_eq!(day1.total_orders(), 0);

    // Two construction days drew 2,000 of capex from HQ, nothing else.
    assert!((sim.state().cash - (start_cash - 2000.0)).abs() < 1e-6);

    // Countdown hit zero on day 2; the store opens for day 3.
    sim.simulate(1).unwrap();
    let day3 = &sim.ledger().records()[2].store_results[0];
    assert_eq!(day3.status, StoreStatus::Open);
    assert_eq!(day3.orders_by_service[&ServiceId::new(WASH)], 150);

    let store = &sim.state().stores[&StoreId::new("M1")];
    assert_eq!(store.assets.len(), 1);
    assert!((store.assets[0].capex - 5000.0).abs() < 1e-9);
    assert_eq!(store.assets[0].in_service_day, 2);
}
