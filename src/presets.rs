//! Runnable starter content.
//!
//! One station, one fully configured auto-service store with a wash and
//! maintenance catalog, a four-role payroll, seeded inventory, and the
//! stock event templates. `default_state` is what `init` writes so a fresh
//! install simulates meaningfully on day one.

use std::collections::BTreeMap;

use crate::chain::service::{ServiceCategory, ServiceLine, ServiceProject};
use crate::chain::staffing::RolePlan;
use crate::chain::station::Station;
use crate::chain::store::{Store, StoreStatus};
use crate::core::types::{ProjectId, RoleId, ServiceId, Sku};
use crate::engine::value_added::ValueAddedConfig;
use crate::events::template::default_templates;
use crate::inventory::InventoryItem;
use crate::sim::state::SimState;

/// Fill a store with the demo catalog, payroll, and policies. Existing
/// entries under the same ids are replaced.
pub fn apply_default_store_template(store: &mut Store) {
    if store.fixed_overhead_per_day == 0.0 {
        store.fixed_overhead_per_day = 200.0;
    }
    store.strict_parts = true;

    store.service_lines.insert(
        ServiceId::new("AUTO_WASH"),
        ServiceLine {
            id: ServiceId::new("AUTO_WASH"),
            name: "Automatic wash".into(),
            category: ServiceCategory::Wash,
            price: 30.0,
            conversion_from_fuel: 0.05,
            conversion_from_visitor: 0.10,
            capacity_per_day: 250,
            variable_cost_per_order: 3.0,
            parts_cost_ratio: 0.0,
            variable_labor_per_order: 0.3,
            consumable_sku: Some(Sku::new("CHEM")),
            consumable_units_per_order: 0.05,
            ..Default::default()
        },
    );
    store.service_lines.insert(
        ServiceId::new("MANUAL_WASH"),
        ServiceLine {
            id: ServiceId::new("MANUAL_WASH"),
            name: "Hand wash".into(),
            category: ServiceCategory::Wash,
            price: 45.0,
            conversion_from_fuel: 0.03,
            conversion_from_visitor: 0.06,
            capacity_per_day: 80,
            variable_cost_per_order: 5.0,
            parts_cost_ratio: 0.0,
            variable_labor_per_order: 3.0,
            consumable_sku: Some(Sku::new("CHEM")),
            consumable_units_per_order: 0.10,
            ..Default::default()
        },
    );

    store.projects.insert(
        ProjectId::new("OIL_CHANGE"),
        ServiceProject {
            id: ProjectId::new("OIL_CHANGE"),
            name: "Oil change".into(),
            price: 299.0,
            labor_hours: 0.8,
            variable_cost: 5.0,
            parts: BTreeMap::from([(Sku::new("OIL"), 4.0), (Sku::new("FILTER"), 1.0)]),
        },
    );
    store.projects.insert(
        ProjectId::new("TIRE_REPAIR"),
        ServiceProject {
            id: ProjectId::new("TIRE_REPAIR"),
            name: "Tire repair".into(),
            price: 80.0,
            labor_hours: 0.5,
            variable_cost: 2.0,
            parts: BTreeMap::from([(Sku::new("PATCH"), 1.0)]),
        },
    );
    store.projects.insert(
        ProjectId::new("WIPER"),
        ServiceProject {
            id: ProjectId::new("WIPER"),
            name: "Wiper replacement".into(),
            price: 120.0,
            labor_hours: 0.2,
            variable_cost: 1.0,
            parts: BTreeMap::from([(Sku::new("WIPER_BLADE"), 2.0)]),
        },
    );
    store.service_lines.insert(
        ServiceId::new("AUTO_SERVICE"),
        ServiceLine {
            id: ServiceId::new("AUTO_SERVICE"),
            name: "Auto service".into(),
            category: ServiceCategory::Maintenance,
            price: 200.0,
            conversion_from_fuel: 0.01,
            conversion_from_visitor: 0.02,
            capacity_per_day: 30,
            variable_cost_per_order: 1.0,
            parts_cost_ratio: 0.55,
            variable_labor_per_order: 0.0,
            labor_role: Some(RoleId::new("technician")),
            labor_hours_per_order: 0.6,
            project_mix: vec![
                (ProjectId::new("OIL_CHANGE"), 0.45),
                (ProjectId::new("TIRE_REPAIR"), 0.35),
                (ProjectId::new("WIPER"), 0.20),
            ],
            ..Default::default()
        },
    );

    store.payroll.insert(
        RoleId::new("manager"),
        RolePlan {
            profit_share_rate: 0.03,
            ..RolePlan::new("manager", 1, 8000.0)
        },
    );
    store.payroll.insert(
        RoleId::new("washer"),
        RolePlan {
            piece_rate_by_service: BTreeMap::from([
                (ServiceId::new("MANUAL_WASH"), 4.0),
                (ServiceId::new("AUTO_WASH"), 0.5),
            ]),
            monthly_tier_bonus: vec![(1500, 300.0), (2200, 600.0)],
            ..RolePlan::new("washer", 3, 4500.0)
        },
    );
    store.payroll.insert(
        RoleId::new("technician"),
        RolePlan {
            piece_rate_by_project: BTreeMap::from([
                (ProjectId::new("OIL_CHANGE"), 25.0),
                (ProjectId::new("TIRE_REPAIR"), 10.0),
                (ProjectId::new("WIPER"), 8.0),
            ]),
            gross_profit_commission_by_service: BTreeMap::from([(
                ServiceId::new("AUTO_SERVICE"),
                0.05,
            )]),
            ..RolePlan::new("technician", 2, 7000.0)
        },
    );
    store.payroll.insert(
        RoleId::new("front_desk"),
        RolePlan {
            sales_commission_by_service: BTreeMap::from([
                (ServiceId::new("AUTO_WASH"), 0.01),
                (ServiceId::new("MANUAL_WASH"), 0.01),
                (ServiceId::new("AUTO_SERVICE"), 0.008),
            ]),
            ..RolePlan::new("front_desk", 1, 4500.0)
        },
    );

    store.value_added = Some(ValueAddedConfig::default());
}

/// One station, one open templated store, seeded stock, stock event
/// templates. Cash and seed come from the state defaults.
pub fn default_state() -> SimState {
    let mut state = SimState::new();
    state.event_templates = default_templates();

    let mut station = Station::new("S1", "Demo Station");
    station.fuel_vehicles_per_day = 700;
    station.visitor_vehicles_per_day = 10;
    station.traffic_volatility = 0.10;
    state.stations.insert(station.id.clone(), station);

    let mut store = Store::new("M1", "Demo Auto Services", "S1");
    store.status = StoreStatus::Open;
    store.fixed_overhead_per_day = 200.0;
    apply_default_store_template(&mut store);

    for (sku, name, unit_cost, qty) in [
        ("CHEM", "Wash chemical (L)", 20.0, 200.0),
        ("OIL", "Engine oil (L)", 35.0, 200.0),
        ("FILTER", "Oil filter", 25.0, 60.0),
        ("PATCH", "Tire patch", 3.0, 300.0),
        ("WIPER_BLADE", "Wiper blade", 18.0, 120.0),
    ] {
        store.inventory.insert(
            Sku::new(sku),
            InventoryItem {
                sku: Sku::new(sku),
                name: name.into(),
                unit_cost,
                qty,
            },
        );
    }

    state.stores.insert(store.id.clone(), store);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimConfig;
    use crate::engine::tick::simulate_day;

    #[test]
    fn default_state_passes_validation() {
        let state = default_state();
        assert!(state.validate().is_ok());
        assert_eq!(state.day, 1);
        assert_eq!(state.stations.len(), 1);
        assert_eq!(state.stores.len(), 1);
        assert_eq!(state.event_templates.len(), 5);
    }

    #[test]
    fn template_wires_catalog_and_payroll_together() {
        let state = default_state();
        let store = &state.stores[&crate::core::types::StoreId::new("M1")];

        assert_eq!(store.service_lines.len(), 3);
        assert_eq!(store.projects.len(), 3);
        assert_eq!(store.payroll.len(), 4);
        assert!(store.strict_parts);

        // Every project in the mix and every consumable is stocked.
        let auto_service = &store.service_lines[&ServiceId::new("AUTO_SERVICE")];
        for (pid, _) in &auto_service.project_mix {
            assert!(store.projects.contains_key(pid));
        }
        for line in store.service_lines.values() {
            if let Some(sku) = &line.consumable_sku {
                assert!(store.inventory.contains_key(sku));
            }
        }
        let mix_sum: f64 = auto_service.project_mix.iter().map(|(_, w)| w).sum();
        assert!((mix_sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn default_state_simulates_a_revenue_day() {
        let mut state = default_state();
        // Drop the stochastic templates so no event can close the store.
        state.event_templates.clear();
        let config = SimConfig::default();

        let result = simulate_day(&mut state, &config).unwrap();

        assert_eq!(result.store_results.len(), 1);
        let sr = &result.store_results[0];
        assert!(sr.revenue > 0.0);
        assert!(sr.total_orders() > 0);
        assert_eq!(state.day, 2);
    }

    #[test]
    fn overhead_respects_an_existing_value() {
        let mut store = Store::new("M9", "Other", "S1");
        store.fixed_overhead_per_day = 350.0;
        apply_default_store_template(&mut store);
        assert_eq!(store.fixed_overhead_per_day, 350.0);
    }
}
