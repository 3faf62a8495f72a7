//! Daily workforce churn
//!
//! Stores that opt into workforce modelling run three steps each day:
//! pending hires that have finished their lead time join the headcount,
//! every current head rolls against the turnover rate, and when the store
//! is under plan a recruiting budget is spent for a Poisson-distributed
//! batch of future hires. The resulting capacity factor scales service
//! capacity before event mitigations apply.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::staffing::PendingHire;
use crate::chain::store::Store;
use crate::core::rng::RngStream;
use crate::core::types::{Day, Money};

/// Outcome of one store's workforce step for one day.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkforceDay {
    pub headcount_start: u32,
    /// Hires whose lead time elapsed today.
    pub hired: u32,
    pub lost: u32,
    pub headcount_end: u32,
    pub recruiting_cost: Money,
    pub capacity_factor: f64,
}

/// Run the workforce step for one store. Returns `None` when the store
/// does not model workforce, consuming no draws.
pub fn workforce_daily(store: &mut Store, day: Day, rng: &mut RngStream) -> Option<WorkforceDay> {
    let plan = store.workforce.as_mut()?;
    let headcount_start = plan.current_headcount;

    let mut hired = 0u32;
    store.pending_hires.retain(|hire| {
        if hire.arrive_day <= day {
            hired += hire.qty;
            false
        } else {
            true
        }
    });
    plan.current_headcount += hired;

    let mut lost = 0u32;
    for _ in 0..plan.current_headcount {
        if rng.unit_f64() < plan.daily_turnover_rate {
            lost += 1;
        }
    }
    plan.current_headcount -= lost;

    let mut recruiting_cost = 0.0;
    if plan.recruiting_enabled
        && plan.current_headcount < plan.planned_headcount
        && plan.recruiting_daily_budget > 0.0
    {
        recruiting_cost = plan.recruiting_daily_budget;
        let lambda =
            plan.recruiting_daily_budget / 100.0 * plan.recruiting_hire_rate_per_100_budget;
        let qty = rng.poisson(lambda);
        if qty > 0 {
            let arrive_day = day + plan.recruiting_lead_days;
            debug!(store = %store.id, qty, arrive_day, "recruiting batch ordered");
            store.pending_hires.push(PendingHire {
                qty,
                order_day: day,
                arrive_day,
            });
        }
    }

    let plan = store.workforce.as_ref()?;
    Some(WorkforceDay {
        headcount_start,
        hired,
        lost,
        headcount_end: plan.current_headcount,
        recruiting_cost,
        capacity_factor: plan.capacity_factor(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::staffing::WorkforcePlan;

    fn workforce_store(plan: WorkforcePlan) -> Store {
        let mut store = Store::new("S1", "Demo", "ST01");
        store.workforce = Some(plan);
        store
    }

    #[test]
    fn test_no_workforce_consumes_no_draws() {
        let mut store = Store::new("S1", "Demo", "ST01");
        let mut rng = RngStream::new(42);
        let before = rng.word_pos();
        assert!(workforce_daily(&mut store, 1, &mut rng).is_none());
        assert_eq!(rng.word_pos(), before);
    }

    #[test]
    fn test_pending_hires_land_after_lead_time() {
        let mut store = workforce_store(WorkforcePlan {
            planned_headcount: 5,
            current_headcount: 2,
            daily_turnover_rate: 0.0,
            ..Default::default()
        });
        store.pending_hires.push(PendingHire {
            qty: 2,
            order_day: 1,
            arrive_day: 8,
        });
        store.pending_hires.push(PendingHire {
            qty: 1,
            order_day: 3,
            arrive_day: 10,
        });

        let mut rng = RngStream::new(42);
        let report = workforce_daily(&mut store, 8, &mut rng).unwrap();
        assert_eq!(report.headcount_start, 2);
        assert_eq!(report.hired, 2);
        assert_eq!(report.headcount_end, 4);
        assert_eq!(store.pending_hires.len(), 1);
        assert_eq!(store.pending_hires[0].arrive_day, 10);
    }

    #[test]
    fn test_full_turnover_empties_the_roster() {
        let mut store = workforce_store(WorkforcePlan {
            planned_headcount: 3,
            current_headcount: 3,
            daily_turnover_rate: 1.0,
            ..Default::default()
        });
        let mut rng = RngStream::new(42);
        let report = workforce_daily(&mut store, 1, &mut rng).unwrap();
        assert_eq!(report.lost, 3);
        assert_eq!(report.headcount_end, 0);
        // ratio 0 still clamps to the capacity floor
        assert!((report.capacity_factor - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_recruiting_spends_budget_only_when_under_plan() {
        let mut at_plan = workforce_store(WorkforcePlan {
            planned_headcount: 2,
            current_headcount: 2,
            daily_turnover_rate: 0.0,
            recruiting_enabled: true,
            recruiting_daily_budget: 200.0,
            ..Default::default()
        });
        let mut rng = RngStream::new(42);
        let report = workforce_daily(&mut at_plan, 1, &mut rng).unwrap();
        assert_eq!(report.recruiting_cost, 0.0);
        assert!(at_plan.pending_hires.is_empty());

        let mut under_plan = workforce_store(WorkforcePlan {
            planned_headcount: 5,
            current_headcount: 2,
            daily_turnover_rate: 0.0,
            recruiting_enabled: true,
            recruiting_daily_budget: 200.0,
            recruiting_lead_days: 7,
            ..Default::default()
        });
        let report = workforce_daily(&mut under_plan, 3, &mut rng).unwrap();
        assert_eq!(report.recruiting_cost, 200.0);
        for hire in &under_plan.pending_hires {
            assert_eq!(hire.order_day, 3);
            assert_eq!(hire.arrive_day, 10);
            assert!(hire.qty > 0);
        }
    }

    #[test]
    fn test_recruiting_disabled_costs_nothing() {
        let mut store = workforce_store(WorkforcePlan {
            planned_headcount: 5,
            current_headcount: 1,
            daily_turnover_rate: 0.0,
            recruiting_enabled: false,
            recruiting_daily_budget: 500.0,
            ..Default::default()
        });
        let mut rng = RngStream::new(42);
        let report = workforce_daily(&mut store, 1, &mut rng).unwrap();
        assert_eq!(report.recruiting_cost, 0.0);
        assert!(store.pending_hires.is_empty());
    }
}
