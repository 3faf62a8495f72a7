//! Command surface over a run
//!
//! `Simulation` owns the state, the ledger and the snapshot store and
//! exposes the operations a frontend drives: simulate N days, roll back,
//! reset, re-seed, inject an event, buy stock, close a store. Simulate is
//! all-or-nothing: the requested range runs on a working copy and commits
//! only when every day succeeded, so a failed call leaves no half-run.

use tracing::info;

use crate::chain::store::StoreStatus;
use crate::core::config::SimConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{Day, Money, Sku, StoreId};
use crate::engine::tick::simulate_day;
use crate::events::engine::{inject_from_template, ActiveEvent};
use crate::events::template::EventScope;
use crate::inventory::apply_purchase;
use crate::sim::ledger::{DayResult, Ledger};
use crate::sim::snapshot::SnapshotStore;
use crate::sim::state::SimState;

pub struct Simulation {
    config: SimConfig,
    state: SimState,
    /// State as constructed, the rollback floor and reset target.
    initial: SimState,
    ledger: Ledger,
    snapshots: SnapshotStore,
}

impl Simulation {
    pub fn new(config: SimConfig, state: SimState) -> Self {
        let initial = state.clone();
        Self {
            config,
            state,
            initial,
            ledger: Ledger::new(),
            snapshots: SnapshotStore::new(),
        }
    }

    /// Rebuild a run from persisted pieces. `initial` is the day-one state
    /// the run was constructed with, kept as the rollback floor.
    pub fn resume(
        config: SimConfig,
        initial: SimState,
        state: SimState,
        ledger: Ledger,
        snapshots: SnapshotStore,
    ) -> Self {
        Self {
            config,
            state,
            initial,
            ledger,
            snapshots,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// State as constructed, before any simulated day.
    pub fn initial_state(&self) -> &SimState {
        &self.initial
    }

    pub fn state_mut(&mut self) -> &mut SimState {
        &mut self.state
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Day that would be simulated next.
    pub fn current_day(&self) -> Day {
        self.state.day
    }

    /// Last fully simulated day, zero before any simulation.
    pub fn last_simulated_day(&self) -> Day {
        self.state.day.saturating_sub(1)
    }

    /// Restore persisted progress, replacing the live ledger and
    /// snapshots wholesale.
    pub fn attach_history(&mut self, ledger: Ledger, snapshots: SnapshotStore) {
        self.ledger = ledger;
        self.snapshots = snapshots;
    }

    /// Advance the run by `days`. The whole range commits or none of it
    /// does.
    pub fn simulate(&mut self, days: u32) -> Result<Vec<DayResult>> {
        if days == 0 || days > self.config.max_simulate_days {
            return Err(SimError::DaysOutOfRange {
                days,
                max: self.config.max_simulate_days,
            });
        }

        let mut working = self.state.clone();
        let mut results = Vec::with_capacity(days as usize);
        let mut staged_snapshots = Vec::with_capacity(days as usize);

        for _ in 0..days {
            let simulated = working.day;
            let result = simulate_day(&mut working, &self.config)?;
            staged_snapshots.push((simulated, serde_json::to_string(&working)?));
            results.push(result);
        }

        self.state = working;
        for (day, serialized) in staged_snapshots {
            self.snapshots.insert_serialized(day, serialized);
        }
        self.ledger.extend(results.iter().cloned());
        info!(days, up_to = self.last_simulated_day(), "simulated");
        Ok(results)
    }

    /// Rewind the run by `days`, restoring the snapshot of the target
    /// day and truncating the ledger and snapshots after it. Rolling
    /// back to before day one restores the initial state.
    pub fn rollback(&mut self, days: u32) -> Result<Day> {
        if days == 0 || days > self.config.max_rollback_days {
            return Err(SimError::DaysOutOfRange {
                days,
                max: self.config.max_rollback_days,
            });
        }
        let last = self.last_simulated_day();
        if days > last {
            return Err(SimError::InvalidArgument(format!(
                "cannot roll back {} days, only {} simulated",
                days, last
            )));
        }

        let target = last - days;
        self.state = if target == 0 {
            self.initial.clone()
        } else {
            self.snapshots.restore(target)?
        };
        self.ledger.truncate_after(target);
        self.snapshots.truncate_after(target);
        info!(target, "rolled back");
        Ok(target)
    }

    /// Return to the initial state, dropping all progress.
    pub fn reset(&mut self) {
        self.state = self.initial.clone();
        self.ledger.truncate_after(0);
        self.snapshots.truncate_after(0);
        info!("run reset");
    }

    /// Re-seed the stream for days not yet simulated.
    pub fn set_seed(&mut self, seed: u64) {
        self.state.set_seed(seed);
        info!(seed, "seed set");
    }

    /// Start an event from the catalog, effective from the next
    /// simulated day. Unspecified duration and intensity are drawn from
    /// the main stream, exactly as an automatic trigger would.
    pub fn inject_event(
        &mut self,
        template_id: &str,
        scope: EventScope,
        target_id: &str,
        duration_days: Option<u32>,
        intensity: Option<f64>,
    ) -> Result<ActiveEvent> {
        let mut rng = self.state.rng();
        let start_day = self.state.day;
        let event = inject_from_template(
            &mut self.state,
            &self.config,
            &mut rng,
            template_id,
            scope,
            target_id,
            start_day,
            duration_days,
            intensity,
        )?;
        self.state.persist_rng(&rng);
        Ok(event)
    }

    /// Buy stock for a store with HQ cash. Spends at most the cash on
    /// hand and returns the actual spend.
    pub fn purchase_inventory(
        &mut self,
        store_id: &str,
        sku: &str,
        name: &str,
        unit_cost: Money,
        qty: f64,
    ) -> Result<Money> {
        let cash = self.state.cash;
        let store = self
            .state
            .stores
            .get_mut(&StoreId::new(store_id))
            .ok_or_else(|| SimError::UnknownStore(store_id.to_string()))?;
        let spent = apply_purchase(store, &Sku::new(sku), name, unit_cost, qty, cash);
        self.state.cash -= spent;
        info!(store = store_id, sku, spent, "inventory purchased");
        Ok(spent)
    }

    /// Close a store and salvage its inventory and assets. Returns the
    /// cash recovered; closing an already closed store recovers nothing.
    pub fn close_store(&mut self, store_id: &str) -> Result<Money> {
        let inv_rate = self.config.inventory_salvage_rate.clamp(0.0, 1.0);
        let asset_rate = self.config.asset_salvage_rate.clamp(0.0, 1.0);

        let store = self
            .state
            .stores
            .get_mut(&StoreId::new(store_id))
            .ok_or_else(|| SimError::UnknownStore(store_id.to_string()))?;
        if store.status == StoreStatus::Closed {
            return Ok(0.0);
        }
        store.status = StoreStatus::Closed;

        let mut recovered = 0.0;
        for item in store.inventory.values() {
            recovered += item.qty * item.unit_cost * inv_rate;
        }
        store.inventory.clear();
        for asset in &store.assets {
            recovered += asset.capex * asset_rate;
        }

        self.state.cash += recovered;
        info!(store = store_id, recovered, "store closed");
        Ok(recovered)
    }
}
