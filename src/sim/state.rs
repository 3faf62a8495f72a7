//! Chain-wide simulation state
//!
//! One `SimState` is the complete, serializable world: the calendar
//! position, HQ cash and credit, every station and store, the event
//! catalog with its active set and cooldowns, and the random stream
//! position. Serializing this struct and reloading it resumes a run
//! byte-identically, which is what snapshots and saves rely on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chain::station::Station;
use crate::chain::store::Store;
use crate::core::calendar;
use crate::core::error::{Result, SimError};
use crate::core::rng::RngStream;
use crate::core::types::{Day, Money, StationId, StoreId};
use crate::events::engine::{ActiveEvent, EventRecord};
use crate::events::template::EventTemplate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimState {
    /// Next day to simulate. Day 1 is the first simulated day.
    pub day: Day,
    /// HQ cash position. Every store's net cashflow settles here.
    pub cash: Money,

    pub rng_seed: u64,
    /// Stream position after the last simulated day. `None` until the
    /// first draw under the current seed.
    pub rng_word_pos: Option<u128>,

    pub stations: BTreeMap<StationId, Station>,
    pub stores: BTreeMap<StoreId, Store>,

    pub event_templates: BTreeMap<String, EventTemplate>,
    pub active_events: Vec<ActiveEvent>,
    pub event_history: Vec<EventRecord>,
    /// First day a template may fire again, per (template, scope, target).
    pub event_cooldowns: BTreeMap<String, Day>,

    pub hq_credit_limit: Money,
    pub hq_credit_used: Money,
    pub hq_daily_interest_rate: f64,
    pub hq_auto_finance: bool,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            day: 1,
            cash: 200_000.0,
            rng_seed: 20_260_101,
            rng_word_pos: None,
            stations: BTreeMap::new(),
            stores: BTreeMap::new(),
            event_templates: BTreeMap::new(),
            active_events: Vec::new(),
            event_history: Vec::new(),
            event_cooldowns: BTreeMap::new(),
            hq_credit_limit: 0.0,
            hq_credit_used: 0.0,
            hq_daily_interest_rate: 0.0005,
            hq_auto_finance: false,
        }
    }
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream positioned exactly where the last simulated day left it.
    pub fn rng(&self) -> RngStream {
        RngStream::resume(self.rng_seed, self.rng_word_pos)
    }

    /// Record the stream position so the next day continues the sequence.
    pub fn persist_rng(&mut self, rng: &RngStream) {
        self.rng_word_pos = Some(rng.word_pos());
    }

    /// Re-seed the stream. Future days draw from the new sequence's start.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng_seed = seed;
        self.rng_word_pos = None;
    }

    pub fn month_day_index(&self, month_len_days: u32) -> u32 {
        calendar::month_day_index(self.day, month_len_days)
    }

    pub fn is_month_end(&self, month_len_days: u32) -> bool {
        calendar::is_month_end(self.day, month_len_days)
    }

    pub fn open_store_count(&self) -> usize {
        self.stores.values().filter(|s| s.status.is_open()).count()
    }

    /// Structural checks run after deserializing a state from disk.
    pub fn validate(&self) -> Result<()> {
        if self.day == 0 {
            return Err(SimError::InvariantViolation(
                "day must be at least 1".into(),
            ));
        }
        for (key, station) in &self.stations {
            if *key != station.id {
                return Err(SimError::InvariantViolation(format!(
                    "station keyed {} carries id {}",
                    key, station.id
                )));
            }
        }
        for (key, store) in &self.stores {
            if *key != store.id {
                return Err(SimError::InvariantViolation(format!(
                    "store keyed {} carries id {}",
                    key, store.id
                )));
            }
            if !self.stations.contains_key(&store.station) {
                return Err(SimError::InvariantViolation(format!(
                    "store {} references unknown station {}",
                    store.id, store.station
                )));
            }
            for (sku, item) in &store.inventory {
                if item.qty < 0.0 {
                    return Err(SimError::InvariantViolation(format!(
                        "store {} holds negative stock of {} ({})",
                        store.id, sku, item.qty
                    )));
                }
            }
        }
        if self.hq_credit_used < 0.0 {
            return Err(SimError::InvariantViolation(format!(
                "credit used {} is negative",
                self.hq_credit_used
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_valid() {
        let state = SimState::new();
        assert_eq!(state.day, 1);
        assert_eq!(state.cash, 200_000.0);
        assert!(!state.hq_auto_finance);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_orphan_store() {
        let mut state = SimState::new();
        let store = Store::new("M1", "Orphan", "NOWHERE");
        state.stores.insert(store.id.clone(), store);
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_mismatched_key() {
        let mut state = SimState::new();
        let station = Station::new("ST01", "Demo Station");
        state
            .stations
            .insert(StationId::new("WRONG"), station);
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_stock() {
        use crate::core::types::Sku;
        use crate::inventory::InventoryItem;

        let mut state = SimState::new();
        let station = Station::new("ST01", "Demo Station");
        state.stations.insert(station.id.clone(), station);
        let mut store = Store::new("M1", "Demo", "ST01");
        store.inventory.insert(
            Sku::new("OIL"),
            InventoryItem {
                sku: Sku::new("OIL"),
                name: "Engine oil (L)".into(),
                unit_cost: 35.0,
                qty: -1.0,
            },
        );
        state.stores.insert(store.id.clone(), store);
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_set_seed_rewinds_the_stream() {
        let mut state = SimState::new();
        let mut rng = state.rng();
        rng.unit_f64();
        state.persist_rng(&rng);
        assert!(state.rng_word_pos.is_some());

        state.set_seed(7);
        assert_eq!(state.rng_seed, 7);
        assert!(state.rng_word_pos.is_none());
    }

    #[test]
    fn test_rng_resumes_at_persisted_position() {
        let mut state = SimState::new();
        let mut first = state.rng();
        let head = first.unit_f64();
        state.persist_rng(&first);

        let mut second = state.rng();
        let next = second.unit_f64();
        assert_ne!(head, next);

        let mut replay = RngStream::new(state.rng_seed);
        assert_eq!(replay.unit_f64(), head);
        assert_eq!(replay.unit_f64(), next);
    }
}
