//! Day-indexed snapshots for rollback
//!
//! After each simulated day the full state is serialized and filed under
//! that day. Rollback restores the snapshot of the target day and drops
//! everything after it. Snapshots hold serialized text rather than live
//! states, so restoring exercises the same path as loading from disk.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::{Result, SimError};
use crate::core::types::Day;
use crate::sim::state::SimState;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SnapshotStore {
    snapshots: BTreeMap<Day, String>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the state as of the end of `day`.
    pub fn take(&mut self, day: Day, state: &SimState) -> Result<()> {
        let serialized = serde_json::to_string(state)?;
        self.snapshots.insert(day, serialized);
        Ok(())
    }

    /// File a pre-serialized snapshot. Used when a multi-day run stages
    /// its snapshots and commits all-or-nothing.
    pub fn insert_serialized(&mut self, day: Day, serialized: String) {
        self.snapshots.insert(day, serialized);
    }

    pub fn restore(&self, day: Day) -> Result<SimState> {
        let serialized = self.snapshots.get(&day).ok_or(SimError::NoSnapshot(day))?;
        Ok(serde_json::from_str(serialized)?)
    }

    pub fn latest_at_or_before(&self, day: Day) -> Option<Day> {
        self.snapshots.range(..=day).next_back().map(|(d, _)| *d)
    }

    pub fn contains(&self, day: Day) -> bool {
        self.snapshots.contains_key(&day)
    }

    /// Serialized text of one snapshot, for byte-level comparison.
    pub fn raw(&self, day: Day) -> Option<&str> {
        self.snapshots.get(&day).map(|s| s.as_str())
    }

    /// Drop every snapshot for days after `day`.
    pub fn truncate_after(&mut self, day: Day) {
        self.snapshots.retain(|d, _| *d <= day);
    }

    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        self.snapshots.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
