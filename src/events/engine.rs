//! Event lifecycle: expiry, probabilistic triggering, severity
//! interpolation, per-store combination, and manual injection.
//!
//! Trigger order is fixed so runs replay exactly: templates are visited
//! in catalog id order, and each enabled template with positive
//! probability consumes exactly one probability draw per day whether or
//! not it fires. Cooldowns gate per (template, scope, target) and are
//! measured from the end of the previous instance.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::config::SimConfig;
use crate::core::error::{Result, SimError};
use crate::core::rng::RngStream;
use crate::core::types::Day;
use crate::chain::store::Store;
use crate::events::template::{EventKind, EventScope, EventTemplate, TargetStrategy};
use crate::sim::state::SimState;

/// A disruption currently in force.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActiveEvent {
    pub event_id: String,
    pub template_id: String,
    pub name: String,
    pub kind: EventKind,
    pub scope: EventScope,
    /// Station or store id; empty for global scope.
    pub target_id: String,
    pub start_day: Day,
    pub end_day: Day,
    pub intensity: f64,
    pub store_closed: bool,
    pub traffic_multiplier: f64,
    pub conversion_multiplier: f64,
    pub capacity_multiplier: f64,
    pub variable_cost_multiplier: f64,
}

impl ActiveEvent {
    pub fn is_active_on(&self, day: Day) -> bool {
        self.start_day <= day && day <= self.end_day
    }

    fn applies_to(&self, store: &Store) -> bool {
        match self.scope {
            EventScope::Global => true,
            EventScope::Station => store.station.as_str() == self.target_id,
            EventScope::Store => store.id.as_str() == self.target_id,
        }
    }
}

/// History entry: the event as created, plus the day it entered history.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventRecord {
    #[serde(flatten)]
    pub event: ActiveEvent,
    pub created_day: Day,
}

/// Compact per-event line carried on the day's ledger record.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventSummary {
    pub event_id: String,
    pub template_id: String,
    pub name: String,
    pub kind: EventKind,
    pub scope: EventScope,
    pub target_id: String,
    pub start_day: Day,
    pub end_day: Day,
    pub closed: bool,
    pub traffic: f64,
    pub conversion: f64,
    pub capacity: f64,
    pub variable_cost: f64,
}

impl EventSummary {
    fn of(ev: &ActiveEvent) -> Self {
        Self {
            event_id: ev.event_id.clone(),
            template_id: ev.template_id.clone(),
            name: ev.name.clone(),
            kind: ev.kind,
            scope: ev.scope,
            target_id: ev.target_id.clone(),
            start_day: ev.start_day,
            end_day: ev.end_day,
            closed: ev.store_closed,
            traffic: ev.traffic_multiplier,
            conversion: ev.conversion_multiplier,
            capacity: ev.capacity_multiplier,
            variable_cost: ev.variable_cost_multiplier,
        }
    }
}

/// Combined multipliers in force for one store on one day.
#[derive(Debug, Clone)]
pub struct EventEffects {
    pub closed: bool,
    pub traffic: f64,
    pub conversion: f64,
    pub capacity: f64,
    pub variable_cost: f64,
    pub events: Vec<EventSummary>,
}

impl Default for EventEffects {
    fn default() -> Self {
        Self {
            closed: false,
            traffic: 1.0,
            conversion: 1.0,
            capacity: 1.0,
            variable_cost: 1.0,
            events: Vec::new(),
        }
    }
}

impl EventEffects {
    /// Clamp after combining raw event multipliers.
    fn clamp_combined(&mut self) {
        self.traffic = self.traffic.clamp(0.1, 2.0);
        self.conversion = self.conversion.clamp(0.1, 2.0);
        self.capacity = self.capacity.clamp(0.0, 2.0);
        self.variable_cost = self.variable_cost.clamp(0.5, 5.0);
    }

    /// Clamp after workforce and mitigation adjustments.
    pub fn clamp_final(&mut self) {
        self.traffic = self.traffic.clamp(0.0, 3.0);
        self.conversion = self.conversion.clamp(0.0, 3.0);
        self.capacity = self.capacity.clamp(0.0, 3.0);
        self.variable_cost = self.variable_cost.clamp(0.0, 5.0);
    }
}

pub fn cooldown_key(template_id: &str, scope: EventScope, target_id: &str) -> String {
    format!("{}:{}:{}", template_id, scope.as_str(), target_id)
}

/// Severity interpolation over a multiplier range. For "worse is lower"
/// multipliers severity 0 maps to the high end; for cost multipliers
/// severity 0 maps to the low end.
fn severity_value(min_v: f64, max_v: f64, severity: f64, worse_is_lower: bool) -> f64 {
    let (lo, hi) = if max_v < min_v {
        (max_v, min_v)
    } else {
        (min_v, max_v)
    };
    let s = severity.clamp(0.0, 1.0);
    if worse_is_lower {
        hi - s * (hi - lo)
    } else {
        lo + s * (hi - lo)
    }
}

/// Instantiate one event from a template, consuming duration, intensity
/// and id bits from the stream.
fn spawn(
    template: &EventTemplate,
    scope: EventScope,
    target_id: &str,
    day: Day,
    rng: &mut RngStream,
) -> ActiveEvent {
    let dmin = template.duration_days_min.max(1);
    let dmax = template.duration_days_max.max(dmin);
    let duration = rng.range_i64(dmin as i64, dmax as i64) as u32;

    let intensity = rng.uniform_f64(template.intensity_min, template.intensity_max);
    let severity = intensity.clamp(0.0, 1.0);

    let traffic = severity_value(
        template.traffic_multiplier_min,
        template.traffic_multiplier_max,
        severity,
        true,
    );
    let conversion = severity_value(
        template.conversion_multiplier_min,
        template.conversion_multiplier_max,
        severity,
        true,
    );
    let capacity = severity_value(
        template.capacity_multiplier_min,
        template.capacity_multiplier_max,
        severity,
        true,
    );
    let variable_cost = severity_value(
        template.variable_cost_multiplier_min,
        template.variable_cost_multiplier_max,
        severity,
        false,
    );

    let event_id = format!("EV{:06}_{:08x}", day, rng.next_u32());

    ActiveEvent {
        event_id,
        template_id: template.template_id.clone(),
        name: template.name.clone(),
        kind: template.kind,
        scope,
        target_id: target_id.to_string(),
        start_day: day,
        end_day: day + duration - 1,
        intensity,
        store_closed: template.store_closed,
        traffic_multiplier: traffic,
        conversion_multiplier: conversion,
        capacity_multiplier: capacity,
        variable_cost_multiplier: variable_cost,
    }
}

fn record_event(state: &mut SimState, config: &SimConfig, ev: ActiveEvent) {
    state.event_history.push(EventRecord {
        created_day: ev.start_day,
        event: ev.clone(),
    });
    let cap = config.event_history_cap;
    if state.event_history.len() > cap {
        let drop = state.event_history.len() - cap;
        state.event_history.drain(..drop);
    }
    state.active_events.push(ev);
}

/// Drop events whose last active day has passed. History already holds
/// their records.
pub fn expire_events(state: &mut SimState) {
    let day = state.day;
    state.active_events.retain(|ev| ev.end_day >= day);
}

/// Day-start trigger pass over the template catalog.
pub fn trigger_day_start(state: &mut SimState, config: &SimConfig, rng: &mut RngStream) {
    let day = state.day;
    let templates: Vec<EventTemplate> = state
        .event_templates
        .values()
        .filter(|t| t.enabled && t.daily_probability > 0.0)
        .cloned()
        .collect();

    for template in templates {
        if rng.unit_f64() >= template.daily_probability {
            continue;
        }

        let targets: Vec<String> = match template.scope {
            EventScope::Global => vec![String::new()],
            EventScope::Station => {
                if state.stations.is_empty() {
                    continue;
                }
                let ids: Vec<String> = state
                    .stations
                    .keys()
                    .map(|k| k.as_str().to_string())
                    .collect();
                match template.target_strategy {
                    TargetStrategy::All => ids,
                    TargetStrategy::RandomOne => vec![ids[rng.pick_index(ids.len())].clone()],
                }
            }
            EventScope::Store => {
                if state.stores.is_empty() {
                    continue;
                }
                let ids: Vec<String> =
                    state.stores.keys().map(|k| k.as_str().to_string()).collect();
                match template.target_strategy {
                    TargetStrategy::All => ids,
                    TargetStrategy::RandomOne => vec![ids[rng.pick_index(ids.len())].clone()],
                }
            }
        };

        for target_id in targets {
            let key = cooldown_key(&template.template_id, template.scope, &target_id);
            let next_ok = state.event_cooldowns.get(&key).copied().unwrap_or(1);
            if day < next_ok {
                debug!(template = %template.template_id, target = %target_id, "event on cooldown");
                continue;
            }
            let ev = spawn(&template, template.scope, &target_id, day, rng);
            info!(
                event = %ev.event_id,
                template = %ev.template_id,
                target = %ev.target_id,
                end_day = ev.end_day,
                "event triggered"
            );
            state
                .event_cooldowns
                .insert(key, ev.end_day + template.cooldown_days + 1);
            record_event(state, config, ev);
        }
    }
}

/// Fold every active, applicable event into one set of multipliers for
/// the store. Closure flags OR together; multipliers combine
/// multiplicatively in creation order, then clamp.
pub fn combine_for_store(state: &SimState, store: &Store) -> EventEffects {
    let day = state.day;
    let mut effects = EventEffects::default();
    for ev in &state.active_events {
        if !ev.is_active_on(day) || !ev.applies_to(store) {
            continue;
        }
        effects.closed = effects.closed || ev.store_closed;
        effects.traffic *= ev.traffic_multiplier;
        effects.conversion *= ev.conversion_multiplier;
        effects.capacity *= ev.capacity_multiplier;
        effects.variable_cost *= ev.variable_cost_multiplier;
        effects.events.push(EventSummary::of(ev));
    }
    effects.clamp_combined();
    effects
}

/// Manually start an event from a template, drawing any unspecified
/// values from the main stream. An explicit duration overrides the drawn
/// one; an explicit intensity recomputes the multipliers from the
/// template's ranges. Cooldown bookkeeping matches automatic triggers.
#[allow(clippy::too_many_arguments)]
pub fn inject_from_template(
    state: &mut SimState,
    config: &SimConfig,
    rng: &mut RngStream,
    template_id: &str,
    scope: EventScope,
    target_id: &str,
    start_day: Day,
    duration_days: Option<u32>,
    intensity: Option<f64>,
) -> Result<ActiveEvent> {
    let template = state
        .event_templates
        .get(template_id)
        .cloned()
        .ok_or_else(|| SimError::UnknownTemplate(template_id.to_string()))?;

    match scope {
        EventScope::Global => {}
        EventScope::Station => {
            if !state.stations.keys().any(|k| k.as_str() == target_id) {
                return Err(SimError::UnknownStation(target_id.to_string()));
            }
        }
        EventScope::Store => {
            if !state.stores.keys().any(|k| k.as_str() == target_id) {
                return Err(SimError::UnknownStore(target_id.to_string()));
            }
        }
    }

    let mut ev = spawn(&template, scope, target_id, start_day, rng);

    if let Some(days) = duration_days {
        if days > 0 {
            ev.end_day = start_day + days - 1;
        }
    }
    if let Some(raw) = intensity {
        let severity = raw.clamp(0.0, 1.0);
        ev.intensity = raw;
        ev.traffic_multiplier = severity_value(
            template.traffic_multiplier_min,
            template.traffic_multiplier_max,
            severity,
            true,
        );
        ev.conversion_multiplier = severity_value(
            template.conversion_multiplier_min,
            template.conversion_multiplier_max,
            severity,
            true,
        );
        ev.capacity_multiplier = severity_value(
            template.capacity_multiplier_min,
            template.capacity_multiplier_max,
            severity,
            true,
        );
        ev.variable_cost_multiplier = severity_value(
            template.variable_cost_multiplier_min,
            template.variable_cost_multiplier_max,
            severity,
            false,
        );
    }

    let key = cooldown_key(&template.template_id, scope, target_id);
    state
        .event_cooldowns
        .insert(key, ev.end_day + template.cooldown_days + 1);
    info!(event = %ev.event_id, template = template_id, "event injected");
    record_event(state, config, ev.clone());
    Ok(ev)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_interpolation_directions() {
        // severity 0 -> best end, severity 1 -> worst end
        assert!((severity_value(0.5, 0.9, 0.0, true) - 0.9).abs() < 1e-9);
        assert!((severity_value(0.5, 0.9, 1.0, true) - 0.5).abs() < 1e-9);
        assert!((severity_value(1.0, 1.2, 0.0, false) - 1.0).abs() < 1e-9);
        assert!((severity_value(1.0, 1.2, 1.0, false) - 1.2).abs() < 1e-9);
        // reversed bounds sort first
        assert!((severity_value(0.9, 0.5, 1.0, true) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_spawn_duration_and_id_format() {
        let template = EventTemplate {
            template_id: "t".into(),
            duration_days_min: 2,
            duration_days_max: 2,
            intensity_min: 1.0,
            intensity_max: 1.0,
            ..Default::default()
        };
        let mut rng = RngStream::new(42);
        let ev = spawn(&template, EventScope::Store, "S1", 7, &mut rng);
        assert_eq!(ev.start_day, 7);
        assert_eq!(ev.end_day, 8);
        assert!(ev.event_id.starts_with("EV000007_"));
        assert_eq!(ev.event_id.len(), 9 + 8);
    }

    #[test]
    fn test_spawn_full_severity_hits_worst_end() {
        let template = EventTemplate {
            template_id: "t".into(),
            intensity_min: 1.0,
            intensity_max: 1.0,
            traffic_multiplier_min: 0.70,
            traffic_multiplier_max: 0.95,
            variable_cost_multiplier_min: 1.00,
            variable_cost_multiplier_max: 1.10,
            ..Default::default()
        };
        let mut rng = RngStream::new(42);
        let ev = spawn(&template, EventScope::Store, "S1", 1, &mut rng);
        assert!((ev.traffic_multiplier - 0.70).abs() < 1e-9);
        assert!((ev.variable_cost_multiplier - 1.10).abs() < 1e-9);
    }

    #[test]
    fn test_effects_clamps() {
        let mut effects = EventEffects {
            traffic: 0.01,
            conversion: 9.0,
            capacity: -1.0,
            variable_cost: 9.0,
            ..Default::default()
        };
        effects.clamp_combined();
        assert_eq!(effects.traffic, 0.1);
        assert_eq!(effects.conversion, 2.0);
        assert_eq!(effects.capacity, 0.0);
        assert_eq!(effects.variable_cost, 5.0);

        effects.traffic = 4.0;
        effects.clamp_final();
        assert_eq!(effects.traffic, 3.0);
    }
}
