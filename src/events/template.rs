//! Event templates
//!
//! A template describes a class of disruption: how often it fires, how
//! long it lasts, who it hits, and the multiplier ranges its severity
//! interpolates over. Templates are part of simulation state so saved
//! games carry their own catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Weather,
    Complaint,
    Outage,
    #[default]
    Other,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Weather => "weather",
            EventKind::Complaint => "complaint",
            EventKind::Outage => "outage",
            EventKind::Other => "other",
        }
    }
}

/// Which entities an event instance can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventScope {
    Global,
    Station,
    #[default]
    Store,
}

impl EventScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventScope::Global => "global",
            EventScope::Station => "station",
            EventScope::Store => "store",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetStrategy {
    #[default]
    RandomOne,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventTemplate {
    pub template_id: String,
    pub name: String,
    pub kind: EventKind,
    pub enabled: bool,
    pub daily_probability: f64,
    pub duration_days_min: u32,
    pub duration_days_max: u32,
    /// Days after an instance ends before the same (template, target) can
    /// fire again.
    pub cooldown_days: u32,
    pub intensity_min: f64,
    pub intensity_max: f64,
    pub scope: EventScope,
    pub target_strategy: TargetStrategy,
    /// A closure event zeroes the day unless mitigated.
    pub store_closed: bool,
    pub traffic_multiplier_min: f64,
    pub traffic_multiplier_max: f64,
    pub conversion_multiplier_min: f64,
    pub conversion_multiplier_max: f64,
    pub capacity_multiplier_min: f64,
    pub capacity_multiplier_max: f64,
    pub variable_cost_multiplier_min: f64,
    pub variable_cost_multiplier_max: f64,
}

impl Default for EventTemplate {
    fn default() -> Self {
        Self {
            template_id: String::new(),
            name: String::new(),
            kind: EventKind::Other,
            enabled: true,
            daily_probability: 0.0,
            duration_days_min: 1,
            duration_days_max: 1,
            cooldown_days: 0,
            intensity_min: 0.3,
            intensity_max: 1.0,
            scope: EventScope::Store,
            target_strategy: TargetStrategy::RandomOne,
            store_closed: false,
            traffic_multiplier_min: 1.0,
            traffic_multiplier_max: 1.0,
            conversion_multiplier_min: 1.0,
            conversion_multiplier_max: 1.0,
            capacity_multiplier_min: 1.0,
            capacity_multiplier_max: 1.0,
            variable_cost_multiplier_min: 1.0,
            variable_cost_multiplier_max: 1.0,
        }
    }
}

/// The stock disruption catalog new simulations start with: two weather
/// patterns at station scope, complaints and two utility outages at
/// store scope.
pub fn default_templates() -> BTreeMap<String, EventTemplate> {
    let defaults = [
        EventTemplate {
            template_id: "weather_rain".into(),
            name: "Heavy rain".into(),
            kind: EventKind::Weather,
            daily_probability: 0.03,
            duration_days_min: 1,
            duration_days_max: 2,
            cooldown_days: 5,
            intensity_min: 0.4,
            intensity_max: 1.0,
            scope: EventScope::Station,
            traffic_multiplier_min: 0.70,
            traffic_multiplier_max: 0.95,
            conversion_multiplier_min: 0.80,
            conversion_multiplier_max: 0.98,
            capacity_multiplier_min: 0.90,
            capacity_multiplier_max: 1.00,
            variable_cost_multiplier_min: 1.00,
            variable_cost_multiplier_max: 1.10,
            ..Default::default()
        },
        EventTemplate {
            template_id: "weather_snow".into(),
            name: "Snowfall".into(),
            kind: EventKind::Weather,
            daily_probability: 0.015,
            duration_days_min: 1,
            duration_days_max: 3,
            cooldown_days: 10,
            intensity_min: 0.5,
            intensity_max: 1.0,
            scope: EventScope::Station,
            traffic_multiplier_min: 0.50,
            traffic_multiplier_max: 0.85,
            conversion_multiplier_min: 0.65,
            conversion_multiplier_max: 0.95,
            capacity_multiplier_min: 0.80,
            capacity_multiplier_max: 1.00,
            variable_cost_multiplier_min: 1.05,
            variable_cost_multiplier_max: 1.25,
            ..Default::default()
        },
        EventTemplate {
            template_id: "complaint".into(),
            name: "Customer complaint".into(),
            kind: EventKind::Complaint,
            daily_probability: 0.01,
            duration_days_min: 2,
            duration_days_max: 5,
            cooldown_days: 20,
            intensity_min: 0.3,
            intensity_max: 1.0,
            scope: EventScope::Store,
            traffic_multiplier_min: 0.90,
            traffic_multiplier_max: 1.00,
            conversion_multiplier_min: 0.70,
            conversion_multiplier_max: 0.95,
            ..Default::default()
        },
        EventTemplate {
            template_id: "power_outage".into(),
            name: "Power outage".into(),
            kind: EventKind::Outage,
            daily_probability: 0.006,
            duration_days_min: 1,
            duration_days_max: 2,
            cooldown_days: 30,
            intensity_min: 0.7,
            intensity_max: 1.0,
            scope: EventScope::Store,
            store_closed: true,
            capacity_multiplier_min: 0.0,
            capacity_multiplier_max: 0.0,
            ..Default::default()
        },
        EventTemplate {
            template_id: "water_outage".into(),
            name: "Water outage".into(),
            kind: EventKind::Outage,
            daily_probability: 0.006,
            duration_days_min: 1,
            duration_days_max: 2,
            cooldown_days: 30,
            intensity_min: 0.7,
            intensity_max: 1.0,
            scope: EventScope::Store,
            capacity_multiplier_min: 0.40,
            capacity_multiplier_max: 0.85,
            variable_cost_multiplier_min: 1.00,
            variable_cost_multiplier_max: 1.05,
            ..Default::default()
        },
    ];
    defaults
        .into_iter()
        .map(|t| (t.template_id.clone(), t))
        .collect()
}
