//! Disruption events: templates, lifecycle, and standing mitigations.

pub mod engine;
pub mod mitigation;
pub mod template;

pub use engine::{ActiveEvent, EventEffects, EventRecord, EventSummary};
pub use mitigation::{MitigationAction, MitigationConfig, MitigationKind};
pub use template::{default_templates, EventKind, EventScope, EventTemplate, TargetStrategy};
