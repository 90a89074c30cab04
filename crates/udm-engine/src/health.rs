//! Health state machine
//!
//! Per-subsystem ratchet Green -> Amber -> Red. High events go straight to
//! Red, Medium events move Green to Amber, Low events change nothing. There
//! is no way back to Green.

use crate::bus::EventSubscriber;
use crate::event::{DiagnosticEvent, EventSeverity, SubsystemId};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Health of one subsystem
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// Nothing notable seen
    #[default]
    Green,
    /// A Medium event was seen
    Amber,
    /// A High event was seen (absorbing)
    Red,
}

impl HealthState {
    /// State after observing one event severity
    #[must_use]
    pub const fn next(self, severity: EventSeverity) -> Self {
        match (self, severity) {
            (_, EventSeverity::High) => Self::Red,
            (Self::Green, EventSeverity::Medium) => Self::Amber,
            (state, _) => state,
        }
    }

    /// Name for logs
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Amber => "amber",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States reachable in one step from `from`
#[must_use]
pub fn allowed_transitions(from: HealthState) -> &'static [HealthState] {
    use HealthState::*;
    match from {
        Green => &[Amber, Red],
        Amber => &[Red],
        Red => &[],
    }
}

/// Whether `from -> to` is a legal change
#[must_use]
pub fn is_allowed(from: HealthState, to: HealthState) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Health per subsystem
#[derive(Debug, Default)]
pub struct HealthStateMachine {
    states: DashMap<SubsystemId, HealthState>,
}

impl HealthStateMachine {
    /// Create machine with every subsystem Green
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state; Green if never seen
    #[must_use]
    pub fn state(&self, subsystem: &str) -> HealthState {
        self.states
            .get(subsystem)
            .map(|state| *state)
            .unwrap_or_default()
    }
}

impl EventSubscriber for HealthStateMachine {
    fn on_event(&self, event: &DiagnosticEvent) {
        if event.severity == EventSeverity::Low {
            return;
        }

        let mut state = self.states.entry(event.subsystem.clone()).or_default();
        let from = *state;
        let to = from.next(event.severity);
        if from == to {
            return;
        }
        debug_assert!(is_allowed(from, to), "illegal health transition {from} -> {to}");
        *state = to;
        drop(state);

        match to {
            HealthState::Red => tracing::warn!(
                subsystem = %event.subsystem,
                from = from.as_str(),
                to = to.as_str(),
                "subsystem health escalated"
            ),
            _ => tracing::info!(
                subsystem = %event.subsystem,
                from = from.as_str(),
                to = to.as_str(),
                "subsystem health escalated"
            ),
        }
    }
}
