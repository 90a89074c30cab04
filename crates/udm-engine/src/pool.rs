//! Message pools
//!
//! Templates a monitor draws from on every tick, keyed by subsystem id.
//! Subsystems without a dedicated pool share the generic fallback pool.

use crate::event::SubsystemId;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

/// Template used when a subsystem has no pool of its own
pub const FALLBACK_MESSAGE: &str = "System check OK";

/// Reference subsystems with their message templates and service hints
pub const REFERENCE_SUBSYSTEMS: [ReferenceSubsystem; 9] = [
    ReferenceSubsystem {
        id: "Solar Systems",
        hint: "Check array voltage, MPPT status, string balance, and irradiance vs PSH.",
        templates: &[
            "String voltage imbalance detected; recommend IV sweep",
            "Irradiance below threshold, PSH recalibration recommended",
            "MPPT tracking nominal",
        ],
    },
    ReferenceSubsystem {
        id: "Diesel Generators",
        hint: "Review load factor, fuel rate, coolant temp, oil pressure, and start logs.",
        templates: &[
            "Oil pressure transient observed; check filter",
            "Load factor stable at 0.72",
            "Fuel rate high; inspect injector calibration",
        ],
    },
    ReferenceSubsystem {
        id: "Controls",
        hint: "Inspect controller alarms, inputs/outputs, sensor scaling, and firmware revision.",
        templates: &[
            "Controller alarm A12: Sensor scaling mismatch",
            "Firmware OK; CRC verified",
            "I/O mapping updated",
        ],
    },
    ReferenceSubsystem {
        id: "AC & UPS",
        hint: "Verify battery bus voltage, runtime estimates, PF, and inverter thermal status.",
        templates: &[
            "Runtime estimate 42 min at current load",
            "PF low; corrective tuning advised",
            "Bus voltage ripple within tolerance",
        ],
    },
    ReferenceSubsystem {
        id: "Automation",
        hint: "Confirm cycle steps, interlocks, safety PLC states, and throughput targets.",
        templates: &[
            "Cycle time trending up; bottleneck at Step 2",
            "Interlock confirmed; safety loop closed",
            "Throughput stable at 180 u/h",
        ],
    },
    ReferenceSubsystem {
        id: "Pumps",
        hint: "Validate flow, head, NPSH, motor current, and cavitation risk indicators.",
        templates: &[
            "NPSH margin tight; cavitation risk",
            "Motor current nominal",
            "Head/flow within curve",
        ],
    },
    ReferenceSubsystem {
        id: "Incinerators",
        hint: "Check chamber temp, LHV inputs, air-fuel ratio, and burner ignition cycles.",
        templates: &[
            "AFR drift; burner tuning required",
            "Chamber temperature stable",
            "LHV variability detected",
        ],
    },
    ReferenceSubsystem {
        id: "Motors/Rewinding",
        hint: "Measure phase current, vibration, insulation resistance, and slip.",
        templates: &[
            "Insulation resistance borderline; schedule IR test",
            "Vibration spike at 48 Hz; check bearing",
            "Slip within expected limits",
        ],
    },
    ReferenceSubsystem {
        id: "Diagnostics Hub",
        hint: "Aggregate error codes, resolution rate, and average time to resolve.",
        templates: &[
            "Resolution rate improved to 0.86",
            "Avg time to resolve: 1.9 h",
            "New error codes ingested",
        ],
    },
];

/// Static description of one reference subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSubsystem {
    /// Subsystem id
    pub id: &'static str,
    /// Operator guidance
    pub hint: &'static str,
    /// Message templates
    pub templates: &'static [&'static str],
}

/// Operator guidance for a reference subsystem
#[must_use]
pub fn service_hint(subsystem: &str) -> Option<&'static str> {
    REFERENCE_SUBSYSTEMS
        .iter()
        .find(|s| s.id == subsystem)
        .map(|s| s.hint)
}

/// Templates keyed by subsystem
#[derive(Debug, Clone, Default)]
pub struct MessagePool {
    pools: HashMap<SubsystemId, Vec<String>>,
    fallback: Vec<String>,
}

impl MessagePool {
    /// Pool with no dedicated entries; everything uses the fallback
    #[must_use]
    pub fn empty() -> Self {
        Self {
            pools: HashMap::new(),
            fallback: vec![FALLBACK_MESSAGE.to_string()],
        }
    }

    /// Pool preloaded with the nine reference subsystems
    #[must_use]
    pub fn reference() -> Self {
        REFERENCE_SUBSYSTEMS
            .iter()
            .fold(Self::empty(), |pool, s| pool.with_pool(s.id, s.templates.iter().copied()))
    }

    /// Add or replace one subsystem's templates
    ///
    /// An empty template list removes the dedicated pool.
    #[must_use]
    pub fn with_pool<I, S>(mut self, subsystem: impl Into<SubsystemId>, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let subsystem = subsystem.into();
        let templates: Vec<String> = templates.into_iter().map(Into::into).collect();
        if templates.is_empty() {
            self.pools.remove(&subsystem);
        } else {
            self.pools.insert(subsystem, templates);
        }
        self
    }

    /// Merge configured overrides over the current pools
    #[must_use]
    pub fn with_overrides(self, overrides: &BTreeMap<String, Vec<String>>) -> Self {
        overrides.iter().fold(self, |pool, (id, templates)| {
            pool.with_pool(id.as_str(), templates.iter().cloned())
        })
    }

    /// Templates a monitor for `subsystem` draws from
    #[must_use]
    pub fn templates(&self, subsystem: &SubsystemId) -> &[String] {
        self.pools
            .get(subsystem)
            .map_or(self.fallback.as_slice(), Vec::as_slice)
    }

    /// Whether `subsystem` has a dedicated pool
    #[inline]
    #[must_use]
    pub fn has_pool(&self, subsystem: &SubsystemId) -> bool {
        self.pools.contains_key(subsystem)
    }

    /// Pick one template uniformly at random
    #[must_use]
    pub fn pick<R: Rng + ?Sized>(&self, subsystem: &SubsystemId, rng: &mut R) -> &str {
        self.templates(subsystem)
            .choose(rng)
            .map_or(FALLBACK_MESSAGE, String::as_str)
    }
}
