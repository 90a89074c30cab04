//! Alert aggregator
//!
//! Per subsystem it keeps:
//! - a bounded alert list (oldest evicted first) fed by non-Low events
//! - severity counters fed by every event, never decremented
//!
//! Each subsystem bucket is updated under its own map-entry lock, so
//! append-and-evict is atomic and writers of different subsystems don't
//! contend beyond shard sharing.

use crate::bus::EventSubscriber;
use crate::event::{DiagnosticEvent, EventSeverity, SubsystemId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use ulid::{Generator, Ulid};

/// Level of a retained alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Raised by a Medium event
    Medium,
    /// Raised by a High event
    High,
}

impl AlertLevel {
    /// Alert level for an event severity; Low events raise no alert
    #[inline]
    #[must_use]
    pub const fn from_severity(severity: EventSeverity) -> Option<Self> {
        match severity {
            EventSeverity::High => Some(Self::High),
            EventSeverity::Medium => Some(Self::Medium),
            EventSeverity::Low => None,
        }
    }

    /// Display title
    #[inline]
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::High => "CRITICAL ALERT",
            Self::Medium => "ATTENTION",
        }
    }

    /// Metric label
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

/// Alert identifier, strictly increasing per subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(Ulid);

impl AlertId {
    /// Underlying ULID
    #[inline]
    #[must_use]
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }

    /// Millisecond timestamp encoded in the id
    #[inline]
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One retained alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Unique id
    pub id: AlertId,
    /// "CRITICAL ALERT" or "ATTENTION"
    pub title: String,
    /// Rendered log line of the triggering event
    pub message: String,
    /// Level
    pub level: AlertLevel,
    /// Timestamp of the triggering event
    pub raised_at: DateTime<Utc>,
}

/// Event counts per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounters {
    /// High events seen
    pub high: u64,
    /// Medium events seen
    pub medium: u64,
    /// Low events seen
    pub low: u64,
}

impl SeverityCounters {
    /// Count for one severity
    #[inline]
    #[must_use]
    pub const fn get(&self, severity: EventSeverity) -> u64 {
        match severity {
            EventSeverity::High => self.high,
            EventSeverity::Medium => self.medium,
            EventSeverity::Low => self.low,
        }
    }

    /// Count one event
    #[inline]
    pub fn record(&mut self, severity: EventSeverity) {
        let slot = match severity {
            EventSeverity::High => &mut self.high,
            EventSeverity::Medium => &mut self.medium,
            EventSeverity::Low => &mut self.low,
        };
        *slot = slot.saturating_add(1);
    }

    /// All events seen
    #[inline]
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.high + self.medium + self.low
    }
}

struct AlertBucket {
    alerts: VecDeque<AlertRecord>,
    counters: SeverityCounters,
    ids: Generator,
}

impl AlertBucket {
    fn next_id(&mut self) -> AlertId {
        // Overflow needs 2^80 ids in one millisecond
        AlertId(self.ids.generate().unwrap_or_else(|_| Ulid::new()))
    }
}

impl Default for AlertBucket {
    fn default() -> Self {
        Self {
            alerts: VecDeque::new(),
            counters: SeverityCounters::default(),
            ids: Generator::new(),
        }
    }
}

/// Alerts and counters of one subsystem read under a single bucket lock
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertView {
    /// Retained alerts, oldest first
    pub alerts: Vec<AlertRecord>,
    /// Severity counters
    pub counters: SeverityCounters,
}

/// Bounded per-subsystem alert lists plus severity counters
pub struct AlertAggregator {
    capacity: usize,
    buckets: DashMap<SubsystemId, AlertBucket>,
}

impl fmt::Debug for AlertAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertAggregator")
            .field("capacity", &self.capacity)
            .field("subsystems", &self.buckets.len())
            .finish()
    }
}

impl AlertAggregator {
    /// Create aggregator retaining at most `capacity` alerts per subsystem
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            buckets: DashMap::new(),
        }
    }

    /// Retention limit
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Alerts of one subsystem, oldest first
    #[must_use]
    pub fn alerts(&self, subsystem: &str) -> Vec<AlertRecord> {
        self.buckets
            .get(subsystem)
            .map(|bucket| bucket.alerts.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Counters of one subsystem; zero if never seen
    #[must_use]
    pub fn counters(&self, subsystem: &str) -> SeverityCounters {
        self.buckets
            .get(subsystem)
            .map(|bucket| bucket.counters)
            .unwrap_or_default()
    }

    /// Alerts and counters of one subsystem from the same bucket state
    #[must_use]
    pub fn view(&self, subsystem: &str) -> AlertView {
        self.buckets
            .get(subsystem)
            .map(|bucket| AlertView {
                alerts: bucket.alerts.iter().cloned().collect(),
                counters: bucket.counters,
            })
            .unwrap_or_default()
    }

    /// Drop all alerts of one subsystem; counters are kept
    pub fn clear(&self, subsystem: &str) {
        if let Some(mut bucket) = self.buckets.get_mut(subsystem) {
            bucket.alerts.clear();
        }
        tracing::debug!(subsystem, "alerts cleared");
    }
}

impl EventSubscriber for AlertAggregator {
    fn on_event(&self, event: &DiagnosticEvent) {
        let mut bucket = self.buckets.entry(event.subsystem.clone()).or_default();
        bucket.counters.record(event.severity);

        let Some(level) = AlertLevel::from_severity(event.severity) else {
            return;
        };

        let record = AlertRecord {
            id: bucket.next_id(),
            title: level.title().to_string(),
            message: event.log_line(),
            level,
            raised_at: event.timestamp,
        };
        if bucket.alerts.len() == self.capacity {
            bucket.alerts.pop_front();
        }
        bucket.alerts.push_back(record);
        drop(bucket);

        metrics::counter!(
            "udm_alerts_raised_total",
            "subsystem" => event.subsystem.to_string(),
            "level" => level.as_str()
        )
        .increment(1);
    }
}
