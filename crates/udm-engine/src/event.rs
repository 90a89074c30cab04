//! Diagnostic events
//!
//! Defines the values that flow from monitors to sinks:
//! - [`SubsystemId`]: cheap-to-clone key of a monitored subsystem
//! - [`EventSeverity`]: coarse three-level event classification
//! - [`DiagnosticEvent`]: one time-stamped, classified message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifier of a monitored subsystem, e.g. "Diesel Generators"
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubsystemId(Arc<str>);

impl SubsystemId {
    /// Create subsystem id
    #[inline]
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubsystemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SubsystemId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&SubsystemId> for SubsystemId {
    fn from(id: &SubsystemId) -> Self {
        id.clone()
    }
}

impl AsRef<str> for SubsystemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SubsystemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for SubsystemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SubsystemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// Event severity
///
/// Independent of the catalog's five-level fault severity; it only
/// classifies monitor output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    /// Informational
    Low,
    /// Needs attention
    Medium,
    /// Needs immediate attention
    High,
}

impl EventSeverity {
    /// All levels, most severe first
    pub const ALL: [EventSeverity; 3] = [Self::High, Self::Medium, Self::Low];

    /// Name for structured logs and metric labels
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Short panel label
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MED",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for EventSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One synthetic diagnostic message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    /// Subsystem that produced it
    pub subsystem: SubsystemId,
    /// When it was produced
    pub timestamp: DateTime<Utc>,
    /// Rendered message text
    pub message: String,
    /// Classified severity
    pub severity: EventSeverity,
}

impl DiagnosticEvent {
    /// Create event stamped with the current time
    #[must_use]
    pub fn new(
        subsystem: impl Into<SubsystemId>,
        message: impl Into<String>,
        severity: EventSeverity,
    ) -> Self {
        Self {
            subsystem: subsystem.into(),
            timestamp: Utc::now(),
            message: message.into(),
            severity,
        }
    }

    /// With explicit timestamp
    #[inline]
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Log line: `[HH:MM:SS] subsystem: message`
    ///
    /// The clock time is rendered in UTC, not the host's local zone.
    #[must_use]
    pub fn log_line(&self) -> String {
        format!(
            "[{}] {}: {}",
            self.timestamp.format("%H:%M:%S"),
            self.subsystem,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn log_line_format() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 14, 3, 9).unwrap();
        let event = DiagnosticEvent::new("Pumps", "Motor current nominal", EventSeverity::Low).at(ts);
        assert_eq!(event.log_line(), "[14:03:09] Pumps: Motor current nominal");
    }

    #[test]
    fn log_line_renders_utc_clock() {
        let offset = chrono::FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2024, 5, 1, 16, 3, 9).unwrap();
        let event = DiagnosticEvent::new("Pumps", "Suction pressure steady", EventSeverity::Low)
            .at(local.with_timezone(&Utc));
        assert_eq!(event.log_line(), "[14:03:09] Pumps: Suction pressure steady");
    }

    #[test]
    fn severity_order_and_labels() {
        assert!(EventSeverity::High > EventSeverity::Medium);
        assert!(EventSeverity::Medium > EventSeverity::Low);
        assert_eq!(EventSeverity::Medium.to_string(), "MED");
    }

    #[test]
    fn subsystem_id_borrows_as_str() {
        let mut map = std::collections::HashMap::new();
        map.insert(SubsystemId::from("Controls"), 1);
        assert_eq!(map.get("Controls"), Some(&1));
    }
}
