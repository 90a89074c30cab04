//! Log ring buffer
//!
//! Bounded, chronological line history per subsystem. A subsystem's buffer
//! starts out holding the bootstrap lines; they age out like any other line.

use crate::bus::EventSubscriber;
use crate::event::{DiagnosticEvent, SubsystemId};
use dashmap::DashMap;
use std::collections::VecDeque;

/// Per-subsystem line history capped at a fixed length
#[derive(Debug)]
pub struct LogRingBuffer {
    capacity: usize,
    seed: Vec<String>,
    buffers: DashMap<SubsystemId, VecDeque<String>>,
}

impl LogRingBuffer {
    /// Create buffer without bootstrap lines
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_seed(capacity, Vec::new())
    }

    /// Create buffer whose subsystems start with `seed`
    ///
    /// Only the last `capacity` seed lines are kept.
    #[must_use]
    pub fn with_seed(capacity: usize, seed: Vec<String>) -> Self {
        let capacity = capacity.max(1);
        let skip = seed.len().saturating_sub(capacity);
        Self {
            capacity,
            seed: seed.into_iter().skip(skip).collect(),
            buffers: DashMap::new(),
        }
    }

    /// Retention limit
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines of one subsystem, oldest first
    ///
    /// A subsystem with no events yet reports the bootstrap lines.
    #[must_use]
    pub fn lines(&self, subsystem: &str) -> Vec<String> {
        self.buffers.get(subsystem).map_or_else(
            || self.seed.clone(),
            |buffer| buffer.iter().cloned().collect(),
        )
    }

    /// Append a raw line
    pub fn push_line(&self, subsystem: &SubsystemId, line: String) {
        let mut buffer = self
            .buffers
            .entry(subsystem.clone())
            .or_insert_with(|| self.seed.iter().cloned().collect());
        if buffer.len() == self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(line);
    }
}

impl EventSubscriber for LogRingBuffer {
    fn on_event(&self, event: &DiagnosticEvent) {
        self.push_line(&event.subsystem, event.log_line());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventSeverity;
    use pretty_assertions::assert_eq;

    fn seed() -> Vec<String> {
        vec!["[INIT] online".to_string(), "[CHECK] synced".to_string()]
    }

    #[test]
    fn new_subsystem_reports_seed() {
        let logs = LogRingBuffer::with_seed(50, seed());
        assert_eq!(logs.lines("Pumps"), seed());
    }

    #[test]
    fn events_follow_seed() {
        let logs = LogRingBuffer::with_seed(50, seed());
        logs.on_event(&DiagnosticEvent::new("Pumps", "Motor current nominal", EventSeverity::Low));

        let lines = logs.lines("Pumps");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[..2], seed()[..]);
        assert!(lines[2].ends_with("] Pumps: Motor current nominal"));
    }

    #[test]
    fn oldest_lines_evicted() {
        let logs = LogRingBuffer::new(5);
        let id = SubsystemId::new("Pumps");
        for i in 0..8 {
            logs.push_line(&id, format!("line {i}"));
        }
        assert_eq!(
            logs.lines("Pumps"),
            vec!["line 3", "line 4", "line 5", "line 6", "line 7"]
        );
    }

    #[test]
    fn oversized_seed_truncated() {
        let logs = LogRingBuffer::with_seed(1, seed());
        assert_eq!(logs.lines("Pumps"), vec!["[CHECK] synced"]);
    }

    #[test]
    fn subsystems_are_independent() {
        let logs = LogRingBuffer::new(5);
        logs.push_line(&SubsystemId::new("Pumps"), "a".to_string());
        assert!(logs.lines("Controls").is_empty());
        assert_eq!(logs.lines("Pumps"), vec!["a"]);
    }
}
