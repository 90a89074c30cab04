//! Diagnostic engine
//!
//! Owns the sinks, the bus and the running monitors, and exposes the
//! control and query surface used by display code.

use crate::alerts::{AlertAggregator, AlertRecord, SeverityCounters};
use crate::bus::{EventBus, EventSubscriber, ObserverId};
use crate::classifier::SeverityClassifier;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::event::{DiagnosticEvent, EventSeverity, SubsystemId};
use crate::health::{HealthState, HealthStateMachine};
use crate::logs::LogRingBuffer;
use crate::monitor::{MonitorContext, MonitorHandle, SubsystemMonitor};
use crate::pool::{service_hint, MessagePool};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::join_all;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Everything a display widget shows for one subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemSnapshot {
    /// Subsystem id
    pub subsystem: SubsystemId,
    /// Operator guidance, if it is a reference subsystem
    pub hint: Option<String>,
    /// Whether a monitor is running for it
    pub monitored: bool,
    /// Retained alerts, oldest first
    pub alerts: Vec<AlertRecord>,
    /// Event counts
    pub counters: SeverityCounters,
    /// Retained log lines, oldest first
    pub log_lines: Vec<String>,
    /// Health
    pub health: HealthState,
}

/// Monitors plus the aggregates they feed
#[derive(Debug)]
pub struct DiagnosticEngine {
    config: EngineConfig,
    ctx: MonitorContext,
    alerts: Arc<AlertAggregator>,
    logs: Arc<LogRingBuffer>,
    health: Arc<HealthStateMachine>,
    monitors: DashMap<SubsystemId, MonitorHandle>,
    rng: Mutex<StdRng>,
}

impl DiagnosticEngine {
    /// Create engine with the reference message pools and default classifier
    ///
    /// # Errors
    /// `EngineError::InvalidConfig` if `config` fails validation
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        Self::with_classifier(config, SeverityClassifier::default())
    }

    /// Create engine with a custom classifier
    ///
    /// # Errors
    /// `EngineError::InvalidConfig` if `config` fails validation
    pub fn with_classifier(
        config: EngineConfig,
        classifier: SeverityClassifier,
    ) -> EngineResult<Self> {
        config.validate()?;

        let alerts = Arc::new(AlertAggregator::new(config.alert_capacity));
        let logs = Arc::new(LogRingBuffer::with_seed(
            config.log_capacity,
            config.bootstrap_lines.clone(),
        ));
        let health = Arc::new(HealthStateMachine::new());
        let sinks: Vec<Arc<dyn EventSubscriber>> = vec![
            alerts.clone() as Arc<dyn EventSubscriber>,
            logs.clone() as Arc<dyn EventSubscriber>,
            health.clone() as Arc<dyn EventSubscriber>,
        ];

        let ctx = MonitorContext {
            pool: Arc::new(MessagePool::reference().with_overrides(&config.message_pools)),
            classifier: Arc::new(classifier),
            bus: Arc::new(EventBus::new(sinks, config.event_channel_capacity)),
        };
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        tracing::info!(
            tick_period_ms = config.tick_period_ms,
            alert_capacity = config.alert_capacity,
            log_capacity = config.log_capacity,
            seeded = config.seed.is_some(),
            "diagnostic engine created"
        );

        Ok(Self {
            config,
            ctx,
            alerts,
            logs,
            health,
            monitors: DashMap::new(),
            rng: Mutex::new(rng),
        })
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classifier used by monitors and [`emit`](Self::emit)
    #[inline]
    #[must_use]
    pub fn classifier(&self) -> &SeverityClassifier {
        &self.ctx.classifier
    }

    /// Message pools used by monitors
    #[inline]
    #[must_use]
    pub fn message_pool(&self) -> &MessagePool {
        &self.ctx.pool
    }

    /// Start a monitor for `subsystem`
    ///
    /// Monitors of different subsystems run concurrently.
    ///
    /// # Errors
    /// `EngineError::AlreadyMonitored` if one is already running for it
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn start_monitor(&self, subsystem: impl Into<SubsystemId>) -> EngineResult<()> {
        match self.monitors.entry(subsystem.into()) {
            Entry::Occupied(slot) => Err(EngineError::AlreadyMonitored(slot.key().clone())),
            Entry::Vacant(slot) => {
                // Each monitor gets its own stream derived from the engine seed
                let rng = StdRng::seed_from_u64(self.rng.lock().random());
                let monitor = SubsystemMonitor::new(slot.key().clone(), self.ctx.clone(), rng);
                slot.insert(monitor.start(self.config.tick_period()));
                Ok(())
            }
        }
    }

    /// Stop the monitor of `subsystem`; returns its tick count if one ran
    pub async fn stop_monitor(&self, subsystem: &str) -> Option<u64> {
        let (_, handle) = self.monitors.remove(subsystem)?;
        Some(handle.stop().await)
    }

    /// Stop every monitor
    pub async fn stop_all(&self) -> Vec<(SubsystemId, u64)> {
        let ids: Vec<SubsystemId> = self.monitors.iter().map(|m| m.key().clone()).collect();
        let handles: Vec<MonitorHandle> = ids
            .iter()
            .filter_map(|id| self.monitors.remove(id).map(|(_, handle)| handle))
            .collect();

        join_all(handles.into_iter().map(|handle| async move {
            let id = handle.subsystem().clone();
            (id, handle.stop().await)
        }))
        .await
    }

    /// Make `subsystem` the only monitored one
    ///
    /// # Errors
    /// `EngineError::AlreadyMonitored` if another caller started it
    /// concurrently
    pub async fn select(&self, subsystem: impl Into<SubsystemId>) -> EngineResult<()> {
        let subsystem = subsystem.into();
        self.stop_all().await;
        tracing::info!(subsystem = %subsystem, "subsystem selected");
        self.start_monitor(subsystem)
    }

    /// Subsystems with a running monitor, sorted
    #[must_use]
    pub fn running(&self) -> Vec<SubsystemId> {
        let mut ids: Vec<SubsystemId> = self.monitors.iter().map(|m| m.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Whether `subsystem` has a running monitor
    #[must_use]
    pub fn is_monitored(&self, subsystem: &str) -> bool {
        self.monitors.contains_key(subsystem)
    }

    /// Publish an externally built event
    pub fn ingest(&self, event: &DiagnosticEvent) {
        self.ctx.bus.publish(event);
    }

    /// Classify `message`, publish it for `subsystem` and return the event
    pub fn emit(
        &self,
        subsystem: impl Into<SubsystemId>,
        message: impl Into<String>,
    ) -> DiagnosticEvent {
        let message = message.into();
        let severity = self.ctx.classifier.classify(&message);
        let event = DiagnosticEvent::new(subsystem, message, severity);
        self.ingest(&event);
        event
    }

    /// Register a severity observer
    ///
    /// Errors and panics from `callback` are logged and otherwise ignored.
    pub fn on_severity_update<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&SubsystemId, EventSeverity) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.ctx.bus.add_observer(Arc::new(callback))
    }

    /// Unregister a severity observer
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.ctx.bus.remove_observer(id)
    }

    /// Stream of every event published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DiagnosticEvent> {
        self.ctx.bus.subscribe()
    }

    /// Retained alerts, oldest first
    #[must_use]
    pub fn alerts(&self, subsystem: &str) -> Vec<AlertRecord> {
        self.alerts.alerts(subsystem)
    }

    /// Severity counters
    #[must_use]
    pub fn counters(&self, subsystem: &str) -> SeverityCounters {
        self.alerts.counters(subsystem)
    }

    /// Drop retained alerts; counters are kept
    pub fn clear_alerts(&self, subsystem: &str) {
        self.alerts.clear(subsystem);
    }

    /// Retained log lines, oldest first
    #[must_use]
    pub fn log_lines(&self, subsystem: &str) -> Vec<String> {
        self.logs.lines(subsystem)
    }

    /// Health state
    #[must_use]
    pub fn health(&self, subsystem: &str) -> HealthState {
        self.health.state(subsystem)
    }

    /// Everything shown for one subsystem
    #[must_use]
    pub fn snapshot(&self, subsystem: &str) -> SubsystemSnapshot {
        let view = self.alerts.view(subsystem);
        SubsystemSnapshot {
            subsystem: SubsystemId::new(subsystem),
            hint: service_hint(subsystem).map(str::to_string),
            monitored: self.is_monitored(subsystem),
            alerts: view.alerts,
            counters: view.counters,
            log_lines: self.log_lines(subsystem),
            health: self.health(subsystem),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn engine() -> DiagnosticEngine {
        DiagnosticEngine::new(
            EngineConfig::new()
                .with_seed(11)
                .with_tick_period(Duration::from_millis(100)),
        )
        .unwrap()
    }

    #[test]
    fn invalid_config_rejected() {
        let err = DiagnosticEngine::new(EngineConfig::new().with_alert_capacity(0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn emit_reaches_every_sink() {
        let engine = engine();
        let event = engine.emit("Pumps", "NPSH margin tight; cavitation risk");

        assert_eq!(event.severity, EventSeverity::High);
        assert_eq!(engine.alerts("Pumps").len(), 1);
        assert_eq!(engine.counters("Pumps").high, 1);
        assert_eq!(engine.health("Pumps"), HealthState::Red);
        assert_eq!(engine.log_lines("Pumps").last(), Some(&event.log_line()));
    }

    #[test]
    fn snapshot_of_fresh_subsystem() {
        let engine = engine();
        let snapshot = engine.snapshot("Pumps");

        assert!(snapshot.hint.is_some());
        assert!(!snapshot.monitored);
        assert!(snapshot.alerts.is_empty());
        assert_eq!(snapshot.log_lines, engine.config().bootstrap_lines);
        assert_eq!(snapshot.health, HealthState::Green);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_monitor_rejected() {
        let engine = engine();
        engine.start_monitor("Pumps").unwrap();
        let err = engine.start_monitor("Pumps").unwrap_err();
        assert!(matches!(err, EngineError::AlreadyMonitored(_)));
        assert_eq!(engine.stop_monitor("Pumps").await, Some(0));
        assert_eq!(engine.stop_monitor("Pumps").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn select_switches_active_subsystem() {
        let engine = engine();
        engine.start_monitor("Pumps").unwrap();
        engine.start_monitor("Controls").unwrap();

        engine.select("Automation").await.unwrap();

        assert_eq!(engine.running(), vec![SubsystemId::new("Automation")]);
        engine.stop_all().await;
        assert!(engine.running().is_empty());
    }
}
