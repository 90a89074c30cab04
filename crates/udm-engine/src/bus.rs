//! Event bus
//!
//! Monitors publish every [`DiagnosticEvent`] here; the bus fans it out to:
//! - the in-process sinks (alerts, logs, health), synchronously and in order
//! - registered severity observers, with failures and panics contained
//! - a broadcast stream for async consumers
//!
//! A monitor only ever talks to the bus, never to a sink directly.

use crate::event::{DiagnosticEvent, EventSeverity, SubsystemId};
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// In-process consumer of diagnostic events
///
/// Sinks are total: they must not fail or block.
pub trait EventSubscriber: Send + Sync {
    /// Apply one event
    fn on_event(&self, event: &DiagnosticEvent);
}

/// External severity observer
pub type SeverityCallback =
    Arc<dyn Fn(&SubsystemId, EventSeverity) -> anyhow::Result<()> + Send + Sync>;

/// Registration id of a severity observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// Fan-out hub shared by all monitors
pub struct EventBus {
    sinks: Vec<Arc<dyn EventSubscriber>>,
    observers: RwLock<Vec<(ObserverId, SeverityCallback)>>,
    next_observer: AtomicU64,
    stream: broadcast::Sender<DiagnosticEvent>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("sinks", &self.sinks.len())
            .field("observers", &self.observers.read().len())
            .field("stream_receivers", &self.stream.receiver_count())
            .finish()
    }
}

impl EventBus {
    /// Create bus with a fixed sink list and stream buffer size
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn EventSubscriber>>, stream_capacity: usize) -> Self {
        let (stream, _) = broadcast::channel(stream_capacity.max(1));
        Self {
            sinks,
            observers: RwLock::new(Vec::new()),
            next_observer: AtomicU64::new(1),
            stream,
        }
    }

    /// Register a severity observer
    pub fn add_observer(&self, callback: SeverityCallback) -> ObserverId {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, callback));
        id
    }

    /// Remove an observer; returns whether it was registered
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Receiver of every event published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DiagnosticEvent> {
        self.stream.subscribe()
    }

    /// Publish one event to every consumer
    pub fn publish(&self, event: &DiagnosticEvent) {
        for sink in &self.sinks {
            sink.on_event(event);
        }

        metrics::counter!(
            "udm_events_total",
            "subsystem" => event.subsystem.to_string(),
            "severity" => event.severity.as_str()
        )
        .increment(1);

        // Snapshot so callbacks may (un)register observers without deadlocking
        let observers: Vec<(ObserverId, SeverityCallback)> = self.observers.read().clone();
        for (id, callback) in observers {
            let outcome =
                catch_unwind(AssertUnwindSafe(|| callback(&event.subsystem, event.severity)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::error!(
                    subsystem = %event.subsystem,
                    observer = id.0,
                    error = %err,
                    "severity observer failed"
                ),
                Err(_) => tracing::error!(
                    subsystem = %event.subsystem,
                    observer = id.0,
                    "severity observer panicked"
                ),
            }
        }

        // No receivers is not an error
        let _ = self.stream.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl EventSubscriber for Recorder {
        fn on_event(&self, event: &DiagnosticEvent) {
            self.0.lock().push(event.message.clone());
        }
    }

    fn observer<F>(f: F) -> SeverityCallback
    where
        F: Fn(&SubsystemId, EventSeverity) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Arc::new(f)
    }

    fn event(message: &str, severity: EventSeverity) -> DiagnosticEvent {
        DiagnosticEvent::new("Pumps", message, severity)
    }

    #[test]
    fn sinks_receive_in_order() {
        let recorder = Arc::new(Recorder::default());
        let bus = EventBus::new(vec![recorder.clone() as Arc<dyn EventSubscriber>], 8);

        bus.publish(&event("a", EventSeverity::Low));
        bus.publish(&event("b", EventSeverity::High));

        assert_eq!(*recorder.0.lock(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn failing_observers_are_isolated() {
        let recorder = Arc::new(Recorder::default());
        let bus = EventBus::new(vec![recorder.clone() as Arc<dyn EventSubscriber>], 8);
        let seen = Arc::new(AtomicU64::new(0));

        bus.add_observer(observer(|_, _| anyhow::bail!("chart widget gone")));
        bus.add_observer(observer(|_, _| panic!("observer bug")));
        let counter = seen.clone();
        bus.add_observer(observer(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        bus.publish(&event("a", EventSeverity::Medium));
        bus.publish(&event("b", EventSeverity::Low));

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(recorder.0.lock().len(), 2);
    }

    #[test]
    fn observers_can_be_removed() {
        let bus = EventBus::new(Vec::new(), 8);
        let seen = Arc::new(AtomicU64::new(0));
        let counter = seen.clone();
        let id = bus.add_observer(observer(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        bus.publish(&event("a", EventSeverity::Low));
        assert!(bus.remove_observer(id));
        assert!(!bus.remove_observer(id));
        bus.publish(&event("b", EventSeverity::Low));

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stream_delivers_events() {
        let bus = EventBus::new(Vec::new(), 8);
        let mut rx = bus.subscribe();
        bus.publish(&event("a", EventSeverity::High));

        let received = rx.try_recv().unwrap();
        assert_eq!(received.message, "a");
        assert_eq!(received.severity, EventSeverity::High);
    }
}
