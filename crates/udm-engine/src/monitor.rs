//! Subsystem monitor
//!
//! One cancellable ticking task per watched subsystem. Every tick picks a
//! template from the subsystem's pool, classifies it and publishes the
//! resulting event on the bus.
//!
//! A tick runs to completion without yielding, and [`MonitorHandle::stop`]
//! waits for the task to exit, so once `stop` returns no tick of that
//! monitor can still touch shared state.

use crate::bus::EventBus;
use crate::classifier::SeverityClassifier;
use crate::event::{DiagnosticEvent, SubsystemId};
use crate::pool::MessagePool;
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::Instrument;

/// Collaborators shared by every monitor of one engine
#[derive(Debug, Clone)]
pub struct MonitorContext {
    /// Template source
    pub pool: Arc<MessagePool>,
    /// Message classifier
    pub classifier: Arc<SeverityClassifier>,
    /// Event fan-out
    pub bus: Arc<EventBus>,
}

/// Event producer for one subsystem
#[derive(Debug)]
pub struct SubsystemMonitor {
    subsystem: SubsystemId,
    ctx: MonitorContext,
    rng: StdRng,
    ticks: Arc<AtomicU64>,
}

impl SubsystemMonitor {
    /// Create monitor drawing templates with `rng`
    #[must_use]
    pub fn new(subsystem: impl Into<SubsystemId>, ctx: MonitorContext, rng: StdRng) -> Self {
        Self {
            subsystem: subsystem.into(),
            ctx,
            rng,
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Monitored subsystem
    #[inline]
    #[must_use]
    pub fn subsystem(&self) -> &SubsystemId {
        &self.subsystem
    }

    /// Produce and publish one event
    pub fn tick(&mut self) -> DiagnosticEvent {
        let message = self.ctx.pool.pick(&self.subsystem, &mut self.rng).to_owned();
        let severity = self.ctx.classifier.classify(&message);
        let event = DiagnosticEvent::new(self.subsystem.clone(), message, severity);

        tracing::trace!(
            subsystem = %self.subsystem,
            severity = ?severity,
            message = %event.message,
            "tick"
        );
        self.ctx.bus.publish(&event);
        self.ticks.fetch_add(1, Ordering::Relaxed);
        event
    }

    /// Spawn the ticking task; first tick fires one `period` from now
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn start(mut self, period: Duration) -> MonitorHandle {
        let subsystem = self.subsystem.clone();
        let ticks = self.ticks.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let span = tracing::info_span!("monitor", subsystem = %subsystem);

        let task = tokio::spawn(
            async move {
                let mut interval = interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                tracing::info!(period = ?period, "monitor started");

                loop {
                    tokio::select! {
                        biased;
                        _ = &mut shutdown_rx => break,
                        _ = interval.tick() => {
                            self.tick();
                        }
                    }
                }
            }
            .instrument(span),
        );

        MonitorHandle {
            subsystem,
            ticks,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Control handle of a running monitor
///
/// Dropping the handle without calling [`stop`](Self::stop) aborts the task.
#[derive(Debug)]
pub struct MonitorHandle {
    subsystem: SubsystemId,
    ticks: Arc<AtomicU64>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Monitored subsystem
    #[inline]
    #[must_use]
    pub fn subsystem(&self) -> &SubsystemId {
        &self.subsystem
    }

    /// Ticks completed so far
    #[inline]
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Whether the task is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the task and wait for it to exit; returns the tick count
    pub async fn stop(mut self) -> u64 {
        if let Some(shutdown) = self.shutdown.take() {
            // Receiver gone means the task already ended
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::error!(subsystem = %self.subsystem, error = %err, "monitor task failed");
            }
        }
        let ticks = self.ticks();
        tracing::info!(subsystem = %self.subsystem, ticks, "monitor stopped");
        ticks
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
