//! UDM Diagnostic Engine
//!
//! Synthetic per-subsystem monitors and the aggregates they feed.
//!
//! # Overview
//!
//! - **SubsystemMonitor**: cancellable ticking task producing classified
//!   [`DiagnosticEvent`]s from a message pool
//! - **SeverityClassifier**: ordered keyword rules mapping text to
//!   Low/Medium/High
//! - **EventBus**: fan-out to sinks, severity observers and a broadcast
//!   stream
//! - **AlertAggregator**, **LogRingBuffer**, **HealthStateMachine**: bounded,
//!   per-subsystem state
//! - **DiagnosticEngine**: owns all of the above
//!
//! # Example
//!
//! ```rust
//! use udm_engine::{DiagnosticEngine, EngineConfig, EventSeverity, HealthState};
//!
//! let engine = DiagnosticEngine::new(EngineConfig::new().with_seed(7)).unwrap();
//!
//! let event = engine.emit("Pumps", "NPSH margin tight; cavitation risk");
//! assert_eq!(event.severity, EventSeverity::High);
//! assert_eq!(engine.health("Pumps"), HealthState::Red);
//! assert_eq!(engine.alerts("Pumps")[0].title, "CRITICAL ALERT");
//! ```

#![warn(missing_docs)]

pub mod alerts;
pub mod bus;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod health;
pub mod logs;
pub mod monitor;
pub mod pool;
pub mod telemetry;

// Re-exports
pub use alerts::{
    AlertAggregator, AlertId, AlertLevel, AlertRecord, AlertView, SeverityCounters,
};
pub use bus::{EventBus, EventSubscriber, ObserverId, SeverityCallback};
pub use classifier::{classify, KeywordRule, SeverityClassifier};
pub use config::EngineConfig;
pub use engine::{DiagnosticEngine, SubsystemSnapshot};
pub use error::{EngineError, EngineResult};
pub use event::{DiagnosticEvent, EventSeverity, SubsystemId};
pub use health::{HealthState, HealthStateMachine};
pub use logs::LogRingBuffer;
pub use monitor::{MonitorContext, MonitorHandle, SubsystemMonitor};
pub use pool::{service_hint, MessagePool, REFERENCE_SUBSYSTEMS};
pub use telemetry::{init_tracing, LogFormat};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the engine
    pub use crate::{
        DiagnosticEngine, DiagnosticEvent, EngineConfig, EngineError, EventSeverity,
        HealthState, SubsystemId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
