//! Testing utilities for the UDM workspace
//!
//! Shared fixtures, builders and log capture.

#![allow(missing_docs)]

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use udm_catalog::{Domain, DomainDataset, FaultCatalog, FaultRecord, FaultSeverity};
use udm_engine::{DiagnosticEngine, DiagnosticEvent, EngineConfig, EventSeverity};

pub const TEST_CATEGORY: &str = "General";
pub const TEST_PERIOD: Duration = Duration::from_millis(100);

pub fn fault(code: &str, severity: FaultSeverity) -> FaultRecord {
    FaultRecord::new(code, format!("Fault {code}"), severity, TEST_CATEGORY)
        .with_description(format!("Synthetic fault {code}"))
        .with_symptoms([format!("{code} indicator lit")])
}

pub fn dataset(domain: Domain, faults: Vec<FaultRecord>) -> DomainDataset {
    faults.into_iter().fold(
        DomainDataset::new(domain, format!("{domain} Services")).with_categories([TEST_CATEGORY]),
        DomainDataset::with_fault,
    )
}

/// Two domains, four records
pub fn small_catalog() -> FaultCatalog {
    FaultCatalog::load([
        dataset(
            Domain::Generator,
            vec![
                fault("G-1", FaultSeverity::Critical),
                fault("G-2", FaultSeverity::Low),
            ],
        ),
        dataset(
            Domain::Solar,
            vec![
                fault("S-1", FaultSeverity::High),
                fault("S-2", FaultSeverity::Warning),
            ],
        ),
    ])
    .unwrap()
}

pub fn seeded_config(seed: u64) -> EngineConfig {
    EngineConfig::new()
        .with_seed(seed)
        .with_tick_period(TEST_PERIOD)
}

pub fn seeded_engine(seed: u64) -> DiagnosticEngine {
    DiagnosticEngine::new(seeded_config(seed)).unwrap()
}

pub fn event(subsystem: &str, severity: EventSeverity) -> DiagnosticEvent {
    DiagnosticEvent::new(subsystem, format!("{} event", severity.label()), severity)
}

#[derive(Clone)]
struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `run` with a thread-local subscriber and return what it logged
pub fn with_captured_logs<R>(run: impl FnOnce() -> R) -> (R, String) {
    let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
    let writer = CaptureWriter {
        buffer: Arc::clone(&buffer),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, run);
    let logs = String::from_utf8_lossy(&buffer.lock()).into_owned();
    (result, logs)
}
