//! Universal Diagnostic Machine
//!
//! Facade over the fault catalog and the diagnostic engine. A
//! [`MaintenanceHub`] is built in one step: the catalog is loaded and
//! validated first, and the engine is only created once that succeeded, so
//! no query or monitor ever runs against a partially loaded catalog.
//!
//! # Example
//!
//! ```rust
//! use udm::{EngineConfig, MaintenanceHub};
//!
//! let hub = MaintenanceHub::bootstrap(EngineConfig::new().with_seed(1)).unwrap();
//!
//! assert!(hub.catalog().get_by_code("E001").is_some());
//! hub.engine().emit("Diesel Generators", "Oil pressure transient observed; check filter");
//! assert!(!hub.related_faults("Diesel Generators").is_empty());
//! ```

#![warn(missing_docs)]

use std::borrow::Cow;

pub use udm_catalog as catalog;
pub use udm_engine as engine;

pub use udm_catalog::{CatalogError, Domain, FaultCatalog, FaultRecord, FaultSeverity};
pub use udm_engine::{
    DiagnosticEngine, DiagnosticEvent, EngineConfig, EngineError, EventSeverity, HealthState,
    SubsystemId, SubsystemSnapshot,
};

/// Startup failure
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Catalog failed to load or validate
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Engine configuration rejected
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Hub result alias
pub type HubResult<T> = Result<T, HubError>;

/// Catalog domains whose faults are relevant to a monitored subsystem
///
/// Solar Systems, Diesel Generators, AC & UPS and Motors/Rewinding follow
/// their service pages. Pumps, Controls, Automation and Diagnostics Hub have
/// no service page; their mappings are a local choice.
#[must_use]
pub fn related_domains(subsystem: &str) -> &'static [Domain] {
    match subsystem {
        "Solar Systems" => &[Domain::Solar],
        "Diesel Generators" => &[Domain::Generator],
        "AC & UPS" => &[Domain::Ac, Domain::Ups],
        "Motors/Rewinding" | "Pumps" => &[Domain::Motor],
        "Controls" | "Automation" => &[Domain::Electrical],
        "Diagnostics Hub" => &Domain::ALL,
        _ => &[],
    }
}

/// Fault catalog plus live engine
#[derive(Debug)]
pub struct MaintenanceHub {
    catalog: Cow<'static, FaultCatalog>,
    engine: DiagnosticEngine,
}

impl MaintenanceHub {
    /// Load the bundled catalog, then start an engine
    ///
    /// # Errors
    /// - `HubError::Catalog` if the bundled data fails validation
    /// - `HubError::Engine` if `config` is invalid
    pub fn bootstrap(config: EngineConfig) -> HubResult<Self> {
        Self::build(Cow::Borrowed(udm_catalog::bundled()?), config)
    }

    /// Use an already loaded catalog
    ///
    /// # Errors
    /// `HubError::Engine` if `config` is invalid
    pub fn with_catalog(catalog: FaultCatalog, config: EngineConfig) -> HubResult<Self> {
        Self::build(Cow::Owned(catalog), config)
    }

    fn build(catalog: Cow<'static, FaultCatalog>, config: EngineConfig) -> HubResult<Self> {
        let engine = DiagnosticEngine::new(config)?;
        tracing::info!(faults = catalog.len(), "maintenance hub ready");
        Ok(Self { catalog, engine })
    }

    /// Fault catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &FaultCatalog {
        &self.catalog
    }

    /// Diagnostic engine
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &DiagnosticEngine {
        &self.engine
    }

    /// Catalog faults for the domains behind `subsystem`, most severe first
    #[must_use]
    pub fn related_faults(&self, subsystem: &str) -> Vec<&FaultRecord> {
        let domains = related_domains(subsystem);
        let mut faults: Vec<&FaultRecord> = domains
            .iter()
            .flat_map(|&domain| self.catalog.get_by_domain(domain))
            .collect();
        faults.sort_by(|a, b| b.severity.cmp(&a.severity));
        faults
    }

    /// Stop every running monitor
    pub async fn shutdown(&self) {
        let stopped = self.engine.stop_all().await;
        tracing::info!(monitors = stopped.len(), "maintenance hub stopped");
    }
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hub users
    pub use crate::{
        Domain, EngineConfig, EventSeverity, FaultSeverity, HealthState, MaintenanceHub,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
