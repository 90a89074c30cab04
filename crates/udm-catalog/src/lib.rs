//! UDM Fault Catalog
//!
//! Read-only knowledge store of maintenance fault codes across equipment
//! domains (generator, solar, motor, UPS, AC, electrical).
//!
//! # Overview
//!
//! The catalog provides:
//! - **FaultRecord**: fixed-schema fault description with diagnostic and
//!   repair guidance
//! - **DomainDataset**: one domain's records plus its declared categories
//! - **FaultCatalog**: validated store with O(1) code lookup, domain and
//!   severity filters, and substring search
//!
//! # Example
//!
//! ```rust
//! use udm_catalog::{bundled, FaultSeverity};
//!
//! let catalog = bundled().unwrap();
//!
//! let fault = catalog.get_by_code("E001").unwrap();
//! assert_eq!(fault.severity, FaultSeverity::Critical);
//!
//! let hits = catalog.search("oil pressure");
//! assert!(hits.iter().any(|r| r.code == "E001"));
//! ```

#![warn(missing_docs)]

pub mod bundled;
pub mod catalog;
pub mod dataset;
pub mod error;
pub mod record;

// Re-exports
pub use bundled::{bundled, bundled_datasets};
pub use catalog::FaultCatalog;
pub use dataset::{DatasetInfo, DomainDataset};
pub use error::{CatalogError, CatalogResult};
pub use record::{Domain, FaultRecord, FaultSeverity};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for catalog queries
    pub use crate::{
        CatalogError, Domain, DomainDataset, FaultCatalog, FaultRecord, FaultSeverity,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
