//! Domain datasets
//!
//! A dataset is one YAML document per domain: its service name, the
//! categories it declares, and its fault records in declaration order.

use crate::error::{CatalogError, CatalogResult};
use crate::record::{Domain, FaultRecord};
use serde::{Deserialize, Serialize};

/// All fault records of one domain, as declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainDataset {
    /// Domain the records belong to
    pub domain: Domain,
    /// Display name of the service, e.g. "Generator Services"
    pub service_name: String,
    /// Declared sub-groupings
    #[serde(default)]
    pub categories: Vec<String>,
    /// Records in declaration order
    pub faults: Vec<FaultRecord>,
}

impl DomainDataset {
    /// Create dataset
    #[must_use]
    pub fn new(domain: Domain, service_name: impl Into<String>) -> Self {
        Self {
            domain,
            service_name: service_name.into(),
            categories: Vec::new(),
            faults: Vec::new(),
        }
    }

    /// With declared categories
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// With one more record
    #[must_use]
    pub fn with_fault(mut self, fault: FaultRecord) -> Self {
        self.faults.push(fault);
        self
    }

    /// Parse a dataset document
    ///
    /// # Errors
    /// Returns [`CatalogError::Parse`] for malformed YAML, missing required
    /// keys or unknown keys
    pub fn from_yaml_str(source_name: &str, text: &str) -> CatalogResult<Self> {
        serde_yaml::from_str(text).map_err(|e| CatalogError::parse(source_name, e.to_string()))
    }

    /// Metadata without the records
    #[must_use]
    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            domain: self.domain,
            service_name: self.service_name.clone(),
            categories: self.categories.clone(),
            fault_count: self.faults.len(),
        }
    }
}

/// Dataset metadata kept by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Domain
    pub domain: Domain,
    /// Display name of the service
    pub service_name: String,
    /// Declared categories
    pub categories: Vec<String>,
    /// Number of records loaded for the domain
    pub fault_count: usize,
}
