//! Fault record schema
//!
//! Defines the fixed-schema types every dataset is parsed into:
//! - [`FaultSeverity`]: five-level catalog severity with a total order
//! - [`Domain`]: equipment domain partitioning the catalog
//! - [`FaultRecord`]: one catalogued fault with diagnostic and repair guidance

use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog severity
///
/// Ordered `Critical > High > Medium > Low > Warning`; the derived `Ord`
/// follows declaration order, so the least severe variant comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultSeverity {
    /// Advisory only
    #[serde(alias = "Warning")]
    Warning,
    /// Minor degradation
    #[serde(alias = "Low")]
    Low,
    /// Needs scheduled attention
    #[serde(alias = "Medium")]
    Medium,
    /// Needs prompt attention
    #[serde(alias = "High")]
    High,
    /// Stop the equipment
    #[serde(alias = "Critical")]
    Critical,
}

impl FaultSeverity {
    /// All levels, most severe first
    pub const ALL: [FaultSeverity; 5] = [
        FaultSeverity::Critical,
        FaultSeverity::High,
        FaultSeverity::Medium,
        FaultSeverity::Low,
        FaultSeverity::Warning,
    ];

    /// Display name ("Critical", "High", ...)
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Warning => "Warning",
        }
    }
}

impl fmt::Display for FaultSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaultSeverity {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CatalogError::invalid_record("", format!("unknown severity '{s}'")))
    }
}

/// Equipment domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Diesel/gas generator sets and transfer switches
    Generator,
    /// PV arrays, inverters and battery banks
    Solar,
    /// Electric motors and rewinding
    #[serde(alias = "motor-rewinding")]
    Motor,
    /// UPS and power conditioning
    #[serde(alias = "ups-power")]
    Ups,
    /// Air conditioning and refrigeration
    #[serde(alias = "ac-refrigeration")]
    Ac,
    /// Building electrical installations
    Electrical,
}

impl Domain {
    /// All domains in catalog order
    pub const ALL: [Domain; 6] = [
        Domain::Generator,
        Domain::Solar,
        Domain::Motor,
        Domain::Ups,
        Domain::Ac,
        Domain::Electrical,
    ];

    /// Short identifier used in dataset documents
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generator => "generator",
            Self::Solar => "solar",
            Self::Motor => "motor",
            Self::Ups => "ups",
            Self::Ac => "ac",
            Self::Electrical => "electrical",
        }
    }

    /// Service identifier used by the maintenance hub pages
    #[inline]
    #[must_use]
    pub const fn service_id(self) -> &'static str {
        match self {
            Self::Generator => "generator",
            Self::Solar => "solar",
            Self::Motor => "motor-rewinding",
            Self::Ups => "ups-power",
            Self::Ac => "ac-refrigeration",
            Self::Electrical => "electrical",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s) || d.service_id().eq_ignore_ascii_case(s))
            .ok_or_else(|| CatalogError::parse("domain", format!("unknown domain '{s}'")))
    }
}

/// One catalogued fault
///
/// Immutable once loaded. Unknown keys in a dataset document are rejected,
/// as are missing required keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaultRecord {
    /// Globally unique code, e.g. `E001`
    pub code: String,
    /// Short name
    pub name: String,
    /// Catalog severity
    pub severity: FaultSeverity,
    /// Sub-grouping within the domain
    pub category: String,
    /// What the fault is
    pub description: String,
    /// Likely causes
    pub root_causes: Vec<String>,
    /// Observable symptoms
    pub symptoms: Vec<String>,
    /// Ordered diagnostic procedure
    pub diagnostic_steps: Vec<String>,
    /// Summary of the fix
    pub solution: String,
    /// Ordered repair procedure
    pub repair_procedure: Vec<String>,
    /// How to avoid recurrence
    pub prevention_measures: Vec<String>,
    /// Safety precautions while working on it
    pub safety_precautions: Vec<String>,
    /// Typical repair duration (free text)
    pub estimated_time: String,
    /// Typical cost range (free text)
    pub estimated_cost: String,
    /// Tools needed
    pub tools: Vec<String>,
    /// Spare parts, when any are typically needed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<String>>,
    /// Reference values and other technician notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_notes: Option<String>,
    /// Owning domain; stamped from the dataset when the catalog loads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
}

impl FaultRecord {
    /// Create a record with the identifying fields set and all guidance empty
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        severity: FaultSeverity,
        category: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            severity,
            category: category.into(),
            description: String::new(),
            root_causes: Vec::new(),
            symptoms: Vec::new(),
            diagnostic_steps: Vec::new(),
            solution: String::new(),
            repair_procedure: Vec::new(),
            prevention_measures: Vec::new(),
            safety_precautions: Vec::new(),
            estimated_time: String::new(),
            estimated_cost: String::new(),
            tools: Vec::new(),
            parts: None,
            technical_notes: None,
            domain: None,
        }
    }

    /// With description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With symptoms
    #[must_use]
    pub fn with_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symptoms = symptoms.into_iter().map(Into::into).collect();
        self
    }

    /// With parts
    #[must_use]
    pub fn with_parts<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parts = Some(parts.into_iter().map(Into::into).collect());
        self
    }

    /// Check required text fields and category membership
    ///
    /// `categories` is the list declared by the owning dataset; an empty list
    /// accepts any category.
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidRecord`] on the first violation
    pub fn validate(&self, categories: &[String]) -> CatalogResult<()> {
        if self.code.trim().is_empty() {
            return Err(CatalogError::invalid_record(&self.code, "code is blank"));
        }
        if self.name.trim().is_empty() {
            return Err(CatalogError::invalid_record(&self.code, "name is blank"));
        }
        if self.category.trim().is_empty() {
            return Err(CatalogError::invalid_record(&self.code, "category is blank"));
        }
        if !categories.is_empty() && !categories.iter().any(|c| c == &self.category) {
            return Err(CatalogError::invalid_record(
                &self.code,
                format!("category '{}' is not declared by its dataset", self.category),
            ));
        }
        Ok(())
    }
}
