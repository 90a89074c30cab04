//! Error types for the fault catalog
//!
//! Only loading can fail. Queries are total: unknown codes come back as
//! `None` (or [`CatalogError::NotFound`] from [`FaultCatalog::require`]) and
//! filters return empty collections.
//!
//! [`FaultCatalog::require`]: crate::FaultCatalog::require

use crate::record::Domain;

/// Catalog errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two records anywhere in the catalog share a code
    #[error("duplicate fault code: {0}")]
    DuplicateFaultCode(String),

    /// The same domain was supplied by more than one dataset
    #[error("duplicate dataset for domain: {0}")]
    DuplicateDomain(Domain),

    /// A record failed schema validation
    #[error("invalid fault record {code}: {reason}")]
    InvalidRecord {
        /// Code of the offending record (may be empty)
        code: String,
        /// What is wrong with it
        reason: String,
    },

    /// A dataset document could not be parsed
    #[error("failed to parse dataset {source_name}: {message}")]
    Parse {
        /// Name of the document (file name for bundled data)
        source_name: String,
        /// Parser message
        message: String,
    },

    /// No record with this code
    #[error("fault code not found: {0}")]
    NotFound(String),
}

impl CatalogError {
    /// Create invalid record error
    pub fn invalid_record(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            code: code.into(),
            reason: reason.into(),
        }
    }

    /// Create parse error
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Whether this error can only come out of loading
    #[inline]
    #[must_use]
    pub fn is_load_error(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
