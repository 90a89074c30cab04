//! Bundled datasets
//!
//! The six domain datasets ship as YAML documents compiled into the crate.
//! [`bundled`] loads them once per process; every caller sees the same
//! catalog, or the same load error.

use crate::catalog::FaultCatalog;
use crate::dataset::DomainDataset;
use crate::error::CatalogResult;
use once_cell::sync::OnceCell;

/// (file name, document) for every bundled domain, in catalog order
const DOCUMENTS: [(&str, &str); 6] = [
    ("generator.yaml", include_str!("../data/generator.yaml")),
    ("solar.yaml", include_str!("../data/solar.yaml")),
    ("motor.yaml", include_str!("../data/motor.yaml")),
    ("ups.yaml", include_str!("../data/ups.yaml")),
    ("ac.yaml", include_str!("../data/ac.yaml")),
    ("electrical.yaml", include_str!("../data/electrical.yaml")),
];

static CATALOG: OnceCell<FaultCatalog> = OnceCell::new();

/// Parse the bundled dataset documents
///
/// # Errors
/// Returns [`CatalogError::Parse`](crate::CatalogError::Parse) naming the
/// first document that fails to parse
pub fn bundled_datasets() -> CatalogResult<Vec<DomainDataset>> {
    DOCUMENTS
        .iter()
        .map(|(name, text)| DomainDataset::from_yaml_str(name, text))
        .collect()
}

/// The process-wide catalog built from the bundled datasets
///
/// The first call parses and validates; later calls return the cached
/// catalog. A failed load is not cached, so the error is reported to every
/// caller.
///
/// # Errors
/// Any error from [`bundled_datasets`] or [`FaultCatalog::load`]
pub fn bundled() -> CatalogResult<&'static FaultCatalog> {
    CATALOG.get_or_try_init(|| FaultCatalog::load(bundled_datasets()?))
}
