//! Fault catalog
//!
//! Provides [`FaultCatalog`], the read-only store built once from the domain
//! datasets. Records keep dataset order: domains in the order they were
//! supplied, records in declaration order within each domain. Every query
//! that returns several records returns them in that order.

use crate::dataset::{DatasetInfo, DomainDataset};
use crate::error::{CatalogError, CatalogResult};
use crate::record::{Domain, FaultRecord, FaultSeverity};
use indexmap::map::Entry;
use indexmap::IndexMap;

/// Immutable multi-domain fault catalog
///
/// Construction is the only fallible step. After [`FaultCatalog::load`]
/// returns, the catalog is plain owned data and can be shared across
/// threads (`&FaultCatalog` or `Arc<FaultCatalog>`) without locking.
#[derive(Debug, Clone)]
pub struct FaultCatalog {
    /// code -> record, in store iteration order
    records: IndexMap<String, FaultRecord>,

    /// Lowercased search fields, parallel to `records`
    search_keys: Vec<SearchKey>,

    /// Per-domain metadata and record positions
    domains: IndexMap<Domain, DomainEntry>,
}

#[derive(Debug, Clone)]
struct DomainEntry {
    info: DatasetInfo,
    positions: Vec<usize>,
}

/// Precomputed lowercase copies of the searchable fields
#[derive(Debug, Clone)]
struct SearchKey {
    code: String,
    name: String,
    description: String,
    symptoms: Vec<String>,
}

impl SearchKey {
    fn new(record: &FaultRecord) -> Self {
        Self {
            code: record.code.to_lowercase(),
            name: record.name.to_lowercase(),
            description: record.description.to_lowercase(),
            symptoms: record.symptoms.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.code.contains(needle)
            || self.name.contains(needle)
            || self.description.contains(needle)
            || self.symptoms.iter().any(|s| s.contains(needle))
    }
}

impl FaultCatalog {
    /// Build the catalog from domain datasets
    ///
    /// Validates every record and the uniqueness of `code` across all
    /// datasets combined. Nothing is returned unless every check passes.
    ///
    /// # Errors
    /// - [`CatalogError::DuplicateFaultCode`] if two records share a code
    /// - [`CatalogError::DuplicateDomain`] if a domain is supplied twice
    /// - [`CatalogError::InvalidRecord`] if a record fails validation
    pub fn load<I>(datasets: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = DomainDataset>,
    {
        let mut records: IndexMap<String, FaultRecord> = IndexMap::new();
        let mut domains: IndexMap<Domain, DomainEntry> = IndexMap::new();

        for dataset in datasets {
            if domains.contains_key(&dataset.domain) {
                tracing::warn!(domain = %dataset.domain, "dataset supplied twice");
                return Err(CatalogError::DuplicateDomain(dataset.domain));
            }

            let info = dataset.info();
            let mut positions = Vec::with_capacity(dataset.faults.len());

            for mut fault in dataset.faults {
                fault.validate(&info.categories)?;
                if let Some(declared) = fault.domain.filter(|d| *d != info.domain) {
                    return Err(CatalogError::invalid_record(
                        &fault.code,
                        format!("declares domain {declared} inside the {} dataset", info.domain),
                    ));
                }
                fault.domain = Some(info.domain);

                match records.entry(fault.code.clone()) {
                    Entry::Occupied(existing) => {
                        tracing::warn!(
                            code = %fault.code,
                            domain = %info.domain,
                            first_domain = ?existing.get().domain,
                            "duplicate fault code"
                        );
                        return Err(CatalogError::DuplicateFaultCode(fault.code));
                    }
                    Entry::Vacant(slot) => {
                        positions.push(slot.index());
                        slot.insert(fault);
                    }
                }
            }

            tracing::debug!(domain = %info.domain, faults = positions.len(), "dataset indexed");
            domains.insert(info.domain, DomainEntry { info, positions });
        }

        let search_keys = records.values().map(SearchKey::new).collect();

        tracing::info!(
            faults = records.len(),
            domains = domains.len(),
            "fault catalog loaded"
        );

        Ok(Self {
            records,
            search_keys,
            domains,
        })
    }

    /// Exact code lookup
    #[inline]
    #[must_use]
    pub fn get_by_code(&self, code: &str) -> Option<&FaultRecord> {
        self.records.get(code)
    }

    /// Exact code lookup that reports a miss as an error
    ///
    /// # Errors
    /// Returns [`CatalogError::NotFound`] for unknown codes
    pub fn require(&self, code: &str) -> CatalogResult<&FaultRecord> {
        self.get_by_code(code)
            .ok_or_else(|| CatalogError::NotFound(code.to_string()))
    }

    /// Check if a code exists
    #[inline]
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.records.contains_key(code)
    }

    /// All records of one domain, in declaration order
    #[must_use]
    pub fn get_by_domain(&self, domain: Domain) -> Vec<&FaultRecord> {
        self.domains
            .get(&domain)
            .map(|entry| self.at_positions(&entry.positions).collect())
            .unwrap_or_default()
    }

    /// All records with this severity, in store order
    #[must_use]
    pub fn get_by_severity(&self, severity: FaultSeverity) -> Vec<&FaultRecord> {
        self.records
            .values()
            .filter(|r| r.severity == severity)
            .collect()
    }

    /// Records of one category within a domain, in declaration order
    #[must_use]
    pub fn get_by_category(&self, domain: Domain, category: &str) -> Vec<&FaultRecord> {
        self.get_by_domain(domain)
            .into_iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Case-insensitive substring search
    ///
    /// A record matches when the query occurs in its code, name,
    /// description or any one of its symptoms. The empty query matches
    /// nothing. Results are in store order, unranked.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&FaultRecord> {
        if query.is_empty() {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        self.records
            .values()
            .zip(&self.search_keys)
            .filter(|(_, key)| key.matches(&needle))
            .map(|(record, _)| record)
            .collect()
    }

    /// All records, most severe first; ties keep store order
    #[must_use]
    pub fn sorted_by_severity(&self) -> Vec<&FaultRecord> {
        let mut all: Vec<&FaultRecord> = self.records.values().collect();
        all.sort_by(|a, b| b.severity.cmp(&a.severity));
        all
    }

    /// Loaded domains, in supply order
    pub fn domains(&self) -> impl Iterator<Item = Domain> + '_ {
        self.domains.keys().copied()
    }

    /// Metadata of one domain's dataset
    #[inline]
    #[must_use]
    pub fn dataset_info(&self, domain: Domain) -> Option<&DatasetInfo> {
        self.domains.get(&domain).map(|entry| &entry.info)
    }

    /// Categories declared by one domain's dataset
    #[must_use]
    pub fn categories(&self, domain: Domain) -> &[String] {
        self.dataset_info(domain)
            .map(|info| info.categories.as_slice())
            .unwrap_or_default()
    }

    /// Iterate all records in store order
    pub fn iter(&self) -> impl Iterator<Item = &FaultRecord> + '_ {
        self.records.values()
    }

    /// Total record count across all domains
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Alias of [`len`](Self::len) matching the dataset summary wording
    #[inline]
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.len()
    }

    /// Check if catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn at_positions<'a>(&'a self, positions: &'a [usize]) -> impl Iterator<Item = &'a FaultRecord> + 'a {
        positions
            .iter()
            .filter_map(|&i| self.records.get_index(i).map(|(_, record)| record))
    }
}
