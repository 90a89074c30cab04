//! Functional tests against the bundled fault datasets.
//!
//! These exercise the catalog with the real data shipped in the crate:
//! - Code uniqueness across every domain.
//! - Lookup/search consistency for every record.
//! - The generator `E001` scenario used by the search UI.

use proptest::prelude::*;
use std::collections::HashSet;
use udm_catalog::{bundled, bundled_datasets, CatalogError, Domain, FaultCatalog, FaultSeverity};

#[test]
fn every_code_is_unique() {
    let catalog = bundled().unwrap();
    let codes: HashSet<&str> = catalog.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes.len(), catalog.len());

    let declared: usize = bundled_datasets().unwrap().iter().map(|d| d.faults.len()).sum();
    assert_eq!(catalog.len(), declared);
    assert_eq!(catalog.total_count(), 43);
}

#[test]
fn every_record_is_found_by_its_code() {
    let catalog = bundled().unwrap();
    for record in catalog.iter() {
        assert_eq!(catalog.get_by_code(&record.code), Some(record));
        assert!(
            catalog.search(&record.code).iter().any(|r| r.code == record.code),
            "search({}) missed its own record",
            record.code
        );
    }
}

#[test]
fn generator_low_oil_pressure_scenario() {
    let catalog = bundled().unwrap();

    let e001 = catalog.get_by_code("E001").unwrap();
    assert_eq!(e001.name, "Low Oil Pressure");
    assert_eq!(e001.severity.to_string(), "Critical");
    assert_eq!(e001.domain, Some(Domain::Generator));
    assert!(e001
        .symptoms
        .iter()
        .any(|s| s == "Low oil pressure warning light/alarm"));

    let hits = catalog.search("oil pressure");
    assert!(hits.iter().any(|r| r.code == "E001"));
}

#[test]
fn empty_query_matches_nothing() {
    assert!(bundled().unwrap().search("").is_empty());
}

#[test]
fn every_domain_is_loaded_with_metadata() {
    let catalog = bundled().unwrap();
    for domain in Domain::ALL {
        let info = catalog.dataset_info(domain).unwrap();
        assert!(!info.service_name.is_empty());
        assert_eq!(info.fault_count, catalog.get_by_domain(domain).len());
        for record in catalog.get_by_domain(domain) {
            assert!(info.categories.contains(&record.category));
        }
    }
}

#[test]
fn severity_partitions_the_catalog() {
    let catalog = bundled().unwrap();
    let total: usize = FaultSeverity::ALL
        .iter()
        .map(|&level| catalog.get_by_severity(level).len())
        .sum();
    assert_eq!(total, catalog.len());
}

#[test]
fn reloading_bundled_data_twice_collides() {
    let mut datasets = bundled_datasets().unwrap();
    let mut copy = datasets[0].clone();
    copy.domain = Domain::Electrical;
    for fault in &mut copy.faults {
        fault.domain = None;
    }
    copy.categories.clear();
    datasets.retain(|d| d.domain != Domain::Electrical);
    datasets.push(copy);

    assert!(matches!(
        FaultCatalog::load(datasets),
        Err(CatalogError::DuplicateFaultCode(_))
    ));
}

proptest! {
    #[test]
    fn search_results_really_match(query in "[a-zA-Z ]{1,6}") {
        let catalog = bundled().unwrap();
        let needle = query.to_lowercase();
        let hits = catalog.search(&query);

        for record in &hits {
            let matched = record.code.to_lowercase().contains(&needle)
                || record.name.to_lowercase().contains(&needle)
                || record.description.to_lowercase().contains(&needle)
                || record.symptoms.iter().any(|s| s.to_lowercase().contains(&needle));
            prop_assert!(matched);
        }

        // Store order is preserved
        let order: Vec<&str> = catalog.iter().map(|r| r.code.as_str()).collect();
        let positions: Vec<usize> = hits
            .iter()
            .filter_map(|r| order.iter().position(|c| *c == r.code))
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
