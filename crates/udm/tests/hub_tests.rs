//! End-to-end checks of the hub: catalog barrier, monitors, observers.

use pretty_assertions::assert_eq;
use udm::{
    CatalogError, Domain, EventSeverity, FaultCatalog, FaultSeverity, HealthState, HubError,
    MaintenanceHub,
};
use udm_test_utils::{
    dataset, event, fault, seeded_config, small_catalog, with_captured_logs, TEST_PERIOD,
};

#[test]
fn test_bootstrap_loads_bundled_catalog() {
    let hub = MaintenanceHub::bootstrap(seeded_config(1)).unwrap();

    let e001 = hub.catalog().get_by_code("E001").unwrap();
    assert_eq!(e001.severity, FaultSeverity::Critical);
    assert!(hub.catalog().search("oil pressure").iter().any(|r| r.code == "E001"));
    assert!(hub.engine().running().is_empty());
}

#[test]
fn test_duplicate_codes_stop_startup() {
    let err = FaultCatalog::load([
        dataset(Domain::Generator, vec![fault("X-1", FaultSeverity::Low)]),
        dataset(Domain::Solar, vec![fault("X-1", FaultSeverity::High)]),
    ])
    .unwrap_err();
    assert_eq!(err, CatalogError::DuplicateFaultCode("X-1".to_string()));

    let hub_err: HubError = err.into();
    assert!(matches!(hub_err, HubError::Catalog(_)));
}

#[test]
fn test_invalid_engine_config_stops_startup() {
    let err = MaintenanceHub::with_catalog(small_catalog(), seeded_config(1).with_log_capacity(0))
        .unwrap_err();
    assert!(matches!(err, HubError::Engine(_)));
}

#[test]
fn test_related_faults_sorted_by_severity() {
    let hub = MaintenanceHub::with_catalog(small_catalog(), seeded_config(1)).unwrap();

    let codes: Vec<&str> = hub
        .related_faults("Diesel Generators")
        .iter()
        .map(|r| r.code.as_str())
        .collect();
    assert_eq!(codes, vec!["G-1", "G-2"]);

    let hub_wide = hub.related_faults("Diagnostics Hub");
    assert_eq!(hub_wide.len(), 4);
    assert!(hub_wide
        .windows(2)
        .all(|w| w[0].severity >= w[1].severity));
    assert!(hub.related_faults("Incinerators").is_empty());
}

#[test]
fn test_observer_failure_is_logged() {
    let hub = MaintenanceHub::with_catalog(small_catalog(), seeded_config(1)).unwrap();
    hub.engine()
        .on_severity_update(|_, _| Err(std::io::Error::other("chart offline").into()));

    let ((), logs) = with_captured_logs(|| {
        hub.engine().ingest(&event("Pumps", EventSeverity::Medium));
    });

    assert!(logs.contains("severity observer failed"), "{logs}");
    assert!(logs.contains("chart offline"), "{logs}");
    assert_eq!(hub.engine().health("Pumps"), HealthState::Amber);
    assert_eq!(hub.engine().alerts("Pumps").len(), 1);
}

#[test]
fn test_health_escalation_is_logged() {
    let hub = MaintenanceHub::with_catalog(small_catalog(), seeded_config(1)).unwrap();

    let ((), logs) = with_captured_logs(|| {
        hub.engine().ingest(&event("Pumps", EventSeverity::High));
    });

    assert!(logs.contains("subsystem health escalated"), "{logs}");
    assert!(logs.contains("WARN"), "{logs}");
}

#[tokio::test(start_paused = true)]
async fn test_select_and_shutdown() {
    let hub = MaintenanceHub::with_catalog(small_catalog(), seeded_config(7)).unwrap();
    let engine = hub.engine();

    engine.select("Solar Systems").await.unwrap();
    tokio::time::sleep(TEST_PERIOD * 5 + TEST_PERIOD / 2).await;

    let snapshot = engine.snapshot("Solar Systems");
    assert!(snapshot.monitored);
    assert_eq!(snapshot.counters.total(), 5);
    assert_eq!(snapshot.log_lines.len(), 3 + 5);
    assert!(snapshot.hint.unwrap().contains("MPPT"));

    hub.shutdown().await;
    assert!(engine.running().is_empty());

    tokio::time::sleep(TEST_PERIOD * 5).await;
    assert_eq!(engine.counters("Solar Systems").total(), 5);
}
