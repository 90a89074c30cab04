//! Parallel writers on a multi-threaded runtime.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio::task::JoinSet;
use udm_engine::{DiagnosticEngine, DiagnosticEvent, EngineConfig, EventSeverity};

const WRITERS: usize = 8;
const EVENTS_PER_WRITER: u64 = 2000;

const CYCLE: [EventSeverity; 3] = [
    EventSeverity::High,
    EventSeverity::Medium,
    EventSeverity::Low,
];

fn engine() -> Arc<DiagnosticEngine> {
    Arc::new(DiagnosticEngine::new(EngineConfig::new().with_seed(5)).unwrap())
}

fn severity(step: u64) -> EventSeverity {
    CYCLE[(step % 3) as usize]
}

async fn write_all(engine: Arc<DiagnosticEngine>, subsystem: String) {
    for step in 0..EVENTS_PER_WRITER {
        let event =
            DiagnosticEvent::new(subsystem.as_str(), format!("step {step}"), severity(step));
        engine.ingest(&event);
        if step % 64 == 0 {
            tokio::task::yield_now().await;
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_parallel_writers_keep_buckets_consistent() {
    let engine = engine();
    let alert_capacity = engine.config().alert_capacity;
    let log_capacity = engine.config().log_capacity;

    let mut tasks = JoinSet::new();
    for _ in 0..WRITERS {
        tasks.spawn(write_all(Arc::clone(&engine), "Shared".to_string()));
    }
    for writer in 0..WRITERS {
        tasks.spawn(write_all(Arc::clone(&engine), format!("Line-{writer}")));
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }

    let per_severity = |events: u64| {
        let mut expected = [0_u64; 3];
        for step in 0..events {
            expected[(step % 3) as usize] += 1;
        }
        expected
    };

    let mut subsystems = vec![("Shared".to_string(), WRITERS as u64)];
    subsystems.extend((0..WRITERS).map(|w| (format!("Line-{w}"), 1)));

    for (subsystem, writers) in subsystems {
        let counters = engine.counters(&subsystem);
        let expected = per_severity(EVENTS_PER_WRITER).map(|n| n * writers);
        assert_eq!(
            [counters.high, counters.medium, counters.low],
            expected,
            "{subsystem}"
        );
        assert_eq!(counters.total(), EVENTS_PER_WRITER * writers);

        let alerts = engine.alerts(&subsystem);
        assert_eq!(alerts.len(), alert_capacity, "{subsystem}");
        assert!(
            alerts.windows(2).all(|w| w[0].id < w[1].id),
            "alert ids out of order for {subsystem}"
        );

        let prefix = format!("] {subsystem}: ");
        assert!(alerts.iter().all(|a| a.message.contains(&prefix)));

        let lines = engine.log_lines(&subsystem);
        assert_eq!(lines.len(), log_capacity, "{subsystem}");
        assert!(
            lines.iter().all(|l| l.contains(&prefix)),
            "foreign line in {subsystem}"
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_snapshot_alerts_agree_with_counters_under_writes() {
    let engine = engine();
    let alert_capacity = engine.config().alert_capacity as u64;

    let writer = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            for step in 0..EVENTS_PER_WRITER {
                engine.ingest(&DiagnosticEvent::new(
                    "Pumps",
                    format!("cavitation {step}"),
                    EventSeverity::High,
                ));
                if step % 32 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        })
    };

    let mut readers = JoinSet::new();
    for _ in 0..3 {
        let engine = Arc::clone(&engine);
        readers.spawn(async move {
            for _ in 0..500 {
                let snapshot = engine.snapshot("Pumps");
                assert_eq!(
                    snapshot.alerts.len() as u64,
                    snapshot.counters.high.min(alert_capacity)
                );
                tokio::task::yield_now().await;
            }
        });
    }

    writer.await.unwrap();
    while let Some(joined) = readers.join_next().await {
        joined.unwrap();
    }

    let snapshot = engine.snapshot("Pumps");
    assert_eq!(snapshot.counters.high, EVENTS_PER_WRITER);
    assert_eq!(snapshot.alerts.len() as u64, alert_capacity);
}
