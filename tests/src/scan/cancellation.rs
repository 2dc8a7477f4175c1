#![cfg(test)]
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sweep_common::models::{ProbeOutcome, WorkItem};
use sweep_core::{CancelToken, Prober, Scanner};

use crate::util::{fast_config, GaugeProber, Shared};

/// Ignores every timeout it is given.
struct StuckProber;

#[async_trait]
impl Prober for StuckProber {
    async fn probe(&self, item: WorkItem) -> ProbeOutcome {
        tokio::time::sleep(Duration::from_secs(30)).await;
        ProbeOutcome::open(item, None, Duration::from_secs(30))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelling_mid_scan_yields_partial_report() {
    let prober = Arc::new(GaugeProber::new(Duration::from_millis(10)));
    let cancel = CancelToken::new();
    let scanner = Scanner::new(fast_config().with_workers(4))
        .with_prober(Shared(prober.clone()))
        .with_cancel_token(cancel.clone());

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });
    let report = scanner.scan("10.2.0.1-10.2.0.10", "1-500").await.unwrap();
    trigger.await.unwrap();

    assert!(report.cancelled);
    assert!(!report.is_complete());
    assert_eq!(report.stats.total, 5_000);
    assert!(report.stats.completed > 0);
    assert!(report.stats.completed < report.stats.total);
    // Whatever was dispatched was also accounted for.
    assert_eq!(report.stats.completed, report.stats.issued);
    assert_eq!(report.stats.completed, prober.calls.load(Ordering::SeqCst));
    assert_eq!(report.open.len(), report.stats.open);
}

#[tokio::test]
async fn token_tripped_before_start_probes_nothing() {
    let prober = Arc::new(GaugeProber::new(Duration::ZERO));
    let scanner = Scanner::new(fast_config()).with_prober(Shared(prober.clone()));
    scanner.cancel_token().cancel();

    let report = scanner.scan("10.2.0.1", "1-100").await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.stats.total, 100);
    assert_eq!(report.stats.completed, 0);
    assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn finished_scan_is_not_marked_cancelled() {
    let scanner = Scanner::new(fast_config()).with_prober(GaugeProber::new(Duration::ZERO));

    let report = scanner.scan("10.2.0.1", "440-445").await.unwrap();
    scanner.cancel_token().cancel();

    assert!(!report.cancelled);
    assert!(report.is_complete());
    assert_eq!(report.stats.open, 1);
}

/// A prober that overruns its budget is cut off and counted as a timeout.
#[tokio::test]
async fn stuck_probes_are_bounded_by_the_budget() {
    let config = fast_config()
        .with_workers(8)
        .with_connect_timeout(Duration::from_millis(50))
        .with_banner_len(0);
    let scanner = Scanner::new(config).with_prober(StuckProber);

    let started = Instant::now();
    let report = scanner.scan("10.2.0.1", "1-8").await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.stats.completed, 8);
    assert_eq!(report.stats.failures.timeout, 8);
    assert!(report.open.is_empty());
}
