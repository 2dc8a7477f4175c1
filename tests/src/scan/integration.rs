#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sweep_common::models::ProbeError;
use sweep_common::SpecError;
use sweep_core::{ScanError, Scanner};

use crate::util::{
    closed_ports, fast_config, port_list, spawn_acceptor, spawn_greeter, GaugeProber, Shared,
    TableResolver,
};

/// A single listener among closed ports is the only thing reported open.
#[tokio::test]
async fn scan_finds_only_the_listening_port() -> anyhow::Result<()> {
    let open = spawn_acceptor().await;
    let mut ports = closed_ports(2).await;
    ports.insert(1, open);

    let report = sweep_core::scan("127.0.0.1", &port_list(&ports), &fast_config())
        .await
        .context("loopback scan failed")?;

    let found: Vec<(Ipv4Addr, u16)> = report.open_ports().collect();
    assert_eq!(found, vec![(Ipv4Addr::LOCALHOST, open)]);
    assert_eq!(report.stats.total, 3);
    assert_eq!(report.stats.completed, 3);
    assert_eq!(report.stats.failures.refused, 2);
    assert!(report.is_complete());
    Ok(())
}

#[tokio::test]
async fn greeting_is_captured_as_banner() -> anyhow::Result<()> {
    let port = spawn_greeter(b"SSH-2.0-OpenSSH_9.6\r\nextra line\r\n").await;

    let report = sweep_core::scan("127.0.0.1", &port.to_string(), &fast_config()).await?;

    assert_eq!(report.open.len(), 1);
    assert_eq!(report.open[0].banner.as_deref(), Some("SSH-2.0-OpenSSH_9.6"));
    Ok(())
}

#[tokio::test]
async fn banner_grabbing_can_be_disabled() {
    let port = spawn_greeter(b"220 ftp ready\r\n").await;
    let config = fast_config().with_banner_len(0);

    let report = sweep_core::scan("127.0.0.1", &port.to_string(), &config)
        .await
        .unwrap();

    assert_eq!(report.open.len(), 1);
    assert_eq!(report.open[0].banner, None);
}

/// Only the address the listener is bound to shows the port open.
#[tokio::test]
async fn range_targets_are_all_probed() {
    let open = spawn_acceptor().await;

    let report = sweep_core::scan("127.0.0.1-3", &open.to_string(), &fast_config())
        .await
        .unwrap();

    assert_eq!(report.stats.targets, 3);
    assert_eq!(report.stats.total, 3);
    assert_eq!(report.stats.completed, 3);
    let found: Vec<(Ipv4Addr, u16)> = report.open_ports().collect();
    assert_eq!(found, vec![(Ipv4Addr::LOCALHOST, open)]);
}

#[tokio::test]
async fn repeated_scans_report_the_same_open_set() {
    let a = spawn_acceptor().await;
    let b = spawn_greeter(b"hello\n").await;
    let mut ports = closed_ports(3).await;
    ports.extend([a, b]);
    let spec = port_list(&ports);

    let first = sweep_core::scan("127.0.0.1", &spec, &fast_config())
        .await
        .unwrap();
    let second = sweep_core::scan("127.0.0.1", &spec, &fast_config())
        .await
        .unwrap();

    let first: Vec<(Ipv4Addr, u16)> = first.open_ports().collect();
    let second: Vec<(Ipv4Addr, u16)> = second.open_ports().collect();
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn hostnames_go_through_the_resolver() {
    let open = spawn_acceptor().await;
    let resolver = TableResolver::default().with(
        "db.internal",
        &[
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            "::1".parse().unwrap(),
        ],
    );

    let report = Scanner::new(fast_config())
        .with_resolver(resolver)
        .scan("db.internal", &open.to_string())
        .await
        .unwrap();

    // The IPv6 answer is dropped.
    assert_eq!(report.stats.targets, 1);
    assert_eq!(report.open_ports().collect::<Vec<_>>(), vec![(Ipv4Addr::LOCALHOST, open)]);
}

#[tokio::test]
async fn unresolvable_hostname_scans_nothing() {
    let prober = Arc::new(GaugeProber::new(Duration::ZERO));

    let report = Scanner::new(fast_config())
        .with_resolver(TableResolver::default())
        .with_prober(Shared(prober.clone()))
        .scan("nowhere.invalid", "1-1024")
        .await
        .unwrap();

    assert_eq!(report.stats.total, 0);
    assert_eq!(report.stats.completed, 0);
    assert!(report.open.is_empty());
    assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_requests_fail_before_any_probe() {
    let prober = Arc::new(GaugeProber::new(Duration::ZERO));
    let scanner = Scanner::new(fast_config()).with_prober(Shared(prober.clone()));

    let cases = [
        ("10.0.0.300", "80"),
        ("10.0.0.9-10.0.0.1", "80"),
        ("::1", "80"),
        ("127.0.0.1", "22-10"),
        ("127.0.0.1", "ssh"),
        ("127.0.0.1", ""),
    ];
    for (target, ports) in cases {
        let err = scanner.scan(target, ports).await.unwrap_err();
        assert!(
            matches!(err, ScanError::Spec(SpecError::Format { .. })),
            "{target} / {ports}: {err:?}"
        );
    }

    for (target, ports) in [("127.0.0.1", "0"), ("127.0.0.1", "65536"), ("10.0.0.0/33", "80")] {
        let err = scanner.scan(target, ports).await.unwrap_err();
        assert!(
            matches!(err, ScanError::Spec(SpecError::Range { .. })),
            "{target} / {ports}: {err:?}"
        );
    }

    assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_probes_never_exceed_worker_count() {
    let prober = Arc::new(GaugeProber::new(Duration::from_millis(5)));

    let report = Scanner::new(fast_config().with_workers(5))
        .with_prober(Shared(prober.clone()))
        .scan("10.1.0.1-10.1.0.4", "400-449")
        .await
        .unwrap();

    assert_eq!(report.stats.completed, 200);
    assert_eq!(prober.calls.load(Ordering::SeqCst), 200);
    assert!(prober.peak.load(Ordering::SeqCst) <= 5);
    assert_eq!(report.stats.open, 4);
    assert_eq!(report.stats.failures.get(ProbeError::Refused), 196);
}
