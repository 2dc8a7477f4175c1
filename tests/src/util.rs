use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sweep_common::config::ScanConfig;
use sweep_common::models::{ProbeError, ProbeOutcome, WorkItem};
use sweep_common::network::resolver::Resolver;
use sweep_core::Prober;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// Short timeouts; everything in these tests talks to loopback.
pub fn fast_config() -> ScanConfig {
    ScanConfig::default()
        .with_workers(32)
        .with_connect_timeout(Duration::from_millis(300))
        .with_banner_timeout(Duration::from_millis(300))
}

/// Accepts connections forever and says nothing.
pub async fn spawn_acceptor() -> u16 {
    spawn_server(None).await
}

/// Accepts connections forever and greets each one with `greeting`.
pub async fn spawn_greeter(greeting: &'static [u8]) -> u16 {
    spawn_server(Some(greeting)).await
}

async fn spawn_server(greeting: Option<&'static [u8]>) -> u16 {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                if let Some(greeting) = greeting {
                    let _ = socket.write_all(greeting).await;
                }
                tokio::time::sleep(Duration::from_millis(500)).await;
            });
        }
    });
    port
}

/// `n` distinct ports nothing is listening on.
pub async fn closed_ports(n: usize) -> Vec<u16> {
    let mut listeners = Vec::with_capacity(n);
    for _ in 0..n {
        listeners.push(TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap());
    }
    listeners
        .iter()
        .map(|listener| listener.local_addr().unwrap().port())
        .collect()
}

pub fn port_list(ports: &[u16]) -> String {
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Fixed name table instead of DNS.
#[derive(Default)]
pub struct TableResolver {
    pub table: HashMap<String, Vec<IpAddr>>,
    pub lookups: AtomicUsize,
}

impl TableResolver {
    pub fn with(mut self, name: &str, addrs: &[IpAddr]) -> Self {
        self.table.insert(name.to_string(), addrs.to_vec());
        self
    }
}

#[async_trait]
impl Resolver for TableResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.table
            .get(host)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{host}: NXDOMAIN")))
    }
}

/// Sleeps for `delay` per probe and records how many probes overlap.
pub struct GaugeProber {
    pub delay: Duration,
    pub in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub calls: AtomicUsize,
}

impl GaugeProber {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Prober for GaugeProber {
    async fn probe(&self, item: WorkItem) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if item.port == 443 {
            ProbeOutcome::open(item, None, self.delay)
        } else {
            ProbeOutcome::failed(item, ProbeError::Refused, self.delay)
        }
    }
}

/// Shares a prober with the test after it has been handed to a scanner.
pub struct Shared<P>(pub std::sync::Arc<P>);

#[async_trait]
impl<P: Prober> Prober for Shared<P> {
    async fn probe(&self, item: WorkItem) -> ProbeOutcome {
        self.0.probe(item).await
    }
}
