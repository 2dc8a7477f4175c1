//! Full TCP handshake probing.
//!
//! Uses the operating system's `connect`, so no special privileges are
//! required. A probe is bounded by the connect timeout plus the banner
//! timeout, whatever the remote does.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use sweep_common::config::ScanConfig;
use sweep_common::models::{ProbeError, ProbeOutcome, WorkItem};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use super::banner;
use crate::scanner::Prober;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpProber {
    connect_timeout: Duration,
    banner_timeout: Duration,
    banner_len: usize,
}

impl TcpProber {
    pub fn new(connect_timeout: Duration, banner_timeout: Duration, banner_len: usize) -> Self {
        Self {
            connect_timeout,
            banner_timeout,
            banner_len,
        }
    }

    pub fn from_config(cfg: &ScanConfig) -> Self {
        Self::new(cfg.connect_timeout, cfg.banner_timeout, cfg.banner_len)
    }

    /// Waits briefly for the service to speak first.
    async fn read_banner(&self, stream: &mut TcpStream) -> Option<String> {
        if self.banner_len == 0 || self.banner_timeout.is_zero() {
            return None;
        }

        let mut buf = vec![0u8; self.banner_len];
        match timeout(self.banner_timeout, stream.read(&mut buf)).await {
            Ok(Ok(n)) if n > 0 => banner::decode(&buf[..n]),
            _ => None,
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, item: WorkItem) -> ProbeOutcome {
        let started = Instant::now();

        match timeout(self.connect_timeout, TcpStream::connect(item.socket_addr())).await {
            Ok(Ok(mut stream)) => {
                let banner = self.read_banner(&mut stream).await;
                ProbeOutcome::open(item, banner, started.elapsed())
            }
            Ok(Err(e)) => {
                let error = ProbeError::from_io(&e);
                trace!("{item} {error}: {e}");
                ProbeOutcome::failed(item, error, started.elapsed())
            }
            Err(_elapsed) => ProbeOutcome::failed(item, ProbeError::Timeout, started.elapsed()),
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
