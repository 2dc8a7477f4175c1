//! # Hostname Resolution
//!
//! The scanner only needs "hostname in, addresses out". [`Resolver`] is that
//! seam; [`SystemResolver`] answers it with the operating system's resolver.

use std::io;
use std::net::{IpAddr, Ipv4Addr};

use async_trait::async_trait;
use tracing::{debug, warn};

#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Resolves through `getaddrinfo` via tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|socket_addr| socket_addr.ip()).collect())
    }
}

/// Resolves `host` to its IPv4 addresses.
///
/// Lookup failures are logged and produce an empty list; an unknown name must
/// never abort a scan.
pub async fn resolve_ipv4(resolver: &dyn Resolver, host: &str) -> Vec<Ipv4Addr> {
    match resolver.resolve(host).await {
        Ok(addrs) => {
            let v4: Vec<Ipv4Addr> = addrs
                .into_iter()
                .filter_map(|addr| match addr {
                    IpAddr::V4(v4) => Some(v4),
                    IpAddr::V6(_) => None,
                })
                .collect();
            if v4.is_empty() {
                warn!("{host} has no IPv4 addresses, skipping");
            } else {
                debug!("{host} resolved to {v4:?}");
            }
            v4
        }
        Err(e) => {
            warn!("Could not resolve {host}: {e}");
            Vec::new()
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
