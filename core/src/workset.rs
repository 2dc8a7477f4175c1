//! # Work Set
//!
//! The cross product of expanded targets and ports. Items are generated
//! lazily, target-major, so a scan of a /16 against 1000 ports never
//! materializes millions of pairs.

use std::net::Ipv4Addr;
use std::sync::Arc;

use sweep_common::models::WorkItem;
use sweep_common::network::ports::PortSet;
use sweep_common::network::range::IpCollection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkSet {
    targets: Arc<[Ipv4Addr]>,
    ports: Arc<[u16]>,
}

impl WorkSet {
    pub fn new(targets: Vec<Ipv4Addr>, ports: Vec<u16>) -> Self {
        Self {
            targets: targets.into(),
            ports: ports.into(),
        }
    }

    pub fn from_parts(targets: IpCollection, ports: PortSet) -> Self {
        Self::new(targets.into_vec(), ports.into_vec())
    }

    pub fn targets(&self) -> &[Ipv4Addr] {
        &self.targets
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// Total number of probes: `|targets| * |ports|`.
    pub fn len(&self) -> usize {
        self.targets.len() * self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = WorkItem> + '_ {
        self.targets.iter().flat_map(move |&target| {
            self.ports
                .iter()
                .map(move |&port| WorkItem::new(target, port))
        })
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
