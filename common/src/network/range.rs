use std::collections::HashSet;
use std::net::Ipv4Addr;

use pnet::ipnetwork::Ipv4Network;

use crate::config::CidrPolicy;
use crate::error::{Result, SpecError};

/// Upper bound on addresses a single scan may expand to.
pub const MAX_TARGETS: u64 = 1 << 20;

/// Represents a continuous range of IPv4 addresses, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ipv4Addr> + Clone {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }

    pub fn len(&self) -> u64 {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if end < start {
            0
        } else {
            u64::from(end - start) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Creates the range of a CIDR block (e.g., 192.168.1.0/24).
///
/// Under [`CidrPolicy::HostsOnly`] the network and broadcast addresses are
/// stripped, except for `/31` and `/32` blocks which have no spare addresses.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8, policy: CidrPolicy) -> Result<Ipv4Range> {
    let network = Ipv4Network::new(ip, prefix)
        .map_err(|e| SpecError::range(format!("{ip}/{prefix}"), e.to_string()))?;
    let start: u32 = network.network().into();
    let end: u32 = network.broadcast().into();

    let range = match policy {
        CidrPolicy::HostsOnly if prefix <= 30 => {
            Ipv4Range::new(Ipv4Addr::from(start + 1), Ipv4Addr::from(end - 1))
        }
        _ => Ipv4Range::new(Ipv4Addr::from(start), Ipv4Addr::from(end)),
    };
    Ok(range)
}

/// Ordered, duplicate-free set of target addresses.
///
/// Insertion order is kept so repeated scans dispatch work the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpCollection {
    addrs: Vec<Ipv4Addr>,
    seen: HashSet<Ipv4Addr>,
}

impl IpCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `addr` unless it is already present. Returns whether it was new.
    pub fn add_single(&mut self, addr: Ipv4Addr) -> bool {
        if self.seen.insert(addr) {
            self.addrs.push(addr);
            true
        } else {
            false
        }
    }

    pub fn add_range(&mut self, range: Ipv4Range) -> Result<()> {
        let projected = self.addrs.len() as u64 + range.len();
        if projected > MAX_TARGETS {
            return Err(SpecError::range(
                format!("{}-{}", range.start_addr, range.end_addr),
                format!("expands past the limit of {MAX_TARGETS} addresses"),
            ));
        }
        for addr in range.iter() {
            self.add_single(addr);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    pub fn into_vec(self) -> Vec<Ipv4Addr> {
        self.addrs
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
