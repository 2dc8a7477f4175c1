//! # Scan Target Model
//!
//! Defines the possible inputs for a network scan.
//!
//! This module handles parsing and expanding targets, which can be:
//! * A single IPv4 address (host).
//! * A hostname, resolved through a [`Resolver`].
//! * An IPv4 Range (e.g., `192.168.1.1-100` or `10.0.0.1-10.0.0.20`).
//! * A CIDR block (e.g., `192.168.1.0/24`).
//! * A comma-separated list of any of the above.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use tracing::{debug, info};

use crate::config::CidrPolicy;
use crate::error::{Result, SpecError};
use crate::network::range::{self, IpCollection, Ipv4Range};
use crate::network::resolver::{self, Resolver};

/// Represents a distinct target to be scanned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Scan a single specific host.
    Host { target_addr: Ipv4Addr },
    /// Scan whatever a DNS name resolves to.
    Hostname { name: String },
    /// Scan a range of IPv4 addresses.
    Range { ipv4_range: Ipv4Range },
    /// Scan a CIDR block. The network/broadcast policy is applied on expansion.
    Cidr { network_addr: Ipv4Addr, prefix: u8 },
    /// Holds a list of different targets
    Multi { targets: Vec<Target> },
}

impl FromStr for Target {
    type Err = SpecError;

    /// Parses a string into a `Target`.
    ///
    /// Supported formats:
    /// * **Host**: Single IPv4 address (e.g., "192.168.1.5").
    /// * **Range**: "Start-End" (e.g., "192.168.1.1-50", "192.168.1.1-192.168.1.50").
    /// * **CIDR**: "Network/Prefix" (e.g., "192.168.1.0/24").
    /// * **Hostname**: Any valid DNS name (e.g., "scanme.example.org").
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SpecError::format(s, "target is empty"));
        }

        if s.contains(',') {
            return parse_commas(s);
        }

        if let Some(target) = parse_host(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_cidr_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_ip_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_hostname(s) {
            return Ok(target);
        }

        Err(SpecError::format(
            s,
            "expected an IPv4 address, range, CIDR block or hostname",
        ))
    }
}

impl Target {
    /// Flattens `Multi` into the plain targets it holds, in order.
    fn leaves(&self) -> Vec<&Target> {
        match self {
            Target::Multi { targets } => targets.iter().flat_map(Target::leaves).collect(),
            other => vec![other],
        }
    }

    /// Expands the target into concrete addresses, in specification order.
    ///
    /// Unresolvable hostnames contribute nothing.
    pub async fn expand(&self, resolver: &dyn Resolver, policy: CidrPolicy) -> Result<IpCollection> {
        let mut collection = IpCollection::new();

        for leaf in self.leaves() {
            match leaf {
                Target::Host { target_addr } => {
                    collection.add_single(*target_addr);
                }
                Target::Hostname { name } => {
                    for addr in resolver::resolve_ipv4(resolver, name).await {
                        collection.add_single(addr);
                    }
                }
                Target::Range { ipv4_range } => {
                    collection.add_range(*ipv4_range)?;
                }
                Target::Cidr {
                    network_addr,
                    prefix,
                } => {
                    let ipv4_range = range::cidr_range(*network_addr, *prefix, policy)?;
                    debug!("{network_addr}/{prefix} covers {} hosts", ipv4_range.len());
                    collection.add_range(ipv4_range)?;
                }
                // flattened by leaves()
                Target::Multi { .. } => {}
            }
        }

        Ok(collection)
    }
}

/// Parses and expands a target specification in one go.
pub async fn expand_targets(
    spec: &str,
    resolver: &dyn Resolver,
    policy: CidrPolicy,
) -> Result<IpCollection> {
    let target = Target::from_str(spec)?;
    let collection = target.expand(resolver, policy).await?;

    let len: usize = collection.len();
    let unit: &str = if len == 1 { "IP address has" } else { "IP addresses have" };
    info!("{len} {unit} been parsed from '{spec}'");

    Ok(collection)
}

/// Parses a comma-separated list of targets (e.g., "192.168.1.5, 10.0.0.1-50").
pub fn parse_commas(s: &str) -> Result<Target> {
    let mut targets = Vec::new();

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        targets.push(Target::from_str(part)?);
    }

    if targets.is_empty() {
        return Err(SpecError::format(s, "target list is empty"));
    }

    Ok(Target::Multi { targets })
}

/// Anything built only from digits, dots, dashes and slashes is meant as an
/// address form and must never fall through to hostname resolution.
fn is_numeric_form(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '/'))
}

/// Parses a single IP address.
fn parse_host(s: &str) -> Result<Option<Target>> {
    match s.parse::<IpAddr>() {
        Ok(IpAddr::V4(target_addr)) => Ok(Some(Target::Host { target_addr })),
        Ok(IpAddr::V6(_)) => Err(SpecError::format(s, "IPv6 targets are not supported")),
        Err(_) => Ok(None),
    }
}

/// Parses a range string like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
fn parse_ip_range(s: &str) -> Result<Option<Target>> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Ok(None);
    };

    let start_addr = match start_str.trim().parse::<Ipv4Addr>() {
        Ok(addr) => addr,
        Err(_) if !is_numeric_form(s) => return Ok(None),
        Err(e) => {
            return Err(SpecError::format(
                s,
                format!("invalid start IP '{start_str}': {e}"),
            ));
        }
    };

    let end_addr = parse_range_end_addr(end_str.trim(), &start_addr, s)?;
    if end_addr < start_addr {
        return Err(SpecError::format(
            s,
            format!("range end {end_addr} precedes start {start_addr}"),
        ));
    }

    let ipv4_range = Ipv4Range::new(start_addr, end_addr);
    Ok(Some(Target::Range { ipv4_range }))
}

/// Helper to parse the end address of a range.
///
/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(end_str: &str, start_addr: &Ipv4Addr, original_s: &str) -> Result<Ipv4Addr> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    if end_str.is_empty() {
        return Err(SpecError::format(original_s, "range end cannot be empty"));
    }

    let mut end_octets = start_addr.octets();
    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|e| SpecError::format(original_s, format!("invalid range end '{end_str}': {e}")))?;

    if partial_octets.len() > 4 {
        return Err(SpecError::format(
            original_s,
            format!("range end has too many octets: {end_str}"),
        ));
    }

    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

/// Parses CIDR notation like "192.168.1.0/24".
fn parse_cidr_range(s: &str) -> Result<Option<Target>> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let network_addr = ip_str
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|e| SpecError::format(s, format!("invalid IP in CIDR '{ip_str}': {e}")))?;

    let prefix = prefix_str
        .trim()
        .parse::<u32>()
        .map_err(|e| SpecError::format(s, format!("invalid prefix '{prefix_str}': {e}")))?;

    if prefix > 32 {
        return Err(SpecError::range(
            s,
            format!("prefix length {prefix} is outside 0..=32"),
        ));
    }

    Ok(Some(Target::Cidr {
        network_addr,
        prefix: prefix as u8,
    }))
}

/// Accepts RFC 1123 style names: dot-separated labels of letters, digits
/// and inner hyphens, at most 253 characters overall.
fn parse_hostname(s: &str) -> Option<Target> {
    if is_numeric_form(s) {
        return None;
    }

    let name = s.strip_suffix('.').unwrap_or(s);
    if name.is_empty() || name.len() > 253 {
        return None;
    }

    let labels_ok = name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    labels_ok.then(|| Target::Hostname {
        name: name.to_ascii_lowercase(),
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
