//! # Port Specification
//!
//! Parses strings such as `"22,80,8000-8100"` or `"top"` into an ordered,
//! duplicate-free [`PortSet`]. Each comma-separated token becomes a
//! [`PortSelection`] first, so the `top` keyword is resolved exactly once.

use std::collections::HashSet;
use std::str::FromStr;

use crate::error::{Result, SpecError};

/// Well-known service ports selected by the `top` keyword.
pub const COMMON_PORTS: [u16; 31] = [
    21, 22, 23, 25, 53, 67, 68, 80, 110, 111, 123, 135, 139, 143, 161, 179, 389, 443, 445, 465,
    514, 587, 993, 995, 1433, 1521, 2049, 3306, 3389, 8080, 8443,
];

/// One token of a port specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSelection {
    /// The built-in [`COMMON_PORTS`] list.
    Common,
    Single(u16),
    /// Inclusive range, `lo <= hi`.
    Range { lo: u16, hi: u16 },
}

impl FromStr for PortSelection {
    type Err = SpecError;

    fn from_str(token: &str) -> Result<Self> {
        let token = token.trim();

        if token.eq_ignore_ascii_case("top") || token.eq_ignore_ascii_case("common") {
            return Ok(Self::Common);
        }

        if let Some((lo_str, hi_str)) = token.split_once('-') {
            let lo = parse_port(lo_str, token)?;
            let hi = parse_port(hi_str, token)?;
            if lo > hi {
                return Err(SpecError::format(
                    token,
                    format!("range start {lo} is greater than end {hi}"),
                ));
            }
            return Ok(Self::Range { lo, hi });
        }

        parse_port(token, token).map(Self::Single)
    }
}

/// Parses one port number. `token` is the full token, used in error messages.
fn parse_port(s: &str, token: &str) -> Result<u16> {
    let value = s
        .trim()
        .parse::<u32>()
        .map_err(|_| SpecError::format(token, format!("'{}' is not a port number", s.trim())))?;

    match u16::try_from(value) {
        Ok(port) if port >= 1 => Ok(port),
        _ => Err(SpecError::range(
            token,
            format!("port {value} is outside 1..=65535"),
        )),
    }
}

/// Ordered, duplicate-free list of ports. The first occurrence of a port wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSet {
    ports: Vec<u16>,
    seen: HashSet<u16>,
}

impl PortSet {
    pub fn from_selections(selections: &[PortSelection]) -> Self {
        let mut set = Self::default();
        for selection in selections {
            match *selection {
                PortSelection::Common => COMMON_PORTS.iter().for_each(|&port| set.insert(port)),
                PortSelection::Single(port) => set.insert(port),
                PortSelection::Range { lo, hi } => (lo..=hi).for_each(|port| set.insert(port)),
            }
        }
        set
    }

    fn insert(&mut self, port: u16) {
        if self.seen.insert(port) {
            self.ports.push(port);
        }
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn into_vec(self) -> Vec<u16> {
        self.ports
    }
}

impl FromStr for PortSet {
    type Err = SpecError;

    fn from_str(spec: &str) -> Result<Self> {
        let selections = parse_selections(spec)?;
        Ok(Self::from_selections(&selections))
    }
}

/// Splits a port specification into its tokens. Empty tokens are skipped.
pub fn parse_selections(spec: &str) -> Result<Vec<PortSelection>> {
    let selections = spec
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(PortSelection::from_str)
        .collect::<Result<Vec<_>>>()?;

    if selections.is_empty() {
        return Err(SpecError::format(spec, "no ports specified"));
    }
    Ok(selections)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
