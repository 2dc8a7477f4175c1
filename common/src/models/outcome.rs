//! # Probe Outcome
//!
//! The record a prober produces for exactly one [`WorkItem`].

use std::fmt;
use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Serialize;

use super::work::WorkItem;

/// Coarse reason a connect attempt did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeError {
    /// No answer within the connect timeout (usually filtered).
    Timeout,
    /// The remote actively refused or reset the connection.
    Refused,
    /// No route to the host or network.
    Unreachable,
    Unknown,
}

impl ProbeError {
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut => Self::Timeout,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted => Self::Refused,
            io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
                Self::Unreachable
            }
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::Refused => "refused",
            Self::Unreachable => "unreachable",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    #[serde(rename = "host")]
    pub target: Ipv4Addr,
    pub port: u16,
    #[serde(rename = "open")]
    pub connected: bool,
    pub banner: Option<String>,
    pub error: Option<ProbeError>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ProbeOutcome {
    /// The connect attempt succeeded. `banner` is whatever the service volunteered.
    pub fn open(item: WorkItem, banner: Option<String>, elapsed: Duration) -> Self {
        Self {
            target: item.target,
            port: item.port,
            connected: true,
            banner,
            error: None,
            elapsed,
        }
    }

    pub fn failed(item: WorkItem, error: ProbeError, elapsed: Duration) -> Self {
        Self {
            target: item.target,
            port: item.port,
            connected: false,
            banner: None,
            error: Some(error),
            elapsed,
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
