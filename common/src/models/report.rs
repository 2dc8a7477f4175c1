//! # Scan Report
//!
//! The immutable snapshot produced once every work item is accounted for.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::outcome::{ProbeError, ProbeOutcome};

/// Failed probes, split by classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FailureCounts {
    pub timeout: usize,
    pub refused: usize,
    pub unreachable: usize,
    pub unknown: usize,
}

impl FailureCounts {
    pub fn get(&self, error: ProbeError) -> usize {
        match error {
            ProbeError::Timeout => self.timeout,
            ProbeError::Refused => self.refused,
            ProbeError::Unreachable => self.unreachable,
            ProbeError::Unknown => self.unknown,
        }
    }

    pub fn total(&self) -> usize {
        self.timeout + self.refused + self.unreachable + self.unknown
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub targets: usize,
    pub ports: usize,
    /// `targets * ports`, known before the first probe is dispatched.
    pub total: usize,
    /// Work items handed to a prober.
    pub issued: usize,
    /// Work items with a recorded outcome.
    pub completed: usize,
    pub open: usize,
    pub failures: FailureCounts,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ScanStats {
    pub fn closed_or_filtered(&self) -> usize {
        self.completed.saturating_sub(self.open)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Open ports, sorted by target then port.
    pub open: Vec<ProbeOutcome>,
    pub stats: ScanStats,
    /// Set when the scan stopped before every work item was dispatched.
    pub cancelled: bool,
}

impl ScanReport {
    /// True when every work item produced an outcome.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.stats.completed == self.stats.total
    }

    pub fn open_ports(&self) -> impl Iterator<Item = (std::net::Ipv4Addr, u16)> + '_ {
        self.open.iter().map(|outcome| (outcome.target, outcome.port))
    }
}
