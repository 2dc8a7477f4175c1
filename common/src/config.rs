//! # Scan Configuration
//!
//! Every knob the engine reads lives in [`ScanConfig`]. Callers start from
//! [`ScanConfig::default`] and override fields with the `with_*` builders.

use std::time::Duration;

use crate::error::{Result, SpecError};

pub const DEFAULT_WORKERS: usize = 200;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(800);
pub const DEFAULT_BANNER_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_BANNER_LEN: usize = 1024;

/// Controls which addresses of a CIDR block become targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CidrPolicy {
    /// Drop the network and broadcast address of blocks larger than `/31`.
    #[default]
    HostsOnly,
    /// Keep every address of the block.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Upper bound on probes in flight at once.
    ///
    /// Raising it speeds scans up at the cost of file descriptors and
    /// ephemeral ports on this machine.
    pub workers: usize,
    /// How long a single TCP connect may take before the port counts as filtered.
    pub connect_timeout: Duration,
    /// How long to wait for a service banner once connected.
    pub banner_timeout: Duration,
    /// Maximum number of banner bytes read. Zero disables banner grabbing.
    pub banner_len: usize,
    pub cidr_policy: CidrPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            banner_timeout: DEFAULT_BANNER_TIMEOUT,
            banner_len: DEFAULT_BANNER_LEN,
            cidr_policy: CidrPolicy::default(),
        }
    }
}

impl ScanConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_banner_timeout(mut self, timeout: Duration) -> Self {
        self.banner_timeout = timeout;
        self
    }

    pub fn with_banner_len(mut self, banner_len: usize) -> Self {
        self.banner_len = banner_len;
        self
    }

    pub fn with_cidr_policy(mut self, cidr_policy: CidrPolicy) -> Self {
        self.cidr_policy = cidr_policy;
        self
    }

    pub fn banner_enabled(&self) -> bool {
        self.banner_len > 0 && !self.banner_timeout.is_zero()
    }

    /// Longest time a single probe may legitimately take. Saturates at
    /// [`Duration::MAX`] for absurdly large timeouts.
    pub fn probe_budget(&self) -> Duration {
        if self.banner_enabled() {
            self.connect_timeout.saturating_add(self.banner_timeout)
        } else {
            self.connect_timeout
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(SpecError::Config("worker count must be at least 1".into()));
        }
        if self.connect_timeout.is_zero() {
            return Err(SpecError::Config("connect timeout must be greater than zero".into()));
        }
        Ok(())
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
