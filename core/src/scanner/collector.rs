//! Thread-safe sink for probe outcomes.
//!
//! Every counter is an atomic and the open-port list sits behind a mutex that
//! is held only for a single push, so hundreds of workers can report at once
//! without losing updates or throttling each other.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use sweep_common::models::{FailureCounts, ProbeError, ProbeOutcome, ScanReport, ScanStats};
use tracing::debug;

use crate::error::ScanError;

/// Called for every recorded outcome with the number of completed probes so far.
pub type Observer = Arc<dyn Fn(&ProbeOutcome, usize) + Send + Sync>;

#[derive(Default)]
struct FailureCounters {
    timeout: AtomicUsize,
    refused: AtomicUsize,
    unreachable: AtomicUsize,
    unknown: AtomicUsize,
}

impl FailureCounters {
    fn bump(&self, error: ProbeError) {
        let counter = match error {
            ProbeError::Timeout => &self.timeout,
            ProbeError::Refused => &self.refused,
            ProbeError::Unreachable => &self.unreachable,
            ProbeError::Unknown => &self.unknown,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> FailureCounts {
        FailureCounts {
            timeout: self.timeout.load(Ordering::Relaxed),
            refused: self.refused.load(Ordering::Relaxed),
            unreachable: self.unreachable.load(Ordering::Relaxed),
            unknown: self.unknown.load(Ordering::Relaxed),
        }
    }
}

pub struct ResultCollector {
    targets: usize,
    ports: usize,
    total: usize,
    issued: AtomicUsize,
    completed: AtomicUsize,
    open_count: AtomicUsize,
    failures: FailureCounters,
    open: Mutex<Vec<ProbeOutcome>>,
    sealed: AtomicBool,
    start_time: DateTime<Utc>,
    started: Instant,
    observer: Option<Observer>,
}

impl ResultCollector {
    /// Starts the scan clock. The total is fixed here, before any dispatch.
    pub fn new(targets: usize, ports: usize) -> Self {
        Self {
            targets,
            ports,
            total: targets * ports,
            issued: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            open_count: AtomicUsize::new(0),
            failures: FailureCounters::default(),
            open: Mutex::new(Vec::new()),
            sealed: AtomicBool::new(false),
            start_time: Utc::now(),
            started: Instant::now(),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Option<Observer>) -> Self {
        self.observer = observer;
        self
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::Acquire)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    pub fn open_count(&self) -> usize {
        self.open_count.load(Ordering::Acquire)
    }

    /// A work item has been handed to a prober.
    pub fn mark_issued(&self) {
        self.issued.fetch_add(1, Ordering::AcqRel);
    }

    /// Accepts exactly one outcome per work item.
    pub fn record(&self, outcome: ProbeOutcome) -> Result<(), ScanError> {
        if self.sealed.load(Ordering::Acquire) {
            return Err(ScanError::CollectorSealed);
        }

        if outcome.connected {
            self.open_count.fetch_add(1, Ordering::AcqRel);
            debug!("{}:{} is open", outcome.target, outcome.port);
        } else {
            self.failures
                .bump(outcome.error.unwrap_or(ProbeError::Unknown));
        }
        let completed = self.completed.fetch_add(1, Ordering::AcqRel) + 1;

        if let Some(observer) = &self.observer {
            observer(&outcome, completed);
        }

        if outcome.connected {
            self.open
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(outcome);
        }
        Ok(())
    }

    /// Freezes the collector into the final report.
    ///
    /// Must only be called once every worker has stopped; a second call, or
    /// any later `record`, fails with [`ScanError::CollectorSealed`].
    pub fn seal(&self, cancelled: bool) -> Result<ScanReport, ScanError> {
        if self.sealed.swap(true, Ordering::AcqRel) {
            return Err(ScanError::CollectorSealed);
        }

        let mut open = std::mem::take(
            &mut *self.open.lock().unwrap_or_else(PoisonError::into_inner),
        );
        open.sort_by_key(|outcome| (outcome.target, outcome.port));

        let stats = ScanStats {
            targets: self.targets,
            ports: self.ports,
            total: self.total,
            issued: self.issued(),
            completed: self.completed(),
            open: self.open_count(),
            failures: self.failures.snapshot(),
            start_time: self.start_time,
            end_time: Utc::now(),
            elapsed: self.started.elapsed(),
        };

        Ok(ScanReport {
            open,
            stats,
            cancelled,
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
