//! The central **abstraction** for scanning operations.
//!
//! [`Scanner`] ties the pieces together: it validates the configuration,
//! expands the target and port specifications into a [`WorkSet`], hands the
//! work to the [`pool`] and seals the [`collector`] into a report.
//!
//! **Architectural Note:**
//! The engine only talks to a [`Prober`] and a [`Resolver`]. Swapping either
//! (an instrumented prober in tests, a fixed table instead of DNS) never
//! touches the scheduling logic.

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use sweep_common::config::ScanConfig;
use sweep_common::models::{ProbeOutcome, ScanReport, WorkItem};
use sweep_common::network::ports::PortSet;
use sweep_common::network::resolver::{Resolver, SystemResolver};
use sweep_common::network::target::Target;
use tracing::{info, warn};

use crate::error::ScanError;
use crate::network::tcp::TcpProber;
use crate::workset::WorkSet;

pub mod collector;
mod pool;

use collector::{Observer, ResultCollector};
use pool::{PROBE_GRACE, WorkerPool};

/// Defines the strategy for probing one transport-layer port.
///
/// Implementations never fail: every way a probe can go wrong is folded into
/// the returned [`ProbeOutcome`].
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, item: WorkItem) -> ProbeOutcome;
}

/// Cooperative stop signal shared between a scan and whoever may interrupt it.
///
/// Once tripped, no further work is dispatched; probes already in flight
/// finish or time out and the partial results are still reported.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct Scanner {
    config: ScanConfig,
    prober: Arc<dyn Prober>,
    resolver: Arc<dyn Resolver>,
    cancel: CancelToken,
    observer: Option<Observer>,
}

impl Scanner {
    /// A scanner using real TCP connects and the system resolver.
    pub fn new(config: ScanConfig) -> Self {
        let prober = TcpProber::from_config(&config);
        Self {
            config,
            prober: Arc::new(prober),
            resolver: Arc::new(SystemResolver),
            cancel: CancelToken::new(),
            observer: None,
        }
    }

    pub fn with_prober(mut self, prober: impl Prober + 'static) -> Self {
        self.prober = Arc::new(prober);
        self
    }

    pub fn with_resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Registers a callback invoked for every outcome, with the running
    /// count of completed probes. It runs on worker tasks and must be quick.
    pub fn on_outcome<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProbeOutcome, usize) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(callback));
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Validates everything and expands the specifications into work.
    ///
    /// Malformed input surfaces here, before any probe is sent. Port
    /// errors are caught before hostnames are looked up.
    pub async fn plan(&self, target_spec: &str, port_spec: &str) -> Result<WorkSet, ScanError> {
        self.config.validate()?;
        let target = Target::from_str(target_spec)?;
        let ports = PortSet::from_str(port_spec)?;

        let targets = target
            .expand(self.resolver.as_ref(), self.config.cidr_policy)
            .await?;
        if targets.is_empty() {
            warn!("'{target_spec}' did not expand to any address");
        }

        Ok(WorkSet::from_parts(targets, ports))
    }

    /// Probes every item of `work` and returns the sealed report.
    pub async fn run(&self, work: WorkSet) -> Result<ScanReport, ScanError> {
        self.config.validate()?;

        let collector = Arc::new(
            ResultCollector::new(work.targets().len(), work.ports().len())
                .with_observer(self.observer.clone()),
        );

        info!(
            "Scanning {} targets x {} ports = {} probes with {} workers",
            work.targets().len(),
            work.ports().len(),
            collector.total(),
            self.config.workers
        );

        let pool = WorkerPool {
            workers: self.config.workers,
            probe_deadline: self.config.probe_budget().saturating_add(PROBE_GRACE),
            prober: self.prober.clone(),
            collector: collector.clone(),
            cancel: self.cancel.clone(),
        };
        pool.run(work).await?;

        let cancelled = self.cancel.is_cancelled() && collector.completed() < collector.total();
        if cancelled {
            warn!(
                "Scan cancelled after {} of {} probes",
                collector.completed(),
                collector.total()
            );
        }

        let report = collector.seal(cancelled)?;
        info!(
            "Scan finished: {} open of {} probed in {:.2}s",
            report.stats.open,
            report.stats.completed,
            report.stats.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    pub async fn scan(&self, target_spec: &str, port_spec: &str) -> Result<ScanReport, ScanError> {
        let work = self.plan(target_spec, port_spec).await?;
        self.run(work).await
    }
}

/// Executes a full TCP connect scan with the default prober and resolver.
pub async fn scan(
    target_spec: &str,
    port_spec: &str,
    config: &ScanConfig,
) -> Result<ScanReport, ScanError> {
    Scanner::new(config.clone()).scan(target_spec, port_spec).await
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
