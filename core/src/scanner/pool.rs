//! Fixed-size worker pool over a bounded queue.
//!
//! One producer walks the [`WorkSet`] and feeds a bounded channel; `N` workers
//! share the receiving end and pull until it is closed and drained. The
//! channel capacity gives backpressure, the worker count caps how many sockets
//! are open at once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sweep_common::models::{ProbeError, ProbeOutcome, WorkItem};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use super::collector::ResultCollector;
use super::{CancelToken, Prober};
use crate::error::ScanError;
use crate::workset::WorkSet;

/// Slack on top of a prober's own timeouts before the pool gives up on it.
pub(crate) const PROBE_GRACE: Duration = Duration::from_millis(100);

type SharedQueue = Arc<Mutex<mpsc::Receiver<WorkItem>>>;

pub(crate) struct WorkerPool {
    pub workers: usize,
    pub probe_deadline: Duration,
    pub prober: Arc<dyn Prober>,
    pub collector: Arc<ResultCollector>,
    pub cancel: CancelToken,
}

impl WorkerPool {
    /// Runs every work item through the prober and returns once all workers
    /// have exited. A worker that dies fails the whole run.
    pub async fn run(self, work: WorkSet) -> Result<(), ScanError> {
        if work.is_empty() {
            debug!("Nothing to scan");
            return Ok(());
        }

        let workers = self.workers.clamp(1, work.len());
        let (tx, rx) = mpsc::channel::<WorkItem>(workers);
        let queue: SharedQueue = Arc::new(Mutex::new(rx));

        let producer = tokio::spawn(produce(work, tx, self.cancel.clone()));

        let handles: Vec<JoinHandle<Result<(), ScanError>>> = (0..workers)
            .map(|_| {
                tokio::spawn(work_loop(
                    queue.clone(),
                    self.prober.clone(),
                    self.collector.clone(),
                    self.cancel.clone(),
                    self.probe_deadline,
                ))
            })
            .collect();
        drop(queue);

        let mut failure: Option<ScanError> = None;
        for handle in handles {
            let err = match handle.await {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(e) => ScanError::Worker(e.to_string()),
            };
            error!("Worker stopped early: {err}");
            failure.get_or_insert(err);
        }

        if let Err(e) = producer.await {
            error!("Work producer failed: {e}");
            failure.get_or_insert(ScanError::Worker(e.to_string()));
        }

        failure.map_or(Ok(()), Err)
    }
}

async fn produce(work: WorkSet, tx: mpsc::Sender<WorkItem>, cancel: CancelToken) {
    for item in work.iter() {
        if cancel.is_cancelled() {
            debug!("Cancelled, no more work is dispatched");
            break;
        }
        // Every worker is gone; nothing left to feed.
        if tx.send(item).await.is_err() {
            break;
        }
    }
}

async fn work_loop(
    queue: SharedQueue,
    prober: Arc<dyn Prober>,
    collector: Arc<ResultCollector>,
    cancel: CancelToken,
    probe_deadline: Duration,
) -> Result<(), ScanError> {
    loop {
        // The lock only guards the wait for the next item, never a probe.
        let next = queue.lock().await.recv().await;
        let Some(item) = next else {
            break;
        };
        if cancel.is_cancelled() {
            break;
        }

        collector.mark_issued();
        let started = Instant::now();

        // Own task per probe so a panicking prober costs one item, not the worker.
        let mut probe = {
            let prober = prober.clone();
            tokio::spawn(async move { prober.probe(item).await })
        };
        let outcome = match timeout(probe_deadline, &mut probe).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!("Probe of {item} crashed: {e}");
                ProbeOutcome::failed(item, ProbeError::Unknown, started.elapsed())
            }
            Err(_elapsed) => {
                probe.abort();
                warn!("Probe of {item} overran {probe_deadline:?}, counting it as a timeout");
                ProbeOutcome::failed(item, ProbeError::Timeout, started.elapsed())
            }
        };
        collector.record(outcome)?;
    }
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::net::Ipv4Addr;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Sleeps for a moment and tracks how many probes overlap.
    #[derive(Default)]
    struct GaugeProber {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        seen: StdMutex<Vec<WorkItem>>,
    }

    #[async_trait]
    impl Prober for GaugeProber {
        async fn probe(&self, item: WorkItem) -> ProbeOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.seen.lock().unwrap().push(item);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if item.port % 7 == 0 {
                ProbeOutcome::open(item, None, Duration::ZERO)
            } else {
                ProbeOutcome::failed(item, ProbeError::Refused, Duration::ZERO)
            }
        }
    }

    /// Blows up on port 3, answers refused everywhere else.
    struct PanickingProber;

    #[async_trait]
    impl Prober for PanickingProber {
        async fn probe(&self, item: WorkItem) -> ProbeOutcome {
            if item.port == 3 {
                panic!("prober bug on {item}");
            }
            ProbeOutcome::failed(item, ProbeError::Refused, Duration::ZERO)
        }
    }

    /// Never answers on its own.
    struct HangingProber;

    #[async_trait]
    impl Prober for HangingProber {
        async fn probe(&self, item: WorkItem) -> ProbeOutcome {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            ProbeOutcome::open(item, None, Duration::ZERO)
        }
    }

    fn work(targets: u8, ports: u16) -> WorkSet {
        let targets = (1..=targets).map(|octet| Ipv4Addr::new(10, 0, 0, octet)).collect();
        WorkSet::new(targets, (1..=ports).collect())
    }

    fn pool(workers: usize, prober: Arc<dyn Prober>, collector: Arc<ResultCollector>) -> WorkerPool {
        WorkerPool {
            workers,
            probe_deadline: Duration::from_secs(5),
            prober,
            collector,
            cancel: CancelToken::new(),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn never_exceeds_worker_limit() {
        let prober = Arc::new(GaugeProber::default());
        let collector = Arc::new(ResultCollector::new(4, 50));

        pool(8, prober.clone(), collector.clone()).run(work(4, 50)).await.unwrap();

        assert!(prober.peak.load(Ordering::SeqCst) <= 8);
        assert!(prober.peak.load(Ordering::SeqCst) >= 2);
        assert_eq!(collector.completed(), 200);
        assert_eq!(collector.issued(), 200);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn every_item_is_probed_exactly_once() {
        let prober = Arc::new(GaugeProber::default());
        let collector = Arc::new(ResultCollector::new(3, 40));
        let work = work(3, 40);
        let expected: HashSet<WorkItem> = work.iter().collect();

        pool(16, prober.clone(), collector.clone()).run(work).await.unwrap();

        let seen = prober.seen.lock().unwrap();
        assert_eq!(seen.len(), 120);
        assert_eq!(seen.iter().copied().collect::<HashSet<_>>(), expected);
        // ports 7, 14, .., 35 on each of 3 targets
        assert_eq!(collector.open_count(), 15);
    }

    #[tokio::test]
    async fn single_worker_still_finishes() {
        let prober = Arc::new(GaugeProber::default());
        let collector = Arc::new(ResultCollector::new(1, 10));

        pool(1, prober.clone(), collector.clone()).run(work(1, 10)).await.unwrap();

        assert_eq!(prober.peak.load(Ordering::SeqCst), 1);
        assert_eq!(collector.completed(), 10);
    }

    #[tokio::test]
    async fn empty_work_returns_immediately() {
        let collector = Arc::new(ResultCollector::new(0, 10));
        pool(4, Arc::new(GaugeProber::default()), collector.clone())
            .run(WorkSet::new(Vec::new(), (1..=10).collect()))
            .await
            .unwrap();
        assert_eq!(collector.completed(), 0);
    }

    #[tokio::test]
    async fn overrunning_probe_is_recorded_as_timeout() {
        let collector = Arc::new(ResultCollector::new(1, 3));
        let mut pool = pool(3, Arc::new(HangingProber), collector.clone());
        pool.probe_deadline = Duration::from_millis(50);

        pool.run(work(1, 3)).await.unwrap();

        let report = collector.seal(false).unwrap();
        assert_eq!(report.stats.completed, 3);
        assert_eq!(report.stats.failures.timeout, 3);
        assert!(report.open.is_empty());
    }

    #[tokio::test]
    async fn cancelled_pool_stops_dispatching() {
        let prober = Arc::new(GaugeProber::default());
        let collector = Arc::new(ResultCollector::new(1, 500));
        let pool = pool(2, prober.clone(), collector.clone());
        let cancel = pool.cancel.clone();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            cancel.cancel();
        });
        pool.run(work(1, 500)).await.unwrap();
        canceller.await.unwrap();

        let completed = collector.completed();
        assert!(completed < 500, "cancellation had no effect");
        assert_eq!(completed, collector.issued());
    }

    #[tokio::test]
    async fn panicking_probe_still_yields_an_outcome() {
        let collector = Arc::new(ResultCollector::new(1, 5));

        pool(2, Arc::new(PanickingProber), collector.clone())
            .run(work(1, 5))
            .await
            .unwrap();

        let report = collector.seal(false).unwrap();
        assert_eq!(report.stats.issued, 5);
        assert_eq!(report.stats.completed, 5);
        assert_eq!(report.stats.failures.unknown, 1);
        assert_eq!(report.stats.failures.refused, 4);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn collector_error_fails_the_pool() {
        let collector = Arc::new(ResultCollector::new(1, 4));
        collector.seal(false).unwrap();

        let err = pool(2, Arc::new(GaugeProber::default()), collector)
            .run(work(1, 4))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::CollectorSealed));
    }
}
