//! Periodic background world scans and snapshot publication.
//!
//! The tick loop never waits for a scan. It asks a [`SnapshotSource`] to
//! start one on a fixed period and reads whatever snapshot was published
//! last. [`ScanScheduler`] is the production source:
//!
//! - One worker task receives requests over an `mpsc` channel and runs the
//!   [`BlockScanner`] on the blocking pool, so requests are handled
//!   serially.
//! - A request is only sent while no other scan is in flight. The
//!   in-flight flag clears after the result is published, so no scan
//!   starts before the previous one's result is visible.
//! - Results are published through a `watch` channel as a whole
//!   `Arc<Snapshot>`; readers never see a partial list.
//! - Every request carries the scheduler generation. Stopping or
//!   restarting the task bumps the generation, and results from an older
//!   generation are discarded at publication.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use harvest_types::{BlockKind, Position, ScanId, Snapshot};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Errors that can occur while scanning.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The scanner could not complete the scan.
    #[error("scan {scan_id} failed: {message}")]
    Failed {
        /// The failing scan.
        scan_id: ScanId,
        /// Description of the failure.
        message: String,
    },

    /// The scan worker has shut down.
    #[error("scan worker is gone")]
    WorkerGone,
}

/// Parameters of one world scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Identifier for log correlation.
    pub scan_id: ScanId,
    /// Centre of the scan, normally the player's feet.
    pub origin: Position,
    /// Block kinds to collect.
    pub targets: Vec<BlockKind>,
    /// Horizontal radius.
    pub horizontal_radius: i32,
    /// Vertical radius.
    pub vertical_radius: i32,
    /// Maximum number of positions returned.
    pub max_positions: usize,
    /// Task tick counter value that triggered the scan.
    pub requested_at_tick: u64,
}

/// The block-search algorithm, supplied by the host.
pub trait BlockScanner: Send + Sync + 'static {
    /// Find positions of `request.targets` around `request.origin`.
    ///
    /// May block; it runs on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Failed`] if the world cannot be searched.
    fn scan(&self, request: &ScanRequest) -> Result<Vec<Position>, ScanError>;
}

/// Whether the tick counter value `counter` falls on a scan tick.
///
/// An interval of zero disables periodic scans.
pub const fn scan_due(counter: u32, interval: u32) -> bool {
    match counter.checked_rem(interval) {
        Some(rem) => rem == 0,
        None => false,
    }
}

/// Where the tick processor gets its snapshots from.
pub trait SnapshotSource: Send + Sync {
    /// Start a scan unless one is already running. Returns whether it started.
    fn request_scan(&self, request: ScanRequest) -> bool;

    /// The most recently published snapshot.
    fn current(&self) -> Option<Arc<Snapshot>>;

    /// Forget the current snapshot and accept new results (task start).
    fn restart(&self);

    /// Stop accepting results (task stop).
    fn stop(&self);
}

// ---------------------------------------------------------------------------
// Background scheduler
// ---------------------------------------------------------------------------

struct ScanJob {
    request: ScanRequest,
    generation: u64,
}

/// State shared between the scheduler handle and its worker.
struct Shared {
    in_flight: AtomicBool,
    accepting: AtomicBool,
    generation: AtomicU64,
    published: AtomicU64,
    discarded: AtomicU64,
    snapshot: watch::Sender<Option<Arc<Snapshot>>>,
}

impl Shared {
    fn new(snapshot: watch::Sender<Option<Arc<Snapshot>>>) -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            accepting: AtomicBool::new(true),
            generation: AtomicU64::new(0),
            published: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            snapshot,
        }
    }

    // Generation changes and publication all run under the watch channel's
    // write lock, so a result is checked and stored in one step.

    fn restart(&self) {
        self.snapshot.send_modify(|slot| {
            self.generation.fetch_add(1, Ordering::AcqRel);
            self.accepting.store(true, Ordering::Release);
            *slot = None;
        });
    }

    fn stop(&self) {
        self.snapshot.send_if_modified(|_| {
            self.accepting.store(false, Ordering::Release);
            self.generation.fetch_add(1, Ordering::AcqRel);
            false
        });
    }

    fn publish(&self, job: &ScanJob, positions: Vec<Position>) {
        let count = positions.len();
        let snapshot = Snapshot::new(
            job.request.scan_id,
            job.request.requested_at_tick,
            positions,
        );
        let mut stale_against = None;
        let published = self.snapshot.send_if_modified(|slot| {
            let current = self.generation.load(Ordering::Acquire);
            if !self.accepting.load(Ordering::Acquire) || job.generation != current {
                stale_against = Some(current);
                return false;
            }
            *slot = Some(Arc::new(snapshot));
            true
        });
        if published {
            self.published.fetch_add(1, Ordering::AcqRel);
            debug!(scan_id = %job.request.scan_id, positions = count, "Snapshot published");
        } else {
            self.discarded.fetch_add(1, Ordering::AcqRel);
            debug!(
                scan_id = %job.request.scan_id,
                scan_generation = job.generation,
                current_generation = ?stale_against,
                "Discarding stale scan result"
            );
        }
    }
}

/// Background scan scheduler backed by a single tokio worker.
pub struct ScanScheduler {
    shared: Arc<Shared>,
    requests: mpsc::UnboundedSender<ScanJob>,
    snapshot: watch::Receiver<Option<Arc<Snapshot>>>,
}

impl core::fmt::Debug for ScanScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScanScheduler")
            .field("in_flight", &self.is_in_flight())
            .field("published", &self.published_count())
            .field("discarded", &self.discarded_count())
            .finish_non_exhaustive()
    }
}

impl ScanScheduler {
    /// Spawn the worker on the current tokio runtime.
    ///
    /// Must be called from within a runtime. The worker exits when the
    /// scheduler is dropped.
    pub fn spawn(scanner: Arc<dyn BlockScanner>) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let shared = Arc::new(Shared::new(snapshot_tx));
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(Arc::clone(&shared), scanner, rx));
        info!("Scan worker started");
        Self {
            shared,
            requests: tx,
            snapshot: snapshot_rx,
        }
    }

    /// Whether a scan is running or its result is not yet published.
    pub fn is_in_flight(&self) -> bool {
        self.shared.in_flight.load(Ordering::Acquire)
    }

    /// Number of snapshots published so far.
    pub fn published_count(&self) -> u64 {
        self.shared.published.load(Ordering::Acquire)
    }

    /// Number of scan results thrown away as stale.
    pub fn discarded_count(&self) -> u64 {
        self.shared.discarded.load(Ordering::Acquire)
    }

    /// Wait until the published snapshot changes.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::WorkerGone`] if the worker has shut down.
    pub async fn changed(&mut self) -> Result<(), ScanError> {
        self.snapshot
            .changed()
            .await
            .map_err(|_closed| ScanError::WorkerGone)
    }
}

impl SnapshotSource for ScanScheduler {
    fn request_scan(&self, request: ScanRequest) -> bool {
        if self.shared.in_flight.swap(true, Ordering::AcqRel) {
            debug!(scan_id = %request.scan_id, "Scan already in flight, skipping");
            return false;
        }
        let generation = self.shared.generation.load(Ordering::Acquire);
        let scan_id = request.scan_id;
        debug!(%scan_id, origin = %request.origin, "Scan requested");
        if self
            .requests
            .send(ScanJob {
                request,
                generation,
            })
            .is_err()
        {
            self.shared.in_flight.store(false, Ordering::Release);
            warn!(%scan_id, "Scan worker is gone, request dropped");
            return false;
        }
        true
    }

    fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.borrow().clone()
    }

    fn restart(&self) {
        self.shared.restart();
    }

    fn stop(&self) {
        self.shared.stop();
    }
}

async fn run_worker(
    shared: Arc<Shared>,
    scanner: Arc<dyn BlockScanner>,
    mut requests: mpsc::UnboundedReceiver<ScanJob>,
) {
    while let Some(job) = requests.recv().await {
        let worker_scanner = Arc::clone(&scanner);
        let request = job.request.clone();
        let result = tokio::task::spawn_blocking(move || worker_scanner.scan(&request)).await;
        match result {
            Ok(Ok(positions)) => shared.publish(&job, positions),
            Ok(Err(e)) => warn!(error = %e, "Scan failed"),
            Err(e) => warn!(error = %e, scan_id = %job.request.scan_id, "Scan task panicked"),
        }
        shared.in_flight.store(false, Ordering::Release);
    }
    debug!("Scan worker stopped");
}

// ---------------------------------------------------------------------------
// Fixed source
// ---------------------------------------------------------------------------

/// A source whose snapshot is set by hand.
///
/// Scan requests are counted and otherwise ignored. Useful for stepping
/// the tick processor without a runtime.
#[derive(Debug)]
pub struct StaticSnapshotSource {
    snapshot: watch::Sender<Option<Arc<Snapshot>>>,
    requests: AtomicU64,
}

impl Default for StaticSnapshotSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticSnapshotSource {
    /// A source with no snapshot.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            snapshot: tx,
            requests: AtomicU64::new(0),
        }
    }

    /// Publish a snapshot of `positions`.
    pub fn set(&self, positions: Vec<Position>) {
        self.snapshot
            .send_replace(Some(Arc::new(Snapshot::new(ScanId::new(), 0, positions))));
    }

    /// Number of scans requested so far.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Acquire)
    }
}

impl SnapshotSource for StaticSnapshotSource {
    fn request_scan(&self, _request: ScanRequest) -> bool {
        self.requests.fetch_add(1, Ordering::AcqRel);
        true
    }

    fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.borrow().clone()
    }

    fn restart(&self) {}

    fn stop(&self) {}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// Scanner that blocks until released and counts concurrent runs.
    struct GatedScanner {
        release: Mutex<std::sync::mpsc::Receiver<()>>,
        running: AtomicU64,
        max_running: AtomicU64,
        calls: AtomicU64,
    }

    impl GatedScanner {
        fn new() -> (Arc<Self>, std::sync::mpsc::Sender<()>) {
            let (tx, rx) = std::sync::mpsc::channel();
            let scanner = Arc::new(Self {
                release: Mutex::new(rx),
                running: AtomicU64::new(0),
                max_running: AtomicU64::new(0),
                calls: AtomicU64::new(0),
            });
            (scanner, tx)
        }
    }

    impl BlockScanner for GatedScanner {
        fn scan(&self, request: &ScanRequest) -> Result<Vec<Position>, ScanError> {
            let now = self.running.fetch_add(1, Ordering::AcqRel).saturating_add(1);
            self.max_running.fetch_max(now, Ordering::AcqRel);
            self.calls.fetch_add(1, Ordering::AcqRel);
            let _ = self.release.lock().unwrap().recv();
            self.running.fetch_sub(1, Ordering::AcqRel);
            Ok(vec![request.origin])
        }
    }

    struct FailingScanner;

    impl BlockScanner for FailingScanner {
        fn scan(&self, request: &ScanRequest) -> Result<Vec<Position>, ScanError> {
            Err(ScanError::Failed {
                scan_id: request.scan_id,
                message: "world not loaded".to_owned(),
            })
        }
    }

    fn request(x: i32) -> ScanRequest {
        ScanRequest {
            scan_id: ScanId::new(),
            origin: Position::new(x, 64, 0),
            targets: vec![BlockKind::Wheat],
            horizontal_radius: 10,
            vertical_radius: 10,
            max_positions: 256,
            requested_at_tick: 0,
        }
    }

    async fn wait_until(mut done: impl FnMut() -> bool) -> bool {
        for _ in 0..400 {
            if done() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[test]
    fn scan_due_follows_interval() {
        assert!(scan_due(0, 5));
        assert!(!scan_due(1, 5));
        assert!(scan_due(10, 5));
        assert!(!scan_due(0, 0));
        assert!(scan_due(7, 1));
    }

    fn job(generation: u64, x: i32) -> ScanJob {
        ScanJob {
            request: request(x),
            generation,
        }
    }

    #[test]
    fn publication_checks_generation_under_the_channel_lock() {
        let (tx, rx) = watch::channel(None);
        let shared = Shared::new(tx);

        shared.restart();
        shared.publish(&job(0, 1), vec![Position::new(1, 64, 0)]);
        assert!(rx.borrow().is_none());
        assert_eq!(shared.discarded.load(Ordering::Acquire), 1);

        shared.publish(&job(1, 2), vec![Position::new(2, 64, 0)]);
        assert_eq!(
            rx.borrow().as_ref().unwrap().positions(),
            &[Position::new(2, 64, 0)]
        );
        assert_eq!(shared.published.load(Ordering::Acquire), 1);

        shared.stop();
        shared.publish(&job(2, 3), vec![Position::new(3, 64, 0)]);
        assert_eq!(shared.discarded.load(Ordering::Acquire), 2);
        // A stop keeps the last snapshot in place.
        assert_eq!(
            rx.borrow().as_ref().unwrap().positions(),
            &[Position::new(2, 64, 0)]
        );
    }

    #[tokio::test]
    async fn no_snapshot_before_first_publication() {
        let (scanner, _release) = GatedScanner::new();
        let scheduler = ScanScheduler::spawn(scanner);
        assert!(scheduler.current().is_none());
    }

    #[tokio::test]
    async fn scans_never_overlap() {
        let (scanner, release) = GatedScanner::new();
        let mut scheduler = ScanScheduler::spawn(Arc::clone(&scanner) as Arc<dyn BlockScanner>);

        assert!(scheduler.request_scan(request(1)));
        // Still in flight: further requests are refused.
        assert!(!scheduler.request_scan(request(2)));
        assert!(!scheduler.request_scan(request(3)));

        release.send(()).unwrap();
        scheduler.changed().await.unwrap();
        let first = scheduler.current().unwrap();
        assert_eq!(first.positions(), &[Position::new(1, 64, 0)]);

        assert!(wait_until(|| !scheduler.is_in_flight()).await);
        assert!(scheduler.request_scan(request(4)));
        release.send(()).unwrap();
        scheduler.changed().await.unwrap();

        assert_eq!(scanner.calls.load(Ordering::Acquire), 2);
        assert_eq!(scanner.max_running.load(Ordering::Acquire), 1);
        assert_eq!(scheduler.published_count(), 2);
    }

    #[tokio::test]
    async fn results_after_stop_are_discarded() {
        let (scanner, release) = GatedScanner::new();
        let scheduler = ScanScheduler::spawn(scanner);

        assert!(scheduler.request_scan(request(1)));
        scheduler.stop();
        release.send(()).unwrap();
        assert!(wait_until(|| !scheduler.is_in_flight()).await);

        assert!(scheduler.current().is_none());
        assert_eq!(scheduler.discarded_count(), 1);
    }

    #[tokio::test]
    async fn results_from_before_a_restart_are_discarded() {
        let (scanner, release) = GatedScanner::new();
        let mut scheduler = ScanScheduler::spawn(scanner);

        assert!(scheduler.request_scan(request(1)));
        scheduler.restart();
        release.send(()).unwrap();
        assert!(wait_until(|| !scheduler.is_in_flight()).await);
        assert!(scheduler.current().is_none());

        assert!(scheduler.request_scan(request(2)));
        release.send(()).unwrap();
        scheduler.changed().await.unwrap();
        // The restart cleared the channel, so wait for the real result.
        assert!(wait_until(|| scheduler.current().is_some()).await);
        assert_eq!(
            scheduler.current().unwrap().positions(),
            &[Position::new(2, 64, 0)]
        );
    }

    #[tokio::test]
    async fn failed_scans_free_the_worker() {
        let scheduler = ScanScheduler::spawn(Arc::new(FailingScanner));
        assert!(scheduler.request_scan(request(1)));
        assert!(wait_until(|| !scheduler.is_in_flight()).await);
        assert!(scheduler.current().is_none());
        assert!(scheduler.request_scan(request(2)));
    }

    #[test]
    fn static_source_counts_requests() {
        let source = StaticSnapshotSource::new();
        assert!(source.current().is_none());
        assert!(source.request_scan(request(0)));
        source.set(vec![Position::new(0, 64, 0)]);
        assert_eq!(source.current().unwrap().len(), 1);
        assert_eq!(source.request_count(), 1);
    }
}
