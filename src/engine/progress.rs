//! Shared scan counters and the periodic progress reporter.

use crossbeam_channel::{Receiver, Sender, bounded, select, tick};
use log::info;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::engine::tools::format_bytes;

/// Process-wide counters for one scan run. Every stage gets an `Arc` and only ever increments.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    processed: AtomicU64,
    queued: AtomicU64,
    total_files: AtomicU64,
    total_bytes: AtomicU64,
}

impl ProgressCounters {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Called exactly once per dequeued path, whatever the outcome.
    pub fn inc_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_queued(&self) {
        self.queued.fetch_add(1, Ordering::Relaxed);
    }

    /// Counting pass: one file of `size` bytes.
    pub fn add_total(&self, size: u64) {
        self.total_files.fetch_add(1, Ordering::Relaxed);
        self.total_bytes.fetch_add(size, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn queued(&self) -> u64 {
        self.queued.load(Ordering::Relaxed)
    }

    pub fn total_files(&self) -> u64 {
        self.total_files.load(Ordering::Relaxed)
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self, elapsed: Duration) -> ProgressSnapshot {
        ProgressSnapshot::new(
            self.processed(),
            self.queued(),
            self.total_files(),
            elapsed,
        )
    }
}

/// Point-in-time view of the counters with derived percentage and linear ETA.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressSnapshot {
    pub processed: u64,
    pub queued: u64,
    pub total: u64,
    pub elapsed: Duration,
    /// `processed / total * 100`; `None` while the total is unknown (zero).
    pub percent: Option<f64>,
    /// `elapsed * (total - processed) / processed`; zero until something is processed.
    pub eta: Duration,
}

impl ProgressSnapshot {
    pub fn new(processed: u64, queued: u64, total: u64, elapsed: Duration) -> Self {
        let percent = (total > 0).then(|| processed as f64 / total as f64 * 100.0);
        let eta = if processed > 0 {
            let remaining = total.saturating_sub(processed) as f64;
            Duration::from_secs_f64(elapsed.as_secs_f64() / processed as f64 * remaining)
        } else {
            Duration::ZERO
        };
        Self {
            processed,
            queued,
            total,
            elapsed,
            percent,
            eta,
        }
    }
}

/// Handle to the reporter thread. [`ProgressReporter::stop`] signals and joins it.
pub struct ProgressReporter {
    done_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Spawn a thread that logs a snapshot every `interval` until stopped.
    pub fn spawn(counters: Arc<ProgressCounters>, started: Instant, interval: Duration) -> Self {
        let (done_tx, done_rx) = bounded::<()>(1);
        let handle = thread::spawn(move || report_loop(&counters, started, interval, done_rx));
        Self { done_tx, handle }
    }

    pub fn stop(self) {
        let _ = self.done_tx.send(());
        let _ = self.handle.join();
    }
}

fn report_loop(
    counters: &ProgressCounters,
    started: Instant,
    interval: Duration,
    done_rx: Receiver<()>,
) {
    let ticker = tick(interval);
    loop {
        select! {
            recv(ticker) -> _ => log_snapshot(&counters.snapshot(started.elapsed()), counters.total_bytes()),
            recv(done_rx) -> _ => return,
        }
    }
}

fn log_snapshot(s: &ProgressSnapshot, total_bytes: u64) {
    // Nothing meaningful to show until the counting pass has a total.
    let Some(percent) = s.percent else {
        return;
    };
    info!(
        "Scan progress: processed={} queued={} total={} ({}) percent={:.1}% elapsed={}s eta={}s",
        s.processed,
        s.queued,
        s.total,
        format_bytes(total_bytes),
        percent,
        s.elapsed.as_secs(),
        s.eta.as_secs()
    );
}
