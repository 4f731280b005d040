//! Public and internal types for the filededup API and pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::config::{PipelineDefaults, WorkerThreadLimits};

/// One successfully fingerprinted file. Same shape as an element of the ingestion payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub machine_id: String,
    /// Absolute directory containing the file (no filename).
    pub path: String,
    pub filename: String,
    pub size: u64,
    /// Serialized as `mtime` (RFC 3339).
    #[serde(rename = "mtime")]
    pub modification_time: DateTime<Utc>,
    /// Lowercase hex SHA-256 (full or sampled, see [`crate::engine::hashing`]).
    pub hash: String,
}

/// Records shipped together in one request, in the order they reached the collector.
pub type Batch = Vec<FileRecord>;

/// Lib-only options for [`scan_dir`](crate::scan_dir). Zero means "auto" for `workers` and `queue_size`.
#[derive(Clone, Debug)]
pub struct ScanOpts {
    pub server_url: String,
    pub machine_id: String,
    pub batch_size: usize,
    pub workers: usize,
    pub queue_size: usize,
    /// Files larger than this never enter the worker pool (and are left out of the totals).
    pub max_file_size: Option<u64>,
    pub progress_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for ScanOpts {
    fn default() -> Self {
        Self {
            server_url: PipelineDefaults::SERVER_URL.to_string(),
            machine_id: PipelineDefaults::MACHINE_ID.to_string(),
            batch_size: PipelineDefaults::BATCH_SIZE,
            workers: 0,
            queue_size: 0,
            max_file_size: None,
            progress_interval: Duration::from_secs(PipelineDefaults::PROGRESS_INTERVAL_SECS),
            request_timeout: Duration::from_secs(PipelineDefaults::REQUEST_TIMEOUT_SECS),
        }
    }
}

impl From<&ScanOpts> for Opts {
    fn from(o: &ScanOpts) -> Self {
        Opts {
            root: PathBuf::from("."),
            server_url: o.server_url.trim_end_matches('/').to_string(),
            machine_id: o.machine_id.clone(),
            batch_size: o.batch_size,
            workers: o.workers,
            queue_size: o.queue_size,
            verbose: false,
            skip_large: o.max_file_size.is_some(),
            max_file_size: o.max_file_size.unwrap_or(PipelineDefaults::MAX_FILE_SIZE),
            progress_interval: o.progress_interval,
            request_timeout: o.request_timeout,
        }
    }
}

/// Full options (CLI, config file, env). Use [`ScanOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Directory to scan.
    pub root: PathBuf,
    /// Aggregator base URL, no trailing slash.
    pub server_url: String,
    pub machine_id: String,
    pub batch_size: usize,
    /// Worker count; 0 = auto.
    pub workers: usize,
    /// File/result queue capacity; 0 = auto.
    pub queue_size: usize,
    pub verbose: bool,
    /// Gate files above `max_file_size` out before they reach the worker pool.
    pub skip_large: bool,
    pub max_file_size: u64,
    pub progress_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for Opts {
    fn default() -> Self {
        Opts::from(&ScanOpts::default())
    }
}

impl Opts {
    /// Size gate applied by the walker, if enabled.
    pub fn size_limit(&self) -> Option<u64> {
        self.skip_large.then_some(self.max_file_size)
    }

    /// Resolved worker count (auto = `max(cpus, 4)`).
    pub fn worker_count(&self) -> usize {
        WorkerThreadLimits::current().resolve(self.workers)
    }

    /// Resolved file/result queue capacity (auto = `max(2 * batch, 1000)`).
    pub fn queue_capacity(&self) -> usize {
        PipelineDefaults::queue_size(self.queue_size, self.batch_size)
    }

    /// Full URL of the ingestion endpoint.
    pub fn ingest_url(&self) -> String {
        format!("{}{}", self.server_url, PipelineDefaults::INGEST_PATH)
    }
}

/// Final counts of one scan run.
#[derive(Clone, Debug, Default)]
pub struct ScanSummary {
    /// Files seen by the counting pass.
    pub total_files: u64,
    /// Bytes seen by the counting pass.
    pub total_bytes: u64,
    /// Paths handed to the worker pool.
    pub queued: u64,
    /// Paths a worker finished with (record or skip).
    pub processed: u64,
    /// Records emitted by workers.
    pub records: u64,
    pub batches_sent: u64,
    pub batches_failed: u64,
    pub records_sent: u64,
    /// Records in batches the sink rejected; never retried.
    pub records_dropped: u64,
    /// Paths dropped by the size gate.
    pub skipped_large: u64,
    /// Per-entry traversal errors that were logged and skipped.
    pub walk_errors: u64,
    pub workers: usize,
    pub elapsed: Duration,
}

impl ScanSummary {
    pub fn files_per_second(&self) -> f64 {
        per_second(self.processed, self.elapsed)
    }

    pub fn bytes_per_second(&self) -> f64 {
        per_second(self.total_bytes, self.elapsed)
    }
}

fn per_second(n: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { n as f64 / secs } else { 0.0 }
}
