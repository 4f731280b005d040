//! Pipeline context and tuning: shared data passed into the stages and the resolved sizes.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::engine::progress::ProgressCounters;
use crate::utils::config::WorkerThreadLimits;
use crate::{Batch, FileRecord, Opts};

/// Sizes resolved from [`Opts`]: worker count, queue capacities, batch size, open-file permits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineTuning {
    pub num_workers: usize,
    /// Capacity for the file (path) and result (record) queues.
    pub queue_cap: usize,
    /// Capacity for the batch queue; equals the worker count.
    pub batch_queue_cap: usize,
    pub batch_size: usize,
    /// Semaphore capacity bounding concurrently open files.
    pub fd_permits: usize,
}

impl PipelineTuning {
    pub fn from_opts(opts: &Opts) -> Self {
        let num_workers = opts.worker_count();
        Self {
            num_workers,
            queue_cap: opts.queue_capacity(),
            batch_queue_cap: num_workers,
            batch_size: opts.batch_size,
            fd_permits: num_workers * WorkerThreadLimits::FD_PERMITS_PER_WORKER,
        }
    }
}

/// Shared context for the walk thread: root, size gate, counters.
#[derive(Clone)]
pub struct PipelineContext {
    pub root: PathBuf,
    pub size_limit: Option<u64>,
    pub counters: Arc<ProgressCounters>,
}

impl PipelineContext {
    pub fn new(root: &Path, size_limit: Option<u64>, counters: &Arc<ProgressCounters>) -> Self {
        Self {
            root: root.to_path_buf(),
            size_limit,
            counters: Arc::clone(counters),
        }
    }
}

/// The three bounded queues. Walk gets `path_tx`; workers get `path_rx` + `record_tx`;
/// collector gets `record_rx` + `batch_tx`; sender gets `batch_rx`.
pub struct PipelineChannels {
    pub path_tx: Sender<PathBuf>,
    pub path_rx: Receiver<PathBuf>,
    pub record_tx: Sender<FileRecord>,
    pub record_rx: Receiver<FileRecord>,
    pub batch_tx: Sender<Batch>,
    pub batch_rx: Receiver<Batch>,
}

pub fn create_pipeline_channels(tuning: &PipelineTuning) -> PipelineChannels {
    let (path_tx, path_rx) = bounded::<PathBuf>(tuning.queue_cap);
    let (record_tx, record_rx) = bounded::<FileRecord>(tuning.queue_cap);
    let (batch_tx, batch_rx) = bounded::<Batch>(tuning.batch_queue_cap);
    PipelineChannels {
        path_tx,
        path_rx,
        record_tx,
        record_rx,
        batch_tx,
        batch_rx,
    }
}
