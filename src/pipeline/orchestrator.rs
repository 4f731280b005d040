use anyhow::{Result, anyhow};
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

use crate::engine::progress::{ProgressCounters, ProgressReporter};
use crate::engine::sender::BatchSink;
use crate::engine::tools::format_bytes;
use crate::utils::fd_limit::warn_if_permits_exceed_fd_limit;
use crate::{Opts, ScanSummary};

use super::context::{PipelineContext, PipelineTuning, create_pipeline_channels};
use super::semaphore::FdSemaphore;
use super::worker::WorkerShared;
use super::{
    check_for_fatal_error_or_skipped_entries, check_opts, count_tree, spawn_collector,
    spawn_hash_workers, spawn_sender, spawn_walk_thread,
};

/// Lifecycle of one run. Stages only ever advance in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    /// Walker is computing totals.
    Counting,
    /// Walker streams paths while workers hash.
    Scanning,
    /// File queue closed; workers finish what is queued.
    Draining,
    /// Result queue closed; collector flushes, sender empties the batch queue.
    Flushing,
    Done,
}

fn enter(stage: PipelineStage) {
    debug!("pipeline: {:?}", stage);
}

/// Run the whole scan: count, then walk → workers → collector → sender, shutting down by
/// closing each queue in turn. Returns the fatal root traversal error, if any, only after
/// every stage has exited.
pub fn run_pipeline<S>(opts: &Opts, sink: Arc<S>) -> Result<ScanSummary>
where
    S: BatchSink + ?Sized + 'static,
{
    check_opts(opts)?;
    let started = Instant::now();
    let tuning = PipelineTuning::from_opts(opts);
    warn_if_permits_exceed_fd_limit(tuning.fd_permits);

    let counters = ProgressCounters::new();
    let ctx = PipelineContext::new(&opts.root, opts.size_limit(), &counters);

    enter(PipelineStage::Counting);
    info!("Counting files to process...");
    let totals = count_tree(&ctx);
    info!(
        "Starting file scan: totalFiles={} totalBytes={} workers={} queueSize={} batchSize={}",
        totals.files,
        format_bytes(totals.bytes),
        tuning.num_workers,
        tuning.queue_cap,
        tuning.batch_size
    );

    let reporter = ProgressReporter::spawn(Arc::clone(&counters), started, opts.progress_interval);

    enter(PipelineStage::Scanning);
    let channels = create_pipeline_channels(&tuning);
    let shared = WorkerShared {
        machine_id: Arc::from(opts.machine_id.as_str()),
        semaphore: Arc::new(FdSemaphore::new(tuning.fd_permits)),
        counters: Arc::clone(&counters),
    };

    let sender_handle = spawn_sender(channels.batch_rx, sink);
    let collector_handle = spawn_collector(channels.record_rx, channels.batch_tx, tuning.batch_size);
    debug!("Starting {} hash workers", tuning.num_workers);
    let worker_handles = spawn_hash_workers(
        channels.path_rx,
        &channels.record_tx,
        &shared,
        tuning.num_workers,
    );
    // Dropping the last sender closes the channel so the collector exits after the workers.
    drop(channels.record_tx);

    let walk_handle = spawn_walk_thread(channels.path_tx, ctx);
    let walk_report = walk_handle.join();

    enter(PipelineStage::Draining);
    let panicked_workers = worker_handles
        .into_iter()
        .map(|h| h.join())
        .filter(Result::is_err)
        .count();

    enter(PipelineStage::Flushing);
    let collector_stats = collector_handle.join();
    let sender_stats = sender_handle.join();
    reporter.stop();
    enter(PipelineStage::Done);

    let walk_report = walk_report.map_err(|_| anyhow!("walk thread panicked"))?;
    if panicked_workers > 0 {
        return Err(anyhow!("{} hash worker(s) panicked", panicked_workers));
    }
    let collector_stats = collector_stats.map_err(|_| anyhow!("collector thread panicked"))?;
    let sender_stats = sender_stats.map_err(|_| anyhow!("sender thread panicked"))?;
    check_for_fatal_error_or_skipped_entries(&walk_report)?;

    let summary = ScanSummary {
        total_files: counters.total_files(),
        total_bytes: counters.total_bytes(),
        queued: counters.queued(),
        processed: counters.processed(),
        records: collector_stats.records,
        batches_sent: sender_stats.batches_sent,
        batches_failed: sender_stats.batches_failed,
        records_sent: sender_stats.records_sent,
        records_dropped: sender_stats.records_dropped,
        skipped_large: walk_report.skipped_large,
        walk_errors: walk_report.errors,
        workers: tuning.num_workers,
        elapsed: started.elapsed(),
    };
    log_summary(&summary);
    Ok(summary)
}

fn log_summary(s: &ScanSummary) {
    info!(
        "Scan completed: totalFiles={} records={} totalBytes={} duration={}s filesPerSecond={:.1} throughput={}/s workers={}",
        s.processed,
        s.records,
        format_bytes(s.total_bytes),
        s.elapsed.as_secs(),
        s.files_per_second(),
        format_bytes(s.bytes_per_second() as u64),
        s.workers
    );
    if s.batches_failed > 0 {
        log::warn!(
            "{} of {} batches were not delivered ({} records sent, {} dropped)",
            s.batches_failed,
            s.batches_sent + s.batches_failed,
            s.records_sent,
            s.records_dropped
        );
    }
    if s.skipped_large > 0 {
        info!("Skipped {} files above the size limit", s.skipped_large);
    }
}
