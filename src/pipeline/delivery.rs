//! Batch sender stage: best-effort, at-most-once. A failed batch is logged and dropped.

use crossbeam_channel::Receiver;
use log::error;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::Batch;
use crate::engine::sender::BatchSink;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SenderStats {
    pub batches_sent: u64,
    pub batches_failed: u64,
    pub records_sent: u64,
    pub records_dropped: u64,
}

pub fn spawn_sender<S>(batch_rx: Receiver<Batch>, sink: Arc<S>) -> JoinHandle<SenderStats>
where
    S: BatchSink + ?Sized + 'static,
{
    thread::spawn(move || send_batches(batch_rx, sink.as_ref()))
}

/// Send every batch until the batch queue is closed and drained. No retry, no requeue.
pub fn send_batches<S>(batch_rx: Receiver<Batch>, sink: &S) -> SenderStats
where
    S: BatchSink + ?Sized,
{
    let mut stats = SenderStats::default();
    for batch in batch_rx.iter() {
        let n = batch.len() as u64;
        match sink.send_batch(&batch) {
            Ok(()) => {
                stats.batches_sent += 1;
                stats.records_sent += n;
            }
            Err(e) => {
                error!("Failed to send batch of {} records: {}", n, e);
                stats.batches_failed += 1;
                stats.records_dropped += n;
            }
        }
    }
    stats
}
