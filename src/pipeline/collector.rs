//! Result collector: groups records into fixed-size batches for the sender.

use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::thread::{self, JoinHandle};

use crate::{Batch, FileRecord};

/// Counts from the collector stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectorStats {
    pub records: u64,
    pub batches: u64,
}

pub fn spawn_collector(
    record_rx: Receiver<FileRecord>,
    batch_tx: Sender<Batch>,
    batch_size: usize,
) -> JoinHandle<CollectorStats> {
    thread::spawn(move || collect_batches(record_rx, batch_tx, batch_size))
}

/// Drain `record_rx` into batches of `batch_size`, pushing each full batch to `batch_tx`
/// (blocks while the batch queue is full). On close, flushes the partial batch, then drops
/// `batch_tx` so the sender sees end-of-stream.
pub fn collect_batches(
    record_rx: Receiver<FileRecord>,
    batch_tx: Sender<Batch>,
    batch_size: usize,
) -> CollectorStats {
    let batch_size = batch_size.max(1);
    let mut stats = CollectorStats::default();
    let mut batch: Batch = Vec::with_capacity(batch_size);

    while let Ok(record) = record_rx.recv() {
        batch.push(record);
        stats.records += 1;
        if batch.len() >= batch_size {
            let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
            if batch_tx.send(full).is_err() {
                break;
            }
            stats.batches += 1;
        }
    }

    if !batch.is_empty() && batch_tx.send(batch).is_ok() {
        stats.batches += 1;
    }
    debug!(
        "collector: result queue closed, {} records in {} batches",
        stats.records, stats.batches
    );
    drop(batch_tx);
    stats
}
