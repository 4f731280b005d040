//! Hash workers: pull paths off the file queue, stat + fingerprint, push records to the result queue.

use anyhow::Result;
use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::FileRecord;
use crate::engine::hashing::fingerprint;
use crate::engine::progress::ProgressCounters;
use crate::engine::tools::{containing_dir, file_name_lossy};

use super::semaphore::FdSemaphore;

/// Shared by every worker in the pool.
#[derive(Clone)]
pub struct WorkerShared {
    pub machine_id: Arc<str>,
    pub semaphore: Arc<FdSemaphore>,
    pub counters: Arc<ProgressCounters>,
}

/// Single worker: runs until the file queue is closed and drained.
/// `processed` is incremented once per dequeued path, record or not.
fn hash_worker_loop(path_rx: Receiver<PathBuf>, record_tx: Sender<FileRecord>, shared: WorkerShared) {
    while let Ok(path) = path_rx.recv() {
        let record = {
            let _permit = shared.semaphore.acquire();
            path_to_record(&path, &shared.machine_id)
        };
        match record {
            Ok(Some(record)) => {
                // Only fails if the collector is gone, which cannot happen before workers exit.
                let _ = record_tx.send(record);
            }
            Ok(None) => debug!("Skipping directory {}", path.display()),
            Err(e) => debug!("Skipping {}: {}", path.display(), e),
        }
        shared.counters.inc_processed();
    }
    drop(record_tx);
}

/// Spawn `num_workers` hash workers. Caller must drop its own `record_tx` after this so the
/// result queue closes when the last worker exits.
pub fn spawn_hash_workers(
    path_rx: Receiver<PathBuf>,
    record_tx: &Sender<FileRecord>,
    shared: &WorkerShared,
    num_workers: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_workers)
        .map(|_| {
            let path_rx = path_rx.clone();
            let record_tx = record_tx.clone();
            let shared = shared.clone();
            thread::spawn(move || hash_worker_loop(path_rx, record_tx, shared))
        })
        .collect()
}

/// Stat and fingerprint one path. `Ok(None)` for directories (e.g. a symlink to a directory);
/// `Err` for stat/open/read failures. Both mean "no record".
pub fn path_to_record(path: &Path, machine_id: &str) -> Result<Option<FileRecord>> {
    let meta = std::fs::metadata(path)?;
    if meta.is_dir() {
        return Ok(None);
    }
    let size = meta.len();
    let hash = fingerprint(path, size)?;
    let modification_time = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_default();
    Ok(Some(FileRecord {
        machine_id: machine_id.to_string(),
        path: containing_dir(path).to_string_lossy().into_owned(),
        filename: file_name_lossy(path),
        size,
        modification_time,
        hash,
    }))
}
