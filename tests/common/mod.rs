#![allow(dead_code)]

use filededup::engine::{BatchSink, DeliveryError};
use filededup::{Batch, FileRecord, ScanOpts};
use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub const MIB: u64 = 1024 * 1024;

/// Keeps every batch it is handed.
#[derive(Default)]
pub struct MemorySink {
    pub batches: Mutex<Vec<Batch>>,
}

impl MemorySink {
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn records(&self) -> Vec<FileRecord> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }

    pub fn record_named(&self, name: &str) -> FileRecord {
        self.records()
            .into_iter()
            .find(|r| r.filename == name)
            .unwrap_or_else(|| panic!("no record for {name}"))
    }
}

impl BatchSink for MemorySink {
    fn send_batch(&self, batch: &[FileRecord]) -> Result<(), DeliveryError> {
        self.batches.lock().unwrap().push(batch.to_vec());
        Ok(())
    }
}

/// Rejects every batch, counting attempts.
#[derive(Default)]
pub struct RejectingSink {
    pub attempts: AtomicU64,
}

impl BatchSink for RejectingSink {
    fn send_batch(&self, _batch: &[FileRecord]) -> Result<(), DeliveryError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Err(DeliveryError::Status(500))
    }
}

pub fn scan_opts(batch_size: usize) -> ScanOpts {
    ScanOpts {
        machine_id: "test-machine".to_string(),
        batch_size,
        workers: 2,
        progress_interval: Duration::from_millis(20),
        ..ScanOpts::default()
    }
}

pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Sparse file of `size` zero bytes with `patches` written at the given offsets.
pub fn sparse_file(path: &Path, size: u64, patches: &[(u64, u8)]) {
    let mut f = File::create(path).unwrap();
    f.set_len(size).unwrap();
    for &(offset, byte) in patches {
        f.seek(SeekFrom::Start(offset)).unwrap();
        f.write_all(&[byte]).unwrap();
    }
    f.sync_all().unwrap();
}
