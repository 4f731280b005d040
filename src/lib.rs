//! Filededup: file inventory agent. Walks a tree, fingerprints every file, and ships records in
//! gzip'd JSON batches to an aggregator that finds duplicates by hash.

pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::path::Path;
use std::sync::Arc;

use crate::engine::sender::{BatchSink, HttpBatchSink};

/// Result alias used by public filededup API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Scan `root` with `opts` and hand every batch to `sink`. Returns once every stage has drained.
///
/// The only error returned for filesystem trouble is an unreadable `root`; unreadable files are
/// skipped, and batches `sink` rejects are dropped (see [`ScanSummary::batches_failed`]).
///
/// ```ignore
/// let sink = Arc::new(HttpBatchSink::new("http://agg:8080/files", Duration::from_secs(60)));
/// let summary = filededup::scan_dir(Path::new("/data"), &ScanOpts::default(), sink)?;
/// ```
pub fn scan_dir<S>(root: &Path, opts: &ScanOpts, sink: Arc<S>) -> Result<ScanSummary>
where
    S: BatchSink + ?Sized + 'static,
{
    let mut opts = Opts::from(opts);
    opts.root = root.to_path_buf();
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    pipeline::run_pipeline(&opts, sink)
}

/// [`scan_dir`] with an HTTP sink pointed at `opts.server_url` + `/files`.
pub fn scan_and_send(root: &Path, opts: &ScanOpts) -> Result<ScanSummary> {
    let full = Opts::from(opts);
    let sink = Arc::new(HttpBatchSink::new(full.ingest_url(), full.request_timeout));
    scan_dir(root, opts, sink)
}
