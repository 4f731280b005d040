//! Directory traversal: a counting pass for totals, then a streaming pass that feeds the file queue.

use crossbeam_channel::Sender;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use walkdir::WalkDir;

use super::context::PipelineContext;

/// One result from a directory walk: a non-directory entry or an error with optional path.
pub enum WalkOutcome {
    /// `size` is `None` when the entry's metadata could not be read.
    File { path: PathBuf, size: Option<u64> },
    Err {
        msg: String,
        path: Option<PathBuf>,
        /// Error on the root itself (depth 0): the walk produced nothing usable.
        fatal: bool,
    },
}

/// What the streaming pass did. `fatal` is surfaced to the caller after the pipeline drains.
#[derive(Debug, Default)]
pub struct WalkReport {
    pub queued: u64,
    pub skipped_large: u64,
    pub errors: u64,
    pub fatal: Option<String>,
}

/// Totals from the counting pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkTotals {
    pub files: u64,
    pub bytes: u64,
}

/// Convert a walkdir result into a [`WalkOutcome`]; directories yield `None`.
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> Option<WalkOutcome> {
    match r {
        Ok(entry) if entry.file_type().is_dir() => None,
        Ok(entry) => {
            // Size the link target so the size gate sees what the worker will hash.
            let meta = if entry.path_is_symlink() {
                std::fs::metadata(entry.path()).ok().filter(|m| !m.is_dir())
            } else {
                entry.metadata().ok()
            };
            let size = meta.map(|m| m.len());
            Some(WalkOutcome::File {
                path: entry.into_path(),
                size,
            })
        }
        Err(err) => Some(WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
            fatal: err.depth() == 0,
        }),
    }
}

/// Lazy, finite walk of every non-directory entry under `root`, in file-name order.
/// Symlinks are not followed; a link to a directory is yielded and later skipped by the worker.
pub fn walk_files(root: &Path) -> impl Iterator<Item = WalkOutcome> + use<> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(to_outcome_walkdir)
}

/// True if the size gate keeps this entry out of the worker pool.
pub fn exceeds_limit(size: Option<u64>, limit: Option<u64>) -> bool {
    matches!((size, limit), (Some(s), Some(l)) if s > l)
}

/// Counting pass: add every file (and its size) to the shared totals. Errors are ignored here;
/// the streaming pass reports them.
pub fn count_tree(ctx: &PipelineContext) -> WalkTotals {
    let mut totals = WalkTotals::default();
    for outcome in walk_files(&ctx.root) {
        if let WalkOutcome::File { size, .. } = outcome {
            if exceeds_limit(size, ctx.size_limit) {
                continue;
            }
            let size = size.unwrap_or(0);
            ctx.counters.add_total(size);
            totals.files += 1;
            totals.bytes += size;
        }
    }
    totals
}

pub fn spawn_walk_thread(path_tx: Sender<PathBuf>, ctx: PipelineContext) -> JoinHandle<WalkReport> {
    thread::spawn(move || {
        let iter = walk_files(&ctx.root);
        run_walk_loop(path_tx, &ctx, iter)
    })
}

/// Streaming pass: consume `iter`, apply the size gate, send paths to `path_tx` (blocking when
/// the file queue is full). Per-entry errors are logged and skipped; a root error is kept as
/// `fatal`. Drops `path_tx` on return, which is what closes the file queue.
pub fn run_walk_loop<I>(path_tx: Sender<PathBuf>, ctx: &PipelineContext, iter: I) -> WalkReport
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut report = WalkReport::default();
    for outcome in iter {
        match outcome {
            WalkOutcome::File { path, size } => {
                if exceeds_limit(size, ctx.size_limit) {
                    debug!("Skipping large file {}", path.display());
                    report.skipped_large += 1;
                    continue;
                }
                if path_tx.send(path).is_err() {
                    break;
                }
                ctx.counters.inc_queued();
                report.queued += 1;
            }
            WalkOutcome::Err { msg, path, fatal } => {
                if fatal {
                    report.fatal.get_or_insert(msg);
                    continue;
                }
                report.errors += 1;
                match path {
                    Some(p) => warn!("Error accessing {}: {}", p.display(), msg),
                    None => warn!("Walk error: {}", msg),
                }
            }
        }
    }
    drop(path_tx);
    report
}
