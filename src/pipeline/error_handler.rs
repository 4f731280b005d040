use anyhow::{Result, bail};

use crate::Opts;

use super::walk::WalkReport;

/// Reject options the pipeline cannot run with. Called before any thread is spawned.
pub fn check_opts(opts: &Opts) -> Result<()> {
    if opts.batch_size == 0 {
        bail!("batch size must be greater than zero");
    }
    if opts.server_url.trim().is_empty() {
        bail!("server URL must not be empty");
    }
    if opts.progress_interval.is_zero() {
        bail!("progress interval must be greater than zero");
    }
    Ok(())
}

/// Check the walk result after every stage has drained: a root error is returned,
/// per-entry errors are only summarized.
pub fn check_for_fatal_error_or_skipped_entries(report: &WalkReport) -> Result<()> {
    if let Some(msg) = &report.fatal {
        bail!("walk error: {}", msg);
    }
    if report.errors > 0 {
        log::warn!(
            "Skipped {} entries due to permission errors or access issues",
            report.errors
        );
    }
    Ok(())
}
