//! Colored single-line log output on stderr.

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter, Record};
use std::io::Write;

const PKG: &str = env!("CARGO_PKG_NAME");
/// Module path of the `filededup-agent` binary.
const BIN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "_agent");

/// Install the global logger: agent code at Debug when `verbose` (Info otherwise), ureq and the
/// rest at Warn. `RUST_LOG` is parsed first and the explicit filters below win over it.
/// A second call is a no-op.
pub fn setup_logging(verbose: bool) {
    let agent_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // ureq, rustls and friends
        .filter_module(PKG, agent_level) // library: pipeline, sender, hashing
        .filter_module(BIN_TARGET, agent_level) // main's "Total time"
        .format(|buf, record| writeln!(buf, "{}", format_line(record)))
        .try_init();
}

/// `[filededup LEVEL target] msg` for problems, `[filededup DEBUG] msg` for detail,
/// bare `[filededup] msg` for progress and summaries.
fn format_line(record: &Record<'_>) -> String {
    let tag = PKG.cyan();
    match record.level() {
        Level::Error => format!("[{} {} {}] {}", tag, "ERROR".red(), record.target().white(), record.args()),
        Level::Warn => format!("[{} {} {}] {}", tag, "WARN".yellow(), record.target().white(), record.args()),
        Level::Debug | Level::Trace => format!("[{} {}] {}", tag, "DEBUG".dimmed(), record.args()),
        Level::Info => format!("[{}] {}", tag, record.args()),
    }
}
