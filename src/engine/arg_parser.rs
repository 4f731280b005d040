use clap::Parser;
use std::path::PathBuf;

/// File inventory agent: fingerprint every file under DIR and report to the dedup server.
///
/// Unset options fall back to `.filededup.toml` in the working directory, then to
/// `FILEDEDUP_SERVER` / `FILEDEDUP_MACHINE_ID` (environment or `.env`), then to built-in defaults.
#[derive(Clone, Debug, Parser)]
#[command(name = "filededup-agent")]
#[command(about = "Scan a directory and report file fingerprints to a filededup server.")]
pub struct Cli {
    /// Directory to scan. Default: current directory.
    #[arg(long, short = 'd')]
    pub dir: Option<PathBuf>,

    /// Server URL. Default: http://localhost:8080.
    #[arg(long, short = 's')]
    pub server: Option<String>,

    /// Unique machine identifier. Default: host name.
    #[arg(long)]
    pub machine_id: Option<String>,

    /// Number of files per batch. Default: 1000.
    #[arg(long, short = 'b')]
    pub batch: Option<usize>,

    /// Number of parallel workers (0 = auto: max(CPUs, 4)).
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Size of the file and result queues (0 = auto: max(2 x batch, 1000)).
    #[arg(long)]
    pub queue_size: Option<usize>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Skip files larger than --max-size.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub skip_large: Option<bool>,

    /// Maximum file size to process in bytes when --skip-large is set. Default: 1 GiB.
    #[arg(long)]
    pub max_size: Option<u64>,

    /// Seconds between progress log lines. Default: 3.
    #[arg(long)]
    pub progress_interval: Option<u64>,

    /// Per-request timeout for batch uploads, in seconds. Default: 120.
    #[arg(long)]
    pub request_timeout: Option<u64>,
}
