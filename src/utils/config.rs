//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    env_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
                env_prefix: pkg.to_uppercase(),
            }
        })
    }

    /// Agent config file looked up in the working directory (`.filededup.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Environment variable name for `key`, e.g. `FILEDEDUP_SERVER`.
    pub fn env_var(&self, key: &str) -> String {
        format!("{}_{}", self.env_prefix, key.to_uppercase())
    }
}

// ---- Worker threads ----

/// Worker pool sizing. Use [`WorkerThreadLimits::current()`] to fill `all_threads` from rayon.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    /// Minimum pool size: hashing is I/O bound, so small machines still get a few workers.
    pub floor: usize,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            floor: Self::FLOOR_THREADS,
        }
    }
}

impl WorkerThreadLimits {
    pub const FLOOR_THREADS: usize = 4;
    /// Open-file permits per worker (semaphore capacity = workers * this).
    pub const FD_PERMITS_PER_WORKER: usize = 2;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }

    /// Worker count for a requested value: 0 means auto (`max(cpus, floor)`).
    pub fn resolve(&self, requested: usize) -> usize {
        match requested {
            0 => self.all_threads.max(self.floor),
            n => n,
        }
    }
}

// ---- Hashing ----

/// Hashing thresholds, segment sizes and buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    const MIB: u64 = 1024 * 1024;

    /// Files strictly below this are hashed in full (bytes). 10 MiB.
    pub const FULL_HASH_LIMIT: u64 = 10 * Self::MIB;
    /// Above this the middle budget stops growing (bytes). 100 MiB.
    pub const PROPORTIONAL_LIMIT: u64 = 100 * Self::MIB;
    /// Bytes always hashed from the start of a sampled file.
    pub const HEAD_SIZE: u64 = Self::MIB;
    /// Bytes always hashed from the end of a sampled file.
    pub const TAIL_SIZE: u64 = Self::MIB;
    /// Middle budget for files above [`Self::PROPORTIONAL_LIMIT`].
    pub const MAX_MIDDLE_BUDGET: u64 = 10 * Self::MIB;
    /// Middle budget divisor for files in (10 MiB, 100 MiB]: 10% of the size.
    pub const MIDDLE_BUDGET_DIVISOR: u64 = 10;
    /// Number of evenly spaced middle samples.
    pub const SAMPLE_COUNT: u64 = 10;
    /// Read buffer for both strategies (bytes). 64 KiB.
    pub const READ_BUFFER_SIZE: usize = 64 * 1024;
}

// ---- Pipeline defaults ----

pub struct PipelineDefaults;

impl PipelineDefaults {
    pub const SERVER_URL: &'static str = "http://localhost:8080";
    pub const MACHINE_ID: &'static str = "default";
    pub const BATCH_SIZE: usize = 1000;
    /// Auto queue size never drops below this.
    pub const MIN_QUEUE_SIZE: usize = 1000;
    /// Default `--max-size` when `--skip-large` is set (bytes). 1 GiB.
    pub const MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;
    pub const PROGRESS_INTERVAL_SECS: u64 = 3;
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;
    /// Path of the ingestion endpoint, appended to the server URL.
    pub const INGEST_PATH: &'static str = "/files";

    /// File/result queue capacity for a requested value: 0 means auto (`max(2 * batch, 1000)`).
    pub fn queue_size(requested: usize, batch_size: usize) -> usize {
        match requested {
            0 => (batch_size.saturating_mul(2)).max(Self::MIN_QUEUE_SIZE),
            n => n,
        }
    }
}
