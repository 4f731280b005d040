//! Engine module: hashing, delivery, progress, CLI

pub mod arg_parser;
pub mod cli;
pub mod hashing;
pub mod progress;
pub mod sender;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use hashing::{HashStrategy, SamplePlan, fingerprint, hash_full, hash_sampled};
pub use progress::{ProgressCounters, ProgressReporter, ProgressSnapshot};
pub use sender::{BatchSink, DeliveryError, HttpBatchSink, encode_batch};
pub use tools::{containing_dir, file_name_lossy, format_bytes, normalize_lexically};
