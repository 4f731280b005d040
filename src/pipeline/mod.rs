//! Pipeline components: walk, hash workers, collector, sender, and their wiring.

pub mod collector;
pub mod context;
pub mod delivery;
pub mod error_handler;
pub mod orchestrator;
pub mod semaphore;
pub mod walk;
pub mod worker;

pub use collector::{CollectorStats, collect_batches, spawn_collector};
pub use context::{PipelineChannels, PipelineContext, PipelineTuning, create_pipeline_channels};
pub use delivery::{SenderStats, send_batches, spawn_sender};
pub use error_handler::{check_for_fatal_error_or_skipped_entries, check_opts};
pub use orchestrator::{PipelineStage, run_pipeline};
pub use semaphore::{FdPermit, FdSemaphore};
pub use walk::{
    WalkOutcome, WalkReport, WalkTotals, count_tree, run_walk_loop, spawn_walk_thread,
    to_outcome_walkdir, walk_files,
};
pub use worker::{WorkerShared, path_to_record, spawn_hash_workers};
