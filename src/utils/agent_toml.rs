//! Load `.filededup.toml` from a directory (CLI only). Lib callers pass [`ScanOpts`](crate::ScanOpts) directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct AgentToml {
    #[serde(default)]
    agent: AgentSection,
}

#[derive(Debug, Default, Deserialize)]
struct AgentSection {
    dir: Option<String>,
    server: Option<String>,
    machine_id: Option<String>,
    batch: Option<usize>,
    workers: Option<usize>,
    queue_size: Option<usize>,
    verbose: Option<bool>,
    skip_large: Option<bool>,
    max_size: Option<u64>,
    progress_interval: Option<u64>,
    request_timeout: Option<u64>,
}

/// Load the agent config file from `dir` if present. Returns None if missing, unreadable or invalid (invalid is logged).
pub fn load_agent_toml(dir: &Path) -> Option<AgentToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_agent_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub fn parse_agent_toml(s: &str) -> Result<AgentToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($idx:expr, $opts:expr, $idx_field:ident => $opts_field:ident) => {
        if let Some(v) = $idx.$idx_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before env and CLI.
pub fn apply_file_to_opts(file: &AgentToml, opts: &mut Opts) {
    let a = &file.agent;
    if let Some(ref d) = a.dir {
        opts.root = PathBuf::from(d);
    }
    apply_file_opt!(a, opts, server => server_url);
    apply_file_opt!(a, opts, machine_id => machine_id);
    apply_file_opt!(a, opts, batch => batch_size);
    apply_file_opt!(a, opts, workers => workers);
    apply_file_opt!(a, opts, queue_size => queue_size);
    apply_file_opt!(a, opts, verbose => verbose);
    apply_file_opt!(a, opts, skip_large => skip_large);
    apply_file_opt!(a, opts, max_size => max_file_size);
    if let Some(secs) = a.progress_interval {
        opts.progress_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = a.request_timeout {
        opts.request_timeout = Duration::from_secs(secs);
    }
}
