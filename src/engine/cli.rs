//! CLI command handler: resolve options, set up logging, run the scan against the HTTP sink.

use anyhow::Result;
use log::info;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::engine::sender::HttpBatchSink;
use crate::engine::tools::format_bytes;
use crate::pipeline::run_pipeline;
use crate::utils::agent_toml::{AgentToml, apply_file_to_opts, load_agent_toml};
use crate::utils::config::{PackagePaths, PipelineDefaults};
use crate::utils::setup_logging;
use crate::{Opts, ScanSummary};

/// Host name for the default machine id, else the built-in default.
pub fn default_machine_id() -> String {
    sysinfo::System::host_name()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| PipelineDefaults::MACHINE_ID.to_string())
}

/// Layer defaults → config file → environment → CLI flags.
/// `env` looks up a variable by full name (injected so tests need not touch the process environment).
pub fn resolve_opts<E>(cli: &Cli, file: Option<&AgentToml>, env: E) -> Opts
where
    E: Fn(&str) -> Option<String>,
{
    let paths = PackagePaths::get();
    let mut opts = Opts {
        machine_id: default_machine_id(),
        ..Opts::default()
    };
    if let Some(file) = file {
        apply_file_to_opts(file, &mut opts);
    }
    if let Some(server) = env(&paths.env_var("server")) {
        opts.server_url = server;
    }
    if let Some(id) = env(&paths.env_var("machine_id")) {
        opts.machine_id = id;
    }

    if let Some(ref d) = cli.dir {
        opts.root = d.clone();
    }
    if let Some(ref s) = cli.server {
        opts.server_url = s.clone();
    }
    if let Some(ref id) = cli.machine_id {
        opts.machine_id = id.clone();
    }
    if let Some(b) = cli.batch {
        opts.batch_size = b;
    }
    if let Some(w) = cli.workers {
        opts.workers = w;
    }
    if let Some(q) = cli.queue_size {
        opts.queue_size = q;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    if let Some(s) = cli.skip_large {
        opts.skip_large = s;
    }
    if let Some(m) = cli.max_size {
        opts.max_file_size = m;
    }
    if let Some(secs) = cli.progress_interval {
        opts.progress_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = cli.request_timeout {
        opts.request_timeout = Duration::from_secs(secs);
    }

    opts.server_url = opts.server_url.trim_end_matches('/').to_string();
    opts
}

/// Run one scan from the command line.
pub fn handle_run(cli: &Cli) -> Result<ScanSummary> {
    let _ = dotenvy::dotenv();
    let file = load_agent_toml(Path::new("."));
    let opts = resolve_opts(cli, file.as_ref(), |k| std::env::var(k).ok());
    setup_logging(opts.verbose);

    info!(
        "Starting file deduplication agent: dir={} server={} machineID={} batchSize={} skipLarge={} maxSize={}",
        opts.root.display(),
        opts.server_url,
        opts.machine_id,
        opts.batch_size,
        opts.skip_large,
        format_bytes(opts.max_file_size)
    );

    let sink = Arc::new(HttpBatchSink::new(opts.ingest_url(), opts.request_timeout));
    let summary = run_pipeline(&opts, sink)?;
    info!("Agent completed successfully");
    Ok(summary)
}
