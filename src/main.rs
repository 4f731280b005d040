//! filededup-agent CLI: scan a directory and report fingerprints to the server.

use anyhow::Result;
use clap::Parser;
use filededup::engine::arg_parser::Cli;
use filededup::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
