//! hackrorectl - HackRore bench CLI
//!
//! Records diagnostic checks, tracks technician XP and manages the ticket log.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use hackrore_common::config::HackroreConfig;
use hackrorectl::cli::Cli;
use hackrorectl::commands::{self, App};
use hackrorectl::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = HackroreConfig::load(cli.config.as_deref())?;
    logging::init(&config.logging.level, cli.verbose);
    debug!("hackrorectl v{} starting", hackrore_common::VERSION);

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir());
    let mut app = App::open(config, cli.config.clone(), data_dir);
    app.json = cli.json;

    let output = commands::execute(&mut app, &cli.command)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
