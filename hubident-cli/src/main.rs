//! hubident operator CLI
//!
//! Usage:
//!   hubident sync
//!   hubident resolve alice
//!   hubident spawn-env alice --image quay.io/jupyter/minimal-notebook:latest --group collaborative
//!   hubident show-config --config ./config.toml
//!
//! Output goes to stdout as JSON; logs go to stderr.

use std::io;

use anyhow::Result;
use clap::Parser;
use hubident_cli::{run, Cli};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();

    let stdout = io::stdout();
    run(&cli, &mut stdout.lock())
}
