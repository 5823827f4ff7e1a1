//! Command-line surface and output types for the hubident operator tool.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use hubident_hub::{config_path, HubConfig, PreSpawnHook, SpawnRequest};
use hubident_resolver::Resolution;
use hubident_types::IdentityRecord;
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hubident")]
#[command(about = "Directory-backed identities for notebook sessions")]
#[command(version)]
pub struct Cli {
    /// Config file (default: $HUBIDENT_CONFIG, then /etc/hubident/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replace the identity cache with every account in the directory
    Sync,
    /// Resolve one user and print the identity
    Resolve { username: String },
    /// Show what a session start would set for a user
    SpawnEnv {
        username: String,
        /// Image reference the session would run
        #[arg(long, default_value = "")]
        image: String,
        /// Hub group the user belongs to (repeatable)
        #[arg(long = "group")]
        groups: Vec<String>,
    },
    /// Print the parsed config without secrets
    ShowConfig,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolveOutput {
    Resolved { identity: IdentityRecord },
    Rejected { username: String },
    NotFound { username: String },
}

impl ResolveOutput {
    pub fn new(username: &str, resolution: Resolution) -> Self {
        match resolution {
            Resolution::Resolved(identity) => Self::Resolved { identity },
            Resolution::Rejected => Self::Rejected {
                username: username.to_string(),
            },
            Resolution::NotFound => Self::NotFound {
                username: username.to_string(),
            },
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<HubConfig> {
        let path = config_path(self.config.as_deref());
        HubConfig::load(&path).with_context(|| format!("Failed to load {}", path.display()))
    }
}

/// Runs the selected command, writing JSON to `out`.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = cli.load_config()?;
    match &cli.command {
        Command::Sync => {
            let resolver = config
                .build_resolver()?
                .ok_or_else(|| anyhow!("directory is disabled in config"))?;
            let report = resolver.sync_all().context("Directory sync failed")?;
            info!(fetched = report.fetched, stored = report.stored, "Sync finished");
            write_json(out, &report)
        }
        Command::Resolve { username } => {
            let resolver = config
                .build_resolver()?
                .ok_or_else(|| anyhow!("directory is disabled in config"))?;
            let resolution = resolver
                .resolve(username)
                .with_context(|| format!("Failed to resolve {username}"))?;
            write_json(out, &ResolveOutput::new(username, resolution))
        }
        Command::SpawnEnv {
            username,
            image,
            groups,
        } => {
            let provisioner = config.build_provisioner()?;
            let mut spawn = SpawnRequest::new(username.as_str(), image.as_str())
                .with_groups(groups.iter().cloned());
            provisioner
                .pre_spawn(&mut spawn)
                .with_context(|| format!("Session start for {username} would be aborted"))?;
            write_json(out, &spawn)
        }
        Command::ShowConfig => write_json(out, &config),
    }
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("Failed to write output")?;
    writeln!(out)?;
    Ok(())
}
