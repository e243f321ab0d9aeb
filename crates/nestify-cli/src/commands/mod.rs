//! CLI command implementations for nestify

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::NestifyConfig;
use crate::error::CliResult;

pub mod layers;
pub mod merge;
pub mod resolve;

/// nestify - resolve hierarchical network descriptions
#[derive(Parser, Debug)]
#[command(
    name = "nestify",
    version,
    about = "Resolve hierarchical network descriptions",
    long_about = "nestify flattens inheritance-based network descriptions (models, layers, \
                  connections, recorded populations) into simulator-ready JSON, replicating \
                  layers along their filter dimensions and rescaling connections to match."
)]
pub struct NestifyCli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "NESTIFY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a network file
    Resolve(resolve::ResolveCommand),

    /// Combine several network files, then resolve
    Merge(merge::MergeCommand),

    /// List layers grouped by area
    #[command(alias = "ls")]
    Layers(layers::LayersCommand),
}

impl NestifyCli {
    /// Execute the CLI command
    pub fn execute(self) -> CliResult<()> {
        let config = NestifyConfig::load(self.config.as_deref())?;

        match self.command {
            Commands::Resolve(cmd) => cmd.execute(&config),
            Commands::Merge(cmd) => cmd.execute(&config),
            Commands::Layers(cmd) => cmd.execute(&config),
        }
    }
}
