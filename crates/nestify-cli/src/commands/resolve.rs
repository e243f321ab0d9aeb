//! Resolve a single network file

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::NestifyConfig;
use crate::error::CliResult;
use crate::input::{load_network, write_json};

/// Resolve a network file to simulator-ready JSON
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Network file (JSON, or TOML with a .toml extension)
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Single-line JSON output
    #[arg(long)]
    pub compact: bool,
}

impl ResolveCommand {
    pub fn execute(self, config: &NestifyConfig) -> CliResult<()> {
        info!("Resolving {}", self.input.display());
        let network = load_network(&self.input, &config.keys)?;
        let resolved = nestify_resolve::resolve(&network)?;
        write_json(
            &resolved,
            self.output.as_deref(),
            config.output.pretty && !self.compact,
        )
    }
}
