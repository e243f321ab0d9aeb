//! Combine independently authored network files

use std::path::PathBuf;

use clap::Args;
use nestify_resolve::Network;
use tracing::info;

use crate::config::NestifyConfig;
use crate::error::CliResult;
use crate::input::{load_network, write_json};

/// Combine network files (earlier files take precedence), then resolve
#[derive(Args, Debug)]
pub struct MergeCommand {
    /// Network files, highest precedence first
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Single-line JSON output
    #[arg(long)]
    pub compact: bool,
}

impl MergeCommand {
    pub fn execute(self, config: &NestifyConfig) -> CliResult<()> {
        let networks = self
            .inputs
            .iter()
            .map(|path| load_network(path, &config.keys))
            .collect::<CliResult<Vec<_>>>()?;
        info!("Combining {} networks", networks.len());

        let resolved = nestify_resolve::resolve(&Network::combine(&networks))?;
        write_json(
            &resolved,
            self.output.as_deref(),
            config.output.pretty && !self.compact,
        )
    }
}
