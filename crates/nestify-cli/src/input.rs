//! Network files in and resolved networks out

use std::path::Path;

use anyhow::Context;
use nestify_resolve::Network;
use nestify_tree::{TreeKeys, Value};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CliError, CliResult};

/// Read a network file. `.toml` files are parsed as TOML, anything else as JSON.
pub fn read_value(path: &Path) -> CliResult<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_toml = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("toml"));
    debug!("Parsing {} as {}", path.display(), if is_toml { "TOML" } else { "JSON" });

    if is_toml {
        toml::from_str(&content).map_err(|e| CliError::input(path, e.to_string()))
    } else {
        serde_json::from_str(&content).map_err(|e| CliError::input(path, e.to_string()))
    }
}

/// Read and parse a network file
pub fn load_network(path: &Path, keys: &TreeKeys) -> CliResult<Network> {
    let network = Network::from_value(&read_value(path)?, keys.clone())?;
    info!(
        "Loaded {} ({} connections)",
        path.display(),
        network.connections.len()
    );
    Ok(network)
}

/// Write `value` as JSON to `output`, or to stdout when `None`
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>, pretty: bool) -> CliResult<()> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, text)?;
            info!("Wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
