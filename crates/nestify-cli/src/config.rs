//! Configuration management for the nestify CLI

use std::path::{Path, PathBuf};

use nestify_tree::TreeKeys;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Global CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NestifyConfig {
    /// Structural keys of the network trees
    pub keys: TreeKeys,

    /// Output preferences
    pub output: OutputPreferences,
}

/// How resolved networks are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPreferences {
    /// Indented JSON
    pub pretty: bool,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl NestifyConfig {
    /// Load configuration from file; a missing file gives the defaults
    pub fn load_from_file(path: &Path) -> CliResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| CliError::config(format!("Invalid config file {}: {}", path.display(), e)))
        } else {
            Ok(Self::default())
        }
    }

    /// Load an explicitly given file (which must exist) or the default one
    pub fn load(explicit: Option<&Path>) -> CliResult<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(CliError::config(format!(
                "Config file not found: {}",
                path.display()
            ))),
            Some(path) => Self::load_from_file(path),
            None => match Self::default_config_path() {
                Ok(path) => {
                    debug!("Using config {}", path.display());
                    Self::load_from_file(&path)
                }
                Err(_) => Ok(Self::default()),
            },
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::config("Could not determine config directory"))?;
        Ok(config_dir.join("nestify").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: NestifyConfig = toml::from_str("[keys]\nchildren = \"sub\"\n").unwrap();
        assert_eq!(config.keys.children, "sub");
        assert_eq!(config.keys.params, "params");
        assert!(config.output.pretty);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = NestifyConfig::load_from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, NestifyConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(NestifyConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
