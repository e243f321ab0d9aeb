//! Layer listing

use std::path::PathBuf;

use clap::Args;
use nestify_resolve::{index_areas, resolve_layers, AreaMap, Expansion};

use crate::config::NestifyConfig;
use crate::error::CliResult;
use crate::input::load_network;

/// List the layers of a network, grouped by area
#[derive(Args, Debug)]
pub struct LayersCommand {
    /// Network file (JSON, or TOML with a .toml extension)
    pub input: PathBuf,

    /// Show tree leaves without filter replication
    #[arg(long)]
    pub flat: bool,
}

impl LayersCommand {
    pub fn execute(self, config: &NestifyConfig) -> CliResult<()> {
        let network = load_network(&self.input, &config.keys)?;
        let expansion = if self.flat {
            Expansion::Flat
        } else {
            Expansion::Expanded
        };
        let layers = resolve_layers(&network.layers, &network.keys, expansion)?;
        print!("{}", render(&index_areas(&layers)?));
        Ok(())
    }
}

fn render(areas: &AreaMap) -> String {
    let mut out = String::new();
    for (area, layers) in areas {
        out.push_str(area);
        out.push('\n');
        for layer in layers {
            out.push_str("  ");
            out.push_str(layer);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_are_indented_under_their_area() {
        let mut areas = AreaMap::new();
        areas.insert("V1".into(), vec!["l4".into(), "l23".into()]);
        areas.insert("input".into(), vec!["retina".into()]);
        assert_eq!(render(&areas), "V1\n  l4\n  l23\ninput\n  retina\n");
    }
}
