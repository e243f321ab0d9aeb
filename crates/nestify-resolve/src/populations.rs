//! Recorded populations and their recorder descriptors

use log::debug;
use nestify_tree::{traverse, ParamChain, ParamMap, TreeKeys, TreeNode};
use serde::Serialize;
use serde_json::json;

use crate::error::{ResolveError, Result};
use crate::filters::FilterSpec;
use crate::layers::{single, LayerMap};
use crate::network::Network;

/// How a recorder reads its configuration from population params
#[derive(Debug, Clone, Copy)]
pub struct RecorderFields {
    /// Param holding the `record` flag
    pub record: &'static str,
    /// (recorder field, population param) pairs
    pub params: &'static [(&'static str, &'static str)],
}

/// Multimeter configuration fields
pub static MULTIMETER: RecorderFields = RecorderFields {
    record: "record_multimeter",
    params: &[
        ("record_from", "mm_record_from"),
        ("record_to", "mm_record_to"),
        ("interval", "mm_interval"),
        ("withtime", "mm_withtime"),
        ("withgid", "mm_withgid"),
    ],
};

/// Spike detector configuration fields
pub static SPIKE_DETECTOR: RecorderFields = RecorderFields {
    record: "record_spike_detector",
    params: &[("withtime", "sd_withtime"), ("withgid", "sd_withgid")],
};

/// Whether and how a population is recorded by one recorder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recorder {
    /// Record this population
    pub record: bool,
    /// Simulator-facing recorder configuration
    pub recorder_params: ParamMap,
}

impl Recorder {
    /// Read a recorder descriptor from population params
    pub fn from_params(fields: &RecorderFields, params: &ParamChain) -> Result<Self> {
        let mut recorder_params = ParamMap::new();
        for (field, key) in fields.params {
            recorder_params.insert(field.to_string(), params.lookup(key)?.clone());
        }
        Ok(Self {
            record: params.lookup_bool(fields.record)?,
            recorder_params,
        })
    }
}

/// A recorded population
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Population {
    /// Layer (expanded name) the population lives in
    pub layer: String,
    /// Population identifier
    pub population: String,
    /// Multimeter descriptor
    pub multimeter: Recorder,
    /// Spike detector descriptor
    pub spike_detector: Recorder,
}

/// Replicate populations whose layer is expanded, overriding `layer` in each
/// copy with one expanded layer name. `flat_layers` is the non-expanded view.
pub fn expand_populations(
    leaves: Vec<(String, ParamChain)>,
    flat_layers: &LayerMap,
) -> Result<Vec<(String, ParamChain)>> {
    let mut expanded = Vec::with_capacity(leaves.len());
    for (name, params) in leaves {
        let layer_name = params.lookup_str("layer")?.to_string();
        let layer = flat_layers
            .get(&layer_name)
            .ok_or_else(|| ResolveError::UnknownLayer {
                layer: layer_name.clone(),
                referrer: format!("population '{}'", name),
            })?;

        match FilterSpec::of_layer(&layer_name, &layer.params)? {
            Some(filters) => {
                let names = filters.expanded_names(&layer_name)?;
                debug!("population '{}' replicated over {} layers", name, names.len());
                expanded.extend(
                    names
                        .into_iter()
                        .map(|n| (name.clone(), params.new_child(single("layer", json!(n))))),
                );
            }
            None => expanded.push((name, params)),
        }
    }
    Ok(expanded)
}

/// Flatten the population tree, expand it along the layers and build the
/// recorder descriptors
pub fn resolve_populations(network: &Network, flat_layers: &LayerMap) -> Result<Vec<Population>> {
    populations(&network.populations, &network.keys, flat_layers)
}

fn populations(tree: &TreeNode, keys: &TreeKeys, flat_layers: &LayerMap) -> Result<Vec<Population>> {
    expand_populations(traverse(tree, keys)?, flat_layers)?
        .into_iter()
        .map(|(population, params)| {
            Ok(Population {
                layer: params.lookup_str("layer")?.to_string(),
                multimeter: Recorder::from_params(&MULTIMETER, &params)?,
                spike_detector: Recorder::from_params(&SPIKE_DETECTOR, &params)?,
                population,
            })
        })
        .collect()
}
