#![doc = "nestify resolution engine\n\nTurns an inheritance-based network description into a flat, simulator-ready\none. Stages, in order:\n- models: neuron and synapse model trees to leaf models\n- layers: layer tree to named layers with geometry, replicated along filter dimensions\n- connections: instance params over connection-model defaults, rescaled to layer geometry\n- areas: area to layer index\n- populations: recorded populations and recorder descriptors\n\nEvery stage is a pure function of the network; the first error aborts resolution.\n"]
#![deny(missing_docs)]

pub mod areas;
pub mod connections;
pub mod error;
pub mod filters;
pub mod layers;
pub mod models;
pub mod network;
pub mod populations;
pub mod validation;

use log::info;
use serde::Serialize;

pub use areas::{index_areas, AreaMap};
pub use connections::{resolve_connections, Connection, Kernel, Mask};
pub use error::{ResolveError, Result};
pub use filters::{expanded_names, FilterSpec};
pub use layers::{resolve_layers, Element, Expansion, Layer, LayerGeometry, LayerMap};
pub use models::{resolve_models, Model};
pub use network::{ConnectionRecord, Network};
pub use populations::{resolve_populations, Population, Recorder};
pub use validation::{validate, validate_children, ValidationError};

/// A fully resolved network
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedNetwork {
    /// Leaf neuron models
    pub neuron_models: Vec<Model>,
    /// Leaf synapse models
    pub synapse_models: Vec<Model>,
    /// Expanded layers by name
    pub layers: LayerMap,
    /// Expanded, rescaled connections
    pub connections: Vec<Connection>,
    /// Layer names by area
    pub areas: AreaMap,
    /// Recorded populations
    pub populations: Vec<Population>,
}

/// Resolve a network description
pub fn resolve(network: &Network) -> Result<ResolvedNetwork> {
    let keys = &network.keys;
    let layers = resolve_layers(&network.layers, keys, Expansion::Expanded)?;
    let flat_layers = resolve_layers(&network.layers, keys, Expansion::Flat)?;

    let resolved = ResolvedNetwork {
        neuron_models: resolve_models(&network.neuron_models, keys)?,
        synapse_models: resolve_models(&network.synapse_models, keys)?,
        connections: resolve_connections(network, &flat_layers, &layers)?,
        areas: index_areas(&layers)?,
        populations: resolve_populations(network, &flat_layers)?,
        layers,
    };
    info!(
        "resolved {} layers ({} before expansion), {} connections, {} populations",
        resolved.layers.len(),
        flat_layers.len(),
        resolved.connections.len(),
        resolved.populations.len()
    );
    Ok(resolved)
}
