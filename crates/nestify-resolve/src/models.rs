//! Neuron and synapse model resolution

use log::debug;
use nestify_tree::{traverse, Field, ParamChain, TreeKeys, TreeNode};
use serde::Serialize;

use crate::error::{ResolveError, Result};

/// Field of a model subtree naming the simulator primitive it derives from
pub const BASE_MODEL_KEY: &str = "nest_model";

/// A leaf model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    /// Simulator primitive the model derives from
    pub base_model: String,
    /// Model name
    pub name: String,
    /// Resolved parameters
    pub params: ParamChain,
}

/// Flatten a mapping of model subtrees. Each subtree names its base model
/// once, at its root; every leaf below it derives from that base model.
/// Neuron and synapse models share this logic.
pub fn resolve_models(forest: &TreeNode, keys: &TreeKeys) -> Result<Vec<Model>> {
    let mut models = Vec::new();
    for (key, subtree) in forest.children() {
        let base_model = match subtree.field(BASE_MODEL_KEY) {
            Some(Field::Scalar(value)) => value.as_str(),
            _ => None,
        }
        .ok_or_else(|| {
            ResolveError::format(
                format!("model subtree '{}'", key),
                format!("'{}' must name a base model", BASE_MODEL_KEY),
            )
        })?;

        let leaves = traverse(subtree, keys)?;
        debug!("{} models derive from '{}'", leaves.len(), base_model);
        models.extend(leaves.into_iter().map(|(name, params)| Model {
            base_model: base_model.to_string(),
            name,
            params,
        }));
    }
    Ok(models)
}
