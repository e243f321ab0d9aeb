//! Raw (unresolved) network description

use log::debug;
use nestify_tree::{merge, type_name, ParamMap, TreeKeys, TreeNode, Value};
use serde_json::json;

use crate::error::{ResolveError, Result};
use crate::validation::validate;

static NULL: Value = Value::Null;

/// Keys of a connection record that must be present
pub const CONNECTION_RECORD_KEYS: &[&str] = &[
    "source_layer",
    "target_layer",
    "connection",
    "source_population",
    "target_population",
];

/// Top-level sections of a network description, all optional
pub const NETWORK_SECTIONS: &[&str] = &[
    "neuron_models",
    "synapse_models",
    "layers",
    "connection_models",
    "connections",
    "populations",
];

/// One connection instance between two layers
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRecord {
    /// Source layer name
    pub source_layer: String,
    /// Target layer name
    pub target_layer: String,
    /// Connection model (leaf of the connection model tree)
    pub connection: String,
    /// Source population identifier
    pub source_population: String,
    /// Target population identifier
    pub target_population: String,
    /// Instance parameters, overriding the model's
    pub params: ParamMap,
}

impl ConnectionRecord {
    /// Read and validate a record
    pub fn from_value(entity: &str, value: &Value) -> Result<Self> {
        let raw = value.as_object().ok_or_else(|| {
            ResolveError::format(entity, format!("expected a mapping, found {}", type_name(value)))
        })?;
        let optional = json!({ "params": {} });
        let record = validate(
            entity,
            raw,
            None,
            Some(CONNECTION_RECORD_KEYS),
            optional.as_object(),
        )?;

        let text = |key: &str| -> Result<String> {
            record
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| ResolveError::format(entity, format!("'{}' must be a string", key)))
        };
        let params = match record.get("params") {
            Some(Value::Object(params)) => params.clone(),
            Some(Value::Null) | None => ParamMap::new(),
            Some(other) => {
                return Err(ResolveError::format(
                    entity,
                    format!("'params' must be a mapping, found {}", type_name(other)),
                ))
            }
        };

        Ok(Self {
            source_layer: text("source_layer")?,
            target_layer: text("target_layer")?,
            connection: text("connection")?,
            source_population: text("source_population")?,
            target_population: text("target_population")?,
            params,
        })
    }

    /// Human-readable identity used in errors and logs
    pub fn describe(&self) -> String {
        format!(
            "connection {}:{} -> {}:{} ({})",
            self.source_layer,
            self.source_population,
            self.target_layer,
            self.target_population,
            self.connection
        )
    }
}

/// A whole network description, before resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    /// Structural key names used by every tree below
    pub keys: TreeKeys,
    /// Neuron models: one child subtree per base model family
    pub neuron_models: TreeNode,
    /// Synapse models: one child subtree per base model family
    pub synapse_models: TreeNode,
    /// Layer tree
    pub layers: TreeNode,
    /// Connection model tree
    pub connection_models: TreeNode,
    /// Recorded population tree
    pub populations: TreeNode,
    /// Connection instances
    pub connections: Vec<ConnectionRecord>,
}

impl Network {
    /// Read a network from a JSON-shaped value. Missing sections are empty;
    /// any other top-level key is rejected.
    pub fn from_value(value: &Value, keys: TreeKeys) -> Result<Self> {
        let raw = value.as_object().ok_or_else(|| {
            ResolveError::format("network", format!("expected a mapping, found {}", type_name(value)))
        })?;
        let optional = NETWORK_SECTIONS
            .iter()
            .map(|s| (s.to_string(), Value::Null))
            .collect::<ParamMap>();
        let root = validate("network", raw, None, None, Some(&optional))?;
        let section = |name: &str| root.get(name).unwrap_or(&NULL);

        let connections = match section("connections") {
            Value::Null => Vec::new(),
            Value::Array(records) => records
                .iter()
                .enumerate()
                .map(|(i, r)| ConnectionRecord::from_value(&format!("connections[{}]", i), r))
                .collect::<Result<Vec<_>>>()?,
            other => {
                return Err(ResolveError::format(
                    "network",
                    format!("'connections' must be a list, found {}", type_name(other)),
                ))
            }
        };

        let network = Self {
            neuron_models: TreeNode::forest(section("neuron_models"), &keys)?,
            synapse_models: TreeNode::forest(section("synapse_models"), &keys)?,
            layers: TreeNode::from_value(section("layers"), &keys)?,
            connection_models: TreeNode::from_value(section("connection_models"), &keys)?,
            populations: TreeNode::from_value(section("populations"), &keys)?,
            connections,
            keys,
        };
        debug!(
            "network read: {} neuron model families, {} connection records",
            network.neuron_models.children().len(),
            network.connections.len()
        );
        Ok(network)
    }

    /// Combine independently authored networks. Trees are merged section by
    /// section, earlier networks taking precedence; connection lists are
    /// concatenated in order. Tree keys come from the first network.
    pub fn combine(networks: &[Network]) -> Network {
        let keys = networks.first().map(|n| n.keys.clone()).unwrap_or_default();
        Network {
            neuron_models: merge(networks.iter().map(|n| &n.neuron_models)),
            synapse_models: merge(networks.iter().map(|n| &n.synapse_models)),
            layers: merge(networks.iter().map(|n| &n.layers)),
            connection_models: merge(networks.iter().map(|n| &n.connection_models)),
            populations: merge(networks.iter().map(|n| &n.populations)),
            connections: networks
                .iter()
                .flat_map(|n| n.connections.iter().cloned())
                .collect(),
            keys,
        }
    }
}
