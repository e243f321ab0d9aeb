//! Layer resolution: flatten the layer tree and derive simulator geometry

use std::collections::BTreeMap;

use log::{debug, warn};
use nestify_tree::{traverse, ParamChain, ParamMap, TreeKeys, TreeNode, Value};
use serde::ser::{SerializeSeq, Serializer};
use serde_json::json;

use crate::error::{ResolveError, Result};
use crate::filters::expanded_names;

/// Layers by name
pub type LayerMap = BTreeMap<String, Layer>;

/// Whether filter replication is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// Replicate layers along their filter dimensions
    Expanded,
    /// One entry per leaf of the layer tree
    Flat,
}

/// Kind of a population declared in a layer's `elements`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationKind {
    /// Excitatory population, scaled against the inhibitory one
    Excitatory,
    /// Inhibitory population (at most one per layer)
    Inhibitory,
}

impl PopulationKind {
    fn parse(entity: &str, value: &Value) -> Result<Self> {
        match value.as_str() {
            Some("excitatory") => Ok(Self::Excitatory),
            Some("inhibitory") => Ok(Self::Inhibitory),
            _ => Err(ResolveError::format(
                entity,
                format!("population type must be 'excitatory' or 'inhibitory', found {}", value),
            )),
        }
    }
}

/// One (population, count) entry of a layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Population identifier
    pub population: String,
    /// Number of units of this population per grid location
    pub count: u64,
}

/// Simulator-facing layer geometry
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LayerGeometry {
    /// Grid rows
    pub rows: u64,
    /// Grid columns
    pub columns: u64,
    /// Spatial extent `[visSize, visSize]`
    pub extent: [f64; 2],
    /// Periodic boundary conditions
    pub edge_wrap: bool,
    /// Flat `[population, count, ...]` list
    #[serde(serialize_with = "serialize_elements")]
    pub elements: Vec<Element>,
}

/// A resolved layer
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Layer {
    /// Every parameter of the layer, with `layer_name` and `base_name` injected
    pub params: ParamChain,
    /// Geometry handed to the simulator
    pub nest_params: LayerGeometry,
}

impl Layer {
    /// Name of the tree leaf this layer comes from (before replication)
    pub fn base_name(&self) -> Result<&str> {
        Ok(self.params.lookup_str("base_name")?)
    }
}

fn serialize_elements<S: Serializer>(
    elements: &[Element],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(elements.len() * 2))?;
    for element in elements {
        seq.serialize_element(&element.population)?;
        seq.serialize_element(&element.count)?;
    }
    seq.end()
}

/// Flatten the layer tree into `(name, params)` leaves, with the leaf name
/// injected as `base_name`
pub fn layer_leaves(tree: &TreeNode, keys: &TreeKeys) -> Result<Vec<(String, ParamChain)>> {
    Ok(traverse(tree, keys)?
        .into_iter()
        .map(|(name, params)| {
            let base = params.new_child(single("base_name", json!(name)));
            (name, base)
        })
        .collect())
}

/// Replicate leaves carrying a filter spec, once per expanded name
pub fn expand_layer_leaves(leaves: Vec<(String, ParamChain)>) -> Result<Vec<(String, ParamChain)>> {
    let mut expanded = Vec::with_capacity(leaves.len());
    for (name, params) in leaves {
        let names = expanded_names(&name, &params)?;
        if names.len() > 1 {
            debug!("layer '{}' expanded into {} replicas", name, names.len());
        }
        expanded.extend(names.into_iter().map(|n| (n, params.clone())));
    }
    Ok(expanded)
}

/// Resolve the layer tree into named layers with geometry
pub fn resolve_layers(tree: &TreeNode, keys: &TreeKeys, expansion: Expansion) -> Result<LayerMap> {
    let mut leaves = layer_leaves(tree, keys)?;
    if expansion == Expansion::Expanded {
        leaves = expand_layer_leaves(leaves)?;
    }

    let mut layers = LayerMap::new();
    for (name, params) in leaves {
        let layer = format_layer(&name, &params)?;
        if layers.insert(name.clone(), layer).is_some() {
            warn!("duplicate layer name '{}', keeping the last definition", name);
        }
    }
    Ok(layers)
}

/// Build a layer entry from its name and inherited params
pub fn format_layer(name: &str, params: &ParamChain) -> Result<Layer> {
    let size = params.lookup_u64("size")?;
    let vis_size = params.lookup_f64("visSize")?;
    let nest_params = LayerGeometry {
        rows: size,
        columns: size,
        extent: [vis_size, vis_size],
        edge_wrap: params.lookup_bool("edge_wrap")?,
        elements: layer_elements(name, params)?,
    };
    Ok(Layer {
        params: params.new_child(single("layer_name", json!(name))),
        nest_params,
    })
}

/// Population counts of a layer.
///
/// With one inhibitory population of ratio `r_inh`, each excitatory count is
/// `ratio * r_inh * exc_inh_ratio`. Without one, counts are the raw ratios.
/// Inhibitory counts are always their own ratio.
pub fn layer_elements(layer: &str, params: &ParamChain) -> Result<Vec<Element>> {
    let declared = match params.lookup("elements")? {
        Value::Array(declared) => declared,
        other => {
            return Err(ResolveError::format(
                layer,
                format!("'elements' must be a list, found {}", nestify_tree::type_name(other)),
            ))
        }
    };

    let mut populations = Vec::with_capacity(declared.len());
    for entry in declared {
        let entry = entry
            .as_object()
            .ok_or_else(|| ResolveError::format(layer, "each element must be a mapping"))?;
        let entry = ParamChain::from_map(entry.clone());
        let kind = PopulationKind::parse(layer, entry.lookup("type")?)?;
        let population = entry.lookup_str("population")?.to_string();
        let ratio = entry.lookup_f64("ratio")?;
        populations.push((kind, population, ratio));
    }

    let mut inhibitory = populations
        .iter()
        .filter(|(kind, _, _)| *kind == PopulationKind::Inhibitory);
    let number_inh = inhibitory.next().map(|(_, _, ratio)| *ratio);
    if inhibitory.next().is_some() {
        return Err(ResolveError::format(
            layer,
            "there should be only one inhibitory population",
        ));
    }

    populations
        .into_iter()
        .map(|(kind, population, ratio)| -> Result<Element> {
            let number = match (kind, number_inh) {
                (PopulationKind::Excitatory, Some(number_inh)) => {
                    ratio * number_inh * params.lookup_f64("exc_inh_ratio")?
                }
                _ => ratio,
            };
            Ok(Element {
                count: integral_count(layer, &population, number)?,
                population,
            })
        })
        .collect()
}

fn integral_count(layer: &str, population: &str, number: f64) -> Result<u64> {
    if number < 0.0 || number.fract() != 0.0 || !number.is_finite() {
        return Err(ResolveError::format(
            layer,
            format!("population '{}' has non-integral count {}", population, number),
        ));
    }
    Ok(number as u64)
}

pub(crate) fn single(key: &str, value: Value) -> ParamMap {
    let mut map = ParamMap::new();
    map.insert(key.to_string(), value);
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(v: Value) -> ParamChain {
        ParamChain::from_map(v.as_object().cloned().unwrap())
    }

    #[test]
    fn excitatory_counts_scale_with_inhibitory_ratio() {
        let params = chain(json!({
            "exc_inh_ratio": 3,
            "elements": [
                {"type": "excitatory", "population": "L4_exc", "ratio": 2},
                {"type": "inhibitory", "population": "L4_inh", "ratio": 1}
            ]
        }));
        let elements = layer_elements("l4", &params).unwrap();
        assert_eq!(
            elements,
            vec![
                Element { population: "L4_exc".into(), count: 6 },
                Element { population: "L4_inh".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn without_inhibitory_counts_are_raw_ratios() {
        let params = chain(json!({
            "elements": [{"type": "excitatory", "population": "relay", "ratio": 2}]
        }));
        let elements = layer_elements("lgn", &params).unwrap();
        assert_eq!(elements[0].count, 2);
    }

    #[test]
    fn two_inhibitory_populations_fail() {
        let params = chain(json!({
            "exc_inh_ratio": 4,
            "elements": [
                {"type": "inhibitory", "population": "a", "ratio": 1},
                {"type": "inhibitory", "population": "b", "ratio": 1}
            ]
        }));
        let err = layer_elements("l23", &params).unwrap_err();
        assert!(matches!(err, ResolveError::Format { .. }));
    }

    #[test]
    fn unknown_population_type_fails() {
        let params = chain(json!({
            "elements": [{"type": "modulatory", "population": "a", "ratio": 1}]
        }));
        assert!(matches!(
            layer_elements("l", &params),
            Err(ResolveError::Format { .. })
        ));
    }

    #[test]
    fn geometry_serializes_flat_elements() {
        let params = chain(json!({
            "size": 40,
            "visSize": 8.0,
            "edge_wrap": true,
            "elements": [{"type": "excitatory", "population": "relay", "ratio": 1}]
        }));
        let layer = format_layer("lgn", &params).unwrap();
        assert_eq!(layer.params.lookup_str("layer_name").unwrap(), "lgn");
        let out = serde_json::to_value(&layer.nest_params).unwrap();
        assert_eq!(
            out,
            json!({
                "rows": 40,
                "columns": 40,
                "extent": [8.0, 8.0],
                "edge_wrap": true,
                "elements": ["relay", 1]
            })
        );
    }
}
