//! Connection resolution.
//!
//! Two phases:
//! 1. expansion: a connection whose source layer carries a filter spec is
//!    replicated once per source replica (optionally splitting the model's
//!    base weight between replicas)
//! 2. resolution: instance params are stacked over the connection model's,
//!    then mask, kernel and weights are rescaled to the layers' geometry

use std::collections::BTreeMap;

use log::debug;
use nestify_tree::{traverse, type_name, ParamChain, ParamMap, TreeKeys, TreeNode, Value};
use serde::Serialize;
use serde_json::json;

use crate::error::{ResolveError, Result};
use crate::filters::FilterSpec;
use crate::layers::LayerMap;
use crate::network::{ConnectionRecord, Network};

/// Connection models by name
pub type ConnectionModels = BTreeMap<String, ParamChain>;

/// A resolved connection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    /// Source layer name (expanded)
    pub source_layer: String,
    /// Target layer name
    pub target_layer: String,
    /// Instance params over model defaults, with `sources`, `targets`,
    /// `mask`, `kernel` and `weights` resolved
    pub params: ParamChain,
}

/// Spatial mask of a connection
#[derive(Debug, Clone, PartialEq)]
pub enum Mask {
    /// `{circular: {radius, ...}}`
    Circular(ParamMap),
    /// `{rectangular: {lower_left: [..], upper_right: [..]}}`
    Rectangular(ParamMap),
}

impl Mask {
    /// Read a mask mapping with exactly one shape key
    pub fn from_value(entity: &str, value: &Value) -> Result<Self> {
        let (shape, body) = single_entry(entity, "mask", value)?;
        match shape.as_str() {
            "circular" => Ok(Mask::Circular(body.clone())),
            "rectangular" => Ok(Mask::Rectangular(body.clone())),
            other => Err(ResolveError::format(entity, format!("unknown mask shape '{}'", other))),
        }
    }

    /// Mask with its extents multiplied by `factor`; other keys are kept
    pub fn scaled(&self, entity: &str, factor: f64) -> Result<Self> {
        match self {
            Mask::Circular(body) => {
                let mut body = body.clone();
                let radius = body
                    .get("radius")
                    .and_then(Value::as_f64)
                    .ok_or_else(|| ResolveError::format(entity, "circular mask needs a numeric 'radius'"))?;
                body.insert("radius".into(), json!(radius * factor));
                Ok(Mask::Circular(body))
            }
            Mask::Rectangular(body) => {
                let body = body
                    .iter()
                    .map(|(key, bound)| Ok((key.clone(), scale_bound(entity, key, bound, factor)?)))
                    .collect::<Result<ParamMap>>()?;
                Ok(Mask::Rectangular(body))
            }
        }
    }

    /// Back to `{shape: body}`
    pub fn to_value(&self) -> Value {
        match self {
            Mask::Circular(body) => json!({ "circular": body }),
            Mask::Rectangular(body) => json!({ "rectangular": body }),
        }
    }
}

fn scale_bound(entity: &str, key: &str, bound: &Value, factor: f64) -> Result<Value> {
    match bound {
        Value::Number(n) => n
            .as_f64()
            .map(|x| json!(x * factor))
            .ok_or_else(|| ResolveError::format(entity, format!("bad mask bound '{}'", key))),
        Value::Array(scalars) => scalars
            .iter()
            .map(|s| {
                s.as_f64().map(|x| json!(x * factor)).ok_or_else(|| {
                    ResolveError::format(entity, format!("mask bound '{}' must hold numbers", key))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        other => Err(ResolveError::format(
            entity,
            format!("mask bound '{}' must be numeric, found {}", key, type_name(other)),
        )),
    }
}

/// Connection probability kernel
#[derive(Debug, Clone, PartialEq)]
pub enum Kernel {
    /// Bare number, left untouched by scaling
    Constant(Value),
    /// `{gaussian: {sigma, ...}}`
    Gaussian(ParamMap),
}

impl Kernel {
    /// Read a kernel: a number or a `gaussian` mapping
    pub fn from_value(entity: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Number(_) => Ok(Kernel::Constant(value.clone())),
            Value::Object(_) => {
                let (shape, body) = single_entry(entity, "kernel", value)?;
                match shape.as_str() {
                    "gaussian" => Ok(Kernel::Gaussian(body.clone())),
                    other => Err(ResolveError::format(entity, format!("unknown kernel shape '{}'", other))),
                }
            }
            other => Err(ResolveError::format(
                entity,
                format!("kernel must be a number or a mapping, found {}", type_name(other)),
            )),
        }
    }

    /// Kernel with its width multiplied by `factor`
    pub fn scaled(&self, entity: &str, factor: f64) -> Result<Self> {
        match self {
            Kernel::Constant(value) => Ok(Kernel::Constant(value.clone())),
            Kernel::Gaussian(body) => {
                let mut body = body.clone();
                let sigma = body
                    .get("sigma")
                    .and_then(Value::as_f64)
                    .ok_or_else(|| ResolveError::format(entity, "gaussian kernel needs a numeric 'sigma'"))?;
                body.insert("sigma".into(), json!(sigma * factor));
                Ok(Kernel::Gaussian(body))
            }
        }
    }

    /// Back to a plain value
    pub fn to_value(&self) -> Value {
        match self {
            Kernel::Constant(value) => value.clone(),
            Kernel::Gaussian(body) => json!({ "gaussian": body }),
        }
    }
}

fn single_entry<'a>(entity: &str, what: &str, value: &'a Value) -> Result<(&'a String, &'a ParamMap)> {
    let map = value.as_object().ok_or_else(|| {
        ResolveError::format(entity, format!("{} must be a mapping, found {}", what, type_name(value)))
    })?;
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some((shape, Value::Object(body))), None) => Ok((shape, body)),
        (Some((shape, _)), None) => Err(ResolveError::format(
            entity,
            format!("{} '{}' parameters must be a mapping", what, shape),
        )),
        _ => Err(ResolveError::format(
            entity,
            format!("{} must have exactly one shape key, found {}", what, map.len()),
        )),
    }
}

/// Receptive-field factor: `target.rf_scale_factor * source.visSize / (source.size - 1)`
pub fn rf_factor(entity: &str, source: &ParamChain, target: &ParamChain) -> Result<f64> {
    let size = source.lookup_f64("size")?;
    if size <= 1.0 {
        return Err(ResolveError::format(
            entity,
            format!("source layer size must be greater than 1, found {}", size),
        ));
    }
    Ok(target.lookup_f64("rf_scale_factor")? * source.lookup_f64("visSize")? / (size - 1.0))
}

/// Flatten the connection model tree
pub fn connection_models(tree: &TreeNode, keys: &TreeKeys) -> Result<ConnectionModels> {
    Ok(traverse(tree, keys)?.into_iter().collect())
}

fn scale_input_weights(params: &ParamChain) -> Result<bool> {
    match params.get("scale_input_weights") {
        None | Some(Value::Null) => Ok(false),
        Some(_) => Ok(params.lookup_bool("scale_input_weights")?),
    }
}

fn model<'a>(models: &'a ConnectionModels, record: &ConnectionRecord) -> Result<&'a ParamChain> {
    models
        .get(&record.connection)
        .ok_or_else(|| ResolveError::UnknownConnectionModel {
            model: record.connection.clone(),
            referrer: record.describe(),
        })
}

fn layer<'a>(layers: &'a LayerMap, name: &str, record: &ConnectionRecord) -> Result<&'a ParamChain> {
    layers
        .get(name)
        .map(|l| &l.params)
        .ok_or_else(|| ResolveError::UnknownLayer {
            layer: name.to_string(),
            referrer: record.describe(),
        })
}

/// Replicate connections whose source layer is expanded. `flat_layers` is
/// the non-expanded layer view. With `scale_input_weights` set on the source
/// layer, each replica's weight is the model's base weight divided by the
/// number of replicas.
pub fn expand_connections(
    records: &[ConnectionRecord],
    models: &ConnectionModels,
    flat_layers: &LayerMap,
) -> Result<Vec<ConnectionRecord>> {
    let mut expanded = Vec::with_capacity(records.len());
    for record in records {
        let source = layer(flat_layers, &record.source_layer, record)?;
        let Some(filters) = FilterSpec::of_layer(&record.source_layer, source)? else {
            expanded.push(record.clone());
            continue;
        };

        let names = filters.expanded_names(&record.source_layer)?;
        let mut base = record.clone();
        if scale_input_weights(source)? {
            let weight = model(models, record)?.lookup_f64("weights")? / names.len() as f64;
            base.params.insert("weights".into(), json!(weight));
        }
        debug!("{} replicated over {} source layers", record.describe(), names.len());
        expanded.extend(names.into_iter().map(|name| ConnectionRecord {
            source_layer: name,
            ..base.clone()
        }));
    }
    Ok(expanded)
}

/// Resolve one (already expanded) connection against the expanded layers
pub fn resolve_connection(
    record: &ConnectionRecord,
    models: &ConnectionModels,
    layers: &LayerMap,
) -> Result<Connection> {
    let entity = record.describe();
    let source = layer(layers, &record.source_layer, record)?;
    let target = layer(layers, &record.target_layer, record)?;
    let params = model(models, record)?.new_child(record.params.clone());

    let factor = rf_factor(&entity, source, target)?;
    let mask = Mask::from_value(&entity, params.lookup("mask")?)?.scaled(&entity, factor)?;
    let kernel = Kernel::from_value(&entity, params.lookup("kernel")?)?.scaled(&entity, factor)?;
    let weights = params.lookup_f64("weights")? * source.lookup_f64("weight_gain")?;

    let mut resolved = ParamMap::new();
    resolved.insert("sources".into(), json!({ "model": record.source_population }));
    resolved.insert("targets".into(), json!({ "model": record.target_population }));
    resolved.insert("mask".into(), mask.to_value());
    resolved.insert("kernel".into(), kernel.to_value());
    resolved.insert("weights".into(), json!(weights));

    Ok(Connection {
        source_layer: record.source_layer.clone(),
        target_layer: record.target_layer.clone(),
        params: params.new_child(resolved),
    })
}

/// Expand then resolve every connection of `network`
pub fn resolve_connections(
    network: &Network,
    flat_layers: &LayerMap,
    layers: &LayerMap,
) -> Result<Vec<Connection>> {
    let models = connection_models(&network.connection_models, &network.keys)?;
    expand_connections(&network.connections, &models, flat_layers)?
        .iter()
        .map(|record| resolve_connection(record, &models, layers))
        .collect()
}
