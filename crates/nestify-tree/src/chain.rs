//! Override chains: ordered stacks of parameter mappings.
//!
//! The first mapping is the most specific one (closest to the leaf). Lookups
//! scan front to back and stop at the first mapping defining the key.
//! Mappings are shared behind `Arc` and never mutated, so any number of
//! chains can hold the same tail.

use std::collections::HashSet;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Result, TreeError};
use crate::{type_name, ParamMap, Value};

/// Ordered stack of parameter mappings with most-specific-wins lookup
#[derive(Debug, Clone, Default)]
pub struct ParamChain {
    maps: Vec<Arc<ParamMap>>,
}

impl ParamChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self { maps: Vec::new() }
    }

    /// Chain holding a single mapping
    pub fn from_map(map: ParamMap) -> Self {
        Self {
            maps: vec![Arc::new(map)],
        }
    }

    /// Chain from mappings given most specific first
    pub fn from_maps(maps: impl IntoIterator<Item = ParamMap>) -> Self {
        Self {
            maps: maps.into_iter().map(Arc::new).collect(),
        }
    }

    /// Concatenate chains; mappings of earlier chains take precedence
    pub fn concat<'a>(chains: impl IntoIterator<Item = &'a ParamChain>) -> Self {
        let maps = chains
            .into_iter()
            .flat_map(|c| c.maps.iter().cloned())
            .collect();
        Self { maps }
    }

    /// New chain with `map` prepended as the most specific mapping.
    /// `self` is left untouched.
    pub fn new_child(&self, map: ParamMap) -> Self {
        let mut maps = Vec::with_capacity(self.maps.len() + 1);
        maps.push(Arc::new(map));
        maps.extend(self.maps.iter().cloned());
        Self { maps }
    }

    /// New chain with every mapping of `overrides` placed in front of `self`
    pub fn with_overrides(&self, overrides: &ParamChain) -> Self {
        Self::concat([overrides, self])
    }

    /// Number of stacked mappings
    pub fn depth(&self) -> usize {
        self.maps.len()
    }

    /// True when no mapping defines any key
    pub fn is_empty(&self) -> bool {
        self.maps.iter().all(|m| m.is_empty())
    }

    /// Value of the first mapping defining `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.maps.iter().find_map(|m| m.get(key))
    }

    /// Whether any mapping defines `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.maps.iter().any(|m| m.contains_key(key))
    }

    /// Like [`get`](Self::get) but failing with `UnresolvedKey`
    pub fn lookup(&self, key: &str) -> Result<&Value> {
        self.get(key)
            .ok_or_else(|| TreeError::UnresolvedKey(key.to_string()))
    }

    /// Numeric lookup
    pub fn lookup_f64(&self, key: &str) -> Result<f64> {
        let value = self.lookup(key)?;
        value.as_f64().ok_or_else(|| wrong_type(key, "number", value))
    }

    /// Non-negative integer lookup (integral floats are accepted)
    pub fn lookup_u64(&self, key: &str) -> Result<u64> {
        let value = self.lookup(key)?;
        value
            .as_u64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .ok_or_else(|| wrong_type(key, "non-negative integer", value))
    }

    /// Boolean lookup
    pub fn lookup_bool(&self, key: &str) -> Result<bool> {
        let value = self.lookup(key)?;
        value.as_bool().ok_or_else(|| wrong_type(key, "bool", value))
    }

    /// String lookup
    pub fn lookup_str(&self, key: &str) -> Result<&str> {
        let value = self.lookup(key)?;
        value.as_str().ok_or_else(|| wrong_type(key, "string", value))
    }

    /// Mapping lookup
    pub fn lookup_map(&self, key: &str) -> Result<&ParamMap> {
        let value = self.lookup(key)?;
        value.as_object().ok_or_else(|| wrong_type(key, "mapping", value))
    }

    /// Union of keys. Keys appear in the order they are first declared,
    /// scanning from the least specific mapping to the most specific one.
    pub fn keys(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for map in self.maps.iter().rev() {
            for key in map.keys() {
                if seen.insert(key.as_str()) {
                    keys.push(key.as_str());
                }
            }
        }
        keys
    }

    /// Effective (key, value) pairs, most specific value for each key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.keys()
            .into_iter()
            .filter_map(move |k| self.get(k).map(|v| (k, v)))
    }

    /// Materialize the effective flat mapping
    pub fn to_map(&self) -> ParamMap {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &Value) -> TreeError {
    TreeError::WrongType {
        key: key.to_string(),
        expected,
        found: type_name(found),
    }
}

impl PartialEq for ParamChain {
    fn eq(&self, other: &Self) -> bool {
        self.to_map() == other.to_map()
    }
}

impl From<ParamMap> for ParamChain {
    fn from(map: ParamMap) -> Self {
        Self::from_map(map)
    }
}

impl Serialize for ParamChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let keys = self.keys();
        let mut out = serializer.serialize_map(Some(keys.len()))?;
        for (k, v) in self.iter() {
            out.serialize_entry(k, v)?;
        }
        out.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> ParamMap {
        v.as_object().cloned().expect("object literal")
    }

    #[test]
    fn most_specific_mapping_wins() {
        let chain = ParamChain::from_maps([map(json!({"a": 1, "b": 2})), map(json!({"a": 3}))]);
        assert_eq!(chain.lookup("a").unwrap(), &json!(1));
        assert_eq!(chain.lookup("b").unwrap(), &json!(2));
    }

    #[test]
    fn missing_key_is_unresolved() {
        let chain = ParamChain::from_map(map(json!({"a": 1})));
        assert_eq!(
            chain.lookup("zz").unwrap_err(),
            TreeError::UnresolvedKey("zz".into())
        );
    }

    #[test]
    fn new_child_leaves_original_alone() {
        let base = ParamChain::from_map(map(json!({"x": 1})));
        let child = base.new_child(map(json!({"x": 2})));
        assert_eq!(base.lookup_f64("x").unwrap(), 1.0);
        assert_eq!(child.lookup_f64("x").unwrap(), 2.0);
        assert_eq!(child.depth(), 2);
    }

    #[test]
    fn typed_lookups_report_wrong_type() {
        let chain = ParamChain::from_map(map(json!({"size": "big", "n": 4.0})));
        let err = chain.lookup_f64("size").unwrap_err();
        assert!(matches!(err, TreeError::WrongType { expected: "number", .. }));
        assert_eq!(chain.lookup_u64("n").unwrap(), 4);
    }

    #[test]
    fn keys_are_a_union_without_duplicates() {
        let chain = ParamChain::from_maps([map(json!({"b": 1, "c": 1})), map(json!({"a": 0, "b": 0}))]);
        assert_eq!(chain.keys(), vec!["a", "b", "c"]);
        assert_eq!(chain.to_map(), map(json!({"a": 0, "b": 1, "c": 1})));
    }

    #[test]
    fn serializes_as_flat_mapping() {
        let chain = ParamChain::from_map(map(json!({"w": 1}))).new_child(map(json!({"w": 2})));
        assert_eq!(serde_json::to_value(&chain).unwrap(), json!({"w": 2}));
    }
}
