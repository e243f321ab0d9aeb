//! Filter dimensions and name expansion.
//!
//! A layer whose params define `filters` is replicated once per combination of
//! its non-degenerate filter dimensions. Replicas share the layer's params and
//! only differ by name suffix, e.g. `_sf1o2`.

use nestify_tree::{type_name, ParamChain, TreeError, Value};

use crate::error::{ResolveError, Result};
use crate::validation::validate;

/// Params key holding a layer's filter spec
pub const FILTERS_KEY: &str = "filters";

/// Filter dimensions of a layer
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    /// (dimension, cardinality) in declaration order
    pub dimensions: Vec<(String, u64)>,
    /// (dimension, short tag)
    pub suffixes: Vec<(String, String)>,
}

impl FilterSpec {
    /// Filter spec of a layer, if its params define one
    pub fn of_layer(layer: &str, params: &ParamChain) -> Result<Option<Self>> {
        match params.get(FILTERS_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Self::from_value(layer, value).map(Some),
        }
    }

    /// Read a `{dimensions: {name: n}, suffixes: {name: tag}}` mapping
    pub fn from_value(layer: &str, value: &Value) -> Result<Self> {
        let entity = format!("{} filters", layer);
        let raw = value.as_object().ok_or_else(|| {
            ResolveError::format(&entity, format!("expected a mapping, found {}", type_name(value)))
        })?;
        let raw = validate(&entity, raw, None, Some(&["dimensions", "suffixes"][..]), None)?;

        let mapping = |key: &str| {
            raw.get(key).and_then(Value::as_object).ok_or_else(|| {
                ResolveError::format(&entity, format!("'{}' must be a mapping", key))
            })
        };

        let dimensions = mapping("dimensions")?
            .iter()
            .map(|(dim, n)| {
                n.as_u64().map(|n| (dim.clone(), n)).ok_or_else(|| {
                    ResolveError::format(
                        &entity,
                        format!("cardinality of '{}' must be a non-negative integer", dim),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let suffixes = mapping("suffixes")?
            .iter()
            .map(|(dim, tag)| {
                tag.as_str().map(|t| (dim.clone(), t.to_string())).ok_or_else(|| {
                    ResolveError::format(&entity, format!("suffix of '{}' must be a string", dim))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            dimensions,
            suffixes,
        })
    }

    fn tag(&self, dim: &str) -> Result<&str> {
        self.suffixes
            .iter()
            .find(|(d, _)| d == dim)
            .map(|(_, t)| t.as_str())
            .ok_or_else(|| TreeError::UnresolvedKey(format!("{}.suffixes.{}", FILTERS_KEY, dim)).into())
    }

    /// One suffix per combination of non-degenerate dimension values; the
    /// first dimension varies slowest. `[""]` when no dimension has more than
    /// one value.
    pub fn suffixes(&self) -> Result<Vec<String>> {
        let mut axes = Vec::new();
        for (dim, n) in self.dimensions.iter().filter(|(_, n)| *n > 1) {
            let tag = self.tag(dim)?;
            axes.push((1..=*n).map(|i| format!("{}{}", tag, i)).collect::<Vec<_>>());
        }
        if axes.is_empty() {
            return Ok(vec![String::new()]);
        }
        Ok(combine_strings(&axes)
            .into_iter()
            .map(|s| format!("_{}", s))
            .collect())
    }

    /// Names of the replicas of `base`
    pub fn expanded_names(&self, base: &str) -> Result<Vec<String>> {
        Ok(self
            .suffixes()?
            .into_iter()
            .map(|suffix| format!("{}{}", base, suffix))
            .collect())
    }
}

/// Cartesian product of string lists, concatenated, first list slowest
pub fn combine_strings(axes: &[Vec<String>]) -> Vec<String> {
    axes.iter().fold(vec![String::new()], |acc, axis| {
        acc.iter()
            .flat_map(|prefix| axis.iter().map(move |s| format!("{}{}", prefix, s)))
            .collect()
    })
}

/// Names under which `name` is registered: its replicas if `params` define a
/// filter spec, `name` alone otherwise
pub fn expanded_names(name: &str, params: &ParamChain) -> Result<Vec<String>> {
    match FilterSpec::of_layer(name, params)? {
        Some(spec) => spec.expanded_names(name),
        None => Ok(vec![name.to_string()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(v: Value) -> FilterSpec {
        FilterSpec::from_value("retina", &v).unwrap()
    }

    #[test]
    fn degenerate_dimensions_are_skipped() {
        let s = spec(json!({
            "dimensions": {"sf": 2, "o": 2, "sign": 1},
            "suffixes": {"sf": "sf", "o": "o", "sign": "s"}
        }));
        assert_eq!(
            s.suffixes().unwrap(),
            vec!["_sf1o1", "_sf1o2", "_sf2o1", "_sf2o2"]
        );
    }

    #[test]
    fn all_degenerate_gives_single_empty_suffix() {
        let s = spec(json!({
            "dimensions": {"sf": 1, "o": 1},
            "suffixes": {"sf": "sf", "o": "o"}
        }));
        assert_eq!(s.suffixes().unwrap(), vec![String::new()]);
        assert_eq!(s.expanded_names("retina").unwrap(), vec!["retina"]);
    }

    #[test]
    fn declaration_order_decides_nesting() {
        let s = spec(json!({
            "dimensions": {"o": 2, "sf": 3},
            "suffixes": {"sf": "sf", "o": "o"}
        }));
        let names = s.expanded_names("in").unwrap();
        assert_eq!(names.len(), 6);
        assert_eq!(names[0], "in_o1sf1");
        assert_eq!(names[1], "in_o1sf2");
        assert_eq!(names[5], "in_o2sf3");
    }

    #[test]
    fn missing_tag_is_unresolved() {
        let s = spec(json!({"dimensions": {"o": 2}, "suffixes": {}}));
        assert_eq!(
            s.suffixes().unwrap_err(),
            ResolveError::Tree(TreeError::UnresolvedKey("filters.suffixes.o".into()))
        );
    }

    #[test]
    fn missing_dimensions_fails_validation() {
        let err = FilterSpec::from_value("retina", &json!({"suffixes": {}})).unwrap_err();
        assert!(matches!(err, ResolveError::Validation(_)));
    }
}
