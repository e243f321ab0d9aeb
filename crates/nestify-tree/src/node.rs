//! Configuration tree nodes.
//!
//! A node carries named fields and an ordered list of children. Each field is
//! explicitly tagged as a scalar or as a mapping; mappings are held as
//! [`ParamChain`]s so that merged trees can stack several of them.

use serde::{Deserialize, Serialize};

use crate::chain::ParamChain;
use crate::error::{Result, TreeError};
use crate::{ParamMap, Value};

/// Names of the structural keys of a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeKeys {
    /// Key holding a node's local parameters
    pub params: String,
    /// Key holding a node's children
    pub children: String,
    /// Key holding a leaf's name
    pub name: String,
}

impl Default for TreeKeys {
    fn default() -> Self {
        Self {
            params: "params".to_string(),
            children: "children".to_string(),
            name: "name".to_string(),
        }
    }
}

/// Value stored under a node field
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Anything that is not a mapping
    Scalar(Value),
    /// A mapping (possibly a stack of mappings after merging)
    Mapping(ParamChain),
}

impl Field {
    /// Tag a raw value
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Field::Mapping(ParamChain::from_map(map)),
            other => Field::Scalar(other),
        }
    }

    /// Null scalars and mappings without keys count as undefined
    pub fn is_empty(&self) -> bool {
        match self {
            Field::Scalar(v) => v.is_null(),
            Field::Mapping(chain) => chain.is_empty(),
        }
    }

    /// Scalar payload, if any
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Field::Scalar(v) => Some(v),
            Field::Mapping(_) => None,
        }
    }

    /// Mapping payload, if any
    pub fn as_mapping(&self) -> Option<&ParamChain> {
        match self {
            Field::Scalar(_) => None,
            Field::Mapping(chain) => Some(chain),
        }
    }

    /// Back to a plain value (mappings are flattened)
    pub fn to_value(&self) -> Value {
        match self {
            Field::Scalar(v) => v.clone(),
            Field::Mapping(chain) => Value::Object(chain.to_map()),
        }
    }
}

/// Node of a configuration tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeNode {
    fields: Vec<(String, Field)>,
    children: Vec<(String, TreeNode)>,
}

impl TreeNode {
    /// Create an empty node
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a node from a JSON-shaped value. `null` reads as an empty node.
    pub fn from_value(value: &Value, keys: &TreeKeys) -> Result<Self> {
        Self::parse(value, keys, "")
    }

    /// Read a mapping of named subtrees as the children of an anonymous root
    pub fn forest(value: &Value, keys: &TreeKeys) -> Result<Self> {
        let mut root = TreeNode::new();
        match value {
            Value::Null => {}
            Value::Object(subtrees) => {
                for (key, subtree) in subtrees {
                    root.children
                        .push((key.clone(), Self::parse(subtree, keys, key)?));
                }
            }
            other => {
                return Err(TreeError::malformed(
                    "",
                    format!("expected a mapping of subtrees, found {}", crate::type_name(other)),
                ))
            }
        }
        Ok(root)
    }

    fn parse(value: &Value, keys: &TreeKeys, path: &str) -> Result<Self> {
        let object = match value {
            Value::Null => return Ok(TreeNode::new()),
            Value::Object(object) => object,
            other => {
                return Err(TreeError::malformed(
                    path,
                    format!("expected a mapping, found {}", crate::type_name(other)),
                ))
            }
        };

        let mut node = TreeNode::new();
        for (key, field) in object {
            if *key != keys.children {
                node.fields.push((key.clone(), Field::from_value(field.clone())));
                continue;
            }
            match field {
                Value::Null => {}
                Value::Object(children) => {
                    for (child_key, child) in children {
                        let child_path = join_path(path, child_key);
                        node.children
                            .push((child_key.clone(), Self::parse(child, keys, &child_path)?));
                    }
                }
                other => {
                    return Err(TreeError::malformed(
                        path,
                        format!(
                            "'{}' must be a mapping, found {}",
                            keys.children,
                            crate::type_name(other)
                        ),
                    ))
                }
            }
        }
        Ok(node)
    }

    /// Append a child
    pub fn with_child(mut self, key: impl Into<String>, child: TreeNode) -> Self {
        self.children.push((key.into(), child));
        self
    }

    /// Set a field in place (replacing an existing one)
    pub fn set_field(&mut self, key: impl Into<String>, field: Field) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = field,
            None => self.fields.push((key, field)),
        }
    }

    /// Field under `key`
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[(String, Field)] {
        &self.fields
    }

    /// Children in declaration order
    pub fn children(&self) -> &[(String, TreeNode)] {
        &self.children
    }

    /// Child under `key`
    pub fn child(&self, key: &str) -> Option<&TreeNode> {
        self.children.iter().find(|(k, _)| k == key).map(|(_, c)| c)
    }

    /// A node without children is a leaf
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// A node with neither fields nor children
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.children.is_empty()
    }

    /// Local parameters. Fails when the params field holds a non-null scalar.
    pub fn params(&self, keys: &TreeKeys) -> Result<Option<&ParamChain>> {
        match self.field(&keys.params) {
            None | Some(Field::Scalar(Value::Null)) => Ok(None),
            Some(Field::Mapping(chain)) => Ok(Some(chain)),
            Some(Field::Scalar(other)) => Err(TreeError::WrongType {
                key: keys.params.clone(),
                expected: "mapping",
                found: crate::type_name(other),
            }),
        }
    }

    /// Leaf name, when present and a string
    pub fn name(&self, keys: &TreeKeys) -> Option<&str> {
        self.field(&keys.name)
            .and_then(Field::as_scalar)
            .and_then(Value::as_str)
    }

    /// Back to a JSON-shaped value
    pub fn to_value(&self, keys: &TreeKeys) -> Value {
        let mut out = ParamMap::new();
        for (key, field) in &self.fields {
            out.insert(key.clone(), field.to_value());
        }
        if !self.children.is_empty() {
            let children = self
                .children
                .iter()
                .map(|(k, c)| (k.clone(), c.to_value(keys)))
                .collect();
            out.insert(keys.children.clone(), Value::Object(children));
        }
        Value::Object(out)
    }
}

pub(crate) fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}/{}", parent, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_fields_and_ordered_children() {
        let keys = TreeKeys::default();
        let tree = TreeNode::from_value(
            &json!({
                "params": {"x": 1},
                "children": {
                    "zeta": {"name": "z"},
                    "alpha": {"name": "a"}
                }
            }),
            &keys,
        )
        .unwrap();

        assert!(!tree.is_leaf());
        let order: Vec<&str> = tree.children().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(order, vec!["zeta", "alpha"]);
        assert_eq!(tree.params(&keys).unwrap().unwrap().lookup_f64("x").unwrap(), 1.0);
        assert_eq!(tree.child("alpha").unwrap().name(&keys), Some("a"));
    }

    #[test]
    fn non_mapping_children_is_malformed() {
        let err = TreeNode::from_value(&json!({"children": [1, 2]}), &TreeKeys::default())
            .unwrap_err();
        assert!(matches!(err, TreeError::Malformed { .. }));
    }

    #[test]
    fn custom_keys_are_honoured() {
        let keys = TreeKeys {
            params: "p".into(),
            children: "sub".into(),
            name: "id".into(),
        };
        let tree = TreeNode::from_value(&json!({"p": {"k": 2}, "sub": {"a": {"id": "leaf"}}}), &keys)
            .unwrap();
        assert_eq!(tree.child("a").unwrap().name(&keys), Some("leaf"));
        assert!(tree.params(&keys).unwrap().is_some());
    }

    #[test]
    fn value_round_trip_keeps_shape() {
        let keys = TreeKeys::default();
        let raw = json!({"params": {"x": 1}, "children": {"a": {"name": "a"}}});
        let tree = TreeNode::from_value(&raw, &keys).unwrap();
        assert_eq!(tree.to_value(&keys), raw);
    }
}
