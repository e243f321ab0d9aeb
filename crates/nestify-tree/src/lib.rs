#![doc = "Parameter trees for nestify - inheritance-based network descriptions\n\nBuilding blocks:\n- ParamChain: ordered stack of parameter mappings, most specific first\n- TreeNode: explicit tagged tree node (scalar fields, mapping fields, ordered children)\n- traverse: depth-first walk yielding (leaf name, inherited chain) pairs\n- merge: structural merge of independently authored trees\n\nThe resolution engine that turns these into simulator-ready layers and\nconnections lives in nestify-resolve.\n"]
#![warn(missing_docs)]

pub mod chain;
pub mod error;
pub mod merge;
pub mod node;
pub mod traverse;

pub use chain::ParamChain;
pub use error::{Result, TreeError};
pub use merge::merge;
pub use node::{Field, TreeKeys, TreeNode};
pub use traverse::traverse;

/// Parameter value (JSON-shaped, declaration order preserved)
pub use serde_json::Value;

/// A single parameter mapping
pub type ParamMap = serde_json::Map<String, Value>;

/// Short type name of a value, used in error messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
