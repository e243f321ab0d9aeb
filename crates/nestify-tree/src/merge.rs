//! Structural merge of several configuration trees.
//!
//! Policy, applied at every depth:
//! - empty trees are dropped; a single remaining tree is returned as is
//! - for each field key in any tree, the undefined values (null, empty
//!   mapping) are dropped; if more than one value remains and all are
//!   mappings they are stacked into one chain in scan order, otherwise the
//!   first remaining value wins
//! - children are merged recursively per child key
//!
//! Keys and children keep the order in which they are first seen.

use crate::chain::ParamChain;
use crate::node::{Field, TreeNode};

/// Merge `trees` into one, earlier trees taking precedence
pub fn merge<'a>(trees: impl IntoIterator<Item = &'a TreeNode>) -> TreeNode {
    let trees: Vec<&TreeNode> = trees.into_iter().filter(|t| !t.is_empty()).collect();
    match trees.as_slice() {
        [] => return TreeNode::new(),
        [single] => return (*single).clone(),
        _ => {}
    }

    let mut merged = TreeNode::new();

    let mut field_keys: Vec<&str> = Vec::new();
    for tree in &trees {
        for (key, _) in tree.fields() {
            if !field_keys.contains(&key.as_str()) {
                field_keys.push(key);
            }
        }
    }
    for key in field_keys {
        let values: Vec<&Field> = trees.iter().filter_map(|t| t.field(key)).collect();
        merged.set_field(key, combine_fields(&values));
    }

    let mut child_keys: Vec<&str> = Vec::new();
    for tree in &trees {
        for (key, _) in tree.children() {
            if !child_keys.contains(&key.as_str()) {
                child_keys.push(key);
            }
        }
    }
    for key in child_keys {
        let subtrees: Vec<&TreeNode> = trees.iter().filter_map(|t| t.child(key)).collect();
        merged = merged.with_child(key, merge(subtrees));
    }

    merged
}

fn combine_fields(values: &[&Field]) -> Field {
    let defined: Vec<&Field> = values.iter().copied().filter(|f| !f.is_empty()).collect();
    match defined.as_slice() {
        [] => Field::Mapping(ParamChain::new()),
        [only] => (*only).clone(),
        [first, ..] => {
            let chains: Option<Vec<&ParamChain>> =
                defined.iter().map(|f| f.as_mapping()).collect();
            match chains {
                Some(chains) => Field::Mapping(ParamChain::concat(chains)),
                None => (*first).clone(),
            }
        }
    }
}
