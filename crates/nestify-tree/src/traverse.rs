//! Depth-first traversal collecting inherited parameters for every leaf

use log::trace;

use crate::chain::ParamChain;
use crate::error::{Result, TreeError};
use crate::node::{join_path, TreeKeys, TreeNode};

/// Walk `tree` and return `(leaf_name, chain)` for every leaf, in declaration
/// order. Each chain stacks the `params` of the leaf and of all its ancestors,
/// the leaf's own mapping first.
///
/// Chains are persistent: a node extends its parent's chain into a new value
/// before descending, so parameters set on one branch are never visible from a
/// sibling branch.
///
/// An empty tree has no leaves.
pub fn traverse(tree: &TreeNode, keys: &TreeKeys) -> Result<Vec<(String, ParamChain)>> {
    let mut leaves = Vec::new();
    if tree.is_empty() {
        return Ok(leaves);
    }
    walk(tree, keys, &ParamChain::new(), "", &mut leaves)?;
    Ok(leaves)
}

fn walk(
    node: &TreeNode,
    keys: &TreeKeys,
    inherited: &ParamChain,
    path: &str,
    leaves: &mut Vec<(String, ParamChain)>,
) -> Result<()> {
    let chain = match node.params(keys).map_err(|e| at_path(e, path))? {
        Some(params) if !params.is_empty() => inherited.with_overrides(params),
        _ => inherited.clone(),
    };

    if node.is_leaf() {
        let name = node.name(keys).ok_or_else(|| TreeError::MissingName {
            path: path.to_string(),
            name_key: keys.name.clone(),
        })?;
        trace!("leaf '{}' at '{}' ({} mappings)", name, path, chain.depth());
        leaves.push((name.to_string(), chain));
        return Ok(());
    }

    for (key, child) in node.children() {
        walk(child, keys, &chain, &join_path(path, key), leaves)?;
    }
    Ok(())
}

fn at_path(err: TreeError, path: &str) -> TreeError {
    match err {
        TreeError::WrongType { key, expected, found } => TreeError::malformed(
            path,
            format!("'{}' must be a {}, found {}", key, expected, found),
        ),
        other => other,
    }
}
