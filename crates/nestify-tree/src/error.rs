//! Error types for tree handling

use thiserror::Error;

/// Result type for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors raised while reading, walking or querying parameter trees
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// Key defined in none of the chain's mappings
    #[error("Unresolved key '{0}'")]
    UnresolvedKey(String),

    /// Key present but holding a value of the wrong type
    #[error("Bad value for '{key}': expected {expected}, found {found}")]
    WrongType {
        /// Looked-up key
        key: String,
        /// Expected type
        expected: &'static str,
        /// Type actually found
        found: &'static str,
    },

    /// Leaf node without a name field
    #[error("Leaf node at '{path}' has no '{name_key}' field")]
    MissingName {
        /// Path of the leaf from the tree root
        path: String,
        /// Name key that was expected
        name_key: String,
    },

    /// Structurally invalid tree
    #[error("Malformed tree at '{path}': {reason}")]
    Malformed {
        /// Path of the offending node
        path: String,
        /// Reason
        reason: String,
    },
}

impl TreeError {
    /// Create a malformed-tree error
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
