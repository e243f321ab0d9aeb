//! Error types for network resolution

use nestify_tree::TreeError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Result type for resolution
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors raised while resolving a network. Resolution stops at the first one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// Tree structure or parameter lookup error (includes unresolved keys)
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Malformed parameter shape
    #[error("Format error in {entity}: {reason}")]
    Format {
        /// Entity being resolved (layer, connection, ...)
        entity: String,
        /// Reason
        reason: String,
    },

    /// Parameter validation failure
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Reference to a layer that does not exist
    #[error("Unknown layer '{layer}' referenced by {referrer}")]
    UnknownLayer {
        /// Missing layer
        layer: String,
        /// Referring entity
        referrer: String,
    },

    /// Reference to a connection model that does not exist
    #[error("Unknown connection model '{model}' referenced by {referrer}")]
    UnknownConnectionModel {
        /// Missing model
        model: String,
        /// Referring entity
        referrer: String,
    },
}

impl ResolveError {
    /// Create a format error
    pub fn format(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            entity: entity.into(),
            reason: reason.into(),
        }
    }
}
