//! Validation of parameter mappings and child sets

use log::debug;
use nestify_tree::ParamMap;
use thiserror::Error;

/// Parameter validation errors. Each names the offending entity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A reserved key is present
    #[error("Invalid parameters for `{name}`: reserved keys present: {keys:?}")]
    Reserved {
        /// Entity name
        name: String,
        /// Reserved keys found
        keys: Vec<String>,
    },

    /// A mandatory key is missing
    #[error("Invalid parameters for `{name}`: missing mandatory keys: {keys:?}")]
    Missing {
        /// Entity name
        name: String,
        /// Missing keys
        keys: Vec<String>,
    },

    /// A key is neither mandatory nor optional
    #[error("Invalid parameters for `{name}`: unrecognized keys: {keys:?} (recognized: {recognized:?})")]
    Unrecognized {
        /// Entity name
        name: String,
        /// Unrecognized keys
        keys: Vec<String>,
        /// Mandatory and optional keys
        recognized: Vec<String>,
    },

    /// Mandatory child subtrees are missing
    #[error("Invalid children for `{name}`: missing subtrees: {children:?}")]
    MissingChildren {
        /// Node name
        name: String,
        /// Missing child keys
        children: Vec<String>,
    },

    /// Unexpected child subtrees are present
    #[error("Invalid children for `{name}`: unexpected subtrees: {children:?}")]
    UnexpectedChildren {
        /// Node name
        name: String,
        /// Unexpected child keys
        children: Vec<String>,
    },
}

/// Check `params` and fill in defaults.
///
/// - `reserved`: keys that must not appear
/// - `mandatory`: keys that must appear
/// - `optional`: recognized keys with their default value. When given, any
///   key that is neither mandatory nor optional is rejected, and missing
///   optional keys are added with their default.
pub fn validate(
    name: &str,
    params: &ParamMap,
    reserved: Option<&[&str]>,
    mandatory: Option<&[&str]>,
    optional: Option<&ParamMap>,
) -> Result<ParamMap, ValidationError> {
    if let Some(reserved) = reserved {
        let found: Vec<String> = params
            .keys()
            .filter(|k| reserved.contains(&k.as_str()))
            .cloned()
            .collect();
        if !found.is_empty() {
            return Err(ValidationError::Reserved {
                name: name.to_string(),
                keys: found,
            });
        }
    }

    let mandatory = mandatory.unwrap_or(&[]);
    let missing: Vec<String> = mandatory
        .iter()
        .filter(|k| !params.contains_key(**k))
        .map(|k| k.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::Missing {
            name: name.to_string(),
            keys: missing,
        });
    }

    let Some(optional) = optional else {
        return Ok(params.clone());
    };

    let unrecognized: Vec<String> = params
        .keys()
        .filter(|k| !mandatory.contains(&k.as_str()) && !optional.contains_key(k.as_str()))
        .cloned()
        .collect();
    if !unrecognized.is_empty() {
        let recognized = mandatory
            .iter()
            .map(|k| k.to_string())
            .chain(optional.keys().cloned())
            .collect();
        return Err(ValidationError::Unrecognized {
            name: name.to_string(),
            keys: unrecognized,
            recognized,
        });
    }

    let mut out = params.clone();
    for (key, default) in optional {
        if !out.contains_key(key) {
            debug!("{}: default value for '{}': {}", name, key, default);
            out.insert(key.clone(), default.clone());
        }
    }
    Ok(out)
}

/// Check that a node has exactly the `mandatory` children. `None` skips the check.
pub fn validate_children(
    name: &str,
    children: &[&str],
    mandatory: Option<&[&str]>,
) -> Result<(), ValidationError> {
    let Some(mandatory) = mandatory else {
        return Ok(());
    };

    let missing: Vec<String> = mandatory
        .iter()
        .filter(|c| !children.contains(*c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingChildren {
            name: name.to_string(),
            children: missing,
        });
    }

    let extra: Vec<String> = children
        .iter()
        .filter(|c| !mandatory.contains(*c))
        .map(|c| c.to_string())
        .collect();
    if !extra.is_empty() {
        return Err(ValidationError::UnexpectedChildren {
            name: name.to_string(),
            children: extra,
        });
    }
    Ok(())
}
