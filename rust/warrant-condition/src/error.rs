//! Error types for condition trees and attribute access

use crate::ValueType;
use thiserror::Error;

/// Errors raised while reading an attribute from a [`Resource`].
///
/// The matcher never swallows these: an attribute that cannot be read is the
/// resource's own failure and is surfaced to the caller as-is.
///
/// [`Resource`]: crate::Resource
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributeError {
    /// The resource does not expose an attribute with this name
    #[error("Resource has no attribute {name:?}")]
    Missing {
        /// Name of the requested attribute
        name: String,
    },

    /// Attributes were requested from a value that does not have any
    #[error("Cannot read attribute {name:?} from a value of type {found}")]
    NotAResource {
        /// Name of the requested attribute
        name: String,
        /// Type of the value that was asked for the attribute
        found: ValueType,
    },

    /// The host resource failed to produce the attribute
    #[error("Attribute {name:?} could not be read: {reason}")]
    Unreadable {
        /// Name of the requested attribute
        name: String,
        /// Host supplied description of the failure
        reason: String,
    },
}

impl AttributeError {
    /// Shorthand for [`AttributeError::Missing`].
    pub fn missing(name: impl Into<String>) -> Self {
        Self::Missing { name: name.into() }
    }
}

/// Errors raised while building condition trees from their declarative form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    /// The declarative form does not describe a valid condition tree
    #[error("Malformed condition: {reason}")]
    Malformed {
        /// What was wrong with the input
        reason: String,
    },
}

impl ConditionError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ConditionError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}
