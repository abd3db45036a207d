//! Error types for policy evaluation

use thiserror::Error;
use warrant_condition::AttributeError;
use warrant_store::CompileError;

/// Errors that can occur while enforcing a policy
#[derive(Error, Debug)]
pub enum PolicyError {
    /// A resource failed to produce an attribute named by a condition
    #[error(transparent)]
    Attribute(#[from] AttributeError),

    /// The relevant conditions cannot be expressed as a store filter
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The store failed to execute a filter
    #[error("Store error: {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),

    /// Policy settings could not be read
    #[error("Invalid policy settings: {0}")]
    Settings(#[from] serde_json::Error),
}

impl PolicyError {
    /// Wraps a store failure.
    pub fn store(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store(Box::new(error))
    }
}
