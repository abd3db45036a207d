//! Error types for filter compilation

use thiserror::Error;

/// Errors that can occur while compiling conditions into a store filter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The condition at `path` cannot be expressed losslessly by the target
    /// store. Callers may fall back to fetching everything and matching in
    /// memory.
    #[error("Condition on {path:?} cannot be expressed as a store filter: {reason}")]
    UnsupportedConditionShape {
        /// Dotted path of the offending attribute
        path: String,
        /// Why the shape is unsupported
        reason: String,
    },
}

impl CompileError {
    pub(crate) fn unsupported(path: &str, reason: impl Into<String>) -> Self {
        Self::UnsupportedConditionShape {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
