//! Conditions to filter compilation
//!
//! The compiler translates the same [`Conditions`] the in-memory matcher
//! evaluates into a native [`Filter`], so that for every record `r`:
//!
//! ```text
//! matches(r, conditions) == compile(conditions).evaluate(r)
//! ```
//!
//! Where a condition cannot be expressed with that guarantee, compilation
//! fails with [`CompileError::UnsupportedConditionShape`] rather than
//! producing a filter that over- or under-matches.

use serde::{Deserialize, Serialize};
use tracing::debug;
use warrant_condition::{ConditionNode, Conditions, Membership};

use crate::{CompileError, CompiledFilter, Filter, Predicate};

/// Filter features a store can execute.
///
/// Exact matches and membership sets are always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Whether the store supports [`Predicate::Range`]
    pub ranges: bool,
    /// Whether the store supports [`Predicate::Matches`] over embedded
    /// records and lists of records
    pub embedded: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            ranges: true,
            embedded: true,
        }
    }
}

impl Capabilities {
    /// A store with only exact matches and membership sets.
    pub fn minimal() -> Self {
        Self {
            ranges: false,
            embedded: false,
        }
    }
}

/// Compiles conditions for a store with the given [`Capabilities`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    capabilities: Capabilities,
}

impl Compiler {
    /// Creates a compiler targeting a store with `capabilities`.
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    /// The capabilities this compiler targets.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Compiles the conditions of the relevant rule.
    ///
    /// - `None` (no relevant rule) compiles to [`CompiledFilter::MatchNone`].
    /// - Empty conditions compile to [`CompiledFilter::MatchAll`].
    /// - Anything else compiles to a [`CompiledFilter::Native`] filter with
    ///   one clause per attribute.
    pub fn compile(
        &self,
        conditions: Option<&Conditions>,
    ) -> Result<CompiledFilter, CompileError> {
        let compiled = match conditions {
            None => CompiledFilter::MatchNone,
            Some(conditions) if conditions.is_empty() => CompiledFilter::MatchAll,
            Some(conditions) => CompiledFilter::Native(self.translate(conditions, None)?),
        };
        debug!(filter = %compiled, "Compiled conditions");
        Ok(compiled)
    }

    fn translate(
        &self,
        conditions: &Conditions,
        parent: Option<&str>,
    ) -> Result<Filter, CompileError> {
        let mut filter = Filter::new();
        for (name, node) in conditions.iter() {
            let path = match parent {
                Some(parent) => format!("{parent}.{name}"),
                None => name.to_string(),
            };
            filter.push(name, self.predicate(node, &path)?);
        }
        Ok(filter)
    }

    fn predicate(&self, node: &ConditionNode, path: &str) -> Result<Predicate, CompileError> {
        match node {
            ConditionNode::Equals(value) => Ok(Predicate::Eq(value.clone())),
            ConditionNode::OneOf(Membership::Set(values)) => Ok(Predicate::In(values.clone())),
            ConditionNode::OneOf(Membership::Range(range)) => {
                if !self.capabilities.ranges {
                    return Err(CompileError::unsupported(
                        path,
                        "store does not support range predicates",
                    ));
                }
                Ok(Predicate::Range(range.clone()))
            }
            ConditionNode::Nested(conditions) => {
                if !self.capabilities.embedded {
                    return Err(CompileError::unsupported(
                        path,
                        "store does not support matching embedded records",
                    ));
                }
                if conditions.is_empty() {
                    return Err(CompileError::unsupported(
                        path,
                        "empty nested conditions depend on whether the attribute is a collection",
                    ));
                }
                Ok(Predicate::Matches(self.translate(conditions, Some(path))?))
            }
        }
    }
}

/// Compiles `conditions` for a store with default [`Capabilities`].
pub fn compile(conditions: Option<&Conditions>) -> Result<CompiledFilter, CompileError> {
    Compiler::default().compile(conditions)
}
