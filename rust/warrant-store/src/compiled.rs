use std::fmt::{Display, Formatter};

use warrant_condition::{Resource, ValueType};

use crate::{Filter, Predicate};

/// Name of the identity field every stored record carries.
pub const IDENTITY_FIELD: &str = "_id";

/// The outcome of compiling a rule's conditions for a store.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledFilter {
    /// The rule grants unconditionally; fetch everything.
    MatchAll,
    /// No rule grants anything; fetch nothing.
    MatchNone,
    /// Fetch the records matching this filter.
    Native(Filter),
}

impl CompiledFilter {
    /// Lowers the result into a filter the store can execute.
    ///
    /// [`CompiledFilter::MatchNone`] cannot be an empty filter, since that
    /// would match everything. It becomes a pair of clauses on the store's
    /// [`IDENTITY_FIELD`] instead: the field must be absent and also hold a
    /// [`ValueType::Identifier`]. Every stored record has an identity, and no
    /// field is both absent and typed.
    pub fn to_filter(&self) -> Filter {
        match self {
            CompiledFilter::MatchAll => Filter::new(),
            CompiledFilter::MatchNone => Filter::new()
                .with(IDENTITY_FIELD, Predicate::Exists(false))
                .with(IDENTITY_FIELD, Predicate::OfType(ValueType::Identifier)),
            CompiledFilter::Native(filter) => filter.clone(),
        }
    }

    /// Evaluates the lowered filter against a single record.
    pub fn evaluate<R>(&self, record: &R) -> bool
    where
        R: Resource + ?Sized,
    {
        match self {
            CompiledFilter::MatchAll => true,
            CompiledFilter::MatchNone => false,
            CompiledFilter::Native(filter) => filter.evaluate(record),
        }
    }
}

impl Display for CompiledFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompiledFilter::MatchAll => write!(f, "MatchAll"),
            CompiledFilter::MatchNone => write!(f, "MatchNone"),
            CompiledFilter::Native(filter) => write!(f, "{filter}"),
        }
    }
}
