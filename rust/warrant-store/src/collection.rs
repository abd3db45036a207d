//! In-memory document collection
//!
//! [`Collection`] keeps records in insertion order, assigns each one a ULID
//! identity and executes native filters by scanning.
//!
//! Filters see a record's own attributes unchanged. A record that exposes its
//! own [`IDENTITY_FIELD`] keeps it; the assigned ULID only fills that field
//! for records that have none, so every stored record carries one as
//! [`CompiledFilter::MatchNone`] requires.
//!
//! [`CompiledFilter::MatchNone`]: crate::CompiledFilter::MatchNone

use std::convert::Infallible;

use ulid::Ulid;
use warrant_condition::{AttributeError, Resource, Value};

use crate::{Capabilities, Filter, IDENTITY_FIELD, Queryable};

/// An in-memory [`Queryable`] store.
#[derive(Debug, Clone)]
pub struct Collection<R> {
    kind: String,
    capabilities: Capabilities,
    records: Vec<(Ulid, R)>,
}

/// A record as the store sees it: its own attributes, plus its assigned
/// identity where it has no `_id` of its own.
struct Stored<'a, R> {
    id: Ulid,
    record: &'a R,
}

impl<R: Resource> Resource for Stored<'_, R> {
    fn attribute(&self, name: &str) -> Result<Value, AttributeError> {
        match self.record.attribute(name) {
            Err(AttributeError::Missing { .. }) if name == IDENTITY_FIELD => {
                Ok(Value::Identifier(self.id))
            }
            attribute => attribute,
        }
    }
}

impl<R> Collection<R> {
    /// Creates an empty collection of records of subject type `kind`.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            capabilities: Capabilities::default(),
            records: Vec::new(),
        }
    }

    /// Restricts the filter features this collection advertises.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Stores `record` and returns the identity assigned to it.
    pub fn insert(&mut self, record: R) -> Ulid {
        let id = Ulid::new();
        self.records.push((id, record));
        id
    }

    /// Looks a record up by identity.
    pub fn get(&self, id: &Ulid) -> Option<&R> {
        self.records
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, record)| record)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates stored records with their identities.
    pub fn iter(&self) -> impl Iterator<Item = (&Ulid, &R)> {
        self.records.iter().map(|(id, record)| (id, record))
    }
}

impl<R: Resource> Collection<R> {
    fn stored(&self) -> impl Iterator<Item = Stored<'_, R>> {
        self.records
            .iter()
            .map(|(id, record)| Stored { id: *id, record })
    }
}

impl<R> Extend<R> for Collection<R> {
    fn extend<I: IntoIterator<Item = R>>(&mut self, records: I) {
        for record in records {
            self.insert(record);
        }
    }
}

impl<R> Queryable for Collection<R>
where
    R: Resource + Clone + PartialEq,
{
    type Record = R;
    type Error = Infallible;

    fn kind(&self) -> &str {
        &self.kind
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn select(&self, filter: &Filter) -> Result<Vec<R>, Infallible> {
        Ok(self
            .stored()
            .filter(|stored| filter.evaluate(stored))
            .map(|stored| stored.record.clone())
            .collect())
    }

    fn includes(&self, filter: &Filter, record: &R) -> Result<bool, Infallible> {
        Ok(self
            .stored()
            .any(|stored| stored.record == record && filter.evaluate(&stored)))
    }
}
