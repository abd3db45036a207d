use warrant_condition::Resource;

use crate::{Capabilities, CompiledFilter, Filter};

/// A store that can execute native filters over its records.
///
/// Entity stores implement this to take part in filter pushdown: permission
/// conditions are compiled into a [`Filter`] and handed to the store instead
/// of being evaluated against every fetched record.
pub trait Queryable {
    /// The records held by the store.
    type Record: Resource;

    /// Failure while executing a filter.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The subject type of the records, used to look up permission rules.
    fn kind(&self) -> &str;

    /// The filter features this store can execute.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Returns every record matching `filter`.
    fn select(&self, filter: &Filter) -> Result<Vec<Self::Record>, Self::Error>;

    /// Whether `record` is held by the store and matches `filter`.
    fn includes(&self, filter: &Filter, record: &Self::Record) -> Result<bool, Self::Error>;

    /// Lowers `compiled` and returns the matching records.
    fn fetch(&self, compiled: &CompiledFilter) -> Result<Vec<Self::Record>, Self::Error> {
        self.select(&compiled.to_filter())
    }
}
