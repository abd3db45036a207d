//! Where conditions are evaluated
//!
//! The same [`Query`] can be enforced by running the matcher over records in
//! memory ([`InMemory`]) or by compiling the conditions into a filter the
//! store executes itself ([`Pushdown`]). Both give the same answers; they
//! differ in how much the store has to hand over.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use warrant_store::{CompileError, CompiledFilter, Queryable};

use crate::{PolicyError, Query};

/// A strategy for answering a [`Query`] against a store.
pub trait Enforcement {
    /// Whether `record`, held by `store`, is permitted.
    fn permits<S: Queryable>(
        &self,
        query: &Query<'_>,
        store: &S,
        record: &S::Record,
    ) -> Result<bool, PolicyError>;

    /// Every record in `store` that is permitted.
    fn accessible<S: Queryable>(
        &self,
        query: &Query<'_>,
        store: &S,
    ) -> Result<Vec<S::Record>, PolicyError>;
}

/// Evaluates conditions with the matcher after fetching records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InMemory;

impl Enforcement for InMemory {
    fn permits<S: Queryable>(
        &self,
        query: &Query<'_>,
        _store: &S,
        record: &S::Record,
    ) -> Result<bool, PolicyError> {
        Ok(query.matches(record)?)
    }

    fn accessible<S: Queryable>(
        &self,
        query: &Query<'_>,
        store: &S,
    ) -> Result<Vec<S::Record>, PolicyError> {
        if query.conditions().is_none() {
            return Ok(Vec::new());
        }

        let mut permitted = Vec::new();
        for record in store
            .fetch(&CompiledFilter::MatchAll)
            .map_err(PolicyError::store)?
        {
            if query.matches(&record)? {
                permitted.push(record);
            }
        }
        debug!(
            subject = %query.subject_type(),
            count = permitted.len(),
            "Filtered records in memory"
        );
        Ok(permitted)
    }
}

/// Compiles conditions into a native filter and lets the store execute it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pushdown {
    /// Evaluate in memory instead of failing when the store cannot express
    /// the conditions
    pub fallback: bool,
}

impl Pushdown {
    fn fall_back(&self, query: &Query<'_>, error: CompileError) -> Result<(), PolicyError> {
        if !self.fallback {
            return Err(error.into());
        }
        warn!(
            subject = %query.subject_type(),
            %error,
            "Store cannot execute the conditions, evaluating in memory"
        );
        Ok(())
    }
}

impl Enforcement for Pushdown {
    fn permits<S: Queryable>(
        &self,
        query: &Query<'_>,
        store: &S,
        record: &S::Record,
    ) -> Result<bool, PolicyError> {
        match query.compile(store.capabilities()) {
            Ok(CompiledFilter::MatchAll) => Ok(true),
            Ok(CompiledFilter::MatchNone) => Ok(false),
            Ok(CompiledFilter::Native(filter)) => {
                store.includes(&filter, record).map_err(PolicyError::store)
            }
            Err(error) => {
                self.fall_back(query, error)?;
                InMemory.permits(query, store, record)
            }
        }
    }

    fn accessible<S: Queryable>(
        &self,
        query: &Query<'_>,
        store: &S,
    ) -> Result<Vec<S::Record>, PolicyError> {
        match query.compile(store.capabilities()) {
            Ok(compiled) => store.fetch(&compiled).map_err(PolicyError::store),
            Err(error) => {
                self.fall_back(query, error)?;
                InMemory.accessible(query, store)
            }
        }
    }
}

/// An enforcement strategy chosen by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Evaluation {
    /// See [`InMemory`]
    InMemory,
    /// See [`Pushdown`]
    Pushdown {
        /// See [`Pushdown::fallback`]
        #[serde(default)]
        fallback: bool,
    },
}

impl Enforcement for Evaluation {
    fn permits<S: Queryable>(
        &self,
        query: &Query<'_>,
        store: &S,
        record: &S::Record,
    ) -> Result<bool, PolicyError> {
        match *self {
            Evaluation::InMemory => InMemory.permits(query, store, record),
            Evaluation::Pushdown { fallback } => {
                Pushdown { fallback }.permits(query, store, record)
            }
        }
    }

    fn accessible<S: Queryable>(
        &self,
        query: &Query<'_>,
        store: &S,
    ) -> Result<Vec<S::Record>, PolicyError> {
        match *self {
            Evaluation::InMemory => InMemory.accessible(query, store),
            Evaluation::Pushdown { fallback } => Pushdown { fallback }.accessible(query, store),
        }
    }
}

impl From<InMemory> for Evaluation {
    fn from(_: InMemory) -> Self {
        Evaluation::InMemory
    }
}

impl From<Pushdown> for Evaluation {
    fn from(pushdown: Pushdown) -> Self {
        Evaluation::Pushdown {
            fallback: pushdown.fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Action;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use testresult::TestResult;
    use warrant_condition::{Conditions, Record};
    use warrant_store::{Capabilities, Collection};

    fn articles() -> Collection<Record> {
        let mut articles = Collection::new("Article");
        articles.extend([
            Record::new()
                .with("owner_id", 7)
                .with("tags", vec![Record::new().with("name", "x")]),
            Record::new()
                .with("owner_id", 42)
                .with("tags", vec![Record::new().with("name", "y")]),
            Record::new().with("owner_id", 42).with("tags", Vec::<Record>::new()),
        ]);
        articles
    }

    fn tagged(name: &str) -> Conditions {
        Conditions::new().nested("tags", Conditions::new().equals("name", name))
    }

    #[test_log::test]
    fn it_filters_in_memory() -> TestResult {
        let conditions = Conditions::new().equals("owner_id", 42);
        let query = Query::new(Action::read(), "Article".into(), Some(&conditions));

        assert_eq!(InMemory.accessible(&query, &articles())?.len(), 2);
        Ok(())
    }

    #[test_log::test]
    fn it_fetches_nothing_without_a_rule() -> TestResult {
        let query = Query::new(Action::read(), "Article".into(), None);

        assert!(InMemory.accessible(&query, &articles())?.is_empty());
        assert!(Pushdown::default().accessible(&query, &articles())?.is_empty());
        Ok(())
    }

    #[test_log::test]
    fn it_pushes_conditions_down_to_the_store() -> TestResult {
        let conditions = tagged("y");
        let query = Query::new(Action::read(), "Article".into(), Some(&conditions));
        let articles = articles();

        let pushed = Pushdown::default().accessible(&query, &articles)?;
        assert_eq!(pushed, InMemory.accessible(&query, &articles)?);
        assert_eq!(pushed.len(), 1);
        Ok(())
    }

    #[test_log::test]
    fn it_asks_the_store_about_single_records() -> TestResult {
        let conditions = Conditions::new().equals("owner_id", 42);
        let query = Query::new(Action::read(), "Article".into(), Some(&conditions));
        let articles = articles();

        let stored: Vec<&Record> = articles.iter().map(|(_, record)| record).collect();
        assert!(Pushdown::default().permits(&query, &articles, stored[1])?);
        assert!(!Pushdown::default().permits(&query, &articles, stored[0])?);
        Ok(())
    }

    #[test_log::test]
    fn it_permits_unconditionally_without_consulting_the_store() -> TestResult {
        let conditions = Conditions::new();
        let query = Query::new(Action::read(), "Article".into(), Some(&conditions));
        let empty = Collection::<Record>::new("Article");
        let unstored = Record::new().with("owner_id", 42);

        assert!(InMemory.permits(&query, &empty, &unstored)?);
        assert!(Pushdown::default().permits(&query, &empty, &unstored)?);

        let nothing = Query::new(Action::read(), "Article".into(), None);
        assert!(!Pushdown::default().permits(&nothing, &articles(), &unstored)?);
        Ok(())
    }

    #[test_log::test]
    fn it_refuses_conditions_the_store_cannot_express() {
        let articles = articles().with_capabilities(Capabilities::minimal());
        let conditions = tagged("y");
        let query = Query::new(Action::read(), "Article".into(), Some(&conditions));

        assert!(matches!(
            Pushdown { fallback: false }.accessible(&query, &articles),
            Err(PolicyError::Compile(_))
        ));
    }

    #[test_log::test]
    fn it_falls_back_to_memory_when_allowed() -> TestResult {
        let articles = articles().with_capabilities(Capabilities::minimal());
        let conditions = tagged("y");
        let query = Query::new(Action::read(), "Article".into(), Some(&conditions));

        let permitted = Pushdown { fallback: true }.accessible(&query, &articles)?;
        assert_eq!(permitted, InMemory.accessible(&query, &articles)?);
        assert_eq!(permitted.len(), 1);
        assert!(Pushdown { fallback: true }.permits(&query, &articles, &permitted[0])?);
        Ok(())
    }

    #[test_log::test]
    fn it_surfaces_unreadable_attributes_in_memory() {
        let conditions = Conditions::new().equals("status", "published");
        let query = Query::new(Action::read(), "Article".into(), Some(&conditions));

        assert!(matches!(
            InMemory.accessible(&query, &articles()),
            Err(PolicyError::Attribute(_))
        ));
    }

    #[test]
    fn it_configures_evaluation_by_mode() -> TestResult {
        let evaluation: Evaluation = serde_json::from_value(json!({"mode": "in_memory"}))?;
        assert_eq!(evaluation, Evaluation::from(InMemory));

        let evaluation: Evaluation =
            serde_json::from_value(json!({"mode": "pushdown", "fallback": true}))?;
        assert_eq!(evaluation, Evaluation::from(Pushdown { fallback: true }));

        let evaluation: Evaluation = serde_json::from_value(json!({"mode": "pushdown"}))?;
        assert_eq!(evaluation, Evaluation::Pushdown { fallback: false });
        Ok(())
    }
}
