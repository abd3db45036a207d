use warrant_condition::{AttributeError, Resource};
use warrant_store::Queryable;

use crate::{
    Action, Enforcement, Evaluation, PolicyError, Precedence, Query, Resolution, RuleSet,
    SubjectType,
};

/// A rule set paired with the strategy used to enforce it.
#[derive(Debug, Clone)]
pub struct Policy<P = Resolution, E = Evaluation> {
    rules: RuleSet<P>,
    enforcement: E,
}

impl<P, E> Policy<P, E>
where
    P: Precedence,
    E: Enforcement,
{
    /// Creates a policy enforcing `rules` with `enforcement`.
    pub fn new(rules: RuleSet<P>, enforcement: E) -> Self {
        Self { rules, enforcement }
    }

    /// The rules of this policy.
    pub fn rules(&self) -> &RuleSet<P> {
        &self.rules
    }

    /// The enforcement strategy of this policy.
    pub fn enforcement(&self) -> &E {
        &self.enforcement
    }

    /// Resolves the rule in effect for `action` on `subject`.
    pub fn query(&self, action: impl Into<Action>, subject: impl Into<SubjectType>) -> Query<'_> {
        self.rules.query(action, subject)
    }

    /// Whether `action` is permitted on `resource` of type `subject`.
    ///
    /// Evaluated in memory; no store is involved.
    pub fn can<R: Resource + ?Sized>(
        &self,
        action: impl Into<Action>,
        subject: impl Into<SubjectType>,
        resource: &R,
    ) -> Result<bool, AttributeError> {
        self.query(action, subject).matches(resource)
    }

    /// Negation of [`Policy::can`].
    pub fn cannot<R: Resource + ?Sized>(
        &self,
        action: impl Into<Action>,
        subject: impl Into<SubjectType>,
        resource: &R,
    ) -> Result<bool, AttributeError> {
        Ok(!self.can(action, subject, resource)?)
    }

    /// Whether `action` is permitted on `record`, a record held by `store`.
    pub fn permits<S: Queryable>(
        &self,
        action: impl Into<Action>,
        store: &S,
        record: &S::Record,
    ) -> Result<bool, PolicyError> {
        let query = self.query(action, store.kind());
        self.enforcement.permits(&query, store, record)
    }

    /// Every record in `store` on which `action` is permitted.
    pub fn accessible_by<S: Queryable>(
        &self,
        action: impl Into<Action>,
        store: &S,
    ) -> Result<Vec<S::Record>, PolicyError> {
        let query = self.query(action, store.kind());
        self.enforcement.accessible(&query, store)
    }
}

/// Scopes a store to the records a policy permits.
///
/// Implemented for every [`Queryable`], so `articles.accessible_by(&policy)`
/// reads like the question it answers.
pub trait AccessibleBy: Queryable + Sized {
    /// Records permitted for [`Action::read`].
    fn accessible_by<P, E>(
        &self,
        policy: &Policy<P, E>,
    ) -> Result<Vec<Self::Record>, PolicyError>
    where
        P: Precedence,
        E: Enforcement,
    {
        self.accessible_by_action(policy, Action::read())
    }

    /// Records permitted for `action`.
    fn accessible_by_action<P, E>(
        &self,
        policy: &Policy<P, E>,
        action: impl Into<Action>,
    ) -> Result<Vec<Self::Record>, PolicyError>
    where
        P: Precedence,
        E: Enforcement,
    {
        policy.accessible_by(action, self)
    }
}

impl<S: Queryable> AccessibleBy for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemory, LastDefined, Pushdown, Rule};
    use pretty_assertions::assert_eq;
    use testresult::TestResult;
    use warrant_condition::{Conditions, Record};
    use warrant_store::Collection;

    fn rules() -> RuleSet<LastDefined> {
        RuleSet::new(LastDefined)
            .with(Rule::can("read", "Article", Conditions::new().equals("owner_id", 42)))
            .with(Rule::can("update", "Article", Conditions::new().equals("locked", false)))
    }

    fn articles() -> Collection<Record> {
        let mut articles = Collection::new("Article");
        articles.extend([7, 42, 42].map(|owner| {
            Record::new()
                .with("owner_id", owner)
                .with("locked", owner == 7)
        }));
        articles
    }

    #[test_log::test]
    fn it_checks_single_objects_in_memory() -> TestResult {
        let policy = Policy::new(rules(), InMemory);

        assert!(policy.can("read", "Article", &Record::new().with("owner_id", 42))?);
        assert!(policy.cannot("read", "Article", &Record::new().with("owner_id", 7))?);
        assert!(policy.cannot("destroy", "Article", &Record::new().with("owner_id", 42))?);
        Ok(())
    }

    #[test_log::test]
    fn it_scopes_stores_to_permitted_records() -> TestResult {
        let articles = articles();

        for policy in [
            Policy::new(rules(), Evaluation::InMemory),
            Policy::new(rules(), Evaluation::from(Pushdown::default())),
        ] {
            let readable = articles.accessible_by(&policy)?;
            assert_eq!(readable.len(), 2);
            assert!(readable.iter().all(|article| article.get("owner_id") == Some(&42.into())));

            let updatable = articles.accessible_by_action(&policy, "update")?;
            assert_eq!(updatable, readable);

            assert!(articles.accessible_by_action(&policy, "destroy")?.is_empty());
        }
        Ok(())
    }

    #[test_log::test]
    fn it_permits_stored_records_by_store_kind() -> TestResult {
        let articles = articles();
        let policy = Policy::new(rules(), Pushdown::default());

        let stored: Vec<&Record> = articles.iter().map(|(_, record)| record).collect();
        assert!(!policy.permits("read", &articles, stored[0])?);
        assert!(policy.permits("read", &articles, stored[1])?);

        let comments = {
            let mut comments = Collection::new("Comment");
            comments.insert(Record::new().with("owner_id", 42));
            comments
        };
        assert!(comments.accessible_by(&policy)?.is_empty());
        Ok(())
    }
}
