use warrant_condition::{AttributeError, Conditions, Resource};
use warrant_store::{Capabilities, CompileError, CompiledFilter, Compiler};

use crate::{Action, SubjectType};

/// An authorization question about one action on one subject type, with the
/// rule in effect already resolved.
///
/// Single-object checks ([`Query::matches`]) and collection queries
/// ([`Query::compile`]) read the same resolved conditions, which is what
/// keeps the two in agreement.
#[derive(Debug, Clone, PartialEq)]
pub struct Query<'a> {
    action: Action,
    subject_type: SubjectType,
    conditions: Option<&'a Conditions>,
}

impl<'a> Query<'a> {
    /// Creates a query whose rule in effect has `conditions`, or `None` when
    /// nothing is permitted.
    pub fn new(
        action: Action,
        subject_type: SubjectType,
        conditions: Option<&'a Conditions>,
    ) -> Self {
        Self {
            action,
            subject_type,
            conditions,
        }
    }

    /// The action asked about.
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// The subject type asked about.
    pub fn subject_type(&self) -> &SubjectType {
        &self.subject_type
    }

    /// Conditions of the rule in effect, `None` if nothing is permitted.
    pub fn conditions(&self) -> Option<&'a Conditions> {
        self.conditions
    }

    /// Whether `resource` is permitted. Always `false` when no rule permits
    /// anything.
    pub fn matches<R: Resource + ?Sized>(&self, resource: &R) -> Result<bool, AttributeError> {
        match self.conditions {
            Some(conditions) => conditions.matches(resource),
            None => Ok(false),
        }
    }

    /// Compiles the conditions for a store with `capabilities`.
    pub fn compile(&self, capabilities: Capabilities) -> Result<CompiledFilter, CompileError> {
        Compiler::new(capabilities).compile(self.conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;
    use warrant_condition::Record;

    #[test]
    fn it_permits_nothing_without_conditions() -> TestResult {
        let query = Query::new(Action::read(), "Article".into(), None);

        assert!(!query.matches(&Record::new().with("owner_id", 42))?);
        assert_eq!(query.compile(Capabilities::default())?, CompiledFilter::MatchNone);
        Ok(())
    }

    #[test]
    fn it_permits_everything_with_empty_conditions() -> TestResult {
        let conditions = Conditions::new();
        let query = Query::new(Action::read(), "Article".into(), Some(&conditions));

        assert!(query.matches(&Record::new())?);
        assert_eq!(query.compile(Capabilities::minimal())?, CompiledFilter::MatchAll);
        Ok(())
    }

    #[test]
    fn it_checks_and_compiles_the_same_conditions() -> TestResult {
        let conditions = Conditions::new().equals("owner_id", 42);
        let query = Query::new(Action::read(), "Article".into(), Some(&conditions));
        let compiled = query.compile(Capabilities::default())?;

        for owner in [7, 42] {
            let article = Record::new().with("owner_id", owner);
            assert_eq!(query.matches(&article)?, compiled.evaluate(&article));
        }
        Ok(())
    }
}
