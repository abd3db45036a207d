use tracing::debug;
use warrant_condition::Conditions;

use crate::{Action, Precedence, Query, Resolution, Rule, SubjectType};

/// An ordered collection of rules together with the [`Precedence`] that
/// picks the rule in effect.
///
/// Rules are added during setup and only read afterwards, so a `RuleSet` can
/// be shared freely between threads once built.
#[derive(Debug, Clone, Default)]
pub struct RuleSet<P = Resolution> {
    rules: Vec<Rule>,
    precedence: P,
}

impl<P: Precedence> RuleSet<P> {
    /// Creates an empty rule set resolved by `precedence`.
    pub fn new(precedence: P) -> Self {
        Self {
            rules: Vec::new(),
            precedence,
        }
    }

    /// Adds a rule after every rule defined so far.
    pub fn with(mut self, rule: Rule) -> Self {
        self.push(rule);
        self
    }

    /// Adds a rule after every rule defined so far.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Every rule in definition order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The precedence in use.
    pub fn precedence(&self) -> &P {
        &self.precedence
    }

    /// Rules that apply to `action` on `subject`, in definition order.
    pub fn relevant(&self, action: &Action, subject: &SubjectType) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|rule| rule.is_relevant(action, subject))
            .collect()
    }

    /// The rule in effect for `action` on `subject`.
    pub fn resolve(&self, action: &Action, subject: &SubjectType) -> Option<&Rule> {
        self.precedence.resolve(&self.relevant(action, subject))
    }

    /// The conditions under which `action` on `subject` is permitted.
    ///
    /// `None` means nothing is permitted: either no rule is relevant or the
    /// rule in effect is a denial.
    pub fn relevant_condition(
        &self,
        action: &Action,
        subject: &SubjectType,
    ) -> Option<&Conditions> {
        let resolved = self.resolve(action, subject);
        debug!(
            %action,
            %subject,
            resolved = resolved.is_some(),
            grants = resolved.map(|rule| rule.grants),
            "Resolved rule"
        );
        resolved
            .filter(|rule| rule.grants)
            .map(|rule| &rule.conditions)
    }

    /// Resolves the rule in effect once, for both single-object checks and
    /// collection queries.
    pub fn query(&self, action: impl Into<Action>, subject: impl Into<SubjectType>) -> Query<'_> {
        let action = action.into();
        let subject = subject.into();
        let conditions = self.relevant_condition(&action, &subject);
        Query::new(action, subject, conditions)
    }
}

impl<P: Precedence> Extend<Rule> for RuleSet<P> {
    fn extend<I: IntoIterator<Item = Rule>>(&mut self, rules: I) {
        self.rules.extend(rules);
    }
}
