//! Selecting the relevant rule
//!
//! Several rules may be relevant to the same action and subject type. A
//! [`Precedence`] decides which one of them is in effect. It is a total order
//! over the relevant rules supplied by the host policy; this crate provides
//! the common ones.

use serde::{Deserialize, Serialize};

use crate::Rule;

/// Picks the rule in effect among relevant rules.
pub trait Precedence {
    /// Returns the winning rule. `rules` holds every relevant rule in
    /// definition order and is never reordered by the caller.
    fn resolve<'a>(&self, rules: &[&'a Rule]) -> Option<&'a Rule>;
}

/// The earliest defined rule wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstDefined;

impl Precedence for FirstDefined {
    fn resolve<'a>(&self, rules: &[&'a Rule]) -> Option<&'a Rule> {
        rules.first().copied()
    }
}

/// The latest defined rule wins, so later declarations override earlier
/// ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastDefined;

impl Precedence for LastDefined {
    fn resolve<'a>(&self, rules: &[&'a Rule]) -> Option<&'a Rule> {
        rules.last().copied()
    }
}

/// Rules naming the action and subject exactly win over wildcard rules; among
/// equally specific rules the latest defined wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MostSpecific;

impl Precedence for MostSpecific {
    fn resolve<'a>(&self, rules: &[&'a Rule]) -> Option<&'a Rule> {
        // max_by_key keeps the last of equal maxima
        rules.iter().copied().max_by_key(|rule| rule.specificity())
    }
}

/// A precedence chosen by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// See [`FirstDefined`]
    FirstDefined,
    /// See [`LastDefined`]
    #[default]
    LastDefined,
    /// See [`MostSpecific`]
    MostSpecific,
}

impl Precedence for Resolution {
    fn resolve<'a>(&self, rules: &[&'a Rule]) -> Option<&'a Rule> {
        match self {
            Resolution::FirstDefined => FirstDefined.resolve(rules),
            Resolution::LastDefined => LastDefined.resolve(rules),
            Resolution::MostSpecific => MostSpecific.resolve(rules),
        }
    }
}

impl<P: Precedence + ?Sized> Precedence for &P {
    fn resolve<'a>(&self, rules: &[&'a Rule]) -> Option<&'a Rule> {
        (**self).resolve(rules)
    }
}

impl<P: Precedence + ?Sized> Precedence for Box<P> {
    fn resolve<'a>(&self, rules: &[&'a Rule]) -> Option<&'a Rule> {
        (**self).resolve(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, SubjectType};
    use pretty_assertions::assert_eq;
    use warrant_condition::Conditions;

    fn rules() -> Vec<Rule> {
        vec![
            Rule::can("read", "Article", Conditions::new().equals("owner_id", 1)),
            Rule::can(Action::manage(), SubjectType::all(), Conditions::new()),
            Rule::can("read", "Article", Conditions::new().equals("owner_id", 2)),
            Rule::can(Action::manage(), "Article", Conditions::new()),
        ]
    }

    #[test]
    fn it_resolves_by_definition_order() {
        let rules = rules();
        let relevant: Vec<&Rule> = rules.iter().collect();

        assert_eq!(FirstDefined.resolve(&relevant), Some(&rules[0]));
        assert_eq!(LastDefined.resolve(&relevant), Some(&rules[3]));
    }

    #[test]
    fn it_prefers_exact_rules_and_breaks_ties_by_recency() {
        let rules = rules();
        let relevant: Vec<&Rule> = rules.iter().collect();

        assert_eq!(MostSpecific.resolve(&relevant), Some(&rules[2]));
        assert_eq!(MostSpecific.resolve(&[&rules[1], &rules[3]]), Some(&rules[3]));
    }

    #[test]
    fn it_resolves_nothing_from_nothing() {
        assert_eq!(FirstDefined.resolve(&[]), None);
        assert_eq!(LastDefined.resolve(&[]), None);
        assert_eq!(MostSpecific.resolve(&[]), None);
    }

    #[test]
    fn it_configures_precedence_by_name() -> testresult::TestResult {
        let rules = rules();
        let relevant: Vec<&Rule> = rules.iter().collect();

        let resolution: Resolution = serde_json::from_str("\"most_specific\"")?;
        assert_eq!(resolution.resolve(&relevant), Some(&rules[2]));
        assert_eq!(Resolution::default(), Resolution::LastDefined);
        Ok(())
    }
}
