use serde::{Deserialize, Serialize};

use crate::{Evaluation, Policy, PolicyError, Resolution, Rule, RuleSet};

/// Declarative policy configuration.
///
/// ```json
/// {
///   "precedence": "last_defined",
///   "evaluation": { "mode": "pushdown", "fallback": true },
///   "rules": [
///     { "action": "read", "subject": "Article", "conditions": { "owner_id": 42 } }
///   ]
/// }
/// ```
///
/// `evaluation` must always be given. `precedence` defaults to
/// `last_defined`, and a rule's `grants` to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySettings {
    /// How the rule in effect is picked among relevant rules
    #[serde(default)]
    pub precedence: Resolution,
    /// Where conditions are evaluated
    pub evaluation: Evaluation,
    /// Rules in definition order
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Policy {
    /// Builds a policy from settings.
    pub fn from_settings(settings: PolicySettings) -> Self {
        let mut rules = RuleSet::new(settings.precedence);
        rules.extend(settings.rules);
        Policy::new(rules, settings.evaluation)
    }

    /// Builds a policy from settings in JSON form.
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        let settings: PolicySettings = serde_json::from_str(json)?;
        Ok(Self::from_settings(settings))
    }
}

impl From<PolicySettings> for Policy {
    fn from(settings: PolicySettings) -> Self {
        Policy::from_settings(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use testresult::TestResult;
    use ulid::Ulid;
    use warrant_condition::{Conditions, Record};

    #[test_log::test]
    fn it_loads_a_policy_from_json() -> TestResult {
        let policy = Policy::from_json(
            &json!({
                "evaluation": {"mode": "in_memory"},
                "rules": [
                    {"action": "read", "subject": "Article", "conditions": {"owner_id": 42}},
                    {"action": "read", "subject": "Article", "conditions": {"owner_id": 7}},
                ]
            })
            .to_string(),
        )?;

        assert_eq!(policy.rules().precedence(), &Resolution::LastDefined);
        assert_eq!(policy.enforcement(), &Evaluation::InMemory);
        assert!(policy.can("read", "Article", &Record::new().with("owner_id", 7))?);
        assert!(policy.cannot("read", "Article", &Record::new().with("owner_id", 42))?);
        Ok(())
    }

    #[test_log::test]
    fn it_requires_an_explicit_evaluation_mode() {
        let result = Policy::from_json(r#"{"rules": []}"#);

        assert!(matches!(result, Err(PolicyError::Settings(_))));
    }

    #[test_log::test]
    fn it_rejects_malformed_conditions() {
        let result = Policy::from_json(
            &json!({
                "evaluation": {"mode": "in_memory"},
                "rules": [{"action": "read", "subject": "Article", "conditions": [1, 2]}]
            })
            .to_string(),
        );

        assert!(matches!(result, Err(PolicyError::Settings(_))));
    }

    #[test_log::test]
    fn it_keeps_identifier_conditions_through_saved_settings() -> TestResult {
        let author = Ulid::from(42u128);
        let settings = PolicySettings {
            precedence: Resolution::LastDefined,
            evaluation: Evaluation::InMemory,
            rules: vec![Rule::can(
                "read",
                "Article",
                Conditions::new().equals("author_id", author),
            )],
        };

        let policy = Policy::from_json(&serde_json::to_string(&settings)?)?;
        let article = Record::new().with("author_id", author);
        assert!(policy.can("read", "Article", &article)?);

        let impostor = Record::new().with("author_id", author.to_string());
        assert!(policy.cannot("read", "Article", &impostor)?);
        Ok(())
    }

    #[test]
    fn it_writes_settings_that_read_back() -> TestResult {
        let settings = PolicySettings {
            precedence: Resolution::MostSpecific,
            evaluation: Evaluation::Pushdown { fallback: true },
            rules: vec![
                Rule::can("read", "Article", Conditions::new().one_of("status", ["published"])),
                Rule::cannot("destroy", "Article", Conditions::new()),
            ],
        };

        let json = serde_json::to_string(&settings)?;
        assert_eq!(serde_json::from_str::<PolicySettings>(&json)?, settings);
        Ok(())
    }
}
