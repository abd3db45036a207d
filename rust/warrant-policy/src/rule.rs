//! Permission rules
//!
//! A [`Rule`] grants (or denies) an [`Action`] on a [`SubjectType`] when its
//! [`Conditions`] hold for the object in question. The reserved names
//! [`Action::manage`] and [`SubjectType::all`] act as wildcards.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use warrant_condition::Conditions;

const MANAGE: &str = "manage";
const READ: &str = "read";
const ALL: &str = "all";

/// The name of something a subject may do, such as `read` or `update`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(String);

impl Action {
    /// Creates an action with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Wildcard action that covers every other action.
    pub fn manage() -> Self {
        Self::new(MANAGE)
    }

    /// The action used for collection queries unless another is named.
    pub fn read() -> Self {
        Self::new(READ)
    }

    /// Whether this is the [`Action::manage`] wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.0 == MANAGE
    }

    /// Whether a rule declared for this action applies to `action`.
    pub fn covers(&self, action: &Action) -> bool {
        self.is_wildcard() || self == action
    }

    /// The action name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Action {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Action {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of object a rule is about, such as `Article`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectType(String);

impl SubjectType {
    /// Creates a subject type with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Wildcard subject type that covers every other subject type.
    pub fn all() -> Self {
        Self::new(ALL)
    }

    /// Whether this is the [`SubjectType::all`] wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.0 == ALL
    }

    /// Whether a rule declared for this subject type applies to `subject`.
    pub fn covers(&self, subject: &SubjectType) -> bool {
        self.is_wildcard() || self == subject
    }

    /// The subject type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubjectType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SubjectType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn grants_by_default() -> bool {
    true
}

/// A single permission declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// The action the rule is about
    pub action: Action,
    /// The subject type the rule is about
    pub subject: SubjectType,
    /// What must hold for the object; empty means unconditionally
    #[serde(default)]
    pub conditions: Conditions,
    /// `true` for a permission, `false` for a denial
    #[serde(default = "grants_by_default")]
    pub grants: bool,
}

impl Rule {
    /// Permits `action` on `subject` where `conditions` hold.
    pub fn can(
        action: impl Into<Action>,
        subject: impl Into<SubjectType>,
        conditions: Conditions,
    ) -> Self {
        Self {
            action: action.into(),
            subject: subject.into(),
            conditions,
            grants: true,
        }
    }

    /// Denies `action` on `subject` where `conditions` hold.
    pub fn cannot(
        action: impl Into<Action>,
        subject: impl Into<SubjectType>,
        conditions: Conditions,
    ) -> Self {
        Self {
            grants: false,
            ..Self::can(action, subject, conditions)
        }
    }

    /// Whether this rule applies to `action` on `subject`.
    pub fn is_relevant(&self, action: &Action, subject: &SubjectType) -> bool {
        self.action.covers(action) && self.subject.covers(subject)
    }

    /// How many of action and subject are named exactly rather than by
    /// wildcard.
    pub fn specificity(&self) -> u8 {
        u8::from(!self.action.is_wildcard()) + u8::from(!self.subject.is_wildcard())
    }
}
