//! Permission rules and their enforcement.
//!
//! A [`Policy`] holds an ordered [`RuleSet`] and an [`Enforcement`] strategy.
//! For any action and subject type the rule set resolves the rule in effect
//! with a [`Precedence`]; its conditions then answer both kinds of question a
//! caller asks:
//!
//! - may this object be acted on? ([`Policy::can`], [`Policy::permits`])
//! - which stored records may be acted on? ([`AccessibleBy::accessible_by`])
//!
//! ```
//! use warrant_condition::{Conditions, Record};
//! use warrant_policy::{AccessibleBy, LastDefined, Policy, Pushdown, Rule, RuleSet};
//! use warrant_store::Collection;
//!
//! let rules = RuleSet::new(LastDefined).with(Rule::can(
//!     "read",
//!     "Article",
//!     Conditions::new().equals("owner_id", 42),
//! ));
//! let policy = Policy::new(rules, Pushdown::default());
//!
//! let mut articles = Collection::new("Article");
//! for owner in [7, 42, 42] {
//!     articles.insert(Record::new().with("owner_id", owner));
//! }
//!
//! assert!(policy.can("read", "Article", &Record::new().with("owner_id", 42)).unwrap());
//! assert_eq!(articles.accessible_by(&policy).unwrap().len(), 2);
//! ```

#![warn(missing_docs)]

mod error;
pub use error::*;

mod rule;
pub use rule::*;

mod precedence;
pub use precedence::*;

mod query;
pub use query::*;

mod rule_set;
pub use rule_set::*;

mod enforcement;
pub use enforcement::*;

mod policy;
pub use policy::*;

mod settings;
pub use settings::*;
