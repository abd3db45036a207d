//! Condition trees and in-memory matching.
//!
//! A permission rule carries [`Conditions`]: a mapping from attribute name to
//! a [`ConditionNode`] describing what a permitted resource must look like.
//! [`matches`] evaluates such a tree against any [`Resource`].
//!
//! ```
//! use warrant_condition::{Conditions, Record, Value};
//!
//! let conditions = Conditions::new()
//!     .one_of("status", ["draft", "published"])
//!     .nested("tags", Conditions::new().equals("name", "rust"));
//!
//! let article = Record::new().with("status", "draft").with(
//!     "tags",
//!     vec![
//!         Value::from(Record::new().with("name", "go")),
//!         Value::from(Record::new().with("name", "rust")),
//!     ],
//! );
//!
//! assert!(conditions.matches(&article).unwrap());
//! ```
//!
//! The same trees are compiled into store filters by `warrant-store`; both
//! paths share the value equality and ordering defined in [`Value`].

#![warn(missing_docs)]

mod error;
pub use error::*;

mod value;
pub use value::*;

mod record;
pub use record::*;

mod resource;
pub use resource::*;

mod condition;
pub use condition::*;

mod matcher;
pub use matcher::*;
