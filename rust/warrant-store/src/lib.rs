//! Filter pushdown for permission conditions.
//!
//! This crate turns the [`Conditions`] of a permission rule into a native
//! [`Filter`] a store can execute, so that only permitted records are
//! fetched. The translation agrees exactly with the in-memory matcher in
//! `warrant-condition`: a record matches the conditions if and only if the
//! store returns it for the compiled filter.
//!
//! ```
//! use warrant_condition::{Conditions, Record};
//! use warrant_store::{Collection, Compiler, Queryable};
//!
//! let mut articles = Collection::new("Article");
//! for owner in [7, 42, 42] {
//!     articles.insert(Record::new().with("owner_id", owner));
//! }
//!
//! let conditions = Conditions::new().equals("owner_id", 42);
//! let compiled = Compiler::new(articles.capabilities())
//!     .compile(Some(&conditions))
//!     .unwrap();
//!
//! assert_eq!(articles.fetch(&compiled).unwrap().len(), 2);
//! ```
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Compiler`] | Compiles conditions for a store's [`Capabilities`] |
//! | [`CompiledFilter`] | `MatchAll`, `MatchNone` or a native [`Filter`] |
//! | [`Filter`] | Conjunction of [`Clause`]s, the store's native language |
//! | [`Queryable`] | Stores that execute filters |
//! | [`Collection`] | In-memory [`Queryable`] keyed by ULID |
//!
//! [`Conditions`]: warrant_condition::Conditions

#![warn(missing_docs)]

mod error;
pub use error::*;

mod filter;
pub use filter::*;

mod compiled;
pub use compiled::*;

mod compiler;
pub use compiler::*;

mod queryable;
pub use queryable::*;

mod collection;
pub use collection::*;
