//! The store's native filter language
//!
//! A [`Filter`] is a conjunction of [`Clause`]s, each applying a
//! [`Predicate`] to one field of a stored record. An empty filter matches
//! every record.
//!
//! Unlike the in-memory matcher, a store never fails on a field it cannot
//! read: such a field is simply absent, and only [`Predicate::Exists`] with
//! `false` is satisfied by it.

use std::fmt::{Display, Formatter};

use serde::Serialize;
use warrant_condition::{Resource, Value, ValueRange, ValueType};

/// A conjunction of clauses over a record's fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(into = "serde_json::Value")]
pub struct Filter {
    clauses: Vec<Clause>,
}

/// A predicate applied to one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Name of the field
    pub field: String,
    /// What the field must satisfy
    pub predicate: Predicate,
}

/// Tests the store applies to a field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Present and equal to the value
    Eq(Value),
    /// Present and equal to one of the values
    In(Vec<Value>),
    /// Present and inside the range
    Range(ValueRange),
    /// Presence matches the flag
    Exists(bool),
    /// Present and of the given type
    OfType(ValueType),
    /// Present and satisfying the filter. A list satisfies it when any of
    /// its elements does.
    Matches(Filter),
}

impl Filter {
    /// A filter with no clauses; it matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this filter with one more clause.
    pub fn with(mut self, field: impl Into<String>, predicate: Predicate) -> Self {
        self.push(field, predicate);
        self
    }

    /// Adds a clause.
    pub fn push(&mut self, field: impl Into<String>, predicate: Predicate) {
        self.clauses.push(Clause {
            field: field.into(),
            predicate,
        });
    }

    /// The clauses, in insertion order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether the filter has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluates the filter against a record the way a store would.
    pub fn evaluate<R>(&self, record: &R) -> bool
    where
        R: Resource + ?Sized,
    {
        self.clauses.iter().all(|clause| {
            let field = record.attribute(&clause.field).ok();
            clause.predicate.evaluate(field.as_ref())
        })
    }

    /// Renders the filter in its document form, e.g.
    /// `{"owner_id": 42, "status": {"$in": ["draft"]}}`.
    ///
    /// Clauses on the same field are merged into one operator document.
    pub fn to_json(&self) -> serde_json::Value {
        let mut document = serde_json::Map::new();
        for clause in &self.clauses {
            match document.get_mut(&clause.field) {
                None => {
                    document.insert(clause.field.clone(), clause.predicate.to_json());
                }
                Some(existing) => {
                    let mut operators = clause.predicate.operators();
                    if let serde_json::Value::Object(previous) = &mut *existing {
                        if is_operator_document(previous) {
                            previous.append(&mut operators);
                            continue;
                        }
                    }
                    let mut merged = serde_json::Map::new();
                    merged.insert("$eq".into(), existing.take());
                    merged.append(&mut operators);
                    *existing = serde_json::Value::Object(merged);
                }
            }
        }
        serde_json::Value::Object(document)
    }
}

fn is_operator_document(document: &serde_json::Map<String, serde_json::Value>) -> bool {
    !document.is_empty() && document.keys().all(|key| key.starts_with('$'))
}

impl Predicate {
    /// Evaluates the predicate against a field, `None` when the field is
    /// absent.
    pub fn evaluate(&self, field: Option<&Value>) -> bool {
        match (self, field) {
            (Predicate::Exists(expected), field) => field.is_some() == *expected,
            (_, None) => false,
            (Predicate::Eq(value), Some(field)) => field == value,
            (Predicate::In(values), Some(field)) => values.contains(field),
            (Predicate::Range(range), Some(field)) => range.contains(field),
            (Predicate::OfType(data_type), Some(field)) => field.data_type() == *data_type,
            (Predicate::Matches(filter), Some(Value::List(elements))) => {
                elements.iter().any(|element| filter.evaluate(element))
            }
            (Predicate::Matches(filter), Some(field)) => filter.evaluate(field),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Predicate::Eq(value) if !matches!(value, Value::Record(_) | Value::Identifier(_)) => {
                value.into()
            }
            _ => serde_json::Value::Object(self.operators()),
        }
    }

    fn operators(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut operators = serde_json::Map::new();
        match self {
            Predicate::Eq(value) => {
                operators.insert("$eq".into(), value.into());
            }
            Predicate::In(values) => {
                operators.insert(
                    "$in".into(),
                    values.iter().map(serde_json::Value::from).collect(),
                );
            }
            Predicate::Range(range) => {
                operators.insert("$gte".into(), (&range.start).into());
                let bound = if range.exclusive { "$lt" } else { "$lte" };
                operators.insert(bound.into(), (&range.end).into());
            }
            Predicate::Exists(expected) => {
                operators.insert("$exists".into(), (*expected).into());
            }
            Predicate::OfType(data_type) => {
                operators.insert("$type".into(), data_type.name().into());
            }
            Predicate::Matches(filter) => {
                operators.insert("$matches".into(), filter.to_json());
            }
        }
        operators
    }
}

impl From<Filter> for serde_json::Value {
    fn from(filter: Filter) -> Self {
        filter.to_json()
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
