//! Condition trees
//!
//! A rule's condition is a [`Conditions`] mapping from attribute name to a
//! [`ConditionNode`]. Nodes either compare the attribute to a value, test its
//! membership in a set or range, or descend into it with further conditions.
//!
//! # Declarative form
//!
//! Conditions read from and write to JSON so rules can be loaded from
//! configuration:
//!
//! ```text
//! {
//!   "owner_id": 42,                                  // Equals
//!   "status": ["draft", "published"],                // OneOf(Set)
//!   "score": {"$range": {"start": 1, "end": 10}},    // OneOf(Range)
//!   "tags": {"name": "rust"},                        // Nested
//!   "labels": {"$eq": ["a", "b"]},                   // Equals on a list literal
//!   "author_id": {"$id": "01ARZ3NDEKTSV4RRFFQ69G5FAV"} // Equals on an identifier
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::identifier;
use crate::{ConditionError, IDENTIFIER_KEY, Value};

const RANGE_OPERATOR: &str = "$range";
const EQUALS_OPERATOR: &str = "$eq";

/// One requirement on a single attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum ConditionNode {
    /// The attribute must equal this value
    Equals(Value),
    /// The attribute must be a member of this set or range
    OneOf(Membership),
    /// The attribute must itself satisfy these conditions. When the attribute
    /// is a collection, at least one element must.
    Nested(Conditions),
}

impl ConditionNode {
    /// Requires the attribute to equal `value`.
    pub fn equals(value: impl Into<Value>) -> Self {
        Self::Equals(value.into())
    }

    /// Requires the attribute to be one of `values`.
    pub fn one_of<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::OneOf(Membership::Set(values.into_iter().map(Into::into).collect()))
    }

    /// Requires the attribute to fall within `range`.
    pub fn within(range: ValueRange) -> Self {
        Self::OneOf(Membership::Range(range))
    }

    /// Requires the attribute to satisfy `conditions`.
    pub fn nested(conditions: Conditions) -> Self {
        Self::Nested(conditions)
    }
}

impl From<Conditions> for ConditionNode {
    fn from(conditions: Conditions) -> Self {
        Self::Nested(conditions)
    }
}

impl From<Membership> for ConditionNode {
    fn from(membership: Membership) -> Self {
        Self::OneOf(membership)
    }
}

/// The values an attribute may take for a [`ConditionNode::OneOf`].
#[derive(Debug, Clone, PartialEq)]
pub enum Membership {
    /// An explicit set of values
    Set(Vec<Value>),
    /// A contiguous range of comparable values
    Range(ValueRange),
}

impl Membership {
    /// Whether `value` is a member.
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Membership::Set(values) => values.contains(value),
            Membership::Range(range) => range.contains(value),
        }
    }
}

/// A range of values between `start` and `end`.
///
/// `start` is always included; `end` is included unless the range is
/// `exclusive`. Values that cannot be ordered against both bounds are never
/// contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound, inclusive
    pub start: Value,
    /// Upper bound
    pub end: Value,
    /// Whether `end` is excluded
    #[serde(default)]
    pub exclusive: bool,
}

impl ValueRange {
    /// An inclusive range, like `start..=end`.
    pub fn inclusive(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            exclusive: false,
        }
    }

    /// A range excluding its end, like `start..end`.
    pub fn exclusive(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            exclusive: true,
        }
    }

    /// Whether `value` falls inside the range.
    pub fn contains(&self, value: &Value) -> bool {
        let above_start = matches!(
            self.start.compare(value),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        );
        let below_end = match value.compare(&self.end) {
            Some(std::cmp::Ordering::Less) => true,
            Some(std::cmp::Ordering::Equal) => !self.exclusive,
            _ => false,
        };
        above_start && below_end
    }
}

/// A conjunction of attribute requirements, keyed by attribute name.
///
/// Empty conditions place no constraint at all.
///
/// ```
/// use warrant_condition::{Conditions, ValueRange};
///
/// let conditions = Conditions::new()
///     .equals("owner_id", 42)
///     .one_of("status", ["draft", "published"])
///     .within("score", ValueRange::inclusive(1, 10))
///     .nested("tags", Conditions::new().equals("name", "rust"));
///
/// assert_eq!(conditions.len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub struct Conditions(BTreeMap<String, ConditionNode>);

impl Conditions {
    /// Conditions that every resource satisfies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a requirement on `attribute`, replacing any previous one.
    pub fn with(mut self, attribute: impl Into<String>, node: impl Into<ConditionNode>) -> Self {
        self.0.insert(attribute.into(), node.into());
        self
    }

    /// Requires `attribute` to equal `value`.
    pub fn equals(self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(attribute, ConditionNode::equals(value))
    }

    /// Requires `attribute` to be one of `values`.
    pub fn one_of<V: Into<Value>>(
        self,
        attribute: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.with(attribute, ConditionNode::one_of(values))
    }

    /// Requires `attribute` to fall within `range`.
    pub fn within(self, attribute: impl Into<String>, range: ValueRange) -> Self {
        self.with(attribute, ConditionNode::within(range))
    }

    /// Requires `attribute` to satisfy `conditions`.
    pub fn nested(self, attribute: impl Into<String>, conditions: Conditions) -> Self {
        self.with(attribute, ConditionNode::nested(conditions))
    }

    /// The requirement on `attribute`, if any.
    pub fn get(&self, attribute: &str) -> Option<&ConditionNode> {
        self.0.get(attribute)
    }

    /// Number of constrained attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no attribute is constrained.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates requirements in attribute name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConditionNode)> {
        self.0.iter().map(|(name, node)| (name.as_str(), node))
    }
}

impl<N: Into<String>> FromIterator<(N, ConditionNode)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (N, ConditionNode)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        )
    }
}

impl TryFrom<serde_json::Value> for Conditions {
    type Error = ConditionError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(fields) => fields
                .into_iter()
                .map(|(name, node)| {
                    Ok::<_, ConditionError>((name, ConditionNode::try_from(node)?))
                })
                .collect(),
            serde_json::Value::Null => Ok(Conditions::new()),
            other => Err(ConditionError::malformed(format!(
                "conditions must be an object, found {other}"
            ))),
        }
    }
}

impl TryFrom<serde_json::Value> for ConditionNode {
    type Error = ConditionError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Array(values) => Ok(ConditionNode::OneOf(Membership::Set(
                values.into_iter().map(Value::from).collect(),
            ))),
            serde_json::Value::Object(mut fields) if fields.len() == 1 => {
                if fields.contains_key(IDENTIFIER_KEY) {
                    identifier(&fields).map(ConditionNode::equals).ok_or_else(|| {
                        ConditionError::malformed(format!(
                            "{IDENTIFIER_KEY} must hold a ULID string"
                        ))
                    })
                } else if let Some(range) = fields.remove(RANGE_OPERATOR) {
                    let range: ValueRange = serde_json::from_value(range)?;
                    Ok(ConditionNode::within(range))
                } else if let Some(literal) = fields.remove(EQUALS_OPERATOR) {
                    Ok(ConditionNode::Equals(Value::from(literal)))
                } else {
                    Conditions::try_from(serde_json::Value::Object(fields))
                        .map(ConditionNode::Nested)
                }
            }
            serde_json::Value::Object(fields) => {
                Conditions::try_from(serde_json::Value::Object(fields)).map(ConditionNode::Nested)
            }
            scalar => Ok(ConditionNode::Equals(Value::from(scalar))),
        }
    }
}

impl From<&ConditionNode> for serde_json::Value {
    fn from(node: &ConditionNode) -> Self {
        match node {
            ConditionNode::Equals(value @ (Value::List(_) | Value::Record(_))) => {
                serde_json::json!({ EQUALS_OPERATOR: value })
            }
            ConditionNode::Equals(value) => serde_json::Value::from(value),
            ConditionNode::OneOf(Membership::Set(values)) => {
                serde_json::Value::Array(values.iter().map(serde_json::Value::from).collect())
            }
            ConditionNode::OneOf(Membership::Range(range)) => serde_json::json!({
                RANGE_OPERATOR: {
                    "start": &range.start,
                    "end": &range.end,
                    "exclusive": range.exclusive,
                }
            }),
            ConditionNode::Nested(conditions) => serde_json::Value::from(conditions),
        }
    }
}

impl From<ConditionNode> for serde_json::Value {
    fn from(node: ConditionNode) -> Self {
        serde_json::Value::from(&node)
    }
}

impl From<&Conditions> for serde_json::Value {
    fn from(conditions: &Conditions) -> Self {
        serde_json::Value::Object(
            conditions
                .iter()
                .map(|(name, node)| (name.to_string(), serde_json::Value::from(node)))
                .collect(),
        )
    }
}

impl From<Conditions> for serde_json::Value {
    fn from(conditions: Conditions) -> Self {
        serde_json::Value::from(&conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use testresult::TestResult;

    #[test]
    fn it_reads_every_node_shape_from_json() -> TestResult {
        let conditions: Conditions = serde_json::from_value(json!({
            "owner_id": 42,
            "status": ["draft", "published"],
            "score": {"$range": {"start": 1, "end": 10, "exclusive": true}},
            "tags": {"name": "rust"},
            "labels": {"$eq": ["a", "b"]},
        }))?;

        let expected = Conditions::new()
            .equals("owner_id", 42)
            .one_of("status", ["draft", "published"])
            .within("score", ValueRange::exclusive(1, 10))
            .nested("tags", Conditions::new().equals("name", "rust"))
            .equals("labels", vec!["a", "b"]);

        assert_eq!(conditions, expected);
        Ok(())
    }

    #[test]
    fn it_writes_json_that_reads_back_the_same_tree() -> TestResult {
        let conditions = Conditions::new()
            .equals("author", Record::new().with("name", "ana"))
            .within("score", ValueRange::inclusive(0.5, 2))
            .nested(
                "comments",
                Conditions::new().one_of("state", ["open", "closed"]),
            );

        let json = serde_json::to_value(&conditions)?;
        assert_eq!(
            json,
            json!({
                "author": {"$eq": {"name": "ana"}},
                "score": {"$range": {"start": 0.5, "end": 2, "exclusive": false}},
                "comments": {"state": ["open", "closed"]},
            })
        );

        let read: Conditions = serde_json::from_value(json)?;
        assert_eq!(read, conditions);
        Ok(())
    }

    #[test]
    fn it_keeps_identifiers_distinct_from_strings() -> TestResult {
        let id = ulid::Ulid::new();
        let conditions = Conditions::new()
            .equals("author_id", id)
            .one_of("editor_id", [id])
            .equals("slug", id.to_string());

        let json = serde_json::to_value(&conditions)?;
        assert_eq!(json["author_id"], json!({"$id": id.to_string()}));
        assert_eq!(json["slug"], json!(id.to_string()));

        let read: Conditions = serde_json::from_value(json)?;
        assert_eq!(read, conditions);

        let author = Record::new().with("author_id", id).with("editor_id", id);
        let author = author.with("slug", id.to_string());
        assert!(read.matches(&author)?);
        Ok(())
    }

    #[test]
    fn it_rejects_malformed_identifiers() {
        let result = Conditions::try_from(json!({"author_id": {"$id": "nope"}}));
        assert!(matches!(result, Err(ConditionError::Malformed { .. })));
    }

    #[test]
    fn it_treats_null_as_no_conditions() -> TestResult {
        let conditions: Conditions = serde_json::from_value(json!(null))?;
        assert!(conditions.is_empty());
        Ok(())
    }

    #[test]
    fn it_rejects_non_object_conditions() {
        let result: Result<Conditions, _> = serde_json::from_value(json!([1, 2]));
        assert!(result.is_err());

        let result = Conditions::try_from(json!({"score": {"$range": {"start": 1}}}));
        assert!(matches!(result, Err(ConditionError::Malformed { .. })));
    }

    #[test]
    fn it_checks_range_bounds() {
        let inclusive = ValueRange::inclusive(1, 10);
        let exclusive = ValueRange::exclusive(1, 10);

        assert!(inclusive.contains(&Value::from(1)));
        assert!(inclusive.contains(&Value::from(10)));
        assert!(!exclusive.contains(&Value::from(10)));
        assert!(exclusive.contains(&Value::from(9.5)));
        assert!(!inclusive.contains(&Value::from(0)));
        assert!(!inclusive.contains(&Value::from("5")));
    }

    #[test]
    fn it_checks_string_ranges() {
        let range = ValueRange::inclusive("b", "d");
        assert!(range.contains(&Value::from("c")));
        assert!(!range.contains(&Value::from("e")));
    }
}
