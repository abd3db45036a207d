//! In-memory condition matching
//!
//! Evaluates a [`Conditions`] tree against a single [`Resource`]. Matching is
//! a pure function of its inputs: it reads attributes and never mutates
//! anything.

use tracing::trace;

use crate::{AttributeError, ConditionNode, Conditions, Resource, Value};

/// Checks whether `resource` satisfies every requirement in `conditions`.
///
/// Empty conditions are satisfied by every resource, without reading any
/// attribute. Otherwise every attribute must satisfy its node:
///
/// - [`ConditionNode::Equals`]: the attribute equals the value.
/// - [`ConditionNode::OneOf`]: the attribute is a member of the set or range.
/// - [`ConditionNode::Nested`]: the attribute satisfies the nested
///   conditions, or, when it is a [`Value::List`], at least one element does.
///
/// Failures to read an attribute are returned unchanged.
pub fn matches<R>(resource: &R, conditions: &Conditions) -> Result<bool, AttributeError>
where
    R: Resource + ?Sized,
{
    if conditions.is_empty() {
        return Ok(true);
    }

    for (name, node) in conditions.iter() {
        let attribute = resource.attribute(name)?;
        if !satisfies(&attribute, node)? {
            trace!(attribute = name, value = %attribute, "Condition not satisfied");
            return Ok(false);
        }
    }

    Ok(true)
}

fn satisfies(attribute: &Value, node: &ConditionNode) -> Result<bool, AttributeError> {
    match node {
        ConditionNode::Nested(conditions) => match attribute {
            Value::List(elements) => {
                for element in elements {
                    if matches(element, conditions)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            single => matches(single, conditions),
        },
        ConditionNode::OneOf(membership) => Ok(membership.contains(attribute)),
        ConditionNode::Equals(value) => Ok(attribute == value),
    }
}

impl Conditions {
    /// Checks whether `resource` satisfies these conditions. See [`matches`].
    pub fn matches<R>(&self, resource: &R) -> Result<bool, AttributeError>
    where
        R: Resource + ?Sized,
    {
        matches(resource, self)
    }
}
