use std::sync::Arc;

use crate::{AttributeError, Value};

/// Anything whose attributes can be checked against conditions.
///
/// Host entity types implement this to expose their attributes to the
/// matcher and to stores. Collections of embedded entities are exposed as
/// [`Value::List`] of [`Value::Record`]s so that nested conditions can
/// quantify over them.
///
/// ```
/// use warrant_condition::{AttributeError, Resource, Value};
///
/// struct Article {
///     owner_id: i64,
/// }
///
/// impl Resource for Article {
///     fn attribute(&self, name: &str) -> Result<Value, AttributeError> {
///         match name {
///             "owner_id" => Ok(self.owner_id.into()),
///             _ => Err(AttributeError::missing(name)),
///         }
///     }
/// }
/// ```
pub trait Resource {
    /// Reads the attribute called `name`.
    fn attribute(&self, name: &str) -> Result<Value, AttributeError>;
}

/// Only record values have attributes.
impl Resource for Value {
    fn attribute(&self, name: &str) -> Result<Value, AttributeError> {
        match self {
            Value::Record(record) => record.attribute(name),
            other => Err(AttributeError::NotAResource {
                name: name.to_string(),
                found: other.data_type(),
            }),
        }
    }
}

impl<T: Resource + ?Sized> Resource for &T {
    fn attribute(&self, name: &str) -> Result<Value, AttributeError> {
        (**self).attribute(name)
    }
}

impl<T: Resource + ?Sized> Resource for Box<T> {
    fn attribute(&self, name: &str) -> Result<Value, AttributeError> {
        (**self).attribute(name)
    }
}

impl<T: Resource + ?Sized> Resource for Arc<T> {
    fn attribute(&self, name: &str) -> Result<Value, AttributeError> {
        (**self).attribute(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Record, ValueType};
    use pretty_assertions::assert_eq;

    #[test]
    fn it_reads_attributes_from_record_values() {
        let value = Value::from(Record::new().with("name", "x"));
        assert_eq!(value.attribute("name"), Ok(Value::from("x")));
        assert_eq!(
            value.attribute("other"),
            Err(AttributeError::missing("other"))
        );
    }

    #[test]
    fn it_refuses_attributes_of_scalars() {
        assert_eq!(
            Value::from(5).attribute("name"),
            Err(AttributeError::NotAResource {
                name: "name".into(),
                found: ValueType::SignedInt,
            })
        );
    }

    #[test]
    fn it_reads_through_smart_pointers() {
        let record = Arc::new(Record::new().with("id", 1));
        let boxed: Box<dyn Resource> = Box::new(Record::new().with("id", 2));
        assert_eq!(record.attribute("id"), Ok(Value::from(1)));
        assert_eq!(boxed.attribute("id"), Ok(Value::from(2)));
    }
}
