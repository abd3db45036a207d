//! Dynamic attribute values
//!
//! Both the in-memory matcher and the store's native filters compare
//! attributes through the equality and ordering defined here, which keeps the
//! two evaluation paths in agreement.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::Record;

/// Key of the single-entry JSON object that carries an identifier, e.g.
/// `{"$id": "01ARZ3NDEKTSV4RRFFQ69G5FAV"}`.
pub const IDENTIFIER_KEY: &str = "$id";

/// `2^63`, the first float above every `i64`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// A dynamically typed attribute value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    /// The absence of a value
    Null,
    /// A boolean
    Boolean(bool),
    /// A 64-bit signed integer
    SignedInt(i64),
    /// A floating point number
    Float(f64),
    /// A UTF-8 string
    String(String),
    /// A record identity, as assigned by a store
    Identifier(Ulid),
    /// An ordered collection of values
    List(Vec<Value>),
    /// An embedded record
    Record(Record),
}

/// The type of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// [`Value::Null`]
    Null,
    /// [`Value::Boolean`]
    Boolean,
    /// [`Value::SignedInt`]
    SignedInt,
    /// [`Value::Float`]
    Float,
    /// [`Value::String`]
    String,
    /// [`Value::Identifier`]
    Identifier,
    /// [`Value::List`]
    List,
    /// [`Value::Record`]
    Record,
}

impl ValueType {
    /// Name used for this type in the native filter representation.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::SignedInt => "signed_int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Identifier => "identifier",
            ValueType::List => "list",
            ValueType::Record => "record",
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Get the [`ValueType`] that corresponds to this variant of [`Value`]
    pub fn data_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Boolean(_) => ValueType::Boolean,
            Value::SignedInt(_) => ValueType::SignedInt,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Identifier(_) => ValueType::Identifier,
            Value::List(_) => ValueType::List,
            Value::Record(_) => ValueType::Record,
        }
    }

    /// Returns the elements if this value is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(elements) => Some(elements),
            _ => None,
        }
    }

    /// Returns the embedded record if this value is one.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Orders two values when they are comparable.
    ///
    /// Numbers compare across integer and float representations. Strings,
    /// booleans and identifiers only compare with their own kind. Everything
    /// else is incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::SignedInt(a), Value::SignedInt(b)) => Some(a.cmp(b)),
            (Value::SignedInt(a), Value::Float(b)) => compare_int_to_float(*a, *b),
            (Value::Float(a), Value::SignedInt(b)) => {
                compare_int_to_float(*b, *a).map(Ordering::reverse)
            }
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Identifier(a), Value::Identifier(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::SignedInt(a), Value::SignedInt(b)) => a == b,
            (Value::SignedInt(a), Value::Float(b)) | (Value::Float(b), Value::SignedInt(a)) => {
                compare_int_to_float(*a, *b) == Some(Ordering::Equal)
            }
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Identifier(a), Value::Identifier(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

/// Orders an integer against a float without rounding either of them.
fn compare_int_to_float(int: i64, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    if float >= I64_LIMIT {
        return Some(Ordering::Less);
    }
    if float < -I64_LIMIT {
        return Some(Ordering::Greater);
    }

    // In range, so the truncated float converts to i64 exactly
    let whole = float.trunc();
    Some(int.cmp(&(whole as i64)).then_with(|| {
        if float > whole {
            Ordering::Less
        } else if float < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }))
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", serde_json::Value::from(self))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::SignedInt(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::SignedInt(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::SignedInt(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Ulid> for Value {
    fn from(value: Ulid) -> Self {
        Value::Identifier(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::SignedInt(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(elements) => {
                Value::List(elements.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => match identifier(&fields) {
                Some(id) => Value::Identifier(id),
                None => Value::Record(
                    fields
                        .into_iter()
                        .map(|(name, value)| (name, Value::from(value)))
                        .collect(),
                ),
            },
        }
    }
}

/// Reads the `{"$id": "<ulid>"}` form of an identifier.
pub(crate) fn identifier(fields: &serde_json::Map<String, serde_json::Value>) -> Option<Ulid> {
    match fields.get(IDENTIFIER_KEY) {
        Some(serde_json::Value::String(id)) if fields.len() == 1 => Ulid::from_string(id).ok(),
        _ => None,
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::SignedInt(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Identifier(id) => serde_json::json!({ IDENTIFIER_KEY: id.to_string() }),
            Value::List(elements) => {
                serde_json::Value::Array(elements.iter().map(serde_json::Value::from).collect())
            }
            Value::Record(record) => serde_json::Value::Object(
                record
                    .iter()
                    .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        serde_json::Value::from(&value)
    }
}
