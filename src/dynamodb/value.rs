use aws_sdk_dynamodb::{primitives::Blob, types::AttributeValue};
use std::collections::HashMap;

use crate::dynamodb::{Error, FieldType};

/// A typed DynamoDB attribute value.
///
/// Mirrors the service's attribute-value encoding (`{"S": "text"}`,
/// `{"N": "123"}`, ...) as a Rust enum. Numbers are kept as their decimal
/// string so no precision is lost on the way through.
///
/// # Example
///
/// ```
/// use dynamodb_helper::dynamodb::Value;
///
/// let name = Value::from("Example");
/// let count = Value::number(42);
/// assert_eq!(name.as_str(), Some("Example"));
/// assert_eq!(count.as_number(), Some("42"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(String),
    Binary(Vec<u8>),
    Bool(bool),
    Null,
    List(Vec<Value>),
    Map(HashMap<String, Value>),
    StringSet(Vec<String>),
    NumberSet(Vec<String>),
    BinarySet(Vec<Vec<u8>>),
}

impl Value {
    /// Creates a number value from anything that prints as a decimal.
    pub fn number(n: impl ToString) -> Self {
        Value::Number(n.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the decimal string of a number value.
    pub fn as_number(&self) -> Option<&str> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The scalar key type of this value, if it can be used as a key.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Value::String(_) => Some(FieldType::String),
            Value::Number(_) => Some(FieldType::Number),
            Value::Binary(_) => Some(FieldType::Binary),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Binary(bytes)
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => AttributeValue::S(s),
            Value::Number(n) => AttributeValue::N(n),
            Value::Binary(b) => AttributeValue::B(Blob::new(b)),
            Value::Bool(b) => AttributeValue::Bool(b),
            Value::Null => AttributeValue::Null(true),
            Value::List(values) => {
                AttributeValue::L(values.into_iter().map(AttributeValue::from).collect())
            }
            Value::Map(map) => AttributeValue::M(
                map.into_iter()
                    .map(|(k, v)| (k, AttributeValue::from(v)))
                    .collect(),
            ),
            Value::StringSet(set) => AttributeValue::Ss(set),
            Value::NumberSet(set) => AttributeValue::Ns(set),
            Value::BinarySet(set) => AttributeValue::Bs(set.into_iter().map(Blob::new).collect()),
        }
    }
}

impl TryFrom<AttributeValue> for Value {
    type Error = Error;

    fn try_from(av: AttributeValue) -> Result<Self, Self::Error> {
        let value = match av {
            AttributeValue::S(s) => Value::String(s),
            AttributeValue::N(n) => Value::Number(n),
            AttributeValue::B(b) => Value::Binary(b.into_inner()),
            AttributeValue::Bool(b) => Value::Bool(b),
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::L(values) => Value::List(
                values
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            AttributeValue::M(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| Ok((k, Value::try_from(v)?)))
                    .collect::<Result<_, Error>>()?,
            ),
            AttributeValue::Ss(set) => Value::StringSet(set),
            AttributeValue::Ns(set) => Value::NumberSet(set),
            AttributeValue::Bs(set) => {
                Value::BinarySet(set.into_iter().map(Blob::into_inner).collect())
            }
            other => return Err(Error::UnsupportedValue(format!("{other:?}"))),
        };
        Ok(value)
    }
}
