use std::collections::HashMap;

use crate::dynamodb::Value;

/// An update expression with its placeholder maps.
///
/// ```
/// use dynamodb_helper::dynamodb::{Update, Value};
///
/// let update = Update::new("SET #n = :v")
///     .name("#n", "Name")
///     .value(":v", Value::from("UpdatedValue"));
/// assert_eq!(update.expression(), "SET #n = :v");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    expression: String,
    names: HashMap<String, String>,
    values: HashMap<String, Value>,
}

impl Update {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            names: HashMap::new(),
            values: HashMap::new(),
        }
    }

    /// Maps a `#placeholder` to a real attribute name.
    pub fn name(mut self, placeholder: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.names.insert(placeholder.into(), attribute.into());
        self
    }

    /// Maps a `:placeholder` to a value.
    pub fn value(mut self, placeholder: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(placeholder.into(), value.into());
        self
    }

    pub fn with_names(mut self, names: HashMap<String, String>) -> Self {
        self.names.extend(names);
        self
    }

    pub fn with_values(mut self, values: HashMap<String, Value>) -> Self {
        self.values.extend(values);
        self
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn names(&self) -> &HashMap<String, String> {
        &self.names
    }

    pub fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }
}
