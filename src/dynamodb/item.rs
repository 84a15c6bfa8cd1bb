use aws_sdk_dynamodb::types::AttributeValue;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

use crate::dynamodb::{Result, Value};

/// The wire shape of an item as the SDK sends and receives it.
pub type AttributeMap = HashMap<String, AttributeValue>;

/// Represents a DynamoDB item with typed attribute values.
///
/// In DynamoDB, an item is a collection of attributes, each with a name and a value.
/// Items are similar to rows or records in other database systems.
///
/// # Item Structure
///
/// - Each item consists of one or more attributes.
/// - Each attribute has a name and a [`Value`].
/// - Every item in a table carries the table's primary key attribute.
///
/// # Item Size Limit
///
/// - The maximum item size in DynamoDB is 400 KB, including both attribute names and values.
///
/// # Example
///
/// ```
/// use dynamodb_helper::dynamodb::Item;
///
/// let item = Item::new()
///     .set_string("ID", "1")
///     .set_string("Name", "Example")
///     .set_number("Stock", 30);
/// assert_eq!(item.get_string("Name"), Some("Example"));
/// ```
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Item {
    attributes: HashMap<String, Value>,
}

impl Item {
    /// Creates a new empty `Item`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute to any value.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets a string attribute.
    pub fn set_string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, Value::String(value.into()))
    }

    /// Sets a number attribute.
    ///
    /// In DynamoDB, number attributes are sent as decimal strings and stored with high precision.
    pub fn set_number(self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, Value::number(value))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Gets the value of an attribute as a string.
    ///
    /// Returns `None` if the attribute doesn't exist or is not a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Gets the value of an attribute as a number (f64).
    ///
    /// Returns `None` if the attribute doesn't exist, is not a number, or can't be parsed as f64.
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key)
            .and_then(Value::as_number)
            .and_then(|n| n.parse().ok())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    /// Builds an item from any serde-serializable struct.
    pub fn from_serde<T: Serialize>(value: &T) -> Result<Self> {
        let map: AttributeMap = serde_dynamo::to_item(value)?;
        Self::try_from(map)
    }

    /// Deserializes the item into a serde type.
    pub fn to_serde<T: DeserializeOwned>(&self) -> Result<T> {
        let map = AttributeMap::from(self.clone());
        Ok(serde_dynamo::from_item(map)?)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Item {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl From<Item> for AttributeMap {
    fn from(item: Item) -> Self {
        item.attributes
            .into_iter()
            .map(|(k, v)| (k, AttributeValue::from(v)))
            .collect()
    }
}

impl TryFrom<AttributeMap> for Item {
    type Error = crate::dynamodb::Error;

    fn try_from(map: AttributeMap) -> Result<Self> {
        map.into_iter()
            .map(|(k, av)| Ok((k, Value::try_from(av)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Product {
        #[serde(rename = "ID")]
        id: String,
        name: String,
        price: f64,
        tags: Vec<String>,
    }

    #[test]
    fn test_item_operations() {
        let item = Item::new()
            .set_string("key1", "value1")
            .set_number("key2", 42.0)
            .set("key3", true);

        assert_eq!(item.get_string("key1"), Some("value1"));
        assert_eq!(item.get_number("key2"), Some(42.0));
        assert_eq!(item.get("key3"), Some(&Value::Bool(true)));
        assert_eq!(item.get_string("key2"), None);
        assert_eq!(item.get_number("non_existent"), None);
        assert_eq!(item.len(), 3);
    }

    #[test]
    fn test_item_serde() {
        let product = Product {
            id: "7".to_string(),
            name: "Smartphone".to_string(),
            price: 599.99,
            tags: vec!["new".to_string()],
        };
        let item = Item::from_serde(&product).unwrap();
        assert_eq!(item.get_string("ID"), Some("7"));
        assert_eq!(item.get_number("price"), Some(599.99));

        let back: Product = item.to_serde().unwrap();
        assert_eq!(back, product);
    }
}
