use aws_sdk_dynamodb::types::{ProjectionType, ScalarAttributeType};
use std::{fmt, str::FromStr};

use crate::dynamodb::Error;

/// Scalar type of a key attribute.
///
/// Only strings, numbers and binaries can be used in a table's or an index's
/// key schema. The service names them with single-character codes
/// (`S`, `N`, `B`), which is also what [`FromStr`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldType {
    /// Represents a string field.
    #[default]
    String,
    /// Represents a number field.
    Number,
    /// Represents a binary field.
    Binary,
}

impl FieldType {
    pub fn code(&self) -> &'static str {
        match self {
            FieldType::String => "S",
            FieldType::Number => "N",
            FieldType::Binary => "B",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(FieldType::String),
            "N" => Ok(FieldType::Number),
            "B" => Ok(FieldType::Binary),
            other => Err(Error::Config(format!(
                "unknown key attribute type '{other}', expected S, N or B"
            ))),
        }
    }
}

impl From<FieldType> for ScalarAttributeType {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => ScalarAttributeType::S,
            FieldType::Number => ScalarAttributeType::N,
            FieldType::Binary => ScalarAttributeType::B,
        }
    }
}

/// Which attributes a secondary index copies from the table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    All,
    KeysOnly,
    /// Keys plus the listed non-key attributes.
    Include(Vec<String>),
}

impl Projection {
    pub(crate) fn to_sdk(&self) -> aws_sdk_dynamodb::types::Projection {
        let builder = aws_sdk_dynamodb::types::Projection::builder();
        let builder = match self {
            Projection::All => builder.projection_type(ProjectionType::All),
            Projection::KeysOnly => builder.projection_type(ProjectionType::KeysOnly),
            Projection::Include(attrs) => builder
                .projection_type(ProjectionType::Include)
                .set_non_key_attributes(Some(attrs.clone())),
        };
        builder.build()
    }
}

/// A global secondary index definition.
///
/// # Key schema
///
/// The key schema is an ordered list of `(attribute, type)` pairs. The first
/// pair is the index's partition (HASH) key, the optional second pair its
/// sort (RANGE) key.
///
/// # Example
///
/// ```
/// use dynamodb_helper::dynamodb::{FieldType, SecondaryIndex};
///
/// let index = SecondaryIndex::new("MyGSI").with_key("Name", FieldType::String);
/// assert_eq!(index.key_schema().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryIndex {
    name: String,
    key_schema: Vec<(String, FieldType)>,
    projection: Projection,
}

impl SecondaryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_schema: Vec::new(),
            projection: Projection::default(),
        }
    }

    /// Appends a key attribute; order matters.
    pub fn with_key(mut self, attribute: impl Into<String>, field_type: FieldType) -> Self {
        self.key_schema.push((attribute.into(), field_type));
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_schema(&self) -> &[(String, FieldType)] {
        &self.key_schema
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }
}
