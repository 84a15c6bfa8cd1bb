use crate::dynamodb::{Error, FieldType, Result};

const DEFAULT_CAPACITY: i64 = 5;

/// DynamoDB table configuration.
///
/// This struct describes the one table a [`DynamoDb`](crate::dynamodb::DynamoDb)
/// adapter is bound to. It is fixed once the adapter is built.
///
/// # Table Structure
///
/// - **Table Name**: A unique identifier for the table within your AWS account and region.
/// - **Primary Key**: A single partition (HASH) key attribute and its scalar type.
///
/// # Provisioned Throughput
///
/// Read and write capacity units are used when the table or one of its
/// secondary indexes is created. Both default to 5.
///
/// # Example
///
/// ```
/// use dynamodb_helper::dynamodb::{FieldType, Table};
///
/// # fn main() -> dynamodb_helper::dynamodb::Result<()> {
/// let table = Table::new("MyTable", "ID")
///     .with_primary_key_type(FieldType::Number)
///     .with_capacity(10, 2)?;
/// assert_eq!(table.read_capacity(), 10);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    primary_key: String,
    primary_key_type: FieldType,
    read_capacity: i64,
    write_capacity: i64,
}

impl Table {
    /// Creates a new `Table` with a string primary key and default capacity.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the DynamoDB table.
    /// * `primary_key` - The name of the partition key attribute.
    pub fn new(name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: primary_key.into(),
            primary_key_type: FieldType::default(),
            read_capacity: DEFAULT_CAPACITY,
            write_capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_primary_key_type(mut self, primary_key_type: FieldType) -> Self {
        self.primary_key_type = primary_key_type;
        self
    }

    /// Sets the provisioned read and write capacity units.
    ///
    /// Both must be positive, the same rule the environment overrides follow.
    pub fn with_capacity(mut self, read_capacity: i64, write_capacity: i64) -> Result<Self> {
        self.read_capacity = check_capacity("read capacity", read_capacity)?;
        self.write_capacity = check_capacity("write capacity", write_capacity)?;
        Ok(self)
    }

    /// Applies overrides from the process environment.
    ///
    /// Recognised variables: `DYNAMODB_TABLE_NAME`, `DYNAMODB_PRIMARY_KEY`,
    /// `DYNAMODB_PRIMARY_KEY_TYPE`, `DYNAMODB_READ_CAPACITY` and
    /// `DYNAMODB_WRITE_CAPACITY`. Unset variables leave the current value.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(name) = lookup("DYNAMODB_TABLE_NAME") {
            self.name = name;
        }
        if let Some(primary_key) = lookup("DYNAMODB_PRIMARY_KEY") {
            self.primary_key = primary_key;
        }
        if let Some(code) = lookup("DYNAMODB_PRIMARY_KEY_TYPE") {
            self.primary_key_type = code.parse()?;
        }
        if let Some(units) = lookup("DYNAMODB_READ_CAPACITY") {
            self.read_capacity = parse_capacity("DYNAMODB_READ_CAPACITY", &units)?;
        }
        if let Some(units) = lookup("DYNAMODB_WRITE_CAPACITY") {
            self.write_capacity = parse_capacity("DYNAMODB_WRITE_CAPACITY", &units)?;
        }
        Ok(self)
    }

    /// Returns the name of the table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the partition key attribute name.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn primary_key_type(&self) -> FieldType {
        self.primary_key_type
    }

    pub fn read_capacity(&self) -> i64 {
        self.read_capacity
    }

    pub fn write_capacity(&self) -> i64 {
        self.write_capacity
    }
}

fn parse_capacity(var: &str, units: &str) -> Result<i64> {
    let units = units
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::Config(format!("{var} must be a positive integer, got '{units}'")))?;
    check_capacity(var, units)
}

fn check_capacity(what: &str, units: i64) -> Result<i64> {
    if units > 0 {
        Ok(units)
    } else {
        Err(Error::Config(format!(
            "{what} must be a positive integer, got {units}"
        )))
    }
}
