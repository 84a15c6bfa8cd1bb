//! # DynamoDB Module
//!
//! This module provides a small, typed interface over one Amazon DynamoDB table.
//!
//! ## Components
//!
//! - `DynamoDb`: The table adapter performing item, scan, query, batch and index operations.
//! - `DynamoDbApi`: The remote-call seam the adapter sends its requests through.
//! - `Item` / `Value`: Typed items and attribute values.
//! - `Update`: An update expression with its placeholder maps.
//! - `SecondaryIndex` / `FieldType`: Global secondary index definitions.
//! - `Table`: The table configuration the adapter is bound to.
//!
//! ## Usage
//!
//! AWS credentials and region are resolved by `aws_config` from the environment:
//!
//! - `AWS_ACCESS_KEY_ID`: Your AWS access key ID.
//! - `AWS_SECRET_ACCESS_KEY`: Your AWS secret access key.
//! - `AWS_REGION`: The AWS region where your DynamoDB tables are located.
//!
//! Optionally, you can also set:
//! - `AWS_SESSION_TOKEN`: If you're using temporary credentials.
//! - `AWS_ENDPOINT_URL`: For using a custom endpoint (e.g., for local development).
//!
//! ## Example
//!
//! ```no_run
//! use dynamodb_helper::dynamodb::{DynamoDb, FieldType, Item, SecondaryIndex, Table, Update, Value};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = aws_config::load_from_env().await;
//!     let ddb = DynamoDb::new(&config, Table::new("MyTable", "ID"));
//!
//!     ddb.put_item(Item::new().set_string("ID", "1").set_string("Name", "Example"))
//!         .await?;
//!
//!     let update = Update::new("SET #attrName = :attrValue")
//!         .name("#attrName", "Name")
//!         .value(":attrValue", Value::from("UpdatedValue"));
//!     let updated = ddb.update_item("1", &update).await?;
//!
//!     let index = SecondaryIndex::new("MyGSI").with_key("Name", FieldType::String);
//!     ddb.create_global_secondary_index(&index).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
mod client;
mod error;
mod item;
mod schema;
mod table;
mod update;
mod value;

pub use backend::DynamoDbApi;
pub use client::{DynamoDb, TableState, MAX_BATCH_WRITE_ITEMS};
pub use error::{Error, ErrorKind, Operation, Result, ServiceError};
pub use item::{AttributeMap, Item};
pub use schema::{FieldType, Projection, SecondaryIndex};
pub use table::Table;
pub use update::Update;
pub use value::Value;
