//! A thin, typed helper over a single Amazon DynamoDB table.

pub mod dynamodb;
pub mod logging;
pub mod utils;
