//! Error types for table operations.
//!
//! Remote failures keep the service's own error code and are classified into
//! an [`ErrorKind`] so callers can branch on throttling, missing tables and
//! the like without parsing messages.

use std::fmt;

use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

use crate::dynamodb::Item;

/// Result type alias for the dynamodb module.
pub type Result<T> = std::result::Result<T, Error>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by [`DynamoDb`](crate::dynamodb::DynamoDb) operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{operation} failed: {source}")]
    Service {
        operation: Operation,
        #[source]
        source: ServiceError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to build request: {0}")]
    Build(#[from] BuildError),

    #[error("unsupported attribute value: {0}")]
    UnsupportedValue(String),

    #[error("invalid index '{index}': {reason}")]
    InvalidIndex { index: String, reason: &'static str },

    #[error("batch write left {} item(s) unprocessed", .items.len())]
    UnprocessedItems { items: Vec<Item> },

    #[error("table '{table_name}' did not become active")]
    TableNotActive { table_name: String },

    #[error(transparent)]
    Serde(#[from] serde_dynamo::Error),
}

impl Error {
    /// Returns the service error kind, if this error came from a remote call.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Service { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

/// The remote call an [`Error::Service`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateTable,
    DescribeTable,
    PutItem,
    GetItem,
    UpdateItem,
    DeleteItem,
    Scan,
    Query,
    BatchWriteItem,
    UpdateTable,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CreateTable => "CreateTable",
            Operation::DescribeTable => "DescribeTable",
            Operation::PutItem => "PutItem",
            Operation::GetItem => "GetItem",
            Operation::UpdateItem => "UpdateItem",
            Operation::DeleteItem => "DeleteItem",
            Operation::Scan => "Scan",
            Operation::Query => "Query",
            Operation::BatchWriteItem => "BatchWriteItem",
            Operation::UpdateTable => "UpdateTable",
        };
        f.write_str(name)
    }
}

/// Coarse classification of service error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Throttling,
    ConditionalCheckFailed,
    ResourceNotFound,
    ResourceInUse,
    AccessDenied,
    Validation,
    Other,
}

impl ErrorKind {
    /// Maps a DynamoDB error code to its kind.
    pub fn from_code(code: &str) -> Self {
        match code {
            "ProvisionedThroughputExceededException"
            | "ThrottlingException"
            | "RequestLimitExceeded" => ErrorKind::Throttling,
            "ConditionalCheckFailedException" => ErrorKind::ConditionalCheckFailed,
            "ResourceNotFoundException" => ErrorKind::ResourceNotFound,
            "ResourceInUseException" => ErrorKind::ResourceInUse,
            "AccessDeniedException" | "UnrecognizedClientException" => ErrorKind::AccessDenied,
            "ValidationException" => ErrorKind::Validation,
            _ => ErrorKind::Other,
        }
    }
}

/// A failure reported by the remote service (or its transport).
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ServiceError {
    kind: ErrorKind,
    code: Option<String>,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ServiceError {
    /// Creates an error from a bare code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            kind: ErrorKind::from_code(&code),
            code: Some(code),
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an SDK error, keeping its service code when there is one.
    pub fn from_sdk<E, R>(err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
        R: fmt::Debug + Send + Sync + 'static,
    {
        let code = err
            .as_service_error()
            .and_then(|e| e.code())
            .map(str::to_string);
        let kind = code.as_deref().map_or(ErrorKind::Other, ErrorKind::from_code);
        Self {
            kind,
            code,
            message: DisplayErrorContext(&err).to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The service's error code, e.g. `ResourceNotFoundException`.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}
