use aws_sdk_dynamodb::{
    types::{
        AttributeDefinition, CreateGlobalSecondaryIndexAction, GlobalSecondaryIndexUpdate,
        KeySchemaElement, KeyType, ProvisionedThroughput, PutRequest, TableStatus, WriteRequest,
    },
    Client,
};
use std::collections::HashMap;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use crate::dynamodb::backend::{CreateTableRequest, DynamoDbApi, QueryRequest, UpdateItemRequest};
use crate::dynamodb::{
    AttributeMap, Error, ErrorKind, Item, Operation, Result, SecondaryIndex, ServiceError, Table,
    Update, Value,
};
use crate::utils::{retry_with_backoff_if, RetryPolicy};

/// Most put requests DynamoDB accepts in one `BatchWriteItem` call.
pub const MAX_BATCH_WRITE_ITEMS: usize = 25;

/// What [`DynamoDb::ensure_table`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Created,
    AlreadyExists,
}

/// DynamoDB client wrapper bound to a single table.
///
/// This struct provides a convenient interface for interacting with one Amazon
/// DynamoDB table, turning simple arguments into the service's request shapes.
/// It holds no state besides the table configuration, so any number of calls
/// may run on it concurrently as long as the underlying client allows it.
///
/// # DynamoDB Concepts
///
/// ## Primary Key
/// Each item is identified by its partition key. The adapter only needs the
/// key's *value*; the attribute name comes from the [`Table`] configuration.
///
/// ## Operations
/// - **Put**: Add or replace an item
/// - **Get**: Retrieve an item by its primary key
/// - **Update**: Apply an update expression to an item
/// - **Delete**: Remove an item (deleting a missing item is not an error)
/// - **Query**: Retrieve items matching the primary key
/// - **Scan**: Read every item in the table
/// - **Batch write**: Put many items with as few requests as possible
///
/// Scans and queries follow the service's continuation keys until every page
/// is read. Batch writes re-submit unprocessed items according to the batch
/// [`RetryPolicy`] and report whatever is still left as
/// [`Error::UnprocessedItems`].
///
/// # Example
///
/// ```no_run
/// use dynamodb_helper::dynamodb::{DynamoDb, Item, Table};
///
/// # async fn example() -> dynamodb_helper::dynamodb::Result<()> {
/// let config = aws_config::load_from_env().await;
/// let ddb = DynamoDb::new(&config, Table::new("MyTable", "ID"));
///
/// ddb.put_item(Item::new().set_string("ID", "1").set_string("Name", "Example"))
///     .await?;
/// let item = ddb.get_item("1").await?;
/// # Ok(())
/// # }
/// ```
///
/// # Error Handling
///
/// Every method returns [`Result`]; remote failures carry the service's error
/// code and an [`ErrorKind`](crate::dynamodb::ErrorKind) to branch on.
#[derive(Debug, Clone)]
pub struct DynamoDb<C = Client> {
    client: C,
    table: Table,
    batch_retry: RetryPolicy,
    table_wait: RetryPolicy,
}

impl DynamoDb<Client> {
    /// Creates a new `DynamoDb` instance from a loaded SDK configuration.
    pub fn new(sdk_config: &aws_config::SdkConfig, table: Table) -> Self {
        Self::with_client(Client::new(sdk_config), table)
    }
}

impl<C: DynamoDbApi> DynamoDb<C> {
    /// Wraps any [`DynamoDbApi`] implementation.
    pub fn with_client(client: C, table: Table) -> Self {
        Self {
            client,
            table,
            batch_retry: RetryPolicy::new(Duration::from_millis(100), 5),
            table_wait: RetryPolicy::new(Duration::from_secs(1), 10),
        }
    }

    /// Sets how unprocessed batch items are re-submitted.
    pub fn with_batch_retry(mut self, policy: RetryPolicy) -> Self {
        self.batch_retry = policy;
        self
    }

    /// Sets how [`ensure_table`](Self::ensure_table) polls for the table to become active.
    pub fn with_table_wait(mut self, policy: RetryPolicy) -> Self {
        self.table_wait = policy;
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    // --- Table Operations ---

    /// Creates the table if it doesn't exist and waits until it is active.
    pub async fn ensure_table(&self) -> Result<TableState> {
        let table_name = self.table.name();
        let request = CreateTableRequest {
            key_schema: vec![KeySchemaElement::builder()
                .attribute_name(self.table.primary_key())
                .key_type(KeyType::Hash)
                .build()?],
            attribute_definitions: vec![AttributeDefinition::builder()
                .attribute_name(self.table.primary_key())
                .attribute_type(self.table.primary_key_type().into())
                .build()?],
            provisioned_throughput: self.throughput()?,
        };

        let state = match self.client.create_table(table_name, request).await {
            Ok(()) => {
                info!("Table '{table_name}' created");
                TableState::Created
            }
            Err(e) if e.kind() == ErrorKind::ResourceInUse => {
                info!("Table '{table_name}' already exists");
                TableState::AlreadyExists
            }
            Err(e) => return Err(self.service_error(Operation::CreateTable, e)),
        };

        retry_with_backoff_if(
            move || self.check_active(),
            self.table_wait,
            still_settling,
        )
        .await?;

        Ok(state)
    }

    async fn check_active(&self) -> Result<()> {
        let status = self
            .client
            .describe_table_status(self.table.name())
            .await
            .map_err(|e| self.service_error(Operation::DescribeTable, e))?;
        debug!("Table '{}' status: {:?}", self.table.name(), status);
        match status {
            Some(TableStatus::Active) => Ok(()),
            _ => Err(Error::TableNotActive {
                table_name: self.table.name().to_string(),
            }),
        }
    }

    // --- Item Operations ---

    /// Puts an item into the table, replacing any item with the same key.
    pub async fn put_item(&self, item: Item) -> Result<()> {
        self.client
            .put_item(self.table.name(), item.into())
            .await
            .map_err(|e| self.service_error(Operation::PutItem, e))?;

        info!("Item added to '{}'", self.table.name());
        Ok(())
    }

    /// Gets the item whose primary key equals `key`.
    ///
    /// Returns `None` when the service returns no item.
    pub async fn get_item(&self, key: impl Into<Value>) -> Result<Option<Item>> {
        let item = self
            .client
            .get_item(self.table.name(), self.key(key)?)
            .await
            .map_err(|e| self.service_error(Operation::GetItem, e))?;

        item.map(Item::try_from).transpose()
    }

    /// Applies `update` to the item with primary key `key`.
    ///
    /// Returns the updated attributes as reported by the service.
    pub async fn update_item(&self, key: impl Into<Value>, update: &Update) -> Result<Item> {
        let names = update.names().clone();
        let values: AttributeMap = update
            .values()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone().into()))
            .collect();

        let request = UpdateItemRequest {
            key: self.key(key)?,
            update_expression: update.expression().to_string(),
            // the service rejects empty placeholder maps
            expression_attribute_names: (!names.is_empty()).then_some(names),
            expression_attribute_values: (!values.is_empty()).then_some(values),
        };

        let attributes = self
            .client
            .update_item(self.table.name(), request)
            .await
            .map_err(|e| self.service_error(Operation::UpdateItem, e))?;

        info!("Item updated in '{}'", self.table.name());
        attributes.map_or_else(|| Ok(Item::new()), Item::try_from)
    }

    /// Deletes the item with primary key `key`. Missing items are not an error.
    pub async fn delete_item(&self, key: impl Into<Value>) -> Result<()> {
        self.client
            .delete_item(self.table.name(), self.key(key)?)
            .await
            .map_err(|e| self.service_error(Operation::DeleteItem, e))?;

        info!("Item deleted from '{}'", self.table.name());
        Ok(())
    }

    // --- Query and Scan Operations ---

    /// Scans the whole table.
    pub async fn scan_table(&self) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let page = self
                .client
                .scan(self.table.name(), last_evaluated_key)
                .await
                .map_err(|e| self.service_error(Operation::Scan, e))?;

            debug!("Scan page of {} item(s)", page.items.len());
            for attrs in page.items {
                items.push(Item::try_from(attrs)?);
            }

            last_evaluated_key = page.last_evaluated_key;

            if last_evaluated_key.is_none() {
                break;
            }
        }

        Ok(items)
    }

    /// Queries the items whose primary key equals `key`.
    pub async fn query_table(&self, key: impl Into<Value>) -> Result<Vec<Item>> {
        let key = self.key_value(key)?;
        let mut items = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let request = QueryRequest {
                key_condition_expression: "#pk = :pk".to_string(),
                expression_attribute_names: HashMap::from([(
                    "#pk".to_string(),
                    self.table.primary_key().to_string(),
                )]),
                expression_attribute_values: HashMap::from([(
                    ":pk".to_string(),
                    key.clone().into(),
                )]),
                exclusive_start_key: last_evaluated_key,
            };

            let page = self
                .client
                .query(self.table.name(), request)
                .await
                .map_err(|e| self.service_error(Operation::Query, e))?;

            debug!("Query page of {} item(s)", page.items.len());
            for attrs in page.items {
                items.push(Item::try_from(attrs)?);
            }

            last_evaluated_key = page.last_evaluated_key;

            if last_evaluated_key.is_none() {
                break;
            }
        }

        Ok(items)
    }

    // --- Batch and Index Operations ---

    /// Writes `items` with `BatchWriteItem`, at most 25 per request.
    ///
    /// Unprocessed items are re-submitted with backoff. If some are still
    /// unprocessed once the retries run out, the error lists them together
    /// with any items that were never sent.
    pub async fn batch_write_items(&self, items: impl IntoIterator<Item = Item>) -> Result<()> {
        let requests = items
            .into_iter()
            .map(|item| {
                let put = PutRequest::builder().set_item(Some(item.into())).build()?;
                Ok(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>>>()?;
        let total = requests.len();

        let mut chunks = requests.chunks(MAX_BATCH_WRITE_ITEMS);
        while let Some(chunk) = chunks.next() {
            let unprocessed = self.write_chunk(chunk.to_vec()).await?;
            if !unprocessed.is_empty() {
                let leftover = unprocessed
                    .into_iter()
                    .chain(chunks.by_ref().flatten().cloned())
                    .filter_map(|request| request.put_request)
                    .map(|put| Item::try_from(put.item))
                    .collect::<Result<Vec<_>>>()?;
                error!(
                    "Batch write to '{}' left {} item(s) unprocessed",
                    self.table.name(),
                    leftover.len()
                );
                return Err(Error::UnprocessedItems { items: leftover });
            }
        }

        info!("{total} item(s) written to '{}' in batch", self.table.name());
        Ok(())
    }

    /// Sends one chunk, re-submitting unprocessed requests until the retry
    /// budget is spent. Returns what is still unprocessed.
    async fn write_chunk(&self, mut pending: Vec<WriteRequest>) -> Result<Vec<WriteRequest>> {
        let mut delays = self.batch_retry.delays();

        loop {
            pending = self
                .client
                .batch_write(self.table.name(), pending)
                .await
                .map_err(|e| self.service_error(Operation::BatchWriteItem, e))?;

            if pending.is_empty() {
                return Ok(pending);
            }
            match delays.next() {
                Some(delay) => {
                    warn!(
                        "{} unprocessed item(s), retrying in {:?}",
                        pending.len(),
                        delay
                    );
                    sleep(delay).await;
                }
                None => return Ok(pending),
            }
        }
    }

    /// Requests a new global secondary index on the table.
    ///
    /// The first key attribute becomes the index's HASH key and the optional
    /// second its RANGE key. Success means the service accepted the request;
    /// the index is built in the background.
    pub async fn create_global_secondary_index(&self, index: &SecondaryIndex) -> Result<()> {
        let key_schema = index.key_schema();
        if key_schema.is_empty() || key_schema.len() > 2 {
            return Err(Error::InvalidIndex {
                index: index.name().to_string(),
                reason: "key schema needs one or two attributes",
            });
        }

        let attribute_definitions = key_schema
            .iter()
            .map(|(name, field_type)| {
                AttributeDefinition::builder()
                    .attribute_name(name)
                    .attribute_type((*field_type).into())
                    .build()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let key_elements = key_schema
            .iter()
            .zip([KeyType::Hash, KeyType::Range])
            .map(|((name, _), key_type)| {
                KeySchemaElement::builder()
                    .attribute_name(name)
                    .key_type(key_type)
                    .build()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let create = CreateGlobalSecondaryIndexAction::builder()
            .index_name(index.name())
            .set_key_schema(Some(key_elements))
            .projection(index.projection().to_sdk())
            .provisioned_throughput(self.throughput()?)
            .build()?;

        self.client
            .update_table(
                self.table.name(),
                attribute_definitions,
                GlobalSecondaryIndexUpdate::builder().create(create).build(),
            )
            .await
            .map_err(|e| self.service_error(Operation::UpdateTable, e))?;

        info!(
            "Global secondary index '{}' requested on '{}'",
            index.name(),
            self.table.name()
        );
        Ok(())
    }

    // --- Helpers ---

    /// Checks that `value` can be a key. A scalar of the wrong type is still
    /// sent, so the service decides; anything else is rejected here.
    fn key_value(&self, value: impl Into<Value>) -> Result<Value> {
        let value: Value = value.into();
        match value.field_type() {
            Some(field_type) if field_type == self.table.primary_key_type() => Ok(value),
            Some(field_type) => {
                warn!(
                    "Key of type {field_type} used on '{}', whose key '{}' is {}",
                    self.table.name(),
                    self.table.primary_key(),
                    self.table.primary_key_type()
                );
                Ok(value)
            }
            None => Err(Error::UnsupportedValue(format!(
                "key '{}' must be a string, number or binary, got {value:?}",
                self.table.primary_key()
            ))),
        }
    }

    fn key(&self, value: impl Into<Value>) -> Result<AttributeMap> {
        let value = self.key_value(value)?;
        Ok(HashMap::from([(
            self.table.primary_key().to_string(),
            value.into(),
        )]))
    }

    fn throughput(&self) -> Result<ProvisionedThroughput> {
        Ok(ProvisionedThroughput::builder()
            .read_capacity_units(self.table.read_capacity())
            .write_capacity_units(self.table.write_capacity())
            .build()?)
    }

    fn service_error(&self, operation: Operation, source: ServiceError) -> Error {
        error!(
            "Error during {operation} on '{}': {source}",
            self.table.name()
        );
        Error::Service { operation, source }
    }
}

/// Errors worth polling through while a table is being created. A new table
/// can briefly be reported as missing.
fn still_settling(err: &Error) -> bool {
    matches!(err, Error::TableNotActive { .. })
        || matches!(
            err.kind(),
            Some(ErrorKind::ResourceNotFound | ErrorKind::Throttling)
        )
}
