//! In-memory stand-in for the DynamoDB service.
//!
//! Records every call it receives so tests can also use it as a spy. Supports
//! small page sizes, scripted query pages, simulated unprocessed batch items,
//! tables that take a few polls to become active, and injected failures.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, GlobalSecondaryIndexUpdate, TableStatus, WriteRequest,
};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::dynamodb::backend::{
    CreateTableRequest, DynamoDbApi, Page, QueryRequest, ServiceResult, UpdateItemRequest,
};
use crate::dynamodb::{AttributeMap, ServiceError, MAX_BATCH_WRITE_ITEMS};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateTable(String, CreateTableRequest),
    DescribeTable(String),
    PutItem(String),
    GetItem(String),
    UpdateItem(String, UpdateItemRequest),
    DeleteItem(String),
    Scan(String),
    Query(String, QueryRequest),
    BatchWrite(String, usize),
    UpdateTable(String, Vec<AttributeDefinition>, GlobalSecondaryIndexUpdate),
}

#[derive(Debug)]
struct Store {
    key: String,
    items: BTreeMap<String, AttributeMap>,
    pending_polls: usize,
}

impl Store {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            items: BTreeMap::new(),
            pending_polls: 0,
        }
    }

    fn key_of(&self, item: &AttributeMap) -> ServiceResult<String> {
        item.get(&self.key)
            .map(|av| format!("{av:?}"))
            .ok_or_else(|| {
                ServiceError::new(
                    "ValidationException",
                    format!("missing key attribute '{}'", self.key),
                )
            })
    }

    fn page(
        &self,
        matching: Vec<&AttributeMap>,
        start: Option<AttributeMap>,
        size: usize,
    ) -> ServiceResult<Page> {
        let skip = match start {
            Some(start) => {
                let start = self.key_of(&start)?;
                matching
                    .iter()
                    .position(|item| self.key_of(item).ok().as_deref() == Some(start.as_str()))
                    .map_or(0, |i| i + 1)
            }
            None => 0,
        };
        let items: Vec<AttributeMap> = matching
            .iter()
            .skip(skip)
            .take(size)
            .map(|item| (*item).clone())
            .collect();
        let more = matching.len() > skip + items.len();
        let last_evaluated_key = match items.last() {
            Some(last) if more => Some(HashMap::from([(
                self.key.clone(),
                last[&self.key].clone(),
            )])),
            _ => None,
        };
        Ok(Page {
            items,
            last_evaluated_key,
        })
    }
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Store>,
    calls: Vec<Call>,
    page_size: Option<usize>,
    unprocessed_rounds: usize,
    creating_polls: usize,
    fail_next: Option<ServiceError>,
    describe_failure: Option<(String, String)>,
    query_pages: VecDeque<Page>,
}

impl State {
    fn begin(&mut self, call: Call) -> ServiceResult<()> {
        self.calls.push(call);
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn store(&mut self, table_name: &str) -> ServiceResult<&mut Store> {
        self.tables.get_mut(table_name).ok_or_else(|| {
            ServiceError::new(
                "ResourceNotFoundException",
                format!("Requested resource not found: Table: {table_name} not found"),
            )
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeDynamoDb {
    state: Arc<Mutex<State>>,
}

impl FakeDynamoDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake that already has an active table keyed on `key`.
    pub fn with_table(table_name: &str, key: &str) -> Self {
        let fake = Self::new();
        fake.lock()
            .tables
            .insert(table_name.to_string(), Store::new(key));
        fake
    }

    /// Caps how many items one scan or query page returns.
    pub fn page_size(self, size: usize) -> Self {
        self.lock().page_size = Some(size);
        self
    }

    /// The next `rounds` batch writes leave their last request unprocessed.
    pub fn unprocessed_rounds(self, rounds: usize) -> Self {
        self.lock().unprocessed_rounds = rounds;
        self
    }

    /// Newly created tables report `CREATING` for this many polls.
    pub fn creating_polls(self, polls: usize) -> Self {
        self.lock().creating_polls = polls;
        self
    }

    /// Every `DescribeTable` call fails with this error.
    pub fn fail_describe(self, code: &str, message: &str) -> Self {
        self.lock().describe_failure = Some((code.to_string(), message.to_string()));
        self
    }

    /// Queries return these pages in order, ignoring the stored items.
    pub fn query_pages(self, pages: Vec<Page>) -> Self {
        self.lock().query_pages = pages.into();
        self
    }

    pub fn fail_next(&self, code: &str, message: &str) {
        self.lock().fail_next = Some(ServiceError::new(code, message));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn item_count(&self, table_name: &str) -> usize {
        self.lock()
            .tables
            .get(table_name)
            .map_or(0, |store| store.items.len())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

fn resolve_name<'a>(
    token: &'a str,
    names: &'a Option<HashMap<String, String>>,
) -> ServiceResult<&'a str> {
    if !token.starts_with('#') {
        return Ok(token);
    }
    names
        .as_ref()
        .and_then(|names| names.get(token))
        .map(String::as_str)
        .ok_or_else(|| ServiceError::new("ValidationException", format!("unbound name {token}")))
}

/// Evaluates `SET a = :x, #b = :y` style expressions.
fn apply_set(
    item: &mut AttributeMap,
    request: &UpdateItemRequest,
) -> ServiceResult<AttributeMap> {
    let assignments = request
        .update_expression
        .trim()
        .strip_prefix("SET ")
        .ok_or_else(|| ServiceError::new("ValidationException", "only SET is supported"))?;

    let mut updated = AttributeMap::new();
    for assignment in assignments.split(',') {
        let (lhs, rhs) = assignment
            .split_once('=')
            .ok_or_else(|| ServiceError::new("ValidationException", "malformed assignment"))?;
        let name = resolve_name(lhs.trim(), &request.expression_attribute_names)?;
        let value = request
            .expression_attribute_values
            .as_ref()
            .and_then(|values| values.get(rhs.trim()))
            .ok_or_else(|| {
                ServiceError::new("ValidationException", format!("unbound value {}", rhs.trim()))
            })?;
        item.insert(name.to_string(), value.clone());
        updated.insert(name.to_string(), value.clone());
    }
    Ok(updated)
}

#[async_trait]
impl DynamoDbApi for FakeDynamoDb {
    async fn create_table(
        &self,
        table_name: &str,
        request: CreateTableRequest,
    ) -> ServiceResult<()> {
        let mut state = self.lock();
        let key = request.key_schema[0].attribute_name().to_string();
        state.begin(Call::CreateTable(table_name.to_string(), request))?;
        if state.tables.contains_key(table_name) {
            return Err(ServiceError::new(
                "ResourceInUseException",
                format!("Table already exists: {table_name}"),
            ));
        }
        let mut store = Store::new(&key);
        store.pending_polls = state.creating_polls;
        state.tables.insert(table_name.to_string(), store);
        Ok(())
    }

    async fn describe_table_status(&self, table_name: &str) -> ServiceResult<Option<TableStatus>> {
        let mut state = self.lock();
        state.begin(Call::DescribeTable(table_name.to_string()))?;
        if let Some((code, message)) = &state.describe_failure {
            return Err(ServiceError::new(code, message));
        }
        let store = state.store(table_name)?;
        if store.pending_polls > 0 {
            store.pending_polls -= 1;
            return Ok(Some(TableStatus::Creating));
        }
        Ok(Some(TableStatus::Active))
    }

    async fn put_item(&self, table_name: &str, item: AttributeMap) -> ServiceResult<()> {
        let mut state = self.lock();
        state.begin(Call::PutItem(table_name.to_string()))?;
        let store = state.store(table_name)?;
        let key = store.key_of(&item)?;
        store.items.insert(key, item);
        Ok(())
    }

    async fn get_item(
        &self,
        table_name: &str,
        key: AttributeMap,
    ) -> ServiceResult<Option<AttributeMap>> {
        let mut state = self.lock();
        state.begin(Call::GetItem(table_name.to_string()))?;
        let store = state.store(table_name)?;
        let key = store.key_of(&key)?;
        Ok(store.items.get(&key).cloned())
    }

    async fn update_item(
        &self,
        table_name: &str,
        request: UpdateItemRequest,
    ) -> ServiceResult<Option<AttributeMap>> {
        let mut state = self.lock();
        state.begin(Call::UpdateItem(table_name.to_string(), request.clone()))?;
        let store = state.store(table_name)?;
        let key = store.key_of(&request.key)?;
        let item = store
            .items
            .entry(key)
            .or_insert_with(|| request.key.clone());
        let updated = apply_set(item, &request)?;
        Ok((!updated.is_empty()).then_some(updated))
    }

    async fn delete_item(&self, table_name: &str, key: AttributeMap) -> ServiceResult<()> {
        let mut state = self.lock();
        state.begin(Call::DeleteItem(table_name.to_string()))?;
        let store = state.store(table_name)?;
        let key = store.key_of(&key)?;
        store.items.remove(&key);
        Ok(())
    }

    async fn scan(
        &self,
        table_name: &str,
        exclusive_start_key: Option<AttributeMap>,
    ) -> ServiceResult<Page> {
        let mut state = self.lock();
        state.begin(Call::Scan(table_name.to_string()))?;
        let size = state.page_size.unwrap_or(usize::MAX);
        let store = state.store(table_name)?;
        let all = store.items.values().collect();
        store.page(all, exclusive_start_key, size)
    }

    async fn query(&self, table_name: &str, request: QueryRequest) -> ServiceResult<Page> {
        let mut state = self.lock();
        state.begin(Call::Query(table_name.to_string(), request.clone()))?;
        if let Some(page) = state.query_pages.pop_front() {
            return Ok(page);
        }
        let size = state.page_size.unwrap_or(usize::MAX);
        let store = state.store(table_name)?;
        let attribute = request
            .expression_attribute_names
            .get("#pk")
            .cloned()
            .unwrap_or_default();
        let wanted: Option<&AttributeValue> = request.expression_attribute_values.get(":pk");
        let matching = store
            .items
            .values()
            .filter(|item| item.get(&attribute) == wanted && wanted.is_some())
            .collect();
        store.page(matching, request.exclusive_start_key, size)
    }

    async fn batch_write(
        &self,
        table_name: &str,
        mut requests: Vec<WriteRequest>,
    ) -> ServiceResult<Vec<WriteRequest>> {
        let mut state = self.lock();
        state.begin(Call::BatchWrite(table_name.to_string(), requests.len()))?;
        if requests.len() > MAX_BATCH_WRITE_ITEMS {
            return Err(ServiceError::new(
                "ValidationException",
                "Too many items requested for the BatchWriteItem call",
            ));
        }

        let mut unprocessed = Vec::new();
        if state.unprocessed_rounds > 0 {
            state.unprocessed_rounds -= 1;
            unprocessed.extend(requests.pop());
        }

        let store = state.store(table_name)?;
        for request in requests {
            if let Some(put) = request.put_request {
                let key = store.key_of(&put.item)?;
                store.items.insert(key, put.item);
            }
        }
        Ok(unprocessed)
    }

    async fn update_table(
        &self,
        table_name: &str,
        attribute_definitions: Vec<AttributeDefinition>,
        index_update: GlobalSecondaryIndexUpdate,
    ) -> ServiceResult<()> {
        let mut state = self.lock();
        state.begin(Call::UpdateTable(
            table_name.to_string(),
            attribute_definitions,
            index_update,
        ))?;
        state.store(table_name)?;
        Ok(())
    }
}
