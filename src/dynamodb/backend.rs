//! The remote-call seam behind [`DynamoDb`](crate::dynamodb::DynamoDb).
//!
//! [`DynamoDbApi`] has one method per DynamoDB request the adapter issues and
//! speaks the SDK's wire shapes. The production implementation forwards to
//! [`aws_sdk_dynamodb::Client`]; tests substitute an in-memory fake.

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    types::{
        AttributeDefinition, GlobalSecondaryIndexUpdate, KeySchemaElement, ProvisionedThroughput,
        ReturnValue, TableStatus, WriteRequest,
    },
    Client,
};
use std::collections::HashMap;

use crate::dynamodb::{AttributeMap, ServiceError};

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// One page of a scan or query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<AttributeMap>,
    /// Set when the service stopped early; pass it back to continue.
    pub last_evaluated_key: Option<AttributeMap>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableRequest {
    pub key_schema: Vec<KeySchemaElement>,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub provisioned_throughput: ProvisionedThroughput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateItemRequest {
    pub key: AttributeMap,
    pub update_expression: String,
    pub expression_attribute_names: Option<HashMap<String, String>>,
    pub expression_attribute_values: Option<AttributeMap>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub key_condition_expression: String,
    pub expression_attribute_names: HashMap<String, String>,
    pub expression_attribute_values: AttributeMap,
    pub exclusive_start_key: Option<AttributeMap>,
}

/// Remote DynamoDB operations used by the table adapter.
#[async_trait]
pub trait DynamoDbApi: Send + Sync {
    async fn create_table(&self, table_name: &str, request: CreateTableRequest)
        -> ServiceResult<()>;

    /// Current status of the table, `None` if the service did not report one.
    async fn describe_table_status(&self, table_name: &str) -> ServiceResult<Option<TableStatus>>;

    async fn put_item(&self, table_name: &str, item: AttributeMap) -> ServiceResult<()>;

    async fn get_item(&self, table_name: &str, key: AttributeMap)
        -> ServiceResult<Option<AttributeMap>>;

    /// Applies an update and returns the `UPDATED_NEW` attributes.
    async fn update_item(
        &self,
        table_name: &str,
        request: UpdateItemRequest,
    ) -> ServiceResult<Option<AttributeMap>>;

    async fn delete_item(&self, table_name: &str, key: AttributeMap) -> ServiceResult<()>;

    async fn scan(
        &self,
        table_name: &str,
        exclusive_start_key: Option<AttributeMap>,
    ) -> ServiceResult<Page>;

    async fn query(&self, table_name: &str, request: QueryRequest) -> ServiceResult<Page>;

    /// Sends one batch and returns the requests the service left unprocessed.
    async fn batch_write(
        &self,
        table_name: &str,
        requests: Vec<WriteRequest>,
    ) -> ServiceResult<Vec<WriteRequest>>;

    async fn update_table(
        &self,
        table_name: &str,
        attribute_definitions: Vec<AttributeDefinition>,
        index_update: GlobalSecondaryIndexUpdate,
    ) -> ServiceResult<()>;
}

#[async_trait]
impl DynamoDbApi for Client {
    async fn create_table(
        &self,
        table_name: &str,
        request: CreateTableRequest,
    ) -> ServiceResult<()> {
        self.create_table()
            .table_name(table_name)
            .set_key_schema(Some(request.key_schema))
            .set_attribute_definitions(Some(request.attribute_definitions))
            .provisioned_throughput(request.provisioned_throughput)
            .send()
            .await
            .map_err(ServiceError::from_sdk)?;
        Ok(())
    }

    async fn describe_table_status(&self, table_name: &str) -> ServiceResult<Option<TableStatus>> {
        let output = self
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(ServiceError::from_sdk)?;
        Ok(output.table().and_then(|t| t.table_status()).cloned())
    }

    async fn put_item(&self, table_name: &str, item: AttributeMap) -> ServiceResult<()> {
        self.put_item()
            .table_name(table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(ServiceError::from_sdk)?;
        Ok(())
    }

    async fn get_item(
        &self,
        table_name: &str,
        key: AttributeMap,
    ) -> ServiceResult<Option<AttributeMap>> {
        let response = self
            .get_item()
            .table_name(table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(ServiceError::from_sdk)?;
        Ok(response.item)
    }

    async fn update_item(
        &self,
        table_name: &str,
        request: UpdateItemRequest,
    ) -> ServiceResult<Option<AttributeMap>> {
        let response = self
            .update_item()
            .table_name(table_name)
            .set_key(Some(request.key))
            .update_expression(request.update_expression)
            .set_expression_attribute_names(request.expression_attribute_names)
            .set_expression_attribute_values(request.expression_attribute_values)
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(ServiceError::from_sdk)?;
        Ok(response.attributes)
    }

    async fn delete_item(&self, table_name: &str, key: AttributeMap) -> ServiceResult<()> {
        self.delete_item()
            .table_name(table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(ServiceError::from_sdk)?;
        Ok(())
    }

    async fn scan(
        &self,
        table_name: &str,
        exclusive_start_key: Option<AttributeMap>,
    ) -> ServiceResult<Page> {
        let response = self
            .scan()
            .table_name(table_name)
            .set_exclusive_start_key(exclusive_start_key)
            .send()
            .await
            .map_err(ServiceError::from_sdk)?;
        Ok(Page {
            items: response.items.unwrap_or_default(),
            last_evaluated_key: response.last_evaluated_key,
        })
    }

    async fn query(&self, table_name: &str, request: QueryRequest) -> ServiceResult<Page> {
        let response = self
            .query()
            .table_name(table_name)
            .key_condition_expression(request.key_condition_expression)
            .set_expression_attribute_names(Some(request.expression_attribute_names))
            .set_expression_attribute_values(Some(request.expression_attribute_values))
            .set_exclusive_start_key(request.exclusive_start_key)
            .send()
            .await
            .map_err(ServiceError::from_sdk)?;
        Ok(Page {
            items: response.items.unwrap_or_default(),
            last_evaluated_key: response.last_evaluated_key,
        })
    }

    async fn batch_write(
        &self,
        table_name: &str,
        requests: Vec<WriteRequest>,
    ) -> ServiceResult<Vec<WriteRequest>> {
        let response = self
            .batch_write_item()
            .request_items(table_name, requests)
            .send()
            .await
            .map_err(ServiceError::from_sdk)?;
        Ok(response
            .unprocessed_items
            .and_then(|mut unprocessed| unprocessed.remove(table_name))
            .unwrap_or_default())
    }

    async fn update_table(
        &self,
        table_name: &str,
        attribute_definitions: Vec<AttributeDefinition>,
        index_update: GlobalSecondaryIndexUpdate,
    ) -> ServiceResult<()> {
        self.update_table()
            .table_name(table_name)
            .set_attribute_definitions(Some(attribute_definitions))
            .global_secondary_index_updates(index_update)
            .send()
            .await
            .map_err(ServiceError::from_sdk)?;
        Ok(())
    }
}
