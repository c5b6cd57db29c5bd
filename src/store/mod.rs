//! The store client boundary.
//!
//! The repository and the migrator only talk to the key-value store through
//! [`Store`]. [`DynamoDb`](crate::dynamodb::DynamoDb) implements it against
//! Amazon DynamoDB; [`MemoryStore`] implements the same contract in process.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::dynamodb::{Item, TableSpec};
use crate::error::StoreError;

/// Condition attached to a put. The put only happens if the condition holds
/// against the item currently stored under the same key.
#[derive(Debug, Clone, PartialEq)]
pub enum PutCondition {
    /// The stored item exists and `name` equals `value`.
    AttributeEquals { name: String, value: AttributeValue },
}

impl PutCondition {
    pub fn attribute_equals(name: impl Into<String>, value: AttributeValue) -> Self {
        PutCondition::AttributeEquals {
            name: name.into(),
            value,
        }
    }
}

/// Equality query on a hash key, against the table or one of its indexes.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub table_name: String,
    pub index_name: Option<String>,
    pub hash_key: (String, AttributeValue),
    pub exclusive_start_key: Option<Item>,
    pub limit: Option<i32>,
}

impl QueryRequest {
    pub fn new(
        table_name: impl Into<String>,
        hash_key_name: impl Into<String>,
        hash_key_value: AttributeValue,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            index_name: None,
            hash_key: (hash_key_name.into(), hash_key_value),
            exclusive_start_key: None,
            limit: None,
        }
    }

    pub fn index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start_after(mut self, key: Option<Item>) -> Self {
        self.exclusive_start_key = key;
        self
    }
}

/// One page of query results, ordered by the range key ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub items: Vec<Item>,
    pub last_evaluated_key: Option<Item>,
}

/// Request/response access to a DynamoDB-style store.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_tables(&self) -> Result<Vec<String>, StoreError>;

    async fn create_table(&self, spec: &TableSpec) -> Result<(), StoreError>;

    /// Writes `item`, replacing any item with the same key. Fails with
    /// [`StoreError::ConditionFailed`] when `condition` does not hold.
    async fn put_item(
        &self,
        table_name: &str,
        item: Item,
        condition: Option<PutCondition>,
    ) -> Result<(), StoreError>;

    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>, StoreError>;

    /// Deleting a missing item is not an error.
    async fn delete_item(&self, table_name: &str, key: Item) -> Result<(), StoreError>;

    async fn query(&self, request: QueryRequest) -> Result<QueryPage, StoreError>;
}
