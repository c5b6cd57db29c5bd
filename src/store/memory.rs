//! In-process store for tests and local development.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use tokio::sync::RwLock;

use super::{PutCondition, QueryPage, QueryRequest, Store};
use crate::dynamodb::{Item, KeySchema, Projection, TableSpec};
use crate::error::StoreError;

#[derive(Debug)]
struct MemoryTable {
    spec: TableSpec,
    items: HashMap<String, Item>,
}

/// In-memory implementation of [`Store`].
///
/// Tables and items live in `Arc<RwLock<_>>`, so clones share the same data.
/// Nothing is persisted. Behaves like DynamoDB where the repository can
/// observe it: key validation, conditional puts, index queries sorted by the
/// range key, sparse indexes, projections and `Limit`-based paging.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, MemoryTable>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails with [`StoreError::Connectivity`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    /// Number of items currently stored in `table_name`.
    pub async fn item_count(&self, table_name: &str) -> Option<usize> {
        let tables = self.tables.read().await;
        tables.get(table_name).map(|t| t.items.len())
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Connectivity(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

fn rejected(operation: &'static str, message: impl Into<String>) -> StoreError {
    StoreError::Rejected {
        operation,
        message: message.into(),
    }
}

fn table_not_found(operation: &'static str, table_name: &str) -> StoreError {
    rejected(
        operation,
        format!("ResourceNotFoundException: table '{table_name}' does not exist"),
    )
}

/// Renders one key attribute into a comparable string, or `None` if it is
/// missing or not a scalar key type.
fn key_part(item: &Item, name: &str) -> Option<String> {
    match item.get(name)? {
        AttributeValue::S(s) => Some(format!("S:{s}")),
        AttributeValue::N(n) => Some(format!("N:{n}")),
        AttributeValue::B(b) => Some(format!("B:{:?}", b.as_ref())),
        _ => None,
    }
}

fn storage_key(
    operation: &'static str,
    keys: &KeySchema,
    item: &Item,
) -> Result<String, StoreError> {
    keys.attribute_names()
        .map(|name| {
            key_part(item, name).ok_or_else(|| {
                rejected(
                    operation,
                    format!("ValidationException: missing or invalid key attribute '{name}'"),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|parts| parts.join("\u{1f}"))
}

fn compare_attributes(a: Option<&AttributeValue>, b: Option<&AttributeValue>) -> Ordering {
    match (a, b) {
        (Some(AttributeValue::N(a)), Some(AttributeValue::N(b))) => {
            match (a.parse::<f64>(), b.parse::<f64>()) {
                (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => a.cmp(b),
            }
        }
        (Some(AttributeValue::S(a)), Some(AttributeValue::S(b))) => a.as_bytes().cmp(b.as_bytes()),
        (Some(AttributeValue::B(a)), Some(AttributeValue::B(b))) => a.as_ref().cmp(b.as_ref()),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn project(item: &Item, table: &KeySchema, index: &KeySchema, projection: &Projection) -> Item {
    let keys = table.attribute_names().chain(index.attribute_names());
    match projection {
        Projection::All => item.clone(),
        Projection::KeysOnly => item.project(keys),
        Projection::Include(extra) => item.project(keys.chain(extra.iter().map(String::as_str))),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create_table(&self, spec: &TableSpec) -> Result<(), StoreError> {
        self.check_available()?;
        spec.validate()
            .map_err(|e| rejected("CreateTable", format!("ValidationException: {e}")))?;

        let mut tables = self.tables.write().await;
        if tables.contains_key(spec.name()) {
            return Err(rejected(
                "CreateTable",
                format!("ResourceInUseException: table '{}' already exists", spec.name()),
            ));
        }
        tables.insert(
            spec.name().to_string(),
            MemoryTable {
                spec: spec.clone(),
                items: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn put_item(
        &self,
        table_name: &str,
        item: Item,
        condition: Option<PutCondition>,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| table_not_found("PutItem", table_name))?;
        let key = storage_key("PutItem", table.spec.key_schema(), &item)?;

        if let Some(PutCondition::AttributeEquals { name, value }) = condition {
            let holds = table
                .items
                .get(&key)
                .and_then(|stored| stored.get(&name))
                .is_some_and(|stored| *stored == value);
            if !holds {
                return Err(StoreError::ConditionFailed);
            }
        }

        table.items.insert(key, item);
        Ok(())
    }

    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let table = tables
            .get(table_name)
            .ok_or_else(|| table_not_found("GetItem", table_name))?;
        let key = storage_key("GetItem", table.spec.key_schema(), &key)?;
        Ok(table.items.get(&key).cloned())
    }

    async fn delete_item(&self, table_name: &str, key: Item) -> Result<(), StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| table_not_found("DeleteItem", table_name))?;
        let key = storage_key("DeleteItem", table.spec.key_schema(), &key)?;
        table.items.remove(&key);
        Ok(())
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryPage, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| table_not_found("Query", &request.table_name))?;

        let table_keys = table.spec.key_schema();
        let (keys, projection) = match &request.index_name {
            Some(index_name) => {
                let index = table.spec.index(index_name).ok_or_else(|| {
                    rejected(
                        "Query",
                        format!("ValidationException: table has no index named '{index_name}'"),
                    )
                })?;
                (index.key_schema(), index.projection().clone())
            }
            None => (table_keys, Projection::All),
        };

        let (hash_name, hash_value) = &request.hash_key;
        if hash_name != keys.hash_key() {
            return Err(rejected(
                "Query",
                format!("ValidationException: '{hash_name}' is not the hash key"),
            ));
        }

        let mut matches: Vec<&Item> = table
            .items
            .values()
            .filter(|item| item.get(hash_name) == Some(hash_value))
            // Items missing an index key attribute are absent from the index.
            .filter(|item| keys.attribute_names().all(|name| key_part(item, name).is_some()))
            .collect();

        matches.sort_by(|a, b| {
            let by_range = keys
                .range_key()
                .map(|range| compare_attributes(a.get(range), b.get(range)))
                .unwrap_or(Ordering::Equal);
            by_range.then_with(|| {
                let a = storage_key("Query", table_keys, a).unwrap_or_default();
                let b = storage_key("Query", table_keys, b).unwrap_or_default();
                a.cmp(&b)
            })
        });

        let start = match &request.exclusive_start_key {
            Some(start_key) => {
                let start_key = storage_key("Query", table_keys, start_key)?;
                matches
                    .iter()
                    .position(|item| {
                        storage_key("Query", table_keys, item).ok().as_ref() == Some(&start_key)
                    })
                    .map_or(matches.len(), |p| p + 1)
            }
            None => 0,
        };

        let remaining = &matches[start..];
        let take = request
            .limit
            .map_or(remaining.len(), |l| (l.max(0) as usize).min(remaining.len()));
        let page = &remaining[..take];

        let last_evaluated_key = if take < remaining.len() {
            page.last().map(|item| {
                item.project(table_keys.attribute_names().chain(keys.attribute_names()))
            })
        } else {
            None
        };

        Ok(QueryPage {
            items: page
                .iter()
                .map(|item| project(item, table_keys, keys, &projection))
                .collect(),
            last_evaluated_key,
        })
    }
}
