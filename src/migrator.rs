//! Idempotent table provisioning.

use futures::{Stream, TryStreamExt};
use tracing::info;

use crate::dynamodb::TableSpec;
use crate::error::{Error, Result};
use crate::store::Store;

/// Creates the tables an application needs, leaving existing ones alone.
///
/// Safe to run on every startup: a table whose name already exists is
/// skipped without comparing its definition. Store errors are not retried,
/// and a newly created table is not waited on until it becomes active.
pub struct DynamoMigrator<S> {
    store: S,
}

impl<S: Store> DynamoMigrator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Processes `specs` in order, yielding each spec once its table exists.
    ///
    /// Nothing happens until the stream is polled. The first failure is
    /// yielded as an error and ends the stream.
    pub fn ensure_tables(
        &self,
        specs: Vec<TableSpec>,
    ) -> impl Stream<Item = Result<TableSpec>> + '_ {
        async_stream::try_stream! {
            for spec in specs {
                let existing = self
                    .store
                    .list_tables()
                    .await
                    .map_err(|e| Error::provision(spec.name(), e))?;

                if existing.iter().any(|name| name == spec.name()) {
                    info!("Table '{}' exists", spec.name());
                } else {
                    spec.validate()
                        .map_err(|reason| Error::provision(spec.name(), Error::InvalidSpec(reason)))?;
                    self.store
                        .create_table(&spec)
                        .await
                        .map_err(|e| Error::provision(spec.name(), e))?;
                    info!("Table '{}' created", spec.name());
                }

                yield spec;
            }
        }
    }

    /// Runs [`ensure_tables`](Self::ensure_tables) to completion.
    pub async fn migrate(&self, specs: Vec<TableSpec>) -> Result<Vec<TableSpec>> {
        self.ensure_tables(specs).try_collect().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HotelTable;
    use crate::dynamodb::{KeySchema, ScalarType, Schema};
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use futures::StreamExt;

    fn simple(name: &str) -> TableSpec {
        TableSpec::new(name, KeySchema::new("id", None))
            .with_schema(Schema::new().add_field("id", ScalarType::String))
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let store = MemoryStore::new();
        let migrator = DynamoMigrator::new(store.clone());
        let specs = vec![HotelTable::default().table_spec(), simple("audit")];

        let first = migrator.migrate(specs.clone()).await.unwrap();
        let second = migrator.migrate(specs.clone()).await.unwrap();

        assert_eq!(first, specs);
        assert_eq!(second, specs);
        assert_eq!(
            store.list_tables().await.unwrap(),
            vec!["audit".to_string(), "hotels".to_string()]
        );
    }

    #[tokio::test]
    async fn test_stream_is_lazy_and_ordered() {
        let store = MemoryStore::new();
        let migrator = DynamoMigrator::new(store.clone());

        let stream = migrator.ensure_tables(vec![simple("b"), simple("a")]);
        futures::pin_mut!(stream);
        assert!(store.list_tables().await.unwrap().is_empty());

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.name(), "b");
        assert_eq!(store.list_tables().await.unwrap(), vec!["b".to_string()]);

        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.name(), "a");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_spec_fails_the_pass() {
        let store = MemoryStore::new();
        let migrator = DynamoMigrator::new(store.clone());
        let broken = TableSpec::new("broken", KeySchema::new("id", None));

        let results: Vec<_> = migrator
            .ensure_tables(vec![broken, simple("never")])
            .collect()
            .await;

        assert_eq!(results.len(), 1);
        match &results[0] {
            Err(Error::Provision { table, .. }) => assert_eq!(table, "broken"),
            other => panic!("expected provision error, got {other:?}"),
        }
        assert!(store.list_tables().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_store_is_not_retried() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let migrator = DynamoMigrator::new(store);

        let err = migrator.migrate(vec![simple("hotels")]).await.unwrap_err();
        assert!(err.is_connectivity());
        assert!(matches!(
            err,
            Error::Provision { ref source, .. }
                if matches!(**source, Error::Store(StoreError::Connectivity(_)))
        ));
    }
}
