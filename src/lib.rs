//! Async data access for hotels stored in DynamoDB.
//!
//! - [`HotelRepository`] maps [`Hotel`] values to items: save, versioned
//!   update, delete, get and a query by state over a global secondary index.
//! - [`DynamoMigrator`] creates missing tables from [`TableSpec`]s and leaves
//!   existing ones alone.
//! - [`AttributeCodec`] converts the free-form `properties` JSON to and from
//!   DynamoDB attribute values.
//!
//! Both the repository and the migrator reach the database through the
//! [`Store`] trait, implemented by [`DynamoDb`] and by the in-process
//! [`MemoryStore`].
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use hotel_dynamo::{DynamoDb, DynamoMigrator, Hotel, HotelRepository, HotelTable};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = aws_config::load_from_env().await;
//! let ddb = DynamoDb::new(&config);
//! let table = HotelTable::default();
//!
//! DynamoMigrator::new(ddb.clone()).migrate(vec![table.table_spec()]).await?;
//!
//! let repo = HotelRepository::new(ddb, table);
//! let saved = repo.save(&Hotel::new("Harbor Inn").state("OR")).await?;
//! let updated = repo.update(&saved).await?;
//! assert_eq!(updated.version, 2);
//!
//! let oregon: Vec<Hotel> = repo.find_by_state("OR").try_collect().await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod document;
pub mod dynamodb;
pub mod error;
pub mod hotel;
pub mod logging;
pub mod migrator;
pub mod repository;
pub mod store;

#[cfg(test)]
mod tests;

pub use codec::{AttributeCodec, JsonAttributeCodec};
pub use config::{HotelTable, Settings};
pub use dynamodb::{DynamoDb, TableSpec};
pub use error::{Error, Result, StoreError};
pub use hotel::Hotel;
pub use migrator::DynamoMigrator;
pub use repository::HotelRepository;
pub use store::{MemoryStore, Store};
