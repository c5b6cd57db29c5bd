//! # DynamoDB Module
//!
//! Amazon DynamoDB building blocks: the client wrapper and the table, key
//! and item types it speaks.
//!
//! ## Components
//!
//! - `DynamoDb`: client wrapper implementing [`Store`](crate::store::Store).
//! - `Item`: a DynamoDB item (attribute name to attribute value map).
//! - `Schema`, `ScalarType`: attribute definitions for key attributes.
//! - `KeySchema`, `SecondaryIndex`, `Projection`, `Throughput`: key and index
//!   layout.
//! - `TableSpec`: everything needed to create a table.
//!
//! ## Usage
//!
//! The client is configured from the environment:
//!
//! - `AWS_ACCESS_KEY_ID`: Your AWS access key ID.
//! - `AWS_SECRET_ACCESS_KEY`: Your AWS secret access key.
//! - `AWS_REGION`: The AWS region where your DynamoDB tables are located.
//!
//! Optionally, you can also set:
//! - `AWS_SESSION_TOKEN`: If you're using temporary credentials.
//! - `AWS_ENDPOINT_URL`: For using a custom endpoint (e.g., DynamoDB Local).
//!
//! ## Example
//!
//! ```no_run
//! use hotel_dynamo::dynamodb::{DynamoDb, Item};
//! use hotel_dynamo::store::Store;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = aws_config::load_from_env().await;
//! let ddb = DynamoDb::new(&config);
//!
//! let item = Item::new()
//!     .set_string("id", "123")
//!     .set_string("name", "Harbor Inn")
//!     .set_number("version", 1);
//! ddb.put_item("hotels", item, None).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod item;
mod schema;
mod table;

pub use client::DynamoDb;
pub use item::Item;
pub use schema::{KeySchema, Projection, ScalarType, Schema, SecondaryIndex, Throughput};
pub use table::TableSpec;
