//! Integration tests against a real DynamoDB endpoint
//!
//! These tests cover:
//! - Idempotent provisioning of the hotel table and its state index
//! - Saving, updating, deleting and reading hotels
//! - Querying hotels by state
//! - Writing a hand-authored JSON document and reading it back as a hotel
//!
//! # Setup
//!
//! These tests require a running DynamoDB instance and proper AWS credentials,
//! so they are ignored by default.
//!
//! ## Credentials
//!
//! Set the following environment variables in your `.env` file:
//!
//! ```text
//! AWS_ACCESS_KEY_ID=your_access_key
//! AWS_SECRET_ACCESS_KEY=your_secret_key
//! AWS_REGION=your_preferred_region
//! ```
//!
//! For local testing with DynamoDB Local, you can use dummy values and set:
//!
//! ```text
//! AWS_ENDPOINT_URL=http://localhost:8000
//! ```
//!
//! ## Test Tables
//!
//! Every test provisions its own `hotels-test-<uuid>` table so tests can run
//! in parallel, waits for it to become active, and deletes it when done.
//!
//! # Running Tests
//!
//! ```text
//! cargo test -- --ignored
//! ```
//!
//! Note: These tests may incur AWS charges if run against a real DynamoDB instance.

use crate::codec::JsonAttributeCodec;
use crate::config::HotelTable;
use crate::document;
use crate::dynamodb::DynamoDb;
use crate::error::Error;
use crate::hotel::Hotel;
use crate::migrator::DynamoMigrator;
use crate::repository::HotelRepository;
use crate::store::Store;
use anyhow::Result;
use futures::TryStreamExt;
use serde_json::json;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

const TABLE_ACTIVE_TIMEOUT: Duration = Duration::from_secs(120);

#[instrument]
async fn setup_test_table() -> Result<(DynamoDb, HotelTable)> {
    dotenv::dotenv().ok();
    let sdk_config = aws_config::load_from_env().await;
    let ddb = DynamoDb::new(&sdk_config);

    let table = HotelTable {
        table_name: format!("hotels-test-{}", Uuid::new_v4()),
        ..HotelTable::default()
    };

    DynamoMigrator::new(ddb.clone())
        .migrate(vec![table.table_spec()])
        .await?;
    ddb.wait_until_active(&table.table_name, TABLE_ACTIVE_TIMEOUT)
        .await?;
    info!("Table '{}' ready", table.table_name);

    Ok((ddb, table))
}

async fn teardown(ddb: &DynamoDb, table: &HotelTable) -> Result<()> {
    ddb.delete_table(&table.table_name).await?;
    Ok(())
}

fn test_hotel(id: &str, name: &str, state: &str) -> Hotel {
    Hotel::with_id(id, name)
        .address("test address")
        .state(state)
        .zip("zip")
}

#[tokio::test]
#[ignore = "requires DynamoDB (set AWS_ENDPOINT_URL for DynamoDB Local)"]
async fn test_check_auth() -> Result<()> {
    dotenv::dotenv().ok();
    let sdk_config = aws_config::load_from_env().await;
    let ddb = DynamoDb::new(&sdk_config);

    ddb.check_auth().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires DynamoDB (set AWS_ENDPOINT_URL for DynamoDB Local)"]
async fn test_migrate_twice() -> Result<()> {
    let (ddb, table) = setup_test_table().await?;

    let specs = DynamoMigrator::new(ddb.clone())
        .migrate(vec![table.table_spec()])
        .await?;
    assert_eq!(specs, vec![table.table_spec()]);

    let matching = ddb
        .list_tables()
        .await?
        .into_iter()
        .filter(|name| *name == table.table_name)
        .count();
    assert_eq!(matching, 1);
    assert!(ddb.table_exists(&table.table_name).await?);

    let description = ddb.describe_table(&table.table_name).await?;
    assert_eq!(
        description.table().and_then(|t| t.table_name()),
        Some(table.table_name.as_str())
    );

    teardown(&ddb, &table).await
}

#[tokio::test]
#[ignore = "requires DynamoDB (set AWS_ENDPOINT_URL for DynamoDB Local)"]
#[instrument]
async fn test_hotel_operations() -> Result<()> {
    let (ddb, table) = setup_test_table().await?;
    let repo = HotelRepository::new(ddb.clone(), table.clone());

    info!("Testing save");
    let hotel = test_hotel("1", "test hotel", "OR").properties(json!({"test": "test"}));
    let saved = repo.save(&hotel).await?;
    assert_eq!(saved, hotel);
    assert_eq!(repo.get("1").await?, Some(hotel.clone()));

    info!("Testing update");
    let updated = repo.update(&saved).await?;
    assert_eq!(updated, hotel.at_version(2));

    info!("Testing stale update");
    let err = repo.update(&saved).await.unwrap_err();
    assert!(matches!(err, Error::Conflict { .. }), "{err}");

    info!("Testing delete");
    assert!(repo.delete("1").await?);
    assert_eq!(repo.get("1").await?, None);
    assert!(repo.delete("1").await?);

    teardown(&ddb, &table).await
}

#[tokio::test]
#[ignore = "requires DynamoDB (set AWS_ENDPOINT_URL for DynamoDB Local)"]
async fn test_find_hotels_by_state() -> Result<()> {
    let (ddb, table) = setup_test_table().await?;
    let repo = HotelRepository::new(ddb.clone(), table.clone());

    let hotel1 = test_hotel("1", "test hotel1", "OR");
    let hotel2 = test_hotel("2", "test hotel2", "OR");
    let hotel3 = test_hotel("3", "test hotel3", "WA");
    repo.save(&hotel1).await?;
    repo.save(&hotel2).await?;
    let last = repo.save(&hotel3).await?;
    assert_eq!(last, hotel3);

    let oregon: Vec<Hotel> = repo.find_by_state("OR").try_collect().await?;
    assert_eq!(oregon, vec![hotel1, hotel2]);

    let washington: Vec<Hotel> = repo.find_by_state("WA").try_collect().await?;
    assert_eq!(washington, vec![hotel3]);

    teardown(&ddb, &table).await
}

#[tokio::test]
#[ignore = "requires DynamoDB (set AWS_ENDPOINT_URL for DynamoDB Local)"]
async fn test_save_top_level_document() -> Result<()> {
    let (ddb, table) = setup_test_table().await?;
    let raw = json!({
        "id": "1",
        "name": "test",
        "address": "test address",
        "state": "OR",
        "properties": {
            "amenities": {
                "rooms": 100,
                "gym": 2,
                "swimmingPool": true
            }
        },
        "zip": "zip"
    });

    let item = document::from_json(&raw, &JsonAttributeCodec)?;
    ddb.put_item(&table.table_name, item, None).await?;

    let stored = ddb
        .get_item(&table.table_name, document::key("1"))
        .await?
        .expect("document was just written");
    assert_eq!(document::to_json(&stored, &JsonAttributeCodec), raw);

    let hotel = document::from_item(stored, &JsonAttributeCodec)?;
    assert_eq!(hotel.address.as_deref(), Some("test address"));

    teardown(&ddb, &table).await
}
