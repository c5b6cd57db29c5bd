use std::time::Duration;

use anyhow::Result;
use hotel_dynamo::{logging, DynamoDb, DynamoMigrator, Settings};
use tracing::{info, warn};

const TABLE_ACTIVE_TIMEOUT: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let settings = Settings::from_env()?;
    logging::init_logging(settings.log_level)?;

    let sdk_config = aws_config::load_from_env().await;

    let ddb = DynamoDb::new(&sdk_config);

    ddb.check_auth().await?;

    let tables = DynamoMigrator::new(ddb.clone())
        .migrate(vec![settings.hotels.table_spec()])
        .await?;

    for table in &tables {
        ddb.wait_until_active(table.name(), TABLE_ACTIVE_TIMEOUT)
            .await?;
        match ddb.describe_table(table.name()).await {
            Ok(output) => match output.table() {
                Some(description) => {
                    info!("Table status: {:?}", description.table_status());
                    info!("Table name: {:?}", description.table_name());
                }
                None => info!("Table ready, but description is not available"),
            },
            Err(e) => warn!("Could not describe table '{}': {}", table.name(), e),
        }
    }

    Ok(())
}
