use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    client::Waiters,
    error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::describe_table::DescribeTableOutput,
    types::{
        AttributeDefinition, GlobalSecondaryIndex, KeySchemaElement, KeyType,
        LocalSecondaryIndex, Projection as SdkProjection, ProjectionType, ProvisionedThroughput,
        ScalarAttributeType,
    },
    Client,
};
use tracing::{debug, error, info, instrument};

use crate::dynamodb::{Item, KeySchema, Projection, ScalarType, TableSpec, Throughput};
use crate::error::StoreError;
use crate::store::{PutCondition, QueryPage, QueryRequest, Store};

/// Error codes DynamoDB uses when the caller's credentials are the problem.
const AUTH_ERROR_CODES: &[&str] = &[
    "UnrecognizedClientException",
    "InvalidSignatureException",
    "MissingAuthenticationToken",
    "ExpiredTokenException",
    "AccessDeniedException",
];

/// DynamoDB client wrapper implementing [`Store`].
///
/// Translates the crate's table specs, items and conditions into AWS SDK
/// requests and folds SDK errors into [`StoreError`]:
///
/// - dispatch, timeout and request construction failures, plus credential
///   errors, become [`StoreError::Connectivity`];
/// - `ConditionalCheckFailedException` becomes [`StoreError::ConditionFailed`];
/// - any other service error becomes [`StoreError::Rejected`].
///
/// Nothing is retried here beyond what the SDK's own retry policy does.
///
/// # Example
///
/// ```no_run
/// use hotel_dynamo::dynamodb::DynamoDb;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = aws_config::load_from_env().await;
/// let ddb = DynamoDb::new(&config);
/// ddb.check_auth().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DynamoDb {
    client: Client,
}

impl DynamoDb {
    /// Creates a new `DynamoDb` instance.
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Verifies authentication by attempting to list tables.
    pub async fn check_auth(&self) -> anyhow::Result<()> {
        self.client.list_tables().send().await.map_err(|e| {
            error!("Authentication failed: {}", DisplayErrorContext(&e));
            anyhow!("Authentication failed")
        })?;
        info!("Authentication successful");
        Ok(())
    }

    /// Checks if a table exists.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool, StoreError> {
        Ok(self
            .list_tables()
            .await?
            .iter()
            .any(|name| name == table_name))
    }

    /// Waits until `table_name` is `ACTIVE`, polling for at most `max_wait`.
    ///
    /// A freshly created table is not usable for item operations until then.
    #[instrument(skip(self))]
    pub async fn wait_until_active(
        &self,
        table_name: &str,
        max_wait: Duration,
    ) -> Result<(), StoreError> {
        self.client
            .wait_until_table_exists()
            .table_name(table_name)
            .wait(max_wait)
            .await
            .map_err(|e| StoreError::Rejected {
                operation: "DescribeTable",
                message: DisplayErrorContext(&e).to_string(),
            })?;
        debug!("Table '{table_name}' is active");
        Ok(())
    }

    /// Retrieves table description.
    pub async fn describe_table(&self, table_name: &str) -> Result<DescribeTableOutput, StoreError> {
        self.client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| map_sdk_error("DescribeTable", e))
    }

    /// Deletes a table.
    pub async fn delete_table(&self, table_name: &str) -> Result<(), StoreError> {
        self.client
            .delete_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| map_sdk_error("DeleteTable", e))?;
        info!("Table '{table_name}' deleted");
        Ok(())
    }
}

#[async_trait]
impl Store for DynamoDb {
    async fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let mut last_evaluated_table_name = None;

        loop {
            let response = self
                .client
                .list_tables()
                .set_exclusive_start_table_name(last_evaluated_table_name)
                .send()
                .await
                .map_err(|e| map_sdk_error("ListTables", e))?;

            names.extend(response.table_names.unwrap_or_default());

            last_evaluated_table_name = response.last_evaluated_table_name;

            if last_evaluated_table_name.is_none() {
                break;
            }
        }

        Ok(names)
    }

    #[instrument(skip(self, spec), fields(table = spec.name()))]
    async fn create_table(&self, spec: &TableSpec) -> Result<(), StoreError> {
        let build_failed = |e: BuildError| StoreError::Rejected {
            operation: "CreateTable",
            message: e.to_string(),
        };

        let attribute_definitions = spec
            .schema()
            .fields()
            .iter()
            .map(|(name, field_type)| {
                AttributeDefinition::builder()
                    .attribute_name(name)
                    .attribute_type(scalar_attribute_type(*field_type))
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(build_failed)?;

        let global_indexes = spec
            .global_indexes()
            .iter()
            .map(|index| {
                GlobalSecondaryIndex::builder()
                    .index_name(index.name())
                    .set_key_schema(Some(key_schema_elements(index.key_schema())?))
                    .projection(sdk_projection(index.projection()))
                    .set_provisioned_throughput(
                        index.throughput().map(provisioned_throughput).transpose()?,
                    )
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(build_failed)?;

        let local_indexes = spec
            .local_indexes()
            .iter()
            .map(|index| {
                LocalSecondaryIndex::builder()
                    .index_name(index.name())
                    .set_key_schema(Some(key_schema_elements(index.key_schema())?))
                    .projection(sdk_projection(index.projection()))
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(build_failed)?;

        self.client
            .create_table()
            .table_name(spec.name())
            .set_attribute_definitions(Some(attribute_definitions))
            .set_key_schema(Some(
                key_schema_elements(spec.key_schema()).map_err(build_failed)?,
            ))
            .set_global_secondary_indexes((!global_indexes.is_empty()).then_some(global_indexes))
            .set_local_secondary_indexes((!local_indexes.is_empty()).then_some(local_indexes))
            .provisioned_throughput(provisioned_throughput(spec.throughput()).map_err(build_failed)?)
            .send()
            .await
            .map_err(|e| map_sdk_error("CreateTable", e))?;

        info!("Table '{}' created", spec.name());
        Ok(())
    }

    #[instrument(skip(self, item, condition))]
    async fn put_item(
        &self,
        table_name: &str,
        item: Item,
        condition: Option<PutCondition>,
    ) -> Result<(), StoreError> {
        let mut request = self
            .client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item.attributes));

        if let Some(PutCondition::AttributeEquals { name, value }) = condition {
            request = request
                .condition_expression("#cond = :expected")
                .expression_attribute_names("#cond", name)
                .expression_attribute_values(":expected", value);
        }

        request
            .send()
            .await
            .map_err(|e| map_sdk_error("PutItem", e))?;

        debug!("Item put into '{table_name}'");
        Ok(())
    }

    #[instrument(skip(self, key))]
    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>, StoreError> {
        let response = self
            .client
            .get_item()
            .table_name(table_name)
            .set_key(Some(key.attributes))
            .send()
            .await
            .map_err(|e| map_sdk_error("GetItem", e))?;

        Ok(response.item.map(Item::from))
    }

    #[instrument(skip(self, key))]
    async fn delete_item(&self, table_name: &str, key: Item) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(table_name)
            .set_key(Some(key.attributes))
            .send()
            .await
            .map_err(|e| map_sdk_error("DeleteItem", e))?;

        debug!("Item deleted from '{table_name}'");
        Ok(())
    }

    #[instrument(skip(self, request), fields(table = %request.table_name, index = ?request.index_name))]
    async fn query(&self, request: QueryRequest) -> Result<QueryPage, StoreError> {
        let (hash_name, hash_value) = request.hash_key;
        let response = self
            .client
            .query()
            .table_name(request.table_name)
            .set_index_name(request.index_name)
            .key_condition_expression("#pk = :pkval")
            .expression_attribute_names("#pk", hash_name)
            .expression_attribute_values(":pkval", hash_value)
            .set_exclusive_start_key(request.exclusive_start_key.map(Item::into_attributes))
            .set_limit(request.limit)
            .send()
            .await
            .map_err(|e| map_sdk_error("Query", e))?;

        Ok(QueryPage {
            items: response
                .items
                .unwrap_or_default()
                .into_iter()
                .map(Item::from)
                .collect(),
            last_evaluated_key: response.last_evaluated_key.map(Item::from),
        })
    }
}

/// Folds an SDK error into the store boundary's error kinds.
fn map_sdk_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::ConstructionFailure(_)
        | SdkError::TimeoutError(_)
        | SdkError::DispatchFailure(_) => return StoreError::Connectivity(message),
        _ => {}
    }

    match err.code() {
        Some("ConditionalCheckFailedException") => StoreError::ConditionFailed,
        Some(code) if AUTH_ERROR_CODES.contains(&code) => StoreError::Connectivity(message),
        _ => StoreError::Rejected { operation, message },
    }
}

fn scalar_attribute_type(field_type: ScalarType) -> ScalarAttributeType {
    match field_type {
        ScalarType::String => ScalarAttributeType::S,
        ScalarType::Number => ScalarAttributeType::N,
        ScalarType::Binary => ScalarAttributeType::B,
    }
}

fn key_schema_elements(keys: &KeySchema) -> Result<Vec<KeySchemaElement>, BuildError> {
    let mut elements = vec![KeySchemaElement::builder()
        .attribute_name(keys.hash_key())
        .key_type(KeyType::Hash)
        .build()?];

    if let Some(range_key) = keys.range_key() {
        elements.push(
            KeySchemaElement::builder()
                .attribute_name(range_key)
                .key_type(KeyType::Range)
                .build()?,
        );
    }

    Ok(elements)
}

fn sdk_projection(projection: &Projection) -> SdkProjection {
    match projection {
        Projection::All => SdkProjection::builder()
            .projection_type(ProjectionType::All)
            .build(),
        Projection::KeysOnly => SdkProjection::builder()
            .projection_type(ProjectionType::KeysOnly)
            .build(),
        Projection::Include(attributes) => SdkProjection::builder()
            .projection_type(ProjectionType::Include)
            .set_non_key_attributes(Some(attributes.clone()))
            .build(),
    }
}

fn provisioned_throughput(throughput: Throughput) -> Result<ProvisionedThroughput, BuildError> {
    ProvisionedThroughput::builder()
        .read_capacity_units(throughput.read)
        .write_capacity_units(throughput.write)
        .build()
}
