use crate::dynamodb::{KeySchema, Schema, SecondaryIndex, Throughput};

/// Everything needed to create a DynamoDB table.
///
/// A `TableSpec` is built by the caller at startup, handed to the migrator
/// once and dropped afterwards.
///
/// # Table Structure
///
/// - **Table Name**: unique within the account and region.
/// - **Primary Key**: a hash (partition) key and an optional range (sort) key.
/// - **Attribute Definitions**: the scalar type of every attribute used in the
///   primary key or in an index key. Other item attributes are not declared.
/// - **Secondary Indexes**: global indexes may use any declared attributes as
///   their keys; local indexes must reuse the table's hash key.
/// - **Throughput**: provisioned read/write capacity for the table.
///
/// # Example
///
/// ```
/// use hotel_dynamo::dynamodb::{
///     KeySchema, Projection, ScalarType, Schema, SecondaryIndex, TableSpec, Throughput,
/// };
///
/// let table = TableSpec::new("hotels", KeySchema::new("id", None))
///     .with_schema(
///         Schema::new()
///             .add_field("id", ScalarType::String)
///             .add_field("state", ScalarType::String)
///             .add_field("name", ScalarType::String),
///     )
///     .with_global_index(
///         SecondaryIndex::new("by-state", KeySchema::new("state", Some("name")), Projection::All)
///             .with_throughput(Throughput::new(10, 10)),
///     );
/// assert!(table.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    name: String,
    key_schema: KeySchema,
    schema: Schema,
    global_indexes: Vec<SecondaryIndex>,
    local_indexes: Vec<SecondaryIndex>,
    throughput: Throughput,
}

impl TableSpec {
    /// Creates a table spec with no declared attributes, no indexes and
    /// 10/10 provisioned capacity.
    pub fn new(name: impl Into<String>, key_schema: KeySchema) -> Self {
        Self {
            name: name.into(),
            key_schema,
            schema: Schema::new(),
            global_indexes: Vec::new(),
            local_indexes: Vec::new(),
            throughput: Throughput::new(10, 10),
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_global_index(mut self, index: SecondaryIndex) -> Self {
        self.global_indexes.push(index);
        self
    }

    pub fn with_local_index(mut self, index: SecondaryIndex) -> Self {
        self.local_indexes.push(index);
        self
    }

    pub fn with_throughput(mut self, throughput: Throughput) -> Self {
        self.throughput = throughput;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_schema(&self) -> &KeySchema {
        &self.key_schema
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn global_indexes(&self) -> &[SecondaryIndex] {
        &self.global_indexes
    }

    pub fn local_indexes(&self) -> &[SecondaryIndex] {
        &self.local_indexes
    }

    pub fn throughput(&self) -> Throughput {
        self.throughput
    }

    /// Finds a global or local index by name.
    pub fn index(&self, name: &str) -> Option<&SecondaryIndex> {
        self.global_indexes
            .iter()
            .chain(&self.local_indexes)
            .find(|index| index.name() == name)
    }

    /// Checks that every key attribute is declared and that local indexes
    /// share the table's hash key.
    pub fn validate(&self) -> Result<(), String> {
        let undeclared = std::iter::once(&self.key_schema)
            .chain(self.global_indexes.iter().map(SecondaryIndex::key_schema))
            .chain(self.local_indexes.iter().map(SecondaryIndex::key_schema))
            .flat_map(KeySchema::attribute_names)
            .find(|name| self.schema.field_type(name).is_none());
        if let Some(name) = undeclared {
            return Err(format!("key attribute '{name}' has no attribute definition"));
        }

        if let Some(index) = self
            .local_indexes
            .iter()
            .find(|index| index.key_schema().hash_key() != self.key_schema.hash_key())
        {
            return Err(format!(
                "local index '{}' must use the table hash key '{}'",
                index.name(),
                self.key_schema.hash_key()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamodb::{Projection, ScalarType};

    fn base() -> TableSpec {
        TableSpec::new("test_table", KeySchema::new("pk", Some("sk"))).with_schema(
            Schema::new()
                .add_field("pk", ScalarType::String)
                .add_field("sk", ScalarType::String),
        )
    }

    #[test]
    fn test_table_operations() {
        let table = base().with_throughput(Throughput::new(5, 2));

        assert_eq!(table.name(), "test_table");
        assert_eq!(table.key_schema().hash_key(), "pk");
        assert_eq!(table.key_schema().range_key(), Some("sk"));
        assert_eq!(table.throughput(), Throughput::new(5, 2));
        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_undeclared_index_key_is_rejected() {
        let table = base().with_global_index(SecondaryIndex::new(
            "by-owner",
            KeySchema::new("owner", None),
            Projection::KeysOnly,
        ));

        let err = table.validate().unwrap_err();
        assert!(err.contains("'owner'"), "{err}");
    }

    #[test]
    fn test_local_index_must_share_hash_key() {
        let table = base()
            .with_schema(
                Schema::new()
                    .add_field("pk", ScalarType::String)
                    .add_field("sk", ScalarType::String)
                    .add_field("other", ScalarType::String)
                    .add_field("at", ScalarType::Number),
            )
            .with_local_index(SecondaryIndex::new(
                "by-at",
                KeySchema::new("other", Some("at")),
                Projection::All,
            ));

        assert!(table.validate().is_err());
        assert!(table.index("by-at").is_some());
    }
}
