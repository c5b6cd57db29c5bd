/// Attribute definitions used by a table's key schemas.
///
/// DynamoDB is schemaless for everything except keys: only the attributes that
/// appear in the table's primary key or in one of its secondary indexes are
/// declared up front, each with a scalar type. Every other attribute of an item
/// is free-form.
///
/// Declaration order is preserved so that create requests are deterministic.
///
/// # Example
///
/// ```
/// use hotel_dynamo::dynamodb::{Schema, ScalarType};
///
/// let schema = Schema::new()
///     .add_field("id", ScalarType::String)
///     .add_field("state", ScalarType::String)
///     .add_field("name", ScalarType::String);
/// assert_eq!(schema.fields().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<(String, ScalarType)>,
}

/// Scalar attribute types allowed in a key schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    /// `S`
    String,
    /// `N`
    Number,
    /// `B`
    Binary,
}

impl Schema {
    /// Creates a new empty `Schema`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an attribute, replacing the type of an existing declaration.
    pub fn add_field(mut self, name: impl Into<String>, field_type: ScalarType) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = field_type,
            None => self.fields.push((name, field_type)),
        }
        self
    }

    /// Returns the declared attributes in declaration order.
    pub fn fields(&self) -> &[(String, ScalarType)] {
        &self.fields
    }

    /// Looks up the declared type of an attribute.
    pub fn field_type(&self, name: &str) -> Option<ScalarType> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| *t)
    }
}

/// Hash key plus optional range key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    hash_key: String,
    range_key: Option<String>,
}

impl KeySchema {
    pub fn new(hash_key: impl Into<String>, range_key: Option<&str>) -> Self {
        Self {
            hash_key: hash_key.into(),
            range_key: range_key.map(str::to_string),
        }
    }

    pub fn hash_key(&self) -> &str {
        &self.hash_key
    }

    pub fn range_key(&self) -> Option<&str> {
        self.range_key.as_deref()
    }

    /// Key attribute names, hash key first.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.hash_key.as_str()).chain(self.range_key.as_deref())
    }
}

/// Which attributes an index copies from the base table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    All,
    KeysOnly,
    Include(Vec<String>),
}

/// Provisioned read/write capacity units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throughput {
    pub read: i64,
    pub write: i64,
}

impl Throughput {
    pub fn new(read: i64, write: i64) -> Self {
        Self { read, write }
    }
}

/// A global or local secondary index definition.
///
/// Local indexes share the table's provisioned capacity, so `throughput` is
/// only meaningful for global indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryIndex {
    name: String,
    key_schema: KeySchema,
    projection: Projection,
    throughput: Option<Throughput>,
}

impl SecondaryIndex {
    pub fn new(name: impl Into<String>, key_schema: KeySchema, projection: Projection) -> Self {
        Self {
            name: name.into(),
            key_schema,
            projection,
            throughput: None,
        }
    }

    pub fn with_throughput(mut self, throughput: Throughput) -> Self {
        self.throughput = Some(throughput);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_schema(&self) -> &KeySchema {
        &self.key_schema
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn throughput(&self) -> Option<Throughput> {
        self.throughput
    }
}
