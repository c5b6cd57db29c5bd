//! Runtime configuration.
//!
//! Values come from the process environment, which `main` first fills from a
//! `.env` file via `dotenv`. AWS settings (`AWS_REGION`, `AWS_ENDPOINT_URL`,
//! credentials) are read separately by `aws_config::load_from_env`.

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::Level;

use crate::document::{ID, NAME, STATE};
use crate::dynamodb::{
    KeySchema, Projection, ScalarType, Schema, SecondaryIndex, TableSpec, Throughput,
};

pub const DEFAULT_TABLE_NAME: &str = "hotels";
pub const DEFAULT_BY_STATE_INDEX: &str = "hotels-by-state-index";
pub const DEFAULT_CAPACITY: i64 = 10;

/// Names and capacity of the hotel table, shared by the migrator (through
/// [`HotelTable::table_spec`]) and the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelTable {
    pub table_name: String,
    pub by_state_index: String,
    pub throughput: Throughput,
    /// Upper bound on items per index query page; `None` leaves paging to
    /// the store.
    pub query_page_size: Option<i32>,
}

impl Default for HotelTable {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            by_state_index: DEFAULT_BY_STATE_INDEX.to_string(),
            throughput: Throughput::new(DEFAULT_CAPACITY, DEFAULT_CAPACITY),
            query_page_size: None,
        }
    }
}

impl HotelTable {
    /// Table keyed by `id`, with a global index on `state` (hash) and `name`
    /// (range) projecting every attribute.
    pub fn table_spec(&self) -> TableSpec {
        let by_state = SecondaryIndex::new(
            &self.by_state_index,
            KeySchema::new(STATE, Some(NAME)),
            Projection::All,
        )
        .with_throughput(self.throughput);

        TableSpec::new(&self.table_name, KeySchema::new(ID, None))
            .with_schema(
                Schema::new()
                    .add_field(ID, ScalarType::String)
                    .add_field(NAME, ScalarType::String)
                    .add_field(STATE, ScalarType::String),
            )
            .with_global_index(by_state)
            .with_throughput(self.throughput)
    }
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub hotels: HotelTable,
    pub log_level: Level,
}

impl Settings {
    /// Reads `HOTELS_TABLE_NAME`, `HOTELS_BY_STATE_INDEX`,
    /// `HOTELS_READ_CAPACITY`, `HOTELS_WRITE_CAPACITY`,
    /// `HOTELS_QUERY_PAGE_SIZE` and `LOG_LEVEL`, falling back to defaults for
    /// unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = HotelTable::default();
        let hotels = HotelTable {
            table_name: lookup("HOTELS_TABLE_NAME").unwrap_or(defaults.table_name),
            by_state_index: lookup("HOTELS_BY_STATE_INDEX").unwrap_or(defaults.by_state_index),
            throughput: Throughput::new(
                parse_or(&lookup, "HOTELS_READ_CAPACITY", defaults.throughput.read)?,
                parse_or(&lookup, "HOTELS_WRITE_CAPACITY", defaults.throughput.write)?,
            ),
            query_page_size: parse(&lookup, "HOTELS_QUERY_PAGE_SIZE")?
                .or(defaults.query_page_size),
        };

        Ok(Self {
            hotels,
            log_level: parse_or(&lookup, "LOG_LEVEL", Level::INFO)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(parse(lookup, key)?.unwrap_or(default))
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .with_context(|| format!("invalid value for {key}: '{raw}'"))
        })
        .transpose()
}
