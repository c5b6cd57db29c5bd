//! Hotel persistence on top of a [`Store`].

use aws_sdk_dynamodb::types::AttributeValue;
use futures::Stream;
use tracing::{debug, instrument, warn};

use crate::codec::{AttributeCodec, JsonAttributeCodec};
use crate::config::HotelTable;
use crate::document::{self, STATE, VERSION};
use crate::dynamodb::Item;
use crate::error::{Error, Result, StoreError};
use crate::hotel::Hotel;
use crate::store::{PutCondition, QueryRequest, Store};

/// Reads and writes [`Hotel`]s.
///
/// Holds no state of its own beyond configuration: every call goes straight
/// to the store, which is the only arbiter of consistency. Concurrent writers
/// are told apart by the version check in [`update`](Self::update).
pub struct HotelRepository<S, C = JsonAttributeCodec> {
    store: S,
    codec: C,
    table: HotelTable,
}

impl<S: Store> HotelRepository<S> {
    pub fn new(store: S, table: HotelTable) -> Self {
        Self::with_codec(store, JsonAttributeCodec, table)
    }
}

impl<S: Store, C: AttributeCodec> HotelRepository<S, C> {
    pub fn with_codec(store: S, codec: C, table: HotelTable) -> Self {
        Self {
            store,
            codec,
            table,
        }
    }

    pub fn table(&self) -> &HotelTable {
        &self.table
    }

    /// Writes `hotel` at version 1, replacing whatever is stored under its id,
    /// and hands back the input unchanged.
    ///
    /// There is no existence check: saving over an existing hotel resets its
    /// stored version.
    #[instrument(skip(self, hotel), fields(id = %hotel.id))]
    pub async fn save(&self, hotel: &Hotel) -> Result<Hotel> {
        let item = document::to_item(&hotel.at_version(1), &self.codec)?;

        self.store
            .put_item(&self.table.table_name, item, None)
            .await?;

        debug!("Hotel saved");
        Ok(hotel.clone())
    }

    /// Writes `hotel` at `hotel.version + 1` if the stored version is still
    /// `hotel.version`.
    ///
    /// Fails with [`Error::Conflict`] when another writer got there first or
    /// when no hotel is stored under the id.
    #[instrument(skip(self, hotel), fields(id = %hotel.id, version = hotel.version))]
    pub async fn update(&self, hotel: &Hotel) -> Result<Hotel> {
        let next_version = hotel
            .version
            .checked_add(1)
            .ok_or_else(|| Error::Encode(format!("version of hotel '{}' overflows", hotel.id)))?;
        let updated = hotel.at_version(next_version);
        let item = document::to_item(&updated, &self.codec)?;
        let expected = PutCondition::attribute_equals(
            VERSION,
            AttributeValue::N(hotel.version.to_string()),
        );

        match self
            .store
            .put_item(&self.table.table_name, item, Some(expected))
            .await
        {
            Ok(()) => {
                debug!("Hotel updated to version {next_version}");
                Ok(updated)
            }
            Err(StoreError::ConditionFailed) => {
                warn!("Stale version, hotel was modified or removed");
                Err(Error::Conflict {
                    id: hotel.id.clone(),
                    expected_version: hotel.version,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the hotel. Always `true` on success, whether or not it existed.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.store
            .delete_item(&self.table.table_name, document::key(id))
            .await?;

        debug!("Hotel deleted");
        Ok(true)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Hotel>> {
        self.store
            .get_item(&self.table.table_name, document::key(id))
            .await?
            .map(|item| document::from_item(item, &self.codec))
            .transpose()
    }

    /// Streams the hotels in `state`, ordered by name.
    ///
    /// Pages are fetched from the state index one at a time as the stream is
    /// consumed, each capped at [`HotelTable::query_page_size`] items when set.
    /// An item that fails to decode ends the stream with [`Error::Decode`].
    pub fn find_by_state<'a>(&'a self, state: &str) -> impl Stream<Item = Result<Hotel>> + 'a {
        let state = state.to_string();
        async_stream::try_stream! {
            let mut start_key: Option<Item> = None;
            loop {
                let mut request = QueryRequest::new(
                    &self.table.table_name,
                    STATE,
                    AttributeValue::S(state.clone()),
                )
                .index(&self.table.by_state_index)
                .start_after(start_key.take());
                if let Some(page_size) = self.table.query_page_size {
                    request = request.limit(page_size);
                }

                let page = self.store.query(request).await.map_err(Error::from)?;
                debug!(state = %state, count = page.items.len(), "Fetched hotels page");

                for item in page.items {
                    yield document::from_item(item, &self.codec)?;
                }

                start_key = page.last_evaluated_key;
                if start_key.is_none() {
                    break;
                }
            }
        }
    }
}
