//! Mapping between [`Hotel`] values and stored items.
//!
//! Scalar fields sit at the top level of the item and go through
//! `serde_dynamo` using [`Hotel`]'s own serde attributes; `properties` is
//! stored as one nested attribute converted by the injected
//! [`AttributeCodec`].

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_dynamo::aws_sdk_dynamodb_1::to_item as fields_to_item;
use serde_json::Value;

use crate::codec::AttributeCodec;
use crate::dynamodb::Item;
use crate::error::{Error, Result};
use crate::hotel::Hotel;

pub const ID: &str = "id";
pub const NAME: &str = "name";
pub const STATE: &str = "state";
pub const VERSION: &str = "version";
pub const PROPERTIES: &str = "properties";

/// Primary key item for a hotel id.
pub fn key(id: &str) -> Item {
    Item::new().set_string(ID, id)
}

/// Encodes a hotel. Absent optional fields are left out of the item.
pub fn to_item(hotel: &Hotel, codec: &impl AttributeCodec) -> Result<Item> {
    let attributes: HashMap<String, AttributeValue> =
        fields_to_item(hotel).map_err(|e| Error::Encode(e.to_string()))?;

    Ok(Item::from(attributes).set(PROPERTIES, codec.to_attribute(&hotel.properties)))
}

/// Decodes a hotel. A missing `properties` attribute becomes an empty object
/// and a missing `version` becomes 1; a missing or mistyped `id` or `name` is
/// a decode error.
pub fn from_item(mut item: Item, codec: &impl AttributeCodec) -> Result<Hotel> {
    let properties = item
        .remove(PROPERTIES)
        .map(|attribute| codec.from_attribute(&attribute));

    let id_hint = item.get_string(ID).unwrap_or("<missing id>").to_string();
    let mut hotel: Hotel = serde_dynamo::from_item(item.into_attributes())
        .map_err(|e| Error::Decode(format!("hotel '{id_hint}': {e}")))?;

    if let Some(properties) = properties {
        hotel.properties = properties;
    }
    Ok(hotel)
}

/// Encodes a JSON document authored by hand as an item. The top level must be
/// an object; its fields become the item's attributes.
pub fn from_json(document: &Value, codec: &impl AttributeCodec) -> Result<Item> {
    if !document.is_object() {
        return Err(Error::Encode(
            "a stored document must be a JSON object".to_string(),
        ));
    }
    Ok(Item::from(codec.to_attribute_map(document)))
}

/// Decodes any item into plain JSON.
pub fn to_json(item: &Item, codec: &impl AttributeCodec) -> Value {
    codec.from_attribute_map(item.attributes())
}
