use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A hotel record.
///
/// `properties` is an open-ended JSON document with no fixed schema.
/// `version` starts at 1 and goes up by one on every successful update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default = "initial_version")]
    pub version: u64,
    #[serde(default = "empty_properties")]
    pub properties: Value,
}

fn initial_version() -> u64 {
    1
}

fn empty_properties() -> Value {
    Value::Object(Default::default())
}

impl Hotel {
    /// Creates a hotel with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name)
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            state: None,
            zip: None,
            version: initial_version(),
            properties: empty_properties(),
        }
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn zip(mut self, zip: impl Into<String>) -> Self {
        self.zip = Some(zip.into());
        self
    }

    pub fn properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }

    /// Same hotel at another version.
    pub fn at_version(&self, version: u64) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_hotels_get_distinct_ids() {
        let a = Hotel::new("Harbor Inn");
        let b = Hotel::new("Harbor Inn");
        assert_ne!(a.id, b.id);
        assert_eq!(a.version, 1);
        assert_eq!(a.properties, json!({}));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let hotel: Hotel = serde_json::from_value(json!({"id": "1", "name": "test"})).unwrap();
        assert_eq!(hotel, Hotel::with_id("1", "test"));
    }
}
