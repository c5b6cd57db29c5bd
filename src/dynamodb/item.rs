use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

/// A DynamoDB item: a map from attribute names to typed attribute values.
///
/// Items double as keys: a key is an item holding only the key attributes.
///
/// # Example
///
/// ```
/// use hotel_dynamo::dynamodb::Item;
///
/// let item = Item::new()
///     .set_string("id", "h-1")
///     .set_number("version", 1);
/// assert_eq!(item.get_string("id"), Some("h-1"));
/// assert_eq!(item.get_number("version"), Some(1));
/// ```
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Item {
    pub(crate) attributes: HashMap<String, AttributeValue>,
}

impl Item {
    /// Creates a new empty `Item`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a string attribute.
    pub fn set_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(key.into(), AttributeValue::S(value.into()));
        self
    }

    /// Sets a number attribute. DynamoDB carries numbers as decimal strings.
    pub fn set_number(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes
            .insert(key.into(), AttributeValue::N(value.to_string()));
        self
    }

    /// Sets an attribute of any type.
    pub fn set(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Returns `None` if the attribute doesn't exist or is not a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .and_then(|av| av.as_s().ok())
            .map(String::as_str)
    }

    /// Returns `None` if the attribute doesn't exist, is not a number, or
    /// isn't an unsigned integer.
    pub fn get_number(&self, key: &str) -> Option<u64> {
        self.attributes
            .get(key)
            .and_then(|av| av.as_n().ok())
            .and_then(|n| n.parse().ok())
    }

    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        self.attributes.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn attributes(&self) -> &HashMap<String, AttributeValue> {
        &self.attributes
    }

    pub fn into_attributes(self) -> HashMap<String, AttributeValue> {
        self.attributes
    }

    /// Copies the named attributes into a new item, skipping missing ones.
    pub fn project<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Item {
        let attributes = keys
            .into_iter()
            .filter_map(|k| self.attributes.get(k).map(|v| (k.to_string(), v.clone())))
            .collect();
        Item { attributes }
    }
}

impl From<HashMap<String, AttributeValue>> for Item {
    fn from(attributes: HashMap<String, AttributeValue>) -> Self {
        Self { attributes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_operations() {
        let item = Item::new()
            .set_string("key1", "value1")
            .set_number("key2", 42)
            .set("key3", AttributeValue::Bool(true));

        assert_eq!(item.get_string("key1"), Some("value1"));
        assert_eq!(item.get_number("key2"), Some(42));
        assert_eq!(item.get("key3"), Some(&AttributeValue::Bool(true)));
        assert_eq!(item.get_string("key2"), None);
        assert_eq!(item.get_number("non_existent"), None);
    }

    #[test]
    fn test_project_keeps_only_named_attributes() {
        let item = Item::new()
            .set_string("id", "1")
            .set_string("name", "Harbor")
            .set_number("version", 3);

        let key = item.project(["id", "missing"]);
        assert_eq!(key.attributes().len(), 1);
        assert_eq!(key.get_string("id"), Some("1"));
    }
}
