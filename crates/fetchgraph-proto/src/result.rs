//! Rows returned by the data service.

use crate::value::Value;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Separator between a link alias and a column in row keys.
pub const ALIAS_SEPARATOR: char = '.';

/// A single keyed attribute of a row.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct Attribute {
    /// Attribute key (`column` for the root, `alias.column` for links).
    pub key: String,
    /// Attribute value.
    pub value: Value,
}

impl Attribute {
    /// Create a new attribute.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One flat record returned by the data service.
///
/// Root attributes are keyed by column; attributes of a linked entity are
/// keyed `alias.column`.
#[derive(
    Debug, Clone, PartialEq, Default, Archive, Serialize, Deserialize, SerdeSerialize,
    SerdeDeserialize,
)]
pub struct Row {
    /// Attributes in the order the data service produced them.
    pub attributes: Vec<Attribute>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute (builder style).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set an attribute, replacing an existing value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.key == key) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { key, value }),
        }
    }

    /// Get the value stored under a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| &a.value)
    }

    /// Get the value of `column` projected by the link aliased `alias`.
    pub fn get_aliased(&self, alias: &str, column: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|a| split_key(&a.key) == Some((alias, column)))
            .map(|a| &a.value)
    }

    /// Check if the row has a key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Root attributes (keys without an alias prefix).
    pub fn root_attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes
            .iter()
            .filter(|a| !a.key.contains(ALIAS_SEPARATOR))
            .map(|a| (a.key.as_str(), &a.value))
    }

    /// Attributes of the link aliased `alias`, keyed by bare column.
    pub fn slice<'a>(&'a self, alias: &'a str) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.attributes.iter().filter_map(move |a| match split_key(&a.key) {
            Some((prefix, column)) if prefix == alias => Some((column, &a.value)),
            _ => None,
        })
    }

    /// Whether any non-null attribute carries the `alias.` prefix.
    pub fn has_alias(&self, alias: &str) -> bool {
        self.slice(alias).any(|(_, value)| !value.is_null())
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if the row is empty.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Build the row key of a linked column.
pub fn aliased_key(alias: &str, column: &str) -> String {
    format!("{alias}{ALIAS_SEPARATOR}{column}")
}

/// Split an `alias.column` key; root keys yield `None`.
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(ALIAS_SEPARATOR)
}

/// Rows returned for one compiled query.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct EntityCollection {
    /// Logical name of the root entity.
    pub entity_name: String,
    /// Returned rows.
    pub rows: Vec<Row>,
    /// Whether the data service holds more rows than were returned.
    pub more_records: bool,
    /// Opaque cookie for fetching the next page.
    pub paging_cookie: Option<String>,
}

impl EntityCollection {
    /// Create a collection with rows.
    pub fn new(entity_name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            entity_name: entity_name.into(),
            rows,
            more_records: false,
            paging_cookie: None,
        }
    }

    /// Create an empty collection.
    pub fn empty(entity_name: impl Into<String>) -> Self {
        Self::new(entity_name, vec![])
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::new()
            .with("name", "Red Eye")
            .with("passenger.fullname", "Ada")
            .with("passenger.contactid", [1u8; 16])
            .with("aircraft.tailnumber", Value::Null)
    }

    #[test]
    fn test_row_lookup() {
        let row = sample();
        assert_eq!(row.get("name"), Some(&Value::String("Red Eye".into())));
        assert_eq!(
            row.get_aliased("passenger", "fullname"),
            Some(&Value::String("Ada".into()))
        );
        assert_eq!(row.get_aliased("passenger", "name"), None);
        assert_eq!(row.root_attributes().count(), 1);
    }

    #[test]
    fn test_row_slice() {
        let row = sample();
        let columns: Vec<_> = row.slice("passenger").map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["fullname", "contactid"]);
        assert!(row.has_alias("passenger"));
        // Only null attributes under the prefix.
        assert!(!row.has_alias("aircraft"));
        assert!(!row.has_alias("missing"));
    }

    #[test]
    fn test_row_insert_replaces() {
        let mut row = Row::new().with("x", 1);
        row.insert("x", 2);
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("x"), Some(&Value::Int32(2)));
    }

    #[test]
    fn test_aliased_key() {
        assert_eq!(aliased_key("b", "y"), "b.y");
        assert_eq!(split_key("b.y"), Some(("b", "y")));
        assert_eq!(split_key("y"), None);
    }
}
