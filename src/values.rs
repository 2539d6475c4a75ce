//! Field values and typed book records

use std::collections::BTreeMap;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use crate::contract;

/// A single column value as stored in or read from the books table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Text(String),
}

impl FieldValue {
    /// Read as text; integers are rendered in decimal
    pub fn as_string(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Text(s) => Some(s.clone()),
        }
    }

    /// Read as an integer; text must parse as a decimal integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Null => None,
            FieldValue::Integer(i) => Some(*i),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            FieldValue::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            FieldValue::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            FieldValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl FromSql for FieldValue {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(FieldValue::Null),
            ValueRef::Integer(i) => Ok(FieldValue::Integer(i)),
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .map(|s| FieldValue::Text(s.to_string()))
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            ValueRef::Real(_) | ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

/// Column/value pairs for insert and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentValues {
    values: BTreeMap<String, FieldValue>,
}

impl ContentValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, column: &str, value: impl Into<FieldValue>) -> &mut Self {
        self.values.insert(column.to_string(), value.into());
        self
    }

    pub fn put_null(&mut self, column: &str) -> &mut Self {
        self.values.insert(column.to_string(), FieldValue::Null);
        self
    }

    pub fn remove(&mut self, column: &str) -> Option<FieldValue> {
        self.values.remove(column)
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.values.get(column)
    }

    /// Text value of a column; absent and NULL both read as `None`
    pub fn get_as_string(&self, column: &str) -> Option<String> {
        self.values.get(column).and_then(FieldValue::as_string)
    }

    /// Integer value of a column; unparseable text reads as `None`
    pub fn get_as_integer(&self, column: &str) -> Option<i64> {
        self.values.get(column).and_then(FieldValue::as_integer)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A stored book row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub author: Option<String>,
    /// Price in the smallest currency unit
    pub price: i64,
    pub quantity: i64,
    pub supplier_name: String,
    pub supplier_number: Option<String>,
}

impl Book {
    /// Author for display; absent or empty reads as unknown
    pub fn display_author(&self) -> &str {
        match self.author.as_deref() {
            Some(author) if !author.is_empty() => author,
            _ => "Unknown author",
        }
    }
}

/// Payload for inserting a new book. The id is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub name: String,
    pub author: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub quantity: i64,
    pub supplier_name: String,
    pub supplier_number: Option<String>,
}

impl NewBook {
    pub fn new(name: impl Into<String>, price: i64, supplier_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: None,
            price,
            quantity: 0,
            supplier_name: supplier_name.into(),
            supplier_number: None,
        }
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn supplier_number(mut self, number: impl Into<String>) -> Self {
        self.supplier_number = Some(number.into());
        self
    }

    pub fn to_values(&self) -> ContentValues {
        let mut values = ContentValues::new();
        values
            .put(contract::NAME, self.name.as_str())
            .put(contract::PRICE, self.price)
            .put(contract::QUANTITY, self.quantity)
            .put(contract::SUPPLIER_NAME, self.supplier_name.as_str());
        if let Some(author) = &self.author {
            values.put(contract::AUTHOR, author.as_str());
        }
        if let Some(number) = &self.supplier_number {
            values.put(contract::SUPPLIER_NUMBER, number.as_str());
        }
        values
    }
}

/// Partial update; only fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookChanges {
    pub name: Option<String>,
    pub author: Option<String>,
    pub price: Option<i64>,
    pub quantity: Option<i64>,
    pub supplier_name: Option<String>,
    pub supplier_number: Option<String>,
}

impl BookChanges {
    pub fn quantity(quantity: i64) -> Self {
        Self { quantity: Some(quantity), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.to_values().is_empty()
    }

    pub fn to_values(&self) -> ContentValues {
        let mut values = ContentValues::new();
        if let Some(name) = &self.name {
            values.put(contract::NAME, name.as_str());
        }
        if let Some(author) = &self.author {
            values.put(contract::AUTHOR, author.as_str());
        }
        if let Some(price) = self.price {
            values.put(contract::PRICE, price);
        }
        if let Some(quantity) = self.quantity {
            values.put(contract::QUANTITY, quantity);
        }
        if let Some(name) = &self.supplier_name {
            values.put(contract::SUPPLIER_NAME, name.as_str());
        }
        if let Some(number) = &self.supplier_number {
            values.put(contract::SUPPLIER_NUMBER, number.as_str());
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_as_integer_parses_text() {
        let mut values = ContentValues::new();
        values.put("price", "40").put("quantity", "lots").put_null("author");
        assert_eq!(values.get_as_integer("price"), Some(40));
        assert_eq!(values.get_as_integer("quantity"), None);
        assert_eq!(values.get_as_string("author"), None);
        assert!(values.contains_key("author"));
        assert!(!values.contains_key("name"));
    }

    #[test]
    fn test_new_book_values() {
        let values = NewBook::new("Fangirl", 40, "SuperNova").quantity(15).to_values();
        assert_eq!(values.get_as_string(contract::NAME).as_deref(), Some("Fangirl"));
        assert_eq!(values.get_as_integer(contract::QUANTITY), Some(15));
        assert!(!values.contains_key(contract::AUTHOR));
        assert!(!values.contains_key(contract::ID));
    }

    #[test]
    fn test_changes_only_touch_present_fields() {
        let values = BookChanges::quantity(14).to_values();
        assert_eq!(values.len(), 1);
        assert_eq!(values.get_as_integer(contract::QUANTITY), Some(14));
        assert!(BookChanges::default().is_empty());
    }

    #[test]
    fn test_display_author() {
        let mut book = Book {
            id: 1,
            name: "Fangirl".into(),
            author: None,
            price: 40,
            quantity: 15,
            supplier_name: "SuperNova".into(),
            supplier_number: None,
        };
        assert_eq!(book.display_author(), "Unknown author");
        book.author = Some(String::new());
        assert_eq!(book.display_author(), "Unknown author");
        book.author = Some("Rainbow Rowell".into());
        assert_eq!(book.display_author(), "Rainbow Rowell");
    }
}
