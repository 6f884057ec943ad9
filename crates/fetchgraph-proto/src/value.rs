//! Attribute values carried in conditions, rows, and record requests.

use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// A runtime attribute value.
///
/// Mirrors the attribute types a CRM-style record store hands back: plain
/// scalars plus the store-specific shapes (money, option sets, references to
/// other records).
///
/// Note: Arrays are typed (e.g., Int32Array, StringArray) to avoid recursive
/// type issues with rkyv serialization.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean (two-option) value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit floating point.
    Float64(f64),
    /// Fixed-point decimal kept in its textual form.
    Decimal(String),
    /// Currency amount.
    Money(f64),
    /// UTF-8 string.
    String(String),
    /// Record identifier as 16 bytes.
    Uuid([u8; 16]),
    /// Date and time as microseconds since Unix epoch.
    DateTime(i64),
    /// Selected option of an option set.
    OptionSet(i32),
    /// Reference to another record.
    EntityReference {
        /// Logical name of the referenced entity.
        logical_name: String,
        /// Identifier of the referenced record.
        id: [u8; 16],
    },
    /// Array of 32-bit integers (multi-select option sets, `in` operands).
    Int32Array(Vec<i32>),
    /// Array of strings.
    StringArray(Vec<String>),
    /// Array of record identifiers.
    UuidArray(Vec<[u8; 16]>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the runtime representation, used in mapping diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float64(_) => "float64",
            Value::Decimal(_) => "decimal",
            Value::Money(_) => "money",
            Value::String(_) => "string",
            Value::Uuid(_) => "uuid",
            Value::DateTime(_) => "datetime",
            Value::OptionSet(_) => "optionset",
            Value::EntityReference { .. } => "entityreference",
            Value::Int32Array(_) => "int32[]",
            Value::StringArray(_) => "string[]",
            Value::UuidArray(_) => "uuid[]",
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(i) | Value::OptionSet(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            Value::Int32(i) => Some(*i as i64),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(f) | Value::Money(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Decimal(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as a record identifier.
    ///
    /// Entity references yield the referenced id.
    pub fn as_uuid(&self) -> Option<&[u8; 16]> {
        match self {
            Value::Uuid(u) => Some(u),
            Value::EntityReference { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Try to get as a date-time in microseconds.
    pub fn as_datetime(&self) -> Option<i64> {
        match self {
            Value::DateTime(t) => Some(*t),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int32(i) | Value::OptionSet(i) => write!(f, "{i}"),
            Value::Int64(i) | Value::DateTime(i) => write!(f, "{i}"),
            Value::Float64(v) | Value::Money(v) => write!(f, "{v}"),
            Value::Decimal(s) | Value::String(s) => write!(f, "{s}"),
            Value::Uuid(id) => write_uuid(f, id),
            Value::EntityReference { logical_name, id } => {
                write!(f, "{logical_name}:")?;
                write_uuid(f, id)
            }
            Value::Int32Array(items) => write!(f, "{items:?}"),
            Value::StringArray(items) => write!(f, "{items:?}"),
            Value::UuidArray(items) => write!(f, "[{} ids]", items.len()),
        }
    }
}

fn write_uuid(f: &mut std::fmt::Formatter<'_>, id: &[u8; 16]) -> std::fmt::Result {
    for (i, byte) in id.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            write!(f, "-")?;
        }
        write!(f, "{byte:02x}")?;
    }
    Ok(())
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<[u8; 16]> for Value {
    fn from(v: [u8; 16]) -> Self {
        Value::Uuid(v)
    }
}

impl From<Vec<i32>> for Value {
    fn from(v: Vec<i32>) -> Self {
        Value::Int32Array(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::StringArray(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::OptionSet(3).as_i32(), Some(3));
        assert_eq!(Value::Int32(42).as_i64(), Some(42));
        assert_eq!(Value::Money(9.5).as_f64(), Some(9.5));

        let reference = Value::EntityReference {
            logical_name: "contact".into(),
            id: [7; 16],
        };
        assert_eq!(reference.as_uuid(), Some(&[7; 16]));
        assert_eq!(Value::String("x".into()).as_uuid(), None);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Bool(true).type_name(), "bool");
        assert_eq!(Value::DateTime(0).type_name(), "datetime");
        assert_eq!(Value::StringArray(vec![]).type_name(), "string[]");
    }

    #[test]
    fn test_display_uuid() {
        let mut id = [0u8; 16];
        id[15] = 0xab;
        assert_eq!(
            Value::Uuid(id).to_string(),
            "00000000-0000-0000-0000-0000000000ab"
        );
    }

    #[test]
    fn test_option_conversion() {
        let v: Value = None::<i32>.into();
        assert_eq!(v, Value::Null);
        let v: Value = Some("flight").into();
        assert_eq!(v, Value::String("flight".into()));
    }
}
