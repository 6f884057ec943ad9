//! Conversion from stored attribute values to field types.

use fetchgraph_proto::Value;

/// A field type that can be filled from a stored [`Value`].
pub trait FromValue: Sized {
    /// Name of the declared type, reported in mapping errors.
    const TYPE_NAME: &'static str;

    /// Convert a non-null value; `None` when the representation does not fit.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i32 {
    const TYPE_NAME: &'static str = "int32";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i32()
    }
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "int64";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "float64";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int32(i) => Some(*i as f64),
            _ => value.as_f64(),
        }
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for [u8; 16] {
    const TYPE_NAME: &'static str = "uuid";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_uuid().copied()
    }
}

/// A date-time attribute in microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DateTime(pub i64);

impl FromValue for DateTime {
    const TYPE_NAME: &'static str = "datetime";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_datetime().map(DateTime)
    }
}

/// The selected value of an option set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OptionSetValue(pub i32);

impl FromValue for OptionSetValue {
    const TYPE_NAME: &'static str = "optionset";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::OptionSet(v) | Value::Int32(v) => Some(OptionSetValue(*v)),
            _ => None,
        }
    }
}

/// A lookup to another record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EntityReference {
    /// Logical name of the referenced entity.
    pub logical_name: String,
    /// Identifier of the referenced record.
    pub id: [u8; 16],
}

impl FromValue for EntityReference {
    const TYPE_NAME: &'static str = "entityreference";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::EntityReference { logical_name, id } => Some(EntityReference {
                logical_name: logical_name.clone(),
                id: *id,
            }),
            _ => None,
        }
    }
}

impl FromValue for Vec<i32> {
    const TYPE_NAME: &'static str = "int32[]";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int32Array(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl FromValue for Vec<String> {
    const TYPE_NAME: &'static str = "string[]";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::StringArray(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_value(value: &Value) -> Option<Self> {
        T::from_value(value).map(Some)
    }
}
