//! Rust types usable as property values.

use kith_core::Value;
use kith_registry::PropertyType;

/// A Rust type stored in a property.
pub trait PropertyValue: Sized {
    /// Declared type of the property in the registry.
    const PROPERTY_TYPE: PropertyType;

    fn into_value(self) -> Value;

    /// Convert a stored value back; `None` if it does not fit.
    fn from_value(value: &Value) -> Option<Self>;
}

impl PropertyValue for String {
    const PROPERTY_TYPE: PropertyType = PropertyType::String;

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl PropertyValue for i64 {
    const PROPERTY_TYPE: PropertyType = PropertyType::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl PropertyValue for i32 {
    const PROPERTY_TYPE: PropertyType = PropertyType::Int;

    fn into_value(self) -> Value {
        Value::Int(i64::from(self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_int().and_then(|v| i32::try_from(v).ok())
    }
}

impl PropertyValue for f64 {
    const PROPERTY_TYPE: PropertyType = PropertyType::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl PropertyValue for bool {
    const PROPERTY_TYPE: PropertyType = PropertyType::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}
