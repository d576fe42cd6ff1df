//! AMF value types
//!
//! Schemas and frames are rendered into this value tree before being written
//! to the wire with the AMF0 encoder. Objects use a `BTreeMap` so the encoded
//! byte stream is deterministic for a given value.

use std::collections::BTreeMap;

/// AMF value representation used by the Live Link wire protocol
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AmfValue {
    /// Null value (AMF0: 0x05), used for omitted fields
    #[default]
    Null,

    /// Boolean value (AMF0: 0x01)
    Boolean(bool),

    /// IEEE 754 double-precision floating point (AMF0: 0x00)
    Number(f64),

    /// UTF-8 string (AMF0: 0x02 or 0x0C for long strings)
    String(String),

    /// Dense array (AMF0 strict array: 0x0A)
    Array(Vec<AmfValue>),

    /// Key-value object (AMF0: 0x03)
    Object(BTreeMap<String, AmfValue>),
}

impl AmfValue {
    /// Start building an object value
    pub fn object() -> ObjectBuilder {
        ObjectBuilder::default()
    }

    /// Try to get this value as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AmfValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AmfValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get this value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AmfValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an object reference
    pub fn as_object(&self) -> Option<&BTreeMap<String, AmfValue>> {
        match self {
            AmfValue::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get this value as an array reference
    pub fn as_array(&self) -> Option<&[AmfValue]> {
        match self {
            AmfValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, AmfValue::Null)
    }

    /// Get a property from an object value
    pub fn get(&self, key: &str) -> Option<&AmfValue> {
        self.as_object()?.get(key)
    }

    /// Get a string property from an object value
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Get a number property from an object value
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_number()
    }

    /// Get an array of numbers from an object value
    ///
    /// Returns `None` if the property is missing or any element is not a number.
    pub fn get_numbers(&self, key: &str) -> Option<Vec<f64>> {
        self.get(key)?
            .as_array()?
            .iter()
            .map(AmfValue::as_number)
            .collect()
    }
}

/// Incremental builder for [`AmfValue::Object`]
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    properties: BTreeMap<String, AmfValue>,
}

impl ObjectBuilder {
    /// Set a property
    pub fn with(mut self, key: &str, value: impl Into<AmfValue>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Finish the object
    pub fn build(self) -> AmfValue {
        AmfValue::Object(self.properties)
    }
}

impl From<bool> for AmfValue {
    fn from(v: bool) -> Self {
        AmfValue::Boolean(v)
    }
}

impl From<f64> for AmfValue {
    fn from(v: f64) -> Self {
        AmfValue::Number(v)
    }
}

impl From<f32> for AmfValue {
    fn from(v: f32) -> Self {
        AmfValue::Number(v as f64)
    }
}

impl From<i32> for AmfValue {
    fn from(v: i32) -> Self {
        AmfValue::Number(v as f64)
    }
}

impl From<u8> for AmfValue {
    fn from(v: u8) -> Self {
        AmfValue::Number(v as f64)
    }
}

impl From<String> for AmfValue {
    fn from(v: String) -> Self {
        AmfValue::String(v)
    }
}

impl From<&str> for AmfValue {
    fn from(v: &str) -> Self {
        AmfValue::String(v.to_string())
    }
}

impl<V: Into<AmfValue>> From<Vec<V>> for AmfValue {
    fn from(v: Vec<V>) -> Self {
        AmfValue::Array(v.into_iter().map(|x| x.into()).collect())
    }
}

impl<V: Into<AmfValue> + Copy, const N: usize> From<[V; N]> for AmfValue {
    fn from(v: [V; N]) -> Self {
        AmfValue::Array(v.iter().map(|x| (*x).into()).collect())
    }
}

impl<V: Into<AmfValue>> From<Option<V>> for AmfValue {
    fn from(v: Option<V>) -> Self {
        v.map(Into::into).unwrap_or(AmfValue::Null)
    }
}

impl<V: Into<AmfValue>> From<BTreeMap<String, V>> for AmfValue {
    fn from(v: BTreeMap<String, V>) -> Self {
        AmfValue::Object(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
