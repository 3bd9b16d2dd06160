//! Loose host data.
//!
//! Extension callbacks are allowed to hand back whatever they like: a wrapped
//! Sass value, a plain boolean, an object with `file`/`contents` keys, an
//! error. `HostValue` is that "anything" and the bridge validates it at the
//! point of use.
//!
//! Copyright (c) 2025 Posit, PBC

use std::fmt;

use hashlink::LinkedHashMap;

use crate::value::{Color, List, Map, Number, SassBoolean, SassNull, SassString, Value};

/// Untyped data crossing from extension code into the bridge.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HostValue {
    /// Nothing was supplied
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Insertion-ordered key/value object
    Object(LinkedHashMap<String, HostValue>),
    /// An error object carrying a message
    Error(String),
    /// A wrapped Sass value
    Sass(Value),
}

impl HostValue {
    /// Build an object from key/value pairs, keeping their order.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, HostValue)>,
    {
        HostValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn error(message: impl Into<String>) -> Self {
        HostValue::Error(message.into())
    }

    /// Look up a key on an object. Returns `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&HostValue> {
        match self {
            HostValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_sass(&self) -> Option<&Value> {
        match self {
            HostValue::Sass(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// True for undefined, null, `false` and the Sass null singleton.
    pub fn is_nullish(&self) -> bool {
        matches!(
            self,
            HostValue::Undefined | HostValue::Null | HostValue::Bool(false)
        ) || matches!(self, HostValue::Sass(v) if v.is_null())
    }

    /// True when the value is object-shaped rather than a primitive.
    pub(crate) fn is_object_like(&self) -> bool {
        matches!(
            self,
            HostValue::Object(_) | HostValue::Bytes(_) | HostValue::Error(_) | HostValue::Sass(_)
        )
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null => "null",
            HostValue::Bool(_) => "boolean",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Bytes(_) => "bytes",
            HostValue::Object(_) => "object",
            HostValue::Error(_) => "error",
            HostValue::Sass(_) => "sass value",
        }
    }
}

impl From<Value> for HostValue {
    fn from(value: Value) -> Self {
        HostValue::Sass(value)
    }
}

impl From<Number> for HostValue {
    fn from(value: Number) -> Self {
        HostValue::Sass(Value::Number(value))
    }
}

impl From<SassString> for HostValue {
    fn from(value: SassString) -> Self {
        HostValue::Sass(Value::String(value))
    }
}

impl From<Color> for HostValue {
    fn from(value: Color) -> Self {
        HostValue::Sass(Value::Color(value))
    }
}

impl From<List> for HostValue {
    fn from(value: List) -> Self {
        HostValue::Sass(Value::List(value))
    }
}

impl From<Map> for HostValue {
    fn from(value: Map) -> Self {
        HostValue::Sass(Value::Map(value))
    }
}

impl From<&'static SassBoolean> for HostValue {
    fn from(value: &'static SassBoolean) -> Self {
        HostValue::Sass(Value::Boolean(value))
    }
}

impl From<&'static SassNull> for HostValue {
    fn from(value: &'static SassNull) -> Self {
        HostValue::Sass(Value::Null(value))
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Bool(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Number(value)
    }
}

impl From<i32> for HostValue {
    fn from(value: i32) -> Self {
        HostValue::Number(f64::from(value))
    }
}

impl From<u32> for HostValue {
    fn from(value: u32) -> Self {
        HostValue::Number(f64::from(value))
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::String(value.to_string())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::String(value)
    }
}

impl From<Vec<u8>> for HostValue {
    fn from(value: Vec<u8>) -> Self {
        HostValue::Bytes(value)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(HostValue::Null, Into::into)
    }
}

impl From<serde_json::Value> for HostValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => HostValue::Null,
            serde_json::Value::Bool(b) => HostValue::Bool(b),
            serde_json::Value::Number(n) => HostValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => HostValue::String(s),
            serde_json::Value::Array(items) => HostValue::Object(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), HostValue::from(v)))
                    .collect(),
            ),
            serde_json::Value::Object(map) => {
                HostValue::Object(map.into_iter().map(|(k, v)| (k, HostValue::from(v))).collect())
            }
        }
    }
}

/// Failure reported by extension code.
///
/// Any `std::error::Error` converts into a message-carrying `HostError`, so
/// callbacks can use `?` freely. `Unknown` stands for a failure without a
/// usable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    Message(String),
    Unknown,
}

impl HostError {
    pub fn message(message: impl Into<String>) -> Self {
        HostError::Message(message.into())
    }

    /// The message to report, falling back to `"unexpected error"`.
    pub fn text(&self) -> &str {
        match self {
            HostError::Message(m) => m,
            HostError::Unknown => "unexpected error",
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl<E: std::error::Error> From<E> for HostError {
    fn from(err: E) -> Self {
        HostError::Message(err.to_string())
    }
}
