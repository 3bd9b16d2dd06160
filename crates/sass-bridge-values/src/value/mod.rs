/*
 * value/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The host-visible Sass value model.
 */

mod color;
mod list;
mod map;
mod number;
mod singleton;
mod string;

use std::fmt;

pub use color::Color;
pub use list::{List, ListSeparator};
pub use map::Map;
pub use number::Number;
pub use singleton::{FALSE, NULL, SassBoolean, SassNull, TRUE};
pub use string::SassString;

use crate::error::{ValueError, ValueResult};
use crate::host::HostValue;

/// The kind tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Color,
    List,
    Map,
    Unsupported,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Color => "color",
            ValueKind::List => "list",
            ValueKind::Map => "map",
            ValueKind::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Sass value as seen by extension code.
///
/// `Null` and `Boolean` always point at the process-wide singletons, so two
/// nulls (or two `true`s) are the same object no matter how they were
/// obtained. The remaining kinds are owned data.
#[derive(Debug, Clone)]
pub enum Value {
    Null(&'static SassNull),
    Boolean(&'static SassBoolean),
    Number(Number),
    String(SassString),
    Color(Color),
    List(List),
    Map(Map),
    /// A native value kind with no host representation (e.g. a function
    /// reference). It can be passed around but not inspected.
    Unsupported(Unsupported),
}

impl Value {
    /// The null singleton.
    pub fn null() -> Value {
        Value::Null(&NULL)
    }

    /// The `true` or `false` singleton.
    pub fn boolean(value: bool) -> Value {
        Value::Boolean(SassBoolean::from_bool(value))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null(_) => ValueKind::Null,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Color(_) => ValueKind::Color,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Unsupported(_) => ValueKind::Unsupported,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// Identity comparison. Singletons are identical when they are the same
    /// static instance; owned values are never identical to each other.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null(a), Value::Null(b)) => std::ptr::eq(*a, *b),
            (Value::Boolean(a), Value::Boolean(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(b.value()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_number_mut(&mut self) -> Option<&mut Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&SassString> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_string_mut(&mut self) -> Option<&mut SassString> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<&Color> {
        match self {
            Value::Color(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_color_mut(&mut self) -> Option<&mut Color> {
        match self {
            Value::Color(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Fails with [`ValueError::Unsupported`] for unsupported kinds.
    pub fn ensure_supported(&self) -> ValueResult<()> {
        match self {
            Value::Unsupported(u) => Err(ValueError::Unsupported {
                kind: u.kind().to_string(),
            }),
            Value::List(list) => list.iter().try_for_each(Value::ensure_supported),
            Value::Map(map) => map.iter().try_for_each(|(k, v)| {
                k.ensure_supported()?;
                v.ensure_supported()
            }),
            _ => Ok(()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null(_), Value::Null(_)) => self.is_same(other),
            (Value::Boolean(_), Value::Boolean(_)) => self.is_same(other),
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Color(a), Value::Color(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Unsupported(a), Value::Unsupported(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<SassString> for Value {
    fn from(value: SassString) -> Self {
        Value::String(value)
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Value::Color(value)
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Value::List(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl From<&'static SassBoolean> for Value {
    fn from(value: &'static SassBoolean) -> Self {
        Value::Boolean(value)
    }
}

impl From<&'static SassNull> for Value {
    fn from(value: &'static SassNull) -> Self {
        Value::Null(value)
    }
}

/// Opaque stand-in for a native kind that does not cross the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsupported {
    kind: String,
    /// Native payload needed to hand the value back unchanged
    token: String,
}

impl Unsupported {
    pub fn new(kind: impl Into<String>, token: impl Into<String>) -> Self {
        Unsupported {
            kind: kind.into(),
            token: token.into(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Validate a host value that must be a wrapped Sass value.
///
/// Primitives get the generic message; objects that are not Sass values get
/// the caller's contract message.
pub(crate) fn expect_value(value: HostValue, contract: &str) -> ValueResult<Value> {
    match value {
        HostValue::Sass(v) => Ok(v),
        other if other.is_object_like() => Err(ValueError::type_error(contract)),
        _ => Err(ValueError::type_error(
            "Supplied value should be a SassValue object",
        )),
    }
}
