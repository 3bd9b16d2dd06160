/*
 * convert.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Conversion between compiler values and host-visible [`Value`]s.
//!
//! `wrap` never fails: compiler values without a host representation become
//! [`Unsupported`] and only fail when they are handed back or inspected.

use sass_bridge_values::{
    Color, HostValue, List, Map, Number, SassString, Unsupported, Value, ValueError,
};

use crate::compiler::{SassColor, SassValue};

const FUNCTION_KIND: &str = "function";

/// Expose a compiler value to the host.
pub fn wrap(value: &SassValue) -> Value {
    match value {
        SassValue::Null => Value::null(),
        SassValue::Bool(b) => Value::boolean(*b),
        SassValue::Number { value, unit } => Value::Number(Number::new(*value, unit.clone())),
        SassValue::String { text, quoted } => {
            if *quoted {
                Value::String(SassString::quoted(text))
            } else {
                Value::String(SassString::new(text.clone()))
            }
        }
        SassValue::Color(c) => Value::Color(Color::new(c.r, c.g, c.b, c.a)),
        SassValue::List {
            items,
            separator,
            bracketed,
        } => Value::List(
            List::from_values(items.iter().map(wrap).collect(), *separator)
                .with_bracketed(*bracketed),
        ),
        SassValue::Map(entries) => Value::Map(Map::from_entries(
            entries.iter().map(|(k, v)| (wrap(k), wrap(v))).collect(),
        )),
        SassValue::Function(name) => {
            Value::Unsupported(Unsupported::new(FUNCTION_KIND, name.clone()))
        }
    }
}

/// Take a host value back into the compiler.
///
/// # Errors
///
/// Fails with [`ValueError::Unsupported`] for opaque values the compiler
/// does not know how to rebuild.
pub fn unwrap(value: &Value) -> Result<SassValue, ValueError> {
    Ok(match value {
        Value::Null(_) => SassValue::Null,
        Value::Boolean(b) => SassValue::Bool(b.value()),
        Value::Number(n) => SassValue::number(n.value(), n.unit()),
        Value::String(s) => {
            if s.is_quoted() {
                SassValue::quoted(s.unquoted())
            } else {
                SassValue::unquoted(s.value())
            }
        }
        Value::Color(c) => SassValue::Color(SassColor::new(c.r(), c.g(), c.b(), c.a())),
        Value::List(list) => SassValue::List {
            items: list.iter().map(unwrap).collect::<Result<_, _>>()?,
            separator: list.separator(),
            bracketed: list.is_bracketed(),
        },
        Value::Map(map) => SassValue::Map(
            map.iter()
                .map(|(k, v)| Ok((unwrap(k)?, unwrap(v)?)))
                .collect::<Result<_, ValueError>>()?,
        ),
        Value::Unsupported(u) if u.kind() == FUNCTION_KIND => {
            SassValue::Function(u.token().to_string())
        }
        Value::Unsupported(u) => {
            return Err(ValueError::Unsupported {
                kind: u.kind().to_string(),
            });
        }
    })
}

/// Why a callback's return could not be consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnError {
    /// Anything other than a Sass value
    NotAValue,
    /// An error object handed back instead of thrown
    Error(String),
    Value(ValueError),
}

/// Validate a callback return at the boundary.
pub fn unwrap_host(value: HostValue) -> Result<SassValue, ReturnError> {
    match value {
        HostValue::Sass(v) => unwrap(&v).map_err(ReturnError::Value),
        HostValue::Error(message) => Err(ReturnError::Error(message)),
        _ => Err(ReturnError::NotAValue),
    }
}
