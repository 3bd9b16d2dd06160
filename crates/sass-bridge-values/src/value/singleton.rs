/*
 * value/singleton.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::error::{ValueError, ValueResult};
use crate::host::HostValue;

use super::Value;

/// The Sass `null` value. Exactly one instance exists: [`NULL`].
#[derive(Debug)]
pub struct SassNull {
    _private: (),
}

/// The Sass booleans. Exactly two instances exist: [`TRUE`] and [`FALSE`].
#[derive(Debug)]
pub struct SassBoolean {
    value: bool,
}

pub static NULL: SassNull = SassNull { _private: () };
pub static TRUE: SassBoolean = SassBoolean { value: true };
pub static FALSE: SassBoolean = SassBoolean { value: false };

impl SassNull {
    /// Direct construction is not allowed; use [`SassNull::instance`].
    pub fn construct() -> ValueResult<&'static SassNull> {
        Err(ValueError::construction("Cannot instantiate SassNull"))
    }

    pub fn instance() -> &'static SassNull {
        &NULL
    }
}

impl SassBoolean {
    /// Direct construction is not allowed; use [`SassBoolean::from_bool`]
    /// or [`SassBoolean::coerce`].
    pub fn construct(_value: impl Into<HostValue>) -> ValueResult<&'static SassBoolean> {
        Err(ValueError::construction("Cannot instantiate SassBoolean"))
    }

    pub fn from_bool(value: bool) -> &'static SassBoolean {
        if value { &TRUE } else { &FALSE }
    }

    /// Call-style conversion: accepts a boolean, `0`/`1`, or a Sass boolean
    /// and returns the matching singleton.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError::Type`] for anything else.
    pub fn coerce(value: impl Into<HostValue>) -> ValueResult<&'static SassBoolean> {
        match value.into() {
            HostValue::Bool(b) => Ok(Self::from_bool(b)),
            HostValue::Number(n) if n == 0.0 => Ok(&FALSE),
            HostValue::Number(n) if n == 1.0 => Ok(&TRUE),
            HostValue::Sass(Value::Boolean(b)) => Ok(b),
            _ => Err(ValueError::type_error("Expected one boolean argument")),
        }
    }

    pub fn value(&self) -> bool {
        self.value
    }

    /// JSON-style rendering: `true` or `false`.
    pub fn to_json(&self) -> &'static str {
        if self.value { "true" } else { "false" }
    }
}
