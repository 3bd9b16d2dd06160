//! Host-visible value model for the Sass extension bridge.
//!
//! Custom functions receive their arguments as [`Value`]s and hand back
//! either a `Value` or loose [`HostValue`] data that the bridge validates.
//! `null`, `true` and `false` are process-wide singletons: every path that
//! produces one of them yields the same static instance.
//!
//! Copyright (c) 2025 Posit, PBC

pub mod error;
pub mod host;
pub mod value;

pub use error::{ValueError, ValueResult};
pub use host::{HostError, HostValue};
pub use value::{
    Color, FALSE, List, ListSeparator, Map, NULL, Number, SassBoolean, SassNull, SassString, TRUE,
    Unsupported, Value, ValueKind,
};
