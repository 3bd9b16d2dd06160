/*
 * value/string.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::error::{ValueError, ValueResult};
use crate::host::HostValue;

/// A Sass string as seen by the host.
///
/// The text of a quoted Sass string includes its surrounding quotes
/// (`"\"bar\""`), an unquoted string does not (`"bar"`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SassString {
    value: String,
}

impl SassString {
    pub fn new(value: impl Into<String>) -> Self {
        SassString {
            value: value.into(),
        }
    }

    /// A quoted string with the given content.
    pub fn quoted(content: &str) -> Self {
        SassString {
            value: format!("\"{}\"", content),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// True when the text is wrapped in matching single or double quotes.
    pub fn is_quoted(&self) -> bool {
        let v = self.value.as_str();
        v.len() >= 2
            && ((v.starts_with('"') && v.ends_with('"'))
                || (v.starts_with('\'') && v.ends_with('\'')))
    }

    /// The text without surrounding quotes.
    pub fn unquoted(&self) -> &str {
        if self.is_quoted() {
            &self.value[1..self.value.len() - 1]
        } else {
            &self.value
        }
    }

    pub fn set_value(&mut self, value: impl Into<HostValue>) -> ValueResult<()> {
        match value.into() {
            HostValue::String(s) => {
                self.value = s;
                Ok(())
            }
            _ => Err(ValueError::type_error("Supplied value should be a string")),
        }
    }
}

impl From<&str> for SassString {
    fn from(value: &str) -> Self {
        SassString::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting() {
        let s = SassString::quoted("bar");
        assert_eq!(s.value(), "\"bar\"");
        assert!(s.is_quoted());
        assert_eq!(s.unquoted(), "bar");

        let s = SassString::new("bar");
        assert!(!s.is_quoted());
        assert_eq!(s.unquoted(), "bar");

        assert!(!SassString::new("\"").is_quoted());
        assert!(!SassString::new("'bar\"").is_quoted());
    }

    #[test]
    fn test_set_value() {
        let mut s = SassString::default();
        s.set_value("bar").unwrap();
        assert_eq!(s.value(), "bar");
        let err = s.set_value(false).unwrap_err();
        assert_eq!(err.to_string(), "Supplied value should be a string");
        assert_eq!(s.value(), "bar");
    }
}
