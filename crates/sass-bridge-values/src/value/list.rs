/*
 * value/list.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::error::{ValueError, ValueResult};
use crate::host::HostValue;

use super::{Value, expect_value};

/// How list items are separated when printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListSeparator {
    #[default]
    Comma,
    Space,
}

impl ListSeparator {
    /// `true` stands for comma, matching the host-side flag.
    pub fn from_comma_flag(comma: bool) -> Self {
        if comma {
            ListSeparator::Comma
        } else {
            ListSeparator::Space
        }
    }

    pub fn is_comma(self) -> bool {
        self == ListSeparator::Comma
    }
}

/// A fixed-length Sass list.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    items: Vec<Value>,
    separator: ListSeparator,
    bracketed: bool,
}

impl List {
    /// A comma-separated list of `len` nulls.
    pub fn new(len: usize) -> Self {
        List {
            items: vec![Value::null(); len],
            separator: ListSeparator::Comma,
            bracketed: false,
        }
    }

    pub fn from_values(items: Vec<Value>, separator: ListSeparator) -> Self {
        List {
            items,
            separator,
            bracketed: false,
        }
    }

    pub fn with_bracketed(mut self, bracketed: bool) -> Self {
        self.bracketed = bracketed;
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get_value(&self, index: usize) -> ValueResult<&Value> {
        let len = self.items.len();
        self.items.get(index).ok_or(ValueError::Index {
            container: "list",
            index,
            len,
        })
    }

    /// Replace the item at `index`.
    ///
    /// # Errors
    ///
    /// Fails with [`ValueError::Index`] when `index` is out of range and with
    /// [`ValueError::Type`] when `value` is not a wrapped Sass value.
    pub fn set_value(&mut self, index: usize, value: impl Into<HostValue>) -> ValueResult<()> {
        let len = self.items.len();
        if index >= len {
            return Err(ValueError::Index {
                container: "list",
                index,
                len,
            });
        }
        self.items[index] = expect_value(value.into(), "A SassValue is expected as the list item")?;
        Ok(())
    }

    pub fn separator(&self) -> ListSeparator {
        self.separator
    }

    pub fn set_separator(&mut self, separator: ListSeparator) {
        self.separator = separator;
    }

    pub fn is_bracketed(&self) -> bool {
        self.bracketed
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.items
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, SassString};

    #[test]
    fn test_new_list_is_filled_with_null() {
        let list = List::new(3);
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(|v| v.is_same(&Value::null())));
        assert_eq!(list.separator(), ListSeparator::Comma);
        assert!(!list.is_bracketed());
    }

    #[test]
    fn test_set_and_get() {
        let mut list = List::new(2);
        list.set_value(0, SassString::new("foo")).unwrap();
        list.set_value(1, Number::new(1.0, "px")).unwrap();
        assert_eq!(
            list.get_value(0).unwrap(),
            &Value::String(SassString::new("foo"))
        );
        assert_eq!(
            list.get_value(1).unwrap(),
            &Value::Number(Number::new(1.0, "px"))
        );
    }

    #[test]
    fn test_out_of_range() {
        let mut list = List::new(1);
        assert!(matches!(
            list.get_value(1),
            Err(ValueError::Index { index: 1, len: 1, .. })
        ));
        assert!(matches!(
            list.set_value(5, Value::null()),
            Err(ValueError::Index { index: 5, .. })
        ));
    }

    #[test]
    fn test_non_values_are_rejected() {
        let mut list = List::new(1);
        let err = list.set_value(0, 2.0).unwrap_err();
        assert_eq!(err.to_string(), "Supplied value should be a SassValue object");
        let err = list
            .set_value(0, HostValue::object([("a", HostValue::Null)]))
            .unwrap_err();
        assert_eq!(err.to_string(), "A SassValue is expected as the list item");
    }

    #[test]
    fn test_separator_flag() {
        let mut list = List::new(0);
        list.set_separator(ListSeparator::from_comma_flag(false));
        assert_eq!(list.separator(), ListSeparator::Space);
        assert!(ListSeparator::from_comma_flag(true).is_comma());
    }
}
