/*
 * value/map.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::error::{ValueError, ValueResult};
use crate::host::HostValue;

use super::{Value, expect_value};

/// A fixed-length, ordered Sass map addressed by position.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    entries: Vec<(Value, Value)>,
}

impl Map {
    /// A map of `len` null/null entries.
    pub fn new(len: usize) -> Self {
        Map {
            entries: vec![(Value::null(), Value::null()); len],
        }
    }

    pub fn from_entries(entries: Vec<(Value, Value)>) -> Self {
        Map { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_index(&self, index: usize) -> ValueResult<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(ValueError::Index {
                container: "map",
                index,
                len: self.entries.len(),
            })
        }
    }

    pub fn get_key(&self, index: usize) -> ValueResult<&Value> {
        self.check_index(index)?;
        Ok(&self.entries[index].0)
    }

    pub fn get_value(&self, index: usize) -> ValueResult<&Value> {
        self.check_index(index)?;
        Ok(&self.entries[index].1)
    }

    pub fn set_key(&mut self, index: usize, key: impl Into<HostValue>) -> ValueResult<()> {
        self.check_index(index)?;
        self.entries[index].0 = expect_value(key.into(), "A SassValue is expected as a map key")?;
        Ok(())
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<HostValue>) -> ValueResult<()> {
        self.check_index(index)?;
        self.entries[index].1 =
            expect_value(value.into(), "A SassValue is expected as a map value")?;
        Ok(())
    }

    /// Value stored under the first key equal to `key`.
    pub fn lookup(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn into_entries(self) -> Vec<(Value, Value)> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, SassString};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_map_is_filled_with_null() {
        let map = Map::new(2);
        assert_eq!(map.len(), 2);
        assert!(map.get_key(1).unwrap().is_null());
        assert!(map.get_value(1).unwrap().is_null());
    }

    #[test]
    fn test_set_and_lookup() {
        let mut map = Map::new(2);
        map.set_key(0, SassString::new("hello")).unwrap();
        map.set_value(0, Number::new(1.0, "")).unwrap();
        map.set_key(1, SassString::new("world")).unwrap();
        map.set_value(1, Number::new(2.0, "")).unwrap();

        let key = Value::String(SassString::new("world"));
        assert_eq!(map.lookup(&key), Some(&Value::Number(Number::new(2.0, ""))));
        let keys: Vec<&Value> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_contract_messages() {
        let mut map = Map::new(1);
        let err = map
            .set_key(0, HostValue::object([("x", HostValue::Null)]))
            .unwrap_err();
        assert_eq!(err.to_string(), "A SassValue is expected as a map key");
        let err = map.set_value(0, HostValue::Error("x".into())).unwrap_err();
        assert_eq!(err.to_string(), "A SassValue is expected as a map value");
        let err = map.set_value(0, "bare").unwrap_err();
        assert_eq!(err.to_string(), "Supplied value should be a SassValue object");
    }

    #[test]
    fn test_out_of_range() {
        let map = Map::new(0);
        assert!(matches!(
            map.get_key(0),
            Err(ValueError::Index {
                container: "map",
                ..
            })
        ));
    }
}
