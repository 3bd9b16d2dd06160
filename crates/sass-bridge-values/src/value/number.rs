/*
 * value/number.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::error::{ValueError, ValueResult};
use crate::host::HostValue;

/// A Sass number: a float plus a (possibly empty) unit string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Number {
    value: f64,
    unit: String,
}

impl Number {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Number {
            value,
            unit: unit.into(),
        }
    }

    pub fn unitless(value: f64) -> Self {
        Number::new(value, "")
    }

    /// Build a number from loose arguments `(value?, unit?)`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError::Construction`] when more than two arguments are
    /// given or when they have the wrong kinds.
    pub fn from_args(args: &[HostValue]) -> ValueResult<Self> {
        if args.len() > 2 {
            return Err(ValueError::construction(
                "Constructor should be invoked with either 0, 1 or 2 arguments",
            ));
        }
        let value = match args.first() {
            None | Some(HostValue::Undefined) => 0.0,
            Some(HostValue::Number(n)) => *n,
            Some(_) => {
                return Err(ValueError::construction(
                    "First argument should be a number",
                ));
            }
        };
        let unit = match args.get(1) {
            None | Some(HostValue::Undefined) => String::new(),
            Some(HostValue::String(s)) => s.clone(),
            Some(_) => {
                return Err(ValueError::construction(
                    "Second argument should be a string",
                ));
            }
        };
        Ok(Number { value, unit })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn set_value(&mut self, value: impl Into<HostValue>) -> ValueResult<()> {
        match value.into() {
            HostValue::Number(n) => {
                self.value = n;
                Ok(())
            }
            _ => Err(ValueError::type_error("Supplied value should be a number")),
        }
    }

    pub fn set_unit(&mut self, unit: impl Into<HostValue>) -> ValueResult<()> {
        match unit.into() {
            HostValue::String(s) => {
                self.unit = s;
                Ok(())
            }
            _ => Err(ValueError::type_error("Supplied value should be a string")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args() {
        let n = Number::from_args(&[]).unwrap();
        assert_eq!((n.value(), n.unit()), (0.0, ""));
        let n = Number::from_args(&[HostValue::Number(1.0)]).unwrap();
        assert_eq!((n.value(), n.unit()), (1.0, ""));
        let n = Number::from_args(&[HostValue::Number(2.0), HostValue::from("px")]).unwrap();
        assert_eq!((n.value(), n.unit()), (2.0, "px"));
    }

    #[test]
    fn test_from_args_rejects_bad_shapes() {
        let err = Number::from_args(&[HostValue::from("1")]).unwrap_err();
        assert_eq!(err.to_string(), "First argument should be a number");
        let err = Number::from_args(&[HostValue::Number(1.0), HostValue::Number(2.0)])
            .unwrap_err();
        assert_eq!(err.to_string(), "Second argument should be a string");
        let err = Number::from_args(&[
            HostValue::Number(1.0),
            HostValue::from("px"),
            HostValue::Null,
        ])
        .unwrap_err();
        assert!(matches!(err, ValueError::Construction(_)));
    }

    #[test]
    fn test_setters_validate_kind() {
        let mut n = Number::new(42.0, "px");
        n.set_value(10.5).unwrap();
        n.set_unit("rem").unwrap();
        assert_eq!(n, Number::new(10.5, "rem"));

        let err = n.set_unit(1.0).unwrap_err();
        assert_eq!(err, ValueError::Type("Supplied value should be a string".into()));
        let err = n.set_value("1").unwrap_err();
        assert_eq!(err, ValueError::Type("Supplied value should be a number".into()));
        assert_eq!(n, Number::new(10.5, "rem"));
    }
}
