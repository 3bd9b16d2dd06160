/*
 * value/color.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::error::{ValueError, ValueResult};
use crate::host::HostValue;

/// An RGBA color. Channels are kept in `0..=255`, alpha in `0..=1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

impl Default for Color {
    /// Opaque black.
    fn default() -> Self {
        Color {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        }
    }
}

fn clamp_channel(v: f64) -> f64 {
    v.clamp(0.0, 255.0)
}

fn clamp_alpha(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Color {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
            a: clamp_alpha(a),
        }
    }

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color::new(r, g, b, 1.0)
    }

    /// Decode a packed `0xAARRGGBB` integer.
    pub fn from_argb(argb: u32) -> Self {
        let byte = |shift: u32| f64::from((argb >> shift) & 0xff);
        Color {
            r: byte(16),
            g: byte(8),
            b: byte(0),
            a: byte(24) / 255.0,
        }
    }

    /// Build a color from loose arguments: none (opaque black), one packed
    /// ARGB integer, or three/four numeric components.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError::Construction`] for any other arity or for
    /// non-numeric components.
    pub fn from_args(args: &[HostValue]) -> ValueResult<Self> {
        match args {
            [] => Ok(Color::default()),
            [HostValue::Number(n)] => {
                if n.fract() == 0.0 && *n >= 0.0 && *n <= f64::from(u32::MAX) {
                    Ok(Color::from_argb(*n as u32))
                } else {
                    Err(ValueError::construction("Only argument should be an integer"))
                }
            }
            [_] => Err(ValueError::construction("Only argument should be an integer")),
            [_, _, _] | [_, _, _, _] => {
                let mut parts = [0.0, 0.0, 0.0, 1.0];
                for (slot, arg) in parts.iter_mut().zip(args) {
                    match arg {
                        HostValue::Number(n) => *slot = *n,
                        _ => {
                            return Err(ValueError::construction(
                                "Constructor arguments should be numbers exclusively",
                            ));
                        }
                    }
                }
                Ok(Color::new(parts[0], parts[1], parts[2], parts[3]))
            }
            _ => Err(ValueError::construction(
                "Constructor should be invoked with either 0, 1, 3 or 4 arguments",
            )),
        }
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn set_r(&mut self, value: impl Into<HostValue>) -> ValueResult<()> {
        self.r = clamp_channel(expect_number(value)?);
        Ok(())
    }

    pub fn set_g(&mut self, value: impl Into<HostValue>) -> ValueResult<()> {
        self.g = clamp_channel(expect_number(value)?);
        Ok(())
    }

    pub fn set_b(&mut self, value: impl Into<HostValue>) -> ValueResult<()> {
        self.b = clamp_channel(expect_number(value)?);
        Ok(())
    }

    pub fn set_a(&mut self, value: impl Into<HostValue>) -> ValueResult<()> {
        self.a = clamp_alpha(expect_number(value)?);
        Ok(())
    }
}

fn expect_number(value: impl Into<HostValue>) -> ValueResult<f64> {
    match value.into() {
        HostValue::Number(n) => Ok(n),
        _ => Err(ValueError::type_error("Supplied value should be a number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_opaque_black() {
        let c = Color::default();
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (0.0, 0.0, 0.0, 1.0));
        assert_eq!(Color::from_args(&[]).unwrap(), c);
    }

    #[test]
    fn test_packed_argb() {
        let c = Color::from_args(&[HostValue::from(0xff00_ff00u32)]).unwrap();
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (0.0, 255.0, 0.0, 1.0));

        let c = Color::from_argb(0x33ff_00ff);
        assert_eq!((c.r(), c.g(), c.b()), (255.0, 0.0, 255.0));
        assert!((c.a() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_components() {
        let c = Color::from_args(&[
            HostValue::Number(10.0),
            HostValue::Number(20.0),
            HostValue::Number(30.0),
        ])
        .unwrap();
        assert_eq!(c, Color::rgb(10.0, 20.0, 30.0));

        let c = Color::new(300.0, -4.0, 12.0, 2.0);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (255.0, 0.0, 12.0, 1.0));
    }

    #[test]
    fn test_bad_arguments() {
        let err = Color::from_args(&[HostValue::Number(1.5)]).unwrap_err();
        assert_eq!(err.to_string(), "Only argument should be an integer");
        let err = Color::from_args(&[HostValue::from("red")]).unwrap_err();
        assert_eq!(err.to_string(), "Only argument should be an integer");
        let err = Color::from_args(&[
            HostValue::Number(1.0),
            HostValue::from("x"),
            HostValue::Number(1.0),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Constructor arguments should be numbers exclusively"
        );
        let err = Color::from_args(&[HostValue::Number(1.0), HostValue::Number(1.0)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Constructor should be invoked with either 0, 1, 3 or 4 arguments"
        );
    }

    #[test]
    fn test_setters() {
        let mut c = Color::default();
        c.set_r(128).unwrap();
        c.set_a(0.5).unwrap();
        assert_eq!((c.r(), c.a()), (128.0, 0.5));
        let err = c.set_g("1").unwrap_err();
        assert_eq!(err.to_string(), "Supplied value should be a number");
    }
}
