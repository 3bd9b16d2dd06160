/*
 * ops.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Binary and unary SassScript operators.
//!
//! Units never convert: operands must share a unit or one of them must be
//! unitless.

use super::ast::{BinaryOp, UnaryOp};
use super::value::{Format, SassColor, SassValue};

pub type OpResult = Result<SassValue, String>;

fn unify_units<'u>(lhs: &'u str, rhs: &'u str) -> Result<&'u str, String> {
    if lhs == rhs || rhs.is_empty() {
        Ok(lhs)
    } else if lhs.is_empty() {
        Ok(rhs)
    } else {
        Err(format!("Incompatible units: '{}' and '{}'.", rhs, lhs))
    }
}

fn undefined(lhs: &SassValue, word: &str, rhs: &SassValue, fmt: Format) -> String {
    format!(
        "Undefined operation: \"{} {} {}\".",
        lhs.inspect(fmt),
        word,
        rhs.inspect(fmt)
    )
}

/// Apply a non-short-circuiting binary operator.
pub fn apply(op: BinaryOp, lhs: &SassValue, rhs: &SassValue, fmt: Format) -> OpResult {
    match op {
        BinaryOp::Or => Ok(if lhs.is_truthy() {
            lhs.clone()
        } else {
            rhs.clone()
        }),
        BinaryOp::And => Ok(if lhs.is_truthy() {
            rhs.clone()
        } else {
            lhs.clone()
        }),
        BinaryOp::Eq => Ok(SassValue::Bool(lhs == rhs)),
        BinaryOp::Ne => Ok(SassValue::Bool(lhs != rhs)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => compare(op, lhs, rhs, fmt),
        BinaryOp::Add => add(lhs, rhs, fmt),
        BinaryOp::Sub => sub(lhs, rhs, fmt),
        BinaryOp::Mul => mul(lhs, rhs, fmt),
        BinaryOp::Div => div(lhs, rhs, fmt),
        BinaryOp::Rem => rem(lhs, rhs, fmt),
    }
}

fn compare(op: BinaryOp, lhs: &SassValue, rhs: &SassValue, fmt: Format) -> OpResult {
    let (
        SassValue::Number { value: a, unit: ua },
        SassValue::Number { value: b, unit: ub },
    ) = (lhs, rhs)
    else {
        let word = match op {
            BinaryOp::Lt => "lt",
            BinaryOp::Le => "lte",
            BinaryOp::Gt => "gt",
            _ => "gte",
        };
        return Err(undefined(lhs, word, rhs, fmt));
    };
    unify_units(ua, ub)?;
    Ok(SassValue::Bool(match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Le => a <= b,
        BinaryOp::Gt => a > b,
        _ => a >= b,
    }))
}

fn color_channels(
    color: &SassColor,
    rhs: &SassValue,
    f: impl Fn(f64, f64) -> f64,
) -> Option<SassValue> {
    let (r, g, b) = match rhs {
        SassValue::Number { value, .. } => (*value, *value, *value),
        SassValue::Color(other) => (other.r, other.g, other.b),
        _ => return None,
    };
    Some(SassValue::Color(SassColor::new(
        f(color.r, r),
        f(color.g, g),
        f(color.b, b),
        color.a,
    )))
}

fn add(lhs: &SassValue, rhs: &SassValue, fmt: Format) -> OpResult {
    match (lhs, rhs) {
        (
            SassValue::Number { value: a, unit: ua },
            SassValue::Number { value: b, unit: ub },
        ) => Ok(SassValue::number(a + b, unify_units(ua, ub)?)),
        (SassValue::Color(c), _) => {
            color_channels(c, rhs, |x, y| x + y).ok_or_else(|| undefined(lhs, "plus", rhs, fmt))
        }
        (SassValue::String { text, quoted }, other) => Ok(SassValue::String {
            text: format!("{}{}", text, other.to_interp(fmt)),
            quoted: *quoted,
        }),
        (other, SassValue::String { text, quoted }) => Ok(SassValue::String {
            text: format!("{}{}", other.to_interp(fmt), text),
            quoted: *quoted,
        }),
        _ => Ok(SassValue::unquoted(format!(
            "{}{}",
            lhs.to_interp(fmt),
            rhs.to_interp(fmt)
        ))),
    }
}

fn sub(lhs: &SassValue, rhs: &SassValue, fmt: Format) -> OpResult {
    match (lhs, rhs) {
        (
            SassValue::Number { value: a, unit: ua },
            SassValue::Number { value: b, unit: ub },
        ) => Ok(SassValue::number(a - b, unify_units(ua, ub)?)),
        (SassValue::Color(c), SassValue::Number { .. } | SassValue::Color(_)) => {
            color_channels(c, rhs, |x, y| x - y).ok_or_else(|| undefined(lhs, "minus", rhs, fmt))
        }
        _ => Ok(SassValue::unquoted(format!(
            "{}-{}",
            lhs.to_interp(fmt),
            rhs.to_interp(fmt)
        ))),
    }
}

fn mul(lhs: &SassValue, rhs: &SassValue, fmt: Format) -> OpResult {
    match (lhs, rhs) {
        (
            SassValue::Number { value: a, unit: ua },
            SassValue::Number { value: b, unit: ub },
        ) => {
            if !ua.is_empty() && !ub.is_empty() {
                return Err(format!(
                    "{}*{} isn't a valid CSS value.",
                    lhs.inspect(fmt),
                    rhs.inspect(fmt)
                ));
            }
            let unit = if ua.is_empty() { ub } else { ua };
            Ok(SassValue::number(a * b, unit.as_str()))
        }
        (SassValue::Color(c), SassValue::Number { .. } | SassValue::Color(_)) => {
            color_channels(c, rhs, |x, y| x * y).ok_or_else(|| undefined(lhs, "times", rhs, fmt))
        }
        _ => Err(undefined(lhs, "times", rhs, fmt)),
    }
}

fn div(lhs: &SassValue, rhs: &SassValue, fmt: Format) -> OpResult {
    match (lhs, rhs) {
        (
            SassValue::Number { value: a, unit: ua },
            SassValue::Number { value: b, unit: ub },
        ) => {
            if ua == ub {
                Ok(SassValue::number(a / b, ""))
            } else if ub.is_empty() {
                Ok(SassValue::number(a / b, ua.as_str()))
            } else {
                Err(format!(
                    "{}/{} isn't a valid CSS value.",
                    lhs.inspect(fmt),
                    rhs.inspect(fmt)
                ))
            }
        }
        (SassValue::Color(c), SassValue::Number { .. } | SassValue::Color(_)) => {
            color_channels(c, rhs, |x, y| x / y).ok_or_else(|| undefined(lhs, "div", rhs, fmt))
        }
        _ => Ok(SassValue::unquoted(format!(
            "{}/{}",
            lhs.to_interp(fmt),
            rhs.to_interp(fmt)
        ))),
    }
}

fn rem(lhs: &SassValue, rhs: &SassValue, fmt: Format) -> OpResult {
    match (lhs, rhs) {
        (
            SassValue::Number { value: a, unit: ua },
            SassValue::Number { value: b, unit: ub },
        ) => Ok(SassValue::number(a % b, unify_units(ua, ub)?)),
        _ => Err(undefined(lhs, "mod", rhs, fmt)),
    }
}

pub fn apply_unary(op: UnaryOp, operand: &SassValue, fmt: Format) -> OpResult {
    match (op, operand) {
        (UnaryOp::Not, v) => Ok(SassValue::Bool(!v.is_truthy())),
        (UnaryOp::Neg, SassValue::Number { value, unit }) => {
            Ok(SassValue::number(-value, unit.as_str()))
        }
        (UnaryOp::Plus, SassValue::Number { .. }) => Ok(operand.clone()),
        (UnaryOp::Neg, v) => Ok(SassValue::unquoted(format!("-{}", v.to_interp(fmt)))),
        (UnaryOp::Plus, v) => Ok(SassValue::unquoted(format!("+{}", v.to_interp(fmt)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(v: f64) -> SassValue {
        SassValue::number(v, "px")
    }

    fn num(v: f64) -> SassValue {
        SassValue::number(v, "")
    }

    #[test]
    fn test_number_arithmetic() {
        let fmt = Format::default();
        assert_eq!(apply(BinaryOp::Add, &px(1.0), &num(2.0), fmt).unwrap(), px(3.0));
        assert_eq!(apply(BinaryOp::Mul, &num(50.0), &px(1.0), fmt).unwrap(), px(50.0));
        assert_eq!(apply(BinaryOp::Div, &px(10.0), &px(2.0), fmt).unwrap(), num(5.0));
        assert_eq!(
            apply(BinaryOp::Add, &px(1.0), &SassValue::number(1.0, "em"), fmt).unwrap_err(),
            "Incompatible units: 'em' and 'px'."
        );
    }

    #[test]
    fn test_string_concatenation() {
        let fmt = Format::default();
        let joined = apply(BinaryOp::Add, &SassValue::quoted("a"), &num(1.0), fmt).unwrap();
        assert_eq!(joined.to_css(fmt).unwrap(), "\"a1\"");
        let dashed = apply(
            BinaryOp::Sub,
            &SassValue::unquoted("a"),
            &SassValue::unquoted("b"),
            fmt,
        )
        .unwrap();
        assert_eq!(dashed.to_css(fmt).unwrap(), "a-b");
    }

    #[test]
    fn test_comparisons() {
        let fmt = Format::default();
        assert_eq!(
            apply(BinaryOp::Lt, &num(1.0), &num(2.0), fmt).unwrap(),
            SassValue::Bool(true)
        );
        assert_eq!(
            apply(BinaryOp::Lt, &SassValue::unquoted("a"), &num(2.0), fmt).unwrap_err(),
            "Undefined operation: \"a lt 2\"."
        );
        assert_eq!(
            apply(BinaryOp::Eq, &px(1.0), &num(1.0), fmt).unwrap(),
            SassValue::Bool(false)
        );
    }

    #[test]
    fn test_unary() {
        let fmt = Format::default();
        assert_eq!(apply_unary(UnaryOp::Neg, &px(2.0), fmt).unwrap(), px(-2.0));
        assert_eq!(
            apply_unary(UnaryOp::Not, &SassValue::Null, fmt).unwrap(),
            SassValue::Bool(true)
        );
    }
}
