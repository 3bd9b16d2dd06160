/*
 * builtins.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Built-in SassScript functions.
//!
//! Each function declares its parameters in [`params`]; a trailing `?`
//! marks an optional parameter. Arguments are bound positionally first,
//! then by name.

use sass_bridge_values::ListSeparator;

use super::value::{Format, SassColor, SassValue};

/// Evaluated call arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    pub positional: Vec<SassValue>,
    pub named: Vec<(String, SassValue)>,
}

type BuiltinResult = Result<SassValue, String>;

static NULL: SassValue = SassValue::Null;

fn params(name: &str) -> Option<&'static [&'static str]> {
    Some(match name {
        "if" => &["condition", "if-true", "if-false"],
        "map-get" | "map-has-key" => &["map", "key"],
        "map-keys" | "map-values" => &["map"],
        "map-merge" => &["map1", "map2"],
        "length" => &["list"],
        "nth" => &["list", "n"],
        "join" => &["list1", "list2", "separator?"],
        "append" => &["list", "val", "separator?"],
        "index" => &["list", "value"],
        "quote" | "unquote" | "str-length" | "to-upper-case" | "to-lower-case" => &["string"],
        "type-of" | "inspect" => &["value"],
        "rgb" => &["red", "green", "blue"],
        "rgba" => &["red", "green", "blue", "alpha"],
        "red" | "green" | "blue" | "alpha" | "opacity" => &["color"],
        "percentage" | "round" | "ceil" | "floor" | "abs" | "unit" | "unitless" => &["number"],
        "comparable" => &["number1", "number2"],
        _ => return None,
    })
}

/// Whether `name` is a built-in function.
pub fn exists(name: &str) -> bool {
    params(name).is_some()
}

/// Bind `args` to the named parameters of `name`.
fn bind(name: &str, params: &[&str], args: &Args) -> Result<Vec<Option<SassValue>>, String> {
    if args.positional.len() > params.len() {
        return Err(format!(
            "wrong number of arguments ({} for {}) for `{}'",
            args.positional.len(),
            params.len(),
            name
        ));
    }
    let mut bound: Vec<Option<SassValue>> = vec![None; params.len()];
    for (slot, value) in bound.iter_mut().zip(&args.positional) {
        *slot = Some(value.clone());
    }
    for (arg_name, value) in &args.named {
        let arg_name = arg_name.replace('_', "-");
        let Some(index) = params
            .iter()
            .position(|p| p.trim_end_matches('?') == arg_name)
        else {
            return Err(format!(
                "Function {} has no argument named ${}",
                name, arg_name
            ));
        };
        if bound[index].is_some() {
            return Err(format!(
                "Function {} was passed argument ${} both by position and by name.",
                name, arg_name
            ));
        }
        bound[index] = Some(value.clone());
    }
    for (param, slot) in params.iter().zip(&bound) {
        if slot.is_none() && !param.ends_with('?') {
            return Err(format!("Function {} is missing argument ${}.", name, param));
        }
    }
    Ok(bound)
}

/// Bound arguments with typed accessors.
struct Bound<'n> {
    name: &'n str,
    values: Vec<Option<SassValue>>,
    params: &'static [&'static str],
    fmt: Format,
}

impl Bound<'_> {
    fn value(&self, i: usize) -> &SassValue {
        self.values[i].as_ref().unwrap_or(&NULL)
    }

    fn optional(&self, i: usize) -> Option<&SassValue> {
        self.values[i].as_ref()
    }

    fn param(&self, i: usize) -> &str {
        self.params[i].trim_end_matches('?')
    }

    fn type_error(&self, i: usize, expected: &str) -> String {
        format!(
            "${}: {} is not {} for `{}'",
            self.param(i),
            self.value(i).inspect(self.fmt),
            expected,
            self.name
        )
    }

    fn number(&self, i: usize) -> Result<(f64, &str), String> {
        match self.value(i) {
            SassValue::Number { value, unit } => Ok((*value, unit.as_str())),
            _ => Err(self.type_error(i, "a number")),
        }
    }

    fn color(&self, i: usize) -> Result<&SassColor, String> {
        match self.value(i) {
            SassValue::Color(color) => Ok(color),
            _ => Err(self.type_error(i, "a color")),
        }
    }

    fn string(&self, i: usize) -> Result<(&str, bool), String> {
        match self.value(i) {
            SassValue::String { text, quoted } => Ok((text.as_str(), *quoted)),
            _ => Err(self.type_error(i, "a string")),
        }
    }

    fn map(&self, i: usize) -> Result<Vec<(SassValue, SassValue)>, String> {
        match self.value(i) {
            SassValue::Map(entries) => Ok(entries.clone()),
            SassValue::List { items, .. } if items.is_empty() => Ok(Vec::new()),
            _ => Err(self.type_error(i, "a map")),
        }
    }

    /// An RGB channel: `%` values scale to 0..255.
    fn channel(&self, i: usize) -> Result<f64, String> {
        let (value, unit) = self.number(i)?;
        Ok(if unit == "%" { value * 2.55 } else { value })
    }

    fn separator(&self, i: usize, fallback: ListSeparator) -> Result<ListSeparator, String> {
        match self.optional(i) {
            None => Ok(fallback),
            Some(SassValue::String { text, .. }) => match text.as_str() {
                "auto" => Ok(fallback),
                "comma" => Ok(ListSeparator::Comma),
                "space" => Ok(ListSeparator::Space),
                _ => Err(format!(
                    "${}: Must be \"space\", \"comma\", or \"auto\" for `{}'",
                    self.param(i),
                    self.name
                )),
            },
            Some(_) => Err(self.type_error(i, "a string")),
        }
    }
}

/// Call a built-in. Returns `None` when `name` is not a built-in.
pub fn call(name: &str, args: &Args, fmt: Format) -> Option<BuiltinResult> {
    // rgba($color, $alpha)
    if name == "rgba" && args.positional.len() == 2 && args.named.is_empty() {
        return Some(rgba_with_color(args, fmt));
    }
    let params = params(name)?;
    let bound = match bind(name, params, args) {
        Ok(values) => Bound {
            name,
            values,
            params,
            fmt,
        },
        Err(e) => return Some(Err(e)),
    };
    Some(dispatch(&bound))
}

fn rgba_with_color(args: &Args, fmt: Format) -> BuiltinResult {
    let bound = Bound {
        name: "rgba",
        values: args.positional.iter().cloned().map(Some).collect(),
        params: &["color", "alpha"],
        fmt,
    };
    let color = bound.color(0)?;
    let (alpha, _) = bound.number(1)?;
    Ok(SassValue::Color(SassColor::new(
        color.r, color.g, color.b, alpha,
    )))
}

fn number_fn(b: &Bound, f: impl Fn(f64) -> f64) -> BuiltinResult {
    let (value, unit) = b.number(0)?;
    Ok(SassValue::number(f(value), unit))
}

fn dispatch(b: &Bound) -> BuiltinResult {
    match b.name {
        "if" => Ok(if b.value(0).is_truthy() {
            b.value(1).clone()
        } else {
            b.value(2).clone()
        }),
        "map-get" => {
            let entries = b.map(0)?;
            Ok(entries
                .into_iter()
                .find(|(k, _)| k == b.value(1))
                .map_or(SassValue::Null, |(_, v)| v))
        }
        "map-has-key" => Ok(SassValue::Bool(
            b.map(0)?.iter().any(|(k, _)| k == b.value(1)),
        )),
        "map-keys" => Ok(SassValue::list(
            b.map(0)?.into_iter().map(|(k, _)| k).collect(),
            ListSeparator::Comma,
        )),
        "map-values" => Ok(SassValue::list(
            b.map(0)?.into_iter().map(|(_, v)| v).collect(),
            ListSeparator::Comma,
        )),
        "map-merge" => {
            let mut merged = b.map(0)?;
            for (key, value) in b.map(1)? {
                match merged.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => merged.push((key, value)),
                }
            }
            Ok(SassValue::Map(merged))
        }
        "length" => Ok(SassValue::number(b.value(0).as_items().len() as f64, "")),
        "nth" => {
            let items = b.value(0).as_items();
            let (n, _) = b.number(1)?;
            let len = items.len() as f64;
            if n == 0.0 || n.fract() != 0.0 || n.abs() > len {
                return Err(format!(
                    "$n: Invalid index {} for a list with {} elements for `nth'",
                    b.value(1).inspect(b.fmt),
                    items.len()
                ));
            }
            let index = if n > 0.0 { n - 1.0 } else { len + n };
            Ok(items[index as usize].clone())
        }
        "join" => {
            let mut items = b.value(0).as_items();
            items.extend(b.value(1).as_items());
            let fallback = match b.value(0) {
                SassValue::List { items, separator, .. } if items.len() > 1 => *separator,
                _ => b.value(1).separator(),
            };
            Ok(SassValue::list(items, b.separator(2, fallback)?))
        }
        "append" => {
            let mut items = b.value(0).as_items();
            items.push(b.value(1).clone());
            let separator = b.separator(2, b.value(0).separator())?;
            Ok(SassValue::list(items, separator))
        }
        "index" => Ok(b
            .value(0)
            .as_items()
            .iter()
            .position(|item| item == b.value(1))
            .map_or(SassValue::Null, |i| SassValue::number((i + 1) as f64, ""))),
        "quote" => Ok(SassValue::quoted(b.string(0)?.0)),
        "unquote" => match b.value(0) {
            SassValue::String { text, .. } => Ok(SassValue::unquoted(text.as_str())),
            other => Ok(other.clone()),
        },
        "str-length" => Ok(SassValue::number(b.string(0)?.0.chars().count() as f64, "")),
        "to-upper-case" | "to-lower-case" => {
            let (text, quoted) = b.string(0)?;
            let text = if b.name == "to-upper-case" {
                text.to_ascii_uppercase()
            } else {
                text.to_ascii_lowercase()
            };
            Ok(SassValue::String { text, quoted })
        }
        "type-of" => Ok(SassValue::unquoted(b.value(0).type_name())),
        "inspect" => Ok(SassValue::unquoted(b.value(0).inspect(b.fmt))),
        "rgb" | "rgba" => {
            let alpha = if b.name == "rgba" { b.number(3)?.0 } else { 1.0 };
            Ok(SassValue::Color(SassColor::new(
                b.channel(0)?,
                b.channel(1)?,
                b.channel(2)?,
                alpha,
            )))
        }
        "red" => Ok(SassValue::number(b.color(0)?.r.round(), "")),
        "green" => Ok(SassValue::number(b.color(0)?.g.round(), "")),
        "blue" => Ok(SassValue::number(b.color(0)?.b.round(), "")),
        "alpha" | "opacity" => Ok(SassValue::number(b.color(0)?.a, "")),
        "percentage" => {
            let (value, unit) = b.number(0)?;
            if !unit.is_empty() {
                return Err(b.type_error(0, "a unitless number"));
            }
            Ok(SassValue::number(value * 100.0, "%"))
        }
        "round" => number_fn(b, f64::round),
        "ceil" => number_fn(b, f64::ceil),
        "floor" => number_fn(b, f64::floor),
        "abs" => number_fn(b, f64::abs),
        "unit" => Ok(SassValue::quoted(b.number(0)?.1)),
        "unitless" => Ok(SassValue::Bool(b.number(0)?.1.is_empty())),
        "comparable" => {
            let (_, a) = b.number(0)?;
            let (_, c) = b.number(1)?;
            Ok(SassValue::Bool(a == c || a.is_empty() || c.is_empty()))
        }
        other => Err(format!("Undefined function `{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positional(values: Vec<SassValue>) -> Args {
        Args {
            positional: values,
            named: Vec::new(),
        }
    }

    fn call_ok(name: &str, args: Args) -> SassValue {
        call(name, &args, Format::default()).unwrap().unwrap()
    }

    #[test]
    fn test_unknown_function() {
        assert!(call("foo", &Args::default(), Format::default()).is_none());
        assert!(!exists("foo"));
        assert!(exists("map-get"));
    }

    #[test]
    fn test_map_get() {
        let map = SassValue::Map(vec![(SassValue::unquoted("a"), SassValue::number(1.0, "px"))]);
        let found = call_ok("map-get", positional(vec![map.clone(), SassValue::quoted("a")]));
        assert_eq!(found, SassValue::number(1.0, "px"));
        let missing = call_ok("map-get", positional(vec![map, SassValue::quoted("b")]));
        assert_eq!(missing, SassValue::Null);
    }

    #[test]
    fn test_nth_and_length() {
        let list = SassValue::list(
            vec![SassValue::unquoted("a"), SassValue::unquoted("b")],
            ListSeparator::Space,
        );
        assert_eq!(
            call_ok("nth", positional(vec![list.clone(), SassValue::number(-1.0, "")])),
            SassValue::unquoted("b")
        );
        assert_eq!(
            call_ok("length", positional(vec![list])),
            SassValue::number(2.0, "")
        );
    }

    #[test]
    fn test_argument_errors() {
        let too_many = call(
            "abs",
            &positional(vec![SassValue::Null, SassValue::Null]),
            Format::default(),
        )
        .unwrap()
        .unwrap_err();
        assert_eq!(too_many, "wrong number of arguments (2 for 1) for `abs'");

        let missing = call("nth", &positional(vec![SassValue::Null]), Format::default())
            .unwrap()
            .unwrap_err();
        assert_eq!(missing, "Function nth is missing argument $n.");

        let named = Args {
            positional: Vec::new(),
            named: vec![("bogus".into(), SassValue::Null)],
        };
        let unknown = call("abs", &named, Format::default()).unwrap().unwrap_err();
        assert_eq!(unknown, "Function abs has no argument named $bogus");
    }

    #[test]
    fn test_rgba_forms() {
        let from_channels = call_ok(
            "rgba",
            positional(vec![
                SassValue::number(255.0, ""),
                SassValue::number(255.0, ""),
                SassValue::number(0.0, ""),
                SassValue::number(0.5, ""),
            ]),
        );
        assert_eq!(
            from_channels.to_css(Format::default()).unwrap(),
            "rgba(255, 255, 0, 0.5)"
        );
        let base = SassValue::Color(SassColor::new(255.0, 0.0, 0.0, 1.0));
        let faded = call_ok("rgba", positional(vec![base, SassValue::number(0.2, "")]));
        assert_eq!(
            faded.to_css(Format::default()).unwrap(),
            "rgba(255, 0, 0, 0.2)"
        );
    }
}
