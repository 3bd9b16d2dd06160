/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Runtime values of the stylesheet evaluator and their CSS serialization.

use sass_bridge_values::ListSeparator;

use super::colors;

/// Number formatting options shared by serialization and string conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    pub precision: usize,
    pub compressed: bool,
}

impl Default for Format {
    fn default() -> Self {
        Format {
            precision: 5,
            compressed: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SassColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
    /// The literal as written (`#08c`, `red`), kept until the color is modified.
    pub repr: Option<String>,
}

impl SassColor {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        SassColor {
            r: r.clamp(0.0, 255.0),
            g: g.clamp(0.0, 255.0),
            b: b.clamp(0.0, 255.0),
            a: a.clamp(0.0, 1.0),
            repr: None,
        }
    }

    fn channels(&self) -> (u8, u8, u8) {
        // clamped to 0..=255 above, so the casts cannot truncate
        (
            self.r.round() as u8,
            self.g.round() as u8,
            self.b.round() as u8,
        )
    }

    fn to_css(&self, fmt: Format) -> String {
        if let (Some(repr), false) = (&self.repr, fmt.compressed) {
            return repr.clone();
        }
        let (r, g, b) = self.channels();
        if self.a < 1.0 {
            let alpha = format_number(self.a, fmt);
            return if fmt.compressed {
                format!("rgba({},{},{},{})", r, g, b, alpha)
            } else {
                format!("rgba({}, {}, {}, {})", r, g, b, alpha)
            };
        }
        let hex = format!("#{:02x}{:02x}{:02x}", r, g, b);
        let name = colors::name_of(r, g, b);
        if fmt.compressed {
            let short = shorten_hex(&hex);
            return match name {
                Some(name) if name.len() < short.len() => name.to_string(),
                _ => short,
            };
        }
        name.map_or(hex, str::to_string)
    }
}

fn shorten_hex(hex: &str) -> String {
    let b = hex.as_bytes();
    if b.len() == 7 && b[1] == b[2] && b[3] == b[4] && b[5] == b[6] {
        format!("#{}{}{}", b[1] as char, b[3] as char, b[5] as char)
    } else {
        hex.to_string()
    }
}

impl PartialEq for SassColor {
    fn eq(&self, other: &Self) -> bool {
        self.channels() == other.channels() && (self.a - other.a).abs() < 1e-10
    }
}

#[derive(Debug, Clone)]
pub enum SassValue {
    Null,
    Bool(bool),
    Number { value: f64, unit: String },
    String { text: String, quoted: bool },
    Color(SassColor),
    List {
        items: Vec<SassValue>,
        separator: ListSeparator,
        bracketed: bool,
    },
    Map(Vec<(SassValue, SassValue)>),
    /// A function reference produced by `get-function`.
    Function(String),
}

impl SassValue {
    pub fn number(value: f64, unit: impl Into<String>) -> Self {
        SassValue::Number {
            value,
            unit: unit.into(),
        }
    }

    pub fn unquoted(text: impl Into<String>) -> Self {
        SassValue::String {
            text: text.into(),
            quoted: false,
        }
    }

    pub fn quoted(text: impl Into<String>) -> Self {
        SassValue::String {
            text: text.into(),
            quoted: true,
        }
    }

    pub fn list(items: Vec<SassValue>, separator: ListSeparator) -> Self {
        SassValue::List {
            items,
            separator,
            bracketed: false,
        }
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, SassValue::Null | SassValue::Bool(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SassValue::Null => "null",
            SassValue::Bool(_) => "bool",
            SassValue::Number { .. } => "number",
            SassValue::String { .. } => "string",
            SassValue::Color(_) => "color",
            SassValue::List { .. } => "list",
            SassValue::Map(_) => "map",
            SassValue::Function(_) => "function",
        }
    }

    /// Null, or a list with nothing but nulls: omitted from the output.
    pub fn is_blank(&self) -> bool {
        match self {
            SassValue::Null => true,
            SassValue::List {
                items, bracketed, ..
            } => !bracketed && !items.is_empty() && items.iter().all(SassValue::is_blank),
            _ => false,
        }
    }

    /// View any value as a list: maps become lists of pairs, other values
    /// single-item lists.
    pub fn as_items(&self) -> Vec<SassValue> {
        match self {
            SassValue::List { items, .. } => items.clone(),
            SassValue::Map(entries) => entries
                .iter()
                .map(|(k, v)| SassValue::list(vec![k.clone(), v.clone()], ListSeparator::Space))
                .collect(),
            other => vec![other.clone()],
        }
    }

    pub fn separator(&self) -> ListSeparator {
        match self {
            SassValue::List { separator, .. } => *separator,
            SassValue::Map(_) => ListSeparator::Comma,
            _ => ListSeparator::Space,
        }
    }

    /// Serialize as a CSS property value.
    ///
    /// # Errors
    ///
    /// Maps, empty lists and function references have no CSS
    /// representation.
    pub fn to_css(&self, fmt: Format) -> Result<String, String> {
        match self {
            SassValue::Null => Ok(String::new()),
            SassValue::Bool(b) => Ok(b.to_string()),
            SassValue::Number { value, unit } => {
                Ok(format!("{}{}", format_number(*value, fmt), unit))
            }
            SassValue::String { text, quoted } => Ok(if *quoted {
                quote_string(text)
            } else {
                text.clone()
            }),
            SassValue::Color(color) => Ok(color.to_css(fmt)),
            SassValue::List {
                items,
                separator,
                bracketed,
            } => {
                if items.is_empty() && !bracketed {
                    return Err("() isn't a valid CSS value.".to_string());
                }
                let mut parts = Vec::with_capacity(items.len());
                for item in items.iter().filter(|i| !i.is_blank()) {
                    parts.push(item.to_css(fmt)?);
                }
                let joined = parts.join(list_joiner(*separator, fmt));
                Ok(if *bracketed {
                    format!("[{}]", joined)
                } else {
                    joined
                })
            }
            SassValue::Map(_) | SassValue::Function(_) => {
                Err(format!("{} isn't a valid CSS value.", self.inspect(fmt)))
            }
        }
    }

    /// Text used inside `#{}` and string concatenation: strings lose their
    /// quotes, null becomes empty.
    pub fn to_interp(&self, fmt: Format) -> String {
        match self {
            SassValue::Null => String::new(),
            SassValue::String { text, .. } => text.clone(),
            SassValue::List {
                items,
                separator,
                bracketed,
            } => {
                let joined = items
                    .iter()
                    .filter(|i| !i.is_blank())
                    .map(|i| i.to_interp(fmt))
                    .collect::<Vec<_>>()
                    .join(list_joiner(*separator, fmt));
                if *bracketed {
                    format!("[{}]", joined)
                } else {
                    joined
                }
            }
            other => other.to_css(fmt).unwrap_or_else(|_| other.inspect(fmt)),
        }
    }

    /// Debug representation, valid for every value.
    pub fn inspect(&self, fmt: Format) -> String {
        match self {
            SassValue::Null => "null".to_string(),
            SassValue::List {
                items,
                separator,
                bracketed,
            } => {
                let inner = items
                    .iter()
                    .map(|i| match i {
                        SassValue::List { items, .. } if items.len() > 1 => {
                            format!("({})", i.inspect(fmt))
                        }
                        _ => i.inspect(fmt),
                    })
                    .collect::<Vec<_>>()
                    .join(list_joiner(*separator, fmt));
                if *bracketed {
                    format!("[{}]", inner)
                } else if items.is_empty() {
                    "()".to_string()
                } else {
                    inner
                }
            }
            SassValue::Map(entries) => {
                let inner = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.inspect(fmt), v.inspect(fmt)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({})", inner)
            }
            SassValue::Function(name) => format!("get-function(\"{}\")", name),
            other => other.to_css(fmt).unwrap_or_default(),
        }
    }
}

impl PartialEq for SassValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SassValue::Null, SassValue::Null) => true,
            (SassValue::Bool(a), SassValue::Bool(b)) => a == b,
            (
                SassValue::Number { value: a, unit: ua },
                SassValue::Number { value: b, unit: ub },
            ) => ua == ub && (a - b).abs() < 1e-10,
            (SassValue::String { text: a, .. }, SassValue::String { text: b, .. }) => a == b,
            (SassValue::Color(a), SassValue::Color(b)) => a == b,
            (
                SassValue::List {
                    items: a,
                    separator: sa,
                    bracketed: ba,
                },
                SassValue::List {
                    items: b,
                    separator: sb,
                    bracketed: bb,
                },
            ) => a == b && ba == bb && (a.len() < 2 || sa == sb),
            (SassValue::Map(a), SassValue::Map(b)) => a == b,
            (SassValue::Function(a), SassValue::Function(b)) => a == b,
            _ => false,
        }
    }
}

fn list_joiner(separator: ListSeparator, fmt: Format) -> &'static str {
    match (separator, fmt.compressed) {
        (ListSeparator::Comma, false) => ", ",
        (ListSeparator::Comma, true) => ",",
        (ListSeparator::Space, _) => " ",
    }
}

fn quote_string(text: &str) -> String {
    if text.contains('"') && !text.contains('\'') {
        format!("'{}'", text)
    } else {
        format!("\"{}\"", text.replace('"', "\\\""))
    }
}

/// Round to `fmt.precision` decimals and drop trailing zeros.
pub fn format_number(value: f64, fmt: Format) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    let mut text = format!("{:.*}", fmt.precision, value);
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" {
        text = "0".to_string();
    }
    if fmt.compressed {
        if let Some(rest) = text.strip_prefix("0.") {
            text = format!(".{}", rest);
        } else if let Some(rest) = text.strip_prefix("-0.") {
            text = format!("-.{}", rest);
        }
    }
    text
}
