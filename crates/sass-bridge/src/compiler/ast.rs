/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Stylesheet AST types.
//!
//! Every statement and every expression that can fail at evaluation time
//! carries the [`Span`] it was parsed from, so errors can point at the
//! offending token.

use sass_bridge_values::ListSeparator;

/// 1-based line and column of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

/// A statement in a stylesheet body.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Style rule: `selector { body }`
    Rule {
        selector: Interpolation,
        body: Vec<Stmt>,
        span: Span,
    },

    /// Property declaration: `name: value [!important];`
    Declaration {
        name: Interpolation,
        value: DeclValue,
        important: bool,
        span: Span,
    },

    /// Variable assignment: `$name: value [!default] [!global];`
    Variable {
        name: String,
        value: Expr,
        default: bool,
        global: bool,
        span: Span,
    },

    /// Loud comment, kept in the output: `/* ... */`
    Comment { text: String, span: Span },

    /// `@import` with one or more comma-separated targets.
    Import { urls: Vec<ImportUrl>, span: Span },

    /// `@each $a[, $b...] in list { body }`
    Each {
        vars: Vec<String>,
        list: Expr,
        body: Vec<Stmt>,
        span: Span,
    },

    /// `@if cond { } @else if cond { } @else { }`
    If {
        clauses: Vec<(Expr, Vec<Stmt>)>,
        otherwise: Option<Vec<Stmt>>,
        span: Span,
    },

    /// `@debug`, `@warn` or `@error`.
    Message {
        kind: MessageKind,
        value: Expr,
        span: Span,
    },

    /// Any other at-rule, passed through with its evaluated contents.
    AtRule {
        name: String,
        prelude: Interpolation,
        body: Option<Vec<Stmt>>,
        span: Span,
    },
}

/// Right-hand side of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclValue {
    Expr(Expr),
    /// Custom properties (`--name: ...`) keep their text as written.
    Raw(Interpolation),
}

/// One target of an `@import`.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportUrl {
    /// Resolved through the importer chain and loaded inline.
    Sass { url: String, span: Span },
    /// Plain CSS import, emitted verbatim (text after `@import`).
    Css(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Debug,
    Warn,
    Error,
}

/// Text with embedded `#{...}` expressions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Interpolation {
    pub parts: Vec<InterpPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterpPart {
    Text(String),
    Expr(Expr),
}

impl Interpolation {
    pub fn plain(text: impl Into<String>) -> Self {
        Interpolation {
            parts: vec![InterpPart::Text(text.into())],
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(InterpPart::Text(text)) = self.parts.last_mut() {
            text.push(c);
        } else {
            self.parts.push(InterpPart::Text(c.to_string()));
        }
    }

    pub fn push_str(&mut self, s: &str) {
        if let Some(InterpPart::Text(text)) = self.parts.last_mut() {
            text.push_str(s);
        } else {
            self.parts.push(InterpPart::Text(s.to_string()));
        }
    }

    pub fn push_expr(&mut self, expr: Expr) {
        self.parts.push(InterpPart::Expr(expr));
    }

    /// The text when there is no embedded expression.
    pub fn as_plain(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [] => Some(""),
            [InterpPart::Text(text)] => Some(text),
            _ => None,
        }
    }

    /// Strip leading and trailing whitespace from the literal ends.
    pub fn trimmed(mut self) -> Self {
        if let Some(InterpPart::Text(text)) = self.parts.first_mut() {
            *text = text.trim_start().to_string();
        }
        if let Some(InterpPart::Text(text)) = self.parts.last_mut() {
            *text = text.trim_end().to_string();
        }
        self.parts
            .retain(|p| !matches!(p, InterpPart::Text(t) if t.is_empty()));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
}

/// A SassScript expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number {
        value: f64,
        unit: String,
    },
    /// Hex or named color literal; `repr` is the text as written.
    Color {
        rgba: [f64; 4],
        repr: String,
    },
    String {
        parts: Interpolation,
        quoted: bool,
    },
    Bool(bool),
    Null,
    Variable {
        name: String,
        span: Span,
    },
    List {
        items: Vec<Expr>,
        separator: ListSeparator,
        bracketed: bool,
    },
    Map {
        entries: Vec<(Expr, Expr)>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Call {
        name: String,
        args: CallArgs,
        span: Span,
    },
    Paren(Box<Expr>),
    /// `a/b` between literals, printed as written rather than divided.
    Slash(Box<Expr>, Box<Expr>),
}

/// Arguments of a function call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallArgs {
    pub positional: Vec<Expr>,
    pub named: Vec<(String, Expr)>,
    /// `$list...` spread
    pub rest: Option<Box<Expr>>,
}

/// A parsed custom-function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub name: String,
    /// `None` for a bare name: arguments are passed through unchecked.
    pub params: Option<Vec<Param>>,
    /// Name of the trailing `$args...` parameter, if any.
    pub rest: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
}
