/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Recursive-descent parser for the supported SCSS subset.
//!
//! Statements are classified by scanning ahead to the first top-level `{`,
//! `;` or `}`: a block means a style rule, anything else a declaration.
//! Expressions follow the usual SassScript precedence ladder
//! (`or` < `and` < equality < relational < additive < multiplicative <
//! unary < primary), with space- and comma-separated lists above it.

use once_cell::sync::Lazy;
use regex::Regex;
use sass_bridge_values::ListSeparator;

use super::ast::{
    BinaryOp, CallArgs, DeclValue, Expr, ImportUrl, Interpolation, MessageKind, Param, Signature,
    Span, Stmt, UnaryOp,
};
use super::colors;
use super::scanner::{Scanner, is_name_char, is_name_start};
use crate::error::CompileError;

type ParseResult<T> = Result<T, CompileError>;

/// Imports matching this are passed through as plain CSS.
static PLAIN_CSS_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:https?:)?//|\.css$").unwrap());

/// Functions whose arguments are kept as raw text.
const RAW_FUNCTIONS: &[&str] = &[
    "url",
    "calc",
    "var",
    "env",
    "element",
    "expression",
    "-webkit-calc",
    "-moz-calc",
];

/// Sass directives this compiler does not implement.
const UNSUPPORTED_DIRECTIVES: &[&str] = &[
    "mixin", "include", "function", "return", "for", "while", "extend", "use", "forward",
    "content", "at-root",
];

/// Parse a complete stylesheet.
///
/// # Arguments
/// * `source` - The stylesheet text
/// * `file` - Path or label used in error locations
///
/// # Errors
///
/// Returns a [`CompileError`] positioned at the first offending token.
pub fn parse_stylesheet(source: &str, file: &str) -> ParseResult<Vec<Stmt>> {
    let mut parser = Parser::new(source, file);
    parser.parse_statements(true)
}

/// Parse the body of an imported file. Unlike the entry stylesheet it may
/// hold bare declarations, which are valid when the `@import` sits inside a
/// rule.
pub fn parse_imported(source: &str, file: &str) -> ParseResult<Vec<Stmt>> {
    let mut parser = Parser::new(source, file);
    parser.root_declarations = true;
    parser.parse_statements(true)
}

/// Parse a custom-function signature: `name` or `name($a, $b: default, $rest...)`.
pub fn parse_signature(text: &str) -> ParseResult<Signature> {
    let mut p = Parser::new(text, "function signature");
    p.s.skip_whitespace();
    let name = p.parse_ident_text()?;
    p.s.skip_whitespace();
    if p.s.is_done() {
        return Ok(Signature {
            name,
            params: None,
            rest: None,
        });
    }
    p.expect('(')?;
    let mut params = Vec::new();
    let mut rest = None;
    loop {
        p.s.skip_trivia();
        if p.s.eat(')') {
            break;
        }
        p.expect('$')?;
        let param = p.parse_name()?;
        p.s.skip_trivia();
        if p.s.eat_str("...") {
            rest = Some(param);
            p.s.skip_trivia();
            p.expect(')')?;
            break;
        }
        let default = if p.s.eat(':') {
            p.s.skip_trivia();
            Some(p.parse_space_list()?)
        } else {
            None
        };
        params.push(Param {
            name: param,
            default,
        });
        p.s.skip_trivia();
        if p.s.eat(',') {
            continue;
        }
        p.expect(')')?;
        break;
    }
    p.s.skip_whitespace();
    if !p.s.is_done() {
        return Err(p.invalid_css("expected end of signature"));
    }
    Ok(Signature {
        name,
        params: Some(params),
        rest,
    })
}

/// Where a statement ends when scanned at the top level.
enum StatementEnd {
    Block,
    Semicolon,
    Close,
    Eof,
}

pub struct Parser<'a> {
    s: Scanner,
    file: &'a str,
    /// Inside parentheses `/` divides instead of separating.
    paren_depth: usize,
    root_declarations: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &str, file: &'a str) -> Self {
        Parser {
            s: Scanner::new(source),
            file,
            paren_depth: 0,
            root_declarations: false,
        }
    }

    fn error_at(&self, span: Span, message: impl Into<String>) -> CompileError {
        CompileError::new(message, self.file, span.line, span.column)
    }

    /// `Invalid CSS after "...": expected X, was "..."`.
    fn invalid_css(&self, expected: &str) -> CompileError {
        let message = format!(
            "Invalid CSS after \"{}\": {}, was \"{}\"",
            self.s.line_before(),
            expected,
            self.s.line_after()
        );
        self.error_at(self.s.span(), message)
    }

    fn expect(&mut self, c: char) -> ParseResult<()> {
        if self.s.eat(c) {
            Ok(())
        } else {
            Err(self.invalid_css(&format!("expected \"{}\"", c)))
        }
    }

    fn skip_statement_trivia(&mut self) {
        loop {
            let ws = self.s.skip_whitespace();
            let silent = self.s.skip_silent_comment();
            if !ws && !silent {
                break;
            }
        }
    }

    fn parse_statements(&mut self, root: bool) -> ParseResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            self.skip_statement_trivia();
            match self.s.peek() {
                None => {
                    if root {
                        break;
                    }
                    return Err(self.invalid_css("expected \"}\""));
                }
                Some('}') => {
                    if root {
                        return Err(self.invalid_css("expected selector or at-rule"));
                    }
                    self.s.bump();
                    break;
                }
                Some(';') => {
                    self.s.bump();
                }
                Some('/') if self.s.looking_at("/*") => {
                    let span = self.s.span();
                    let text = self.s.loud_comment().unwrap_or_default();
                    stmts.push(Stmt::Comment { text, span });
                }
                Some('$') => stmts.push(self.parse_variable_decl()?),
                Some('@') => stmts.push(self.parse_at_rule()?),
                Some(_) => stmts.push(self.parse_rule_or_declaration(root)?),
            }
        }
        Ok(stmts)
    }

    fn parse_variable_decl(&mut self) -> ParseResult<Stmt> {
        let span = self.s.span();
        self.s.bump();
        let name = self.parse_name()?;
        self.s.skip_trivia();
        self.expect(':')?;
        self.s.skip_trivia();
        let value = self.parse_expression()?;
        let mut default = false;
        let mut global = false;
        loop {
            self.s.skip_trivia();
            if !self.s.eat('!') {
                break;
            }
            let flag_span = self.s.span();
            match self.parse_name()?.as_str() {
                "default" => default = true,
                "global" => global = true,
                other => {
                    return Err(self.error_at(flag_span, format!("Invalid flag \"!{}\".", other)));
                }
            }
        }
        self.expect_statement_end()?;
        Ok(Stmt::Variable {
            name,
            value,
            default,
            global,
            span,
        })
    }

    fn expect_statement_end(&mut self) -> ParseResult<()> {
        self.s.skip_trivia();
        match self.s.peek() {
            None | Some('}') => Ok(()),
            Some(';') => {
                self.s.bump();
                Ok(())
            }
            Some(_) => Err(self.invalid_css("expected \";\"")),
        }
    }

    /// Scan ahead (without consuming) to the end of the current statement.
    fn scan_statement_end(&mut self) -> (StatementEnd, super::scanner::Mark) {
        let start = self.s.mark();
        let mut depth = 0usize;
        let end = loop {
            let Some(c) = self.s.peek() else {
                break StatementEnd::Eof;
            };
            match c {
                '"' | '\'' => {
                    self.skip_quoted_raw(c);
                    continue;
                }
                '#' if self.s.peek_at(1) == Some('{') => {
                    self.skip_balanced_interpolation();
                    continue;
                }
                '/' if self.s.looking_at("/*") => {
                    self.s.loud_comment();
                    continue;
                }
                '/' if depth == 0 && self.s.looking_at("//") => {
                    self.s.skip_silent_comment();
                    continue;
                }
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                '{' if depth == 0 => break StatementEnd::Block,
                ';' if depth == 0 => break StatementEnd::Semicolon,
                '}' if depth == 0 => break StatementEnd::Close,
                _ => {}
            }
            self.s.bump();
        };
        let end_mark = self.s.mark();
        self.s.reset(start);
        (end, end_mark)
    }

    fn skip_quoted_raw(&mut self, quote: char) {
        self.s.bump();
        while let Some(c) = self.s.bump() {
            if c == '\\' {
                self.s.bump();
            } else if c == quote || c == '\n' {
                break;
            }
        }
    }

    fn skip_balanced_interpolation(&mut self) {
        self.s.bump();
        self.s.bump();
        let mut depth = 1usize;
        while let Some(c) = self.s.bump() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    fn parse_rule_or_declaration(&mut self, root: bool) -> ParseResult<Stmt> {
        let (end, end_mark) = self.scan_statement_end();
        match end {
            StatementEnd::Block => self.parse_rule(),
            _ if root && !self.root_declarations => {
                self.s.reset(end_mark);
                Err(self.invalid_css("expected \"{\""))
            }
            StatementEnd::Semicolon | StatementEnd::Close | StatementEnd::Eof => {
                self.parse_declaration()
            }
        }
    }

    fn parse_rule(&mut self) -> ParseResult<Stmt> {
        let span = self.s.span();
        let selector = self.parse_interpolated_until(&['{'])?.trimmed();
        self.expect('{')?;
        let body = self.parse_statements(false)?;
        Ok(Stmt::Rule {
            selector,
            body,
            span,
        })
    }

    fn parse_declaration(&mut self) -> ParseResult<Stmt> {
        let span = self.s.span();
        let name = self.parse_interpolated_until(&[':', ';', '}'])?.trimmed();
        if !self.s.eat(':') {
            return Err(self.invalid_css("expected \":\""));
        }
        let custom = name.as_plain().is_some_and(|n| n.starts_with("--"));
        if custom {
            let raw = self.parse_interpolated_until(&[';', '}'])?.trimmed();
            self.expect_statement_end()?;
            return Ok(Stmt::Declaration {
                name,
                value: DeclValue::Raw(raw),
                important: false,
                span,
            });
        }
        self.s.skip_trivia();
        if self.s.peek() == Some('{') {
            return Err(self.error_at(self.s.span(), "Nested properties are not supported."));
        }
        let value = self.parse_expression()?;
        let important = self.parse_important()?;
        self.expect_statement_end()?;
        Ok(Stmt::Declaration {
            name,
            value: DeclValue::Expr(value),
            important,
            span,
        })
    }

    fn parse_important(&mut self) -> ParseResult<bool> {
        self.s.skip_trivia();
        if self.s.peek() != Some('!') {
            return Ok(false);
        }
        self.s.bump();
        self.s.skip_whitespace();
        if self.s.looking_at_ignore_case("important") {
            for _ in 0.."important".len() {
                self.s.bump();
            }
            Ok(true)
        } else {
            Err(self.invalid_css("expected \"important\""))
        }
    }

    /// Read raw text with `#{}` expressions until a top-level stop character.
    fn parse_interpolated_until(&mut self, stops: &[char]) -> ParseResult<Interpolation> {
        let mut out = Interpolation::default();
        let mut depth = 0usize;
        loop {
            let Some(c) = self.s.peek() else {
                break;
            };
            if depth == 0 && stops.contains(&c) {
                break;
            }
            match c {
                '#' if self.s.peek_at(1) == Some('{') => {
                    let expr = self.parse_interpolation_expr()?;
                    out.push_expr(expr);
                }
                '/' if self.s.looking_at("/*") => {
                    self.s.loud_comment();
                }
                '"' | '\'' => {
                    let start = self.s.mark();
                    self.skip_quoted_raw(c);
                    out.push_str(&self.s.slice_from(start));
                }
                _ => {
                    match c {
                        '(' | '[' => depth += 1,
                        ')' | ']' => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    out.push_char(c);
                    self.s.bump();
                }
            }
        }
        Ok(out)
    }

    /// Parse `#{ expr }` starting at the `#`.
    fn parse_interpolation_expr(&mut self) -> ParseResult<Expr> {
        self.s.bump();
        self.s.bump();
        self.s.skip_trivia();
        let expr = self.parse_expression()?;
        self.s.skip_trivia();
        self.expect('}')?;
        Ok(expr)
    }

    fn parse_at_rule(&mut self) -> ParseResult<Stmt> {
        let span = self.s.span();
        self.s.bump();
        let name = self.parse_ident_text()?;
        match name.as_str() {
            "import" => self.parse_import(span),
            "each" => self.parse_each(span),
            "if" => self.parse_if(span),
            "else" => Err(self.error_at(span, "Invalid CSS: @else must come after @if")),
            "debug" | "warn" | "error" => {
                let kind = match name.as_str() {
                    "debug" => MessageKind::Debug,
                    "warn" => MessageKind::Warn,
                    _ => MessageKind::Error,
                };
                self.s.skip_trivia();
                let value = self.parse_expression()?;
                self.expect_statement_end()?;
                Ok(Stmt::Message { kind, value, span })
            }
            other if UNSUPPORTED_DIRECTIVES.contains(&other) => Err(self.error_at(
                span,
                format!("@{} is not supported by this compiler.", other),
            )),
            _ => {
                let prelude = self.parse_interpolated_until(&['{', ';', '}'])?.trimmed();
                let body = if self.s.eat('{') {
                    Some(self.parse_statements(false)?)
                } else {
                    self.expect_statement_end()?;
                    None
                };
                Ok(Stmt::AtRule {
                    name,
                    prelude,
                    body,
                    span,
                })
            }
        }
    }

    fn parse_import(&mut self, span: Span) -> ParseResult<Stmt> {
        let mut urls = Vec::new();
        loop {
            self.s.skip_trivia();
            let item_span = self.s.span();
            match self.s.peek() {
                Some('"' | '\'') => {
                    let quote_start = self.s.mark();
                    let url = self.parse_quoted_plain()?;
                    let quoted = self.s.slice_from(quote_start);
                    let media = self.parse_interpolated_until(&[',', ';', '}'])?;
                    let media = media.as_plain().unwrap_or_default().trim().to_string();
                    if media.is_empty() && !PLAIN_CSS_IMPORT.is_match(&url) {
                        urls.push(ImportUrl::Sass {
                            url,
                            span: item_span,
                        });
                    } else if media.is_empty() {
                        urls.push(ImportUrl::Css(quoted));
                    } else {
                        urls.push(ImportUrl::Css(format!("{} {}", quoted, media)));
                    }
                }
                _ if self.s.looking_at_ignore_case("url(") => {
                    let start = self.s.mark();
                    self.parse_interpolated_until(&[',', ';', '}'])?;
                    urls.push(ImportUrl::Css(self.s.slice_from(start).trim().to_string()));
                }
                _ => return Err(self.invalid_css("expected a string or url() after @import")),
            }
            self.s.skip_trivia();
            if !self.s.eat(',') {
                break;
            }
        }
        self.expect_statement_end()?;
        Ok(Stmt::Import { urls, span })
    }

    /// A quoted string without interpolation, returned without its quotes.
    fn parse_quoted_plain(&mut self) -> ParseResult<String> {
        let quote = self.s.bump().unwrap_or('"');
        let mut text = String::new();
        loop {
            match self.s.bump() {
                None | Some('\n') => return Err(self.invalid_css("expected end of string")),
                Some(c) if c == quote => break,
                Some('\\') => {
                    if let Some(next) = self.s.bump() {
                        text.push(next);
                    }
                }
                Some(c) => text.push(c),
            }
        }
        Ok(text)
    }

    fn parse_each(&mut self, span: Span) -> ParseResult<Stmt> {
        let mut vars = Vec::new();
        loop {
            self.s.skip_trivia();
            self.expect('$')?;
            vars.push(self.parse_name()?);
            self.s.skip_trivia();
            if !self.s.eat(',') {
                break;
            }
        }
        self.s.skip_trivia();
        if !self.s.eat_keyword("in") {
            return Err(self.invalid_css("expected \"in\""));
        }
        self.s.skip_trivia();
        let list = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Stmt::Each {
            vars,
            list,
            body,
            span,
        })
    }

    fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.s.skip_trivia();
        self.expect('{')?;
        self.parse_statements(false)
    }

    fn parse_if(&mut self, span: Span) -> ParseResult<Stmt> {
        self.s.skip_trivia();
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        let mut clauses = vec![(condition, body)];
        let mut otherwise = None;
        loop {
            let mark = self.s.mark();
            self.skip_statement_trivia();
            if !self.s.eat_keyword("@else") {
                self.s.reset(mark);
                break;
            }
            self.s.skip_trivia();
            if self.s.eat_keyword("if") {
                self.s.skip_trivia();
                let condition = self.parse_expression()?;
                let body = self.parse_block()?;
                clauses.push((condition, body));
            } else {
                otherwise = Some(self.parse_block()?);
                break;
            }
        }
        Ok(Stmt::If {
            clauses,
            otherwise,
            span,
        })
    }

    /// A variable or parameter name (after `$`). A `-` is only part of the
    /// name when another name character follows it.
    fn parse_name(&mut self) -> ParseResult<String> {
        let mut name = String::new();
        while let Some(c) = self.s.peek() {
            if c == '-' {
                if !self.s.peek_at(1).is_some_and(is_name_char) {
                    break;
                }
            } else if !is_name_char(c) {
                break;
            }
            name.push(c);
            self.s.bump();
        }
        if name.is_empty() {
            return Err(self.invalid_css("expected identifier"));
        }
        Ok(name)
    }

    /// An identifier, possibly with a vendor prefix or escapes.
    fn parse_ident_text(&mut self) -> ParseResult<String> {
        let mut text = String::new();
        while self.s.peek() == Some('-') && text.len() < 2 {
            text.push('-');
            self.s.bump();
        }
        loop {
            match self.s.peek() {
                Some('\\') => {
                    text.push('\\');
                    self.s.bump();
                    if let Some(c) = self.s.bump() {
                        text.push(c);
                    }
                }
                Some('-') if !self.s.peek_at(1).is_some_and(is_name_char) => break,
                Some(c) if is_name_char(c) => {
                    text.push(c);
                    self.s.bump();
                }
                _ => break,
            }
        }
        if text.is_empty() || text == "-" {
            return Err(self.invalid_css("expected identifier"));
        }
        Ok(text)
    }

    /// A full expression: a comma-separated list of space-separated lists.
    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        let first = self.parse_space_list()?;
        self.s.skip_trivia();
        if self.s.peek() != Some(',') {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.s.eat(',') {
            self.s.skip_trivia();
            if self.at_list_end() {
                break;
            }
            items.push(self.parse_space_list()?);
            self.s.skip_trivia();
        }
        Ok(Expr::List {
            items,
            separator: ListSeparator::Comma,
            bracketed: false,
        })
    }

    fn at_list_end(&self) -> bool {
        match self.s.peek() {
            None => true,
            Some(')' | ']' | ';' | '}' | '{' | '!' | ':' | ',') => !self.s.looking_at("!="),
            Some('.') => self.s.looking_at("..."),
            _ => false,
        }
    }

    fn parse_space_list(&mut self) -> ParseResult<Expr> {
        let first = self.parse_or()?;
        let mut items = vec![first];
        loop {
            self.s.skip_trivia();
            if self.at_list_end() {
                break;
            }
            items.push(self.parse_or()?);
        }
        if items.len() == 1 {
            return Ok(items.remove(0));
        }
        Ok(Expr::List {
            items,
            separator: ListSeparator::Space,
            bracketed: false,
        })
    }

    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, span: Span) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        }
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_and()?;
        loop {
            let mark = self.s.mark();
            self.s.skip_trivia();
            let span = self.s.span();
            if self.s.eat_keyword("or") {
                self.s.skip_trivia();
                let rhs = self.parse_and()?;
                lhs = Self::binary(BinaryOp::Or, lhs, rhs, span);
            } else {
                self.s.reset(mark);
                return Ok(lhs);
            }
        }
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_equality()?;
        loop {
            let mark = self.s.mark();
            self.s.skip_trivia();
            let span = self.s.span();
            if self.s.eat_keyword("and") {
                self.s.skip_trivia();
                let rhs = self.parse_equality()?;
                lhs = Self::binary(BinaryOp::And, lhs, rhs, span);
            } else {
                self.s.reset(mark);
                return Ok(lhs);
            }
        }
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let mark = self.s.mark();
            self.s.skip_trivia();
            let span = self.s.span();
            let op = if self.s.eat_str("==") {
                BinaryOp::Eq
            } else if self.s.eat_str("!=") {
                BinaryOp::Ne
            } else {
                self.s.reset(mark);
                return Ok(lhs);
            };
            self.s.skip_trivia();
            let rhs = self.parse_relational()?;
            lhs = Self::binary(op, lhs, rhs, span);
        }
    }

    fn parse_relational(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let mark = self.s.mark();
            self.s.skip_trivia();
            let span = self.s.span();
            let op = if self.s.eat_str("<=") {
                BinaryOp::Le
            } else if self.s.eat_str(">=") {
                BinaryOp::Ge
            } else if self.s.eat('<') {
                BinaryOp::Lt
            } else if self.s.eat('>') {
                BinaryOp::Gt
            } else {
                self.s.reset(mark);
                return Ok(lhs);
            };
            self.s.skip_trivia();
            let rhs = self.parse_additive()?;
            lhs = Self::binary(op, lhs, rhs, span);
        }
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let mark = self.s.mark();
            let ws_before = self.s.skip_trivia();
            let span = self.s.span();
            let op = match self.s.peek() {
                Some('+') => BinaryOp::Add,
                Some('-') => BinaryOp::Sub,
                _ => {
                    self.s.reset(mark);
                    return Ok(lhs);
                }
            };
            let ws_after = self.s.peek_at(1).is_some_and(char::is_whitespace);
            // `a -b` starts a new list item rather than subtracting
            if ws_before && !ws_after {
                self.s.reset(mark);
                return Ok(lhs);
            }
            self.s.bump();
            self.s.skip_trivia();
            let rhs = self.parse_multiplicative()?;
            lhs = Self::binary(op, lhs, rhs, span);
        }
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let mark = self.s.mark();
            let ws_before = self.s.skip_trivia();
            let span = self.s.span();
            let op = match self.s.peek() {
                Some('*') => BinaryOp::Mul,
                Some('/') if !self.s.looking_at("//") && !self.s.looking_at("/*") => {
                    BinaryOp::Div
                }
                Some('%') if ws_before => BinaryOp::Rem,
                _ => {
                    self.s.reset(mark);
                    return Ok(lhs);
                }
            };
            self.s.bump();
            self.s.skip_trivia();
            let rhs = self.parse_unary()?;
            lhs = if op == BinaryOp::Div
                && self.paren_depth == 0
                && is_slash_operand(&lhs)
                && is_slash_operand(&rhs)
            {
                Expr::Slash(Box::new(lhs), Box::new(rhs))
            } else {
                Self::binary(op, lhs, rhs, span)
            };
        }
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let span = self.s.span();
        if self.s.eat_keyword("not") {
            self.s.skip_trivia();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                span,
            });
        }
        match self.s.peek() {
            Some(sign @ ('-' | '+')) => {
                let next = self.s.peek_at(1);
                let starts_number = next.is_some_and(|c| c.is_ascii_digit())
                    || (next == Some('.') && self.s.peek_at(2).is_some_and(|c| c.is_ascii_digit()));
                if starts_number {
                    return self.parse_number();
                }
                if sign == '-' && next.is_some_and(|c| is_name_start(c) || c == '-' || c == '\\') {
                    return self.parse_primary();
                }
                self.s.bump();
                let operand = self.parse_unary()?;
                let op = if sign == '-' {
                    UnaryOp::Neg
                } else {
                    UnaryOp::Plus
                };
                Ok(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                    span,
                })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let span = self.s.span();
        match self.s.peek() {
            None => Err(self.invalid_css("expected expression (e.g. 1px, bold)")),
            Some('(') => self.parse_paren(),
            Some('[') => self.parse_bracketed_list(),
            Some(q @ ('"' | '\'')) => self.parse_quoted_string(q),
            Some('#') if self.s.peek_at(1) == Some('{') => {
                let mut parts = Interpolation::default();
                self.continue_interpolated_ident(&mut parts)?;
                Ok(Expr::String {
                    parts,
                    quoted: false,
                })
            }
            Some('#') => self.parse_hex_color(),
            Some('$') => {
                self.s.bump();
                let name = self.parse_name()?;
                Ok(Expr::Variable { name, span })
            }
            Some(c) if c.is_ascii_digit() => self.parse_number(),
            Some('.') if self.s.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.parse_number()
            }
            Some(c) if is_name_start(c) || c == '-' || c == '\\' => self.parse_identifier_like(),
            Some(_) => Err(self.invalid_css("expected expression (e.g. 1px, bold)")),
        }
    }

    fn parse_number(&mut self) -> ParseResult<Expr> {
        let start = self.s.mark();
        if matches!(self.s.peek(), Some('-' | '+')) {
            self.s.bump();
        }
        while self.s.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.s.bump();
        }
        if self.s.peek() == Some('.') && self.s.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.s.bump();
            while self.s.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.s.bump();
            }
        }
        if matches!(self.s.peek(), Some('e' | 'E')) {
            // `1em` is a unit; only `e` followed by digits is an exponent
            let digits_at = if matches!(self.s.peek_at(1), Some('-' | '+')) { 2 } else { 1 };
            if self.s.peek_at(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digits_at {
                    self.s.bump();
                }
                while self.s.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.s.bump();
                }
            }
        }
        let text = self.s.slice_from(start);
        let value = text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid_css("expected number"))?;
        let mut unit = String::new();
        if self.s.eat('%') {
            unit.push('%');
        } else {
            while let Some(c) = self.s.peek().filter(|c| c.is_ascii_alphabetic()) {
                unit.push(c);
                self.s.bump();
            }
        }
        Ok(Expr::Number { value, unit })
    }

    fn parse_hex_color(&mut self) -> ParseResult<Expr> {
        let start = self.s.mark();
        self.s.bump();
        let mut hex = String::new();
        while let Some(c) = self.s.peek().filter(char::is_ascii_hexdigit) {
            hex.push(c);
            self.s.bump();
        }
        if self.s.peek().is_some_and(is_name_char) {
            // `#abcxyz` is not a color; keep it as an unquoted string
            while self.s.peek().is_some_and(is_name_char) {
                self.s.bump();
            }
            return Ok(Expr::String {
                parts: Interpolation::plain(self.s.slice_from(start)),
                quoted: false,
            });
        }
        let rgba = parse_hex(&hex).ok_or_else(|| self.invalid_css("expected a color"))?;
        Ok(Expr::Color {
            rgba,
            repr: self.s.slice_from(start),
        })
    }

    fn parse_identifier_like(&mut self) -> ParseResult<Expr> {
        let span = self.s.span();
        let name = self.parse_ident_text()?;
        if self.s.looking_at("#{") {
            let mut parts = Interpolation::plain(name);
            self.continue_interpolated_ident(&mut parts)?;
            return Ok(Expr::String {
                parts,
                quoted: false,
            });
        }
        if self.s.peek() == Some('(') {
            let lower = name.to_ascii_lowercase();
            if RAW_FUNCTIONS.contains(&lower.as_str()) {
                return self.parse_raw_function(name);
            }
            let args = self.parse_call_args()?;
            return Ok(Expr::Call { name, args, span });
        }
        Ok(match name.as_str() {
            "true" => Expr::Bool(true),
            "false" => Expr::Bool(false),
            "null" => Expr::Null,
            _ => match colors::lookup(&name.to_ascii_lowercase()) {
                Some(rgba) => Expr::Color { rgba, repr: name },
                None => Expr::String {
                    parts: Interpolation::plain(name),
                    quoted: false,
                },
            },
        })
    }

    /// Extend an unquoted string with interpolations and name characters.
    fn continue_interpolated_ident(&mut self, parts: &mut Interpolation) -> ParseResult<()> {
        loop {
            match self.s.peek() {
                Some('#') if self.s.peek_at(1) == Some('{') => {
                    let expr = self.parse_interpolation_expr()?;
                    parts.push_expr(expr);
                }
                Some(c) if is_name_char(c) => {
                    parts.push_char(c);
                    self.s.bump();
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_raw_function(&mut self, name: String) -> ParseResult<Expr> {
        let mut parts = Interpolation::plain(name);
        let mut depth = 0usize;
        loop {
            let Some(c) = self.s.peek() else {
                return Err(self.invalid_css("expected \")\""));
            };
            match c {
                '#' if self.s.peek_at(1) == Some('{') => {
                    let expr = self.parse_interpolation_expr()?;
                    parts.push_expr(expr);
                    continue;
                }
                '"' | '\'' => {
                    let start = self.s.mark();
                    self.skip_quoted_raw(c);
                    parts.push_str(&self.s.slice_from(start));
                    continue;
                }
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            parts.push_char(c);
            self.s.bump();
            if depth == 0 {
                break;
            }
        }
        Ok(Expr::String {
            parts,
            quoted: false,
        })
    }

    fn parse_call_args(&mut self) -> ParseResult<CallArgs> {
        self.expect('(')?;
        let mut args = CallArgs::default();
        loop {
            self.s.skip_trivia();
            if self.s.eat(')') {
                break;
            }
            if let Some(name) = self.try_keyword_name() {
                self.s.skip_trivia();
                let value = self.parse_space_list()?;
                args.named.push((name, value));
            } else {
                let value = self.parse_space_list()?;
                self.s.skip_trivia();
                if self.s.eat_str("...") {
                    args.rest = Some(Box::new(value));
                } else if !args.named.is_empty() {
                    return Err(self.error_at(
                        self.s.span(),
                        "Positional arguments must come before keyword arguments.",
                    ));
                } else {
                    args.positional.push(value);
                }
            }
            self.s.skip_trivia();
            if self.s.eat(',') {
                continue;
            }
            self.expect(')')?;
            break;
        }
        Ok(args)
    }

    /// Consume `$name:` when it introduces a keyword argument.
    fn try_keyword_name(&mut self) -> Option<String> {
        if self.s.peek() != Some('$') {
            return None;
        }
        let mark = self.s.mark();
        self.s.bump();
        if let Ok(name) = self.parse_name() {
            self.s.skip_trivia();
            if self.s.peek() == Some(':') && self.s.peek_at(1) != Some(':') {
                self.s.bump();
                return Some(name);
            }
        }
        self.s.reset(mark);
        None
    }

    fn parse_quoted_string(&mut self, quote: char) -> ParseResult<Expr> {
        self.s.bump();
        let mut parts = Interpolation::default();
        loop {
            match self.s.peek() {
                None | Some('\n') => return Err(self.invalid_css("expected end of string")),
                Some(c) if c == quote => {
                    self.s.bump();
                    break;
                }
                Some('\\') => {
                    self.s.bump();
                    match self.s.bump() {
                        Some('\n') | None => {}
                        Some(c) if c == quote || c == '\\' => parts.push_char(c),
                        Some(c) => {
                            parts.push_char('\\');
                            parts.push_char(c);
                        }
                    }
                }
                Some('#') if self.s.peek_at(1) == Some('{') => {
                    let expr = self.parse_interpolation_expr()?;
                    parts.push_expr(expr);
                }
                Some(c) => {
                    parts.push_char(c);
                    self.s.bump();
                }
            }
        }
        if parts.parts.is_empty() {
            parts = Interpolation::plain("");
        }
        Ok(Expr::String {
            parts,
            quoted: true,
        })
    }

    fn parse_paren(&mut self) -> ParseResult<Expr> {
        self.s.bump();
        self.paren_depth += 1;
        let result = self.parse_paren_body();
        self.paren_depth -= 1;
        result
    }

    fn parse_paren_body(&mut self) -> ParseResult<Expr> {
        let span = self.s.span();
        self.s.skip_trivia();
        if self.s.eat(')') {
            return Ok(Expr::List {
                items: Vec::new(),
                separator: ListSeparator::Space,
                bracketed: false,
            });
        }
        let first = self.parse_space_list()?;
        self.s.skip_trivia();
        if self.s.eat(':') {
            self.s.skip_trivia();
            let value = self.parse_space_list()?;
            let mut entries = vec![(first, value)];
            loop {
                self.s.skip_trivia();
                if !self.s.eat(',') {
                    break;
                }
                self.s.skip_trivia();
                if self.s.peek() == Some(')') {
                    break;
                }
                let key = self.parse_space_list()?;
                self.s.skip_trivia();
                self.expect(':')?;
                self.s.skip_trivia();
                let value = self.parse_space_list()?;
                entries.push((key, value));
            }
            self.s.skip_trivia();
            self.expect(')')?;
            return Ok(Expr::Map { entries, span });
        }
        if self.s.peek() == Some(',') {
            let mut items = vec![first];
            while self.s.eat(',') {
                self.s.skip_trivia();
                if self.s.peek() == Some(')') {
                    break;
                }
                items.push(self.parse_space_list()?);
                self.s.skip_trivia();
            }
            self.expect(')')?;
            return Ok(Expr::List {
                items,
                separator: ListSeparator::Comma,
                bracketed: false,
            });
        }
        self.expect(')')?;
        Ok(Expr::Paren(Box::new(first)))
    }

    fn parse_bracketed_list(&mut self) -> ParseResult<Expr> {
        self.s.bump();
        self.s.skip_trivia();
        if self.s.eat(']') {
            return Ok(Expr::List {
                items: Vec::new(),
                separator: ListSeparator::Space,
                bracketed: true,
            });
        }
        let inner = self.parse_expression()?;
        self.s.skip_trivia();
        self.expect(']')?;
        Ok(match inner {
            Expr::List {
                items, separator, ..
            } => Expr::List {
                items,
                separator,
                bracketed: true,
            },
            single => Expr::List {
                items: vec![single],
                separator: ListSeparator::Space,
                bracketed: true,
            },
        })
    }
}

fn is_slash_operand(expr: &Expr) -> bool {
    matches!(expr, Expr::Number { .. } | Expr::Slash(..))
}

/// Decode 3, 4, 6 or 8 hex digits into `[r, g, b, a]`.
fn parse_hex(hex: &str) -> Option<[f64; 4]> {
    let digit = |i: usize| -> Option<f64> {
        let c = hex.chars().nth(i)?;
        c.to_digit(16).map(f64::from)
    };
    match hex.len() {
        3 | 4 => {
            let r = digit(0)? * 17.0;
            let g = digit(1)? * 17.0;
            let b = digit(2)? * 17.0;
            let a = if hex.len() == 4 {
                digit(3)? * 17.0 / 255.0
            } else {
                1.0
            };
            Some([r, g, b, a])
        }
        6 | 8 => {
            let byte = |i: usize| -> Option<f64> { Some(digit(i)? * 16.0 + digit(i + 1)?) };
            let a = if hex.len() == 8 {
                byte(6)? / 255.0
            } else {
                1.0
            };
            Some([byte(0)?, byte(2)?, byte(4)?, a])
        }
        _ => None,
    }
}
