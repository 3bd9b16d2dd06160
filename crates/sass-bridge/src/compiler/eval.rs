/*
 * eval.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Stylesheet evaluator.
//!
//! Walks the parsed statements, resolves variables and function calls,
//! follows `@import`s depth-first through the [`Host`], and produces the
//! flattened CSS tree.

use std::collections::HashMap;

use sass_bridge_values::ListSeparator;

use super::ast::{
    BinaryOp, CallArgs, DeclValue, Expr, ImportUrl, InterpPart, Interpolation, MessageKind,
    Param, Signature, Span, Stmt,
};
use super::builtins::{self, Args};
use super::css::{CssAtRule, CssBlock, CssChild, CssNode, CssRule, SourcePos};
use super::ops;
use super::parser;
use super::value::{Format, SassColor, SassValue};
use super::{Host, ImportFailure};
use crate::error::{CompileError, RenderError};

type EvalResult<T> = Result<T, RenderError>;

/// Functions implemented by the evaluator itself rather than in `builtins`.
const SPECIAL_FUNCTIONS: &[&str] = &[
    "if",
    "call",
    "get-function",
    "function-exists",
    "variable-exists",
    "global-variable-exists",
];

/// A file that contributed to the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub contents: String,
}

/// A variable scope.
#[derive(Debug, Default)]
struct Scope {
    vars: HashMap<String, SassValue>,
    /// Flow-control scopes at the top level assign to existing globals.
    semi_global: bool,
}

pub struct Evaluator<'h> {
    host: &'h mut dyn Host,
    fmt: Format,
    scopes: Vec<Scope>,
    /// Resolved selectors of the enclosing rules, innermost last
    selectors: Vec<Vec<String>>,
    /// Enclosing at-rules with blocks
    at_rules: usize,
    /// Output nesting level
    depth: usize,
    sources: Vec<SourceFile>,
    /// Indices into `sources` of the files being evaluated, innermost last
    file_stack: Vec<usize>,
}

impl<'h> Evaluator<'h> {
    pub fn new(host: &'h mut dyn Host, fmt: Format, path: &str, contents: &str) -> Self {
        Evaluator {
            host,
            fmt,
            scopes: vec![Scope::default()],
            selectors: Vec::new(),
            at_rules: 0,
            depth: 0,
            sources: vec![SourceFile {
                path: path.to_string(),
                contents: contents.to_string(),
            }],
            file_stack: vec![0],
        }
    }

    /// Evaluate the entry stylesheet.
    pub fn run(mut self, stmts: &[Stmt]) -> EvalResult<(Vec<CssNode>, Vec<SourceFile>)> {
        let mut nodes = Vec::new();
        let mut stray = Vec::new();
        self.eval_block(stmts, &mut nodes, &mut stray)?;
        Ok((nodes, self.sources))
    }

    fn current_source(&self) -> usize {
        self.file_stack.last().copied().unwrap_or(0)
    }

    fn current_path(&self) -> &str {
        &self.sources[self.current_source()].path
    }

    fn pos(&self, span: Span) -> SourcePos {
        SourcePos {
            source: self.current_source(),
            line: span.line,
            column: span.column,
        }
    }

    fn error(&self, span: Span, message: impl Into<String>) -> RenderError {
        CompileError::new(message, self.current_path(), span.line, span.column).into()
    }

    /// Declarations are allowed inside rules and at-rule blocks.
    fn in_style_context(&self) -> bool {
        !self.selectors.is_empty() || self.at_rules > 0
    }

    fn lookup(&self, name: &str) -> Option<&SassValue> {
        let name = name.replace('_', "-");
        self.scopes.iter().rev().find_map(|s| s.vars.get(&name))
    }

    fn in_semi_global(&self) -> bool {
        self.scopes.iter().skip(1).all(|s| s.semi_global)
    }

    fn set_variable(&mut self, name: &str, value: SassValue, default: bool, global: bool) {
        let name = name.replace('_', "-");
        let last = self.scopes.len() - 1;
        let index = if global || last == 0 {
            0
        } else {
            match self.scopes.iter().rposition(|s| s.vars.contains_key(&name)) {
                Some(0) if !self.in_semi_global() => last,
                Some(i) => i,
                None => last,
            }
        };
        let scope = &mut self.scopes[index];
        if default && scope.vars.get(&name).is_some_and(|v| !matches!(v, SassValue::Null)) {
            return;
        }
        scope.vars.insert(name, value);
    }

    /// Bind `name` in the innermost scope.
    fn declare_local(&mut self, name: &str, value: SassValue) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.vars.insert(name.replace('_', "-"), value);
        }
    }

    fn push_scope(&mut self, flow_control: bool) {
        let semi_global = flow_control && self.in_semi_global();
        self.scopes.push(Scope {
            vars: HashMap::new(),
            semi_global,
        });
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Evaluate `stmts`, appending nodes to `out` and declarations to `decls`.
    fn eval_block(
        &mut self,
        stmts: &[Stmt],
        out: &mut Vec<CssNode>,
        decls: &mut Vec<CssChild>,
    ) -> EvalResult<()> {
        for stmt in stmts {
            self.eval_stmt(stmt, out, decls)?;
        }
        Ok(())
    }

    fn eval_stmt(
        &mut self,
        stmt: &Stmt,
        out: &mut Vec<CssNode>,
        decls: &mut Vec<CssChild>,
    ) -> EvalResult<()> {
        match stmt {
            Stmt::Rule {
                selector,
                body,
                span,
            } => self.eval_rule(selector, body, *span, out),
            Stmt::Declaration {
                name,
                value,
                important,
                span,
            } => {
                if !self.in_style_context() {
                    return Err(self.error(
                        *span,
                        "Properties are only allowed within rules, directives, mixin includes, or other properties.",
                    ));
                }
                let name = self.eval_interpolation(name)?;
                let value = match value {
                    DeclValue::Raw(raw) => self.eval_interpolation(raw)?,
                    DeclValue::Expr(expr) => {
                        let value = self.eval_expr(expr)?;
                        if value.is_blank() {
                            return Ok(());
                        }
                        value.to_css(self.fmt).map_err(|e| self.error(*span, e))?
                    }
                };
                let value = if *important {
                    format!("{} !important", value)
                } else {
                    value
                };
                decls.push(CssChild::Declaration {
                    name,
                    value,
                    pos: self.pos(*span),
                });
                Ok(())
            }
            Stmt::Variable {
                name,
                value,
                default,
                global,
                ..
            } => {
                let value = self.eval_expr(value)?;
                self.set_variable(name, value, *default, *global);
                Ok(())
            }
            Stmt::Comment { text, .. } => {
                if self.in_style_context() {
                    decls.push(CssChild::Comment(text.clone()));
                } else {
                    out.push(CssNode::Comment {
                        text: text.clone(),
                        depth: self.depth,
                    });
                }
                Ok(())
            }
            Stmt::Import { urls, span } => {
                for url in urls {
                    match url {
                        ImportUrl::Css(text) => out.push(CssNode::Directive {
                            text: format!("@import {};", text),
                            depth: self.depth,
                            pos: self.pos(*span),
                        }),
                        ImportUrl::Sass { url, span } => self.eval_import(url, *span, out, decls)?,
                    }
                }
                Ok(())
            }
            Stmt::Each {
                vars, list, body, ..
            } => {
                let list = self.eval_expr(list)?;
                let items = list.as_items();
                for item in items {
                    self.push_scope(true);
                    if vars.len() == 1 {
                        self.declare_local(&vars[0], item);
                    } else {
                        let mut parts = item.as_items().into_iter();
                        for var in vars {
                            let value = parts.next().unwrap_or(SassValue::Null);
                            self.declare_local(var, value);
                        }
                    }
                    let result = self.eval_block(body, out, decls);
                    self.pop_scope();
                    result?;
                }
                Ok(())
            }
            Stmt::If {
                clauses, otherwise, ..
            } => {
                let mut chosen = otherwise.as_ref();
                for (condition, body) in clauses {
                    if self.eval_expr(condition)?.is_truthy() {
                        chosen = Some(body);
                        break;
                    }
                }
                if let Some(body) = chosen {
                    self.push_scope(true);
                    let result = self.eval_block(body, out, decls);
                    self.pop_scope();
                    result?;
                }
                Ok(())
            }
            Stmt::Message { kind, value, span } => {
                let text = self.eval_expr(value)?.to_interp(self.fmt);
                match kind {
                    MessageKind::Debug => {
                        let file = self.current_path();
                        tracing::info!(file = %file, line = span.line, "DEBUG: {}", text);
                    }
                    MessageKind::Warn => {
                        let file = self.current_path();
                        tracing::warn!(file = %file, line = span.line, "WARNING: {}", text);
                    }
                    MessageKind::Error => return Err(self.error(*span, text)),
                }
                Ok(())
            }
            Stmt::AtRule {
                name,
                prelude,
                body,
                span,
            } => self.eval_at_rule(name, prelude, body.as_deref(), *span, out),
        }
    }

    fn eval_rule(
        &mut self,
        selector: &Interpolation,
        body: &[Stmt],
        span: Span,
        out: &mut Vec<CssNode>,
    ) -> EvalResult<()> {
        let text = self.eval_interpolation(selector)?;
        let selectors = resolve_selectors(self.selectors.last(), &split_selectors(&text));
        if selectors.is_empty() {
            return Err(self.error(span, "Invalid CSS: expected selector"));
        }
        let depth = self.depth;
        let mut children = Vec::new();
        let mut nested = Vec::new();
        self.selectors.push(selectors.clone());
        self.depth += 1;
        self.push_scope(false);
        let result = self.eval_block(body, &mut nested, &mut children);
        self.pop_scope();
        self.depth -= 1;
        self.selectors.pop();
        result?;
        if children.is_empty() {
            outdent(&mut nested);
        }
        out.push(CssNode::Rule(CssRule {
            selectors,
            children,
            depth,
            pos: self.pos(span),
        }));
        out.append(&mut nested);
        Ok(())
    }

    fn eval_at_rule(
        &mut self,
        name: &str,
        prelude: &Interpolation,
        body: Option<&[Stmt]>,
        span: Span,
        out: &mut Vec<CssNode>,
    ) -> EvalResult<()> {
        let prelude = collapse_whitespace(&self.eval_interpolation(prelude)?);
        let Some(body) = body else {
            let text = if prelude.is_empty() {
                format!("@{};", name)
            } else {
                format!("@{} {};", name, prelude)
            };
            out.push(CssNode::Directive {
                text,
                depth: self.depth,
                pos: self.pos(span),
            });
            return Ok(());
        };
        let depth = self.depth;
        let mut block = CssBlock::default();
        let mut bubbled = Vec::new();
        self.at_rules += 1;
        self.depth += 1;
        self.push_scope(false);
        let result = if self.selectors.is_empty() {
            self.eval_block(body, &mut block.nodes, &mut block.declarations)
        } else {
            self.eval_block(body, &mut block.nodes, &mut bubbled)
        };
        self.pop_scope();
        self.depth -= 1;
        self.at_rules -= 1;
        result?;
        if !bubbled.is_empty() {
            // declarations directly inside the at-rule keep the enclosing selector
            let selectors = self.selectors.last().cloned().unwrap_or_default();
            block.nodes.insert(
                0,
                CssNode::Rule(CssRule {
                    selectors,
                    children: bubbled,
                    depth: depth + 1,
                    pos: self.pos(span),
                }),
            );
        }
        out.push(CssNode::AtRule(CssAtRule {
            name: name.to_string(),
            prelude,
            block: Some(block),
            depth,
            pos: self.pos(span),
        }));
        Ok(())
    }

    fn eval_import(
        &mut self,
        url: &str,
        span: Span,
        out: &mut Vec<CssNode>,
        decls: &mut Vec<CssChild>,
    ) -> EvalResult<()> {
        let prev = self.current_path().to_string();
        let source = match self.host.load_import(url, &prev) {
            Ok(source) => source,
            Err(ImportFailure::NotFound) => {
                return Err(self.error(
                    span,
                    format!("File to import not found or unreadable: {}.", url),
                ));
            }
            Err(ImportFailure::Message(message)) => return Err(self.error(span, message)),
            Err(ImportFailure::Abort(e)) => return Err(e),
        };
        if self
            .file_stack
            .iter()
            .any(|&i| self.sources[i].path == source.path)
        {
            return Err(self.error(
                span,
                format!(
                    "An @import loop has been found: {} imports {}",
                    prev, source.path
                ),
            ));
        }
        let stmts = parser::parse_imported(&source.contents, &source.path)?;
        let index = match self.sources.iter().position(|s| s.path == source.path) {
            Some(index) => index,
            None => {
                self.sources.push(SourceFile {
                    path: source.path,
                    contents: source.contents,
                });
                self.sources.len() - 1
            }
        };
        self.file_stack.push(index);
        let result = self.eval_block(&stmts, out, decls);
        self.file_stack.pop();
        result
    }

    fn eval_interpolation(&mut self, interp: &Interpolation) -> EvalResult<String> {
        let mut text = String::new();
        for part in &interp.parts {
            match part {
                InterpPart::Text(t) => text.push_str(t),
                InterpPart::Expr(expr) => {
                    let value = self.eval_expr(expr)?;
                    text.push_str(&value.to_interp(self.fmt));
                }
            }
        }
        Ok(text)
    }

    /// Evaluate an arithmetic operand: a slash between literals divides here.
    fn eval_operand(&mut self, expr: &Expr) -> EvalResult<SassValue> {
        match expr {
            Expr::Slash(lhs, rhs) => {
                let lhs = self.eval_operand(lhs)?;
                let rhs = self.eval_operand(rhs)?;
                ops::apply(BinaryOp::Div, &lhs, &rhs, self.fmt)
                    .map_err(|e| self.error(Span::default(), e))
            }
            other => self.eval_expr(other),
        }
    }

    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult<SassValue> {
        match expr {
            Expr::Number { value, unit } => Ok(SassValue::number(*value, unit.as_str())),
            Expr::Color { rgba, repr } => {
                let mut color = SassColor::new(rgba[0], rgba[1], rgba[2], rgba[3]);
                color.repr = Some(repr.clone());
                Ok(SassValue::Color(color))
            }
            Expr::String { parts, quoted } => Ok(SassValue::String {
                text: self.eval_interpolation(parts)?,
                quoted: *quoted,
            }),
            Expr::Bool(b) => Ok(SassValue::Bool(*b)),
            Expr::Null => Ok(SassValue::Null),
            Expr::Variable { name, span } => match self.lookup(name) {
                Some(value) => Ok(value.clone()),
                None => Err(self.error(*span, format!("Undefined variable: \"${}\".", name))),
            },
            Expr::List {
                items,
                separator,
                bracketed,
            } => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item)?);
                }
                Ok(SassValue::List {
                    items: values,
                    separator: *separator,
                    bracketed: *bracketed,
                })
            }
            Expr::Map { entries, span } => {
                let mut values: Vec<(SassValue, SassValue)> = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = self.eval_expr(key)?;
                    if values.iter().any(|(k, _)| *k == key) {
                        return Err(self.error(
                            *span,
                            format!("Duplicate key {} in map.", key.inspect(self.fmt)),
                        ));
                    }
                    let value = self.eval_expr(value)?;
                    values.push((key, value));
                }
                Ok(SassValue::Map(values))
            }
            Expr::Binary { op, lhs, rhs, span } => {
                let lhs = self.eval_operand(lhs)?;
                match op {
                    BinaryOp::And if !lhs.is_truthy() => return Ok(lhs),
                    BinaryOp::Or if lhs.is_truthy() => return Ok(lhs),
                    _ => {}
                }
                let rhs = self.eval_operand(rhs)?;
                ops::apply(*op, &lhs, &rhs, self.fmt).map_err(|e| self.error(*span, e))
            }
            Expr::Unary { op, operand, span } => {
                let value = self.eval_operand(operand)?;
                ops::apply_unary(*op, &value, self.fmt).map_err(|e| self.error(*span, e))
            }
            Expr::Call { name, args, span } => self.eval_call(name, args, *span),
            Expr::Paren(inner) => self.eval_operand(inner),
            Expr::Slash(lhs, rhs) => {
                let lhs = self.eval_expr(lhs)?;
                let rhs = self.eval_expr(rhs)?;
                match (&lhs, &rhs) {
                    (SassValue::Number { .. }, SassValue::Number { .. }) => Ok(SassValue::unquoted(
                        format!("{}/{}", lhs.to_interp(self.fmt), rhs.to_interp(self.fmt)),
                    )),
                    _ => ops::apply(BinaryOp::Div, &lhs, &rhs, self.fmt)
                        .map_err(|e| self.error(Span::default(), e)),
                }
            }
        }
    }

    fn eval_args(&mut self, args: &CallArgs) -> EvalResult<Args> {
        let mut evaluated = Args::default();
        for arg in &args.positional {
            evaluated.positional.push(self.eval_expr(arg)?);
        }
        for (name, arg) in &args.named {
            let value = self.eval_expr(arg)?;
            evaluated.named.push((name.replace('_', "-"), value));
        }
        if let Some(rest) = &args.rest {
            match self.eval_expr(rest)? {
                SassValue::Map(entries) => {
                    for (key, value) in entries {
                        evaluated.named.push((key.to_interp(self.fmt), value));
                    }
                }
                SassValue::List { items, .. } => evaluated.positional.extend(items),
                single => evaluated.positional.push(single),
            }
        }
        Ok(evaluated)
    }

    fn eval_call(&mut self, name: &str, args: &CallArgs, span: Span) -> EvalResult<SassValue> {
        let normalized = name.replace('_', "-");
        if normalized == "if" && args.rest.is_none() {
            return self.eval_lazy_if(args, span);
        }
        let evaluated = self.eval_args(args)?;
        self.call_named(name, &normalized, evaluated, span)
    }

    /// `if()` evaluates only the branch it returns.
    fn eval_lazy_if(&mut self, args: &CallArgs, span: Span) -> EvalResult<SassValue> {
        let mut slots: [Option<&Expr>; 3] = [None, None, None];
        for (slot, arg) in slots.iter_mut().zip(&args.positional) {
            *slot = Some(arg);
        }
        if args.positional.len() > 3 {
            return Err(self.error(
                span,
                format!(
                    "wrong number of arguments ({} for 3) for `if'",
                    args.positional.len()
                ),
            ));
        }
        for (name, arg) in &args.named {
            let index = match name.replace('_', "-").as_str() {
                "condition" => 0,
                "if-true" => 1,
                "if-false" => 2,
                other => {
                    return Err(
                        self.error(span, format!("Function if has no argument named ${}", other))
                    );
                }
            };
            slots[index] = Some(arg);
        }
        let [Some(condition), Some(if_true), Some(if_false)] = slots else {
            return Err(self.error(span, "Function if is missing argument."));
        };
        if self.eval_expr(condition)?.is_truthy() {
            self.eval_expr(if_true)
        } else {
            self.eval_expr(if_false)
        }
    }

    /// Dispatch a call by name: custom functions first, then the functions
    /// the evaluator implements, then built-ins, else a plain CSS function.
    fn call_named(
        &mut self,
        name: &str,
        normalized: &str,
        args: Args,
        span: Span,
    ) -> EvalResult<SassValue> {
        if let Some(signature) = self.host.lookup_function(normalized) {
            let values = self.bind_custom(&signature, normalized, args, span)?;
            tracing::trace!(function = normalized, args = values.len(), "calling custom function");
            return self.host.call_function(normalized, values);
        }
        match normalized {
            "function-exists" => {
                let target = self.string_arg(&args, "name", span)?;
                let exists = self.function_exists(&target);
                return Ok(SassValue::Bool(exists));
            }
            "variable-exists" => {
                let target = self.string_arg(&args, "name", span)?;
                return Ok(SassValue::Bool(self.lookup(&target).is_some()));
            }
            "global-variable-exists" => {
                let target = self.string_arg(&args, "name", span)?.replace('_', "-");
                return Ok(SassValue::Bool(self.scopes[0].vars.contains_key(&target)));
            }
            "get-function" => {
                let target = self.string_arg(&args, "name", span)?.replace('_', "-");
                if !self.function_exists(&target) {
                    return Err(self.error(span, format!("Function not found: {}", target)));
                }
                return Ok(SassValue::Function(target));
            }
            "call" => {
                let mut args = args;
                if args.positional.is_empty() {
                    return Err(self.error(span, "Function call is missing argument $function."));
                }
                let target = match args.positional.remove(0) {
                    SassValue::Function(target) => target,
                    SassValue::String { text, .. } => text,
                    other => {
                        return Err(self.error(
                            span,
                            format!(
                                "$function: {} is not a function reference for `call'",
                                other.inspect(self.fmt)
                            ),
                        ));
                    }
                };
                let normalized = target.replace('_', "-");
                return self.call_named(&target, &normalized, args, span);
            }
            _ => {}
        }
        if let Some(result) = builtins::call(normalized, &args, self.fmt) {
            return result.map_err(|e| self.error(span, e));
        }
        if !args.named.is_empty() {
            return Err(self.error(
                span,
                format!(
                    "Plain CSS function {} doesn't support keyword arguments.",
                    name
                ),
            ));
        }
        let rendered: Vec<String> = args
            .positional
            .iter()
            .map(|v| v.to_css(self.fmt).unwrap_or_else(|_| v.inspect(self.fmt)))
            .collect();
        Ok(SassValue::unquoted(format!(
            "{}({})",
            name,
            rendered.join(", ")
        )))
    }

    fn function_exists(&self, name: &str) -> bool {
        let name = name.replace('_', "-");
        self.host.lookup_function(&name).is_some()
            || builtins::exists(&name)
            || SPECIAL_FUNCTIONS.contains(&name.as_str())
    }

    fn string_arg(&self, args: &Args, param: &str, span: Span) -> EvalResult<String> {
        let value = args
            .positional
            .first()
            .or_else(|| {
                args.named
                    .iter()
                    .find(|(n, _)| n == param)
                    .map(|(_, v)| v)
            })
            .ok_or_else(|| self.error(span, format!("Missing argument ${}.", param)))?;
        match value {
            SassValue::String { text, .. } => Ok(text.clone()),
            other => Err(self.error(
                span,
                format!("${}: {} is not a string.", param, other.inspect(self.fmt)),
            )),
        }
    }

    /// Bind call arguments to a custom function's declared parameters.
    ///
    /// Bare-name signatures receive their arguments as passed. Declared
    /// parameters are checked for arity, filled from keywords, and
    /// defaulted; default expressions see the parameters bound before them.
    fn bind_custom(
        &mut self,
        signature: &Signature,
        name: &str,
        args: Args,
        span: Span,
    ) -> EvalResult<Vec<SassValue>> {
        let Some(params) = &signature.params else {
            let mut values = args.positional;
            values.extend(args.named.into_iter().map(|(_, v)| v));
            return Ok(values);
        };
        let mut positional = args.positional.into_iter();
        let mut bound: Vec<Option<SassValue>> =
            positional.by_ref().take(params.len()).map(Some).collect();
        bound.resize(params.len(), None);
        let extra: Vec<SassValue> = positional.collect();
        if !extra.is_empty() && signature.rest.is_none() {
            return Err(self.error(
                span,
                format!(
                    "wrong number of arguments ({} for {}) for `{}'",
                    params.len() + extra.len(),
                    params.len(),
                    name
                ),
            ));
        }
        for (arg_name, value) in args.named {
            let Some(index) = params.iter().position(|p| p.name.replace('_', "-") == arg_name)
            else {
                return Err(self.error(
                    span,
                    format!("Function {} has no argument named ${}", name, arg_name),
                ));
            };
            if bound[index].is_some() {
                return Err(self.error(
                    span,
                    format!(
                        "Function {} was passed argument ${} both by position and by name.",
                        name, arg_name
                    ),
                ));
            }
            bound[index] = Some(value);
        }

        self.push_scope(false);
        let result = self.fill_defaults(params, &mut bound, name, span);
        self.pop_scope();
        result?;

        let mut values: Vec<SassValue> =
            bound.into_iter().map(|v| v.unwrap_or(SassValue::Null)).collect();
        if signature.rest.is_some() {
            values.push(SassValue::list(extra, ListSeparator::Comma));
        }
        Ok(values)
    }

    fn fill_defaults(
        &mut self,
        params: &[Param],
        bound: &mut [Option<SassValue>],
        name: &str,
        span: Span,
    ) -> EvalResult<()> {
        for (param, slot) in params.iter().zip(bound.iter_mut()) {
            if slot.is_none() {
                let Some(default) = &param.default else {
                    return Err(self.error(
                        span,
                        format!("Function {} is missing argument ${}.", name, param.name),
                    ));
                };
                *slot = Some(self.eval_expr(default)?);
            }
            if let Some(value) = slot {
                self.declare_local(&param.name, value.clone());
            }
        }
        Ok(())
    }
}

/// Lower the output level of `nodes` and everything inside them by one.
fn outdent(nodes: &mut [CssNode]) {
    for node in nodes {
        match node {
            CssNode::Rule(rule) => rule.depth = rule.depth.saturating_sub(1),
            CssNode::Comment { depth, .. } | CssNode::Directive { depth, .. } => {
                *depth = depth.saturating_sub(1);
            }
            CssNode::AtRule(at) => {
                at.depth = at.depth.saturating_sub(1);
                if let Some(block) = &mut at.block {
                    outdent(&mut block.nodes);
                }
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a selector list on commas outside parentheses, brackets and quotes.
fn split_selectors(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in text.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            current.push(c);
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(collapse_whitespace(&current));
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(collapse_whitespace(&current));
    parts.retain(|p| !p.is_empty());
    parts
}

/// Combine child selectors with the enclosing rule's selectors.
fn resolve_selectors(parents: Option<&Vec<String>>, children: &[String]) -> Vec<String> {
    let Some(parents) = parents else {
        return children.to_vec();
    };
    let mut resolved = Vec::with_capacity(parents.len() * children.len());
    for parent in parents {
        for child in children {
            if child.contains('&') {
                resolved.push(child.replace('&', parent));
            } else {
                resolved.push(format!("{} {}", parent, child));
            }
        }
    }
    resolved
}
