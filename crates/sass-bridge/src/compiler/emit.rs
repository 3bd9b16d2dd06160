/*
 * emit.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! CSS emission for the four output styles.
//!
//! The emitter writes with `\n` line endings, tracks the generated position
//! of every selector and declaration for source maps, and swaps in the
//! configured linefeed at the very end.

use super::Settings;
use super::css::{CssAtRule, CssChild, CssNode, CssRule};
use super::eval::SourceFile;
use crate::options::OutputStyle;

/// One generated-to-source position pair. All fields are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub generated_line: usize,
    pub generated_column: usize,
    pub source: usize,
    pub source_line: usize,
    pub source_column: usize,
}

/// Output buffer that tracks the current line and column.
#[derive(Default)]
struct Writer {
    buf: String,
    line: usize,
    column: usize,
    mappings: Vec<Mapping>,
}

impl Writer {
    fn push(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += c.len_utf16();
            }
        }
        self.buf.push_str(text);
    }

    fn mark(&mut self, pos: super::css::SourcePos) {
        self.mappings.push(Mapping {
            generated_line: self.line,
            generated_column: self.column,
            source: pos.source,
            source_line: pos.line.saturating_sub(1),
            source_column: pos.column.saturating_sub(1),
        });
    }
}

struct Emitter<'a> {
    w: Writer,
    settings: &'a Settings,
    sources: &'a [SourceFile],
}

/// Serialize `nodes` in the configured style.
pub fn emit(
    nodes: &[CssNode],
    settings: &Settings,
    sources: &[SourceFile],
) -> (String, Vec<Mapping>) {
    let mut emitter = Emitter {
        w: Writer::default(),
        settings,
        sources,
    };
    emitter.list(nodes, 0, true);
    let mut css = emitter.w.buf;
    if !css.is_empty() {
        css.push('\n');
    }
    if settings.linefeed != "\n" {
        css = css.replace('\n', settings.linefeed);
    }
    (css, emitter.w.mappings)
}

impl Emitter<'_> {
    fn compressed(&self) -> bool {
        self.settings.style == OutputStyle::Compressed
    }

    fn indent(&self, level: usize) -> String {
        self.settings.indent.repeat(level)
    }

    fn keeps_comment(&self, text: &str) -> bool {
        !self.compressed() || text.starts_with("/*!")
    }

    fn printable<'n>(&self, nodes: &'n [CssNode]) -> Vec<&'n CssNode> {
        nodes
            .iter()
            .filter(|n| n.is_visible())
            .filter(|n| match n {
                CssNode::Comment { text, .. } => self.keeps_comment(text),
                _ => true,
            })
            .collect()
    }

    /// Indentation level of a node: nested style follows the source nesting,
    /// the other styles only the enclosing at-rule blocks.
    fn level(&self, node_depth: usize, block_level: usize) -> usize {
        match self.settings.style {
            OutputStyle::Nested => node_depth,
            _ => block_level,
        }
    }

    fn list(&mut self, nodes: &[CssNode], block_level: usize, top: bool) {
        let printable = self.printable(nodes);
        for (i, node) in printable.iter().enumerate() {
            if i > 0 && !self.compressed() {
                let prev = printable[i - 1];
                let blank = top && prev.is_block() && (node.depth() == 0 || !self.is_nested());
                self.w.push(if blank { "\n\n" } else { "\n" });
            }
            self.node(node, block_level);
        }
    }

    fn is_nested(&self) -> bool {
        self.settings.style == OutputStyle::Nested
    }

    fn node(&mut self, node: &CssNode, block_level: usize) {
        match node {
            CssNode::Rule(rule) => self.rule(rule, block_level),
            CssNode::Comment { text, depth } => {
                let level = self.level(*depth, block_level);
                self.push_indent(level);
                self.w.push(text);
            }
            CssNode::Directive { text, depth, pos } => {
                let level = self.level(*depth, block_level);
                self.push_indent(level);
                self.w.mark(*pos);
                self.w.push(text);
            }
            CssNode::AtRule(at) => self.at_rule(at, block_level),
        }
    }

    fn push_indent(&mut self, level: usize) {
        if !self.compressed() {
            let indent = self.indent(level);
            self.w.push(&indent);
        }
    }

    fn source_comment(&mut self, rule: &CssRule, level: usize) {
        if !self.settings.source_comments || self.compressed() {
            return;
        }
        let path = self
            .sources
            .get(rule.pos.source)
            .map_or("stdin", |s| s.path.as_str());
        let comment = format!("/* line {}, {} */\n", rule.pos.line, path);
        self.push_indent(level);
        self.w.push(&comment);
    }

    fn declaration(&mut self, child: &CssChild, level: usize) {
        match child {
            CssChild::Declaration { name, value, pos } => {
                self.push_indent(level);
                self.w.mark(*pos);
                if self.compressed() {
                    self.w.push(&format!("{}:{}", name, value));
                } else {
                    self.w.push(&format!("{}: {};", name, value));
                }
            }
            CssChild::Comment(text) => {
                self.push_indent(level);
                self.w.push(text);
            }
        }
    }

    /// Children of a block, each preceded by the separator for the style.
    fn children(&mut self, children: &[CssChild], level: usize) {
        let kept: Vec<&CssChild> = children
            .iter()
            .filter(|c| match c {
                CssChild::Comment(text) => self.keeps_comment(text),
                CssChild::Declaration { .. } => true,
            })
            .collect();
        for (i, child) in kept.iter().enumerate() {
            match self.settings.style {
                OutputStyle::Nested | OutputStyle::Expanded => {
                    self.w.push("\n");
                    self.declaration(child, level);
                }
                OutputStyle::Compact => {
                    self.w.push(" ");
                    self.declaration(child, 0);
                }
                OutputStyle::Compressed => {
                    if i > 0 && matches!(kept[i - 1], CssChild::Declaration { .. }) {
                        self.w.push(";");
                    }
                    self.declaration(child, 0);
                }
            }
        }
    }

    fn rule(&mut self, rule: &CssRule, block_level: usize) {
        let level = self.level(rule.depth, block_level);
        self.source_comment(rule, level);
        self.push_indent(level);
        self.w.mark(rule.pos);
        match self.settings.style {
            OutputStyle::Nested => {
                self.w.push(&rule.selectors.join(", "));
                self.w.push(" {");
                self.children(&rule.children, level + 1);
                self.w.push(" }");
            }
            OutputStyle::Expanded => {
                let separator = format!(",\n{}", self.indent(level));
                self.w.push(&rule.selectors.join(&separator));
                self.w.push(" {");
                self.children(&rule.children, level + 1);
                self.w.push("\n");
                self.push_indent(level);
                self.w.push("}");
            }
            OutputStyle::Compact => {
                self.w.push(&rule.selectors.join(", "));
                self.w.push(" {");
                self.children(&rule.children, 0);
                self.w.push(" }");
            }
            OutputStyle::Compressed => {
                self.w.push(&rule.selectors.join(","));
                self.w.push("{");
                self.children(&rule.children, 0);
                self.w.push("}");
            }
        }
    }

    fn at_rule(&mut self, at: &CssAtRule, block_level: usize) {
        let level = self.level(at.depth, block_level);
        self.push_indent(level);
        self.w.mark(at.pos);
        let head = if at.prelude.is_empty() {
            format!("@{}", at.name)
        } else {
            format!("@{} {}", at.name, at.prelude)
        };
        self.w.push(&head);
        let Some(block) = &at.block else {
            self.w.push(";");
            return;
        };
        if self.compressed() {
            self.w.push("{");
            self.children(&block.declarations, 0);
            let has_decls = !block.declarations.is_empty();
            for (i, node) in self.printable(&block.nodes).into_iter().enumerate() {
                if i == 0 && has_decls {
                    self.w.push(";");
                }
                self.node(node, block_level + 1);
            }
            self.w.push("}");
            return;
        }
        self.w.push(" {");
        let child_level = match self.settings.style {
            OutputStyle::Compact => 0,
            _ => level + 1,
        };
        self.children(&block.declarations, child_level);
        let nested = self.printable(&block.nodes);
        for node in nested {
            self.w.push("\n");
            self.node(node, block_level + 1);
        }
        match self.settings.style {
            OutputStyle::Expanded => {
                self.w.push("\n");
                self.push_indent(level);
                self.w.push("}");
            }
            _ => self.w.push(" }"),
        }
    }
}
