/*
 * css.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Evaluated CSS tree, ready for emission.
//!
//! Nested style rules are flattened by the evaluator: a rule's nested rules
//! follow it as siblings with a greater `depth`.

/// Origin of an output node: index into the compiled source list plus
/// 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePos {
    pub source: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CssNode {
    Rule(CssRule),
    Comment {
        text: String,
        depth: usize,
    },
    /// Statement at-rule such as a plain-CSS `@import` or `@charset`.
    Directive {
        text: String,
        depth: usize,
        pos: SourcePos,
    },
    AtRule(CssAtRule),
}

impl CssNode {
    pub fn depth(&self) -> usize {
        match self {
            CssNode::Rule(rule) => rule.depth,
            CssNode::Comment { depth, .. } | CssNode::Directive { depth, .. } => *depth,
            CssNode::AtRule(at) => at.depth,
        }
    }

    /// Whether anything is printed for this node.
    pub fn is_visible(&self) -> bool {
        match self {
            CssNode::Rule(rule) => !rule.children.is_empty(),
            CssNode::AtRule(at) => match &at.block {
                None => true,
                Some(block) => {
                    !block.declarations.is_empty() || block.nodes.iter().any(CssNode::is_visible)
                }
            },
            CssNode::Comment { .. } | CssNode::Directive { .. } => true,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, CssNode::Rule(_) | CssNode::AtRule(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    pub selectors: Vec<String>,
    pub children: Vec<CssChild>,
    pub depth: usize,
    pub pos: SourcePos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CssChild {
    Declaration {
        name: String,
        value: String,
        pos: SourcePos,
    },
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CssAtRule {
    pub name: String,
    pub prelude: String,
    /// `None` for a statement at-rule without a block.
    pub block: Option<CssBlock>,
    pub depth: usize,
    pub pos: SourcePos,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CssBlock {
    pub declarations: Vec<CssChild>,
    pub nodes: Vec<CssNode>,
}
