/*
 * compiler/mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The embedded SCSS compiler.
//!
//! The compiler knows nothing about host callbacks: custom functions and
//! `@import` resolution are reached through the [`Host`] trait, which the
//! compile job implements on top of the function registry and importer
//! chain.

pub mod ast;
pub mod builtins;
pub mod colors;
pub mod css;
pub mod emit;
pub mod eval;
pub mod ops;
pub mod parser;
pub mod scanner;
pub mod sourcemap;
pub mod value;

pub use ast::Signature;
pub use emit::Mapping;
pub use eval::SourceFile;
pub use parser::parse_signature;
pub use value::{Format, SassColor, SassValue};

use crate::error::RenderError;
use crate::options::{OutputStyle, RenderConfig};

/// A file handed back by import resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSource {
    /// Path the file is known by; it becomes `prev` for its own imports.
    pub path: String,
    pub contents: String,
}

/// Why an import could not be loaded.
#[derive(Debug)]
pub enum ImportFailure {
    /// No importer and no native candidate resolved the URL.
    NotFound,
    /// Resolution failed with a message to report at the `@import`.
    Message(String),
    /// An error that ends the compile as is.
    Abort(RenderError),
}

/// Services the compiler needs from the job driving it.
pub trait Host {
    /// Signature of the custom function registered as `name`.
    fn lookup_function(&self, name: &str) -> Option<Signature>;

    fn call_function(&mut self, name: &str, args: Vec<SassValue>) -> Result<SassValue, RenderError>;

    /// Resolve and load `url`, imported from the file at `prev`.
    fn load_import(&mut self, url: &str, prev: &str) -> Result<ImportSource, ImportFailure>;
}

/// Output formatting resolved from the render configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub style: OutputStyle,
    /// One indentation level
    pub indent: String,
    pub linefeed: &'static str,
    pub precision: usize,
    pub source_comments: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            style: OutputStyle::Nested,
            indent: "  ".to_string(),
            linefeed: "\n",
            precision: 5,
            source_comments: false,
        }
    }
}

impl Settings {
    pub fn from_config(config: &RenderConfig) -> Self {
        Settings {
            style: config.output_style,
            indent: config.indent(),
            linefeed: config.linefeed.as_str(),
            precision: config.precision,
            source_comments: config.source_comments,
        }
    }

    pub fn format(&self) -> Format {
        Format {
            precision: self.precision,
            compressed: self.style == OutputStyle::Compressed,
        }
    }
}

/// Result of a successful compile.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub css: String,
    /// Generated-to-source positions, one per emitted selector and declaration
    pub mappings: Vec<Mapping>,
    /// Every file that contributed, entry first
    pub sources: Vec<SourceFile>,
}

/// Compile `source`, known as `path` (`stdin` for inline data).
///
/// # Errors
///
/// Parse and evaluation failures become [`RenderError::Compile`]; failures
/// reported by the host are returned unchanged.
pub fn compile(
    source: &str,
    path: &str,
    host: &mut dyn Host,
    settings: &Settings,
) -> Result<Compiled, RenderError> {
    let stmts = parser::parse_stylesheet(source, path)?;
    let evaluator = eval::Evaluator::new(host, settings.format(), path, source);
    let (nodes, sources) = evaluator.run(&stmts)?;
    let (css, mappings) = emit::emit(&nodes, settings, &sources);
    Ok(Compiled {
        css,
        mappings,
        sources,
    })
}
