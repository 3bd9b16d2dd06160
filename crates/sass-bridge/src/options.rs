//! Render options.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! [`RenderConfig`] is the plain-data part of the options and can be read
//! from JSON with the usual camelCase keys. [`Options`] adds what cannot be
//! serialized: registered functions, importers and the system runtime the
//! job reads files through.
//!
//! ```rust,ignore
//! use sass_bridge::{Options, OutputStyle, render_sync};
//! use sass_bridge_values::Number;
//!
//! let options = Options::default()
//!     .data("div { width: double(2px); }")
//!     .output_style(OutputStyle::Expanded)
//!     .function("double($n)", |_, args| { /* ... */ });
//! let output = render_sync(options)?;
//! ```

use std::fmt;
use std::sync::Arc;

use sass_bridge_runtime::{NativeRuntime, SystemRuntime};
use sass_bridge_values::Value;
use serde::{Deserialize, Serialize};

use crate::completion::Done;
use crate::context::JobContext;
use crate::error::{RenderError, RenderResult};
use crate::functions::{FunctionRegistry, FunctionReturn};
use crate::importer::{ImporterChain, ImporterReturn};

/// Largest accepted `indentWidth`.
pub const MAX_INDENT_WIDTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    #[default]
    Nested,
    Expanded,
    Compact,
    Compressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentType {
    #[default]
    Space,
    Tab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linefeed {
    Cr,
    Crlf,
    #[default]
    Lf,
    Lfcr,
}

impl Linefeed {
    pub fn as_str(self) -> &'static str {
        match self {
            Linefeed::Cr => "\r",
            Linefeed::Crlf => "\r\n",
            Linefeed::Lf => "\n",
            Linefeed::Lfcr => "\n\r",
        }
    }
}

/// `sourceMap`: `false`, `true` (map next to `outFile`) or the map path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceMapSetting {
    Enabled(bool),
    Path(String),
}

impl Default for SourceMapSetting {
    fn default() -> Self {
        SourceMapSetting::Enabled(false)
    }
}

impl SourceMapSetting {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, SourceMapSetting::Enabled(false))
    }
}

/// Serializable render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Inline source; exclusive with `file`
    pub data: Option<String>,
    pub file: Option<String>,
    pub include_paths: Vec<String>,
    pub output_style: OutputStyle,
    pub indent_type: IndentType,
    pub indent_width: usize,
    pub linefeed: Linefeed,
    pub precision: usize,
    pub source_map: SourceMapSetting,
    pub out_file: Option<String>,
    pub source_map_root: Option<String>,
    pub source_map_contents: bool,
    pub source_map_embed: bool,
    pub omit_source_map_url: bool,
    pub source_comments: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            data: None,
            file: None,
            include_paths: Vec::new(),
            output_style: OutputStyle::default(),
            indent_type: IndentType::default(),
            indent_width: 2,
            linefeed: Linefeed::default(),
            precision: 5,
            source_map: SourceMapSetting::default(),
            out_file: None,
            source_map_root: None,
            source_map_contents: false,
            source_map_embed: false,
            omit_source_map_url: false,
            source_comments: false,
        }
    }
}

impl RenderConfig {
    /// One level of indentation.
    pub fn indent(&self) -> String {
        let unit = match self.indent_type {
            IndentType::Space => " ",
            IndentType::Tab => "\t",
        };
        unit.repeat(self.indent_width)
    }

    /// Reject formatting values the compiler cannot honor.
    ///
    /// # Errors
    ///
    /// [`RenderError::Input`] for an `indentWidth` above [`MAX_INDENT_WIDTH`].
    pub fn validate(&self) -> RenderResult<()> {
        if self.indent_width > MAX_INDENT_WIDTH {
            return Err(RenderError::Input(format!(
                "indentWidth must be at most {}, got {}",
                MAX_INDENT_WIDTH, self.indent_width
            )));
        }
        Ok(())
    }
}

/// Everything a compile job needs.
#[derive(Clone)]
pub struct Options {
    config: RenderConfig,
    functions: FunctionRegistry,
    importers: ImporterChain,
    runtime: Arc<dyn SystemRuntime>,
}

impl Default for Options {
    fn default() -> Self {
        Options::from_config(RenderConfig::default())
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("config", &self.config)
            .field("functions", &self.functions.signatures().collect::<Vec<_>>())
            .field("importers", &self.importers.len())
            .finish()
    }
}

impl Options {
    /// Options with the given configuration, no callbacks and the native
    /// runtime.
    pub fn from_config(config: RenderConfig) -> Self {
        Options {
            config,
            functions: FunctionRegistry::new(),
            importers: ImporterChain::new(),
            runtime: Arc::new(NativeRuntime::new()),
        }
    }

    /// Parse a JSON configuration object.
    ///
    /// # Errors
    ///
    /// [`RenderError::Input`] when the JSON does not describe a configuration.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        let config: RenderConfig = serde_json::from_str(json)
            .map_err(|e| RenderError::Input(format!("invalid render options: {}", e)))?;
        Ok(Options::from_config(config))
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn importers(&self) -> &ImporterChain {
        &self.importers
    }

    pub fn runtime(&self) -> &Arc<dyn SystemRuntime> {
        &self.runtime
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.config.data = Some(data.into());
        self
    }

    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.config.file = Some(file.into());
        self
    }

    /// Append a directory to the import search path.
    pub fn include_path(mut self, path: impl Into<String>) -> Self {
        self.config.include_paths.push(path.into());
        self
    }

    pub fn include_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.config.include_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn output_style(mut self, style: OutputStyle) -> Self {
        self.config.output_style = style;
        self
    }

    pub fn indent_type(mut self, indent_type: IndentType) -> Self {
        self.config.indent_type = indent_type;
        self
    }

    pub fn indent_width(mut self, width: usize) -> Self {
        self.config.indent_width = width;
        self
    }

    pub fn linefeed(mut self, linefeed: Linefeed) -> Self {
        self.config.linefeed = linefeed;
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.config.precision = precision;
        self
    }

    pub fn source_map(mut self, setting: SourceMapSetting) -> Self {
        self.config.source_map = setting;
        self
    }

    pub fn out_file(mut self, path: impl Into<String>) -> Self {
        self.config.out_file = Some(path.into());
        self
    }

    pub fn source_map_root(mut self, root: impl Into<String>) -> Self {
        self.config.source_map_root = Some(root.into());
        self
    }

    pub fn source_map_contents(mut self, yes: bool) -> Self {
        self.config.source_map_contents = yes;
        self
    }

    pub fn source_map_embed(mut self, yes: bool) -> Self {
        self.config.source_map_embed = yes;
        self
    }

    pub fn omit_source_map_url(mut self, yes: bool) -> Self {
        self.config.omit_source_map_url = yes;
        self
    }

    pub fn source_comments(mut self, yes: bool) -> Self {
        self.config.source_comments = yes;
        self
    }

    /// Register a synchronous custom function.
    pub fn function<F>(mut self, signature: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut JobContext, Vec<Value>) -> FunctionReturn + Send + Sync + 'static,
    {
        self.functions.register_sync(signature, callback);
        self
    }

    /// Register a custom function that completes through a handle.
    pub fn async_function<F>(mut self, signature: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut JobContext, Vec<Value>, Done<FunctionReturn>) + Send + Sync + 'static,
    {
        self.functions.register_async(signature, callback);
        self
    }

    /// Append a synchronous importer to the chain.
    pub fn importer<F>(mut self, importer: F) -> Self
    where
        F: Fn(&mut JobContext, &str, &str) -> ImporterReturn + Send + Sync + 'static,
    {
        self.importers.push_sync(importer);
        self
    }

    /// Append an importer that completes through a handle.
    pub fn async_importer<F>(mut self, importer: F) -> Self
    where
        F: Fn(&mut JobContext, &str, &str, Done<ImporterReturn>) + Send + Sync + 'static,
    {
        self.importers.push_async(importer);
        self
    }

    /// Read files and environment through `runtime` instead of the machine.
    pub fn runtime_handle(mut self, runtime: Arc<dyn SystemRuntime>) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_runtime(self, runtime: impl SystemRuntime + 'static) -> Self {
        self.runtime_handle(Arc::new(runtime))
    }
}
