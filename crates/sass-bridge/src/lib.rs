//! Custom functions and importers for an embedded SCSS compiler.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This crate provides:
//! - Render options, readable from JSON ([`RenderConfig`], [`Options`])
//! - Custom functions with synchronous or handle-based completion
//! - An ordered importer chain with fallback to native file resolution
//! - A per-job context shared by every callback, plus timing stats
//! - The compiler itself, covering the SCSS subset the bridge exercises
//! - Blocking, threaded and async entry points

pub mod compiler;
pub mod completion;
pub mod context;
pub mod convert;
pub mod error;
pub mod functions;
pub mod importer;
pub mod info;
pub mod job;
pub mod options;
pub mod render;
pub mod resolve;
pub mod stats;

pub use completion::Done;
pub use context::JobContext;
pub use error::{CompileError, RenderError, RenderResult};
pub use functions::{FunctionRegistry, FunctionReturn};
pub use importer::{ImporterChain, ImporterResult, ImporterReturn};
pub use info::info;
pub use job::{CompileJob, NO_INPUT, RenderOutput};
pub use options::{IndentType, Linefeed, Options, OutputStyle, RenderConfig, SourceMapSetting};
pub use render::{render, render_async, render_sync};
pub use stats::Stats;
