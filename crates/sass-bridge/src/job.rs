/*
 * job.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! A single compile job.
//!
//! The job owns the context every callback sees, the parsed function table,
//! native resolution and stats. It implements the compiler's [`Host`] trait:
//! function calls go to the table, `@import`s run the importer chain and
//! fall back to native resolution.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::prelude::*;
use sass_bridge_runtime::{SystemRuntime, path};
use serde::Serialize;

use crate::compiler::{
    self, Compiled, Host, ImportFailure, ImportSource, SassValue, Settings, Signature,
    sourcemap::SourceMap,
};
use crate::context::JobContext;
use crate::error::{RenderError, RenderResult};
use crate::functions::FunctionTable;
use crate::importer::{ImporterChain, ImporterResult};
use crate::options::{Options, RenderConfig, SourceMapSetting};
use crate::resolve::{NativeResolver, STDIN};
use crate::stats::{DATA_ENTRY, Stats, StatsRecorder};

pub const NO_INPUT: &str = "No input specified: provide a file name or a source string to process";

/// Environment variable holding extra import search directories.
pub const SASS_PATH: &str = "SASS_PATH";

/// A successful render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutput {
    pub css: String,
    /// Source map JSON, when one was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    pub stats: Stats,
}

#[derive(Debug, Clone)]
enum Input {
    Data(String),
    /// Absolute path of the entry file
    File(PathBuf),
}

pub struct CompileJob {
    config: RenderConfig,
    importers: ImporterChain,
    runtime: Arc<dyn SystemRuntime>,
    functions: FunctionTable,
    resolver: NativeResolver,
    context: JobContext,
    stats: StatsRecorder,
    input: Input,
    cwd: PathBuf,
}

impl std::fmt::Debug for CompileJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileJob")
            .field("input", &self.input)
            .field("resolver", &self.resolver)
            .field("stats", &self.stats)
            .finish()
    }
}

impl CompileJob {
    /// Validate the options and start the job clock.
    ///
    /// # Errors
    ///
    /// [`RenderError::Input`] for missing or conflicting input and invalid
    /// formatting values; a compile error for an unparsable function
    /// signature; a system error when the working directory is unavailable.
    pub fn new(options: Options) -> RenderResult<Self> {
        let config = options.config().clone();
        config.validate()?;
        let runtime = Arc::clone(options.runtime());
        let cwd = runtime.cwd()?;

        let data = config.data.as_deref().filter(|d| !d.is_empty());
        let input = match (data, config.file.as_deref()) {
            (Some(_), Some(_)) => {
                return Err(RenderError::Input(
                    "Both `data` and `file` were given: provide exactly one input".to_string(),
                ));
            }
            (Some(data), None) => Input::Data(data.to_string()),
            (None, Some(file)) => Input::File(path::absolutize(Path::new(file), &cwd)),
            (None, None) => return Err(RenderError::Input(NO_INPUT.to_string())),
        };

        let functions = FunctionTable::build(options.functions())?;
        let sass_path = match runtime.env_get(SASS_PATH)? {
            Some(value) => std::env::split_paths(&value).collect(),
            None => Vec::new(),
        };
        let resolver = NativeResolver::new(
            Arc::clone(&runtime),
            config.include_paths.iter().map(PathBuf::from).collect(),
            sass_path,
            cwd.clone(),
        );
        let entry = match &input {
            Input::Data(_) => DATA_ENTRY.to_string(),
            Input::File(file) => path::to_slash(file),
        };
        tracing::debug!(
            entry = %entry,
            functions = functions.len(),
            importers = options.importers().len(),
            "starting compile job"
        );

        Ok(CompileJob {
            context: JobContext::new(config.clone()),
            importers: options.importers().clone(),
            config,
            runtime,
            functions,
            resolver,
            stats: StatsRecorder::start(entry),
            input,
            cwd,
        })
    }

    pub fn context(&self) -> &JobContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut JobContext {
        &mut self.context
    }

    pub fn into_context(self) -> JobContext {
        self.context
    }

    /// Stats of the finished job; `None` while it has not run.
    pub fn stats(&self) -> Option<&Stats> {
        self.stats.finished()
    }

    /// Compile. Stats are finalized whether or not compilation succeeds.
    ///
    /// # Errors
    ///
    /// Any failure ends the job without producing CSS.
    pub fn run(&mut self) -> RenderResult<RenderOutput> {
        let result = self.compile();
        let stats = self.stats.finish();
        match &result {
            Ok(_) => {
                tracing::debug!(
                    entry = %stats.entry,
                    duration_ms = stats.duration,
                    "compile job finished"
                );
            }
            Err(e) => {
                tracing::debug!(
                    entry = %stats.entry,
                    duration_ms = stats.duration,
                    error = %e,
                    "compile job failed"
                );
            }
        }
        let (css, map) = result?;
        Ok(RenderOutput { css, map, stats })
    }

    fn compile(&mut self) -> RenderResult<(String, Option<String>)> {
        let (source, path) = match &self.input {
            Input::Data(data) => (data.clone(), STDIN.to_string()),
            Input::File(file) => {
                let source = self.runtime.file_read_string(file)?;
                let path = path::to_slash(file);
                self.stats.include(path.clone());
                (source, path)
            }
        };
        let settings = Settings::from_config(&self.config);
        let compiled = {
            let mut host = JobHost {
                context: &mut self.context,
                functions: &self.functions,
                importers: &self.importers,
                resolver: &self.resolver,
                runtime: self.runtime.as_ref(),
                stats: &mut self.stats,
            };
            compiler::compile(&source, &path, &mut host, &settings)?
        };
        self.finish_output(compiled)
    }

    /// Attach the source map, if one was requested.
    fn finish_output(&self, compiled: Compiled) -> RenderResult<(String, Option<String>)> {
        let Some(map_path) = self.map_path() else {
            return Ok((compiled.css, None));
        };
        let Some(out_file) = self.config.out_file.as_deref() else {
            return Ok((compiled.css, None));
        };
        let out_file = path::absolutize(Path::new(out_file), &self.cwd);
        let map_dir = map_path.parent().map_or_else(|| self.cwd.clone(), Path::to_path_buf);
        let relative = |p: &Path| path::to_slash(&path::relative_to(p, &map_dir));

        let sources = compiled
            .sources
            .iter()
            .map(|s| {
                if s.path == STDIN {
                    STDIN.to_string()
                } else {
                    relative(Path::new(&s.path))
                }
            })
            .collect();
        let contents = self
            .config
            .source_map_contents
            .then(|| compiled.sources.iter().map(|s| s.contents.clone()).collect());
        let map = SourceMap::new(relative(&out_file), sources, &compiled.mappings)
            .with_source_root(self.config.source_map_root.clone())
            .with_sources_content(contents)
            .to_json()?;

        let mut css = compiled.css;
        if !self.config.omit_source_map_url {
            let url = if self.config.source_map_embed {
                format!(
                    "data:application/json;base64,{}",
                    BASE64_STANDARD.encode(map.as_bytes())
                )
            } else {
                let css_dir = out_file.parent().map_or_else(|| self.cwd.clone(), Path::to_path_buf);
                path::to_slash(&path::relative_to(&map_path, &css_dir))
            };
            let linefeed = self.config.linefeed.as_str();
            if !css.is_empty() && !css.ends_with(linefeed) {
                css.push_str(linefeed);
            }
            css.push_str(&format!("/*# sourceMappingURL={} */", url));
        }
        Ok((css, Some(map)))
    }

    /// Absolute location of the source map, when maps are enabled and an
    /// output file is known.
    fn map_path(&self) -> Option<PathBuf> {
        let out_file = self.config.out_file.as_deref()?;
        let map = match &self.config.source_map {
            SourceMapSetting::Enabled(false) => return None,
            SourceMapSetting::Enabled(true) => format!("{}.map", out_file),
            SourceMapSetting::Path(p) => p.clone(),
        };
        Some(path::absolutize(Path::new(&map), &self.cwd))
    }
}

/// The compiler's view of a running job.
struct JobHost<'a> {
    context: &'a mut JobContext,
    functions: &'a FunctionTable,
    importers: &'a ImporterChain,
    resolver: &'a NativeResolver,
    runtime: &'a dyn SystemRuntime,
    stats: &'a mut StatsRecorder,
}

impl JobHost<'_> {
    fn read(&mut self, file: &Path) -> Result<ImportSource, ImportFailure> {
        let contents = self
            .runtime
            .file_read_string(file)
            .map_err(|e| ImportFailure::Abort(e.into()))?;
        let path = path::to_slash(file);
        self.stats.include(path.clone());
        Ok(ImportSource { path, contents })
    }

    fn native(&mut self, url: &str, prev: &str) -> Result<ImportSource, ImportFailure> {
        match self.resolver.resolve(url, prev) {
            Ok(Some(file)) => self.read(&file),
            Ok(None) => Err(ImportFailure::NotFound),
            Err(message) => Err(ImportFailure::Message(message)),
        }
    }

    /// Directory imports from `prev` are relative to.
    fn base_dir(&self, prev: &str) -> PathBuf {
        self.resolver.importer_dir(prev)
    }
}

impl Host for JobHost<'_> {
    fn lookup_function(&self, name: &str) -> Option<Signature> {
        self.functions.signature(name).cloned()
    }

    fn call_function(&mut self, name: &str, args: Vec<SassValue>) -> RenderResult<SassValue> {
        self.functions.invoke(name, args, self.context)
    }

    fn load_import(&mut self, url: &str, prev: &str) -> Result<ImportSource, ImportFailure> {
        let result = self
            .importers
            .resolve(self.context, url, prev)
            .map_err(ImportFailure::Abort)?;
        match result {
            ImporterResult::UseNative => self.native(url, prev),
            ImporterResult::Error(message) => {
                Err(ImportFailure::Abort(RenderError::importer(message)))
            }
            ImporterResult::Resolved {
                file: Some(file),
                contents: Some(contents),
            } => {
                let base = self.base_dir(prev);
                let path = path::to_slash(&path::absolutize(Path::new(&file), &base));
                self.stats.include(path.clone());
                Ok(ImportSource { path, contents })
            }
            ImporterResult::Resolved {
                file: Some(file),
                contents: None,
            } => match self.resolver.resolve_named(&file, prev) {
                Ok(Some(found)) => self.read(&found),
                Ok(None) => Err(ImportFailure::Message(format!(
                    "File to import not found or unreadable: {}.",
                    file
                ))),
                Err(message) => Err(ImportFailure::Message(message)),
            },
            ImporterResult::Resolved {
                file: None,
                contents,
            } => {
                let base = self.base_dir(prev);
                let path = path::to_slash(&path::absolutize(Path::new(url), &base));
                Ok(ImportSource {
                    path,
                    contents: contents.unwrap_or_default(),
                })
            }
        }
    }
}
