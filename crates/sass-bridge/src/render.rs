/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compile entry points.
//!
//! All three run the same [`CompileJob`]; they differ only in where it runs
//! and how the result is delivered.

use std::thread::{self, JoinHandle};

use crate::context::JobContext;
use crate::error::{RenderError, RenderResult};
use crate::job::{CompileJob, RenderOutput};
use crate::options::Options;

/// Compile on the calling thread.
///
/// Async callbacks are awaited with a blocking receive, so this must not be
/// called from a tokio worker; use [`render_async`] there.
///
/// # Errors
///
/// Any option, compile or callback failure.
pub fn render_sync(options: Options) -> RenderResult<RenderOutput> {
    CompileJob::new(options)?.run()
}

/// Compile on a dedicated worker thread and hand the result to `callback`
/// together with the job context the callbacks of the job shared.
///
/// When the options are rejected before the job starts, the callback gets a
/// fresh context carrying only the configuration.
pub fn render<F>(options: Options, callback: F) -> JoinHandle<()>
where
    F: FnOnce(RenderResult<RenderOutput>, &JobContext) + Send + 'static,
{
    thread::spawn(move || {
        let config = options.config().clone();
        match CompileJob::new(options) {
            Ok(mut job) => {
                let result = job.run();
                callback(result, job.context());
            }
            Err(e) => callback(Err(e), &JobContext::new(config)),
        }
    })
}

/// Compile on tokio's blocking pool.
///
/// # Errors
///
/// Any option, compile or callback failure, or [`RenderError::Worker`] when
/// the blocking task panicked.
pub async fn render_async(options: Options) -> RenderResult<RenderOutput> {
    tokio::task::spawn_blocking(move || render_sync(options))
        .await
        .map_err(|e| RenderError::Worker(e.to_string()))?
}
