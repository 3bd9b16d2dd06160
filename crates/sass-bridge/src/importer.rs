/*
 * importer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Custom importers and the per-job importer chain.
//!
//! Importers are tried in registration order for every `@import`. Whatever
//! an importer hands back, synchronously or through its completion handle,
//! goes through [`coerce`] into an [`ImporterResult`].

use std::fmt;
use std::sync::Arc;

use sass_bridge_values::{HostError, HostValue, ValueError};

use crate::completion::{self, Done};
use crate::context::JobContext;
use crate::error::{RenderError, RenderResult};

/// What an importer callback hands back.
pub type ImporterReturn = Result<HostValue, HostError>;

/// `(context, url, prev)`
pub type SyncImporter = dyn Fn(&mut JobContext, &str, &str) -> ImporterReturn + Send + Sync;

pub type AsyncImporter = dyn Fn(&mut JobContext, &str, &str, Done<ImporterReturn>) + Send + Sync;

#[derive(Clone)]
pub enum ImporterCallback {
    Sync(Arc<SyncImporter>),
    Async(Arc<AsyncImporter>),
}

impl fmt::Debug for ImporterCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImporterCallback::Sync(_) => f.write_str("ImporterCallback::Sync"),
            ImporterCallback::Async(_) => f.write_str("ImporterCallback::Async"),
        }
    }
}

/// Normalized outcome of one importer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImporterResult {
    /// Defer to the next importer, then to native resolution.
    UseNative,
    Resolved {
        file: Option<String>,
        contents: Option<String>,
    },
    Error(String),
}

/// Interpret an importer's return.
///
/// # Errors
///
/// A `contents` field that is present but not a string is a type error.
pub fn coerce(returned: ImporterReturn) -> RenderResult<ImporterResult> {
    let value = match returned {
        Ok(value) => value,
        Err(err) => return Ok(ImporterResult::Error(err.text().to_string())),
    };
    if value.is_nullish() {
        return Ok(ImporterResult::UseNative);
    }
    match value {
        HostValue::Error(message) => Ok(ImporterResult::Error(message)),
        HostValue::Object(_) => {
            let file = value.get("file").and_then(HostValue::as_str).map(str::to_string);
            let contents = match value.get("contents") {
                None | Some(HostValue::Undefined | HostValue::Null) => None,
                Some(HostValue::String(s)) => Some(s.clone()),
                Some(_) => {
                    return Err(RenderError::Value(ValueError::Type(
                        "returned value of `contents` must be a string".to_string(),
                    )));
                }
            };
            if file.is_none() && contents.is_none() {
                Ok(ImporterResult::UseNative)
            } else {
                Ok(ImporterResult::Resolved { file, contents })
            }
        }
        _ => Ok(ImporterResult::UseNative),
    }
}

/// Ordered importers of one set of options.
#[derive(Debug, Clone, Default)]
pub struct ImporterChain {
    importers: Vec<ImporterCallback>,
}

impl ImporterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, importer: ImporterCallback) {
        self.importers.push(importer);
    }

    pub fn push_sync<F>(&mut self, importer: F)
    where
        F: Fn(&mut JobContext, &str, &str) -> ImporterReturn + Send + Sync + 'static,
    {
        self.push(ImporterCallback::Sync(Arc::new(importer)));
    }

    pub fn push_async<F>(&mut self, importer: F)
    where
        F: Fn(&mut JobContext, &str, &str, Done<ImporterReturn>) + Send + Sync + 'static,
    {
        self.push(ImporterCallback::Async(Arc::new(importer)));
    }

    pub fn len(&self) -> usize {
        self.importers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.importers.is_empty()
    }

    /// Run the chain for one `@import`. Stops at the first importer that
    /// resolves or fails; `UseNative` when none did.
    ///
    /// # Errors
    ///
    /// Propagates malformed returns from [`coerce`] and dropped completion
    /// handles.
    pub fn resolve(
        &self,
        context: &mut JobContext,
        url: &str,
        prev: &str,
    ) -> RenderResult<ImporterResult> {
        for (index, importer) in self.importers.iter().enumerate() {
            tracing::trace!(importer = index, url, prev, "invoking importer");
            let returned = match importer {
                ImporterCallback::Sync(callback) => callback(context, url, prev),
                ImporterCallback::Async(callback) => {
                    let (done, pending) = completion::channel("importer");
                    callback(context, url, prev, done);
                    pending.wait()?
                }
            };
            match coerce(returned)? {
                ImporterResult::UseNative => continue,
                other => return Ok(other),
            }
        }
        Ok(ImporterResult::UseNative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sass_bridge_values::Value;
    use std::sync::Mutex;

    fn resolved(file: Option<&str>, contents: Option<&str>) -> ImporterResult {
        ImporterResult::Resolved {
            file: file.map(str::to_string),
            contents: contents.map(str::to_string),
        }
    }

    #[test]
    fn test_coerce_shapes() {
        assert_eq!(coerce(Ok(HostValue::Undefined)).unwrap(), ImporterResult::UseNative);
        assert_eq!(coerce(Ok(Value::null().into())).unwrap(), ImporterResult::UseNative);
        assert_eq!(coerce(Ok(HostValue::Bool(false))).unwrap(), ImporterResult::UseNative);
        assert_eq!(coerce(Ok(HostValue::from("x"))).unwrap(), ImporterResult::UseNative);
        assert_eq!(
            coerce(Ok(HostValue::object::<&str, _>([]))).unwrap(),
            ImporterResult::UseNative
        );
        assert_eq!(
            coerce(Ok(HostValue::object([("file", HostValue::from("/a.scss"))]))).unwrap(),
            resolved(Some("/a.scss"), None)
        );
        assert_eq!(
            coerce(Ok(HostValue::object([("contents", HostValue::from("a {}"))]))).unwrap(),
            resolved(None, Some("a {}"))
        );
        assert_eq!(
            coerce(Ok(HostValue::error("doesn't exist!"))).unwrap(),
            ImporterResult::Error("doesn't exist!".into())
        );
        assert_eq!(
            coerce(Err(HostError::Unknown)).unwrap(),
            ImporterResult::Error("unexpected error".into())
        );
    }

    #[test]
    fn test_non_string_contents() {
        let err = coerce(Ok(HostValue::object([(
            "contents",
            HostValue::from(b"i am not a string!".to_vec()),
        )])))
        .unwrap_err();
        assert_eq!(err.to_string(), "returned value of `contents` must be a string");
    }

    #[test]
    fn test_chain_order_and_short_circuit() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut chain = ImporterChain::new();
        let log = Arc::clone(&calls);
        chain.push_sync(move |_, url, _| {
            log.lock().unwrap().push(format!("first:{}", url));
            Ok(HostValue::Null)
        });
        let log = Arc::clone(&calls);
        chain.push_async(move |_, url, _, done| {
            log.lock().unwrap().push(format!("second:{}", url));
            done.complete(Ok(HostValue::object([("contents", HostValue::from("b {}"))])));
        });
        let log = Arc::clone(&calls);
        chain.push_sync(move |_, url, _| {
            log.lock().unwrap().push(format!("third:{}", url));
            Ok(HostValue::Null)
        });

        let mut ctx = JobContext::default();
        let result = chain.resolve(&mut ctx, "x", "stdin").unwrap();
        assert_eq!(result, resolved(None, Some("b {}")));
        assert_eq!(*calls.lock().unwrap(), vec!["first:x", "second:x"]);
    }

    #[test]
    fn test_empty_chain_uses_native() {
        let mut ctx = JobContext::default();
        assert_eq!(
            ImporterChain::new().resolve(&mut ctx, "x", "stdin").unwrap(),
            ImporterResult::UseNative
        );
    }
}
