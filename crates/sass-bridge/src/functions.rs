/*
 * functions.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Custom function registration and invocation.
//!
//! Callbacks are registered against a signature string on the options. When
//! a job starts, the signatures are parsed into a [`FunctionTable`]; the
//! compiler looks functions up there, binds arguments against the parsed
//! signature and calls [`FunctionTable::invoke`].

use std::fmt;
use std::sync::Arc;

use hashlink::LinkedHashMap;
use sass_bridge_values::{HostError, HostValue, Value};

use crate::compiler::{SassValue, Signature, parse_signature};
use crate::completion::{self, Done};
use crate::context::JobContext;
use crate::convert::{self, ReturnError};
use crate::error::{RenderError, RenderResult};

/// What a function callback hands back.
pub type FunctionReturn = Result<HostValue, HostError>;

pub type SyncFunction = dyn Fn(&mut JobContext, Vec<Value>) -> FunctionReturn + Send + Sync;

/// An asynchronous callback fulfills the handle exactly once, possibly from
/// another thread, instead of returning.
pub type AsyncFunction = dyn Fn(&mut JobContext, Vec<Value>, Done<FunctionReturn>) + Send + Sync;

#[derive(Clone)]
pub enum FunctionCallback {
    Sync(Arc<SyncFunction>),
    Async(Arc<AsyncFunction>),
}

impl fmt::Debug for FunctionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionCallback::Sync(_) => f.write_str("FunctionCallback::Sync"),
            FunctionCallback::Async(_) => f.write_str("FunctionCallback::Async"),
        }
    }
}

/// Callbacks registered on the options, keyed by their signature text.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    entries: Vec<(String, FunctionCallback)>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, signature: impl Into<String>, callback: FunctionCallback) {
        self.entries.push((signature.into(), callback));
    }

    pub fn register_sync<F>(&mut self, signature: impl Into<String>, callback: F)
    where
        F: Fn(&mut JobContext, Vec<Value>) -> FunctionReturn + Send + Sync + 'static,
    {
        self.register(signature, FunctionCallback::Sync(Arc::new(callback)));
    }

    pub fn register_async<F>(&mut self, signature: impl Into<String>, callback: F)
    where
        F: Fn(&mut JobContext, Vec<Value>, Done<FunctionReturn>) + Send + Sync + 'static,
    {
        self.register(signature, FunctionCallback::Async(Arc::new(callback)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Signature strings in registration order.
    pub fn signatures(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(s, _)| s.as_str())
    }
}

#[derive(Debug, Clone)]
struct TableEntry {
    signature: Signature,
    callback: FunctionCallback,
}

/// Parsed functions for one job.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    entries: LinkedHashMap<String, TableEntry>,
}

fn normalize_name(name: &str) -> String {
    name.replace('_', "-")
}

impl FunctionTable {
    /// Parse every registered signature. A later registration of the same
    /// name replaces the earlier one.
    ///
    /// # Errors
    ///
    /// Fails with a compile error when a signature does not parse.
    pub fn build(registry: &FunctionRegistry) -> RenderResult<Self> {
        let mut entries = LinkedHashMap::new();
        for (text, callback) in &registry.entries {
            let signature = parse_signature(text)?;
            let name = normalize_name(&signature.name);
            entries.insert(
                name,
                TableEntry {
                    signature,
                    callback: callback.clone(),
                },
            );
        }
        Ok(FunctionTable { entries })
    }

    pub fn signature(&self, name: &str) -> Option<&Signature> {
        self.entries.get(&normalize_name(name)).map(|e| &e.signature)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Call the function registered as `name` with already bound arguments.
    ///
    /// # Errors
    ///
    /// Host failures, error returns and non-value returns all become
    /// [`RenderError::Function`] naming the function.
    pub fn invoke(
        &self,
        name: &str,
        args: Vec<SassValue>,
        context: &mut JobContext,
    ) -> RenderResult<SassValue> {
        let Some(entry) = self.entries.get(&normalize_name(name)) else {
            return Err(RenderError::function(name, "function is not registered"));
        };
        let values: Vec<Value> = args.iter().map(convert::wrap).collect();
        tracing::trace!(function = name, args = values.len(), "invoking custom function");

        let returned = match &entry.callback {
            FunctionCallback::Sync(callback) => callback(context, values),
            FunctionCallback::Async(callback) => {
                let (done, pending) = completion::channel("function");
                callback(context, values, done);
                pending.wait()?
            }
        };

        match returned {
            Ok(value) => convert::unwrap_host(value).map_err(|e| match e {
                ReturnError::NotAValue => {
                    RenderError::function(name, "A SassValue object was expected")
                }
                ReturnError::Error(message) => RenderError::function(name, message),
                ReturnError::Value(err) => RenderError::function(name, err.to_string()),
            }),
            Err(err) => Err(RenderError::function(name, err.text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sass_bridge_values::{Number, ValueError};
    use std::thread;

    fn table(registry: &FunctionRegistry) -> FunctionTable {
        FunctionTable::build(registry).unwrap()
    }

    #[test]
    fn test_sync_function_returns_value() {
        let mut registry = FunctionRegistry::new();
        registry.register_sync("foo()", |_, _| Ok(Number::new(42.0, "px").into()));
        let table = table(&registry);
        let mut ctx = JobContext::default();
        let value = table.invoke("foo", Vec::new(), &mut ctx).unwrap();
        assert_eq!(value, SassValue::number(42.0, "px"));
    }

    #[test]
    fn test_async_function_completes_on_another_thread() {
        let mut registry = FunctionRegistry::new();
        registry.register_async("later($a)", |_, args, done| {
            let first = args.into_iter().next();
            thread::spawn(move || {
                done.complete(Ok(first.map_or(HostValue::Undefined, HostValue::from)));
                done.complete(Ok(HostValue::from(Value::null())));
            });
        });
        let table = table(&registry);
        let mut ctx = JobContext::default();
        let value = table
            .invoke("later", vec![SassValue::unquoted("x")], &mut ctx)
            .unwrap();
        assert_eq!(value, SassValue::unquoted("x"));
    }

    #[test]
    fn test_re_registering_replaces() {
        let mut registry = FunctionRegistry::new();
        registry.register_sync("foo($a)", |_, _| Ok(Value::boolean(false).into()));
        registry.register_sync("foo", |_, _| Ok(Value::boolean(true).into()));
        let table = table(&registry);
        assert_eq!(table.len(), 1);
        assert_eq!(table.signature("foo").unwrap().params, None);
        let mut ctx = JobContext::default();
        assert_eq!(
            table.invoke("foo", Vec::new(), &mut ctx).unwrap(),
            SassValue::Bool(true)
        );
    }

    #[test]
    fn test_underscores_and_hyphens_match() {
        let mut registry = FunctionRegistry::new();
        registry.register_sync("my_fn()", |_, _| Ok(Value::null().into()));
        let table = table(&registry);
        assert!(table.signature("my-fn").is_some());
        assert!(table.signature("my_fn").is_some());
    }

    #[test]
    fn test_return_validation_messages() {
        let mut registry = FunctionRegistry::new();
        registry.register_sync("primitive()", |_, _| Ok(HostValue::from(1)));
        registry.register_sync("typed()", |_, _| {
            Err(ValueError::Type("Supplied value should be a string".into()).into())
        });
        registry.register_sync("untyped()", |_, _| Err(HostError::Unknown));
        let table = table(&registry);
        let mut ctx = JobContext::default();
        let message = |name: &str, ctx: &mut JobContext| {
            table.invoke(name, Vec::new(), ctx).unwrap_err().to_string()
        };
        assert_eq!(
            message("primitive", &mut ctx),
            "error in function `primitive`: A SassValue object was expected"
        );
        assert_eq!(
            message("typed", &mut ctx),
            "error in function `typed`: Supplied value should be a string"
        );
        assert_eq!(
            message("untyped", &mut ctx),
            "error in function `untyped`: unexpected error"
        );
    }

    #[test]
    fn test_context_is_shared() {
        let mut registry = FunctionRegistry::new();
        registry.register_sync("count()", |ctx, _| {
            let n = ctx.bump("calls");
            Ok(Number::unitless(n).into())
        });
        let table = table(&registry);
        let mut ctx = JobContext::default();
        table.invoke("count", Vec::new(), &mut ctx).unwrap();
        table.invoke("count", Vec::new(), &mut ctx).unwrap();
        assert_eq!(ctx.get("calls").and_then(HostValue::as_f64), Some(2.0));
    }

    #[test]
    fn test_bad_signature_fails_to_build() {
        let mut registry = FunctionRegistry::new();
        registry.register_sync("foo($a", |_, _| Ok(Value::null().into()));
        assert!(FunctionTable::build(&registry).is_err());
    }
}
