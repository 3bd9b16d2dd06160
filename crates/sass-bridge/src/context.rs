/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The per-job record every callback receives as `&mut`.

use hashlink::LinkedHashMap;
use sass_bridge_values::HostValue;

use crate::options::RenderConfig;

/// State shared by every function and importer invocation of one job.
///
/// `options` is a snapshot of the resolved configuration. The remaining
/// fields belong to the host: whatever one callback stores is visible to
/// every later callback of the same job, and to the completion callback.
#[derive(Debug, Clone, Default)]
pub struct JobContext {
    options: RenderConfig,
    fields: LinkedHashMap<String, HostValue>,
}

impl JobContext {
    pub fn new(options: RenderConfig) -> Self {
        JobContext {
            options,
            fields: LinkedHashMap::new(),
        }
    }

    pub fn options(&self) -> &RenderConfig {
        &self.options
    }

    pub fn get(&self, key: &str) -> Option<&HostValue> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut HostValue> {
        self.fields.get_mut(key)
    }

    /// Store a field, returning the previous value.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<HostValue>,
    ) -> Option<HostValue> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<HostValue> {
        self.fields.remove(key)
    }

    /// Field names in the order they were first set.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Increment a numeric field, starting from zero, and return the new
    /// count.
    pub fn bump(&mut self, key: &str) -> f64 {
        let next = self.get(key).and_then(HostValue::as_f64).unwrap_or(0.0) + 1.0;
        self.set(key, next);
        next
    }
}
