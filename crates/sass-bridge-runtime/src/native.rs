/*
 * native.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Native runtime backed by std::fs and the process environment.
 */

use std::path::{Path, PathBuf};

use crate::traits::{PathKind, RuntimeResult, SystemRuntime};

/// Runtime with full access to the local filesystem and environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        NativeRuntime
    }
}

impl SystemRuntime for NativeRuntime {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        tracing::trace!(path = %path.display(), "Reading file");
        Ok(std::fs::read(path)?)
    }

    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool> {
        let Ok(metadata) = std::fs::metadata(path) else {
            return Ok(false);
        };
        Ok(match kind {
            None => true,
            Some(PathKind::File) => metadata.is_file(),
            Some(PathKind::Directory) => metadata.is_dir(),
        })
    }

    fn cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(std::env::current_dir()?)
    }

    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>> {
        Ok(std::env::var(name).ok())
    }
}
