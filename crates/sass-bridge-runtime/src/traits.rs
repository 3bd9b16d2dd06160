/*
 * traits.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Defines the SystemRuntime trait used by compile jobs for every filesystem
 * and environment access.
 *
 * - NativeRuntime: the real filesystem and process environment
 * - MemoryRuntime: in-memory files and variables for tests and embedding
 */

use std::io;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug)]
pub enum RuntimeError {
    /// Standard I/O error
    Io(io::Error),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> Self {
        RuntimeError::Io(e)
    }
}

/// Type of filesystem path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Regular file
    File,
    /// Directory
    Directory,
}

/// Low-level operations a compile job needs from its environment.
///
/// Import resolution, entry-file loading and `SASS_PATH` lookup all go
/// through this trait, so a job can run against the real machine or against
/// a fully in-memory world.
pub trait SystemRuntime: Send + Sync {
    /// Read entire file contents as bytes.
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Read file as string with UTF-8 encoding.
    ///
    /// Default implementation reads bytes and converts to string.
    fn file_read_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.file_read(path)?;
        String::from_utf8(bytes).map_err(|e| {
            RuntimeError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid UTF-8 in file: {}", e),
            ))
        })
    }

    /// Check if path exists, optionally filtering by type.
    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool>;

    /// Check if path exists and is a file.
    fn is_file(&self, path: &Path) -> RuntimeResult<bool> {
        self.path_exists(path, Some(PathKind::File))
    }

    /// Check if path exists and is a directory.
    fn is_dir(&self, path: &Path) -> RuntimeResult<bool> {
        self.path_exists(path, Some(PathKind::Directory))
    }

    /// Current working directory, used to anchor relative paths.
    fn cwd(&self) -> RuntimeResult<PathBuf>;

    /// Get an environment variable.
    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>>;
}
