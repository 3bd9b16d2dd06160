/*
 * memory.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * In-memory runtime: a virtual filesystem plus an environment map.
 */

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::path::normalize;
use crate::traits::{PathKind, RuntimeError, RuntimeResult, SystemRuntime};

/// In-memory filesystem keyed by normalized absolute paths.
#[derive(Debug, Default)]
struct VirtualFileSystem {
    files: HashMap<PathBuf, Vec<u8>>,
    directories: HashSet<PathBuf>,
}

impl VirtualFileSystem {
    fn add_file(&mut self, path: PathBuf, contents: Vec<u8>) {
        if let Some(parent) = path.parent() {
            self.add_directory_and_parents(parent);
        }
        self.files.insert(path, contents);
    }

    /// Add a directory and all its parent directories.
    fn add_directory_and_parents(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }
}

/// Runtime whose files and environment live entirely in memory.
///
/// Relative paths resolve against the configured working directory
/// (`/` unless set with [`MemoryRuntime::with_cwd`]).
#[derive(Debug)]
pub struct MemoryRuntime {
    /// Uses RwLock to satisfy Send + Sync trait bounds.
    vfs: RwLock<VirtualFileSystem>,
    env: RwLock<HashMap<String, String>>,
    cwd: PathBuf,
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRuntime {
    pub fn new() -> Self {
        MemoryRuntime {
            vfs: RwLock::new(VirtualFileSystem::default()),
            env: RwLock::new(HashMap::new()),
            cwd: PathBuf::from("/"),
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = self.resolve(&cwd.into());
        self
    }

    /// Builder form of [`MemoryRuntime::add_file`].
    pub fn with_file(self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, contents);
        self
    }

    pub fn with_env(self, name: &str, value: &str) -> Self {
        self.set_env(name, value);
        self
    }

    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let path = self.resolve(path.as_ref());
        match self.vfs.write() {
            Ok(mut vfs) => vfs.add_file(path, contents.into()),
            Err(poisoned) => poisoned.into_inner().add_file(path, contents.into()),
        }
    }

    pub fn set_env(&self, name: &str, value: &str) {
        let mut env = match self.env.write() {
            Ok(env) => env,
            Err(poisoned) => poisoned.into_inner(),
        };
        env.insert(name.to_string(), value.to_string());
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.cwd.join(path))
        }
    }

    fn lock_poisoned() -> RuntimeError {
        RuntimeError::Io(io::Error::other("virtual filesystem lock poisoned"))
    }
}

impl SystemRuntime for MemoryRuntime {
    fn file_read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = self.resolve(path);
        let vfs = self.vfs.read().map_err(|_| Self::lock_poisoned())?;
        vfs.files.get(&path).cloned().ok_or_else(|| {
            RuntimeError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            ))
        })
    }

    fn path_exists(&self, path: &Path, kind: Option<PathKind>) -> RuntimeResult<bool> {
        let path = self.resolve(path);
        let vfs = self.vfs.read().map_err(|_| Self::lock_poisoned())?;
        let is_file = vfs.files.contains_key(&path);
        let is_dir = vfs.directories.contains(&path);
        Ok(match kind {
            None => is_file || is_dir,
            Some(PathKind::File) => is_file,
            Some(PathKind::Directory) => is_dir,
        })
    }

    fn cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }

    fn env_get(&self, name: &str) -> RuntimeResult<Option<String>> {
        let env = self.env.read().map_err(|_| Self::lock_poisoned())?;
        Ok(env.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_and_directories() {
        let rt = MemoryRuntime::new().with_file("/project/src/_vars.scss", "$a: 1;");
        assert!(rt.is_file(Path::new("/project/src/_vars.scss")).unwrap());
        assert!(rt.is_dir(Path::new("/project/src")).unwrap());
        assert!(rt.is_dir(Path::new("/project")).unwrap());
        assert!(!rt.is_file(Path::new("/project/src")).unwrap());
        assert_eq!(
            rt.file_read_string(Path::new("/project/src/../src/_vars.scss"))
                .unwrap(),
            "$a: 1;"
        );
    }

    #[test]
    fn test_relative_paths_use_cwd() {
        let rt = MemoryRuntime::new()
            .with_cwd("/work")
            .with_file("index.scss", "a { b: c; }");
        assert!(rt.is_file(Path::new("/work/index.scss")).unwrap());
        assert_eq!(rt.cwd().unwrap(), PathBuf::from("/work"));
    }

    #[test]
    fn test_missing_file() {
        let rt = MemoryRuntime::new();
        let err = rt.file_read(Path::new("/nope.scss")).unwrap_err();
        match err {
            RuntimeError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_env() {
        let rt = MemoryRuntime::new().with_env("SASS_PATH", "/a:/b");
        assert_eq!(rt.env_get("SASS_PATH").unwrap().as_deref(), Some("/a:/b"));
        assert_eq!(rt.env_get("HOME").unwrap(), None);
    }
}
