/*
 * resolve.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Native `@import` resolution against the filesystem.
//!
//! Search order: explicit include paths, then `SASS_PATH` entries, then the
//! directory of the importing file (the working directory for inline
//! input). A path an importer names is looked up next to the importing
//! file first. Within one base, candidates are tried rank by rank.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sass_bridge_runtime::{SystemRuntime, path};

/// Path the compiler reports for inline source input.
pub const STDIN: &str = "stdin";

#[derive(Clone)]
pub struct NativeResolver {
    runtime: Arc<dyn SystemRuntime>,
    include_paths: Vec<PathBuf>,
    sass_path: Vec<PathBuf>,
    cwd: PathBuf,
}

impl std::fmt::Debug for NativeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeResolver")
            .field("include_paths", &self.include_paths)
            .field("sass_path", &self.sass_path)
            .field("cwd", &self.cwd)
            .finish()
    }
}

impl NativeResolver {
    pub fn new(
        runtime: Arc<dyn SystemRuntime>,
        include_paths: Vec<PathBuf>,
        sass_path: Vec<PathBuf>,
        cwd: PathBuf,
    ) -> Self {
        NativeResolver {
            runtime,
            include_paths,
            sass_path,
            cwd,
        }
    }

    /// Every base directory searched for an import from `prev`, in order.
    fn bases(&self, prev: &str) -> Vec<PathBuf> {
        self.include_paths
            .iter()
            .chain(self.sass_path.iter())
            .map(|p| path::absolutize(p, &self.cwd))
            .chain(std::iter::once(self.importer_dir(prev)))
            .collect()
    }

    /// Directory imports from `prev` are relative to.
    pub fn importer_dir(&self, prev: &str) -> PathBuf {
        let dir = if prev == STDIN {
            self.cwd.clone()
        } else {
            Path::new(prev)
                .parent()
                .map_or_else(|| self.cwd.clone(), Path::to_path_buf)
        };
        path::absolutize(&dir, &self.cwd)
    }

    /// Find the file `url` refers to.
    ///
    /// # Errors
    ///
    /// Returns the message to report when two candidates of the same rank
    /// both exist.
    pub fn resolve(&self, url: &str, prev: &str) -> Result<Option<PathBuf>, String> {
        self.search(url, self.bases(prev))
    }

    /// Find a file an importer returned by path only. The importing file's
    /// directory is tried before the regular bases.
    ///
    /// # Errors
    ///
    /// Same as [`NativeResolver::resolve`].
    pub fn resolve_named(&self, file: &str, prev: &str) -> Result<Option<PathBuf>, String> {
        let mut bases = self.bases(prev);
        if let Some(own) = bases.pop() {
            bases.insert(0, own);
        }
        self.search(file, bases)
    }

    fn search(&self, url: &str, bases: Vec<PathBuf>) -> Result<Option<PathBuf>, String> {
        let ranks = candidates(url);
        for base in bases {
            for rank in &ranks {
                let found: Vec<PathBuf> = rank
                    .iter()
                    .map(|c| path::normalize(&base.join(c)))
                    .filter(|p| self.is_file(p))
                    .collect();
                tracing::trace!(
                    url,
                    base = %base.display(),
                    found = found.len(),
                    "native import candidates"
                );
                match found.len() {
                    0 => continue,
                    1 => return Ok(found.into_iter().next()),
                    _ => {
                        return Err(format!(
                            "It's not clear which file to import for '@import \"{}\"'.\nCandidates:\n{}",
                            url,
                            found
                                .iter()
                                .map(|p| format!("  {}", path::to_slash(p)))
                                .collect::<Vec<_>>()
                                .join("\n")
                        ));
                    }
                }
            }
        }
        Ok(None)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.runtime.is_file(path).unwrap_or(false)
    }
}

/// Candidate paths for `url`, grouped by rank.
fn candidates(url: &str) -> Vec<Vec<PathBuf>> {
    let url_path = Path::new(url);
    if url_path.extension().is_some() {
        let mut exact = vec![url_path.to_path_buf()];
        if let Some(partial) = partial(url_path, "") {
            exact.push(partial);
        }
        return vec![exact];
    }
    let with = |suffix: &str| {
        let mut rank = vec![PathBuf::from(format!("{}{}", url, suffix))];
        if let Some(partial) = partial(url_path, suffix) {
            rank.push(partial);
        }
        rank
    };
    vec![
        with(".scss"),
        with(".css"),
        vec![url_path.join("index.scss"), url_path.join("_index.scss")],
    ]
}

/// `dir/_name<suffix>` for `dir/name`, unless the name is already partial.
fn partial(url: &Path, suffix: &str) -> Option<PathBuf> {
    let name = url.file_name()?.to_str()?;
    if name.starts_with('_') {
        return None;
    }
    let file = format!("_{}{}", name, suffix);
    Some(match url.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(file),
        _ => PathBuf::from(file),
    })
}
