//! Lexical path helpers.
//!
//! None of these touch the filesystem: `.` and `..` are resolved textually,
//! and symlinks are left alone.
//!
//! Copyright (c) 2025 Posit, PBC

use std::path::{Component, Path, PathBuf};

/// Normalize path components (remove `.` and resolve `..`).
///
/// A `..` that would climb above the root of an absolute path is dropped.
/// Leading `..` components of a relative path are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    normalized.pop();
                    depth -= 1;
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            Component::Normal(part) => {
                normalized.push(part);
                depth += 1;
            }
            other => normalized.push(other),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// Anchor `path` at `base` when it is relative, then normalize.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Express `path` relative to the directory `base`.
///
/// Both paths should be absolute (or both relative to the same anchor).
/// Returns `.` when they are the same location.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path = normalize(path);
    let base = normalize(base);
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part);
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

/// Render a path with forward slashes regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("../a/b/..")), PathBuf::from("../a"));
        assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize(Path::new("deep/../index.scss"), Path::new("/project")),
            PathBuf::from("/project/index.scss")
        );
        assert_eq!(
            absolutize(Path::new("/other/x.scss"), Path::new("/project")),
            PathBuf::from("/other/x.scss")
        );
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to(Path::new("/p/index-test.css"), Path::new("/p")),
            PathBuf::from("index-test.css")
        );
        assert_eq!(
            relative_to(Path::new("/p/index-test.css"), Path::new("/p/deep/nested")),
            PathBuf::from("../../index-test.css")
        );
        assert_eq!(
            relative_to(Path::new("/p/src/a.scss"), Path::new("/p/out")),
            PathBuf::from("../src/a.scss")
        );
        assert_eq!(relative_to(Path::new("/p"), Path::new("/p")), PathBuf::from("."));
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("a/b.scss")), "a/b.scss");
    }
}
