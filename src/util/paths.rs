// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Path utility functions.
//!
//! This module provides conversions between the absolute paths held in
//! memory and the project-relative paths written to `.sage` and `.sprite`
//! files.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path, resolving `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Express `path` relative to `base`, like `os.path.relpath`.
///
/// Paths that share no common root (different drive prefixes) are returned unchanged.
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path = normalize(path);
    let base = normalize(base);

    let path_components: Vec<Component> = path.components().collect();
    let base_components: Vec<Component> = base.components().collect();

    let prefix = |components: &[Component]| match components.first() {
        Some(Component::Prefix(p)) => Some(p.as_os_str().to_os_string()),
        _ => None,
    };
    if path.has_root() != base.has_root() || prefix(&path_components) != prefix(&base_components) {
        return path;
    }

    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for component in &base_components[common..] {
        if !matches!(component, Component::CurDir) {
            relative.push("..");
        }
    }
    for component in &path_components[common..] {
        relative.push(component.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

/// Resolve a stored (relative) path against `base`.
pub fn resolve(base: &Path, stored: &str) -> PathBuf {
    normalize(&base.join(stored))
}

/// Render a relative path for storage, always with `/` separators.
pub fn to_stored_string(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Store `path` relative to `base`.
pub fn store(path: &Path, base: &Path) -> String {
    to_stored_string(&relative_path(path, base))
}

/// True when `path` lies strictly inside `dir`.
pub fn is_within(path: &Path, dir: &Path) -> bool {
    let path = normalize(path);
    let dir = normalize(dir);
    path != dir && path.starts_with(&dir)
}

/// Make `path` absolute, using the current directory for relative input.
pub fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        let cwd = std::env::current_dir().unwrap_or_default();
        normalize(&cwd.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn test_relative_path_roundtrip() {
        let base = Path::new("/projects/knight");
        let inside = Path::new("/projects/knight/frames/run_01.png");
        let outside = Path::new("/assets/shared/idle.png");

        let rel_inside = store(inside, base);
        assert_eq!(rel_inside, "frames/run_01.png");
        assert_eq!(resolve(base, &rel_inside), inside);

        let rel_outside = store(outside, base);
        assert_eq!(rel_outside, "../../assets/shared/idle.png");
        assert_eq!(resolve(base, &rel_outside), outside);
    }

    #[test]
    fn test_relative_to_self_is_dot() {
        let base = Path::new("/projects/knight");
        assert_eq!(store(base, base), ".");
    }

    #[test]
    fn test_is_within() {
        let dir = Path::new("/projects/knight");
        assert!(is_within(Path::new("/projects/knight/a.png"), dir));
        assert!(is_within(Path::new("/projects/knight/sub/../a.png"), dir));
        assert!(!is_within(Path::new("/projects/knight2/a.png"), dir));
        assert!(!is_within(dir, dir));
    }
}
