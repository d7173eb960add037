// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state management.
//!
//! A project (`.sage` file) holds descriptive metadata used as generation
//! context and four reference image slots.

use std::path::{Path, PathBuf};

/// Number of reference image slots in a project.
pub const REFERENCE_IMAGE_SLOTS: usize = 4;

/// File extension for project documents.
pub const SAGE_FILE_EXTENSION: &str = "sage";

/// Version written into newly created projects.
pub const SAGE_FILE_VERSION: &str = "1.0";

/// Project metadata and reference images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SageFile {
    pub project_name: String,
    pub version: String,
    pub created_at: String,
    pub project_description: String,
    pub keywords: String,
    pub camera: String,
    /// Absolute image paths; `None` marks an empty slot
    pub reference_images: [Option<PathBuf>; REFERENCE_IMAGE_SLOTS],
    pub last_saved: String,
    pub filepath: PathBuf,
}

impl SageFile {
    /// Create an empty project document owned by `filepath`.
    pub fn new(project_name: impl Into<String>, filepath: impl Into<PathBuf>) -> Self {
        Self {
            project_name: project_name.into(),
            version: SAGE_FILE_VERSION.to_string(),
            created_at: timestamp_now(),
            project_description: String::new(),
            keywords: String::new(),
            camera: String::new(),
            reference_images: Default::default(),
            last_saved: String::new(),
            filepath: filepath.into(),
        }
    }

    /// Directory containing the project file. All stored paths are relative to it.
    pub fn directory(&self) -> &Path {
        self.filepath.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn update_last_saved(&mut self) {
        self.last_saved = timestamp_now();
    }

    /// Existing reference images, optionally skipping one slot.
    ///
    /// Slots pointing at missing files are skipped with a warning.
    pub fn reference_image_abs_paths(&self, exclude: Option<usize>) -> Vec<PathBuf> {
        self.reference_images
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != exclude)
            .filter_map(|(i, slot)| {
                let path = slot.as_ref()?;
                if path.is_file() {
                    Some(path.clone())
                } else {
                    log::warn!(
                        "Reference image {} ({}) does not exist, skipping for generation context",
                        i,
                        path.display()
                    );
                    None
                }
            })
            .collect()
    }
}

/// Local time formatted like `2025-05-01T12:30:00`.
pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_is_parent_of_file() {
        let sage = SageFile::new("knight", "/projects/knight/knight.sage");
        assert_eq!(sage.directory(), Path::new("/projects/knight"));
        assert_eq!(sage.version, SAGE_FILE_VERSION);
        assert!(sage.reference_images.iter().all(Option::is_none));
    }

    #[test]
    fn test_reference_images_skip_missing_and_excluded() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();

        let mut sage = SageFile::new("p", dir.path().join("p.sage"));
        sage.reference_images = [
            Some(a.clone()),
            Some(dir.path().join("missing.png")),
            None,
            Some(b.clone()),
        ];

        assert_eq!(sage.reference_image_abs_paths(None), vec![a.clone(), b.clone()]);
        assert_eq!(sage.reference_image_abs_paths(Some(0)), vec![b]);
    }
}
