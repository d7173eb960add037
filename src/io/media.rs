// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file handling.
//!
//! This module loads images for display in egui and copies external
//! images into a sprite's directory.

use crate::error::{Result, SageError};
use crate::util::paths;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Image extensions accepted as frames and reference images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tiff", "tif", "webp"];

/// Decoded RGBA pixels ready for upload as a texture.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Load an image file and convert it to RGBA8.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let image = image::open(path)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: image.into_raw(),
    })
}

/// Check whether a path has one of the supported image extensions.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Ensure `source` lives under `directory`, copying it in if needed.
///
/// Files already inside `directory` are returned as-is. Otherwise the file
/// is copied next to its siblings, appending `_1`, `_2`, ... to the stem
/// until the name is free. The name is claimed with `create_new`, so two
/// concurrent copies can never pick the same target.
pub fn copy_into_directory(source: &Path, directory: &Path) -> Result<PathBuf> {
    let source = paths::absolute(source);
    let directory = paths::absolute(directory);
    if paths::is_within(&source, &directory) {
        return Ok(source);
    }

    let file_name = source
        .file_name()
        .ok_or_else(|| SageError::io(&source, std::io::ErrorKind::InvalidInput.into()))?;
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = Path::new(file_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut input = std::fs::File::open(&source).map_err(|e| SageError::io(&source, e))?;
    let mut counter = 0u32;
    loop {
        let candidate = if counter == 0 {
            directory.join(file_name)
        } else {
            directory.join(format!("{stem}_{counter}{extension}"))
        };
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut target) => {
                if let Err(e) = std::io::copy(&mut input, &mut target) {
                    drop(target);
                    let _ = std::fs::remove_file(&candidate);
                    return Err(SageError::io(&candidate, e));
                }
                log::info!("Copied {} to {}", source.display(), candidate.display());
                return Ok(candidate);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => counter += 1,
            Err(e) => return Err(SageError::io(&candidate, e)),
        }
    }
}

/// Build a unique file name for a generated image, e.g.
/// `next_sprite_walk_2025_05_01_12_30_00_123_1a2b3c.png`.
pub fn generated_file_name(prefix: &str, hint: &str) -> String {
    let safe: String = hint
        .chars()
        .take(20)
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let timestamp = chrono::Local::now().format("%Y_%m_%d_%H_%M_%S_%3f");
    let suffix = &uuid::Uuid::new_v4().simple().to_string()[..6];
    format!("{prefix}_{safe}_{timestamp}_{suffix}.png")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_avoids_collisions() {
        let outside = TempDir::new().unwrap();
        let sprite_dir = TempDir::new().unwrap();
        let source = outside.path().join("run.png");
        std::fs::write(&source, b"frame").unwrap();
        std::fs::write(sprite_dir.path().join("run.png"), b"existing").unwrap();

        let first = copy_into_directory(&source, sprite_dir.path()).unwrap();
        let second = copy_into_directory(&source, sprite_dir.path()).unwrap();

        assert_eq!(first, sprite_dir.path().join("run_1.png"));
        assert_eq!(second, sprite_dir.path().join("run_2.png"));
        assert_eq!(std::fs::read(&first).unwrap(), b"frame");
        assert_eq!(
            std::fs::read(sprite_dir.path().join("run.png")).unwrap(),
            b"existing"
        );
    }

    #[test]
    fn test_copy_keeps_files_already_inside() {
        let sprite_dir = TempDir::new().unwrap();
        let inside = sprite_dir.path().join("idle.png");
        std::fs::write(&inside, b"frame").unwrap();

        let result = copy_into_directory(&inside, sprite_dir.path()).unwrap();
        assert_eq!(result, inside);
        assert_eq!(std::fs::read_dir(sprite_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_copy_missing_source_cleans_up() {
        let sprite_dir = TempDir::new().unwrap();
        let err = copy_into_directory(Path::new("/definitely/not/here.png"), sprite_dir.path());
        assert!(err.is_err());
        assert_eq!(std::fs::read_dir(sprite_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_generated_name_is_sanitized() {
        let name = generated_file_name("between_sprite", "jump attack!");
        assert!(name.starts_with("between_sprite_jump_attack__"));
        assert!(name.ends_with(".png"));
        assert_ne!(name, generated_file_name("between_sprite", "jump attack!"));
        assert!(is_image_file(Path::new(&name)));
        assert!(!is_image_file(Path::new("notes.txt")));
    }
}
