// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project and sprite serialization and deserialization.
//!
//! On disk every path is stored relative to the project directory; in
//! memory every path is absolute. The `*Record` types mirror the JSON
//! layout exactly and never leave this module.

use crate::error::{Result, SageError};
use crate::models::project::{SageFile, REFERENCE_IMAGE_SLOTS};
use crate::models::sprite::{Animation, SpriteFile};
use crate::util::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct SageRecord {
    #[serde(rename = "Project Name")]
    project_name: String,
    version: String,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "Project Description")]
    project_description: String,
    #[serde(rename = "Keywords")]
    keywords: String,
    #[serde(rename = "Camera")]
    camera: String,
    #[serde(rename = "Reference Images")]
    reference_images: Vec<String>,
    #[serde(rename = "lastSaved")]
    last_saved: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpriteRecord {
    uuid: String,
    name: String,
    description: String,
    width: u32,
    height: u32,
    base_image: Option<String>,
    animations: BTreeMap<String, Vec<String>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Project (.sage) files
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a `.sage` document owned by `filepath`.
pub fn sage_from_json(json: &str, filepath: &Path) -> serde_json::Result<SageFile> {
    let record: SageRecord = serde_json::from_str(json)?;
    let mut sage = SageFile {
        project_name: record.project_name,
        version: record.version,
        created_at: record.created_at,
        project_description: record.project_description,
        keywords: record.keywords,
        camera: record.camera,
        reference_images: Default::default(),
        last_saved: record.last_saved,
        filepath: filepath.to_path_buf(),
    };
    let directory = sage.directory().to_path_buf();
    for (slot, stored) in sage
        .reference_images
        .iter_mut()
        .zip(record.reference_images.iter())
    {
        *slot = stored_to_optional(&directory, stored);
    }
    Ok(sage)
}

/// Serialize a project with paths relative to its directory.
pub fn sage_to_json(sage: &SageFile) -> serde_json::Result<String> {
    let directory = sage.directory();
    let reference_images = sage
        .reference_images
        .iter()
        .map(|slot| match slot {
            Some(path) => paths::store(path, directory),
            None => String::new(),
        })
        .collect::<Vec<_>>();
    debug_assert_eq!(reference_images.len(), REFERENCE_IMAGE_SLOTS);

    let record = SageRecord {
        project_name: sage.project_name.clone(),
        version: sage.version.clone(),
        created_at: sage.created_at.clone(),
        project_description: sage.project_description.clone(),
        keywords: sage.keywords.clone(),
        camera: sage.camera.clone(),
        reference_images,
        last_saved: sage.last_saved.clone(),
    };
    serde_json::to_string_pretty(&record)
}

/// Load a project file from disk.
pub fn load_sage(path: &Path) -> Result<SageFile> {
    let path = paths::absolute(path);
    let json = std::fs::read_to_string(&path).map_err(|e| SageError::io(&path, e))?;
    sage_from_json(&json, &path).map_err(|e| SageError::json(&path, e))
}

/// Stamp `lastSaved` and write the whole project file.
pub fn save_sage(sage: &mut SageFile) -> Result<()> {
    sage.update_last_saved();
    let json = sage_to_json(sage).map_err(|e| SageError::json(&sage.filepath, e))?;
    std::fs::write(&sage.filepath, json).map_err(|e| SageError::io(&sage.filepath, e))?;
    log::info!("Saved project {}", sage.filepath.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Sprite (.sprite) files
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a `.sprite` document, resolving paths against `sage_directory`.
pub fn sprite_from_json(json: &str, sage_directory: &Path) -> serde_json::Result<SpriteFile> {
    let record: SpriteRecord = serde_json::from_str(json)?;
    let animations = record
        .animations
        .into_iter()
        .map(|(name, frames)| {
            let frames = frames
                .iter()
                .map(|f| paths::resolve(sage_directory, f))
                .collect();
            (name.clone(), Animation { name, frames })
        })
        .collect();

    Ok(SpriteFile {
        uuid: record.uuid,
        name: record.name,
        description: record.description,
        width: record.width,
        height: record.height,
        base_image: record
            .base_image
            .as_deref()
            .and_then(|b| stored_to_optional(sage_directory, b)),
        animations,
    })
}

/// Serialize a sprite with paths relative to `sage_directory`.
pub fn sprite_to_json(sprite: &SpriteFile, sage_directory: &Path) -> serde_json::Result<String> {
    let record = SpriteRecord {
        uuid: sprite.uuid.clone(),
        name: sprite.name.clone(),
        description: sprite.description.clone(),
        width: sprite.width,
        height: sprite.height,
        base_image: sprite
            .base_image
            .as_ref()
            .map(|b| paths::store(b, sage_directory)),
        animations: sprite
            .animations
            .iter()
            .map(|(name, animation)| {
                let frames = animation
                    .frames
                    .iter()
                    .map(|f| paths::store(f, sage_directory))
                    .collect();
                (name.clone(), frames)
            })
            .collect(),
    };
    serde_json::to_string_pretty(&record)
}

/// Load a sprite file from disk.
pub fn load_sprite(path: &Path, sage_directory: &Path) -> Result<SpriteFile> {
    let json = std::fs::read_to_string(path).map_err(|e| SageError::io(path, e))?;
    let sprite = sprite_from_json(&json, sage_directory).map_err(|e| SageError::json(path, e))?;
    log::debug!(
        "Loaded sprite '{}' with {} animation(s) from {}",
        sprite.name,
        sprite.animations.len(),
        path.display()
    );
    Ok(sprite)
}

/// Write the whole sprite file.
pub fn save_sprite(sprite: &SpriteFile, path: &Path, sage_directory: &Path) -> Result<()> {
    let json = sprite_to_json(sprite, sage_directory).map_err(|e| SageError::json(path, e))?;
    std::fs::write(path, json).map_err(|e| SageError::io(path, e))?;
    log::info!("Saved sprite {}", path.display());
    Ok(())
}

/// Empty strings and the directory itself (`.`) both mean "no image".
fn stored_to_optional(directory: &Path, stored: &str) -> Option<PathBuf> {
    let stored = stored.trim();
    if stored.is_empty() {
        return None;
    }
    let resolved = paths::resolve(directory, stored);
    if resolved == paths::normalize(directory) {
        None
    } else {
        Some(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_sprite(dir: &Path) -> SpriteFile {
        let mut sprite = SpriteFile::new("knight");
        sprite.description = "A small knight".into();
        sprite.width = 64;
        sprite.height = 32;
        sprite.base_image = Some(dir.join("knight.png"));
        let mut walk = Animation::new("walk");
        walk.frames = vec![dir.join("frames/walk_1.png"), dir.join("walk_2.png")];
        sprite.animations.insert("walk".into(), walk);
        sprite.animations.insert("idle".into(), Animation::new("idle"));
        sprite
    }

    #[test]
    fn test_sprite_json_uses_relative_paths() {
        let dir = Path::new("/projects/knight");
        let json = sprite_to_json(&sample_sprite(dir), dir).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["base_image"], "knight.png");
        assert_eq!(value["animations"]["walk"][0], "frames/walk_1.png");
        assert_eq!(value["animations"]["idle"].as_array().unwrap().len(), 0);
        assert_eq!(value["width"], 64);
    }

    #[test]
    fn test_sprite_roundtrip_is_stable() {
        let dir = Path::new("/projects/knight");
        let sprite = sample_sprite(dir);
        let first = sprite_to_json(&sprite, dir).unwrap();
        let reloaded = sprite_from_json(&first, dir).unwrap();
        let second = sprite_to_json(&reloaded, dir).unwrap();

        assert_eq!(first, second);
        assert_eq!(reloaded, sprite);
    }

    #[test]
    fn test_sprite_null_base_image() {
        let json = r#"{"uuid":"u","name":"n","description":"","width":8,"height":8,
            "base_image":null,"animations":{}}"#;
        let sprite = sprite_from_json(json, Path::new("/p")).unwrap();
        assert!(sprite.base_image.is_none());
        assert!(sprite.animations.is_empty());
    }

    #[test]
    fn test_sage_roundtrip_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("knight.sage");
        let mut sage = SageFile::new("knight", &path);
        sage.keywords = "pixel, fantasy".into();
        sage.reference_images[1] = Some(dir.path().join("refs/castle.png"));

        save_sage(&mut sage).unwrap();
        assert!(!sage.last_saved.is_empty());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            raw["Reference Images"],
            serde_json::json!(["", "refs/castle.png", "", ""])
        );
        assert_eq!(raw["Project Name"], "knight");

        let loaded = load_sage(&path).unwrap();
        assert_eq!(loaded.reference_images, sage.reference_images);
        assert_eq!(loaded.keywords, sage.keywords);
    }

    #[test]
    fn test_sage_dot_slot_reads_as_empty() {
        let json = r#"{"Project Name":"p","Reference Images":[".","","a.png"]}"#;
        let sage = sage_from_json(json, Path::new("/projects/p/p.sage")).unwrap();
        assert!(sage.reference_images[0].is_none());
        assert!(sage.reference_images[1].is_none());
        assert_eq!(
            sage.reference_images[2].as_deref(),
            Some(Path::new("/projects/p/a.png"))
        );
        assert!(sage.reference_images[3].is_none());
        assert_eq!(sage.camera, "");
    }

    #[test]
    fn test_load_missing_sprite_reports_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("ghost.sprite");
        let err = load_sprite(&missing, dir.path()).unwrap_err();
        assert!(matches!(err, SageError::Io { ref path, .. } if path == &missing));
    }
}
