// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project (`.sage`) editing.
//!
//! Mirrors the sprite engine: each edit records an undo snapshot of the
//! whole project and saves it immediately.

use crate::error::{GenerationError, Result, SageError, ValidationError};
use crate::generation::{
    DescriptionRequest, GenerationBackend, GenerationContext, GenerationResult, KeywordsRequest,
    ReferenceImageRequest,
};
use crate::history::UndoRedoManager;
use crate::io::{media, serialization};
use crate::models::project::{SageFile, REFERENCE_IMAGE_SLOTS, SAGE_FILE_EXTENSION};
use crate::models::sprite::{SpriteFile, SPRITE_FILE_EXTENSION};
use crate::util::paths;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sub-directory reference images are copied into.
pub const REFERENCE_IMAGE_DIR: &str = "reference_images";

/// Create `<dir>/<dir name>.sage` from the empty template.
///
/// The directory is created if needed; an existing project file is never
/// overwritten.
pub fn create_project(directory: &Path) -> Result<SageFile> {
    let directory = paths::absolute(directory);
    std::fs::create_dir_all(&directory).map_err(|e| SageError::io(&directory, e))?;
    let name = directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    let path = directory.join(format!("{name}.{SAGE_FILE_EXTENSION}"));

    let sage = SageFile::new(name, &path);
    let json = serialization::sage_to_json(&sage).map_err(|e| SageError::json(&path, e))?;
    write_new(&path, &json)?;
    log::info!("Created project file: {}", path.display());
    Ok(sage)
}

pub fn open_project(path: &Path) -> Result<SageFile> {
    let sage = serialization::load_sage(path)?;
    log::info!("Opened project '{}' from {}", sage.project_name, sage.filepath.display());
    Ok(sage)
}

/// Every `.sprite` file under the project directory, relative and sorted.
pub fn list_sprites(project: &SageFile) -> Vec<String> {
    let mut sprites = Vec::new();
    let mut pending = vec![project.directory().to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot search {} for sprites: {}", dir.display(), e);
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(SPRITE_FILE_EXTENSION))
            {
                sprites.push(paths::store(&path, project.directory()));
            }
        }
    }
    sprites.sort();
    sprites
}

/// Create an empty sprite file `<name>.sprite` in the project directory.
///
/// A trailing `.sprite` in `name` is ignored. Returns the new file's path.
pub fn create_sprite(project: &SageFile, name: &str) -> Result<PathBuf> {
    let mut name = name.trim();
    let suffix = format!(".{SPRITE_FILE_EXTENSION}");
    if name.to_ascii_lowercase().ends_with(&suffix) {
        name = &name[..name.len() - suffix.len()];
    }
    if name.is_empty() {
        return Err(ValidationError::EmptySpriteName.into());
    }
    // The file must land directly in the project directory
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ValidationError::InvalidSpriteName(name.to_string()).into());
    }

    let path = project.directory().join(format!("{name}{suffix}"));
    let sprite = SpriteFile::new(name);
    let json = serialization::sprite_to_json(&sprite, project.directory())
        .map_err(|e| SageError::json(&path, e))?;
    write_new(&path, &json)?;
    log::info!("Created sprite file: {}", path.display());
    Ok(path)
}

fn write_new(path: &Path, contents: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| -> SageError {
            match e.kind() {
                std::io::ErrorKind::AlreadyExists => ValidationError::AlreadyExists(path.to_path_buf()).into(),
                _ => SageError::io(path, e),
            }
        })?;
    file.write_all(contents.as_bytes())
        .map_err(|e| SageError::io(path, e))
}

/// Editor for the open project.
pub struct SageEditor {
    sage: Option<SageFile>,
    history: UndoRedoManager<SageFile>,
}

impl Default for SageEditor {
    fn default() -> Self {
        Self::new(crate::history::MAX_UNDO_COUNT)
    }
}

impl SageEditor {
    pub fn new(max_undo_count: usize) -> Self {
        Self {
            sage: None,
            history: UndoRedoManager::new(max_undo_count),
        }
    }

    pub fn sage(&self) -> Option<&SageFile> {
        self.sage.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Take ownership of an opened project. History is cleared when the
    /// project file changes.
    pub fn open(&mut self, sage: SageFile) {
        if self.sage.as_ref().map(|s| &s.filepath) != Some(&sage.filepath) {
            self.history.clear();
        }
        self.sage = Some(sage);
    }

    pub fn load(&mut self, path: &Path) -> Result<()> {
        match open_project(path) {
            Ok(sage) => {
                self.open(sage);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load project: {}", e);
                self.sage = None;
                self.history.clear();
                Err(e)
            }
        }
    }

    fn current(&self) -> Result<&SageFile> {
        self.sage.as_ref().ok_or(SageError::NotLoaded)
    }

    fn edit(&mut self, change: impl FnOnce(&mut SageFile) -> Result<()>) -> Result<()> {
        let mut draft = self.current()?.clone();
        change(&mut draft)?;
        let sage = self.sage.as_mut().ok_or(SageError::NotLoaded)?;
        if *sage == draft {
            return Ok(());
        }
        self.history.save_undo_state(sage);
        *sage = draft;
        serialization::save_sage(sage)
            .inspect_err(|e| log::error!("Edit kept in memory but not saved: {}", e))
    }

    pub fn set_project_name(&mut self, name: &str) -> Result<()> {
        self.edit(|sage| {
            sage.project_name = name.to_string();
            Ok(())
        })
    }

    pub fn set_description(&mut self, description: &str) -> Result<()> {
        self.edit(|sage| {
            sage.project_description = description.to_string();
            Ok(())
        })
    }

    pub fn set_keywords(&mut self, keywords: &str) -> Result<()> {
        self.edit(|sage| {
            sage.keywords = keywords.to_string();
            Ok(())
        })
    }

    pub fn set_camera(&mut self, camera: &str) -> Result<()> {
        self.edit(|sage| {
            sage.camera = camera.to_string();
            Ok(())
        })
    }

    /// Fill or clear a reference slot. Images are copied into the
    /// project's reference image directory unless already inside it.
    pub fn set_reference_image(&mut self, slot: usize, image: Option<&Path>) -> Result<()> {
        if slot >= REFERENCE_IMAGE_SLOTS {
            return Err(ValidationError::InvalidReferenceSlot(slot).into());
        }
        let stored = match image {
            Some(image) => {
                let target = self.current()?.directory().join(REFERENCE_IMAGE_DIR);
                std::fs::create_dir_all(&target).map_err(|e| SageError::io(&target, e))?;
                Some(media::copy_into_directory(image, &target)?)
            }
            None => None,
        };
        self.edit(|sage| {
            sage.reference_images[slot] = stored;
            Ok(())
        })
    }

    fn context(&self) -> Result<GenerationContext> {
        let sage = self.current()?;
        Ok(GenerationContext {
            description: sage.project_description.clone(),
            keywords: sage.keywords.clone(),
            camera: sage.camera.clone(),
            animation_name: String::new(),
        })
    }

    /// Request for a new image in `slot`, using the other slots as context.
    pub fn plan_reference_image(&self, slot: usize) -> Result<ReferenceImageRequest> {
        if slot >= REFERENCE_IMAGE_SLOTS {
            return Err(ValidationError::InvalidReferenceSlot(slot).into());
        }
        let context = self.context()?;
        if context.is_blank() {
            return Err(ValidationError::MissingContext.into());
        }
        let sage = self.current()?;
        Ok(ReferenceImageRequest {
            context,
            images: sage.reference_image_abs_paths(Some(slot)),
            output_folder: sage.directory().to_path_buf(),
        })
    }

    pub fn finish_reference_image(&mut self, slot: usize, result: GenerationResult<PathBuf>) -> Result<()> {
        let image = result.inspect_err(|e| log::error!("Reference image generation failed: {}", e))?;
        if !image.is_file() {
            log::error!("Generated reference image is missing: {}", image.display());
            return Err(GenerationError::EmptyResult.into());
        }
        self.set_reference_image(slot, Some(image.as_path()))
    }

    pub fn generate_reference_image(&mut self, slot: usize, backend: &dyn GenerationBackend) -> Result<()> {
        let request = self.plan_reference_image(slot)?;
        let result = backend.generate_reference_image(&request);
        self.finish_reference_image(slot, result)
    }

    pub fn plan_description(&self) -> Result<DescriptionRequest> {
        let sage = self.current()?;
        Ok(DescriptionRequest {
            keywords: sage.keywords.clone(),
            images: sage.reference_image_abs_paths(None),
        })
    }

    pub fn plan_keywords(&self) -> Result<KeywordsRequest> {
        let sage = self.current()?;
        Ok(KeywordsRequest {
            project_description: sage.project_description.clone(),
            images: sage.reference_image_abs_paths(None),
        })
    }

    pub fn finish_description(&mut self, result: GenerationResult<String>) -> Result<()> {
        let description = result.inspect_err(|e| log::error!("Description generation failed: {}", e))?;
        self.set_description(description.trim())
    }

    pub fn finish_keywords(&mut self, result: GenerationResult<String>) -> Result<()> {
        let keywords = result.inspect_err(|e| log::error!("Keyword generation failed: {}", e))?;
        self.set_keywords(keywords.trim())
    }

    /// Replace the project description with a generated one.
    pub fn generate_description(&mut self, backend: &dyn GenerationBackend) -> Result<()> {
        let request = self.plan_description()?;
        let result = backend.generate_description(&request);
        self.finish_description(result)
    }

    /// Replace the keywords with generated ones.
    pub fn generate_keywords(&mut self, backend: &dyn GenerationBackend) -> Result<()> {
        let request = self.plan_keywords()?;
        let result = backend.generate_keywords(&request);
        self.finish_keywords(result)
    }

    pub fn undo(&mut self) -> Result<bool> {
        let current = self.current()?.clone();
        match self.history.perform_undo(&current) {
            Some(previous) => self.restore(previous).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn redo(&mut self) -> Result<bool> {
        let current = self.current()?.clone();
        match self.history.perform_redo(&current) {
            Some(next) => self.restore(next).map(|_| true),
            None => Ok(false),
        }
    }

    /// Persist `state` and reload the project from disk.
    fn restore(&mut self, mut state: SageFile) -> Result<()> {
        serialization::save_sage(&mut state)?;
        self.sage = Some(serialization::load_sage(&state.filepath)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::testing::TestingBackend;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn project() -> (TempDir, SageEditor) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("castle");
        let sage = create_project(&root).unwrap();
        let mut editor = SageEditor::new(50);
        editor.open(sage);
        (dir, editor)
    }

    fn image(path: &Path) {
        RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])).save(path).unwrap();
    }

    #[test]
    fn test_create_project_from_template() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("castle");
        let sage = create_project(&root).unwrap();

        assert_eq!(sage.filepath, root.join("castle.sage"));
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&sage.filepath).unwrap()).unwrap();
        assert_eq!(raw["Project Name"], "castle");
        assert_eq!(raw["version"], "1.0");
        assert_eq!(raw["Reference Images"], serde_json::json!(["", "", "", ""]));
        assert!(!raw["createdAt"].as_str().unwrap().is_empty());

        let err = create_project(&root).unwrap_err();
        assert!(matches!(err, SageError::Validation(ValidationError::AlreadyExists(_))));
    }

    #[test]
    fn test_create_and_list_sprites() {
        let (_dir, editor) = project();
        let sage = editor.sage().unwrap();

        let path = create_sprite(sage, "knight.sprite").unwrap();
        assert_eq!(path, sage.directory().join("knight.sprite"));
        create_sprite(sage, "archer").unwrap();
        std::fs::create_dir(sage.directory().join("enemies")).unwrap();
        std::fs::write(sage.directory().join("enemies/slime.sprite"), "{}").unwrap();
        std::fs::write(sage.directory().join("notes.txt"), "").unwrap();

        assert_eq!(
            list_sprites(sage),
            vec!["archer.sprite", "enemies/slime.sprite", "knight.sprite"]
        );
        let sprite = serialization::load_sprite(&path, sage.directory()).unwrap();
        assert_eq!((sprite.width, sprite.height), (256, 256));
        assert!(sprite.base_image.is_none() && sprite.animations.is_empty());

        assert!(matches!(
            create_sprite(sage, "knight"),
            Err(SageError::Validation(ValidationError::AlreadyExists(_)))
        ));
    }

    #[test]
    fn test_create_sprite_rejects_path_names() {
        let (dir, editor) = project();
        let sage = editor.sage().unwrap();

        for name in ["../escaped", "sub/knight", "sub\\knight", "..", "../escaped.sprite"] {
            assert!(
                matches!(
                    create_sprite(sage, name),
                    Err(SageError::Validation(ValidationError::InvalidSpriteName(_)))
                ),
                "{name} should be rejected"
            );
        }
        assert!(!dir.path().join("escaped.sprite").exists());
        assert!(list_sprites(sage).is_empty());
    }

    #[test]
    fn test_metadata_edits_undo() {
        let (_dir, mut editor) = project();
        editor.set_description("A haunted castle").unwrap();
        editor.set_keywords("gothic, pixel").unwrap();
        editor.set_keywords("gothic, pixel").unwrap();

        assert!(editor.undo().unwrap());
        assert_eq!(editor.sage().unwrap().keywords, "");
        assert!(editor.undo().unwrap());
        assert_eq!(editor.sage().unwrap().project_description, "");
        assert!(!editor.undo().unwrap());
        assert!(editor.redo().unwrap());

        let saved = serialization::load_sage(&editor.sage().unwrap().filepath).unwrap();
        assert_eq!(saved.project_description, "A haunted castle");
    }

    #[test]
    fn test_reference_slot_copies_image() {
        let (dir, mut editor) = project();
        let external = dir.path().join("tower.png");
        image(&external);

        editor.set_reference_image(2, Some(external.as_path())).unwrap();
        let sage = editor.sage().unwrap();
        let stored = sage.reference_images[2].clone().unwrap();
        assert_eq!(stored, sage.directory().join("reference_images/tower.png"));
        assert_eq!(sage.reference_image_abs_paths(Some(2)), Vec::<PathBuf>::new());
        assert_eq!(sage.reference_image_abs_paths(None), vec![stored]);

        assert!(matches!(
            editor.set_reference_image(4, None),
            Err(SageError::Validation(ValidationError::InvalidReferenceSlot(4)))
        ));
        editor.set_reference_image(2, None).unwrap();
        assert!(editor.sage().unwrap().reference_images[2].is_none());
    }

    #[test]
    fn test_reference_generation_needs_context() {
        let (_dir, mut editor) = project();
        assert!(matches!(
            editor.generate_reference_image(0, &TestingBackend),
            Err(SageError::Validation(ValidationError::MissingContext))
        ));

        editor.set_keywords("gothic").unwrap();
        editor.generate_reference_image(0, &TestingBackend).unwrap();
        let slot = editor.sage().unwrap().reference_images[0].clone().unwrap();
        assert!(slot.is_file());
        assert!(slot.starts_with(editor.sage().unwrap().directory().join(REFERENCE_IMAGE_DIR)));
    }

    #[test]
    fn test_generated_text_fields() {
        let (_dir, mut editor) = project();
        editor.generate_description(&TestingBackend).unwrap();
        editor.generate_keywords(&TestingBackend).unwrap();
        let sage = editor.sage().unwrap();
        assert_eq!(sage.project_description, "Project description from TESTING (placeholder)");
        assert_eq!(sage.keywords, "testing_keyword1,testing_keyword2,testing_keyword3");
    }

    #[test]
    fn test_unloaded_editor() {
        let mut editor = SageEditor::default();
        assert!(matches!(editor.set_camera("top-down"), Err(SageError::NotLoaded)));
        assert!(matches!(editor.undo(), Err(SageError::NotLoaded)));
        assert!(editor.load(Path::new("/no/such/project.sage")).is_err());
        assert!(editor.sage().is_none());
    }
}
