// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame-sequence editing engine for one open sprite.
//!
//! Every mutation works on a draft copy of the sprite. Validation failures
//! leave the document untouched; a successful edit saves the pre-edit
//! snapshot for undo, replaces the document and writes it to disk. If the
//! write fails the edit stays in memory and the error is returned.
//!
//! Generation calls are the only suspend point. Callers either use the
//! blocking helpers (`add_generated_frame`, `generate_base_image`) or split
//! the work: `plan_*`, then [`SpriteEditor::begin_generation`], run the
//! request on a worker, then `finish_*` with the result. While a request is
//! outstanding every other edit is rejected with
//! [`SageError::GenerationPending`].

use crate::error::{GenerationError, Result, SageError, ValidationError};
use crate::generation::{
    AnimationSuggestionRequest, BaseSpriteRequest, BetweenImagesRequest, GenerationBackend,
    GenerationContext, GenerationResult, NextImageRequest,
};
use crate::history::UndoRedoManager;
use crate::io::{media, serialization};
use crate::models::project::SageFile;
use crate::models::sprite::{Animation, SpriteFile};
use crate::util::paths;
use std::path::{Path, PathBuf};

/// Lifecycle of the open sprite document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Unloaded,
    Clean,
    /// A generation request is outstanding
    Pending,
}

/// Where a generated frame goes relative to the selected frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// The backend call needed to produce one new frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameRequest {
    Next(NextImageRequest),
    Between(BetweenImagesRequest),
}

impl FrameRequest {
    pub fn execute(&self, backend: &dyn GenerationBackend) -> GenerationResult<PathBuf> {
        match self {
            FrameRequest::Next(request) => backend.generate_next_image(request),
            FrameRequest::Between(request) => backend.generate_between_images(request),
        }
    }

    /// Input images in the order they are sent.
    pub fn inputs(&self) -> Vec<&Path> {
        match self {
            FrameRequest::Next(request) => vec![request.image.as_path()],
            FrameRequest::Between(request) => vec![request.first.as_path(), request.second.as_path()],
        }
    }
}

/// A generated frame waiting to be produced and inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePlan {
    pub animation: String,
    pub insert_index: usize,
    pub request: FrameRequest,
}

struct Document {
    sprite: SpriteFile,
    path: PathBuf,
    /// Directory stored paths are relative to
    sage_directory: PathBuf,
}

impl Document {
    /// Directory frames are copied into.
    fn directory(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.sage_directory.clone())
    }
}

/// Editing engine for a single sprite file.
pub struct SpriteEditor {
    document: Option<Document>,
    /// Project metadata used as generation context
    project: Option<SageFile>,
    history: UndoRedoManager<SpriteFile>,
    pending: bool,
}

impl Default for SpriteEditor {
    fn default() -> Self {
        Self::new(crate::history::MAX_UNDO_COUNT)
    }
}

impl SpriteEditor {
    pub fn new(max_undo_count: usize) -> Self {
        Self {
            document: None,
            project: None,
            history: UndoRedoManager::new(max_undo_count),
            pending: false,
        }
    }

    pub fn state(&self) -> EditorState {
        match (&self.document, self.pending) {
            (None, _) => EditorState::Unloaded,
            (Some(_), false) => EditorState::Clean,
            (Some(_), true) => EditorState::Pending,
        }
    }

    pub fn sprite(&self) -> Option<&SpriteFile> {
        self.document.as_ref().map(|d| &d.sprite)
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.document.as_ref().map(|d| d.path.as_path())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Refresh the generation context after the project was edited.
    pub fn set_project(&mut self, project: &SageFile) {
        self.project = Some(project.clone());
    }

    /// Open a sprite file belonging to `project`.
    ///
    /// History is kept when the same file is reloaded and cleared when a
    /// different file is opened. A file that fails to load leaves the
    /// editor unloaded.
    pub fn load(&mut self, path: &Path, project: &SageFile) -> Result<()> {
        if self.pending {
            return Err(SageError::GenerationPending);
        }
        let path = paths::absolute(path);
        if self.file_path() != Some(path.as_path()) {
            self.history.clear();
        }
        self.project = Some(project.clone());
        let sage_directory = project.directory().to_path_buf();

        match serialization::load_sprite(&path, &sage_directory) {
            Ok(sprite) => {
                log::info!("Opened sprite '{}' from {}", sprite.name, path.display());
                self.document = Some(Document {
                    sprite,
                    path,
                    sage_directory,
                });
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load sprite: {}", e);
                self.document = None;
                self.history.clear();
                Err(e)
            }
        }
    }

    pub fn close(&mut self) {
        self.document = None;
        self.history.clear();
        self.pending = false;
    }

    fn editable(&self) -> Result<&Document> {
        if self.pending {
            return Err(SageError::GenerationPending);
        }
        self.document.as_ref().ok_or(SageError::NotLoaded)
    }

    /// Replace the document with `updated`, recording undo and saving.
    fn commit(&mut self, updated: SpriteFile) -> Result<()> {
        let document = self.document.as_mut().ok_or(SageError::NotLoaded)?;
        if document.sprite == updated {
            return Ok(());
        }
        self.history.save_undo_state(&document.sprite);
        document.sprite = updated;
        serialization::save_sprite(&document.sprite, &document.path, &document.sage_directory)
            .inspect_err(|e| log::error!("Edit kept in memory but not saved: {}", e))
    }

    /// Apply `change` to a draft and commit it if it succeeds.
    fn edit<R>(&mut self, change: impl FnOnce(&mut SpriteFile) -> Result<R>) -> Result<R> {
        let mut draft = self.editable()?.sprite.clone();
        let output = change(&mut draft)?;
        self.commit(draft)?;
        Ok(output)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Metadata
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.edit(|sprite| {
            sprite.name = name.to_string();
            Ok(())
        })
    }

    pub fn set_description(&mut self, description: &str) -> Result<()> {
        self.edit(|sprite| {
            sprite.description = description.to_string();
            Ok(())
        })
    }

    /// Set the frame cell size used for packing.
    pub fn set_size(&mut self, width: u32, height: u32) -> Result<()> {
        self.edit(|sprite| {
            if width == 0 || height == 0 {
                return Err(ValidationError::InvalidDimensions.into());
            }
            sprite.width = width;
            sprite.height = height;
            Ok(())
        })
    }

    /// Replace (or clear) the base image. Animation frames are untouched.
    pub fn set_base_image(&mut self, path: Option<&Path>) -> Result<()> {
        let base_image = path.map(paths::absolute);
        self.edit(|sprite| {
            sprite.base_image = base_image;
            Ok(())
        })?;
        log::info!("Base image set to {:?}", path);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Animations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn add_animation(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        self.edit(|sprite| {
            if name.is_empty() {
                return Err(ValidationError::EmptyAnimationName.into());
            }
            if sprite.animations.contains_key(name) {
                return Err(ValidationError::DuplicateAnimationName(name.to_string()).into());
            }
            sprite
                .animations
                .insert(name.to_string(), Animation::new(name));
            Ok(())
        })?;
        log::info!("Added animation '{}'", name);
        Ok(())
    }

    /// Remove an animation. Confirmation is the caller's job.
    pub fn remove_animation(&mut self, name: &str) -> Result<()> {
        self.edit(|sprite| {
            sprite
                .animations
                .remove(name)
                .ok_or_else(|| ValidationError::UnknownAnimation(name.to_string()))?;
            Ok(())
        })?;
        log::info!("Removed animation '{}'", name);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frames
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert images into `animation` starting at `index`.
    ///
    /// Images outside the sprite directory are copied in first. Paths
    /// already in the animation are skipped. All inserted frames form one
    /// undo step. Returns the number of frames inserted.
    pub fn insert_frames(&mut self, animation: &str, index: usize, images: &[PathBuf]) -> Result<usize> {
        let document = self.editable()?;
        let len = animation_of(&document.sprite, animation)?.len();
        if index > len {
            return Err(ValidationError::IndexOutOfRange { index, len }.into());
        }

        let directory = document.directory();
        let copied = images
            .iter()
            .map(|image| media::copy_into_directory(image, &directory))
            .collect::<Result<Vec<_>>>()?;

        let mut draft = document.sprite.clone();
        let frames = &mut animation_of_mut(&mut draft, animation)?.frames;
        let mut at = index;
        for path in copied {
            if frames.contains(&path) {
                log::warn!("Skipping duplicate frame {}", path.display());
                continue;
            }
            frames.insert(at, path);
            at += 1;
        }

        let inserted = at - index;
        if inserted > 0 {
            self.commit(draft)?;
            log::info!("Inserted {} frame(s) into '{}' at index {}", inserted, animation, index);
        }
        Ok(inserted)
    }

    /// Remove every frame whose path matches one of `frames`.
    pub fn remove_frames(&mut self, animation: &str, frames: &[PathBuf]) -> Result<usize> {
        let removed = self.edit(|sprite| {
            let list = &mut animation_of_mut(sprite, animation)?.frames;
            let before = list.len();
            list.retain(|f| !frames.contains(f));
            Ok(before - list.len())
        })?;
        if removed == 0 {
            log::warn!("No matching frames found in '{}'", animation);
        } else {
            log::info!("Removed {} frame(s) from '{}'", removed, animation);
        }
        Ok(removed)
    }

    /// Swap the frame at `index` with its predecessor.
    ///
    /// Returns the new index, or `None` for the first frame (no change, no
    /// undo entry).
    pub fn move_frame_up(&mut self, animation: &str, index: usize) -> Result<Option<usize>> {
        let len = animation_of(&self.editable()?.sprite, animation)?.len();
        if index >= len {
            return Err(ValidationError::IndexOutOfRange { index, len }.into());
        }
        if index == 0 {
            return Ok(None);
        }
        self.edit(|sprite| {
            animation_of_mut(sprite, animation)?.frames.swap(index - 1, index);
            Ok(())
        })?;
        Ok(Some(index - 1))
    }

    /// Swap the frame at `index` with its successor.
    ///
    /// Returns the new index, or `None` for the last frame.
    pub fn move_frame_down(&mut self, animation: &str, index: usize) -> Result<Option<usize>> {
        let len = animation_of(&self.editable()?.sprite, animation)?.len();
        if index >= len {
            return Err(ValidationError::IndexOutOfRange { index, len }.into());
        }
        if index + 1 == len {
            return Ok(None);
        }
        self.edit(|sprite| {
            animation_of_mut(sprite, animation)?.frames.swap(index, index + 1);
            Ok(())
        })?;
        Ok(Some(index + 1))
    }

    /// Images to cycle in a preview: the base image, then the frames.
    /// Missing files are skipped.
    pub fn preview_frames(&self, animation: &str) -> Vec<PathBuf> {
        let Some(sprite) = self.sprite() else {
            return Vec::new();
        };
        sprite
            .base_image
            .iter()
            .chain(sprite.animation_frames(animation))
            .filter(|path| {
                let exists = path.is_file();
                if !exists {
                    log::warn!("Preview frame not found: {}", path.display());
                }
                exists
            })
            .cloned()
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Generation
    // ─────────────────────────────────────────────────────────────────────────

    fn context(&self, animation: &str) -> GenerationContext {
        let project = self.project.as_ref();
        GenerationContext {
            description: project.map(|p| p.project_description.clone()).unwrap_or_default(),
            keywords: project.map(|p| p.keywords.clone()).unwrap_or_default(),
            camera: project.map(|p| p.camera.clone()).unwrap_or_default(),
            animation_name: animation.to_string(),
        }
    }

    /// Folder generated images are written to.
    fn output_folder(&self) -> Result<PathBuf> {
        let document = self.document.as_ref().ok_or(SageError::NotLoaded)?;
        Ok(self
            .project
            .as_ref()
            .map(|p| p.directory().to_path_buf())
            .unwrap_or_else(|| document.sage_directory.clone()))
    }

    /// Decide which backend call produces a frame next to `selection`.
    ///
    /// The base image acts as the frame before the first and after the last
    /// one. An empty animation always continues from the base image and
    /// inserts at 0. With no selection, `Before` uses the first frame and
    /// `After` the last.
    pub fn plan_generated_frame(
        &self,
        animation: &str,
        placement: Placement,
        selection: Option<usize>,
    ) -> Result<FramePlan> {
        let sprite = &self.editable()?.sprite;
        let frames = &animation_of(sprite, animation)?.frames;
        let base = || {
            sprite
                .base_image
                .clone()
                .ok_or(SageError::Validation(ValidationError::MissingBaseImage))
        };
        let context = self.context(animation);
        let output_folder = self.output_folder()?;
        let between = |first: PathBuf, second: PathBuf| {
            FrameRequest::Between(BetweenImagesRequest {
                context: context.clone(),
                first,
                second,
                output_folder: output_folder.clone(),
            })
        };

        let len = frames.len();
        if len == 0 {
            return Ok(FramePlan {
                animation: animation.to_string(),
                insert_index: 0,
                request: FrameRequest::Next(NextImageRequest {
                    context: context.clone(),
                    image: base()?,
                    output_folder: output_folder.clone(),
                }),
            });
        }

        let (insert_index, request) = match placement {
            Placement::Before => {
                let i = selection.unwrap_or(0);
                if i >= len {
                    return Err(ValidationError::IndexOutOfRange { index: i, len }.into());
                }
                let previous = if i == 0 { base()? } else { frames[i - 1].clone() };
                (i, between(previous, frames[i].clone()))
            }
            Placement::After => {
                let i = selection.unwrap_or(len - 1);
                if i >= len {
                    return Err(ValidationError::IndexOutOfRange { index: i, len }.into());
                }
                let next = if i == len - 1 { base()? } else { frames[i + 1].clone() };
                (i + 1, between(frames[i].clone(), next))
            }
        };

        Ok(FramePlan {
            animation: animation.to_string(),
            insert_index,
            request,
        })
    }

    /// Enter the pending state. Fails if an edit is not currently allowed.
    pub fn begin_generation(&mut self) -> Result<()> {
        self.editable()?;
        self.pending = true;
        Ok(())
    }

    fn end_generation<T>(&mut self, result: GenerationResult<T>) -> Result<T> {
        self.pending = false;
        result.map_err(|e| {
            log::error!("Generation failed: {}", e);
            SageError::Generation(e)
        })
    }

    /// Leave the pending state and insert the generated frame.
    ///
    /// A failed request leaves the document unchanged. Returns the index of
    /// the new frame.
    pub fn finish_generated_frame(&mut self, plan: &FramePlan, result: GenerationResult<PathBuf>) -> Result<usize> {
        let image = self.end_generation(result)?;
        if !image.is_file() {
            log::error!("Generated frame is missing: {}", image.display());
            return Err(GenerationError::EmptyResult.into());
        }
        self.insert_frames(&plan.animation, plan.insert_index, &[image])?;
        Ok(plan.insert_index)
    }

    /// Generate and insert one frame, blocking on the backend.
    pub fn add_generated_frame(
        &mut self,
        animation: &str,
        placement: Placement,
        selection: Option<usize>,
        backend: &dyn GenerationBackend,
    ) -> Result<usize> {
        let plan = self.plan_generated_frame(animation, placement, selection)?;
        self.begin_generation()?;
        let result = plan.request.execute(backend);
        self.finish_generated_frame(&plan, result)
    }

    /// Add an animation, then append `count` generated frames to it.
    ///
    /// Stops at the first failed generation; the animation and any frames
    /// already added are kept.
    pub fn add_animation_with_generated_frames(
        &mut self,
        name: &str,
        count: usize,
        backend: &dyn GenerationBackend,
    ) -> Result<()> {
        self.add_animation(name)?;
        let name = name.trim();
        for _ in 0..count {
            self.add_generated_frame(name, Placement::After, None, backend)?;
        }
        log::info!("Added animation '{}' with {} generated frame(s)", name, count);
        Ok(())
    }

    fn sprite_description(&self) -> Result<String> {
        let description = self.editable()?.sprite.description.trim().to_string();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription.into());
        }
        Ok(description)
    }

    /// Request for a new base image. Needs a sprite description.
    pub fn plan_base_image(&self) -> Result<BaseSpriteRequest> {
        Ok(BaseSpriteRequest {
            context: self.context(""),
            sprite_description: self.sprite_description()?,
            images: self
                .project
                .as_ref()
                .map(|p| p.reference_image_abs_paths(None))
                .unwrap_or_default(),
            output_folder: self.output_folder()?,
        })
    }

    pub fn finish_base_image(&mut self, result: GenerationResult<PathBuf>) -> Result<()> {
        let image = self.end_generation(result)?;
        self.set_base_image(Some(image.as_path()))
    }

    pub fn generate_base_image(&mut self, backend: &dyn GenerationBackend) -> Result<()> {
        let request = self.plan_base_image()?;
        self.begin_generation()?;
        let result = backend.generate_base_sprite_image(&request);
        self.finish_base_image(result)
    }

    /// Request for an animation name suggestion. Needs a sprite description.
    pub fn plan_animation_suggestion(&self) -> Result<AnimationSuggestionRequest> {
        let sprite = &self.editable()?.sprite;
        Ok(AnimationSuggestionRequest {
            context: self.context(""),
            sprite_description: self.sprite_description()?,
            existing_names: sprite.animation_names(),
        })
    }

    /// Ask the backend for an animation name. Does not modify the sprite.
    pub fn suggest_animation_name(&self, backend: &dyn GenerationBackend) -> Result<String> {
        let request = self.plan_animation_suggestion()?;
        let suggestion = clean_suggestion(&backend.generate_animation_suggestion(&request)?);
        if suggestion.is_empty() {
            return Err(GenerationError::EmptyResult.into());
        }
        Ok(suggestion)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────

    /// Restore the previous snapshot. Returns `false` when there is none.
    pub fn undo(&mut self) -> Result<bool> {
        let current = self.editable()?.sprite.clone();
        match self.history.perform_undo(&current) {
            Some(previous) => self.restore(previous).map(|_| true),
            None => Ok(false),
        }
    }

    /// Re-apply the next snapshot. Returns `false` when there is none.
    pub fn redo(&mut self) -> Result<bool> {
        let current = self.editable()?.sprite.clone();
        match self.history.perform_redo(&current) {
            Some(next) => self.restore(next).map(|_| true),
            None => Ok(false),
        }
    }

    /// Persist `state` and reload the document from disk.
    fn restore(&mut self, state: SpriteFile) -> Result<()> {
        let document = self.document.as_mut().ok_or(SageError::NotLoaded)?;
        document.sprite = state;
        serialization::save_sprite(&document.sprite, &document.path, &document.sage_directory)?;
        document.sprite = serialization::load_sprite(&document.path, &document.sage_directory)?;
        Ok(())
    }
}

/// Trim whitespace and underscores from a suggested animation name.
pub fn clean_suggestion(text: &str) -> String {
    text.trim().trim_matches('_').trim().to_string()
}

fn animation_of<'a>(sprite: &'a SpriteFile, name: &str) -> Result<&'a Animation> {
    sprite
        .animations
        .get(name)
        .ok_or_else(|| ValidationError::UnknownAnimation(name.to_string()).into())
}

fn animation_of_mut<'a>(sprite: &'a mut SpriteFile, name: &str) -> Result<&'a mut Animation> {
    sprite
        .animations
        .get_mut(name)
        .ok_or_else(|| ValidationError::UnknownAnimation(name.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::testing::TestingBackend;
    use crate::generation::{
        DescriptionRequest, KeywordsRequest, ReferenceImageRequest,
    };
    use image::{Rgba, RgbaImage};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records every frame request and answers with a fixed image.
    struct ScriptedBackend {
        answer: Option<PathBuf>,
        calls: Mutex<Vec<(&'static str, Vec<PathBuf>)>>,
    }

    impl ScriptedBackend {
        fn answering(answer: Option<PathBuf>) -> Self {
            Self {
                answer,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(&'static str, Vec<PathBuf>)> {
            self.calls.lock().unwrap().clone()
        }

        fn reply(&self, kind: &'static str, inputs: Vec<PathBuf>) -> GenerationResult<PathBuf> {
            self.calls.lock().unwrap().push((kind, inputs));
            self.answer.clone().ok_or(GenerationError::EmptyResult)
        }
    }

    impl GenerationBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "SCRIPTED"
        }

        fn generate_description(&self, _: &DescriptionRequest) -> GenerationResult<String> {
            Ok(String::new())
        }

        fn generate_keywords(&self, _: &KeywordsRequest) -> GenerationResult<String> {
            Ok(String::new())
        }

        fn generate_reference_image(&self, _: &ReferenceImageRequest) -> GenerationResult<PathBuf> {
            self.reply("reference", Vec::new())
        }

        fn generate_base_sprite_image(&self, _: &BaseSpriteRequest) -> GenerationResult<PathBuf> {
            self.reply("base", Vec::new())
        }

        fn generate_next_image(&self, request: &NextImageRequest) -> GenerationResult<PathBuf> {
            self.reply("next", vec![request.image.clone()])
        }

        fn generate_between_images(&self, request: &BetweenImagesRequest) -> GenerationResult<PathBuf> {
            self.reply("between", vec![request.first.clone(), request.second.clone()])
        }

        fn generate_animation_suggestion(&self, _: &AnimationSuggestionRequest) -> GenerationResult<String> {
            Ok("  _jump_attack_ \n".to_string())
        }
    }

    struct Fixture {
        dir: TempDir,
        project: SageFile,
        sprite_path: PathBuf,
    }

    impl Fixture {
        /// Project with a sprite holding `walk = [A, B, C]` and base image `X`.
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path().to_path_buf();
            let project = SageFile::new("test", root.join("test.sage"));

            let mut sprite = SpriteFile::new("knight");
            sprite.base_image = Some(Self::image(&root, "X.png"));
            let mut walk = Animation::new("walk");
            walk.frames = ["A.png", "B.png", "C.png"]
                .iter()
                .map(|name| Self::image(&root, name))
                .collect();
            sprite.animations.insert("walk".into(), walk);
            sprite.animations.insert("idle".into(), Animation::new("idle"));

            let sprite_path = root.join("knight.sprite");
            serialization::save_sprite(&sprite, &sprite_path, &root).unwrap();
            Self {
                dir,
                project,
                sprite_path,
            }
        }

        fn image(dir: &Path, name: &str) -> PathBuf {
            let path = dir.join(name);
            RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]))
                .save(&path)
                .unwrap();
            path
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn editor(&self) -> SpriteEditor {
            let mut editor = SpriteEditor::new(100);
            editor.load(&self.sprite_path, &self.project).unwrap();
            editor
        }

        fn frames(&self, editor: &SpriteEditor, animation: &str) -> Vec<PathBuf> {
            editor.sprite().unwrap().animation_frames(animation).to_vec()
        }

        fn saved(&self) -> SpriteFile {
            serialization::load_sprite(&self.sprite_path, self.dir.path()).unwrap()
        }
    }

    #[test]
    fn test_add_after_last_uses_base_image() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        let generated = Fixture::image(fx.dir.path(), "G.png");
        let backend = ScriptedBackend::answering(Some(generated.clone()));

        let index = editor
            .add_generated_frame("walk", Placement::After, Some(2), &backend)
            .unwrap();

        assert_eq!(backend.calls(), vec![("between", vec![fx.path("C.png"), fx.path("X.png")])]);
        assert_eq!(index, 3);
        assert_eq!(
            fx.frames(&editor, "walk"),
            vec![fx.path("A.png"), fx.path("B.png"), fx.path("C.png"), generated]
        );
        assert_eq!(editor.state(), EditorState::Clean);
    }

    #[test]
    fn test_add_before_first_uses_base_image() {
        let fx = Fixture::new();
        let editor = fx.editor();

        let plan = editor
            .plan_generated_frame("walk", Placement::Before, Some(0))
            .unwrap();
        assert_eq!(plan.insert_index, 0);
        assert_eq!(plan.request.inputs(), vec![fx.path("X.png"), fx.path("A.png")]);
    }

    #[test]
    fn test_interior_neighbours() {
        let fx = Fixture::new();
        let editor = fx.editor();

        let before = editor
            .plan_generated_frame("walk", Placement::Before, Some(2))
            .unwrap();
        assert_eq!(before.insert_index, 2);
        assert_eq!(before.request.inputs(), vec![fx.path("B.png"), fx.path("C.png")]);

        let after = editor
            .plan_generated_frame("walk", Placement::After, Some(0))
            .unwrap();
        assert_eq!(after.insert_index, 1);
        assert_eq!(after.request.inputs(), vec![fx.path("A.png"), fx.path("B.png")]);
    }

    #[test]
    fn test_no_selection_defaults() {
        let fx = Fixture::new();
        let editor = fx.editor();

        let before = editor.plan_generated_frame("walk", Placement::Before, None).unwrap();
        assert_eq!(before.insert_index, 0);
        let after = editor.plan_generated_frame("walk", Placement::After, None).unwrap();
        assert_eq!(after.insert_index, 3);
        assert_eq!(after.request.inputs(), vec![fx.path("C.png"), fx.path("X.png")]);
    }

    #[test]
    fn test_empty_animation_continues_from_base() {
        let fx = Fixture::new();
        let editor = fx.editor();

        for placement in [Placement::Before, Placement::After] {
            let plan = editor.plan_generated_frame("idle", placement, Some(5)).unwrap();
            assert_eq!(plan.insert_index, 0);
            assert!(matches!(plan.request, FrameRequest::Next(_)));
            assert_eq!(plan.request.inputs(), vec![fx.path("X.png")]);
        }
    }

    #[test]
    fn test_boundary_without_base_image_fails_early() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        editor.set_base_image(None).unwrap();
        let backend = ScriptedBackend::answering(None);

        let err = editor
            .add_generated_frame("walk", Placement::After, Some(2), &backend)
            .unwrap_err();
        assert!(matches!(err, SageError::Validation(ValidationError::MissingBaseImage)));
        assert!(backend.calls().is_empty());

        // Interior frames do not need the base image
        assert!(editor.plan_generated_frame("walk", Placement::After, Some(0)).is_ok());
    }

    #[test]
    fn test_failed_generation_leaves_document_unchanged() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        let backend = ScriptedBackend::answering(None);
        let before = editor.sprite().unwrap().clone();

        let err = editor
            .add_generated_frame("walk", Placement::Before, Some(1), &backend)
            .unwrap_err();

        assert!(matches!(err, SageError::Generation(GenerationError::EmptyResult)));
        assert_eq!(editor.sprite(), Some(&before));
        assert!(!editor.can_undo());
        assert_eq!(editor.state(), EditorState::Clean);
    }

    #[test]
    fn test_pending_state_blocks_edits() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        let plan = editor
            .plan_generated_frame("walk", Placement::After, Some(0))
            .unwrap();
        editor.begin_generation().unwrap();
        assert_eq!(editor.state(), EditorState::Pending);

        assert!(matches!(editor.add_animation("run"), Err(SageError::GenerationPending)));
        assert!(matches!(editor.undo(), Err(SageError::GenerationPending)));
        assert!(matches!(editor.begin_generation(), Err(SageError::GenerationPending)));

        let generated = Fixture::image(fx.dir.path(), "G.png");
        let index = editor.finish_generated_frame(&plan, Ok(generated.clone())).unwrap();
        assert_eq!(index, 1);
        assert_eq!(fx.frames(&editor, "walk")[1], generated);
        assert_eq!(editor.state(), EditorState::Clean);
    }

    #[test]
    fn test_missing_generated_frame_is_not_inserted() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        let before = editor.sprite().unwrap().clone();
        let plan = editor
            .plan_generated_frame("walk", Placement::After, Some(2))
            .unwrap();
        editor.begin_generation().unwrap();

        let err = editor
            .finish_generated_frame(&plan, Ok(fx.path("missing.png")))
            .unwrap_err();

        assert!(matches!(err, SageError::Generation(GenerationError::EmptyResult)));
        assert_eq!(editor.sprite(), Some(&before));
        assert!(!editor.can_undo());
        assert_eq!(editor.state(), EditorState::Clean);
    }

    #[test]
    fn test_move_boundaries_are_noops() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        let original = fx.frames(&editor, "walk");

        assert_eq!(editor.move_frame_up("walk", 0).unwrap(), None);
        assert_eq!(editor.move_frame_down("walk", 2).unwrap(), None);
        assert_eq!(fx.frames(&editor, "walk"), original);
        assert!(!editor.can_undo());

        assert_eq!(editor.move_frame_down("walk", 0).unwrap(), Some(1));
        assert_eq!(
            fx.frames(&editor, "walk"),
            vec![fx.path("B.png"), fx.path("A.png"), fx.path("C.png")]
        );
        assert!(editor.can_undo());
        assert!(matches!(
            editor.move_frame_up("walk", 3),
            Err(SageError::Validation(ValidationError::IndexOutOfRange { index: 3, len: 3 }))
        ));
    }

    #[test]
    fn test_duplicate_insert_is_skipped() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        let original = fx.frames(&editor, "walk");

        let inserted = editor.insert_frames("walk", 1, &[fx.path("C.png")]).unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(fx.frames(&editor, "walk"), original);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_insert_copies_external_images_in_one_step() {
        let fx = Fixture::new();
        let outside = TempDir::new().unwrap();
        let d = Fixture::image(outside.path(), "D.png");
        let e = Fixture::image(outside.path(), "A.png");
        let mut editor = fx.editor();

        let inserted = editor
            .insert_frames("walk", 1, &[d, fx.path("B.png"), e])
            .unwrap();

        // B is already present; the external A collides by name and gets a suffix
        assert_eq!(inserted, 2);
        assert_eq!(
            fx.frames(&editor, "walk"),
            vec![
                fx.path("A.png"),
                fx.path("D.png"),
                fx.path("A_1.png"),
                fx.path("B.png"),
                fx.path("C.png"),
            ]
        );
        assert!(fx.path("D.png").is_file());
        assert_eq!(fx.saved(), *editor.sprite().unwrap());

        assert!(editor.undo().unwrap());
        assert_eq!(fx.frames(&editor, "walk").len(), 3);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_insert_index_is_validated() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        let err = editor.insert_frames("walk", 4, &[fx.path("X.png")]).unwrap_err();
        assert!(matches!(
            err,
            SageError::Validation(ValidationError::IndexOutOfRange { index: 4, len: 3 })
        ));
        let err = editor.insert_frames("run", 0, &[]).unwrap_err();
        assert!(matches!(err, SageError::Validation(ValidationError::UnknownAnimation(_))));
    }

    #[test]
    fn test_animation_validation() {
        let fx = Fixture::new();
        let mut editor = fx.editor();

        assert!(matches!(
            editor.add_animation("  "),
            Err(SageError::Validation(ValidationError::EmptyAnimationName))
        ));
        assert!(matches!(
            editor.add_animation("walk"),
            Err(SageError::Validation(ValidationError::DuplicateAnimationName(_)))
        ));
        assert!(!editor.can_undo());

        editor.add_animation(" run ").unwrap();
        assert!(editor.sprite().unwrap().animations.contains_key("run"));
        editor.remove_animation("run").unwrap();
        assert!(matches!(
            editor.remove_animation("run"),
            Err(SageError::Validation(ValidationError::UnknownAnimation(_)))
        ));
        assert!(!fx.saved().animations.contains_key("run"));
    }

    #[test]
    fn test_remove_frames_by_identity() {
        let fx = Fixture::new();
        let mut editor = fx.editor();

        let removed = editor
            .remove_frames("walk", &[fx.path("A.png"), fx.path("C.png"), fx.path("Z.png")])
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(fx.frames(&editor, "walk"), vec![fx.path("B.png")]);

        // One commit for the whole selection
        assert!(editor.undo().unwrap());
        assert_eq!(fx.frames(&editor, "walk").len(), 3);
    }

    #[test]
    fn test_undo_redo_persist_to_disk() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        editor.add_animation("run").unwrap();
        editor.set_description("A brave knight").unwrap();

        assert!(editor.undo().unwrap());
        assert_eq!(fx.saved().description, "");
        assert!(fx.saved().animations.contains_key("run"));
        assert!(editor.undo().unwrap());
        assert!(!fx.saved().animations.contains_key("run"));
        assert!(!editor.undo().unwrap());

        assert!(editor.redo().unwrap());
        assert!(editor.redo().unwrap());
        assert_eq!(fx.saved().description, "A brave knight");
        assert!(!editor.redo().unwrap());

        assert!(editor.undo().unwrap());
        assert_eq!(editor.sprite().unwrap().description, "");
    }

    #[test]
    fn test_history_cleared_when_switching_sprite() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        editor.add_animation("run").unwrap();

        editor.load(&fx.sprite_path, &fx.project).unwrap();
        assert!(editor.can_undo());

        let other = fx.path("other.sprite");
        serialization::save_sprite(&SpriteFile::new("other"), &other, fx.dir.path()).unwrap();
        editor.load(&other, &fx.project).unwrap();
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_failed_load_unloads() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        std::fs::write(fx.path("broken.sprite"), "{").unwrap();

        assert!(editor.load(&fx.path("broken.sprite"), &fx.project).is_err());
        assert_eq!(editor.state(), EditorState::Unloaded);
        assert!(matches!(editor.add_animation("run"), Err(SageError::NotLoaded)));
    }

    #[test]
    fn test_save_failure_keeps_edit_in_memory() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        // Replace the sprite file with a directory so the write fails
        std::fs::remove_file(&fx.sprite_path).unwrap();
        std::fs::create_dir(&fx.sprite_path).unwrap();

        let err = editor.add_animation("run").unwrap_err();
        assert!(matches!(err, SageError::Io { .. }));
        assert!(editor.sprite().unwrap().animations.contains_key("run"));
    }

    #[test]
    fn test_set_size_validation() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        assert!(matches!(
            editor.set_size(0, 32),
            Err(SageError::Validation(ValidationError::InvalidDimensions))
        ));
        editor.set_size(64, 32).unwrap();
        assert_eq!((fx.saved().width, fx.saved().height), (64, 32));
    }

    #[test]
    fn test_base_image_generation_needs_description() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        let backend = TestingBackend;

        assert!(matches!(
            editor.generate_base_image(&backend),
            Err(SageError::Validation(ValidationError::EmptyDescription))
        ));

        editor.set_description("knight in armour").unwrap();
        editor.generate_base_image(&backend).unwrap();
        let base = editor.sprite().unwrap().base_image.clone().unwrap();
        assert!(base.is_file());
        assert!(base.starts_with(fx.dir.path()));
        assert_eq!(editor.state(), EditorState::Clean);
    }

    #[test]
    fn test_animation_suggestion_is_cleaned() {
        let fx = Fixture::new();
        let mut editor = fx.editor();
        editor.set_description("knight").unwrap();
        let backend = ScriptedBackend::answering(None);

        assert_eq!(editor.suggest_animation_name(&backend).unwrap(), "jump_attack");
        assert_eq!(clean_suggestion(" __ "), "");
    }

    #[test]
    fn test_add_animation_with_generated_frames() {
        let fx = Fixture::new();
        let mut editor = fx.editor();

        editor
            .add_animation_with_generated_frames("jump", 3, &TestingBackend)
            .unwrap();

        let frames = fx.frames(&editor, "jump");
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.is_file()));
        assert_eq!(fx.saved().animation_frames("jump"), frames.as_slice());
    }

    #[test]
    fn test_preview_starts_with_base_and_skips_missing() {
        let fx = Fixture::new();
        let editor = fx.editor();
        std::fs::remove_file(fx.path("B.png")).unwrap();

        assert_eq!(
            editor.preview_frames("walk"),
            vec![fx.path("X.png"), fx.path("A.png"), fx.path("C.png")]
        );
        assert!(editor.preview_frames("missing").len() == 1);
    }
}
