// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! The app owns one [`SageEditor`] for the open project and one
//! [`SpriteEditor`] for the open sprite, and turns panel actions into
//! editor calls. Generation requests run on a worker [`Job`] that is
//! polled every frame; only one request is outstanding at a time and the
//! panels are disabled until it finishes.

use crate::ui::canvas::{self, Preview};
use crate::ui::project::{self, ProjectAction, ProjectDrafts};
use crate::ui::properties::{self, PropertiesAction, SpriteDrafts};
use crate::ui::timeline::{self, TimelineAction, TimelineState};
use crate::ui::{settings as settings_window, toolbar, toolbar::ToolbarAction, TextureCache};
use sage_editor::background::WhiteKeyRemover;
use sage_editor::config::{Settings, SETTINGS_FILE_NAME};
use sage_editor::editor::project as projects;
use sage_editor::editor::sprite::clean_suggestion;
use sage_editor::editor::{FramePlan, Placement, SageEditor, SpriteEditor};
use sage_editor::error::GenerationError;
use sage_editor::export::{default_export_dir, GodotExporter};
use sage_editor::generation::worker::Job;
use sage_editor::generation::{backend_from_settings, GenerationBackend, GenerationResult};
use sage_editor::io::media::IMAGE_EXTENSIONS;
use sage_editor::models::project::{SageFile, SAGE_FILE_EXTENSION};
use sage_editor::spritesheet::{create_spritesheet, default_sheet_name};
use sage_editor::util::paths;
use sage_editor::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An outstanding generation request.
enum Pending {
    /// A frame; `remaining` more are generated after it
    Frame {
        plan: FramePlan,
        remaining: usize,
        job: Job<PathBuf>,
    },
    BaseImage(Job<PathBuf>),
    ReferenceImage { slot: usize, job: Job<PathBuf> },
    Description(Job<String>),
    Keywords(Job<String>),
    AnimationName(Job<String>),
}

impl Pending {
    fn label(&self) -> &str {
        match self {
            Pending::Frame { job, .. } | Pending::BaseImage(job) | Pending::ReferenceImage { job, .. } => job.label(),
            Pending::Description(job) | Pending::Keywords(job) | Pending::AnimationName(job) => job.label(),
        }
    }
}

/// Main application state.
pub struct SageApp {
    settings: Settings,
    settings_draft: Settings,
    settings_open: bool,

    /// Backend built from the current settings
    backend: Arc<dyn GenerationBackend>,

    project: SageEditor,
    sprite: SpriteEditor,

    /// Sprite files in the project, relative to its directory
    sprites: Vec<String>,

    project_drafts: ProjectDrafts,
    sprite_drafts: SpriteDrafts,
    timeline: TimelineState,
    preview: Preview,
    textures: TextureCache,

    pending: Option<Pending>,

    /// Last error shown in the status bar
    status: Option<String>,
}

impl SageApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            backend: backend_from_settings(&settings),
            project: SageEditor::new(settings.max_undo_count),
            sprite: SpriteEditor::new(settings.max_undo_count),
            settings_draft: settings.clone(),
            settings,
            settings_open: false,
            sprites: Vec::new(),
            project_drafts: ProjectDrafts::default(),
            sprite_drafts: SpriteDrafts::default(),
            timeline: TimelineState::default(),
            preview: Preview::default(),
            textures: TextureCache::default(),
            pending: None,
            status: None,
        }
    }

    /// Log and display a failed operation.
    fn report(&mut self, result: Result<()>) {
        match result {
            Ok(()) => self.status = None,
            Err(e) => {
                log::error!("{}", e);
                self.status = Some(e.to_string());
            }
        }
    }

    /// Reset the edit buffers from the documents.
    fn sync_views(&mut self) {
        if let Some(sage) = self.project.sage() {
            let new_sprite = std::mem::take(&mut self.project_drafts.new_sprite);
            self.project_drafts = ProjectDrafts::from_sage(sage);
            self.project_drafts.new_sprite = new_sprite;
            self.sprite.set_project(sage);
        }
        if let Some(sprite) = self.sprite.sprite() {
            self.sprite_drafts = SpriteDrafts::from_sprite(sprite);
            self.timeline.sync(sprite);
        }
    }

    fn open_sprite_name(&self) -> Option<String> {
        let sage = self.project.sage()?;
        Some(paths::store(self.sprite.file_path()?, sage.directory()))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Project and sprite files
    // ─────────────────────────────────────────────────────────────────────

    fn new_project(&mut self) {
        if let Some(directory) = rfd::FileDialog::new().pick_folder() {
            let result = projects::create_project(&directory).map(|sage| self.open_sage(sage));
            self.report(result);
        }
    }

    fn open_project_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Sage Project", &[SAGE_FILE_EXTENSION])
            .pick_file()
        {
            let result = projects::open_project(&path).map(|sage| self.open_sage(sage));
            self.report(result);
        }
    }

    fn open_sage(&mut self, sage: SageFile) {
        self.sprites = projects::list_sprites(&sage);
        self.sprite.close();
        self.sprite.set_project(&sage);
        self.project.open(sage);
        self.textures.clear();
        self.timeline = TimelineState::default();
        self.preview.reset();
        self.sync_views();
    }

    fn refresh_sprites(&mut self) {
        if let Some(sage) = self.project.sage() {
            self.sprites = projects::list_sprites(sage);
        }
    }

    fn open_sprite(&mut self, name: &str) -> Result<()> {
        let Some(sage) = self.project.sage().cloned() else {
            return Ok(());
        };
        let path = paths::resolve(sage.directory(), name);
        self.timeline = TimelineState::default();
        self.preview.reset();
        self.sprite.load(&path, &sage)?;
        self.sync_views();
        Ok(())
    }

    fn create_sprite(&mut self, name: &str) -> Result<()> {
        let Some(sage) = self.project.sage().cloned() else {
            return Ok(());
        };
        let path = projects::create_sprite(&sage, name)?;
        self.refresh_sprites();
        self.open_sprite(&paths::store(&path, sage.directory()))
    }

    // ─────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────

    /// Undo in the sprite when one is open, otherwise in the project.
    fn undo(&mut self) {
        let result = if self.sprite.sprite().is_some() {
            self.sprite.undo()
        } else {
            self.project.undo()
        };
        match result {
            Ok(true) => log::info!("Undo"),
            Ok(false) => {}
            Err(e) => return self.report(Err(e)),
        }
        self.sync_views();
    }

    fn redo(&mut self) {
        let result = if self.sprite.sprite().is_some() {
            self.sprite.redo()
        } else {
            self.project.redo()
        };
        match result {
            Ok(true) => log::info!("Redo"),
            Ok(false) => {}
            Err(e) => return self.report(Err(e)),
        }
        self.sync_views();
    }

    fn can_undo(&self) -> bool {
        if self.sprite.sprite().is_some() {
            self.sprite.can_undo()
        } else {
            self.project.can_undo()
        }
    }

    fn can_redo(&self) -> bool {
        if self.sprite.sprite().is_some() {
            self.sprite.can_redo()
        } else {
            self.project.can_redo()
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Generation
    // ─────────────────────────────────────────────────────────────────────

    fn spawn<T, F>(&self, label: &str, work: F) -> Job<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn GenerationBackend) -> GenerationResult<T> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        Job::spawn(label, move || work(&*backend))
    }

    fn start_frame(&mut self, plan: FramePlan, remaining: usize) -> Result<()> {
        self.sprite.begin_generation()?;
        let request = plan.request.clone();
        let job = self.spawn("Generating frame...", move |backend| request.execute(backend));
        self.pending = Some(Pending::Frame { plan, remaining, job });
        Ok(())
    }

    fn generate_frame(&mut self, placement: Placement) -> Result<()> {
        let Some(animation) = self.timeline.animation.clone() else {
            return Ok(());
        };
        let plan = self
            .sprite
            .plan_generated_frame(&animation, placement, self.timeline.single_selection())?;
        self.start_frame(plan, 0)
    }

    fn add_animation_with_frames(&mut self, name: &str, count: usize) -> Result<()> {
        self.sprite.add_animation(name)?;
        let name = name.trim().to_string();
        self.timeline.animation = Some(name.clone());
        self.timeline.new_animation_name.clear();
        self.timeline.clear_selection();
        if count == 0 {
            return Ok(());
        }
        let plan = self.sprite.plan_generated_frame(&name, Placement::After, None)?;
        self.start_frame(plan, count - 1)
    }

    fn generate_base_image(&mut self) -> Result<()> {
        let request = self.sprite.plan_base_image()?;
        self.sprite.begin_generation()?;
        let job = self.spawn("Generating base image...", move |backend| {
            backend.generate_base_sprite_image(&request)
        });
        self.pending = Some(Pending::BaseImage(job));
        Ok(())
    }

    fn suggest_animation_name(&mut self) -> Result<()> {
        let request = self.sprite.plan_animation_suggestion()?;
        let job = self.spawn("Suggesting animation name...", move |backend| {
            backend.generate_animation_suggestion(&request)
        });
        self.pending = Some(Pending::AnimationName(job));
        Ok(())
    }

    fn generate_reference_image(&mut self, slot: usize) -> Result<()> {
        let request = self.project.plan_reference_image(slot)?;
        let job = self.spawn("Generating reference image...", move |backend| {
            backend.generate_reference_image(&request)
        });
        self.pending = Some(Pending::ReferenceImage { slot, job });
        Ok(())
    }

    fn generate_description(&mut self) -> Result<()> {
        let request = self.project.plan_description()?;
        let job = self.spawn("Generating description...", move |backend| {
            backend.generate_description(&request)
        });
        self.pending = Some(Pending::Description(job));
        Ok(())
    }

    fn generate_keywords(&mut self) -> Result<()> {
        let request = self.project.plan_keywords()?;
        let job = self.spawn("Generating keywords...", move |backend| {
            backend.generate_keywords(&request)
        });
        self.pending = Some(Pending::Keywords(job));
        Ok(())
    }

    /// Collect a finished job, if any, and apply its result.
    fn poll_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let result = match pending {
            Pending::Frame { plan, remaining, job } => match job.try_take() {
                None => {
                    self.pending = Some(Pending::Frame { plan, remaining, job });
                    return;
                }
                Some(result) => self.finish_frame(&plan, remaining, result),
            },
            Pending::BaseImage(job) => match job.try_take() {
                None => {
                    self.pending = Some(Pending::BaseImage(job));
                    return;
                }
                Some(result) => self.sprite.finish_base_image(result),
            },
            Pending::ReferenceImage { slot, job } => match job.try_take() {
                None => {
                    self.pending = Some(Pending::ReferenceImage { slot, job });
                    return;
                }
                Some(result) => self.project.finish_reference_image(slot, result),
            },
            Pending::Description(job) => match job.try_take() {
                None => {
                    self.pending = Some(Pending::Description(job));
                    return;
                }
                Some(result) => self.project.finish_description(result),
            },
            Pending::Keywords(job) => match job.try_take() {
                None => {
                    self.pending = Some(Pending::Keywords(job));
                    return;
                }
                Some(result) => self.project.finish_keywords(result),
            },
            Pending::AnimationName(job) => match job.try_take() {
                None => {
                    self.pending = Some(Pending::AnimationName(job));
                    return;
                }
                Some(result) => self.finish_animation_name(result),
            },
        };
        self.report(result);
        self.sync_views();
    }

    fn finish_frame(&mut self, plan: &FramePlan, remaining: usize, result: GenerationResult<PathBuf>) -> Result<()> {
        let index = self.sprite.finish_generated_frame(plan, result)?;
        self.timeline.animation = Some(plan.animation.clone());
        self.timeline.select_only(index);
        if remaining > 0 {
            let next = self
                .sprite
                .plan_generated_frame(&plan.animation, Placement::After, None)?;
            self.start_frame(next, remaining - 1)?;
        }
        Ok(())
    }

    fn finish_animation_name(&mut self, result: GenerationResult<String>) -> Result<()> {
        let suggestion = clean_suggestion(&result?);
        if suggestion.is_empty() {
            return Err(GenerationError::EmptyResult.into());
        }
        self.timeline.new_animation_name = suggestion;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────

    fn export_godot(&mut self, output_dir: Option<PathBuf>) -> Result<()> {
        let (Some(sage), Some(sprite), Some(path)) = (self.project.sage(), self.sprite.sprite(), self.sprite.file_path())
        else {
            return Ok(());
        };
        let output_dir = output_dir.unwrap_or_else(|| default_export_dir(sage.directory(), path));
        let remover = WhiteKeyRemover::default();
        let report = GodotExporter::new(&output_dir, &remover, self.settings.frame_duration).export(sprite)?;
        self.status = Some(format!("Exported {} file(s) to {}", report.files.len(), output_dir.display()));
        Ok(())
    }

    fn export_spritesheet(&mut self) -> Result<()> {
        let (Some(sage), Some(sprite)) = (self.project.sage(), self.sprite.sprite()) else {
            return Ok(());
        };
        let Some(output) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_directory(sage.directory())
            .set_file_name(default_sheet_name(sprite))
            .save_file()
        else {
            return Ok(());
        };
        let layout = create_spritesheet(sprite, &output, &WhiteKeyRemover::default())?;
        self.status = Some(format!(
            "Packed {} frame(s) into {}",
            layout.frames.len(),
            output.display()
        ));
        Ok(())
    }

    fn save_settings(&mut self) {
        self.settings = self.settings_draft.clone();
        if let Err(e) = self.settings.write(Path::new(SETTINGS_FILE_NAME)) {
            log::error!("{:#}", e);
            self.status = Some(format!("{:#}", e));
        }
        self.backend = backend_from_settings(&self.settings);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Panel actions
    // ─────────────────────────────────────────────────────────────────────

    fn handle_project_action(&mut self, action: ProjectAction) {
        let result = match action {
            ProjectAction::None => return,
            ProjectAction::SetName(name) => self.project.set_project_name(&name),
            ProjectAction::SetDescription(text) => self.project.set_description(&text),
            ProjectAction::SetKeywords(text) => self.project.set_keywords(&text),
            ProjectAction::SetCamera(text) => self.project.set_camera(&text),
            ProjectAction::GenerateDescription => self.generate_description(),
            ProjectAction::GenerateKeywords => self.generate_keywords(),
            ProjectAction::PickReference(slot) => match pick_image() {
                Some(path) => self.project.set_reference_image(slot, Some(path.as_path())),
                None => Ok(()),
            },
            ProjectAction::ClearReference(slot) => self.project.set_reference_image(slot, None),
            ProjectAction::GenerateReference(slot) => self.generate_reference_image(slot),
            ProjectAction::OpenSprite(name) => self.open_sprite(&name),
            ProjectAction::CreateSprite(name) => self.create_sprite(&name),
        };
        self.report(result);
        self.sync_views();
    }

    fn handle_properties_action(&mut self, action: PropertiesAction) {
        let result = match action {
            PropertiesAction::None => return,
            PropertiesAction::SetName(name) => self.sprite.set_name(&name),
            PropertiesAction::SetDescription(text) => self.sprite.set_description(&text),
            PropertiesAction::SetSize(width, height) => self.sprite.set_size(width, height),
            PropertiesAction::PickBaseImage => match pick_image() {
                Some(path) => self.sprite.set_base_image(Some(path.as_path())),
                None => Ok(()),
            },
            PropertiesAction::ClearBaseImage => self.sprite.set_base_image(None),
            PropertiesAction::GenerateBaseImage => self.generate_base_image(),
        };
        self.report(result);
        self.sync_views();
    }

    fn handle_timeline_action(&mut self, action: TimelineAction) {
        let animation = self.timeline.animation.clone().unwrap_or_default();
        let result = match action {
            TimelineAction::None => return,
            TimelineAction::AddAnimation(name) => self.sprite.add_animation(&name).map(|_| {
                self.timeline.animation = Some(name.trim().to_string());
                self.timeline.new_animation_name.clear();
                self.timeline.clear_selection();
            }),
            TimelineAction::AddAnimationWithFrames(name, count) => self.add_animation_with_frames(&name, count),
            TimelineAction::SuggestAnimationName => self.suggest_animation_name(),
            TimelineAction::RemoveAnimation(name) => self.sprite.remove_animation(&name).map(|_| {
                self.timeline.animation = None;
                self.timeline.clear_selection();
            }),
            TimelineAction::ImportFrames(placement) => self.import_frames(&animation, placement),
            TimelineAction::RemoveSelectedFrames => self.remove_selected_frames(&animation),
            TimelineAction::MoveUp(index) => self.sprite.move_frame_up(&animation, index).map(|moved| {
                if let Some(index) = moved {
                    self.timeline.select_only(index);
                }
            }),
            TimelineAction::MoveDown(index) => self.sprite.move_frame_down(&animation, index).map(|moved| {
                if let Some(index) = moved {
                    self.timeline.select_only(index);
                }
            }),
            TimelineAction::Generate(placement) => self.generate_frame(placement),
        };
        self.report(result);
        self.sync_views();
    }

    /// Insert picked images around the selected frames, or at either end.
    fn import_frames(&mut self, animation: &str, placement: Placement) -> Result<()> {
        let Some(images) = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_files()
        else {
            return Ok(());
        };
        let len = self
            .sprite
            .sprite()
            .map(|s| s.animation_frames(animation).len())
            .unwrap_or(0);
        let index = self.timeline.import_index(placement, len);
        let added = self.sprite.insert_frames(animation, index, &images)?;
        log::info!("Imported {} frame(s) into '{}'", added, animation);
        Ok(())
    }

    fn remove_selected_frames(&mut self, animation: &str) -> Result<()> {
        let frames: Vec<PathBuf> = {
            let all = self
                .sprite
                .sprite()
                .map(|s| s.animation_frames(animation))
                .unwrap_or(&[]);
            self.timeline
                .selected_frames
                .iter()
                .filter_map(|&i| all.get(i).cloned())
                .collect()
        };
        self.sprite.remove_frames(animation, &frames)?;
        self.timeline.clear_selection();
        Ok(())
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Only process if no text field is focused
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
            self.undo();
        }
        if ctx.input(|i| {
            (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        }) {
            self.redo();
        }
        if !self.timeline.selected_frames.is_empty()
            && ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace))
        {
            self.handle_timeline_action(TimelineAction::RemoveSelectedFrames);
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, busy: bool) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.add_enabled(!busy, egui::Button::new("New Project...")).clicked() {
                        self.new_project();
                        ui.close_menu();
                    }
                    if ui.add_enabled(!busy, egui::Button::new("Open Project...")).clicked() {
                        self.open_project_dialog();
                        ui.close_menu();
                    }
                    ui.separator();
                    let has_sprite = !busy && self.sprite.sprite().is_some();
                    if ui.add_enabled(has_sprite, egui::Button::new("Export to Godot")).clicked() {
                        let result = self.export_godot(None);
                        self.report_keeping_status(result);
                        ui.close_menu();
                    }
                    if ui.add_enabled(has_sprite, egui::Button::new("Export to Godot As...")).clicked() {
                        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                            let result = self.export_godot(Some(dir));
                            self.report_keeping_status(result);
                        }
                        ui.close_menu();
                    }
                    if ui.add_enabled(has_sprite, egui::Button::new("Create Spritesheet...")).clicked() {
                        let result = self.export_spritesheet();
                        self.report_keeping_status(result);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Settings...").clicked() {
                        self.settings_draft = self.settings.clone();
                        self.settings_open = true;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui
                        .add_enabled(!busy && self.can_undo(), egui::Button::new("Undo (Ctrl+Z)"))
                        .clicked()
                    {
                        self.undo();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(!busy && self.can_redo(), egui::Button::new("Redo (Ctrl+Shift+Z)"))
                        .clicked()
                    {
                        self.redo();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui
                        .add_enabled(!busy && self.sprite.sprite().is_some(), egui::Button::new("Close Sprite"))
                        .clicked()
                    {
                        self.sprite.close();
                        self.timeline = TimelineState::default();
                        ui.close_menu();
                    }
                });
            });
        });
    }

    /// Like [`Self::report`] but keeps a success message set by the operation.
    fn report_keeping_status(&mut self, result: Result<()>) {
        if let Err(e) = result {
            self.report(Err(e));
        }
    }
}

fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
}

impl eframe::App for SageApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for a finished generation request
        self.poll_pending();
        let busy = self.pending.is_some();

        // Request repaint while waiting (to update spinner)
        if busy {
            ctx.request_repaint();
        } else {
            self.handle_shortcuts(ctx);
        }

        self.menu_bar(ctx, busy);

        if self.settings_open && settings_window::show(ctx, &mut self.settings_open, &mut self.settings_draft) {
            self.save_settings();
        }

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| match (&self.pending, &self.status) {
                (Some(pending), _) => {
                    ui.spinner();
                    ui.label(pending.label());
                }
                (None, Some(status)) => {
                    ui.label(egui::RichText::new(status).color(egui::Color32::from_rgb(230, 160, 90)));
                }
                (None, None) => {
                    ui.label(egui::RichText::new("Ready").weak());
                }
            });
        });

        let Some(sage) = self.project.sage().cloned() else {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(40.0);
                        ui.heading("No project open");
                        ui.add_space(10.0);
                        if ui.button("New Project...").clicked() {
                            self.new_project();
                        }
                        if ui.button("Open Project...").clicked() {
                            self.open_project_dialog();
                        }
                    });
                });
            });
            return;
        };

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                ui.add_enabled_ui(!busy, |ui| {
                    toolbar::show(
                        ui,
                        self.backend.name(),
                        self.can_undo(),
                        self.can_redo(),
                        self.sprite.sprite().is_some(),
                    )
                })
                .inner
            })
            .inner;
        match toolbar_action {
            ToolbarAction::Undo => self.undo(),
            ToolbarAction::Redo => self.redo(),
            ToolbarAction::ExportGodot => {
                let result = self.export_godot(None);
                self.report_keeping_status(result);
            }
            ToolbarAction::ExportSpritesheet => {
                let result = self.export_spritesheet();
                self.report_keeping_status(result);
            }
            ToolbarAction::None => {}
        }

        // Project panel (left side)
        let open_sprite = self.open_sprite_name();
        let project_action = egui::SidePanel::left("project")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.add_enabled_ui(!busy, |ui| {
                    project::show(
                        ui,
                        &sage,
                        &mut self.project_drafts,
                        &self.sprites,
                        open_sprite.as_deref(),
                        &mut self.textures,
                    )
                })
                .inner
            })
            .inner;
        self.handle_project_action(project_action);

        let Some(sprite) = self.sprite.sprite().cloned() else {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("Open or create a sprite").italics().weak());
                });
            });
            return;
        };

        // Properties panel (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.add_enabled_ui(!busy, |ui| {
                    properties::show(ui, &sprite, &mut self.sprite_drafts, &mut self.textures)
                })
                .inner
            })
            .inner;
        self.handle_properties_action(properties_action);

        // Timeline (bottom)
        let timeline_action = egui::TopBottomPanel::bottom("timeline")
            .resizable(true)
            .default_height(170.0)
            .show(ctx, |ui| {
                ui.add_enabled_ui(!busy, |ui| {
                    timeline::show(ui, &sprite, &mut self.timeline, &mut self.textures)
                })
                .inner
            })
            .inner;
        self.handle_timeline_action(timeline_action);

        // Preview (center)
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(pending) = &self.pending {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.spinner();
                        ui.add_space(10.0);
                        ui.label(
                            egui::RichText::new(pending.label())
                                .size(16.0)
                                .color(egui::Color32::from_gray(200)),
                        );
                    });
                });
                return;
            }
            let frames = self
                .timeline
                .animation
                .as_deref()
                .map(|name| self.sprite.preview_frames(name))
                .unwrap_or_else(|| sprite.base_image.iter().cloned().collect());
            canvas::show(
                ui,
                &frames,
                &mut self.preview,
                self.settings.frame_duration,
                &mut self.textures,
            );
        });
    }
}
