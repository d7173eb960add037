// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project panel.
//!
//! Shows the project metadata, the reference image slots and the sprite
//! files found in the project directory.

use super::{thumbnail, TextureCache, THUMBNAIL_SIZE};
use sage_editor::models::project::{SageFile, REFERENCE_IMAGE_SLOTS};

/// Text being edited; committed when the field loses focus.
#[derive(Debug, Clone, Default)]
pub struct ProjectDrafts {
    pub name: String,
    pub description: String,
    pub keywords: String,
    pub camera: String,
    pub new_sprite: String,
}

impl ProjectDrafts {
    pub fn from_sage(sage: &SageFile) -> Self {
        Self {
            name: sage.project_name.clone(),
            description: sage.project_description.clone(),
            keywords: sage.keywords.clone(),
            camera: sage.camera.clone(),
            new_sprite: String::new(),
        }
    }
}

/// Actions that can be triggered from the project panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectAction {
    None,
    SetName(String),
    SetDescription(String),
    SetKeywords(String),
    SetCamera(String),
    GenerateDescription,
    GenerateKeywords,
    PickReference(usize),
    ClearReference(usize),
    GenerateReference(usize),
    OpenSprite(String),
    CreateSprite(String),
}

/// Display the project panel.
pub fn show(
    ui: &mut egui::Ui,
    sage: &SageFile,
    drafts: &mut ProjectDrafts,
    sprites: &[String],
    open_sprite: Option<&str>,
    textures: &mut TextureCache,
) -> ProjectAction {
    let mut action = ProjectAction::None;

    ui.heading("Project");
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.label("Name:");
        if ui.text_edit_singleline(&mut drafts.name).lost_focus() && drafts.name != sage.project_name {
            action = ProjectAction::SetName(drafts.name.clone());
        }

        ui.horizontal(|ui| {
            ui.label("Description:");
            if ui.small_button("Generate").clicked() {
                action = ProjectAction::GenerateDescription;
            }
        });
        if ui
            .add(egui::TextEdit::multiline(&mut drafts.description).desired_rows(4))
            .lost_focus()
            && drafts.description != sage.project_description
        {
            action = ProjectAction::SetDescription(drafts.description.clone());
        }

        ui.horizontal(|ui| {
            ui.label("Keywords:");
            if ui.small_button("Generate").clicked() {
                action = ProjectAction::GenerateKeywords;
            }
        });
        if ui.text_edit_singleline(&mut drafts.keywords).lost_focus() && drafts.keywords != sage.keywords {
            action = ProjectAction::SetKeywords(drafts.keywords.clone());
        }

        ui.label("Camera:");
        if ui.text_edit_singleline(&mut drafts.camera).lost_focus() && drafts.camera != sage.camera {
            action = ProjectAction::SetCamera(drafts.camera.clone());
        }

        ui.add_space(8.0);
        ui.label(egui::RichText::new("Reference Images").strong());
        egui::Grid::new("reference_images").num_columns(2).show(ui, |ui| {
            for slot in 0..REFERENCE_IMAGE_SLOTS {
                let path = sage.reference_images[slot].as_deref();
                thumbnail(ui, textures, path, THUMBNAIL_SIZE)
                    .on_hover_text(path.map(|p| p.display().to_string()).unwrap_or_default());
                ui.vertical(|ui| {
                    if ui.small_button("Choose...").clicked() {
                        action = ProjectAction::PickReference(slot);
                    }
                    if ui.small_button("Generate").clicked() {
                        action = ProjectAction::GenerateReference(slot);
                    }
                    if ui.add_enabled(path.is_some(), egui::Button::new("Clear").small()).clicked() {
                        action = ProjectAction::ClearReference(slot);
                    }
                });
                ui.end_row();
            }
        });

        ui.add_space(8.0);
        ui.label(egui::RichText::new(format!("Sprites ({})", sprites.len())).strong());
        for sprite in sprites {
            let is_open = open_sprite == Some(sprite.as_str());
            if ui.selectable_label(is_open, sprite).clicked() && !is_open {
                action = ProjectAction::OpenSprite(sprite.clone());
            }
        }

        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut drafts.new_sprite).hint_text("new sprite name"));
            if ui.button("Create").clicked() {
                action = ProjectAction::CreateSprite(std::mem::take(&mut drafts.new_sprite));
            }
        });
    });

    action
}
