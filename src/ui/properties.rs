// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Sprite properties panel.
//!
//! Name, description, frame cell size and the base image of the open
//! sprite.

use super::{thumbnail, TextureCache};
use sage_editor::models::sprite::SpriteFile;

/// Values being edited; committed when the field loses focus.
#[derive(Debug, Clone, Default)]
pub struct SpriteDrafts {
    pub name: String,
    pub description: String,
    pub width: u32,
    pub height: u32,
}

impl SpriteDrafts {
    pub fn from_sprite(sprite: &SpriteFile) -> Self {
        Self {
            name: sprite.name.clone(),
            description: sprite.description.clone(),
            width: sprite.width,
            height: sprite.height,
        }
    }
}

/// Actions that can be triggered from the properties panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertiesAction {
    None,
    SetName(String),
    SetDescription(String),
    SetSize(u32, u32),
    PickBaseImage,
    ClearBaseImage,
    GenerateBaseImage,
}

/// Display the properties panel.
pub fn show(
    ui: &mut egui::Ui,
    sprite: &SpriteFile,
    drafts: &mut SpriteDrafts,
    textures: &mut TextureCache,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Sprite");
    ui.separator();

    ui.label("Name:");
    if ui.text_edit_singleline(&mut drafts.name).lost_focus() && drafts.name != sprite.name {
        action = PropertiesAction::SetName(drafts.name.clone());
    }

    ui.label("Description:");
    if ui
        .add(egui::TextEdit::multiline(&mut drafts.description).desired_rows(3))
        .lost_focus()
        && drafts.description != sprite.description
    {
        action = PropertiesAction::SetDescription(drafts.description.clone());
    }

    ui.horizontal(|ui| {
        ui.label("Size:");
        let width = ui.add(egui::DragValue::new(&mut drafts.width).range(1..=4096).suffix(" w"));
        let height = ui.add(egui::DragValue::new(&mut drafts.height).range(1..=4096).suffix(" h"));
        let committed = width.drag_stopped() || width.lost_focus() || height.drag_stopped() || height.lost_focus();
        if committed && (drafts.width, drafts.height) != (sprite.width, sprite.height) {
            action = PropertiesAction::SetSize(drafts.width, drafts.height);
        }
    });

    ui.add_space(8.0);
    ui.label(egui::RichText::new("Base Image").strong());
    ui.horizontal(|ui| {
        thumbnail(ui, textures, sprite.base_image.as_deref(), 96.0);
        ui.vertical(|ui| {
            if ui.button("Choose...").clicked() {
                action = PropertiesAction::PickBaseImage;
            }
            if ui.button("Generate").clicked() {
                action = PropertiesAction::GenerateBaseImage;
            }
            if ui
                .add_enabled(sprite.base_image.is_some(), egui::Button::new("Clear"))
                .clicked()
            {
                action = PropertiesAction::ClearBaseImage;
            }
        });
    });

    action
}
