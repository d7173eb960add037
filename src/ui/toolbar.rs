// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the sprite-level commands.

/// Actions that can be triggered from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Undo,
    Redo,
    ExportGodot,
    ExportSpritesheet,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, provider: &str, can_undo: bool, can_redo: bool, has_sprite: bool) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.add_enabled(can_undo, egui::Button::new("↶ Undo")).clicked() {
            action = ToolbarAction::Undo;
        }
        if ui.add_enabled(can_redo, egui::Button::new("↷ Redo")).clicked() {
            action = ToolbarAction::Redo;
        }

        ui.separator();

        if ui.add_enabled(has_sprite, egui::Button::new("Export to Godot...")).clicked() {
            action = ToolbarAction::ExportGodot;
        }
        if ui.add_enabled(has_sprite, egui::Button::new("Create Spritesheet...")).clicked() {
            action = ToolbarAction::ExportSpritesheet;
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(egui::RichText::new(format!("Provider: {provider}")).italics().weak());
        });
    });

    action
}
