// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Animation timeline.
//!
//! Lists the sprite's animations and the frames of the selected one.
//! Frames support ctrl/shift multi-selection; generation buttons act on
//! the single selected frame.

use super::{thumbnail, TextureCache, THUMBNAIL_SIZE};
use sage_editor::editor::Placement;
use sage_editor::models::sprite::SpriteFile;
use std::collections::BTreeSet;

/// Selection and input state of the timeline.
#[derive(Debug, Clone)]
pub struct TimelineState {
    pub animation: Option<String>,
    pub selected_frames: BTreeSet<usize>,
    /// Anchor for shift-click range selection
    pub anchor: Option<usize>,
    pub new_animation_name: String,
    pub generated_frame_count: usize,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self {
            animation: None,
            selected_frames: BTreeSet::new(),
            anchor: None,
            new_animation_name: String::new(),
            generated_frame_count: 4,
        }
    }
}

impl TimelineState {
    /// The single selected frame, if exactly one is selected.
    pub fn single_selection(&self) -> Option<usize> {
        if self.selected_frames.len() == 1 {
            self.selected_frames.iter().next().copied()
        } else {
            None
        }
    }

    pub fn select_only(&mut self, index: usize) {
        self.selected_frames.clear();
        self.selected_frames.insert(index);
        self.anchor = Some(index);
    }

    pub fn clear_selection(&mut self) {
        self.selected_frames.clear();
        self.anchor = None;
    }

    /// Drop a selected animation that no longer exists and out-of-range frames.
    pub fn sync(&mut self, sprite: &SpriteFile) {
        if let Some(name) = &self.animation {
            if !sprite.animations.contains_key(name) {
                self.animation = None;
            }
        }
        if self.animation.is_none() {
            self.animation = sprite.animations.keys().next().cloned();
        }
        let len = self
            .animation
            .as_deref()
            .map(|name| sprite.animation_frames(name).len())
            .unwrap_or(0);
        self.selected_frames.retain(|&i| i < len);
        if self.anchor.is_some_and(|a| a >= len) {
            self.anchor = None;
        }
    }

    /// Insertion index for imported frames in an animation of `len` frames.
    pub fn import_index(&self, placement: Placement, len: usize) -> usize {
        match placement {
            Placement::Before => self.selected_frames.first().copied().unwrap_or(0),
            Placement::After => self.selected_frames.last().map(|&i| i + 1).unwrap_or(len),
        }
    }

    fn click(&mut self, index: usize, modifiers: egui::Modifiers) {
        if modifiers.shift {
            let anchor = self.anchor.unwrap_or(index);
            let (start, end) = (anchor.min(index), anchor.max(index));
            self.selected_frames = (start..=end).collect();
        } else if modifiers.command {
            if !self.selected_frames.remove(&index) {
                self.selected_frames.insert(index);
            }
            self.anchor = Some(index);
        } else {
            self.select_only(index);
        }
    }
}

/// Actions that can be triggered from the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineAction {
    None,
    AddAnimation(String),
    AddAnimationWithFrames(String, usize),
    SuggestAnimationName,
    RemoveAnimation(String),
    ImportFrames(Placement),
    RemoveSelectedFrames,
    MoveUp(usize),
    MoveDown(usize),
    Generate(Placement),
}

/// Display the timeline.
pub fn show(
    ui: &mut egui::Ui,
    sprite: &SpriteFile,
    state: &mut TimelineState,
    textures: &mut TextureCache,
) -> TimelineAction {
    let mut action = TimelineAction::None;

    ui.horizontal(|ui| {
        ui.label("Animations:");
        for name in sprite.animations.keys() {
            let selected = state.animation.as_deref() == Some(name.as_str());
            if ui.selectable_label(selected, name).clicked() && !selected {
                state.animation = Some(name.clone());
                state.clear_selection();
            }
        }
    });

    ui.horizontal(|ui| {
        ui.add(
            egui::TextEdit::singleline(&mut state.new_animation_name)
                .hint_text("animation name")
                .desired_width(140.0),
        );
        if ui.button("Suggest").clicked() {
            action = TimelineAction::SuggestAnimationName;
        }
        if ui.button("Add").clicked() {
            action = TimelineAction::AddAnimation(state.new_animation_name.clone());
        }
        ui.add(egui::DragValue::new(&mut state.generated_frame_count).range(1..=16));
        if ui.button("Add + Generate").clicked() {
            action = TimelineAction::AddAnimationWithFrames(
                state.new_animation_name.clone(),
                state.generated_frame_count,
            );
        }
        if let Some(name) = state.animation.clone() {
            ui.separator();
            if ui.button(format!("Remove '{name}'")).clicked() {
                action = TimelineAction::RemoveAnimation(name);
            }
        }
    });

    ui.separator();

    let Some(animation) = state.animation.clone() else {
        ui.label(egui::RichText::new("No animation selected").italics().weak());
        return action;
    };
    let frames = sprite.animation_frames(&animation);

    ui.horizontal(|ui| {
        let selection = state.single_selection();
        if ui.button("Import Before...").clicked() {
            action = TimelineAction::ImportFrames(Placement::Before);
        }
        if ui.button("Import After...").clicked() {
            action = TimelineAction::ImportFrames(Placement::After);
        }
        if ui
            .add_enabled(!state.selected_frames.is_empty(), egui::Button::new("Remove Selected"))
            .clicked()
        {
            action = TimelineAction::RemoveSelectedFrames;
        }
        ui.separator();
        let can_move = selection.is_some();
        if ui.add_enabled(can_move, egui::Button::new("Move Up")).clicked() {
            if let Some(index) = selection {
                action = TimelineAction::MoveUp(index);
            }
        }
        if ui.add_enabled(can_move, egui::Button::new("Move Down")).clicked() {
            if let Some(index) = selection {
                action = TimelineAction::MoveDown(index);
            }
        }
        ui.separator();
        // Generation needs at most one selected frame
        let can_generate = state.selected_frames.len() <= 1;
        if ui.add_enabled(can_generate, egui::Button::new("Generate Before")).clicked() {
            action = TimelineAction::Generate(Placement::Before);
        }
        if ui.add_enabled(can_generate, egui::Button::new("Generate After")).clicked() {
            action = TimelineAction::Generate(Placement::After);
        }
    });

    egui::ScrollArea::horizontal().show(ui, |ui| {
        ui.horizontal(|ui| {
            if frames.is_empty() {
                ui.label(egui::RichText::new("No frames yet").italics().weak());
            }
            for (index, frame) in frames.iter().enumerate() {
                let selected = state.selected_frames.contains(&index);
                let response = ui
                    .vertical(|ui| {
                        let response = thumbnail(ui, textures, Some(frame), THUMBNAIL_SIZE)
                            .interact(egui::Sense::click());
                        if selected {
                            ui.painter().rect_stroke(
                                response.rect.expand(2.0),
                                2.0,
                                egui::Stroke::new(2.0, egui::Color32::from_rgb(100, 180, 255)),
                            );
                        }
                        ui.label(index.to_string());
                        response
                    })
                    .inner;
                if response.clicked() {
                    let modifiers = ui.input(|i| i.modifiers);
                    state.click(index, modifiers);
                }
                response.on_hover_text(frame.display().to_string());
            }
        });
    });

    action
}
