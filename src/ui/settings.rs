// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Settings window.

use sage_editor::config::{Provider, Settings};

/// Display the settings window. Returns true when the user saved.
pub fn show(ctx: &egui::Context, open: &mut bool, draft: &mut Settings) -> bool {
    let mut saved = false;
    let mut keep_open = *open;

    egui::Window::new("Settings")
        .open(&mut keep_open)
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("settings_grid").num_columns(2).show(ui, |ui| {
                ui.label("Provider:");
                egui::ComboBox::from_id_source("provider")
                    .selected_text(draft.provider.label())
                    .show_ui(ui, |ui| {
                        for provider in [Provider::OpenAi, Provider::GoogleAi, Provider::Testing] {
                            ui.selectable_value(&mut draft.provider, provider, provider.label());
                        }
                    });
                ui.end_row();

                ui.label("OpenAI API key:");
                ui.add(egui::TextEdit::singleline(&mut draft.openai_api_key).password(true));
                ui.end_row();

                ui.label("OpenAI text model:");
                ui.text_edit_singleline(&mut draft.openai_text_model);
                ui.end_row();

                ui.label("OpenAI image model:");
                ui.text_edit_singleline(&mut draft.openai_image_model);
                ui.end_row();

                ui.label("Google AI Studio key:");
                ui.add(egui::TextEdit::singleline(&mut draft.google_api_key).password(true));
                ui.end_row();

                ui.label("Google text model:");
                ui.text_edit_singleline(&mut draft.google_text_model);
                ui.end_row();

                ui.label("Google image model:");
                ui.text_edit_singleline(&mut draft.google_image_model);
                ui.end_row();

                ui.label("Frame duration (s):");
                ui.add(egui::DragValue::new(&mut draft.frame_duration).speed(0.01).range(0.01..=10.0));
                ui.end_row();

                ui.label("Request timeout (s):");
                ui.add(egui::DragValue::new(&mut draft.request_timeout_secs).range(1..=600));
                ui.end_row();

                ui.label("Max undo count:");
                ui.add(egui::DragValue::new(&mut draft.max_undo_count).range(1..=10_000));
                ui.end_row();
            });

            ui.separator();
            if ui.button("Save").clicked() {
                saved = true;
            }
        });

    *open = keep_open && !saved;
    saved
}
