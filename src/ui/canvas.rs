// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Animation preview.
//!
//! Cycles through the base image and the frames of the selected animation
//! at the configured frame duration.

use super::TextureCache;
use std::path::PathBuf;

/// Playback state of the preview.
#[derive(Debug, Clone)]
pub struct Preview {
    pub playing: bool,
    index: usize,
    /// Time the current frame became visible, in egui seconds
    shown_at: f64,
}

impl Default for Preview {
    fn default() -> Self {
        Self {
            playing: true,
            index: 0,
            shown_at: 0.0,
        }
    }
}

impl Preview {
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Advance to the frame that should be visible at `now`.
    pub fn tick(&mut self, now: f64, frame_duration: f32, frame_count: usize) -> usize {
        if frame_count == 0 {
            self.index = 0;
            return 0;
        }
        if self.index >= frame_count {
            self.index = 0;
        }
        let duration = f64::from(frame_duration.max(0.01));
        if self.playing && now - self.shown_at >= duration {
            self.index = (self.index + 1) % frame_count;
            self.shown_at = now;
        } else if !self.playing {
            self.shown_at = now;
        }
        self.index
    }

    fn step(&mut self, delta: isize, frame_count: usize) {
        if frame_count > 0 {
            self.index = (self.index as isize + delta).rem_euclid(frame_count as isize) as usize;
        }
    }
}

/// Display the preview of `frames`.
pub fn show(
    ui: &mut egui::Ui,
    frames: &[PathBuf],
    preview: &mut Preview,
    frame_duration: f32,
    textures: &mut TextureCache,
) {
    ui.horizontal(|ui| {
        let label = if preview.playing { "⏸ Pause" } else { "▶ Play" };
        if ui.button(label).clicked() {
            preview.playing = !preview.playing;
        }
        if ui.button("⏮").clicked() {
            preview.step(-1, frames.len());
        }
        if ui.button("⏭").clicked() {
            preview.step(1, frames.len());
        }
        if !frames.is_empty() {
            ui.label(format!("{} / {}", preview.index + 1, frames.len()));
        }
    });

    let now = ui.input(|i| i.time);
    let index = preview.tick(now, frame_duration, frames.len());
    let Some(path) = frames.get(index) else {
        ui.centered_and_justified(|ui| {
            ui.label(egui::RichText::new("Nothing to preview").italics().weak());
        });
        return;
    };

    if let Some(texture) = textures.get(ui.ctx(), path) {
        ui.centered_and_justified(|ui| {
            ui.add(egui::Image::new(&texture).shrink_to_fit());
        });
    }

    if preview.playing && frames.len() > 1 {
        ui.ctx()
            .request_repaint_after(std::time::Duration::from_secs_f32(frame_duration.max(0.01)));
    }
}
