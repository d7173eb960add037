// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the Sage editor.

pub mod canvas;
pub mod project;
pub mod properties;
pub mod settings;
pub mod timeline;
pub mod toolbar;

use sage_editor::io::media;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Thumbnail size used in lists
pub const THUMBNAIL_SIZE: f32 = 64.0;

/// GPU textures for image files, keyed by path.
///
/// Files that fail to decode are remembered so they are not retried every
/// frame.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<PathBuf, Option<egui::TextureHandle>>,
}

impl TextureCache {
    pub fn get(&mut self, ctx: &egui::Context, path: &Path) -> Option<egui::TextureHandle> {
        self.textures
            .entry(path.to_path_buf())
            .or_insert_with(|| match media::load_image(path) {
                Ok(loaded) => {
                    let size = [loaded.width as usize, loaded.height as usize];
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
                    Some(ctx.load_texture(path.to_string_lossy(), color_image, egui::TextureOptions::LINEAR))
                }
                Err(e) => {
                    log::warn!("Cannot display {}: {}", path.display(), e);
                    None
                }
            })
            .clone()
    }

    /// Forget everything, e.g. after a project switch.
    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

/// A fixed-size thumbnail, or a placeholder when the image is unavailable.
pub fn thumbnail(ui: &mut egui::Ui, textures: &mut TextureCache, path: Option<&Path>, size: f32) -> egui::Response {
    let texture = path.and_then(|p| textures.get(ui.ctx(), p));
    match texture {
        Some(texture) => ui.add(egui::Image::new(&texture).fit_to_exact_size(egui::vec2(size, size))),
        None => {
            let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::hover());
            ui.painter().rect_stroke(rect, 2.0, egui::Stroke::new(1.0, egui::Color32::from_gray(90)));
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "empty",
                egui::FontId::proportional(11.0),
                egui::Color32::from_gray(120),
            );
            response
        }
    }
}
