// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Sage - a desktop editor for AI-assisted 2D sprite animation assets.

mod app;
mod ui;

use anyhow::Result;
use app::SageApp;
use sage_editor::config::{Settings, SETTINGS_FILE_NAME};
use std::path::Path;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let settings = Settings::load_or_create(Path::new(SETTINGS_FILE_NAME));

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 860.0])
            .with_min_inner_size([960.0, 600.0])
            .with_title("Sage - Sprite Animation Editor"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Sage",
        options,
        Box::new(|_cc| Ok(Box::new(SageApp::new(settings)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
