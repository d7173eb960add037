// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Sage - AI-assisted 2D sprite animation assets
//!
//! Document models, the editing engines, generation backends, spritesheet
//! packing and Godot export. The desktop shell in `main.rs` is a thin
//! egui layer over these modules.

pub mod background;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod generation;
pub mod history;
pub mod io;
pub mod models;
pub mod spritesheet;
pub mod util;

pub use error::{Result, SageError};
