// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Document models for projects and sprites.

pub mod project;
pub mod sprite;

pub use project::SageFile;
pub use sprite::{Animation, SpriteFile};
