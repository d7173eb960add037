// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Document editors: the open project and the open sprite.

pub mod project;
pub mod sprite;

pub use project::SageEditor;
pub use sprite::{EditorState, FramePlan, FrameRequest, Placement, SpriteEditor};
