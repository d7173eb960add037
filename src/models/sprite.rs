// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Sprite data structures.
//!
//! A sprite has a base image (its neutral pose) and a set of named
//! animations, each an ordered list of frame images. All paths held here
//! are absolute; relativization happens in `io::serialization`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default frame cell size for new sprites.
pub const DEFAULT_SPRITE_SIZE: u32 = 256;

/// File extension for sprite documents.
pub const SPRITE_FILE_EXTENSION: &str = "sprite";

/// A named, ordered list of frame images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub name: String,
    pub frames: Vec<PathBuf>,
}

impl Animation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn contains(&self, frame: &Path) -> bool {
        self.frames.iter().any(|f| f == frame)
    }
}

/// One animatable game asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteFile {
    pub uuid: String,
    pub name: String,
    pub description: String,
    /// Frame cell width used when packing
    pub width: u32,
    /// Frame cell height used when packing
    pub height: u32,
    /// Implicit "frame -1" of every animation, never stored in a frame list
    pub base_image: Option<PathBuf>,
    /// Animations keyed by name; iteration order is lexicographic
    pub animations: BTreeMap<String, Animation>,
}

impl SpriteFile {
    /// Create an empty sprite with a fresh uuid and the default cell size.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            width: DEFAULT_SPRITE_SIZE,
            height: DEFAULT_SPRITE_SIZE,
            base_image: None,
            animations: BTreeMap::new(),
        }
    }

    /// Frames of the named animation, or an empty slice if it does not exist.
    pub fn animation_frames(&self, animation: &str) -> &[PathBuf] {
        self.animations
            .get(animation)
            .map(|a| a.frames.as_slice())
            .unwrap_or(&[])
    }

    pub fn animation_names(&self) -> Vec<String> {
        self.animations.keys().cloned().collect()
    }

    /// Total number of frames across all animations.
    pub fn total_frames(&self) -> usize {
        self.animations.values().map(Animation::len).sum()
    }

    /// All frames flattened in packing order: animations by name, then list order.
    pub fn all_frame_paths(&self) -> Vec<&Path> {
        self.animations
            .values()
            .flat_map(|a| a.frames.iter().map(PathBuf::as_path))
            .collect()
    }
}
