// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types shared by the document, packing, export and editing layers.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bad user input, rejected before any document mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("animation name cannot be empty")]
    EmptyAnimationName,

    #[error("animation '{0}' already exists")]
    DuplicateAnimationName(String),

    #[error("animation '{0}' does not exist")]
    UnknownAnimation(String),

    #[error("index {index} is out of range for {len} frame(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("sprite has no base image")]
    MissingBaseImage,

    #[error("sprite name cannot be empty")]
    EmptySpriteName,

    #[error("sprite name '{0}' must be a plain file name")]
    InvalidSpriteName(String),

    #[error("sprite width and height must be positive")]
    InvalidDimensions,

    #[error("sprite description cannot be empty")]
    EmptyDescription,

    #[error("reference image slot {0} does not exist")]
    InvalidReferenceSlot(usize),

    #[error("provide at least a project description or keywords")]
    MissingContext,

    #[error("'{0}' already exists")]
    AlreadyExists(PathBuf),
}

/// Spritesheet packing failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("no frames found in sprite data")]
    NoFrames,

    #[error("frame cell size must be positive, got {0}x{1}")]
    InvalidCellSize(u32, u32),
}

/// Failures reported by a generation backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("backend returned no result")]
    EmptyResult,

    #[error("missing API key: {0}")]
    MissingApiKey(&'static str),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("vendor error: {0}")]
    Vendor(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("generation worker stopped before returning a result")]
    WorkerLost,
}

#[derive(Error, Debug)]
pub enum SageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error("background removal failed: {0}")]
    BackgroundRemoval(String),

    #[error("no document is loaded")]
    NotLoaded,

    #[error("a generation request is still pending")]
    GenerationPending,
}

impl SageError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        SageError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        SageError::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SageError>;
