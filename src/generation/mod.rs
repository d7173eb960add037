// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Generation backends.
//!
//! A single capability trait covers every text and image request the
//! editors make. Implementations are chosen from [`Settings`] when the
//! backend is constructed; calls are blocking and are moved off the UI
//! thread with [`worker::Job`].

pub mod google;
mod http;
pub mod openai;
pub mod prompts;
pub mod testing;
pub mod worker;

use crate::config::{Provider, Settings};
use crate::error::GenerationError;
use std::path::PathBuf;
use std::sync::Arc;

pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// Free-text context shared by all sprite requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationContext {
    pub description: String,
    pub keywords: String,
    pub camera: String,
    pub animation_name: String,
}

impl GenerationContext {
    /// True when neither a description nor keywords were provided.
    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty() && self.keywords.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionRequest {
    pub keywords: String,
    pub images: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordsRequest {
    pub project_description: String,
    pub images: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImageRequest {
    pub context: GenerationContext,
    pub images: Vec<PathBuf>,
    pub output_folder: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseSpriteRequest {
    pub context: GenerationContext,
    pub sprite_description: String,
    pub images: Vec<PathBuf>,
    pub output_folder: PathBuf,
}

/// Continue an animation from a single image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextImageRequest {
    pub context: GenerationContext,
    pub image: PathBuf,
    pub output_folder: PathBuf,
}

/// Synthesize the in-between frame of two images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetweenImagesRequest {
    pub context: GenerationContext,
    pub first: PathBuf,
    pub second: PathBuf,
    pub output_folder: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationSuggestionRequest {
    pub context: GenerationContext,
    pub sprite_description: String,
    pub existing_names: Vec<String>,
}

/// Text and image generation capability.
///
/// Image operations return the path of a newly written image; an empty
/// response is reported as [`GenerationError::EmptyResult`], never as success.
pub trait GenerationBackend: Send + Sync {
    /// Short label used in busy messages and logs.
    fn name(&self) -> &'static str;

    fn generate_description(&self, request: &DescriptionRequest) -> GenerationResult<String>;

    fn generate_keywords(&self, request: &KeywordsRequest) -> GenerationResult<String>;

    fn generate_reference_image(&self, request: &ReferenceImageRequest) -> GenerationResult<PathBuf>;

    fn generate_base_sprite_image(&self, request: &BaseSpriteRequest) -> GenerationResult<PathBuf>;

    fn generate_next_image(&self, request: &NextImageRequest) -> GenerationResult<PathBuf>;

    fn generate_between_images(&self, request: &BetweenImagesRequest) -> GenerationResult<PathBuf>;

    fn generate_animation_suggestion(
        &self,
        request: &AnimationSuggestionRequest,
    ) -> GenerationResult<String>;
}

/// Build the backend selected in `settings`.
pub fn backend_from_settings(settings: &Settings) -> Arc<dyn GenerationBackend> {
    log::info!("Using generation provider {}", settings.provider.label());
    match settings.provider {
        Provider::OpenAi => Arc::new(openai::OpenAiBackend::new(settings)),
        Provider::GoogleAi => Arc::new(google::GoogleBackend::new(settings)),
        Provider::Testing => Arc::new(testing::TestingBackend),
    }
}

/// Treat whitespace-only text as an empty result.
pub(crate) fn non_empty(text: String) -> GenerationResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(GenerationError::EmptyResult)
    } else {
        Ok(trimmed.to_string())
    }
}
