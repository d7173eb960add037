// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! OpenAI backend.
//!
//! Text goes through chat completions with images attached as data URLs.
//! Images come from `images/generations` when there is nothing to condition
//! on, otherwise from `images/edits` with every input as an `image[]` part.

use super::http;
use super::{
    non_empty, prompts, AnimationSuggestionRequest, BaseSpriteRequest, BetweenImagesRequest,
    DescriptionRequest, GenerationBackend, GenerationResult, KeywordsRequest, NextImageRequest,
    ReferenceImageRequest,
};
use crate::config::Settings;
use crate::error::GenerationError;
use reqwest::blocking::{multipart, Client};
use serde_json::json;
use std::path::{Path, PathBuf};

const API_BASE: &str = "https://api.openai.com/v1";
const IMAGE_SIZE: &str = "1024x1024";

pub struct OpenAiBackend {
    api_key: String,
    text_model: String,
    image_model: String,
    client: Client,
}

impl OpenAiBackend {
    pub fn new(settings: &Settings) -> Self {
        Self {
            api_key: settings.openai_api_key.trim().to_string(),
            text_model: settings.openai_text_model.clone(),
            image_model: settings.openai_image_model.clone(),
            client: http::client(settings.request_timeout_secs),
        }
    }

    fn key(&self) -> GenerationResult<&str> {
        if self.api_key.is_empty() {
            Err(GenerationError::MissingApiKey("OPENAI_API_KEY"))
        } else {
            Ok(&self.api_key)
        }
    }

    fn chat(&self, prompt: &str, images: &[PathBuf]) -> GenerationResult<String> {
        let key = self.key()?;
        let mut content = vec![json!({ "type": "text", "text": prompt })];
        for image in images {
            let (mime, data) = http::encode_image(image)?;
            content.push(json!({
                "type": "image_url",
                "image_url": { "url": format!("data:{mime};base64,{data}") }
            }));
        }
        let body = json!({
            "model": self.text_model,
            "messages": [{ "role": "user", "content": content }],
        });

        log::debug!("OpenAI chat request with {} image(s)", images.len());
        let response = http::send_json(
            self.client
                .post(format!("{API_BASE}/chat/completions"))
                .bearer_auth(key)
                .json(&body),
        )?;
        let text = response["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        non_empty(text)
    }

    fn image(
        &self,
        prompt: &str,
        images: &[&Path],
        folder: &Path,
        prefix: &str,
        hint: &str,
    ) -> GenerationResult<PathBuf> {
        let key = self.key()?;
        let request = if images.is_empty() {
            self.client
                .post(format!("{API_BASE}/images/generations"))
                .bearer_auth(key)
                .json(&json!({
                    "model": self.image_model,
                    "prompt": prompt,
                    "size": IMAGE_SIZE,
                    "n": 1,
                }))
        } else {
            let mut form = multipart::Form::new()
                .text("model", self.image_model.clone())
                .text("prompt", prompt.to_string())
                .text("size", IMAGE_SIZE);
            for image in images {
                let bytes = std::fs::read(image)
                    .map_err(|e| GenerationError::Io(format!("{}: {e}", image.display())))?;
                let file_name = image
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image.png".to_string());
                let part = multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(http::mime_type(image))
                    .map_err(|e| GenerationError::Http(e.to_string()))?;
                form = form.part("image[]", part);
            }
            self.client
                .post(format!("{API_BASE}/images/edits"))
                .bearer_auth(key)
                .multipart(form)
        };

        log::debug!("OpenAI image request with {} input(s)", images.len());
        let response = http::send_json(request)?;
        let data = response["data"][0]["b64_json"].as_str().unwrap_or_default();
        http::save_base64_image(data, folder, prefix, hint)
    }
}

impl GenerationBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "OPENAI"
    }

    fn generate_description(&self, request: &DescriptionRequest) -> GenerationResult<String> {
        self.chat(&prompts::description(request), &request.images)
    }

    fn generate_keywords(&self, request: &KeywordsRequest) -> GenerationResult<String> {
        self.chat(&prompts::keywords(request), &request.images)
    }

    fn generate_reference_image(&self, request: &ReferenceImageRequest) -> GenerationResult<PathBuf> {
        let images: Vec<&Path> = request.images.iter().map(PathBuf::as_path).collect();
        self.image(
            &prompts::reference_image(request),
            &images,
            &request.output_folder,
            "reference",
            &request.context.keywords,
        )
    }

    fn generate_base_sprite_image(&self, request: &BaseSpriteRequest) -> GenerationResult<PathBuf> {
        let images: Vec<&Path> = request.images.iter().map(PathBuf::as_path).collect();
        self.image(
            &prompts::base_sprite(request),
            &images,
            &request.output_folder,
            "sprite",
            &request.sprite_description,
        )
    }

    fn generate_next_image(&self, request: &NextImageRequest) -> GenerationResult<PathBuf> {
        self.image(
            &prompts::next_image(request),
            &[request.image.as_path()],
            &request.output_folder,
            "next_sprite",
            &request.context.animation_name,
        )
    }

    fn generate_between_images(&self, request: &BetweenImagesRequest) -> GenerationResult<PathBuf> {
        self.image(
            &prompts::between_images(request),
            &[request.first.as_path(), request.second.as_path()],
            &request.output_folder,
            "between_sprite",
            &request.context.animation_name,
        )
    }

    fn generate_animation_suggestion(
        &self,
        request: &AnimationSuggestionRequest,
    ) -> GenerationResult<String> {
        self.chat(&prompts::animation_suggestion(request), &[])
    }
}
