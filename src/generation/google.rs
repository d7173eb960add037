// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Google AI Studio backend (Gemini `generateContent`).

use super::http;
use super::{
    non_empty, prompts, AnimationSuggestionRequest, BaseSpriteRequest, BetweenImagesRequest,
    DescriptionRequest, GenerationBackend, GenerationResult, KeywordsRequest, NextImageRequest,
    ReferenceImageRequest,
};
use crate::config::Settings;
use crate::error::GenerationError;
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GoogleBackend {
    api_key: String,
    text_model: String,
    image_model: String,
    client: Client,
}

impl GoogleBackend {
    pub fn new(settings: &Settings) -> Self {
        Self {
            api_key: settings.google_api_key.trim().to_string(),
            text_model: settings.google_text_model.clone(),
            image_model: settings.google_image_model.clone(),
            client: http::client(settings.request_timeout_secs),
        }
    }

    fn generate(&self, model: &str, prompt: &str, images: &[&Path], want_image: bool) -> GenerationResult<Value> {
        if self.api_key.is_empty() {
            return Err(GenerationError::MissingApiKey("GOOGLE_AI_STUDIO_API_KEY"));
        }
        let mut parts = vec![json!({ "text": prompt })];
        for image in images {
            let (mime, data) = http::encode_image(image)?;
            parts.push(json!({ "inline_data": { "mime_type": mime, "data": data } }));
        }
        let mut body = json!({ "contents": [{ "parts": parts }] });
        if want_image {
            body["generationConfig"] = json!({ "responseModalities": ["TEXT", "IMAGE"] });
        }

        log::debug!("Gemini {model} request with {} image(s)", images.len());
        http::send_json(
            self.client
                .post(format!("{API_BASE}/{model}:generateContent"))
                .header("x-goog-api-key", &self.api_key)
                .json(&body),
        )
    }

    fn text(&self, prompt: &str, images: &[PathBuf]) -> GenerationResult<String> {
        let images: Vec<&Path> = images.iter().map(PathBuf::as_path).collect();
        let response = self.generate(&self.text_model, prompt, &images, false)?;
        non_empty(response_text(&response))
    }

    fn image(
        &self,
        prompt: &str,
        images: &[&Path],
        folder: &Path,
        prefix: &str,
        hint: &str,
    ) -> GenerationResult<PathBuf> {
        let response = self.generate(&self.image_model, prompt, images, true)?;
        let data = response_image(&response).ok_or(GenerationError::EmptyResult)?;
        http::save_base64_image(data, folder, prefix, hint)
    }
}

fn response_parts(response: &Value) -> impl Iterator<Item = &Value> {
    response["candidates"][0]["content"]["parts"]
        .as_array()
        .into_iter()
        .flatten()
}

/// Concatenate every text part of the first candidate.
fn response_text(response: &Value) -> String {
    response_parts(response)
        .filter_map(|part| part["text"].as_str())
        .collect::<Vec<_>>()
        .join("")
}

/// First inline image of the first candidate; the REST API answers in
/// camelCase but snake_case is accepted too.
fn response_image(response: &Value) -> Option<&str> {
    response_parts(response).find_map(|part| {
        part.get("inlineData")
            .or_else(|| part.get("inline_data"))
            .and_then(|inline| inline["data"].as_str())
    })
}

impl GenerationBackend for GoogleBackend {
    fn name(&self) -> &'static str {
        "GOOGLEAI"
    }

    fn generate_description(&self, request: &DescriptionRequest) -> GenerationResult<String> {
        self.text(&prompts::description(request), &request.images)
    }

    fn generate_keywords(&self, request: &KeywordsRequest) -> GenerationResult<String> {
        self.text(&prompts::keywords(request), &request.images)
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
        self.text(&prompts::animation_suggestion(request), &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let response = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Here " },
                { "text": "you go" },
                { "inlineData": { "mimeType": "image/png", "data": "QUJD" } }
            ]}}]
        });
        assert_eq!(response_text(&response), "Here you go");
        assert_eq!(response_image(&response), Some("QUJD"));

        let snake = json!({
            "candidates": [{ "content": { "parts": [{ "inline_data": { "data": "WFla" } }] }}]
        });
        assert_eq!(response_image(&snake), Some("WFla"));
        assert_eq!(response_image(&json!({})), None);
        assert_eq!(response_text(&json!({})), "");
    }

    #[test]
    fn test_missing_key_fails_before_network() {
        let backend = GoogleBackend::new(&Settings::default());
        let err = backend
            .generate_description(&DescriptionRequest {
                keywords: String::new(),
                images: Vec::new(),
            })
            .unwrap_err();
        assert_eq!(err, GenerationError::MissingApiKey("GOOGLE_AI_STUDIO_API_KEY"));
    }
}
