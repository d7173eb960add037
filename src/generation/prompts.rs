// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Prompt text for the vendor backends.

use super::{
    AnimationSuggestionRequest, BaseSpriteRequest, BetweenImagesRequest, DescriptionRequest,
    GenerationContext, KeywordsRequest, NextImageRequest, ReferenceImageRequest,
};

const GAME_ASSET_CONTEXT: &str = "You are an assistant that helps game developers design 2D games \
and their sprite assets. Keep answers concise and focused on visual style, mood and elements \
relevant to 2D game art.";

fn camera_line(camera: &str) -> String {
    let camera = camera.trim();
    if camera.is_empty() || camera.eq_ignore_ascii_case("none") || camera.eq_ignore_ascii_case("null") {
        String::new()
    } else {
        format!("\nCamera perspective / viewing angle: {camera}")
    }
}

fn project_lines(context: &GenerationContext) -> String {
    let mut lines = String::new();
    if !context.description.trim().is_empty() {
        lines.push_str(&format!("\nProject description:\n{}\n", context.description.trim()));
    }
    if !context.keywords.trim().is_empty() {
        lines.push_str(&format!("\nKeywords: {}\n", context.keywords.trim()));
    }
    lines
}

pub fn description(request: &DescriptionRequest) -> String {
    let guidance = if request.keywords.trim().is_empty() {
        "Invent an interesting video game concept.".to_string()
    } else {
        format!("Base the description on these keywords: '{}'.", request.keywords.trim())
    };
    format!(
        "{GAME_ASSET_CONTEXT}\n\nWrite a short description (at most 3 sentences) of a video game concept. \
         {guidance}\nReply with the description only."
    )
}

pub fn keywords(request: &KeywordsRequest) -> String {
    format!(
        "{GAME_ASSET_CONTEXT}\n\nExtract 5-10 comma separated keywords (themes, genre, art style, mood) \
         from this video game description:\n\"{}\"\nReply with the keywords only.",
        request.project_description.trim()
    )
}

pub fn reference_image(request: &ReferenceImageRequest) -> String {
    format!(
        "{GAME_ASSET_CONTEXT}\n\nGenerate a new reference image for this game that matches the \
         established style while showing a new perspective.{}{}",
        project_lines(&request.context),
        camera_line(&request.context.camera)
    )
}

pub fn base_sprite(request: &BaseSpriteRequest) -> String {
    format!(
        "{GAME_ASSET_CONTEXT}\n{}\nGenerate a base sprite image of '{}' on a plain white background.{}",
        project_lines(&request.context),
        request.sprite_description.trim(),
        camera_line(&request.context.camera)
    )
}

pub fn next_image(request: &NextImageRequest) -> String {
    format!(
        "{GAME_ASSET_CONTEXT}\n\nAnimation: {}\n\nGenerate the next sprite image of this animation \
         from the provided sprite. Keep the style and the plain white background.{}",
        request.context.animation_name,
        camera_line(&request.context.camera)
    )
}

pub fn between_images(request: &BetweenImagesRequest) -> String {
    format!(
        "{GAME_ASSET_CONTEXT}\n\nThe two provided images are frames of a '{}' animation. Generate \
         the frame midway between them, keeping proportions, style and the plain white background.{}",
        request.context.animation_name,
        camera_line(&request.context.camera)
    )
}

pub fn animation_suggestion(request: &AnimationSuggestionRequest) -> String {
    let existing = serde_json::to_string(&request.existing_names).unwrap_or_default();
    format!(
        "{GAME_ASSET_CONTEXT}\n{}\nSprite: '{}'. Current animations: {existing}.\nSuggest one \
         additional animation name that does not overlap the current ones. Reply with the name \
         only, using underscores instead of spaces.",
        project_lines(&request.context),
        request.sprite_description.trim()
    )
}
