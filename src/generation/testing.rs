// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Offline backend.
//!
//! Produces canned text and real placeholder images derived from the
//! inputs, so the whole editing and export workflow can be exercised
//! without network access or API keys.

use super::{
    AnimationSuggestionRequest, BaseSpriteRequest, BetweenImagesRequest, DescriptionRequest,
    GenerationBackend, GenerationResult, KeywordsRequest, NextImageRequest, ReferenceImageRequest,
};
use crate::error::GenerationError;
use crate::io::media::generated_file_name;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

const PLACEHOLDER_SIZE: u32 = 256;

#[derive(Debug, Clone, Copy, Default)]
pub struct TestingBackend;

impl TestingBackend {
    fn write(image: &RgbaImage, folder: &Path, prefix: &str, hint: &str) -> GenerationResult<PathBuf> {
        std::fs::create_dir_all(folder).map_err(|e| GenerationError::Io(e.to_string()))?;
        let path = folder.join(generated_file_name(prefix, hint));
        image
            .save(&path)
            .map_err(|e| GenerationError::Io(format!("{}: {e}", path.display())))?;
        log::info!("TESTING backend wrote {}", path.display());
        Ok(path)
    }

    fn load(path: &Path) -> GenerationResult<RgbaImage> {
        image::open(path)
            .map(|i| i.to_rgba8())
            .map_err(|e| GenerationError::Io(format!("{}: {e}", path.display())))
    }

    /// A coloured block on a white background, tinted by `seed`.
    fn placeholder(seed: &str) -> RgbaImage {
        let hash = seed
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
        let color = Rgba([
            (hash & 0xff) as u8 / 2,
            ((hash >> 8) & 0xff) as u8 / 2,
            ((hash >> 16) & 0xff) as u8 / 2,
            255,
        ]);
        let mut image = RgbaImage::from_pixel(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, Rgba([255, 255, 255, 255]));
        let margin = PLACEHOLDER_SIZE / 4;
        for y in margin..PLACEHOLDER_SIZE - margin {
            for x in margin..PLACEHOLDER_SIZE - margin {
                image.put_pixel(x, y, color);
            }
        }
        image
    }
}

impl GenerationBackend for TestingBackend {
    fn name(&self) -> &'static str {
        "TESTING"
    }

    fn generate_description(&self, _request: &DescriptionRequest) -> GenerationResult<String> {
        Ok("Project description from TESTING (placeholder)".to_string())
    }

    fn generate_keywords(&self, _request: &KeywordsRequest) -> GenerationResult<String> {
        Ok("testing_keyword1,testing_keyword2,testing_keyword3".to_string())
    }

    fn generate_reference_image(&self, request: &ReferenceImageRequest) -> GenerationResult<PathBuf> {
        let image = Self::placeholder(&request.context.description);
        Self::write(&image, &request.output_folder, "TEST_reference", &request.context.keywords)
    }

    fn generate_base_sprite_image(&self, request: &BaseSpriteRequest) -> GenerationResult<PathBuf> {
        let image = Self::placeholder(&request.sprite_description);
        Self::write(&image, &request.output_folder, "TEST_sprite", &request.sprite_description)
    }

    fn generate_next_image(&self, request: &NextImageRequest) -> GenerationResult<PathBuf> {
        let mut image = Self::load(&request.image)?;
        // Nudge the pose one pixel right so consecutive frames differ
        let (w, h) = image.dimensions();
        let shifted = RgbaImage::from_fn(w, h, |x, y| {
            if x == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                *image.get_pixel(x - 1, y)
            }
        });
        image = shifted;
        Self::write(
            &image,
            &request.output_folder,
            "TEST_next_sprite",
            &request.context.animation_name,
        )
    }

    fn generate_between_images(&self, request: &BetweenImagesRequest) -> GenerationResult<PathBuf> {
        let first = Self::load(&request.first)?;
        let (w, h) = first.dimensions();
        let second = imageops::resize(&Self::load(&request.second)?, w, h, FilterType::Triangle);
        let blended = RgbaImage::from_fn(w, h, |x, y| {
            let a = first.get_pixel(x, y);
            let b = second.get_pixel(x, y);
            Rgba(std::array::from_fn(|c| ((a[c] as u16 + b[c] as u16) / 2) as u8))
        });
        Self::write(
            &blended,
            &request.output_folder,
            "TEST_between_sprite",
            &request.context.animation_name,
        )
    }

    fn generate_animation_suggestion(
        &self,
        _request: &AnimationSuggestionRequest,
    ) -> GenerationResult<String> {
        Ok("TEST_sprite_animation_suggestion".to_string())
    }
}
