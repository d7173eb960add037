// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background removal for exported images.
//!
//! Generated sprites are drawn on a plain white background. Removal is a
//! collaborator of the packer and exporter: any failure is fatal to the
//! export that asked for it.

use crate::error::{Result, SageError};
use image::{Rgba, RgbaImage};
use std::collections::VecDeque;
use std::path::Path;

/// Replaces the background of `input` with transparency, writing `output`.
pub trait BackgroundRemover: Send + Sync {
    fn remove_background(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Clears near-white pixels connected to the image border.
///
/// Interior white regions (eyes, highlights) are kept because the fill only
/// grows from the edges.
#[derive(Debug, Clone, Copy)]
pub struct WhiteKeyRemover {
    /// Minimum value of every RGB channel for a pixel to count as background
    pub threshold: u8,
}

impl Default for WhiteKeyRemover {
    fn default() -> Self {
        Self { threshold: 240 }
    }
}

impl WhiteKeyRemover {
    fn is_background(&self, pixel: &Rgba<u8>) -> bool {
        pixel[3] == 0 || pixel.0[..3].iter().all(|&c| c >= self.threshold)
    }

    /// Flood-fill from every border pixel, clearing background pixels in place.
    pub fn apply(&self, image: &mut RgbaImage) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        let mut visited = vec![false; (width * height) as usize];
        let mut queue = VecDeque::new();

        let border = (0..width)
            .flat_map(|x| [(x, 0), (x, height - 1)])
            .chain((0..height).flat_map(|y| [(0, y), (width - 1, y)]));
        for (x, y) in border {
            queue.push_back((x, y));
        }

        while let Some((x, y)) = queue.pop_front() {
            let idx = (y * width + x) as usize;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            if !self.is_background(image.get_pixel(x, y)) {
                continue;
            }
            image.put_pixel(x, y, Rgba([0, 0, 0, 0]));

            if x > 0 {
                queue.push_back((x - 1, y));
            }
            if x + 1 < width {
                queue.push_back((x + 1, y));
            }
            if y > 0 {
                queue.push_back((x, y - 1));
            }
            if y + 1 < height {
                queue.push_back((x, y + 1));
            }
        }
    }
}

impl BackgroundRemover for WhiteKeyRemover {
    fn remove_background(&self, input: &Path, output: &Path) -> Result<()> {
        let mut image = image::open(input)
            .map_err(|e| SageError::BackgroundRemoval(format!("{}: {e}", input.display())))?
            .to_rgba8();
        self.apply(&mut image);
        image
            .save(output)
            .map_err(|e| SageError::BackgroundRemoval(format!("{}: {e}", output.display())))?;
        log::debug!("Removed background {} -> {}", input.display(), output.display());
        Ok(())
    }
}

/// Copies the image unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepBackground;

impl BackgroundRemover for KeepBackground {
    fn remove_background(&self, input: &Path, output: &Path) -> Result<()> {
        if input != output {
            std::fs::copy(input, output).map_err(|e| SageError::io(output, e))?;
        }
        Ok(())
    }
}
