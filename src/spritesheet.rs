// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Spritesheet packing.
//!
//! Frames are packed row-major into a square, power-of-two atlas of fixed
//! `width x height` cells. The layout is computed once by [`SheetLayout`]
//! and shared by the packer and the exporter so that pixel placement and
//! atlas regions can never disagree.
//!
//! Known limitation: the grid uses integer division (`side / width`), so a
//! cell size that is not a power of two leaves unused slack on the right
//! and bottom edges of the sheet.

use crate::background::BackgroundRemover;
use crate::error::{PackError, Result};
use crate::models::sprite::SpriteFile;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Smallest power of two greater than or equal to `n` (1 for `n == 0`).
pub fn next_power_of_two(n: u32) -> u32 {
    if n == 0 {
        1
    } else {
        n.next_power_of_two()
    }
}

/// Smallest square power-of-two side whose grid of `width x height` cells
/// holds `frame_count` frames.
pub fn determine_sheet_size(width: u32, height: u32, frame_count: usize) -> std::result::Result<u32, PackError> {
    if width == 0 || height == 0 {
        return Err(PackError::InvalidCellSize(width, height));
    }
    let mut side = next_power_of_two(width.max(height));
    loop {
        let capacity = (side / width) as usize * (side / height) as usize;
        if capacity >= frame_count {
            return Ok(side);
        }
        side = side
            .checked_mul(2)
            .ok_or(PackError::InvalidCellSize(width, height))?;
    }
}

/// One packed frame and the cell it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetFrame {
    pub path: PathBuf,
    pub x: u32,
    pub y: u32,
}

/// An animation and the indices of its frames within [`SheetLayout::frames`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationSlices {
    pub name: String,
    pub frame_indices: Vec<usize>,
}

/// Grid placement of every frame of a sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub cell_width: u32,
    pub cell_height: u32,
    pub side: u32,
    pub columns: u32,
    /// Frames in packing order
    pub frames: Vec<SheetFrame>,
    /// Animations in packing order, including empty ones
    pub animations: Vec<AnimationSlices>,
}

impl SheetLayout {
    /// Lay out `animations` in the given order, frames in list order.
    pub fn new(
        cell_width: u32,
        cell_height: u32,
        animations: Vec<(String, Vec<PathBuf>)>,
    ) -> std::result::Result<Self, PackError> {
        let frame_count: usize = animations.iter().map(|(_, f)| f.len()).sum();
        if frame_count == 0 {
            return Err(PackError::NoFrames);
        }
        let side = determine_sheet_size(cell_width, cell_height, frame_count)?;
        let columns = side / cell_width;

        let mut frames = Vec::with_capacity(frame_count);
        let mut slices = Vec::with_capacity(animations.len());
        for (name, paths) in animations {
            let mut frame_indices = Vec::with_capacity(paths.len());
            for path in paths {
                let index = frames.len() as u32;
                frame_indices.push(frames.len());
                frames.push(SheetFrame {
                    path,
                    x: (index % columns) * cell_width,
                    y: (index / columns) * cell_height,
                });
            }
            slices.push(AnimationSlices {
                name,
                frame_indices,
            });
        }

        Ok(Self {
            cell_width,
            cell_height,
            side,
            columns,
            frames,
            animations: slices,
        })
    }

    /// Lay out a sprite: animations by name, frames in list order.
    ///
    /// Frames whose file is missing are skipped with a warning.
    pub fn from_sprite(sprite: &SpriteFile) -> std::result::Result<Self, PackError> {
        let animations = sprite
            .animations
            .values()
            .map(|animation| {
                let frames = animation
                    .frames
                    .iter()
                    .filter(|frame| {
                        let exists = frame.is_file();
                        if !exists {
                            log::warn!(
                                "Skipping missing frame {} in animation '{}'",
                                frame.display(),
                                animation.name
                            );
                        }
                        exists
                    })
                    .cloned()
                    .collect();
                (animation.name.clone(), frames)
            })
            .collect();
        Self::new(sprite.width, sprite.height, animations)
    }

    /// Atlas region `(x, y, w, h)` of a frame.
    pub fn region(&self, frame_index: usize) -> Option<(u32, u32, u32, u32)> {
        self.frames
            .get(frame_index)
            .map(|f| (f.x, f.y, self.cell_width, self.cell_height))
    }

    /// Compose the atlas image. Every frame is stretched to the cell size.
    pub fn render(&self) -> Result<RgbaImage> {
        let mut sheet = RgbaImage::from_pixel(self.side, self.side, Rgba([0, 0, 0, 0]));
        for frame in &self.frames {
            let image = image::open(&frame.path)?.to_rgba8();
            let cell = imageops::resize(&image, self.cell_width, self.cell_height, FilterType::Lanczos3);
            imageops::replace(&mut sheet, &cell, frame.x as i64, frame.y as i64);
        }
        Ok(sheet)
    }
}

/// Default output file name, `<name>_spritesheet.png`.
pub fn default_sheet_name(sprite: &SpriteFile) -> String {
    let stem = Path::new(&sprite.name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| sprite.name.clone());
    format!("{stem}_spritesheet.png")
}

/// Pack every frame of `sprite` into `output`, then remove its background.
///
/// Returns the layout that was written so callers can describe the atlas.
pub fn create_spritesheet(
    sprite: &SpriteFile,
    output: &Path,
    remover: &dyn BackgroundRemover,
) -> Result<SheetLayout> {
    let layout = SheetLayout::from_sprite(sprite)?;
    let sheet = layout.render()?;
    sheet.save(output)?;
    remover.remove_background(output, output)?;
    log::info!(
        "Packed {} frame(s) into {}x{} sheet {}",
        layout.frames.len(),
        layout.side,
        layout.side,
        output.display()
    );
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::KeepBackground;
    use crate::error::SageError;
    use crate::models::sprite::Animation;
    use tempfile::TempDir;

    fn solid(path: &Path, w: u32, h: u32, color: [u8; 4]) {
        RgbaImage::from_pixel(w, h, Rgba(color)).save(path).unwrap();
    }

    #[test]
    fn test_next_power_of_two() {
        assert_eq!(next_power_of_two(0), 1);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(3), 4);
        assert_eq!(next_power_of_two(64), 64);
        assert_eq!(next_power_of_two(65), 128);
    }

    #[test]
    fn test_sheet_size_fits_and_is_minimal() {
        for (w, h) in [(64, 64), (32, 64), (16, 8), (128, 32)] {
            for n in 1..200usize {
                let side = determine_sheet_size(w, h, n).unwrap();
                assert!(side.is_power_of_two());
                assert!((side / w) as usize * (side / h) as usize >= n);

                let smaller = side / 2;
                if smaller >= w.max(h) {
                    assert!(
                        ((smaller / w) as usize * (smaller / h) as usize) < n,
                        "{w}x{h} n={n} side={side} not minimal"
                    );
                }
            }
        }
    }

    #[test]
    fn test_zero_cell_size_is_rejected() {
        assert_eq!(
            determine_sheet_size(0, 16, 1),
            Err(PackError::InvalidCellSize(0, 16))
        );
    }

    #[test]
    fn test_layout_grid_positions() {
        let frames = |prefix: &str, n: usize| {
            (0..n)
                .map(|i| PathBuf::from(format!("/f/{prefix}{i}.png")))
                .collect::<Vec<_>>()
        };
        let layout = SheetLayout::new(
            32,
            32,
            vec![
                ("attack".into(), frames("a", 3)),
                ("idle".into(), Vec::new()),
                ("walk".into(), frames("w", 3)),
            ],
        )
        .unwrap();

        // 6 frames of 32x32: 32 -> 1, 64 -> 4, 128 -> 16
        assert_eq!(layout.side, 128);
        assert_eq!(layout.columns, 4);
        assert_eq!(layout.region(0), Some((0, 0, 32, 32)));
        assert_eq!(layout.region(3), Some((96, 0, 32, 32)));
        assert_eq!(layout.region(4), Some((0, 32, 32, 32)));
        assert_eq!(layout.region(6), None);
        assert_eq!(layout.animations[1].frame_indices, Vec::<usize>::new());
        assert_eq!(layout.animations[2].frame_indices, vec![3, 4, 5]);
    }

    #[test]
    fn test_no_frames_is_an_error() {
        let mut sprite = SpriteFile::new("empty");
        sprite.animations.insert("idle".into(), Animation::new("idle"));
        assert_eq!(SheetLayout::from_sprite(&sprite), Err(PackError::NoFrames));

        let dir = TempDir::new().unwrap();
        let err = create_spritesheet(&sprite, &dir.path().join("s.png"), &KeepBackground).unwrap_err();
        assert!(matches!(err, SageError::Pack(PackError::NoFrames)));
    }

    #[test]
    fn test_pack_places_and_stretches_frames() {
        let dir = TempDir::new().unwrap();
        let red = dir.path().join("red.png");
        let blue = dir.path().join("blue.png");
        let green = dir.path().join("green.png");
        solid(&red, 10, 30, [255, 0, 0, 255]);
        solid(&blue, 16, 16, [0, 0, 255, 255]);
        solid(&green, 16, 16, [0, 255, 0, 255]);

        let mut sprite = SpriteFile::new("knight");
        sprite.width = 16;
        sprite.height = 16;
        let mut walk = Animation::new("walk");
        walk.frames = vec![blue.clone(), dir.path().join("missing.png"), green.clone()];
        let mut attack = Animation::new("attack");
        attack.frames = vec![red.clone()];
        sprite.animations.insert("walk".into(), walk);
        sprite.animations.insert("attack".into(), attack);

        let output = dir.path().join("sheet.png");
        let layout = create_spritesheet(&sprite, &output, &KeepBackground).unwrap();

        // attack/red, walk/blue, walk/green; missing frame skipped
        assert_eq!(layout.frames.len(), 3);
        assert_eq!(layout.side, 32);
        let sheet = image::open(&output).unwrap().to_rgba8();
        assert_eq!(sheet.dimensions(), (32, 32));
        assert_eq!(*sheet.get_pixel(8, 8), Rgba([255, 0, 0, 255]));
        assert_eq!(*sheet.get_pixel(24, 8), Rgba([0, 0, 255, 255]));
        assert_eq!(*sheet.get_pixel(8, 24), Rgba([0, 255, 0, 255]));
        assert_eq!(sheet.get_pixel(24, 24)[3], 0);
    }

    #[test]
    fn test_packing_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let mut sprite = SpriteFile::new("knight");
        sprite.width = 8;
        sprite.height = 8;
        let mut idle = Animation::new("idle");
        for i in 0..5u8 {
            let path = dir.path().join(format!("f{i}.png"));
            solid(&path, 12, 6, [i * 40, 255 - i * 40, i, 255]);
            idle.frames.push(path);
        }
        sprite.animations.insert("idle".into(), idle);

        let first = SheetLayout::from_sprite(&sprite).unwrap();
        let second = SheetLayout::from_sprite(&sprite).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.render().unwrap(), second.render().unwrap());
    }

    #[test]
    fn test_default_sheet_name() {
        let sprite = SpriteFile::new("knight.sprite");
        assert_eq!(default_sheet_name(&sprite), "knight_spritesheet.png");
    }
}
