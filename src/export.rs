// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Godot 4 export.
//!
//! A sprite with frames becomes an atlas PNG, a `SpriteFrames` resource
//! slicing it, and an `AnimatedSprite2D` scene. A sprite without frames
//! becomes its background-free base image and a `Sprite2D` scene.
//!
//! Atlas regions come from the same [`SheetLayout`] that placed the pixels.

use crate::background::BackgroundRemover;
use crate::error::{Result, SageError, ValidationError};
use crate::models::sprite::SpriteFile;
use crate::spritesheet::{create_spritesheet, SheetLayout};
use std::fmt;
use std::path::{Path, PathBuf};

/// Files written by an export, in the order they were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub files: Vec<PathBuf>,
}

/// Default export folder for a sprite file: `<stem>_godot_export`.
pub fn default_export_dir(project_directory: &Path, sprite_path: &Path) -> PathBuf {
    let stem = sprite_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sprite".to_string());
    project_directory.join(format!("{stem}_godot_export"))
}

/// `uid://` followed by 12 hex digits.
fn new_uid() -> String {
    format!("uid://{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..6].to_string()
}

/// Quote-safe text for a Godot string literal.
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Base name for exported files.
fn export_name(sprite: &SpriteFile) -> String {
    let name = sprite.name.trim();
    if name.is_empty() {
        "sprite".to_string()
    } else {
        name.replace(['/', '\\'], "_")
    }
}

pub struct GodotExporter<'a> {
    output_dir: PathBuf,
    remover: &'a dyn BackgroundRemover,
    /// Seconds per frame
    frame_duration: f32,
}

impl<'a> GodotExporter<'a> {
    pub fn new(output_dir: impl Into<PathBuf>, remover: &'a dyn BackgroundRemover, frame_duration: f32) -> Self {
        Self {
            output_dir: output_dir.into(),
            remover,
            frame_duration,
        }
    }

    pub fn export(&self, sprite: &SpriteFile) -> Result<ExportReport> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| SageError::io(&self.output_dir, e))?;
        let report = if sprite.total_frames() == 0 {
            self.export_static(sprite)?
        } else {
            self.export_animated(sprite)?
        };
        log::info!(
            "Exported '{}' to {} ({} file(s))",
            sprite.name,
            self.output_dir.display(),
            report.files.len()
        );
        Ok(report)
    }

    /// Base image plus a `Sprite2D` scene.
    fn export_static(&self, sprite: &SpriteFile) -> Result<ExportReport> {
        let base = sprite
            .base_image
            .as_ref()
            .ok_or(ValidationError::MissingBaseImage)?;
        let file_name = base
            .file_name()
            .ok_or_else(|| SageError::io(base, std::io::ErrorKind::InvalidInput.into()))?;
        let image_path = self.output_dir.join(file_name);
        self.remover.remove_background(base, &image_path)?;

        let name = export_name(sprite);
        let texture = file_name.to_string_lossy();
        let scene = StaticScene {
            uid: new_uid(),
            node_name: &name,
            texture_uid: new_uid(),
            texture: &texture,
        };
        let scene_path = self.output_dir.join(format!("{name}.tscn"));
        write_file(&scene_path, &scene.to_string())?;
        Ok(ExportReport {
            files: vec![image_path, scene_path],
        })
    }

    /// Atlas, `SpriteFrames` resource and `AnimatedSprite2D` scene.
    fn export_animated(&self, sprite: &SpriteFile) -> Result<ExportReport> {
        let name = export_name(sprite);
        let sheet_name = format!("{name}_sheet.png");
        let frames_name = format!("{name}_frames.tres");
        let sheet_path = self.output_dir.join(&sheet_name);
        let frames_path = self.output_dir.join(&frames_name);
        let scene_path = self.output_dir.join(format!("{name}.tscn"));

        let layout = create_spritesheet(sprite, &sheet_path, self.remover)?;
        let frames_uid = new_uid();
        write_file(&frames_path, &self.sprite_frames(&layout, &frames_uid, &sheet_name))?;

        let scene = AnimatedScene {
            uid: new_uid(),
            node_name: &name,
            frames_ext_id: format!("1_{}", short_id()),
            frames_uid: &frames_uid,
            frames_file: &frames_name,
            default_animation: layout
                .animations
                .first()
                .map(|a| a.name.as_str())
                .unwrap_or_default(),
        };
        write_file(&scene_path, &scene.to_string())?;

        Ok(ExportReport {
            files: vec![sheet_path, frames_path, scene_path],
        })
    }

    /// The `SpriteFrames` resource text: one `AtlasTexture` per packed
    /// frame, then the animation list in packing order.
    pub fn sprite_frames(&self, layout: &SheetLayout, uid: &str, sheet_name: &str) -> String {
        SpriteFramesResource {
            layout,
            uid,
            sheet_uid: new_uid(),
            sheet_file: sheet_name,
            frame_duration: self.frame_duration,
            sub_ids: (0..layout.frames.len())
                .map(|_| format!("AtlasTexture_{}", short_id()))
                .collect(),
        }
        .to_string()
    }
}

/// `Sprite2D` scene showing a single texture.
///
/// Resource paths are bare file names, resolved by Godot relative to the
/// scene file.
struct StaticScene<'a> {
    uid: String,
    node_name: &'a str,
    texture_uid: String,
    texture: &'a str,
}

impl fmt::Display for StaticScene<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[gd_scene load_steps=2 format=3 uid=\"{}\"]\n", self.uid)?;
        writeln!(
            f,
            "[ext_resource type=\"Texture2D\" uid=\"{}\" path=\"{}\" id=\"1\"]\n",
            self.texture_uid,
            escape(self.texture)
        )?;
        writeln!(f, "[node name=\"{}\" type=\"Sprite2D\"]", escape(self.node_name))?;
        writeln!(f, "texture = ExtResource(\"1\")")
    }
}

/// `AnimatedSprite2D` scene referencing a `SpriteFrames` resource.
struct AnimatedScene<'a> {
    uid: String,
    node_name: &'a str,
    frames_ext_id: String,
    frames_uid: &'a str,
    frames_file: &'a str,
    default_animation: &'a str,
}

impl fmt::Display for AnimatedScene<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ext_id = &self.frames_ext_id;
        writeln!(f, "[gd_scene load_steps=2 format=3 uid=\"{}\"]\n", self.uid)?;
        writeln!(
            f,
            "[ext_resource type=\"SpriteFrames\" uid=\"{}\" path=\"{}\" id=\"{ext_id}\"]\n",
            self.frames_uid,
            escape(self.frames_file)
        )?;
        writeln!(f, "[node name=\"{}\" type=\"AnimatedSprite2D\"]", escape(self.node_name))?;
        writeln!(f, "sprite_frames = ExtResource(\"{ext_id}\")")?;
        writeln!(f, "animation = &\"{}\"", escape(self.default_animation))
    }
}

struct SpriteFramesResource<'a> {
    layout: &'a SheetLayout,
    uid: &'a str,
    sheet_uid: String,
    sheet_file: &'a str,
    frame_duration: f32,
    /// One id per packed frame
    sub_ids: Vec<String>,
}

impl fmt::Display for SpriteFramesResource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[gd_resource type=\"SpriteFrames\" load_steps={} format=3 uid=\"{}\"]\n",
            self.sub_ids.len() + 2,
            self.uid
        )?;
        writeln!(
            f,
            "[ext_resource type=\"Texture2D\" uid=\"{}\" path=\"{}\" id=\"1\"]\n",
            self.sheet_uid,
            escape(self.sheet_file)
        )?;

        for (index, sub_id) in self.sub_ids.iter().enumerate() {
            if let Some((x, y, w, h)) = self.layout.region(index) {
                writeln!(f, "[sub_resource type=\"AtlasTexture\" id=\"{sub_id}\"]")?;
                writeln!(f, "atlas = ExtResource(\"1\")")?;
                writeln!(f, "region = Rect2({x}, {y}, {w}, {h})\n")?;
            }
        }

        writeln!(f, "[resource]")?;
        writeln!(f, "animations = [")?;
        for animation in &self.layout.animations {
            writeln!(f, "  {{")?;
            writeln!(f, "    \"frames\": [")?;
            for &index in &animation.frame_indices {
                writeln!(f, "      {{")?;
                writeln!(f, "        \"duration\": {:?},", self.frame_duration)?;
                writeln!(f, "        \"texture\": SubResource(\"{}\")", self.sub_ids[index])?;
                writeln!(f, "      }},")?;
            }
            writeln!(f, "    ],")?;
            writeln!(f, "    \"loop\": true,")?;
            writeln!(f, "    \"name\": &\"{}\",", escape(&animation.name))?;
            writeln!(f, "    \"speed\": 1.0")?;
            writeln!(f, "  }},")?;
        }
        writeln!(f, "]")
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| SageError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::{KeepBackground, WhiteKeyRemover};
    use crate::models::sprite::Animation;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn solid(path: &Path, color: [u8; 4]) -> PathBuf {
        RgbaImage::from_pixel(8, 8, Rgba(color)).save(path).unwrap();
        path.to_path_buf()
    }

    #[test]
    fn test_static_sprite_exports_single_image() {
        let dir = TempDir::new().unwrap();
        let mut sprite = SpriteFile::new("rock");
        sprite.base_image = Some(solid(&dir.path().join("rock.png"), [255, 255, 255, 255]));
        sprite.animations.insert("idle".into(), Animation::new("idle"));
        let out = dir.path().join("export");

        let report = GodotExporter::new(&out, &WhiteKeyRemover::default(), 1.0)
            .export(&sprite)
            .unwrap();

        assert_eq!(report.files, vec![out.join("rock.png"), out.join("rock.tscn")]);
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 2);
        let scene = std::fs::read_to_string(out.join("rock.tscn")).unwrap();
        assert!(scene.contains("type=\"Sprite2D\""));
        assert!(scene.contains("path=\"rock.png\""));
        assert!(!scene.contains("res://"));
        // All-white image is entirely background
        let image = image::open(out.join("rock.png")).unwrap().to_rgba8();
        assert!(image.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_static_sprite_without_base_image_fails() {
        let dir = TempDir::new().unwrap();
        let err = GodotExporter::new(dir.path(), &KeepBackground, 1.0)
            .export(&SpriteFile::new("ghost"))
            .unwrap_err();
        assert!(matches!(err, SageError::Validation(ValidationError::MissingBaseImage)));
    }

    #[test]
    fn test_animated_export_matches_layout() {
        let dir = TempDir::new().unwrap();
        let mut sprite = SpriteFile::new("knight");
        sprite.width = 8;
        sprite.height = 8;
        let mut walk = Animation::new("walk");
        walk.frames = (0..3)
            .map(|i| solid(&dir.path().join(format!("w{i}.png")), [0, 0, 200, 255]))
            .collect();
        let mut attack = Animation::new("attack");
        attack.frames = vec![solid(&dir.path().join("a.png"), [200, 0, 0, 255])];
        sprite.animations.insert("walk".into(), walk);
        sprite.animations.insert("attack".into(), attack);
        let out = dir.path().join("export");

        let report = GodotExporter::new(&out, &KeepBackground, 0.25)
            .export(&sprite)
            .unwrap();
        assert_eq!(
            report.files,
            vec![
                out.join("knight_sheet.png"),
                out.join("knight_frames.tres"),
                out.join("knight.tscn")
            ]
        );

        let tres = std::fs::read_to_string(out.join("knight_frames.tres")).unwrap();
        // 4 frames of 8x8 in a 16x16 sheet
        let regions: Vec<&str> = tres.lines().filter(|l| l.starts_with("region")).collect();
        assert_eq!(
            regions,
            vec![
                "region = Rect2(0, 0, 8, 8)",
                "region = Rect2(8, 0, 8, 8)",
                "region = Rect2(0, 8, 8, 8)",
                "region = Rect2(8, 8, 8, 8)",
            ]
        );
        assert_eq!(tres.matches("[sub_resource type=\"AtlasTexture\"").count(), 4);
        assert_eq!(tres.matches("\"duration\": 0.25,").count(), 4);
        let attack_at = tres.find("&\"attack\"").unwrap();
        let walk_at = tres.find("&\"walk\"").unwrap();
        assert!(attack_at < walk_at);
        assert!(tres.contains("path=\"knight_sheet.png\""));
        assert!(!tres.contains("res://"));

        let scene = std::fs::read_to_string(out.join("knight.tscn")).unwrap();
        assert!(scene.contains("type=\"AnimatedSprite2D\""));
        assert!(scene.contains("animation = &\"attack\""));
        assert!(scene.contains("path=\"knight_frames.tres\""));
        assert!(!scene.contains("res://"));
        let frames_uid = tres
            .lines()
            .next()
            .and_then(|l| l.split("uid=\"").nth(1))
            .map(|s| s.trim_end_matches("\"]"))
            .unwrap();
        assert!(frames_uid.starts_with("uid://"));
        assert_eq!(frames_uid.len(), "uid://".len() + 12);
        assert!(scene.contains(frames_uid));

        let sheet = image::open(out.join("knight_sheet.png")).unwrap().to_rgba8();
        assert_eq!(sheet.dimensions(), (16, 16));
        assert_eq!(*sheet.get_pixel(4, 4), Rgba([200, 0, 0, 255]));
        assert_eq!(*sheet.get_pixel(12, 12), Rgba([0, 0, 200, 255]));
    }

    #[test]
    fn test_default_export_dir() {
        assert_eq!(
            default_export_dir(Path::new("/p"), Path::new("/p/enemies/slime.sprite")),
            PathBuf::from("/p/slime_godot_export")
        );
        assert_eq!(escape("a\"b"), "a\\\"b");
    }
}
