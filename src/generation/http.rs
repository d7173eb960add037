// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Shared HTTP plumbing for the vendor backends.

use crate::error::GenerationError;
use crate::io::media::generated_file_name;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::{Client, RequestBuilder};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::GenerationResult;

pub fn client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Failed to build HTTP client ({e}), using defaults");
            Client::new()
        })
}

/// MIME type guessed from the file extension, PNG when unknown.
pub fn mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "image/png",
    }
}

/// Read an image and return `(mime, base64)`.
pub fn encode_image(path: &Path) -> GenerationResult<(&'static str, String)> {
    let bytes = std::fs::read(path)
        .map_err(|e| GenerationError::Io(format!("{}: {e}", path.display())))?;
    Ok((mime_type(path), STANDARD.encode(bytes)))
}

/// Send a request and parse the JSON body, mapping non-2xx to `Vendor`.
pub fn send_json(request: RequestBuilder) -> GenerationResult<serde_json::Value> {
    let response = request
        .send()
        .map_err(|e| GenerationError::Http(e.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| GenerationError::Http(e.to_string()))?;
    if !status.is_success() {
        log::error!("Vendor returned {status}: {body}");
        return Err(GenerationError::Vendor(format!("{status}: {}", vendor_message(&body))));
    }
    serde_json::from_str(&body).map_err(|e| GenerationError::Decode(e.to_string()))
}

/// Pull `error.message` out of a vendor error body when present.
fn vendor_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Decode base64 image bytes and write them to a fresh file in `folder`.
pub fn save_base64_image(
    data: &str,
    folder: &Path,
    prefix: &str,
    hint: &str,
) -> GenerationResult<PathBuf> {
    if data.is_empty() {
        return Err(GenerationError::EmptyResult);
    }
    let bytes = STANDARD
        .decode(data)
        .map_err(|e| GenerationError::Decode(e.to_string()))?;
    let image = image::load_from_memory(&bytes).map_err(|e| GenerationError::Decode(e.to_string()))?;
    std::fs::create_dir_all(folder).map_err(|e| GenerationError::Io(e.to_string()))?;
    let path = folder.join(generated_file_name(prefix, hint));
    image
        .save(&path)
        .map_err(|e| GenerationError::Io(format!("{}: {e}", path.display())))?;
    log::info!("Saved generated image {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_type(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_type(Path::new("a")), "image/png");
    }

    #[test]
    fn test_vendor_message() {
        assert_eq!(
            vendor_message(r#"{"error": {"message": "bad key"}}"#),
            "bad key"
        );
        assert_eq!(vendor_message("plain"), "plain");
    }

    #[test]
    fn test_base64_roundtrip_to_file() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.png");
        RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255])).save(&source).unwrap();
        let (mime, data) = encode_image(&source).unwrap();
        assert_eq!(mime, "image/png");

        let out = save_base64_image(&data, &dir.path().join("gen"), "next_sprite", "walk").unwrap();
        let image = image::open(&out).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[test]
    fn test_empty_and_garbage_payloads() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            save_base64_image("", dir.path(), "p", "h"),
            Err(GenerationError::EmptyResult)
        );
        assert!(matches!(
            save_base64_image("!!!", dir.path(), "p", "h"),
            Err(GenerationError::Decode(_))
        ));
    }
}
