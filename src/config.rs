// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings are read once at start-up and handed to the generation backend
//! factory; nothing re-reads the file afterwards. The key names match the
//! historical `.sagesettings` file so existing files keep working.

use crate::history::MAX_UNDO_COUNT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default settings file, relative to the working directory.
pub const SETTINGS_FILE_NAME: &str = "./.sagesettings";

pub const DEFAULT_OPENAI_TEXT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_IMAGE_MODEL: &str = "gpt-image-1";
pub const DEFAULT_GOOGLE_TEXT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GOOGLE_IMAGE_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

/// Which generation backend to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "OPENAI")]
    OpenAi,
    #[serde(rename = "GOOGLEAI")]
    GoogleAi,
    #[default]
    #[serde(rename = "TESTING")]
    Testing,
}

impl Provider {
    pub fn label(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI",
            Provider::GoogleAi => "GOOGLEAI",
            Provider::Testing => "TESTING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "OPENAI_API_KEY")]
    pub openai_api_key: String,
    #[serde(rename = "GOOGLE_AI_STUDIO_API_KEY")]
    pub google_api_key: String,
    #[serde(rename = "Selected Inference Provider")]
    pub provider: Provider,
    #[serde(rename = "OpenAI Text Model")]
    pub openai_text_model: String,
    #[serde(rename = "OpenAI Image Model")]
    pub openai_image_model: String,
    #[serde(rename = "Google Text Model")]
    pub google_text_model: String,
    #[serde(rename = "Google Image Model")]
    pub google_image_model: String,
    /// Undo states kept per open document
    #[serde(rename = "Max Undo Count")]
    pub max_undo_count: usize,
    /// Seconds per frame written into exported animations
    #[serde(rename = "Frame Duration")]
    pub frame_duration: f32,
    #[serde(rename = "Request Timeout Seconds")]
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            google_api_key: String::new(),
            provider: Provider::Testing,
            openai_text_model: DEFAULT_OPENAI_TEXT_MODEL.to_string(),
            openai_image_model: DEFAULT_OPENAI_IMAGE_MODEL.to_string(),
            google_text_model: DEFAULT_GOOGLE_TEXT_MODEL.to_string(),
            google_image_model: DEFAULT_GOOGLE_IMAGE_MODEL.to_string(),
            max_undo_count: MAX_UNDO_COUNT,
            frame_duration: 1.0,
            request_timeout_secs: 120,
        }
    }
}

impl Settings {
    /// Parse settings, choosing YAML or JSON by file extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let extension = path.extension().and_then(|s| s.to_str());
        let settings = match extension {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&text)
                .with_context(|| format!("Failed to parse YAML settings {}", path.display()))?,
            _ => serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse JSON settings {}", path.display()))?,
        };
        Ok(settings)
    }

    /// Write settings, choosing YAML or JSON by file extension.
    pub fn write(&self, path: &Path) -> Result<()> {
        let extension = path.extension().and_then(|s| s.to_str());
        let text = match extension {
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            _ => serde_json::to_string_pretty(self)?,
        };
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }

    /// Load settings, creating the file with defaults when it does not exist.
    ///
    /// A file that cannot be parsed is left alone and defaults are used.
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match Self::from_file(path) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings.warn_missing_keys();
                    settings
                }
                Err(e) => {
                    log::error!("{:#}. Using defaults.", e);
                    Self::default()
                }
            }
        } else {
            let settings = Self::default();
            match settings.write(path) {
                Ok(()) => log::info!("Created {} with defaults", path.display()),
                Err(e) => log::error!("{:#}. Using in-memory defaults.", e),
            }
            settings
        }
    }

    fn warn_missing_keys(&self) {
        if self.openai_api_key.is_empty() {
            log::warn!("OPENAI_API_KEY not set in settings");
        }
        if self.google_api_key.is_empty() {
            log::warn!("GOOGLE_AI_STUDIO_API_KEY not set in settings");
        }
    }
}
