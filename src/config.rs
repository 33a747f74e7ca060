//! Workspace configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

pub const DEFAULT_PAGE_TITLE: &str = "Untitled";
pub const WELCOME_TEXT: &str = "Welcome to your block editor. Click here to start writing.";

/// Settings that shape a new workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Title given to pages added without one.
    pub default_page_title: String,
    /// Title of the page every workspace starts with.
    pub initial_page_title: String,
    /// Paragraph seeded into the initial page, if any.
    pub welcome_text: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditorConfig {
    /// Defaults without the welcome paragraph.
    pub fn blank() -> Self {
        Self {
            welcome_text: None,
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_page_title: DEFAULT_PAGE_TITLE.to_string(),
            initial_page_title: DEFAULT_PAGE_TITLE.to_string(),
            welcome_text: Some(WELCOME_TEXT.to_string()),
        }
    }
}
