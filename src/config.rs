use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LinguaError, Result};

const DEFAULT_CSV_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vTrV7dL1Po9d0XS6hI90aPzuXqO21lghMcw5SjcIGOy3j4b1glE4TA8YgsqHMqoiKklaBydSQCHgpZn/pub?output=csv";
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub csv_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub source_language: String,
    pub target_language: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_url: DEFAULT_CSV_URL.into(),
            api_key: None,
            model: "gemini-2.5-flash".into(),
            source_language: "English".into(),
            target_language: "Turkish".into(),
            timeout_seconds: 30,
        }
    }
}

impl Config {
    /// Loads the user config, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| LinguaError::Config("no config directory on this platform".into()))?;
        Ok(dir.join("linguaflow").join("config.json"))
    }

    pub fn hard_words_path() -> Result<PathBuf> {
        let dir = dirs::data_dir()
            .ok_or_else(|| LinguaError::Config("no data directory on this platform".into()))?;
        Ok(dir.join("linguaflow").join("hard_words.json"))
    }

    /// Environment variables win over the config file.
    pub fn api_key(&self) -> Result<String> {
        API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .chain(self.api_key.clone())
            .find(|key| !key.trim().is_empty())
            .ok_or(LinguaError::MissingApiKey)
    }
}
