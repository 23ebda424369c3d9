use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Serialize, Deserialize};

use crate::types::LanguageMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub language_mode: LanguageMode,
    pub font_size: usize,
    pub max_width: usize,
    pub theme_name: ThemeName,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            language_mode: LanguageMode::Both,
            font_size: 16,
            max_width: 56,
            theme_name: ThemeName::System,
        }
    }
}

impl AppSettings {
    pub fn theme_name_as_string(&self) -> String {
        match self.theme_name {
            ThemeName::System => "system".to_string(),
            ThemeName::Light => "light".to_string(),
            ThemeName::Dark => "dark".to_string(),
        }
    }

    /// Read settings.json, or the defaults if there isn't one yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(AppSettings::default());
        }
        let s = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings = serde_json::from_str(&s)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let s = serde_json::to_string_pretty(self)?;
        fs::write(path, s)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeName {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "light")]
    Light,
    #[serde(rename = "dark")]
    Dark,
}
