pub mod types;
pub mod helpers;
pub mod chapter_names;
pub mod reference;
pub mod bidi_text;
pub mod content_loader;
pub mod section_view;
pub mod html_content;
pub mod app_settings;
pub mod logger;

use std::env;
use std::fs::create_dir_all;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use app_dirs::{get_app_root, AppDataType, AppInfo};
use dotenvy::dotenv;

pub const APP_INFO: AppInfo = AppInfo{name: "tadabbur", author: "tadabbur-halaqah"};

pub static DEFAULT_CONTENT_DIR: &str = "public";

/// Process-wide settings read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct AppGlobals {
    /// Base URL of the static site serving /data and /quran, e.g. https://example.org
    pub content_url: Option<String>,
    /// Local directory mirroring the static site, used when no URL is set.
    pub content_dir: PathBuf,
}

impl AppGlobals {
    pub fn new() -> Self {
        dotenv().ok();

        let content_url = env::var("TADABBUR_CONTENT_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let content_dir = match env::var("TADABBUR_CONTENT_DIR") {
            Ok(s) if !s.trim().is_empty() => PathBuf::from(s),
            _ => PathBuf::from(DEFAULT_CONTENT_DIR),
        };

        AppGlobals {
            content_url,
            content_dir,
        }
    }
}

impl Default for AppGlobals {
    fn default() -> Self {
        Self::new()
    }
}

pub static APP_GLOBALS: OnceLock<AppGlobals> = OnceLock::new();

pub fn init_app_globals() {
    APP_GLOBALS.get_or_init(AppGlobals::new);
}

pub fn get_app_globals() -> &'static AppGlobals {
    APP_GLOBALS.get_or_init(AppGlobals::new)
}

/// The directory holding logs and settings.
///
/// Precedence: TADABBUR_DIR env var, then the platform user data root.
pub fn get_create_tadabbur_dir() -> Result<PathBuf> {
    dotenv().ok();

    let p = match env::var("TADABBUR_DIR") {
        Ok(s) if !s.trim().is_empty() => PathBuf::from(s),
        _ => get_app_root(AppDataType::UserData, &APP_INFO)
            .context("Can't determine the user data directory")?,
    };

    if !p.exists() {
        create_dir_all(&p)
            .with_context(|| format!("Failed to create {}", p.display()))?;
    }
    Ok(p)
}

pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_create_tadabbur_dir()?.join("settings.json"))
}
