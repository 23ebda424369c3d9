use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use reqwest::header::CACHE_CONTROL;
use serde::de::DeserializeOwned;

use crate::get_app_globals;
use crate::logger::{error, info};
use crate::types::{LoadError, Section, SectionKey, TranslationTable};

pub static TRANSLATION_RESOURCE: &str = "/quran/en.json";
pub static BONUS_RESOURCE: &str = "/data/bonus.json";

/// Where the static content files come from.
///
/// Resources are site-absolute paths such as "/data/juz-01.json".
pub trait ContentSource {
    fn fetch(&self, resource: &str) -> Result<String, LoadError>;
}

/// Fetches from a static web server.
pub struct HttpSource {
    base_url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn url_for(&self, resource: &str) -> String {
        format!("{}{}", self.base_url, resource)
    }
}

impl ContentSource for HttpSource {
    fn fetch(&self, resource: &str) -> Result<String, LoadError> {
        let url = self.url_for(resource);

        let response = self.client
            .get(&url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .map_err(|e| LoadError::Transport {
                resource: resource.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(LoadError::Status {
                resource: resource.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().map_err(|e| LoadError::Transport {
            resource: resource.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Reads from a local directory laid out like the static site,
/// i.e. <root>/data/juz-01.json and <root>/quran/en.json
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: &Path) -> Self {
        Self { root: root.to_path_buf() }
    }

    pub fn path_for(&self, resource: &str) -> PathBuf {
        self.root.join(resource.trim_start_matches('/'))
    }
}

impl ContentSource for DirSource {
    fn fetch(&self, resource: &str) -> Result<String, LoadError> {
        let path = self.path_for(resource);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(s),
            // Same as the web server answering 404
            Err(e) if e.kind() == ErrorKind::NotFound => Err(LoadError::Status {
                resource: resource.to_string(),
                status: 404,
            }),
            Err(e) => Err(LoadError::Transport {
                resource: resource.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// The source configured with TADABBUR_CONTENT_URL or TADABBUR_CONTENT_DIR.
pub fn default_content_source() -> Box<dyn ContentSource> {
    let g = get_app_globals();
    match &g.content_url {
        Some(url) => Box::new(HttpSource::new(url)),
        None => Box::new(DirSource::new(&g.content_dir)),
    }
}

/// Numbered sections map to zero-padded file names, juz 1 is /data/juz-01.json
pub fn section_resource(key: SectionKey) -> String {
    match key {
        SectionKey::Juz(n) => format!("/data/juz-{:02}.json", n),
        SectionKey::Bonus => BONUS_RESOURCE.to_string(),
    }
}

fn parse_json<T: DeserializeOwned>(resource: &str, body: &str) -> Result<T, LoadError> {
    serde_json::from_str::<T>(body).map_err(|e| LoadError::Parse {
        resource: resource.to_string(),
        reason: e.to_string(),
    })
}

/// Check the invariants serde can't express.
fn validate_section(resource: &str, section: &Section) -> Result<(), LoadError> {
    for q in section.items.iter() {
        if q.answer.surah.is_some() && q.answer.ayahs.is_empty() {
            return Err(LoadError::Malformed {
                resource: resource.to_string(),
                reason: format!("question {} cites a chapter without verse numbers", q.q_num),
            });
        }
    }
    Ok(())
}

pub fn load_section(source: &dyn ContentSource, key: SectionKey) -> Result<Section, LoadError> {
    let resource = section_resource(key);
    info(&format!("Loading section: {}", resource));

    let result = source
        .fetch(&resource)
        .and_then(|body| parse_json::<Section>(&resource, &body))
        .and_then(|section| {
            validate_section(&resource, &section)?;
            Ok(section)
        });

    match result {
        Ok(mut section) => {
            section.key = Some(key);
            Ok(section)
        }
        Err(e) => {
            error(&e.to_string());
            Err(e)
        }
    }
}

/// Load by route id, "7" or "bonus". Unknown keys fail before anything is fetched.
pub fn load_section_str(source: &dyn ContentSource, raw_key: &str) -> Result<Section, LoadError> {
    let key = raw_key.parse::<SectionKey>().map_err(|e| {
        error(&e.to_string());
        LoadError::from(e)
    })?;
    load_section(source, key)
}

pub fn load_translation(source: &dyn ContentSource) -> Result<TranslationTable, LoadError> {
    info(&format!("Loading translation: {}", TRANSLATION_RESOURCE));
    source
        .fetch(TRANSLATION_RESOURCE)
        .and_then(|body| parse_json::<TranslationTable>(TRANSLATION_RESOURCE, &body))
}
