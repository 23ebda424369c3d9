use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub static JUZ_COUNT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKey {
    /// One of the numbered sections, 1..=30
    Juz(u32),
    /// The supplementary "Advanced Questions" section
    Bonus,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseSectionKeyError {
    #[error("Invalid juz number: {0}")]
    InvalidNumber(String),
    #[error("Invalid juz key: {0}")]
    InvalidKey(String),
}

impl SectionKey {
    /// Numbered sections in order, followed by the bonus section.
    pub fn all() -> Vec<SectionKey> {
        let mut keys: Vec<SectionKey> = (1..=JUZ_COUNT).map(SectionKey::Juz).collect();
        keys.push(SectionKey::Bonus);
        keys
    }

    pub fn from_number(n: u32) -> Result<Self, ParseSectionKeyError> {
        if (1..=JUZ_COUNT).contains(&n) {
            Ok(SectionKey::Juz(n))
        } else {
            Err(ParseSectionKeyError::InvalidNumber(n.to_string()))
        }
    }

    pub fn is_bonus(&self) -> bool {
        matches!(self, SectionKey::Bonus)
    }

    /// Route segment, as in /juz/7 or /juz/bonus
    pub fn route_id(&self) -> String {
        match self {
            SectionKey::Juz(n) => n.to_string(),
            SectionKey::Bonus => "bonus".to_string(),
        }
    }
}

impl FromStr for SectionKey {
    type Err = ParseSectionKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            // Digit strings too long for u32 are out of range all the same.
            return match s.parse::<u32>() {
                Ok(n) => SectionKey::from_number(n),
                Err(_) => Err(ParseSectionKeyError::InvalidNumber(s.to_string())),
            };
        }
        if s.eq_ignore_ascii_case("bonus") {
            return Ok(SectionKey::Bonus);
        }
        Err(ParseSectionKeyError::InvalidKey(s.to_string()))
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SectionKey::Juz(n) => write!(f, "Juz {}", n),
            SectionKey::Bonus => write!(f, "Advanced Questions"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "easy")]
    Easy,
    #[serde(rename = "med")]
    Med,
    #[serde(rename = "hard")]
    Hard,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid Difficulty value: {0}")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "med" | "medium" => Ok(Difficulty::Med),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Med => "Med",
            Difficulty::Hard => "Hard",
        }
    }

    /// Chip colour classes
    pub fn css_class(&self) -> &'static str {
        match self {
            Difficulty::Easy => "chip-easy",
            Difficulty::Med => "chip-med",
            Difficulty::Hard => "chip-hard",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageMode {
    #[default]
    #[serde(rename = "both")]
    Both,
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "en")]
    English,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid LanguageMode value: {0}")]
pub struct ParseLanguageModeError(String);

impl FromStr for LanguageMode {
    type Err = ParseLanguageModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "both" => Ok(LanguageMode::Both),
            "ar" | "arabic" => Ok(LanguageMode::Arabic),
            "en" | "english" => Ok(LanguageMode::English),
            _ => Err(ParseLanguageModeError(s.to_string())),
        }
    }
}

impl LanguageMode {
    pub fn shows_arabic(&self) -> bool {
        matches!(self, LanguageMode::Arabic | LanguageMode::Both)
    }

    pub fn shows_english(&self) -> bool {
        matches!(self, LanguageMode::English | LanguageMode::Both)
    }
}

/// The `juz` field as authored: a number for the numbered files, free text in bonus.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionNumber {
    Number(u32),
    Label(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Set by the loader, not read from the file.
    #[serde(skip)]
    pub key: Option<SectionKey>,
    #[serde(default)]
    pub juz: Option<SectionNumber>,
    #[serde(default)]
    pub items: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "qNum")]
    pub q_num: u32,
    #[serde(default)]
    pub question_ar: String,
    #[serde(default)]
    pub question_en: String,
    #[serde(default, deserialize_with = "deserialize_difficulty")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub theme: Option<String>,
    pub answer: Answer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Answer {
    /// Chapter number, None when the answer isn't a standard verse citation.
    #[serde(default)]
    pub surah: Option<u32>,
    #[serde(default)]
    pub ayahs: Vec<u32>,
    #[serde(default)]
    pub ayah_ar: String,
    #[serde(default)]
    pub commentary_ar: Option<String>,
    #[serde(default)]
    pub commentary_en: Option<String>,
}

impl Answer {
    pub fn has_explanation(&self) -> bool {
        let non_blank = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.trim().is_empty());
        non_blank(&self.commentary_ar) || non_blank(&self.commentary_en)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

/// Chapter number as string key -> verses of that chapter in order.
pub type TranslationTable = BTreeMap<String, Vec<Verse>>;

/// Empty strings in the content files mean "not set".
fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Unrecognized values are treated like absent tags.
fn deserialize_difficulty<'de, D>(deserializer: D) -> Result<Option<Difficulty>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserialize_non_empty(deserializer)?;
    Ok(value.and_then(|s| s.parse::<Difficulty>().ok()))
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Failed to fetch {resource} ({status})")]
    Status { resource: String, status: u16 },
    #[error("Failed to fetch {resource}: {reason}")]
    Transport { resource: String, reason: String },
    #[error("Failed to parse {resource}: {reason}")]
    Parse { resource: String, reason: String },
    #[error("Malformed content in {resource}: {reason}")]
    Malformed { resource: String, reason: String },
    #[error(transparent)]
    Key(#[from] ParseSectionKeyError),
}

impl LoadError {
    /// The resource path this error is about, if any.
    pub fn resource(&self) -> Option<&str> {
        match self {
            LoadError::Status { resource, .. }
            | LoadError::Transport { resource, .. }
            | LoadError::Parse { resource, .. }
            | LoadError::Malformed { resource, .. } => Some(resource),
            LoadError::Key(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            LoadError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
