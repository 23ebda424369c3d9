use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::chapter_names::{CHAPTER_COUNT, SURAH_AR, SURAH_EN};

/// Human-readable citation labels for an answer, e.g. "Chapter Al-Baqarah — Verse 45-46"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceLabels {
    pub english: String,
    pub arabic: String,
}

impl ReferenceLabels {
    pub fn is_empty(&self) -> bool {
        self.english.is_empty() && self.arabic.is_empty()
    }
}

fn in_table(chapter: u32) -> bool {
    (1..=CHAPTER_COUNT).contains(&chapter)
}

pub fn chapter_name_en(chapter: u32) -> Option<&'static str> {
    if in_table(chapter) {
        Some(SURAH_EN[chapter as usize])
    } else {
        None
    }
}

pub fn chapter_name_ar(chapter: u32) -> Option<&'static str> {
    if in_table(chapter) {
        Some(SURAH_AR[chapter as usize])
    } else {
        None
    }
}

/// Compact label for a set of verse numbers: "45", "45-46" or "45, 47".
///
/// A range is only used for a strictly consecutive run of two or more.
/// Duplicates are kept as given.
pub fn format_verse_label(verses: &[u32]) -> String {
    if verses.is_empty() {
        return String::new();
    }

    let mut sorted = verses.to_vec();
    sorted.sort_unstable();

    let is_consecutive = sorted.len() > 1
        && sorted.windows(2).all(|w| w[0].checked_add(1) == Some(w[1]));

    if is_consecutive {
        return format!("{}-{}", sorted[0], sorted[sorted.len() - 1]);
    }

    sorted.iter()
          .map(|n| n.to_string())
          .collect::<Vec<_>>()
          .join(", ")
}

/// Labels for the reference line under an answer. Empty when there's no chapter.
pub fn resolve_reference(chapter: Option<u32>, verses: &[u32]) -> ReferenceLabels {
    let chapter = match chapter {
        Some(n) => n,
        None => return ReferenceLabels::default(),
    };

    let label = format_verse_label(verses);

    // Out of range chapters show the number in the name slot, i.e. "Chapter 115".
    let name_en = chapter_name_en(chapter).map(|s| s.to_string()).unwrap_or_else(|| chapter.to_string());
    let name_ar = chapter_name_ar(chapter).map(|s| s.to_string()).unwrap_or_else(|| chapter.to_string());

    ReferenceLabels {
        english: format!("Chapter {} — Verse {}", name_en, label),
        arabic: format!("سورة {} — الآية {}", name_ar, label),
    }
}

lazy_static! {
    static ref RE_SPACES: Regex = Regex::new(r"\s+").unwrap();
    static ref RE_HARAKAT: Regex = Regex::new(r"[\u{064B}-\u{0652}\u{0670}]").unwrap();
    static ref RE_DIGITS: Regex = Regex::new(r"\d+").unwrap();

    static ref CHAPTER_BY_ARABIC_NAME: HashMap<String, u32> = {
        let mut m = HashMap::new();
        for n in 1..=CHAPTER_COUNT {
            m.insert(normalize_arabic_chapter_name(SURAH_AR[n as usize]), n);
        }
        m
    };
}

/// Fold spelling variants of an Arabic chapter name for lookup:
/// no tatweel, no whitespace, no harakat, plain alef.
pub fn normalize_arabic_chapter_name(name: &str) -> String {
    let s = name.replace('ـ', "");
    let s = RE_SPACES.replace_all(s.trim(), "").to_string();
    let s = RE_HARAKAT.replace_all(&s, "").to_string();
    s.replace(['أ', 'إ', 'آ'], "ا")
}

pub fn chapter_number_from_arabic_name(name: &str) -> Option<u32> {
    CHAPTER_BY_ARABIC_NAME.get(&normalize_arabic_chapter_name(name)).copied()
}

/// Parse an authored verse string such as "45", "84–85" or "3, 7".
///
/// A dashed pair is expanded to the inclusive range when it runs forward.
pub fn parse_verse_numbers(text: &str) -> Vec<u32> {
    let s = text.trim().replace(['–', '—'], "-");

    let nums: Vec<u32> = RE_DIGITS
        .find_iter(&s)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .collect();

    if s.contains('-') && nums.len() >= 2 {
        let (start, end) = (nums[0], nums[1]);
        if end >= start {
            return (start..=end).collect();
        }
    }

    nums
}
