use std::collections::BTreeSet;

use serde::Serialize;

use crate::bidi_text::{render_paragraphs, render_segments, text_direction, Paragraph, Segment, TextDirection};
use crate::content_loader::{load_section, load_translation, ContentSource};
use crate::helpers::{contains_ignore_case, normalize_paragraphs};
use crate::logger::warn;
use crate::reference::resolve_reference;
use crate::types::{Difficulty, LanguageMode, LoadError, Question, Section, SectionKey, TranslationTable};

#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded(Section),
    /// Terminal for this load, holds the message shown to the user
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Headers {
    pub answer: &'static str,
    pub explanation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerView {
    /// English verse text, one verse per line
    pub verse_en: Option<String>,
    /// Normalized Arabic verse text, each paragraph with its own direction
    pub verse_ar: Option<Vec<Paragraph>>,
    pub verse_ar_direction: TextDirection,
    pub reference_en: Option<String>,
    pub reference_ar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplanationView {
    pub commentary_en: Option<Vec<Paragraph>>,
    pub commentary_ar: Option<Vec<Paragraph>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub q_num: u32,
    pub difficulty: Option<Difficulty>,
    pub theme: Option<String>,
    pub question_en: Option<Vec<Segment>>,
    pub question_ar: Option<String>,
    pub is_open: bool,
    /// Only set for open questions
    pub answer: Option<AnswerView>,
    /// Only set for open questions with commentary in a shown language
    pub explanation: Option<ExplanationView>,
}

/// English text for the given verses of a chapter, joined with newlines.
/// Verses missing from the table are skipped.
pub fn english_verse_text(translation: Option<&TranslationTable>, chapter: u32, verses: &[u32]) -> String {
    let chapter_verses = match translation.and_then(|t| t.get(&chapter.to_string())) {
        Some(v) => v,
        None => return String::new(),
    };

    verses.iter()
          .filter_map(|n| chapter_verses.iter().find(|v| v.verse == *n))
          .map(|v| v.text.as_str())
          .filter(|s| !s.is_empty())
          .collect::<Vec<&str>>()
          .join("\n")
}

pub fn question_matches(question: &Question, query: &str) -> bool {
    contains_ignore_case(&question.question_en, query)
        || contains_ignore_case(&question.question_ar, query)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

fn non_empty_paragraphs(paragraphs: Vec<Paragraph>) -> Option<Vec<Paragraph>> {
    if paragraphs.is_empty() { None } else { Some(paragraphs) }
}

/// State of the page showing one section: what's loaded, the language
/// toggle, the search box and which questions are expanded.
#[derive(Debug, Clone, Default)]
pub struct SectionView {
    key: Option<SectionKey>,
    state: LoadState,
    translation: Option<TranslationTable>,
    language: LanguageMode,
    search: String,
    open: BTreeSet<u32>,
}

impl SectionView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(language: LanguageMode) -> Self {
        SectionView {
            language,
            ..Default::default()
        }
    }

    /// Switch to another section. The previous content and open questions are dropped.
    pub fn navigate(&mut self, raw_key: &str) -> Result<SectionKey, LoadError> {
        self.open.clear();
        match raw_key.parse::<SectionKey>() {
            Ok(key) => {
                self.key = Some(key);
                self.state = LoadState::Loading;
                Ok(key)
            }
            Err(e) => {
                self.key = None;
                self.state = LoadState::Failed(e.to_string());
                Err(LoadError::from(e))
            }
        }
    }

    /// Store a load result. Whatever arrives last is what's shown.
    pub fn set_section_result(&mut self, result: Result<Section, LoadError>) {
        self.state = match result {
            Ok(section) => {
                if let Some(key) = section.key {
                    self.key = Some(key);
                }
                LoadState::Loaded(section)
            }
            Err(e) => LoadState::Failed(e.to_string()),
        };
    }

    /// A missing translation only leaves the English verse text empty.
    pub fn set_translation(&mut self, result: Result<TranslationTable, LoadError>) {
        match result {
            Ok(table) => self.translation = Some(table),
            Err(e) => warn(&format!("English verse text unavailable: {}", e)),
        }
    }

    /// Navigate and load through the given source. The translation is fetched
    /// once and kept for later sections.
    pub fn open_section(&mut self, source: &dyn ContentSource, raw_key: &str) {
        if let Ok(key) = self.navigate(raw_key) {
            self.set_section_result(load_section(source, key));
        }
        if self.translation.is_none() {
            self.set_translation(load_translation(source));
        }
    }

    pub fn key(&self) -> Option<SectionKey> {
        self.key
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn section(&self) -> Option<&Section> {
        match &self.state {
            LoadState::Loaded(section) => Some(section),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn translation(&self) -> Option<&TranslationTable> {
        self.translation.as_ref()
    }

    pub fn language(&self) -> LanguageMode {
        self.language
    }

    pub fn set_language(&mut self, language: LanguageMode) {
        self.language = language;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: &str) {
        self.search = query.to_string();
    }

    pub fn is_open(&self, q_num: u32) -> bool {
        self.open.contains(&q_num)
    }

    /// Open or close one question without affecting the others.
    pub fn toggle_open(&mut self, q_num: u32) {
        if !self.open.remove(&q_num) {
            self.open.insert(q_num);
        }
    }

    pub fn expand_all(&mut self) {
        if let Some(section) = self.section() {
            let all: Vec<u32> = section.items.iter().map(|q| q.q_num).collect();
            self.open.extend(all);
        }
    }

    pub fn collapse_all(&mut self) {
        self.open.clear();
    }

    pub fn page_title(&self) -> String {
        match self.key {
            Some(SectionKey::Bonus) => "Advanced Questions".to_string(),
            Some(SectionKey::Juz(n)) => format!("Juz {}", n),
            None => String::new(),
        }
    }

    pub fn headers(&self) -> Headers {
        if self.language == LanguageMode::Arabic {
            Headers { answer: "الآية", explanation: "الشرح" }
        } else {
            Headers { answer: "Answer", explanation: "Explanation" }
        }
    }

    /// Questions matching the search box, in file order.
    pub fn filtered_questions(&self) -> Vec<&Question> {
        match self.section() {
            Some(section) => section.items
                .iter()
                .filter(|q| question_matches(q, &self.search))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn question_views(&self) -> Vec<QuestionView> {
        self.filtered_questions()
            .into_iter()
            .map(|q| self.question_view(q))
            .collect()
    }

    fn question_view(&self, q: &Question) -> QuestionView {
        let show_en = self.language.shows_english();
        let show_ar = self.language.shows_arabic();
        let is_open = self.is_open(q.q_num);

        let answer = if is_open { Some(self.answer_view(q)) } else { None };

        // Omitted entirely when there is no commentary in the shown languages
        let explanation = if is_open && q.answer.has_explanation() {
            let e = ExplanationView {
                commentary_en: q.answer.commentary_en.as_deref()
                    .filter(|_| show_en)
                    .map(render_paragraphs)
                    .and_then(non_empty_paragraphs),
                commentary_ar: Some(normalize_paragraphs(q.answer.commentary_ar.as_deref()))
                    .filter(|_| show_ar)
                    .map(|s| render_paragraphs(&s))
                    .and_then(non_empty_paragraphs),
            };
            if e.commentary_en.is_none() && e.commentary_ar.is_none() { None } else { Some(e) }
        } else {
            None
        };

        QuestionView {
            q_num: q.q_num,
            difficulty: q.difficulty,
            theme: q.theme.clone(),
            question_en: if show_en { Some(render_segments(&q.question_en)) } else { None },
            question_ar: if show_ar { Some(q.question_ar.clone()) } else { None },
            is_open,
            answer,
            explanation,
        }
    }

    fn answer_view(&self, q: &Question) -> AnswerView {
        let show_en = self.language.shows_english();
        let show_ar = self.language.shows_arabic();
        let a = &q.answer;

        let verse_en = match a.surah {
            Some(chapter) => english_verse_text(self.translation.as_ref(), chapter, &a.ayahs),
            None => String::new(),
        };

        let labels = resolve_reference(a.surah, &a.ayahs);
        let verse_ar = normalize_paragraphs(Some(&a.ayah_ar));

        AnswerView {
            verse_en: if show_en { Some(verse_en) } else { None },
            verse_ar: if show_ar { Some(render_paragraphs(&verse_ar)) } else { None },
            verse_ar_direction: text_direction(&verse_ar),
            reference_en: Some(labels.english).filter(|_| show_en).and_then(non_empty),
            reference_ar: Some(labels.arabic).filter(|_| show_ar).and_then(non_empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Answer, Verse};

    fn question(q_num: u32, en: &str, ar: &str) -> Question {
        Question {
            q_num,
            question_ar: ar.to_string(),
            question_en: en.to_string(),
            difficulty: None,
            theme: None,
            answer: Answer::default(),
        }
    }

    fn loaded_view() -> SectionView {
        let mut view = SectionView::new();
        view.navigate("3").expect("Valid key");
        view.set_section_result(Ok(Section {
            key: Some(SectionKey::Juz(3)),
            juz: None,
            items: vec![
                question(1, "Who said: My Lord, show me?", "من قال رب أرني"),
                question(2, "Which verse mentions patience?", "أي آية تذكر الصبر"),
                question(5, "What is the Throne Verse?", "ما هي آية الكرسي"),
            ],
        }));
        view
    }

    #[test]
    fn test_toggle_open_is_per_question() {
        let mut view = loaded_view();
        assert!(!view.is_open(1));
        assert!(!view.is_open(2));

        view.toggle_open(1);
        view.toggle_open(5);
        assert!(view.is_open(1));
        assert!(view.is_open(5));
        assert!(!view.is_open(2));

        view.toggle_open(1);
        assert!(!view.is_open(1));
        assert!(view.is_open(5));
    }

    #[test]
    fn test_search_both_languages() {
        let mut view = loaded_view();
        view.set_search("THRONE");
        let nums: Vec<u32> = view.filtered_questions().iter().map(|q| q.q_num).collect();
        assert_eq!(nums, vec![5]);

        view.set_search("الصبر");
        let nums: Vec<u32> = view.filtered_questions().iter().map(|q| q.q_num).collect();
        assert_eq!(nums, vec![2]);

        view.set_search("  ");
        assert_eq!(view.filtered_questions().len(), 3);
    }

    #[test]
    fn test_open_state_survives_search() {
        let mut view = loaded_view();
        view.toggle_open(5);
        view.set_search("throne");
        let views = view.question_views();
        assert_eq!(views.len(), 1);
        assert!(views[0].is_open);
    }

    #[test]
    fn test_navigate_resets_open_state() {
        let mut view = loaded_view();
        view.toggle_open(1);
        view.navigate("bonus").expect("Valid key");
        assert!(!view.is_open(1));
        assert!(matches!(view.state(), LoadState::Loading));
        assert_eq!(view.page_title(), "Advanced Questions");
    }

    #[test]
    fn test_invalid_key_is_terminal_error() {
        let mut view = SectionView::new();
        assert!(view.navigate("intro").is_err());
        assert_eq!(view.error(), Some("Invalid juz key: intro"));
        assert!(view.question_views().is_empty());
    }

    #[test]
    fn test_last_result_wins() {
        let mut view = loaded_view();
        view.set_section_result(Err(LoadError::Status { resource: "/data/juz-03.json".to_string(), status: 500 }));
        assert_eq!(view.error(), Some("Failed to fetch /data/juz-03.json (500)"));
        assert!(view.section().is_none());
    }

    #[test]
    fn test_english_verse_text() {
        let mut table = TranslationTable::new();
        table.insert("2".to_string(), vec![
            Verse { chapter: 2, verse: 45, text: "And seek help through patience and prayer".to_string() },
            Verse { chapter: 2, verse: 46, text: "Who are certain that they will meet their Lord".to_string() },
        ]);

        assert_eq!(
            english_verse_text(Some(&table), 2, &[45, 46]),
            "And seek help through patience and prayer\nWho are certain that they will meet their Lord"
        );
        assert_eq!(english_verse_text(Some(&table), 2, &[45, 99]), "And seek help through patience and prayer");
        assert_eq!(english_verse_text(Some(&table), 3, &[1]), "");
        assert_eq!(english_verse_text(None, 2, &[45]), "");
    }

    #[test]
    fn test_headers_follow_language() {
        let mut view = SectionView::new();
        assert_eq!(view.headers().answer, "Answer");
        view.set_language(LanguageMode::Arabic);
        assert_eq!(view.headers().answer, "الآية");
        assert_eq!(view.headers().explanation, "الشرح");
    }
}
