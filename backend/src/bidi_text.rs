//! Bidi-safe rendering of text mixing Arabic and English.
//!
//! Authored text marks quoted verses with ornate parentheses, ﴿like this﴾.
//! The text is split into plain runs and citation runs. Each run is wrapped
//! in a bidi isolate when displayed, so an Arabic citation inside an English
//! sentence (or the other way around) can't reorder its neighbours.
//!
//! Citation runs additionally get a direction override. The bracket glyphs
//! are neutral punctuation and would otherwise be mirrored or moved by the
//! surrounding paragraph direction.
//!
//! The tokenizer takes the shortest span from an opening glyph to the next
//! closing glyph on the same line. Nesting is not recognized: in
//! `﴿a ﴿b﴾ c﴾` the first citation's inner text is `a ﴿b` and ` c﴾` stays plain.

use html_escape::encode_text;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::helpers::{CLOSE_BRACKET, OPEN_BRACKET};

pub const LTR_ISOLATE: char = '\u{2066}'; // LRI
pub const RTL_ISOLATE: char = '\u{2067}'; // RLI
pub const FIRST_STRONG_ISOLATE: char = '\u{2068}'; // FSI
pub const POP_ISOLATE: char = '\u{2069}'; // PDI
pub const LTR_OVERRIDE: char = '\u{202D}'; // LRO
pub const RTL_OVERRIDE: char = '\u{202E}'; // RLO
pub const POP_FORMATTING: char = '\u{202C}'; // PDF

lazy_static! {
    static ref RE_CITATION: Regex = Regex::new(r"﴿.*?﴾").unwrap();
    static ref RE_ARABIC: Regex = Regex::new(r"[\u{0600}-\u{06FF}]").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TextDirection {
    #[serde(rename = "ltr")]
    Ltr,
    #[serde(rename = "rtl")]
    Rtl,
}

impl TextDirection {
    /// Value for the HTML dir attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }

    pub fn isolate_char(&self) -> char {
        match self {
            TextDirection::Ltr => LTR_ISOLATE,
            TextDirection::Rtl => RTL_ISOLATE,
        }
    }

    pub fn override_char(&self) -> char {
        match self {
            TextDirection::Ltr => LTR_OVERRIDE,
            TextDirection::Rtl => RTL_OVERRIDE,
        }
    }
}

/// True if the text has any character from the Arabic block (U+0600..U+06FF).
pub fn contains_arabic_letters(text: &str) -> bool {
    RE_ARABIC.is_match(text)
}

pub fn text_direction(text: &str) -> TextDirection {
    if contains_arabic_letters(text) {
        TextDirection::Rtl
    } else {
        TextDirection::Ltr
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Segment {
    /// Text outside citation markers, no direction of its own
    Plain(String),
    /// Inner text of a ﴿…﴾ citation, without the brackets
    Citation(String),
}

impl Segment {
    /// The exact source text this segment was cut from, brackets included.
    pub fn source_text(&self) -> String {
        match self {
            Segment::Plain(s) => s.clone(),
            Segment::Citation(inner) => format!("{}{}{}", OPEN_BRACKET, inner, CLOSE_BRACKET),
        }
    }

    /// Citations are classified from their own text. Plain runs follow the paragraph.
    pub fn direction(&self) -> Option<TextDirection> {
        match self {
            Segment::Plain(_) => None,
            Segment::Citation(inner) => Some(text_direction(inner)),
        }
    }

    pub fn is_citation(&self) -> bool {
        matches!(self, Segment::Citation(_))
    }
}

/// Split text into plain and citation segments, in source order.
///
/// Empty plain runs (e.g. between two adjacent citations) are not emitted,
/// so empty input gives no segments.
pub fn render_segments(text: &str) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut last_end = 0;

    for m in RE_CITATION.find_iter(text) {
        if m.start() > last_end {
            segments.push(Segment::Plain(text[last_end..m.start()].to_string()));
        }
        let token = m.as_str();
        let inner = &token[OPEN_BRACKET.len_utf8()..token.len() - CLOSE_BRACKET.len_utf8()];
        segments.push(Segment::Citation(inner.to_string()));
        last_end = m.end();
    }

    if last_end < text.len() {
        segments.push(Segment::Plain(text[last_end..].to_string()));
    }

    segments
}

/// Concatenate segments back into source text.
pub fn segments_source_text(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.source_text()).collect()
}

/// A block of text between blank lines, classified on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub direction: TextDirection,
    pub segments: Vec<Segment>,
}

impl Paragraph {
    pub fn source_text(&self) -> String {
        segments_source_text(&self.segments)
    }
}

/// Split text on blank lines and segment each paragraph.
///
/// An English paragraph inside an Arabic block stays left-to-right and the
/// other way around. Blank paragraphs are dropped.
pub fn render_paragraphs(text: &str) -> Vec<Paragraph> {
    text.split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .map(|p| Paragraph {
            direction: text_direction(p),
            segments: render_segments(p),
        })
        .collect()
}

/// HTML for one segment. Every segment is isolated; citations also lock their direction.
pub fn segment_html(segment: &Segment) -> String {
    match segment {
        Segment::Plain(s) => {
            format!(r#"<span style="unicode-bidi: isolate;">{}</span>"#, encode_text(s))
        }
        Segment::Citation(inner) => {
            let dir = text_direction(inner);
            format!(
                r#"<span class="quran-token" dir="{}" style="unicode-bidi: isolate-override; display: inline-block;">{}{}{}</span>"#,
                dir.as_str(),
                OPEN_BRACKET,
                encode_text(inner),
                CLOSE_BRACKET,
            )
        }
    }
}

pub fn segments_html(segments: &[Segment]) -> String {
    segments.iter().map(segment_html).collect()
}

/// Render text with citation markers as HTML.
pub fn render_html(text: &str) -> String {
    segments_html(&render_segments(text))
}

/// One `<p>` per paragraph, each with its own dir attribute.
pub fn paragraphs_html(paragraphs: &[Paragraph]) -> String {
    paragraphs.iter()
              .map(|p| format!(r#"<p dir="{}">{}</p>"#, p.direction.as_str(), segments_html(&p.segments)))
              .collect()
}

/// Plain text for one segment, with Unicode isolate and override controls.
///
/// Plain runs use a first-strong isolate. Citations use a directional isolate
/// holding a directional override around the bracketed text.
pub fn segment_isolated_text(segment: &Segment) -> String {
    match segment {
        Segment::Plain(s) => format!("{}{}{}", FIRST_STRONG_ISOLATE, s, POP_ISOLATE),
        Segment::Citation(inner) => {
            let dir = text_direction(inner);
            format!(
                "{}{}{}{}{}{}{}",
                dir.isolate_char(),
                dir.override_char(),
                OPEN_BRACKET,
                inner,
                CLOSE_BRACKET,
                POP_FORMATTING,
                POP_ISOLATE,
            )
        }
    }
}

/// One paragraph, wrapped in an isolate of its own direction with each
/// segment isolated inside it.
pub fn paragraph_isolated_text(paragraph: &Paragraph) -> String {
    format!(
        "{}{}{}",
        paragraph.direction.isolate_char(),
        paragraph.segments.iter().map(segment_isolated_text).collect::<String>(),
        POP_ISOLATE,
    )
}

/// Wrap a whole paragraph in an isolate of its own classified direction.
pub fn isolate_paragraph(text: &str) -> String {
    let dir = text_direction(text);
    format!("{}{}{}", dir.isolate_char(), text, POP_ISOLATE)
}
