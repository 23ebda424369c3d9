use anyhow::{anyhow, Result};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::app_settings::AppSettings;
use crate::bidi_text::{paragraphs_html, segments_html};
use crate::section_view::{AnswerView, ExplanationView, Headers, QuestionView, SectionView};
use crate::types::{LanguageMode, SectionKey};

static PAGE_HTML: &str = include_str!("../../assets/templates/page.html");
static TADABBUR_CSS: &str = include_str!("../../assets/css/tadabbur.css");

#[derive(Serialize)]
struct TmplContext {
    title: String,
    lang: String,
    lang_dir: String,
    home_href: String,
    css_head: String,
    content: String,
    body_class: String,
}

impl Default for TmplContext {
    fn default() -> Self {
        TmplContext {
            title: "".to_string(),
            lang: "en".to_string(),
            lang_dir: "ltr".to_string(),
            home_href: "/".to_string(),
            css_head: TADABBUR_CSS.to_string(),
            content: "".to_string(),
            body_class: "".to_string(),
        }
    }
}

/// Link target for a section, /juz/7 or /juz/bonus
pub fn section_href(key: SectionKey) -> String {
    format!("/juz/{}", key.route_id())
}

fn render_page(mut ctx: TmplContext, settings: &AppSettings) -> Result<String> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("page_html", PAGE_HTML)
        .map_err(|e| anyhow!("Template error in page.html: {}", e))?;

    ctx.css_head.push_str(&format!(
        "\n:root {{ --base-font-size: {}px; --page-max-width: {}rem; }}\n",
        settings.font_size, settings.max_width,
    ));

    ctx.body_class = format!("{} theme-{}", ctx.body_class, settings.theme_name_as_string())
        .trim()
        .to_string();

    tt.render("page_html", &ctx)
        .map_err(|e| anyhow!("Failed to render page: {}", e))
}

/// The landing page listing the thirty juz and the advanced set.
pub fn home_html_page(settings: &AppSettings) -> Result<String> {
    let items: String = SectionKey::all()
        .into_iter()
        .map(|key| format!(
            r#"<li><a href="{}">{}</a></li>"#,
            encode_double_quoted_attribute(&section_href(key)),
            encode_text(&key.to_string()),
        ))
        .collect::<Vec<String>>()
        .join("\n");

    let ctx = TmplContext {
        title: "Tadabbur".to_string(),
        content: format!(r#"<ul class="juz-list">{}</ul>"#, items),
        body_class: "home".to_string(),
        ..Default::default()
    };

    render_page(ctx, settings)
}

pub fn error_html(message: &str) -> String {
    format!(r#"<div class="load-error" role="alert">{}</div>"#, encode_text(message))
}

fn chips_html(q: &QuestionView) -> String {
    let mut html = String::new();
    if let Some(d) = q.difficulty {
        html.push_str(&format!(r#"<span class="chip {}">{}</span>"#, d.css_class(), d.label()));
    }
    if let Some(theme) = &q.theme {
        html.push_str(&format!(r#"<span class="chip chip-theme">{}</span>"#, encode_text(theme)));
    }
    html
}

fn answer_html(a: &AnswerView, headers: &Headers) -> String {
    let mut html = format!(r#"<section class="answer"><h3>{}</h3>"#, headers.answer);

    if let Some(paragraphs) = &a.verse_ar {
        html.push_str(&format!(
            r#"<div class="verse-ar" dir="{}">{}</div>"#,
            a.verse_ar_direction.as_str(),
            paragraphs_html(paragraphs),
        ));
    }

    if let Some(text) = &a.verse_en {
        if !text.is_empty() {
            html.push_str(&format!(r#"<div class="verse-en" dir="ltr">{}</div>"#, encode_text(text)));
        }
    }

    if a.reference_en.is_some() || a.reference_ar.is_some() {
        html.push_str(r#"<p class="reference">"#);
        if let Some(r) = &a.reference_en {
            html.push_str(&format!(r#"<span class="reference-en" dir="ltr">{}</span>"#, encode_text(r)));
        }
        if a.reference_en.is_some() && a.reference_ar.is_some() {
            html.push_str(" • ");
        }
        if let Some(r) = &a.reference_ar {
            html.push_str(&format!(r#"<span class="reference-ar" dir="rtl">{}</span>"#, encode_text(r)));
        }
        html.push_str("</p>");
    }

    html.push_str("</section>");
    html
}

fn explanation_html(e: &ExplanationView, headers: &Headers) -> String {
    let mut html = format!(r#"<section class="explanation"><h3>{}</h3>"#, headers.explanation);
    if let Some(paragraphs) = &e.commentary_en {
        html.push_str(&format!(r#"<div class="commentary-en">{}</div>"#, paragraphs_html(paragraphs)));
    }
    if let Some(paragraphs) = &e.commentary_ar {
        html.push_str(&format!(r#"<div class="commentary-ar">{}</div>"#, paragraphs_html(paragraphs)));
    }
    html.push_str("</section>");
    html
}

pub fn question_html(q: &QuestionView, headers: &Headers) -> String {
    let mut summary = format!(
        r#"<span class="question-number">{}.</span>{}"#,
        q.q_num,
        chips_html(q),
    );
    if let Some(segments) = &q.question_en {
        summary.push_str(&format!(r#"<p class="question-en" dir="ltr">{}</p>"#, segments_html(segments)));
    }
    if let Some(text) = &q.question_ar {
        summary.push_str(&format!(r#"<p class="question-ar" dir="rtl">{}</p>"#, encode_text(text)));
    }

    let mut body = String::new();
    if let Some(a) = &q.answer {
        body.push_str(&answer_html(a, headers));
    }
    if let Some(e) = &q.explanation {
        body.push_str(&explanation_html(e, headers));
    }

    format!(
        r#"<details class="question" id="q{}"{}><summary>{}</summary>{}</details>"#,
        q.q_num,
        if q.is_open { " open" } else { "" },
        summary,
        body,
    )
}

/// Page body for the current state of a section view.
pub fn section_content_html(view: &SectionView) -> String {
    if let Some(msg) = view.error() {
        return error_html(msg);
    }
    if view.section().is_none() {
        return r#"<p class="loading">Loading…</p>"#.to_string();
    }

    let headers = view.headers();
    let questions = view.question_views();

    if questions.is_empty() {
        return r#"<p class="no-results">No questions match the search.</p>"#.to_string();
    }

    questions.iter()
             .map(|q| question_html(q, &headers))
             .collect::<Vec<String>>()
             .join("\n")
}

pub fn section_html_page(view: &SectionView, settings: &AppSettings) -> Result<String> {
    let (lang, lang_dir) = match view.language() {
        LanguageMode::Arabic => ("ar", "rtl"),
        _ => ("en", "ltr"),
    };

    let ctx = TmplContext {
        title: encode_text(&view.page_title()).to_string(),
        lang: lang.to_string(),
        lang_dir: lang_dir.to_string(),
        content: section_content_html(view),
        body_class: "section".to_string(),
        ..Default::default()
    };

    render_page(ctx, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_settings::ThemeName;
    use crate::bidi_text::{render_paragraphs, render_segments, TextDirection};
    use crate::types::Difficulty;

    #[test]
    fn test_section_href() {
        assert_eq!(section_href(SectionKey::Juz(7)), "/juz/7");
        assert_eq!(section_href(SectionKey::Bonus), "/juz/bonus");
    }

    #[test]
    fn test_error_html_escapes() {
        assert_eq!(
            error_html("Failed to fetch <x> (404)"),
            r#"<div class="load-error" role="alert">Failed to fetch &lt;x&gt; (404)</div>"#
        );
    }

    #[test]
    fn test_question_html_closed_has_no_regions() {
        let q = QuestionView {
            q_num: 4,
            difficulty: Some(Difficulty::Hard),
            theme: Some("Patience".to_string()),
            question_en: Some(render_segments("Who said ﴿رب أرني﴾?")),
            question_ar: None,
            is_open: false,
            answer: None,
            explanation: None,
        };
        let headers = Headers { answer: "Answer", explanation: "Explanation" };
        let html = question_html(&q, &headers);

        assert!(html.contains(r#"<details class="question" id="q4">"#));
        assert!(html.contains(r#"<span class="chip chip-hard">Hard</span>"#));
        assert!(html.contains(r#"class="quran-token" dir="rtl""#));
        assert!(!html.contains("answer"));
        assert!(!html.contains("explanation"));
    }

    #[test]
    fn test_question_html_open_answer() {
        let q = QuestionView {
            q_num: 1,
            difficulty: None,
            theme: None,
            question_en: None,
            question_ar: Some("من؟".to_string()),
            is_open: true,
            answer: Some(AnswerView {
                verse_en: None,
                verse_ar: Some(render_paragraphs("﴿رب أرني﴾")),
                verse_ar_direction: TextDirection::Rtl,
                reference_en: None,
                reference_ar: Some("سورة البقرة — الآية 260".to_string()),
            }),
            explanation: None,
        };
        let headers = Headers { answer: "الآية", explanation: "الشرح" };
        let html = question_html(&q, &headers);

        assert!(html.contains(" open>"));
        assert!(html.contains("<h3>الآية</h3>"));
        assert!(html.contains(r#"<div class="verse-ar" dir="rtl"><p dir="rtl">"#));
        assert!(html.contains(r#"<p class="reference"><span class="reference-ar" dir="rtl">سورة البقرة — الآية 260</span></p>"#));
        assert!(!html.contains(" • "));
        assert!(!html.contains("الشرح"));
    }

    #[test]
    fn test_reference_line_separator_in_both_mode() {
        let a = AnswerView {
            verse_en: Some("Verse text".to_string()),
            verse_ar: None,
            verse_ar_direction: TextDirection::Rtl,
            reference_en: Some("Chapter Al-Baqarah — Verse 255".to_string()),
            reference_ar: Some("سورة البقرة — الآية 255".to_string()),
        };
        let headers = Headers { answer: "Answer", explanation: "Explanation" };
        let html = answer_html(&a, &headers);
        assert!(html.contains(concat!(
            r#"<span class="reference-en" dir="ltr">Chapter Al-Baqarah — Verse 255</span>"#,
            " • ",
            r#"<span class="reference-ar" dir="rtl">سورة البقرة — الآية 255</span>"#,
        )));
    }

    #[test]
    fn test_theme_body_class() {
        let settings = AppSettings { theme_name: ThemeName::Dark, ..Default::default() };
        let html = home_html_page(&settings).expect("Render failed");
        assert!(html.contains(r#"<body class="home theme-dark">"#));
    }

    #[test]
    fn test_home_page_lists_sections() {
        let html = home_html_page(&AppSettings::default()).expect("Render failed");
        assert!(html.contains(r#"<a href="/juz/1">Juz 1</a>"#));
        assert!(html.contains(r#"<a href="/juz/30">Juz 30</a>"#));
        assert!(html.contains(r#"<a href="/juz/bonus">Advanced Questions</a>"#));
        assert!(html.contains(".quran-token"));
    }
}
