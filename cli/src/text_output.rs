//! Plain-text rendering of a section for bidi-aware terminals.

use tadabbur_backend::bidi_text::{isolate_paragraph, paragraph_isolated_text, segment_isolated_text, Paragraph, Segment};
use tadabbur_backend::section_view::{QuestionView, SectionView};
use tadabbur_backend::types::SectionKey;

fn segments_text(segments: &[Segment]) -> String {
    segments.iter().map(segment_isolated_text).collect()
}

/// One line per verse, each isolated on its own.
fn lines_text(text: &str, indent: &str) -> String {
    text.split('\n')
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("{}{}", indent, isolate_paragraph(p)))
        .collect::<Vec<String>>()
        .join("\n")
}

/// Each paragraph gets its own isolate, so an Arabic paragraph doesn't flip an English one.
fn paragraphs_text(paragraphs: &[Paragraph], indent: &str) -> String {
    paragraphs.iter()
        .map(|p| format!("{}{}", indent, paragraph_isolated_text(p)))
        .collect::<Vec<String>>()
        .join("\n\n")
}

fn tags_text(q: &QuestionView) -> String {
    let mut tags: Vec<String> = Vec::new();
    if let Some(d) = q.difficulty {
        tags.push(d.label().to_string());
    }
    if let Some(t) = &q.theme {
        tags.push(t.clone());
    }
    if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    }
}

pub fn question_text(q: &QuestionView, answer_header: &str, explanation_header: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    let marker = if q.is_open { "-" } else { "+" };
    lines.push(format!("{} {}.{}", marker, q.q_num, tags_text(q)));

    if let Some(segments) = &q.question_en {
        lines.push(format!("    {}", segments_text(segments)));
    }
    if let Some(text) = &q.question_ar {
        lines.push(format!("    {}", isolate_paragraph(text)));
    }

    if let Some(a) = &q.answer {
        lines.push(format!("  {}:", answer_header));
        if let Some(paragraphs) = &a.verse_ar {
            lines.push(paragraphs_text(paragraphs, "    "));
        }
        if let Some(text) = &a.verse_en {
            if !text.is_empty() {
                lines.push(lines_text(text, "    "));
            }
        }
        if let Some(r) = &a.reference_en {
            lines.push(format!("    {}", isolate_paragraph(r)));
        }
        if let Some(r) = &a.reference_ar {
            lines.push(format!("    {}", isolate_paragraph(r)));
        }
    }

    if let Some(e) = &q.explanation {
        lines.push(format!("  {}:", explanation_header));
        if let Some(paragraphs) = &e.commentary_en {
            lines.push(paragraphs_text(paragraphs, "    "));
        }
        if let Some(paragraphs) = &e.commentary_ar {
            lines.push(paragraphs_text(paragraphs, "    "));
        }
    }

    lines.join("\n")
}

pub fn section_text(view: &SectionView) -> String {
    let mut out = format!("{}\n\n", view.page_title());

    if let Some(msg) = view.error() {
        out.push_str(&format!("Error: {}\n", msg));
        return out;
    }

    let headers = view.headers();
    let questions = view.question_views();
    if questions.is_empty() {
        out.push_str("No questions match the search.\n");
        return out;
    }

    for q in questions.iter() {
        out.push_str(&question_text(q, headers.answer, headers.explanation));
        out.push_str("\n\n");
    }
    out
}

pub fn section_list_text() -> String {
    SectionKey::all()
        .iter()
        .map(|key| format!("{:>5}  {}", key.route_id(), key))
        .collect::<Vec<String>>()
        .join("\n")
}
