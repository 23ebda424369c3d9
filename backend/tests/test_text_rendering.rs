use tadabbur_backend::bidi_text::{
    contains_arabic_letters, render_html, render_segments, segments_source_text, Segment, TextDirection,
};
use tadabbur_backend::helpers::normalize_paragraphs;
use tadabbur_backend::reference::{format_verse_label, resolve_reference};

#[test]
fn test_verse_labels() {
    assert_eq!(format_verse_label(&[45, 46]), "45-46");
    assert_eq!(format_verse_label(&[45, 47]), "45, 47");
    assert_eq!(format_verse_label(&[45]), "45");
    assert_eq!(format_verse_label(&[]), "");
    assert_eq!(format_verse_label(&[47, 45, 46]), "45-47");
    assert_eq!(format_verse_label(&[5, 5]), "5, 5");
}

#[test]
fn test_resolve_reference() {
    let labels = resolve_reference(None, &[1]);
    assert_eq!(labels.english, "");
    assert_eq!(labels.arabic, "");

    let labels = resolve_reference(Some(2), &[255, 256]);
    assert!(labels.english.ends_with("— Verse 255-256"));
    assert_eq!(labels.english, "Chapter Al-Baqarah — Verse 255-256");
    assert_eq!(labels.arabic, "سورة البقرة — الآية 255-256");

    let labels = resolve_reference(Some(115), &[3]);
    assert_eq!(labels.english, "Chapter 115 — Verse 3");
}

#[test]
fn test_normalize_paragraphs() {
    assert_eq!(normalize_paragraphs(Some("line one\nline two\n\nnext para")), "line one line two\n\nnext para");
    assert_eq!(normalize_paragraphs(None), "");
    assert_eq!(normalize_paragraphs(Some("a\r\n\r\n\r\nb")), "a\n\nb");
    assert_eq!(normalize_paragraphs(Some("  a\n \n  b  ")), "a\n\nb");
}

#[test]
fn test_normalize_paragraphs_idempotent() {
    let samples = [
        "",
        "\n\n\n",
        "line one\nline two\n\nnext para",
        "  lead\r\ntrail  \n\n\n\n  x \n y",
        "سطر أول\nسطر ثان\n \n فقرة",
        "a\n\t\nb",
    ];
    for s in samples {
        let once = normalize_paragraphs(Some(s));
        assert_eq!(normalize_paragraphs(Some(&once)), once, "input: {:?}", s);
    }
}

#[test]
fn test_citation_in_english_sentence() {
    let text = "The verse ﴿إِنَّ مَعَ الْعُسْرِ يُسْرًا﴾ comes twice.";
    let segments = render_segments(text);

    assert_eq!(segments.len(), 3);
    assert!(matches!(&segments[0], Segment::Plain(s) if s == "The verse "));
    assert_eq!(segments[1].direction(), Some(TextDirection::Rtl));
    assert_eq!(segments_source_text(&segments), text);

    let html = render_html(text);
    assert!(html.contains(r#"<span class="quran-token" dir="rtl" style="unicode-bidi: isolate-override; display: inline-block;">﴿إِنَّ مَعَ الْعُسْرِ يُسْرًا﴾</span>"#));
    assert!(html.starts_with(r#"<span style="unicode-bidi: isolate;">The verse </span>"#));
}

#[test]
fn test_english_citation_in_arabic_sentence() {
    let segments = render_segments("قال: ﴿Be patient﴾ ثم");
    assert_eq!(segments[1], Segment::Citation("Be patient".to_string()));
    assert_eq!(segments[1].direction(), Some(TextDirection::Ltr));
}

#[test]
fn test_round_trip_and_determinism() {
    let samples = [
        "",
        "no markers at all",
        "﴿",
        "﴾",
        "﴿﴾",
        "a﴿b﴾c﴿d﴾e",
        "﴿one\ntwo﴾ ﴿three﴾",
        "﴿﴿﴾﴾",
    ];
    for s in samples {
        let first = render_segments(s);
        assert_eq!(segments_source_text(&first), s);

        let second = render_segments(s);
        let dirs = |v: &Vec<Segment>| v.iter().map(|x| x.direction()).collect::<Vec<_>>();
        assert_eq!(dirs(&first), dirs(&second));

        for seg in first.iter().filter(|x| x.is_citation()) {
            if let Segment::Citation(inner) = seg {
                let expected = if contains_arabic_letters(inner) { TextDirection::Rtl } else { TextDirection::Ltr };
                assert_eq!(seg.direction(), Some(expected));
            }
        }
    }
}
