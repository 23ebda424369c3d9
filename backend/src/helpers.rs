use lazy_static::lazy_static;
use regex::Regex;

pub const OPEN_BRACKET: char = '﴿'; // U+FD3F
pub const CLOSE_BRACKET: char = '﴾'; // U+FD3E

/// Turn text copied from PDFs into paragraphs that can flow full width.
///
/// Blank lines separate paragraphs and are kept as exactly one blank line.
/// Single hard line breaks inside a paragraph become spaces.
/// Missing text is treated as empty.
pub fn normalize_paragraphs(text: Option<&str>) -> String {
    lazy_static! {
        static ref RE_PARAGRAPH_BREAK: Regex = Regex::new(r"\n\s*\n+").unwrap();
        static ref RE_NEWLINES: Regex = Regex::new(r"\n+").unwrap();
    }

    let s = text.unwrap_or_default().replace('\r', "");

    RE_PARAGRAPH_BREAK
        .split(&s)
        .map(|p| RE_NEWLINES.replace_all(p, " ").trim().to_string())
        .collect::<Vec<String>>()
        .join("\n\n")
}

/// Case-insensitive substring match. An empty or blank needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Swap every ﴿ with ﴾ and the other way around.
///
/// Returns the new text and the number of bracket characters flipped.
pub fn swap_quranic_brackets(text: &str) -> (String, usize) {
    let mut swaps = 0;
    let swapped = text
        .chars()
        .map(|c| match c {
            OPEN_BRACKET => {
                swaps += 1;
                CLOSE_BRACKET
            }
            CLOSE_BRACKET => {
                swaps += 1;
                OPEN_BRACKET
            }
            _ => c,
        })
        .collect();
    (swapped, swaps)
}
