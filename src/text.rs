use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub words: usize,
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub lines: usize,
    pub paragraphs: usize,
    pub sentences: usize,
    pub average_words_per_sentence: f64,
}

static PARAGRAPH_BREAK: OnceLock<Regex> = OnceLock::new();
static SENTENCE_END: OnceLock<Regex> = OnceLock::new();

pub fn analyze_text(text: &str) -> TextStats {
    if text.is_empty() {
        return TextStats::default();
    }

    let paragraph_break =
        PARAGRAPH_BREAK.get_or_init(|| Regex::new(r"\n\s*\n").expect("Invalid paragraph regex"));
    let sentence_end =
        SENTENCE_END.get_or_init(|| Regex::new(r"[.!?]+").expect("Invalid sentence regex"));

    let words = text.split_whitespace().count();
    let paragraphs = paragraph_break
        .split(text)
        .filter(|p| !p.trim().is_empty())
        .count();
    let sentences = sentence_end
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .count();

    let average_words_per_sentence = if sentences > 0 {
        (words as f64 / sentences as f64 * 10.0).round() / 10.0
    } else {
        0.0
    };

    TextStats {
        words,
        characters: text.chars().count(),
        characters_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        lines: text.split('\n').count(),
        paragraphs,
        sentences,
        average_words_per_sentence,
    }
}
