use serde::{Deserialize, Serialize};

/// Lexical counters collected from the extracted text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub word_count: usize,
    pub bullet_count: usize,
}

const BULLET_MARKERS: [char; 3] = ['-', '•', '*'];

pub fn collect_metrics(text: &str) -> Metrics {
    Metrics {
        word_count: count_words(text),
        bullet_count: count_bullets(text),
    }
}

/// Number of maximal runs of ASCII letters, digits and underscore.
/// Non-ASCII letters split words, so "Résumé" counts as two.
pub fn count_words(text: &str) -> usize {
    text.split(|c: char| !is_word_char(c))
        .filter(|run| !run.is_empty())
        .count()
}

/// Number of lines that, after optional indentation, start with a list marker
/// followed by whitespace. `\n`, `\r\n` and bare `\r` all end a line.
pub fn count_bullets(text: &str) -> usize {
    text.split(['\n', '\r']).filter(|l| is_bullet_line(l)).count()
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_bullet_line(line: &str) -> bool {
    let mut chars = line.trim_start().chars();
    matches!(chars.next(), Some(c) if BULLET_MARKERS.contains(&c))
        && chars.next().is_some_and(char::is_whitespace)
}
