//! Text normalization: raw extracted text → sentences of tokens, every range
//! pointing back into the raw text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AnalysisError;
use crate::models::{PosTag, Sentence, TextRange, Token};

static BULLET_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s\p{Cc}]*(?:[•·▪◦‣*–-]|\d{1,3}[.)])\s+").expect("bullet regex is valid")
});

const ABBREVIATIONS: &[&str] = &[
    "e.g", "i.e", "etc", "vs", "inc", "ltd", "jr", "sr", "dr", "mr", "mrs", "ms",
];

const PRONOUNS: &[&str] = &["i", "we", "my", "our", "me", "us"];
const AUXILIARIES: &[&str] = &["was", "were", "is", "are", "been", "be", "being", "am"];

/// Rejects over-long input before any other work. Length is counted in chars.
pub fn check_length(raw: &str, max: usize) -> Result<(), AnalysisError> {
    let length = raw.chars().count();
    if length > max {
        return Err(AnalysisError::DocumentTooLarge { length, max });
    }
    Ok(())
}

/// Splits `raw` into sentences. Fails with `ExtractionEmpty` when nothing
/// tokenizable is left.
pub fn normalize(raw: &str) -> Result<Vec<Sentence>, AnalysisError> {
    let mut sentences = Vec::new();
    let mut line_start = 0;

    for (line_idx, line) in raw.split('\n').enumerate() {
        normalize_line(raw, line_start, line, line_idx, &mut sentences);
        line_start += line.len() + 1;
    }

    if sentences.is_empty() {
        return Err(AnalysisError::ExtractionEmpty);
    }
    tracing::debug!(
        "Normalized {} bytes into {} sentences",
        raw.len(),
        sentences.len()
    );
    Ok(sentences)
}

fn normalize_line(
    raw: &str,
    line_start: usize,
    line: &str,
    line_idx: usize,
    out: &mut Vec<Sentence>,
) {
    let (bullet, body_offset) = match BULLET_MARKER.find(line) {
        Some(m) => (true, m.end()),
        None => (false, 0),
    };
    let body = &line[body_offset..];
    let body_start = line_start + body_offset;

    let tokens = tokenize(body, body_start);
    if tokens.is_empty() {
        return;
    }

    let mut segments = Vec::new();
    let mut seg_start = body_start;
    for boundary in sentence_boundaries(body, body_start, &tokens) {
        segments.push(TextRange::new(seg_start, boundary));
        seg_start = boundary;
    }
    segments.push(TextRange::new(seg_start, line_start + line.len()));

    let first_new = out.len();
    let mut cursor = 0;
    for segment in segments {
        let mut seg_tokens = Vec::new();
        while cursor < tokens.len() && tokens[cursor].range.start < segment.end {
            seg_tokens.push(tokens[cursor].clone());
            cursor += 1;
        }
        if seg_tokens.is_empty() {
            continue;
        }
        let range = trim_range(raw, segment);
        out.push(Sentence {
            text: clean_text(range.slice(raw)),
            tokens: seg_tokens,
            range,
            line: line_idx,
            bullet,
            standalone: false,
        });
    }

    if out.len() == first_new + 1 {
        out[first_new].standalone = true;
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

fn is_joiner(c: char) -> bool {
    matches!(c, '.' | '-' | '/' | '\'' | '&')
}

/// Maximal runs of word chars; a joiner stays inside a token only when it
/// sits between two alphanumerics.
fn tokenize(body: &str, base: usize) -> Vec<Token> {
    let chars: Vec<(usize, char)> = body.char_indices().collect();
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &(offset, c)) in chars.iter().enumerate() {
        if is_word_char(c) {
            start.get_or_insert(offset);
            continue;
        }
        let inner_joiner = start.is_some()
            && is_joiner(c)
            && i > 0
            && chars[i - 1].1.is_alphanumeric()
            && chars.get(i + 1).is_some_and(|(_, n)| n.is_alphanumeric());
        if inner_joiner {
            continue;
        }
        if let Some(s) = start.take() {
            tokens.push(make_token(body, base, s, offset));
        }
    }
    if let Some(s) = start {
        tokens.push(make_token(body, base, s, body.len()));
    }
    tokens
}

fn make_token(body: &str, base: usize, start: usize, end: usize) -> Token {
    let surface = &body[start..end];
    let normalized = surface.to_lowercase();
    Token {
        surface: surface.to_string(),
        pos: tag(&normalized),
        normalized,
        range: TextRange::new(base + start, base + end),
    }
}

fn tag(normalized: &str) -> Option<PosTag> {
    if normalized.starts_with(|c: char| c.is_ascii_digit())
        && normalized
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        Some(PosTag::Number)
    } else if PRONOUNS.contains(&normalized) {
        Some(PosTag::Pronoun)
    } else if AUXILIARIES.contains(&normalized) {
        Some(PosTag::Auxiliary)
    } else {
        None
    }
}

/// Absolute offsets just after each sentence-ending `.`, `!` or `?` that is
/// followed by whitespace and does not close an abbreviation.
fn sentence_boundaries(body: &str, base: usize, tokens: &[Token]) -> Vec<usize> {
    let mut boundaries = Vec::new();
    let mut iter = body.char_indices().peekable();
    while let Some((offset, c)) = iter.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let followed_by_space = iter.peek().is_some_and(|(_, n)| n.is_whitespace());
        if !followed_by_space {
            continue;
        }
        let abs = base + offset;
        if c == '.' {
            let closes_abbreviation = tokens
                .iter()
                .rev()
                .find(|t| t.range.end <= abs)
                .is_some_and(|t| {
                    t.range.end == abs && ABBREVIATIONS.contains(&t.normalized.as_str())
                });
            if closes_abbreviation {
                continue;
            }
        }
        boundaries.push(abs + c.len_utf8());
    }
    boundaries
}

fn is_blank(c: char) -> bool {
    c.is_whitespace() || c.is_control()
}

fn trim_range(raw: &str, range: TextRange) -> TextRange {
    let slice = range.slice(raw);
    let leading = slice.len() - slice.trim_start_matches(is_blank).len();
    let trimmed_len = slice.trim_matches(is_blank).len();
    let start = range.start + leading;
    TextRange::new(start, start + trimmed_len)
}

/// Drops control characters and collapses whitespace runs to one space.
fn clean_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else if !c.is_control() {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}
