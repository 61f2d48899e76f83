//! Text fitting for fixed-size boxes: greedy word wrap with ellipsis
//! truncation, plus an estimate of rendered width.

const ELLIPSIS: &str = "...";

/// ## Summary
/// Greedily wraps `text` into at most `max_lines` lines of at most
/// `max_chars` characters.
///
/// A single word longer than a line is cut and suffixed with `...`. When the
/// line budget runs out with words left over, the last line's final three
/// characters are replaced by `...` (lines of three characters or fewer are
/// left alone). The result is never empty: blank input gives `[""]`.
#[must_use]
pub fn wrap(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let max_lines = max_lines.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in &words {
        let word_len = word.chars().count();
        if !current.is_empty() {
            if current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
                continue;
            }
            lines.push(std::mem::take(&mut current));
            current_len = 0;
            if lines.len() >= max_lines {
                break;
            }
        }

        if word_len > max_chars {
            lines.push(truncate_word(word, max_chars));
            if lines.len() >= max_lines {
                break;
            }
        } else {
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }

    let placed: usize = lines.iter().map(|line| line.split_whitespace().count()).sum();
    if lines.len() == max_lines && placed < words.len() {
        if let Some(last) = lines.last_mut() {
            mark_truncated(last);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Cuts `word` to exactly `max_chars`, ending in as much of the marker as fits.
fn truncate_word(word: &str, max_chars: usize) -> String {
    let marker = &ELLIPSIS[..max_chars.min(ELLIPSIS.len())];
    let mut cut: String = word.chars().take(max_chars - marker.len()).collect();
    cut.push_str(marker);
    cut
}

fn mark_truncated(line: &mut String) {
    let len = line.chars().count();
    if len <= ELLIPSIS.len() {
        return;
    }
    *line = line.chars().take(len - ELLIPSIS.len()).collect();
    line.push_str(ELLIPSIS);
}

/// ## Summary
/// Estimated width in points of `text` set in Helvetica at `size`.
///
/// Uses per-glyph class widths rather than font metrics, which is close
/// enough for right-aligning a short header.
#[must_use]
pub fn string_width(text: &str, size: f32, bold: bool) -> f32 {
    let em_sum: f32 = text.chars().map(glyph_em_width).sum();
    let scale = if bold { 1.02 } else { 0.99 };
    em_sum * size * scale
}

fn glyph_em_width(ch: char) -> f32 {
    match ch {
        ' ' | '\u{00A0}' => 0.32,
        'i' | 'l' | 'I' | '|' | '!' => 0.24,
        '.' | ',' | ':' | ';' | '\'' | '"' | '`' => 0.23,
        '-' | '\u{2013}' | '\u{2014}' => 0.34,
        '(' | ')' | '[' | ']' | '{' | '}' => 0.30,
        'f' | 't' | 'j' | 'r' => 0.34,
        'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' | '#' => 0.74,
        c if c.is_ascii_digit() => 0.52,
        c if c.is_ascii_uppercase() => 0.64,
        c if c.is_ascii_lowercase() => 0.52,
        c if c.is_whitespace() => 0.32,
        c if c.is_ascii_punctuation() => 0.42,
        _ => 0.56,
    }
}
