//! Content line lexer for iCalendar (RFC 5545 §3.1).
//!
//! Handles line unfolding and tokenization of content lines.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{ContentLine, Parameter};

/// Splits input into logical content lines, merging folded continuations.
///
/// Handles both CRLF and bare LF line endings. A line starting with SP/HTAB
/// continues the previous line with that one whitespace character removed.
/// Each entry carries the 1-based physical line number where it started.
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (i, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let continuation = line
            .strip_prefix([' ', '\t'])
            // Lenient: some exporters wrap long lines without the leading space.
            .or_else(|| (!line.contains(':')).then_some(line));

        match (continuation, lines.last_mut()) {
            (Some(rest), Some((_, prev))) => prev.push_str(rest),
            (Some(rest), None) => lines.push((i + 1, rest.to_owned())),
            (None, _) => lines.push((i + 1, line.to_owned())),
        }
    }

    lines
}

/// Parses a single content line.
///
/// Format: `name *(";" param) ":" value`
///
/// ## Errors
/// Returns an error if the line is malformed or contains invalid characters.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let name_end = line
        .find([';', ':'])
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, line_num, line.len()))?;

    let name = &line[..name_end];
    if name.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::MissingPropertyName,
            line_num,
            1,
        ));
    }
    if let Some(bad) = name.find(|c: char| !c.is_ascii_alphanumeric() && c != '-') {
        return Err(ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_num,
            bad + 1,
        ));
    }

    let mut params = Vec::new();
    let mut cursor = name_end;
    while line[cursor..].starts_with(';') {
        let (param, next) = parse_parameter(line, cursor + 1, line_num)?;
        params.push(param);
        cursor = next;
    }

    let Some(value) = line[cursor..].strip_prefix(':') else {
        return Err(ParseError::new(
            ParseErrorKind::MissingColon,
            line_num,
            cursor + 1,
        ));
    };

    Ok(ContentLine {
        name: name.to_ascii_uppercase(),
        params,
        raw_value: value.to_owned(),
    })
}

/// Parses one `name=value[,value...]` parameter starting at byte `start`.
///
/// Returns the parameter and the byte offset of the delimiter that ended it
/// (`;` or `:`).
fn parse_parameter(line: &str, start: usize, line_num: usize) -> ParseResult<(Parameter, usize)> {
    let rest = &line[start..];
    let eq = rest
        .find('=')
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidParameter, line_num, start + 1))?;

    let name = &rest[..eq];
    if name.is_empty() || name.contains(|c: char| !c.is_ascii_alphanumeric() && c != '-') {
        return Err(ParseError::new(
            ParseErrorKind::InvalidParameter,
            line_num,
            start + 1,
        ));
    }

    let mut values = Vec::new();
    let mut pos = start + eq + 1;
    loop {
        let (value, next) = parse_param_value(line, pos, line_num)?;
        values.push(value);

        match line[next..].chars().next() {
            Some(',') => pos = next + 1,
            Some(';' | ':') => return Ok((Parameter::with_values(name, values), next)),
            Some(c) => {
                return Err(
                    ParseError::new(ParseErrorKind::InvalidParameter, line_num, next + 1)
                        .with_context(format!("unexpected character '{c}'")),
                );
            }
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingColon,
                    line_num,
                    line.len(),
                ));
            }
        }
    }
}

/// Parses a parameter value (possibly quoted) starting at byte `start`.
fn parse_param_value(line: &str, start: usize, line_num: usize) -> ParseResult<(String, usize)> {
    let rest = &line[start..];

    if let Some(quoted) = rest.strip_prefix('"') {
        let close = quoted
            .find('"')
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnclosedQuote, line_num, start + 1))?;
        // opening quote + content + closing quote
        return Ok((decode_caret(&quoted[..close]), start + close + 2));
    }

    let end = rest.find([',', ';', ':']).unwrap_or(rest.len());
    Ok((rest[..end].to_owned(), start + end))
}

/// Decodes RFC 6868 caret escapes in a quoted parameter value.
fn decode_caret(s: &str) -> String {
    let mut value = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '^' {
            value.push(c);
            continue;
        }
        match chars.peek() {
            Some('^') => value.push('^'),
            Some('n') => value.push('\n'),
            Some('\'') => value.push('"'),
            _ => {
                value.push('^');
                continue;
            }
        }
        chars.next();
    }

    value
}
