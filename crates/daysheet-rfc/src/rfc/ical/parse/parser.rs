//! iCalendar document parser (RFC 5545).
//!
//! Structure errors (unbalanced BEGIN/END, no VCALENDAR) fail the document.
//! Problems inside a single property are contained: a malformed content line
//! is dropped and a value that does not parse as its type is kept as
//! `Value::Unknown`, so one bad event cannot take a whole feed down.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{parse_content_line, split_lines};
use super::values::{parse_date, parse_datetime, parse_duration, unescape_text};
use crate::rfc::ical::core::{Component, ComponentKind, ContentLine, ICalendar, Property, Value};

/// Parses an iCalendar document from raw bytes, decoding UTF-8 lossily.
///
/// ## Errors
///
/// Returns an error if the input is not a structurally valid iCalendar.
pub fn parse_bytes(input: &[u8]) -> ParseResult<ICalendar> {
    parse(&String::from_utf8_lossy(input))
}

/// Parses an iCalendar document from a string.
///
/// ## Errors
///
/// Returns an error if the input is not a structurally valid iCalendar.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<ICalendar> {
    tracing::debug!("Parsing iCalendar document");

    let lines = split_lines(input.trim_start_matches('\u{feff}'));
    if lines.is_empty() {
        tracing::warn!("Empty iCalendar input");
        return Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1));
    }

    tracing::trace!(count = lines.len(), "Split lines");

    let mut stack: Vec<(usize, Component)> = Vec::new();
    let mut root = None;

    for (line_num, line) in lines {
        let content_line = match parse_content_line(&line, line_num) {
            Ok(cl) => cl,
            Err(err) => {
                tracing::debug!(%err, "Skipping malformed content line");
                continue;
            }
        };

        match content_line.name.as_str() {
            "BEGIN" => stack.push((line_num, Component::new(content_line.raw_value.trim()))),
            "END" => {
                let end_name = content_line.raw_value.trim().to_ascii_uppercase();
                let Some((_, component)) = stack.pop() else {
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                            .with_context(format!("END:{end_name} without BEGIN")),
                    );
                };
                if end_name != component.name {
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                            .with_context(format!(
                                "expected END:{}, got END:{end_name}",
                                component.name
                            )),
                    );
                }
                if let Some((_, parent)) = stack.last_mut() {
                    parent.children.push(component);
                } else {
                    root = Some(component);
                    break;
                }
            }
            _ => {
                let Some((_, current)) = stack.last_mut() else {
                    return Err(ParseError::new(ParseErrorKind::MissingBegin, line_num, 1)
                        .with_context(format!("{} outside any component", content_line.name)));
                };
                current.properties.push(parse_property(content_line, line_num));
            }
        }
    }

    if let Some((begin_line, open)) = stack.last() {
        return Err(ParseError::new(ParseErrorKind::MissingEnd, *begin_line, 1)
            .with_context(format!("missing END:{}", open.name)));
    }

    let root = root.ok_or_else(|| ParseError::new(ParseErrorKind::MissingBegin, 1, 1))?;
    if root.kind != ComponentKind::Calendar {
        tracing::warn!(name = %root.name, "Root component is not VCALENDAR");
        return Err(
            ParseError::new(ParseErrorKind::MissingBegin, 1, 1).with_context("expected VCALENDAR")
        );
    }

    tracing::debug!(
        events = root.events().count(),
        "iCalendar document parsed successfully"
    );

    Ok(ICalendar { root })
}

/// Internal enum for value type handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    Date,
    DateTime,
    DateList,
    DateTimeList,
    Duration,
    Recur,
    Text,
}

/// Determines the value type for a property from its VALUE parameter, its
/// name and, for date properties, the shape of the raw value.
fn determine_value_type(cl: &ContentLine) -> ValueType {
    let explicit_date = cl
        .value_type()
        .is_some_and(|v| v.eq_ignore_ascii_case("DATE"));
    let looks_like_date = explicit_date || !cl.raw_value.contains('T');

    match cl.name.as_str() {
        "DTSTART" | "DTEND" | "RECURRENCE-ID" if looks_like_date => ValueType::Date,
        "DTSTART" | "DTEND" | "RECURRENCE-ID" => ValueType::DateTime,
        "EXDATE" | "RDATE" if looks_like_date => ValueType::DateList,
        "EXDATE" | "RDATE" => ValueType::DateTimeList,
        "DURATION" => ValueType::Duration,
        "RRULE" | "EXRULE" => ValueType::Recur,
        _ => ValueType::Text,
    }
}

/// Parses a property from a content line, resolving the value type.
///
/// A value that does not parse is preserved as `Value::Unknown`.
fn parse_property(cl: ContentLine, line_num: usize) -> Property {
    let value_type = determine_value_type(&cl);
    let value = match parse_value(&cl.raw_value, value_type, cl.tzid(), line_num) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(property = %cl.name, %err, "Keeping unparseable value as raw text");
            Value::Unknown(cl.raw_value.clone())
        }
    };

    Property {
        name: cl.name,
        params: cl.params,
        value,
        raw_value: cl.raw_value,
    }
}

/// Parses a raw value string into a typed Value.
fn parse_value(
    raw: &str,
    value_type: ValueType,
    tzid: Option<&str>,
    line_num: usize,
) -> ParseResult<Value> {
    let raw = raw.trim();
    match value_type {
        ValueType::Text => Ok(Value::Text(unescape_text(raw))),
        ValueType::Date => Ok(Value::Date(parse_date(raw, line_num, 1)?)),
        ValueType::DateTime => Ok(Value::DateTime(parse_datetime(raw, tzid, line_num, 1)?)),
        ValueType::DateList => raw
            .split(',')
            .map(|s| parse_date(s.trim(), line_num, 1))
            .collect::<ParseResult<_>>()
            .map(Value::DateList),
        ValueType::DateTimeList => raw
            .split(',')
            .map(|s| parse_datetime(s.trim(), tzid, line_num, 1))
            .collect::<ParseResult<_>>()
            .map(Value::DateTimeList),
        ValueType::Duration => Ok(Value::Duration(parse_duration(raw, line_num, 1)?)),
        ValueType::Recur => Ok(Value::Recur(raw.to_owned())),
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
