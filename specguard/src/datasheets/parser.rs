//! Completion response parsing
//!
//! Two strategies, matching the two extraction prompt shapes:
//!
//! - **Structured JSON**: take the first `{` .. last `}` span, decode it as
//!   `{"Specification": {...}, "notes": [...]}`. When that fails the whole
//!   response degrades to a notes-only record so the raw text survives.
//! - **Lines**: `key: value` lines fill the mapping (last write wins), every
//!   other non-empty line goes to notes in order.
//!
//! Neither strategy fails. A degraded result carries the [`DecodeFailure`]
//! that caused it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::datasheets::schema::{ExtractedSpec, SpecMap};

/// Which response shape the extraction prompt asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    #[default]
    Json,
    Lines,
}

/// Why a structured decode was abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    /// No `open` .. `close` span in the response
    NoSpan,
    /// The span is not valid JSON (or not the requested type)
    InvalidJson(String),
    /// Valid JSON with the wrong layout
    UnexpectedShape(String),
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeFailure::NoSpan => write!(f, "no JSON span found in response"),
            DecodeFailure::InvalidJson(e) => write!(f, "invalid JSON: {}", e),
            DecodeFailure::UnexpectedShape(e) => write!(f, "unexpected JSON shape: {}", e),
        }
    }
}

/// Result of parsing one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub spec: ExtractedSpec,
    /// Set when the structured decode failed and the notes fallback was used
    pub fallback: Option<DecodeFailure>,
}

impl ParsedResponse {
    pub fn is_degraded(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Parse a response with the strategy matching `shape`.
pub fn parse(response: &str, shape: ResponseShape) -> ParsedResponse {
    match shape {
        ResponseShape::Json => parse_structured(response),
        ResponseShape::Lines => ParsedResponse {
            spec: parse_lines(response),
            fallback: None,
        },
    }
}

/// Structured strategy: attempt decode, degrade to notes on failure.
pub fn parse_structured(response: &str) -> ParsedResponse {
    match decode_structured(response) {
        Ok(spec) => ParsedResponse { spec, fallback: None },
        Err(failure) => ParsedResponse {
            spec: degrade_to_notes(response),
            fallback: Some(failure),
        },
    }
}

/// Stage one of the structured strategy.
pub fn decode_structured(response: &str) -> Result<ExtractedSpec, DecodeFailure> {
    let value: Value = decode_span(response, '{', '}')?;
    let object = value
        .as_object()
        .ok_or_else(|| DecodeFailure::UnexpectedShape("top level is not an object".to_string()))?;

    let raw_spec = object.get("Specification");
    let raw_notes = object.get("notes");
    if raw_spec.is_none() && raw_notes.is_none() {
        return Err(DecodeFailure::UnexpectedShape(
            "neither \"Specification\" nor \"notes\" present".to_string(),
        ));
    }

    let mut spec = ExtractedSpec::default();

    match raw_notes {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            spec.notes.extend(items.iter().map(value_to_text).filter(|n| !n.is_empty()));
        }
        // Models sometimes collapse a single note into a string
        Some(Value::String(s)) => {
            if !s.trim().is_empty() {
                spec.notes.push(s.trim().to_string());
            }
        }
        Some(_) => {
            return Err(DecodeFailure::UnexpectedShape("\"notes\" is not a list".to_string()));
        }
    }

    match raw_spec {
        None | Some(Value::Null) => {}
        Some(Value::Object(entries)) => {
            for (key, value) in entries {
                let key = key.trim();
                let value = value_to_text(value);
                if key.is_empty() {
                    if !value.is_empty() {
                        spec.notes.push(value);
                    }
                } else {
                    spec.specification.insert(key.to_string(), value);
                }
            }
        }
        Some(_) => {
            return Err(DecodeFailure::UnexpectedShape(
                "\"Specification\" is not a mapping".to_string(),
            ));
        }
    }

    Ok(spec)
}

/// Stage two of the structured strategy: keep the raw response as a note.
pub fn degrade_to_notes(response: &str) -> ExtractedSpec {
    ExtractedSpec {
        specification: SpecMap::new(),
        notes: vec![response.to_string()],
    }
}

/// Line-oriented strategy.
pub fn parse_lines(response: &str) -> ExtractedSpec {
    let mut spec = ExtractedSpec::default();

    for line in response.lines() {
        let line = strip_bullet(line.trim());
        if line.is_empty() {
            continue;
        }

        let pair = split_first_colon(line).map(|(key, value)| (strip_key_marker(key.trim()), value));
        match pair {
            Some((key, value)) if !key.is_empty() => {
                spec.specification
                    .insert(key.to_string(), value.trim().to_string());
            }
            _ => spec.notes.push(line.to_string()),
        }
    }

    spec
}

/// First `open` .. last `close` substring, greedy.
pub fn find_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&text[start..end + close.len_utf8()])
}

/// Locate the `open` .. `close` span and decode it as `T`.
pub fn decode_span<T: DeserializeOwned>(
    text: &str,
    open: char,
    close: char,
) -> Result<T, DecodeFailure> {
    let span = find_span(text, open, close).ok_or(DecodeFailure::NoSpan)?;
    serde_json::from_str(span).map_err(|e| DecodeFailure::InvalidJson(e.to_string()))
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

const BULLET_MARKERS: [char; 4] = ['-', '•', '*', '–'];

fn strip_bullet(line: &str) -> &str {
    for marker in BULLET_MARKERS {
        if let Some(rest) = line.strip_prefix(marker) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest.trim_start();
            }
        }
    }
    line
}

/// A key may still carry a marker glued to it (`-TX Current`). Digits after
/// the marker are a value sign, not a bullet.
fn strip_key_marker(key: &str) -> &str {
    for marker in BULLET_MARKERS {
        if let Some(rest) = key.strip_prefix(marker) {
            if !rest.starts_with(|c: char| c.is_ascii_digit()) {
                return rest.trim_start();
            }
        }
    }
    key
}

/// Split on the first ASCII or full-width colon.
fn split_first_colon(line: &str) -> Option<(&str, &str)> {
    let (idx, colon) = line.char_indices().find(|(_, c)| *c == ':' || *c == '：')?;
    Some((&line[..idx], &line[idx + colon.len_utf8()..]))
}
