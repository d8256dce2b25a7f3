//! Buffered `multipart/form-data` decoding.
//!
//! The body is scanned once for the `--boundary` delimiter with a
//! precomputed matching automaton. Parts are kept as offsets into the original
//! buffer and surfaced as `Bytes` slices of it, so decoding never copies part
//! content.
//!
//! Only one header/body split is made per part: the first blank line. Any
//! CRLF that follows it, binary or not, belongs to the content up to the next
//! delimiter.

use crate::models::upload::{MultipartPart, UploadedFile};
use bytes::Bytes;
use std::{collections::HashMap, ops::Range};
use thiserror::Error;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";
const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultipartError {
    #[error("Invalid Content-Type")]
    InvalidContentType,
    #[error("Missing boundary")]
    MissingBoundary,
}

/// Extract the boundary token from a `multipart/form-data` Content-Type.
pub fn boundary_from_content_type(content_type: &str) -> Result<String, MultipartError> {
    let mut params = content_type.split(';');
    let media_type = params.next().unwrap_or("").trim();
    if !media_type.eq_ignore_ascii_case("multipart/form-data") {
        return Err(MultipartError::InvalidContentType);
    }

    params
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|boundary| !boundary.is_empty())
        .ok_or(MultipartError::MissingBoundary)
}

/// Literal byte-sequence matcher.
///
/// `fallback[i]` is the length of the longest proper prefix of
/// `needle[..=i]` that is also its suffix, so each input byte advances the
/// match state without ever re-reading the haystack.
struct DelimiterScanner<'a> {
    needle: &'a [u8],
    fallback: Vec<usize>,
}

impl<'a> DelimiterScanner<'a> {
    fn new(needle: &'a [u8]) -> Self {
        debug_assert!(!needle.is_empty());
        let mut fallback = vec![0; needle.len()];
        let mut matched = 0;
        for i in 1..needle.len() {
            while matched > 0 && needle[i] != needle[matched] {
                matched = fallback[matched - 1];
            }
            if needle[i] == needle[matched] {
                matched += 1;
            }
            fallback[i] = matched;
        }
        Self { needle, fallback }
    }

    /// Start offsets of every non-overlapping occurrence, left to right.
    fn find_all(&self, haystack: &[u8]) -> Vec<usize> {
        let mut hits = Vec::new();
        let mut state = 0;
        for (i, &byte) in haystack.iter().enumerate() {
            state = self.step(state, byte);
            if state == self.needle.len() {
                hits.push(i + 1 - state);
                state = 0;
            }
        }
        hits
    }

    fn find_first(&self, haystack: &[u8]) -> Option<usize> {
        let mut state = 0;
        for (i, &byte) in haystack.iter().enumerate() {
            state = self.step(state, byte);
            if state == self.needle.len() {
                return Some(i + 1 - state);
            }
        }
        None
    }

    fn step(&self, mut state: usize, byte: u8) -> usize {
        while state > 0 && byte != self.needle[state] {
            state = self.fallback[state - 1];
        }
        if byte == self.needle[state] {
            state += 1;
        }
        state
    }
}

/// Split `body` into its parts.
///
/// Text before the first delimiter and after the last one is discarded.
/// Segments without a header terminator or a usable `Content-Disposition`
/// are dropped.
pub fn decode_parts(body: &Bytes, boundary: &str) -> Vec<MultipartPart> {
    let delimiter = format!("--{}", boundary);
    let delimiter = delimiter.as_bytes();
    let hits = DelimiterScanner::new(delimiter).find_all(body);
    let terminator = DelimiterScanner::new(HEADER_TERMINATOR);

    let mut parts = Vec::new();
    for window in hits.windows(2) {
        let segment = window[0] + delimiter.len()..window[1];
        if body[segment.clone()].starts_with(b"--") {
            // close delimiter reached early
            break;
        }
        if let Some(part) = decode_segment(body, segment, &terminator) {
            parts.push(part);
        }
    }
    parts
}

/// Decode only the file parts, keyed by field name.
///
/// Plain form fields are left out. When a field repeats, the last part wins.
pub fn decode_files(body: &Bytes, boundary: &str) -> HashMap<String, UploadedFile> {
    decode_parts(body, boundary)
        .into_iter()
        .filter_map(|part| {
            let filename = part.filename?;
            Some((
                part.field_name,
                UploadedFile {
                    filename,
                    content: part.content,
                },
            ))
        })
        .collect()
}

fn decode_segment(
    body: &Bytes,
    segment: Range<usize>,
    terminator: &DelimiterScanner<'_>,
) -> Option<MultipartPart> {
    let raw = &body[segment.clone()];
    let split = terminator.find_first(raw)?;

    let headers = String::from_utf8_lossy(&raw[..split]);
    let (field_name, filename) = parse_disposition(&headers)?;

    let content_start = segment.start + split + HEADER_TERMINATOR.len();
    let mut content_end = segment.end;
    if body[content_start..content_end].ends_with(CRLF) {
        content_end -= CRLF.len();
    }

    Some(MultipartPart {
        field_name,
        filename,
        content: body.slice(content_start..content_end),
    })
}

/// Pull `name` and `filename` out of a part's `Content-Disposition` header.
///
/// An empty `filename` is what browsers send for an empty file input and is
/// treated as a plain field.
fn parse_disposition(headers: &str) -> Option<(String, Option<String>)> {
    let value = headers.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case("content-disposition")
            .then_some(value)
    })?;

    let mut params = split_params(value).into_iter();
    let disposition = params.next()?;
    if !disposition.trim().eq_ignore_ascii_case("form-data") {
        return None;
    }

    let mut name = None;
    let mut filename = None;
    for param in params {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = unquote(value.trim());
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => name = Some(value),
            "filename" => filename = Some(value),
            _ => {}
        }
    }

    let name = name.filter(|name| !name.is_empty())?;
    Some((name, filename.filter(|filename| !filename.is_empty())))
}

/// Split header parameters on `;`, ignoring separators inside quotes.
fn split_params(value: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                params.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(&value[start..]);
    params
}

fn unquote(value: &str) -> String {
    match value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
    }
}
