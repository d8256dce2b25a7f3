//! Single-range `Range` header planning.
//!
//! Only the `bytes=<start>-<end>?` form is honoured. Suffix ranges and
//! multi-range requests are refused outright, and an absent header is an error
//! of its own because media is never served whole.

use crate::models::media::ByteRange;
use axum::http::{HeaderMap, HeaderValue, header};
use thiserror::Error;

const BYTES_UNIT: &str = "bytes=";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("a Range header is required")]
    RangeRequired,
    #[error("requested range not satisfiable")]
    RangeNotSatisfiable,
}

/// A satisfiable interval together with the resource length it was planned
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangePlan {
    pub range: ByteRange,
    pub total: u64,
}

impl RangePlan {
    pub fn start(&self) -> u64 {
        self.range.start
    }

    pub fn len(&self) -> u64 {
        self.range.len()
    }

    /// `Content-Range` value: `bytes {start}-{end}/{total}`.
    pub fn content_range(&self) -> String {
        format!(
            "bytes {}-{}/{}",
            self.range.start, self.range.end, self.total
        )
    }

    /// Write `Content-Range`, `Accept-Ranges` and `Content-Length`.
    pub fn write_headers(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.content_range()) {
            headers.insert(header::CONTENT_RANGE, value);
        }
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(self.len()));
    }
}

/// Plan the interval to deliver for `header` against a resource of `total`
/// bytes.
pub fn plan(header: Option<&str>, total: u64) -> Result<RangePlan, RangeError> {
    let header = header.ok_or(RangeError::RangeRequired)?.trim();

    let range_set = header
        .strip_prefix(BYTES_UNIT)
        .ok_or(RangeError::RangeNotSatisfiable)?;
    if range_set.contains(',') {
        return Err(RangeError::RangeNotSatisfiable);
    }

    let (start_str, end_str) = range_set
        .split_once('-')
        .ok_or(RangeError::RangeNotSatisfiable)?;
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    // `bytes=-N` lands here with an empty start.
    let start = parse_offset(start_str)?;
    let last = total.checked_sub(1).ok_or(RangeError::RangeNotSatisfiable)?;
    let end = if end_str.is_empty() {
        last
    } else {
        parse_offset(end_str)?
    };

    if start > end || end > last {
        return Err(RangeError::RangeNotSatisfiable);
    }

    Ok(RangePlan {
        range: ByteRange { start, end },
        total,
    })
}

fn parse_offset(value: &str) -> Result<u64, RangeError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::RangeNotSatisfiable);
    }
    value.parse().map_err(|_| RangeError::RangeNotSatisfiable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_ended_range_runs_to_last_byte() {
        let plan = plan(Some("bytes=500-"), 1000).unwrap();
        assert_eq!(plan.range, ByteRange { start: 500, end: 999 });
        assert_eq!(plan.len(), 500);
        assert_eq!(plan.content_range(), "bytes 500-999/1000");
    }

    #[test]
    fn explicit_ranges_are_reproduced_exactly() {
        for (start, end, total) in [(0, 0, 1), (0, 999, 1000), (10, 20, 21), (7, 7, 8)] {
            let header = format!("bytes={}-{}", start, end);
            let plan = plan(Some(&header), total).unwrap();
            assert_eq!(plan.range, ByteRange { start, end });
            assert_eq!(plan.len(), end - start + 1);
            assert_eq!(
                plan.content_range(),
                format!("bytes {}-{}/{}", start, end, total)
            );
        }
    }

    #[test]
    fn missing_header_requires_range() {
        assert_eq!(plan(None, 1000), Err(RangeError::RangeRequired));
    }

    #[test]
    fn out_of_bounds_ranges_are_unsatisfiable() {
        assert_eq!(
            plan(Some("bytes=2000-3000"), 1000),
            Err(RangeError::RangeNotSatisfiable)
        );
        assert_eq!(
            plan(Some("bytes=0-1000"), 1000),
            Err(RangeError::RangeNotSatisfiable)
        );
        assert_eq!(
            plan(Some("bytes=1000-"), 1000),
            Err(RangeError::RangeNotSatisfiable)
        );
        assert_eq!(
            plan(Some("bytes=20-10"), 1000),
            Err(RangeError::RangeNotSatisfiable)
        );
    }

    #[test]
    fn empty_resource_cannot_satisfy_any_range() {
        assert_eq!(plan(Some("bytes=0-"), 0), Err(RangeError::RangeNotSatisfiable));
    }

    #[test]
    fn unsupported_forms_are_unsatisfiable() {
        for header in [
            "bytes=-500",
            "bytes=0-10,20-30",
            "items=0-10",
            "bytes=abc-",
            "bytes=+5-10",
            "bytes=5",
            "",
        ] {
            assert_eq!(
                plan(Some(header), 1000),
                Err(RangeError::RangeNotSatisfiable),
                "header {:?}",
                header
            );
        }
    }

    #[test]
    fn headers_describe_the_planned_interval() {
        let plan = plan(Some("bytes=100-199"), 1000).unwrap();
        let mut headers = HeaderMap::new();
        plan.write_headers(&mut headers);

        assert_eq!(headers[header::CONTENT_RANGE], "bytes 100-199/1000");
        assert_eq!(headers[header::ACCEPT_RANGES], "bytes");
        assert_eq!(headers[header::CONTENT_LENGTH], "100");
    }
}
