//! Media slots and byte intervals served from them.

use std::fmt;

/// One of the two configurable media slots.
///
/// The slot name doubles as the upload form field, the config key and the
/// stem of the stored file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaField {
    Video1,
    Video2,
}

impl MediaField {
    /// Every slot, in the order uploads are evaluated.
    pub const ALL: [MediaField; 2] = [MediaField::Video1, MediaField::Video2];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaField::Video1 => "video1",
            MediaField::Video2 => "video2",
        }
    }
}

impl fmt::Display for MediaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inclusive `[start, end]` byte interval into a resource.
///
/// Constructed only by the range planner, which guarantees
/// `start <= end < total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the interval.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}
