//! The buffer being viewed.

use std::ops::RangeInclusive;

/// Read-only byte buffer for one render epoch.
///
/// A new delivery replaces the whole source; nothing mutates it in place.
/// The bytes are moved in, so the sender keeps no usable reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteSource {
    bytes: Vec<u8>,
}

impl ByteSource {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Total number of bytes, as a 64-bit offset space.
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte at `offset`, or `None` past the end.
    pub fn get(&self, offset: u64) -> Option<u8> {
        usize::try_from(offset)
            .ok()
            .and_then(|i| self.bytes.get(i).copied())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Bytes covered by `range`, clipped to the buffer.
    pub fn slice(&self, range: ByteRange) -> &[u8] {
        let len = self.bytes.len();
        let start = usize::try_from(range.start).unwrap_or(len).min(len);
        let end = usize::try_from(range.end)
            .map(|e| e.saturating_add(1))
            .unwrap_or(len)
            .min(len);
        if start >= end {
            return &[];
        }
        &self.bytes[start..end]
    }
}

impl From<Vec<u8>> for ByteSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Inclusive range of byte offsets with `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Build a normalized range from two offsets in any order.
    pub fn spanning(a: u64, b: u64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Single-byte range.
    pub fn single(offset: u64) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.start && offset <= self.end
    }

    /// Number of bytes covered (never zero).
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn as_range(&self) -> RangeInclusive<u64> {
        self.start..=self.end
    }
}

// ===================================================================
// Tests
// ===================================================================
