//! Character-level formatting shared by the instance builder and the
//! clipboard export.

use crate::config::Gaps;
use crate::protocol::CopyFormat;
use crate::source::{ByteRange, ByteSource};

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Placeholder drawn in the ASCII column for non-printable bytes.
pub const NON_PRINTABLE: char = '.';

/// Two uppercase hex digits for `byte`.
#[inline]
pub fn hex_pair(byte: u8) -> [char; 2] {
    [
        HEX_UPPER[usize::from(byte >> 4)] as char,
        HEX_UPPER[usize::from(byte & 0x0F)] as char,
    ]
}

/// Printable ASCII (0x20–0x7E).
#[inline]
pub fn is_printable(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte)
}

/// Character shown in the ASCII column for `byte`.
#[inline]
pub fn ascii_cell(byte: u8) -> char {
    if is_printable(byte) {
        byte as char
    } else {
        NON_PRINTABLE
    }
}

/// Zero-padded uppercase hex digits of `offset`, most significant first.
///
/// `digits` above 16 is treated as 16.
pub fn address_digits(offset: u64, digits: u32) -> impl Iterator<Item = char> {
    let digits = digits.min(16);
    (0..digits)
        .rev()
        .map(move |i| HEX_UPPER[((offset >> (i * 4)) & 0xF) as usize] as char)
}

/// Largest selection, in bytes, that is rendered for the clipboard.
pub const MAX_EXPORT_BYTES: usize = 16 * 1024 * 1024;

/// Row geometry needed to reproduce the grid as text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DumpGeometry {
    pub bytes_per_row: u32,
    pub addr_digits: u32,
    pub gaps: Gaps,
}

/// Render the bytes of `range` in `format`.
///
/// The range is clipped to the source.  An empty result means nothing was
/// selected inside the buffer, or the selection is over
/// [`MAX_EXPORT_BYTES`].
pub fn export_selection(
    source: &ByteSource,
    range: ByteRange,
    format: CopyFormat,
    geometry: DumpGeometry,
) -> String {
    let bytes = source.slice(range);
    if bytes.is_empty() {
        return String::new();
    }
    if bytes.len() > MAX_EXPORT_BYTES {
        log::warn!(
            "copy refused: {} bytes selected, limit is {MAX_EXPORT_BYTES}",
            bytes.len()
        );
        return String::new();
    }

    match format {
        CopyFormat::Hex => {
            let mut out = String::with_capacity(bytes.len() * 3);
            for (i, &b) in bytes.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                out.extend(hex_pair(b));
            }
            out
        }
        CopyFormat::Text => bytes.iter().map(|&b| ascii_cell(b)).collect(),
        CopyFormat::Dump => dump_rows(source, range, geometry),
    }
}

fn dump_rows(source: &ByteSource, range: ByteRange, geometry: DumpGeometry) -> String {
    let bpr = u64::from(geometry.bytes_per_row.max(1));
    let last = range.end.min(source.len().saturating_sub(1));
    let first_row = range.start / bpr;
    let last_row = last / bpr;
    let gaps = geometry.gaps;

    let mut out = String::new();
    for row in first_row..=last_row {
        let base = row * bpr;
        let mut line = String::new();
        line.extend(address_digits(base, geometry.addr_digits));
        line.push(':');
        push_blanks(&mut line, gaps.address);

        for b in 0..bpr {
            let off = base + b;
            match source.get(off).filter(|_| range.contains(off)) {
                Some(v) => line.extend(hex_pair(v)),
                None => line.push_str("  "),
            }
            push_blanks(&mut line, gaps.hex);
        }

        push_blanks(&mut line, gaps.section);
        for b in 0..bpr {
            let off = base + b;
            match source.get(off).filter(|_| range.contains(off)) {
                Some(v) => line.push(ascii_cell(v)),
                None => line.push(' '),
            }
        }

        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line.trim_end());
    }
    out
}

fn push_blanks(line: &mut String, n: u32) {
    for _ in 0..n {
        line.push(' ');
    }
}

// ===================================================================
// Tests
// ===================================================================
