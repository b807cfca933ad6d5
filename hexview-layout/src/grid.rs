//! Row geometry: how many bytes fit on a row and where each section starts.
//!
//! All positions are in character columns.  A row reads
//!
//! ```text
//!  AAAAAAAA:␣HH␣HH␣HH␣ … ␣␣cccc
//!  │        │              │
//!  0        hex_start      ascii_start
//! ```
//!
//! with `address` blanks after the colon, `hex` blanks after every byte and
//! `section` blanks between the two sections.

use hexview_core::config::MAX_BYTES_PER_ROW;
use hexview_core::{EngineConfig, FontMetrics, Gaps, Viewport};

/// Buffers at least this long need 16 address digits.
const WIDE_ADDRESS_THRESHOLD: u64 = 1 << 32;

/// Number of hex digits in the address column: 16 for buffers of 4 GiB or
/// more, 8 otherwise.
#[inline]
pub fn address_digits_for_len(total_bytes: u64) -> u32 {
    if total_bytes >= WIDE_ADDRESS_THRESHOLD {
        16
    } else {
        8
    }
}

/// Fit as many bytes per row as the content area allows.
///
/// The content area is the viewport minus the scrollbar.  The result is
/// clamped to `[max(1, min_bytes_per_row), 1024]`, so it is never zero
/// even when the viewport is narrower than the address column.
pub fn compute_bytes_per_row(
    viewport_width_px: u32,
    cell_width_px: u32,
    addr_digits: u32,
    scrollbar_width_px: u32,
    min_bytes_per_row: u32,
    gaps: Gaps,
) -> u32 {
    let content_px = viewport_width_px.saturating_sub(scrollbar_width_px).max(1);
    let columns = (content_px / cell_width_px.max(1)).max(1);

    let reserved = addr_digits + 1 + gaps.address + gaps.section;
    let per_byte = 2 + gaps.hex + 1;
    let fit = columns.saturating_sub(reserved) / per_byte;

    let floor = min_bytes_per_row.clamp(1, MAX_BYTES_PER_ROW);
    fit.clamp(floor, MAX_BYTES_PER_ROW)
}

/// First column of the hex section and of the ASCII section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnStarts {
    pub hex_start: u32,
    pub ascii_start: u32,
}

pub fn compute_column_starts(addr_digits: u32, bytes_per_row: u32, gaps: Gaps) -> ColumnStarts {
    let hex_start = addr_digits + 1 + gaps.address;
    let ascii_start = hex_start + bytes_per_row * (2 + gaps.hex) + gaps.section;
    ColumnStarts {
        hex_start,
        ascii_start,
    }
}

// ───────────────────────────────────────────────────────────────────
// GridLayout
// ───────────────────────────────────────────────────────────────────

/// Derived grid geometry for one (viewport, font, config, length) tuple.
///
/// Recomputed whenever any input changes; never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub addr_digits: u32,
    pub bytes_per_row: u32,
    pub gaps: Gaps,
    pub hex_start: u32,
    pub ascii_start: u32,
    /// Width in pixels left of the scrollbar.  Cells starting at or past
    /// this x are not drawn.
    pub content_width: u32,
}

impl GridLayout {
    pub fn compute(
        viewport: &Viewport,
        metrics: &FontMetrics,
        config: &EngineConfig,
        total_bytes: u64,
    ) -> Self {
        let addr_digits = address_digits_for_len(total_bytes);
        let bytes_per_row = if total_bytes == 0 {
            config.min_bytes_per_row.clamp(1, MAX_BYTES_PER_ROW)
        } else {
            compute_bytes_per_row(
                viewport.width,
                metrics.cell_width,
                addr_digits,
                config.scrollbar_width_px,
                config.min_bytes_per_row,
                config.gaps,
            )
        };
        let starts = compute_column_starts(addr_digits, bytes_per_row, config.gaps);

        Self {
            addr_digits,
            bytes_per_row,
            gaps: config.gaps,
            hex_start: starts.hex_start,
            ascii_start: starts.ascii_start,
            content_width: viewport
                .width
                .saturating_sub(config.scrollbar_width_px)
                .max(1),
        }
    }

    /// Columns occupied by one byte in the hex section (digits + gap).
    #[inline]
    pub fn hex_stride(&self) -> u32 {
        2 + self.gaps.hex
    }

    /// Column of the first hex digit of byte `i` within a row.
    #[inline]
    pub fn hex_column(&self, i: u32) -> u32 {
        self.hex_start + i * self.hex_stride()
    }

    /// Column of the ASCII glyph of byte `i` within a row.
    #[inline]
    pub fn ascii_column(&self, i: u32) -> u32 {
        self.ascii_start + i
    }

    /// Total number of rows for a buffer of `total_bytes`.
    pub fn row_count(&self, total_bytes: u64) -> u64 {
        total_bytes.div_ceil(u64::from(self.bytes_per_row))
    }

    /// Height in pixels of all rows.
    pub fn content_height(&self, total_bytes: u64, metrics: &FontMetrics) -> f64 {
        self.row_count(total_bytes) as f64 * metrics.cell_height_f64()
    }

    /// Characters per row up to the end of the ASCII section.
    pub fn row_columns(&self) -> u32 {
        self.ascii_start + self.bytes_per_row
    }
}

// ===================================================================
// Tests
// ===================================================================
