//! Pixel → byte hit testing.
//!
//! Inverse of the row geometry in [`crate::grid`]: a pixel inside any hex
//! digit, the blanks that follow it, or its ASCII glyph maps to that byte.

use hexview_core::FontMetrics;

use crate::grid::GridLayout;

/// Map a surface pixel to the byte drawn there.
///
/// `scroll_y` is the current vertical scroll in pixels.  Returns `None` for
/// the address column, the section gap, anything right of the content
/// area, rows past the last one and slots past the end of the buffer.
pub fn pixel_to_byte_index(
    px: f64,
    py: f64,
    layout: &GridLayout,
    metrics: &FontMetrics,
    scroll_y: f64,
    total_bytes: u64,
) -> Option<u64> {
    if !px.is_finite() || !py.is_finite() || px < 0.0 || px >= f64::from(layout.content_width) {
        return None;
    }

    let row = ((py + scroll_y) / metrics.cell_height_f64()).floor();
    if row < 0.0 || !row.is_finite() {
        return None;
    }
    let row = row as u64;
    let bpr = u64::from(layout.bytes_per_row);
    let row_base = row.checked_mul(bpr)?;
    if row_base >= total_bytes {
        return None;
    }

    let column = (px / metrics.cell_width_f64()).floor() as u32;
    let in_row = column_to_byte(column, layout)?;

    let index = row_base + u64::from(in_row);
    (index < total_bytes).then_some(index)
}

/// Byte slot within a row for a character column.
fn column_to_byte(column: u32, layout: &GridLayout) -> Option<u32> {
    let hex_end = layout.hex_start + layout.bytes_per_row * layout.hex_stride();
    if column >= layout.hex_start && column < hex_end {
        return Some((column - layout.hex_start) / layout.hex_stride());
    }

    let ascii_end = layout.ascii_start + layout.bytes_per_row;
    if column >= layout.ascii_start && column < ascii_end {
        return Some(column - layout.ascii_start);
    }

    None
}

// ===================================================================
// Tests
// ===================================================================
