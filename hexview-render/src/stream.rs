//! Instance stream — turns a [`ViewState`] into the frame's quad list.
//!
//! ```text
//!   col 0        hex_start                        ascii_start
//!   │            │                                │
//!   00000010: ␣  48 ␣ 65 ␣ 6C ␣ … ␣ ␣ ␣            Hel…         ┃▓┃
//!   └address┘ gap └digits┘ hex-gap   section-gap  └ascii┘       track/thumb
//! ```
//!
//! Rows are emitted top to bottom from the first partly visible row, with
//! two rows of overscan.  The scrollbar track and thumb come last so they
//! draw over any cell that reaches under them.

use hexview_core::format::{address_digits, ascii_cell, hex_pair, is_printable};
use hexview_core::{Rgba, Theme};
use hexview_layout::ViewState;
use hexview_text::{AtlasRegion, GlyphAtlas};

use crate::vertex::GridInstance;

/// Rows drawn beyond the viewport so a partially scrolled row is covered.
const OVERSCAN_ROWS: u64 = 2;
/// Per-row headroom in the capacity estimate.
const ROW_SLACK: usize = 8;
/// Track + thumb.
const SCROLLBAR_INSTANCES: usize = 2;

/// Reusable per-frame instance buffer.
#[derive(Debug, Default)]
pub struct InstanceStream {
    instances: Vec<GridInstance>,
}

/// Writes the cells of one row, dropping those past the content edge.
struct RowWriter<'a> {
    out: &'a mut Vec<GridInstance>,
    atlas: &'a GlyphAtlas,
    y: f32,
    cell_w: f32,
    cell_h: f32,
    content_width: f32,
}

impl RowWriter<'_> {
    #[inline]
    fn cell(&mut self, column: u32, ch: char, fg: Rgba, bg: Rgba) {
        let x = column as f32 * self.cell_w;
        if x >= self.content_width {
            return;
        }
        let region = self.atlas.lookup(ch);
        self.out
            .push(GridInstance::glyph(x, self.y, self.cell_w, self.cell_h, region, fg, bg));
    }

    fn blanks(&mut self, first_column: u32, count: u32, theme: &Theme) {
        for i in 0..count {
            self.cell(first_column + i, ' ', theme.text, theme.background);
        }
    }
}

impl InstanceStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the instance list for the current view.
    pub fn build(&mut self, view: &ViewState, atlas: &GlyphAtlas) -> &[GridInstance] {
        self.instances.clear();

        let theme = &view.config().theme;
        let layout = view.layout();
        let metrics = view.metrics();
        let source = view.source();
        let selection = view.selection();
        let total = source.len();

        let cell_h = metrics.cell_height_f64();
        let scroll_y = view.scroll().scroll_y();
        let first_row = (scroll_y / cell_h).floor().max(0.0) as u64;
        let rows_visible = (view.viewport().height_f64() / cell_h).ceil() as u64 + OVERSCAN_ROWS;
        let y_offset = scroll_y - first_row as f64 * cell_h;

        let estimate = rows_visible as usize * (layout.row_columns() as usize + ROW_SLACK)
            + SCROLLBAR_INSTANCES;
        self.instances.reserve(estimate);

        let bytes_per_row = u64::from(layout.bytes_per_row);
        let addr_columns = layout.addr_digits + 1;

        for r in 0..rows_visible {
            let row = first_row + r;
            let base = row.saturating_mul(bytes_per_row);
            if base >= total {
                break;
            }

            let mut w = RowWriter {
                out: &mut self.instances,
                atlas,
                y: (r as f64 * cell_h - y_offset) as f32,
                cell_w: metrics.cell_width as f32,
                cell_h: cell_h as f32,
                content_width: layout.content_width as f32,
            };

            // Address + colon.
            for (i, digit) in address_digits(base, layout.addr_digits).enumerate() {
                w.cell(i as u32, digit, theme.address, theme.background);
            }
            w.cell(layout.addr_digits, ':', theme.address, theme.background);
            w.blanks(addr_columns, layout.gaps.address, theme);

            // Hex section.
            for b in 0..layout.bytes_per_row {
                let offset = base + u64::from(b);
                let Some(byte) = source.get(offset) else {
                    break;
                };
                let (fg, bg) = if selection.contains(offset) {
                    (theme.selection_fg, theme.selection_bg)
                } else {
                    (theme.text, theme.background)
                };
                let col = layout.hex_column(b);
                let [hi, lo] = hex_pair(byte);
                w.cell(col, hi, fg, bg);
                w.cell(col + 1, lo, fg, bg);
                w.blanks(col + 2, layout.gaps.hex, theme);
            }

            w.blanks(layout.ascii_start - layout.gaps.section, layout.gaps.section, theme);

            // ASCII section.
            for b in 0..layout.bytes_per_row {
                let offset = base + u64::from(b);
                let Some(byte) = source.get(offset) else {
                    break;
                };
                let (fg, bg) = if selection.contains(offset) {
                    (theme.selection_fg, theme.selection_bg)
                } else if is_printable(byte) {
                    (theme.text, theme.background)
                } else {
                    (theme.dim, theme.background)
                };
                w.cell(layout.ascii_column(b), ascii_cell(byte), fg, bg);
            }
        }

        self.push_scrollbar(view, atlas.blank());
        &self.instances
    }

    fn push_scrollbar(&mut self, view: &ViewState, blank: AtlasRegion) {
        let theme = &view.config().theme;
        let bar = view.scrollbar();
        let thumb = if view.is_dragging_scrollbar() {
            theme.scroll_thumb_active
        } else {
            theme.scroll_thumb
        };

        self.instances.push(GridInstance::solid(
            bar.x as f32,
            0.0,
            bar.width as f32,
            bar.track_height as f32,
            blank,
            theme.scroll_track,
        ));
        self.instances.push(GridInstance::solid(
            bar.x as f32,
            bar.thumb_y as f32,
            bar.width as f32,
            bar.thumb_height as f32,
            blank,
            thumb,
        ));
    }

    /// Instances produced by the last [`InstanceStream::build`].
    pub fn instances(&self) -> &[GridInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.instances.capacity()
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use hexview_core::{
        ConfigPatch, EngineConfig, FontMetrics, PointerEvent, PointerPhase, Viewport, WheelEvent,
    };
    use hexview_layout::pixel_to_byte_index;

    fn view(bytes: Vec<u8>) -> ViewState {
        let mut view = ViewState::new(
            EngineConfig::default(),
            Viewport::new(800.0, 600.0, 1.0),
            FontMetrics::new(14, 8, 16),
        );
        view.replace_data(bytes);
        view
    }

    fn atlas() -> GlyphAtlas {
        GlyphAtlas::new(FontMetrics::new(14, 8, 16))
    }

    fn at(instances: &[GridInstance], x: f32, y: f32) -> Vec<GridInstance> {
        instances
            .iter()
            .copied()
            .filter(|i| i.position == [x, y] && i.size == [8.0, 16.0])
            .collect()
    }

    #[test]
    fn test_single_short_row() {
        let v = view(b"Hello".to_vec());
        let a = atlas();
        let mut stream = InstanceStream::new();
        let out = stream.build(&v, &a);

        // 9 address + 1 gap + 5 × (2 + 1) hex + 2 section + 5 ascii + 2 scrollbar.
        assert_eq!(out.len(), 9 + 1 + 15 + 2 + 5 + 2);

        let theme = Theme::default();
        let colon = at(out, 8.0 * 8.0, 0.0);
        assert_eq!(colon.len(), 1);
        assert_eq!(colon[0].uv_min, [a.lookup(':').u_min, a.lookup(':').v_min]);
        assert_eq!(colon[0].fg, theme.address);

        // 'H' = 0x48 at hex_start (column 10).
        let hi = at(out, 80.0, 0.0);
        assert_eq!(hi[0].uv_min, [a.lookup('4').u_min, a.lookup('4').v_min]);
        let ascii_h = at(out, 75.0 * 8.0, 0.0);
        assert_eq!(ascii_h[0].uv_min, [a.lookup('H').u_min, a.lookup('H').v_min]);
        assert_eq!(ascii_h[0].fg, theme.text);
    }

    #[test]
    fn test_past_end_slots_are_not_emitted() {
        let v = view(vec![0u8; 22]);
        let mut stream = InstanceStream::new();
        let out = stream.build(&v, &atlas());
        // Second row holds one byte; its second hex slot (column 13) is empty.
        assert_eq!(at(out, 13.0 * 8.0, 16.0).len(), 0);
        assert_eq!(at(out, 10.0 * 8.0, 16.0).len(), 1);
        assert_eq!(at(out, 76.0 * 8.0, 16.0).len(), 0);
    }

    #[test]
    fn test_selection_and_dim_colours() {
        let mut v = view(vec![0x41, 0x00, 0x42, 0x43]);
        v.pointer(&PointerEvent::new(PointerPhase::Down, 10.0 * 8.0 + 1.0, 8.0));
        v.pointer(&PointerEvent::new(PointerPhase::Move, 13.0 * 8.0 + 1.0, 8.0));
        v.pointer(&PointerEvent::new(PointerPhase::Up, 13.0 * 8.0 + 1.0, 8.0));

        let theme = Theme::default();
        let a = atlas();
        let mut stream = InstanceStream::new();
        let out = stream.build(&v, &a);

        // ascii_start = 10 + 21 × 3 + 2 = 75.
        let selected_nul = at(out, 76.0 * 8.0, 0.0);
        assert_eq!(selected_nul[0].bg, theme.selection_bg);
        assert_eq!(selected_nul[0].fg, theme.selection_fg);
        let unselected = at(out, 77.0 * 8.0, 0.0);
        assert_eq!(unselected[0].bg, theme.background);

        // Hex gap after a selected byte keeps normal colours.
        let gap = at(out, 12.0 * 8.0, 0.0);
        assert_eq!(gap[0].bg, theme.background);
        assert_eq!(at(out, 11.0 * 8.0, 0.0)[0].bg, theme.selection_bg);

        v.pointer(&PointerEvent::new(PointerPhase::Down, 4.0, 8.0));
        let out = stream.build(&v, &a);
        let dim_nul = at(out, 76.0 * 8.0, 0.0);
        assert_eq!(dim_nul[0].fg, theme.dim);
        assert_eq!(dim_nul[0].uv_min, [a.lookup('.').u_min, a.lookup('.').v_min]);
    }

    #[test]
    fn test_cells_past_content_width_are_dropped() {
        let mut v = ViewState::new(
            EngineConfig::default(),
            Viewport::new(100.0, 600.0, 1.0),
            FontMetrics::new(14, 8, 16),
        );
        v.replace_data(vec![0xAB; 64]);
        let mut stream = InstanceStream::new();
        let out = stream.build(&v, &atlas());
        let content = v.layout().content_width as f32;
        let n = out.len();
        for inst in &out[..n - 2] {
            assert!(inst.position[0] < content);
        }
    }

    #[test]
    fn test_scroll_offsets_rows_and_overscan() {
        let mut v = view(vec![0u8; 21 * 1000]);
        v.wheel(&WheelEvent {
            delta_y: 24.0,
            ..Default::default()
        });
        let mut stream = InstanceStream::new();
        let out = stream.build(&v, &atlas());
        // first_row = 1, y offset 8: row 1 is drawn at y = -8.
        assert_eq!(at(out, 80.0, -8.0).len(), 1);
        // ceil(600 / 16) + 2 = 40 rows of 96 cells.
        assert_eq!(out.len(), 40 * 96 + 2);
        assert!(stream.capacity() >= 40 * (96 + 8) + 2);
    }

    #[test]
    fn test_emitted_cells_hit_test_back_to_their_byte() {
        let a = atlas();
        let uv = |c: char| {
            let r = a.lookup(c);
            [r.u_min, r.v_min]
        };
        // Letters only, so every digit and ASCII glyph differs from a blank.
        let bytes: Vec<u8> = (0..21 * 1000).map(|i| b'A' + (i % 26) as u8).collect();

        let gaps = [
            ConfigPatch::default(),
            ConfigPatch {
                address_gap_chars: Some(3.0),
                hex_gap_chars: Some(2.0),
                section_gap_chars: Some(5.0),
                ..Default::default()
            },
        ];
        for patch in &gaps {
            let mut v = view(bytes.clone());
            v.apply_config(patch);
            v.wheel(&WheelEvent {
                delta_y: 1000.0,
                ..Default::default()
            });
            let layout = *v.layout();
            let metrics = *v.metrics();
            let scroll_y = v.scroll().scroll_y();
            let total = v.source().len();

            let mut stream = InstanceStream::new();
            let out = stream.build(&v, &a);
            let cells = &out[..out.len() - 2];

            let mut glyph_hits: HashMap<u64, u32> = HashMap::new();
            for cell in cells {
                let cx = f64::from(cell.position[0] + cell.size[0] / 2.0);
                let cy = f64::from(cell.position[1] + cell.size[1] / 2.0);
                let Some(offset) = pixel_to_byte_index(cx, cy, &layout, &metrics, scroll_y, total)
                else {
                    continue;
                };
                if cell.uv_min == uv(' ') {
                    continue;
                }
                let byte = bytes[offset as usize];
                let [hi, lo] = hex_pair(byte);
                let expected = [uv(hi), uv(lo), uv(ascii_cell(byte))];
                assert!(
                    expected.contains(&cell.uv_min),
                    "cell at {:?} maps to byte {offset}",
                    cell.position
                );
                *glyph_hits.entry(offset).or_default() += 1;
            }

            // Two hex digits and one ASCII glyph per drawn byte.
            assert!(!glyph_hits.is_empty());
            let bpr = u64::from(layout.bytes_per_row);
            let first = glyph_hits.keys().min().copied().unwrap_or(0);
            let last = glyph_hits.keys().max().copied().unwrap_or(0);
            assert_eq!(first % bpr, 0);
            assert_eq!((last + 1) % bpr, 0);
            for offset in first..=last {
                assert_eq!(glyph_hits.get(&offset), Some(&3), "byte {offset}");
            }
        }
    }

    #[test]
    fn test_scrollbar_is_last_and_uses_theme() {
        let v = view(vec![0u8; 21 * 100]);
        let theme = Theme::default();
        let a = atlas();
        let mut stream = InstanceStream::new();
        let out = stream.build(&v, &a);
        let track = out[out.len() - 2];
        let thumb = out[out.len() - 1];
        assert_eq!(track.position, [780.0, 0.0]);
        assert_eq!(track.size, [20.0, 600.0]);
        assert_eq!(track.fg, theme.scroll_track);
        assert_eq!(track.uv_min, [a.blank().u_min, a.blank().v_min]);
        assert_eq!(thumb.bg, theme.scroll_thumb);
        assert!(thumb.size[1] < 600.0);
    }

    #[test]
    fn test_thumb_drag_uses_active_colour() {
        let mut v = view(vec![0u8; 21 * 100]);
        let bar = v.scrollbar();
        v.pointer(&PointerEvent::new(
            PointerPhase::Down,
            bar.x + 1.0,
            bar.thumb_y + 1.0,
        ));
        assert!(v.is_dragging_scrollbar());
        let mut stream = InstanceStream::new();
        let out = stream.build(&v, &atlas());
        assert_eq!(out[out.len() - 1].bg, Theme::default().scroll_thumb_active);
    }

    #[test]
    fn test_empty_buffer_draws_only_scrollbar() {
        let v = view(Vec::new());
        let mut stream = InstanceStream::new();
        assert_eq!(stream.build(&v, &atlas()).len(), 2);
    }
}
