//! `ViewState` — everything the grid needs between frames.
//!
//! Owns the byte source, the merged config, viewport and cell metrics, and
//! the derived layout, scroll and selection.  Every mutation recomputes its
//! dependents before returning, so a frame built from a `ViewState` never
//! sees a layout that disagrees with the scroll extents.
//!
//! Font measurement is not done here: when a config change alters the font
//! size, [`ViewState::apply_config`] reports it and the caller feeds the
//! measured cell back through [`ViewState::set_font_metrics`].

use hexview_core::{
    export_selection, ByteSource, ConfigChanges, ConfigPatch, CopyFormat, DumpGeometry,
    EngineConfig, FontMetrics, KeyEvent, PointerEvent, PointerPhase, ResizeEvent, Viewport,
    WheelEvent,
};

use crate::grid::GridLayout;
use crate::hit::pixel_to_byte_index;
use crate::scroll::{ScrollDrag, ScrollState, ScrollbarGeometry, ScrollbarHit};
use crate::selection::Selection;

#[derive(Clone, Debug)]
pub struct ViewState {
    config: EngineConfig,
    viewport: Viewport,
    metrics: FontMetrics,
    source: ByteSource,
    layout: GridLayout,
    scroll: ScrollState,
    selection: Selection,
    scroll_drag: Option<ScrollDrag>,
    /// Set by every visible change, cleared by the frame that draws it.
    dirty: bool,
}

impl ViewState {
    pub fn new(config: EngineConfig, viewport: Viewport, metrics: FontMetrics) -> Self {
        let source = ByteSource::default();
        let layout = GridLayout::compute(&viewport, &metrics, &config, 0);
        let mut state = Self {
            config,
            viewport,
            metrics,
            source,
            layout,
            scroll: ScrollState::default(),
            selection: Selection::new(),
            scroll_drag: None,
            dirty: true,
        };
        state.relayout();
        state
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn source(&self) -> &ByteSource {
        &self.source
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn scrollbar(&self) -> ScrollbarGeometry {
        ScrollbarGeometry::compute(
            self.viewport.width_f64(),
            f64::from(self.config.scrollbar_width_px),
            &self.scroll,
        )
    }

    /// Whether a thumb drag is in progress (drawn with the active colour).
    pub fn is_dragging_scrollbar(&self) -> bool {
        self.scroll_drag.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Return the dirty flag and reset it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Replace the whole buffer.  Address width, bytes per row and scroll
    /// extents are recomputed; the selection is clipped to the new length.
    pub fn replace_data(&mut self, bytes: Vec<u8>) {
        self.source = ByteSource::new(bytes);
        self.selection.clip_to(self.source.len());
        self.relayout();
        log::debug!(
            "data replaced: {} bytes, {} per row, {} address digits",
            self.source.len(),
            self.layout.bytes_per_row,
            self.layout.addr_digits
        );
    }

    pub fn resize(&mut self, ev: &ResizeEvent) {
        self.set_viewport(Viewport::new(ev.width, ev.height, ev.device_pixel_ratio));
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.relayout();
    }

    pub fn set_font_metrics(&mut self, metrics: FontMetrics) {
        if metrics == self.metrics {
            return;
        }
        self.metrics = metrics;
        self.relayout();
    }

    /// Merge `patch` into the config.  Layout is recomputed when spacing or
    /// scrollbar width changed; a font change is only reported.
    pub fn apply_config(&mut self, patch: &ConfigPatch) -> ConfigChanges {
        let next = self.config.merge(patch);
        let changes = self.config.changes(&next);
        self.config = next;
        if changes.layout {
            self.relayout();
        } else if changes.theme {
            self.dirty = true;
        }
        changes
    }

    pub fn wheel(&mut self, ev: &WheelEvent) {
        let before = self.scroll.scroll_y();
        self.scroll.apply_wheel(ev);
        if self.scroll.scroll_y() != before {
            self.dirty = true;
        }
    }

    pub fn pointer(&mut self, ev: &PointerEvent) {
        match ev.phase {
            PointerPhase::Down => self.pointer_down(ev),
            PointerPhase::Move => self.pointer_move(ev),
            PointerPhase::Up => self.pointer_up(ev),
        }
    }

    /// No key bindings are defined; events are only traced.
    pub fn key(&mut self, ev: &KeyEvent) {
        log::trace!("key {:?} {} ({})", ev.phase, ev.key, ev.code);
    }

    /// Render the current selection for the clipboard.
    pub fn export(&self, format: CopyFormat) -> Option<String> {
        let range = self.selection.range()?;
        let geometry = DumpGeometry {
            bytes_per_row: self.layout.bytes_per_row,
            addr_digits: self.layout.addr_digits,
            gaps: self.layout.gaps,
        };
        let text = export_selection(&self.source, range, format, geometry);
        (!text.is_empty()).then_some(text)
    }

    // ── Internals ───────────────────────────────────────────────────

    fn relayout(&mut self) {
        let total = self.source.len();
        self.layout = GridLayout::compute(&self.viewport, &self.metrics, &self.config, total);
        self.scroll.set_extent(
            self.layout.content_height(total, &self.metrics),
            self.viewport.height_f64(),
        );
        self.dirty = true;
    }

    fn hit(&self, x: f64, y: f64) -> Option<u64> {
        pixel_to_byte_index(
            x,
            y,
            &self.layout,
            &self.metrics,
            self.scroll.scroll_y(),
            self.source.len(),
        )
    }

    fn pointer_down(&mut self, ev: &PointerEvent) {
        if !ev.is_primary() {
            return;
        }
        let bar = self.scrollbar();
        match bar.hit_test(ev.x, ev.y) {
            Some(ScrollbarHit::Thumb) => {
                if self.scroll.is_scrollable() {
                    self.scroll_drag = Some(ScrollDrag::begin(ev.y, &self.scroll));
                    self.dirty = true;
                }
            }
            Some(ScrollbarHit::Track) => {
                let target = ev.y - (bar.thumb_height / 2.0).floor();
                if let Some(y) = bar.scroll_for_thumb_y(target, &self.scroll) {
                    self.scroll.set_scroll_y(y);
                    self.dirty = true;
                }
            }
            None => {
                let hit = self.hit(ev.x, ev.y);
                self.selection.press(hit);
                self.dirty = true;
            }
        }
    }

    fn pointer_move(&mut self, ev: &PointerEvent) {
        if let Some(drag) = self.scroll_drag {
            if !ev.primary_held() {
                self.scroll_drag = None;
                self.dirty = true;
                return;
            }
            let bar = self.scrollbar();
            if let Some(y) = drag.scroll_at(ev.y, &bar, &self.scroll) {
                self.scroll.set_scroll_y(y);
                self.dirty = true;
            }
            return;
        }

        if self.selection.is_dragging() && ev.primary_held() {
            let before = self.selection.range();
            let hit = self.hit(ev.x, ev.y);
            self.selection.drag(hit);
            if self.selection.range() != before {
                self.dirty = true;
            }
        }
    }

    fn pointer_up(&mut self, ev: &PointerEvent) {
        if !ev.is_primary() {
            return;
        }
        if self.scroll_drag.take().is_some() {
            self.dirty = true;
        }
        self.selection.release();
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hexview_core::{ByteRange, ThemePatch};

    use crate::selection::SelectionPhase;

    fn reference_view(bytes: Vec<u8>) -> ViewState {
        let mut view = ViewState::new(
            EngineConfig::default(),
            Viewport::new(800.0, 600.0, 1.0),
            FontMetrics::new(14, 8, 16),
        );
        view.replace_data(bytes);
        view
    }

    fn pointer(phase: PointerPhase, x: f64, y: f64) -> PointerEvent {
        PointerEvent::new(phase, x, y)
    }

    #[test]
    fn test_press_hex_drag_to_ascii() {
        let mut view = reference_view(b"Hello".to_vec());
        assert_eq!(view.layout().hex_start, 10);
        assert_eq!(view.layout().ascii_start, 75);

        view.pointer(&pointer(PointerPhase::Down, 132.0, 8.0));
        view.pointer(&pointer(PointerPhase::Move, 636.0, 8.0));
        view.pointer(&pointer(PointerPhase::Up, 636.0, 8.0));

        assert_eq!(view.selection().range(), Some(ByteRange { start: 2, end: 4 }));
        assert_eq!(view.selection().phase(), SelectionPhase::Settled);
        assert_eq!(view.export(CopyFormat::Hex).as_deref(), Some("6C 6C 6F"));
        assert_eq!(view.export(CopyFormat::Text).as_deref(), Some("llo"));
    }

    #[test]
    fn test_drag_off_grid_keeps_range_and_press_off_grid_clears() {
        let mut view = reference_view(vec![0u8; 64]);
        view.pointer(&pointer(PointerPhase::Down, 82.0, 8.0));
        // Byte 3's digits start at column 19.
        view.pointer(&pointer(PointerPhase::Move, 154.0, 8.0));
        let range = view.selection().range();
        assert_eq!(range, Some(ByteRange { start: 0, end: 3 }));

        // Into the address column.
        view.pointer(&pointer(PointerPhase::Move, 4.0, 8.0));
        assert_eq!(view.selection().range(), range);
        view.pointer(&pointer(PointerPhase::Up, 4.0, 8.0));

        view.pointer(&pointer(PointerPhase::Down, 4.0, 8.0));
        assert_eq!(view.selection().range(), None);
        assert_eq!(view.export(CopyFormat::Hex), None);
    }

    #[test]
    fn test_oversized_selection_exports_nothing() {
        let mut view = reference_view(vec![0x7A; hexview_core::MAX_EXPORT_BYTES + 16]);
        view.selection.press(Some(0));
        view.selection.drag(Some(view.source().len() - 1));
        view.selection.release();
        assert!(view.selection().range().is_some());
        assert_eq!(view.export(CopyFormat::Hex), None);

        view.selection.press(Some(16));
        view.selection.drag(Some(31));
        assert_eq!(view.export(CopyFormat::Text).as_deref(), Some("zzzzzzzzzzzzzzzz"));
    }

    #[test]
    fn test_secondary_button_is_ignored() {
        let mut view = reference_view(vec![1u8; 32]);
        let mut ev = pointer(PointerPhase::Down, 82.0, 8.0);
        ev.button = 2;
        ev.buttons = 2;
        view.pointer(&ev);
        assert_eq!(view.selection().range(), None);
    }

    #[test]
    fn test_wheel_reference_overflow() {
        let mut view = ViewState::new(
            EngineConfig::default(),
            Viewport::new(800.0, 604.0, 1.0),
            FontMetrics::new(14, 8, 16),
        );
        view.replace_data(vec![0u8; 1449]);
        assert_eq!(view.layout().bytes_per_row, 21);
        assert_eq!(view.scroll().content_height(), 1104.0);

        view.wheel(&WheelEvent { delta_y: 1000.0, ..Default::default() });
        assert_eq!(view.scroll().scroll_y(), 500.0);
    }

    #[test]
    fn test_empty_buffer_state() {
        let view = reference_view(Vec::new());
        assert_eq!(view.layout().bytes_per_row, 4);
        assert_eq!(view.scroll().content_height(), 0.0);
        assert_eq!(view.scroll().scroll_y(), 0.0);
    }

    #[test]
    fn test_scrollbar_press_leaves_selection_alone() {
        let mut view = reference_view(vec![0u8; 21 * 200]);
        view.pointer(&pointer(PointerPhase::Down, 82.0, 8.0));
        view.pointer(&pointer(PointerPhase::Up, 82.0, 8.0));
        let selected = view.selection().range();

        // Thumb at the top of the track.
        view.pointer(&pointer(PointerPhase::Down, 790.0, 5.0));
        assert!(view.is_dragging_scrollbar());
        view.pointer(&pointer(PointerPhase::Move, 790.0, 105.0));
        assert!(view.scroll().scroll_y() > 0.0);
        view.pointer(&pointer(PointerPhase::Up, 790.0, 105.0));
        assert!(!view.is_dragging_scrollbar());
        assert_eq!(view.selection().range(), selected);
    }

    #[test]
    fn test_track_press_jumps() {
        let mut view = reference_view(vec![0u8; 21 * 200]);
        view.pointer(&pointer(PointerPhase::Down, 790.0, 590.0));
        assert!(!view.is_dragging_scrollbar());
        assert!(view.scroll().scroll_y() > 0.0);
        assert!(view.scroll().scroll_y() <= view.scroll().max_scroll());
    }

    #[test]
    fn test_replace_with_shorter_data_clips_selection_and_scroll() {
        let mut view = reference_view(vec![0u8; 21 * 200]);
        view.wheel(&WheelEvent { delta_y: 1e9, ..Default::default() });
        view.pointer(&pointer(PointerPhase::Down, 82.0, 8.0));
        view.pointer(&pointer(PointerPhase::Move, 106.0, 40.0));
        view.pointer(&pointer(PointerPhase::Up, 106.0, 40.0));
        let sel = view.selection().range().unwrap();

        view.replace_data(vec![0u8; 10]);
        assert_eq!(view.scroll().scroll_y(), 0.0);
        match view.selection().range() {
            Some(r) => assert!(r.end < 10),
            None => assert!(sel.start >= 10),
        }
    }

    #[test]
    fn test_config_changes_relayout() {
        let mut view = reference_view(vec![0u8; 100]);
        view.take_dirty();

        let changes = view.apply_config(&ConfigPatch { hex_gap_chars: Some(0.0), ..Default::default() });
        assert!(changes.layout && !changes.font);
        // 97 columns − 12 reserved = 85 → 85 / 3 = 28.
        assert_eq!(view.layout().bytes_per_row, 28);
        assert!(view.take_dirty());

        let changes = view.apply_config(&ConfigPatch {
            theme: Some(ThemePatch { dim: Some([0.1, 0.2, 0.3, 1.0]), ..Default::default() }),
            ..Default::default()
        });
        assert!(changes.theme && !changes.layout);
        assert!(view.take_dirty());

        let changes = view.apply_config(&ConfigPatch { font_px: Some(20.0), ..Default::default() });
        assert!(changes.font);
        assert_eq!(view.config().font_px, 20);
    }

    #[test]
    fn test_resize_recomputes_layout() {
        let mut view = reference_view(vec![0u8; 100]);
        view.resize(&ResizeEvent { width: 420.0, height: 300.0, device_pixel_ratio: 1.0 });
        // 400 px → 50 columns − 12 = 38 → 9.
        assert_eq!(view.layout().bytes_per_row, 9);
        assert_eq!(view.scroll().viewport_height(), 300.0);
    }
}
