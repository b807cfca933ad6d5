//! Vertical scroll position and scrollbar geometry.
//!
//! Positions are `f64` pixels: a multi-gigabyte buffer at 20 px per row
//! overflows `f32` precision long before it reaches the last row.

use hexview_core::WheelEvent;

/// Smallest thumb the user can still grab.
pub const MIN_THUMB_HEIGHT: f64 = 24.0;

/// Wheel multiplier while Shift is held.
pub const SHIFT_WHEEL_FACTOR: f64 = 3.0;

/// Scroll offset together with the extents it is clamped against.
///
/// Invariant: `0 <= scroll_y <= max(0, content_height - viewport_height)`
/// after every mutating call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollState {
    scroll_y: f64,
    content_height: f64,
    viewport_height: f64,
}

impl ScrollState {
    pub fn new(content_height: f64, viewport_height: f64) -> Self {
        let mut s = Self::default();
        s.set_extent(content_height, viewport_height);
        s
    }

    #[inline]
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    #[inline]
    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    #[inline]
    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Largest valid scroll offset.
    pub fn max_scroll(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    /// Whether the content is taller than the viewport.
    pub fn is_scrollable(&self) -> bool {
        self.content_height > self.viewport_height
    }

    /// Update the extents and re-clamp.  Called after resize, data
    /// replacement, font change or a bytes-per-row change.
    pub fn set_extent(&mut self, content_height: f64, viewport_height: f64) {
        self.content_height = sanitize(content_height);
        self.viewport_height = sanitize(viewport_height);
        self.clamp();
    }

    /// Force `scroll_y` into `[0, max_scroll]`.  Idempotent.
    pub fn clamp(&mut self) {
        let max = self.max_scroll();
        self.scroll_y = if self.scroll_y.is_finite() {
            self.scroll_y.clamp(0.0, max)
        } else {
            0.0
        };
    }

    pub fn set_scroll_y(&mut self, y: f64) {
        if !y.is_finite() {
            return;
        }
        self.scroll_y = y;
        self.clamp();
    }

    pub fn scroll_by(&mut self, dy: f64) {
        self.set_scroll_y(self.scroll_y + dy);
    }

    /// Apply a wheel event.  Shift accelerates by [`SHIFT_WHEEL_FACTOR`];
    /// horizontal deltas are ignored.
    pub fn apply_wheel(&mut self, ev: &WheelEvent) {
        let factor = if ev.shift_key { SHIFT_WHEEL_FACTOR } else { 1.0 };
        self.scroll_by(ev.delta_y * factor);
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

// ───────────────────────────────────────────────────────────────────
// Scrollbar
// ───────────────────────────────────────────────────────────────────

/// Which part of the scrollbar a pointer landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollbarHit {
    Thumb,
    Track,
}

/// Scrollbar rectangles for the current scroll state, in surface pixels.
///
/// The track spans the full viewport height along the right edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollbarGeometry {
    pub x: f64,
    pub width: f64,
    pub track_height: f64,
    pub thumb_y: f64,
    pub thumb_height: f64,
}

impl ScrollbarGeometry {
    pub fn compute(viewport_width: f64, scrollbar_width: f64, scroll: &ScrollState) -> Self {
        let track = scroll.viewport_height();
        let width = scrollbar_width.min(viewport_width).max(0.0);
        let x = (viewport_width - width).max(0.0);

        let (thumb_y, thumb_height) = if scroll.is_scrollable() {
            let ratio = scroll.viewport_height() / scroll.content_height();
            let thumb = (ratio * track).floor().max(MIN_THUMB_HEIGHT).min(track);
            let travel = track - thumb;
            let y = (scroll.scroll_y() / scroll.max_scroll() * travel).floor();
            (y.clamp(0.0, travel.max(0.0)), thumb)
        } else {
            (0.0, track)
        };

        Self {
            x,
            width,
            track_height: track,
            thumb_y,
            thumb_height,
        }
    }

    /// Distance the thumb can move.
    #[inline]
    pub fn travel(&self) -> f64 {
        self.track_height - self.thumb_height
    }

    pub fn hit_test(&self, px: f64, py: f64) -> Option<ScrollbarHit> {
        if px < self.x || px >= self.x + self.width || py < 0.0 || py >= self.track_height {
            return None;
        }
        if py >= self.thumb_y && py < self.thumb_y + self.thumb_height {
            Some(ScrollbarHit::Thumb)
        } else {
            Some(ScrollbarHit::Track)
        }
    }

    /// Scroll offset that puts the top of the thumb at `thumb_y`.
    ///
    /// `None` when the thumb cannot move (content fits the viewport).
    pub fn scroll_for_thumb_y(&self, thumb_y: f64, scroll: &ScrollState) -> Option<f64> {
        let travel = self.travel();
        if travel <= 0.0 || !scroll.is_scrollable() {
            return None;
        }
        Some(thumb_y.clamp(0.0, travel) / travel * scroll.max_scroll())
    }
}

/// An in-progress thumb drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollDrag {
    pub start_pointer_y: f64,
    pub start_scroll_y: f64,
}

impl ScrollDrag {
    pub fn begin(pointer_y: f64, scroll: &ScrollState) -> Self {
        Self {
            start_pointer_y: pointer_y,
            start_scroll_y: scroll.scroll_y(),
        }
    }

    /// Scroll offset for the pointer now at `pointer_y`.
    ///
    /// The pixel delta maps by the inverse of the thumb ratio:
    /// `start + dy / (track - thumb) * (content - viewport)`.
    pub fn scroll_at(&self, pointer_y: f64, bar: &ScrollbarGeometry, scroll: &ScrollState) -> Option<f64> {
        let travel = bar.travel();
        if travel <= 0.0 || !scroll.is_scrollable() {
            return None;
        }
        let dy = pointer_y - self.start_pointer_y;
        Some(self.start_scroll_y + dy / travel * scroll.max_scroll())
    }
}

// ===================================================================
// Tests
// ===================================================================
