//! Byte selection state machine.
//!
//! ```text
//!            press(hit)            release
//!  Idle ───────────────▸ Dragging ─────────▸ Settled
//!   ▲                      │  ▲                 │
//!   │   press(miss)        │  └── drag(hit) ─┐  │ press(hit)
//!   └──────────────────────┴─────────────────┴──┘
//! ```
//!
//! A drag that wanders off the grid keeps the last range; only a press
//! that misses clears it.

use hexview_core::ByteRange;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionPhase {
    #[default]
    Idle,
    Dragging,
    Settled,
}

/// Current selection.  `range` is `None` exactly when the phase is `Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    anchor: u64,
    range: Option<ByteRange>,
    phase: SelectionPhase,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    #[inline]
    pub fn range(&self) -> Option<ByteRange> {
        self.range
    }

    #[inline]
    pub fn anchor(&self) -> Option<u64> {
        self.range.map(|_| self.anchor)
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.phase == SelectionPhase::Dragging
    }

    #[inline]
    pub fn contains(&self, offset: u64) -> bool {
        self.range.is_some_and(|r| r.contains(offset))
    }

    /// Primary-button press on the grid.  A hit starts a new drag from that
    /// byte; a miss clears.
    pub fn press(&mut self, hit: Option<u64>) {
        match hit {
            Some(offset) => {
                self.anchor = offset;
                self.range = Some(ByteRange::single(offset));
                self.phase = SelectionPhase::Dragging;
            }
            None => self.clear(),
        }
    }

    /// Pointer moved with the primary button held.  Extends from the anchor
    /// to the hit; a miss keeps the previous range.  Ignored unless dragging.
    pub fn drag(&mut self, hit: Option<u64>) {
        if self.phase != SelectionPhase::Dragging {
            return;
        }
        if let Some(offset) = hit {
            self.range = Some(ByteRange::spanning(self.anchor, offset));
        }
    }

    /// Primary button released.  The range stays as it is.
    pub fn release(&mut self) {
        if self.phase == SelectionPhase::Dragging {
            self.phase = SelectionPhase::Settled;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Keep the selection inside a buffer of `total_bytes`.  A range that
    /// starts past the end is cleared; one that runs past it is shortened.
    pub fn clip_to(&mut self, total_bytes: u64) {
        let Some(range) = self.range else {
            return;
        };
        if range.start >= total_bytes {
            self.clear();
            return;
        }
        let last = total_bytes - 1;
        self.range = Some(ByteRange::spanning(range.start, range.end.min(last)));
        self.anchor = self.anchor.min(last);
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(sel: &Selection, total: u64) {
        match sel.range() {
            Some(r) => {
                assert!(r.start <= r.end);
                assert!(r.end < total);
                assert_ne!(sel.phase(), SelectionPhase::Idle);
            }
            None => assert_eq!(sel.phase(), SelectionPhase::Idle),
        }
    }

    #[test]
    fn test_press_drag_release() {
        let mut sel = Selection::new();
        sel.press(Some(2));
        assert_eq!(sel.phase(), SelectionPhase::Dragging);
        assert_eq!(sel.range(), Some(ByteRange::single(2)));

        sel.drag(Some(4));
        assert_eq!(sel.range(), Some(ByteRange { start: 2, end: 4 }));

        sel.release();
        assert_eq!(sel.phase(), SelectionPhase::Settled);
        assert_eq!(sel.range(), Some(ByteRange { start: 2, end: 4 }));
    }

    #[test]
    fn test_drag_backwards_normalizes() {
        let mut sel = Selection::new();
        sel.press(Some(10));
        sel.drag(Some(3));
        assert_eq!(sel.range(), Some(ByteRange { start: 3, end: 10 }));
        assert_eq!(sel.anchor(), Some(10));
    }

    #[test]
    fn test_drag_miss_preserves_range() {
        let mut sel = Selection::new();
        sel.press(Some(1));
        sel.drag(Some(6));
        sel.drag(None);
        assert_eq!(sel.range(), Some(ByteRange { start: 1, end: 6 }));
    }

    #[test]
    fn test_press_miss_clears() {
        let mut sel = Selection::new();
        sel.press(Some(1));
        sel.release();
        sel.press(None);
        assert_eq!(sel.range(), None);
        assert_eq!(sel.phase(), SelectionPhase::Idle);
        assert_eq!(sel.anchor(), None);
    }

    #[test]
    fn test_drag_ignored_when_settled() {
        let mut sel = Selection::new();
        sel.press(Some(5));
        sel.release();
        sel.drag(Some(9));
        assert_eq!(sel.range(), Some(ByteRange::single(5)));
    }

    #[test]
    fn test_clip_to_shorter_buffer() {
        let mut sel = Selection::new();
        sel.press(Some(4));
        sel.drag(Some(20));
        sel.release();

        sel.clip_to(10);
        assert_eq!(sel.range(), Some(ByteRange { start: 4, end: 9 }));
        assert_eq!(sel.phase(), SelectionPhase::Settled);

        sel.clip_to(4);
        assert_eq!(sel.range(), None);
        assert_eq!(sel.phase(), SelectionPhase::Idle);
    }

    #[test]
    fn test_well_formed_after_every_event() {
        let total = 50;
        let mut sel = Selection::new();
        let script: [(u8, Option<u64>); 10] = [
            (0, Some(10)),
            (1, Some(40)),
            (1, None),
            (1, Some(0)),
            (2, None),
            (1, Some(30)),
            (0, None),
            (0, Some(49)),
            (1, Some(49)),
            (2, None),
        ];
        for (op, hit) in script {
            match op {
                0 => sel.press(hit),
                1 => sel.drag(hit),
                _ => sel.release(),
            }
            assert_well_formed(&sel, total);
        }
    }
}
