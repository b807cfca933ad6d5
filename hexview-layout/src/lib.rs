//! # hexview-layout
//!
//! Pure geometry and interaction state for the hex grid.
//!
//! ```text
//!  Viewport ─┐
//!  Metrics  ─┼─▸ GridLayout ──▸ hit::pixel_to_byte_index
//!  Config   ─┤        │
//!  length   ─┘        ▼
//!               ScrollState ──▸ ScrollbarGeometry
//!                     │
//!  PointerEvent ─▸ ViewState ──▸ Selection
//! ```
//!
//! Nothing in this crate touches the GPU or fonts: cell metrics arrive
//! already measured, so every function here is deterministic and cheap to
//! test.

pub mod grid;
pub mod hit;
pub mod scroll;
pub mod selection;
pub mod view;

pub use grid::{
    address_digits_for_len, compute_bytes_per_row, compute_column_starts, ColumnStarts,
    GridLayout,
};
pub use hit::pixel_to_byte_index;
pub use scroll::{ScrollDrag, ScrollState, ScrollbarGeometry, ScrollbarHit};
pub use selection::{Selection, SelectionPhase};
pub use view::ViewState;
