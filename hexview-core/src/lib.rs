//! # hexview-core
//!
//! Shared data model for the hexview grid engine.
//!
//! Everything here is plain data: the byte buffer being viewed, surface and
//! font geometry, the colour theme, the merged engine configuration and the
//! payloads exchanged with the host.  No GPU or font types leak into this
//! crate, so the layout and text crates can depend on it freely.
//!
//! - [`source`] — the read-only [`ByteSource`] and inclusive [`ByteRange`]
//! - [`geometry`] — [`Viewport`] and [`FontMetrics`]
//! - [`theme`] — the nine colour roles and their presets
//! - [`config`] — [`EngineConfig`] + [`ConfigPatch`] with lenient clamping
//! - [`protocol`] — input event payloads and outbound messages
//! - [`format`] — hex / ASCII cell formatting and selection export

pub mod config;
pub mod format;
pub mod geometry;
pub mod protocol;
pub mod source;
pub mod theme;

pub use config::{ConfigChanges, ConfigPatch, EngineConfig, Gaps};
pub use format::{export_selection, DumpGeometry, MAX_EXPORT_BYTES};
pub use geometry::{FontMetrics, Viewport};
pub use protocol::{
    CopyFormat, KeyEvent, KeyPhase, Modifiers, Outbound, PointerEvent, PointerPhase,
    ResizeEvent, WheelEvent,
};
pub use source::{ByteRange, ByteSource};
pub use theme::{Rgba, Theme, ThemePatch};
