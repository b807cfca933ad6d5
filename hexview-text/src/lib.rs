//! # hexview-text
//!
//! Fixed-grid glyph atlas for the hex grid, rasterized with `cosmic-text`.
//!
//! ## Architecture
//!
//! ```text
//! FontDescription ("Menlo, Consolas, monospace")
//!     │ resolve against the font database
//!     ▼
//! TextEngine (cosmic-text FontSystem + SwashCache)
//!     │ measure_cell(font_px) ──► FontMetrics
//!     │ build_atlas(metrics)
//!     ▼
//! GlyphAtlas { RGBA bitmap, char ──► AtlasRegion }
//! ```
//!
//! - **`font`** — CSS-like family chains and their resolution.
//! - **`engine`** — cell measurement and glyph rasterization.
//! - **`atlas`** — the 16-column cell grid and UV lookup.

pub mod atlas;
pub mod engine;
pub mod font;

pub use atlas::{AtlasRegion, GlyphAtlas, GlyphMask, ATLAS_COLUMNS, PLACEHOLDER};
pub use engine::TextEngine;
pub use font::{FamilyName, FontDescription, GenericFamily, DEFAULT_FONT_FAMILY};
