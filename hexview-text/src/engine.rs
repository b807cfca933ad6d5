//! Text engine — measures the monospace cell and rasterizes the glyph
//! atlas with `cosmic-text`.
//!
//! The engine manages a `FontSystem` (font discovery + shaping) and a
//! `SwashCache` (glyph rasterization).  Both are expensive to create, so a
//! render thread keeps one engine for its lifetime and only calls
//! [`TextEngine::build_atlas`] when the font size changes.

use cosmic_text::{Attrs, Buffer, FontSystem, Metrics, Shaping, SwashCache, SwashContent};
use hexview_core::FontMetrics;

use crate::atlas::{glyph_set, GlyphAtlas, GlyphMask};
use crate::font::{FamilyName, FontDescription};

const MIN_CELL_WIDTH: u32 = 8;
const MIN_CELL_HEIGHT: u32 = 12;
const CELL_HEIGHT_FACTOR: f32 = 1.25;
/// Advance assumed when no font can shape "M".
const FALLBACK_ADVANCE_EM: f32 = 0.6;

/// One shaped and rasterized glyph, positioned relative to its pen origin.
struct Raster {
    advance: f32,
    /// Offset of the bitmap's left edge from the pen position.
    left: i32,
    /// Distance from the baseline up to the bitmap's top edge.
    top: i32,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
    data: Vec<u8>,
}

/// Core text engine wrapping cosmic-text.
pub struct TextEngine {
    pub font_system: FontSystem,
    pub swash_cache: SwashCache,
    family: FamilyName,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    /// Create an engine with system font discovery and the default
    /// monospace chain.
    pub fn new() -> Self {
        Self::with_font(&FontDescription::default())
    }

    pub fn with_font(font: &FontDescription) -> Self {
        let font_system = FontSystem::new();
        let family = font.resolve(font_system.db());
        log::info!(
            "text engine ready: {} font faces, family {:?}",
            font_system.db().faces().count(),
            family
        );
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            family,
        }
    }

    /// Family every glyph is shaped with.
    pub fn family(&self) -> &FamilyName {
        &self.family
    }

    /// Measure the grid cell for `font_px` from the glyph "M".
    ///
    /// `cell_width = max(8, round(advance))`;
    /// `cell_height = max(12, ceil((ascent + descent) × 1.25))`, where a
    /// zero descent counts as a quarter of the font size.
    pub fn measure_cell(&mut self, font_px: u32) -> FontMetrics {
        let px = font_px as f32;
        let raster = self.rasterize('M', px);

        let advance = raster
            .as_ref()
            .map(|r| r.advance)
            .filter(|a| *a > 0.0)
            .unwrap_or(px * FALLBACK_ADVANCE_EM);
        let (ascent, descent) = match &raster {
            Some(r) if r.height > 0 => (r.top.max(0) as f32, (r.height as i32 - r.top).max(0) as f32),
            _ => (0.0, 0.0),
        };
        let ascent = if ascent > 0.0 { ascent } else { px };
        let descent = if descent > 0.0 { descent } else { (px * 0.25).ceil() };
        let text_height = (ascent + descent).ceil().max(1.0);

        let metrics = FontMetrics::new(
            font_px,
            (advance.round() as u32).max(MIN_CELL_WIDTH),
            ((text_height * CELL_HEIGHT_FACTOR).ceil() as u32).max(MIN_CELL_HEIGHT),
        );
        log::debug!(
            "measured cell for {font_px}px: {}x{}",
            metrics.cell_width,
            metrics.cell_height
        );
        metrics
    }

    /// Rasterize every glyph of the set into a fresh atlas for `metrics`.
    ///
    /// Each glyph is centred horizontally on its advance and vertically on
    /// the cap height of "M", then clipped to its cell.
    pub fn build_atlas(&mut self, metrics: &FontMetrics) -> GlyphAtlas {
        let mut atlas = GlyphAtlas::new(*metrics);
        let px = metrics.font_px as f32;
        let cw = metrics.cell_width as f32;
        let ch = metrics.cell_height as f32;

        let cap = self
            .rasterize('M', px)
            .map(|r| r.top as f32)
            .filter(|t| *t > 0.0)
            .unwrap_or(px * 0.7);
        let baseline = ((ch + cap) / 2.0).round() as i32;

        let mut drawn = 0usize;
        for glyph in glyph_set() {
            let Some(r) = self.rasterize(glyph, px) else {
                continue;
            };
            if r.width == 0 || r.height == 0 {
                continue;
            }
            let pen_x = ((cw - r.advance) / 2.0).round() as i32;
            atlas.blit(
                glyph,
                &GlyphMask {
                    left: pen_x + r.left,
                    top: baseline - r.top,
                    width: r.width,
                    height: r.height,
                    bytes_per_pixel: r.bytes_per_pixel,
                    data: &r.data,
                },
            );
            drawn += 1;
        }

        log::debug!(
            "glyph atlas built: {}x{} px, {drawn} glyphs drawn",
            atlas.width,
            atlas.height
        );
        atlas
    }

    /// Shape a single character and rasterize its first glyph.
    fn rasterize(&mut self, ch: char, font_px: f32) -> Option<Raster> {
        let metrics = Metrics::new(font_px, (font_px * CELL_HEIGHT_FACTOR).ceil());
        let attrs = Attrs::new().family(self.family.as_family());

        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, None, None);
        let mut text = [0u8; 4];
        buffer.set_text(
            &mut self.font_system,
            ch.encode_utf8(&mut text),
            attrs,
            Shaping::Advanced,
        );
        buffer.shape_until_scroll(&mut self.font_system, false);

        let glyph = buffer.layout_runs().next()?.glyphs.first()?.clone();
        let physical = glyph.physical((0.0, 0.0), 1.0);

        let mut raster = Raster {
            advance: glyph.w,
            left: 0,
            top: 0,
            width: 0,
            height: 0,
            bytes_per_pixel: 1,
            data: Vec::new(),
        };

        // Whitespace has an advance but no image.
        let Some(image) = self
            .swash_cache
            .get_image(&mut self.font_system, physical.cache_key)
            .as_ref()
        else {
            return Some(raster);
        };

        raster.left = physical.x + image.placement.left;
        raster.top = image.placement.top - physical.y;
        raster.width = image.placement.width;
        raster.height = image.placement.height;
        raster.bytes_per_pixel = match image.content {
            SwashContent::Mask => 1,
            SwashContent::Color | SwashContent::SubpixelMask => 4,
        };
        raster.data = image.data.clone();
        Some(raster)
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::PLACEHOLDER;

    fn has_fonts(engine: &TextEngine) -> bool {
        let any = engine.font_system.db().faces().count() > 0;
        if !any {
            eprintln!("no system fonts — skipping");
        }
        any
    }

    #[test]
    fn test_measure_cell_respects_minimums() {
        let mut engine = TextEngine::new();
        for px in [8, 14, 48] {
            let m = engine.measure_cell(px);
            assert_eq!(m.font_px, px);
            assert!(m.cell_width >= 8);
            assert!(m.cell_height >= 12);
        }
    }

    #[test]
    fn test_measure_cell_grows_with_font() {
        let mut engine = TextEngine::new();
        let small = engine.measure_cell(10);
        let large = engine.measure_cell(40);
        assert!(large.cell_width > small.cell_width);
        assert!(large.cell_height > small.cell_height);
    }

    #[test]
    fn test_build_atlas_draws_glyphs() {
        let mut engine = TextEngine::new();
        if !has_fonts(&engine) {
            return;
        }
        let metrics = engine.measure_cell(16);
        let atlas = engine.build_atlas(&metrics);
        assert_eq!(atlas.width, 16 * metrics.cell_width);

        let cell_coverage = |ch: char| -> u32 {
            let (x0, y0) = atlas.cell_of(ch).unwrap();
            let mut sum = 0u32;
            for y in y0..y0 + metrics.cell_height {
                for x in x0..x0 + metrics.cell_width {
                    sum += u32::from(atlas.alpha_at(x, y));
                }
            }
            sum
        };

        assert_eq!(cell_coverage(' '), 0, "space must stay transparent");
        assert!(cell_coverage('M') > 0);
        assert!(cell_coverage('0') > 0);
        assert!(cell_coverage('F') > 0);
        // The placeholder may come from a fallback font, but it must not
        // spill into the space cell either way.
        let _ = cell_coverage(PLACEHOLDER);
        assert_eq!(cell_coverage(' '), 0);
    }

    #[test]
    fn test_unknown_families_fall_back_to_monospace() {
        let engine = TextEngine::with_font(&FontDescription::from_css("No Such Font, Another Missing"));
        assert_eq!(
            engine.family(),
            &FamilyName::Generic(crate::font::GenericFamily::Monospace)
        );
    }
}
