//! Glyph atlas — one RGBA bitmap holding every glyph the grid can draw.
//!
//! The atlas is a fixed grid of 16 columns of equally sized cells, one cell
//! per glyph, in [`glyph_set`] order.  Glyphs are white; coverage lives in
//! the alpha channel so the fragment shader can mix foreground and
//! background by it.  Cells are left transparent until something is blitted
//! into them, so the space cell doubles as a solid-rectangle brush.

use hexview_core::FontMetrics;

/// Cells per atlas row.
pub const ATLAS_COLUMNS: u32 = 16;

/// Drawn for characters the atlas does not hold.
pub const PLACEHOLDER: char = '\u{00B7}';

const FIRST_PRINTABLE: u32 = 0x20;
const LAST_PRINTABLE: u32 = 0x7E;
const PRINTABLE_COUNT: u32 = LAST_PRINTABLE - FIRST_PRINTABLE + 1;
const GLYPH_COUNT: u32 = PRINTABLE_COUNT + 1;

/// Every glyph in atlas order: printable ASCII, then [`PLACEHOLDER`].
pub fn glyph_set() -> impl Iterator<Item = char> {
    (FIRST_PRINTABLE..=LAST_PRINTABLE)
        .filter_map(char::from_u32)
        .chain(std::iter::once(PLACEHOLDER))
}

/// Normalized UV rectangle of one glyph cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasRegion {
    pub u_min: f32,
    pub v_min: f32,
    pub u_max: f32,
    pub v_max: f32,
}

/// A rasterized glyph positioned inside its cell.
#[derive(Clone, Copy, Debug)]
pub struct GlyphMask<'a> {
    /// Offset of the mask's top-left corner from the cell's top-left corner.
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    /// 1 for alpha masks, 4 for RGBA bitmaps (alpha channel is used).
    pub bytes_per_pixel: usize,
    pub data: &'a [u8],
}

/// CPU-side glyph atlas for one cell size.
#[derive(Clone, Debug)]
pub struct GlyphAtlas {
    /// Bitmap width in pixels (`16 × cell_width`).
    pub width: u32,
    /// Bitmap height in pixels (`rows × cell_height`).
    pub height: u32,
    /// RGBA8 pixels, row-major, `width × height × 4` bytes.
    pub data: Vec<u8>,
    metrics: FontMetrics,
    regions: Vec<AtlasRegion>,
}

impl GlyphAtlas {
    /// Allocate a transparent atlas with UVs for every glyph cell.
    pub fn new(metrics: FontMetrics) -> Self {
        let rows = GLYPH_COUNT.div_ceil(ATLAS_COLUMNS);
        let width = ATLAS_COLUMNS * metrics.cell_width;
        let height = rows * metrics.cell_height;

        let regions = (0..GLYPH_COUNT)
            .map(|i| {
                let (x, y) = cell_origin(i, &metrics);
                AtlasRegion {
                    u_min: x as f32 / width as f32,
                    v_min: y as f32 / height as f32,
                    u_max: (x + metrics.cell_width) as f32 / width as f32,
                    v_max: (y + metrics.cell_height) as f32 / height as f32,
                }
            })
            .collect();

        Self {
            width,
            height,
            data: vec![0u8; (width * height * 4) as usize],
            metrics,
            regions,
        }
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Number of glyph cells.
    pub fn glyph_count(&self) -> usize {
        self.regions.len()
    }

    /// UV rectangle for `ch`.  Never fails: characters outside the set map
    /// to the placeholder.
    pub fn lookup(&self, ch: char) -> AtlasRegion {
        let index = glyph_index(ch)
            .or_else(|| glyph_index(PLACEHOLDER))
            .unwrap_or(0);
        self.regions[index as usize]
    }

    /// UV rectangle of the transparent space cell.
    pub fn blank(&self) -> AtlasRegion {
        self.regions[0]
    }

    /// Pixel origin of the cell holding `ch`, if the atlas has one.
    pub fn cell_of(&self, ch: char) -> Option<(u32, u32)> {
        glyph_index(ch).map(|i| cell_origin(i, &self.metrics))
    }

    /// Copy a coverage mask into the cell of `ch`.  Pixels falling outside
    /// the cell are dropped.
    pub fn blit(&mut self, ch: char, glyph: &GlyphMask<'_>) {
        let Some((cell_x, cell_y)) = self.cell_of(ch) else {
            return;
        };
        let GlyphMask {
            left,
            top,
            width,
            height,
            bytes_per_pixel,
            data: mask,
        } = *glyph;
        let cw = self.metrics.cell_width as i32;
        let ch_px = self.metrics.cell_height as i32;
        let stride = self.width as usize * 4;

        for row in 0..height as i32 {
            let y = top + row;
            if y < 0 || y >= ch_px {
                continue;
            }
            for col in 0..width as i32 {
                let x = left + col;
                if x < 0 || x >= cw {
                    continue;
                }
                let src = (row as usize * width as usize + col as usize) * bytes_per_pixel;
                let alpha = match bytes_per_pixel {
                    1 => mask.get(src).copied(),
                    _ => mask.get(src + 3).copied(),
                };
                let Some(alpha) = alpha else {
                    continue;
                };
                let dst = (cell_y as usize + y as usize) * stride + (cell_x as usize + x as usize) * 4;
                let px = &mut self.data[dst..dst + 4];
                px[0] = 255;
                px[1] = 255;
                px[2] = 255;
                px[3] = px[3].max(alpha);
            }
        }
    }

    /// Alpha value at atlas pixel `(x, y)`.
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[((y * self.width + x) * 4 + 3) as usize]
    }
}

fn glyph_index(ch: char) -> Option<u32> {
    let code = ch as u32;
    if (FIRST_PRINTABLE..=LAST_PRINTABLE).contains(&code) {
        Some(code - FIRST_PRINTABLE)
    } else if ch == PLACEHOLDER {
        Some(PRINTABLE_COUNT)
    } else {
        None
    }
}

fn cell_origin(index: u32, metrics: &FontMetrics) -> (u32, u32) {
    (
        (index % ATLAS_COLUMNS) * metrics.cell_width,
        (index / ATLAS_COLUMNS) * metrics.cell_height,
    )
}

// ===================================================================
// Tests
// ===================================================================
